//! Markdown artifacts: KPI report, governed metric definitions and
//! the one-pager.

use crate::{
    config::ReportPaths,
    error::GenResult,
    metrics::MerchMetrics,
    tables::TableStore,
};
use std::path::Path;

/// A GitHub-flavoured markdown table.
#[derive(Debug, Clone, Default)]
pub struct MarkdownTable {
    headers: Vec<String>,
    rows:    Vec<Vec<String>>,
}

impl MarkdownTable {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows:    Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Render at most `max_rows` rows, padding every column to its
    /// widest cell.
    pub fn render(&self, max_rows: usize) -> String {
        let shown = &self.rows[..self.rows.len().min(max_rows)];
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.len().max(3)).collect();
        for row in shown {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.len());
            }
        }

        let line = |cells: &[String]| {
            let padded: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, &w)| format!("{:<w$}", cells.get(i).map(String::as_str).unwrap_or("")))
                .collect();
            format!("| {} |", padded.join(" | "))
        };

        let mut out = vec![line(&self.headers)];
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push(format!("|-{}-|", rule.join("-|-")));
        out.extend(shown.iter().map(|r| line(r)));
        out.join("\n")
    }
}

pub fn build_report(metrics: &MerchMetrics) -> String {
    let mut report = vec!["# Merchandising Metrics Report\n".to_string(), "## Executive KPIs\n".into()];
    for (label, value) in metrics.kpis.entries() {
        report.push(format!("- {label}: {value}"));
    }
    report.push(format!("- Avg Weekly Units (proxy): {:.2}", metrics.avg_weekly_units));
    report.push(format!("- Stockout Days (proxy): {}", metrics.stockout_days));
    report.push(String::new());

    let mut trend = MarkdownTable::new(&["WeekStart", "Sales"]);
    for w in &metrics.sales_by_week {
        trend.push(vec![w.week_start.to_string(), format!("{:.2}", w.sales)]);
    }
    report.push("## Trend: Sales $ by Week\n".into());
    report.push(trend.render(12));
    report.push(String::new());

    let mut movers = MarkdownTable::new(&["SKU", "Sales", "Units", "GrossMarginAmt", "DiscountAmt"]);
    for m in &metrics.top_movers {
        movers.push(vec![
            m.sku.clone(),
            format!("{:.2}", m.sales),
            m.units.to_string(),
            format!("{:.2}", m.gross_margin_amt),
            format!("{:.2}", m.discount_amt),
        ]);
    }
    report.push("## Top Movers (Top 10 SKUs)\n".into());
    report.push(movers.render(10));
    report.push(String::new());

    let inv = &metrics.inventory;
    report.push("## Inventory Health (Latest Snapshot)\n".into());
    let latest = inv
        .latest_snapshot
        .map(|d| d.to_string())
        .unwrap_or_else(|| "n/a".into());
    report.push(format!("- Latest snapshot date: {latest}"));
    report.push(String::new());

    let mut by_category =
        MarkdownTable::new(&["Category", "OnHandUnits", "Units28d", "SellThrough%", "WOS"]);
    for c in &inv.by_category {
        by_category.push(vec![
            c.category.as_str().to_string(),
            c.on_hand_units.to_string(),
            c.units_28d.to_string(),
            format!("{:.4}", c.sell_through),
            format!("{:.2}", c.wos),
        ]);
    }
    report.push("### Inventory by Category\n".into());
    report.push(by_category.render(12));
    report.push(String::new());

    let mut by_store =
        MarkdownTable::new(&["Store", "Region", "OnHandUnits", "Units28d", "SellThrough%", "WOS"]);
    for s in &inv.by_store {
        by_store.push(vec![
            s.store.clone(),
            s.region.as_str().to_string(),
            s.on_hand_units.to_string(),
            s.units_28d.to_string(),
            format!("{:.4}", s.sell_through),
            format!("{:.2}", s.wos),
        ]);
    }
    report.push("### Inventory by Store (Top 15 by Units Sold)\n".into());
    report.push(by_store.render(15));
    report.push(String::new());

    report.join("\n")
}

pub fn metric_definitions() -> &'static str {
    "# Metric Definitions (Governed)

These definitions are used consistently across the generated report and any downstream dashboard.

- **Sales $**: Net sales after discounts.
- **Orders**: Distinct count of OrderID.
- **AOV**: Sales $ / Orders.
- **Units**: Sum of Units sold.
- **Markdown $**: Sum of DiscountAmt.
- **Markdown Rate %**: Markdown $ / (Sales $ + Markdown $). (Uses gross sales basis.)
- **GM $**: Sum of GrossMarginAmt.
- **GM %**: GM $ / Sales $.
- **On Hand Units**: Latest snapshot OnHandUnits.
- **Sell-through %**: Units Sold / (Units Sold + On Hand Units). (Proxy for synthetic inventory.)
- **Weeks of Supply (WOS)**: On Hand Units / Avg Weekly Units. (Avg weekly based on last 28 days.)
- **Stockout proxy**: Number of days where total On Hand Units = 0.
"
}

pub fn one_pager(report_path: &str, defs_path: &str) -> String {
    format!(
        "# One Pager: Merchandising Analytics Toolkit

## Business question
Which categories, brands, and SKUs are driving Sales and Gross Margin, and where are we at risk on inventory health (Sell-through, Weeks of Supply, Stockouts) across stores and channels?

## Data model
Star schema:
- **FactSales** (OrderDate, SKU, Store, Channel, Units, Sales, DiscountAmt, GrossMarginAmt, ReturnFlag)
- **FactInventorySnapshot** (SnapshotDate, SKU, Store, OnHandUnits)
Joined to **DimDate**, **DimSKU**, **DimStore**, **DimChannel**.

## Measures governed
See `{defs_path}`. Core KPIs:
Sales $, Units, GM %, Markdown Rate %, AOV, Sell-through %, WOS, Stockout proxy.

## Adoption intent
- Merch leaders review **Merch Executive** weekly to track Sales, GM, promo pressure, and top movers.
- Planners review **Inventory** daily to monitor Sell-through, WOS, and stockout risk by category and store.
- Analysts use **Drivers** to isolate whether performance changes are driven by Units, Discounting, or price mix.

## Outputs created by this project
- Markdown KPI report: `{report_path}`
- Metric definitions (governance): `{defs_path}`
"
    )
}

pub fn write_text(path: impl AsRef<Path>, text: &str) -> GenResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    Ok(())
}

/// Load and validate the tables in `paths.data_dir`, compute metrics,
/// and write all three markdown artifacts.
pub fn build_artifacts(paths: &ReportPaths) -> GenResult<MerchMetrics> {
    let schema = TableStore::new(&paths.data_dir).load_validated()?;
    let metrics = MerchMetrics::compute(&schema);

    write_text(&paths.report_path, &build_report(&metrics))?;
    write_text(&paths.defs_path, metric_definitions())?;
    write_text(&paths.one_pager_path, &one_pager(&paths.report_path, &paths.defs_path))?;
    log::info!("report artifacts written under {}", paths.report_path);
    Ok(metrics)
}
