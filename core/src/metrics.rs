//! Governed merchandising metrics over the generated fact tables.
//!
//! Every function here is pure: same tables in, same numbers out.
//! Groupings are keyed by dimension row index and rankings use a
//! stable sort, so ties keep DimSKU / DimStore row order. Categories
//! keep their declaration order.

use crate::{
    calendar,
    catalog::{Brand, Category, Region},
    dimension::{SkuRow, StoreRow},
    engine::StarSchema,
    inventory::InventoryRow,
    sales::SalesRow,
    types::{round_money, round_rate, safe_ratio, SkuId, StoreId},
};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

pub const TOP_MOVERS: usize = 10;
pub const TOP_STORES: usize = 15;
pub const TRAILING_WINDOW_DAYS: i64 = 28;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub sales:         f64,
    pub orders:        usize,
    pub units:         u64,
    pub gross_margin:  f64,
    pub gm_pct:        f64,
    pub markdown:      f64,
    pub markdown_rate: f64,
    pub aov:           f64,
}

impl KpiSummary {
    /// Display labels in report order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Sales $", format!("{:.2}", self.sales)),
            ("Orders", self.orders.to_string()),
            ("Units", self.units.to_string()),
            ("GM $", format!("{:.2}", self.gross_margin)),
            ("GM %", format!("{:.4}", self.gm_pct)),
            ("Markdown $", format!("{:.2}", self.markdown)),
            ("Markdown Rate %", format!("{:.4}", self.markdown_rate)),
            ("AOV", format!("{:.2}", self.aov)),
        ]
    }
}

pub fn kpi_summary(sales: &[SalesRow]) -> KpiSummary {
    let net: f64 = sales.iter().map(|r| r.sales).sum();
    let orders = sales.iter().map(|r| r.order_id.as_str()).collect::<HashSet<_>>().len();
    let units: u64 = sales.iter().map(|r| r.units as u64).sum();
    let gm: f64 = sales.iter().map(|r| r.gross_margin_amt).sum();
    let markdown: f64 = sales.iter().map(|r| r.discount_amt).sum();
    let gross: f64 = sales.iter().map(SalesRow::gross_sales).sum();

    KpiSummary {
        sales:         round_money(net),
        orders,
        units,
        gross_margin:  round_money(gm),
        gm_pct:        round_rate(safe_ratio(gm, net)),
        markdown:      round_money(markdown),
        markdown_rate: round_rate(safe_ratio(markdown, gross)),
        aov:           round_money(safe_ratio(net, orders as f64)),
    }
}

/// Units per Monday-start week, for weeks with at least one order.
pub fn weekly_units(sales: &[SalesRow]) -> BTreeMap<NaiveDate, u64> {
    let mut weeks = BTreeMap::new();
    for r in sales {
        *weeks.entry(calendar::week_start(r.order_date)).or_insert(0) += r.units as u64;
    }
    weeks
}

pub fn avg_weekly_units(sales: &[SalesRow]) -> f64 {
    let weeks = weekly_units(sales);
    let total: u64 = weeks.values().sum();
    safe_ratio(total as f64, weeks.len() as f64)
}

/// Dates on which on-hand summed over every cell is exactly zero.
pub fn stockout_days(inventory: &[InventoryRow]) -> usize {
    let mut daily: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for r in inventory {
        *daily.entry(r.snapshot_date).or_insert(0) += r.on_hand_units as u64;
    }
    daily.values().filter(|&&total| total == 0).count()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySales {
    pub week_start: NaiveDate,
    pub sales:      f64,
}

pub fn sales_by_week(sales: &[SalesRow]) -> Vec<WeeklySales> {
    let mut weeks: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in sales {
        *weeks.entry(calendar::week_start(r.order_date)).or_insert(0.0) += r.sales;
    }
    weeks
        .into_iter()
        .map(|(week_start, sales)| WeeklySales { week_start, sales: round_money(sales) })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkuMover {
    pub sku:              SkuId,
    pub sales:            f64,
    pub units:            u64,
    pub gross_margin_amt: f64,
    pub discount_amt:     f64,
}

/// Top `n` SKUs by net sales.
/// SKUs missing from `skus` rank after every known SKU on ties.
pub fn top_movers(sales: &[SalesRow], skus: &[SkuRow], n: usize) -> Vec<SkuMover> {
    let row_of: HashMap<&str, usize> =
        skus.iter().enumerate().map(|(i, s)| (s.sku.as_str(), i)).collect();

    let mut by_sku: BTreeMap<(usize, &str), SkuMover> = BTreeMap::new();
    for r in sales {
        let row = row_of.get(r.sku.as_str()).copied().unwrap_or(usize::MAX);
        let m = by_sku.entry((row, r.sku.as_str())).or_insert_with(|| SkuMover {
            sku:              r.sku.clone(),
            sales:            0.0,
            units:            0,
            gross_margin_amt: 0.0,
            discount_amt:     0.0,
        });
        m.sales += r.sales;
        m.units += r.units as u64;
        m.gross_margin_amt += r.gross_margin_amt;
        m.discount_amt += r.discount_amt;
    }

    let mut movers: Vec<SkuMover> = by_sku.into_values().collect();
    movers.sort_by(|a, b| b.sales.total_cmp(&a.sales));
    movers.truncate(n);
    for m in &mut movers {
        m.sales = round_money(m.sales);
        m.gross_margin_amt = round_money(m.gross_margin_amt);
        m.discount_amt = round_money(m.discount_amt);
    }
    movers
}

/// Share of (sold + on hand) that has already sold.
pub fn sell_through_pct(units_sold: f64, on_hand: f64) -> f64 {
    safe_ratio(units_sold, units_sold + on_hand)
}

/// On-hand expressed in weeks of average demand.
pub fn weeks_of_supply(on_hand: f64, avg_week_units: f64) -> f64 {
    safe_ratio(on_hand, avg_week_units)
}

/// One (sku, store) cell at the latest snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellHealth {
    pub sku:              SkuId,
    pub store:            StoreId,
    pub category:         Category,
    pub brand:            Brand,
    pub region:           Region,
    pub on_hand_units:    u64,
    pub units_28d:        u64,
    pub avg_weekly_units: f64,
    pub sell_through:     f64,
    pub wos:              f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryHealth {
    pub category:      Category,
    pub on_hand_units: u64,
    pub units_28d:     u64,
    pub sell_through:  f64,
    pub wos:           f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreHealth {
    pub store:         StoreId,
    pub region:        Region,
    pub on_hand_units: u64,
    pub units_28d:     u64,
    pub sell_through:  f64,
    pub wos:           f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryHealth {
    pub latest_snapshot: Option<NaiveDate>,
    pub cells:           Vec<CellHealth>,
    pub by_category:     Vec<CategoryHealth>,
    pub by_store:        Vec<StoreHealth>,
}

#[derive(Default)]
struct Rollup {
    on_hand:      u64,
    units_28d:    u64,
    sell_through: f64,
    wos:          f64,
    cells:        usize,
}

impl Rollup {
    fn add(&mut self, cell: &CellHealth) {
        self.on_hand += cell.on_hand_units;
        self.units_28d += cell.units_28d;
        self.sell_through += cell.sell_through;
        self.wos += cell.wos;
        self.cells += 1;
    }

    fn mean_sell_through(&self) -> f64 {
        round_rate(safe_ratio(self.sell_through, self.cells as f64))
    }

    fn mean_wos(&self) -> f64 {
        round_money(safe_ratio(self.wos, self.cells as f64))
    }
}

/// Inventory health at the latest snapshot, against demand in the
/// trailing 28 days ending on the last order date.
pub fn inventory_health(
    sales: &[SalesRow],
    inventory: &[InventoryRow],
    skus: &[SkuRow],
    stores: &[StoreRow],
) -> InventoryHealth {
    let latest_snapshot = inventory.iter().map(|r| r.snapshot_date).max();

    let mut sold_28d: HashMap<(&str, &str), u64> = HashMap::new();
    if let Some(last_order) = sales.iter().map(|r| r.order_date).max() {
        let window_start = last_order - Duration::days(TRAILING_WINDOW_DAYS - 1);
        for r in sales.iter().filter(|r| r.order_date >= window_start) {
            *sold_28d.entry((r.sku.as_str(), r.store.as_str())).or_insert(0) += r.units as u64;
        }
    }

    let sku_row: HashMap<&str, usize> =
        skus.iter().enumerate().map(|(i, s)| (s.sku.as_str(), i)).collect();
    let store_row: HashMap<&str, usize> =
        stores.iter().enumerate().map(|(i, s)| (s.store.as_str(), i)).collect();

    let mut on_hand: BTreeMap<(usize, usize), u64> = BTreeMap::new();
    if let Some(latest) = latest_snapshot {
        for r in inventory.iter().filter(|r| r.snapshot_date == latest) {
            let (Some(&si), Some(&ti)) = (sku_row.get(r.sku.as_str()), store_row.get(r.store.as_str()))
            else {
                log::warn!("inventory health: no dimension row for {}/{}, skipped", r.sku, r.store);
                continue;
            };
            *on_hand.entry((si, ti)).or_insert(0) += r.on_hand_units as u64;
        }
    }

    let mut cells = Vec::with_capacity(on_hand.len());
    let mut store_rollups: BTreeMap<usize, Rollup> = BTreeMap::new();
    for ((si, ti), units_on_hand) in on_hand {
        let (sku, store) = (&skus[si], &stores[ti]);
        let units_28d = sold_28d.get(&(sku.sku.as_str(), store.store.as_str())).copied().unwrap_or(0);
        let avg_weekly_units = units_28d as f64 / 4.0;
        let cell = CellHealth {
            sku:           sku.sku.clone(),
            store:         store.store.clone(),
            category:      sku.category,
            brand:         sku.brand,
            region:        store.region,
            on_hand_units: units_on_hand,
            units_28d,
            avg_weekly_units,
            sell_through:  sell_through_pct(units_28d as f64, units_on_hand as f64),
            wos:           weeks_of_supply(units_on_hand as f64, avg_weekly_units),
        };
        store_rollups.entry(ti).or_default().add(&cell);
        cells.push(cell);
    }

    let mut by_category: Vec<CategoryHealth> = Category::ALL
        .iter()
        .filter_map(|&category| {
            let mut r = Rollup::default();
            cells.iter().filter(|c| c.category == category).for_each(|c| r.add(c));
            (r.cells > 0).then(|| CategoryHealth {
                category,
                on_hand_units: r.on_hand,
                units_28d:     r.units_28d,
                sell_through:  r.mean_sell_through(),
                wos:           r.mean_wos(),
            })
        })
        .collect();
    by_category.sort_by(|a, b| b.units_28d.cmp(&a.units_28d));

    let mut by_store: Vec<StoreHealth> = store_rollups
        .into_iter()
        .map(|(ti, r)| StoreHealth {
            store:         stores[ti].store.clone(),
            region:        stores[ti].region,
            on_hand_units: r.on_hand,
            units_28d:     r.units_28d,
            sell_through:  r.mean_sell_through(),
            wos:           r.mean_wos(),
        })
        .collect();
    by_store.sort_by(|a, b| b.units_28d.cmp(&a.units_28d));
    by_store.truncate(TOP_STORES);

    InventoryHealth { latest_snapshot, cells, by_category, by_store }
}

/// Everything the merchandising report shows, computed in one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchMetrics {
    pub kpis:             KpiSummary,
    pub avg_weekly_units: f64,
    pub stockout_days:    usize,
    pub sales_by_week:    Vec<WeeklySales>,
    pub top_movers:       Vec<SkuMover>,
    pub inventory:        InventoryHealth,
}

impl MerchMetrics {
    pub fn compute(schema: &StarSchema) -> Self {
        let metrics = Self {
            kpis:             kpi_summary(&schema.sales),
            avg_weekly_units: avg_weekly_units(&schema.sales),
            stockout_days:    stockout_days(&schema.inventory),
            sales_by_week:    sales_by_week(&schema.sales),
            top_movers:       top_movers(&schema.sales, &schema.dims.skus, TOP_MOVERS),
            inventory:        inventory_health(
                &schema.sales,
                &schema.inventory,
                &schema.dims.skus,
                &schema.dims.stores,
            ),
        };
        log::info!(
            "metrics: sales={:.2} orders={} stockout_days={}",
            metrics.kpis.sales,
            metrics.kpis.orders,
            metrics.stockout_days
        );
        metrics
    }
}
