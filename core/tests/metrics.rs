//! Metric definitions over small hand-built tables.

use chrono::NaiveDate;
use merchsim_core::{
    catalog::{Brand, Category, Channel, Region},
    dimension::{SkuRow, StoreRow},
    inventory::InventoryRow,
    metrics::{self, KpiSummary},
    sales::SalesRow,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[allow(clippy::too_many_arguments)]
fn line(date: NaiveDate, id: &str, sku: &str, store: &str, units: u32, sales: f64, disc: f64, gm: f64) -> SalesRow {
    SalesRow {
        order_date:       date,
        order_id:         id.into(),
        sku:              sku.into(),
        store:            store.into(),
        channel:          Channel::Store,
        units,
        sales,
        discount_amt:     disc,
        gross_margin_amt: gm,
        return_flag:      false,
        unit_price:       (sales + disc) / units as f64,
        discount_rate:    disc / (sales + disc),
    }
}

fn snap(date: NaiveDate, sku: &str, store: &str, on_hand: u32) -> InventoryRow {
    InventoryRow {
        snapshot_date: date,
        sku:           sku.into(),
        store:         store.into(),
        on_hand_units: on_hand,
    }
}

fn sample_sales() -> Vec<SalesRow> {
    vec![
        line(d(2024, 1, 1), "ORD-1", "SKU-00001", "Store-001", 2, 90.0, 10.0, 30.0),
        line(d(2024, 1, 3), "ORD-2", "SKU-00002", "Store-001", 1, 45.0, 5.0, 9.0),
        line(d(2024, 1, 9), "ORD-3", "SKU-00001", "Store-002", 3, 60.0, 0.0, 12.0),
    ]
}

fn sample_skus() -> Vec<SkuRow> {
    vec![
        SkuRow {
            sku: "SKU-00001".into(),
            category: Category::Apparel,
            brand: Brand::Apex,
            base_price: 50.0,
            base_margin_rate: 0.3,
        },
        SkuRow {
            sku: "SKU-00002".into(),
            category: Category::Beauty,
            brand: Brand::Nova,
            base_price: 50.0,
            base_margin_rate: 0.2,
        },
    ]
}

fn sample_stores() -> Vec<StoreRow> {
    vec![
        StoreRow { store: "Store-001".into(), region: Region::West },
        StoreRow { store: "Store-002".into(), region: Region::East },
    ]
}

#[test]
fn kpi_summary_matches_governed_definitions() {
    let kpis = metrics::kpi_summary(&sample_sales());
    assert_eq!(
        kpis,
        KpiSummary {
            sales:         195.0,
            orders:        3,
            units:         6,
            gross_margin:  51.0,
            gm_pct:        0.2615,
            markdown:      15.0,
            markdown_rate: 0.0714,
            aov:           65.0,
        }
    );
}

#[test]
fn kpi_summary_of_nothing_is_zero() {
    let kpis = metrics::kpi_summary(&[]);
    assert_eq!(kpis.orders, 0);
    assert_eq!(kpis.gm_pct, 0.0);
    assert_eq!(kpis.markdown_rate, 0.0);
    assert_eq!(kpis.aov, 0.0);
}

#[test]
fn orders_count_distinct_ids() {
    let mut sales = sample_sales();
    sales.push(line(d(2024, 1, 9), "ORD-3", "SKU-00002", "Store-002", 1, 10.0, 0.0, 1.0));
    assert_eq!(metrics::kpi_summary(&sales).orders, 3);
}

#[test]
fn weekly_rollups_use_monday_weeks() {
    let sales = sample_sales();
    let weekly = metrics::sales_by_week(&sales);
    assert_eq!(weekly.len(), 2);
    assert_eq!((weekly[0].week_start, weekly[0].sales), (d(2024, 1, 1), 135.0));
    assert_eq!((weekly[1].week_start, weekly[1].sales), (d(2024, 1, 8), 60.0));
    assert_eq!(metrics::avg_weekly_units(&sales), 3.0);
    assert_eq!(metrics::avg_weekly_units(&[]), 0.0);
}

#[test]
fn top_movers_rank_by_sales_and_keep_dimension_order_on_ties() {
    let skus: Vec<SkuRow> = ["SKU-99999", "SKU-100000", "SKU-100001"]
        .into_iter()
        .map(|id| SkuRow { sku: id.into(), ..sample_skus()[0].clone() })
        .collect();
    let sales = vec![
        line(d(2024, 1, 1), "ORD-1", "SKU-100000", "Store-001", 1, 50.0, 0.0, 5.0),
        line(d(2024, 1, 1), "ORD-2", "SKU-100001", "Store-001", 1, 80.0, 0.0, 5.0),
        line(d(2024, 1, 1), "ORD-3", "SKU-99999", "Store-001", 1, 50.0, 0.0, 5.0),
        line(d(2024, 1, 1), "ORD-4", "SKU-00000", "Store-001", 1, 50.0, 0.0, 5.0),
    ];
    let movers: Vec<String> =
        metrics::top_movers(&sales, &skus, 10).into_iter().map(|m| m.sku).collect();
    // Unknown SKU-00000 ties too but ranks after every dimension member.
    assert_eq!(movers, vec!["SKU-100001", "SKU-99999", "SKU-100000", "SKU-00000"]);
    assert_eq!(metrics::top_movers(&sales, &skus, 1).len(), 1);
}

#[test]
fn stockout_days_count_dates_with_zero_total() {
    let inventory = vec![
        snap(d(2024, 1, 1), "SKU-00001", "Store-001", 0),
        snap(d(2024, 1, 1), "SKU-00002", "Store-001", 0),
        snap(d(2024, 1, 2), "SKU-00001", "Store-001", 0),
        snap(d(2024, 1, 2), "SKU-00002", "Store-001", 4),
        snap(d(2024, 1, 3), "SKU-00001", "Store-001", 0),
        snap(d(2024, 1, 3), "SKU-00002", "Store-001", 0),
    ];
    assert_eq!(metrics::stockout_days(&inventory), 2);
}

#[test]
fn sell_through_and_wos_guard_zero_denominators() {
    assert_eq!(metrics::sell_through_pct(0.0, 0.0), 0.0);
    assert_eq!(metrics::sell_through_pct(1.0, 3.0), 0.25);
    assert_eq!(metrics::weeks_of_supply(10.0, 0.0), 0.0);
    assert_eq!(metrics::weeks_of_supply(10.0, 2.5), 4.0);
}

#[test]
fn inventory_health_rolls_up_latest_snapshot() {
    let inventory = vec![
        snap(d(2024, 1, 8), "SKU-00001", "Store-001", 99),
        snap(d(2024, 1, 9), "SKU-00001", "Store-001", 10),
        snap(d(2024, 1, 9), "SKU-00001", "Store-002", 0),
        snap(d(2024, 1, 9), "SKU-00002", "Store-001", 5),
        snap(d(2024, 1, 9), "SKU-00002", "Store-002", 20),
    ];
    let health =
        metrics::inventory_health(&sample_sales(), &inventory, &sample_skus(), &sample_stores());

    assert_eq!(health.latest_snapshot, Some(d(2024, 1, 9)));
    assert_eq!(health.cells.len(), 4);
    let first = &health.cells[0];
    assert_eq!((first.on_hand_units, first.units_28d), (10, 2));
    assert_eq!(first.avg_weekly_units, 0.5);
    assert_eq!(first.wos, 20.0);

    let cats: Vec<_> = health
        .by_category
        .iter()
        .map(|c| (c.category, c.on_hand_units, c.units_28d, c.sell_through, c.wos))
        .collect();
    assert_eq!(
        cats,
        vec![
            (Category::Apparel, 10, 5, 0.5833, 10.0),
            (Category::Beauty, 25, 1, 0.0833, 10.0),
        ]
    );

    // Both stores sold 3 units; DimStore row order breaks the tie.
    let stores: Vec<_> = health
        .by_store
        .iter()
        .map(|s| (s.store.as_str(), s.region, s.on_hand_units, s.units_28d, s.sell_through, s.wos))
        .collect();
    assert_eq!(
        stores,
        vec![
            ("Store-001", Region::West, 15, 3, 0.1667, 20.0),
            ("Store-002", Region::East, 20, 3, 0.5, 0.0),
        ]
    );
}

#[test]
fn trailing_window_excludes_older_sales() {
    let sales = vec![
        line(d(2024, 1, 1), "ORD-1", "SKU-00001", "Store-001", 8, 80.0, 0.0, 8.0),
        line(d(2024, 2, 28), "ORD-2", "SKU-00001", "Store-001", 1, 10.0, 0.0, 1.0),
        // 28-day window ending Feb 28 starts Feb 1.
        line(d(2024, 2, 1), "ORD-3", "SKU-00001", "Store-001", 2, 20.0, 0.0, 2.0),
        line(d(2024, 1, 31), "ORD-4", "SKU-00001", "Store-001", 4, 40.0, 0.0, 4.0),
    ];
    let inventory = vec![snap(d(2024, 2, 28), "SKU-00001", "Store-001", 7)];
    let health = metrics::inventory_health(&sales, &inventory, &sample_skus(), &sample_stores());
    assert_eq!(health.cells[0].units_28d, 3);
}

#[test]
fn store_ties_follow_dimension_rows_past_id_padding() {
    let stores: Vec<StoreRow> = ["Store-999", "Store-1000"]
        .into_iter()
        .map(|id| StoreRow { store: id.into(), ..sample_stores()[0].clone() })
        .collect();
    let sales = vec![
        line(d(2024, 1, 2), "ORD-1", "SKU-00001", "Store-1000", 2, 20.0, 0.0, 2.0),
        line(d(2024, 1, 2), "ORD-2", "SKU-00001", "Store-999", 2, 20.0, 0.0, 2.0),
    ];
    let inventory = vec![
        snap(d(2024, 1, 2), "SKU-00001", "Store-1000", 6),
        snap(d(2024, 1, 2), "SKU-00001", "Store-999", 6),
        snap(d(2024, 1, 2), "SKU-00001", "Store-404", 6),
    ];
    let health = metrics::inventory_health(&sales, &inventory, &sample_skus(), &stores);

    let order: Vec<&str> = health.by_store.iter().map(|s| s.store.as_str()).collect();
    assert_eq!(order, vec!["Store-999", "Store-1000"]);
    let cells: Vec<&str> = health.cells.iter().map(|c| c.store.as_str()).collect();
    assert_eq!(cells, vec!["Store-999", "Store-1000"], "unknown Store-404 is skipped");
}
