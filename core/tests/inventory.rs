//! Inventory snapshot simulation tests.

use chrono::{Datelike, NaiveDate, Weekday};
use merchsim_core::{
    catalog::Channel,
    config::GenConfig,
    dimension::{DimensionGenerator, Dimensions},
    engine::DatasetEngine,
    inventory::{InventoryRow, InventorySnapshotSimulator},
    metrics,
    rng::{RngBank, StreamSlot},
    sales::SalesRow,
};
use std::collections::BTreeMap;

fn dims_for(cfg: &GenConfig) -> Dimensions {
    DimensionGenerator::build(cfg, &RngBank::new(cfg.seed)).unwrap()
}

fn simulate(cfg: &GenConfig, dims: &Dimensions, sales: &[SalesRow]) -> Vec<InventoryRow> {
    let mut rng = RngBank::new(cfg.seed).for_stream(StreamSlot::Inventory);
    InventorySnapshotSimulator::new(dims, sales).run(&mut rng)
}

/// On-hand series per (sku, store), in date order.
fn series(rows: &[InventoryRow]) -> BTreeMap<(String, String), Vec<(NaiveDate, u32)>> {
    let mut out: BTreeMap<(String, String), Vec<(NaiveDate, u32)>> = BTreeMap::new();
    for r in rows {
        out.entry((r.sku.clone(), r.store.clone()))
            .or_default()
            .push((r.snapshot_date, r.on_hand_units));
    }
    out
}

fn sale(date: NaiveDate, sku: &str, store: &str, units: u32) -> SalesRow {
    SalesRow {
        order_date:       date,
        order_id:         "ORD-TEST".into(),
        sku:              sku.into(),
        store:            store.into(),
        channel:          Channel::Store,
        units,
        sales:            10.0 * units as f64,
        discount_amt:     0.0,
        gross_margin_amt: 3.0 * units as f64,
        return_flag:      false,
        unit_price:       10.0,
        discount_rate:    0.0,
    }
}

#[test]
fn one_row_per_date_sku_store() {
    let cfg = GenConfig { n_skus: 7, n_stores: 4, ..GenConfig::default_test() };
    let schema = DatasetEngine::new(cfg.clone()).unwrap().run().unwrap();
    assert_eq!(schema.inventory.len(), cfg.day_count() * 7 * 4);

    // Date-major, strictly ascending.
    let dates: Vec<NaiveDate> = schema.inventory.iter().map(|r| r.snapshot_date).collect();
    assert!(dates.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(dates.first(), Some(&cfg.start_date));
    assert_eq!(dates.last(), Some(&cfg.end_date));
}

#[test]
fn zero_demand_stock_only_grows_on_mondays() {
    let cfg = GenConfig { n_skus: 10, n_stores: 5, ..GenConfig::default_test() };
    let dims = dims_for(&cfg);
    let rows = simulate(&cfg, &dims, &[]);

    let mut replenished = 0;
    for ((sku, store), points) in series(&rows) {
        for w in points.windows(2) {
            let ((_, before), (date, after)) = (w[0], w[1]);
            assert!(after >= before, "{sku}/{store} fell on {date} without demand");
            if after != before {
                assert_eq!(date.weekday(), Weekday::Mon, "{sku}/{store} changed on {date}");
                assert!((20..=120).contains(&(after - before)));
                replenished += 1;
            }
        }
    }
    // 50 cells, one Monday after the first date, 25% selection.
    assert!(replenished > 0, "no replenishment seen across 50 cells");
}

#[test]
fn initial_stock_lies_in_range() {
    let cfg = GenConfig {
        // Starts on a Tuesday so the first snapshot is pure initial stock.
        start_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        n_skus: 20,
        n_stores: 10,
        ..GenConfig::default_test()
    };
    let dims = dims_for(&cfg);
    let rows = simulate(&cfg, &dims, &[]);
    for r in rows.iter().filter(|r| r.snapshot_date == cfg.start_date) {
        assert!((20..=200).contains(&r.on_hand_units), "initial {}", r.on_hand_units);
    }
}

#[test]
fn a_sale_depletes_its_cell_from_that_day_on() {
    let cfg = GenConfig::default_test();
    let dims = dims_for(&cfg);
    let wednesday = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();

    let baseline = simulate(&cfg, &dims, &[]);
    let with_sale = simulate(&cfg, &dims, &[sale(wednesday, "SKU-00001", "Store-001", 5)]);
    assert_eq!(baseline.len(), with_sale.len());

    for (a, b) in baseline.iter().zip(&with_sale) {
        let target = a.sku == "SKU-00001" && a.store == "Store-001";
        let expected_gap = if target && a.snapshot_date >= wednesday { 5 } else { 0 };
        assert_eq!(
            a.on_hand_units - b.on_hand_units,
            expected_gap,
            "{} {}/{}",
            a.snapshot_date,
            a.sku,
            a.store
        );
    }
}

#[test]
fn excess_demand_is_lost_not_backordered() {
    let cfg = GenConfig { n_skus: 1, n_stores: 1, ..GenConfig::default_test() };
    let dims = dims_for(&cfg);
    let tuesday = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let wednesday = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();

    let rows = simulate(&cfg, &dims, &[sale(tuesday, "SKU-00001", "Store-001", 10_000)]);
    let on = |date: NaiveDate| rows.iter().find(|r| r.snapshot_date == date).unwrap().on_hand_units;
    assert_eq!(on(tuesday), 0);
    // Nothing carried over: Wednesday has no demand and no replenishment.
    assert_eq!(on(wednesday), 0);
}

#[test]
fn heavy_demand_empties_every_day() {
    let cfg = GenConfig { n_skus: 1, n_stores: 1, n_orders: 10_000, ..GenConfig::default_test() };
    let schema = DatasetEngine::new(cfg.clone()).unwrap().run().unwrap();

    assert!(schema.inventory.iter().all(|r| r.on_hand_units == 0));
    assert_eq!(metrics::stockout_days(&schema.inventory), cfg.day_count());
}

#[test]
fn unknown_members_in_sales_are_ignored() {
    let cfg = GenConfig::default_test();
    let dims = dims_for(&cfg);
    let outside = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
    let noise = vec![
        sale(outside, "SKU-00001", "Store-001", 50),
        sale(cfg.start_date, "SKU-99999", "Store-001", 50),
        sale(cfg.start_date, "SKU-00001", "Store-999", 50),
    ];
    assert_eq!(simulate(&cfg, &dims, &[]), simulate(&cfg, &dims, &noise));
}
