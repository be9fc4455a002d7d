//! Inventory snapshot simulation: the stateful part of the generator.
//!
//! EXECUTION ORDER (fixed, never reordered):
//!   0. Draw initial on-hand for every (sku, store) cell.
//!   For each calendar date, strictly ascending:
//!   1. Replenishment (Mondays only).
//!   2. Depletion by that day's units sold, floored at zero.
//!   3. Emit one snapshot row per cell.
//!
//! RULES:
//!   - A date step sees the cumulative effect of every earlier date
//!     and nothing later.
//!   - No cell's update reads another cell.
//!   - Demand beyond on-hand is lost, never backordered.

use crate::{
    calendar,
    dimension::Dimensions,
    error::{GenError, GenResult},
    rng::StreamRng,
    sales::SalesRow,
    types::{SkuId, SkuIdx, StoreId, StoreIdx},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const INITIAL_ON_HAND_RANGE: (u32, u32) = (20, 200);
pub const REPLENISHMENT_PROBABILITY: f64 = 0.25;
pub const REPLENISHMENT_UNITS_RANGE: (u32, u32) = (20, 120);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct InventoryRow {
    pub snapshot_date:  NaiveDate,
    #[serde(rename = "SKU")]
    pub sku:            SkuId,
    pub store:          StoreId,
    pub on_hand_units:  u32,
}

/// Units sold per (date, sku, store), dense and zero by default.
/// Laid out date-major so one date's demand is a contiguous slice
/// in the same cell order as `InventoryState`.
#[derive(Debug, Clone)]
pub struct DailyDemand {
    n_cells: usize,
    units:   Vec<u32>,
}

impl DailyDemand {
    /// Sum sales units per day per cell. Lines whose date, SKU or store
    /// is outside the dimensions contribute nothing.
    pub fn from_sales(dims: &Dimensions, sales: &[SalesRow]) -> Self {
        let n_stores = dims.stores.len();
        let n_cells = dims.skus.len() * n_stores;
        let mut units = vec![0u32; dims.dates.len() * n_cells];

        let date_idx: HashMap<NaiveDate, usize> =
            dims.dates.iter().enumerate().map(|(i, d)| (d.date, i)).collect();
        let sku_idx: HashMap<&str, SkuIdx> =
            dims.skus.iter().enumerate().map(|(i, s)| (s.sku.as_str(), i)).collect();
        let store_idx: HashMap<&str, StoreIdx> =
            dims.stores.iter().enumerate().map(|(i, s)| (s.store.as_str(), i)).collect();

        let mut skipped = 0usize;
        for line in sales {
            let (Some(&d), Some(&k), Some(&s)) = (
                date_idx.get(&line.order_date),
                sku_idx.get(line.sku.as_str()),
                store_idx.get(line.store.as_str()),
            ) else {
                skipped += 1;
                continue;
            };
            let slot = &mut units[d * n_cells + k * n_stores + s];
            *slot = slot.saturating_add(line.units);
        }
        if skipped > 0 {
            log::warn!("demand: {skipped} sales lines reference unknown dimension members");
        }

        Self { n_cells, units }
    }

    /// Demand for the date at position `date_idx`, one entry per cell.
    pub fn for_day(&self, date_idx: usize) -> &[u32] {
        &self.units[date_idx * self.n_cells..(date_idx + 1) * self.n_cells]
    }
}

/// On-hand units for every (sku, store) cell, sku-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryState {
    n_skus:   usize,
    n_stores: usize,
    on_hand:  Vec<u32>,
}

impl InventoryState {
    /// The notional day-0 state before the first calendar date.
    pub fn initial(n_skus: usize, n_stores: usize, rng: &mut StreamRng) -> Self {
        let (lo, hi) = INITIAL_ON_HAND_RANGE;
        let on_hand = (0..n_skus * n_stores).map(|_| rng.int_inclusive(lo, hi)).collect();
        Self { n_skus, n_stores, on_hand }
    }

    pub fn from_cells(n_skus: usize, n_stores: usize, on_hand: Vec<u32>) -> GenResult<Self> {
        if on_hand.len() != n_skus * n_stores {
            return Err(GenError::InvalidConfiguration(format!(
                "expected {} cells, got {}",
                n_skus * n_stores,
                on_hand.len()
            )));
        }
        Ok(Self { n_skus, n_stores, on_hand })
    }

    pub fn get(&self, sku: SkuIdx, store: StoreIdx) -> u32 {
        self.on_hand[sku * self.n_stores + store]
    }

    pub fn cells(&self) -> &[u32] {
        &self.on_hand
    }

    pub fn total(&self) -> u64 {
        self.on_hand.iter().map(|&u| u as u64).sum()
    }

    /// Advance one calendar date and return the next state.
    ///
    /// On a replenishment day every cell consumes exactly two draws
    /// (selection roll, then quantity), so the stream position after a
    /// Monday does not depend on which cells were selected.
    pub fn apply_day(mut self, date: NaiveDate, demand: &[u32], rng: &mut StreamRng) -> Self {
        debug_assert_eq!(demand.len(), self.on_hand.len());

        if calendar::is_replenishment_day(date) {
            let (lo, hi) = REPLENISHMENT_UNITS_RANGE;
            let mut replenished = 0usize;
            for cell in self.on_hand.iter_mut() {
                let selected = rng.chance(REPLENISHMENT_PROBABILITY);
                let qty = rng.int_inclusive(lo, hi);
                if selected {
                    *cell = cell.saturating_add(qty);
                    replenished += 1;
                }
            }
            log::debug!("{date}: replenished {replenished}/{} cells", self.on_hand.len());
        }

        for (cell, &sold) in self.on_hand.iter_mut().zip(demand) {
            *cell = cell.saturating_sub(sold);
        }
        self
    }
}

/// Walks the date axis and materialises the inventory snapshot fact.
pub struct InventorySnapshotSimulator<'a> {
    dims:   &'a Dimensions,
    demand: DailyDemand,
}

impl<'a> InventorySnapshotSimulator<'a> {
    pub fn new(dims: &'a Dimensions, sales: &[SalesRow]) -> Self {
        Self {
            dims,
            demand: DailyDemand::from_sales(dims, sales),
        }
    }

    /// Run the full simulation. Emits exactly
    /// `dates × skus × stores` rows, date-major then sku then store.
    pub fn run(&self, rng: &mut StreamRng) -> Vec<InventoryRow> {
        let n_skus = self.dims.skus.len();
        let n_stores = self.dims.stores.len();
        let mut rows = Vec::with_capacity(self.dims.dates.len() * n_skus * n_stores);

        let mut state = InventoryState::initial(n_skus, n_stores, rng);
        if !self.dims.dates.iter().any(|d| calendar::is_replenishment_day(d.date)) {
            log::warn!("inventory: date range contains no Monday, no replenishment will occur");
        }

        for (date_idx, day) in self.dims.dates.iter().enumerate() {
            state = state.apply_day(day.date, self.demand.for_day(date_idx), rng);
            self.emit(day.date, &state, &mut rows);
        }

        log::info!(
            "inventory: emitted {} snapshot rows, closing on-hand {}",
            rows.len(),
            state.total()
        );
        rows
    }

    fn emit(&self, date: NaiveDate, state: &InventoryState, rows: &mut Vec<InventoryRow>) {
        for (k, sku) in self.dims.skus.iter().enumerate() {
            for (s, store) in self.dims.stores.iter().enumerate() {
                rows.push(InventoryRow {
                    snapshot_date: date,
                    sku:           sku.sku.clone(),
                    store:         store.store.clone(),
                    on_hand_units: state.get(k, s),
                });
            }
        }
    }
}
