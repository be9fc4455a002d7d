//! The generation pipeline.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Configuration check      (fails fast, before any draws)
//!   2. Dimensions               (sku_attributes, store_attributes streams)
//!   3. Sales fact               (sales stream)
//!   4. Inventory snapshot fact  (inventory stream)
//!
//! RULES:
//!   - Each stage reads only the output of earlier stages.
//!   - All randomness flows through the RngBank, one stream per stage.

use crate::{
    config::GenConfig,
    dimension::{DimensionGenerator, Dimensions},
    error::GenResult,
    inventory::{InventoryRow, InventorySnapshotSimulator},
    rng::{RngBank, StreamSlot},
    sales::{SalesFactGenerator, SalesRow},
};

/// The complete generated dataset: four dimensions and two facts.
#[derive(Debug, Clone, PartialEq)]
pub struct StarSchema {
    pub dims:      Dimensions,
    pub sales:     Vec<SalesRow>,
    pub inventory: Vec<InventoryRow>,
}

pub struct DatasetEngine {
    pub config:   GenConfig,
    pub rng_bank: RngBank,
}

impl DatasetEngine {
    /// Rejects invalid configuration before anything is generated.
    pub fn new(config: GenConfig) -> GenResult<Self> {
        config.validate()?;
        Ok(Self {
            rng_bank: RngBank::new(config.seed),
            config,
        })
    }

    /// Build the whole star schema in one batch pass. Streams are
    /// re-derived from the seed on every call, so repeated runs agree.
    pub fn run(&self) -> GenResult<StarSchema> {
        log::info!(
            "generating: {}..{} seed={} skus={} stores={} orders={}",
            self.config.start_date,
            self.config.end_date,
            self.config.seed,
            self.config.n_skus,
            self.config.n_stores,
            self.config.n_orders
        );

        let dims = DimensionGenerator::build(&self.config, &self.rng_bank)?;

        let mut sales_rng = self.rng_bank.for_stream(StreamSlot::Sales);
        let sales = SalesFactGenerator::new(&dims)?.generate(self.config.n_orders, &mut sales_rng)?;

        let mut inventory_rng = self.rng_bank.for_stream(StreamSlot::Inventory);
        let inventory = InventorySnapshotSimulator::new(&dims, &sales).run(&mut inventory_rng);

        Ok(StarSchema { dims, sales, inventory })
    }
}
