//! Dimension tables: Date, SKU, Store and Channel.
//!
//! Dimensions are created once per run and never mutated afterwards.
//! SKU and store attributes each draw from their own stream, so
//! resizing one dimension never changes the other.

use crate::{
    calendar,
    catalog::{Brand, Category, Channel, Region},
    config::GenConfig,
    error::{GenError, GenResult},
    rng::{RngBank, StreamRng, StreamSlot},
    types::{round_money, round_rate, SkuId, StoreId},
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DateRow {
    pub date:         NaiveDate,
    pub year:         i32,
    pub month:        u32,
    pub month_name:   String,
    pub week_of_year: u32,
    pub week_start:   NaiveDate,
    pub day_name:     String,
}

impl DateRow {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            date,
            year:         date.year(),
            month:        date.month(),
            month_name:   calendar::month_name(date),
            week_of_year: calendar::iso_week(date),
            week_start:   calendar::week_start(date),
            day_name:     calendar::day_name(date),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SkuRow {
    #[serde(rename = "SKU")]
    pub sku:              SkuId,
    pub category:         Category,
    pub brand:            Brand,
    pub base_price:       f64,
    pub base_margin_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct StoreRow {
    pub store:  StoreId,
    pub region: Region,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ChannelRow {
    pub channel: Channel,
}

/// The four dimension tables of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimensions {
    pub dates:    Vec<DateRow>,
    pub skus:     Vec<SkuRow>,
    pub stores:   Vec<StoreRow>,
    pub channels: Vec<ChannelRow>,
}

pub struct DimensionGenerator;

impl DimensionGenerator {
    /// Build all four dimensions for `config`, drawing SKU and store
    /// attributes from their dedicated streams in `bank`.
    pub fn build(config: &GenConfig, bank: &RngBank) -> GenResult<Dimensions> {
        let dates = Self::date_dimension(config.start_date, config.end_date)?;
        let skus = Self::sku_dimension(config.n_skus, &mut bank.for_stream(StreamSlot::SkuAttributes))?;
        let stores =
            Self::store_dimension(config.n_stores, &mut bank.for_stream(StreamSlot::StoreAttributes))?;

        log::info!(
            "dimensions: {} dates, {} skus, {} stores",
            dates.len(),
            skus.len(),
            stores.len()
        );

        Ok(Dimensions {
            dates,
            skus,
            stores,
            channels: Self::channel_dimension(),
        })
    }

    pub fn date_dimension(start: NaiveDate, end: NaiveDate) -> GenResult<Vec<DateRow>> {
        if end < start {
            return Err(GenError::InvalidConfiguration(format!(
                "end_date {end} is before start_date {start}"
            )));
        }
        Ok(calendar::date_range(start, end)
            .into_iter()
            .map(DateRow::from_date)
            .collect())
    }

    pub fn sku_dimension(n_skus: usize, rng: &mut StreamRng) -> GenResult<Vec<SkuRow>> {
        if n_skus == 0 {
            return Err(GenError::InvalidConfiguration("n_skus must be positive".into()));
        }

        // Categories for every SKU first, then brands, then economics.
        let categories: Vec<Category> = (0..n_skus).map(|_| *rng.pick(&Category::ALL)).collect();
        let brands: Vec<Brand> = (0..n_skus).map(|_| *rng.pick(&Brand::ALL)).collect();

        let rows = categories
            .into_iter()
            .zip(brands)
            .enumerate()
            .map(|(i, (category, brand))| {
                let (price_lo, price_hi) = category.price_range();
                let base_price = rng.uniform(price_lo, price_hi);
                let (margin_lo, margin_hi) = category.margin_range();
                let base_margin_rate = rng.uniform(margin_lo, margin_hi);
                SkuRow {
                    sku: format!("SKU-{:05}", i + 1),
                    category,
                    brand,
                    base_price: round_money(base_price),
                    base_margin_rate: round_rate(base_margin_rate),
                }
            })
            .collect();
        Ok(rows)
    }

    pub fn store_dimension(n_stores: usize, rng: &mut StreamRng) -> GenResult<Vec<StoreRow>> {
        if n_stores == 0 {
            return Err(GenError::InvalidConfiguration("n_stores must be positive".into()));
        }
        Ok((0..n_stores)
            .map(|i| StoreRow {
                store:  format!("Store-{:03}", i + 1),
                region: *rng.pick(&Region::ALL),
            })
            .collect())
    }

    pub fn channel_dimension() -> Vec<ChannelRow> {
        Channel::ALL.iter().map(|&channel| ChannelRow { channel }).collect()
    }
}
