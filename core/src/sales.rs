//! Sales fact generation, one synthetic order line per order.
//!
//! Lines are independent of each other. Every line draws, in order:
//! date, SKU, store, channel, units, price noise, promo flag,
//! promo depth (only when promoted), margin noise, return roll.
//! The persisted UnitPrice and DiscountRate are re-derived from the
//! rounded Sales and DiscountAmt, so they always back out exactly.

use crate::{
    catalog::Channel,
    dimension::Dimensions,
    error::{GenError, GenResult},
    rng::StreamRng,
    types::{round_money, round_rate, safe_ratio, OrderId, SkuId, StoreId},
};
use chrono::NaiveDate;
use rand_distr::Normal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const UNITS_MIN: u32 = 1;
pub const UNITS_MAX: u32 = 8;

pub const PRICE_NOISE_SD: f64 = 0.06;
pub const PRICE_NOISE_CLIP: (f64, f64) = (0.75, 1.35);

pub const PROMO_PROBABILITY: f64 = 0.25;
pub const PROMO_DEPTH_RANGE: (f64, f64) = (0.05, 0.30);
pub const MAX_DISCOUNT_RATE: f64 = 0.45;

pub const MARGIN_NOISE_SD: f64 = 0.03;
pub const MARGIN_NOISE_CLIP: (f64, f64) = (0.85, 1.20);

pub const FIT_RETURN_BUMP: f64 = 0.02;
pub const MAX_RETURN_PROBABILITY: f64 = 0.20;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SalesRow {
    pub order_date:       NaiveDate,
    #[serde(rename = "OrderID")]
    pub order_id:         OrderId,
    #[serde(rename = "SKU")]
    pub sku:              SkuId,
    pub store:            StoreId,
    pub channel:          Channel,
    pub units:            u32,
    /// Net sales after discount.
    pub sales:            f64,
    pub discount_amt:     f64,
    pub gross_margin_amt: f64,
    #[serde(serialize_with = "flag_as_int", deserialize_with = "flag_from_str")]
    pub return_flag:      bool,
    pub unit_price:       f64,
    pub discount_rate:    f64,
}

impl SalesRow {
    /// Pre-discount sales backed out of the persisted amounts.
    pub fn gross_sales(&self) -> f64 {
        self.sales + self.discount_amt
    }
}

/// Draws order lines using the dimension tables as sampling domains.
pub struct SalesFactGenerator<'a> {
    dims:         &'a Dimensions,
    price_noise:  Normal<f64>,
    margin_noise: Normal<f64>,
}

impl<'a> SalesFactGenerator<'a> {
    pub fn new(dims: &'a Dimensions) -> GenResult<Self> {
        if dims.dates.is_empty() || dims.skus.is_empty() || dims.stores.is_empty() {
            return Err(GenError::InvalidConfiguration(
                "sales generation needs non-empty date, sku and store dimensions".into(),
            ));
        }
        let price_noise = Normal::new(1.0, PRICE_NOISE_SD)
            .map_err(|e| GenError::InvalidConfiguration(format!("price noise: {e}")))?;
        let margin_noise = Normal::new(1.0, MARGIN_NOISE_SD)
            .map_err(|e| GenError::InvalidConfiguration(format!("margin noise: {e}")))?;
        Ok(Self { dims, price_noise, margin_noise })
    }

    /// Produce `n_orders` order lines with ids `ORD-00000001` onwards.
    pub fn generate(&self, n_orders: usize, rng: &mut StreamRng) -> GenResult<Vec<SalesRow>> {
        if n_orders == 0 {
            return Err(GenError::InvalidConfiguration("n_orders must be positive".into()));
        }
        let rows: Vec<SalesRow> = (1..=n_orders).map(|ordinal| self.draw_line(ordinal, rng)).collect();

        let returns = rows.iter().filter(|r| r.return_flag).count();
        log::info!("sales: generated {} order lines ({returns} returns)", rows.len());
        Ok(rows)
    }

    fn draw_line(&self, ordinal: usize, rng: &mut StreamRng) -> SalesRow {
        let order_date = rng.pick(&self.dims.dates).date;
        let sku = rng.pick(&self.dims.skus);
        let store = rng.pick(&self.dims.stores);
        let channel = if rng.chance(Channel::ONLINE_SHARE) {
            Channel::Online
        } else {
            Channel::Store
        };
        let units = rng.int_inclusive(UNITS_MIN, UNITS_MAX);

        let (price_lo, price_hi) = PRICE_NOISE_CLIP;
        let unit_price = sku.base_price * rng.normal_clipped(&self.price_noise, price_lo, price_hi);
        let gross_sales = unit_price * units as f64;

        let promo_depth = if rng.chance(PROMO_PROBABILITY) {
            rng.uniform(PROMO_DEPTH_RANGE.0, PROMO_DEPTH_RANGE.1)
        } else {
            0.0
        };
        let discount_rate = (channel.base_discount_rate() + promo_depth).clamp(0.0, MAX_DISCOUNT_RATE);
        let discount_amt = gross_sales * discount_rate;
        let net_sales = gross_sales - discount_amt;

        let (gm_lo, gm_hi) = MARGIN_NOISE_CLIP;
        let gross_margin_amt =
            net_sales * sku.base_margin_rate * rng.normal_clipped(&self.margin_noise, gm_lo, gm_hi);

        let mut return_probability = channel.base_return_probability();
        if sku.category.is_fit_sensitive() {
            return_probability += FIT_RETURN_BUMP;
        }
        let return_flag = rng.chance(return_probability.clamp(0.0, MAX_RETURN_PROBABILITY));

        let mut row = SalesRow {
            order_date,
            order_id: format!("ORD-{ordinal:08}"),
            sku: sku.sku.clone(),
            store: store.store.clone(),
            channel,
            units,
            sales: round_money(net_sales),
            discount_amt: round_money(discount_amt),
            gross_margin_amt: round_money(gross_margin_amt),
            return_flag,
            unit_price: 0.0,
            discount_rate: 0.0,
        };
        let gross = row.gross_sales();
        row.unit_price = round_rate(gross / units as f64);
        row.discount_rate = round_rate(safe_ratio(row.discount_amt, gross));
        row
    }
}

fn flag_as_int<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*flag))
}

/// Accepts "1"/"0" as written by this crate, plus "true"/"false".
fn flag_from_str<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let s = String::deserialize(deserializer)?;
    match s.trim().to_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected 0/1 return flag, got '{other}'"
        ))),
    }
}
