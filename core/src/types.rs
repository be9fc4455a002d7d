//! Shared primitive types used across the entire generator.

/// Stable SKU identifier, e.g. `SKU-00001`.
pub type SkuId = String;

/// Stable store identifier, e.g. `Store-001`.
pub type StoreId = String;

/// Unique order-line identifier, e.g. `ORD-00000001`.
pub type OrderId = String;

/// Position of a SKU within the SKU dimension.
pub type SkuIdx = usize;

/// Position of a store within the store dimension.
pub type StoreIdx = usize;

/// Round a monetary amount to cents.
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round a rate or ratio to four decimal places.
pub fn round_rate(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Divide, returning 0.0 when the denominator is not positive.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
