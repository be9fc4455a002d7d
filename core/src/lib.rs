//! Synthetic merchandising star-schema generator and KPI toolkit.
//!
//! Pipeline: dimensions → sales fact → inventory snapshot simulation
//! → CSV tables → validation → metrics → markdown report.

pub mod calendar;
pub mod catalog;
pub mod config;
pub mod dimension;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod metrics;
pub mod report;
pub mod rng;
pub mod sales;
pub mod tables;
pub mod types;
pub mod validate;
