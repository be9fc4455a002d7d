use crate::error::{GenError, GenResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Generation parameters for one run. Every field is optional in the
/// JSON file form and falls back to the values in `Default`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenConfig {
    pub start_date: NaiveDate,
    pub end_date:   NaiveDate,
    pub n_skus:     usize,
    pub n_stores:   usize,
    pub n_orders:   usize,
    pub seed:       u64,
    pub out_dir:    String,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            start_date: ymd(2024, 1, 1),
            end_date:   ymd(2024, 12, 31),
            n_skus:     250,
            n_stores:   30,
            n_orders:   30_000,
            seed:       42,
            out_dir:    "data_out".into(),
        }
    }
}

impl GenConfig {
    /// Load from a JSON file. Fields absent from the file keep their defaults.
    pub fn load(path: &str) -> GenResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GenConfig = serde_json::from_str(&content)?;
        log::debug!("loaded generation config from {path}");
        Ok(config)
    }

    /// Small run used throughout the test suite: two full weeks
    /// starting on a Monday.
    pub fn default_test() -> Self {
        Self {
            start_date: ymd(2024, 1, 1),
            end_date:   ymd(2024, 1, 14),
            n_skus:     5,
            n_stores:   3,
            n_orders:   100,
            seed:       42,
            out_dir:    "data_out".into(),
        }
    }

    /// Reject configurations that cannot produce a dataset.
    /// Called before any generation work starts.
    pub fn validate(&self) -> GenResult<()> {
        let mut problems = Vec::new();
        if self.n_skus == 0 {
            problems.push("n_skus must be positive".to_string());
        }
        if self.n_stores == 0 {
            problems.push("n_stores must be positive".to_string());
        }
        if self.n_orders == 0 {
            problems.push("n_orders must be positive".to_string());
        }
        if self.end_date < self.start_date {
            problems.push(format!(
                "end_date {} is before start_date {}",
                self.end_date, self.start_date
            ));
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(GenError::InvalidConfiguration(problems.join("; ")))
        }
    }

    /// Number of calendar days in the inclusive range.
    pub fn day_count(&self) -> usize {
        ((self.end_date - self.start_date).num_days() + 1).max(0) as usize
    }
}

/// Output locations for the report build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportPaths {
    pub data_dir:       String,
    pub report_path:    String,
    pub defs_path:      String,
    pub one_pager_path: String,
}

impl Default for ReportPaths {
    fn default() -> Self {
        Self {
            data_dir:       "data_out".into(),
            report_path:    "reports/merch_kpi_report.md".into(),
            defs_path:      "reports/metric_definitions.md".into(),
            one_pager_path: "docs/one_pager.md".into(),
        }
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GenConfig::default().validate().is_ok());
        assert!(GenConfig::default_test().validate().is_ok());
        assert_eq!(GenConfig::default().day_count(), 366);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: GenConfig = serde_json::from_str(r#"{ "n_skus": 12, "seed": 7 }"#).unwrap();
        assert_eq!(cfg.n_skus, 12);
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.n_stores, 30);
        assert_eq!(cfg.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn every_problem_is_reported() {
        let cfg = GenConfig {
            n_skus: 0,
            n_orders: 0,
            end_date: NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
            ..GenConfig::default()
        };
        match cfg.validate() {
            Err(GenError::InvalidConfiguration(msg)) => {
                assert!(msg.contains("n_skus"));
                assert!(msg.contains("n_orders"));
                assert!(msg.contains("before start_date"));
                assert!(!msg.contains("n_stores"));
            }
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let err = GenConfig::load("/nonexistent/merchsim.json").unwrap_err();
        assert!(matches!(err, GenError::Io(_)));
    }
}
