//! merch-runner: headless generator and report builder for the
//! merchandising star schema.
//!
//! Usage:
//!   merch-runner generate --seed 42 --rows-orders 30000 --out-dir data_out
//!   merch-runner report --data-dir data_out

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use merchsim_core::{
    config::{GenConfig, ReportPaths},
    engine::DatasetEngine,
    report,
    tables::TableStore,
};

#[derive(Parser, Debug)]
#[command(name = "merch-runner")]
#[command(about = "Generate a merchandising star schema and its KPI report")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the six CSV tables
    Generate(GenerateArgs),
    /// Validate the tables and write the markdown artifacts
    Report(ReportArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// JSON file with generation settings; flags below override it
    #[arg(long)]
    config: Option<String>,

    /// First calendar date (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Last calendar date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// Number of SKUs
    #[arg(long)]
    n_skus: Option<usize>,

    /// Number of stores
    #[arg(long)]
    n_stores: Option<usize>,

    /// Number of orders (FactSales rows)
    #[arg(long)]
    rows_orders: Option<usize>,

    /// Random seed for deterministic generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output folder for CSV files
    #[arg(short, long)]
    out_dir: Option<String>,
}

impl GenerateArgs {
    fn resolve(self) -> Result<GenConfig> {
        let mut cfg = match &self.config {
            Some(path) => GenConfig::load(path)?,
            None => GenConfig::default(),
        };
        if let Some(v) = self.start_date {
            cfg.start_date = v;
        }
        if let Some(v) = self.end_date {
            cfg.end_date = v;
        }
        if let Some(v) = self.n_skus {
            cfg.n_skus = v;
        }
        if let Some(v) = self.n_stores {
            cfg.n_stores = v;
        }
        if let Some(v) = self.rows_orders {
            cfg.n_orders = v;
        }
        if let Some(v) = self.seed {
            cfg.seed = v;
        }
        if let Some(v) = self.out_dir {
            cfg.out_dir = v;
        }
        Ok(cfg)
    }
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[arg(long, default_value = "data_out")]
    data_dir: String,

    #[arg(long, default_value = "reports/merch_kpi_report.md")]
    report_path: String,

    #[arg(long, default_value = "reports/metric_definitions.md")]
    defs_path: String,

    #[arg(long, default_value = "docs/one_pager.md")]
    one_pager_path: String,
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Generate(args) => generate(args.resolve()?),
        Command::Report(args) => build_report(ReportPaths {
            data_dir:       args.data_dir,
            report_path:    args.report_path,
            defs_path:      args.defs_path,
            one_pager_path: args.one_pager_path,
        }),
    }
}

fn generate(cfg: GenConfig) -> Result<()> {
    let engine = DatasetEngine::new(cfg)?;
    let schema = engine.run()?;
    let written = TableStore::new(&engine.config.out_dir).write_dataset(&schema)?;

    println!("Generated merchandising dataset:");
    for (path, rows) in written {
        println!("- {} ({rows} rows)", path.display());
    }
    Ok(())
}

fn build_report(paths: ReportPaths) -> Result<()> {
    let metrics = report::build_artifacts(&paths)?;
    log::debug!("report built with {} orders", metrics.kpis.orders);

    println!("Artifacts generated:");
    println!("- {}", paths.report_path);
    println!("- {}", paths.defs_path);
    println!("- {}", paths.one_pager_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "merch-runner",
            "generate",
            "--n-skus",
            "12",
            "--rows-orders",
            "500",
            "--start-date",
            "2024-03-01",
            "-s",
            "7",
        ])
        .unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate subcommand");
        };
        let cfg = args.resolve().unwrap();
        assert_eq!(cfg.n_skus, 12);
        assert_eq!(cfg.n_orders, 500);
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.start_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(cfg.n_stores, GenConfig::default().n_stores);
        assert_eq!(cfg.out_dir, "data_out");
    }
}
