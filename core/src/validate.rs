//! Batched validation of loaded tables.
//!
//! Every violation across every table is collected before the caller
//! decides to fail, so one pass reports the complete picture.

use crate::tables::{RawTable, RawTables};
use std::fmt;

pub const DIM_DATE_COLUMNS: &[&str] =
    &["Date", "Year", "Month", "MonthName", "WeekOfYear", "WeekStart", "DayName"];
pub const DIM_SKU_COLUMNS: &[&str] = &["SKU", "Category", "Brand", "BasePrice", "BaseMarginRate"];
pub const DIM_STORE_COLUMNS: &[&str] = &["Store", "Region"];
pub const DIM_CHANNEL_COLUMNS: &[&str] = &["Channel"];
pub const FACT_SALES_COLUMNS: &[&str] = &[
    "OrderDate",
    "OrderID",
    "SKU",
    "Store",
    "Channel",
    "Units",
    "Sales",
    "DiscountAmt",
    "GrossMarginAmt",
    "ReturnFlag",
    "UnitPrice",
    "DiscountRate",
];
pub const FACT_INVENTORY_COLUMNS: &[&str] = &["SnapshotDate", "SKU", "Store", "OnHandUnits"];

const DIM_SKU_NUMERIC: &[&str] = &["BasePrice", "BaseMarginRate"];
const FACT_SALES_NUMERIC: &[&str] =
    &["Units", "Sales", "DiscountAmt", "GrossMarginAmt", "UnitPrice", "DiscountRate"];
const FACT_INVENTORY_NUMERIC: &[&str] = &["OnHandUnits"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    MissingColumn {
        table:   String,
        columns: Vec<String>,
    },
    NonNumeric {
        table:  String,
        column: String,
        rows:   usize,
    },
    NegativeValue {
        table:  String,
        column: String,
        rows:   usize,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumn { table, columns } => {
                write!(f, "{table} missing columns: [{}]", columns.join(", "))
            }
            Self::NonNumeric { table, column, rows } => {
                write!(f, "{table} has non-numeric {column} ({rows} rows)")
            }
            Self::NegativeValue { table, column, rows } => {
                write!(f, "{table} has negative {column} ({rows} rows)")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.violations.iter().map(|v| format!("- {v}")).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

/// Check required columns on all six tables, that numeric columns
/// parse, and non-negativity of Units, Sales and OnHandUnits.
pub fn validate_tables(tables: &RawTables) -> ValidationReport {
    let mut violations = Vec::new();

    require_columns(&tables.dim_date, DIM_DATE_COLUMNS, &mut violations);
    require_columns(&tables.dim_sku, DIM_SKU_COLUMNS, &mut violations);
    require_columns(&tables.dim_store, DIM_STORE_COLUMNS, &mut violations);
    require_columns(&tables.dim_channel, DIM_CHANNEL_COLUMNS, &mut violations);
    require_columns(&tables.fact_sales, FACT_SALES_COLUMNS, &mut violations);
    require_columns(&tables.fact_inventory, FACT_INVENTORY_COLUMNS, &mut violations);

    require_numeric(&tables.dim_sku, DIM_SKU_NUMERIC, &mut violations);
    require_numeric(&tables.fact_sales, FACT_SALES_NUMERIC, &mut violations);
    require_numeric(&tables.fact_inventory, FACT_INVENTORY_NUMERIC, &mut violations);

    require_non_negative(&tables.fact_sales, "Units", &mut violations);
    require_non_negative(&tables.fact_sales, "Sales", &mut violations);
    require_non_negative(&tables.fact_inventory, "OnHandUnits", &mut violations);

    for v in &violations {
        log::warn!("validation: {v}");
    }
    ValidationReport { violations }
}

fn require_columns(table: &RawTable, required: &[&str], out: &mut Vec<Violation>) {
    let missing: Vec<String> = required
        .iter()
        .filter(|c| table.column_index(c).is_none())
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        out.push(Violation::MissingColumn {
            table:   table.name.to_string(),
            columns: missing,
        });
    }
}

fn numeric_cells<'a>(table: &'a RawTable, idx: usize) -> impl Iterator<Item = Option<f64>> + 'a {
    table
        .records
        .iter()
        .map(move |r| r.get(idx).and_then(|cell| cell.trim().parse::<f64>().ok()))
}

/// Absent columns are reported by `require_columns`.
fn require_numeric(table: &RawTable, columns: &[&str], out: &mut Vec<Violation>) {
    for &column in columns {
        let Some(idx) = table.column_index(column) else {
            continue;
        };
        let rows = numeric_cells(table, idx).filter(Option::is_none).count();
        if rows > 0 {
            out.push(Violation::NonNumeric {
                table:  table.name.to_string(),
                column: column.to_string(),
                rows,
            });
        }
    }
}

/// Unparseable cells are already counted by `require_numeric`.
fn require_non_negative(table: &RawTable, column: &str, out: &mut Vec<Violation>) {
    let Some(idx) = table.column_index(column) else {
        return;
    };
    let rows = numeric_cells(table, idx).flatten().filter(|v| *v < 0.0).count();
    if rows > 0 {
        out.push(Violation::NegativeValue {
            table:  table.name.to_string(),
            column: column.to_string(),
            rows,
        });
    }
}
