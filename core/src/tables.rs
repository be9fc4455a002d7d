//! CSV persistence layer for the six star-schema tables.
//!
//! RULE: Only tables.rs talks to the filesystem for table data.
//! Loading is two-phase: raw string records first (so validation can
//! see every problem), typed rows second.

use crate::{
    dimension::{ChannelRow, DateRow, Dimensions, SkuRow, StoreRow},
    engine::StarSchema,
    error::{GenError, GenResult},
    validate::{self, ValidationReport},
};
use csv::StringRecord;
use serde::{de::DeserializeOwned, Serialize};
use std::{fs::File, io::Read, path::PathBuf};

pub const DIM_DATE: &str = "DimDate";
pub const DIM_SKU: &str = "DimSKU";
pub const DIM_STORE: &str = "DimStore";
pub const DIM_CHANNEL: &str = "DimChannel";
pub const FACT_SALES: &str = "FactSales";
pub const FACT_INVENTORY: &str = "FactInventorySnapshot";

/// A table as read from disk: header plus untyped records.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub name:    &'static str,
    pub headers: StringRecord,
    pub records: Vec<StringRecord>,
}

impl RawTable {
    pub fn from_reader<R: Read>(name: &'static str, reader: R) -> GenResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        let records = rdr.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self { name, headers, records })
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Deserialize every record by header name; column order is free.
    pub fn decode<T: DeserializeOwned>(&self) -> GenResult<Vec<T>> {
        let rows = self
            .records
            .iter()
            .map(|r| r.deserialize(Some(&self.headers)))
            .collect::<Result<Vec<T>, _>>()?;
        Ok(rows)
    }
}

#[derive(Debug, Clone)]
pub struct RawTables {
    pub dim_date:       RawTable,
    pub dim_sku:        RawTable,
    pub dim_store:      RawTable,
    pub dim_channel:    RawTable,
    pub fact_sales:     RawTable,
    pub fact_inventory: RawTable,
}

impl RawTables {
    pub fn validate(&self) -> ValidationReport {
        validate::validate_tables(self)
    }

    pub fn decode(&self) -> GenResult<StarSchema> {
        let mut dates: Vec<DateRow> = self.dim_date.decode()?;
        dates.sort_by_key(|d| d.date);
        Ok(StarSchema {
            dims: Dimensions {
                dates,
                skus:     self.dim_sku.decode::<SkuRow>()?,
                stores:   self.dim_store.decode::<StoreRow>()?,
                channels: self.dim_channel.decode::<ChannelRow>()?,
            },
            sales:     self.fact_sales.decode()?,
            inventory: self.fact_inventory.decode()?,
        })
    }
}

/// Directory holding one CSV file per table.
pub struct TableStore {
    dir: PathBuf,
}

impl TableStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.csv"))
    }

    /// Write all six tables, creating the directory if needed.
    /// Returns each written path with its row count, in table order.
    pub fn write_dataset(&self, schema: &StarSchema) -> GenResult<Vec<(PathBuf, usize)>> {
        std::fs::create_dir_all(&self.dir)?;
        let dims = &schema.dims;
        let written = vec![
            self.write_table(DIM_DATE, validate::DIM_DATE_COLUMNS, &dims.dates)?,
            self.write_table(DIM_SKU, validate::DIM_SKU_COLUMNS, &dims.skus)?,
            self.write_table(DIM_STORE, validate::DIM_STORE_COLUMNS, &dims.stores)?,
            self.write_table(DIM_CHANNEL, validate::DIM_CHANNEL_COLUMNS, &dims.channels)?,
            self.write_table(FACT_SALES, validate::FACT_SALES_COLUMNS, &schema.sales)?,
            self.write_table(FACT_INVENTORY, validate::FACT_INVENTORY_COLUMNS, &schema.inventory)?,
        ];
        for (path, rows) in &written {
            log::info!("wrote {} ({rows} rows)", path.display());
        }
        Ok(written)
    }

    fn write_table<T: Serialize>(
        &self,
        table: &str,
        columns: &[&str],
        rows: &[T],
    ) -> GenResult<(PathBuf, usize)> {
        let path = self.path_for(table);
        let mut wtr = csv::Writer::from_path(&path)?;
        if rows.is_empty() {
            // serde only emits a header alongside the first row
            wtr.write_record(columns)?;
        }
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok((path, rows.len()))
    }

    pub fn load_raw(&self) -> GenResult<RawTables> {
        Ok(RawTables {
            dim_date:       self.read_table(DIM_DATE)?,
            dim_sku:        self.read_table(DIM_SKU)?,
            dim_store:      self.read_table(DIM_STORE)?,
            dim_channel:    self.read_table(DIM_CHANNEL)?,
            fact_sales:     self.read_table(FACT_SALES)?,
            fact_inventory: self.read_table(FACT_INVENTORY)?,
        })
    }

    /// Load, validate and decode. Fails with the full violation list
    /// when any table is malformed.
    pub fn load_validated(&self) -> GenResult<StarSchema> {
        let raw = self.load_raw()?;
        let report = raw.validate();
        if !report.is_ok() {
            return Err(GenError::Validation(report));
        }
        raw.decode()
    }

    fn read_table(&self, table: &'static str) -> GenResult<RawTable> {
        let path = self.path_for(table);
        let file = File::open(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => GenError::MissingTable {
                table,
                path: path.display().to_string(),
            },
            _ => GenError::Io(e),
        })?;
        RawTable::from_reader(table, file)
    }
}
