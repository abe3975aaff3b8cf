// 📤 Flat-file export - one CSV per base table, and back
//
// Header row = field names of the entity, written even for empty tables so
// every file is self-describing. Dates are ISO-8601, categories use their
// display names, prices keep full f64 precision.

use crate::entities::{Customer, Dataset, Order, Product, Table};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct Exporter {
    dir: PathBuf,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Exporter { dir: dir.into() }
    }

    pub fn path_for(&self, table: Table) -> PathBuf {
        self.dir.join(table.csv_file_name())
    }

    /// Write customers.csv, products.csv and orders.csv; returns the paths written
    pub fn to_flat_files(&self, dataset: &Dataset) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create export directory {}", self.dir.display()))?;

        let paths = vec![
            write_table(&self.path_for(Table::Customers), Table::Customers, &dataset.customers)?,
            write_table(&self.path_for(Table::Products), Table::Products, &dataset.products)?,
            write_table(&self.path_for(Table::Orders), Table::Orders, &dataset.orders)?,
        ];

        info!(
            dir = %self.dir.display(),
            rows = dataset.total_rows(),
            "exported base tables to CSV"
        );
        Ok(paths)
    }

    /// Read the three CSV files back
    pub fn load_flat_files(&self) -> Result<Dataset> {
        Ok(Dataset {
            customers: read_table::<Customer>(&self.path_for(Table::Customers))?,
            products: read_table::<Product>(&self.path_for(Table::Products))?,
            orders: read_table::<Order>(&self.path_for(Table::Orders))?,
        })
    }
}

fn write_table<T: Serialize>(path: &Path, table: Table, rows: &[T]) -> Result<PathBuf> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    wtr.write_record(table.columns())?;
    for row in rows {
        wtr.serialize(row)
            .with_context(|| format!("Failed to write {} row", table))?;
    }
    wtr.flush()?;

    Ok(path.to_path_buf())
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file {}", path.display()))?;

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: T = result.with_context(|| format!("Failed to deserialize row in {}", path.display()))?;
        rows.push(row);
    }

    Ok(rows)
}
