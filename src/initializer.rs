// 🔧 Store Initializer - fresh schema + bulk load
//
// Idempotent: every call drops and recreates the three tables before
// loading, so running it twice leaves exactly one copy of the dataset.
// Any failure here is a storage error and aborts the run.

use crate::db::SqliteStore;
use crate::entities::{Dataset, Table};
use crate::error::StoreError;
use crate::store::RelationalStore;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    pub backend: String,
    pub customers: i64,
    pub products: i64,
    pub orders: i64,
}

impl LoadReport {
    pub fn matches(&self, dataset: &Dataset) -> bool {
        self.customers == dataset.customers.len() as i64
            && self.products == dataset.products.len() as i64
            && self.orders == dataset.orders.len() as i64
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} customers, {} products, {} orders",
            self.backend, self.customers, self.products, self.orders
        )
    }
}

pub struct StoreInitializer;

impl StoreInitializer {
    /// Drop and recreate the schema, then load the dataset in one batch
    pub fn reset_and_load(
        store: &mut dyn RelationalStore,
        dataset: &Dataset,
    ) -> Result<LoadReport, StoreError> {
        store.reset_schema()?;
        store.bulk_load(dataset)?;

        let report = LoadReport {
            backend: store.backend().to_string(),
            customers: store.count(Table::Customers)?,
            products: store.count(Table::Products)?,
            orders: store.count(Table::Orders)?,
        };

        info!(
            backend = %report.backend,
            customers = report.customers,
            products = report.products,
            orders = report.orders,
            "store initialized"
        );
        Ok(report)
    }

    /// Primary store variant: the database file itself is deleted first
    pub fn recreate_sqlite(
        path: &Path,
        dataset: &Dataset,
    ) -> Result<(SqliteStore, LoadReport), StoreError> {
        let mut store = SqliteStore::create_fresh(path)?;
        let report = Self::reset_and_load(&mut store, dataset)?;
        Ok((store, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::DataGenerator;
    use chrono::NaiveDate;

    fn sample_dataset() -> Dataset {
        DataGenerator::seeded(11, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()).dataset(10, 5, 40)
    }

    #[test]
    fn test_reset_and_load_twice_keeps_one_copy() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let dataset = sample_dataset();

        let first = StoreInitializer::reset_and_load(&mut store, &dataset).unwrap();
        let second = StoreInitializer::reset_and_load(&mut store, &dataset).unwrap();

        assert!(first.matches(&dataset));
        assert_eq!(first, second);
        assert_eq!(store.load_dataset().unwrap(), dataset);
        println!("✅ {}", second.summary());
    }

    #[test]
    fn test_invalid_dataset_is_fatal() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut dataset = sample_dataset();
        dataset.orders[0].product_id = 999;

        assert!(StoreInitializer::reset_and_load(&mut store, &dataset).is_err());
    }

    #[test]
    fn test_recreate_sqlite_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ecommerce.db");
        let dataset = sample_dataset();

        let (_, report) = StoreInitializer::recreate_sqlite(&path, &dataset).unwrap();
        assert!(report.matches(&dataset));

        // Smaller dataset replaces, not appends
        let smaller = Dataset::new(dataset.customers.clone(), dataset.products.clone(), Vec::new());
        let (mut store, report) = StoreInitializer::recreate_sqlite(&path, &smaller).unwrap();
        assert_eq!(report.orders, 0);
        assert_eq!(store.count(Table::Customers).unwrap(), 10);
    }

    #[test]
    fn test_unwritable_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("nested").join("ecommerce.db");
        assert!(StoreInitializer::recreate_sqlite(&path, &sample_dataset()).is_err());
    }
}
