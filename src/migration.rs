// 🚚 Store Migrator - row-by-row copy between relational stores
//
// Best effort: a row that fails to insert is logged with its table and id,
// recorded, and skipped. The report always carries attempted vs succeeded
// counts so nothing is lost silently. Only failing to read the source (or
// to reset the destination) aborts the migration; a destination that can't
// be read back counts as a failed verification.

use crate::entities::{Customer, Dataset, Order, Product, Table};
use crate::error::StoreError;
use crate::store::RelationalStore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFailure {
    pub table: Table,
    pub row_id: i64,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMigration {
    pub table: Table,
    pub attempted: usize,
    pub succeeded: usize,
}

impl TableMigration {
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationReport {
    pub source_backend: String,
    pub destination_backend: String,
    pub tables: Vec<TableMigration>,
    pub failures: Vec<RowFailure>,
    /// Some(true) when source and destination fingerprints match;
    /// None when verification was not requested
    pub verified: Option<bool>,
}

impl MigrationReport {
    pub fn attempted(&self) -> usize {
        self.tables.iter().map(|t| t.attempted).sum()
    }

    pub fn succeeded(&self) -> usize {
        self.tables.iter().map(|t| t.succeeded).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn table(&self, table: Table) -> Option<&TableMigration> {
        self.tables.iter().find(|t| t.table == table)
    }

    pub fn summary(&self) -> String {
        let verification = match self.verified {
            Some(true) => ", verified",
            Some(false) => ", VERIFICATION MISMATCH",
            None => "",
        };
        format!(
            "{} → {}: {}/{} rows copied, {} failed{}",
            self.source_backend,
            self.destination_backend,
            self.succeeded(),
            self.attempted(),
            self.failures.len(),
            verification
        )
    }
}

// ============================================================================
// MIGRATOR
// ============================================================================

pub struct Migrator {
    /// Drop and recreate the destination tables before copying (default: true)
    pub reset_destination: bool,

    /// Compare content fingerprints after copying (default: true)
    pub verify: bool,
}

impl Default for Migrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Migrator {
    pub fn new() -> Self {
        Migrator {
            reset_destination: true,
            verify: true,
        }
    }

    pub fn with_options(reset_destination: bool, verify: bool) -> Self {
        Migrator {
            reset_destination,
            verify,
        }
    }

    /// Copy every row of every table from `source` to `destination`
    pub fn copy_all(
        &self,
        source: &mut dyn RelationalStore,
        destination: &mut dyn RelationalStore,
    ) -> Result<MigrationReport, StoreError> {
        let dataset = source.load_dataset()?;

        if self.reset_destination {
            destination.reset_schema()?;
        }

        let mut failures = Vec::new();
        let tables = vec![
            copy_rows(
                Table::Customers,
                &dataset.customers,
                |c: &Customer| c.id,
                |row| destination.insert_customer(row),
                &mut failures,
            ),
            copy_rows(
                Table::Products,
                &dataset.products,
                |p: &Product| p.id,
                |row| destination.insert_product(row),
                &mut failures,
            ),
            copy_rows(
                Table::Orders,
                &dataset.orders,
                |o: &Order| o.id,
                |row| destination.insert_order(row),
                &mut failures,
            ),
        ];

        // An unreadable destination fails verification; the per-row
        // results above are still reported
        let verified = if self.verify {
            match destination.load_dataset() {
                Ok(copied) => Some(fingerprint(&dataset) == fingerprint(&copied)),
                Err(e) => {
                    warn!(error = %e, "destination read-back failed, migration not verified");
                    Some(false)
                }
            }
        } else {
            None
        };

        let report = MigrationReport {
            source_backend: source.backend().to_string(),
            destination_backend: destination.backend().to_string(),
            tables,
            failures,
            verified,
        };

        info!(
            attempted = report.attempted(),
            succeeded = report.succeeded(),
            failed = report.failures.len(),
            verified = ?report.verified,
            "migration finished"
        );
        Ok(report)
    }
}

fn copy_rows<T, FId, FInsert>(
    table: Table,
    rows: &[T],
    id_of: FId,
    mut insert: FInsert,
    failures: &mut Vec<RowFailure>,
) -> TableMigration
where
    FId: Fn(&T) -> i64,
    FInsert: FnMut(&T) -> Result<(), StoreError>,
{
    let mut succeeded = 0;

    for row in rows {
        match insert(row) {
            Ok(()) => succeeded += 1,
            Err(e) => {
                let row_id = id_of(row);
                warn!(table = %table, row_id, error = %e, "row insert failed, skipping");
                failures.push(RowFailure {
                    table,
                    row_id,
                    error: e.to_string(),
                });
            }
        }
    }

    TableMigration {
        table,
        attempted: rows.len(),
        succeeded,
    }
}

/// SHA-256 over every row of every table, in id order
pub fn fingerprint(dataset: &Dataset) -> String {
    let mut hasher = Sha256::new();

    for c in &dataset.customers {
        hasher.update(format!(
            "c|{}|{}|{}|{}|{}|{}|{}\n",
            c.id, c.first_name, c.last_name, c.email, c.city, c.country, c.birthdate
        ));
    }
    for p in &dataset.products {
        hasher.update(format!("p|{}|{}|{}|{}\n", p.id, p.name, p.category, p.price));
    }
    for o in &dataset.orders {
        hasher.update(format!(
            "o|{}|{}|{}|{}|{}\n",
            o.id, o.customer_id, o.product_id, o.quantity, o.order_date
        ));
    }

    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;
    use crate::generator::DataGenerator;
    use crate::initializer::StoreInitializer;
    use chrono::NaiveDate;

    fn loaded_source() -> (SqliteStore, Dataset) {
        let dataset =
            DataGenerator::seeded(3, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()).dataset(8, 4, 25);
        let mut store = SqliteStore::open_in_memory().unwrap();
        StoreInitializer::reset_and_load(&mut store, &dataset).unwrap();
        (store, dataset)
    }

    #[test]
    fn test_copy_all_into_empty_store() {
        let (mut source, dataset) = loaded_source();
        let mut destination = SqliteStore::open_in_memory().unwrap();

        let report = Migrator::new().copy_all(&mut source, &mut destination).unwrap();

        println!("{}", report.summary());
        assert!(report.is_complete());
        assert_eq!(report.attempted(), 37);
        assert_eq!(report.succeeded(), 37);
        assert_eq!(report.verified, Some(true));
        assert_eq!(destination.load_dataset().unwrap(), dataset);
    }

    #[test]
    fn test_conflicting_rows_are_reported_not_fatal() {
        let (mut source, dataset) = loaded_source();

        // Destination already holds customer 1, and keeps it
        let mut destination = SqliteStore::open_in_memory().unwrap();
        destination.reset_schema().unwrap();
        destination.insert_customer(&dataset.customers[0]).unwrap();

        let report = Migrator::with_options(false, true)
            .copy_all(&mut source, &mut destination)
            .unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].table, Table::Customers);
        assert_eq!(report.failures[0].row_id, 1);
        assert_eq!(report.attempted(), 37);
        assert_eq!(report.succeeded(), 36);

        let customers = report.table(Table::Customers).unwrap();
        assert_eq!(customers.failed(), 1);
        // Same row content was already there, so the copy still verifies
        assert_eq!(report.verified, Some(true));
        assert_eq!(destination.count(Table::Orders).unwrap(), 25);
    }

    #[test]
    fn test_verification_detects_extra_rows() {
        let (mut source, dataset) = loaded_source();

        let mut destination = SqliteStore::open_in_memory().unwrap();
        destination.reset_schema().unwrap();
        let mut stray = dataset.customers[0].clone();
        stray.id = 500;
        destination.insert_customer(&stray).unwrap();

        let report = Migrator::with_options(false, true)
            .copy_all(&mut source, &mut destination)
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(report.verified, Some(false));
        assert!(report.summary().contains("MISMATCH"));
    }

    #[test]
    fn test_missing_destination_tables_fail_every_row() {
        let (mut source, _) = loaded_source();
        let mut destination = SqliteStore::open_in_memory().unwrap();

        let report = Migrator::with_options(false, false)
            .copy_all(&mut source, &mut destination)
            .unwrap();

        assert_eq!(report.succeeded(), 0);
        assert_eq!(report.failures.len(), 37);
        assert_eq!(report.verified, None);
    }

    #[test]
    fn test_unreadable_destination_keeps_row_report() {
        let (mut source, _) = loaded_source();
        let mut destination = SqliteStore::open_in_memory().unwrap();

        let report = Migrator::with_options(false, true)
            .copy_all(&mut source, &mut destination)
            .unwrap();

        assert_eq!(report.attempted(), 37);
        assert_eq!(report.succeeded(), 0);
        assert_eq!(report.failures.len(), 37);
        assert_eq!(report.verified, Some(false));
        assert!(report.summary().contains("MISMATCH"));
    }

    #[test]
    fn test_empty_source() {
        let mut source = SqliteStore::open_in_memory().unwrap();
        source.reset_schema().unwrap();
        let mut destination = SqliteStore::open_in_memory().unwrap();

        let report = Migrator::new().copy_all(&mut source, &mut destination).unwrap();
        assert_eq!(report.attempted(), 0);
        assert_eq!(report.verified, Some(true));
    }

    #[test]
    fn test_unreadable_source_is_fatal() {
        // No schema at all
        let mut source = SqliteStore::open_in_memory().unwrap();
        let mut destination = SqliteStore::open_in_memory().unwrap();
        assert!(Migrator::new().copy_all(&mut source, &mut destination).is_err());
    }

    #[test]
    fn test_fingerprint_is_order_and_content_sensitive() {
        let (_, dataset) = loaded_source();
        let mut changed = dataset.clone();
        changed.orders[0].quantity += 1;

        assert_eq!(fingerprint(&dataset), fingerprint(&dataset.clone()));
        assert_ne!(fingerprint(&dataset), fingerprint(&changed));
        assert_eq!(fingerprint(&dataset).len(), 64);
    }
}
