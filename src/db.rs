use crate::entities::{Customer, Dataset, Order, Product, ProductCategory, Table};
use crate::error::StoreError;
use crate::store::RelationalStore;
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Dates are stored as ISO-8601 text, same as the CSV export
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DROP_TABLES: &str = "
    DROP TABLE IF EXISTS orders;
    DROP TABLE IF EXISTS products;
    DROP TABLE IF EXISTS customers;
";

const CREATE_TABLES: &str = "
    CREATE TABLE customers (
        id INTEGER PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL,
        city TEXT NOT NULL,
        country TEXT NOT NULL,
        birthdate TEXT NOT NULL
    );

    CREATE TABLE products (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        price REAL NOT NULL CHECK (price >= 0)
    );

    CREATE TABLE orders (
        id INTEGER PRIMARY KEY,
        customer_id INTEGER NOT NULL,
        product_id INTEGER NOT NULL,
        quantity INTEGER NOT NULL CHECK (quantity >= 1),
        order_date TEXT NOT NULL,
        FOREIGN KEY (customer_id) REFERENCES customers(id),
        FOREIGN KEY (product_id) REFERENCES products(id)
    );

    CREATE INDEX idx_orders_customer ON orders(customer_id);
    CREATE INDEX idx_orders_product ON orders(product_id);
    CREATE INDEX idx_orders_date ON orders(order_date);
";

/// SQLite-backed store (file or in-memory)
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open an existing file (or create an empty one)
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;

        // WAL for crash recovery; in-memory databases don't support it
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(path = %path.display(), journal_mode = %mode, "opened sqlite store");

        configure(&conn)?;
        Ok(SqliteStore {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Delete any previous database file (plus WAL/SHM side files) and open a fresh one
    pub fn create_fresh(path: &Path) -> Result<Self, StoreError> {
        let mut removed = false;
        for candidate in side_files(path) {
            if candidate.exists() {
                fs::remove_file(&candidate)?;
                removed = true;
            }
        }
        if removed {
            info!(path = %path.display(), "removed previous database file");
        }

        Self::open(path)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        configure(&conn)?;
        Ok(SqliteStore { conn, path: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn configure(conn: &Connection) -> Result<(), StoreError> {
    conn.pragma_update(None, "foreign_keys", true)?;
    Ok(())
}

fn side_files(path: &Path) -> Vec<PathBuf> {
    let base = path.as_os_str().to_os_string();
    let mut files = vec![path.to_path_buf()];
    for suffix in ["-wal", "-shm"] {
        let mut side = base.clone();
        side.push(suffix);
        files.push(PathBuf::from(side));
    }
    files
}

// ============================================================================
// ROW WRITERS (shared by single inserts and the transactional bulk load)
// ============================================================================

fn write_customer(conn: &Connection, c: &Customer) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO customers (id, first_name, last_name, email, city, country, birthdate)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    stmt.execute(params![
        c.id,
        c.first_name,
        c.last_name,
        c.email,
        c.city,
        c.country,
        c.birthdate.format(DATE_FORMAT).to_string(),
    ])
}

fn write_product(conn: &Connection, p: &Product) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO products (id, name, category, price) VALUES (?1, ?2, ?3, ?4)",
    )?;
    stmt.execute(params![p.id, p.name, p.category.as_str(), p.price])
}

fn write_order(conn: &Connection, o: &Order) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO orders (id, customer_id, product_id, quantity, order_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    stmt.execute(params![
        o.id,
        o.customer_id,
        o.product_id,
        o.quantity,
        o.order_date.format(DATE_FORMAT).to_string(),
    ])
}

fn parse_date(idx: usize, text: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ============================================================================
// STORE IMPLEMENTATION
// ============================================================================

impl RelationalStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn reset_schema(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(DROP_TABLES)?;
        self.conn.execute_batch(CREATE_TABLES)?;
        Ok(())
    }

    fn insert_customer(&mut self, customer: &Customer) -> Result<(), StoreError> {
        write_customer(&self.conn, customer)?;
        Ok(())
    }

    fn insert_product(&mut self, product: &Product) -> Result<(), StoreError> {
        write_product(&self.conn, product)?;
        Ok(())
    }

    fn insert_order(&mut self, order: &Order) -> Result<(), StoreError> {
        write_order(&self.conn, order)?;
        Ok(())
    }

    fn load_customers(&mut self) -> Result<Vec<Customer>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, first_name, last_name, email, city, country, birthdate
             FROM customers
             ORDER BY id",
        )?;

        let customers = stmt
            .query_map([], |row| {
                let birthdate: String = row.get(6)?;
                Ok(Customer {
                    id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    email: row.get(3)?,
                    city: row.get(4)?,
                    country: row.get(5)?,
                    birthdate: parse_date(6, &birthdate)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(customers)
    }

    fn load_products(&mut self) -> Result<Vec<Product>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, category, price FROM products ORDER BY id")?;

        let products = stmt
            .query_map([], |row| {
                let category: String = row.get(2)?;
                Ok(Product {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    category: category.parse::<ProductCategory>().map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e))
                    })?,
                    price: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(products)
    }

    fn load_orders(&mut self) -> Result<Vec<Order>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, customer_id, product_id, quantity, order_date
             FROM orders
             ORDER BY id",
        )?;

        let orders = stmt
            .query_map([], |row| {
                let order_date: String = row.get(4)?;
                Ok(Order {
                    id: row.get(0)?,
                    customer_id: row.get(1)?,
                    product_id: row.get(2)?,
                    quantity: row.get(3)?,
                    order_date: parse_date(4, &order_date)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(orders)
    }

    fn count(&mut self, table: Table) -> Result<i64, StoreError> {
        // Table names come from a closed enum, never from input
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }

    fn bulk_load(&mut self, dataset: &Dataset) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;

        for customer in &dataset.customers {
            write_customer(&tx, customer)?;
        }
        for product in &dataset.products {
            write_product(&tx, product)?;
        }
        for order in &dataset.orders {
            write_order(&tx, order)?;
        }

        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::ErrorCode;

    /// Helper: one customer, one product, one order that references both
    fn create_test_dataset() -> Dataset {
        Dataset::new(
            vec![Customer::new(
                1,
                "Nikos",
                "Georgiou",
                "nikos@example.com",
                "Athens",
                "Greece",
                NaiveDate::from_ymd_opt(1985, 3, 2).unwrap(),
            )],
            vec![Product::new(1, "Lamp", ProductCategory::HomeAndKitchen, 24.99)],
            vec![Order::new(
                1,
                1,
                1,
                3,
                NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            )],
        )
    }

    fn is_constraint_violation(err: &StoreError) -> bool {
        matches!(
            err,
            StoreError::Sqlite(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation
        )
    }

    #[test]
    fn test_bulk_load_and_read_back() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.reset_schema().unwrap();

        let dataset = create_test_dataset();
        store.bulk_load(&dataset).unwrap();

        assert_eq!(store.count(Table::Customers).unwrap(), 1);
        assert_eq!(store.count(Table::Products).unwrap(), 1);
        assert_eq!(store.count(Table::Orders).unwrap(), 1);

        let loaded = store.load_dataset().unwrap();
        assert_eq!(loaded, dataset);
    }

    #[test]
    fn test_reset_schema_is_idempotent() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.reset_schema().unwrap();
        store.bulk_load(&create_test_dataset()).unwrap();

        // Second reset wipes everything and leaves usable tables behind
        store.reset_schema().unwrap();
        assert_eq!(store.count(Table::Orders).unwrap(), 0);
        store.bulk_load(&create_test_dataset()).unwrap();
        assert_eq!(store.count(Table::Orders).unwrap(), 1);
    }

    #[test]
    fn test_foreign_keys_are_enforced() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.reset_schema().unwrap();

        let orphan = Order::new(7, 99, 99, 1, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let err = store.insert_order(&orphan).unwrap_err();
        assert!(is_constraint_violation(&err), "unexpected error: {}", err);
    }

    #[test]
    fn test_bulk_load_is_all_or_nothing() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.reset_schema().unwrap();

        let mut dataset = create_test_dataset();
        dataset.orders.push(Order::new(
            2,
            1,
            42,
            1,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        ));

        assert!(store.bulk_load(&dataset).is_err());
        assert_eq!(store.count(Table::Customers).unwrap(), 0);
        assert_eq!(store.count(Table::Orders).unwrap(), 0);
    }

    #[test]
    fn test_duplicate_primary_key_rejected() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.reset_schema().unwrap();

        let dataset = create_test_dataset();
        store.insert_customer(&dataset.customers[0]).unwrap();
        let err = store.insert_customer(&dataset.customers[0]).unwrap_err();
        assert!(is_constraint_violation(&err));
    }

    #[test]
    fn test_unknown_category_fails_to_decode() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.reset_schema().unwrap();
        store
            .connection()
            .execute(
                "INSERT INTO products (id, name, category, price) VALUES (1, 'Rake', 'Garden', 5.0)",
                [],
            )
            .unwrap();

        assert!(store.load_products().is_err());
    }

    #[test]
    fn test_create_fresh_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ecommerce.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.reset_schema().unwrap();
            store.bulk_load(&create_test_dataset()).unwrap();
        }

        let mut store = SqliteStore::create_fresh(&path).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
        // Fresh file has no tables yet
        assert!(store.count(Table::Customers).is_err());
        store.reset_schema().unwrap();
        assert_eq!(store.count(Table::Customers).unwrap(), 0);
    }
}
