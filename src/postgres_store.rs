// 🐘 PostgreSQL backend - the network-addressable secondary store
//
// Same logical schema as the SQLite store. Only compiled with the
// `postgres` cargo feature; the connection URL comes from configuration.

use crate::entities::{Customer, Dataset, Order, Product, ProductCategory, Table};
use crate::error::StoreError;
use crate::store::{redact_url, RelationalStore};
use postgres::{Client, NoTls, Row};
use tracing::debug;

const DROP_TABLES: &str = "
    DROP TABLE IF EXISTS orders;
    DROP TABLE IF EXISTS products;
    DROP TABLE IF EXISTS customers;
";

const CREATE_TABLES: &str = "
    CREATE TABLE customers (
        id BIGINT PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL,
        city TEXT NOT NULL,
        country TEXT NOT NULL,
        birthdate DATE NOT NULL
    );

    CREATE TABLE products (
        id BIGINT PRIMARY KEY,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        price DOUBLE PRECISION NOT NULL CHECK (price >= 0)
    );

    CREATE TABLE orders (
        id BIGINT PRIMARY KEY,
        customer_id BIGINT NOT NULL REFERENCES customers(id),
        product_id BIGINT NOT NULL REFERENCES products(id),
        quantity BIGINT NOT NULL CHECK (quantity >= 1),
        order_date DATE NOT NULL
    );
";

pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    pub fn connect(url: &str) -> Result<Self, StoreError> {
        let client = Client::connect(url, NoTls)?;
        debug!(target_db = %redact_url(url), "connected to postgres");
        Ok(PostgresStore { client })
    }
}

fn product_from_row(row: &Row) -> Result<Product, StoreError> {
    let id: i64 = row.try_get(0)?;
    let category: String = row.try_get(2)?;
    let category = category
        .parse::<ProductCategory>()
        .map_err(|e| StoreError::Decode {
            table: Table::Products,
            row_id: id,
            message: e.to_string(),
        })?;

    Ok(Product {
        id,
        name: row.try_get(1)?,
        category,
        price: row.try_get(3)?,
    })
}

impl RelationalStore for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    fn reset_schema(&mut self) -> Result<(), StoreError> {
        self.client.batch_execute(DROP_TABLES)?;
        self.client.batch_execute(CREATE_TABLES)?;
        Ok(())
    }

    fn insert_customer(&mut self, c: &Customer) -> Result<(), StoreError> {
        self.client.execute(
            "INSERT INTO customers (id, first_name, last_name, email, city, country, birthdate)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
            &[
                &c.id,
                &c.first_name,
                &c.last_name,
                &c.email,
                &c.city,
                &c.country,
                &c.birthdate,
            ],
        )?;
        Ok(())
    }

    fn insert_product(&mut self, p: &Product) -> Result<(), StoreError> {
        self.client.execute(
            "INSERT INTO products (id, name, category, price) VALUES ($1, $2, $3, $4)",
            &[&p.id, &p.name, &p.category.as_str(), &p.price],
        )?;
        Ok(())
    }

    fn insert_order(&mut self, o: &Order) -> Result<(), StoreError> {
        self.client.execute(
            "INSERT INTO orders (id, customer_id, product_id, quantity, order_date)
             VALUES ($1, $2, $3, $4, $5)",
            &[&o.id, &o.customer_id, &o.product_id, &o.quantity, &o.order_date],
        )?;
        Ok(())
    }

    fn load_customers(&mut self) -> Result<Vec<Customer>, StoreError> {
        let rows = self.client.query(
            "SELECT id, first_name, last_name, email, city, country, birthdate
             FROM customers
             ORDER BY id",
            &[],
        )?;

        let mut customers = Vec::with_capacity(rows.len());
        for row in rows {
            customers.push(Customer {
                id: row.try_get(0)?,
                first_name: row.try_get(1)?,
                last_name: row.try_get(2)?,
                email: row.try_get(3)?,
                city: row.try_get(4)?,
                country: row.try_get(5)?,
                birthdate: row.try_get(6)?,
            });
        }
        Ok(customers)
    }

    fn load_products(&mut self) -> Result<Vec<Product>, StoreError> {
        let rows = self
            .client
            .query("SELECT id, name, category, price FROM products ORDER BY id", &[])?;
        rows.iter().map(product_from_row).collect()
    }

    fn load_orders(&mut self) -> Result<Vec<Order>, StoreError> {
        let rows = self.client.query(
            "SELECT id, customer_id, product_id, quantity, order_date
             FROM orders
             ORDER BY id",
            &[],
        )?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            orders.push(Order {
                id: row.try_get(0)?,
                customer_id: row.try_get(1)?,
                product_id: row.try_get(2)?,
                quantity: row.try_get(3)?,
                order_date: row.try_get(4)?,
            });
        }
        Ok(orders)
    }

    fn count(&mut self, table: Table) -> Result<i64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let row = self.client.query_one(sql.as_str(), &[])?;
        Ok(row.try_get(0)?)
    }

    fn bulk_load(&mut self, dataset: &Dataset) -> Result<(), StoreError> {
        let mut tx = self.client.transaction()?;

        for c in &dataset.customers {
            tx.execute(
                "INSERT INTO customers (id, first_name, last_name, email, city, country, birthdate)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
                &[
                    &c.id,
                    &c.first_name,
                    &c.last_name,
                    &c.email,
                    &c.city,
                    &c.country,
                    &c.birthdate,
                ],
            )?;
        }
        for p in &dataset.products {
            tx.execute(
                "INSERT INTO products (id, name, category, price) VALUES ($1, $2, $3, $4)",
                &[&p.id, &p.name, &p.category.as_str(), &p.price],
            )?;
        }
        for o in &dataset.orders {
            tx.execute(
                "INSERT INTO orders (id, customer_id, product_id, quantity, order_date)
                 VALUES ($1, $2, $3, $4, $5)",
                &[&o.id, &o.customer_id, &o.product_id, &o.quantity, &o.order_date],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}
