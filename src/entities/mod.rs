// Entity Models - the three base tables
//
// Customers, products and orders are created once per run, loaded into the
// primary store, copied to the secondary store and never updated.

pub mod customer;
pub mod product;
pub mod order;

pub use customer::{Customer, CUSTOMER_COLUMNS};
pub use product::{Product, ProductCategory, UnknownCategory, PRODUCT_COLUMNS};
pub use order::{Order, ORDER_COLUMNS};

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// TABLE
// ============================================================================

/// The three relations, in foreign-key dependency order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Table {
    Customers,
    Products,
    Orders,
}

impl Table {
    /// Parents before children; reverse it to drop
    pub const LOAD_ORDER: [Table; 3] = [Table::Customers, Table::Products, Table::Orders];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Customers => "customers",
            Table::Products => "products",
            Table::Orders => "orders",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Customers => CUSTOMER_COLUMNS,
            Table::Products => PRODUCT_COLUMNS,
            Table::Orders => ORDER_COLUMNS,
        }
    }

    pub fn csv_file_name(&self) -> String {
        format!("{}.csv", self.name())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// DATASET
// ============================================================================

/// All three base tables of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
}

impl Dataset {
    pub fn new(customers: Vec<Customer>, products: Vec<Product>, orders: Vec<Order>) -> Self {
        Dataset {
            customers,
            products,
            orders,
        }
    }

    pub fn row_count(&self, table: Table) -> usize {
        match table {
            Table::Customers => self.customers.len(),
            Table::Products => self.products.len(),
            Table::Orders => self.orders.len(),
        }
    }

    pub fn total_rows(&self) -> usize {
        Table::LOAD_ORDER.iter().map(|t| self.row_count(*t)).sum()
    }
}
