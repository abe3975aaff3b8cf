// 📦 Order Entity - one customer buying one product
//
// An order points at exactly one customer and one product. Both references
// are plain ids; whether they resolve is checked by the join and by the
// data quality engine, and enforced by the store's foreign keys.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Column order used by both the SQL schema and the CSV export
pub const ORDER_COLUMNS: &[&str] = &["id", "customer_id", "product_id", "quantity", "order_date"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub product_id: i64,
    /// Always >= 1
    pub quantity: i64,
    pub order_date: NaiveDate,
}

impl Order {
    pub fn new(
        id: i64,
        customer_id: i64,
        product_id: i64,
        quantity: i64,
        order_date: NaiveDate,
    ) -> Self {
        Order {
            id,
            customer_id,
            product_id,
            quantity,
            order_date,
        }
    }
}
