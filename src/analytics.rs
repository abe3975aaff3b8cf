// 📊 Aggregation Engine - joins, derived revenue, rankings, monthly series
//
// Everything here is recomputed from full tables on every call. The engine
// never touches a store: callers hand it the three relations.
//
// Grouping keeps groups in first-seen order (the order their first line
// appears in the enriched view, which follows the orders table). Rankings
// are a stable sort on top of that, so ties keep first-seen order and the
// result is deterministic for a given input order.

use crate::entities::{Customer, Order, Product, ProductCategory};
use crate::error::IntegrityError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;
use tracing::{debug, warn};

pub const DEFAULT_TOP_N: usize = 5;

// ============================================================================
// ORDER MONTH
// ============================================================================

/// Calendar month an order falls in. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderMonth {
    pub year: i32,
    pub month: u32,
}

impl OrderMonth {
    pub fn new(year: i32, month: u32) -> Self {
        OrderMonth { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        OrderMonth {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for OrderMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// ============================================================================
// ENRICHED ORDER LINE
// ============================================================================

/// An order joined with its customer and product, plus derived revenue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedOrderLine {
    pub order_id: i64,
    pub order_date: NaiveDate,
    pub quantity: i64,

    pub customer_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub city: String,
    pub country: String,

    pub product_id: i64,
    pub product_name: String,
    pub category: ProductCategory,
    pub unit_price: f64,

    /// quantity × unit_price
    pub line_total: f64,
    pub order_month: OrderMonth,
}

impl EnrichedOrderLine {
    pub fn new(order: &Order, customer: &Customer, product: &Product) -> Self {
        EnrichedOrderLine {
            order_id: order.id,
            order_date: order.order_date,
            quantity: order.quantity,
            customer_id: customer.id,
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            email: customer.email.clone(),
            city: customer.city.clone(),
            country: customer.country.clone(),
            product_id: product.id,
            product_name: product.name.clone(),
            category: product.category,
            unit_price: product.price,
            line_total: order.quantity as f64 * product.price,
            order_month: OrderMonth::of(order.order_date),
        }
    }

    pub fn customer_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ============================================================================
// JOIN
// ============================================================================

/// What to do with orders whose customer or product does not exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinStrictness {
    /// Drop them and report how many were dropped
    #[default]
    Tolerant,

    /// Fail the join
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingReference {
    Customer(i64),
    Product(i64),
    Both { customer_id: i64, product_id: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedOrder {
    pub order_id: i64,
    pub missing: MissingReference,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinOutcome {
    /// One line per resolvable order, in orders-table order
    pub lines: Vec<EnrichedOrderLine>,

    /// Orders that could not be joined (always empty in strict mode)
    pub dropped: Vec<DroppedOrder>,
}

/// Inner join orders → customers → products and derive revenue fields
pub fn join_orders(
    customers: &[Customer],
    products: &[Product],
    orders: &[Order],
    strictness: JoinStrictness,
) -> Result<JoinOutcome, IntegrityError> {
    let customers_by_id: HashMap<i64, &Customer> = customers.iter().map(|c| (c.id, c)).collect();
    let products_by_id: HashMap<i64, &Product> = products.iter().map(|p| (p.id, p)).collect();

    let mut outcome = JoinOutcome {
        lines: Vec::with_capacity(orders.len()),
        dropped: Vec::new(),
    };

    for order in orders {
        let customer = customers_by_id.get(&order.customer_id);
        let product = products_by_id.get(&order.product_id);

        match (customer, product) {
            (Some(customer), Some(product)) => {
                outcome.lines.push(EnrichedOrderLine::new(order, customer, product));
            }
            (None, Some(_)) => outcome.dropped.push(DroppedOrder {
                order_id: order.id,
                missing: MissingReference::Customer(order.customer_id),
            }),
            (Some(_), None) => outcome.dropped.push(DroppedOrder {
                order_id: order.id,
                missing: MissingReference::Product(order.product_id),
            }),
            (None, None) => outcome.dropped.push(DroppedOrder {
                order_id: order.id,
                missing: MissingReference::Both {
                    customer_id: order.customer_id,
                    product_id: order.product_id,
                },
            }),
        }
    }

    if let Some(first) = outcome.dropped.first() {
        if strictness == JoinStrictness::Strict {
            return Err(IntegrityError::UnresolvedReferences {
                count: outcome.dropped.len(),
                first_order_id: first.order_id,
            });
        }
        warn!(
            dropped = outcome.dropped.len(),
            first_order_id = first.order_id,
            "orders with unresolved references dropped from join"
        );
    }

    debug!(lines = outcome.lines.len(), "join complete");
    Ok(outcome)
}

// ============================================================================
// AGGREGATES
// ============================================================================

/// Identity of a customer in the order-count ranking
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerKey {
    pub first_name: String,
    pub last_name: String,
    pub city: String,
}

impl fmt::Display for CustomerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.first_name, self.last_name, self.city)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerOrderCount {
    pub customer: CustomerKey,
    pub order_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRevenue {
    pub product_name: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub month: OrderMonth,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryOrderCount {
    pub country: String,
    pub order_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRevenue {
    pub customer_name: String,
    pub revenue: f64,
}

/// Fold lines into groups, keeping groups in first-seen order
fn group_first_seen<K, V, FK, FV>(
    lines: &[EnrichedOrderLine],
    key_of: FK,
    mut fold: FV,
) -> Vec<(K, V)>
where
    K: Eq + Hash + Clone,
    V: Default,
    FK: Fn(&EnrichedOrderLine) -> K,
    FV: FnMut(&mut V, &EnrichedOrderLine),
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, V)> = Vec::new();

    for line in lines {
        let key = key_of(line);
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, V::default()));
                groups.len() - 1
            }
        };
        fold(&mut groups[slot].1, line);
    }

    groups
}

fn revenue_by_product(lines: &[EnrichedOrderLine]) -> Vec<ProductRevenue> {
    group_first_seen(
        lines,
        |line| line.product_name.clone(),
        |total: &mut f64, line| *total += line.line_total,
    )
    .into_iter()
    .map(|(product_name, revenue)| ProductRevenue {
        product_name,
        revenue,
    })
    .collect()
}

/// Customers (name + city) with the most orders, descending
pub fn top_customers_by_orders(lines: &[EnrichedOrderLine], n: usize) -> Vec<CustomerOrderCount> {
    let mut ranking: Vec<CustomerOrderCount> = group_first_seen(
        lines,
        |line| CustomerKey {
            first_name: line.first_name.clone(),
            last_name: line.last_name.clone(),
            city: line.city.clone(),
        },
        |count: &mut usize, _| *count += 1,
    )
    .into_iter()
    .map(|(customer, order_count)| CustomerOrderCount {
        customer,
        order_count,
    })
    .collect();

    ranking.sort_by(|a, b| b.order_count.cmp(&a.order_count));
    ranking.truncate(n);
    ranking
}

/// Products with the highest summed line totals, descending
pub fn top_products_by_revenue(lines: &[EnrichedOrderLine], n: usize) -> Vec<ProductRevenue> {
    let mut ranking = revenue_by_product(lines);
    ranking.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    ranking.truncate(n);
    ranking
}

/// Revenue per calendar month, oldest month first
pub fn monthly_revenue(lines: &[EnrichedOrderLine]) -> Vec<MonthlyRevenue> {
    let mut months: BTreeMap<OrderMonth, f64> = BTreeMap::new();
    for line in lines {
        *months.entry(line.order_month).or_insert(0.0) += line.line_total;
    }

    months
        .into_iter()
        .map(|(month, revenue)| MonthlyRevenue { month, revenue })
        .collect()
}

/// Product with the highest revenue; None when there are no lines.
/// Ties go to the product seen first.
pub fn most_profitable_product(lines: &[EnrichedOrderLine]) -> Option<ProductRevenue> {
    revenue_by_product(lines)
        .into_iter()
        .fold(None, |best: Option<ProductRevenue>, candidate| match best {
            Some(current) if current.revenue >= candidate.revenue => Some(current),
            _ => Some(candidate),
        })
}

/// Number of orders per customer country, descending
pub fn orders_by_country(lines: &[EnrichedOrderLine]) -> Vec<CountryOrderCount> {
    let mut ranking: Vec<CountryOrderCount> = group_first_seen(
        lines,
        |line| line.country.clone(),
        |count: &mut usize, _| *count += 1,
    )
    .into_iter()
    .map(|(country, order_count)| CountryOrderCount {
        country,
        order_count,
    })
    .collect();

    ranking.sort_by(|a, b| b.order_count.cmp(&a.order_count));
    ranking
}

/// Customers (first + last name) with the highest summed line totals
pub fn top_customers_by_revenue(lines: &[EnrichedOrderLine], n: usize) -> Vec<CustomerRevenue> {
    let mut ranking: Vec<CustomerRevenue> = group_first_seen(
        lines,
        |line| line.customer_name(),
        |total: &mut f64, line| *total += line.line_total,
    )
    .into_iter()
    .map(|(customer_name, revenue)| CustomerRevenue {
        customer_name,
        revenue,
    })
    .collect();

    ranking.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    ranking.truncate(n);
    ranking
}

// ============================================================================
// ANALYTICS ENGINE
// ============================================================================

/// The KPI set computed for every run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiReport {
    pub line_count: usize,
    pub dropped_orders: Vec<DroppedOrder>,
    pub total_revenue: f64,
    pub top_customers: Vec<CustomerOrderCount>,
    pub top_products: Vec<ProductRevenue>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub most_profitable_product: Option<ProductRevenue>,
}

impl KpiReport {
    pub fn summary(&self) -> String {
        let best = match &self.most_profitable_product {
            Some(p) => format!("{} (${:.2})", p.product_name, p.revenue),
            None => "no data".to_string(),
        };
        format!(
            "{} order lines, revenue ${:.2}, {} month(s), {} dropped, most profitable: {}",
            self.line_count,
            self.total_revenue,
            self.monthly_revenue.len(),
            self.dropped_orders.len(),
            best
        )
    }
}

pub struct AnalyticsEngine {
    /// Size of the customer and product rankings (default: 5)
    pub top_n: usize,

    /// Handling of unresolved order references (default: tolerant)
    pub strictness: JoinStrictness,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsEngine {
    pub fn new() -> Self {
        AnalyticsEngine {
            top_n: DEFAULT_TOP_N,
            strictness: JoinStrictness::Tolerant,
        }
    }

    pub fn with_settings(top_n: usize, strictness: JoinStrictness) -> Self {
        AnalyticsEngine { top_n, strictness }
    }

    pub fn join(
        &self,
        customers: &[Customer],
        products: &[Product],
        orders: &[Order],
    ) -> Result<JoinOutcome, IntegrityError> {
        join_orders(customers, products, orders, self.strictness)
    }

    /// Join, then compute every KPI over the joined lines
    pub fn analyze(
        &self,
        customers: &[Customer],
        products: &[Product],
        orders: &[Order],
    ) -> Result<KpiReport, IntegrityError> {
        let outcome = self.join(customers, products, orders)?;
        Ok(self.report(&outcome))
    }

    pub fn report(&self, outcome: &JoinOutcome) -> KpiReport {
        let lines = &outcome.lines;
        KpiReport {
            line_count: lines.len(),
            dropped_orders: outcome.dropped.clone(),
            total_revenue: lines.iter().map(|l| l.line_total).sum(),
            top_customers: top_customers_by_orders(lines, self.top_n),
            top_products: top_products_by_revenue(lines, self.top_n),
            monthly_revenue: monthly_revenue(lines),
            most_profitable_product: most_profitable_product(lines),
        }
    }
}
