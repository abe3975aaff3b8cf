// ✅ Data Quality Engine - record-level checks over the three base tables
//
// Runs every rule against every row and collects failures as issues.
// Nothing here raises: a dataset with broken references still gets
// analysed, the report just says how broken it is.

use crate::entities::{Customer, Dataset, Order, Product, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub rule_name: String,
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

impl ValidationResult {
    pub fn pass(rule_name: &str, field: &str) -> Self {
        ValidationResult {
            passed: true,
            rule_name: rule_name.to_string(),
            field: field.to_string(),
            message: String::new(),
            severity: Severity::Info,
        }
    }

    pub fn fail(rule_name: &str, field: &str, message: &str, severity: Severity) -> Self {
        ValidationResult {
            passed: false,
            rule_name: rule_name.to_string(),
            field: field.to_string(),
            message: message.to_string(),
            severity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Critical, // Breaks an invariant the analytics rely on
    Warning,  // Questionable value, aggregates still meaningful
    Info,     // Valid but unusual
}

// ============================================================================
// QUALITY REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityIssue {
    pub severity: Severity,
    pub table: Table,
    pub row_id: i64,
    pub field: String,
    pub rule_name: String,
    pub issue: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityReport {
    pub rows_checked: usize,
    pub checks_run: usize,
    pub checks_passed: usize,
    pub issues: Vec<QualityIssue>,
}

impl QualityReport {
    /// Share of checks that passed (1.0 for an empty dataset)
    pub fn overall_quality(&self) -> f64 {
        if self.checks_run == 0 {
            return 1.0;
        }
        self.checks_passed as f64 / self.checks_run as f64
    }

    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn has_critical_issues(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Critical)
    }

    pub fn issues_for(&self, table: Table) -> impl Iterator<Item = &QualityIssue> {
        self.issues.iter().filter(move |i| i.table == table)
    }

    pub fn summary(&self) -> String {
        format!(
            "Quality: {:.1}% over {} rows, Issues: {} ({} critical, {} warnings)",
            self.overall_quality() * 100.0,
            self.rows_checked,
            self.issues.len(),
            self.count_by_severity(Severity::Critical),
            self.count_by_severity(Severity::Warning),
        )
    }

    fn record(&mut self, table: Table, row_id: i64, results: Vec<ValidationResult>) {
        self.rows_checked += 1;
        self.checks_run += results.len();
        for result in results {
            if result.passed {
                self.checks_passed += 1;
            } else {
                self.issues.push(QualityIssue {
                    severity: result.severity,
                    table,
                    row_id,
                    field: result.field,
                    rule_name: result.rule_name,
                    issue: result.message,
                });
            }
        }
    }
}

// ============================================================================
// DATA QUALITY ENGINE
// ============================================================================

pub struct DataQualityEngine {
    /// Upper bound for a single order's quantity before it is flagged
    pub max_plausible_quantity: i64,
}

impl Default for DataQualityEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DataQualityEngine {
    pub fn new() -> Self {
        DataQualityEngine {
            max_plausible_quantity: 1_000,
        }
    }

    /// Validate every row of every table
    pub fn validate(&self, dataset: &Dataset) -> QualityReport {
        let mut report = QualityReport::default();

        let mut customer_ids = HashSet::new();
        for customer in &dataset.customers {
            let mut results = self.validate_customer(customer);
            results.push(unique_id(customer_ids.insert(customer.id)));
            report.record(Table::Customers, customer.id, results);
        }

        let mut product_ids = HashSet::new();
        for product in &dataset.products {
            let mut results = self.validate_product(product);
            results.push(unique_id(product_ids.insert(product.id)));
            report.record(Table::Products, product.id, results);
        }

        let mut order_ids = HashSet::new();
        for order in &dataset.orders {
            let mut results = self.validate_order(order, &customer_ids, &product_ids);
            results.push(unique_id(order_ids.insert(order.id)));
            report.record(Table::Orders, order.id, results);
        }

        report
    }

    pub fn validate_customer(&self, customer: &Customer) -> Vec<ValidationResult> {
        vec![
            not_empty("first_name", &customer.first_name),
            not_empty("last_name", &customer.last_name),
            not_empty("city", &customer.city),
            not_empty("country", &customer.country),
            self.validate_email(&customer.email),
        ]
    }

    pub fn validate_product(&self, product: &Product) -> Vec<ValidationResult> {
        vec![not_empty("name", &product.name), self.validate_price(product.price)]
    }

    pub fn validate_order(
        &self,
        order: &Order,
        customer_ids: &HashSet<i64>,
        product_ids: &HashSet<i64>,
    ) -> Vec<ValidationResult> {
        vec![
            self.validate_quantity(order.quantity),
            references("customer_id", order.customer_id, customer_ids),
            references("product_id", order.product_id, product_ids),
        ]
    }

    // ========================================================================
    // VALIDATION RULES
    // ========================================================================

    fn validate_email(&self, email: &str) -> ValidationResult {
        let well_formed = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
            }
            None => false,
        };

        if well_formed {
            ValidationResult::pass("email_format", "email")
        } else {
            ValidationResult::fail(
                "email_format",
                "email",
                &format!("Malformed email: {:?}", email),
                Severity::Warning,
            )
        }
    }

    fn validate_price(&self, price: f64) -> ValidationResult {
        if price.is_nan() || price.is_infinite() {
            return ValidationResult::fail(
                "price_invalid",
                "price",
                "Price is not a valid number",
                Severity::Critical,
            );
        }

        if price < 0.0 {
            return ValidationResult::fail(
                "price_negative",
                "price",
                &format!("Negative price: {:.2}", price),
                Severity::Critical,
            );
        }

        if price == 0.0 {
            return ValidationResult::fail("price_zero", "price", "Product is free", Severity::Info);
        }

        ValidationResult::pass("price_valid", "price")
    }

    fn validate_quantity(&self, quantity: i64) -> ValidationResult {
        if quantity < 1 {
            return ValidationResult::fail(
                "quantity_positive",
                "quantity",
                &format!("Quantity must be at least 1, got {}", quantity),
                Severity::Critical,
            );
        }

        if quantity > self.max_plausible_quantity {
            return ValidationResult::fail(
                "quantity_plausible",
                "quantity",
                &format!("Unusually large quantity: {}", quantity),
                Severity::Warning,
            );
        }

        ValidationResult::pass("quantity_positive", "quantity")
    }
}

fn not_empty(field: &str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        ValidationResult::fail(
            "not_empty",
            field,
            &format!("{} is empty", field),
            Severity::Warning,
        )
    } else {
        ValidationResult::pass("not_empty", field)
    }
}

fn unique_id(first_time_seen: bool) -> ValidationResult {
    if first_time_seen {
        ValidationResult::pass("unique_id", "id")
    } else {
        ValidationResult::fail("unique_id", "id", "Duplicate id", Severity::Critical)
    }
}

fn references(field: &str, id: i64, known: &HashSet<i64>) -> ValidationResult {
    if known.contains(&id) {
        ValidationResult::pass("reference_resolves", field)
    } else {
        ValidationResult::fail(
            "reference_resolves",
            field,
            &format!("{} {} does not exist", field, id),
            Severity::Critical,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ProductCategory;
    use chrono::NaiveDate;

    fn create_valid_dataset() -> Dataset {
        let day = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        Dataset::new(
            vec![Customer::new(1, "Ada", "King", "ada.king@example.com", "London", "United Kingdom", day)],
            vec![Product::new(1, "Kettle", ProductCategory::HomeAndKitchen, 35.0)],
            vec![Order::new(1, 1, 1, 2, day)],
        )
    }

    #[test]
    fn test_validate_clean_dataset() {
        let engine = DataQualityEngine::new();
        let report = engine.validate(&create_valid_dataset());

        println!("Report: {}", report.summary());

        assert_eq!(report.rows_checked, 3);
        assert!(report.issues.is_empty());
        assert!(!report.has_critical_issues());
        assert_eq!(report.overall_quality(), 1.0);
    }

    #[test]
    fn test_validate_empty_dataset() {
        let report = DataQualityEngine::new().validate(&Dataset::default());
        assert_eq!(report.rows_checked, 0);
        assert_eq!(report.overall_quality(), 1.0);
    }

    #[test]
    fn test_unresolved_references_are_critical() {
        let mut dataset = create_valid_dataset();
        dataset.orders.push(Order::new(
            2,
            5,
            1,
            1,
            NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
        ));

        let report = DataQualityEngine::new().validate(&dataset);

        assert!(report.has_critical_issues());
        let issues: Vec<_> = report.issues_for(Table::Orders).collect();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].row_id, 2);
        assert_eq!(issues[0].field, "customer_id");
    }

    #[test]
    fn test_duplicate_ids_and_bad_values() {
        let mut dataset = create_valid_dataset();
        dataset.customers.push(dataset.customers[0].clone());
        dataset.customers[1].email = "not-an-email".to_string();
        dataset.products[0].price = -1.0;
        dataset.orders[0].quantity = 0;

        let report = DataQualityEngine::new().validate(&dataset);

        assert!(report
            .issues
            .iter()
            .any(|i| i.table == Table::Customers && i.rule_name == "unique_id"));
        assert!(report
            .issues
            .iter()
            .any(|i| i.field == "email" && i.severity == Severity::Warning));
        assert!(report.issues.iter().any(|i| i.rule_name == "price_negative"));
        assert!(report.issues.iter().any(|i| i.rule_name == "quantity_positive"));
        assert_eq!(report.count_by_severity(Severity::Critical), 3);
        assert!(report.overall_quality() < 1.0);
    }

    #[test]
    fn test_free_product_is_info_only() {
        let mut dataset = create_valid_dataset();
        dataset.products[0].price = 0.0;

        let report = DataQualityEngine::new().validate(&dataset);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].severity, Severity::Info);
        assert!(!report.has_critical_issues());
    }

    #[test]
    fn test_blank_name_is_warning() {
        let mut dataset = create_valid_dataset();
        dataset.customers[0].city = "   ".to_string();

        let report = DataQualityEngine::new().validate(&dataset);
        assert_eq!(report.count_by_severity(Severity::Warning), 1);
        assert_eq!(report.issues[0].field, "city");
    }
}
