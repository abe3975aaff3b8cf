// 🔎 Dataset profile - row counts, missing values, quantity statistics
//
// A structured version of "look at the tables before analysing them":
// how many rows, which text columns have blanks, how order quantities are
// distributed and which dates the orders span.

use crate::entities::{Dataset, Table};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableProfile {
    pub table: Table,
    pub rows: usize,
    /// (column, number of blank values), only columns with blanks
    pub missing_values: Vec<(String, usize)>,
}

impl TableProfile {
    pub fn missing_total(&self) -> usize {
        self.missing_values.iter().map(|(_, n)| n).sum()
    }
}

/// count / mean / std / min / quartiles / max of a numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); 0 for fewer than two values
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl ColumnStats {
    /// None for an empty column
    pub fn describe(values: &[f64]) -> Option<ColumnStats> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };

        Some(ColumnStats {
            count,
            mean,
            std,
            min: sorted[0],
            p25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            p75: quantile(&sorted, 0.75),
            max: sorted[count - 1],
        })
    }
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub tables: Vec<TableProfile>,
    pub quantity: Option<ColumnStats>,
    pub first_order: Option<NaiveDate>,
    pub last_order: Option<NaiveDate>,
}

impl DatasetProfile {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let customers = TableProfile {
            table: Table::Customers,
            rows: dataset.customers.len(),
            missing_values: blanks(&[
                ("first_name", dataset.customers.iter().map(|c| c.first_name.as_str()).collect()),
                ("last_name", dataset.customers.iter().map(|c| c.last_name.as_str()).collect()),
                ("email", dataset.customers.iter().map(|c| c.email.as_str()).collect()),
                ("city", dataset.customers.iter().map(|c| c.city.as_str()).collect()),
                ("country", dataset.customers.iter().map(|c| c.country.as_str()).collect()),
            ]),
        };

        let products = TableProfile {
            table: Table::Products,
            rows: dataset.products.len(),
            missing_values: blanks(&[(
                "name",
                dataset.products.iter().map(|p| p.name.as_str()).collect(),
            )]),
        };

        // Orders have no text columns
        let orders = TableProfile {
            table: Table::Orders,
            rows: dataset.orders.len(),
            missing_values: Vec::new(),
        };

        let quantities: Vec<f64> = dataset.orders.iter().map(|o| o.quantity as f64).collect();

        DatasetProfile {
            tables: vec![customers, products, orders],
            quantity: ColumnStats::describe(&quantities),
            first_order: dataset.orders.iter().map(|o| o.order_date).min(),
            last_order: dataset.orders.iter().map(|o| o.order_date).max(),
        }
    }

    pub fn rows(&self, table: Table) -> usize {
        self.tables
            .iter()
            .find(|t| t.table == table)
            .map(|t| t.rows)
            .unwrap_or(0)
    }

    pub fn summary(&self) -> String {
        let span = match (self.first_order, self.last_order) {
            (Some(first), Some(last)) => format!("{} to {}", first, last),
            _ => "no orders".to_string(),
        };
        let missing: usize = self.tables.iter().map(|t| t.missing_total()).sum();
        format!(
            "{} customers, {} products, {} orders ({}), {} blank value(s)",
            self.rows(Table::Customers),
            self.rows(Table::Products),
            self.rows(Table::Orders),
            span,
            missing
        )
    }
}

fn blanks(columns: &[(&str, Vec<&str>)]) -> Vec<(String, usize)> {
    columns
        .iter()
        .map(|(name, values)| {
            let count = values.iter().filter(|v| v.trim().is_empty()).count();
            (name.to_string(), count)
        })
        .filter(|(_, count)| *count > 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Customer, Order, Product, ProductCategory};

    #[test]
    fn test_describe_matches_known_values() {
        let stats = ColumnStats::describe(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.p25, 1.75);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.p75, 3.25);
        assert!((stats.std - 1.2909944487).abs() < 1e-9);

        let single = ColumnStats::describe(&[7.0]).unwrap();
        assert_eq!(single.std, 0.0);
        assert_eq!(single.median, 7.0);

        assert!(ColumnStats::describe(&[]).is_none());
    }

    #[test]
    fn test_profile_counts_and_blanks() {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let dataset = Dataset::new(
            vec![
                Customer::new(1, "Ana", "", "ana@example.com", "Lima", "Peru", d1),
                Customer::new(2, "Raj", "Das", "", "Pune", "India", d1),
            ],
            vec![Product::new(1, "Mug", ProductCategory::HomeAndKitchen, 8.0)],
            vec![Order::new(1, 1, 1, 2, d2), Order::new(2, 2, 1, 4, d1)],
        );

        let profile = DatasetProfile::from_dataset(&dataset);

        assert_eq!(profile.rows(Table::Customers), 2);
        assert_eq!(profile.rows(Table::Products), 1);
        assert_eq!(profile.rows(Table::Orders), 2);
        assert_eq!(
            profile.tables[0].missing_values,
            vec![("last_name".to_string(), 1), ("email".to_string(), 1)]
        );
        assert_eq!(profile.first_order, Some(d1));
        assert_eq!(profile.last_order, Some(d2));
        assert_eq!(profile.quantity.as_ref().unwrap().mean, 3.0);
        assert!(profile.summary().contains("2 blank value(s)"));
    }

    #[test]
    fn test_profile_of_empty_dataset() {
        let profile = DatasetProfile::from_dataset(&Dataset::default());
        assert!(profile.quantity.is_none());
        assert!(profile.first_order.is_none());
        assert!(profile.summary().contains("no orders"));
    }
}
