// 👤 Customer Entity - who places orders
//
// Identity is the integer primary key. Everything else is a value that the
// generator fills in once per run and nobody updates afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Column order used by both the SQL schema and the CSV export
pub const CUSTOMER_COLUMNS: &[&str] = &[
    "id",
    "first_name",
    "last_name",
    "email",
    "city",
    "country",
    "birthdate",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub city: String,
    pub country: String,
    pub birthdate: NaiveDate,
}

impl Customer {
    pub fn new(
        id: i64,
        first_name: &str,
        last_name: &str,
        email: &str,
        city: &str,
        country: &str,
        birthdate: NaiveDate,
    ) -> Self {
        Customer {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            city: city.to_string(),
            country: country.to_string(),
            birthdate,
        }
    }

    /// Age in whole years on the given day
    pub fn age_on(&self, day: NaiveDate) -> i32 {
        day.years_since(self.birthdate)
            .map(|years| years as i32)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_on() {
        let customer = Customer::new(
            1,
            "Maria",
            "Papadopoulou",
            "maria@example.com",
            "Athens",
            "Greece",
            NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
        );

        assert_eq!(customer.age_on(NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()), 33);
        assert_eq!(customer.age_on(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()), 34);
        // Birthdate in the future never yields a negative age
        assert_eq!(customer.age_on(NaiveDate::from_ymd_opt(1980, 1, 1).unwrap()), 0);
    }
}
