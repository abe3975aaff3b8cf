// 🎲 Data Generator - synthetic customers, products and orders
//
// All randomness flows through the injected `Rng`, and "today" is a
// parameter, so a seed plus a date fully determines the dataset.
//
// Orders reference customer and product ids drawn from the pools produced
// by the last `customers()` / `products()` call (or set with `with_pools`),
// which keeps every generated order referentially valid.

use crate::entities::{Customer, Dataset, Order, Product, ProductCategory};
use chrono::{Days, Months, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen", "Daniel", "Nancy", "Matthew", "Lisa", "Anthony", "Betty", "Mark",
    "Margaret", "Steven", "Sandra", "Paul", "Ashley", "Andrew", "Emily", "Joshua", "Donna",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson",
];

const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net", "mail.test"];

const LOCATIONS: &[(&str, &str)] = &[
    ("Athens", "Greece"),
    ("Thessaloniki", "Greece"),
    ("New York", "United States"),
    ("Chicago", "United States"),
    ("Austin", "United States"),
    ("Seattle", "United States"),
    ("Toronto", "Canada"),
    ("Vancouver", "Canada"),
    ("London", "United Kingdom"),
    ("Manchester", "United Kingdom"),
    ("Berlin", "Germany"),
    ("Munich", "Germany"),
    ("Paris", "France"),
    ("Lyon", "France"),
    ("Madrid", "Spain"),
    ("Lisbon", "Portugal"),
    ("Rome", "Italy"),
    ("Sydney", "Australia"),
];

const PRODUCT_WORDS: &[&str] = &[
    "Anchor", "Beacon", "Canvas", "Delta", "Ember", "Falcon", "Glacier", "Harbor", "Indigo",
    "Juniper", "Kestrel", "Lantern", "Meadow", "Nimbus", "Orbit", "Pioneer", "Quartz", "Ripple",
    "Summit", "Timber", "Umbra", "Vertex", "Willow", "Xenon", "Yonder", "Zephyr", "Atlas",
    "Boulder", "Comet", "Drift", "Echo", "Fjord", "Grove", "Horizon", "Island", "Jasper",
];

const MIN_PRICE: f64 = 10.0;
const MAX_PRICE: f64 = 500.0;
const MAX_QUANTITY: i64 = 10;
const MIN_AGE_YEARS: u32 = 20;
const MAX_AGE_YEARS: u32 = 70;

// ============================================================================
// RECORD KINDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Customer,
    Product,
    Order,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Record {
    Customer(Customer),
    Product(Product),
    Order(Order),
}

// ============================================================================
// GENERATOR
// ============================================================================

pub struct DataGenerator<R> {
    rng: R,
    today: NaiveDate,
    order_window_days: u64,
    customer_pool: i64,
    product_pool: i64,
}

impl DataGenerator<StdRng> {
    /// Reproducible generator: same seed and day, same dataset
    pub fn seeded(seed: u64, today: NaiveDate) -> Self {
        Self::new(StdRng::seed_from_u64(seed), today)
    }
}

impl<R: Rng> DataGenerator<R> {
    pub fn new(rng: R, today: NaiveDate) -> Self {
        DataGenerator {
            rng,
            today,
            order_window_days: 730,
            customer_pool: 0,
            product_pool: 0,
        }
    }

    /// Orders fall within `days` days before today (inclusive)
    pub fn with_order_window(mut self, days: u64) -> Self {
        self.order_window_days = days;
        self
    }

    /// Ids that generated orders may reference (1..=customers, 1..=products)
    pub fn with_pools(mut self, customers: i64, products: i64) -> Self {
        self.customer_pool = customers.max(0);
        self.product_pool = products.max(0);
        self
    }

    pub fn generate(&mut self, kind: RecordKind, count: usize) -> Vec<Record> {
        match kind {
            RecordKind::Customer => self.customers(count).into_iter().map(Record::Customer).collect(),
            RecordKind::Product => self.products(count).into_iter().map(Record::Product).collect(),
            RecordKind::Order => self.orders(count).into_iter().map(Record::Order).collect(),
        }
    }

    /// Customers, then products, then orders referencing them
    pub fn dataset(&mut self, customers: usize, products: usize, orders: usize) -> Dataset {
        let customers = self.customers(customers);
        let products = self.products(products);
        let orders = self.orders(orders);
        Dataset::new(customers, products, orders)
    }

    /// Customers with ids 1..=n
    pub fn customers(&mut self, n: usize) -> Vec<Customer> {
        let customers: Vec<Customer> = (1..=n as i64)
            .map(|id| {
                let first_name = self.pick(FIRST_NAMES);
                let last_name = self.pick(LAST_NAMES);
                let (city, country) = LOCATIONS[self.rng.random_range(0..LOCATIONS.len())];
                let email = self.email(first_name, last_name);
                let birthdate = self.birthdate();

                Customer::new(id, first_name, last_name, &email, city, country, birthdate)
            })
            .collect();

        self.customer_pool = customers.len() as i64;
        customers
    }

    /// Products with ids 1..=n
    pub fn products(&mut self, n: usize) -> Vec<Product> {
        let products: Vec<Product> = (1..=n as i64)
            .map(|id| {
                let name = self.pick(PRODUCT_WORDS);
                let category =
                    ProductCategory::ALL[self.rng.random_range(0..ProductCategory::ALL.len())];
                let price = self.rng.random_range(MIN_PRICE..MAX_PRICE);
                // Round to cents
                let price = (price * 100.0).round() / 100.0;

                Product::new(id, name, category, price)
            })
            .collect();

        self.product_pool = products.len() as i64;
        products
    }

    /// Orders with ids 1..=n. Empty when either pool is empty, since such an
    /// order could not reference anything.
    pub fn orders(&mut self, n: usize) -> Vec<Order> {
        if self.customer_pool == 0 || self.product_pool == 0 {
            return Vec::new();
        }

        (1..=n as i64)
            .map(|id| {
                let customer_id = self.rng.random_range(1..=self.customer_pool);
                let product_id = self.rng.random_range(1..=self.product_pool);
                let quantity = self.rng.random_range(1..=MAX_QUANTITY);
                let days_back = self.rng.random_range(0..=self.order_window_days);
                let order_date = self
                    .today
                    .checked_sub_days(Days::new(days_back))
                    .unwrap_or(self.today);

                Order::new(id, customer_id, product_id, quantity, order_date)
            })
            .collect()
    }

    fn pick(&mut self, words: &[&'static str]) -> &'static str {
        words[self.rng.random_range(0..words.len())]
    }

    fn email(&mut self, first_name: &str, last_name: &str) -> String {
        let number = self.rng.random_range(1..1000);
        let domain = self.pick(EMAIL_DOMAINS);
        format!(
            "{}.{}{}@{}",
            first_name.to_ascii_lowercase(),
            last_name.to_ascii_lowercase(),
            number,
            domain
        )
    }

    /// Birthdate giving an age between 20 and 70 today
    fn birthdate(&mut self) -> NaiveDate {
        let latest = self
            .today
            .checked_sub_months(Months::new(MIN_AGE_YEARS * 12))
            .unwrap_or(self.today);
        let earliest = self
            .today
            .checked_sub_months(Months::new((MAX_AGE_YEARS + 1) * 12))
            .and_then(|d| d.succ_opt())
            .unwrap_or(latest);

        let span = (latest - earliest).num_days().max(0) as u64;
        let offset = self.rng.random_range(0..=span);
        earliest.checked_add_days(Days::new(offset)).unwrap_or(latest)
    }
}
