// E-commerce Analytics Pipeline - Core Library
// Exposes every stage for the binary, the integration tests and embedding callers

pub mod entities;       // Customers, products, orders
pub mod error;          // Storage / integrity / config errors
pub mod config;         // Defaults + JSON file + env overrides
pub mod logging;        // tracing subscriber setup

pub mod store;          // Relational store interface + target selection
pub mod db;             // SQLite backend (primary store)
#[cfg(feature = "postgres")]
pub mod postgres_store; // PostgreSQL backend (secondary store)

pub mod generator;      // Seeded synthetic data
pub mod initializer;    // Fresh schema + bulk load
pub mod migration;      // Row-by-row copy between stores
pub mod explore;        // Row counts, blanks, quantity statistics
pub mod data_quality;   // Validation rules with severities
pub mod analytics;      // Join, revenue, rankings, monthly series
pub mod export;         // CSV flat files
pub mod charts;         // SVG charts
pub mod pipeline;       // All stages, in order

// Re-export commonly used types
pub use entities::{Customer, Dataset, Order, Product, ProductCategory, Table};
pub use error::{ConfigError, IntegrityError, StoreError};
pub use config::PipelineConfig;
pub use logging::init_logging;
pub use store::{open_store, RelationalStore, StoreTarget};
pub use db::SqliteStore;
#[cfg(feature = "postgres")]
pub use postgres_store::PostgresStore;
pub use generator::{DataGenerator, Record, RecordKind};
pub use initializer::{LoadReport, StoreInitializer};
pub use migration::{MigrationReport, Migrator, RowFailure, TableMigration};
pub use explore::{ColumnStats, DatasetProfile, TableProfile};
pub use data_quality::{DataQualityEngine, QualityIssue, QualityReport, Severity};
pub use analytics::{
    join_orders, monthly_revenue, most_profitable_product, orders_by_country,
    top_customers_by_orders, top_customers_by_revenue, top_products_by_revenue,
    AnalyticsEngine, CustomerKey, CustomerOrderCount, CustomerRevenue, DroppedOrder,
    EnrichedOrderLine, JoinOutcome, JoinStrictness, KpiReport, MissingReference,
    MonthlyRevenue, OrderMonth, ProductRevenue,
};
pub use export::Exporter;
pub use charts::{ChartArtifact, ChartKind, ChartRenderer};
pub use pipeline::{Pipeline, PipelineReport};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
