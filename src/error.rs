// ❌ Error taxonomy
//
// Storage errors are fatal and abort the run. Integrity errors only surface
// when the join runs in strict mode. Config errors come from bad env vars or
// a malformed config file. Everything else is reported, not raised.

use crate::entities::Table;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error("postgres error: {0}")]
    Postgres(#[from] postgres::Error),

    #[error("i/o error on store file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot decode {table} row {row_id}: {message}")]
    Decode {
        table: Table,
        row_id: i64,
        message: String,
    },

    #[error("store backend '{0}' is not compiled in (enable the cargo feature)")]
    BackendUnavailable(&'static str),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrityError {
    #[error("{count} order(s) reference a missing customer or product (first: order {first_order_id})")]
    UnresolvedReferences { count: usize, first_order_id: i64 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {var}: {value:?}")]
    InvalidVar { var: &'static str, value: String },
}
