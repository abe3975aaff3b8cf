// ⚙️ Pipeline configuration
//
// Sources, lowest precedence first:
//   1. built-in defaults (100 customers, 60 products, 500 orders)
//   2. JSON file named by ECOMMERCE_CONFIG (any subset of fields)
//   3. ECOMMERCE_* environment variables
//
// Secondary store credentials only ever arrive through 2 or 3.

use crate::analytics::JoinStrictness;
use crate::error::ConfigError;
use crate::store::StoreTarget;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_FILE_VAR: &str = "ECOMMERCE_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Primary SQLite file, recreated on every run
    pub primary_db: PathBuf,

    /// Where the migrator copies the primary store to
    pub secondary: StoreTarget,

    /// Reset the secondary schema before copying
    pub reset_secondary: bool,

    /// Compare source and destination fingerprints after migrating
    pub verify_migration: bool,

    /// CSV files and the JSON run report
    pub export_dir: PathBuf,

    /// SVG charts
    pub chart_dir: PathBuf,

    pub customer_count: usize,
    pub product_count: usize,
    pub order_count: usize,

    /// Orders are dated within this many days before today
    pub order_window_days: u64,

    /// Fixed seed for reproducible data; None draws one from the OS
    pub seed: Option<u64>,

    pub join_strictness: JoinStrictness,

    /// Size of the KPI rankings
    pub top_n: usize,

    /// Size of the chart rankings
    pub chart_top_n: usize,

    pub log_level: String,
    pub log_json: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            primary_db: PathBuf::from("ecommerce.db"),
            secondary: StoreTarget::sqlite("ecommerce_replica.db"),
            reset_secondary: true,
            verify_migration: true,
            export_dir: PathBuf::from("export"),
            chart_dir: PathBuf::from("export/charts"),
            customer_count: 100,
            product_count: 60,
            order_count: 500,
            order_window_days: 730,
            seed: None,
            join_strictness: JoinStrictness::Tolerant,
            top_n: 5,
            chart_top_n: 10,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl PipelineConfig {
    /// Defaults, then the optional config file, then the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::load_from(&vars)
    }

    /// Same as `load` but reads variables from a map (testable without
    /// touching the process environment)
    pub fn load_from(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = match vars.get(CONFIG_FILE_VAR) {
            Some(path) if !path.is_empty() => Self::from_file(Path::new(path))?,
            _ => Self::default(),
        };
        config.apply_env(vars)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    fn apply_env(&mut self, vars: &HashMap<String, String>) -> Result<(), ConfigError> {
        if let Some(path) = vars.get("ECOMMERCE_PRIMARY_DB") {
            self.primary_db = PathBuf::from(path);
        }

        // A URL wins over a path when both are set
        if let Some(path) = vars.get("ECOMMERCE_SECONDARY_DB") {
            self.secondary = StoreTarget::sqlite(path);
        }
        if let Some(url) = vars.get("ECOMMERCE_SECONDARY_URL") {
            self.secondary = StoreTarget::Postgres { url: url.clone() };
        }

        if let Some(dir) = vars.get("ECOMMERCE_EXPORT_DIR") {
            self.export_dir = PathBuf::from(dir);
        }
        if let Some(dir) = vars.get("ECOMMERCE_CHART_DIR") {
            self.chart_dir = PathBuf::from(dir);
        }

        parse_var(vars, "ECOMMERCE_RESET_SECONDARY", &mut self.reset_secondary)?;
        parse_var(vars, "ECOMMERCE_VERIFY_MIGRATION", &mut self.verify_migration)?;
        parse_var(vars, "ECOMMERCE_CUSTOMERS", &mut self.customer_count)?;
        parse_var(vars, "ECOMMERCE_PRODUCTS", &mut self.product_count)?;
        parse_var(vars, "ECOMMERCE_ORDERS", &mut self.order_count)?;
        parse_var(vars, "ECOMMERCE_ORDER_WINDOW_DAYS", &mut self.order_window_days)?;
        parse_var(vars, "ECOMMERCE_TOP_N", &mut self.top_n)?;
        parse_var(vars, "ECOMMERCE_CHART_TOP_N", &mut self.chart_top_n)?;
        parse_var(vars, "ECOMMERCE_LOG_JSON", &mut self.log_json)?;

        if let Some(raw) = vars.get("ECOMMERCE_SEED") {
            let seed = raw.parse::<u64>().map_err(|_| ConfigError::InvalidVar {
                var: "ECOMMERCE_SEED",
                value: raw.clone(),
            })?;
            self.seed = Some(seed);
        }

        if let Some(raw) = vars.get("ECOMMERCE_JOIN_STRICTNESS") {
            self.join_strictness = match raw.to_ascii_lowercase().as_str() {
                "tolerant" => JoinStrictness::Tolerant,
                "strict" => JoinStrictness::Strict,
                _ => {
                    return Err(ConfigError::InvalidVar {
                        var: "ECOMMERCE_JOIN_STRICTNESS",
                        value: raw.clone(),
                    })
                }
            };
        }

        if let Some(level) = vars.get("ECOMMERCE_LOG_LEVEL") {
            self.log_level = level.clone();
        }

        Ok(())
    }
}

fn parse_var<T: FromStr>(
    vars: &HashMap<String, String>,
    var: &'static str,
    slot: &mut T,
) -> Result<(), ConfigError> {
    if let Some(raw) = vars.get(var) {
        *slot = raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
            var,
            value: raw.clone(),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_record_counts() {
        let config = PipelineConfig::load_from(&HashMap::new()).unwrap();
        assert_eq!(config.customer_count, 100);
        assert_eq!(config.product_count, 60);
        assert_eq!(config.order_count, 500);
        assert_eq!(config.top_n, 5);
        assert_eq!(config.join_strictness, JoinStrictness::Tolerant);
        assert_eq!(config.secondary, StoreTarget::sqlite("ecommerce_replica.db"));
    }

    #[test]
    fn test_env_overrides() {
        let config = PipelineConfig::load_from(&vars(&[
            ("ECOMMERCE_ORDERS", "42"),
            ("ECOMMERCE_SEED", "7"),
            ("ECOMMERCE_JOIN_STRICTNESS", "Strict"),
            ("ECOMMERCE_SECONDARY_URL", "postgres://u:p@db/shop"),
            ("ECOMMERCE_LOG_JSON", "true"),
        ]))
        .unwrap();

        assert_eq!(config.order_count, 42);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.join_strictness, JoinStrictness::Strict);
        assert!(config.log_json);
        assert_eq!(
            config.secondary,
            StoreTarget::Postgres {
                url: "postgres://u:p@db/shop".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_env_value_is_an_error() {
        let err = PipelineConfig::load_from(&vars(&[("ECOMMERCE_ORDERS", "lots")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidVar { var: "ECOMMERCE_ORDERS", .. }
        ));

        let err =
            PipelineConfig::load_from(&vars(&[("ECOMMERCE_JOIN_STRICTNESS", "maybe")])).unwrap_err();
        assert!(err.to_string().contains("ECOMMERCE_JOIN_STRICTNESS"));
    }

    #[test]
    fn test_negative_order_window_is_rejected() {
        let err = PipelineConfig::load_from(&vars(&[("ECOMMERCE_ORDER_WINDOW_DAYS", "-30")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidVar { var: "ECOMMERCE_ORDER_WINDOW_DAYS", .. }
        ));

        let config =
            PipelineConfig::load_from(&vars(&[("ECOMMERCE_ORDER_WINDOW_DAYS", "30")])).unwrap();
        assert_eq!(config.order_window_days, 30);
    }

    #[test]
    fn test_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        fs::write(
            &path,
            r#"{
                "customer_count": 10,
                "order_count": 20,
                "secondary": {"backend": "memory"}
            }"#,
        )
        .unwrap();

        let config = PipelineConfig::load_from(&vars(&[
            (CONFIG_FILE_VAR, path.to_str().unwrap()),
            ("ECOMMERCE_ORDERS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.customer_count, 10);
        // Env beats file
        assert_eq!(config.order_count, 30);
        // Untouched fields keep defaults
        assert_eq!(config.product_count, 60);
        assert_eq!(config.secondary, StoreTarget::Memory);
    }

    #[test]
    fn test_missing_config_file() {
        let err = PipelineConfig::load_from(&vars(&[(CONFIG_FILE_VAR, "/nonexistent/pipeline.json")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
