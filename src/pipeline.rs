// 🔄 Pipeline - every stage, in order, with one report per stage
//
//   generate → primary store → secondary store → profile + quality
//            → KPIs → CSV export → charts → pipeline_report.json
//
// Storage failures abort the run. Everything else (dropped orders, quality
// issues, failed migration rows) is carried in the report.

use crate::analytics::{AnalyticsEngine, KpiReport};
use crate::charts::{ChartArtifact, ChartRenderer};
use crate::config::PipelineConfig;
use crate::data_quality::{DataQualityEngine, QualityReport};
use crate::entities::Dataset;
use crate::explore::DatasetProfile;
use crate::export::Exporter;
use crate::generator::DataGenerator;
use crate::initializer::{LoadReport, StoreInitializer};
use crate::migration::{MigrationReport, Migrator};
use crate::store::{open_store, RelationalStore};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

pub const REPORT_FILE_NAME: &str = "pipeline_report.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    /// Seed the dataset was generated from; None for a caller-supplied generator
    pub seed: Option<u64>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    pub primary: LoadReport,
    /// Redacted description of the secondary target
    pub secondary: String,
    pub migration: MigrationReport,
    pub profile: DatasetProfile,
    pub quality: QualityReport,
    pub kpis: KpiReport,
    pub exported_files: Vec<PathBuf>,
    pub charts: Vec<ChartArtifact>,
}

impl PipelineReport {
    pub fn summary(&self) -> String {
        format!(
            "run {}: {} rows loaded, {}; {} lines analysed, {} dropped; {} files, {} charts",
            self.run_id,
            self.primary.customers + self.primary.products + self.primary.orders,
            self.migration.summary(),
            self.kpis.line_count,
            self.kpis.dropped_orders.len(),
            self.exported_files.len(),
            self.charts.len()
        )
    }
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Pipeline { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run with a generator seeded from the config (or a fresh random seed)
    pub fn run(&self) -> Result<PipelineReport> {
        let seed = self.config.seed.unwrap_or_else(rand::random::<u64>);
        let today = Utc::now().date_naive();
        let generator =
            DataGenerator::seeded(seed, today).with_order_window(self.config.order_window_days);

        info!(seed, "generator seeded");
        self.run_with_generator(generator, Some(seed))
    }

    pub fn run_with_generator<R: Rng>(
        &self,
        mut generator: DataGenerator<R>,
        seed: Option<u64>,
    ) -> Result<PipelineReport> {
        let config = &self.config;
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, "pipeline started");

        // 1. Generate
        let generated = generator.dataset(
            config.customer_count,
            config.product_count,
            config.order_count,
        );
        info!(rows = generated.total_rows(), "dataset generated");

        // 2. Primary store
        let (mut primary, primary_report) =
            StoreInitializer::recreate_sqlite(&config.primary_db, &generated).with_context(|| {
                format!("Failed to initialize primary store {}", config.primary_db.display())
            })?;
        if !primary_report.matches(&generated) {
            warn!(report = %primary_report.summary(), "primary store row counts differ from the generated dataset");
        }

        // Everything downstream reads what the primary store actually holds
        let dataset = primary
            .load_dataset()
            .context("Failed to read back the primary store")?;

        // 3. Secondary store
        let mut secondary = open_store(&config.secondary)
            .with_context(|| format!("Failed to open secondary store {}", config.secondary.describe()))?;
        let migration = Migrator::with_options(config.reset_secondary, config.verify_migration)
            .copy_all(&mut primary, secondary.as_mut())
            .context("Migration to the secondary store failed")?;

        // 4. Profile + quality
        let profile = DatasetProfile::from_dataset(&dataset);
        let quality = DataQualityEngine::new().validate(&dataset);
        if quality.has_critical_issues() {
            warn!(summary = %quality.summary(), "critical data quality issues");
        }

        // 5. KPIs (joined once, the lines feed the charts too)
        let engine = AnalyticsEngine::with_settings(config.top_n, config.join_strictness);
        let outcome = engine
            .join(&dataset.customers, &dataset.products, &dataset.orders)
            .context("Join of orders with customers and products failed")?;
        let kpis = engine.report(&outcome);

        // 6. Flat files
        let exported_files = Exporter::new(&config.export_dir).to_flat_files(&dataset)?;

        // 7. Charts
        let charts = ChartRenderer::new(&config.chart_dir)
            .with_top_n(config.chart_top_n)
            .to_charts(&outcome.lines)?;

        let report = PipelineReport {
            run_id,
            seed,
            started_at,
            finished_at: Utc::now(),
            primary: primary_report,
            secondary: config.secondary.describe(),
            migration,
            profile,
            quality,
            kpis,
            exported_files,
            charts,
        };

        // 8. Run report
        let report_path = write_report(&config.export_dir, &report)?;
        info!(path = %report_path.display(), "pipeline finished");

        Ok(report)
    }
}

/// Serialize the report as pretty JSON into `dir`
pub fn write_report(dir: &std::path::Path, report: &PipelineReport) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create report directory {}", dir.display()))?;
    let path = dir.join(REPORT_FILE_NAME);
    let json = serde_json::to_string_pretty(report).context("Failed to serialize pipeline report")?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Load a previously written run report
pub fn read_report(dir: &std::path::Path) -> Result<PipelineReport> {
    let path = dir.join(REPORT_FILE_NAME);
    let json = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Reload the exported CSVs of a finished run
pub fn reload_export(config: &PipelineConfig) -> Result<Dataset> {
    Exporter::new(&config.export_dir).load_flat_files()
}
