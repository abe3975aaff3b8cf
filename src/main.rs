use anyhow::{Context, Result};
use ecommerce_analytics::{init_logging, Pipeline, PipelineConfig, PipelineReport, VERSION};

fn main() -> Result<()> {
    let config = PipelineConfig::load().context("Failed to load configuration")?;
    init_logging(&config.log_level, config.log_json);

    println!("🛒 E-commerce Analytics Pipeline v{}", VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Primary:   {}", config.primary_db.display());
    println!("Secondary: {}", config.secondary.describe());

    let report = Pipeline::new(config).run()?;
    print_report(&report);

    Ok(())
}

fn print_report(report: &PipelineReport) {
    match report.seed {
        Some(seed) => println!("\n🎲 Generated dataset (seed {})", seed),
        None => println!("\n🎲 Generated dataset"),
    }

    println!("\n🔧 Primary store...");
    println!("✓ {}", report.primary.summary());

    println!("\n🚚 Migration...");
    println!("✓ {}", report.migration.summary());
    for failure in report.migration.failures.iter().take(5) {
        println!("   ⚠️  {} #{}: {}", failure.table, failure.row_id, failure.error);
    }

    println!("\n🔎 Profile...");
    println!("✓ {}", report.profile.summary());
    if let Some(stats) = &report.profile.quantity {
        println!(
            "   quantity: mean {:.2}, std {:.2}, min {}, median {}, max {}",
            stats.mean, stats.std, stats.min, stats.median, stats.max
        );
    }

    println!("\n🧪 Data quality...");
    println!("{}", report.quality.summary());

    println!("\n📊 KPIs...");
    println!("{}", report.kpis.summary());
    println!("   Top customers by orders:");
    for entry in &report.kpis.top_customers {
        println!(
            "     {} {} ({}): {}",
            entry.customer.first_name, entry.customer.last_name, entry.customer.city, entry.order_count
        );
    }
    println!("   Top products by revenue:");
    for entry in &report.kpis.top_products {
        println!("     {}: ${:.2}", entry.product_name, entry.revenue);
    }
    println!("   Monthly revenue:");
    for entry in &report.kpis.monthly_revenue {
        println!("     {}: ${:.2}", entry.month, entry.revenue);
    }

    println!("\n📤 Export...");
    for path in &report.exported_files {
        println!("✓ {}", path.display());
    }
    for chart in &report.charts {
        println!("✓ {} ({})", chart.path.display(), chart.title);
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if report.migration.is_complete() && report.kpis.dropped_orders.is_empty() {
        println!("🎉 Pipeline COMPLETE! (run {})", report.run_id);
    } else {
        println!("✅ Pipeline finished with warnings (run {})", report.run_id);
        println!("✓ Rows not migrated: {}", report.migration.failures.len());
        println!("✓ Orders dropped from analysis: {}", report.kpis.dropped_orders.len());
    }
}
