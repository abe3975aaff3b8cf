// 📈 Charts - SVG renderings of the enriched order view
//
// Informational only. Four charts per run:
//   - top products by revenue (horizontal bars)
//   - orders per country (horizontal bars)
//   - top customers by revenue (horizontal bars)
//   - monthly revenue (line)
// Charts are plain SVG text so they open in any browser with no runtime.

use crate::analytics::{
    monthly_revenue, orders_by_country, top_customers_by_revenue, top_products_by_revenue,
    EnrichedOrderLine,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::info;

const WIDTH: f64 = 1000.0;
const MARGIN_LEFT: f64 = 220.0;
const MARGIN_RIGHT: f64 = 60.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 80.0;
const BAR_HEIGHT: f64 = 28.0;
const LINE_CHART_HEIGHT: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartArtifact {
    pub title: String,
    pub kind: ChartKind,
    pub path: PathBuf,
    /// Number of bars / points drawn
    pub points: usize,
}

pub struct ChartRenderer {
    dir: PathBuf,
    /// Bars shown in the product and customer rankings (default: 10)
    pub top_n: usize,
}

impl ChartRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ChartRenderer {
            dir: dir.into(),
            top_n: 10,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Render every chart into the chart directory
    pub fn to_charts(&self, lines: &[EnrichedOrderLine]) -> Result<Vec<ChartArtifact>> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create chart directory {}", self.dir.display()))?;

        let products: Vec<(String, f64)> = top_products_by_revenue(lines, self.top_n)
            .into_iter()
            .map(|p| (p.product_name, p.revenue))
            .collect();

        let countries: Vec<(String, f64)> = orders_by_country(lines)
            .into_iter()
            .map(|c| (c.country, c.order_count as f64))
            .collect();

        let customers: Vec<(String, f64)> = top_customers_by_revenue(lines, self.top_n)
            .into_iter()
            .map(|c| (c.customer_name, c.revenue))
            .collect();

        let months: Vec<(String, f64)> = monthly_revenue(lines)
            .into_iter()
            .map(|m| (m.month.to_string(), m.revenue))
            .collect();

        let products_title = format!("Top {} Products by Revenue", self.top_n);
        let customers_title = format!("Top {} Customers by Revenue", self.top_n);
        let countries_title = "Number of Orders per Country";
        let months_title = "Monthly Revenue Over Time";

        let artifacts = vec![
            self.write_chart(
                "top_products_revenue.svg",
                &products_title,
                ChartKind::Bar,
                render_bar_chart(&products_title, "Total Revenue ($)", &products),
                products.len(),
            )?,
            self.write_chart(
                "orders_per_country.svg",
                countries_title,
                ChartKind::Bar,
                render_bar_chart(countries_title, "Number of Orders", &countries),
                countries.len(),
            )?,
            self.write_chart(
                "top_customers_revenue.svg",
                &customers_title,
                ChartKind::Bar,
                render_bar_chart(&customers_title, "Total Revenue ($)", &customers),
                customers.len(),
            )?,
            self.write_chart(
                "monthly_revenue.svg",
                months_title,
                ChartKind::Line,
                render_line_chart(months_title, "Revenue ($)", &months),
                months.len(),
            )?,
        ];

        info!(dir = %self.dir.display(), charts = artifacts.len(), "charts rendered");
        Ok(artifacts)
    }

    fn write_chart(
        &self,
        file_name: &str,
        title: &str,
        kind: ChartKind,
        svg: String,
        points: usize,
    ) -> Result<ChartArtifact> {
        let path = self.dir.join(file_name);
        fs::write(&path, svg).with_context(|| format!("Failed to write chart {}", path.display()))?;

        Ok(ChartArtifact {
            title: title.to_string(),
            kind,
            path,
            points,
        })
    }
}

// ============================================================================
// SVG RENDERING
// ============================================================================

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn svg_header(height: f64, title: &str) -> String {
    let mut svg = String::new();
    svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    svg.push('\n');
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" style="background-color: white;">"#,
        WIDTH, height
    ));
    svg.push('\n');
    svg.push_str(
        r#"<style>
    .title { font-family: Verdana, sans-serif; font-size: 18px; font-weight: bold; fill: black; }
    .label { font-family: Verdana, sans-serif; font-size: 12px; fill: #333; }
    .axis { font-family: Verdana, sans-serif; font-size: 13px; fill: #666; }
</style>"#,
    );
    svg.push('\n');
    svg.push_str(&format!(
        r#"<text x="{}" y="30" class="title" text-anchor="middle">{}</text>"#,
        WIDTH / 2.0,
        escape_xml(title)
    ));
    svg.push('\n');
    svg
}

fn no_data(svg: &mut String, height: f64) {
    svg.push_str(&format!(
        r#"<text x="{}" y="{}" class="axis" text-anchor="middle">No data</text>"#,
        WIDTH / 2.0,
        height / 2.0
    ));
    svg.push('\n');
}

/// Horizontal bars, one per (label, value), largest first as given
pub fn render_bar_chart(title: &str, value_label: &str, bars: &[(String, f64)]) -> String {
    let height = MARGIN_TOP + MARGIN_BOTTOM + BAR_HEIGHT * bars.len().max(4) as f64;
    let mut svg = svg_header(height, title);

    if bars.is_empty() {
        no_data(&mut svg, height);
        svg.push_str("</svg>\n");
        return svg;
    }

    let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let max_value = bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let scale = if max_value > 0.0 { plot_width / max_value } else { 0.0 };

    for (i, (label, value)) in bars.iter().enumerate() {
        let y = MARGIN_TOP + i as f64 * BAR_HEIGHT;
        let bar_width = (value * scale).max(0.0);
        // Darker bars for higher ranks
        let shade = 40 + (i * 140 / bars.len().max(1)) as u32;

        svg.push_str(&format!(
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="rgb({},{},230)"/>"#,
            MARGIN_LEFT,
            y + 4.0,
            bar_width,
            BAR_HEIGHT - 8.0,
            shade,
            shade + 20
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" class="label" text-anchor="end">{}</text>"#,
            MARGIN_LEFT - 8.0,
            y + BAR_HEIGHT / 2.0 + 4.0,
            escape_xml(label)
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" class="label">{:.2}</text>"#,
            MARGIN_LEFT + bar_width + 6.0,
            y + BAR_HEIGHT / 2.0 + 4.0,
            value
        ));
        svg.push('\n');
    }

    svg.push_str(&format!(
        r#"<text x="{:.1}" y="{:.1}" class="axis" text-anchor="middle">{}</text>"#,
        MARGIN_LEFT + plot_width / 2.0,
        height - 30.0,
        escape_xml(value_label)
    ));
    svg.push('\n');
    svg.push_str("</svg>\n");
    svg
}

/// Polyline through (label, value) points in the order given
pub fn render_line_chart(title: &str, value_label: &str, points: &[(String, f64)]) -> String {
    let height = LINE_CHART_HEIGHT;
    let mut svg = svg_header(height, title);

    if points.is_empty() {
        no_data(&mut svg, height);
        svg.push_str("</svg>\n");
        return svg;
    }

    let plot_left = 90.0;
    let plot_width = WIDTH - plot_left - MARGIN_RIGHT;
    let plot_height = height - MARGIN_TOP - MARGIN_BOTTOM;
    let baseline = MARGIN_TOP + plot_height;
    let max_value = points.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let step = if points.len() > 1 {
        plot_width / (points.len() - 1) as f64
    } else {
        0.0
    };

    let coords: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, (_, value))| {
            let x = plot_left + step * i as f64;
            let y = if max_value > 0.0 {
                baseline - value / max_value * plot_height
            } else {
                baseline
            };
            (x, y)
        })
        .collect();

    // Axes
    svg.push_str(&format!(
        r##"<line x1="{0:.1}" y1="{1:.1}" x2="{0:.1}" y2="{2:.1}" stroke="#999"/>"##,
        plot_left, MARGIN_TOP, baseline
    ));
    svg.push('\n');
    svg.push_str(&format!(
        r##"<line x1="{:.1}" y1="{2:.1}" x2="{:.1}" y2="{2:.1}" stroke="#999"/>"##,
        plot_left,
        plot_left + plot_width,
        baseline
    ));
    svg.push('\n');

    let polyline: Vec<String> = coords.iter().map(|(x, y)| format!("{:.1},{:.1}", x, y)).collect();
    svg.push_str(&format!(
        r#"<polyline points="{}" fill="none" stroke="orange" stroke-width="2"/>"#,
        polyline.join(" ")
    ));
    svg.push('\n');

    for ((label, value), (x, y)) in points.iter().zip(&coords) {
        svg.push_str(&format!(
            r#"<circle cx="{:.1}" cy="{:.1}" r="3" fill="orange"><title>{}: {:.2}</title></circle>"#,
            x,
            y,
            escape_xml(label),
            value
        ));
        svg.push('\n');
        // Rotated month labels under the axis
        svg.push_str(&format!(
            r#"<text x="{0:.1}" y="{1:.1}" class="label" text-anchor="end" transform="rotate(-45 {0:.1} {1:.1})">{2}</text>"#,
            x,
            baseline + 16.0,
            escape_xml(label)
        ));
        svg.push('\n');
    }

    svg.push_str(&format!(
        r#"<text x="20" y="{:.1}" class="axis" transform="rotate(-90 20 {:.1})" text-anchor="middle">{}</text>"#,
        MARGIN_TOP + plot_height / 2.0,
        MARGIN_TOP + plot_height / 2.0,
        escape_xml(value_label)
    ));
    svg.push('\n');
    svg.push_str(&format!(
        r#"<text x="20" y="{:.1}" class="label">max {:.2}</text>"#,
        MARGIN_TOP - 10.0,
        max_value
    ));
    svg.push('\n');
    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{join_orders, JoinStrictness};
    use crate::entities::{Customer, Order, Product, ProductCategory};
    use chrono::NaiveDate;

    fn sample_lines() -> Vec<EnrichedOrderLine> {
        let day = |m| NaiveDate::from_ymd_opt(2024, m, 10).unwrap();
        let customers = vec![
            Customer::new(1, "Ana", "Lee", "a@example.com", "Oslo", "Norway", day(1)),
            Customer::new(2, "Bo", "Kim", "b@example.com", "Rome", "Italy", day(1)),
        ];
        let products = vec![
            Product::new(1, "Tea & Biscuits", ProductCategory::HomeAndKitchen, 12.0),
            Product::new(2, "Racket", ProductCategory::Sports, 80.0),
        ];
        let orders = vec![
            Order::new(1, 1, 1, 2, day(1)),
            Order::new(2, 2, 2, 1, day(2)),
            Order::new(3, 1, 2, 1, day(4)),
        ];
        join_orders(&customers, &products, &orders, JoinStrictness::Tolerant)
            .unwrap()
            .lines
    }

    #[test]
    fn test_to_charts_writes_four_svgs() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path().join("charts"));

        let artifacts = renderer.to_charts(&sample_lines()).unwrap();

        assert_eq!(artifacts.len(), 4);
        assert_eq!(artifacts[0].title, "Top 10 Products by Revenue");
        assert_eq!(artifacts[2].title, "Top 10 Customers by Revenue");
        for artifact in &artifacts {
            let svg = fs::read_to_string(&artifact.path).unwrap();
            assert!(svg.starts_with("<?xml"));
            assert!(svg.contains(&artifact.title));
            assert!(svg.trim_end().ends_with("</svg>"));
        }
        assert_eq!(artifacts[0].points, 2);
        assert_eq!(artifacts[1].points, 2);
        assert_eq!(artifacts[3].kind, ChartKind::Line);
        assert_eq!(artifacts[3].points, 3);

        let products = fs::read_to_string(&artifacts[0].path).unwrap();
        // Labels are escaped
        assert!(products.contains("Tea &amp; Biscuits"));
        assert_eq!(products.matches("<rect").count(), 2);
    }

    #[test]
    fn test_empty_view_renders_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ChartRenderer::new(dir.path()).to_charts(&[]).unwrap();

        assert_eq!(artifacts.len(), 4);
        for artifact in &artifacts {
            assert_eq!(artifact.points, 0);
            let svg = fs::read_to_string(&artifact.path).unwrap();
            assert!(svg.contains("No data"));
        }
    }

    #[test]
    fn test_line_chart_single_point() {
        let svg = render_line_chart("t", "v", &[("2024-01".to_string(), 5.0)]);
        assert!(svg.contains("<polyline"));
        assert_eq!(svg.matches("<circle").count(), 1);
    }

    #[test]
    fn test_bar_chart_with_all_zero_values() {
        let svg = render_bar_chart("t", "v", &[("a".to_string(), 0.0), ("b".to_string(), 0.0)]);
        assert_eq!(svg.matches(r#"width="0.0""#).count(), 2);
    }
}
