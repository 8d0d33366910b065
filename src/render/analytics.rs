//! Analytics report page layout.

use std::fmt::Write as _;

use super::svg::{PAGE_HEIGHT_PX, PAGE_WIDTH_PX, card, close_page, open_page, rule, text, wrap_text};
use crate::error::ValidationError;
use crate::types::{CANONICAL_LABELS, ReportData, ReportMetric};

const MARGIN: f32 = 40.0;
const ACCENT: &str = "#059669";

/// Lay out an analytics report on one A4 page
///
/// The executive summary looks up the canonical labels; a report without
/// them cannot be laid out.
pub(crate) fn layout(product_name: &str, report: &ReportData) -> Result<String, ValidationError> {
    let summary: Vec<&ReportMetric> = CANONICAL_LABELS
        .iter()
        .map(|label| report.require_metric(label))
        .collect::<Result<_, _>>()?;

    let right = PAGE_WIDTH_PX - MARGIN;
    let content_width = right - MARGIN;
    let mut svg = String::with_capacity(8 * 1024);
    open_page(&mut svg, "#f9fafb");

    // Header
    let _ = writeln!(
        svg,
        "  <rect x='{MARGIN}' y='40' width='48' height='48' rx='8' fill='{ACCENT}'/>"
    );
    text(&mut svg, MARGIN + 64.0, 70.0, 32.0, 700, "#1f2937", "start", product_name);
    text(&mut svg, MARGIN + 64.0, 94.0, 15.0, 400, "#6b7280", "start", &report.title);
    text(&mut svg, right, 62.0, 12.0, 400, "#6b7280", "end", "Report Generated On:");
    text(
        &mut svg,
        right,
        82.0,
        14.0,
        500,
        "#374151",
        "end",
        &report.generated_at.format("%B %-d, %Y").to_string(),
    );
    rule(&mut svg, MARGIN, right, 118.0, "#e5e7eb", 2.0);

    // Executive summary cards
    text(&mut svg, MARGIN, 162.0, 22.0, 600, "#1f2937", "start", "Executive Summary");
    let gap = 16.0;
    let card_width = (content_width - 2.0 * gap) / 3.0;
    let card_y = 180.0;
    for (i, metric) in summary.iter().enumerate() {
        let x = MARGIN + i as f32 * (card_width + gap);
        card(&mut svg, x, card_y, card_width, 100.0, "#ffffff", "#e5e7eb");
        text(&mut svg, x + 18.0, card_y + 30.0, 13.0, 400, "#4b5563", "start", &metric.label);
        text(
            &mut svg,
            x + 18.0,
            card_y + 64.0,
            24.0,
            700,
            "#1f2937",
            "start",
            format!("{} {}", metric.value, metric.unit).trim_end(),
        );
        if let Some(trend) = metric.trend {
            let color = if trend > 0.0 { "#dc2626" } else { ACCENT };
            text(
                &mut svg,
                x + 18.0,
                card_y + 86.0,
                11.0,
                400,
                color,
                "start",
                &format!("{:+.1}% vs previous period", trend),
            );
        }
    }

    // Remaining metrics as a summary table
    let mut y = card_y + 140.0;
    let extra: Vec<&ReportMetric> = report
        .metrics
        .iter()
        .filter(|m| !CANONICAL_LABELS.contains(&m.label.as_str()))
        .collect();
    if !extra.is_empty() {
        text(&mut svg, MARGIN, y, 18.0, 600, "#1f2937", "start", "Period Summary");
        y += 12.0;
        card(&mut svg, MARGIN, y, content_width, 16.0 + 30.0 * extra.len() as f32, "#ffffff", "#e5e7eb");
        y += 8.0;
        for (i, metric) in extra.iter().enumerate() {
            let row_y = y + 20.0 + i as f32 * 30.0;
            text(&mut svg, MARGIN + 18.0, row_y, 13.0, 400, "#4b5563", "start", &metric.label);
            text(
                &mut svg,
                right - 18.0,
                row_y,
                13.0,
                600,
                "#1f2937",
                "end",
                format!("{} {}", metric.value, metric.unit).trim_end(),
            );
            if i + 1 < extra.len() {
                rule(&mut svg, MARGIN + 18.0, right - 18.0, row_y + 10.0, "#f3f4f6", 1.0);
            }
        }
        y += 30.0 * extra.len() as f32 + 48.0;
    }

    // Recommendations
    if !report.recommendations.is_empty() {
        text(&mut svg, MARGIN, y, 18.0, 600, "#1f2937", "start", "AI-Powered Recommendations");
        y += 14.0;
        for recommendation in &report.recommendations {
            let lines = wrap_text(recommendation, 88);
            let height = 20.0 + 18.0 * lines.len() as f32;
            card(&mut svg, MARGIN, y, content_width, height, "#ffffff", "#e5e7eb");
            let _ = writeln!(
                svg,
                "  <rect x='{MARGIN}' y='{y:.1}' width='4' height='{height:.1}' fill='{ACCENT}'/>"
            );
            for (i, line) in lines.iter().enumerate() {
                text(&mut svg, MARGIN + 20.0, y + 24.0 + 18.0 * i as f32, 13.0, 400, "#374151", "start", line);
            }
            y += height + 10.0;
        }
    }

    // Footer
    let footer_y = PAGE_HEIGHT_PX - 48.0;
    rule(&mut svg, MARGIN, right, footer_y - 20.0, "#e5e7eb", 1.0);
    text(
        &mut svg,
        PAGE_WIDTH_PX / 2.0,
        footer_y,
        10.0,
        400,
        "#6b7280",
        "middle",
        &format!("{} Energy Solutions | Confidential Report | Page 1 of 1", product_name),
    );

    close_page(&mut svg);
    Ok(svg)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CO2_EMISSIONS, TOTAL_CONSUMPTION, TOTAL_COST};
    use chrono::{TimeZone, Utc};

    fn report() -> ReportData {
        ReportData {
            title: "Advanced Analytics Report".into(),
            generated_at: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
            metrics: vec![
                ReportMetric::new(TOTAL_CONSUMPTION, "60.0", "kWh").with_trend(Some(5.2)),
                ReportMetric::new(TOTAL_COST, "$12.40", ""),
                ReportMetric::new(CO2_EMISSIONS, "25.1", "kg"),
                ReportMetric::new("Peak Consumption", "30.0", "kWh"),
            ],
            recommendations: vec!["Shift laundry & dishwashing to off-peak <night> hours.".into()],
        }
    }

    #[test]
    fn lays_out_canonical_metrics_and_date() {
        let svg = layout("EcoFlow", &report()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("60.0 kWh"));
        assert!(svg.contains("$12.40<"));
        assert!(svg.contains("January 15, 2024"));
        assert!(svg.contains("+5.2% vs previous period"));
        assert!(svg.contains("Peak Consumption"));
        assert!(svg.contains("Page 1 of 1"));
    }

    #[test]
    fn escapes_recommendation_text() {
        let svg = layout("EcoFlow", &report()).unwrap();
        assert!(svg.contains("&amp; dishwashing"));
        assert!(svg.contains("&lt;night&gt;"));
    }

    #[test]
    fn missing_canonical_metric_is_rejected() {
        let mut r = report();
        r.metrics.retain(|m| m.label != TOTAL_COST);
        let err = layout("EcoFlow", &r).unwrap_err();
        assert!(matches!(err, ValidationError::MissingMetric { ref label } if label == TOTAL_COST));
    }
}
