//! ESG report page layout.

use std::f32::consts::PI;
use std::fmt::Write as _;

use super::svg::{PAGE_HEIGHT_PX, PAGE_WIDTH_PX, card, close_page, open_page, rule, text, wrap_text};
use crate::types::{EsgReportData, Pillar, PillarScore};

const MARGIN: f32 = 44.0;
const RING_RADIUS: f32 = 38.0;

fn pillar_color(pillar: Pillar) -> &'static str {
    match pillar {
        Pillar::Environmental => "#10b981",
        Pillar::Social => "#3b82f6",
        Pillar::Governance => "#8b5cf6",
    }
}

/// Lay out an ESG report on one A4 page
pub(crate) fn layout(product_name: &str, report: &EsgReportData) -> String {
    let right = PAGE_WIDTH_PX - MARGIN;
    let content_width = right - MARGIN;
    let mut svg = String::with_capacity(12 * 1024);
    open_page(&mut svg, "#f8fafc");

    // Header
    let _ = writeln!(
        svg,
        "  <rect x='{MARGIN}' y='40' width='52' height='52' rx='10' fill='#059669'/>"
    );
    text(&mut svg, MARGIN + 68.0, 72.0, 32.0, 700, "#1e293b", "start", product_name);
    text(&mut svg, MARGIN + 68.0, 96.0, 15.0, 400, "#64748b", "start", "ESG & Sustainability Report");
    text(&mut svg, right, 64.0, 12.0, 400, "#64748b", "end", &report.company_name);
    text(&mut svg, right, 84.0, 14.0, 500, "#334155", "end", &report.report_period);
    rule(&mut svg, MARGIN, right, 120.0, "#e2e8f0", 2.0);

    // Headline figures
    let half = (content_width - 24.0) / 2.0;
    let top = 144.0;
    for (i, (title, value)) in [
        ("OVERALL ESG SCORE", format!("{}/100", report.overall_score)),
        ("INDUSTRY RANKING", format!("#{}", report.industry_ranking)),
    ]
    .iter()
    .enumerate()
    {
        let x = MARGIN + i as f32 * (half + 24.0);
        card(&mut svg, x, top, half, 104.0, "#ffffff", "#e2e8f0");
        text(&mut svg, x + half / 2.0, top + 30.0, 11.0, 600, "#64748b", "middle", title);
        text(&mut svg, x + half / 2.0, top + 80.0, 40.0, 700, "#059669", "middle", value);
    }

    // Pillar cards
    let gap = 18.0;
    let pillar_width = (content_width - 2.0 * gap) / 3.0;
    let pillar_top = top + 128.0;
    let pillar_rows = report
        .pillars()
        .iter()
        .map(|p| p.sub_scores.len() + p.counts.len())
        .max()
        .unwrap_or(0);
    let pillar_height = 190.0 + 26.0 * pillar_rows as f32;
    for (i, pillar) in report.pillars().iter().enumerate() {
        let x = MARGIN + i as f32 * (pillar_width + gap);
        pillar_card(&mut svg, x, pillar_top, pillar_width, pillar_height, pillar);
    }

    // Certifications and improvement areas
    let mut y = pillar_top + pillar_height + 44.0;
    text(&mut svg, MARGIN, y, 18.0, 600, "#1e293b", "start", "Certifications");
    let column_x = MARGIN + half + 24.0;
    text(&mut svg, column_x, y, 18.0, 600, "#1e293b", "start", "Improvement Areas");
    y += 14.0;

    let mut cert_y = y;
    for cert in &report.certifications {
        card(&mut svg, MARGIN, cert_y, half, 32.0, "#ffffff", "#e2e8f0");
        text(&mut svg, MARGIN + 14.0, cert_y + 21.0, 13.0, 500, "#334155", "start", cert);
        cert_y += 40.0;
    }

    let mut area_y = y;
    for area in &report.improvement_areas {
        let lines = wrap_text(area, 40);
        let height = 16.0 + 17.0 * lines.len() as f32;
        let _ = writeln!(
            svg,
            "  <rect x='{column_x:.1}' y='{area_y:.1}' width='{half:.1}' height='{height:.1}' fill='#ecfdf5'/>"
        );
        let _ = writeln!(
            svg,
            "  <rect x='{column_x:.1}' y='{area_y:.1}' width='4' height='{height:.1}' fill='#10b981'/>"
        );
        for (i, line) in lines.iter().enumerate() {
            text(&mut svg, column_x + 16.0, area_y + 21.0 + 17.0 * i as f32, 12.5, 400, "#334155", "start", line);
        }
        area_y += height + 8.0;
    }

    // Footer
    let footer_y = PAGE_HEIGHT_PX - 48.0;
    rule(&mut svg, MARGIN, right, footer_y - 20.0, "#e2e8f0", 1.0);
    text(
        &mut svg,
        PAGE_WIDTH_PX / 2.0,
        footer_y,
        10.0,
        400,
        "#64748b",
        "middle",
        &format!(
            "Confidential Report Generated by {} | {}",
            product_name,
            report.generated_at.format("%Y-%m-%d %H:%M UTC")
        ),
    );

    close_page(&mut svg);
    svg
}

fn pillar_card(svg: &mut String, x: f32, y: f32, width: f32, height: f32, pillar: &PillarScore) {
    let color = pillar_color(pillar.pillar);
    card(svg, x, y, width, height, "#ffffff", "#e2e8f0");
    text(svg, x + 18.0, y + 32.0, 17.0, 700, "#1e293b", "start", pillar.pillar.title());

    // Score ring: full track plus an arc covering score/100 of the circumference
    let cx = x + width / 2.0;
    let cy = y + 98.0;
    let circumference = 2.0 * PI * RING_RADIUS;
    let offset = circumference * (1.0 - (pillar.score as f32 / 100.0).clamp(0.0, 1.0));
    let _ = writeln!(
        svg,
        "  <circle cx='{cx:.1}' cy='{cy:.1}' r='{RING_RADIUS}' fill='none' stroke='#e2e8f0' stroke-width='10'/>"
    );
    let _ = writeln!(
        svg,
        "  <circle cx='{cx:.1}' cy='{cy:.1}' r='{RING_RADIUS}' fill='none' stroke='{color}' stroke-width='10' stroke-linecap='round' stroke-dasharray='{circumference:.2}' stroke-dashoffset='{offset:.2}' transform='rotate(-90 {cx:.1} {cy:.1})'/>"
    );
    text(svg, cx, cy + 9.0, 24.0, 700, "#1e293b", "middle", &format!("{:.1}", pillar.score));

    let mut row_y = y + 174.0;
    for sub in &pillar.sub_scores {
        metric_row(svg, x, width, row_y, &sub.label, &format!("{}%", sub.value));
        row_y += 26.0;
    }
    for count in &pillar.counts {
        metric_row(svg, x, width, row_y, &count.label, &count.value.to_string());
        row_y += 26.0;
    }
}

fn metric_row(svg: &mut String, x: f32, width: f32, y: f32, label: &str, value: &str) {
    text(svg, x + 18.0, y, 12.0, 400, "#475569", "start", label);
    text(svg, x + width - 18.0, y, 12.0, 700, "#1e293b", "end", value);
    rule(svg, x + 18.0, x + width - 18.0, y + 9.0, "#f1f5f9", 1.0);
}
