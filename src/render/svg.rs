//! Shared SVG page helpers for the report templates.

use std::fmt::Write as _;

/// ISO A4 width in millimetres
pub const PAGE_WIDTH_MM: f32 = 210.0;
/// ISO A4 height in millimetres
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// A4 width in CSS pixels (96 dpi)
pub const PAGE_WIDTH_PX: f32 = PAGE_WIDTH_MM * 96.0 / 25.4;
/// A4 height in CSS pixels (96 dpi)
pub const PAGE_HEIGHT_PX: f32 = PAGE_HEIGHT_MM * 96.0 / 25.4;

pub(crate) const FONT: &str = "Inter, Helvetica, Arial, sans-serif";

/// Open an A4 page with a solid background
pub(crate) fn open_page(svg: &mut String, background: &str) {
    let _ = writeln!(
        svg,
        "<svg xmlns='http://www.w3.org/2000/svg' width='{PAGE_WIDTH_MM}mm' height='{PAGE_HEIGHT_MM}mm' viewBox='0 0 {PAGE_WIDTH_PX:.2} {PAGE_HEIGHT_PX:.2}'>"
    );
    let _ = writeln!(
        svg,
        "  <rect x='0' y='0' width='{PAGE_WIDTH_PX:.2}' height='{PAGE_HEIGHT_PX:.2}' fill='{background}'/>"
    );
}

pub(crate) fn close_page(svg: &mut String) {
    let _ = writeln!(svg, "</svg>");
}

/// Emit a text node; `anchor` is `start`, `middle`, or `end`
#[allow(clippy::too_many_arguments)]
pub(crate) fn text(
    svg: &mut String,
    x: f32,
    y: f32,
    size: f32,
    weight: u16,
    fill: &str,
    anchor: &str,
    content: &str,
) {
    let _ = writeln!(
        svg,
        "  <text x='{x:.1}' y='{y:.1}' font-family='{FONT}' font-size='{size:.1}' font-weight='{weight}' fill='{fill}' text-anchor='{anchor}'>{}</text>",
        escape_text(content)
    );
}

/// Emit a rounded card
pub(crate) fn card(svg: &mut String, x: f32, y: f32, width: f32, height: f32, fill: &str, stroke: &str) {
    let _ = writeln!(
        svg,
        "  <rect x='{x:.1}' y='{y:.1}' width='{width:.1}' height='{height:.1}' rx='10' fill='{fill}' stroke='{stroke}' stroke-width='1'/>"
    );
}

/// Emit a horizontal rule
pub(crate) fn rule(svg: &mut String, x1: f32, x2: f32, y: f32, stroke: &str, width: f32) {
    let _ = writeln!(
        svg,
        "  <line x1='{x1:.1}' y1='{y:.1}' x2='{x2:.1}' y2='{y:.1}' stroke='{stroke}' stroke-width='{width:.1}'/>"
    );
}

pub(crate) fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Greedy word wrap by character count
pub(crate) fn wrap_text(input: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in input.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
