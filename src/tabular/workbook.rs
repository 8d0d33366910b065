//! Single-sheet Office Open XML workbook writer.
//!
//! An `.xlsx` file is a zip container of XML parts. Only the parts a
//! spreadsheet application requires are written; cell text is stored inline so
//! no shared-string table is needed.

use std::fmt::Write as _;
use std::io::{Cursor, Write};
use zip::CompressionMethod;
use zip::write::{FileOptions, ZipWriter};

use super::TabularRow;
use crate::error::EncodingError;

const HEADERS: [&str; 5] = ["Section", "Label", "Value", "Unit", "Trend"];
const COLUMNS: [char; 5] = ['A', 'B', 'C', 'D', 'E'];

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

// Style 0 is the default, style 1 is the bold header
const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs></styleSheet>"#;

/// Write `rows` under a bold header row into a one-sheet workbook
pub(super) fn write(rows: &[TabularRow], sheet_name: &str) -> Result<Vec<u8>, EncodingError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("xl/workbook.xml", workbook_xml(sheet_name)),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
        ("xl/styles.xml", STYLES.to_string()),
        ("xl/worksheets/sheet1.xml", sheet_xml(rows)),
    ];
    for (name, body) in parts {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())
            .map_err(|e| EncodingError::Spreadsheet(e.into()))?;
    }

    Ok(zip.finish()?.into_inner())
}

fn workbook_xml(sheet_name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        escape_xml(&sheet_title(sheet_name))
    )
}

/// Sheet names are limited to 31 characters and may not contain `[]:*?/\`
fn sheet_title(name: &str) -> String {
    name.chars()
        .map(|c| if "[]:*?/\\".contains(c) { '_' } else { c })
        .take(31)
        .collect()
}

fn sheet_xml(rows: &[TabularRow]) -> String {
    let mut xml = String::with_capacity(256 + rows.len() * 256);
    xml.push_str(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    xml.push_str(r#"<row r="1">"#);
    for (column, header) in COLUMNS.iter().zip(HEADERS) {
        inline_cell(&mut xml, *column, 1, header, Some(1));
    }
    xml.push_str("</row>");

    for (i, row) in rows.iter().enumerate() {
        let r = i + 2;
        let _ = write!(xml, r#"<row r="{}">"#, r);
        inline_cell(&mut xml, 'A', r, &row.section, None);
        inline_cell(&mut xml, 'B', r, &row.label, None);
        match row.value.parse::<f64>() {
            Ok(n) if n.is_finite() => number_cell(&mut xml, 'C', r, n),
            _ => inline_cell(&mut xml, 'C', r, &row.value, None),
        }
        if !row.unit.is_empty() {
            inline_cell(&mut xml, 'D', r, &row.unit, None);
        }
        if let Some(trend) = row.trend {
            number_cell(&mut xml, 'E', r, trend);
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn inline_cell(xml: &mut String, column: char, row: usize, text: &str, style: Option<u8>) {
    let style = style.map(|s| format!(r#" s="{}""#, s)).unwrap_or_default();
    let _ = write!(
        xml,
        r#"<c r="{}{}" t="inlineStr"{}><is><t xml:space="preserve">{}</t></is></c>"#,
        column,
        row,
        style,
        escape_xml(text)
    );
}

fn number_cell(xml: &mut String, column: char, row: usize, value: f64) {
    let _ = write!(xml, r#"<c r="{}{}"><v>{}</v></c>"#, column, row, value);
}

/// Escape markup and drop characters XML 1.0 cannot carry
fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' | '\n' | '\r' => out.push(c),
            '\u{0}'..='\u{1f}' | '\u{FFFE}' | '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabular::rows;
    use crate::tabular::tests::analytics;
    use crate::types::ReportPayload;
    use std::io::Read;

    fn part(bytes: Vec<u8>, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut xml = String::new();
        file.read_to_string(&mut xml).unwrap();
        xml
    }

    #[test]
    fn container_holds_required_parts() {
        let bytes = write(&rows(&analytics()), "Report").unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for required in [
            "[Content_Types].xml",
            "_rels/.rels",
            "xl/workbook.xml",
            "xl/_rels/workbook.xml.rels",
            "xl/styles.xml",
            "xl/worksheets/sheet1.xml",
        ] {
            assert!(names.contains(&required), "missing {required}");
        }
    }

    #[test]
    fn sheet_rows_follow_metric_order() {
        let bytes = write(&rows(&analytics()), "Report").unwrap();
        let sheet = part(bytes, "xl/worksheets/sheet1.xml");

        assert!(sheet.contains(r#"<c r="A1" t="inlineStr" s="1"><is><t xml:space="preserve">Section</t>"#));
        let consumption = sheet.find("Total Consumption").unwrap();
        let cost = sheet.find("Total Cost").unwrap();
        let emissions = sheet.find("CO₂ Emissions").unwrap();
        assert!(consumption < cost && cost < emissions);
        assert!(sheet.contains("<v>-4.5</v>"));
        assert!(sheet.contains("&quot;hourly&quot;"));
    }

    #[test]
    fn sheet_name_is_sanitized() {
        let bytes = write(&[], "Q4/2024: [draft] energy analytics overview").unwrap();
        let workbook = part(bytes, "xl/workbook.xml");
        assert!(workbook.contains(r#"name="Q4_2024_ _draft_ energy analyti""#));
    }

    #[test]
    fn control_characters_are_dropped_from_cells() {
        assert_eq!(escape_xml("bell\u{7} & <tab>\tend\u{0}"), "bell &amp; &lt;tab&gt;\tend");

        let mut report = analytics();
        if let ReportPayload::Analytics(data) = &mut report {
            data.recommendations.push("Check\u{7} inverter\u{1b}".into());
        }
        let bytes = write(&rows(&report), "Report").unwrap();
        let sheet = part(bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains("Check inverter"));
        assert!(!sheet.contains('\u{7}'));
        assert!(!sheet.contains('\u{1b}'));
    }
}
