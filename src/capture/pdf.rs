//! Minimal single-page PDF writer.
//!
//! Produces a PDF 1.4 file with one A4 portrait page that shows a single RGB
//! image, full-bleed across the page width and anchored to the top edge.

use chrono::{DateTime, Utc};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::Write;

use crate::error::EncodingError;

/// A4 width in PDF points
pub const A4_WIDTH_PT: f32 = 595.28;
/// A4 height in PDF points
pub const A4_HEIGHT_PT: f32 = 841.89;

/// 8-bit RGB raster, rows top to bottom
#[derive(Debug)]
pub(crate) struct RgbImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Document metadata written to the info dictionary
#[derive(Debug)]
pub(crate) struct DocumentInfo<'a> {
    pub title: &'a str,
    pub producer: &'a str,
    pub created: DateTime<Utc>,
}

/// Where the image lands on the page, in points
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Drawn width (always the page width)
    pub width: f32,
    /// Drawn height, preserving the raster aspect ratio
    pub height: f32,
    /// Bottom edge of the image measured from the bottom of the page
    pub y: f32,
}

/// Scale a raster to the A4 page width, preserving aspect ratio, top-aligned
pub fn place_on_page(raster_width: u32, raster_height: u32) -> Placement {
    let width = A4_WIDTH_PT;
    let height = raster_height as f32 * width / raster_width.max(1) as f32;
    Placement {
        width,
        height,
        y: A4_HEIGHT_PT - height,
    }
}

struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    /// Next object number
    fn next_id(&self) -> usize {
        self.offsets.len() + 1
    }

    fn object(&mut self, body: &str) -> usize {
        let id = self.begin();
        self.buf.extend_from_slice(body.as_bytes());
        self.buf.extend_from_slice(b"\nendobj\n");
        id
    }

    fn stream(&mut self, dict: &str, data: &[u8]) -> usize {
        let id = self.begin();
        self.buf
            .extend_from_slice(format!("<< {} /Length {} >>\nstream\n", dict, data.len()).as_bytes());
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
        id
    }

    fn begin(&mut self) -> usize {
        self.offsets.push(self.buf.len());
        let id = self.offsets.len();
        self.buf.extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
        id
    }

    fn finish(mut self, root: usize, info: usize) -> Vec<u8> {
        let xref = self.buf.len();
        let size = self.offsets.len() + 1;
        self.buf
            .extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", size).as_bytes());
        for offset in &self.offsets {
            self.buf
                .extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        self.buf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
                size, root, info, xref
            )
            .as_bytes(),
        );
        self.buf
    }
}

/// Assemble a one-page document showing `image`
pub(crate) fn write_document(
    image: &RgbImage,
    info: &DocumentInfo<'_>,
    compress: bool,
) -> Result<Vec<u8>, EncodingError> {
    let expected = image.width as usize * image.height as usize * 3;
    if image.width == 0 || image.height == 0 || image.pixels.len() != expected {
        return Err(EncodingError::Document(format!(
            "raster of {}x{} carries {} bytes, expected {}",
            image.width,
            image.height,
            image.pixels.len(),
            expected
        )));
    }

    let (pixels, filter) = if compress {
        let mut encoder = ZlibEncoder::new(Vec::with_capacity(expected / 4), Compression::default());
        encoder
            .write_all(&image.pixels)
            .map_err(|e| EncodingError::Document(e.to_string()))?;
        let data = encoder
            .finish()
            .map_err(|e| EncodingError::Document(e.to_string()))?;
        (data, " /Filter /FlateDecode")
    } else {
        (image.pixels.clone(), "")
    };

    let placement = place_on_page(image.width, image.height);
    let content = format!(
        "q\n{:.2} 0 0 {:.2} 0 {:.2} cm\n/Im0 Do\nQ\n",
        placement.width, placement.height, placement.y
    );

    let mut pdf = PdfWriter::new();
    let catalog = pdf.next_id();
    let pages = catalog + 1;
    let page = catalog + 2;
    let xobject = catalog + 3;
    let contents = catalog + 4;

    pdf.object(&format!("<< /Type /Catalog /Pages {} 0 R >>", pages));
    pdf.object(&format!("<< /Type /Pages /Kids [{} 0 R] /Count 1 >>", page));
    pdf.object(&format!(
        "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] /Resources << /XObject << /Im0 {} 0 R >> >> /Contents {} 0 R >>",
        pages, A4_WIDTH_PT, A4_HEIGHT_PT, xobject, contents
    ));
    pdf.stream(
        &format!(
            "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8{}",
            image.width, image.height, filter
        ),
        &pixels,
    );
    pdf.stream("", content.as_bytes());
    let info_id = pdf.object(&format!(
        "<< /Title {} /Producer {} /CreationDate {} >>",
        text_string(info.title),
        text_string(info.producer),
        text_string(&info.created.format("D:%Y%m%d%H%M%SZ").to_string()),
    ));

    Ok(pdf.finish(catalog, info_id))
}

/// Encode a PDF text string: literal for ASCII, UTF-16BE hex otherwise
fn text_string(value: &str) -> String {
    if value.is_ascii() {
        let mut out = String::with_capacity(value.len() + 2);
        out.push('(');
        for c in value.chars() {
            if matches!(c, '(' | ')' | '\\') {
                out.push('\\');
            }
            out.push(c);
        }
        out.push(')');
        out
    } else {
        let mut out = String::from("<FEFF");
        for unit in value.encode_utf16() {
            out.push_str(&format!("{:04X}", unit));
        }
        out.push('>');
        out
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn image(width: u32, height: u32) -> RgbImage {
        RgbImage {
            width,
            height,
            pixels: vec![0xff; (width * height * 3) as usize],
        }
    }

    fn info() -> DocumentInfo<'static> {
        DocumentInfo {
            title: "Advanced Analytics Report",
            producer: "EcoFlow",
            created: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
        }
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn a4_raster_fills_the_page() {
        let placement = place_on_page(1588, 2245);
        assert_eq!(placement.width, A4_WIDTH_PT);
        assert!((placement.height - A4_HEIGHT_PT).abs() < 0.5, "{placement:?}");
        assert!(placement.y.abs() < 0.5);
    }

    #[test]
    fn short_raster_is_top_aligned() {
        let placement = place_on_page(1000, 500);
        assert!((placement.height - A4_WIDTH_PT / 2.0).abs() < 0.01);
        assert!((placement.y - (A4_HEIGHT_PT - A4_WIDTH_PT / 2.0)).abs() < 0.01);
    }

    #[test]
    fn writes_single_page_document() {
        let bytes = write_document(&image(4, 6), &info(), true).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        assert_eq!(count(&bytes, b"/Type /Page "), 1);
        assert_eq!(count(&bytes, b"/Count 1"), 1);
        assert_eq!(count(&bytes, b"/FlateDecode"), 1);
        assert_eq!(count(&bytes, b"(D:20240115090000Z)"), 1);
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let bytes = write_document(&image(2, 2), &info(), false).unwrap();
        let marker = b"startxref\n";
        let tail_at = bytes
            .windows(marker.len())
            .rposition(|w| w == marker)
            .unwrap()
            + marker.len();
        let tail = std::str::from_utf8(&bytes[tail_at..]).unwrap();
        let xref_at: usize = tail.lines().next().unwrap().parse().unwrap();
        assert!(bytes[xref_at..].starts_with(b"xref"));

        // Everything from the xref table on is ASCII
        let table = std::str::from_utf8(&bytes[xref_at..]).unwrap();
        for (i, line) in table.lines().skip(3).take(6).enumerate() {
            let offset: usize = line[..10].parse().unwrap();
            let header = format!("{} 0 obj", i + 1);
            assert!(bytes[offset..].starts_with(header.as_bytes()), "object {}", i + 1);
        }
    }

    #[test]
    fn rejects_mismatched_raster() {
        let mut bad = image(3, 3);
        bad.pixels.pop();
        assert!(matches!(
            write_document(&bad, &info(), false),
            Err(EncodingError::Document(_))
        ));
    }

    #[test]
    fn text_strings_escape_and_encode() {
        assert_eq!(text_string("a (b) \\c"), "(a \\(b\\) \\\\c)");
        assert_eq!(text_string("CO₂"), "<FEFF0043004F2082>");
    }
}
