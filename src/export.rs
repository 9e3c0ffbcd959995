//! Export utilities: render the mind map to SVG, then to PNG, JPEG or PDF.
//!
//! The SVG is built straight from the model, so exports never depend on what is
//! currently visible on screen. Rasterization goes through `resvg`; JPEG
//! encoding through `image`. The PDF is a single A4 page with the JPEG
//! embedded as its only image.

use crate::constants;
use crate::error::ExportError;
use crate::model::MindMap;
use crate::types::Color;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

/// Image/document formats offered for screenshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExportFormat {
    /// Lossless bitmap
    #[default]
    Png,
    /// Lossy bitmap
    Jpeg,
    /// Single-page document
    Pdf,
}

impl ExportFormat {
    /// All formats, in menu order.
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::Pdf];

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpeg => "JPEG",
            ExportFormat::Pdf => "PDF",
        }
    }

    /// MIME type used for browser downloads.
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// Suggested file name, e.g. `mindmap.png`.
    pub fn file_name(self) -> String {
        format!("mindmap.{}", self.extension())
    }
}

/// Rendering options for exports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    /// Blank space around the map, in world units
    pub margin: f32,
    /// Raster scale factor (1.0 = one pixel per world unit)
    pub scale: f32,
    /// Canvas fill; `None` keeps PNGs transparent (JPEG and PDF fall back to white)
    pub background: Option<Color>,
    /// Connector stroke color
    pub connector_color: Color,
    /// Outline the selected node in orange
    pub highlight_selection: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            margin: constants::EXPORT_MARGIN,
            scale: 1.0,
            background: Some(Color::WHITE),
            connector_color: Color::BLACK,
            highlight_selection: false,
        }
    }
}

/// A rendered SVG document and its pixel size at scale 1.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgImage {
    /// SVG markup
    pub svg: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Renders the whole map to SVG.
pub fn render_svg(map: &MindMap, options: &ExportOptions) -> SvgImage {
    let margin = options.margin.max(0.0);

    let mut min_x = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for node in map.nodes() {
        min_x = min_x.min(node.position.0 - node.radius);
        max_x = max_x.max(node.position.0 + node.radius);
        min_y = min_y.min(node.position.1 - node.radius);
        max_y = max_y.max(node.position.1 + node.radius);
    }

    // Empty map: just the margins
    if !min_x.is_finite() || !min_y.is_finite() {
        min_x = 0.0;
        min_y = 0.0;
        max_x = 0.0;
        max_y = 0.0;
    }

    let width = ((max_x - min_x) + 2.0 * margin).ceil().max(1.0) as u32;
    let height = ((max_y - min_y) + 2.0 * margin).ceil().max(1.0) as u32;

    let map_x = |x: f32| x - min_x + margin;
    let map_y = |y: f32| y - min_y + margin;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );

    if let Some(bg) = options.background {
        let _ = writeln!(
            out,
            "<rect x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" fill=\"{}\" />",
            bg.to_hex()
        );
    }

    // Connectors behind nodes, trimmed to the circle edges
    let _ = writeln!(
        out,
        "<g stroke=\"{}\" stroke-width=\"{:.1}\" fill=\"none\">",
        options.connector_color.to_hex(),
        constants::CONNECTOR_WIDTH
    );
    for connector in map.connectors() {
        let ((sx, sy), (ex, ey)) = connector.trimmed();
        let _ = writeln!(
            out,
            "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" />",
            map_x(sx),
            map_y(sy),
            map_x(ex),
            map_y(ey)
        );
    }
    let _ = writeln!(out, "</g>");

    let selected = map.selected().filter(|_| options.highlight_selection);
    for node in map.nodes() {
        let cx = map_x(node.position.0);
        let cy = map_y(node.position.1);
        let (stroke, stroke_width) = if selected == Some(node.id) {
            ("orange", 3)
        } else {
            ("black", 1)
        };
        let _ = writeln!(
            out,
            "<circle cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"{:.1}\" fill=\"{}\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\" />",
            node.radius,
            node.style.background.to_hex()
        );
        let _ = writeln!(
            out,
            "<text x=\"{cx:.1}\" y=\"{cy:.1}\" font-family=\"sans-serif\" font-size=\"{:.0}\" fill=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>",
            node.font_size,
            node.style.text.to_hex(),
            escape_xml(&node.text)
        );
    }

    let _ = writeln!(out, "</svg>");

    SvgImage {
        svg: out,
        width,
        height,
    }
}

/// Renders the map and encodes it in the requested format.
pub fn export_image(
    map: &MindMap,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    let mut options = *options;
    if format != ExportFormat::Png && options.background.is_none() {
        options.background = Some(Color::WHITE);
    }

    let image = render_svg(map, &options);
    let pixmap = rasterize(&image, options.scale)?;
    let bytes = match format {
        ExportFormat::Png => encode_png(&pixmap)?,
        ExportFormat::Jpeg => encode_jpeg(&pixmap)?,
        ExportFormat::Pdf => {
            let jpeg = encode_jpeg(&pixmap)?;
            pdf_with_jpeg(&jpeg, pixmap.width(), pixmap.height())
        }
    };
    log::info!(
        "exported {} map as {} ({} bytes)",
        map.len(),
        format.label(),
        bytes.len()
    );
    Ok(bytes)
}

fn system_fonts() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            Arc::new(db)
        })
        .clone()
}

/// Rasterizes an SVG image at the given scale (clamped to 0.25..=8).
pub fn rasterize(image: &SvgImage, scale: f32) -> Result<tiny_skia::Pixmap, ExportError> {
    let mut opt = usvg::Options::default();
    opt.fontdb = system_fonts();

    let tree = usvg::Tree::from_data(image.svg.as_bytes(), &opt)
        .map_err(|e| ExportError::SvgParse(e.to_string()))?;

    let scale = scale.clamp(0.25, 8.0);
    let out_w = ((image.width as f32) * scale).round().max(1.0) as u32;
    let out_h = ((image.height as f32) * scale).round().max(1.0) as u32;

    let mut pixmap = tiny_skia::Pixmap::new(out_w, out_h).ok_or(ExportError::Pixmap {
        width: out_w,
        height: out_h,
    })?;

    let transform = tiny_skia::Transform::from_scale(scale, scale);
    resvg::render(&tree, transform, &mut pixmap.as_mut());
    Ok(pixmap)
}

/// Encodes a pixmap as PNG.
pub fn encode_png(pixmap: &tiny_skia::Pixmap) -> Result<Vec<u8>, ExportError> {
    pixmap
        .encode_png()
        .map_err(|e| ExportError::PngEncode(e.to_string()))
}

/// Encodes a pixmap as JPEG. Transparent pixels come out black, so callers fill a background first.
pub fn encode_jpeg(pixmap: &tiny_skia::Pixmap) -> Result<Vec<u8>, ExportError> {
    use image::ImageEncoder;

    let mut rgb = Vec::with_capacity(pixmap.pixels().len() * 3);
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgb.extend_from_slice(&[c.red(), c.green(), c.blue()]);
    }

    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, constants::JPEG_QUALITY)
        .write_image(
            &rgb,
            pixmap.width(),
            pixmap.height(),
            image::ExtendedColorType::Rgb8,
        )?;
    Ok(out)
}

/// Wraps a JPEG into a one-page A4 portrait PDF, scaled to fit and anchored at the top.
pub fn pdf_with_jpeg(jpeg: &[u8], width: u32, height: u32) -> Vec<u8> {
    let page_w = constants::A4_WIDTH_PT;
    let page_h = constants::A4_HEIGHT_PT;
    let scale = (page_w / width.max(1) as f32).min(page_h / height.max(1) as f32);
    let draw_w = width as f32 * scale;
    let draw_h = height as f32 * scale;
    let x = (page_w - draw_w) / 2.0;
    let y = page_h - draw_h;

    let content = format!("q {draw_w:.2} 0 0 {draw_h:.2} {x:.2} {y:.2} cm /Im0 Do Q\n");

    let mut out: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

    let mut object = |out: &mut Vec<u8>, body: &[u8]| {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", offsets.len()).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    };

    object(&mut out, b"<< /Type /Catalog /Pages 2 0 R >>");
    object(&mut out, b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
    object(
        &mut out,
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {page_w:.2} {page_h:.2}] \
             /Resources << /XObject << /Im0 4 0 R >> >> /Contents 5 0 R >>"
        )
        .as_bytes(),
    );

    let mut image_obj = format!(
        "<< /Type /XObject /Subtype /Image /Width {width} /Height {height} \
         /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode /Length {} >>\nstream\n",
        jpeg.len()
    )
    .into_bytes();
    image_obj.extend_from_slice(jpeg);
    image_obj.extend_from_slice(b"\nendstream");
    object(&mut out, &image_obj);

    object(
        &mut out,
        format!(
            "<< /Length {} >>\nstream\n{content}endstream",
            content.len()
        )
        .as_bytes(),
    );

    let xref_start = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", offsets.len() + 1);
    for offset in &offsets {
        let _ = writeln!(xref, "{offset:010} 00000 n ");
    }
    let _ = write!(
        xref,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_start}\n%%EOF\n",
        offsets.len() + 1
    );
    out.extend_from_slice(xref.as_bytes());
    out
}

fn escape_xml(input: &str) -> String {
    let mut s = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            '"' => s.push_str("&quot;"),
            '\'' => s.push_str("&apos;"),
            _ => s.push(ch),
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> MindMap {
        let mut map = MindMap::new();
        let root = map.create_node(None, "Ideas & <Plans>", (0.0, 0.0), None);
        let a = map.create_node(Some(root), "A", (150.0, 0.0), None);
        map.create_node(Some(a), "B", (150.0, 120.0), None);
        map
    }

    #[test]
    fn test_svg_contains_escaped_labels_and_one_line_per_connector() {
        let map = sample_map();
        let image = render_svg(&map, &ExportOptions::default());

        assert!(image.svg.starts_with("<svg"));
        assert!(image.svg.contains("Ideas &amp; &lt;Plans&gt;"));
        assert_eq!(image.svg.matches("<line").count(), 2);
        assert_eq!(image.svg.matches("<circle").count(), 3);
        assert!(image.svg.contains("fill=\"#add8e6\""));
    }

    #[test]
    fn test_svg_size_covers_circles_plus_margin() {
        let map = sample_map();
        let options = ExportOptions {
            margin: 10.0,
            ..Default::default()
        };
        let image = render_svg(&map, &options);
        // x: -30..180, y: -30..150
        assert_eq!(image.width, 230);
        assert_eq!(image.height, 200);
    }

    #[test]
    fn test_svg_of_empty_map_is_margin_only() {
        let image = render_svg(&MindMap::new(), &ExportOptions::default());
        let side = (2.0 * constants::EXPORT_MARGIN) as u32;
        assert_eq!((image.width, image.height), (side, side));
        assert!(!image.svg.contains("<circle"));
    }

    #[test]
    fn test_svg_highlights_selection_only_when_asked() {
        let map = sample_map();
        let plain = render_svg(&map, &ExportOptions::default());
        assert!(!plain.svg.contains("orange"));

        let highlighted = render_svg(
            &map,
            &ExportOptions {
                highlight_selection: true,
                ..Default::default()
            },
        );
        assert_eq!(highlighted.svg.matches("stroke=\"orange\"").count(), 1);
    }

    #[test]
    fn test_svg_without_background_has_no_rect() {
        let image = render_svg(
            &sample_map(),
            &ExportOptions {
                background: None,
                ..Default::default()
            },
        );
        assert!(!image.svg.contains("<rect"));
    }

    #[test]
    fn test_png_export_has_signature() {
        let bytes = export_image(&sample_map(), ExportFormat::Png, &ExportOptions::default()).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_jpeg_export_has_soi_marker() {
        let options = ExportOptions {
            background: None,
            ..Default::default()
        };
        let bytes = export_image(&sample_map(), ExportFormat::Jpeg, &options).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_pdf_export_is_single_page_document() {
        let bytes = export_image(&sample_map(), ExportFormat::Pdf, &ExportOptions::default()).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.contains("/Count 1"));
        assert!(text.contains("/Filter /DCTDecode"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn test_pdf_xref_offsets_point_at_objects() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xD9];
        let pdf = pdf_with_jpeg(&jpeg, 100, 50);

        // Offsets are byte positions; the header and image are not UTF-8.
        // The leading newline keeps "startxref" from matching.
        let xref_at = pdf
            .windows(6)
            .rposition(|w| w == b"\nxref\n")
            .unwrap()
            + 1;
        let tail = std::str::from_utf8(&pdf[xref_at..]).unwrap();
        let entries: Vec<usize> = tail
            .lines()
            .skip(3)
            .take(5)
            .map(|line| line[..10].parse().unwrap())
            .collect();
        assert_eq!(entries.len(), 5);
        for (index, offset) in entries.iter().enumerate() {
            let expected = format!("{} 0 obj", index + 1);
            assert!(
                pdf[*offset..].starts_with(expected.as_bytes()),
                "object {} misplaced",
                index + 1
            );
        }

        let startxref: usize = tail
            .lines()
            .skip_while(|l| *l != "startxref")
            .nth(1)
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(startxref, xref_at);
    }

    #[test]
    fn test_pdf_image_fits_a4_width() {
        let pdf = pdf_with_jpeg(&[0xFF, 0xD8], 1000, 500);
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.contains("q 595.28 0 0 297.64 0.00 544.25 cm /Im0 Do Q"));
    }

    #[test]
    fn test_format_metadata() {
        assert_eq!(ExportFormat::Jpeg.file_name(), "mindmap.jpeg");
        assert_eq!(ExportFormat::Pdf.mime_type(), "application/pdf");
        assert_eq!(ExportFormat::default(), ExportFormat::Png);
    }
}
