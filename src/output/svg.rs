//! SVG output.
//!
//! The heat layer is embedded as a base64 PNG `<image>`; axes and labels stay
//! vector elements on top of it so text remains crisp at any zoom.

use crate::color::Rgba;
use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::geometry::{Point, Surface};
use crate::render::{AxisCanvas, LabelStyle, LineStyle, TextAnchor};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// SVG document builder.
#[derive(Debug, Clone)]
pub struct SvgEncoder {
    width: u32,
    height: u32,
    /// Background color (None for transparent)
    background: Option<Rgba>,
    elements: Vec<SvgElement>,
}

/// An SVG element.
///
/// Field names match SVG attribute names.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum SvgElement {
    /// Straight segment
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: Rgba,
        stroke_width: f32,
    },
    /// Text
    Text {
        x: f32,
        y: f32,
        text: String,
        font_size: f32,
        fill: Rgba,
        anchor: TextAnchor,
    },
    /// Embedded raster image (data URI)
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        data: String,
    },
}

impl Default for SvgEncoder {
    fn default() -> Self {
        let surface = Surface::default();
        Self::new(surface.width, surface.height)
    }
}

impl SvgEncoder {
    /// Create an empty document with a white background.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Some(Rgba::WHITE),
            elements: Vec::new(),
        }
    }

    /// Set background color (None for transparent).
    #[must_use]
    pub fn background(mut self, color: Option<Rgba>) -> Self {
        self.background = color;
        self
    }

    /// Embed a framebuffer as a full-size PNG image.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn embed_framebuffer(&mut self, fb: &Framebuffer) -> Result<()> {
        let png_bytes = super::PngEncoder::to_bytes(fb)?;
        self.elements.push(SvgElement::Image {
            x: 0.0,
            y: 0.0,
            width: fb.width() as f32,
            height: fb.height() as f32,
            data: format!("data:image/png;base64,{}", STANDARD.encode(png_bytes)),
        });
        Ok(())
    }

    /// Append an element.
    pub fn add_element(&mut self, element: SvgElement) {
        self.elements.push(element);
    }

    /// Append several elements in order.
    pub fn extend<I: IntoIterator<Item = SvgElement>>(&mut self, elements: I) {
        self.elements.extend(elements);
    }

    /// Elements in paint order.
    #[must_use]
    pub fn elements(&self) -> &[SvgElement] {
        &self.elements
    }

    /// Render to SVG string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(4096);

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );

        if let Some(bg) = self.background {
            let _ = writeln!(
                svg,
                r#"  <rect width="100%" height="100%" fill="{}"/>"#,
                bg.to_css()
            );
        }

        for element in &self.elements {
            let _ = writeln!(svg, "  {}", element_to_svg(element));
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Write to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if file writing fails.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.render().as_bytes())?;
        Ok(())
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn element_to_svg(element: &SvgElement) -> String {
    match element {
        SvgElement::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
            stroke_width,
        } => format!(
            r#"<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="{}" stroke-width="{stroke_width}"/>"#,
            stroke.to_css()
        ),
        SvgElement::Text {
            x,
            y,
            text,
            font_size,
            fill,
            anchor,
        } => {
            let anchor_str = match anchor {
                TextAnchor::Start => "start",
                TextAnchor::Middle => "middle",
                TextAnchor::End => "end",
            };
            format!(
                r#"<text x="{x}" y="{y}" font-size="{font_size}" fill="{}" text-anchor="{anchor_str}" font-family="sans-serif">{}</text>"#,
                fill.to_css(),
                escape_xml(text)
            )
        }
        SvgElement::Image {
            x,
            y,
            width,
            height,
            data,
        } => format!(
            r#"<image x="{x}" y="{y}" width="{width}" height="{height}" xlink:href="{data}"/>"#
        ),
    }
}

/// Vector axis canvas.
///
/// Collects axis lines and labels as SVG elements; [`SvgCanvas::to_encoder`]
/// lays them over an optional raster heat layer.
#[derive(Debug, Clone, Default)]
pub struct SvgCanvas {
    surface: Surface,
    elements: Vec<SvgElement>,
}

impl SvgCanvas {
    /// Create an empty canvas for the default surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface of the current pass.
    #[must_use]
    pub const fn surface(&self) -> Surface {
        self.surface
    }

    /// Elements drawn in the current pass.
    #[must_use]
    pub fn elements(&self) -> &[SvgElement] {
        &self.elements
    }

    /// Build a document: white background, `heat` (if any), then the axes.
    ///
    /// # Errors
    ///
    /// Returns an error if the heat layer cannot be PNG-encoded.
    pub fn to_encoder(&self, heat: Option<&Framebuffer>) -> Result<SvgEncoder> {
        let mut encoder = SvgEncoder::new(self.surface.width, self.surface.height);
        if let Some(fb) = heat {
            encoder.embed_framebuffer(fb)?;
        }
        encoder.extend(self.elements.iter().cloned());
        Ok(encoder)
    }
}

impl AxisCanvas for SvgCanvas {
    fn reset(&mut self, surface: &Surface) {
        self.surface = *surface;
        self.elements.clear();
    }

    fn draw_line(&mut self, from: Point, to: Point, style: &LineStyle) {
        self.elements.push(SvgElement::Line {
            x1: from.x,
            y1: from.y,
            x2: to.x,
            y2: to.y,
            stroke: style.color,
            stroke_width: style.width,
        });
    }

    fn draw_label(&mut self, at: Point, text: &str, style: &LabelStyle) {
        self.elements.push(SvgElement::Text {
            x: at.x,
            y: at.y,
            text: text.to_string(),
            font_size: style.font_size,
            fill: style.color,
            anchor: style.anchor,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_encoder_new() {
        let svg = SvgEncoder::new(800, 600).render();

        assert!(svg.contains("width=\"800\""));
        assert!(svg.contains("height=\"600\""));
        assert!(svg.contains("viewBox=\"0 0 800 600\""));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_svg_line() {
        let mut encoder = SvgEncoder::new(100, 100);
        encoder.add_element(SvgElement::Line {
            x1: 0.0,
            y1: 0.0,
            x2: 100.0,
            y2: 100.0,
            stroke: Rgba::BLACK,
            stroke_width: 2.0,
        });
        let svg = encoder.render();

        assert!(svg.contains(r#"x1="0" y1="0" x2="100" y2="100""#));
        assert!(svg.contains("stroke-width=\"2\""));
        assert!(svg.contains("rgb(0,0,0)"));
    }

    #[test]
    fn test_svg_text_escaping() {
        let mut canvas = SvgCanvas::new();
        canvas.reset(&Surface::default());
        canvas.draw_label(
            Point::new(10.0, 50.0),
            "<script>A & \"B\"</script>",
            &LabelStyle::default(),
        );
        let svg = canvas.to_encoder(None).unwrap().render();

        assert!(!svg.contains("<script>"));
        assert!(svg.contains("&lt;script&gt;A &amp; &quot;B&quot;"));
    }

    #[test]
    fn test_svg_transparent_background() {
        let svg = SvgEncoder::new(100, 100).background(None).render();
        assert_eq!(svg.matches("<rect").count(), 0);
    }

    #[test]
    fn test_embed_framebuffer_under_axes() {
        let mut fb = Framebuffer::new(100, 100).unwrap();
        fb.clear(Rgba::RED);

        let mut canvas = SvgCanvas::new();
        canvas.reset(&Surface::new(100, 100, 10).unwrap());
        canvas.draw_line(Point::new(10.0, 90.0), Point::new(90.0, 90.0), &LineStyle::default());

        let svg = canvas.to_encoder(Some(&fb)).unwrap().render();
        let image = svg.find("<image").unwrap();
        let line = svg.find("<line").unwrap();
        assert!(image < line, "heat layer must be painted first");
        assert!(svg.contains("data:image/png;base64,"));
    }

    #[test]
    fn test_canvas_reset_discards_previous_pass() {
        let mut canvas = SvgCanvas::new();
        canvas.reset(&Surface::default());
        canvas.draw_label(Point::new(1.0, 1.0), "old", &LabelStyle::default());
        canvas.reset(&Surface::new(200, 100, 10).unwrap());

        assert!(canvas.elements().is_empty());
        assert_eq!(canvas.surface().width, 200);
    }

    #[test]
    fn test_label_anchor_attribute() {
        let mut canvas = SvgCanvas::new();
        canvas.reset(&Surface::default());
        let style = LabelStyle {
            anchor: TextAnchor::End,
            ..LabelStyle::default()
        };
        canvas.draw_label(Point::new(50.0, 50.0), "42", &style);
        let svg = canvas.to_encoder(None).unwrap().render();
        assert!(svg.contains("text-anchor=\"end\""));
        assert!(svg.contains(">42</text>"));
    }

    #[test]
    fn test_svg_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("axes.svg");
        SvgEncoder::new(100, 100).write_to_file(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<svg"));
    }
}
