//! Minimal SVG document builder

use crate::errors::Result;
use std::fmt::Write as _;
use std::path::Path;

/// Horizontal text anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    /// Anchor for a matplotlib-style `ha` value
    pub fn from_ha(ha: &str) -> Self {
        match ha {
            "left" => Anchor::Start,
            "right" => Anchor::End,
            _ => Anchor::Middle,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

/// Font and colour of a text element
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: f64,
    pub color: String,
    pub italic: bool,
    pub bold: bool,
    pub anchor: Anchor,
    /// Rotation in degrees, counter-clockwise like matplotlib
    pub rotation: f64,
    pub opacity: f64,
    /// Vertically centre on the anchor point instead of sitting on it
    pub middle_baseline: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            color: "black".to_string(),
            italic: false,
            bold: false,
            anchor: Anchor::Start,
            rotation: 0.0,
            opacity: 1.0,
            middle_baseline: false,
        }
    }
}

/// Escape text for use in element content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn points_attr(points: &[(f64, f64)]) -> String {
    let parts: Vec<String> = points
        .iter()
        .map(|(x, y)| format!("{:.2},{:.2}", x, y))
        .collect();
    parts.join(" ")
}

/// An SVG document being assembled
#[derive(Debug, Clone)]
pub struct SvgDocument {
    width: f64,
    height: f64,
    body: String,
}

impl SvgDocument {
    pub fn new(width: f64, height: f64) -> Self {
        let mut doc = Self {
            width,
            height,
            body: String::new(),
        };
        doc.rect(0.0, 0.0, width, height, "white", None, 1.0);
        doc
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    #[allow(clippy::too_many_arguments)]
    pub fn rect(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        fill: &str,
        stroke: Option<(&str, f64)>,
        opacity: f64,
    ) {
        let stroke = match stroke {
            Some((color, width)) => format!(" stroke=\"{}\" stroke-width=\"{}\"", color, width),
            None => String::new(),
        };
        let _ = writeln!(
            self.body,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" \
             fill=\"{}\" fill-opacity=\"{}\"{}/>",
            x, y, w, h, fill, opacity, stroke
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn rounded_rect(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        radius: f64,
        fill: &str,
        opacity: f64,
    ) {
        let _ = writeln!(
            self.body,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{:.2}\" \
             fill=\"{}\" fill-opacity=\"{}\"/>",
            x, y, w, h, radius, fill, opacity
        );
    }

    pub fn polyline(
        &mut self,
        points: &[(f64, f64)],
        stroke: &str,
        width: f64,
        dash: Option<&str>,
        opacity: f64,
    ) {
        if points.len() < 2 {
            return;
        }
        let dash = dash
            .map(|d| format!(" stroke-dasharray=\"{}\"", d))
            .unwrap_or_default();
        let _ = writeln!(
            self.body,
            "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" \
             stroke-width=\"{}\" stroke-opacity=\"{}\"{}/>",
            points_attr(points),
            stroke,
            width,
            opacity,
            dash
        );
    }

    pub fn polygon(&mut self, points: &[(f64, f64)], fill: &str, stroke: Option<(&str, f64)>) {
        if points.len() < 3 {
            return;
        }
        let stroke = match stroke {
            Some((color, width)) => format!(" stroke=\"{}\" stroke-width=\"{}\"", color, width),
            None => String::new(),
        };
        let _ = writeln!(
            self.body,
            "<polygon points=\"{}\" fill=\"{}\"{}/>",
            points_attr(points),
            fill,
            stroke
        );
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str) {
        let _ = writeln!(
            self.body,
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\"/>",
            cx, cy, r, fill
        );
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, style: &TextStyle) {
        let mut attrs = format!(
            "x=\"{:.2}\" y=\"{:.2}\" font-family=\"sans-serif\" font-size=\"{}\" \
             fill=\"{}\" text-anchor=\"{}\"",
            x,
            y,
            style.font_size,
            style.color,
            style.anchor.as_str()
        );
        if style.italic {
            attrs.push_str(" font-style=\"italic\"");
        }
        if style.bold {
            attrs.push_str(" font-weight=\"bold\"");
        }
        if style.middle_baseline {
            attrs.push_str(" dominant-baseline=\"central\"");
        }
        if style.opacity < 1.0 {
            let _ = write!(attrs, " fill-opacity=\"{}\"", style.opacity);
        }
        if style.rotation != 0.0 {
            // SVG rotates clockwise
            let _ = write!(
                attrs,
                " transform=\"rotate({:.2} {:.2} {:.2})\"",
                -style.rotation, x, y
            );
        }
        let _ = writeln!(self.body, "<text {}>{}</text>", attrs, escape(content));
    }

    /// Start a group clipped to a rectangle; close it with [`SvgDocument::end_group`]
    pub fn begin_clip(&mut self, id: &str, x: f64, y: f64, w: f64, h: f64) {
        let _ = writeln!(
            self.body,
            "<clipPath id=\"{}\">\
             <rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\"/></clipPath>",
            id, x, y, w, h
        );
        let _ = writeln!(self.body, "<g clip-path=\"url(#{})\">", id);
    }

    pub fn begin_group(&mut self, transform: &str) {
        let _ = writeln!(self.body, "<g transform=\"{}\">", transform);
    }

    pub fn end_group(&mut self) {
        self.body.push_str("</g>\n");
    }

    pub fn finish(&self) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w:.0}\" height=\"{h:.0}\" \
             viewBox=\"0 0 {w:.0} {h:.0}\">\n{body}</svg>\n",
            w = self.width,
            h = self.height,
            body = self.body
        )
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.finish())?;
        tracing::info!(path = %path.display(), "saved figure");
        Ok(())
    }
}
