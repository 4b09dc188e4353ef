//! Input types supplied by the PDF-reading collaborator.

use serde::{Deserialize, Serialize};

/// A bounding box in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Bottom edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Top edge
    pub y1: f32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }
}

/// Font weight of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// Regular weight
    #[default]
    Normal,
    /// Bold weight
    Bold,
}

/// One token or line fragment of extracted text.
///
/// Runs are immutable once produced by the collaborator and arrive in global
/// reading order (`order_index` strictly increasing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Page number (1-indexed)
    pub page: u32,

    /// Font size in points
    pub font_size: f32,

    /// Font weight
    pub font_weight: FontWeight,

    /// Bounding geometry on the page
    pub bbox: BBox,

    /// Global reading-order index
    pub order_index: usize,
}

impl TextRun {
    /// Create a new text run with default geometry.
    pub fn new(text: impl Into<String>, page: u32, font_size: f32, order_index: usize) -> Self {
        Self {
            text: text.into(),
            page,
            font_size,
            font_weight: FontWeight::Normal,
            bbox: BBox::default(),
            order_index,
        }
    }

    /// Set bold weight.
    pub fn bold(mut self) -> Self {
        self.font_weight = FontWeight::Bold;
        self
    }

    /// Set the bounding box.
    pub fn with_bbox(mut self, bbox: BBox) -> Self {
        self.bbox = bbox;
        self
    }

    /// Check if this run is bold.
    pub fn is_bold(&self) -> bool {
        self.font_weight == FontWeight::Bold
    }

    /// Check if this run holds any non-whitespace text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A native table-of-contents entry exposed by the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Nesting depth (1 = top level)
    pub level: u8,

    /// Entry title
    pub text: String,

    /// Target page number (1-indexed)
    pub page: u32,
}

impl TocEntry {
    /// Create a new TOC entry.
    pub fn new(level: u8, text: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_dimensions() {
        let bbox = BBox::new(10.0, 20.0, 110.0, 35.0);
        assert_eq!(bbox.width(), 100.0);
        assert_eq!(bbox.height(), 15.0);

        // Degenerate boxes clamp to zero
        let inverted = BBox::new(50.0, 0.0, 10.0, 0.0);
        assert_eq!(inverted.width(), 0.0);
    }

    #[test]
    fn test_text_run_builder() {
        let run = TextRun::new("1. Introduction", 1, 16.0, 0)
            .bold()
            .with_bbox(BBox::new(72.0, 700.0, 250.0, 716.0));

        assert!(run.is_bold());
        assert!(!run.is_empty());
        assert_eq!(run.page, 1);
    }

    #[test]
    fn test_empty_run() {
        let run = TextRun::new("   ", 1, 12.0, 3);
        assert!(run.is_empty());
    }
}
