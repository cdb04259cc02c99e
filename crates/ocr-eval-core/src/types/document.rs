//! Page-structured OCR documents.

use super::geometry::LineBox;
use super::labels::{InlineKind, LineType};
use serde::{Deserialize, Serialize};

/// One text line on a page. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Bounding box in the page image's pixel space
    pub bbox: LineBox,
    /// Layout classification
    pub line_type: LineType,
    /// Recognized (prediction) or transcribed (ground truth) text
    pub text: String,
    /// Kind of non-OCR-able content, when the line carries an `INLINE` child
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline: Option<InlineKind>,
}

impl Line {
    #[must_use]
    pub fn new(bbox: LineBox, line_type: LineType, text: impl Into<String>) -> Self {
        Self {
            bbox,
            line_type,
            text: text.into(),
            inline: None,
        }
    }

    /// Attach an inline-content annotation.
    #[must_use]
    pub fn with_inline(mut self, kind: InlineKind) -> Self {
        self.inline = Some(kind);
        self
    }
}

/// One page image and its lines, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Image file name; unique within a document
    pub image_name: String,
    pub lines: Vec<Line>,
}

impl Page {
    #[must_use]
    pub fn new(image_name: impl Into<String>, lines: Vec<Line>) -> Self {
        Self {
            image_name: image_name.into(),
            lines,
        }
    }
}

/// All pages of one scanned work, as read from a single dataset XML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    #[inline]
    #[must_use]
    pub const fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total line count over every page.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|p| p.lines.len()).sum()
    }
}
