//! Data model shared by every evaluation level.

pub mod document;
pub mod geometry;
pub mod labels;

pub use document::{Document, Line, Page};
pub use geometry::{LineBox, IOU_EPSILON};
pub use labels::{InlineKind, LineType};
