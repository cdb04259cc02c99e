//! Line type and inline-content labels used by the NDL OCR dataset.
//!
//! The XML carries free-form Japanese labels. Known labels map onto named
//! variants; anything else is preserved verbatim in `Other` so it can still be
//! reported and configured.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Layout classification of a text line (`LINE/@TYPE`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LineType {
    /// Body text (本文)
    Body,
    /// Head-note printed above the body (頭注)
    HeadNote,
    /// Inset/parenthetical note set inside a body line (割注)
    InsetNote,
    /// Advertisement text (広告文字)
    Advertisement,
    /// Figure or table caption (キャプション)
    Caption,
    /// Any other label, kept as written
    Other(String),
}

impl LineType {
    /// Label as it appears in the dataset XML.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Body => "本文",
            Self::HeadNote => "頭注",
            Self::InsetNote => "割注",
            Self::Advertisement => "広告文字",
            Self::Caption => "キャプション",
            Self::Other(label) => label,
        }
    }
}

impl From<&str> for LineType {
    fn from(label: &str) -> Self {
        match label {
            "本文" => Self::Body,
            "頭注" => Self::HeadNote,
            "割注" => Self::InsetNote,
            "広告文字" => Self::Advertisement,
            "キャプション" => Self::Caption,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for LineType {
    #[inline]
    fn from(label: String) -> Self {
        Self::from(label.as_str())
    }
}

impl From<LineType> for String {
    #[inline]
    fn from(line_type: LineType) -> Self {
        line_type.label().to_string()
    }
}

impl fmt::Display for LineType {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind of non-OCR-able content marked by an `INLINE` child element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InlineKind {
    /// Handwriting (手書き)
    Handwriting,
    /// Mathematical formula (数式)
    Formula,
    /// Chemical formula (化学式)
    ChemicalFormula,
    /// Horizontal run inside vertical text (縦中横)
    MixedOrientation,
    /// Any other label, kept as written
    Other(String),
}

impl InlineKind {
    /// Label as it appears in the dataset XML.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Handwriting => "手書き",
            Self::Formula => "数式",
            Self::ChemicalFormula => "化学式",
            Self::MixedOrientation => "縦中横",
            Self::Other(label) => label,
        }
    }
}

impl From<&str> for InlineKind {
    fn from(label: &str) -> Self {
        match label {
            "手書き" => Self::Handwriting,
            "数式" => Self::Formula,
            "化学式" => Self::ChemicalFormula,
            "縦中横" => Self::MixedOrientation,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for InlineKind {
    #[inline]
    fn from(label: String) -> Self {
        Self::from(label.as_str())
    }
}

impl From<InlineKind> for String {
    #[inline]
    fn from(kind: InlineKind) -> Self {
        kind.label().to_string()
    }
}

impl fmt::Display for InlineKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_type_from_label() {
        assert_eq!(LineType::from("本文"), LineType::Body);
        assert_eq!(LineType::from("頭注"), LineType::HeadNote);
        assert_eq!(LineType::from("割注"), LineType::InsetNote);
        assert_eq!(LineType::from("広告文字"), LineType::Advertisement);
        assert_eq!(LineType::from("キャプション"), LineType::Caption);
        assert_eq!(
            LineType::from("ノンブル"),
            LineType::Other("ノンブル".to_string())
        );
    }

    #[test]
    fn test_line_type_roundtrip() {
        for line_type in [
            LineType::Body,
            LineType::HeadNote,
            LineType::InsetNote,
            LineType::Advertisement,
            LineType::Caption,
            LineType::Other("柱".to_string()),
        ] {
            let label = line_type.to_string();
            assert_eq!(LineType::from(label.as_str()), line_type);
        }
    }

    #[test]
    fn test_line_type_serializes_as_label() {
        let json = serde_json::to_string(&LineType::HeadNote).unwrap();
        assert_eq!(json, "\"頭注\"");
        let parsed: LineType = serde_json::from_str("\"本文\"").unwrap();
        assert_eq!(parsed, LineType::Body);
    }

    #[test]
    fn test_inline_kind_from_label() {
        assert_eq!(InlineKind::from("手書き"), InlineKind::Handwriting);
        assert_eq!(InlineKind::from("数式"), InlineKind::Formula);
        assert_eq!(InlineKind::from("化学式"), InlineKind::ChemicalFormula);
        assert_eq!(InlineKind::from("縦中横"), InlineKind::MixedOrientation);
        assert_eq!(
            InlineKind::from("ルビ"),
            InlineKind::Other("ルビ".to_string())
        );
    }
}
