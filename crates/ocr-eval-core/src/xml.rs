//! NDL OCR dataset XML loader.
//!
//! ```xml
//! <OCRDATASET xmlns="NDLOCRDATASET">
//!   <PAGE IMAGENAME="R0000001_L.jpg">
//!     <LINE TYPE="本文" STRING="〓" X="10" Y="20" WIDTH="40" HEIGHT="600">
//!       <INLINE TYPE="手書き"/>
//!     </LINE>
//!   </PAGE>
//! </OCRDATASET>
//! ```
//!
//! Elements are matched by local name, so the default namespace is ignored.

use crate::diagnostics::Diagnostic;
use crate::error::Result;
use crate::types::{Document, InlineKind, Line, LineBox, LineType, Page};
use roxmltree::Node;
use std::fs;
use std::path::Path;

/// A parsed document together with the lines or files that could not be read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedDocument {
    pub document: Document,
    pub diagnostics: Vec<Diagnostic>,
}

#[inline]
fn is_element(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn int_attribute(node: &Node, name: &str) -> std::result::Result<i64, String> {
    let raw = node
        .attribute(name)
        .ok_or_else(|| format!("missing {name}"))?;
    raw.trim()
        .parse()
        .map_err(|_| format!("{name}=\"{raw}\" is not an integer"))
}

fn parse_line(node: &Node) -> std::result::Result<Line, String> {
    let line_type = node.attribute("TYPE").ok_or("missing TYPE")?;
    let bbox = LineBox::new(
        int_attribute(node, "X")?,
        int_attribute(node, "Y")?,
        int_attribute(node, "WIDTH")?,
        int_attribute(node, "HEIGHT")?,
    );
    if bbox.width < 0 || bbox.height < 0 {
        return Err(format!(
            "negative size {}x{}",
            bbox.width, bbox.height
        ));
    }
    if !bbox.is_addressable() {
        return Err(format!(
            "box at ({}, {}) extends past the coordinate range",
            bbox.x, bbox.y
        ));
    }

    let inline = node
        .children()
        .find(|child| is_element(child, "INLINE"))
        .map(|child| InlineKind::from(child.attribute("TYPE").unwrap_or_default()));

    Ok(Line {
        bbox,
        line_type: LineType::from(line_type),
        text: node.attribute("STRING").unwrap_or_default().to_string(),
        inline,
    })
}

/// Parse dataset XML text into pages.
///
/// Lines with missing or non-integer geometry are dropped and reported.
pub fn parse_document(xml: &str) -> Result<LoadedDocument> {
    let tree = roxmltree::Document::parse(xml)?;
    let mut loaded = LoadedDocument::default();

    for page_node in tree.descendants().filter(|n| is_element(n, "PAGE")) {
        let image_name = page_node.attribute("IMAGENAME").unwrap_or_default();
        let mut lines = Vec::new();

        for line_node in page_node.descendants().filter(|n| is_element(n, "LINE")) {
            match parse_line(&line_node) {
                Ok(line) => lines.push(line),
                Err(reason) => loaded.diagnostics.push(
                    Diagnostic::MalformedLine {
                        image_name: image_name.to_string(),
                        reason,
                    }
                    .emit(),
                ),
            }
        }

        loaded.document.pages.push(Page::new(image_name, lines));
    }

    Ok(loaded)
}

/// Load a dataset XML file.
///
/// Unreadable or malformed files yield an empty document with a diagnostic
/// rather than an error, so one broken file cannot abort a corpus run.
#[must_use]
pub fn load_document(path: &Path) -> LoadedDocument {
    let parsed = fs::read_to_string(path)
        .map_err(crate::error::EvalError::from)
        .and_then(|xml| parse_document(&xml));

    match parsed {
        Ok(loaded) => {
            log::debug!(
                "Loaded {} pages ({} lines) from {}",
                loaded.document.pages.len(),
                loaded.document.line_count(),
                path.display()
            );
            loaded
        }
        Err(e) => LoadedDocument {
            document: Document::default(),
            diagnostics: vec![Diagnostic::UnreadableXml {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
            .emit()],
        },
    }
}
