//! Core data structures for paragraph content and replacement
//!
//! This module defines the span view over a `docx_rs` paragraph, the
//! components inserted in place of located text, and header positions used
//! when splitting a document into annexes.

use serde::{Deserialize, Serialize};

/// 24-bit run colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const HYPERLINK_BLUE: Rgb = Rgb(0x00, 0x00, 0xFF);

    /// Parse a Word hex colour (`RRGGBB`, optional `#`, alpha ignored)
    pub fn from_hex(hex: &str) -> Option<Rgb> {
        let hex = hex.trim_start_matches('#');

        match hex.len() {
            6 | 8 => {
                let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
                let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
                let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
                Some(Rgb(r, g, b))
            }
            // "auto" and anything else carries no explicit colour
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanFormatting {
    pub bold: bool,
    pub underlined: bool,
    pub color: Option<Rgb>,
}

/// One ordered unit of paragraph content
///
/// `child_index` points into `docx_rs::Paragraph::children`, so spans stay
/// valid handles until the paragraph is mutated.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentSpan {
    PlainRun {
        child_index: usize,
        text: String,
        formatting: SpanFormatting,
    },
    /// A `w:hyperlink` container and the runs inside it
    HyperlinkGroup {
        child_index: usize,
        text: String,
        formatting: SpanFormatting,
        run_count: usize,
    },
}

impl ContentSpan {
    pub fn text(&self) -> &str {
        match self {
            ContentSpan::PlainRun { text, .. } | ContentSpan::HyperlinkGroup { text, .. } => text,
        }
    }

    pub fn child_index(&self) -> usize {
        match self {
            ContentSpan::PlainRun { child_index, .. }
            | ContentSpan::HyperlinkGroup { child_index, .. } => *child_index,
        }
    }

    pub fn formatting(&self) -> &SpanFormatting {
        match self {
            ContentSpan::PlainRun { formatting, .. }
            | ContentSpan::HyperlinkGroup { formatting, .. } => formatting,
        }
    }

    pub fn is_hyperlink(&self) -> bool {
        matches!(self, ContentSpan::HyperlinkGroup { .. })
    }
}

/// Reconstruct rendered paragraph text from its spans
pub fn spans_text(spans: &[ContentSpan]) -> String {
    spans.iter().map(ContentSpan::text).collect()
}

/// One atomic formatted insert produced by the component builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementComponent {
    pub text: String,
    pub bold: bool,
    pub is_hyperlink: bool,
    pub url: Option<String>,
}

impl ReplacementComponent {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            is_hyperlink: false,
            url: None,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            bold: true,
            ..Self::plain(text)
        }
    }

    pub fn newline() -> Self {
        Self::plain("\n")
    }

    pub fn hyperlink(text: impl Into<String>, url: Option<String>) -> Self {
        Self {
            is_hyperlink: true,
            url,
            ..Self::plain(text)
        }
    }
}

/// Concatenated text of a component list, as it renders after insertion
pub fn components_text(components: &[ReplacementComponent]) -> String {
    components.iter().map(|c| c.text.as_str()).collect()
}

/// First body paragraph index found for each annex header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeaderPositions {
    pub annex_i: Option<usize>,
    pub annex_ii: Option<usize>,
    pub annex_iiib: Option<usize>,
}

/// Outcome for one cell of the local representative table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Kept,
    Cleared,
}
