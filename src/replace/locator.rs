//! Text span locator
//!
//! Finds a literal target inside the text reconstructed from a paragraph's
//! spans and decides which spans make up the replacement set.

use std::ops::Range;

use crate::document::{ContentSpan, spans_text};

/// Share of a span's own length the target must cover before the span is replaced
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocateOptions {
    pub overlap_threshold: f64,
    /// Byte offset in the paragraph text where the search starts
    pub search_from: usize,
}

impl Default for LocateOptions {
    fn default() -> Self {
        Self {
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
            search_from: 0,
        }
    }
}

/// A span that shares at least one character with the target
#[derive(Debug, Clone, PartialEq)]
pub struct SpanOverlap {
    /// Position in the span list
    pub span_index: usize,
    /// Position in `docx_rs::Paragraph::children`
    pub child_index: usize,
    /// Byte range of the span within the paragraph text
    pub span_range: Range<usize>,
    /// Byte range shared with the target
    pub overlap: Range<usize>,
    pub is_hyperlink: bool,
    /// Member of the replacement set
    pub included: bool,
}

impl SpanOverlap {
    /// Span text before the target, in bytes
    pub fn keep_before(&self) -> usize {
        self.overlap.start - self.span_range.start
    }

    /// Span text after the target, in bytes
    pub fn keep_after(&self) -> usize {
        self.span_range.end - self.overlap.end
    }
}

/// Location of a target within a paragraph
#[derive(Debug, Clone, PartialEq)]
pub struct SpanMatch {
    /// Byte offsets of the target in the reconstructed text
    pub start: usize,
    pub end: usize,
    /// Every overlapping span, in paragraph order
    pub overlaps: Vec<SpanOverlap>,
}

impl SpanMatch {
    pub fn replacement_set(&self) -> impl Iterator<Item = &SpanOverlap> {
        self.overlaps.iter().filter(|overlap| overlap.included)
    }
}

/// Locate `target` (case-sensitive) and classify the spans it touches
///
/// Returns `None` when the target does not occur in the paragraph at or after
/// `search_from`; the first occurrence from there is used. A span is
/// in the replacement set when it lies within the target, when the overlap
/// exceeds `overlap_threshold` of its own length, or when it is a hyperlink
/// group with any overlap. Empty spans are never included.
pub fn locate_target(spans: &[ContentSpan], target: &str, options: LocateOptions) -> Option<SpanMatch> {
    if target.is_empty() {
        return None;
    }

    let text = spans_text(spans);
    let start = options.search_from + text.get(options.search_from..)?.find(target)?;
    let end = start + target.len();

    let mut overlaps = Vec::new();
    let mut offset = 0;

    for (span_index, span) in spans.iter().enumerate() {
        let span_start = offset;
        let span_end = offset + span.text().len();
        offset = span_end;

        let overlap_start = span_start.max(start);
        let overlap_end = span_end.min(end);
        if span_start == span_end || overlap_start >= overlap_end {
            continue;
        }

        let contained = span_start >= start && span_end <= end;
        let span_chars = span.text().chars().count();
        let overlap_chars = text[overlap_start..overlap_end].chars().count();
        let ratio = overlap_chars as f64 / span_chars as f64;
        let included = contained || ratio > options.overlap_threshold || span.is_hyperlink();

        overlaps.push(SpanOverlap {
            span_index,
            child_index: span.child_index(),
            span_range: span_start..span_end,
            overlap: overlap_start..overlap_end,
            is_hyperlink: span.is_hyperlink(),
            included,
        });
    }

    Some(SpanMatch {
        start,
        end,
        overlaps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SpanFormatting;

    fn run(child_index: usize, text: &str) -> ContentSpan {
        ContentSpan::PlainRun {
            child_index,
            text: text.to_string(),
            formatting: SpanFormatting::default(),
        }
    }

    fn link(child_index: usize, text: &str) -> ContentSpan {
        ContentSpan::HyperlinkGroup {
            child_index,
            text: text.to_string(),
            formatting: SpanFormatting::default(),
            run_count: 1,
        }
    }

    #[test]
    fn contained_and_mostly_covered_spans_are_included() {
        // "xabcdefghi" has 9 of its 10 chars inside the target
        let spans = vec![run(0, "Intro "), run(1, "xabcdefghi"), run(2, " end")];
        let found = locate_target(&spans, "abcdefghi end", LocateOptions::default()).unwrap();

        let included: Vec<usize> = found.replacement_set().map(|o| o.child_index).collect();
        assert_eq!(included, vec![1, 2]);
        assert_eq!(found.overlaps[0].keep_before(), 1);
    }

    #[test]
    fn weakly_overlapping_plain_run_is_excluded() {
        let spans = vec![run(0, "Report side effects via "), run(1, "the system")];
        let found = locate_target(&spans, "via the system", LocateOptions::default()).unwrap();

        assert!(!found.overlaps[0].included);
        assert!(found.overlaps[1].included);
    }

    #[test]
    fn touched_hyperlink_is_always_included() {
        let spans = vec![run(0, "See Appendix V: "), link(1, "www.example.com/long/path")];
        let found = locate_target(&spans, "Appendix V: www", LocateOptions::default()).unwrap();

        let hyperlink = found.overlaps.iter().find(|o| o.is_hyperlink).unwrap();
        assert!(hyperlink.included);
    }

    #[test]
    fn search_starts_at_offset() {
        let spans = vec![run(0, "12 May 2020 and "), run(1, "12 May 2020")];
        let options = LocateOptions {
            search_from: 5,
            ..LocateOptions::default()
        };
        let found = locate_target(&spans, "12 May 2020", options).unwrap();

        assert_eq!(found.overlaps.len(), 1);
        assert_eq!(found.overlaps[0].child_index, 1);
    }

    #[test]
    fn missing_target_is_none() {
        let spans = vec![run(0, "Nothing to see")];
        assert!(locate_target(&spans, "national", LocateOptions::default()).is_none());
        assert!(locate_target(&spans, "nothing", LocateOptions::default()).is_none());
    }
}
