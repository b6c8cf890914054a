//! Span replacer
//!
//! Removes the located spans from a `docx_rs::Paragraph` and inserts one run
//! per replacement component at the position of the first removed span.
//! Child indices are resolved by the locator before anything is mutated;
//! children are then rewritten highest index first so lower indices stay valid.

use docx_rs::{BreakType, Hyperlink, HyperlinkType, ParagraphChild, Run, RunChild, RunProperty};
use tracing::debug;

use super::locator::{LocateOptions, SpanMatch, SpanOverlap, locate_target};
use crate::document::{ReplacementComponent, Rgb, paragraph_spans};
use crate::document::parsing::formatting::hyperlink_runs;

/// Result of a replacement attempt on one paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Replaced,
    /// The target does not occur in the paragraph text
    NotFound,
    /// The target occurs but no span qualified for replacement
    EmptySelection,
}

/// Locate `target` in a paragraph and replace it with `components`
pub fn replace_in_paragraph(
    para: &mut docx_rs::Paragraph,
    target: &str,
    components: &[ReplacementComponent],
    options: LocateOptions,
) -> ReplaceOutcome {
    let spans = paragraph_spans(para);
    let Some(found) = locate_target(&spans, target, options) else {
        return ReplaceOutcome::NotFound;
    };

    if replace_spans(para, &found, components) {
        ReplaceOutcome::Replaced
    } else {
        ReplaceOutcome::EmptySelection
    }
}

/// Apply a located match to the paragraph it was computed from
///
/// Text of plain runs outside the target is kept in place around the new
/// runs; overlapping hyperlink groups are removed whole. Returns `false`
/// without touching the paragraph when the replacement set is empty.
pub fn replace_spans(
    para: &mut docx_rs::Paragraph,
    found: &SpanMatch,
    components: &[ReplacementComponent],
) -> bool {
    let Some(anchor) = found.replacement_set().next() else {
        return false;
    };
    let anchor_child = anchor.child_index;

    let template = match para.children.get(anchor_child) {
        Some(ParagraphChild::Run(run)) => insertion_template(run),
        Some(ParagraphChild::Hyperlink(link)) => hyperlink_runs(link)
            .first()
            .map(|run| insertion_template(run))
            .unwrap_or_else(RunProperty::new),
        _ => RunProperty::new(),
    };
    let mut inserted: Option<Vec<ParagraphChild>> = Some(
        components
            .iter()
            .map(|component| component_child(component, &template))
            .collect(),
    );

    for overlap in found.overlaps.iter().rev() {
        let index = overlap.child_index;
        let Some(child) = para.children.get(index) else {
            continue;
        };

        let is_anchor = index == anchor_child;
        let mut pieces = Vec::new();
        match child {
            ParagraphChild::Run(run) => {
                let (before, after) = remnants(run, overlap);
                pieces.extend(before);
                if is_anchor {
                    pieces.extend(inserted.take().unwrap_or_default());
                }
                pieces.extend(after);
            }
            ParagraphChild::Hyperlink(_) if overlap.included => {
                if is_anchor {
                    pieces.extend(inserted.take().unwrap_or_default());
                }
            }
            other => pieces.push(other.clone()),
        }

        para.children.splice(index..=index, pieces);
    }

    debug!(
        start = found.start,
        end = found.end,
        removed = found.replacement_set().count(),
        inserted = components.len(),
        "replaced paragraph spans"
    );
    true
}

/// Pieces of a run that lie before and after the target
fn remnants(run: &Run, overlap: &SpanOverlap) -> (Option<ParagraphChild>, Option<ParagraphChild>) {
    let len = overlap.span_range.len();
    let before = (overlap.keep_before() > 0)
        .then(|| ParagraphChild::Run(Box::new(slice_run(run, 0, overlap.keep_before()))));
    let after = (overlap.keep_after() > 0)
        .then(|| ParagraphChild::Run(Box::new(slice_run(run, len - overlap.keep_after(), len))));
    (before, after)
}

/// Copy of `run` holding only its rendered text in `[from, to)` (byte offsets)
///
/// Tabs and breaks count as one byte, matching how run text is rendered.
/// Children without text travel with the piece they precede.
fn slice_run(run: &Run, from: usize, to: usize) -> Run {
    let mut children = Vec::new();
    let mut offset = 0;

    for child in &run.children {
        match child {
            RunChild::Text(text) => {
                let start = offset;
                let end = offset + text.text.len();
                offset = end;

                let lo = start.max(from);
                let hi = end.min(to);
                if lo < hi {
                    let piece = &text.text[lo - start..hi - start];
                    children.push(RunChild::Text(docx_rs::Text::new(piece)));
                }
            }
            RunChild::Tab(_) | RunChild::Break(_) => {
                if (from..to).contains(&offset) {
                    children.push(child.clone());
                }
                offset += 1;
            }
            _ => {
                if (from..to).contains(&offset) {
                    children.push(child.clone());
                }
            }
        }
    }

    let mut piece = run.clone();
    piece.children = children;
    piece
}

/// Character properties new runs inherit from the first replaced run
///
/// Background shading and highlight are dropped so the grey field shading of
/// template text does not carry over; emphasis comes from the component flags.
fn insertion_template(run: &Run) -> RunProperty {
    let mut props = run.run_property.clone();
    props.shading = None;
    props.highlight = None;
    props.style = None;
    props.bold = None;
    props.bold_cs = None;
    props.underline = None;
    props.color = None;
    props
}

/// One paragraph child for a component; newlines become text-wrapping breaks
fn component_child(component: &ReplacementComponent, template: &RunProperty) -> ParagraphChild {
    let mut run = Run::new();
    run.run_property = template.clone();

    for (index, line) in component.text.split('\n').enumerate() {
        if index > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        if !line.is_empty() {
            run = run.add_text(line);
        }
    }

    if component.bold {
        run = run.bold();
    }

    if component.is_hyperlink {
        run = run.color(Rgb::HYPERLINK_BLUE.to_hex()).underline("single");
        if let Some(url) = &component.url {
            return ParagraphChild::Hyperlink(
                Hyperlink::new(url, HyperlinkType::External).add_run(run),
            );
        }
    }

    ParagraphChild::Run(Box::new(run))
}
