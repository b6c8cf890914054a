//! Text extraction and formatting utilities
//!
//! This module handles extraction of text and formatting information
//! from docx-rs paragraph and run elements, and decomposes paragraphs
//! into [`ContentSpan`]s.

use super::super::models::*;

/// Decompose a paragraph into ordered content spans
///
/// Runs become `PlainRun`s, hyperlinks become one `HyperlinkGroup` holding the
/// text of all their runs. Other children (bookmarks, comments, tracked
/// changes) carry no rendered text and produce no span.
pub fn paragraph_spans(para: &docx_rs::Paragraph) -> Vec<ContentSpan> {
    let mut spans = Vec::new();

    for (child_index, child) in para.children.iter().enumerate() {
        match child {
            docx_rs::ParagraphChild::Run(run) => {
                spans.push(ContentSpan::PlainRun {
                    child_index,
                    text: extract_run_text(run),
                    formatting: extract_run_formatting(run),
                });
            }
            docx_rs::ParagraphChild::Hyperlink(link) => {
                let runs = hyperlink_runs(link);
                let text = runs.iter().map(|run| extract_run_text(run)).collect();
                let formatting = runs
                    .first()
                    .map(|run| extract_run_formatting(run))
                    .unwrap_or_default();
                spans.push(ContentSpan::HyperlinkGroup {
                    child_index,
                    text,
                    formatting,
                    run_count: runs.len(),
                });
            }
            _ => {}
        }
    }

    spans
}

/// Rendered paragraph text, identical to the concatenation of its spans
pub fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    spans_text(&paragraph_spans(para))
}

/// Runs directly inside a hyperlink container
pub(crate) fn hyperlink_runs(link: &docx_rs::Hyperlink) -> Vec<&docx_rs::Run> {
    link.children
        .iter()
        .filter_map(|child| match child {
            docx_rs::ParagraphChild::Run(run) => Some(run.as_ref()),
            _ => None,
        })
        .collect()
}

/// Extract text from a run using docx-rs features
pub(crate) fn extract_run_text(run: &docx_rs::Run) -> String {
    let mut text = String::new();

    for child in &run.children {
        match child {
            docx_rs::RunChild::Text(text_elem) => {
                text.push_str(&text_elem.text);
            }
            docx_rs::RunChild::Tab(_) => {
                text.push('\t');
            }
            docx_rs::RunChild::Break(_) => {
                // Break types are private, so every break renders as a line break
                text.push('\n');
            }
            _ => {}
        }
    }

    text
}

/// Extract formatting information from a run
pub(crate) fn extract_run_formatting(run: &docx_rs::Run) -> SpanFormatting {
    let props = &run.run_property;

    SpanFormatting {
        bold: props.bold.is_some(),
        underlined: props.underline.is_some(),
        color: props.color.as_ref().and_then(color_value).and_then(|hex| Rgb::from_hex(&hex)),
    }
}

/// Read a colour value through its debug output, the `val` field is private
fn color_value(color: &docx_rs::Color) -> Option<String> {
    let color_debug = format!("{color:?}");
    let start = color_debug.find("val: \"")? + "val: \"".len();
    let end = color_debug[start..].find('"')?;
    Some(color_debug[start..start + end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{BreakType, Hyperlink, HyperlinkType, Paragraph, Run};

    #[test]
    fn spans_cover_runs_and_hyperlinks_in_order() {
        let para = Paragraph::new()
            .add_run(Run::new().add_text("Report via ").bold())
            .add_hyperlink(
                Hyperlink::new("https://example.org", HyperlinkType::External)
                    .add_run(Run::new().add_text("example").color("0000FF"))
                    .add_run(Run::new().add_text(".org")),
            )
            .add_run(Run::new().add_text("line").add_break(BreakType::TextWrapping));

        let spans = paragraph_spans(&para);
        assert_eq!(spans.len(), 3);
        assert!(spans[0].formatting().bold);
        assert!(spans[1].is_hyperlink());
        assert_eq!(spans[1].text(), "example.org");
        assert_eq!(spans[1].formatting().color, Some(Rgb::HYPERLINK_BLUE));
        assert_eq!(paragraph_text(&para), "Report via example.orgline\n");
    }
}
