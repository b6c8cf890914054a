//! National reporting text replacement
//!
//! Builds the per-country components for a section and substitutes them for
//! the section's original text in the first body paragraph that holds it.

pub mod builder;
pub mod locator;
pub mod replacer;

use tracing::{debug, info, warn};

use crate::SectionKind;
use crate::config::ProcessingConfig;
use crate::document::{ReplacementComponent, body_paragraphs_mut, paragraph_text};
use crate::mapping::MappingRow;

pub use builder::{build_replacement_from_lines, can_reuse_replacement_text, get_replacement_components};
pub use locator::{LocateOptions, SpanMatch, SpanOverlap, locate_target};
pub use replacer::{ReplaceOutcome, replace_in_paragraph, replace_spans};

/// Outcome of one section update
#[derive(Debug, Clone, PartialEq)]
pub struct SectionUpdate {
    pub section: SectionKind,
    pub success: bool,
    /// Components built for the section, empty when nothing could be built
    pub components: Vec<ReplacementComponent>,
    /// Body paragraph index that received the replacement
    pub paragraph: Option<usize>,
    pub message: String,
}

impl SectionUpdate {
    fn failed(section: SectionKind, components: Vec<ReplacementComponent>, message: String) -> Self {
        Self {
            section,
            success: false,
            components,
            paragraph: None,
            message,
        }
    }
}

/// Replace a section's national reporting text, at most once per document
///
/// The PL block is followed by the row's PL appended text, if any.
pub fn run_annex_update(
    docx: &mut docx_rs::Docx,
    row: &MappingRow,
    section: SectionKind,
    cached: Option<&[ReplacementComponent]>,
    config: &ProcessingConfig,
) -> SectionUpdate {
    let Some(target) = row.target_text(section) else {
        let message = format!("{section}: no original text configured for {}", row.country());
        warn!("{message}");
        return SectionUpdate::failed(section, Vec::new(), message);
    };

    let mut components = get_replacement_components(row, section, cached, &config.country_delimiter);
    if components.is_empty() {
        let message = format!("{section}: no replacement content for {}", row.country());
        warn!("{message}");
        return SectionUpdate::failed(section, components, message);
    }

    if section == SectionKind::PL {
        if let Some(text) = row.pl_appended_text() {
            components.push(ReplacementComponent::plain(format!("\n\n{text}")));
        }
    }

    let options = LocateOptions {
        overlap_threshold: config.overlap_threshold,
        ..LocateOptions::default()
    };
    let target_lower = target.to_lowercase();

    for (index, para) in body_paragraphs_mut(docx).into_iter().enumerate() {
        if !paragraph_text(para).to_lowercase().contains(&target_lower) {
            continue;
        }

        match replace_in_paragraph(para, &target, &components, options) {
            ReplaceOutcome::Replaced => {
                info!(section = %section, country = row.country(), paragraph = index, "replaced national reporting text");
                return SectionUpdate {
                    section,
                    success: true,
                    components,
                    paragraph: Some(index),
                    message: format!("{section} national reporting"),
                };
            }
            ReplaceOutcome::NotFound => {
                debug!(paragraph = index, "target differs in case from paragraph text, skipping");
            }
            ReplaceOutcome::EmptySelection => {
                warn!(
                    section = %section,
                    paragraph = index,
                    "target found but no span qualified for replacement"
                );
            }
        }
    }

    let message = format!("{section}: original text not found for {}", row.country());
    warn!(target = %target, "{message}");
    SectionUpdate::failed(section, components, message)
}

/// Update SmPC then PL, letting PL reuse the SmPC components when allowed
pub fn update_national_reporting(
    docx: &mut docx_rs::Docx,
    row: &MappingRow,
    config: &ProcessingConfig,
) -> Vec<SectionUpdate> {
    let smpc = run_annex_update(docx, row, SectionKind::SmPC, None, config);
    let cached = smpc.success.then_some(smpc.components.as_slice());
    let pl = run_annex_update(docx, row, SectionKind::PL, cached, config);
    vec![smpc, pl]
}
