//! Document splitter
//!
//! Cuts a processed combined document into its Annex I (SmPC) and Annex IIIB
//! (package leaflet) documents at the paragraphs carrying the annex headers.
//! Annex II content goes to neither output.

use std::ops::Range;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::header::is_header_match;
use crate::AnnexKind;
use crate::document::{HeaderPositions, body_paragraph_texts, save_output};
use crate::error::{Error, Result};
use crate::files::{annex_i_filename, annex_iiib_filename};
use crate::mapping::MappingRow;

/// Header strings the split looks for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnexHeaders {
    pub annex_i: Option<String>,
    pub annex_ii: Option<String>,
    pub annex_iiib: Option<String>,
}

impl AnnexHeaders {
    pub fn from_row(row: &MappingRow) -> Self {
        Self {
            annex_i: row.header(AnnexKind::AnnexI).map(str::to_string),
            annex_ii: row.header(AnnexKind::AnnexII).map(str::to_string),
            annex_iiib: row.header(AnnexKind::AnnexIIIB).map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitStrategy {
    /// Annex I = [I, II), Annex IIIB = [IIIB, end)
    ThreeHeaders,
    /// Annex I = [0, II), Annex IIIB = [IIIB, end)
    TwoHeaderFallback,
}

/// Paragraph ranges of both outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    pub strategy: SplitStrategy,
    pub positions: HeaderPositions,
    pub annex_i: Range<usize>,
    pub annex_iiib: Range<usize>,
}

/// Scan position relative to the annex boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitState {
    /// Before the Annex I start, content is dropped
    SearchingAnnexI,
    /// Inside Annex I until the Annex II header
    SearchingAnnexII,
    /// Inside Annex II until the Annex IIIB header, content is dropped
    SearchingAnnexIIIB,
    /// Inside Annex IIIB until the end
    Done,
}

/// First paragraph index matching each header, recorded independently
pub fn find_header_positions(paragraphs: &[String], headers: &AnnexHeaders) -> HeaderPositions {
    let first_match = |header: &Option<String>| {
        let header = header.as_deref()?;
        paragraphs
            .iter()
            .position(|text| is_header_match(text, header))
    };

    let positions = HeaderPositions {
        annex_i: first_match(&headers.annex_i),
        annex_ii: first_match(&headers.annex_ii),
        annex_iiib: first_match(&headers.annex_iiib),
    };
    debug!(?positions, "header positions");
    positions
}

/// Require all three headers in strictly increasing order, returning them
pub fn validate_header_order(positions: &HeaderPositions) -> Result<(usize, usize, usize)> {
    let (Some(i), Some(ii), Some(iiib)) =
        (positions.annex_i, positions.annex_ii, positions.annex_iiib)
    else {
        return Err(Error::Document(format!(
            "missing annex header(s): {}",
            missing_headers(positions)
        )));
    };

    if i >= ii || ii >= iiib {
        return Err(Error::Document(format!(
            "annex headers out of order: Annex I at {i}, Annex II at {ii}, Annex IIIB at {iiib}"
        )));
    }
    Ok((i, ii, iiib))
}

fn missing_headers(positions: &HeaderPositions) -> String {
    [
        (positions.annex_i, AnnexKind::AnnexI),
        (positions.annex_ii, AnnexKind::AnnexII),
        (positions.annex_iiib, AnnexKind::AnnexIIIB),
    ]
    .iter()
    .filter(|(position, _)| position.is_none())
    .map(|(_, annex)| annex.label())
    .collect::<Vec<_>>()
    .join(", ")
}

/// Choose the split boundaries, falling back to the two-header layout
pub fn plan_split(paragraphs: &[String], headers: &AnnexHeaders) -> Result<SplitPlan> {
    let positions = find_header_positions(paragraphs, headers);
    let end = paragraphs.len();

    match validate_header_order(&positions) {
        Ok((i, ii, iiib)) => {
            return Ok(SplitPlan {
                strategy: SplitStrategy::ThreeHeaders,
                positions,
                annex_i: i..ii,
                annex_iiib: iiib..end,
            });
        }
        Err(err) => {
            warn!(error = %err, "three-header split failed, trying Annex II / Annex IIIB fallback");
        }
    }

    match (positions.annex_ii, positions.annex_iiib) {
        (Some(ii), Some(iiib)) if ii < iiib => Ok(SplitPlan {
            strategy: SplitStrategy::TwoHeaderFallback,
            positions,
            annex_i: 0..ii,
            annex_iiib: iiib..end,
        }),
        (Some(ii), Some(iiib)) => Err(Error::Document(format!(
            "cannot split: Annex II header at {ii} is not before Annex IIIB header at {iiib}"
        ))),
        _ => Err(Error::Document(format!(
            "cannot split: missing annex header(s): {}",
            missing_headers(&positions)
        ))),
    }
}

/// Build the Annex I and Annex IIIB documents for a plan
///
/// Each output is a new document carrying the source styles, numbering and
/// section properties. Body tables travel with the section they sit in.
pub fn split_document(source: &docx_rs::Docx, plan: &SplitPlan) -> (docx_rs::Docx, docx_rs::Docx) {
    let mut annex_i = Vec::new();
    let mut annex_iiib = Vec::new();
    let mut state = SplitState::SearchingAnnexI;
    let mut paragraph_index = 0;

    for child in &source.document.children {
        if matches!(child, docx_rs::DocumentChild::Paragraph(_)) {
            state = state_at(paragraph_index, plan);
            paragraph_index += 1;
        }

        match state {
            SplitState::SearchingAnnexII => annex_i.push(child.clone()),
            SplitState::Done => annex_iiib.push(child.clone()),
            SplitState::SearchingAnnexI | SplitState::SearchingAnnexIIIB => {}
        }
    }

    (empty_like(source, annex_i), empty_like(source, annex_iiib))
}

fn state_at(paragraph: usize, plan: &SplitPlan) -> SplitState {
    if plan.annex_iiib.contains(&paragraph) {
        SplitState::Done
    } else if plan.annex_i.contains(&paragraph) {
        SplitState::SearchingAnnexII
    } else if paragraph >= plan.annex_i.end {
        SplitState::SearchingAnnexIIIB
    } else {
        SplitState::SearchingAnnexI
    }
}

fn empty_like(source: &docx_rs::Docx, children: Vec<docx_rs::DocumentChild>) -> docx_rs::Docx {
    let mut docx = docx_rs::Docx::new();
    docx.styles = source.styles.clone();
    docx.numberings = source.numberings.clone();
    docx.document.section_property = source.document.section_property.clone();
    docx.document.children = children;
    docx
}

/// Paths of the two annex documents of one variant
///
/// `written` and `skipped` partition the two paths; existing files are
/// skipped unless overwriting is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutput {
    pub strategy: SplitStrategy,
    pub annex_i: PathBuf,
    pub annex_iiib: PathBuf,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Split a processed document and write both annexes into `output_dir`
///
/// Files go into a sub-folder named after the country group, with names
/// following the `Annex_I_EU_SmPC_{language}_{country}` convention.
pub fn split_annexes(
    docx: &docx_rs::Docx,
    row: &MappingRow,
    output_dir: &Path,
    overwrite_existing: bool,
) -> Result<SplitOutput> {
    let headers = AnnexHeaders::from_row(row);
    let paragraphs = body_paragraph_texts(docx);
    let plan = plan_split(&paragraphs, &headers)?;
    let (annex_i, annex_iiib) = split_document(docx, &plan);

    let country_dir = output_dir.join(crate::files::country_safe(row.country()));
    let annex_i_path = country_dir.join(annex_i_filename(row.language(), row.country()));
    let annex_iiib_path = country_dir.join(annex_iiib_filename(row.language(), row.country()));

    let mut written = Vec::new();
    let mut skipped = Vec::new();
    for (doc, path) in [(annex_i, &annex_i_path), (annex_iiib, &annex_iiib_path)] {
        if save_output(doc, path, overwrite_existing)? {
            written.push(path.clone());
        } else {
            skipped.push(path.clone());
        }
    }

    info!(
        country = row.country(),
        strategy = ?plan.strategy,
        annex_i = ?plan.annex_i,
        annex_iiib = ?plan.annex_iiib,
        "split document"
    );
    Ok(SplitOutput {
        strategy: plan.strategy,
        annex_i: annex_i_path,
        annex_iiib: annex_iiib_path,
        written,
        skipped,
    })
}
