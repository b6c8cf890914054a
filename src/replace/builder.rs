//! Component builder
//!
//! Turns the per-line, per-country mapping cells of one section into the
//! ordered component list inserted in place of the national reporting text.
//! `Line 1` names the countries; every other `Line N` cell holds one
//! delimiter-separated part per country, matched by position.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::SectionKind;
use crate::document::ReplacementComponent;
use crate::mapping::MappingRow;

#[allow(clippy::expect_used)]
static LINE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Line (\d+)").expect("valid line number regex"));

/// Sort key for columns without a line number
const UNNUMBERED_LINE: u32 = 999;

/// A `Line N` column belonging to one section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineColumn {
    pub number: u32,
    pub name: String,
}

fn is_section_line_column(name: &str, section: SectionKind) -> bool {
    if !name.starts_with("Line ") {
        return false;
    }
    match section {
        // Mapping workbooks in circulation label one SmPC column "SmpC"
        SectionKind::SmPC => name.contains("SmPC") || name.contains("SmpC"),
        SectionKind::PL => name.contains("PL"),
    }
}

fn line_number(name: &str) -> u32 {
    LINE_NUMBER
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(UNNUMBERED_LINE)
}

/// The section's line columns, ascending by line number
pub fn section_line_columns(row: &MappingRow, section: SectionKind) -> Vec<LineColumn> {
    let mut columns: Vec<LineColumn> = row
        .columns()
        .iter()
        .filter(|name| is_section_line_column(name, section))
        .map(|name| LineColumn {
            number: line_number(name),
            name: name.clone(),
        })
        .collect();
    columns.sort_by_key(|column| column.number);
    columns
}

/// Per-country content of one retained line
#[derive(Debug, Clone, PartialEq)]
enum LineParts {
    /// Whitespace-only cell: an empty line for every country
    Blank,
    Parts(Vec<String>),
}

/// Build the component list for a section of one mapping row
///
/// Returns an empty list when there is nothing to insert: no usable
/// `Line 1`, or no line columns and no PL fallback text.
pub fn build_replacement_from_lines(
    row: &MappingRow,
    section: SectionKind,
    delimiter: &str,
) -> Vec<ReplacementComponent> {
    let columns = section_line_columns(row, section);

    if columns.is_empty() {
        if section == SectionKind::PL {
            if let Some(text) = row.national_reporting_system(SectionKind::PL) {
                debug!(country = row.country(), "no PL line columns, using consolidated PL text");
                return vec![ReplacementComponent::plain(format!("\n{text}"))];
            }
        }
        warn!(country = row.country(), section = %section, "no line columns for section");
        return Vec::new();
    }

    let Some(countries) = line_one_countries(row, &columns, delimiter) else {
        warn!(
            country = row.country(),
            section = %section,
            "Line 1 is missing or empty, cannot determine countries"
        );
        return Vec::new();
    };

    let lines: Vec<LineParts> = columns
        .iter()
        .filter(|column| column.number != 1)
        .filter_map(|column| line_parts(row, column, delimiter, countries.len()))
        .collect();

    let hyperlinks = row.hyperlinks(section);
    let mut components = vec![ReplacementComponent::plain("\n\n")];

    for (position, country) in countries.iter().enumerate() {
        components.push(ReplacementComponent::bold(country.as_str()));
        components.push(ReplacementComponent::newline());

        for line in &lines {
            match line {
                LineParts::Blank => components.push(ReplacementComponent::newline()),
                LineParts::Parts(parts) => {
                    let Some(part) = parts.get(position).filter(|part| !part.is_empty()) else {
                        continue;
                    };
                    push_part(&mut components, part, &hyperlinks);
                    components.push(ReplacementComponent::newline());
                }
            }
        }

        if position + 1 < countries.len() {
            components.push(ReplacementComponent::newline());
        }
    }

    debug!(
        countries = countries.len(),
        components = components.len(),
        section = %section,
        "built replacement components"
    );
    components
}

fn line_one_countries(row: &MappingRow, columns: &[LineColumn], delimiter: &str) -> Option<Vec<String>> {
    let column = columns.iter().find(|column| column.number == 1)?;
    let text = row.value(&column.name)?;
    let countries: Vec<String> = text
        .split(delimiter)
        .map(str::trim)
        .filter(|country| !country.is_empty())
        .map(str::to_string)
        .collect();
    (!countries.is_empty()).then_some(countries)
}

fn line_parts(
    row: &MappingRow,
    column: &LineColumn,
    delimiter: &str,
    country_count: usize,
) -> Option<LineParts> {
    let raw = row.get(&column.name)?;
    if raw.is_empty() || raw.trim().eq_ignore_ascii_case("nan") {
        return None;
    }
    if raw.trim().is_empty() {
        return Some(LineParts::Blank);
    }

    let mut parts: Vec<String> = raw.split(delimiter).map(|part| part.trim().to_string()).collect();
    if parts.len() > country_count {
        let dropped = parts.split_off(country_count);
        warn!(
            country = row.country(),
            column = %column.name,
            countries = country_count,
            dropped = ?dropped,
            "line has more parts than countries, extra parts dropped"
        );
    }
    parts.resize(country_count, String::new());
    Some(LineParts::Parts(parts))
}

/// Emit one country's part, splitting out the first configured hyperlink it contains
fn push_part(components: &mut Vec<ReplacementComponent>, part: &str, hyperlinks: &[String]) {
    let found = hyperlinks
        .iter()
        .find_map(|link| part.split_once(link.as_str()).map(|(before, after)| (link, before, after)));

    match found {
        Some((link, before, after)) => {
            if !before.is_empty() {
                components.push(ReplacementComponent::plain(before));
            }
            components.push(ReplacementComponent::hyperlink(link.as_str(), hyperlink_url(link)));
            if !after.is_empty() {
                components.push(ReplacementComponent::plain(after));
            }
        }
        None => components.push(ReplacementComponent::plain(part)),
    }
}

/// Link target for a hyperlink text: e-mail → `mailto:`, bare host → `https://`
pub fn hyperlink_url(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if text.contains("://") || text.starts_with("mailto:") {
        return Some(text.to_string());
    }
    if text.contains('@') && !text.contains(' ') {
        return Some(format!("mailto:{text}"));
    }
    if text.contains('.') && !text.contains(' ') {
        return Some(format!("https://{text}"));
    }
    None
}

/// True when the PL section may reuse the SmPC components of the same row
pub fn can_reuse_replacement_text(row: &MappingRow) -> bool {
    match (
        row.national_reporting_system(SectionKind::SmPC),
        row.national_reporting_system(SectionKind::PL),
    ) {
        (Some(smpc), Some(pl)) => smpc == pl,
        _ => match (
            row.target_text(SectionKind::SmPC),
            row.target_text(SectionKind::PL),
        ) {
            (Some(smpc), Some(pl)) => smpc == pl,
            _ => false,
        },
    }
}

/// Components for a section, reusing `cached` SmPC components when allowed
pub fn get_replacement_components(
    row: &MappingRow,
    section: SectionKind,
    cached: Option<&[ReplacementComponent]>,
    delimiter: &str,
) -> Vec<ReplacementComponent> {
    match cached {
        Some(cached) if section == SectionKind::PL && can_reuse_replacement_text(row) => {
            debug!(country = row.country(), "reusing SmPC components for PL");
            cached.to_vec()
        }
        _ => build_replacement_from_lines(row, section, delimiter),
    }
}
