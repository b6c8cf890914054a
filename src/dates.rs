//! Revision date formatting and date paragraph updates
//!
//! Dates are rendered from the mapping row's per-annex templates. Month names
//! come from a [`MonthNames`] lookup passed in by the caller, so no
//! process-wide locale is touched.

use std::collections::HashMap;

use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::AnnexKind;
use crate::document::{ReplacementComponent, body_paragraph_texts, body_paragraphs_mut};
use crate::mapping::{MappingRow, MappingTable};
use crate::replace::{LocateOptions, ReplaceOutcome, replace_in_paragraph};

pub const DATE_PLACEHOLDER: &str = "<DATE>";

#[allow(clippy::expect_used)]
static FULL_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{1,2}\.?\s+\p{L}+\.?\s+\d{4}\b").expect("valid full date regex")
});

#[allow(clippy::expect_used)]
static MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\p{L}{3,}\.?\s+\d{4}\b").expect("valid month-year regex"));

/// Month name lookup, 1-based months
pub trait MonthNames {
    fn full(&self, month: u32) -> String;
    fn abbreviated(&self, month: u32) -> String;
}

/// English month names
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishMonths;

const ENGLISH_MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

impl MonthNames for EnglishMonths {
    fn full(&self, month: u32) -> String {
        ENGLISH_MONTHS
            .get(month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or_default()
            .to_string()
    }

    fn abbreviated(&self, month: u32) -> String {
        self.full(month).chars().take(3).collect()
    }
}

/// Date layouts used in the mapping workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTemplate {
    /// `dd month yyyy`
    DayMonthYear,
    /// `month yyyy`
    MonthYear,
    /// `dd. MMM yyyy`
    DayShortMonthYear,
    /// `MMM yyyy`
    ShortMonthYear,
}

impl DateTemplate {
    /// Unknown or missing templates fall back to `dd month yyyy`
    pub fn parse(template: Option<&str>) -> Self {
        match template.map(str::trim) {
            Some("month yyyy") => DateTemplate::MonthYear,
            Some("dd. MMM yyyy") => DateTemplate::DayShortMonthYear,
            Some("MMM yyyy") => DateTemplate::ShortMonthYear,
            _ => DateTemplate::DayMonthYear,
        }
    }
}

pub fn render_date(date: NaiveDate, template: DateTemplate, months: &dyn MonthNames) -> String {
    let (day, month, year) = (date.day(), date.month(), date.year());
    match template {
        DateTemplate::DayMonthYear => format!("{day:02} {} {year}", months.full(month)),
        DateTemplate::MonthYear => format!("{} {year}", months.full(month)),
        DateTemplate::DayShortMonthYear => format!("{day:02}. {} {year}", months.abbreviated(month)),
        DateTemplate::ShortMonthYear => format!("{} {year}", months.abbreviated(month)),
    }
}

/// Date text for a country and annex
pub trait DateFormatter {
    fn format_date(&self, country: &str, annex: AnnexKind) -> String;
}

/// Renders the mapping table's per-country templates for a fixed date
pub struct TemplateDateFormatter {
    date: NaiveDate,
    months: Box<dyn MonthNames + Send + Sync>,
    templates: HashMap<String, (Option<String>, Option<String>)>,
}

impl TemplateDateFormatter {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            months: Box::new(EnglishMonths),
            templates: HashMap::new(),
        }
    }

    /// Formatter for today's local date
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn with_months(mut self, months: impl MonthNames + Send + Sync + 'static) -> Self {
        self.months = Box::new(months);
        self
    }

    pub fn with_row(mut self, row: &MappingRow) -> Self {
        self.add_row(row);
        self
    }

    pub fn with_table(mut self, table: &MappingTable) -> Self {
        for row in &table.rows {
            self.add_row(row);
        }
        self
    }

    fn add_row(&mut self, row: &MappingRow) {
        self.templates.insert(
            row.country().to_string(),
            (
                row.date_format(AnnexKind::AnnexI).map(str::to_string),
                row.date_format(AnnexKind::AnnexIIIB).map(str::to_string),
            ),
        );
    }
}

impl DateFormatter for TemplateDateFormatter {
    fn format_date(&self, country: &str, annex: AnnexKind) -> String {
        let template = self.templates.get(country).and_then(|(annex_i, annex_iiib)| match annex {
            AnnexKind::AnnexI => annex_i.as_deref(),
            AnnexKind::AnnexIIIB => annex_iiib.as_deref(),
            AnnexKind::AnnexII => None,
        });
        render_date(self.date, DateTemplate::parse(template), self.months.as_ref())
    }
}

/// Existing date text in `text` at or after byte offset `from`, with its offset
fn find_date(text: &str, from: usize, allow_month_year: bool) -> Option<(usize, String)> {
    let tail = text.get(from..)?;
    if let Some(start) = tail.find(DATE_PLACEHOLDER) {
        return Some((from + start, DATE_PLACEHOLDER.to_string()));
    }
    let found = FULL_DATE
        .find(tail)
        .or_else(|| allow_month_year.then(|| MONTH_YEAR.find(tail)).flatten())?;
    Some((from + found.start(), found.as_str().to_string()))
}

/// Replace the occurrence of `old` starting at or after byte offset `from`
fn replace_date(para: &mut docx_rs::Paragraph, old: &str, from: usize, new: &str) -> bool {
    let options = LocateOptions {
        overlap_threshold: 0.0,
        search_from: from,
    };
    replace_in_paragraph(para, old, &[ReplacementComponent::plain(new)], options)
        == ReplaceOutcome::Replaced
}

/// Update the section 10 revision date of Annex I
///
/// The heading paragraph is the first holding `10.` together with `date of`,
/// `revision` or the row's Annex I date header. Its own date, or that of the
/// next non-empty paragraph, is replaced.
pub fn update_annex_i_date(
    docx: &mut docx_rs::Docx,
    row: &MappingRow,
    formatter: &dyn DateFormatter,
) -> bool {
    let texts = body_paragraph_texts(docx);
    let header = row.annex_i_date_header().map(str::to_lowercase);

    let Some(heading) = texts.iter().position(|text| {
        let lower = text.to_lowercase();
        text.contains("10.")
            && (lower.contains("date of")
                || lower.contains("revision")
                || header.as_deref().is_some_and(|h| lower.contains(h)))
    }) else {
        warn!(country = row.country(), "Annex I date section not found");
        return false;
    };

    let next = texts
        .iter()
        .enumerate()
        .skip(heading + 1)
        .find(|(_, text)| !text.trim().is_empty())
        .map(|(index, _)| index);

    let date = formatter.format_date(row.country(), AnnexKind::AnnexI);
    let mut paragraphs = body_paragraphs_mut(docx);

    for index in std::iter::once(heading).chain(next) {
        let allow_month_year = index != heading;
        let Some((start, old)) = find_date(&texts[index], 0, allow_month_year) else {
            continue;
        };
        if let Some(para) = paragraphs.get_mut(index) {
            if replace_date(para, &old, start, &date) {
                debug!(paragraph = index, old = %old, new = %date, "updated Annex I date");
                return true;
            }
        }
    }

    warn!(country = row.country(), "no date to replace in Annex I date section");
    false
}

/// Update the "last revised" date of Annex IIIB
pub fn update_annex_iiib_date(
    docx: &mut docx_rs::Docx,
    row: &MappingRow,
    formatter: &dyn DateFormatter,
) -> bool {
    let lead = row.annex_iiib_date_text();
    let Ok(lead_pattern) = Regex::new(&format!("(?i){}", regex::escape(lead))) else {
        return false;
    };

    let texts = body_paragraph_texts(docx);
    let Some((index, lead_match)) = texts.iter().enumerate().find_map(|(index, text)| {
        lead_pattern
            .find(text)
            .map(|found| (index, (found.as_str().to_string(), found.start(), found.end())))
    }) else {
        warn!(country = row.country(), lead, "Annex IIIB date text not found");
        return false;
    };
    let (lead_text, lead_start, lead_end) = lead_match;

    let date = formatter.format_date(row.country(), AnnexKind::AnnexIIIB);
    let mut paragraphs = body_paragraphs_mut(docx);
    let Some(para) = paragraphs.get_mut(index) else {
        return false;
    };

    let replaced = match find_date(&texts[index], lead_end, true) {
        Some((start, old)) => replace_date(para, &old, start, &date),
        None => replace_date(para, &lead_text, lead_start, &format!("{lead_text} {date}")),
    };
    if replaced {
        debug!(paragraph = index, new = %date, "updated Annex IIIB date");
    }
    replaced
}
