//! Mapping table rows and lookups
//!
//! A mapping row is one country (or "/"-joined country group) and language
//! configuration. Column names follow the regulatory mapping workbook, e.g.
//! `Line 2 - SmPC` or `Annex IIIB Header in country language`.

pub mod loader;

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::{AnnexKind, SectionKind};

pub use loader::load_mapping_table;

pub const COUNTRY: &str = "Country";
pub const LANGUAGE: &str = "Language";
pub const PL_APPENDED_TEXT: &str = "Text to be appended after National reporting system PL";
pub const ANNEX_I_DATE_HEADER: &str = "Annex I Date Header";
pub const ANNEX_IIIB_DATE_TEXT: &str = "Annex IIIB Date Text";
pub const DEFAULT_ANNEX_IIIB_DATE_TEXT: &str = "This leaflet was last revised in";

/// Columns whose presence is checked when a table is loaded
pub const REQUIRED_COLUMNS: &[&str] = &[
    COUNTRY,
    LANGUAGE,
    "Annex I Header in country language",
    "Annex II Header in country language",
    "Annex IIIB Header in country language",
    "Original text national reporting - SmPC",
    "Original text national reporting - PL",
];

/// Countries of a "/"-joined group such as `Ireland/Malta`
pub fn split_country_group(group: &str) -> Vec<String> {
    group
        .split('/')
        .map(str::trim)
        .filter(|country| !country.is_empty())
        .map(str::to_string)
        .collect()
}

/// True for empty cells and the literal `nan` token spreadsheets export
pub fn is_missing(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
}

/// Lowercase alphanumerics only, for language comparisons
pub fn normalize_token(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// One mapping workbook row as a flat column → value record
#[derive(Debug, Clone, PartialEq)]
pub struct MappingRow {
    pub index: usize,
    columns: Vec<String>,
    values: HashMap<String, String>,
}

impl MappingRow {
    pub fn new(index: usize, columns: &[String], cells: Vec<String>) -> Self {
        let mut values = HashMap::with_capacity(columns.len());
        for (column, cell) in columns.iter().zip(cells) {
            values.insert(column.clone(), cell);
        }

        Self {
            index,
            columns: columns.to_vec(),
            values,
        }
    }

    /// Build a row from `(column, value)` pairs
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let columns: Vec<String> = pairs.iter().map(|(column, _)| column.to_string()).collect();
        let cells = pairs.iter().map(|(_, value)| value.to_string()).collect();
        Self::new(0, &columns, cells)
    }

    /// Column names in header order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Raw cell text, whitespace untouched
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// Trimmed cell text, `None` when the cell is missing
    pub fn value(&self, column: &str) -> Option<&str> {
        self.get(column)
            .filter(|value| !is_missing(value))
            .map(str::trim)
    }

    pub fn country(&self) -> &str {
        self.value(COUNTRY).unwrap_or_default()
    }

    pub fn language(&self) -> &str {
        self.value(LANGUAGE).unwrap_or_default()
    }

    pub fn countries(&self) -> Vec<String> {
        split_country_group(self.country())
    }

    pub fn header(&self, annex: AnnexKind) -> Option<&str> {
        let column = match annex {
            AnnexKind::AnnexI => "Annex I Header in country language",
            AnnexKind::AnnexII => "Annex II Header in country language",
            AnnexKind::AnnexIIIB => "Annex IIIB Header in country language",
        };
        self.value(column)
    }

    /// Literal text to locate for a section, with a leading `label:` removed
    pub fn target_text(&self, section: SectionKind) -> Option<String> {
        let raw = self.value(&format!("Original text national reporting - {}", section.tag()))?;
        let target = match raw.split_once(':') {
            Some((_, rest)) => rest.trim(),
            None => raw,
        };
        (!target.is_empty()).then(|| target.to_string())
    }

    pub fn national_reporting_system(&self, section: SectionKind) -> Option<&str> {
        self.value(&format!("National reporting system {}", section.tag()))
    }

    /// Hyperlink texts configured for a section, web links before e-mail links
    pub fn hyperlinks(&self, section: SectionKind) -> Vec<String> {
        let columns = [
            format!("Hyperlinks {}", section.tag()),
            format!("Link for email - {}", section.tag()),
        ];

        columns
            .iter()
            .filter_map(|column| self.value(column))
            .flat_map(|cell| cell.split([',', ';']))
            .map(str::trim)
            .filter(|link| !is_missing(link))
            .map(str::to_string)
            .collect()
    }

    pub fn date_format(&self, annex: AnnexKind) -> Option<&str> {
        match annex {
            AnnexKind::AnnexI => self.value("Annex I Date Format"),
            AnnexKind::AnnexIIIB => self.value("Annex IIIB Date Format"),
            AnnexKind::AnnexII => None,
        }
    }

    pub fn annex_i_date_header(&self) -> Option<&str> {
        self.value(ANNEX_I_DATE_HEADER)
    }

    pub fn annex_iiib_date_text(&self) -> &str {
        self.value(ANNEX_IIIB_DATE_TEXT)
            .unwrap_or(DEFAULT_ANNEX_IIIB_DATE_TEXT)
    }

    pub fn pl_appended_text(&self) -> Option<&str> {
        self.value(PL_APPENDED_TEXT)
    }
}

/// All rows of a mapping workbook
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    pub columns: Vec<String>,
    pub rows: Vec<MappingRow>,
}

impl MappingTable {
    pub fn new(columns: Vec<String>, records: Vec<Vec<String>>) -> Self {
        let rows = records
            .into_iter()
            .enumerate()
            .map(|(index, cells)| MappingRow::new(index, &columns, cells))
            .collect();
        Self { columns, rows }
    }

    /// Check that every required column exists
    pub fn validate_columns(&self) -> Result<()> {
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|required| !self.columns.iter().any(|column| column == required))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "mapping table is missing required columns: {}",
                missing.join(", ")
            )))
        }
    }

    /// Rows whose language matches, compared on normalized tokens
    pub fn rows_for_language(&self, language: &str) -> Result<Vec<&MappingRow>> {
        let wanted = normalize_token(language);
        let rows: Vec<&MappingRow> = self
            .rows
            .iter()
            .filter(|row| !wanted.is_empty() && normalize_token(row.language()) == wanted)
            .collect();

        if rows.is_empty() {
            return Err(Error::Mapping(format!(
                "no mapping rows for language '{language}'"
            )));
        }
        Ok(rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
