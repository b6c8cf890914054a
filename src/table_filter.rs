//! Local representative table filtering
//!
//! The last body table of a package leaflet lists the local representative
//! of every country. For a country group only that group's cells survive:
//! other cells are cleared, emptied cells are merged into the first kept cell
//! of their row, and all-empty rows after the first one are removed.

use tracing::{debug, info, warn};

use crate::document::parsing::table::{
    clear_cell, merge_cells, row_is_empty, row_texts, rows, rows_mut,
};
use crate::document::{CellState, last_table, last_table_mut};
use crate::mapping::split_country_group;

/// What filtering did to the table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableFilterReport {
    /// Rows holding at least one kept cell
    pub rows_processed: usize,
    pub cells_cleared: usize,
    pub rows_removed: usize,
}

impl TableFilterReport {
    pub fn success(&self) -> bool {
        self.rows_processed > 0
    }
}

/// True when the cell text opens with the country name
///
/// Accepts `Country: ...`, `Country ...`, the bare name, or a first word
/// equal to the name once trailing `:.,-` are removed. Case-insensitive.
pub fn cell_starts_with_country(cell_text: &str, country: &str) -> bool {
    let cell = cell_text.trim().to_lowercase();
    let country = country.trim().to_lowercase();
    if cell.is_empty() || country.is_empty() {
        return false;
    }

    if cell.starts_with(&format!("{country}:"))
        || cell.starts_with(&format!("{country} "))
        || cell == country
    {
        return true;
    }

    cell.split_whitespace()
        .next()
        .map(|word| word.trim_end_matches([':', '.', ',', '-']))
        .is_some_and(|word| word == country)
}

fn starts_with_any(text: &str, countries: &[String]) -> bool {
    countries
        .iter()
        .any(|country| cell_starts_with_country(text, country))
}

/// True when some cell of the table opens with one of the countries
pub fn table_contains_country(table: &docx_rs::Table, countries: &[String]) -> bool {
    rows(table)
        .flat_map(row_texts)
        .any(|text| starts_with_any(&text, countries))
}

/// Classify, clear and merge the cells of one row
///
/// Returns the cell states before merging. Rows without a kept cell are only
/// cleared.
pub fn filter_row(row: &mut docx_rs::TableRow, countries: &[String]) -> Vec<CellState> {
    let states: Vec<CellState> = row_texts(row)
        .iter()
        .map(|text| {
            if starts_with_any(text, countries) {
                CellState::Kept
            } else {
                CellState::Cleared
            }
        })
        .collect();

    for (row_child, state) in row.cells.iter_mut().zip(&states) {
        let docx_rs::TableRowChild::TableCell(cell) = row_child;
        if *state == CellState::Cleared {
            clear_cell(cell);
        }
    }

    let Some(target) = states.iter().position(|state| *state == CellState::Kept) else {
        return states;
    };

    let empties: Vec<usize> = row_texts(row)
        .iter()
        .enumerate()
        .filter(|(index, text)| *index != target && text.is_empty())
        .map(|(index, _)| index)
        .collect();

    if let (Some(&first_empty), Some(&last_empty)) = (empties.first(), empties.last()) {
        let first = target.min(first_empty);
        let last = target.max(last_empty);
        merge_cells(row, first, last);
    }

    states
}

/// Remove all-empty rows except the first one, returning how many went
pub fn cleanup_empty_rows(table: &mut docx_rs::Table) -> usize {
    let mut first_empty_seen = false;
    let mut keep = Vec::with_capacity(table.rows.len());

    for row in rows(table) {
        if row_is_empty(row) {
            keep.push(!first_empty_seen);
            first_empty_seen = true;
        } else {
            keep.push(true);
        }
    }

    let before = table.rows.len();
    let mut flags = keep.into_iter();
    table.rows.retain(|_| flags.next().unwrap_or(true));
    before - table.rows.len()
}

/// Filter a table for a set of countries
pub fn filter_table_content(table: &mut docx_rs::Table, countries: &[String]) -> TableFilterReport {
    let mut report = TableFilterReport::default();

    for (index, row) in rows_mut(table).enumerate() {
        let states = filter_row(row, countries);
        let cleared = states.iter().filter(|s| **s == CellState::Cleared).count();
        report.cells_cleared += cleared;
        if states.contains(&CellState::Kept) {
            report.rows_processed += 1;
        }
        debug!(row = index, cleared, "filtered local rep row");
    }

    report.rows_removed = cleanup_empty_rows(table);
    report
}

/// Filter the document's local representative table for a country group
///
/// `country_group` may join several countries with `/`, e.g. `Ireland/Malta`.
/// Returns `None` when the document has no table or the last table does not
/// mention any of the countries; the document is left untouched then.
pub fn process_local_rep_table(
    docx: &mut docx_rs::Docx,
    country_group: &str,
) -> Option<TableFilterReport> {
    let countries = split_country_group(country_group);
    if countries.is_empty() {
        return None;
    }

    let Some(table) = last_table_mut(docx) else {
        warn!(country = country_group, "no table found for local representatives");
        return None;
    };

    if !table_contains_country(table, &countries) {
        warn!(
            country = country_group,
            "last table does not list the target countries, local representatives not found"
        );
        return None;
    }

    let report = filter_table_content(table, &countries);
    info!(
        country = country_group,
        rows = report.rows_processed,
        removed = report.rows_removed,
        "filtered local representative table"
    );
    Some(report)
}

/// Texts of the last body table, row by row
pub fn last_table_texts(docx: &docx_rs::Docx) -> Vec<Vec<String>> {
    last_table(docx)
        .map(|table| rows(table).map(row_texts).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_prefix_forms() {
        assert!(cell_starts_with_country("Ireland: Regeneron Ireland DAC", "Ireland"));
        assert!(cell_starts_with_country("  IRELAND Tel: 123", "ireland"));
        assert!(cell_starts_with_country("Malta", "Malta"));
        assert!(cell_starts_with_country("Malta- Agent", "Malta"));
        assert!(!cell_starts_with_country("France: Regeneron Ireland DAC", "Ireland"));
        assert!(!cell_starts_with_country("Regeneron Ireland DAC", "Ireland"));
        assert!(!cell_starts_with_country("", "Ireland"));
    }
}
