//! Mapping table loading from CSV and spreadsheet files

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tracing::{debug, info};

use super::MappingTable;
use crate::error::{Error, Result};

/// Load a mapping table and check its required columns
pub fn load_mapping_table(path: &Path) -> Result<MappingTable> {
    if !path.is_file() {
        return Err(Error::Validation(format!(
            "mapping file not found: {}",
            path.display()
        )));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match extension.as_str() {
        "csv" => load_csv(path)?,
        "xlsx" | "xlsm" | "xls" | "ods" => load_spreadsheet(path)?,
        other => {
            return Err(Error::Validation(format!(
                "unsupported mapping file type '.{other}', expected .csv or .xlsx"
            )));
        }
    };

    table.validate_columns()?;
    info!(path = %path.display(), rows = table.len(), "loaded mapping table");
    Ok(table)
}

fn load_csv(path: &Path) -> Result<MappingTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
        cells.resize(columns.len(), String::new());
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        records.push(cells);
    }

    debug!(columns = columns.len(), records = records.len(), "parsed csv mapping");
    Ok(MappingTable::new(columns, records))
}

fn load_spreadsheet(path: &Path) -> Result<MappingTable> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names();
    let Some(first_sheet) = sheet_names.first() else {
        return Err(Error::Validation(format!(
            "workbook has no sheets: {}",
            path.display()
        )));
    };
    let range = workbook.worksheet_range(first_sheet)?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(Error::Validation(format!(
            "mapping sheet '{first_sheet}' is empty"
        )));
    };
    let columns: Vec<String> = header_row
        .iter()
        .map(|cell| cell_to_string(cell).trim().to_string())
        .collect();

    let records: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
        .filter(|cells| cells.iter().any(|cell| !cell.trim().is_empty()))
        .collect();

    debug!(sheet = %first_sheet, columns = columns.len(), records = records.len(), "parsed spreadsheet mapping");
    Ok(MappingTable::new(columns, records))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        // Whole numbers come back as floats, render them without a fraction
        Data::Float(value) if value.fract() == 0.0 => format!("{}", *value as i64),
        other => other.to_string(),
    }
}
