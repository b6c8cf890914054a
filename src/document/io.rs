//! File I/O operations and validation
//!
//! This module handles file validation, loading and saving of .docx documents.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use docx_rs::{
    DocumentChild, Hyperlink, HyperlinkData, HyperlinkType, Paragraph, ParagraphChild, Table,
    TableCellContent,
};
use tracing::warn;
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Validates that the file is a legitimate .docx file
pub fn validate_docx_file(file_path: &Path) -> Result<()> {
    // Check file extension
    let extension = file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    if !extension.eq_ignore_ascii_case("docx") {
        return Err(Error::Validation(format!(
            "Invalid file format for {}. Expected .docx file, got .{extension}",
            file_path.display()
        )));
    }

    // Check ZIP structure contains word/document.xml
    let file = File::open(file_path)?;
    let mut archive = ZipArchive::new(file)?;

    if archive.by_name("word/document.xml").is_err() {
        // Check if it might be an Excel file
        if archive.by_name("xl/workbook.xml").is_ok() {
            return Err(Error::Validation(format!(
                "{} appears to be an Excel file (.xlsx), not a Word document",
                file_path.display()
            )));
        }

        return Err(Error::Validation(format!(
            "Invalid .docx file {}: missing word/document.xml",
            file_path.display()
        )));
    }

    Ok(())
}

/// Validate and parse a .docx file
pub fn load_docx(file_path: &Path) -> Result<docx_rs::Docx> {
    validate_docx_file(file_path)?;

    let file_data = std::fs::read(file_path)?;
    let mut docx = docx_rs::read_docx(&file_data)?;
    restore_hyperlink_targets(&mut docx);
    Ok(docx)
}

/// Copy relationship targets back onto external hyperlinks
///
/// The reader keeps link targets only in `Docx::hyperlinks`, while the
/// writer rebuilds `document.xml.rels` from the paths on the elements.
fn restore_hyperlink_targets(docx: &mut docx_rs::Docx) {
    let targets: HashMap<String, String> = docx
        .hyperlinks
        .iter()
        .map(|(rid, target, _)| (rid.clone(), escaped_target(target)))
        .collect();
    if targets.is_empty() {
        return;
    }

    for child in &mut docx.document.children {
        match child {
            DocumentChild::Paragraph(para) => restore_in_paragraph(para, &targets),
            DocumentChild::Table(table) => restore_in_table(table, &targets),
            _ => {}
        }
    }
}

fn restore_in_paragraph(para: &mut Paragraph, targets: &HashMap<String, String>) {
    for child in &mut para.children {
        let ParagraphChild::Hyperlink(link) = child else {
            continue;
        };
        if let HyperlinkData::External { rid, path } = &mut link.link {
            if path.is_empty() {
                if let Some(target) = targets.get(rid.as_str()) {
                    path.clone_from(target);
                }
            }
        }
    }
}

fn restore_in_table(table: &mut Table, targets: &HashMap<String, String>) {
    for row in crate::document::parsing::table::rows_mut(table) {
        for docx_rs::TableRowChild::TableCell(cell) in &mut row.cells {
            for content in &mut cell.children {
                match content {
                    TableCellContent::Paragraph(para) => restore_in_paragraph(para, targets),
                    TableCellContent::Table(nested) => restore_in_table(nested, targets),
                    _ => {}
                }
            }
        }
    }
}

/// Target in the escaped form the writer expects on hyperlink elements
fn escaped_target(target: &str) -> String {
    match Hyperlink::new(target, HyperlinkType::External).link {
        HyperlinkData::External { path, .. } => path,
        HyperlinkData::Anchor { .. } => target.to_string(),
    }
}

/// Write a document, creating the parent directory if needed
pub fn save_docx(docx: docx_rs::Docx, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(file_path)?;
    docx.build()
        .pack(file)
        .map_err(|err| Error::Docx(format!("failed to write {}: {err}", file_path.display())))?;
    Ok(())
}

/// Write an output document unless it exists and overwriting is off
///
/// Returns whether the file was written.
pub fn save_output(docx: docx_rs::Docx, file_path: &Path, overwrite_existing: bool) -> Result<bool> {
    if file_path.exists() && !overwrite_existing {
        warn!(path = %file_path.display(), "output exists, not overwriting");
        return Ok(false);
    }
    save_docx(docx, file_path)?;
    Ok(true)
}
