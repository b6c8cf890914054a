//! Table cell access and restructuring
//!
//! Helpers over `docx_rs::Table` used by the local representative filter:
//! reading cell text, clearing cells, merging cells horizontally and
//! dropping rows.

use super::formatting::paragraph_text;

/// Text of every paragraph in a cell, one line per paragraph
pub fn cell_text(cell: &docx_rs::TableCell) -> String {
    cell.children
        .iter()
        .filter_map(|content| match content {
            docx_rs::TableCellContent::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn cell_is_empty(cell: &docx_rs::TableCell) -> bool {
    cell_text(cell).trim().is_empty()
}

/// Set a cell's text to empty, keeping one paragraph with the first
/// paragraph's properties so the cell stays valid
pub fn clear_cell(cell: &mut docx_rs::TableCell) {
    let mut para = cell
        .children
        .iter()
        .find_map(|content| match content {
            docx_rs::TableCellContent::Paragraph(para) => Some(para.clone()),
            _ => None,
        })
        .unwrap_or_else(|| Box::new(docx_rs::Paragraph::new()));
    para.children.clear();
    cell.children = vec![docx_rs::TableCellContent::Paragraph(para)];
}

/// Texts of all cells in a row
pub fn row_texts(row: &docx_rs::TableRow) -> Vec<String> {
    row.cells
        .iter()
        .map(|row_child| {
            let docx_rs::TableRowChild::TableCell(cell) = row_child;
            cell_text(cell)
        })
        .collect()
}

pub fn row_is_empty(row: &docx_rs::TableRow) -> bool {
    row_texts(row).iter().all(|text| text.trim().is_empty())
}

/// Grid columns covered by a cell, read from its `gridSpan`
///
/// `TableCellProperty` keeps the span private; its serialized form exposes it.
pub fn grid_span(cell: &docx_rs::TableCell) -> usize {
    serde_json::to_value(&cell.property)
        .ok()
        .and_then(|value| value.get("gridSpan")?.as_u64())
        .and_then(|span| usize::try_from(span).ok())
        .filter(|span| *span > 0)
        .unwrap_or(1)
}

/// Merge cells `first..=last` of a row into one cell spanning their grid columns
///
/// The merged cell keeps the properties of cell `first` and covers the sum of
/// the merged cells' grid spans. Content of the non-empty cells is
/// concatenated in column order; if every cell is empty a single empty
/// paragraph remains.
pub fn merge_cells(row: &mut docx_rs::TableRow, first: usize, last: usize) {
    if first >= last || last >= row.cells.len() {
        return;
    }

    let mut span = 0;
    let mut contents = Vec::new();
    for row_child in &row.cells[first..=last] {
        let docx_rs::TableRowChild::TableCell(cell) = row_child;
        span += grid_span(cell);
        if !cell_is_empty(cell) {
            contents.extend(cell.children.iter().cloned());
        }
    }

    let docx_rs::TableRowChild::TableCell(anchor) = &row.cells[first];
    let mut merged = anchor.clone();
    if contents.is_empty() {
        clear_cell(&mut merged);
    } else {
        merged.children = contents;
    }
    let merged = merged.grid_span(span);

    row.cells.splice(
        first..=last,
        std::iter::once(docx_rs::TableRowChild::TableCell(merged)),
    );
}

/// Mutable access to the rows of a table
pub fn rows_mut(table: &mut docx_rs::Table) -> impl Iterator<Item = &mut docx_rs::TableRow> {
    table.rows.iter_mut().map(|table_child| {
        let docx_rs::TableChild::TableRow(row) = table_child;
        row
    })
}

pub fn rows(table: &docx_rs::Table) -> impl Iterator<Item = &docx_rs::TableRow> {
    table.rows.iter().map(|table_child| {
        let docx_rs::TableChild::TableRow(row) = table_child;
        row
    })
}
