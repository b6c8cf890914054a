//! Document search and navigation operations
//!
//! Body paragraphs are addressed by their index among the body-level
//! paragraphs of `docx.document.children`; tables and other block elements
//! do not count. Paragraphs inside tables are never searched.

use super::parsing::formatting::paragraph_text;

/// Body-level paragraphs in document order
pub fn body_paragraphs(docx: &docx_rs::Docx) -> Vec<&docx_rs::Paragraph> {
    docx.document
        .children
        .iter()
        .filter_map(|child| match child {
            docx_rs::DocumentChild::Paragraph(para) => {
                let para: &docx_rs::Paragraph = para;
                Some(para)
            }
            _ => None,
        })
        .collect()
}

pub fn body_paragraphs_mut(docx: &mut docx_rs::Docx) -> Vec<&mut docx_rs::Paragraph> {
    docx.document
        .children
        .iter_mut()
        .filter_map(|child| match child {
            docx_rs::DocumentChild::Paragraph(para) => {
                let para: &mut docx_rs::Paragraph = para;
                Some(para)
            }
            _ => None,
        })
        .collect()
}

pub fn body_paragraph_texts(docx: &docx_rs::Docx) -> Vec<String> {
    body_paragraphs(docx)
        .into_iter()
        .map(paragraph_text)
        .collect()
}

/// The last body-level table, the local representative table by convention
pub fn last_table(docx: &docx_rs::Docx) -> Option<&docx_rs::Table> {
    docx.document
        .children
        .iter()
        .rev()
        .find_map(|child| match child {
            docx_rs::DocumentChild::Table(table) => {
                let table: &docx_rs::Table = table;
                Some(table)
            }
            _ => None,
        })
}

pub fn last_table_mut(docx: &mut docx_rs::Docx) -> Option<&mut docx_rs::Table> {
    docx.document
        .children
        .iter_mut()
        .rev()
        .find_map(|child| match child {
            docx_rs::DocumentChild::Table(table) => {
                let table: &mut docx_rs::Table = table;
                Some(table)
            }
            _ => None,
        })
}

pub fn table_count(docx: &docx_rs::Docx) -> usize {
    docx.document
        .children
        .iter()
        .filter(|child| matches!(child, docx_rs::DocumentChild::Table(_)))
        .count()
}
