//! Document parsing utilities
//!
//! This module contains the span decomposition of paragraphs and the
//! table helpers built on top of docx-rs elements.

pub mod formatting;
pub mod table;
