//! Document model and docx-rs access
//!
//! This module exposes Word (.docx) paragraphs as ordered content spans and
//! provides the loading, saving and querying operations the replacement,
//! splitting and table filtering stages build on.

pub mod io;
pub mod models;
pub mod parsing;
pub mod query;

// Re-export all models and query functions
pub use io::{load_docx, save_docx, save_output, validate_docx_file};
pub use models::*;
pub use parsing::formatting::{paragraph_spans, paragraph_text};
pub use query::*;
