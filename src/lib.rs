//! regdoc: country-specific processing of EU SmPC / package leaflet documents
//!
//! This library substitutes national reporting text, dates and local
//! representative details into combined regulatory Word documents according
//! to a mapping table, then splits each result into separate Annex I and
//! Annex IIIB documents.

pub mod config;
pub mod dates;
pub mod document;
pub mod error;
pub mod files;
pub mod jobs;
pub mod mapping;
pub mod pdf;
pub mod processor;
pub mod replace;
pub mod split;
pub mod table_filter;

use serde::{Deserialize, Serialize};

/// Document section whose national reporting text is replaced
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    /// Summary of Product Characteristics (Annex I)
    #[value(name = "smpc")]
    SmPC,
    /// Package Leaflet (Annex IIIB)
    #[value(name = "pl")]
    PL,
}

impl SectionKind {
    /// Tag used in mapping column names
    pub fn tag(self) -> &'static str {
        match self {
            SectionKind::SmPC => "SmPC",
            SectionKind::PL => "PL",
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Annex header markers a combined document is split at
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnexKind {
    #[value(name = "i")]
    AnnexI,
    #[value(name = "ii")]
    AnnexII,
    #[value(name = "iiib")]
    AnnexIIIB,
}

impl AnnexKind {
    pub fn label(self) -> &'static str {
        match self {
            AnnexKind::AnnexI => "Annex I",
            AnnexKind::AnnexII => "Annex II",
            AnnexKind::AnnexIIIB => "Annex IIIB",
        }
    }
}

// Re-export commonly used types
pub use config::ProcessingConfig;
pub use document::{ContentSpan, ReplacementComponent};
pub use error::{Error, Result};
pub use mapping::{MappingRow, MappingTable};
pub use processor::{ProcessingResult, ProcessingStats};
