//! File discovery, naming and backups

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::error::{Error, Result};

#[allow(clippy::expect_used)]
static LANGUAGE_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)ema-combined-h-\d+-([a-z]{2})(?:-annotated|[-_])")
        .expect("valid filename regex")
});

/// Two-letter document codes → (language, country)
const LANGUAGE_CODES: &[(&str, &str, &str)] = &[
    ("bg", "Bulgarian", "Bulgaria"),
    ("hr", "Croatian", "Croatia"),
    ("cs", "Czech", "Czech Republic"),
    ("da", "Danish", "Denmark"),
    ("nl", "Dutch", "Netherlands"),
    ("en", "English", "Ireland"),
    ("et", "Estonian", "Estonia"),
    ("fi", "Finnish", "Finland"),
    ("fr", "French", "France"),
    ("de", "German", "Germany"),
    ("el", "Greek", "Greece"),
    ("hu", "Hungarian", "Hungary"),
    ("is", "Icelandic", "Iceland"),
    ("it", "Italian", "Italy"),
    ("lv", "Latvian", "Latvia"),
    ("lt", "Lithuanian", "Lithuania"),
    ("mt", "Maltese", "Malta"),
    ("no", "Norwegian", "Norway"),
    ("pl", "Polish", "Poland"),
    ("pt", "Portuguese", "Portugal"),
    ("ro", "Romanian", "Romania"),
    ("sk", "Slovak", "Slovakia"),
    ("sl", "Slovenian", "Slovenia"),
    ("es", "Spanish", "Spain"),
    ("sv", "Swedish", "Sweden"),
];

/// Language and reference country identified from a document filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLanguage {
    pub code: String,
    pub language: &'static str,
    pub country: &'static str,
}

/// Read the language code from names like `ema-combined-h-1234-fr-annotated.docx`
pub fn identify_language(path: &Path) -> Option<DocumentLanguage> {
    let stem = path.file_stem()?.to_str()?;
    let code = LANGUAGE_CODE.captures(stem)?.get(1)?.as_str().to_lowercase();
    let (_, language, country) = LANGUAGE_CODES
        .iter()
        .find(|(candidate, _, _)| *candidate == code)?;

    Some(DocumentLanguage {
        code,
        language,
        country,
    })
}

/// Country group as a path component: `/` and spaces become `_`
pub fn country_safe(country: &str) -> String {
    country.trim().replace(['/', ' '], "_")
}

pub fn annex_i_filename(language: &str, country: &str) -> String {
    format!("Annex_I_EU_SmPC_{}_{}.docx", language.trim(), country_safe(country))
}

pub fn annex_iiib_filename(language: &str, country: &str) -> String {
    format!("Annex_IIIB_EU_PL_{}_{}.docx", language.trim(), country_safe(country))
}

/// Name of the processed combined document for one country group
pub fn combined_filename(source: &Path, country: &str) -> String {
    let stem = source
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("document");
    format!("{stem}_{}.docx", country_safe(country))
}

/// True for lock files and outputs of earlier runs
fn is_skipped_name(name: &str) -> bool {
    name.starts_with('~') || name.contains("_Annex_") || name.starts_with("Annex")
}

/// Source documents directly inside `folder`, sorted by name
pub fn discover_documents(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(Error::Validation(format!(
            "input folder not found: {}",
            folder.display()
        )));
    }

    let mut documents = Vec::new();
    for entry in fs::read_dir(folder)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let is_docx = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));
        if !is_docx {
            continue;
        }
        if is_skipped_name(name) {
            debug!(file = name, "skipping generated or lock file");
            continue;
        }
        documents.push(path);
    }

    documents.sort();
    Ok(documents)
}

/// Copy a source document into the backup directory
pub fn create_backup(source: &Path, backup_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(backup_dir)?;
    let name = source
        .file_name()
        .ok_or_else(|| Error::Validation(format!("not a file: {}", source.display())))?;
    let target = backup_dir.join(name);
    fs::copy(source, &target)?;
    info!(backup = %target.display(), "created backup");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_from_filename() {
        let found = identify_language(Path::new("ema-combined-h-4789-fr-annotated.docx")).unwrap();
        assert_eq!(found.language, "French");
        assert_eq!(found.country, "France");

        let found = identify_language(Path::new("EMA-combined-h-12-EN_clean.docx")).unwrap();
        assert_eq!(found.language, "English");

        assert!(identify_language(Path::new("leaflet.docx")).is_none());
    }

    #[test]
    fn output_names() {
        assert_eq!(country_safe("Ireland/Malta"), "Ireland_Malta");
        assert_eq!(
            annex_i_filename("English", "Ireland/Malta"),
            "Annex_I_EU_SmPC_English_Ireland_Malta.docx"
        );
        assert_eq!(
            annex_iiib_filename("German", "Germany/Austria"),
            "Annex_IIIB_EU_PL_German_Germany_Austria.docx"
        );
        assert_eq!(
            combined_filename(Path::new("/in/source.docx"), "Czech Republic"),
            "source_Czech_Republic.docx"
        );
    }

    #[test]
    fn discovery_skips_locks_and_outputs() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "b.docx",
            "a.docx",
            "~$a.docx",
            "Annex_I_EU_SmPC_English_Ireland.docx",
            "a_Annex_old.docx",
            "notes.txt",
        ] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let found: Vec<String> = discover_documents(dir.path())
            .unwrap()
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(found, vec!["a.docx".to_string(), "b.docx".to_string()]);
    }
}
