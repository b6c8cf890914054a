//! Document and folder processing
//!
//! Every mapping row for a document's language is one variant. A variant is
//! processed on a fresh copy of the source: national reporting text, dates and
//! the local representative table are updated, the combined result is saved,
//! and the result is split into its Annex I and Annex IIIB documents.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::ProcessingConfig;
use crate::dates::{DateFormatter, TemplateDateFormatter, update_annex_i_date, update_annex_iiib_date};
use crate::document::{load_docx, save_output, validate_docx_file};
use crate::error::{Error, Result};
use crate::files::{combined_filename, country_safe, create_backup, discover_documents, identify_language};
use crate::mapping::loader::load_mapping_table;
use crate::mapping::{MappingRow, MappingTable, normalize_token};
use crate::replace::{SectionUpdate, update_national_reporting};
use crate::split::{SplitOutput, split_annexes};
use crate::table_filter::{TableFilterReport, process_local_rep_table};

/// Receives progress in percent with a short status line
pub trait ProgressReporter: Send + Sync {
    fn report(&self, progress: u8, message: &str);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _progress: u8, _message: &str) {}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessingStats {
    pub documents_found: usize,
    pub documents_processed: usize,
    pub documents_failed: usize,
    pub variants_succeeded: usize,
    pub variants_failed: usize,
    pub files_written: usize,
}

impl ProcessingStats {
    /// Successful variants in percent, 0 when nothing ran
    pub fn success_rate(&self) -> f64 {
        let total = self.variants_succeeded + self.variants_failed;
        if total == 0 {
            0.0
        } else {
            self.variants_succeeded as f64 * 100.0 / total as f64
        }
    }

    fn merge(&mut self, other: &ProcessingStats) {
        self.documents_found += other.documents_found;
        self.documents_processed += other.documents_processed;
        self.documents_failed += other.documents_failed;
        self.variants_succeeded += other.variants_succeeded;
        self.variants_failed += other.variants_failed;
        self.files_written += other.files_written;
    }
}

/// Aggregated outcome of a document or folder run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessingResult {
    pub success: bool,
    pub message: String,
    pub output_files: Vec<PathBuf>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: ProcessingStats,
}

impl ProcessingResult {
    /// Fold another result into this one; success if either succeeded
    pub fn merge(&mut self, other: ProcessingResult) {
        self.success |= other.success;
        self.output_files.extend(other.output_files);
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.stats.merge(&other.stats);
    }
}

/// Output locations of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDirs {
    pub split: PathBuf,
    pub pdf: PathBuf,
    pub backup: PathBuf,
}

impl OutputDirs {
    pub fn new(base: &Path, config: &ProcessingConfig) -> Self {
        Self {
            split: base.join(&config.split_dir_name),
            pdf: base.join(&config.pdf_dir_name),
            backup: base.join(&config.backup_dir_name),
        }
    }

    pub fn create(&self, config: &ProcessingConfig) -> Result<()> {
        fs::create_dir_all(&self.split)?;
        if config.convert_to_pdf {
            fs::create_dir_all(&self.pdf)?;
        }
        if config.create_backups {
            fs::create_dir_all(&self.backup)?;
        }
        Ok(())
    }
}

/// What happened to one country variant of a document
#[derive(Debug, Clone)]
pub struct VariantOutcome {
    pub country: String,
    pub sections: Vec<SectionUpdate>,
    pub annex_i_date: bool,
    pub annex_iiib_date: bool,
    pub local_reps: Option<TableFilterReport>,
    pub combined: Option<PathBuf>,
    pub split: Option<SplitOutput>,
    /// Outputs left untouched because they already existed
    pub skipped: Vec<PathBuf>,
    pub pdfs: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

impl VariantOutcome {
    /// At least one content update landed in the document
    pub fn any_update(&self) -> bool {
        self.sections.iter().any(|update| update.success)
            || self.annex_i_date
            || self.annex_iiib_date
            || self.local_reps.is_some_and(|report| report.success())
    }

    /// Files written by this run
    pub fn output_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self.combined.iter().cloned().collect();
        if let Some(split) = &self.split {
            files.extend(split.written.iter().cloned());
        }
        files.extend(self.pdfs.iter().cloned());
        files
    }
}

/// Apply every update for one mapping row to a fresh copy of `source`
pub fn process_variant(
    source: &Path,
    row: &MappingRow,
    config: &ProcessingConfig,
    formatter: &dyn DateFormatter,
    dirs: &OutputDirs,
) -> Result<VariantOutcome> {
    let mut docx = load_docx(source)?;
    let country = row.country().to_string();
    let mut warnings = Vec::new();

    let sections = update_national_reporting(&mut docx, row, config);
    warnings.extend(
        sections
            .iter()
            .filter(|update| !update.success)
            .map(|update| update.message.clone()),
    );

    let annex_i_date = update_annex_i_date(&mut docx, row, formatter);
    if !annex_i_date {
        warnings.push(format!("Annex I date not updated for {country}"));
    }
    let annex_iiib_date = update_annex_iiib_date(&mut docx, row, formatter);
    if !annex_iiib_date {
        warnings.push(format!("Annex IIIB date not updated for {country}"));
    }

    let local_reps = process_local_rep_table(&mut docx, &country);
    if local_reps.is_none() {
        warnings.push(format!("local representative table not filtered for {country}"));
    }

    let mut outcome = VariantOutcome {
        country: country.clone(),
        sections,
        annex_i_date,
        annex_iiib_date,
        local_reps,
        combined: None,
        split: None,
        skipped: Vec::new(),
        pdfs: Vec::new(),
        warnings,
    };

    if !outcome.any_update() {
        return Ok(outcome);
    }

    let split = split_annexes(&docx, row, &dirs.split, config.overwrite_existing);

    let combined = dirs
        .split
        .join(country_safe(&country))
        .join(combined_filename(source, &country));
    if save_output(docx, &combined, config.overwrite_existing)? {
        outcome.combined = Some(combined);
    } else {
        outcome.skipped.push(combined);
    }

    let split = split?;
    outcome.skipped.extend(split.skipped.iter().cloned());
    outcome.warnings.extend(
        outcome
            .skipped
            .iter()
            .map(|path| format!("{} exists, not overwritten", path.display())),
    );
    if config.convert_to_pdf {
        let pdf_dir = dirs.pdf.join(country_safe(&country));
        for path in &split.written {
            match crate::pdf::convert_to_pdf(path, &pdf_dir, &config.pdf_engines) {
                Some(pdf) => outcome.pdfs.push(pdf),
                None => outcome
                    .warnings
                    .push(format!("PDF not created for {}", path.display())),
            }
        }
    }
    outcome.split = Some(split);
    Ok(outcome)
}

/// Process every variant of one document
pub fn process_document(
    path: &Path,
    rows: &[&MappingRow],
    config: &ProcessingConfig,
    formatter: &dyn DateFormatter,
    dirs: &OutputDirs,
) -> ProcessingResult {
    let name = path.display().to_string();
    let mut result = ProcessingResult::default();
    result.stats.documents_found = 1;

    if let Err(err) = validate_docx_file(path) {
        result.errors.push(format!("{name}: {err}"));
        result.stats.documents_failed = 1;
        result.message = format!("{name}: invalid document");
        return result;
    }

    for row in rows {
        match process_variant(path, row, config, formatter, dirs) {
            Ok(outcome) if outcome.any_update() && outcome.split.is_some() => {
                info!(document = %name, country = %outcome.country, "variant processed");
                result.stats.variants_succeeded += 1;
                let files = outcome.output_files();
                result.stats.files_written += files.len();
                result.output_files.extend(files);
                result.warnings.extend(outcome.warnings);
            }
            Ok(outcome) => {
                warn!(document = %name, country = %outcome.country, "no updates applied to variant");
                result.stats.variants_failed += 1;
                result
                    .errors
                    .push(format!("{name}: no updates applied for {}", outcome.country));
                result.warnings.extend(outcome.warnings);
            }
            Err(err) => {
                error!(document = %name, country = row.country(), error = %err, "variant failed");
                result.stats.variants_failed += 1;
                result.errors.push(format!("{name} ({}): {err}", row.country()));
            }
        }
    }

    result.success = result.stats.variants_succeeded > 0;
    if result.success {
        result.stats.documents_processed = 1;
    } else {
        result.stats.documents_failed = 1;
    }
    result.message = format!(
        "{name}: {} of {} variants processed",
        result.stats.variants_succeeded,
        rows.len()
    );
    result
}

/// Mapping rows for a document, by filename language code
///
/// Without a code, and unless strict matching is on, a mapping language
/// named in the filename is accepted instead.
fn rows_for_document<'a>(
    path: &Path,
    table: &'a MappingTable,
    config: &ProcessingConfig,
) -> Result<Vec<&'a MappingRow>> {
    if let Some(found) = identify_language(path) {
        return table.rows_for_language(found.language);
    }
    if config.strict_filename_matching {
        return Err(Error::Validation(format!(
            "no language code in filename: {}",
            path.display()
        )));
    }

    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(normalize_token)
        .unwrap_or_default();
    let language = table
        .rows
        .iter()
        .map(MappingRow::language)
        .find(|language| {
            let language = normalize_token(language);
            !language.is_empty() && stem.contains(&language)
        })
        .ok_or_else(|| {
            Error::Mapping(format!("language not identified for {}", path.display()))
        })?;
    table.rows_for_language(language)
}

/// Process all source documents of a folder against a mapping file
pub fn process_folder(
    folder: &Path,
    mapping_path: &Path,
    config: &ProcessingConfig,
    reporter: &dyn ProgressReporter,
) -> Result<ProcessingResult> {
    config.validate()?;
    reporter.report(0, "validating inputs");

    if !mapping_path.is_file() {
        return Err(Error::Validation(format!(
            "mapping file not found: {}",
            mapping_path.display()
        )));
    }
    let documents = discover_documents(folder)?;
    if documents.is_empty() {
        return Err(Error::Validation(format!(
            "no .docx documents in {}",
            folder.display()
        )));
    }

    let table = load_mapping_table(mapping_path)
        .map_err(|err| Error::Validation(format!("cannot load mapping file: {err}")))?;
    table.validate_columns()?;

    let dirs = OutputDirs::new(folder, config);
    dirs.create(config)?;
    let formatter = TemplateDateFormatter::today().with_table(&table);
    reporter.report(5, &format!("found {} documents", documents.len()));

    let mut result = ProcessingResult::default();
    let total = documents.len();
    for (index, path) in documents.iter().enumerate() {
        let progress = 5 + (index * 90 / total) as u8;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        reporter.report(progress, &format!("processing {name}"));

        if config.create_backups {
            if let Err(err) = create_backup(path, &dirs.backup) {
                result.warnings.push(format!("{name}: backup failed: {err}"));
            }
        }

        let document_result = match rows_for_document(path, &table, config) {
            Ok(rows) => process_document(path, &rows, config, &formatter, &dirs),
            Err(err) => {
                warn!(document = %name, error = %err, "skipping document");
                ProcessingResult {
                    errors: vec![format!("{name}: {err}")],
                    stats: ProcessingStats {
                        documents_found: 1,
                        documents_failed: 1,
                        ..ProcessingStats::default()
                    },
                    ..ProcessingResult::default()
                }
            }
        };
        result.merge(document_result);
    }

    result.success = result.stats.variants_succeeded > 0;
    result.message = format!(
        "processed {} of {} documents, {} variants succeeded, {} failed",
        result.stats.documents_processed,
        result.stats.documents_found,
        result.stats.variants_succeeded,
        result.stats.variants_failed
    );
    reporter.report(100, &result.message);
    info!(
        success = result.success,
        files = result.stats.files_written,
        rate = %format!("{:.1}%", result.stats.success_rate()),
        "folder processing finished"
    );
    Ok(result)
}
