use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Processing configuration for regdoc
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Delimiter between per-country parts of a `Line N` mapping cell
    pub country_delimiter: String,
    /// Share of a run's own length that must overlap the target before the run is replaced
    pub overlap_threshold: f64,
    pub create_backups: bool,
    pub convert_to_pdf: bool,
    /// PDF engines tried in order: `docx2pdf`, `libreoffice`
    pub pdf_engines: Vec<String>,
    pub overwrite_existing: bool,
    /// Skip documents whose filename carries no language code
    pub strict_filename_matching: bool,
    pub log_level: String,

    pub split_dir_name: String,
    pub pdf_dir_name: String,
    pub backup_dir_name: String,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            country_delimiter: ",".to_string(),
            overlap_threshold: 0.8,
            create_backups: true,
            convert_to_pdf: true,
            pdf_engines: vec!["docx2pdf".to_string(), "libreoffice".to_string()],
            overwrite_existing: false,
            strict_filename_matching: false,
            log_level: "info".to_string(),
            split_dir_name: "split_docs".to_string(),
            pdf_dir_name: "pdf_docs".to_string(),
            backup_dir_name: "backups".to_string(),
        }
    }
}

impl ProcessingConfig {
    /// Load configuration from an explicit path, else the config directory, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Validation(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Some(path.to_path_buf())
            }
            None => Self::get_config_path().filter(|path| path.exists()),
        };

        let config = match path {
            Some(path) => {
                let content = fs::read_to_string(&path)?;
                toml::from_str::<ProcessingConfig>(&content)?
            }
            None => ProcessingConfig::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the config directory
    pub fn save(&self) -> Result<Option<PathBuf>> {
        let Some(config_path) = Self::get_config_path() else {
            return Ok(None);
        };
        self.save_to(&config_path)?;
        Ok(Some(config_path))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("regdoc").join("config.toml"))
    }

    /// Initialize default config file
    pub fn init_default() -> Result<Option<PathBuf>> {
        ProcessingConfig::default().save()
    }

    pub fn validate(&self) -> Result<()> {
        if self.country_delimiter.is_empty() {
            return Err(Error::Validation(
                "country_delimiter must not be empty".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.overlap_threshold) {
            return Err(Error::Validation(format!(
                "overlap_threshold must be within [0, 1], got {}",
                self.overlap_threshold
            )));
        }
        Ok(())
    }
}
