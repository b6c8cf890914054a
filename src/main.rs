use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use regdoc::config::ProcessingConfig;
use regdoc::document::load_docx;
use regdoc::mapping::loader::load_mapping_table;
use regdoc::processor::{ProgressReporter, process_folder};
use regdoc::split::{match_header, split_annexes};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "regdoc")]
#[command(about = "Country-specific processing and annex splitting of EU SmPC/PL documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every document of a folder against a mapping table
    Process {
        folder: PathBuf,

        /// Mapping table (.csv, .xlsx, .xls or .ods)
        #[arg(short, long)]
        mapping: PathBuf,

        /// Delimiter between per-country parts of Line cells
        #[arg(long)]
        delimiter: Option<String>,

        /// Skip PDF rendering
        #[arg(long)]
        no_pdf: bool,

        /// Skip backups of the source documents
        #[arg(long)]
        no_backup: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Split a processed document into Annex I and Annex IIIB
    Split {
        document: PathBuf,

        #[arg(short, long)]
        mapping: PathBuf,

        /// Language whose mapping rows provide the headers
        #[arg(short, long)]
        language: String,

        /// Output directory (defaults to the split folder next to the document)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Check whether a paragraph text matches an annex header
    MatchHeader { header: String, text: String },
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration file
    Init,
    /// Print the effective configuration
    Show,
}

struct LogReporter;

impl ProgressReporter for LogReporter {
    fn report(&self, progress: u8, message: &str) {
        info!(progress, "{message}");
    }
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ProcessingConfig::load(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    init_tracing(&config.log_level);

    match cli.command {
        Commands::Process {
            folder,
            mapping,
            delimiter,
            no_pdf,
            no_backup,
            json,
        } => {
            if let Some(delimiter) = delimiter {
                config.country_delimiter = delimiter;
            }
            config.convert_to_pdf &= !no_pdf;
            config.create_backups &= !no_backup;

            let result = tokio::task::spawn_blocking(move || {
                process_folder(&folder, &mapping, &config, &LogReporter)
            })
            .await
            .context("processing worker panicked")??;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.message);
                for file in &result.output_files {
                    println!("  {}", file.display());
                }
                for warning in &result.warnings {
                    println!("warning: {warning}");
                }
                for error in &result.errors {
                    println!("error: {error}");
                }
                println!("success rate: {:.1}%", result.stats.success_rate());
            }

            if !result.success {
                bail!("no document variant was processed successfully");
            }
        }
        Commands::Split {
            document,
            mapping,
            language,
            out,
        } => {
            let table = load_mapping_table(&mapping)
                .with_context(|| format!("loading mapping {}", mapping.display()))?;
            let rows = table.rows_for_language(&language)?;
            let docx = load_docx(&document)
                .with_context(|| format!("loading {}", document.display()))?;
            let out = out.unwrap_or_else(|| {
                document
                    .parent()
                    .map(|parent| parent.join(&config.split_dir_name))
                    .unwrap_or_else(|| PathBuf::from(&config.split_dir_name))
            });

            for row in rows {
                let output = split_annexes(&docx, row, &out, config.overwrite_existing)
                    .with_context(|| format!("splitting for {}", row.country()))?;
                for path in &output.written {
                    println!("{}", path.display());
                }
                for path in &output.skipped {
                    println!("skipped (exists): {}", path.display());
                }
            }
        }
        Commands::MatchHeader { header, text } => match match_header(&text, &header) {
            Some(stage) => println!("match ({stage:?})"),
            None => {
                println!("no match");
                std::process::exit(1);
            }
        },
        Commands::Config { action } => match action {
            ConfigAction::Init => match ProcessingConfig::init_default()? {
                Some(path) => println!("wrote {}", path.display()),
                None => bail!("no configuration directory available"),
            },
            ConfigAction::Show => print!("{}", toml::to_string_pretty(&config)?),
        },
    }

    Ok(())
}
