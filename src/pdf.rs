//! Best-effort PDF rendering through external converters
//!
//! Conversion failures never fail a run: they are logged and the document is
//! reported without a PDF.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Engine {
    Docx2Pdf,
    LibreOffice(&'static str),
}

impl Engine {
    fn parse(name: &str) -> Vec<Engine> {
        match name.trim().to_lowercase().as_str() {
            "docx2pdf" => vec![Engine::Docx2Pdf],
            "libreoffice" => vec![Engine::LibreOffice("libreoffice"), Engine::LibreOffice("soffice")],
            "soffice" => vec![Engine::LibreOffice("soffice")],
            other => {
                warn!(engine = other, "unknown PDF engine, ignoring");
                Vec::new()
            }
        }
    }

    fn command(self, input: &Path, output: &Path, out_dir: &Path) -> Command {
        match self {
            Engine::Docx2Pdf => {
                let mut command = Command::new("docx2pdf");
                command.arg(input).arg(output);
                command
            }
            Engine::LibreOffice(program) => {
                let mut command = Command::new(program);
                command
                    .args(["--headless", "--convert-to", "pdf", "--outdir"])
                    .arg(out_dir)
                    .arg(input);
                command
            }
        }
    }
}

/// Render `input` into `out_dir/<stem>.pdf` with the first engine that works
pub fn convert_to_pdf(input: &Path, out_dir: &Path, engines: &[String]) -> Option<PathBuf> {
    if let Err(err) = std::fs::create_dir_all(out_dir) {
        warn!(dir = %out_dir.display(), error = %err, "cannot create PDF directory");
        return None;
    }
    let stem = input.file_stem()?;
    let output = out_dir.join(stem).with_extension("pdf");

    for engine in engines.iter().flat_map(|name| Engine::parse(name)) {
        debug!(?engine, input = %input.display(), "trying PDF engine");
        let result = engine.command(input, &output, out_dir).output();
        match result {
            Ok(run) if run.status.success() && output.exists() => {
                info!(pdf = %output.display(), ?engine, "rendered PDF");
                return Some(output);
            }
            Ok(run) => {
                let stderr = String::from_utf8_lossy(&run.stderr);
                warn!(?engine, status = %run.status, stderr = %stderr.trim(), "PDF engine failed");
            }
            Err(err) => {
                debug!(?engine, error = %err, "PDF engine not available");
            }
        }
    }

    warn!(input = %input.display(), "PDF conversion failed with every engine");
    None
}
