//! Report writers for scan results.
//!
//! Every save writes an HTML listing plus a machine-readable dump in the
//! configured [`OutputFormat`], side by side under one base name in the
//! output folder. The folder is created on demand.

mod html;
mod table;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::{debug, info};

use crate::finding::Finding;

pub use html::{escape_html, render_html};
pub use table::{LIST_SEPARATOR, csv_rows};

/// Default folder reports are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Machine-readable report format written next to the HTML listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON array of findings.
    #[default]
    Json,
    /// Flattened CSV rows.
    Csv,
}

impl OutputFormat {
    /// File extension for this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(ReportError::UnknownFormat {
                value: other.to_string(),
            }),
        }
    }
}

/// Errors from writing report files.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Output format name not recognised.
    #[error("unknown output format '{value}': expected json or csv")]
    UnknownFormat {
        /// The rejected value.
        value: String,
    },

    /// Output folder could not be created.
    #[error("cannot create output folder {path}: {source}")]
    CreateDir {
        /// Folder path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A report file could not be written.
    #[error("cannot write report {path}: {source}")]
    Write {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Findings could not be serialized to JSON.
    #[error("cannot serialize findings: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The CSV writer failed.
    #[error("cannot write CSV report {path}: {source}")]
    Csv {
        /// File path.
        path: PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },
}

/// Paths of the files produced by one save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    /// The JSON or CSV dump.
    pub data: PathBuf,
    /// The HTML listing.
    pub html: PathBuf,
}

/// Returns `<prefix>_<unix seconds>`.
#[must_use]
pub fn timestamped_base(prefix: &str) -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs());
    format!("{prefix}_{secs}")
}

/// Writes `<base>.<format>` and `<base>.html` under `folder`.
///
/// # Errors
///
/// Returns a [`ReportError`] if the folder cannot be created or either file
/// cannot be written.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use profile_finder_core::{Finding, OutputFormat, save_results};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let findings = vec![Finding::new("GitHub", "https://github.com/alice", "alice")];
/// let paths = save_results(&findings, "results_username_1700000000", OutputFormat::Json, Path::new("output"))?;
/// println!("saved {}", paths.data.display());
/// # Ok(())
/// # }
/// ```
pub fn save_results(
    findings: &[Finding],
    base: &str,
    format: OutputFormat,
    folder: &Path,
) -> Result<ReportPaths, ReportError> {
    fs::create_dir_all(folder).map_err(|source| ReportError::CreateDir {
        path: folder.to_path_buf(),
        source,
    })?;

    let data = folder.join(format!("{base}.{}", format.extension()));
    match format {
        OutputFormat::Json => write_json(findings, &data)?,
        OutputFormat::Csv => write_csv(findings, &data)?,
    }

    let html = folder.join(format!("{base}.html"));
    write_file(&html, &render_html(findings))?;

    info!(
        count = findings.len(),
        data = %data.display(),
        html = %html.display(),
        "saved report"
    );
    Ok(ReportPaths { data, html })
}

fn write_json(findings: &[Finding], path: &Path) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(findings)?;
    write_file(path, &json)
}

fn write_csv(findings: &[Finding], path: &Path) -> Result<(), ReportError> {
    let csv_error = |source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let (header, rows) = csv_rows(findings)?;
    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    if !header.is_empty() {
        writer.write_record(&header).map_err(csv_error)?;
    }
    for row in &rows {
        writer.write_record(row).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(rows = rows.len(), path = %path.display(), "wrote csv");
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), ReportError> {
    fs::write(path, contents).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })
}
