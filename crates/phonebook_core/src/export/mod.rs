//! Record export to external serialization formats.
//!
//! # Responsibility
//! - Declare the supported serialization formats and their renderers.
//! - Read every stored record and render it into one destination file.
//!
//! # Invariants
//! - Phones are formatted as `(AAA) MMM-TTTT` at export time only.
//! - One malformed phone aborts the whole export.
//! - Output is fully rendered in memory before the destination is opened, so
//!   a failed export never leaves a partial file behind.
//! - Existing destinations are overwritten.

mod csv_writer;
mod html;
mod keyed;

pub use csv_writer::CsvExporter;
pub use html::HtmlExporter;
pub use keyed::{JsonExporter, YamlExporter};

use crate::model::record::{Record, RecordField};
use crate::phone::{digit_stream_to_phone, PhoneFormatError};
use crate::repo::record_repo::{RecordStore, RepoError};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

pub type ExportResult<T> = Result<T, ExportError>;

/// Export failure.
#[derive(Debug)]
pub enum ExportError {
    /// A stored phone is not a ten digit stream.
    InvalidPhoneFormat(PhoneFormatError),
    /// Reading records failed.
    Repo(RepoError),
    /// The format encoder rejected the rendered data.
    Encode {
        format: SerialFormat,
        message: String,
    },
    /// Writing the destination failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPhoneFormat(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Encode { format, message } => {
                write!(f, "failed to encode records as {format}: {message}")
            }
            Self::Io { path, source } => {
                write!(f, "failed to write export `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPhoneFormat(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Encode { .. } => None,
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<PhoneFormatError> for ExportError {
    fn from(value: PhoneFormatError) -> Self {
        Self::InvalidPhoneFormat(value)
    }
}

impl From<RepoError> for ExportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Supported export format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SerialFormat {
    #[default]
    Json,
    Csv,
    Yaml,
    Html,
}

impl SerialFormat {
    pub const ALL: [SerialFormat; 4] = [Self::Json, Self::Csv, Self::Yaml, Self::Html];

    /// Conventional file extension, also the configuration name.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Yaml => "yaml",
            Self::Html => "html",
        }
    }

    /// Renderer producing this format.
    pub fn exporter(self) -> &'static dyn Exporter {
        match self {
            Self::Json => &JsonExporter,
            Self::Csv => &CsvExporter,
            Self::Yaml => &YamlExporter,
            Self::Html => &HtmlExporter,
        }
    }
}

impl Display for SerialFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for SerialFormat {
    type Err = UnsupportedFormatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "yaml" | "yml" => Ok(Self::Yaml),
            "html" | "htm" => Ok(Self::Html),
            other => Err(UnsupportedFormatError(other.to_string())),
        }
    }
}

impl TryFrom<String> for SerialFormat {
    type Error = UnsupportedFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SerialFormat> for String {
    fn from(value: SerialFormat) -> Self {
        value.extension().to_string()
    }
}

/// Format value outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedFormatError(pub String);

impl Display for UnsupportedFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported serial format `{}`; expected json|csv|yaml|html",
            self.0
        )
    }
}

impl Error for UnsupportedFormatError {}

/// Record as presented in exported documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    pub name: Option<String>,
    /// `(AAA) MMM-TTTT`, or `None` when no phone is stored.
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl ExportRow {
    /// Builds the presentation view of `record`.
    ///
    /// # Errors
    /// - Returns `PhoneFormatError` when a non-empty phone is not ten digits.
    pub fn from_record(record: &Record) -> Result<Self, PhoneFormatError> {
        let phone = match record.phone.as_deref() {
            Some(stream) if !stream.is_empty() => Some(digit_stream_to_phone(stream)?),
            _ => None,
        };
        Ok(Self {
            name: record.name.clone(),
            phone,
            address: record.address.clone(),
        })
    }
}

/// Encoder output: the full document and how many entries it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDocument {
    pub document: String,
    /// Keyed formats may hold fewer entries than input rows.
    pub entries: usize,
}

/// Renderer for one serialization format.
pub trait Exporter {
    fn format(&self) -> SerialFormat;

    /// Encodes prepared rows, each paired with its `record_key`.
    fn encode(&self, rows: &[(String, ExportRow)]) -> ExportResult<EncodedDocument>;

    /// Renders `records` into `destination`, replacing any existing file.
    ///
    /// Returns the number of entries written.
    fn render(&self, records: &[Record], destination: &Path) -> ExportResult<usize> {
        let rows = records
            .iter()
            .map(|record| Ok((record_key(record), ExportRow::from_record(record)?)))
            .collect::<ExportResult<Vec<_>>>()?;
        let encoded = self.encode(&rows)?;
        std::fs::write(destination, encoded.document).map_err(|source| ExportError::Io {
            path: destination.to_path_buf(),
            source,
        })?;
        Ok(encoded.entries)
    }
}

/// Content key of a record: 16 hex digits of a hash over its stored fields.
///
/// Identical records share a key, so keyed formats keep only one of them.
/// Absent and empty fields hash differently.
pub fn record_key(record: &Record) -> String {
    let mut hasher = blake3::Hasher::new();
    for field in RecordField::ALL {
        match record.get(field) {
            Some(value) => {
                hasher.update(&[0x01]);
                hasher.update(value.as_bytes());
            }
            None => {
                hasher.update(&[0x00]);
            }
        }
        hasher.update(&[0x1f]);
    }
    let digest = hasher.finalize().to_hex();
    digest.as_str()[..16].to_string()
}

/// Reads every record from `store` and renders it as `format` into
/// `destination`.
///
/// Returns the number of entries written, which is lower than the number of
/// stored records when identical records collapse in a keyed format.
///
/// # Side effects
/// - Emits `export` logging events with format, count and duration.
pub fn export_records<S: RecordStore + ?Sized>(
    store: &S,
    format: SerialFormat,
    destination: impl AsRef<Path>,
) -> ExportResult<usize> {
    let started_at = Instant::now();
    info!("event=export module=export status=start format={format}");

    let outcome = store
        .find_all()
        .map_err(ExportError::from)
        .and_then(|records| {
            format
                .exporter()
                .render(&records, destination.as_ref())
        });

    match &outcome {
        Ok(count) => info!(
            "event=export module=export status=ok format={} entries={} duration_ms={}",
            format,
            count,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=export module=export status=error format={} duration_ms={} error_code={}",
            format,
            started_at.elapsed().as_millis(),
            error_code(err)
        ),
    }
    outcome
}

fn error_code(err: &ExportError) -> &'static str {
    match err {
        ExportError::InvalidPhoneFormat(_) => "invalid_phone_format",
        ExportError::Repo(_) => "storage_unavailable",
        ExportError::Encode { .. } => "encode_failed",
        ExportError::Io { .. } => "write_failed",
    }
}
