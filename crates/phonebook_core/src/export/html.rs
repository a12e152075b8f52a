//! HTML exporter.
//!
//! Field text is inserted verbatim; no markup escaping is performed.

use super::{EncodedDocument, ExportResult, ExportRow, Exporter, SerialFormat};
use std::fmt::Write;

pub struct HtmlExporter;

impl Exporter for HtmlExporter {
    fn format(&self) -> SerialFormat {
        SerialFormat::Html
    }

    fn encode(&self, rows: &[(String, ExportRow)]) -> ExportResult<EncodedDocument> {
        let mut body = String::new();
        for (_, row) in rows {
            // Writing into a String cannot fail.
            let _ = write!(
                body,
                "<div><h5>Name: {}</h5><h5>Phone: {}</h5><h5>Address: {}</h5><br></div>",
                row.name.as_deref().unwrap_or(""),
                row.phone.as_deref().unwrap_or(""),
                row.address.as_deref().unwrap_or("")
            );
        }
        Ok(EncodedDocument {
            document: format!("<html>{body}</html>"),
            entries: rows.len(),
        })
    }
}
