//! CSV exporter: a `Name,Phone,Address` header followed by one row per record.

use super::{
    EncodedDocument, ExportError, ExportResult, ExportRow, Exporter, SerialFormat,
};

const CSV_HEADER: [&str; 3] = ["Name", "Phone", "Address"];

pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn format(&self) -> SerialFormat {
        SerialFormat::Csv
    }

    fn encode(&self, rows: &[(String, ExportRow)]) -> ExportResult<EncodedDocument> {
        let mut writer = ::csv::WriterBuilder::new()
            .terminator(::csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(CSV_HEADER).map_err(encode_error)?;
        for (_, row) in rows {
            writer
                .write_record([
                    row.name.as_deref().unwrap_or(""),
                    row.phone.as_deref().unwrap_or(""),
                    row.address.as_deref().unwrap_or(""),
                ])
                .map_err(encode_error)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|err| encode_error(err.to_string()))?;
        let document = String::from_utf8(bytes).map_err(encode_error)?;
        Ok(EncodedDocument {
            document,
            entries: rows.len(),
        })
    }
}

fn encode_error(err: impl ToString) -> ExportError {
    ExportError::Encode {
        format: SerialFormat::Csv,
        message: err.to_string(),
    }
}
