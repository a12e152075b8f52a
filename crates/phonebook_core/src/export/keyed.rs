//! JSON and YAML exporters.
//!
//! Both emit one mapping from record key to `{name, phone, address}`,
//! ordered by key.

use super::{
    EncodedDocument, ExportError, ExportResult, ExportRow, Exporter, SerialFormat,
};
use log::warn;
use std::collections::BTreeMap;

pub struct JsonExporter;

pub struct YamlExporter;

impl Exporter for JsonExporter {
    fn format(&self) -> SerialFormat {
        SerialFormat::Json
    }

    fn encode(&self, rows: &[(String, ExportRow)]) -> ExportResult<EncodedDocument> {
        let keyed = keyed_rows(rows);
        let document = serde_json::to_string_pretty(&keyed).map_err(|err| ExportError::Encode {
            format: SerialFormat::Json,
            message: err.to_string(),
        })?;
        Ok(EncodedDocument {
            document,
            entries: keyed.len(),
        })
    }
}

impl Exporter for YamlExporter {
    fn format(&self) -> SerialFormat {
        SerialFormat::Yaml
    }

    fn encode(&self, rows: &[(String, ExportRow)]) -> ExportResult<EncodedDocument> {
        let keyed = keyed_rows(rows);
        let document = serde_yaml::to_string(&keyed).map_err(|err| ExportError::Encode {
            format: SerialFormat::Yaml,
            message: err.to_string(),
        })?;
        Ok(EncodedDocument {
            document,
            entries: keyed.len(),
        })
    }
}

fn keyed_rows(rows: &[(String, ExportRow)]) -> BTreeMap<&str, &ExportRow> {
    let mut keyed = BTreeMap::new();
    for (key, row) in rows {
        keyed.insert(key.as_str(), row);
    }

    let collapsed = rows.len() - keyed.len();
    if collapsed > 0 {
        warn!("event=export module=export status=warn reason=duplicate_records collapsed={collapsed}");
    }
    keyed
}
