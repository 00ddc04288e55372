//! Raw record decoding from CSV text and JSON document payloads
//!
//! The I/O collaborator hands over bytes; this module only turns them into
//! [`RawRecord`]s. Nothing here opens files or connections.

use crate::error::{Error, Result};
use crate::table::CellValue;
use serde_json::{Map, Value};
use std::io::Read;
use tracing::warn;

/// One unreconciled record from either source, keys in source order
pub type RawRecord = Map<String, Value>;

/// Parse CSV text into raw records
pub fn parse_csv_str(content: &str, source_name: &str) -> Result<Vec<RawRecord>> {
    parse_csv_reader(content.as_bytes(), source_name)
}

/// Parse CSV from any reader into raw records
///
/// The first line is the header. Cells are type-detected the same way
/// [`CellValue::parse`] does it; blank cells become JSON null. Short rows are
/// padded with nulls, long rows truncated.
pub fn parse_csv_reader<R: Read>(reader: R, source_name: &str) -> Result<Vec<RawRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // Allow varying number of fields
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| Error::Csv {
            source_name: source_name.to_string(),
            source: e,
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(Error::Document {
            source_name: source_name.to_string(),
            message: "no columns found in CSV".to_string(),
        });
    }

    let mut records = Vec::new();
    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| Error::Csv {
            source_name: source_name.to_string(),
            source: e,
        })?;

        if record.len() > headers.len() {
            warn!(
                source = source_name,
                row = row_idx + 1,
                "row has more cells than columns, truncating"
            );
        }

        let mut raw = RawRecord::new();
        for (i, header) in headers.iter().enumerate() {
            let value = record
                .get(i)
                .map(|cell| CellValue::parse(cell).to_json())
                .unwrap_or(Value::Null);
            raw.insert(header.clone(), value);
        }
        records.push(raw);
    }

    Ok(records)
}

/// Parse a JSON payload of documents into raw records
///
/// Accepts either an array of objects or a single object. Array entries that
/// are not objects are skipped with a warning.
pub fn parse_documents(content: &str, source_name: &str) -> Result<Vec<RawRecord>> {
    let value: Value = serde_json::from_str(content)?;
    documents_from_value(value, source_name)
}

/// Convert an already-decoded JSON value into raw records
pub fn documents_from_value(value: Value, source_name: &str) -> Result<Vec<RawRecord>> {
    match value {
        Value::Object(map) => Ok(vec![map]),
        Value::Array(items) => {
            let total = items.len();
            let records: Vec<RawRecord> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect();
            if records.len() < total {
                warn!(
                    source = source_name,
                    skipped = total - records.len(),
                    "skipping non-object documents"
                );
            }
            Ok(records)
        }
        other => Err(Error::Document {
            source_name: source_name.to_string(),
            message: format!("expected an object or an array of objects, found {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_simple_csv() {
        let csv = "nombre_pais,continente,poblacion\nPeru,America,33000000\nChile,America,19.5\n";
        let records = parse_csv_str(csv, "test.csv").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["nombre_pais"], json!("Peru"));
        assert_eq!(records[0]["poblacion"], json!(33000000));
        assert_eq!(records[1]["poblacion"], json!(19.5));
    }

    #[test]
    fn test_parse_with_empty_and_short_rows() {
        let csv = "a,b,c\n1,,3\n4\n";
        let records = parse_csv_str(csv, "test.csv").unwrap();

        assert_eq!(records[0]["b"], Value::Null);
        assert_eq!(records[1]["b"], Value::Null);
        assert_eq!(records[1]["c"], Value::Null);
    }

    #[test]
    fn test_parse_keeps_header_order() {
        let csv = "z,a,m\n1,2,3\n";
        let records = parse_csv_str(csv, "test.csv").unwrap();
        let keys: Vec<&str> = records[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_parse_documents_array_and_single() {
        let many = parse_documents(r#"[{"pais": "Peru"}, 3, {"pais": "Chile"}]"#, "docs").unwrap();
        assert_eq!(many.len(), 2);

        let one = parse_documents(r#"{"pais": "Peru"}"#, "docs").unwrap();
        assert_eq!(one.len(), 1);
    }

    #[test]
    fn test_parse_documents_rejects_scalars() {
        assert!(matches!(
            parse_documents("42", "docs"),
            Err(Error::Document { .. })
        ));
        assert!(matches!(parse_documents("{not json", "docs"), Err(Error::Json(_))));
    }
}
