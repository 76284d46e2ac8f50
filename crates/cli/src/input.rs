//! JSON-lines event log reader.
//!
//! One event per line: `{"streamId": "...", "eventType": "...", "body": {...}}`.
//! Blank lines are skipped; `body` defaults to an empty object.

use std::io::BufRead;

use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("line {line}: read failed: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: malformed event: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: empty {field}")]
    Empty { line: usize, field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputRecord {
    pub stream_id: String,
    pub event_type: String,
    #[serde(default = "empty_body")]
    pub body: JsonValue,
}

fn empty_body() -> JsonValue {
    JsonValue::Object(Default::default())
}

/// Parse every record in `reader`, stopping at the first bad line.
pub fn read_records(reader: impl BufRead) -> Result<Vec<InputRecord>, InputError> {
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|source| InputError::Io { line: line_no, source })?;
        if line.trim().is_empty() {
            continue;
        }

        let record: InputRecord = serde_json::from_str(&line)
            .map_err(|source| InputError::Malformed { line: line_no, source })?;
        if record.stream_id.is_empty() {
            return Err(InputError::Empty { line: line_no, field: "streamId" });
        }
        if record.event_type.is_empty() {
            return Err(InputError::Empty { line: line_no, field: "eventType" });
        }
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_records_and_skips_blank_lines() {
        let input = concat!(
            r#"{"streamId":"InventoryItem-42","eventType":"Created","body":{"Name":"Widget"}}"#,
            "\n\n",
            r#"{"streamId":"InventoryItem-42","eventType":"Deactivated"}"#,
            "\n",
        );

        let records = read_records(input.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].body, json!({ "Name": "Widget" }));
        assert_eq!(records[1].event_type, "Deactivated");
        assert_eq!(records[1].body, json!({}));
    }

    #[test]
    fn malformed_line_names_its_number() {
        let input = concat!(
            r#"{"streamId":"InventoryItem-42","eventType":"Created","body":{}}"#,
            "\n",
            "not json\n",
        );

        let err = read_records(input.as_bytes()).unwrap_err();

        assert!(matches!(err, InputError::Malformed { line: 2, .. }));
        assert!(err.to_string().starts_with("line 2:"));
    }

    #[test]
    fn missing_or_empty_fields_are_rejected() {
        let err = read_records(r#"{"eventType":"Created"}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, InputError::Malformed { line: 1, .. }));

        let err = read_records(r#"{"streamId":"","eventType":"Created"}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, InputError::Empty { line: 1, field: "streamId" }));
    }
}
