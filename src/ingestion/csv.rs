//! CSV ingestion with encoding/delimiter sniffing and type inference.
//!
//! Rules:
//!
//! - Candidate delimiters are tried in order (`,` `;` `\t` `|`); for each
//!   delimiter, candidate encodings are tried in priority order (UTF-8,
//!   Latin-1, CP1252, ISO-8859-1).
//! - The first combination that decodes cleanly and yields more than one
//!   column wins. If none does, a default parse (lossy UTF-8, comma) is
//!   attempted last and its failure is the load failure.
//! - Header names are trimmed and embedded newlines are replaced by spaces.
//! - Column types are inferred from the non-empty cells: all-integer columns
//!   become `Int64`, otherwise all-numeric become `Float64`, then boolean
//!   tokens, then recognized date formats, falling back to `Utf8`. Empty
//!   cells are `Null` and do not vote.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use encoding_rs::{Encoding, UTF_8};

use crate::error::{EngineError, EngineResult};
use crate::types::{DataType, Field, Schema, Table, Value};

const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];
const ENCODING_LABELS: [&str; 4] = ["utf-8", "latin1", "windows-1252", "iso-8859-1"];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Load a CSV file into an in-memory [`Table`], sniffing encoding and
/// delimiter as described in the module docs.
pub fn load_csv_from_path(path: impl AsRef<Path>) -> EngineResult<Table> {
    let bytes = std::fs::read(path)?;
    load_csv_from_bytes(&bytes)
}

/// Load CSV data from raw bytes, sniffing encoding and delimiter.
pub fn load_csv_from_bytes(bytes: &[u8]) -> EngineResult<Table> {
    for delimiter in DELIMITERS {
        for label in ENCODING_LABELS {
            let encoding = Encoding::for_label(label.as_bytes()).unwrap_or(UTF_8);
            let (text, _, malformed) = encoding.decode(bytes);
            if malformed {
                continue;
            }
            if let Ok(table) = parse_delimited(&text, delimiter) {
                if table.column_count() > 1 {
                    return Ok(table);
                }
            }
        }
    }

    // Default parse: lossy UTF-8, comma. Its failure is the load failure.
    let text = String::from_utf8_lossy(bytes);
    parse_delimited(&text, b',')
}

/// Parse already-decoded delimited text into a typed [`Table`].
pub fn parse_delimited(text: &str, delimiter: u8) -> EngineResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(EngineError::Load {
            message: "input has no header row".to_string(),
        });
    }

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let mut row = Vec::with_capacity(headers.len());
        for idx in 0..headers.len() {
            row.push(record.get(idx).unwrap_or("").trim().to_string());
        }
        raw_rows.push(row);
    }

    let fields: Vec<Field> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| Field::new(name.clone(), infer_column_type(&raw_rows, idx)))
        .collect();
    let schema = Schema::new(fields);

    let rows = raw_rows
        .into_iter()
        .map(|raw| {
            raw.iter()
                .zip(&schema.fields)
                .map(|(cell, field)| typed_cell(cell, field.data_type))
                .collect()
        })
        .collect();

    Ok(Table::new(schema, rows))
}

fn normalize_header(raw: &str) -> String {
    raw.replace(['\n', '\r'], " ").trim().to_string()
}

fn infer_column_type(rows: &[Vec<String>], idx: usize) -> DataType {
    let cells = || {
        rows.iter()
            .filter_map(move |row| row.get(idx))
            .filter(|cell| !cell.is_empty())
    };

    if cells().next().is_none() {
        return DataType::Utf8;
    }
    if cells().all(|c| c.parse::<i64>().is_ok()) {
        return DataType::Int64;
    }
    if cells().all(|c| c.parse::<f64>().is_ok()) {
        return DataType::Float64;
    }
    if cells().all(|c| parse_bool_token(c).is_some()) {
        return DataType::Bool;
    }
    if cells().all(|c| parse_datetime_text(c).is_some()) {
        return DataType::DateTime;
    }
    DataType::Utf8
}

fn typed_cell(cell: &str, data_type: DataType) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    // Inference already proved every non-empty cell parses; fall back to
    // Null rather than panic if a cell slips through.
    coerce_text(cell, data_type).unwrap_or(Value::Null)
}

/// Parse `text` into a [`Value`] of the given type, if it converts.
pub(crate) fn coerce_text(text: &str, data_type: DataType) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(Value::Null);
    }
    match data_type {
        DataType::Int64 => trimmed.parse::<i64>().ok().map(Value::Int64),
        DataType::Float64 => trimmed.parse::<f64>().ok().map(Value::Float64),
        DataType::Bool => parse_bool_token(trimmed).map(Value::Bool),
        DataType::Utf8 => Some(Value::Utf8(trimmed.to_string())),
        DataType::DateTime => parse_datetime_text(trimmed).map(Value::DateTime),
    }
}

/// Recognize common boolean spellings.
pub(crate) fn parse_bool_token(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" => Some(true),
        "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Parse text into a date-time using a fixed ladder of formats.
///
/// Date-only formats resolve to midnight.
pub(crate) fn parse_datetime_text(s: &str) -> Option<NaiveDateTime> {
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}
