//! Delimited text codec with explicit character encoding
//!
//! Uploaded allocation files and report downloads are semicolon-delimited and
//! frequently use a legacy code page, so every read and write goes through a
//! [`CsvDialect`] naming both the delimiter and the encoding label
//! (any WHATWG label understood by `encoding_rs`, e.g. `utf-8`, `windows-1250`).

use axum::{
    body::Body,
    http::{StatusCode, header},
    response::Response,
};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};
use thiserror::Error;
use tracing::debug;

/// One data row keyed by header name
pub type CsvRecord = HashMap<String, String>;

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("Empty file: no header row found")]
    EmptyFile,
    #[error("Unknown text encoding: {0}")]
    UnknownEncoding(String),
    #[error("Delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),
    #[error("Input is not valid {0} text")]
    Decode(String),
    #[error("Text cannot be represented in {0}")]
    Encode(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Delimiter and text encoding for one direction of CSV traffic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvDialect {
    pub delimiter: char,
    pub encoding: String,
}

impl Default for CsvDialect {
    fn default() -> Self {
        Self::new(';', "utf-8")
    }
}

impl CsvDialect {
    pub fn new(delimiter: char, encoding: &str) -> Self {
        Self {
            delimiter,
            encoding: encoding.to_string(),
        }
    }

    fn delimiter_byte(&self) -> Result<u8, CsvError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(CsvError::InvalidDelimiter(self.delimiter))
        }
    }

    fn text_encoding(&self) -> Result<&'static Encoding, CsvError> {
        Encoding::for_label(self.encoding.trim().as_bytes())
            .ok_or_else(|| CsvError::UnknownEncoding(self.encoding.clone()))
    }
}

/// Parsed file: header row plus one mapping per data row
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub records: Vec<CsvRecord>,
}

/// Read a whole CSV stream, decoding it with the dialect's encoding.
pub fn read_records<R: Read>(mut reader: R, dialect: &CsvDialect) -> Result<CsvTable, CsvError> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw)?;

    let text = decode(&raw, dialect)?;
    if text.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(dialect.delimiter_byte()?)
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::EmptyFile);
    }
    debug!("CSV headers: {:?}", headers);

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let record = headers
            .iter()
            .cloned()
            .zip(row.iter().map(|value| value.to_string()))
            .collect::<CsvRecord>();
        records.push(record);
    }

    Ok(CsvTable { headers, records })
}

/// Write rows, re-encoding every line into the dialect's encoding.
pub fn write_records<W, I, R, S>(mut writer: W, rows: I, dialect: &CsvDialect) -> Result<(), CsvError>
where
    W: Write,
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let encoding = dialect.text_encoding()?;
    let delimiter = dialect.delimiter_byte()?;

    for row in rows {
        let mut line_writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());
        line_writer.write_record(row.into_iter().map(|cell| cell.as_ref().to_string()))?;
        let line = line_writer
            .into_inner()
            .map_err(|e| CsvError::Io(e.into_error()))?;
        // csv only ever emits UTF-8
        let line = String::from_utf8_lossy(&line);

        let (bytes, _, had_errors) = encoding.encode(&line);
        if had_errors {
            return Err(CsvError::Encode(encoding.name().to_string()));
        }
        writer.write_all(&bytes)?;
    }

    writer.flush()?;
    Ok(())
}

/// Build a file-download response for the given rows.
pub fn make_csv_response<I, R, S>(
    rows: I,
    filename: &str,
    dialect: &CsvDialect,
) -> Result<Response, CsvError>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut buffer = Vec::new();
    write_records(&mut buffer, rows, dialect)?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/csv")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", filename),
        )
        .body(Body::from(buffer))
        .map_err(|e| CsvError::Io(std::io::Error::other(e)))?;

    Ok(response)
}

fn decode(raw: &[u8], dialect: &CsvDialect) -> Result<String, CsvError> {
    let encoding = dialect.text_encoding()?;

    let body = match Encoding::for_bom(raw) {
        Some((bom_encoding, bom_length)) if bom_encoding == encoding => &raw[bom_length..],
        _ => raw,
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
        .ok_or_else(|| CsvError::Decode(encoding.name().to_string()))
}
