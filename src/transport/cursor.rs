//! Lazy row decoding over a streaming response body.
//!
//! [`RowSet::from_reader`] consumes the two header lines (column names,
//! declared types), resolves one converter per column, and hands the open
//! stream to [`RowCursor`], an external iterator that reads, tokenizes,
//! and converts exactly one line per `next()` call. The cursor is
//! single-pass and not restartable: exhausting it consumes the underlying
//! stream, and dropping it early simply stops reading.

use std::io::BufRead;

use serde::Serialize;

use crate::error::{DatabaseError, Result};
use crate::tsv::{parse_tsv, DecodePolicy};
use crate::types::{resolve, Converter, Value};

/// One column of the result header: name and declared type string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Column name from the first header line.
    pub name: String,
    /// Declared type string from the second header line.
    pub type_name: String,
}

/// A decoded result set: header plus the lazy row stream.
#[derive(Debug)]
pub struct RowSet<R> {
    names: Vec<String>,
    types: Vec<String>,
    cursor: RowCursor<R>,
}

impl<R: BufRead> RowSet<R> {
    /// Decode a response body.
    ///
    /// Returns `Ok(None)` when the stream ends before both header lines
    /// arrive. That is the defined shape of a DDL or otherwise row-less
    /// response,
    /// not an error.
    pub fn from_reader(mut reader: R, policy: DecodePolicy) -> Result<Option<RowSet<R>>> {
        let mut line = Vec::new();

        if !read_line(&mut reader, &mut line)? {
            return Ok(None);
        }
        let names = header_fields(&line, policy);

        if !read_line(&mut reader, &mut line)? {
            return Ok(None);
        }
        let types = header_fields(&line, policy);

        let converters = types.iter().map(|t| resolve(t)).collect();

        Ok(Some(RowSet {
            cursor: RowCursor {
                reader,
                names: names.clone(),
                converters,
                policy,
                done: false,
                line,
            },
            names,
            types,
        }))
    }

    /// Column names, positionally aligned with each row.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Declared column type strings.
    pub fn type_names(&self) -> &[String] {
        &self.types
    }

    /// Header as paired column descriptors.
    pub fn columns(&self) -> Vec<Column> {
        self.names
            .iter()
            .zip(&self.types)
            .map(|(name, type_name)| Column {
                name: name.clone(),
                type_name: type_name.clone(),
            })
            .collect()
    }

    /// Consume the set, keeping only the row cursor.
    pub fn rows(self) -> RowCursor<R> {
        self.cursor
    }
}

impl<R: BufRead> IntoIterator for RowSet<R> {
    type Item = Result<Vec<Value>>;
    type IntoIter = RowCursor<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.cursor
    }
}

/// Forward-only cursor over decoded rows.
///
/// Each `next()` blocks until one more line is available on the stream or
/// the stream ends. A cell that fails conversion surfaces its error on the
/// pull that reaches it and ends the stream; rows already pulled stay
/// valid.
#[derive(Debug)]
pub struct RowCursor<R> {
    reader: R,
    names: Vec<String>,
    converters: Vec<Option<Converter>>,
    policy: DecodePolicy,
    done: bool,
    line: Vec<u8>,
}

impl<R: BufRead> Iterator for RowCursor<R> {
    type Item = Result<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match read_line(&mut self.reader, &mut self.line) {
            Ok(true) => {}
            Ok(false) => {
                self.done = true;
                return None;
            }
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        }

        let fields = parse_tsv(&self.line, self.policy);
        let mut row = Vec::with_capacity(fields.len());
        for (idx, (field, converter)) in fields.into_iter().zip(&self.converters).enumerate() {
            let value = match (field, converter) {
                (None, _) => Value::Null,
                (Some(text), Some(converter)) => match converter.convert(&text) {
                    Ok(value) => value,
                    Err(err) => {
                        self.done = true;
                        let err = match self.names.get(idx) {
                            Some(name) => err.in_column(name),
                            None => err,
                        };
                        return Some(Err(DatabaseError::from(err)));
                    }
                },
                (Some(text), None) => Value::Text(text),
            };
            row.push(value);
        }
        Some(Ok(row))
    }
}

/// Read one line into `buf`, stripping the trailing newline.
///
/// Returns `Ok(false)` at end of stream.
fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> Result<bool> {
    buf.clear();
    let n = reader.read_until(b'\n', buf)?;
    if n == 0 {
        return Ok(false);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(true)
}

fn header_fields(line: &[u8], policy: DecodePolicy) -> Vec<String> {
    parse_tsv(line, policy)
        .into_iter()
        .map(|field| field.unwrap_or_else(|| "\\N".to_string()))
        .collect()
}
