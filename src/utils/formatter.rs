///! CSV Formatter Utility
///! Generic delimited-table writer driven by column extractors.

use std::io::{self, Write};
use std::sync::Arc;

/// Runtime value of one cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Uint(u64),
    /// Written with the shortest representation that round-trips
    Float(f64),
    Str(String),
    Bool(bool),
    /// Empty cell
    Missing,
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Uint(v as u64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Uint(v as u64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Missing,
        }
    }
}

/// A column definition that combines metadata and extraction logic.
pub struct Column<R> {
    /// Header name (e.g. "complex_id", "rmsd").
    pub key: &'static str,
    /// Description of what this column represents.
    pub description: &'static str,
    /// Function to extract the value from a record.
    pub extractor: Arc<dyn Fn(&R) -> Value + Send + Sync>,
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Column {
            key: self.key,
            description: self.description,
            extractor: Arc::clone(&self.extractor),
        }
    }
}

impl<R> Column<R> {
    pub fn new<F>(key: &'static str, description: &'static str, extractor: F) -> Self
    where
        F: Fn(&R) -> Value + Send + Sync + 'static,
    {
        Column {
            key,
            description,
            extractor: Arc::new(extractor),
        }
    }
}

/// Generic CSV formatter that can be instantiated for any record type `R`.
pub struct CsvFormatter<R> {
    pub columns: Vec<Column<R>>,
    pub delimiter: char,
}

impl<R> CsvFormatter<R> {
    pub fn new(columns: Vec<Column<R>>) -> Self {
        CsvFormatter { columns, delimiter: ',' }
    }

    /// Write header line (column keys) to the writer.
    pub fn write_header<W: Write>(&self, mut w: W) -> io::Result<()> {
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(w, "{}", self.delimiter)?;
            }
            write!(w, "{}", col.key)?;
        }
        writeln!(w)
    }

    /// Write a single record as one line.
    pub fn write_record<W: Write>(&self, mut w: W, record: &R) -> io::Result<()> {
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(w, "{}", self.delimiter)?;
            }
            let value = (col.extractor)(record);
            self.write_value(&mut w, &value)?;
        }
        writeln!(w)
    }

    /// Header plus every record
    pub fn write_all<W: Write>(&self, mut w: W, records: &[R]) -> io::Result<()> {
        self.write_header(&mut w)?;
        for record in records {
            self.write_record(&mut w, record)?;
        }
        Ok(())
    }

    fn write_value<W: Write>(&self, w: &mut W, value: &Value) -> io::Result<()> {
        match value {
            Value::Int(v) => write!(w, "{}", v),
            Value::Uint(v) => write!(w, "{}", v),
            Value::Float(v) => write!(w, "{}", v),
            Value::Str(s) => write!(w, "{}", escape_field(s, self.delimiter)),
            Value::Bool(b) => write!(w, "{}", if *b { "True" } else { "False" }),
            Value::Missing => Ok(()),
        }
    }
}

/// Quote a field holding the delimiter, quotes or line breaks.
fn escape_field(s: &str, delimiter: char) -> String {
    if s.contains(delimiter) || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
