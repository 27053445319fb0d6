//! Results Table Module
//!
//! Tabular view over the raw entries accumulated by a search:
//! - one row per entry, one column per distinct field name (first-seen order)
//! - sparse rows: a field missing from an entry has no cell
//! - well-known fields are converted to typed cells (see [`normalize`])

pub mod normalize;

pub use normalize::{normalize, Conversion, FIELD_CONVERSIONS};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io;

/// A single normalized value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Integer(i64),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    /// `link` field collapsed to `ref -> href`
    Links(BTreeMap<String, String>),
    /// Unconverted field, passed through as received
    Value(Value),
}

impl Cell {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Cell::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::Timestamp(ts) => Some(ts.date()),
            _ => None,
        }
    }

    pub fn as_links(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Cell::Links(links) => Some(links),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Cell::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Flat text form used for CSV output.
    pub fn to_field(&self) -> String {
        match self {
            Cell::Integer(n) => n.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Timestamp(ts) => ts.format("%Y-%m-%dT%H:%M:%S").to_string(),
            Cell::Links(links) => serde_json::to_string(links).unwrap_or_default(),
            Cell::Value(Value::Null) => String::new(),
            Cell::Value(Value::String(s)) => s.clone(),
            Cell::Value(other) => other.to_string(),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_field())
    }
}

pub type Row = BTreeMap<String, Cell>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultsTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl ResultsTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// All cells of one column, `None` where the row lacks the field.
    pub fn column(&self, name: &str) -> Vec<Option<&Cell>> {
        self.rows.iter().map(|r| r.get(name)).collect()
    }

    pub(crate) fn push_row(&mut self, fields: Vec<(String, Cell)>) {
        let mut row = Row::new();
        for (name, cell) in fields {
            if !self.has_column(&name) {
                self.columns.push(name.clone());
            }
            row.insert(name, cell);
        }
        self.rows.push(row);
    }

    /// Write the table as CSV: a header of column names, then one line per row.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(
                self.columns
                    .iter()
                    .map(|c| row.get(c).map(Cell::to_field).unwrap_or_default()),
            )?;
        }
        wtr.flush()?;
        Ok(())
    }
}
