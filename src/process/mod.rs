// src/process/mod.rs
use chrono::{NaiveDateTime, NaiveTime};
use std::{collections::HashMap, fmt};
use tracing::debug;

use crate::columns::normalize_column_name;

pub mod convert;
pub mod date_parser;
pub mod format;
pub mod load;
pub mod sort;
pub mod utils;
pub mod write;

/// Provenance column appended to every loaded file.
pub const SOURCE_FILE_COLUMN: &str = "__source_file";

/// A single typed value in a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

/// Coarse value kind, used to decide whether a column is orderable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Text,
    Number,
    Date,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn kind(&self) -> Option<CellKind> {
        match self {
            Cell::Missing => None,
            Cell::Text(_) => Some(CellKind::Text),
            Cell::Number(_) => Some(CellKind::Number),
            Cell::Date(_) => Some(CellKind::Date),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(v) if v.is_nan() => Ok(()),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Date(dt) if dt.time() == NaiveTime::MIN => {
                write!(f, "{}", dt.format("%Y-%m-%d"))
            }
            Cell::Date(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Row-major table: ordered headers plus one `Vec<Cell>` per row, each
/// exactly `headers.len()` long.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// Replace every cell of column `idx` with `f(cell)`.
    pub fn map_column<F>(&mut self, idx: usize, mut f: F)
    where
        F: FnMut(&Cell) -> Cell,
    {
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
    }

    /// Append a column holding `value` in every row.
    pub fn push_constant_column(&mut self, name: &str, value: Cell) {
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(value.clone());
        }
    }

    /// Row-wise concatenation. Columns are the union of all headers in
    /// first-seen order; cells a table lacks are `Missing`.
    pub fn concat(tables: Vec<Table>) -> Table {
        let mut headers: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        for t in &tables {
            for h in &t.headers {
                if !positions.contains_key(h) {
                    positions.insert(h.clone(), headers.len());
                    headers.push(h.clone());
                }
            }
        }

        let total_rows = tables.iter().map(Table::num_rows).sum();
        let mut rows = Vec::with_capacity(total_rows);
        for t in tables {
            let targets: Vec<usize> = t.headers.iter().map(|h| positions[h]).collect();
            for row in t.rows {
                let mut out = vec![Cell::Missing; headers.len()];
                for (cell, &pos) in row.into_iter().zip(&targets) {
                    out[pos] = cell;
                }
                rows.push(out);
            }
        }

        Table { headers, rows }
    }

    /// Rename every header to its normalized form. Headers that normalize to
    /// the same name are merged into one column at the first one's position;
    /// within a row a later non-missing value overwrites an earlier one.
    pub fn normalize_headers(&mut self) {
        let mut headers: Vec<String> = Vec::with_capacity(self.headers.len());
        let mut mapping: Vec<usize> = Vec::with_capacity(self.headers.len());

        for original in &self.headers {
            let normalized = normalize_column_name(original);
            let pos = match headers.iter().position(|h| *h == normalized) {
                Some(pos) => {
                    debug!(
                        original = %original,
                        normalized = %normalized,
                        "merging colliding column"
                    );
                    pos
                }
                None => {
                    headers.push(normalized);
                    headers.len() - 1
                }
            };
            mapping.push(pos);
        }

        if headers.len() == self.headers.len() {
            self.headers = headers;
            return;
        }

        let width = headers.len();
        for row in &mut self.rows {
            let mut out = vec![Cell::Missing; width];
            for (cell, &pos) in row.drain(..).zip(&mapping) {
                if !cell.is_missing() {
                    out[pos] = cell;
                }
            }
            *row = out;
        }
        self.headers = headers;
    }
}
