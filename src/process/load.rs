use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use std::{fs, path::Path};
use tracing::{debug, warn};

use crate::columns::normalize_column_name;
use crate::process::{
    date_parser::parse_day_first,
    utils::{decode_text, dedupe_headers, is_na, parse_number},
    Cell, Table, SOURCE_FILE_COLUMN,
};

/// Normalized name of the column that is parsed as a date on load.
pub const DATE_COLUMN: &str = "data";

/// Load one CSV file into a typed [`Table`].
///
/// - the first record is the header row
/// - NA tokens become [`Cell::Missing`]
/// - a column whose values all parse as numbers holds [`Cell::Number`], any
///   other column holds [`Cell::Text`]
/// - the `data` column is parsed day-first when every value is a date, and
///   otherwise loaded like any other column
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.display()))]
pub fn load_csv(path: &Path) -> Result<Table> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let (text, latin1) = decode_text(bytes);
    if latin1 {
        warn!(path = %path.display(), "not valid UTF-8, decoded as Latin-1");
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = rdr.records();

    let headers = match records.next() {
        Some(rec) => {
            let rec = rec.with_context(|| {
                format!("CSV parse error in {} header", path.display())
            })?;
            dedupe_headers(rec.iter())
        }
        None => {
            warn!(path = %path.display(), "empty CSV file");
            return Ok(Table::default());
        }
    };

    // column-major while loading so each column can be typed as a whole
    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for (idx, result) in records.enumerate() {
        let record = result.with_context(|| {
            format!("CSV parse error in {} at record {}", path.display(), idx + 1)
        })?;
        if record.len() == 1 && record.get(0) == Some("") {
            continue;
        }
        if record.len() > headers.len() {
            bail!(
                "{}: record {} has {} fields, header has {}",
                path.display(),
                idx + 1,
                record.len(),
                headers.len()
            );
        }
        for (i, col) in raw.iter_mut().enumerate() {
            let value = record.get(i).filter(|v| !is_na(v)).map(str::to_string);
            col.push(value);
        }
    }

    let columns: Vec<Vec<Cell>> = headers
        .iter()
        .zip(raw)
        .map(|(name, values)| {
            if normalize_column_name(name) == DATE_COLUMN {
                match as_dates(&values) {
                    Some(cells) => return cells,
                    None => debug!(column = %name, "date parse failed, loading as plain column"),
                }
            }
            infer_column(values)
        })
        .collect();

    let num_rows = columns.first().map_or(0, Vec::len);
    let mut table = Table::new(headers);
    let mut iters: Vec<_> = columns.into_iter().map(Vec::into_iter).collect();
    for _ in 0..num_rows {
        table
            .rows
            .push(iters.iter_mut().filter_map(Iterator::next).collect());
    }

    debug!(rows = table.num_rows(), cols = table.headers.len(), "loaded");
    Ok(table)
}

/// Load a file and tag every row with the file's base name.
pub fn load_tagged(path: &Path) -> Result<Table> {
    let mut table = load_csv(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    table.push_constant_column(SOURCE_FILE_COLUMN, Cell::Text(name));
    Ok(table)
}

fn as_dates(values: &[Option<String>]) -> Option<Vec<Cell>> {
    values
        .iter()
        .map(|v| match v {
            None => Some(Cell::Missing),
            Some(s) => parse_day_first(s).map(Cell::Date),
        })
        .collect()
}

fn infer_column(values: Vec<Option<String>>) -> Vec<Cell> {
    let numeric = values
        .iter()
        .flatten()
        .all(|s| parse_number(s).is_some());

    values
        .into_iter()
        .map(|v| match v {
            None => Cell::Missing,
            Some(s) if numeric => parse_number(&s).map_or(Cell::Missing, Cell::Number),
            Some(s) => Cell::Text(s),
        })
        .collect()
}
