use std::cmp::Ordering;
use tracing::{debug, info};

use crate::process::{Cell, CellKind, Table};

pub const CITY_KEY: &str = "cidade";
pub const DATE_KEY: &str = "data";

/// First header equal to, or containing, `key`.
pub fn find_key_column(headers: &[String], key: &str) -> Option<usize> {
    headers.iter().position(|h| h == key || h.contains(key))
}

/// Stable sort by city then date. Missing values go last.
///
/// Returns `false` and leaves the rows untouched when a key column is absent
/// or mixes value kinds (e.g. text and dates).
pub fn sort_by_city_and_date(table: &mut Table) -> bool {
    let (Some(city), Some(date)) = (
        find_key_column(&table.headers, CITY_KEY),
        find_key_column(&table.headers, DATE_KEY),
    ) else {
        debug!("no city/date columns, keeping concatenation order");
        return false;
    };

    for idx in [city, date] {
        if !is_orderable(table, idx) {
            info!(column = %table.headers[idx], "mixed value kinds, skipping sort");
            return false;
        }
    }

    table.rows.sort_by(|a, b| {
        compare_cells(&a[city], &b[city]).then_with(|| compare_cells(&a[date], &b[date]))
    });
    true
}

fn is_orderable(table: &Table, idx: usize) -> bool {
    let mut kind: Option<CellKind> = None;
    for k in table.column(idx).filter_map(Cell::kind) {
        match kind {
            None => kind = Some(k),
            Some(seen) if seen != k => return false,
            Some(_) => {}
        }
    }
    true
}

fn compare_cells(a: &Cell, b: &Cell) -> Ordering {
    match (a, b) {
        (Cell::Missing, Cell::Missing) => Ordering::Equal,
        (Cell::Missing, _) => Ordering::Greater,
        (_, Cell::Missing) => Ordering::Less,
        (Cell::Text(x), Cell::Text(y)) => x.cmp(y),
        (Cell::Number(x), Cell::Number(y)) => x.total_cmp(y),
        (Cell::Date(x), Cell::Date(y)) => x.cmp(y),
        // unreachable after is_orderable
        _ => Ordering::Equal,
    }
}
