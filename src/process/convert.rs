use crate::process::{utils::parse_number, Cell, Table};

/// Round to one decimal place: scale by 10, round half to even, scale back.
///
/// `5.55` is stored just below 5.55, but `5.55 * 10.0` lands exactly on
/// `55.5`, so it rounds to `5.6`; `0.25` rounds to `0.2`.
pub fn round_one_decimal(v: f64) -> f64 {
    if !v.is_finite() {
        return v;
    }
    (v * 10.0).round_ties_even() / 10.0
}

/// Coerce a cell to a number. Text is parsed, anything unparseable (dates
/// included) becomes `Missing`.
pub fn coerce_numeric(cell: &Cell) -> Cell {
    match cell {
        Cell::Number(v) if !v.is_nan() => Cell::Number(*v),
        Cell::Text(s) => parse_number(s).map_or(Cell::Missing, Cell::Number),
        _ => Cell::Missing,
    }
}

/// Coerce column `idx` to numbers and round each to one decimal.
pub fn coerce_and_round(table: &mut Table, idx: usize) {
    table.map_column(idx, |cell| match coerce_numeric(cell) {
        Cell::Number(v) => Cell::Number(round_one_decimal(v)),
        other => other,
    });
}
