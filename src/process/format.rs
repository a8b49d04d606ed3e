use crate::process::{utils::parse_number, Cell, Table};

/// Render a rounded numeric cell: `""` for missing, `"12"` for whole numbers,
/// `"12.3"` otherwise. Non-numeric cells keep their raw string form.
pub fn format_numeric_for_display(cell: &Cell) -> String {
    match cell {
        Cell::Missing => String::new(),
        Cell::Number(v) => format_number(*v),
        Cell::Text(s) => parse_number(s).map_or_else(|| s.clone(), format_number),
        Cell::Date(_) => cell.to_string(),
    }
}

fn format_number(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else if v.is_finite() && v.fract() == 0.0 {
        // -0.0 prints as "-0" otherwise
        if v == 0.0 {
            "0".to_string()
        } else {
            format!("{:.0}", v)
        }
    } else {
        format!("{:.1}", v)
    }
}

/// Replace every cell of column `idx` with its display string.
pub fn format_column(table: &mut Table, idx: usize) {
    table.map_column(idx, |cell| Cell::Text(format_numeric_for_display(cell)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::convert::round_one_decimal;

    #[test]
    fn whole_numbers_drop_the_decimal() {
        assert_eq!(format_numeric_for_display(&Cell::Number(12.0)), "12");
        assert_eq!(format_numeric_for_display(&Cell::Number(-3.0)), "-3");
        assert_eq!(format_numeric_for_display(&Cell::Number(-0.0)), "0");
        assert_eq!(format_numeric_for_display(&Cell::Number(1e20)), "100000000000000000000");
    }

    #[test]
    fn fractions_keep_one_decimal() {
        let rounded = round_one_decimal(12.34);
        assert_eq!(format_numeric_for_display(&Cell::Number(rounded)), "12.3");
        assert_eq!(format_numeric_for_display(&Cell::Number(-0.5)), "-0.5");
    }

    #[test]
    fn missing_and_fallbacks() {
        assert_eq!(format_numeric_for_display(&Cell::Missing), "");
        assert_eq!(format_numeric_for_display(&Cell::Number(f64::NAN)), "");
        assert_eq!(format_numeric_for_display(&Cell::Text("12.0".into())), "12");
        assert_eq!(format_numeric_for_display(&Cell::Text("n/d".into())), "n/d");
        assert_eq!(format_numeric_for_display(&Cell::Number(f64::INFINITY)), "inf");
    }

    #[test]
    fn formatting_is_stable_when_reapplied() {
        for v in [0.0, 12.0, 12.3, -7.1, 1234.5] {
            let once = format_numeric_for_display(&Cell::Number(v));
            let twice = format_numeric_for_display(&Cell::Text(once.clone()));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn reparsing_formatted_value_gives_rounded_value() {
        for raw in [0.04, 5.55, 12.34, 25.04, -7.15, 99.96, 1234.56] {
            let rounded = round_one_decimal(raw);
            let shown = format_numeric_for_display(&Cell::Number(rounded));
            let back: f64 = shown.parse().unwrap();
            assert_eq!(back, rounded, "raw {}", raw);
        }
    }

    #[test]
    fn format_column_produces_text_cells() {
        let mut t = Table::new(vec!["t".into()]);
        t.rows = vec![vec![Cell::Number(25.0)], vec![Cell::Missing]];
        format_column(&mut t, 0);
        assert_eq!(
            t.rows,
            vec![vec![Cell::Text("25".into())], vec![Cell::Text(String::new())]]
        );
    }
}
