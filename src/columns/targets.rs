use serde::{ser::SerializeMap, Serialize, Serializer};
use std::fmt;

/// The canonical meteorological fields every merged dataset is checked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetField {
    Precipitacao,
    TemperaturaMaxima,
    TemperaturaMaximaAbsoluta,
    TemperaturaMinima,
    TemperaturaMinimaAbsoluta,
}

impl TargetField {
    pub const ALL: [TargetField; 5] = [
        TargetField::Precipitacao,
        TargetField::TemperaturaMaxima,
        TargetField::TemperaturaMaximaAbsoluta,
        TargetField::TemperaturaMinima,
        TargetField::TemperaturaMinimaAbsoluta,
    ];

    /// Fields whose columns are coerced, rounded and reformatted.
    /// `temperatura_minima_absoluta` is resolved but left untouched.
    pub const ROUNDED: [TargetField; 4] = [
        TargetField::Precipitacao,
        TargetField::TemperaturaMaxima,
        TargetField::TemperaturaMaximaAbsoluta,
        TargetField::TemperaturaMinima,
    ];

    pub fn base(self) -> &'static str {
        match self {
            TargetField::Precipitacao => "precipitacao",
            TargetField::TemperaturaMaxima => "temperatura_maxima",
            TargetField::TemperaturaMaximaAbsoluta => "temperatura_maxima_absoluta",
            TargetField::TemperaturaMinima => "temperatura_minima",
            TargetField::TemperaturaMinimaAbsoluta => "temperatura_minima_absoluta",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base())
    }
}

/// How loosely a column name may match a target base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Exact, `base_` prefix, `_base` suffix, or plain substring.
    #[default]
    Permissive,
    /// Exact, prefix or suffix only.
    Strict,
}

impl MatchMode {
    fn matches(self, column: &str, base: &str) -> bool {
        if column == base
            || column.starts_with(&format!("{}_", base))
            || column.ends_with(&format!("_{}", base))
        {
            return true;
        }
        self == MatchMode::Permissive && column.contains(base)
    }
}

/// Resolved column per target field; `None` when nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetBases {
    columns: [Option<String>; 5],
}

impl TargetBases {
    pub fn get(&self, field: TargetField) -> Option<&str> {
        self.columns[field.index()].as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TargetField, Option<&str>)> + '_ {
        TargetField::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    /// Distinct columns to round and format, in `ROUNDED` order.
    pub fn rounded_columns(&self) -> Vec<&str> {
        let mut cols: Vec<&str> = Vec::new();
        for field in TargetField::ROUNDED {
            if let Some(col) = self.get(field) {
                if !cols.contains(&col) {
                    cols.push(col);
                }
            }
        }
        cols
    }
}

impl fmt::Display for TargetBases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, col) in self.iter() {
            writeln!(f, "  {} -> {}", field, col.unwrap_or("None"))?;
        }
        Ok(())
    }
}

impl Serialize for TargetBases {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(TargetField::ALL.len()))?;
        for (field, col) in self.iter() {
            map.serialize_entry(field.base(), &col)?;
        }
        map.end()
    }
}

/// Map normalized column names onto the target fields.
///
/// The first matching column in `columns` order is kept, unless a later column
/// equals the base exactly, in which case the later exact match replaces it.
/// With several exact matches the last one wins.
pub fn resolve_targets<S: AsRef<str>>(columns: &[S], mode: MatchMode) -> TargetBases {
    let mut resolved = TargetBases::default();

    for col in columns.iter().map(AsRef::as_ref) {
        for field in TargetField::ALL {
            let base = field.base();
            if !mode.matches(col, base) {
                continue;
            }
            let slot = &mut resolved.columns[field.index()];
            if slot.is_none() || col == base {
                *slot = Some(col.to_string());
            }
        }
    }

    resolved
}
