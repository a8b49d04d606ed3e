use std::collections::HashSet;

/// Cell contents that load as missing values.
pub const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_na(raw: &str) -> bool {
    NA_VALUES.contains(&raw)
}

/// Lenient numeric parse: surrounding whitespace is ignored, NaN is rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    let v: f64 = raw.trim().parse().ok()?;
    if v.is_nan() {
        None
    } else {
        Some(v)
    }
}

/// Strip a byte-order mark and name blank headers `Unnamed: {index}`.
pub fn clean_header(raw: &str, index: usize) -> String {
    let cleaned = raw.trim_start_matches('\u{feff}');
    if cleaned.trim().is_empty() {
        format!("Unnamed: {}", index)
    } else {
        cleaned.to_string()
    }
}

/// Make repeated headers unique: `a, a, a` becomes `a, a.1, a.2`.
pub fn dedupe_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for (i, h) in raw.into_iter().enumerate() {
        let base = clean_header(h.as_ref(), i);
        let mut name = base.clone();
        let mut n = 0;
        while seen.contains(&name) {
            n += 1;
            name = format!("{}.{}", base, n);
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}

/// Decode file bytes as UTF-8, falling back to Latin-1 when they are not.
/// Returns the text and whether the fallback was used.
pub fn decode_text(bytes: Vec<u8>) -> (String, bool) {
    match String::from_utf8(bytes) {
        Ok(s) => (s, false),
        Err(e) => (e.into_bytes().iter().map(|&b| b as char).collect(), true),
    }
}
