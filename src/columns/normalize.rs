use unicode_general_category::{get_general_category, GeneralCategory};
use unicode_normalization::{char::canonical_combining_class, UnicodeNormalization};

/// Normalize a column header into a lowercase, accent-free, underscore-joined key.
///
/// `"Temperatura Máxima (°C)"` becomes `"temperatura_maxima_c"`.
pub fn normalize_column_name(name: &str) -> String {
    // NFKD splits accented letters into base + combining mark; drop the marks
    let without_accents: String = name
        .nfkd()
        .filter(|c| canonical_combining_class(*c) == 0)
        .collect();
    let lowered = without_accents.to_lowercase();

    let mut out = String::with_capacity(lowered.len());
    for ch in lowered.trim().chars() {
        let ch = if is_name_char(ch) { ch } else { '_' };
        if ch == '_' && out.ends_with('_') {
            continue;
        }
        out.push(ch);
    }

    out.trim_matches('_').to_string()
}

/// Letters (`L*`) and numbers (`Nd`, `Nl`, `No`) survive; marks, symbols and
/// punctuation become separators.
fn is_name_char(ch: char) -> bool {
    use GeneralCategory::*;
    matches!(
        get_general_category(ch),
        UppercaseLetter
            | LowercaseLetter
            | TitlecaseLetter
            | ModifierLetter
            | OtherLetter
            | DecimalNumber
            | LetterNumber
            | OtherNumber
    )
}
