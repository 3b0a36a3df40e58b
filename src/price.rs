/// Price text normalization and best-effort numeric parsing
use regex::Regex;
use std::sync::LazyLock;

/// First numeric run, allowing the separators sites put inside prices.
static NUMBER_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d.,\s\u{a0}\u{202f}]*").expect("static pattern"));

static GROUPED_BY_DOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(\.\d{3})+$").expect("static pattern"));

static GROUPED_BY_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(,\d{3})+$").expect("static pattern"));

/// Normalize a displayed price into a plain decimal string.
///
/// Currency tokens and spacing are dropped, thousands separators collapsed
/// and a decimal comma becomes a dot:
/// - `"125.000 €"` → `"125000"`
/// - `"1.250,50 EUR"` → `"1250.50"`
/// - `"85 000 lei"` → `"85000"`
///
/// Text without any digit (e.g. "Preț la cerere") is returned trimmed.
pub fn normalize_price(raw: &str) -> String {
    let Some(run) = NUMBER_RUN.find(raw) else {
        return raw.trim().to_string();
    };

    let compact: String = run
        .as_str()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let compact = compact.trim_end_matches(['.', ',']);

    let last_dot = compact.rfind('.');
    let last_comma = compact.rfind(',');

    match (last_dot, last_comma) {
        (Some(dot), Some(comma)) => {
            // Whichever separator comes last is the decimal mark.
            let split = dot.max(comma);
            let whole: String = compact[..split]
                .chars()
                .filter(|c| c.is_ascii_digit())
                .collect();
            format!("{}.{}", whole, &compact[split + 1..])
        }
        (None, Some(_)) if GROUPED_BY_COMMA.is_match(compact) => compact.replace(',', ""),
        (None, Some(_)) => collapse_extra(compact, ','),
        (Some(_), None) if GROUPED_BY_DOT.is_match(compact) => compact.replace('.', ""),
        (Some(_), None) => collapse_extra(compact, '.'),
        (None, None) => compact.to_string(),
    }
}

/// Keep only the last occurrence of `mark` as the decimal point.
fn collapse_extra(number: &str, mark: char) -> String {
    match number.rfind(mark) {
        Some(split) => {
            let (whole, fraction) = number.split_at(split);
            let whole: String = whole.chars().filter(|c| *c != mark).collect();
            format!("{}.{}", whole, &fraction[1..])
        }
        None => number.to_string(),
    }
}

/// Numeric value used for sorting; `None` sorts last.
pub fn numeric_price(price: &str) -> Option<f64> {
    if price.trim().is_empty() {
        return None;
    }
    normalize_price(price)
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
