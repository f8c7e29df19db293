//! Tolerant tabular decoding of delimited text into keyed rows.
//!
//! The upstream result files are machine-written but not trustworthy:
//! trailing blank lines, short rows, and the occasional non-numeric
//! value all occur in practice. The decoder drops all-blank rows,
//! treats missing trailing fields as absent, and surfaces coercion
//! failures in per-batch [`DecodeStats`] instead of aborting the
//! decode (or silently emitting NaN).

use csv::ReaderBuilder;
use std::collections::BTreeMap;

/// Per-batch decode diagnostics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStats {
    /// Rows emitted as records.
    pub rows: usize,
    /// Rows dropped because every field was blank or whitespace.
    pub dropped_blank: usize,
    /// Field values that failed numeric coercion (defaulted, not fatal).
    pub invalid_values: usize,
}

/// Decode raw delimited text into one key -> value map per row.
///
/// With `has_headers`, keys are the header names; without, keys are the
/// zero-based column index rendered as a string. Rows where every field
/// is blank are dropped and counted; unreadable rows are skipped and
/// counted as invalid.
pub fn decode_rows(text: &str, has_headers: bool) -> (Vec<BTreeMap<String, String>>, DecodeStats) {
    let mut rdr = ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = if has_headers {
        match rdr.headers() {
            Ok(h) => h.iter().map(|s| s.trim().to_string()).collect(),
            Err(_) => Vec::new(),
        }
    } else {
        Vec::new()
    };

    let mut rows = Vec::new();
    let mut stats = DecodeStats::default();
    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(_) => {
                stats.invalid_values += 1;
                continue;
            }
        };
        if record.iter().all(|field| field.trim().is_empty()) {
            stats.dropped_blank += 1;
            continue;
        }
        let mut row = BTreeMap::new();
        for (i, field) in record.iter().enumerate() {
            let key = if has_headers {
                match headers.get(i) {
                    Some(name) => name.clone(),
                    None => i.to_string(),
                }
            } else {
                i.to_string()
            };
            row.insert(key, field.trim().to_string());
        }
        rows.push(row);
        stats.rows += 1;
    }
    (rows, stats)
}

/// Coerce a string field to f64. `None` signals an invalid value that
/// the caller should count in its batch stats.
pub fn coerce_f64(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Coerce a string field to i32, tolerating surrounding whitespace.
pub fn coerce_i32(s: &str) -> Option<i32> {
    s.trim().parse::<i32>().ok()
}

/// Round a display value to two decimals.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_rows_are_dropped() {
        let csv = "a,b\n1,2\n , \n3,4\n";
        let (rows, stats) = decode_rows(csv, true);
        assert_eq!(rows.len(), 2);
        assert_eq!(stats.rows, 2);
        assert_eq!(stats.dropped_blank, 1);
    }

    #[test]
    fn one_nonblank_field_yields_one_record() {
        let csv = "a,b\n,x\n";
        let (rows, _) = decode_rows(csv, true);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("b").map(String::as_str), Some("x"));
    }

    #[test]
    fn short_rows_have_absent_trailing_fields() {
        let csv = "a,b,c\n1,2\n";
        let (rows, _) = decode_rows(csv, true);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].get("c").is_none(), "missing trailing field is absent");
    }

    #[test]
    fn trailing_blank_lines_are_tolerated() {
        let csv = "a,b\n1,2\n\n\n";
        let (rows, stats) = decode_rows(csv, true);
        assert_eq!(rows.len(), 1);
        assert_eq!(stats.rows, 1);
    }

    #[test]
    fn headerless_rows_key_by_index() {
        let csv = "x,y\n";
        let (rows, _) = decode_rows(csv, false);
        assert_eq!(rows[0].get("0").map(String::as_str), Some("x"));
        assert_eq!(rows[0].get("1").map(String::as_str), Some("y"));
    }

    #[test]
    fn coercion_is_tagged_not_nan() {
        assert_eq!(coerce_f64("150.2"), Some(150.2));
        assert_eq!(coerce_f64("---"), None);
        assert_eq!(coerce_f64(""), None);
        assert_eq!(coerce_i32(" 2021 "), Some(2021));
    }

    #[test]
    fn round2_rounds_half_up() {
        assert_eq!(round2(2.199999), 2.2);
        assert_eq!(round2(150.2), 150.2);
    }
}
