/// Format an integer amount with thousands separators.
///
/// # Examples
///
/// ```
/// use shop_core::formatting::format_amount;
///
/// assert_eq!(format_amount(550), "550");
/// assert_eq!(format_amount(12_500), "12,500");
/// assert_eq!(format_amount(1_234_567), "1,234,567");
/// ```
pub fn format_amount(value: u128) -> String {
    group_thousands(&value.to_string())
}

/// Format a similarity score with three decimals, as shown in classification
/// reports.
///
/// # Examples
///
/// ```
/// use shop_core::formatting::format_score;
///
/// assert_eq!(format_score(0.87349), "0.873");
/// assert_eq!(format_score(1.0), "1.000");
/// ```
pub fn format_score(score: f64) -> String {
    format!("{:.3}", score)
}

/// Pad `s` on the right to `width` characters (counted as `char`s).
pub fn pad_right(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - len))
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}
