//! Identifier normalization shared by providers and stores.
//!
//! Stores normalize on insert and providers normalize on query, so
//! `"ab-123"` and `"AB123"` address the same row.

/// Normalizes a location code: strips non-alphanumerics and upper-cases.
pub fn normalize_code(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Normalizes a paygrade to letter + two digits (`"e-5"` → `"E05"`).
///
/// Inputs that do not look like `<letter><number>` are returned in
/// code-normalized form unchanged, so the lookup simply misses.
pub fn normalize_paygrade(raw: &str) -> String {
    let code = normalize_code(raw);
    let mut chars = code.chars();
    let Some(grade) = chars.next().filter(char::is_ascii_alphabetic) else {
        return code;
    };
    let digits: String = chars.collect();
    match digits.parse::<u8>() {
        Ok(step) if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
            format!("{grade}{step:02}")
        }
        _ => code,
    }
}

/// Normalizes a reference-table field name (`"401(k) Deferral"` → `"401_k_deferral"`).
pub fn normalize_field(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for c in raw.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Officer and warrant officer grades draw the officer subsistence rate.
pub fn is_officer_grade(paygrade: &str) -> Option<bool> {
    match normalize_paygrade(paygrade).chars().next() {
        Some('O') | Some('W') => Some(true),
        Some('E') => Some(false),
        _ => None,
    }
}
