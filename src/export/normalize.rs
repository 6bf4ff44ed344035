/// Collapse whitespace runs to one space and lowercase.
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Trim a cell and collapse inner whitespace, keeping case.
pub fn normalize_cell(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn normalize_header(raw: &str) -> String {
    normalize_text(raw)
}

/// Read a display value as a number: `$85,000` and `85000` are both 85000.
///
/// Accepts an optional sign, one leading currency symbol, and `,` thousands
/// separators in groups of three. Anything else (`5%`, `1,5`) is not a number.
pub fn numeric_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let amount = unsigned.strip_prefix(['$', '€', '£']).unwrap_or(unsigned);
    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (amount, None),
    };
    if !grouped_digits(whole) {
        return None;
    }
    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }

    let mut digits: String = whole.chars().filter(|c| *c != ',').collect();
    if let Some(fraction) = fraction {
        digits.push('.');
        digits.push_str(fraction);
    }
    let value: f64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

fn grouped_digits(whole: &str) -> bool {
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit() || b == b',') {
        return false;
    }
    let mut groups = whole.split(',');
    match groups.next() {
        Some(lead) if whole.contains(',') => (1..=3).contains(&lead.len()) && groups.all(|g| g.len() == 3),
        Some(_) => true,
        None => false,
    }
}

/// Case- and whitespace-insensitive equality, falling back to numeric
/// equality when both sides read as numbers.
pub fn cells_equivalent(a: &str, b: &str) -> bool {
    if normalize_text(a) == normalize_text(b) {
        return true;
    }
    match (numeric_value(a), numeric_value(b)) {
        (Some(x), Some(y)) => (x - y).abs() < 1e-9,
        _ => false,
    }
}

pub fn fingerprint(bytes: &[u8]) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
