use crate::error::NormalizationError;
use crate::model::RawValue;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Currency symbols removed before a value is parsed.
const STRIPPED_CURRENCY: &[char] = &['$', '€'];

/// Currency symbols accepted in front of a numeric-looking token.
const TOKEN_CURRENCY: &[char] = &['$', '€', '£', '¥'];

/// A value token reduced to a number.
///
/// The kind records whether the token carried a decimal point. Equality is
/// numeric, so `Integer(1200)` equals `Fractional(1200.0)`.
#[derive(Debug, Clone, Copy)]
pub enum NormalizedNumber {
    Integer(Decimal),
    Fractional(Decimal),
}

impl NormalizedNumber {
    pub fn value(&self) -> Decimal {
        match self {
            NormalizedNumber::Integer(v) => *v,
            NormalizedNumber::Fractional(v) => *v,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, NormalizedNumber::Integer(_))
    }
}

impl PartialEq for NormalizedNumber {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl fmt::Display for NormalizedNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedNumber::Integer(v) => write!(f, "{v}"),
            NormalizedNumber::Fractional(v) if v.scale() == 0 => write!(f, "{v}.0"),
            NormalizedNumber::Fractional(v) => write!(f, "{v}"),
        }
    }
}

/// Reduce a raw value token to a number.
///
/// Handles formats like:
/// - "1,234" -> Integer(1234)
/// - "$1,234.50" -> Fractional(1234.50)
/// - "$12.50%" -> Fractional(12.50)
/// - "13.7 %" -> Fractional(13.7)
///
/// Every character other than an ASCII digit or `.` is dropped, including
/// a leading minus sign. Fails when nothing numeric is left or when the
/// remainder is malformed (e.g. "12.5.3").
pub fn normalize(raw: &str) -> Result<NormalizedNumber, NormalizationError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !STRIPPED_CURRENCY.contains(c) && *c != ',')
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let error = || NormalizationError {
        raw: raw.to_string(),
        cleaned: cleaned.clone(),
    };

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return Err(error());
    }

    if cleaned.contains('.') {
        if cleaned.matches('.').count() > 1 {
            return Err(error());
        }
        // "12." and ".5" are valid decimal literals
        let padded = match (cleaned.starts_with('.'), cleaned.ends_with('.')) {
            (true, _) => format!("0{cleaned}"),
            (_, true) => format!("{cleaned}0"),
            _ => cleaned.clone(),
        };
        let value = Decimal::from_str(&padded).map_err(|_| error())?;
        Ok(NormalizedNumber::Fractional(value))
    } else {
        let value = Decimal::from_str(&cleaned).map_err(|_| error())?;
        Ok(NormalizedNumber::Integer(value))
    }
}

/// Normalize a raw value from either extraction path.
pub fn normalize_value(value: &RawValue) -> Result<NormalizedNumber, NormalizationError> {
    normalize(&value.to_string())
}

/// True iff both tokens normalize to the same number.
pub fn compare(a: &str, b: &str) -> Result<bool, NormalizationError> {
    Ok(normalize(a)? == normalize(b)?)
}

pub fn compare_values(a: &RawValue, b: &RawValue) -> Result<bool, NormalizationError> {
    Ok(normalize_value(a)? == normalize_value(b)?)
}

/// Check whether a text fragment looks like a table value.
///
/// Accepts an optional currency symbol, digits with thousands commas, an
/// optional fraction and an optional trailing `%`. Letters anywhere reject
/// the token, and at least one digit is required.
pub fn is_numeric_token(text: &str) -> bool {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix(TOKEN_CURRENCY) {
        s = rest.trim_start();
    }
    let s = s.strip_suffix('%').unwrap_or(s);

    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };

    if !int_part.chars().all(|c| c.is_ascii_digit() || c == ',') {
        return false;
    }
    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
    }

    s.chars().any(|c| c.is_ascii_digit())
}
