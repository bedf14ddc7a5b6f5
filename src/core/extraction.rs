use crate::domain::model::CURRENCY_MARKER;
use crate::utils::error::{PriceBotError, Result};

/// Maps Persian (U+06F0..U+06F9) and Arabic-Indic (U+0660..U+0669) digits
/// to ASCII digits. Every other character passes through untouched.
///
/// Only these two scripts (plus ASCII) are recognized. Digits from other
/// scripts, such as fullwidth `０`..`９`, are dropped as non-digits rather
/// than concatenated; Divar renders prices in Persian digits.
pub fn normalize_digits(text: &str) -> String {
    text.chars().map(normalize_digit).collect()
}

fn normalize_digit(c: char) -> char {
    let zero = match c {
        '\u{06F0}'..='\u{06F9}' => '\u{06F0}',
        '\u{0660}'..='\u{0669}' => '\u{0660}',
        _ => return c,
    };
    let offset = c as u32 - zero as u32;
    char::from_digit(offset, 10).unwrap_or(c)
}

/// Reads the asking price out of one listing's display text.
///
/// Returns `Ok(None)` for listings that do not carry the currency marker or
/// have no digits at all. Digits are concatenated in the order they appear,
/// so thousands separators and the currency word vanish.
///
/// Prices are capped at `u64::MAX`. A digit run above that is a
/// `PriceParseError`; the aggregator skips that listing and keeps the rest.
pub fn extract_price(listing_text: &str) -> Result<Option<u64>> {
    if !listing_text.contains(CURRENCY_MARKER) {
        return Ok(None);
    }

    let digits: String = normalize_digits(listing_text)
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return Ok(None);
    }

    digits
        .parse::<u64>()
        .map(Some)
        .map_err(|e| PriceBotError::PriceParseError {
            message: format!("`{}` is not a representable price: {}", digits, e),
        })
}

/// Integer mean, truncated toward zero. `None` for an empty sample.
pub fn floor_mean(samples: &[u64]) -> Option<u64> {
    if samples.is_empty() {
        return None;
    }
    let sum: u128 = samples.iter().map(|&s| u128::from(s)).sum();
    let mean = sum / samples.len() as u128;
    // The mean never exceeds the largest sample, so it always fits.
    u64::try_from(mean).ok()
}
