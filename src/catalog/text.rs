//! Field cleaning for scraped text
//!
//! Titles, availability and category names are trimmed and NFKD-normalized.
//! Prices are parsed from display strings such as `£45.17`.

use unicode_normalization::UnicodeNormalization;

/// The star-rating class vocabulary and its numeric values
pub const RATING_VOCABULARY: [(&str, u8); 5] =
    [("One", 1), ("Two", 2), ("Three", 3), ("Four", 4), ("Five", 5)];

/// Trims surrounding whitespace and applies Unicode compatibility decomposition (NFKD)
///
/// # Examples
///
/// ```
/// use catalog_sweep::catalog::clean_text;
///
/// assert_eq!(clean_text("  In stock \n"), "In stock");
/// assert_eq!(clean_text("\u{fb01}ne"), "fine");
/// ```
pub fn clean_text(text: &str) -> String {
    text.nfkd().collect::<String>().trim().to_string()
}

/// Parses a displayed price by keeping only ASCII digits and the decimal point
///
/// Returns `None` when nothing numeric remains.
///
/// # Examples
///
/// ```
/// use catalog_sweep::catalog::parse_price;
///
/// assert_eq!(parse_price("£45.17"), Some(45.17));
/// assert_eq!(parse_price("£10"), Some(10.0));
/// assert_eq!(parse_price("n/a"), None);
/// ```
pub fn parse_price(text: &str) -> Option<f64> {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    digits.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Maps a rating class token to 1-5; anything else maps to 0
pub fn rating_from_token(token: &str) -> u8 {
    RATING_VOCABULARY
        .iter()
        .find(|(word, _)| *word == token)
        .map(|(_, value)| *value)
        .unwrap_or(0)
}
