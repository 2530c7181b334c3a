//! Normalization of the vendor's `digits` webhook parameter.
//!
//! The Passthru applet delivers the pressed digits wrapped in literal
//! quote characters on some flows (`"1"` instead of `1`). The stored
//! value must be the bare digit string.

/// Strip literal quote wrapping from a `digits` parameter value.
///
/// Removes every leading and trailing `"` and `'` character, in that
/// order, then returns `None` if nothing is left. The inner value is
/// otherwise passed through untouched; this function does not validate
/// that the result is numeric, since the vendor owns that format.
///
/// # Examples
///
/// ```
/// use ivrmon_common::digits::normalize_digits;
///
/// assert_eq!(normalize_digits(Some("\"1\"")), Some("1".to_string()));
/// assert_eq!(normalize_digits(Some("'42'")), Some("42".to_string()));
/// assert_eq!(normalize_digits(Some("7")), Some("7".to_string()));
/// assert_eq!(normalize_digits(Some("\"\"")), None);
/// assert_eq!(normalize_digits(None), None);
/// ```
pub fn normalize_digits(raw: Option<&str>) -> Option<String> {
    let cleaned = raw?.trim_matches('"').trim_matches('\'');
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}
