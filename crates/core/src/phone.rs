//! Phone number normalization to the canonical international format.
//!
//! Every phone number in the system is stored as `+91` followed by
//! exactly ten digits. [`normalize_phone`] accepts the messy forms that
//! show up in uploaded files (separators, a `+91` or `0` prefix) and
//! canonicalizes them, rejecting anything else.

/// Country calling code prepended to every normalized number.
pub const COUNTRY_PREFIX: &str = "+91";

/// A national number is exactly this many digits.
pub const NATIONAL_DIGITS: usize = 10;

/// The input could not be normalized to a valid number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid phone number \"{0}\"")]
pub struct InvalidPhone(pub String);

/// Normalize a raw phone string to `+91` + ten digits.
///
/// Steps, in order:
/// 1. Drop whitespace, hyphens, parentheses, and dots.
/// 2. Drop one leading `+`.
/// 3. If the string is 12 characters starting with `91`, drop the `91`.
/// 4. If the string is 11 characters starting with `0`, drop the `0`.
/// 5. The remainder must be exactly ten ASCII digits.
///
/// Normalization is idempotent: feeding the output back in returns the
/// same value.
pub fn normalize_phone(raw: &str) -> Result<String, InvalidPhone> {
    let stripped: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')' | '.'))
        .collect();

    let mut digits = stripped.strip_prefix('+').unwrap_or(&stripped);

    if digits.len() == NATIONAL_DIGITS + 2 && digits.starts_with("91") {
        digits = &digits[2..];
    }
    if digits.len() == NATIONAL_DIGITS + 1 {
        digits = digits.strip_prefix('0').unwrap_or(digits);
    }

    if digits.len() == NATIONAL_DIGITS && digits.bytes().all(|b| b.is_ascii_digit()) {
        Ok(format!("{COUNTRY_PREFIX}{digits}"))
    } else {
        Err(InvalidPhone(raw.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_ten_digits() {
        assert_eq!(normalize_phone("9876543210").unwrap(), "+919876543210");
    }

    #[test]
    fn test_plus_prefix() {
        assert_eq!(normalize_phone("+919876543210").unwrap(), "+919876543210");
    }

    #[test]
    fn test_country_code_without_plus() {
        assert_eq!(normalize_phone("919876543210").unwrap(), "+919876543210");
    }

    #[test]
    fn test_leading_zero() {
        assert_eq!(normalize_phone("09876543210").unwrap(), "+919876543210");
    }

    #[test]
    fn test_separators_stripped() {
        assert_eq!(
            normalize_phone("+91 98765-43210").unwrap(),
            "+919876543210"
        );
        assert_eq!(
            normalize_phone("(987) 654.3210").unwrap(),
            "+919876543210"
        );
        assert_eq!(normalize_phone("98765 43210").unwrap(), "+919876543210");
    }

    #[test]
    fn test_idempotent() {
        let inputs = ["9876543210", "+91 98765-43210", "09876543210"];
        for input in inputs {
            let once = normalize_phone(input).unwrap();
            let twice = normalize_phone(&once).unwrap();
            assert_eq!(once, twice, "input: {input}");
        }
    }

    #[test]
    fn test_equivalent_forms_agree() {
        let d = "9876543210";
        let canonical = format!("+91{d}");
        assert_eq!(normalize_phone(d).unwrap(), canonical);
        assert_eq!(normalize_phone(&format!("+91{d}")).unwrap(), canonical);
        assert_eq!(normalize_phone(&format!("91{d}")).unwrap(), canonical);
        assert_eq!(normalize_phone(&format!("0{d}")).unwrap(), canonical);
    }

    #[test]
    fn test_ten_digits_starting_with_zero_kept_verbatim() {
        // Only an 11-digit string sheds its leading zero.
        assert_eq!(normalize_phone("0123456789").unwrap(), "+910123456789");
    }

    #[test]
    fn test_too_short() {
        assert!(normalize_phone("12345").is_err());
    }

    #[test]
    fn test_too_long() {
        assert!(normalize_phone("98765432101234").is_err());
    }

    #[test]
    fn test_letters_rejected() {
        assert!(normalize_phone("98765abcde").is_err());
        assert!(normalize_phone("invalid").is_err());
    }

    #[test]
    fn test_empty_rejected() {
        assert!(normalize_phone("").is_err());
        assert!(normalize_phone("   ").is_err());
    }

    #[test]
    fn test_other_country_code_rejected() {
        // 12 digits not starting with 91 is not a national number.
        assert!(normalize_phone("+929876543210").is_err());
    }

    #[test]
    fn test_error_carries_raw_input() {
        let err = normalize_phone("bogus").unwrap_err();
        assert_eq!(err.0, "bogus");
    }
}
