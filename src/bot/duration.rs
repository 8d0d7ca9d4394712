//! Compact duration expressions for the `!remind` command.

use std::fmt;

/// Errors that can occur when parsing a duration token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// A character that is neither a digit nor a known unit letter.
    InvalidUnit(char),
    /// The token ends with digits that no unit letter closes.
    MissingUnit,
    /// The total does not fit in 64 bits.
    Overflow,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUnit(c) => write!(f, "invalid time unit '{}' (use s/m/h/d)", c),
            Self::MissingUnit => write!(f, "number is missing a time unit (use s/m/h/d)"),
            Self::Overflow => write!(f, "duration is too large"),
        }
    }
}

impl std::error::Error for ParseError {}

fn unit_seconds(c: char) -> Option<u64> {
    match c {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(60 * 60),
        'd' => Some(60 * 60 * 24),
        _ => None,
    }
}

/// Parse a compact duration like `"1h30m"` into a total second count.
///
/// The token is a run of `(digits)(unit)` pairs with no separators. Pairs may
/// repeat and appear in any order; the result is the sum over all pairs.
/// Every numeral must be closed by a unit letter, so `"30"` and `"1h30"` are
/// rejected. A zero total is valid and means "no delay requested".
pub fn parse_duration(token: &str) -> Result<u64, ParseError> {
    let mut total: u64 = 0;
    let mut pending: u64 = 0;
    // Digits seen since the last unit letter.
    let mut open = false;

    for c in token.chars() {
        if let Some(d) = c.to_digit(10) {
            pending = pending
                .checked_mul(10)
                .and_then(|p| p.checked_add(u64::from(d)))
                .ok_or(ParseError::Overflow)?;
            open = true;
        } else {
            let factor = unit_seconds(c).ok_or(ParseError::InvalidUnit(c))?;
            total = pending
                .checked_mul(factor)
                .and_then(|v| total.checked_add(v))
                .ok_or(ParseError::Overflow)?;
            pending = 0;
            open = false;
        }
    }

    if open {
        return Err(ParseError::MissingUnit);
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_units() {
        assert_eq!(parse_duration("45s"), Ok(45));
        assert_eq!(parse_duration("2m"), Ok(120));
        assert_eq!(parse_duration("1h"), Ok(3600));
        assert_eq!(parse_duration("2d"), Ok(172800));
    }

    #[test]
    fn test_combined_pairs() {
        assert_eq!(parse_duration("1h30m"), Ok(5400));
        assert_eq!(parse_duration("1d2h3m4s"), Ok(86400 + 7200 + 180 + 4));
    }

    #[test]
    fn test_order_does_not_matter() {
        assert_eq!(parse_duration("30m1h"), parse_duration("1h30m"));
    }

    #[test]
    fn test_repeated_units_accumulate() {
        assert_eq!(parse_duration("10s10s"), Ok(20));
    }

    #[test]
    fn test_zero_total_is_ok() {
        assert_eq!(parse_duration("0m"), Ok(0));
        assert_eq!(parse_duration("0s0h"), Ok(0));
    }

    #[test]
    fn test_invalid_unit_rejects_whole_token() {
        assert_eq!(parse_duration("1x"), Err(ParseError::InvalidUnit('x')));
        assert_eq!(parse_duration("5m3w"), Err(ParseError::InvalidUnit('w')));
    }

    #[test]
    fn test_trailing_digits_rejected() {
        assert_eq!(parse_duration("30"), Err(ParseError::MissingUnit));
        assert_eq!(parse_duration("1h30"), Err(ParseError::MissingUnit));
    }

    #[test]
    fn test_empty_token_is_zero() {
        assert_eq!(parse_duration(""), Ok(0));
    }

    #[test]
    fn test_overflow_rejected() {
        assert_eq!(parse_duration("99999999999999999999s"), Err(ParseError::Overflow));
        assert_eq!(parse_duration("99999999999999999d"), Err(ParseError::Overflow));
    }
}
