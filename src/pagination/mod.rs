//! # Pagination Bounds
//!
//! Turns a `{size, number}` page descriptor into an offset/limit window.
//!
//! Out-of-range input is always rejected, never clamped:
//! - size must be within `1..=max_size`
//! - number must be at least 1

use serde::Serialize;

use crate::pipeline::{FetchResult, PolicyViolation};
use crate::policy::PaginationConfig;
use crate::request::PageParams;

/// Validated offset/limit window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

/// Validates page descriptors against a resource's pagination config
#[derive(Debug, Clone, Copy)]
pub struct PageBounds {
    config: PaginationConfig,
}

impl PageBounds {
    pub fn new(config: PaginationConfig) -> Self {
        Self { config }
    }

    /// Resolves a page request into a window.
    ///
    /// Missing `size` falls back to the configured default and missing
    /// `number` to 1. Non-numeric text reads as 0.
    pub fn resolve(&self, page: &PageParams) -> FetchResult<PageWindow> {
        let size = page
            .size
            .as_deref()
            .map(parse_int)
            .unwrap_or(self.config.default_size);
        let number = page.number.as_deref().map(parse_int).unwrap_or(1);
        let index = number.saturating_sub(1);

        if size > self.config.max_size {
            return Err(PolicyViolation::PageSizeExceeded {
                size,
                max: self.config.max_size,
            });
        }
        if size < 1 {
            return Err(PolicyViolation::PageSizeTooSmall { size });
        }
        if index < 0 {
            return Err(PolicyViolation::PageNumberTooSmall { number });
        }

        // both operands are non-negative here
        let offset = index.saturating_mul(size) as u64;
        Ok(PageWindow {
            offset,
            limit: size as u64,
        })
    }
}

/// Leading-integer parse: optional whitespace, optional sign, then digits.
/// A single `_` between two digits is skipped (`"1_000"` → 1000).
///
/// Anything unparseable yields 0 (`"abc"` → 0, `"12abc"` → 12). Values too
/// large for `i64` saturate.
pub fn parse_int(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let bytes = digits.as_bytes();
    let mut value: i64 = 0;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'0'..=b'9' => {
                let digit = i64::from(b - b'0');
                value = value.saturating_mul(10).saturating_add(digit);
            }
            b'_' if i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) => {}
            _ => break,
        }
    }

    if negative {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(default_size: i64, max_size: i64) -> PageBounds {
        PageBounds::new(PaginationConfig {
            default_size,
            max_size,
        })
    }

    #[test]
    fn test_first_page() {
        let window = bounds(10, 50)
            .resolve(&PageParams::new(Some("10"), Some("1")))
            .unwrap();
        assert_eq!(window, PageWindow { offset: 0, limit: 10 });
    }

    #[test]
    fn test_third_page() {
        let window = bounds(10, 50)
            .resolve(&PageParams::new(Some("10"), Some("3")))
            .unwrap();
        assert_eq!(window, PageWindow { offset: 20, limit: 10 });
    }

    #[test]
    fn test_underscored_values() {
        let window = bounds(10, 50)
            .resolve(&PageParams::new(Some("2_0"), Some("1_1")))
            .unwrap();
        assert_eq!(window, PageWindow { offset: 200, limit: 20 });

        let err = bounds(10, 50)
            .resolve(&PageParams::new(Some("1_00"), None))
            .unwrap_err();
        assert_eq!(err, PolicyViolation::PageSizeExceeded { size: 100, max: 50 });
    }

    #[test]
    fn test_defaults() {
        let window = bounds(15, 50).resolve(&PageParams::default()).unwrap();
        assert_eq!(window, PageWindow { offset: 0, limit: 15 });

        let window = bounds(15, 50)
            .resolve(&PageParams::new(None, Some("2")))
            .unwrap();
        assert_eq!(window, PageWindow { offset: 15, limit: 15 });
    }

    #[test]
    fn test_size_above_max_rejected() {
        let err = bounds(10, 50)
            .resolve(&PageParams::new(Some("100"), None))
            .unwrap_err();
        assert_eq!(err, PolicyViolation::PageSizeExceeded { size: 100, max: 50 });

        // boundary is inclusive
        assert!(bounds(10, 50)
            .resolve(&PageParams::new(Some("50"), None))
            .is_ok());
    }

    #[test]
    fn test_size_below_one_rejected() {
        let err = bounds(10, 50)
            .resolve(&PageParams::new(Some("0"), None))
            .unwrap_err();
        assert_eq!(err, PolicyViolation::PageSizeTooSmall { size: 0 });

        let err = bounds(10, 50)
            .resolve(&PageParams::new(Some("abc"), None))
            .unwrap_err();
        assert_eq!(err, PolicyViolation::PageSizeTooSmall { size: 0 });
    }

    #[test]
    fn test_number_below_one_rejected() {
        for raw in ["0", "-1", "first"] {
            let err = bounds(10, 50)
                .resolve(&PageParams::new(None, Some(raw)))
                .unwrap_err();
            assert!(matches!(err, PolicyViolation::PageNumberTooSmall { .. }), "{}", raw);
        }
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("42"), 42);
        assert_eq!(parse_int("  7"), 7);
        assert_eq!(parse_int("-3"), -3);
        assert_eq!(parse_int("+5"), 5);
        assert_eq!(parse_int("12abc"), 12);
        assert_eq!(parse_int("abc"), 0);
        assert_eq!(parse_int(""), 0);
        assert_eq!(parse_int("3.9"), 3);
        assert_eq!(parse_int("1_0"), 10);
        assert_eq!(parse_int("1_000_000"), 1_000_000);
        assert_eq!(parse_int("1__0"), 1);
        assert_eq!(parse_int("_10"), 0);
        assert_eq!(parse_int("10_"), 10);
        assert_eq!(parse_int("-2_5"), -25);
        assert_eq!(parse_int("99999999999999999999999"), i64::MAX);
    }

    #[test]
    fn test_huge_page_number_saturates() {
        let window = bounds(10, 50)
            .resolve(&PageParams::new(Some("10"), Some("99999999999999999999")))
            .unwrap();
        assert_eq!(window.offset, i64::MAX as u64);
    }
}
