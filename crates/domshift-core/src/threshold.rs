#![forbid(unsafe_code)]

//! Breakpoint thresholds and active-threshold resolution.
//!
//! A [`Threshold`] is either a positive pixel width ([`Px`]) or the
//! [`Threshold::Default`] sentinel. A rule registered at `768` is active while
//! the effective width is below (or exactly at) 768 and no smaller threshold
//! matches.
//!
//! Breakpoint keys follow the numeric-string grammar of the web platform:
//! decimal with optional fraction and exponent, or an unsigned `0x`/`0o`/`0b`
//! integer. Named values such as `inf` or `NaN` are never thresholds.
//!
//! # Invariants
//!
//! 1. `Px` is finite, `> 0` and `<= 2^53 - 1`.
//! 2. `Threshold::Default` orders after every `Px`.
//! 3. [`Thresholds::resolve`] is monotonic in width: `w1 < w2` implies
//!    `resolve(w1) <= resolve(w2)`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{MAX_SAFE_INTEGER, RangeError};

/// A validated breakpoint width in CSS pixels.
#[derive(Debug, Clone, Copy)]
pub struct Px(f64);

impl Px {
    /// Validate a pixel threshold.
    pub fn new(value: f64) -> Result<Self, RangeError> {
        if value.is_finite() && value > 0.0 && value <= MAX_SAFE_INTEGER {
            Ok(Self(value))
        } else {
            Err(RangeError::InvalidThreshold {
                key: value.to_string(),
            })
        }
    }

    /// Parse a breakpoint key such as `"768"`, `" 1e3 "` or `"0x300"`.
    ///
    /// Surrounding whitespace is ignored. Unsigned `0x`, `0o` and `0b`
    /// prefixes (either case) select an integer radix.
    pub fn parse(key: &str) -> Result<Self, RangeError> {
        let invalid = || RangeError::InvalidThreshold {
            key: key.to_string(),
        };
        let value = parse_number(key.trim()).ok_or_else(invalid)?;
        Self::new(value).map_err(|_| invalid())
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    if bytes.len() > 2 && bytes[0] == b'0' {
        let radix = match bytes[1] {
            b'x' | b'X' => Some(16),
            b'o' | b'O' => Some(8),
            b'b' | b'B' => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            let digits = &text[2..];
            if !digits.chars().all(|c| c.is_digit(radix)) {
                return None;
            }
            return digits.chars().try_fold(0.0_f64, |acc, c| {
                c.to_digit(radix)
                    .map(|d| acc.mul_add(f64::from(radix), f64::from(d)))
            });
        }
    }
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit() || b".+-eE".contains(&b)) {
        return None;
    }
    text.parse().ok()
}

impl PartialEq for Px {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Px {}

impl PartialOrd for Px {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Px {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Px {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Px {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px", self.0)
    }
}

/// A plan key: a pixel breakpoint or the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Threshold {
    Width(Px),
    Default,
}

impl Threshold {
    #[must_use]
    pub const fn width(self) -> Option<Px> {
        match self {
            Self::Width(px) => Some(px),
            Self::Default => None,
        }
    }

    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }
}

impl From<Px> for Threshold {
    fn from(px: Px) -> Self {
        Self::Width(px)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Width(px) => px.fmt(f),
            Self::Default => f.write_str("default"),
        }
    }
}

/// Sorted, deduplicated numeric thresholds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Thresholds {
    sorted: Vec<Px>,
}

impl Thresholds {
    pub fn new(values: impl IntoIterator<Item = Px>) -> Self {
        let mut sorted: Vec<Px> = values.into_iter().collect();
        sorted.sort_unstable();
        sorted.dedup();
        Self { sorted }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Px] {
        &self.sorted
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Every plan key in application order: numeric ascending, then default.
    pub fn keys(&self) -> impl Iterator<Item = Threshold> + '_ {
        self.sorted
            .iter()
            .copied()
            .map(Threshold::Width)
            .chain(std::iter::once(Threshold::Default))
    }

    /// Resolve the active threshold for an effective width.
    ///
    /// Returns the smallest threshold `>= width`, or `Default` when `width`
    /// exceeds every threshold. Non-finite widths resolve to `Default` for
    /// `+inf`/NaN and to the smallest threshold for `-inf`.
    #[must_use]
    pub fn resolve(&self, width: f64) -> Threshold {
        if width.is_nan() {
            return Threshold::Default;
        }
        let index = self.sorted.partition_point(|px| px.0 < width);
        self.sorted
            .get(index)
            .copied()
            .map_or(Threshold::Default, Threshold::Width)
    }
}
