#![forbid(unsafe_code)]

//! Size units backed by exact decimal arithmetic.
//!
//! Every size in a panel group is either an absolute pixel amount or a
//! fraction of the group's *dynamic* space (the container minus handles,
//! collapsed panels and panels pinned to pixels at rest). Values are kept as
//! [`Decimal`] so thousands of one-pixel drag steps never accumulate binary
//! floating point drift.
//!
//! # Literals
//!
//! | Literal | Value |
//! |---------|-------|
//! | `245px` | `Unit::Pixel(245)` |
//! | `50%`   | `Unit::Percent(0.5)` |
//! | `1fr`   | `SizeExpr::Fill` (only valid where a [`SizeExpr`] is expected) |
//!
//! # Invariants
//!
//! 1. Parsed values are never negative.
//! 2. `Unit::parse(&unit.to_string()) == Ok(unit)` for every unit produced by
//!    the parser.
//! 3. Conversions against an empty dynamic space return zero instead of
//!    dividing by zero.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decimal places kept when a percentage is resolved into pixels.
///
/// Division residue below this precision (e.g. `254.99999…`) is rounded away;
/// whatever remains is absorbed by the layout engine's sum correction.
pub const PIXEL_DECIMAL_PLACES: u32 = 10;

/// Literal for the fill marker (`max = 100%` of dynamic space).
pub const FILL_LITERAL: &str = "1fr";

/// Size literal parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("invalid size literal {input:?}: expected `<number>px` or `<number>%`")]
    InvalidUnit { input: String },
}

impl UnitError {
    fn invalid(input: &str) -> Self {
        Self::InvalidUnit {
            input: input.to_string(),
        }
    }
}

/// A size measured in pixels or as a fraction of dynamic space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Unit {
    /// Absolute pixels.
    Pixel(Decimal),
    /// Fraction (`0.0..=1.0`) of the dynamic container space.
    Percent(Decimal),
}

impl Unit {
    /// Zero pixels.
    pub const ZERO: Self = Self::Pixel(Decimal::ZERO);

    /// Pixel unit.
    #[must_use]
    pub fn px(value: impl Into<Decimal>) -> Self {
        Self::Pixel(value.into())
    }

    /// Percent unit from a percentage number (`pct(50)` is `50%`).
    #[must_use]
    pub fn pct(percentage: impl Into<Decimal>) -> Self {
        Self::Percent(percentage.into() / Decimal::ONE_HUNDRED)
    }

    /// Percent unit from a fraction (`fraction(0.5)` is `50%`).
    #[must_use]
    pub fn fraction(value: Decimal) -> Self {
        Self::Percent(value)
    }

    /// Parse a `px` or `%` literal.
    pub fn parse(input: &str) -> Result<Self, UnitError> {
        let trimmed = input.trim();
        if let Some(number) = trimmed.strip_suffix("px") {
            return parse_non_negative(number, input).map(Self::Pixel);
        }
        if let Some(number) = trimmed.strip_suffix('%') {
            return parse_non_negative(number, input)
                .map(|percentage| Self::Percent(percentage / Decimal::ONE_HUNDRED));
        }
        Err(UnitError::invalid(input))
    }

    /// Raw stored value (pixels, or a fraction for percent).
    #[must_use]
    pub const fn value(self) -> Decimal {
        match self {
            Self::Pixel(value) | Self::Percent(value) => value,
        }
    }

    #[must_use]
    pub const fn is_pixel(self) -> bool {
        matches!(self, Self::Pixel(_))
    }

    #[must_use]
    pub const fn is_percent(self) -> bool {
        matches!(self, Self::Percent(_))
    }

    /// Resolve to pixels given the container's axis size and the space
    /// consumed by statically sized items.
    #[must_use]
    pub fn to_pixels(self, container: Decimal, static_space: Decimal) -> Decimal {
        match self {
            Self::Pixel(value) => value,
            Self::Percent(fraction) => {
                (fraction * dynamic_space(container, static_space)).round_dp(PIXEL_DECIMAL_PLACES)
            }
        }
    }

    /// Resolve to a fraction of the dynamic space.
    #[must_use]
    pub fn to_fraction(self, container: Decimal, static_space: Decimal) -> Decimal {
        match self {
            Self::Percent(fraction) => fraction,
            Self::Pixel(value) => {
                let dynamic = dynamic_space(container, static_space);
                if dynamic.is_zero() {
                    Decimal::ZERO
                } else {
                    value / dynamic
                }
            }
        }
    }

    /// Same size expressed as a pixel unit.
    #[must_use]
    pub fn as_pixel_unit(self, container: Decimal, static_space: Decimal) -> Self {
        Self::Pixel(self.to_pixels(container, static_space))
    }

    /// Same size expressed as a percent unit.
    #[must_use]
    pub fn as_percent_unit(self, container: Decimal, static_space: Decimal) -> Self {
        Self::Percent(self.to_fraction(container, static_space))
    }
}

impl Default for Unit {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pixel(value) => write!(f, "{}px", value.normalize()),
            Self::Percent(fraction) => {
                write!(f, "{}%", (fraction * Decimal::ONE_HUNDRED).normalize())
            }
        }
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A size bound that may also be the fill marker.
///
/// Serialized as its literal (`"1fr"`, `"300px"`, `"40%"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SizeExpr {
    /// Grow up to all of the dynamic space.
    #[default]
    Fill,
    Size(Unit),
}

impl SizeExpr {
    /// Parse a `px`, `%` or `1fr` literal.
    pub fn parse(input: &str) -> Result<Self, UnitError> {
        if input.trim() == FILL_LITERAL {
            return Ok(Self::Fill);
        }
        Unit::parse(input).map(Self::Size)
    }

    #[must_use]
    pub const fn is_fill(self) -> bool {
        matches!(self, Self::Fill)
    }

    /// Resolve to pixels; fill resolves to the whole dynamic space.
    #[must_use]
    pub fn to_pixels(self, container: Decimal, static_space: Decimal) -> Decimal {
        match self {
            Self::Fill => dynamic_space(container, static_space),
            Self::Size(unit) => unit.to_pixels(container, static_space),
        }
    }
}

impl From<Unit> for SizeExpr {
    fn from(unit: Unit) -> Self {
        Self::Size(unit)
    }
}

impl fmt::Display for SizeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fill => f.write_str(FILL_LITERAL),
            Self::Size(unit) => unit.fmt(f),
        }
    }
}

impl FromStr for SizeExpr {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SizeExpr {
    type Error = UnitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SizeExpr> for String {
    fn from(value: SizeExpr) -> Self {
        value.to_string()
    }
}

/// Container space left after static items, never negative.
#[must_use]
pub fn dynamic_space(container: Decimal, static_space: Decimal) -> Decimal {
    (container - static_space).max(Decimal::ZERO)
}

fn parse_non_negative(number: &str, original: &str) -> Result<Decimal, UnitError> {
    let has_digit = number.bytes().any(|b| b.is_ascii_digit());
    let well_formed = number.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && number.bytes().filter(|&b| b == b'.').count() <= 1;
    if !has_digit || !well_formed {
        return Err(UnitError::invalid(original));
    }
    Decimal::from_str(number).map_err(|_| UnitError::invalid(original))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).expect("test decimal")
    }

    #[test]
    fn parses_pixel_and_percent_literals() {
        assert_eq!(Unit::parse("245px"), Ok(Unit::px(245)));
        assert_eq!(Unit::parse("12.5px"), Ok(Unit::Pixel(dec("12.5"))));
        assert_eq!(Unit::parse("50%"), Ok(Unit::Percent(dec("0.5"))));
        assert_eq!(Unit::parse(" 0% "), Ok(Unit::Percent(Decimal::ZERO)));
    }

    #[test]
    fn rejects_malformed_literals() {
        for bad in ["", "px", "%", "12", "-5px", "1.2.3px", "12 px", "1fr", "abc%", "1e3px"] {
            assert_eq!(
                Unit::parse(bad),
                Err(UnitError::InvalidUnit {
                    input: bad.to_string()
                }),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn formats_without_trailing_zeros() {
        assert_eq!(Unit::Pixel(dec("245.000")).to_string(), "245px");
        assert_eq!(Unit::Percent(dec("0.25")).to_string(), "25%");
        assert_eq!(Unit::Percent(dec("0.125")).to_string(), "12.5%");
    }

    #[test]
    fn size_expr_accepts_fill() {
        assert_eq!(SizeExpr::parse("1fr"), Ok(SizeExpr::Fill));
        assert_eq!(SizeExpr::parse("300px"), Ok(SizeExpr::Size(Unit::px(300))));
        assert!(SizeExpr::parse("2fr").is_err());
        assert_eq!(SizeExpr::Fill.to_string(), "1fr");
    }

    #[test]
    fn percent_resolves_against_dynamic_space() {
        let half = Unit::pct(50);
        assert_eq!(half.to_pixels(Decimal::from(500), Decimal::from(10)), Decimal::from(245));
        assert_eq!(
            Unit::px(245).to_fraction(Decimal::from(500), Decimal::from(10)),
            dec("0.5")
        );
        assert_eq!(
            SizeExpr::Fill.to_pixels(Decimal::from(500), Decimal::from(10)),
            Decimal::from(490)
        );
    }

    #[test]
    fn empty_dynamic_space_does_not_divide() {
        assert_eq!(
            Unit::px(20).to_fraction(Decimal::from(10), Decimal::from(10)),
            Decimal::ZERO
        );
        assert_eq!(
            Unit::pct(50).to_pixels(Decimal::from(10), Decimal::from(30)),
            Decimal::ZERO
        );
    }

    #[test]
    fn percent_round_trip_through_pixels_absorbs_residue() {
        let container = Decimal::from(500);
        let handles = Decimal::from(10);
        let fraction = Unit::px(255).to_fraction(container, handles);
        assert_eq!(
            Unit::Percent(fraction).to_pixels(container, handles),
            Decimal::from(255)
        );
    }

    #[test]
    fn serde_keeps_decimals_as_strings() {
        let json = serde_json::to_string(&Unit::px(245)).expect("serialize");
        assert_eq!(json, r#"{"type":"pixel","value":"245"}"#);
        let back: Unit = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, Unit::px(245));

        let fill = serde_json::to_string(&SizeExpr::Fill).expect("serialize");
        assert_eq!(fill, r#""1fr""#);
    }

    proptest! {
        #[test]
        fn pixel_literal_round_trips(mantissa in 0i64..10_000_000, scale in 0u32..6) {
            let unit = Unit::Pixel(Decimal::new(mantissa, scale));
            prop_assert_eq!(Unit::parse(&unit.to_string()), Ok(unit));
        }

        #[test]
        fn percent_literal_round_trips(mantissa in 0i64..10_000_000, scale in 0u32..8) {
            let unit = Unit::Percent(Decimal::new(mantissa, scale));
            prop_assert_eq!(Unit::parse(&unit.to_string()), Ok(unit));
        }
    }
}
