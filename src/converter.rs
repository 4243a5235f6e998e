//! Length unit converter.
//!
//! Conversions are phrased as `"<value> <from> to <to>"` and handed to
//! fend, which knows the units and their relationships. Results are shown
//! rounded to [`SIGNIFICANT_DIGITS`] significant digits.

use crate::error::ConversionError;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

/// Display form of a failed conversion.
pub const CONVERSION_ERROR_DISPLAY: &str = "Conversion error";

/// Precision of a displayed conversion.
pub const SIGNIFICANT_DIGITS: i32 = 2;

const APPROX_PREFIX: &str = "approx. ";

lazy_static! {
    /// A decimal number, optionally negative, with an optional exponent.
    static ref NUMERIC_VALUE: Regex =
        Regex::new(r"^-?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").unwrap();
}

/// Length units offered by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    Kilometer,
    Meter,
    Centimeter,
    Millimeter,
    Micrometer,
    Nanometer,
    Mile,
    Yard,
    Foot,
    Inch,
}

impl LengthUnit {
    pub const ALL: [LengthUnit; 10] = [
        LengthUnit::Kilometer,
        LengthUnit::Meter,
        LengthUnit::Centimeter,
        LengthUnit::Millimeter,
        LengthUnit::Micrometer,
        LengthUnit::Nanometer,
        LengthUnit::Mile,
        LengthUnit::Yard,
        LengthUnit::Foot,
        LengthUnit::Inch,
    ];

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Kilometer => "Kilometer",
            Self::Meter => "Meter",
            Self::Centimeter => "Centimeter",
            Self::Millimeter => "Millimeter",
            Self::Micrometer => "Micrometer",
            Self::Nanometer => "Nanometer",
            Self::Mile => "Mile",
            Self::Yard => "Yard",
            Self::Foot => "Foot",
            Self::Inch => "Inch",
        }
    }

    /// Name understood by the conversion engine.
    pub fn engine_name(self) -> &'static str {
        match self {
            Self::Kilometer => "km",
            Self::Meter => "m",
            Self::Centimeter => "cm",
            Self::Millimeter => "mm",
            Self::Micrometer => "micrometer",
            Self::Nanometer => "nanometer",
            Self::Mile => "mile",
            Self::Yard => "yard",
            Self::Foot => "foot",
            Self::Inch => "inch",
        }
    }

    /// Parse a unit from its label or engine name, case-insensitively.
    pub fn parse(name: &str) -> Result<Self, ConversionError> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|unit| {
                unit.label().eq_ignore_ascii_case(name)
                    || unit.engine_name().eq_ignore_ascii_case(name)
            })
            .ok_or_else(|| ConversionError::UnknownUnit(name.to_string()))
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Converter screen state: a value and two unit choices.
///
/// The conversion is recomputed whenever an input changes, and only once
/// the value is non-empty and both units are chosen.
#[derive(Debug, Clone, Default)]
pub struct UnitConverter {
    value: String,
    from: Option<LengthUnit>,
    to: Option<LengthUnit>,
    expression: Option<String>,
    result: Option<Result<String, ConversionError>>,
}

impl UnitConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.recompute();
    }

    pub fn set_from(&mut self, unit: LengthUnit) {
        self.from = Some(unit);
        self.recompute();
    }

    pub fn set_to(&mut self, unit: LengthUnit) {
        self.to = Some(unit);
        self.recompute();
    }

    /// Exchange source and target units. Does nothing until both are chosen.
    pub fn swap(&mut self) {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            self.from = Some(to);
            self.to = Some(from);
            self.recompute();
        }
    }

    pub fn source_unit(&self) -> Option<LengthUnit> {
        self.from
    }

    pub fn target_unit(&self) -> Option<LengthUnit> {
        self.to
    }

    /// The expression of the last conversion attempt.
    pub fn expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }

    pub fn result(&self) -> Option<&Result<String, ConversionError>> {
        self.result.as_ref()
    }

    /// The result as shown to the user; empty until a conversion ran.
    pub fn display(&self) -> &str {
        match &self.result {
            None => "",
            Some(Ok(value)) => value,
            Some(Err(_)) => CONVERSION_ERROR_DISPLAY,
        }
    }

    fn recompute(&mut self) {
        let (Some(from), Some(to)) = (self.from, self.to) else {
            return;
        };
        if self.value.trim().is_empty() {
            return;
        }

        let expression = conversion_expression(&self.value, from, to);
        let result = convert(&self.value, from, to);
        if let Err(err) = &result {
            tracing::debug!(%expression, error = %err, "conversion failed");
        }

        self.expression = Some(expression);
        self.result = Some(result);
    }
}

fn conversion_expression(value: &str, from: LengthUnit, to: LengthUnit) -> String {
    format!("{} {} to {}", value.trim(), from.engine_name(), to.engine_name())
}

/// Convert `value` from one unit to another.
pub fn convert(value: &str, from: LengthUnit, to: LengthUnit) -> Result<String, ConversionError> {
    let value = value.trim();
    if !NUMERIC_VALUE.is_match(value) {
        return Err(ConversionError::InvalidValue(value.to_string()));
    }

    let expression = conversion_expression(value, from, to);
    let mut context = fend_core::Context::new();
    let result =
        fend_core::evaluate(&expression, &mut context).map_err(ConversionError::Engine)?;

    Ok(round_result(result.get_main_result()))
}

/// Drop fend's `approx.` marker and round the amount, keeping the unit.
fn round_result(raw: &str) -> String {
    let exact = raw.strip_prefix(APPROX_PREFIX).unwrap_or(raw);
    let Some((amount, unit)) = exact.split_once(' ') else {
        return exact.to_string();
    };

    match amount.parse::<f64>() {
        Ok(amount) => format!("{} {}", round_significant(amount, SIGNIFICANT_DIGITS), unit),
        Err(_) => {
            tracing::trace!(raw, "conversion result kept unrounded");
            exact.to_string()
        }
    }
}

fn round_significant(value: f64, digits: i32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }

    let magnitude = value.abs().log10().floor() as i32;
    let factor = 10f64.powi(digits - 1 - magnitude);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(LengthUnit::parse("km"), Ok(LengthUnit::Kilometer));
        assert_eq!(LengthUnit::parse("Inch"), Ok(LengthUnit::Inch));
        assert_eq!(LengthUnit::parse("FOOT"), Ok(LengthUnit::Foot));
        assert!(matches!(LengthUnit::parse("parsec"), Err(ConversionError::UnknownUnit(_))));
    }

    #[test]
    fn test_convert_kilometers_to_meters() {
        let result = convert("1", LengthUnit::Kilometer, LengthUnit::Meter).unwrap();
        assert!(result.contains("1000"), "unexpected result {result}");
    }

    #[test]
    fn test_convert_inch_to_centimeters() {
        let result = convert("1", LengthUnit::Inch, LengthUnit::Centimeter).unwrap();
        assert_eq!(result, "2.5 cm");
    }

    #[test]
    fn test_inexact_result_is_rounded_without_marker() {
        let result = convert("1", LengthUnit::Meter, LengthUnit::Inch).unwrap();
        assert!(!result.starts_with("approx"), "unexpected result {result}");
        assert!(result.starts_with("39 "), "unexpected result {result}");

        let result = convert("2", LengthUnit::Foot, LengthUnit::Yard).unwrap();
        assert!(result.starts_with("0.67 "), "unexpected result {result}");
    }

    #[test]
    fn test_accepts_exponent_values() {
        assert_eq!(convert("1e3", LengthUnit::Meter, LengthUnit::Kilometer).unwrap(), "1 km");
        assert!(NUMERIC_VALUE.is_match("-2.5E-3"));
        assert!(!NUMERIC_VALUE.is_match("1e"));
    }

    #[test]
    fn test_round_result() {
        assert_eq!(round_result("approx. 1.6093440001 km"), "1.6 km");
        assert_eq!(round_result("1000 m"), "1000 m");
        assert_eq!(round_result("0.03 m"), "0.03 m");
        assert_eq!(round_result("3"), "3");
    }

    #[test]
    fn test_rejects_non_numeric_value() {
        assert_eq!(
            convert("abc", LengthUnit::Meter, LengthUnit::Foot),
            Err(ConversionError::InvalidValue("abc".to_string()))
        );
        assert!(convert("1 + 1", LengthUnit::Meter, LengthUnit::Foot).is_err());
    }

    #[test]
    fn test_waits_for_both_units() {
        let mut converter = UnitConverter::new();
        converter.set_value("5");
        assert_eq!(converter.result(), None);

        converter.set_from(LengthUnit::Kilometer);
        assert_eq!(converter.expression(), None);
        assert_eq!(converter.display(), "");

        converter.set_to(LengthUnit::Meter);
        assert_eq!(converter.expression(), Some("5 km to m"));
        assert!(converter.display().contains("5000"));
    }

    #[test]
    fn test_swap_recomputes() {
        let mut converter = UnitConverter::new();
        converter.set_from(LengthUnit::Meter);
        converter.set_to(LengthUnit::Centimeter);
        converter.set_value("3");
        assert_eq!(converter.expression(), Some("3 m to cm"));

        converter.swap();
        assert_eq!(converter.source_unit(), Some(LengthUnit::Centimeter));
        assert_eq!(converter.target_unit(), Some(LengthUnit::Meter));
        assert_eq!(converter.expression(), Some("3 cm to m"));
        assert!(converter.display().contains("0.03"));
    }

    #[test]
    fn test_swap_needs_both_units() {
        let mut converter = UnitConverter::new();
        converter.set_from(LengthUnit::Mile);
        converter.swap();
        assert_eq!(converter.source_unit(), Some(LengthUnit::Mile));
        assert_eq!(converter.target_unit(), None);
    }

    #[test]
    fn test_failure_display() {
        let mut converter = UnitConverter::new();
        converter.set_from(LengthUnit::Yard);
        converter.set_to(LengthUnit::Foot);
        converter.set_value("twelve");
        assert_eq!(converter.display(), "Conversion error");
        assert_eq!(converter.expression(), Some("twelve yard to foot"));
    }
}
