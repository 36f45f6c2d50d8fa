//! Conversion of base-unit readings into display units.
//!
//! Every function takes a value in the quantity's base unit and a target unit
//! identifier. Unknown identifiers never fail: the base value is echoed back,
//! rounded at the quantity's precision.

use log::debug;

use crate::units::{
    lookup_factor, Quantity, CELSIUS, DEGREES, FAHRENHEIT, KELVIN, RADIANS, RANKINE,
};

/// Outcome of a conversion. `Fallback` carries the base value when the target
/// unit was not recognised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conversion {
    Converted(f64),
    Fallback(f64),
}

impl Conversion {
    pub fn value(self) -> f64 {
        match self {
            Conversion::Converted(v) | Conversion::Fallback(v) => v,
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, Conversion::Fallback(_))
    }
}

/// Round half away from zero to `decimals` places. Negative zero collapses to zero.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor + 0.0
}

/// Round to `digits` significant digits, ties away from zero.
pub fn round_significant(value: f64, digits: u32) -> f64 {
    if !value.is_finite() || value == 0.0 || digits == 0 {
        return value;
    }
    let magnitude = value.abs().log10().floor() as i32;
    let shift = digits as i32 - 1 - magnitude;
    if shift >= 0 {
        let factor = 10f64.powi(shift);
        (value * factor).round() / factor + 0.0
    } else {
        // dividing keeps whole-number scales exact
        let factor = 10f64.powi(-shift);
        (value / factor).round() * factor + 0.0
    }
}

/// Convert `value` (in the quantity's base unit) to `unit`.
pub fn convert(quantity: Quantity, value: f64, unit: &str) -> Conversion {
    let conversion = match quantity {
        Quantity::Temperature => temperature(value, unit),
        Quantity::Angle => angle(value, unit),
        _ => linear(quantity, value, unit),
    };
    if conversion.is_fallback() {
        debug!("Unknown {quantity} unit {unit:?}; keeping base value");
    }
    conversion
}

fn temperature(fahrenheit: f64, unit: &str) -> Conversion {
    let precision = Quantity::Temperature.precision();
    let celsius = (fahrenheit - 32.0) * 5.0 / 9.0;
    let converted = match unit {
        FAHRENHEIT => fahrenheit,
        CELSIUS => celsius,
        KELVIN => celsius + 273.15,
        RANKINE => fahrenheit + 459.67,
        _ => return Conversion::Fallback(round_to(fahrenheit, precision)),
    };
    Conversion::Converted(round_to(converted, precision))
}

fn angle(degrees: f64, unit: &str) -> Conversion {
    match unit {
        RADIANS => Conversion::Converted(round_to(
            degrees.to_radians(),
            Quantity::Angle.precision(),
        )),
        DEGREES => Conversion::Converted(degrees),
        _ => Conversion::Fallback(degrees),
    }
}

fn linear(quantity: Quantity, value: f64, unit: &str) -> Conversion {
    let precision = quantity.precision();
    match lookup_factor(quantity, unit) {
        Some(factor) => Conversion::Converted(round_to(value * factor, precision)),
        None if unit == quantity.base_unit() => Conversion::Converted(round_to(value, precision)),
        None => Conversion::Fallback(round_to(value, precision)),
    }
}

pub fn convert_temperature(fahrenheit: f64, unit: &str) -> f64 {
    convert(Quantity::Temperature, fahrenheit, unit).value()
}

pub fn convert_distance(inches: f64, unit: &str) -> f64 {
    convert(Quantity::Distance, inches, unit).value()
}

pub fn convert_speed(mph: f64, unit: &str) -> f64 {
    convert(Quantity::Speed, mph, unit).value()
}

pub fn convert_pressure(in_hg: f64, unit: &str) -> f64 {
    convert(Quantity::Pressure, in_hg, unit).value()
}

/// `decibel_milliwatts` is a fixed x120 scale, not a logarithmic dBm value.
pub fn convert_power(watts_per_sq_m: f64, unit: &str) -> f64 {
    convert(Quantity::Power, watts_per_sq_m, unit).value()
}

/// Stations sometimes omit wind direction; a missing angle reads as 0.
pub fn convert_angle(degrees: Option<f64>, unit: &str) -> f64 {
    convert(Quantity::Angle, degrees.unwrap_or(0.0), unit).value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn temperature_is_affine() {
        assert_eq!(convert_temperature(32.0, "celsius"), 0.0);
        assert_eq!(convert_temperature(212.0, "celsius"), 100.0);
        assert_eq!(convert_temperature(0.0, "kelvin"), 255.4);
        assert_eq!(convert_temperature(0.0, "rankine"), 459.7);
        assert_eq!(convert_temperature(68.04, "fahrenheit"), 68.0);
        assert_eq!(convert_temperature(-40.0, "celsius"), -40.0);
    }

    #[test]
    fn linear_quantities_use_table_factors() {
        assert_eq!(convert_distance(1.0, "meters"), 0.03);
        assert_eq!(convert_distance(1.0, "millimeters"), 25.4);
        assert_eq!(convert_distance(24.0, "feet"), 2.0);
        assert_eq!(convert_speed(10.0, "kilometers_per_hour"), 16.1);
        assert_eq!(convert_speed(10.0, "meters_per_second"), 4.5);
        assert_eq!(convert_pressure(29.92, "hectopascals"), 1013.21);
        assert_eq!(convert_pressure(29.92, "millimeters_of_mercury"), 759.97);
        assert_eq!(convert_power(500.0, "kilowatt"), 0.5);
    }

    #[test]
    fn decibel_milliwatts_keeps_fixed_scale() {
        assert_eq!(convert_power(2.5, "decibel_milliwatts"), 300.0);
    }

    #[test]
    fn angle_handles_missing_direction() {
        assert_eq!(convert_angle(None, "radians"), 0.0);
        assert_eq!(convert_angle(None, "degrees"), 0.0);
        assert_eq!(convert_angle(Some(180.0), "radians"), 3.14159);
        assert_eq!(convert_angle(Some(271.5), "degrees"), 271.5);
    }

    #[test]
    fn unknown_units_echo_base_value() {
        assert_eq!(convert_pressure(29.92, "furlongs"), 29.92);
        assert_eq!(convert_temperature(71.26, "parsecs"), 71.3);
        assert_eq!(convert_speed(12.34, ""), 12.3);
        assert!(convert(Quantity::Distance, 1.0, "furlongs").is_fallback());
        assert!(!convert(Quantity::Distance, 1.0, "inches").is_fallback());
        assert_eq!(
            convert(Quantity::Angle, 90.0, "gradians"),
            Conversion::Fallback(90.0)
        );
    }

    #[test]
    fn base_unit_is_identity_within_rounding() {
        let samples = [0.0, 1.234, 29.92, 68.0, -12.5, 1013.0];
        for quantity in Quantity::iter() {
            let precision = quantity.precision();
            for value in samples {
                let converted = convert(quantity, value, quantity.base_unit()).value();
                let tolerance = 0.5 * 10f64.powi(-(precision as i32)) + 1e-9;
                assert!((converted - value).abs() <= tolerance, "{quantity} {value}");
            }
        }
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_to(2.25, 1), 2.3);
        assert_eq!(round_to(-2.25, 1), -2.3);
        assert_eq!(round_to(68.0, 1), 68.0);
        assert_eq!(round_to(68.0, 1).to_string(), "68");
        assert!(round_to(-0.001, 2).is_sign_positive());
    }

    #[test]
    fn significant_rounding_tracks_magnitude() {
        assert_eq!(round_significant(48.6577, 3), 48.7);
        assert_eq!(round_significant(-3.14159, 3), -3.14);
        assert_eq!(round_significant(123.456, 3), 123.0);
        assert_eq!(round_significant(0.012345, 3), 0.0123);
        assert!(round_significant(f64::NAN, 3).is_nan());
        assert_eq!(round_significant(123456.0, 3), 123000.0);
    }

    #[test]
    fn significant_rounding_breaks_ties_away_from_zero() {
        assert_eq!(round_significant(100.5, 3), 101.0);
        assert_eq!(round_significant(-12.25, 3), -12.3);
        assert_eq!(round_significant(1.125, 3), 1.13);
        assert_eq!(round_significant(-0.0625, 1), -0.06);
    }

    #[test]
    fn conversions_are_repeatable() {
        for quantity in Quantity::iter() {
            for unit in quantity.units() {
                let first = convert(quantity, 42.42, unit);
                let second = convert(quantity, 42.42, unit);
                assert_eq!(first, second, "{quantity} {unit}");
            }
        }
    }
}
