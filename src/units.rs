//! Unit tables and display glyphs for every quantity a station reports.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Physical dimension of a reading. Each one arrives in a fixed base unit.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Quantity {
    Temperature,
    Distance,
    Speed,
    Pressure,
    Angle,
    Power,
}

impl Quantity {
    /// Identifier of the unit raw readings are expressed in.
    pub fn base_unit(self) -> &'static str {
        match self {
            Quantity::Temperature => FAHRENHEIT,
            Quantity::Distance => INCHES,
            Quantity::Speed => MILES_PER_HOUR,
            Quantity::Pressure => INCHES_OF_MERCURY,
            Quantity::Angle => DEGREES,
            Quantity::Power => WATT,
        }
    }

    /// Decimal places used when rounding a converted value.
    pub fn precision(self) -> u32 {
        match self {
            Quantity::Temperature | Quantity::Speed => 1,
            Quantity::Distance | Quantity::Pressure | Quantity::Power => 2,
            Quantity::Angle => 5,
        }
    }

    /// Linear factors for the non-base units. Temperature is affine and has none.
    pub fn table(self) -> ConversionTable {
        match self {
            Quantity::Temperature => &[],
            Quantity::Distance => DISTANCE_FACTORS,
            Quantity::Speed => SPEED_FACTORS,
            Quantity::Pressure => PRESSURE_FACTORS,
            Quantity::Angle => ANGLE_FACTORS,
            Quantity::Power => POWER_FACTORS,
        }
    }

    /// Every identifier valid for this quantity, base unit first.
    pub fn units(self) -> Vec<&'static str> {
        let mut ids = vec![self.base_unit()];
        match self {
            Quantity::Temperature => ids.extend(TEMPERATURE_UNITS),
            _ => ids.extend(self.table().iter().map(|(id, _)| *id)),
        }
        ids
    }

    /// Find the quantity owning a unit identifier.
    pub fn of_unit(unit: &str) -> Option<Self> {
        Quantity::iter().find(|quantity| quantity.supports(unit))
    }

    pub fn supports(self, unit: &str) -> bool {
        self.units().iter().any(|id| *id == unit)
    }
}

pub type ConversionTable = &'static [(&'static str, f64)];

pub const FAHRENHEIT: &str = "fahrenheit";
pub const CELSIUS: &str = "celsius";
pub const KELVIN: &str = "kelvin";
pub const RANKINE: &str = "rankine";

pub const INCHES: &str = "inches";
pub const MILES_PER_HOUR: &str = "miles_per_hour";
pub const INCHES_OF_MERCURY: &str = "inches_of_mercury";
pub const DEGREES: &str = "degrees";
pub const RADIANS: &str = "radians";
pub const WATT: &str = "watt";

/// Sentinel glyph for identifiers with no known abbreviation.
pub const UNKNOWN_ABBREVIATION: &str = "ERR";

const TEMPERATURE_UNITS: [&str; 3] = [CELSIUS, KELVIN, RANKINE];

const DISTANCE_FACTORS: ConversionTable = &[
    ("feet", 1.0 / 12.0),
    ("millimeters", 25.4),
    ("centimeters", 2.54),
    ("meters", 0.0254),
];

const SPEED_FACTORS: ConversionTable = &[
    ("kilometers_per_hour", 1.609344),
    ("meters_per_second", 0.44704),
    ("knots", 0.868976),
    ("feet_per_second", 1.466667),
];

const PRESSURE_FACTORS: ConversionTable = &[
    ("hectopascals", 33.8639),
    ("millibars", 33.8639),
    ("kilopascals", 3.38639),
    ("pascals", 3386.39),
    ("millimeters_of_mercury", 25.4),
    ("pounds_per_square_inch", 0.491154),
    ("atmospheres", 0.0334211),
];

const ANGLE_FACTORS: ConversionTable = &[(RADIANS, std::f64::consts::PI / 180.0)];

// decibel_milliwatts is not a real dBm conversion of an irradiance. Existing
// dashboards read the x120 figure, so it stays as is.
const POWER_FACTORS: ConversionTable = &[("kilowatt", 0.001), ("decibel_milliwatts", 120.0)];

const ABBREVIATIONS: &[(&str, &str)] = &[
    (FAHRENHEIT, "°F"),
    (CELSIUS, "°C"),
    (KELVIN, "K"),
    (RANKINE, "°R"),
    (INCHES, "in"),
    ("feet", "ft"),
    ("millimeters", "mm"),
    ("centimeters", "cm"),
    ("meters", "m"),
    (MILES_PER_HOUR, "mph"),
    ("kilometers_per_hour", "km/h"),
    ("meters_per_second", "m/s"),
    ("knots", "kn"),
    ("feet_per_second", "ft/s"),
    (INCHES_OF_MERCURY, "inHg"),
    ("hectopascals", "hPa"),
    ("millibars", "mbar"),
    ("kilopascals", "kPa"),
    ("pascals", "Pa"),
    ("millimeters_of_mercury", "mmHg"),
    ("pounds_per_square_inch", "psi"),
    ("atmospheres", "atm"),
    (DEGREES, "°"),
    (RADIANS, "rad"),
    (WATT, "W/m²"),
    ("kilowatt", "kW/m²"),
    ("decibel_milliwatts", "dBm"),
];

/// Factor for `unit` within `quantity`, or `None` when the unit is unknown
/// there. The base unit is never in its own table.
pub fn lookup_factor(quantity: Quantity, unit: &str) -> Option<f64> {
    quantity
        .table()
        .iter()
        .find(|(id, _)| *id == unit)
        .map(|(_, factor)| *factor)
}

/// Factor for `unit`, falling back to identity for the base unit and for
/// anything unrecognised.
pub fn factor_for(quantity: Quantity, unit: &str) -> f64 {
    lookup_factor(quantity, unit).unwrap_or(1.0)
}

/// Display glyph for a unit identifier, `"ERR"` when unknown.
pub fn abbreviation_for(unit: &str) -> &'static str {
    ABBREVIATIONS
        .iter()
        .find(|(id, _)| *id == unit)
        .map(|(_, glyph)| *glyph)
        .unwrap_or(UNKNOWN_ABBREVIATION)
}

/// Format a converted value followed by its unit glyph.
pub fn format_value(value: f64, unit: &str) -> String {
    match abbreviation_for(unit) {
        glyph if glyph.starts_with('°') => format!("{value}{glyph}"),
        glyph => format!("{value} {glyph}"),
    }
}

/// Format an optional value, `--` when the reading is missing.
pub fn format_opt_value(value: Option<f64>, unit: &str) -> String {
    value
        .map(|v| format_value(v, unit))
        .unwrap_or_else(|| "--".to_string())
}
