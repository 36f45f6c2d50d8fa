//! Metrics derived from raw station readings.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

use crate::convert::round_significant;

const MAGNUS_A: f64 = 17.27;
const MAGNUS_B_CELSIUS: f64 = 237.7;

fn fahrenheit_to_celsius(value: f64) -> f64 {
    (value - 32.0) * 5.0 / 9.0
}

fn celsius_to_fahrenheit(value: f64) -> f64 {
    value * 9.0 / 5.0 + 32.0
}

/// Dew point from temperature and relative humidity (percent, 67% is `67.0`)
/// using the Magnus approximation.
///
/// When `is_fahrenheit` is set the input is taken as Fahrenheit and the result
/// is returned in Fahrenheit, otherwise both are Celsius. The result keeps
/// three significant digits. Humidity must be above zero; otherwise the
/// logarithm yields a non-finite result which is returned unchanged.
pub fn calculate_dew_point(temp: f64, humidity: f64, is_fahrenheit: bool) -> f64 {
    let temp_c = if is_fahrenheit {
        fahrenheit_to_celsius(temp)
    } else {
        temp
    };

    let alpha = (MAGNUS_A * temp_c) / (MAGNUS_B_CELSIUS + temp_c) + (humidity / 100.0).ln();
    let dew_point_c = (MAGNUS_B_CELSIUS * alpha) / (MAGNUS_A - alpha);

    let dew_point = if is_fahrenheit {
        celsius_to_fahrenheit(dew_point_c)
    } else {
        dew_point_c
    };
    round_significant(dew_point, 3)
}

/// Exposure band of a UV index reading. Upper bounds are inclusive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, AsRefStr,
)]
pub enum UvCategory {
    #[strum(serialize = "Invalid UV index")]
    Invalid,
    #[strum(serialize = "Low")]
    Low,
    #[strum(serialize = "Moderate")]
    Moderate,
    #[strum(serialize = "High")]
    High,
    #[strum(serialize = "Very High")]
    VeryHigh,
    #[strum(serialize = "Extreme")]
    Extreme,
}

pub fn uv_index(value: f64) -> UvCategory {
    if value < 0.0 {
        UvCategory::Invalid
    } else if value <= 2.0 {
        UvCategory::Low
    } else if value <= 5.0 {
        UvCategory::Moderate
    } else if value <= 7.0 {
        UvCategory::High
    } else if value <= 10.0 {
        UvCategory::VeryHigh
    } else {
        UvCategory::Extreme
    }
}

/// Label of the UV band, e.g. `"Very High"`.
pub fn get_uv_index(value: f64) -> &'static str {
    uv_label(uv_index(value))
}

fn uv_label(category: UvCategory) -> &'static str {
    match category {
        UvCategory::Invalid => "Invalid UV index",
        UvCategory::Low => "Low",
        UvCategory::Moderate => "Moderate",
        UvCategory::High => "High",
        UvCategory::VeryHigh => "Very High",
        UvCategory::Extreme => "Extreme",
    }
}
