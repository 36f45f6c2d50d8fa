//! Station payloads and their conversion into display rows.

use serde::{Deserialize, Serialize};

use crate::convert::{convert, convert_angle};
use crate::metrics::{calculate_dew_point, uv_index, UvCategory};
use crate::prefs::PreferenceRecord;
use crate::units::{abbreviation_for, format_opt_value, Quantity, DEGREES};

/// Payload pushed by a station. Units are fixed: Fahrenheit, mph, inches,
/// inHg, W/m², degrees and percent. Any numeric field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationPayload {
    pub stationtype: Option<String>,
    #[serde(rename = "PASSKEY", skip_serializing)]
    pub passkey: Option<String>,
    pub dateutc: Option<String>,
    pub tempf: Option<f64>,
    pub humidity: Option<f64>,
    pub windspeedmph: Option<f64>,
    pub windgustmph: Option<f64>,
    pub maxdailygust: Option<f64>,
    pub winddir: Option<f64>,
    pub uv: Option<f64>,
    pub solarradiation: Option<f64>,
    pub hourlyrainin: Option<f64>,
    pub dailyrainin: Option<f64>,
    pub weeklyrainin: Option<f64>,
    pub monthlyrainin: Option<f64>,
    pub totalrainin: Option<f64>,
    pub battout: Option<f64>,
    pub tempinf: Option<f64>,
    pub humidityin: Option<f64>,
    pub baromrelin: Option<f64>,
    pub baromabsin: Option<f64>,
    pub batt_co2: Option<f64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl StationPayload {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Outdoor dew point in Fahrenheit, when both inputs are present and the
    /// humidity is usable.
    pub fn dew_point_f(&self) -> Option<f64> {
        dew_point_from(self.tempf?, self.humidity?)
    }

    pub fn indoor_dew_point_f(&self) -> Option<f64> {
        dew_point_from(self.tempinf?, self.humidityin?)
    }

    pub fn uv_category(&self) -> Option<UvCategory> {
        self.uv.map(uv_index)
    }
}

fn dew_point_from(temp_f: f64, humidity: f64) -> Option<f64> {
    if humidity <= 0.0 {
        return None;
    }
    Some(calculate_dew_point(temp_f, humidity, true))
}

/// One converted value ready to show.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayReading {
    pub label: &'static str,
    pub quantity: Option<Quantity>,
    pub value: Option<f64>,
    pub unit: String,
    pub text: String,
}

impl DisplayReading {
    fn converted(
        label: &'static str,
        quantity: Quantity,
        raw: Option<f64>,
        prefs: &PreferenceRecord,
    ) -> Self {
        let unit = prefs.unit_for(quantity);
        let value = raw.map(|v| convert(quantity, v, unit).value());
        DisplayReading {
            label,
            quantity: Some(quantity),
            value,
            unit: unit.to_string(),
            text: format_opt_value(value, unit),
        }
    }

    fn percent(label: &'static str, raw: Option<f64>) -> Self {
        DisplayReading {
            label,
            quantity: None,
            value: raw,
            unit: "%".to_string(),
            text: raw.map_or_else(|| "--".to_string(), |v| format!("{v}%")),
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self.quantity {
            Some(_) => abbreviation_for(&self.unit),
            None => "%",
        }
    }
}

/// Convert every reading of `payload` into the units selected in `prefs`.
pub fn display_rows(payload: &StationPayload, prefs: &PreferenceRecord) -> Vec<DisplayReading> {
    use Quantity::*;

    let mut rows = vec![
        DisplayReading::converted("Temperature", Temperature, payload.tempf, prefs),
        DisplayReading::percent("Humidity", payload.humidity),
        DisplayReading::converted("Dew point", Temperature, payload.dew_point_f(), prefs),
        DisplayReading::converted("Indoor temperature", Temperature, payload.tempinf, prefs),
        DisplayReading::percent("Indoor humidity", payload.humidityin),
        DisplayReading::converted(
            "Indoor dew point",
            Temperature,
            payload.indoor_dew_point_f(),
            prefs,
        ),
        DisplayReading::converted("Wind speed", Speed, payload.windspeedmph, prefs),
        DisplayReading::converted("Wind gust", Speed, payload.windgustmph, prefs),
        DisplayReading::converted("Max daily gust", Speed, payload.maxdailygust, prefs),
        wind_direction(payload.winddir, prefs),
        DisplayReading::converted("Pressure (relative)", Pressure, payload.baromrelin, prefs),
        DisplayReading::converted("Pressure (absolute)", Pressure, payload.baromabsin, prefs),
        DisplayReading::converted("Rain (hourly)", Distance, payload.hourlyrainin, prefs),
        DisplayReading::converted("Rain (daily)", Distance, payload.dailyrainin, prefs),
        DisplayReading::converted("Rain (weekly)", Distance, payload.weeklyrainin, prefs),
        DisplayReading::converted("Rain (monthly)", Distance, payload.monthlyrainin, prefs),
        DisplayReading::converted("Rain (total)", Distance, payload.totalrainin, prefs),
        DisplayReading::converted("Solar radiation", Power, payload.solarradiation, prefs),
    ];
    rows.push(uv_row(payload.uv));
    rows
}

fn wind_direction(raw: Option<f64>, prefs: &PreferenceRecord) -> DisplayReading {
    let unit = prefs.unit_for(Quantity::Angle);
    let value = convert_angle(raw, unit);
    let text = match (raw, unit) {
        (Some(deg), DEGREES) => format!("{value}° {}", compass_point(deg)),
        _ => format_opt_value(Some(value), unit),
    };
    DisplayReading {
        label: "Wind direction",
        quantity: Some(Quantity::Angle),
        value: Some(value),
        unit: unit.to_string(),
        text,
    }
}

fn uv_row(raw: Option<f64>) -> DisplayReading {
    DisplayReading {
        label: "UV index",
        quantity: None,
        value: raw,
        unit: String::new(),
        text: match raw {
            Some(v) => format!("{v} ({})", uv_index(v)),
            None => "--".to_string(),
        },
    }
}

/// Sixteen-point compass name for a bearing in degrees.
pub fn compass_point(degrees: f64) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized / 22.5).round() as usize) % POINTS.len();
    POINTS[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::PreferencePatch;
    use serde_json::json;

    fn payload() -> StationPayload {
        let raw = json!({
            "stationtype": "EasyWeatherPro_V5.1.1",
            "PASSKEY": "ABC123",
            "dateutc": "2024-06-01 12:00:00",
            "tempf": 68.0,
            "humidity": 50,
            "windspeedmph": 10.0,
            "windgustmph": 15.2,
            "maxdailygust": 22.4,
            "uv": 6,
            "solarradiation": 512.34,
            "dailyrainin": 1.0,
            "baromrelin": 29.92,
            "baromabsin": 29.5,
            "tempinf": 72.5,
            "humidityin": 40
        });
        serde_json::from_value(raw).unwrap()
    }

    fn row<'a>(rows: &'a [DisplayReading], label: &str) -> &'a DisplayReading {
        rows.iter().find(|r| r.label == label).unwrap()
    }

    #[test]
    fn payload_parses_with_missing_fields() {
        let parsed = StationPayload::from_json(r#"{"tempf": 50.5, "winddir": null}"#).unwrap();
        assert_eq!(parsed.tempf, Some(50.5));
        assert_eq!(parsed.winddir, None);
        assert_eq!(parsed.dew_point_f(), None);
        assert_eq!(payload().passkey.as_deref(), Some("ABC123"));
    }

    #[test]
    fn passkey_is_not_serialized() {
        let text = serde_json::to_string(&payload()).unwrap();
        assert!(!text.contains("ABC123"));
    }

    #[test]
    fn default_preferences_keep_base_units() {
        let rows = display_rows(&payload(), &PreferenceRecord::default());
        assert_eq!(row(&rows, "Temperature").text, "68°F");
        assert_eq!(row(&rows, "Dew point").value, Some(48.7));
        assert_eq!(row(&rows, "Pressure (relative)").text, "29.92 inHg");
        assert_eq!(row(&rows, "Solar radiation").text, "512.34 W/m²");
        assert_eq!(row(&rows, "Humidity").text, "50%");
        assert_eq!(row(&rows, "Rain (hourly)").text, "--");
    }

    #[test]
    fn metric_preferences_convert_every_row() {
        let mut prefs = PreferenceRecord::default();
        prefs.merge(PreferencePatch {
            temp: Some("celsius".into()),
            speed: Some("kilometers_per_hour".into()),
            pressure: Some("hectopascals".into()),
            distance: Some("millimeters".into()),
            angle: Some("radians".into()),
            ..PreferencePatch::default()
        });
        let rows = display_rows(&payload(), &prefs);
        assert_eq!(row(&rows, "Temperature").text, "20°C");
        assert_eq!(row(&rows, "Wind speed").text, "16.1 km/h");
        assert_eq!(row(&rows, "Pressure (relative)").text, "1013.21 hPa");
        assert_eq!(row(&rows, "Rain (daily)").text, "25.4 mm");
        assert_eq!(row(&rows, "Dew point").abbreviation(), "°C");
        assert_eq!(row(&rows, "Wind direction").value, Some(0.0));
    }

    #[test]
    fn wind_direction_shows_compass_point() {
        let mut reading = payload();
        reading.winddir = Some(225.0);
        let rows = display_rows(&reading, &PreferenceRecord::default());
        assert_eq!(row(&rows, "Wind direction").text, "225° SW");
    }

    #[test]
    fn uv_row_carries_category() {
        let rows = display_rows(&payload(), &PreferenceRecord::default());
        assert_eq!(row(&rows, "UV index").text, "6 (High)");
        assert_eq!(payload().uv_category(), Some(UvCategory::High));
    }

    #[test]
    fn dew_point_is_skipped_without_humidity() {
        let mut reading = payload();
        reading.humidity = Some(0.0);
        assert_eq!(reading.dew_point_f(), None);
    }

    #[test]
    fn compass_points_wrap() {
        assert_eq!(compass_point(0.0), "N");
        assert_eq!(compass_point(359.0), "N");
        assert_eq!(compass_point(90.0), "E");
        assert_eq!(compass_point(-90.0), "W");
    }
}
