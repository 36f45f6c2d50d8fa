//! Per-quantity display unit selection, persisted as a JSON blob.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::range::{validate_range, DateRange, RangeError};
use crate::store::{BlobStore, StoreError};
use crate::units::{
    Quantity, DEGREES, FAHRENHEIT, INCHES, INCHES_OF_MERCURY, MILES_PER_HOUR, WATT,
};

pub const PREFERENCES_KEY: &str = "userPreferences";

/// Selected display unit for every quantity plus an optional history range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreferenceRecord {
    pub temp: String,
    pub distance: String,
    pub speed: String,
    pub pressure: String,
    pub angle: String,
    pub power: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_end: Option<DateTime<Utc>>,
}

impl Default for PreferenceRecord {
    fn default() -> Self {
        PreferenceRecord {
            temp: FAHRENHEIT.to_string(),
            distance: INCHES.to_string(),
            speed: MILES_PER_HOUR.to_string(),
            pressure: INCHES_OF_MERCURY.to_string(),
            angle: DEGREES.to_string(),
            power: WATT.to_string(),
            range_start: None,
            range_end: None,
        }
    }
}

impl PreferenceRecord {
    pub fn unit_for(&self, quantity: Quantity) -> &str {
        match quantity {
            Quantity::Temperature => &self.temp,
            Quantity::Distance => &self.distance,
            Quantity::Speed => &self.speed,
            Quantity::Pressure => &self.pressure,
            Quantity::Angle => &self.angle,
            Quantity::Power => &self.power,
        }
    }

    pub fn set_unit(&mut self, quantity: Quantity, unit: impl Into<String>) {
        let slot = match quantity {
            Quantity::Temperature => &mut self.temp,
            Quantity::Distance => &mut self.distance,
            Quantity::Speed => &mut self.speed,
            Quantity::Pressure => &mut self.pressure,
            Quantity::Angle => &mut self.angle,
            Quantity::Power => &mut self.power,
        };
        *slot = unit.into();
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.range_start,
            end: self.range_end,
        }
    }

    /// Selections that no conversion table recognises for their quantity.
    /// Such values still format, they just fall back to the base unit.
    pub fn unknown_units(&self) -> Vec<(Quantity, String)> {
        use strum::IntoEnumIterator;
        Quantity::iter()
            .filter(|quantity| !quantity.supports(self.unit_for(*quantity)))
            .map(|quantity| (quantity, self.unit_for(quantity).to_string()))
            .collect()
    }

    /// Shallow merge: every field set in `patch` replaces the current value.
    pub fn merge(&mut self, patch: PreferencePatch) {
        let PreferencePatch {
            temp,
            distance,
            speed,
            pressure,
            angle,
            power,
            range_start,
            range_end,
        } = patch;
        let units = [
            (Quantity::Temperature, temp),
            (Quantity::Distance, distance),
            (Quantity::Speed, speed),
            (Quantity::Pressure, pressure),
            (Quantity::Angle, angle),
            (Quantity::Power, power),
        ];
        for (quantity, unit) in units {
            if let Some(unit) = unit {
                self.set_unit(quantity, unit);
            }
        }
        if range_start.is_some() {
            self.range_start = range_start;
        }
        if range_end.is_some() {
            self.range_end = range_end;
        }
    }
}

/// Partial preference update. Absent (or `null`) keys leave values untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_end: Option<DateTime<Utc>>,
}

impl PreferencePatch {
    pub fn unit(quantity: Quantity, unit: impl Into<String>) -> Self {
        let mut patch = PreferencePatch::default();
        patch.set_unit(quantity, unit);
        patch
    }

    pub fn set_unit(&mut self, quantity: Quantity, unit: impl Into<String>) {
        let slot = match quantity {
            Quantity::Temperature => &mut self.temp,
            Quantity::Distance => &mut self.distance,
            Quantity::Speed => &mut self.speed,
            Quantity::Pressure => &mut self.pressure,
            Quantity::Angle => &mut self.angle,
            Quantity::Power => &mut self.power,
        };
        *slot = Some(unit.into());
    }

    pub fn is_empty(&self) -> bool {
        *self == PreferencePatch::default()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    #[error("preference store: {0}")]
    Store(#[from] StoreError),
    #[error("stored preferences are not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("could not serialize preferences: {0}")]
    Encode(#[source] serde_json::Error),
    #[error(transparent)]
    Range(#[from] RangeError),
}

/// Holds the current preference record and keeps it in sync with a store.
pub struct Preferences<S: BlobStore> {
    store: S,
    record: PreferenceRecord,
}

impl<S: BlobStore> Preferences<S> {
    /// Defaults only; nothing is read from the store yet.
    pub fn new(store: S) -> Self {
        Preferences {
            store,
            record: PreferenceRecord::default(),
        }
    }

    /// Create and immediately load whatever the store holds.
    pub fn open(store: S) -> Result<Self, PrefsError> {
        let mut prefs = Preferences::new(store);
        prefs.load()?;
        Ok(prefs)
    }

    pub fn current(&self) -> &PreferenceRecord {
        &self.record
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Merge the stored snapshot over the current record, key by key. A missing
    /// snapshot leaves the record as is. Keys holding the wrong type are skipped;
    /// a blob that is not a JSON object is reported and leaves the record as is.
    pub fn load(&mut self) -> Result<&PreferenceRecord, PrefsError> {
        let Some(raw) = self.store.get(PREFERENCES_KEY)? else {
            debug!("No stored preferences; using current values");
            return Ok(&self.record);
        };
        let entries = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Null) => Ok(Map::new()),
            Ok(value) => serde_json::from_value::<Map<String, Value>>(value),
            Err(err) => Err(err),
        }
        .map_err(|err| {
            warn!("Ignoring stored preferences: {err}");
            PrefsError::Decode(err)
        })?;

        for (key, value) in entries {
            let mut single = Map::new();
            single.insert(key.clone(), value);
            match serde_json::from_value::<PreferencePatch>(Value::Object(single)) {
                Ok(patch) => self.record.merge(patch),
                Err(err) => warn!("Skipping stored preference {key:?}: {err}"),
            }
        }
        debug!("Loaded preferences: {:?}", self.record);
        Ok(&self.record)
    }

    /// Merge `patch` over the current record and persist the full snapshot.
    /// Nothing changes when the merged range would be inverted.
    pub fn save(&mut self, patch: PreferencePatch) -> Result<&PreferenceRecord, PrefsError> {
        let mut next = self.record.clone();
        next.merge(patch);
        validate_range(next.range())?;
        self.persist(next)
    }

    /// Drop the stored range start and end.
    pub fn clear_range(&mut self) -> Result<&PreferenceRecord, PrefsError> {
        let next = PreferenceRecord {
            range_start: None,
            range_end: None,
            ..self.record.clone()
        };
        self.persist(next)
    }

    fn persist(&mut self, next: PreferenceRecord) -> Result<&PreferenceRecord, PrefsError> {
        let blob = serde_json::to_string(&next).map_err(PrefsError::Encode)?;
        self.store.set(PREFERENCES_KEY, &blob)?;
        debug!("Saved preferences: {blob}");
        self.record = next;
        Ok(&self.record)
    }
}
