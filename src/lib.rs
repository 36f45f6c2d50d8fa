pub mod cli;
pub mod convert;
pub mod metrics;
pub mod prefs;
pub mod range;
pub mod reading;
pub mod store;
pub mod units;

pub use convert::{
    convert, convert_angle, convert_distance, convert_power, convert_pressure, convert_speed,
    convert_temperature, Conversion,
};
pub use metrics::{calculate_dew_point, get_uv_index, uv_index, UvCategory};
pub use prefs::{PreferencePatch, PreferenceRecord, Preferences, PrefsError};
pub use range::{build_range, DateRange, RangeError};
pub use reading::{display_rows, DisplayReading, StationPayload};
pub use store::{BlobStore, MemoryStore, SqliteStore, StoreError};
pub use units::{abbreviation_for, factor_for, Quantity};
