use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use log::{debug, warn};
use strum::IntoEnumIterator;

use crate::convert::convert;
use crate::metrics::{calculate_dew_point, uv_index, UvCategory};
use crate::prefs::{PreferencePatch, PreferenceRecord, Preferences};
use crate::range::parse_instant;
use crate::reading::{display_rows, DisplayReading, StationPayload};
use crate::store::{resolve_db_path, SqliteStore};
use crate::units::{abbreviation_for, format_value, lookup_factor, Quantity};

#[derive(Parser)]
#[command(name = "station-units", version)]
#[command(about = "Weather station unit conversion and derived metrics")]
pub struct Cli {
    /// Path to the preferences database (or set STATION_UNITS_DB)
    #[arg(long = "db", global = true)]
    pub db_path: Option<PathBuf>,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a base-unit value to another unit
    Convert {
        /// Quantity of the value (temperature, distance, speed, pressure, angle, power)
        quantity: Quantity,
        /// Value in the quantity's base unit
        #[arg(allow_negative_numbers = true)]
        value: f64,
        /// Target unit identifier; defaults to the saved preference
        unit: Option<String>,
        /// Print the number only, without the unit glyph
        #[arg(long)]
        plain: bool,
    },
    /// List known units and their conversion factors
    Units {
        /// Restrict the listing to one quantity
        quantity: Option<Quantity>,
    },
    /// Compute the dew point from temperature and relative humidity
    DewPoint {
        /// Air temperature (Fahrenheit unless --celsius)
        #[arg(long, allow_negative_numbers = true)]
        temp: f64,
        /// Relative humidity in percent
        #[arg(long)]
        humidity: f64,
        /// Treat the temperature (and the result) as Celsius
        #[arg(long)]
        celsius: bool,
    },
    /// Classify a UV index reading
    Uv {
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
    /// Render a station payload (JSON file) in the preferred units
    Show {
        /// Path to a JSON payload as pushed by the station
        payload: PathBuf,
        /// Emit the converted rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect or change the saved display preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
}

#[derive(Subcommand)]
pub enum PrefsAction {
    /// Print the current preferences
    Show,
    /// Change one or more preferences; unspecified ones keep their value
    Set(PrefsSetArgs),
    /// Forget the saved range start and end
    ClearRange,
}

#[derive(Args)]
pub struct PrefsSetArgs {
    #[arg(long)]
    pub temp: Option<String>,
    #[arg(long)]
    pub distance: Option<String>,
    #[arg(long)]
    pub speed: Option<String>,
    #[arg(long)]
    pub pressure: Option<String>,
    #[arg(long)]
    pub angle: Option<String>,
    #[arg(long)]
    pub power: Option<String>,
    /// Range start (RFC 3339 or YYYY-MM-DD)
    #[arg(long = "range-start")]
    pub range_start: Option<String>,
    /// Range end (RFC 3339 or YYYY-MM-DD)
    #[arg(long = "range-end")]
    pub range_end: Option<String>,
}

impl PrefsSetArgs {
    fn into_patch(self) -> Result<PreferencePatch> {
        Ok(PreferencePatch {
            temp: self.temp,
            distance: self.distance,
            speed: self.speed,
            pressure: self.pressure,
            angle: self.angle,
            power: self.power,
            range_start: self.range_start.as_deref().map(parse_instant).transpose()?,
            range_end: self.range_end.as_deref().map(parse_instant).transpose()?,
        })
    }
}

fn configure_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    } else {
        builder.filter_level(log::LevelFilter::Info);
    }
    let _ = builder.try_init();
}

fn open_preferences(db_path: Option<&Path>) -> Result<Preferences<SqliteStore>> {
    let resolved = resolve_db_path(db_path);
    debug!("Using preferences at {}", resolved.display());
    let store = SqliteStore::open(&resolved)
        .with_context(|| format!("opening {}", resolved.display()))?;
    let mut prefs = Preferences::new(store);
    if let Err(err) = prefs.load() {
        warn!("Falling back to default preferences: {err}");
    }
    Ok(prefs)
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    configure_logging(cli.verbose);
    let db_path = cli.db_path.as_deref();

    match cli.command {
        Commands::Convert {
            quantity,
            value,
            unit,
            plain,
        } => {
            let unit = match unit {
                Some(unit) => unit,
                None => open_preferences(db_path)?
                    .current()
                    .unit_for(quantity)
                    .to_string(),
            };
            let conversion = convert(quantity, value, &unit);
            if conversion.is_fallback() {
                warn!(
                    "Unknown {quantity} unit {unit:?}; showing {}",
                    quantity.base_unit()
                );
            }
            let shown_unit = if conversion.is_fallback() {
                quantity.base_unit()
            } else {
                unit.as_str()
            };
            if plain {
                println!("{}", conversion.value());
            } else {
                println!("{}", format_value(conversion.value(), shown_unit));
            }
        }
        Commands::Units { quantity } => {
            let quantities: Vec<Quantity> = match quantity {
                Some(quantity) => vec![quantity],
                None => Quantity::iter().collect(),
            };
            println!("{}", units_table(&quantities));
        }
        Commands::DewPoint {
            temp,
            humidity,
            celsius,
        } => {
            if humidity <= 0.0 {
                bail!("humidity must be above zero, got {humidity}");
            }
            let dew_point = calculate_dew_point(temp, humidity, !celsius);
            let unit = if celsius { "celsius" } else { "fahrenheit" };
            println!("{}", format_value(dew_point, unit));
        }
        Commands::Uv { value } => {
            let category = uv_index(value);
            if category == UvCategory::Invalid {
                warn!("UV index {value} is negative");
            }
            println!("{category}");
        }
        Commands::Show { payload, json } => {
            let raw = fs::read_to_string(&payload)
                .with_context(|| format!("reading {}", payload.display()))?;
            let reading = StationPayload::from_json(&raw)
                .with_context(|| format!("parsing {}", payload.display()))?;
            let prefs = open_preferences(db_path)?;
            warn_unknown_units(prefs.current());
            let rows = display_rows(&reading, prefs.current());
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                let when = reading.dateutc.as_deref().unwrap_or("unknown time");
                println!("\nReading ({when})\n{}", reading_table(&rows));
            }
        }
        Commands::Prefs { action } => {
            let mut prefs = open_preferences(db_path)?;
            match action {
                PrefsAction::Show => {}
                PrefsAction::Set(args) => {
                    let patch = args.into_patch()?;
                    if patch.is_empty() {
                        warn!("Nothing to change");
                    } else {
                        prefs.save(patch)?;
                    }
                }
                PrefsAction::ClearRange => {
                    prefs.clear_range()?;
                }
            }
            warn_unknown_units(prefs.current());
            println!("{}", prefs_table(prefs.current()));
        }
    }
    Ok(())
}

fn warn_unknown_units(record: &PreferenceRecord) {
    for (quantity, unit) in record.unknown_units() {
        warn!(
            "Unknown {quantity} unit {unit:?}; values stay in {}",
            quantity.base_unit()
        );
    }
}

fn themed_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cells(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| {
            Cell::new(*label)
                .add_attribute(Attribute::Bold)
                .fg(Color::Cyan)
        })
        .collect()
}

fn label_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn value_cell<T: std::fmt::Display>(value: T) -> Cell {
    Cell::new(value.to_string()).set_alignment(CellAlignment::Right)
}

fn uv_color(category: UvCategory) -> Color {
    match category {
        UvCategory::Invalid => Color::White,
        UvCategory::Low => Color::Green,
        UvCategory::Moderate => Color::Yellow,
        UvCategory::High => Color::DarkYellow,
        UvCategory::VeryHigh => Color::Red,
        UvCategory::Extreme => Color::Magenta,
    }
}

fn reading_table(rows: &[DisplayReading]) -> Table {
    let mut table = themed_table();
    table.set_header(header_cells(&["Reading", "Value"]));
    for row in rows {
        let mut cell = value_cell(&row.text);
        if row.label == "UV index" {
            if let Some(v) = row.value {
                cell = cell.fg(uv_color(uv_index(v)));
            }
        }
        table.add_row(vec![label_cell(row.label), cell]);
    }
    table
}

fn units_table(quantities: &[Quantity]) -> Table {
    let mut table = themed_table();
    table.set_header(header_cells(&["Quantity", "Unit", "Symbol", "Factor"]));
    for quantity in quantities {
        for unit in quantity.units() {
            let factor = if unit == quantity.base_unit() {
                "base".to_string()
            } else {
                lookup_factor(*quantity, unit)
                    .map(|f| format!("{f}"))
                    .unwrap_or_else(|| "affine".to_string())
            };
            table.add_row(vec![
                label_cell(quantity.as_ref()),
                Cell::new(unit),
                Cell::new(abbreviation_for(unit)).fg(Color::Green),
                value_cell(factor),
            ]);
        }
    }
    table
}

fn prefs_table(record: &PreferenceRecord) -> Table {
    let mut table = themed_table();
    table.set_header(header_cells(&["Preference", "Value"]));
    for quantity in Quantity::iter() {
        let unit = record.unit_for(quantity);
        let glyph = abbreviation_for(unit);
        let color = if quantity.supports(unit) {
            Color::Green
        } else {
            Color::Red
        };
        table.add_row(vec![
            label_cell(quantity.as_ref()),
            Cell::new(format!("{unit} ({glyph})")).fg(color),
        ]);
    }
    table.add_row(vec![label_cell("range"), Cell::new(record.range().label())]);
    table
}
