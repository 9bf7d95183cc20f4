use clap::builder::{styling::AnsiColor, Styles};
use clap::Parser;

use crate::weather::DisplayUnit;

const ABOUT: &str = "Umbrella rain forecast TUI";

const LONG_ABOUT: &str = "
TUI for the Umbrella forecast service: hourly temperatures, wind chill, rain
probability and an umbrella score for a city.

Keys: e or / edits the city, Enter looks it up, c/f/u switch between Celsius and
Fahrenheit, arrow keys select an hour, Enter opens its details, q quits.

The display unit is saved, so subsequent runs of `umbrella` use the last unit
unless --unit is given.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(help = "City to look up on start (e.g. Zurich, Madison)")]
    pub city: Option<String>,

    #[arg(short, long, help = "Display unit: c or f (saved for later runs)")]
    pub unit: Option<DisplayUnit>,

    #[arg(long, help = "Base URL of the forecast service (overrides UMBRELLA_API_URL)")]
    pub api_url: Option<String>,

    #[arg(long, help = "Request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Print the forecast as text and exit instead of starting the TUI")]
    pub plain: bool,

    #[arg(long, help = "Do not read or save the unit preference")]
    pub no_persist: bool,
}
