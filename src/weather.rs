//! Forecast payload as served by the Umbrella backend, plus the display unit.
//!
//! Every numeric field is optional. Values that are `null`, missing, or not a
//! number at all deserialize to `None` rather than rejecting the payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ForecastResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: String,

    #[serde(rename = "umbrellaScore", default, deserialize_with = "lenient_f64")]
    pub umbrella_score: Option<f64>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub alerts: Vec<Alert>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub hourly: Vec<HourSample>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct HourSample {
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: String,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub temp_c: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub precip_prob: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub precip_mm: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub wind_kph: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub humidity: Option<f64>,

    #[serde(rename = "umbrellaScore", default, deserialize_with = "lenient_f64")]
    pub umbrella_score: Option<f64>,

    #[serde(default, deserialize_with = "lenient_condition")]
    pub condition: Option<Condition>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Condition {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Alert {
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: String,

    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: String,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub prob: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DisplayUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl DisplayUnit {
    /// Short code used for persistence.
    pub fn code(self) -> &'static str {
        match self {
            DisplayUnit::Celsius => "C",
            DisplayUnit::Fahrenheit => "F",
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            DisplayUnit::Celsius => "°C",
            DisplayUnit::Fahrenheit => "°F",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            DisplayUnit::Celsius => DisplayUnit::Fahrenheit,
            DisplayUnit::Fahrenheit => DisplayUnit::Celsius,
        }
    }

    /// Anything that isn't recognisably Fahrenheit is Celsius.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "F" | "f" => DisplayUnit::Fahrenheit,
            _ => DisplayUnit::Celsius,
        }
    }
}

impl fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DisplayUnit {
    type Err = String;

    /// Strict parsing for user input; stored values go through [`DisplayUnit::from_code`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "celsius" => Ok(DisplayUnit::Celsius),
            "f" | "fahrenheit" => Ok(DisplayUnit::Fahrenheit),
            other => Err(format!("unknown unit '{other}' (expected c or f)")),
        }
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()).filter(|v| v.is_finite()))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

fn lenient_condition<'de, D>(deserializer: D) -> Result<Option<Condition>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}
