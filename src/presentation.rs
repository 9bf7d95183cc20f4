//! Forecast presentation model.
//!
//! Turns a [`ForecastResponse`] and a [`DisplayUnit`] into a fully resolved
//! [`ForecastView`]: every label is already formatted, every colour and
//! severity already decided. The render layer only maps structure to widgets.
//!
//! All functions here are pure. A unit change or a new fetch rebuilds the whole
//! view; nothing is patched in place.

use std::fmt;

use chrono::{DateTime, NaiveDateTime};

use crate::units::{round1, temperature, wind_chill};
use crate::weather::{Alert, DisplayUnit, ForecastResponse, HourSample};

/// Shown in place of any missing value.
pub const PLACEHOLDER: &str = "—";

const TEMP_COLOR_MIN_C: f64 = -10.0;
const TEMP_COLOR_MAX_C: f64 = 40.0;

const COMPACT_TIME_FORMAT: &str = "%H:%M";
const DETAIL_TIME_FORMAT: &str = "%b %-d, %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Danger,
    Caution,
    Neutral,
}

impl Severity {
    pub fn for_score(score: f64) -> Self {
        if score >= 60.0 {
            Severity::Danger
        } else if score >= 40.0 {
            Severity::Caution
        } else {
            Severity::Neutral
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            Severity::Danger => "Bring an umbrella.",
            Severity::Caution => "Consider an umbrella.",
            Severity::Neutral => "No umbrella needed.",
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            Severity::Danger => "danger",
            Severity::Caution => "caution",
            Severity::Neutral => "neutral",
        }
    }
}

/// Temperature colour, cold blue (hue 240) through hot red (hue 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsl {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl Hsl {
    pub fn for_temperature(temp_c: f64) -> Self {
        let t = temp_c.clamp(TEMP_COLOR_MIN_C, TEMP_COLOR_MAX_C);
        let ratio = (t - TEMP_COLOR_MIN_C) / (TEMP_COLOR_MAX_C - TEMP_COLOR_MIN_C);
        let hue = (240.0 - ratio * 240.0).round() as u16;
        Self {
            hue,
            saturation: 75,
            lightness: 50,
        }
    }

    pub fn to_rgb(self) -> (u8, u8, u8) {
        let s = f64::from(self.saturation) / 100.0;
        let l = f64::from(self.lightness) / 100.0;
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let h = f64::from(self.hue % 360) / 60.0;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u8 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        let channel = |v: f64| ((v + m) * 255.0).round() as u8;
        (channel(r), channel(g), channel(b))
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({} {}% {}%)", self.hue, self.saturation, self.lightness)
    }
}

/// An umbrella score with the advice it implies.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreView {
    pub value: u8,
    pub label: String,
    pub advice: &'static str,
    pub severity: Severity,
}

impl ScoreView {
    fn new(value: u8) -> Self {
        let severity = Severity::for_score(f64::from(value));
        Self {
            value,
            label: value.to_string(),
            advice: severity.advice(),
            severity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourRowView {
    /// `HH:MM`, for table rows.
    pub time_compact: String,
    /// Month, day and `HH:MM`, for the expanded card.
    pub time_detail: String,
    pub temperature: String,
    pub temperature_color: Option<Hsl>,
    pub wind_chill: String,
    pub precip_prob: String,
    pub precip_mm: String,
    pub wind: String,
    pub humidity: String,
    pub score: Option<ScoreView>,
    pub condition: String,
}

impl HourRowView {
    pub fn score_label(&self) -> &str {
        self.score.as_ref().map_or(PLACEHOLDER, |s| s.label.as_str())
    }

    /// Humidity, wind and wind chill as shown beneath the temperature.
    pub fn sub_line(&self) -> String {
        let mut parts = vec![self.humidity.clone()];
        if self.wind != PLACEHOLDER {
            parts.push(self.wind.clone());
        }
        if self.wind_chill != PLACEHOLDER {
            parts.push(format!("WC {}", self.wind_chill));
        }
        parts.join(" · ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertView {
    pub label: String,
    pub time: String,
    pub prob: String,
    pub advice: &'static str,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HourlyView {
    /// The response carried no hourly samples.
    NoData,
    Rows(Vec<HourRowView>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastView {
    pub summary: String,
    pub score: Option<ScoreView>,
    pub alerts: Vec<AlertView>,
    pub hourly: HourlyView,
}

pub fn build_forecast_view(response: &ForecastResponse, unit: DisplayUnit) -> ForecastView {
    let hourly = if response.hourly.is_empty() {
        HourlyView::NoData
    } else {
        HourlyView::Rows(
            response
                .hourly
                .iter()
                .map(|sample| build_hour_row(sample, unit))
                .collect(),
        )
    };

    ForecastView {
        summary: response.summary.clone(),
        score: percentage(response.umbrella_score).map(ScoreView::new),
        alerts: response.alerts.iter().map(build_alert_view).collect(),
        hourly,
    }
}

pub fn build_hour_row(sample: &HourSample, unit: DisplayUnit) -> HourRowView {
    let temp_c = finite(sample.temp_c).filter(|t| temperature::c_to_f(*t).is_finite());
    let wind_kph = non_negative(sample.wind_kph);

    let wind_chill = match (temp_c, wind_kph) {
        (Some(t), Some(v)) => wind_chill::compute(t, v).and_then(|wc| format_temperature(wc, unit)),
        _ => None,
    };

    HourRowView {
        time_compact: format_time(&sample.time, COMPACT_TIME_FORMAT),
        time_detail: format_time(&sample.time, DETAIL_TIME_FORMAT),
        temperature: or_placeholder(temp_c.and_then(|t| format_temperature(t, unit))),
        temperature_color: temp_c.map(Hsl::for_temperature),
        wind_chill: or_placeholder(wind_chill),
        precip_prob: or_placeholder(percentage(sample.precip_prob).map(|p| format!("{p}%"))),
        precip_mm: or_placeholder(
            one_decimal(non_negative(sample.precip_mm)).map(|mm| format!("{mm:.1} mm")),
        ),
        wind: or_placeholder(one_decimal(wind_kph).map(|v| format!("{v:.1} kph"))),
        humidity: or_placeholder(percentage(sample.humidity).map(|h| format!("{h}%"))),
        score: percentage(sample.umbrella_score).map(ScoreView::new),
        condition: sample
            .condition
            .as_ref()
            .and_then(|c| c.text.clone())
            .unwrap_or_default(),
    }
}

pub fn build_alert_view(alert: &Alert) -> AlertView {
    let prob = percentage(alert.prob);
    // A missing probability can't be ranked, so it lands in the lowest tier.
    let severity = Severity::for_score(prob.map_or(0.0, f64::from));
    AlertView {
        label: alert_label(&alert.kind),
        time: if alert.time.is_empty() {
            String::new()
        } else {
            format_time(&alert.time, DETAIL_TIME_FORMAT)
        },
        prob: or_placeholder(prob.map(|p| format!("{p}%"))),
        advice: severity.advice(),
        severity,
    }
}

fn alert_label(kind: &str) -> String {
    if kind == "rain_likely" {
        return "Rain likely".to_string();
    }
    let words: Vec<String> = kind
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect();
    if words.is_empty() {
        "Alert".to_string()
    } else {
        words.join(" ")
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn format_temperature(temp_c: f64, unit: DisplayUnit) -> Option<String> {
    let value = match unit {
        DisplayUnit::Celsius => round1(temp_c),
        DisplayUnit::Fahrenheit => temperature::c_to_f(temp_c),
    };
    value
        .is_finite()
        .then(|| format!("{value:.1}{}", unit.suffix()))
}

/// Formats a backend timestamp, falling back to the raw text when it can't be parsed.
fn format_time(raw: &str, format: &str) -> String {
    match parse_timestamp(raw) {
        Some(t) => t.format(format).to_string(),
        None => raw.to_string(),
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()
}

fn or_placeholder(value: Option<String>) -> String {
    value.unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn non_negative(value: Option<f64>) -> Option<f64> {
    finite(value).filter(|v| *v >= 0.0)
}

/// Rounded half-up to one decimal; values too large to round stay absent.
fn one_decimal(value: Option<f64>) -> Option<f64> {
    value.map(round1).filter(|v| v.is_finite())
}

/// A whole percent in `[0, 100]`, rounded half-up like every other value here.
fn percentage(value: Option<f64>) -> Option<u8> {
    finite(value)
        .filter(|v| (0.0..=100.0).contains(v))
        .map(|v| (v + 0.5).floor() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::Condition;

    fn sample(temp_c: Option<f64>, wind_kph: Option<f64>) -> HourSample {
        HourSample {
            time: "2024-05-01T13:00".to_string(),
            temp_c,
            wind_kph,
            ..HourSample::default()
        }
    }

    fn full_response() -> ForecastResponse {
        ForecastResponse {
            summary: "Rain after lunch".to_string(),
            umbrella_score: Some(64.0),
            alerts: vec![Alert {
                time: "2024-05-01T14:00".to_string(),
                kind: "rain_likely".to_string(),
                prob: Some(70.0),
            }],
            hourly: vec![
                HourSample {
                    time: "2024-05-01T13:00".to_string(),
                    temp_c: Some(4.2),
                    precip_prob: Some(55.0),
                    precip_mm: Some(1.26),
                    wind_kph: Some(18.44),
                    humidity: Some(90.0),
                    umbrella_score: Some(48.0),
                    condition: Some(Condition {
                        text: Some("Light rain".to_string()),
                    }),
                },
                sample(Some(22.0), Some(3.0)),
            ],
        }
    }

    #[test]
    fn test_temperature_celsius_and_fahrenheit() {
        let s = sample(Some(21.46), None);
        assert_eq!(build_hour_row(&s, DisplayUnit::Celsius).temperature, "21.5°C");
        assert_eq!(build_hour_row(&s, DisplayUnit::Fahrenheit).temperature, "70.6°F");
    }

    #[test]
    fn test_missing_fields_render_placeholder() {
        let row = build_hour_row(&HourSample::default(), DisplayUnit::Celsius);
        assert_eq!(row.temperature, PLACEHOLDER);
        assert_eq!(row.temperature_color, None);
        assert_eq!(row.wind_chill, PLACEHOLDER);
        assert_eq!(row.precip_prob, PLACEHOLDER);
        assert_eq!(row.precip_mm, PLACEHOLDER);
        assert_eq!(row.wind, PLACEHOLDER);
        assert_eq!(row.humidity, PLACEHOLDER);
        assert_eq!(row.score, None);
        assert_eq!(row.score_label(), PLACEHOLDER);
        assert_eq!(row.condition, "");
        assert_eq!(row.time_compact, "");
    }

    #[test]
    fn test_invalid_numbers_treated_as_absent() {
        let s = HourSample {
            temp_c: Some(f64::NAN),
            precip_prob: Some(140.0),
            precip_mm: Some(-1.0),
            wind_kph: Some(f64::INFINITY),
            humidity: Some(-5.0),
            umbrella_score: Some(101.0),
            ..HourSample::default()
        };
        let row = build_hour_row(&s, DisplayUnit::Fahrenheit);
        assert_eq!(row.temperature, PLACEHOLDER);
        assert_eq!(row.precip_prob, PLACEHOLDER);
        assert_eq!(row.precip_mm, PLACEHOLDER);
        assert_eq!(row.wind, PLACEHOLDER);
        assert_eq!(row.humidity, PLACEHOLDER);
        assert_eq!(row.score, None);
    }

    #[test]
    fn test_huge_values_render_placeholder() {
        let s = HourSample {
            temp_c: Some(1e308),
            precip_mm: Some(f64::MAX),
            wind_kph: Some(1e308),
            ..HourSample::default()
        };
        for unit in [DisplayUnit::Celsius, DisplayUnit::Fahrenheit] {
            let row = build_hour_row(&s, unit);
            assert_eq!(row.temperature, PLACEHOLDER);
            assert_eq!(row.temperature_color, None);
            assert_eq!(row.precip_mm, PLACEHOLDER);
            assert_eq!(row.wind, PLACEHOLDER);
            assert_eq!(row.wind_chill, PLACEHOLDER);
        }
    }

    #[test]
    fn test_percentages_round_half_up() {
        let s = HourSample {
            precip_prob: Some(40.5),
            humidity: Some(2.5),
            umbrella_score: Some(59.5),
            ..HourSample::default()
        };
        let row = build_hour_row(&s, DisplayUnit::Celsius);
        assert_eq!(row.precip_prob, "41%");
        assert_eq!(row.humidity, "3%");
        assert_eq!(row.score_label(), "60");
        assert_eq!(row.score.unwrap().severity, Severity::Danger);
    }

    #[test]
    fn test_wind_chill_envelope() {
        let cold = build_hour_row(&sample(Some(5.0), Some(10.0)), DisplayUnit::Celsius);
        assert_eq!(cold.wind_chill, "2.7°C");

        let calm = build_hour_row(&sample(Some(5.0), Some(4.0)), DisplayUnit::Celsius);
        assert_eq!(calm.wind_chill, PLACEHOLDER);

        let warm = build_hour_row(&sample(Some(15.0), Some(20.0)), DisplayUnit::Celsius);
        assert_eq!(warm.wind_chill, PLACEHOLDER);

        let edge = build_hour_row(&sample(Some(10.0), Some(4.8)), DisplayUnit::Celsius);
        assert_eq!(edge.wind_chill, PLACEHOLDER);

        let no_temp = build_hour_row(&sample(None, Some(20.0)), DisplayUnit::Celsius);
        assert_eq!(no_temp.wind_chill, PLACEHOLDER);
    }

    #[test]
    fn test_wind_chill_converted_after_rounding() {
        let row = build_hour_row(&sample(Some(5.0), Some(10.0)), DisplayUnit::Fahrenheit);
        // 2.7°C -> 36.86 -> 36.9
        assert_eq!(row.wind_chill, "36.9°F");
    }

    #[test]
    fn test_temperature_color_hue() {
        for tenths in -150..=450 {
            let t = f64::from(tenths) / 10.0;
            let expected = (240.0 - ((t.clamp(-10.0, 40.0) + 10.0) / 50.0) * 240.0).round() as u16;
            let row = build_hour_row(&sample(Some(t), None), DisplayUnit::Fahrenheit);
            assert_eq!(row.temperature_color.unwrap().hue, expected, "temp {t}");
        }
        assert_eq!(Hsl::for_temperature(-30.0).hue, 240);
        assert_eq!(Hsl::for_temperature(15.0).hue, 120);
        assert_eq!(Hsl::for_temperature(55.0).hue, 0);
        assert_eq!(Hsl::for_temperature(15.0).to_string(), "hsl(120 75% 50%)");
    }

    #[test]
    fn test_hsl_to_rgb() {
        assert_eq!(Hsl::for_temperature(40.0).to_rgb(), (223, 32, 32));
        assert_eq!(Hsl::for_temperature(15.0).to_rgb(), (32, 223, 32));
        assert_eq!(Hsl::for_temperature(-10.0).to_rgb(), (32, 32, 223));
    }

    #[test]
    fn test_other_fields_formatting() {
        let view = build_forecast_view(&full_response(), DisplayUnit::Celsius);
        let HourlyView::Rows(rows) = view.hourly else {
            panic!("expected rows");
        };
        let row = &rows[0];
        assert_eq!(row.precip_prob, "55%");
        assert_eq!(row.precip_mm, "1.3 mm");
        assert_eq!(row.wind, "18.4 kph");
        assert_eq!(row.humidity, "90%");
        assert_eq!(row.condition, "Light rain");
        assert_eq!(row.time_compact, "13:00");
        assert_eq!(row.time_detail, "May 1, 13:00");
        assert_eq!(row.score_label(), "48");
        assert_eq!(row.score.as_ref().unwrap().severity, Severity::Caution);
        assert!(row.sub_line().starts_with("90% · 18.4 kph · WC "));
        assert_eq!(rows[1].sub_line(), "— · 3.0 kph");
    }

    #[test]
    fn test_score_thresholds() {
        assert_eq!(Severity::for_score(60.0).advice(), "Bring an umbrella.");
        assert_eq!(Severity::for_score(59.0).advice(), "Consider an umbrella.");
        assert_eq!(Severity::for_score(40.0).advice(), "Consider an umbrella.");
        assert_eq!(Severity::for_score(39.0).advice(), "No umbrella needed.");
        assert_eq!(Severity::for_score(60.0).class_name(), "danger");
        assert_eq!(Severity::for_score(45.0).class_name(), "caution");
        assert_eq!(Severity::for_score(0.0).class_name(), "neutral");
    }

    #[test]
    fn test_alert_labels() {
        let alert = |kind: &str| Alert {
            time: String::new(),
            kind: kind.to_string(),
            prob: Some(50.0),
        };
        assert_eq!(build_alert_view(&alert("rain_likely")).label, "Rain likely");
        assert_eq!(build_alert_view(&alert("heavy_rain_burst")).label, "Heavy Rain Burst");
        assert_eq!(build_alert_view(&alert("Rain Likely")).label, "Rain Likely");
        assert_eq!(build_alert_view(&alert("wind-gust")).label, "Wind Gust");
        assert_eq!(build_alert_view(&alert("")).label, "Alert");
    }

    #[test]
    fn test_alert_badge_and_advice_agree() {
        let view = build_alert_view(&Alert {
            time: String::new(),
            kind: "rain_likely".to_string(),
            prob: Some(59.6),
        });
        assert_eq!(view.prob, "60%");
        assert_eq!(view.severity, Severity::Danger);
        assert_eq!(view.advice, "Bring an umbrella.");

        let view = build_alert_view(&Alert {
            prob: Some(39.4),
            ..Alert::default()
        });
        assert_eq!(view.prob, "39%");
        assert_eq!(view.advice, "No umbrella needed.");
    }

    #[test]
    fn test_alert_severity() {
        let view = build_alert_view(&Alert {
            time: "2024-05-01T14:00".to_string(),
            kind: "rain_likely".to_string(),
            prob: Some(60.0),
        });
        assert_eq!(view.prob, "60%");
        assert_eq!(view.advice, "Bring an umbrella.");
        assert_eq!(view.severity, Severity::Danger);
        assert_eq!(view.time, "May 1, 14:00");

        let unknown = build_alert_view(&Alert::default());
        assert_eq!(unknown.prob, PLACEHOLDER);
        assert_eq!(unknown.severity, Severity::Neutral);
        assert_eq!(unknown.time, "");
    }

    #[test]
    fn test_forecast_view() {
        let view = build_forecast_view(&full_response(), DisplayUnit::Celsius);
        assert_eq!(view.summary, "Rain after lunch");
        let score = view.score.unwrap();
        assert_eq!(score.value, 64);
        assert_eq!(score.severity, Severity::Danger);
        assert_eq!(view.alerts.len(), 1);
        match view.hourly {
            HourlyView::Rows(rows) => assert_eq!(rows.len(), 2),
            HourlyView::NoData => panic!("expected rows"),
        }
    }

    #[test]
    fn test_empty_response() {
        let view = build_forecast_view(&ForecastResponse::default(), DisplayUnit::Celsius);
        assert_eq!(view.summary, "");
        assert_eq!(view.score, None);
        assert!(view.alerts.is_empty());
        assert_eq!(view.hourly, HourlyView::NoData);
    }

    #[test]
    fn test_pure_and_deterministic() {
        let response = full_response();
        let before = response.clone();
        let celsius = build_forecast_view(&response, DisplayUnit::Celsius);
        let _ = build_forecast_view(&response, DisplayUnit::Fahrenheit);
        assert_eq!(build_forecast_view(&response, DisplayUnit::Celsius), celsius);
        assert_eq!(response, before);
    }

    #[test]
    fn test_unparseable_time_falls_back_to_raw() {
        let s = HourSample {
            time: "tomorrow noon".to_string(),
            ..HourSample::default()
        };
        let row = build_hour_row(&s, DisplayUnit::Celsius);
        assert_eq!(row.time_compact, "tomorrow noon");
        assert_eq!(row.time_detail, "tomorrow noon");

        let s = HourSample {
            time: "2024-12-24T18:30:00+01:00".to_string(),
            ..HourSample::default()
        };
        assert_eq!(build_hour_row(&s, DisplayUnit::Celsius).time_detail, "Dec 24, 18:30");
    }
}
