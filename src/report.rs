//! Plain-text rendering of a [`ForecastView`], for `--plain`.

use std::fmt::Write;

use crate::presentation::{ForecastView, HourlyView, PLACEHOLDER};

const NO_HOURLY: &str = "No hourly data available";

pub fn render(city: &str, view: &ForecastView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{city}");

    if let Some(score) = &view.score {
        let _ = writeln!(out, "Umbrella score: {} ({})", score.label, score.advice);
    }
    if !view.summary.is_empty() {
        let _ = writeln!(out, "{}", view.summary);
    }

    if !view.alerts.is_empty() {
        let _ = writeln!(out, "\nAlerts");
        for alert in &view.alerts {
            let _ = writeln!(
                out,
                "  [{:>4}] {} {} - {}",
                alert.prob, alert.label, alert.time, alert.advice
            );
        }
    }

    out.push('\n');
    match &view.hourly {
        HourlyView::NoData => {
            let _ = writeln!(out, "{NO_HOURLY}");
        }
        HourlyView::Rows(rows) => {
            let _ = writeln!(
                out,
                "{:<6} {:>8} {:>5} {:>8} {:>9} {:>10} {:>9}  {}",
                "Time", "Temp", "Score", "Precip %", "Precip mm", "Wind", "Chill", "Condition"
            );
            for row in rows {
                let condition = if row.condition.is_empty() {
                    PLACEHOLDER
                } else {
                    row.condition.as_str()
                };
                let _ = writeln!(
                    out,
                    "{:<6} {:>8} {:>5} {:>8} {:>9} {:>10} {:>9}  {}",
                    row.time_compact,
                    row.temperature,
                    row.score_label(),
                    row.precip_prob,
                    row.precip_mm,
                    row.wind,
                    row.wind_chill,
                    condition
                );
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::build_forecast_view;
    use crate::weather::{Alert, DisplayUnit, ForecastResponse, HourSample};

    #[test]
    fn test_render_rows() {
        let response = ForecastResponse {
            summary: "Showers".to_string(),
            umbrella_score: Some(41.0),
            alerts: vec![Alert {
                time: "2024-05-01T14:00".to_string(),
                kind: "rain_likely".to_string(),
                prob: Some(65.0),
            }],
            hourly: vec![HourSample {
                time: "2024-05-01T14:00".to_string(),
                temp_c: Some(8.0),
                ..HourSample::default()
            }],
        };
        let text = render("Zurich", &build_forecast_view(&response, DisplayUnit::Celsius));
        assert!(text.starts_with("Zurich\n"));
        assert!(text.contains("Umbrella score: 41 (Consider an umbrella.)"));
        assert!(text.contains("Rain likely May 1, 14:00 - Bring an umbrella."));
        assert!(text.contains("14:00"));
        assert!(text.contains("8.0°C"));
        assert!(!text.contains(NO_HOURLY));
    }

    #[test]
    fn test_render_no_data() {
        let text = render("Nowhere", &build_forecast_view(&ForecastResponse::default(), DisplayUnit::Celsius));
        assert!(text.contains(NO_HOURLY));
        assert!(!text.contains("Alerts"));
        assert!(!text.contains("Umbrella score"));
    }
}
