//! Blocking client for the Umbrella forecast API.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::weather::ForecastResponse;

const USER_AGENT: &str = concat!("umbrella/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Please enter a city name")]
    MissingCity,

    #[error("{status} {reason}")]
    Upstream {
        status: u16,
        reason: String,
        /// Link to a place search that may help with an unknown city.
        suggestion: Option<String>,
    },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed forecast: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            FetchError::Upstream { suggestion, .. } => suggestion.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForecastClient {
    base_url: String,
    client: Client,
}

impl ForecastClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn forecast(&self, city: &str) -> Result<ForecastResponse, FetchError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(FetchError::MissingCity);
        }

        let url = format!("{}/api/forecast", self.base_url);
        tracing::info!("looking up forecast for '{}'", city);
        let res = self.client.get(&url).query(&[("city", city)]).send()?;
        read_forecast(res)
    }
}

fn read_forecast(res: Response) -> Result<ForecastResponse, FetchError> {
    let status = res.status();
    let body = res.text()?;
    if !status.is_success() {
        let err = upstream_error(status, &body);
        tracing::warn!("forecast request failed: {}", err);
        return Err(err);
    }
    Ok(serde_json::from_str(&body)?)
}

/// Builds the failure from an error body, unwrapping the `detail` envelope
/// the backend puts around its errors.
fn upstream_error(status: StatusCode, body: &str) -> FetchError {
    let (reason, suggestion) = match serde_json::from_str::<Value>(body) {
        Ok(json) => {
            let detail = json
                .get("detail")
                .filter(|d| !d.is_null())
                .cloned()
                .unwrap_or(json);
            match &detail {
                Value::Object(fields) => {
                    let text = |key: &str| fields.get(key).and_then(Value::as_str).map(String::from);
                    let reason = text("message")
                        .or_else(|| text("error"))
                        .unwrap_or_else(|| detail.to_string());
                    (reason, text("nominatim_search"))
                }
                Value::String(s) => (s.clone(), None),
                other => (other.to_string(), None),
            }
        }
        Err(_) if body.trim().is_empty() => ("Error".to_string(), None),
        Err(_) => (body.to_string(), None),
    };

    FetchError::Upstream {
        status: status.as_u16(),
        reason,
        suggestion,
    }
}
