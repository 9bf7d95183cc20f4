//! The owning context for the display unit and the last fetched forecast.

use crate::preferences::{PreferenceStore, UNIT_KEY};
use crate::presentation::{build_forecast_view, ForecastView};
use crate::weather::{DisplayUnit, ForecastResponse};

/// Issued when a lookup starts; only the newest ticket may install its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug)]
pub struct Session<S: PreferenceStore> {
    store: S,
    unit: DisplayUnit,
    last: Option<ForecastResponse>,
    issued: u64,
}

impl<S: PreferenceStore> Session<S> {
    pub fn new(store: S) -> Self {
        let unit = store
            .get(UNIT_KEY)
            .map(|code| DisplayUnit::from_code(&code))
            .unwrap_or_default();
        tracing::debug!("display unit initialised to {}", unit);
        Self {
            store,
            unit,
            last: None,
            issued: 0,
        }
    }

    pub fn unit(&self) -> DisplayUnit {
        self.unit
    }

    /// Switches the display unit and persists it.
    ///
    /// Callers rebuild from [`Session::view`]; a persistence failure only costs
    /// the preference on next start, so it is logged rather than returned.
    pub fn set_unit(&mut self, unit: DisplayUnit) -> DisplayUnit {
        self.unit = unit;
        if let Err(err) = self.store.set(UNIT_KEY, unit.code()) {
            tracing::warn!("failed to persist display unit: {}", err);
        }
        self.unit
    }

    pub fn toggle_unit(&mut self) -> DisplayUnit {
        self.set_unit(self.unit.toggled())
    }

    pub fn last_response(&self) -> Option<&ForecastResponse> {
        self.last.as_ref()
    }

    /// A freshly computed view of the last forecast in the current unit.
    pub fn view(&self) -> Option<ForecastView> {
        self.last
            .as_ref()
            .map(|response| build_forecast_view(response, self.unit))
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    /// Installs `response` if `ticket` belongs to the most recent lookup.
    ///
    /// Returns the rebuilt view, or `None` when the result was superseded.
    pub fn accept(&mut self, ticket: FetchTicket, response: ForecastResponse) -> Option<ForecastView> {
        if ticket.0 != self.issued {
            tracing::info!(
                "dropping stale forecast (ticket {}, latest {})",
                ticket.0,
                self.issued
            );
            return None;
        }
        self.last = Some(response);
        self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::{MemoryStore, StoreError};
    use crate::presentation::HourlyView;
    use crate::weather::HourSample;

    fn response() -> ForecastResponse {
        ForecastResponse {
            summary: "Dry".to_string(),
            umbrella_score: Some(12.0),
            alerts: vec![],
            hourly: vec![HourSample {
                time: "2024-05-01T09:00".to_string(),
                temp_c: Some(3.0),
                wind_kph: Some(25.0),
                ..HourSample::default()
            }],
        }
    }

    fn first_temp(view: &ForecastView) -> &str {
        match &view.hourly {
            HourlyView::Rows(rows) => &rows[0].temperature,
            HourlyView::NoData => panic!("expected rows"),
        }
    }

    #[test]
    fn test_unit_loaded_from_store() {
        assert_eq!(Session::new(MemoryStore::default()).unit(), DisplayUnit::Celsius);
        assert_eq!(
            Session::new(MemoryStore::with(UNIT_KEY, "F")).unit(),
            DisplayUnit::Fahrenheit
        );
        assert_eq!(
            Session::new(MemoryStore::with(UNIT_KEY, "rankine")).unit(),
            DisplayUnit::Celsius
        );
    }

    #[test]
    fn test_set_unit_persists() {
        let mut session = Session::new(MemoryStore::default());
        assert_eq!(session.set_unit(DisplayUnit::Fahrenheit), DisplayUnit::Fahrenheit);
        assert_eq!(session.store.get(UNIT_KEY).as_deref(), Some("F"));
        assert_eq!(session.toggle_unit(), DisplayUnit::Celsius);
        assert_eq!(session.store.get(UNIT_KEY).as_deref(), Some("C"));
    }

    #[test]
    fn test_unit_change_rebuilds_view() {
        let mut session = Session::new(MemoryStore::default());
        assert_eq!(session.view(), None);

        let ticket = session.begin_fetch();
        let celsius = session.accept(ticket, response()).unwrap();
        assert_eq!(first_temp(&celsius), "3.0°C");

        session.set_unit(DisplayUnit::Fahrenheit);
        let fahrenheit = session.view().unwrap();
        assert_eq!(first_temp(&fahrenheit), "37.4°F");

        session.set_unit(DisplayUnit::Celsius);
        assert_eq!(session.view().unwrap(), celsius);
    }

    #[test]
    fn test_stale_fetch_is_dropped() {
        let mut session = Session::new(MemoryStore::default());
        let first = session.begin_fetch();
        let second = session.begin_fetch();

        let mut newer = response();
        newer.summary = "Newer".to_string();
        assert!(session.accept(second, newer).is_some());
        assert!(session.accept(first, response()).is_none());
        assert_eq!(session.last_response().unwrap().summary, "Newer");
    }

    struct FailingStore;

    impl PreferenceStore for FailingStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Write {
                path: "/nowhere".into(),
                source: std::io::Error::other("read-only"),
            })
        }
    }

    #[test]
    fn test_persistence_failure_is_not_fatal() {
        let mut session = Session::new(FailingStore);
        assert_eq!(session.set_unit(DisplayUnit::Fahrenheit), DisplayUnit::Fahrenheit);
        assert_eq!(session.unit(), DisplayUnit::Fahrenheit);
    }
}
