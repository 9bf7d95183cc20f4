/// Round to one decimal place, halves rounding up (towards positive infinity).
///
/// Negative zero is folded into `0.0` so that values like `-0.04` never display
/// as `-0.0`.
pub fn round1(value: f64) -> f64 {
    ((value * 10.0 + 0.5).floor() / 10.0) + 0.0
}

pub mod temperature {
    use super::round1;

    pub fn c_to_f(temp_c: f64) -> f64 {
        round1(temp_c * 9.0 / 5.0 + 32.0)
    }

    #[test]
    fn test_temperature() {
        assert_eq!(c_to_f(0.0), 32.0);
        assert_eq!(c_to_f(100.0), 212.0);
        assert_eq!(c_to_f(-40.0), -40.0);
        assert_eq!(c_to_f(21.5), 70.7);
    }

    #[test]
    fn test_negative_zero_is_folded() {
        let f = c_to_f(-17.8);
        assert_eq!(f, 0.0);
        assert!(f.is_sign_positive());
        assert_eq!(format!("{f:.1}"), "0.0");
    }
}

pub mod wind_chill {
    use super::round1;

    /// Highest air temperature (inclusive) at which wind chill is meaningful.
    pub const MAX_TEMP_C: f64 = 10.0;

    /// Wind speed the formula needs to be exceeded before it applies.
    pub const MIN_WIND_KPH: f64 = 4.8;

    /// North American wind chill index in °C, rounded to one decimal.
    ///
    /// Only defined for `temp_c <= 10` and `wind_kph > 4.8`; anything outside
    /// that envelope (or non-finite) yields `None`.
    pub fn compute(temp_c: f64, wind_kph: f64) -> Option<f64> {
        if !temp_c.is_finite() || !wind_kph.is_finite() {
            return None;
        }
        if temp_c > MAX_TEMP_C || wind_kph <= MIN_WIND_KPH {
            return None;
        }
        let v016 = wind_kph.powf(0.16);
        let wc = 13.12 + 0.6215 * temp_c - 11.37 * v016 + 0.3965 * temp_c * v016;
        Some(round1(wc))
    }

    #[test]
    fn test_cold_and_windy() {
        let wc = compute(5.0, 10.0).unwrap();
        assert!(wc.is_finite());
        assert!(wc < 5.0);
        assert_eq!(wc, 2.7);
    }

    #[test]
    fn test_envelope_boundaries() {
        assert!(compute(10.0, 20.0).is_some());
        assert!(compute(10.01, 20.0).is_none());
        assert!(compute(5.0, 4.8).is_none());
        assert!(compute(5.0, 4.81).is_some());
        assert!(compute(5.0, 4.0).is_none());
        assert!(compute(15.0, 20.0).is_none());
    }

    #[test]
    fn test_non_finite() {
        assert!(compute(f64::NAN, 10.0).is_none());
        assert!(compute(0.0, f64::INFINITY).is_none());
    }
}

#[test]
fn test_round1() {
    assert_eq!(round1(1.96), 2.0);
    assert_eq!(round1(3.14), 3.1);
    assert_eq!(round1(2.25), 2.3);
    assert_eq!(round1(-2.25), -2.2);
    assert!(round1(-0.04).is_sign_positive());
}
