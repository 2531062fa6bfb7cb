//! Division-safe rate arithmetic over counts
//!
//! Results are rounded half-up in integer space and only converted to `f64`
//! at the end, so `rate(3, 10)` is exactly `30.0` and a zero denominator
//! always yields `0.0`.

/// Percentage and ratio helpers used by the aggregation engine
pub struct RateCalculator;

impl RateCalculator {
    /// Percentage of `numerator` over `denominator`, one decimal, in `[0, 100]`.
    ///
    /// `denominator == 0` yields `0.0`.
    pub fn rate(numerator: u64, denominator: u64) -> f64 {
        if denominator == 0 {
            return 0.0;
        }
        let numerator = numerator.min(denominator);
        round_half_up(numerator, denominator, 1_000) as f64 / 10.0
    }

    /// Plain ratio of `numerator` over `denominator`, two decimals.
    ///
    /// `denominator == 0` yields `0.0`.
    pub fn ratio(numerator: u64, denominator: u64) -> f64 {
        if denominator == 0 {
            return 0.0;
        }
        round_half_up(numerator, denominator, 100) as f64 / 100.0
    }
}

/// `floor(numerator * scale / denominator + 1/2)` without overflow
fn round_half_up(numerator: u64, denominator: u64, scale: u128) -> u128 {
    let n = numerator as u128;
    let d = denominator as u128;
    (2 * n * scale + d) / (2 * d)
}
