//! Session-anchored running sums and the values derived from them.

/// Lifecycle of the accumulator between resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumState {
    /// No bar folded in since the last reset; `vwap`/`sigma` are NaN.
    Empty,
    /// At least one bar folded in; `vwap`/`sigma` are finite.
    Accumulating,
}

/// Session VWAP core: three running sums over (price, volume) pairs, plus
/// the cached derived values. Every operation is O(1); a full recompute
/// over the session never happens.
///
/// No `PartialEq`: the NaN caches in the empty state would make fresh
/// accumulators compare unequal to themselves.
#[derive(Debug, Clone, Copy)]
pub struct SessionAccumulator {
    sum_pv: f64,
    sum_pv2: f64,
    sum_v: f64,
    vwap: f64,
    sigma: f64,
}

impl Default for SessionAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionAccumulator {
    pub fn new() -> Self {
        Self {
            sum_pv: 0.0,
            sum_pv2: 0.0,
            sum_v: 0.0,
            vwap: f64::NAN,
            sigma: f64::NAN,
        }
    }

    /// Zeroes the sums and marks the derived values undefined. Idempotent.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[inline]
    pub fn state(&self) -> AccumState {
        if self.vwap.is_nan() {
            AccumState::Empty
        } else {
            AccumState::Accumulating
        }
    }

    /// Folds one bar into the sums and refreshes `vwap`/`sigma`.
    ///
    /// `volume` is clamped to `>= 0` before use (a NaN volume collapses to
    /// zero); prices are assumed finite. On return both derived values are
    /// finite, even on the very first bar of a session.
    pub fn on_bar(&mut self, price: f64, volume: f64) {
        let vol = volume.max(0.0);
        self.sum_pv += price * vol;
        self.sum_pv2 += price * price * vol;
        self.sum_v += vol;

        if self.sum_v <= f64::EPSILON {
            // No usable volume yet.
            self.vwap = price;
            self.sigma = 0.0;
        } else {
            self.vwap = self.sum_pv / self.sum_v;
            let ex2 = self.sum_pv2 / self.sum_v;
            let var = ex2 - self.vwap * self.vwap;
            // Cancellation can leave var a few ulps below zero.
            self.sigma = var.max(0.0).sqrt();
        }
    }

    #[inline]
    pub fn vwap(&self) -> f64 {
        self.vwap
    }

    #[inline]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// `(upper, lower)` at `deviations` sigmas around the VWAP, or
    /// `(NaN, NaN)` when the band is disabled. While the accumulator is
    /// empty the band is NaN either way.
    #[inline]
    pub fn band(&self, deviations: f64, enabled: bool) -> (f64, f64) {
        if !enabled {
            return (f64::NAN, f64::NAN);
        }
        let half = deviations * self.sigma;
        (self.vwap + half, self.vwap - half)
    }
}

#[cfg(test)]
mod tests {
    use super::{AccumState, SessionAccumulator};

    const EPS: f64 = 1e-9;

    fn scenario_acc() -> SessionAccumulator {
        let mut acc = SessionAccumulator::new();
        acc.on_bar(100.0, 10.0);
        acc.on_bar(102.0, 20.0);
        acc.on_bar(98.0, 10.0);
        acc
    }

    #[test]
    fn accumulation_matches_closed_form() {
        let mut acc = SessionAccumulator::new();

        acc.on_bar(100.0, 10.0);
        assert!((acc.vwap() - 100.0).abs() < EPS);
        assert!(acc.sigma().abs() < EPS);

        acc.on_bar(102.0, 20.0);
        assert!((acc.vwap() - 3040.0 / 30.0).abs() < EPS);
        // var = 308080/30 - vwap^2 = 8/9
        assert!((acc.sigma() - (8.0f64 / 9.0).sqrt()).abs() < EPS);

        acc.on_bar(98.0, 10.0);
        assert!((acc.vwap() - 100.5).abs() < EPS);
        // var = 404120/40 - 100.5^2 = 2.75
        assert!((acc.sigma() - 2.75f64.sqrt()).abs() < EPS);
        assert!((acc.sigma() - 1.6583123951777).abs() < 1e-9);
    }

    #[test]
    fn scenario_inner_band() {
        let acc = scenario_acc();
        let (upper, lower) = acc.band(1.0, true);
        assert!((upper - 102.1583123951777).abs() < 1e-9);
        assert!((lower - 98.8416876048223).abs() < 1e-9);
    }

    #[test]
    fn sigma_is_never_negative() {
        // Identical prices: variance cancels to ~0, must not go NaN via
        // sqrt of a negative.
        let mut acc = SessionAccumulator::new();
        for _ in 0..1000 {
            acc.on_bar(100.000001, 3.0);
        }
        assert!(acc.sigma() >= 0.0);
        assert!(acc.sigma().is_finite());
    }

    #[test]
    fn reset_clears_everything() {
        let mut acc = scenario_acc();
        assert_eq!(acc.state(), AccumState::Accumulating);

        acc.reset();
        assert_eq!(acc.state(), AccumState::Empty);
        assert!(acc.vwap().is_nan());
        assert!(acc.sigma().is_nan());

        // Double reset is a no-op.
        acc.reset();
        assert_eq!(acc.state(), AccumState::Empty);
        assert!(acc.vwap().is_nan());
        assert!(acc.sigma().is_nan());

        // First bar after reset sees none of the old session.
        acc.on_bar(50.0, 5.0);
        assert!((acc.vwap() - 50.0).abs() < EPS);
        assert!(acc.sigma().abs() < EPS);
    }

    #[test]
    fn zero_volume_falls_back_to_price() {
        let mut acc = SessionAccumulator::new();
        acc.on_bar(100.0, 0.0);
        assert!((acc.vwap() - 100.0).abs() < EPS);
        assert_eq!(acc.sigma(), 0.0);

        // Still degenerate: vwap tracks the latest price.
        acc.on_bar(103.0, 0.0);
        assert!((acc.vwap() - 103.0).abs() < EPS);
        assert_eq!(acc.sigma(), 0.0);
        assert_eq!(acc.state(), AccumState::Accumulating);
    }

    #[test]
    fn negative_and_nan_volume_clamp_to_zero() {
        let mut acc = SessionAccumulator::new();
        acc.on_bar(100.0, 10.0);
        let before = acc;

        acc.on_bar(500.0, -25.0);
        assert!((acc.vwap() - before.vwap()).abs() < EPS);
        assert!((acc.sigma() - before.sigma()).abs() < EPS);

        acc.on_bar(500.0, f64::NAN);
        assert!((acc.vwap() - before.vwap()).abs() < EPS);
        assert!(acc.vwap().is_finite());
    }

    #[test]
    fn bands_are_symmetric() {
        let acc = scenario_acc();
        for d in [0.5, 1.0, 2.0, 3.5] {
            let (upper, lower) = acc.band(d, true);
            let up = upper - acc.vwap();
            let down = acc.vwap() - lower;
            assert!((up - down).abs() < 1e-12);
            assert!((up - d * acc.sigma()).abs() < 1e-12);
        }
    }

    #[test]
    fn disabled_band_is_nan() {
        let acc = scenario_acc();
        let (upper, lower) = acc.band(2.0, false);
        assert!(upper.is_nan());
        assert!(lower.is_nan());
    }

    #[test]
    fn empty_accumulator_band_is_nan_even_when_enabled() {
        let acc = SessionAccumulator::new();
        let (upper, lower) = acc.band(1.0, true);
        assert!(upper.is_nan());
        assert!(lower.is_nan());
    }
}
