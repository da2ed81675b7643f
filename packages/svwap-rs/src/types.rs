use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// (high + low + close) / 3.
    #[inline]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// One host callback's worth of input: the bar snapshot plus the host's
/// positional flags. `bar_index` is negative before the stream has a real
/// bar; `is_first_tick_of_bar` is always true for hosts that deliver one
/// event per completed bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarEvent {
    pub bar: Bar,
    pub bar_index: i64,
    pub is_first_bar_of_session: bool,
    pub is_first_tick_of_bar: bool,
}

impl BarEvent {
    pub fn new(
        bar: Bar,
        bar_index: i64,
        is_first_bar_of_session: bool,
        is_first_tick_of_bar: bool,
    ) -> Self {
        Self {
            bar,
            bar_index,
            is_first_bar_of_session,
            is_first_tick_of_bar,
        }
    }
}

/// Display tone for the VWAP line: where the bar's close sits relative to
/// the current VWAP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VwapTone {
    Above = 1,
    Below = 2,
    Equal = 3,
}

impl VwapTone {
    /// Pure classification; holds no indicator state. A NaN `vwap` fails
    /// both comparisons and lands on `Equal`.
    #[inline]
    pub fn classify(close: f64, vwap: f64) -> Self {
        if close > vwap {
            VwapTone::Above
        } else if close < vwap {
            VwapTone::Below
        } else {
            VwapTone::Equal
        }
    }
}
