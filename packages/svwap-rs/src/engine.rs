use crate::accumulator::SessionAccumulator;
use crate::config::VwapConfig;
use crate::output::{OutputBuffer, VwapOutput};
use crate::types::{BarEvent, VwapTone};
use tracing::debug;

/// Per-instrument indicator runtime: one session accumulator plus the
/// bounded output history, driven by host bar events.
///
/// Single-threaded by design; hosts running several instruments keep one
/// `SessionVwap` per instrument.
#[derive(Debug)]
pub struct SessionVwap {
    config: VwapConfig,
    acc: SessionAccumulator,
    plots: OutputBuffer,
}

impl SessionVwap {
    pub fn new(config: VwapConfig, capacity: usize) -> Self {
        Self {
            config,
            acc: SessionAccumulator::new(),
            plots: OutputBuffer::new(capacity),
        }
    }

    pub fn config(&self) -> &VwapConfig {
        &self.config
    }

    /// Swaps the configuration; takes effect from the next event on.
    pub fn set_config(&mut self, config: VwapConfig) {
        self.config = config;
    }

    /// Clears the session sums and blanks the current bar's row, so nothing
    /// computed before the reset survives it.
    pub fn reset(&mut self) {
        self.acc.reset();
        self.plots.update_last(VwapOutput::undefined());
    }

    /// Processes one bar event and returns the row written for that bar.
    ///
    /// Events with a negative `bar_index` are pre-stream noise: nothing is
    /// accumulated, nothing is stored, and the returned row is undefined.
    /// Every accepted event folds the bar snapshot into the sums, so hosts
    /// delivering multiple ticks per bar re-enter that bar's running values
    /// on each tick.
    pub fn on_event(&mut self, ev: &BarEvent) -> VwapOutput {
        if ev.bar_index < 0 {
            return VwapOutput::undefined();
        }

        // The first tick of a bar opens that bar's row; later ticks rewrite
        // it in place.
        if ev.is_first_tick_of_bar || self.plots.is_empty() {
            self.plots.push(VwapOutput::undefined());
        }

        // Reset fires once per session, on the first tick of its first bar.
        if self.config.reset_on_new_session
            && ev.is_first_bar_of_session
            && ev.is_first_tick_of_bar
        {
            debug!(
                bar_index = ev.bar_index,
                timestamp = ev.bar.timestamp,
                "session reset"
            );
            self.reset();
        }

        let bar = &ev.bar;
        let price = if self.config.use_typical_price {
            bar.typical_price()
        } else {
            bar.close
        };
        self.acc.on_bar(price, bar.volume);

        let vwap = self.acc.vwap();
        let (upper1, lower1) = self
            .acc
            .band(self.config.deviations1, self.config.show_inner_band);
        let (upper2, lower2) = self
            .acc
            .band(self.config.deviations2, self.config.show_outer_band);

        let row = VwapOutput {
            vwap,
            upper1,
            lower1,
            upper2,
            lower2,
            tone: Some(VwapTone::classify(bar.close, vwap)),
        };
        self.plots.update_last(row);
        row
    }

    pub fn capacity(&self) -> usize {
        self.plots.capacity()
    }

    /// Number of bars with a retained output row.
    pub fn len(&self) -> usize {
        self.plots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }

    /// The current bar's row.
    pub fn last(&self) -> Option<VwapOutput> {
        self.plots.last()
    }

    /// Row by index from the newest bar (0 = current bar).
    pub fn get_from_end(&self, i: usize) -> Option<VwapOutput> {
        self.plots.get_from_end(i)
    }

    pub fn plots(&self) -> &OutputBuffer {
        &self.plots
    }

    /// Chronological VWAP values over the retained history.
    pub fn vwap_series(&self) -> Vec<f64> {
        self.plots.iter().map(|r| r.vwap).collect()
    }

    pub fn accumulator(&self) -> &SessionAccumulator {
        &self.acc
    }
}
