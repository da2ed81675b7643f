//! Per-bar output rows and the bounded history the engine retains.

use crate::types::VwapTone;
use core::fmt;

/// One bar's outputs: the five plot values plus the VWAP tone.
///
/// NaN means "undefined / do not draw"; hosts exclude NaN from autoscale.
/// `tone` is `None` exactly when the row is undefined.
#[derive(Debug, Clone, Copy)]
pub struct VwapOutput {
    pub vwap: f64,
    pub upper1: f64,
    pub lower1: f64,
    pub upper2: f64,
    pub lower2: f64,
    pub tone: Option<VwapTone>,
}

impl VwapOutput {
    /// All plots NaN, no tone: what hosts see during warm-up and at the
    /// instant of a session reset.
    pub fn undefined() -> Self {
        Self {
            vwap: f64::NAN,
            upper1: f64::NAN,
            lower1: f64::NAN,
            upper2: f64::NAN,
            lower2: f64::NAN,
            tone: None,
        }
    }

    #[inline]
    pub fn is_defined(&self) -> bool {
        !self.vwap.is_nan()
    }
}

impl Default for VwapOutput {
    fn default() -> Self {
        Self::undefined()
    }
}

/// Fixed-capacity history of output rows, oldest overwritten when full.
///
/// Rows are stored whole (AoS) since the five plots and the tone are always
/// produced and read together. `push` opens a bar's row, `update_last`
/// rewrites it while the bar develops.
#[derive(Clone)]
pub struct OutputBuffer {
    capacity: usize,
    len: usize,
    head: usize, // next write slot
    rows: Vec<VwapOutput>,
}

impl fmt::Debug for OutputBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputBuffer")
            .field("capacity", &self.capacity)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl OutputBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        Self {
            capacity,
            len: 0,
            head: 0,
            rows: vec![VwapOutput::undefined(); capacity],
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Slot (in `rows`) holding the oldest retained row.
    #[inline]
    fn oldest_slot(&self) -> usize {
        (self.head + self.capacity - self.len) % self.capacity
    }

    /// Appends a row, evicting the oldest when full.
    pub fn push(&mut self, row: VwapOutput) {
        self.rows[self.head] = row;
        self.head = (self.head + 1) % self.capacity;
        if self.len < self.capacity {
            self.len += 1;
        }
    }

    /// Rewrites the newest row in place; no-op while empty.
    pub fn update_last(&mut self, row: VwapOutput) {
        if self.len == 0 {
            return;
        }
        let slot = (self.head + self.capacity - 1) % self.capacity;
        self.rows[slot] = row;
    }

    /// Row by chronological index (0 = oldest retained).
    pub fn get(&self, i: usize) -> Option<VwapOutput> {
        if i >= self.len {
            return None;
        }
        Some(self.rows[(self.oldest_slot() + i) % self.capacity])
    }

    /// Row by index from the newest (0 = current bar).
    pub fn get_from_end(&self, i: usize) -> Option<VwapOutput> {
        if i >= self.len {
            return None;
        }
        self.get(self.len - 1 - i)
    }

    #[inline]
    pub fn last(&self) -> Option<VwapOutput> {
        self.get_from_end(0)
    }

    /// Chronological iteration over the retained rows.
    pub fn iter(&self) -> impl Iterator<Item = VwapOutput> + '_ {
        let start = self.oldest_slot();
        (0..self.len).map(move |i| self.rows[(start + i) % self.capacity])
    }

    pub fn to_vec(&self) -> Vec<VwapOutput> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{OutputBuffer, VwapOutput};
    use crate::types::VwapTone;

    fn row(vwap: f64) -> VwapOutput {
        VwapOutput {
            vwap,
            upper1: vwap + 1.0,
            lower1: vwap - 1.0,
            upper2: vwap + 2.0,
            lower2: vwap - 2.0,
            tone: Some(VwapTone::Equal),
        }
    }

    #[test]
    fn undefined_row_is_all_nan() {
        let r = VwapOutput::undefined();
        assert!(!r.is_defined());
        assert!(r.vwap.is_nan());
        assert!(r.upper1.is_nan());
        assert!(r.lower1.is_nan());
        assert!(r.upper2.is_nan());
        assert!(r.lower2.is_nan());
        assert!(r.tone.is_none());
    }

    #[test]
    fn push_evicts_oldest_when_full() {
        let mut buf = OutputBuffer::new(3);
        for v in [1.0, 2.0, 3.0] {
            buf.push(row(v));
        }
        assert!(buf.is_full());
        let vwaps: Vec<f64> = buf.iter().map(|r| r.vwap).collect();
        assert_eq!(vwaps, vec![1.0, 2.0, 3.0]);

        buf.push(row(4.0));
        let vwaps: Vec<f64> = buf.iter().map(|r| r.vwap).collect();
        assert_eq!(vwaps, vec![2.0, 3.0, 4.0]);
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn update_last_rewrites_newest_only() {
        let mut buf = OutputBuffer::new(2);
        buf.push(row(10.0));
        buf.push(row(20.0));
        buf.update_last(row(21.0));
        assert_eq!(buf.get(0).unwrap().vwap, 10.0);
        assert_eq!(buf.last().unwrap().vwap, 21.0);

        // After wrap-around the newest slot moves.
        buf.push(row(30.0));
        buf.update_last(row(31.0));
        let vwaps: Vec<f64> = buf.iter().map(|r| r.vwap).collect();
        assert_eq!(vwaps, vec![21.0, 31.0]);
    }

    #[test]
    fn update_last_on_empty_is_a_noop() {
        let mut buf = OutputBuffer::new(4);
        buf.update_last(row(1.0));
        assert!(buf.is_empty());
        assert!(buf.last().is_none());
    }

    #[test]
    fn get_from_end_counts_back_from_current() {
        let mut buf = OutputBuffer::new(8);
        for v in [1.0, 2.0, 3.0] {
            buf.push(row(v));
        }
        assert_eq!(buf.get_from_end(0).unwrap().vwap, 3.0);
        assert_eq!(buf.get_from_end(2).unwrap().vwap, 1.0);
        assert!(buf.get_from_end(3).is_none());
    }
}
