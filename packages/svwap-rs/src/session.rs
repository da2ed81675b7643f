//! Host-side plumbing: session boundary detection and bar-event emission.

use crate::types::{Bar, BarEvent};
use core::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("empty session length")]
    Empty,
    #[error("missing number in session length")]
    MissingNumber,
    #[error("invalid number in session length")]
    InvalidNumber,
    #[error("session length must be > 0")]
    NonPositive,
    #[error("unsupported unit `{0}` (use s/m/h/d)")]
    UnsupportedUnit(String),
}

/// Fixed-length session calendar, anchored `anchor_ms` past the epoch grid.
///
/// `bucket_start` floors a timestamp to its session open. The anchor shifts
/// the grid for sessions that do not open at UTC midnight (a futures session
/// opening 23:00 UTC belongs to the next day's bucket).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionSchedule {
    len_ms: i64,
    anchor_ms: i64,
}

impl fmt::Debug for SessionSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionSchedule({}ms @ +{}ms)", self.len_ms, self.anchor_ms)
    }
}

impl SessionSchedule {
    pub fn from_ms(len_ms: i64) -> Self {
        assert!(len_ms > 0);
        Self {
            len_ms,
            anchor_ms: 0,
        }
    }

    /// 24h sessions opening at UTC midnight.
    pub fn daily() -> Self {
        Self::from_ms(86_400_000)
    }

    /// Shifts session opens by `anchor_ms` (normalized into one session
    /// length).
    pub fn with_anchor(mut self, anchor_ms: i64) -> Self {
        self.anchor_ms = anchor_ms.rem_euclid(self.len_ms);
        self
    }

    pub fn len_ms(&self) -> i64 {
        self.len_ms
    }

    pub fn anchor_ms(&self) -> i64 {
        self.anchor_ms
    }

    /// Parses lengths like `"1d"`, `"4h"`, `"90m"`, `"30s"`.
    pub fn parse(s: &str) -> Result<Self, ScheduleError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ScheduleError::Empty);
        }
        let digits_end = s
            .char_indices()
            .take_while(|(_, ch)| ch.is_ascii_digit())
            .map(|(i, ch)| i + ch.len_utf8())
            .last()
            .unwrap_or(0);
        if digits_end == 0 {
            return Err(ScheduleError::MissingNumber);
        }
        let n: i64 = s[..digits_end]
            .parse()
            .map_err(|_| ScheduleError::InvalidNumber)?;
        if n == 0 {
            return Err(ScheduleError::NonPositive);
        }
        let unit = s[digits_end..].trim().to_ascii_lowercase();
        let ms = match unit.as_str() {
            "s" => n * 1_000,
            "m" => n * 60_000,
            "h" => n * 3_600_000,
            "d" => n * 86_400_000,
            _ => return Err(ScheduleError::UnsupportedUnit(unit)),
        };
        Ok(Self::from_ms(ms))
    }

    /// Session open (ms) containing `ts_ms`. Floors correctly on the whole
    /// i64 range, pre-epoch timestamps included.
    #[inline]
    pub fn bucket_start(&self, ts_ms: i64) -> i64 {
        (ts_ms - self.anchor_ms).div_euclid(self.len_ms) * self.len_ms + self.anchor_ms
    }
}

/// When the feed hands bars to the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcMode {
    /// One event per completed bar, `is_first_tick_of_bar` always true.
    /// Each bar enters the sums exactly once, so this is the numerically
    /// safe default.
    OnBarClose,
    /// One event per bar snapshot, only the first flagged as first tick.
    /// Repeated snapshots of a developing bar re-enter the sums, exactly
    /// as live per-tick hosts behave.
    OnEachTick,
}

#[derive(Debug, Clone, Copy)]
struct PendingBar {
    bar: Bar,
    index: i64,
    first_of_session: bool,
}

impl PendingBar {
    fn event(&self, first_tick: bool) -> BarEvent {
        BarEvent::new(self.bar, self.index, self.first_of_session, first_tick)
    }
}

/// Turns raw bar snapshots into indicator events.
///
/// Bar identity is the snapshot `timestamp` (the bar's open time): a repeat
/// timestamp is the same bar developing, a new timestamp opens the next bar.
/// Timestamps must be non-decreasing. `is_first_bar_of_session` is a
/// property of the bar and stays true for every snapshot of that bar.
#[derive(Debug)]
pub struct SessionFeed {
    schedule: SessionSchedule,
    mode: CalcMode,
    bar_index: i64,
    last_bucket: Option<i64>,
    current: Option<PendingBar>,
}

impl SessionFeed {
    pub fn new(schedule: SessionSchedule, mode: CalcMode) -> Self {
        Self {
            schedule,
            mode,
            bar_index: -1,
            last_bucket: None,
            current: None,
        }
    }

    pub fn schedule(&self) -> SessionSchedule {
        self.schedule
    }

    pub fn mode(&self) -> CalcMode {
        self.mode
    }

    /// Index of the bar currently open; -1 before the first bar.
    pub fn bar_index(&self) -> i64 {
        self.bar_index
    }

    pub fn current_bar(&self) -> Option<Bar> {
        self.current.map(|p| p.bar)
    }

    /// Accepts one bar snapshot; returns the event to hand to the
    /// indicator, if this snapshot produces one.
    ///
    /// `OnBarClose` emits the *previous* bar's event when a new timestamp
    /// closes it; `OnEachTick` emits an event for every snapshot.
    pub fn push(&mut self, bar: Bar) -> Option<BarEvent> {
        match self.current {
            Some(cur) if cur.bar.timestamp == bar.timestamp => {
                let refreshed = PendingBar { bar, ..cur };
                self.current = Some(refreshed);
                match self.mode {
                    CalcMode::OnEachTick => Some(refreshed.event(false)),
                    CalcMode::OnBarClose => None,
                }
            }
            _ => {
                let closed = self.current.take();
                let opened = self.open_bar(bar);
                self.current = Some(opened);
                match self.mode {
                    CalcMode::OnBarClose => closed.map(|p| p.event(true)),
                    CalcMode::OnEachTick => Some(opened.event(true)),
                }
            }
        }
    }

    /// Emits the trailing in-progress bar in `OnBarClose` mode, for
    /// end-of-stream handling. In `OnEachTick` mode every snapshot was
    /// already emitted, so the bar stays open and nothing is returned.
    pub fn flush(&mut self) -> Option<BarEvent> {
        match self.mode {
            CalcMode::OnBarClose => self.current.take().map(|p| p.event(true)),
            CalcMode::OnEachTick => None,
        }
    }

    fn open_bar(&mut self, bar: Bar) -> PendingBar {
        let bucket = self.schedule.bucket_start(bar.timestamp);
        let first_of_session = self.last_bucket != Some(bucket);
        self.last_bucket = Some(bucket);
        self.bar_index += 1;
        if first_of_session {
            debug!(
                session_open = bucket,
                bar_index = self.bar_index,
                "new session"
            );
        }
        PendingBar {
            bar,
            index: self.bar_index,
            first_of_session,
        }
    }
}
