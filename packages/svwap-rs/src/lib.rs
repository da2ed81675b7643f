//! Session-anchored VWAP with symmetric ±kσ volume-weighted bands.
//!
//! Three running sums per session, O(1) per bar event, NaN as the
//! "undefined / do not draw" sentinel throughout. Hosts feed `BarEvent`s
//! (directly, or through `session::SessionFeed`) and read back per-bar
//! rows of VWAP, the two band pairs, and the VWAP color tone.

mod types;
pub use types::*;

pub mod accumulator;
pub mod config;
pub mod output;
pub mod session;

pub mod engine;
