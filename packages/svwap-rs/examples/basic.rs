use svwap_rs::config::VwapConfig;
use svwap_rs::engine::SessionVwap;
use svwap_rs::{Bar, BarEvent};

// Drives the engine directly with pre-built events. If your input is raw
// bar snapshots, see `examples/replay.rs` which uses `session::SessionFeed`
// to derive the session and tick flags.

fn main() {
    let mut vwap = SessionVwap::new(VwapConfig::default(), 1024);

    for i in 0..200i64 {
        let close = 100.0 + (i as f64 * 0.05).sin();
        let bar = Bar::new(i * 60_000, close, close + 0.5, close - 0.5, close, 1_000.0);
        let ev = BarEvent::new(bar, i, i == 0, true);
        vwap.on_event(&ev);
    }

    let last = vwap.last().unwrap();
    println!(
        "vwap={:.4} band1=({:.4}, {:.4}) band2=({:.4}, {:.4}) tone={:?}",
        last.vwap, last.upper1, last.lower1, last.upper2, last.lower2, last.tone
    );
    println!("bars={}", vwap.len());
}
