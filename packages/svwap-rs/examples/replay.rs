use svwap_rs::config::VwapConfig;
use svwap_rs::engine::SessionVwap;
use svwap_rs::session::{CalcMode, SessionFeed, SessionSchedule};
use svwap_rs::Bar;
use tracing::Level;

fn main() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("set tracing subscriber");

    // 4h sessions, 15m bars, events on bar close (the safe default: each
    // bar enters the sums exactly once).
    let schedule = SessionSchedule::parse("4h").expect("session length");
    let mut feed = SessionFeed::new(schedule, CalcMode::OnBarClose);
    let mut vwap = SessionVwap::new(VwapConfig::default(), 1024);

    let step = 15 * 60_000;
    for i in 0..32i64 {
        let close = 100.0 + (i as f64 * 0.4).sin() * 2.0;
        let volume = 500.0 + (i % 7) as f64 * 90.0;
        let bar = Bar::new(i * step, close, close + 0.8, close - 0.8, close, volume);

        if let Some(ev) = feed.push(bar) {
            let row = vwap.on_event(&ev);
            println!(
                "ts={} idx={} session_start={} vwap={:.4} band1=({:.4}, {:.4}) tone={:?}",
                ev.bar.timestamp,
                ev.bar_index,
                ev.is_first_bar_of_session,
                row.vwap,
                row.upper1,
                row.lower1,
                row.tone
            );
        }
    }

    // Hand over the trailing in-progress bar (optional, end-of-stream).
    if let Some(ev) = feed.flush() {
        let row = vwap.on_event(&ev);
        println!("(flush) ts={} vwap={:.4}", ev.bar.timestamp, row.vwap);
    }

    println!("rows={}", vwap.len());
}
