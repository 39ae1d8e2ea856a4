// ui.rs

use crate::state::{DisplaySnapshot, SharedDisplay};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const REFRESH_INTERVAL: Duration = Duration::from_millis(50);

pub fn create_timecode_spinner() -> ProgressBar {
    let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_prefix("MTC");
    pb
}

pub fn format_snapshot(snapshot: &DisplaySnapshot) -> String {
    format!(
        "{} @ {} fps, {}, resyncs: {}, dropped: {}",
        snapshot.timecode,
        snapshot.rate_label(),
        if snapshot.rolling { "rolling" } else { "stopped" },
        snapshot.resync_count,
        snapshot.dropped_count
    )
}

/// Redraws the timecode display until `stop` is set.
pub fn run_display(display: SharedDisplay, stop: Arc<AtomicBool>) -> JoinHandle<()> {
    thread::spawn(move || {
        let spinner = create_timecode_spinner();
        while !stop.load(Ordering::Relaxed) {
            spinner.set_message(format_snapshot(&display.snapshot()));
            spinner.tick();
            thread::sleep(REFRESH_INTERVAL);
        }
        spinner.finish_and_clear();
    })
}
