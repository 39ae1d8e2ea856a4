use crate::engine::CycleReport;
use crate::timecode::TimecodeTime;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

/// Generator outputs published by the cycle thread for other threads to read.
pub struct DisplayState {
    hour: AtomicI32,
    minute: AtomicI32,
    second: AtomicI32,
    frame: AtomicI32,
    rate_code: AtomicU8,
    pub rolling: AtomicBool,
    pub resync_count: AtomicU64,
    pub dropped_count: AtomicU64,
}

/// Point-in-time copy of [`DisplayState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySnapshot {
    pub timecode: TimecodeTime,
    pub rate_code: u8,
    pub rolling: bool,
    pub resync_count: u64,
    pub dropped_count: u64,
}

pub type SharedDisplay = Arc<DisplayState>;

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            hour: AtomicI32::new(0),
            minute: AtomicI32::new(0),
            second: AtomicI32::new(0),
            frame: AtomicI32::new(0),
            rate_code: AtomicU8::new(0x60),
            rolling: AtomicBool::new(false),
            resync_count: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
        }
    }
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedDisplay {
        Arc::new(Self::new())
    }

    pub fn publish(&self, report: &CycleReport, rate_code: u8) {
        let tc = &report.timecode;
        self.hour.store(tc.hour, Ordering::Relaxed);
        self.minute.store(tc.minute, Ordering::Relaxed);
        self.second.store(tc.second, Ordering::Relaxed);
        self.frame.store(tc.frame, Ordering::Relaxed);
        self.rate_code.store(rate_code, Ordering::Relaxed);
        self.rolling.store(report.rolling, Ordering::Relaxed);
        if report.resynced {
            self.resync_count.fetch_add(1, Ordering::Relaxed);
        }
        if report.dropped > 0 {
            self.dropped_count
                .fetch_add(u64::from(report.dropped), Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot {
            timecode: TimecodeTime::new(
                self.hour.load(Ordering::Relaxed),
                self.minute.load(Ordering::Relaxed),
                self.second.load(Ordering::Relaxed),
                self.frame.load(Ordering::Relaxed),
            ),
            rate_code: self.rate_code.load(Ordering::Relaxed),
            rolling: self.rolling.load(Ordering::Relaxed),
            resync_count: self.resync_count.load(Ordering::Relaxed),
            dropped_count: self.dropped_count.load(Ordering::Relaxed),
        }
    }
}

impl DisplaySnapshot {
    pub fn rate_label(&self) -> &'static str {
        match self.rate_code {
            0x00 => "24",
            0x20 => "25",
            0x40 => "29.97df",
            _ => "30",
        }
    }
}
