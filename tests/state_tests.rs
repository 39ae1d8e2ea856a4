use mtcgen::state::DisplayState;
use mtcgen::{CycleReport, TimecodeTime};
use std::sync::atomic::Ordering;
use std::thread;

#[cfg(test)]
mod tests {
    use super::*;

    fn report(timecode: TimecodeTime, resynced: bool) -> CycleReport {
        CycleReport {
            rolling: true,
            speed: 1.0,
            resynced,
            timecode,
            ..CycleReport::default()
        }
    }

    #[test]
    fn test_default_initialization() {
        let snapshot = DisplayState::new().snapshot();
        assert!(snapshot.timecode.is_zero());
        assert_eq!(snapshot.rate_code, 0x60);
        assert_eq!(snapshot.rate_label(), "30");
        assert!(!snapshot.rolling);
        assert_eq!(snapshot.resync_count, 0);
    }

    #[test]
    fn test_publish_updates_snapshot() {
        let state = DisplayState::new();
        state.publish(&report(TimecodeTime::new(1, 2, 3, 4), true), 0x40);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.timecode, TimecodeTime::new(1, 2, 3, 4));
        assert_eq!(snapshot.rate_label(), "29.97df");
        assert!(snapshot.rolling);
        assert_eq!(snapshot.resync_count, 1);
    }

    #[test]
    fn test_counters_accumulate() {
        let state = DisplayState::new();
        for _ in 0..3 {
            state.publish(&report(TimecodeTime::default(), true), 0x60);
        }
        state.publish(
            &CycleReport {
                dropped: 5,
                ..CycleReport::default()
            },
            0x60,
        );

        let snapshot = state.snapshot();
        assert_eq!(snapshot.resync_count, 3);
        assert_eq!(snapshot.dropped_count, 5);
        assert!(!snapshot.rolling);
    }

    #[test]
    fn test_shared_across_threads() {
        let state = DisplayState::shared();
        let writer = state.clone();
        let handle = thread::spawn(move || {
            for frame in 0..30 {
                writer.publish(&report(TimecodeTime::new(0, 0, 1, frame), false), 0x20);
            }
        });
        handle.join().unwrap();

        let snapshot = state.snapshot();
        assert_eq!(snapshot.timecode, TimecodeTime::new(0, 0, 1, 29));
        assert_eq!(snapshot.rate_label(), "25");
        assert!(state.rolling.load(Ordering::Relaxed));
    }
}
