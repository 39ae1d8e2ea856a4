//! Output event stream
//!
//! The engine writes `(offset, bytes)` pairs into a [`MidiSink`]. The sink is
//! owned by the caller and must not allocate while the engine runs;
//! [`EventBuffer`] reserves its storage up front and refuses writes once full.

use crate::mtc::MtcMessage;

/// Destination for timed MIDI messages produced during one cycle.
pub trait MidiSink {
    /// Appends `bytes` at intra-cycle sample `offset`. Returns `false` if
    /// the message could not be stored.
    fn write(&mut self, offset: u32, bytes: &[u8]) -> bool;
}

/// An MTC message positioned within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedMessage {
    pub offset: u32,
    pub message: MtcMessage,
}

/// Fixed-capacity buffer of timed messages for a single cycle.
#[derive(Debug)]
pub struct EventBuffer {
    events: Vec<TimedMessage>,
    capacity: usize,
}

impl EventBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Empties the buffer, keeping its storage. Call before each cycle.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn events(&self) -> &[TimedMessage] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, TimedMessage> {
        self.events.drain(..)
    }
}

impl MidiSink for EventBuffer {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> bool {
        if self.events.len() >= self.capacity {
            return false;
        }
        // Offsets within a cycle never go backwards.
        if let Some(last) = self.events.last() {
            if offset < last.offset {
                return false;
            }
        }
        match MtcMessage::from_bytes(bytes) {
            Some(message) => {
                self.events.push(TimedMessage { offset, message });
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mtc::QUARTER_FRAME_STATUS;

    #[test]
    fn test_buffer_refuses_writes_when_full() {
        let mut buffer = EventBuffer::with_capacity(1);
        assert!(buffer.write(0, &[QUARTER_FRAME_STATUS, 0x00]));
        assert!(!buffer.write(10, &[QUARTER_FRAME_STATUS, 0x10]));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_buffer_refuses_decreasing_offsets() {
        let mut buffer = EventBuffer::with_capacity(4);
        assert!(buffer.write(100, &[QUARTER_FRAME_STATUS, 0x00]));
        assert!(!buffer.write(50, &[QUARTER_FRAME_STATUS, 0x10]));
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut buffer = EventBuffer::with_capacity(8);
        buffer.write(0, &[QUARTER_FRAME_STATUS, 0x00]);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 8);
    }
}
