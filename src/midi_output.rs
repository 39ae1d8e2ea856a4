use crate::mtc::MtcMessage;
use crossbeam::channel::Receiver;
use log::{debug, error, info, warn};
use midir::{MidiOutput, MidiOutputConnection};
use std::error::Error;
use std::fmt;
use std::thread::{self, JoinHandle};
use std::time::Instant;

const CLIENT_NAME: &str = "mtcgen-output";
const CONNECTION_NAME: &str = "mtcgen-output-conn";

#[derive(Debug)]
pub enum MidiOutputError {
    /// The MIDI backend could not be initialised
    InitError(String),
    /// No port matched the requested name
    PortNotFound(String),
    /// Error when connecting to a MIDI port
    ConnectionError(String),
    /// Error when sending a MIDI message
    SendError(String),
}

impl fmt::Display for MidiOutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiOutputError::InitError(msg) => write!(f, "MIDI init error: {}", msg),
            MidiOutputError::PortNotFound(name) => write!(f, "MIDI output port not found: {}", name),
            MidiOutputError::ConnectionError(msg) => write!(f, "MIDI connection error: {}", msg),
            MidiOutputError::SendError(msg) => write!(f, "MIDI send error: {}", msg),
        }
    }
}

impl Error for MidiOutputError {}

/// A message together with the wall-clock instant it should go out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledMessage {
    pub due: Instant,
    pub message: MtcMessage,
}

/// Anything raw MIDI bytes can be sent to.
pub trait MidiPort {
    fn send(&mut self, bytes: &[u8]) -> Result<(), MidiOutputError>;
}

pub struct MidiOutputManager {
    connection: Option<MidiOutputConnection>,
}

impl Default for MidiOutputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MidiOutputManager {
    pub fn new() -> Self {
        MidiOutputManager { connection: None }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn connect_to_first_available(&mut self) -> Result<(), MidiOutputError> {
        let midi_out = new_output()?;
        let out_ports = midi_out.ports();
        let port = out_ports
            .first()
            .ok_or_else(|| MidiOutputError::PortNotFound("<any>".into()))?;

        let port_name = midi_out
            .port_name(port)
            .map_err(|e| MidiOutputError::ConnectionError(e.to_string()))?;
        info!("Connecting to MIDI output port: {}", port_name);

        let connection = midi_out
            .connect(port, CONNECTION_NAME)
            .map_err(|e| MidiOutputError::ConnectionError(e.to_string()))?;
        self.connection = Some(connection);
        Ok(())
    }

    pub fn connect_to_device(&mut self, device_name: &str) -> Result<(), MidiOutputError> {
        let midi_out = new_output()?;
        let out_ports = midi_out.ports();

        let port = out_ports
            .iter()
            .find(|p| {
                midi_out
                    .port_name(p)
                    .unwrap_or_default()
                    .contains(device_name)
            })
            .ok_or_else(|| {
                error!("MIDI output device '{}' not found", device_name);
                MidiOutputError::PortNotFound(device_name.to_string())
            })?;

        let port_name = midi_out
            .port_name(port)
            .map_err(|e| MidiOutputError::ConnectionError(e.to_string()))?;
        info!("Connecting to MIDI output port: {}", port_name);

        let connection = midi_out
            .connect(port, CONNECTION_NAME)
            .map_err(|e| MidiOutputError::ConnectionError(e.to_string()))?;
        self.connection = Some(connection);
        Ok(())
    }
}

impl MidiPort for MidiOutputManager {
    fn send(&mut self, bytes: &[u8]) -> Result<(), MidiOutputError> {
        let conn = self
            .connection
            .as_mut()
            .ok_or_else(|| MidiOutputError::SendError("MIDI output not connected".into()))?;
        conn.send(bytes)
            .map_err(|e| MidiOutputError::SendError(e.to_string()))
    }
}

fn new_output() -> Result<MidiOutput, MidiOutputError> {
    MidiOutput::new(CLIENT_NAME).map_err(|e| MidiOutputError::InitError(e.to_string()))
}

/// Names of all MIDI output ports.
#[cfg(not(feature = "test-mock"))]
pub fn list_output_ports() -> Vec<String> {
    match new_output() {
        Ok(midi_out) => midi_out
            .ports()
            .iter()
            .filter_map(|p| midi_out.port_name(p).ok())
            .collect(),
        Err(e) => {
            error!("Failed to list MIDI ports: {}", e);
            Vec::new()
        }
    }
}

#[cfg(feature = "test-mock")]
pub fn list_output_ports() -> Vec<String> {
    vec!["Mock Device 1".to_string(), "Mock Device 2".to_string()]
}

/// Sends messages in order, each no earlier than its due time, until the
/// channel closes. Returns the number of messages sent.
pub fn process_midi_messages<P: MidiPort>(port: &mut P, rx: Receiver<ScheduledMessage>) -> usize {
    info!("MIDI output loop started");
    let mut sent = 0;

    while let Ok(scheduled) = rx.recv() {
        let now = Instant::now();
        if scheduled.due > now {
            thread::sleep(scheduled.due - now);
        }
        match port.send(scheduled.message.as_bytes()) {
            Ok(()) => {
                sent += 1;
                debug!("Sent {:02X?}", scheduled.message.as_bytes());
            }
            Err(e) => warn!("Failed to send MTC message: {}", e),
        }
    }

    info!("MIDI output loop stopping after {} messages", sent);
    sent
}

pub fn run_midi_output_thread(
    rx: Receiver<ScheduledMessage>,
    device_name: Option<String>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut output_manager = MidiOutputManager::new();

        let connected = match &device_name {
            Some(name) => {
                info!("Attempting to connect to MIDI device: {}", name);
                output_manager.connect_to_device(name)
            }
            None => {
                info!("No device specified, connecting to first available MIDI output");
                output_manager.connect_to_first_available()
            }
        };

        if let Err(e) = connected {
            error!("Failed to connect MIDI output: {}", e);
            return;
        }

        process_midi_messages(&mut output_manager, rx);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mtc::QUARTER_FRAME_STATUS;
    use crossbeam::channel::bounded;
    use std::time::Duration;

    struct RecordingPort {
        sent: Vec<(Instant, Vec<u8>)>,
    }

    impl MidiPort for RecordingPort {
        fn send(&mut self, bytes: &[u8]) -> Result<(), MidiOutputError> {
            self.sent.push((Instant::now(), bytes.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn test_messages_wait_for_due_time() {
        let (tx, rx) = bounded(4);
        let start = Instant::now();
        let message = MtcMessage::QuarterFrame([QUARTER_FRAME_STATUS, 0x00]);
        tx.send(ScheduledMessage {
            due: start + Duration::from_millis(20),
            message,
        })
        .unwrap();
        drop(tx);

        let mut port = RecordingPort { sent: Vec::new() };
        assert_eq!(process_midi_messages(&mut port, rx), 1);
        assert!(port.sent[0].0 >= start + Duration::from_millis(20));
        assert_eq!(port.sent[0].1, vec![QUARTER_FRAME_STATUS, 0x00]);
    }

    #[test]
    fn test_unconnected_manager_refuses_send() {
        let mut manager = MidiOutputManager::new();
        assert!(!manager.is_connected());
        assert!(matches!(
            manager.send(&[QUARTER_FRAME_STATUS, 0x00]),
            Err(MidiOutputError::SendError(_))
        ));
    }
}
