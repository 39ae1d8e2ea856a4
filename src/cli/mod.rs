use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "MIDI timecode generator", long_about = None)]
pub struct Args {
    /// List available MIDI output ports
    #[arg(long)]
    pub list_ports: bool,

    /// Send timecode to this MIDI output port (substring match)
    #[arg(long)]
    pub output_device: Option<String>,

    /// Timecode rate: 0=24, 1=25, 2=29.97 drop, 3=30
    #[arg(long, value_parser = clap::value_parser!(i32).range(0..=3))]
    pub rate: Option<i32>,

    /// Sample rate of the simulated audio clock
    #[arg(long)]
    pub sample_rate: Option<f64>,

    /// Samples per processing cycle
    #[arg(long)]
    pub block_size: Option<u32>,

    /// Rewind target in seconds
    #[arg(long)]
    pub zero_position: Option<f32>,

    /// Host/prediction mismatch in samples tolerated as jitter
    #[arg(long)]
    pub jitter_tolerance: Option<i64>,

    /// Follow a simulated host transport running at this speed
    #[arg(long, allow_hyphen_values = true)]
    pub host_speed: Option<f32>,

    /// Configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Do not draw the timecode display
    #[arg(long)]
    pub no_display: bool,
}

pub fn handle_port_list() -> Vec<String> {
    crate::midi_output::list_output_ports()
}

pub fn validate_device(device_name: &str, devices: &[String]) -> Result<(), String> {
    if !devices.iter().any(|d| d.contains(device_name)) {
        let mut error_msg = format!(
            "Error: Port '{}' not found in available MIDI outputs:\n",
            device_name
        );
        for device in devices {
            error_msg.push_str(&format!("  - {}\n", device));
        }
        return Err(error_msg);
    }
    Ok(())
}
