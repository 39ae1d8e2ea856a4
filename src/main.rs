use clap::Parser;
use crossbeam::channel::{bounded, unbounded};
use dialoguer::{theme::ColorfulTheme, Select};
use mtcgen::{
    cli::{handle_port_list, validate_device, Args},
    clock::{run_cycle_clock, CycleClock},
    control::run_command_reader,
    logging,
    midi_output::run_midi_output_thread,
    state::DisplayState,
    ui::run_display,
    Settings,
};
use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Capacity of the queue between the cycle clock and the MIDI output thread.
const OUTPUT_QUEUE_LEN: usize = 1024;

fn main() {
    initialize_logging();
    let args = Args::parse();

    if args.list_ports {
        list_available_ports(&handle_port_list());
        return;
    }

    let (clock, settings) = match setup(&args) {
        Ok(setup) => setup,
        Err(e) => exit_with_error(&e.to_string()),
    };

    run(clock, settings, args.no_display);
}

fn setup(args: &Args) -> Result<(CycleClock, Settings), Box<dyn Error>> {
    let mut settings = Settings::from_args(args)?;

    let devices = handle_port_list();
    match settings.output_device.clone() {
        Some(device_name) => validate_device(&device_name, &devices)?,
        None => settings.output_device = select_port(&devices),
    }

    let clock = CycleClock::new(&settings)
        .map_err(|e| format!("Error creating MTC engine: {}", e))?;
    Ok((clock, settings))
}

fn initialize_logging() {
    match logging::init_logger() {
        Ok(path) => log::info!("Logging to {}", path.display()),
        Err(e) => {
            logging::init_stderr_logger();
            log::warn!("File logging unavailable ({}), logging to stderr", e);
        }
    }
    log::info!("Application starting");
}

fn list_available_ports(ports: &[String]) {
    println!("Available MIDI output ports:");
    for port in ports {
        println!("  - {}", port);
    }
}

fn select_port(ports: &[String]) -> Option<String> {
    if ports.len() < 2 {
        return ports.first().cloned();
    }

    match Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select a MIDI output port")
        .items(ports)
        .default(0)
        .interact_opt()
    {
        Ok(Some(index)) => ports.get(index).cloned(),
        Ok(None) => exit_with_error("No MIDI output port selected"),
        Err(e) => {
            log::warn!("Port selection failed ({}), using first port", e);
            ports.first().cloned()
        }
    }
}

fn run(clock: CycleClock, settings: Settings, no_display: bool) {
    let (output_tx, output_rx) = bounded(OUTPUT_QUEUE_LEN);
    let (command_tx, command_rx) = unbounded();
    let display = DisplayState::shared();
    let stop_display = Arc::new(AtomicBool::new(false));

    let output_handle = run_midi_output_thread(output_rx, settings.output_device.clone());
    let _reader_handle = run_command_reader(command_tx);
    let display_handle =
        (!no_display).then(|| run_display(display.clone(), stop_display.clone()));

    println!("Commands: play, stop, rewind, rate <0-3>, zero <seconds>, sync on|off, quit");
    log::info!("Application running");

    let clock_handle = run_cycle_clock(clock, command_rx, output_tx, display);
    if clock_handle.join().is_err() {
        log::error!("Cycle clock thread panicked");
    }

    stop_display.store(true, Ordering::Relaxed);
    if let Some(handle) = display_handle {
        let _ = handle.join();
    }
    // The output thread exits once the clock drops its sender.
    let _ = output_handle.join();
    log::info!("Application stopped");
}

fn exit_with_error(message: &str) -> ! {
    log::error!("{}", message);
    eprintln!("{}", message);
    std::process::exit(1);
}
