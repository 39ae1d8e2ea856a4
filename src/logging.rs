use simplelog::*;
use std::fs::{self, OpenOptions};
use std::io::{Error, ErrorKind};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

static INIT: Once = Once::new();
static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Directory the log files go to: `~/.local/share/mtcgen/logs`.
pub fn log_dir() -> Result<PathBuf, Error> {
    let home = std::env::var("HOME")
        .map_err(|_| Error::new(ErrorKind::NotFound, "HOME environment variable not set"))?;

    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("mtcgen")
        .join("logs"))
}

/// One file per day, e.g. `mtcgen-2024-03-01.log`.
pub fn log_file_name(date: chrono::NaiveDate) -> String {
    format!("mtcgen-{}.log", date.format("%Y-%m-%d"))
}

/// Routes `log` output to today's log file. Returns the file path.
pub fn init_logger() -> Result<PathBuf, Error> {
    let log_dir = log_dir()?;
    fs::create_dir_all(&log_dir)?;

    let path = log_dir.join(log_file_name(chrono::Local::now().date_naive()));
    let log_file = OpenOptions::new().create(true).append(true).open(&path)?;

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    INIT.call_once(|| {
        if CombinedLogger::init(vec![WriteLogger::new(LevelFilter::Debug, config, log_file)]).is_ok()
        {
            LOGGER_INITIALIZED.store(true, Ordering::SeqCst);
        }
    });

    if LOGGER_INITIALIZED.load(Ordering::SeqCst) {
        Ok(path)
    } else {
        Err(Error::new(ErrorKind::Other, "Logger initialization failed"))
    }
}

/// Stderr logging controlled by `RUST_LOG`, for when no log file can be opened.
pub fn init_stderr_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();
}
