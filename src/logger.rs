use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Sends records to the platform munge log and to the console.
///
/// The file only receives `Info` and above. The console shows `Debug` too
/// when debug output was requested.
pub struct OperatorLogger {
    file: Option<Mutex<File>>,
    console_level: LevelFilter,
    file_level: LevelFilter,
}

impl OperatorLogger {
    /// Truncates `log_path` and reopens it for appending, since the compilers
    /// append their standard error to the same file.
    pub fn new(log_path: Option<&Path>, debug: bool) -> io::Result<Self> {
        let file = match log_path {
            Some(path) => {
                File::create(path)?;
                Some(Mutex::new(OpenOptions::new().append(true).open(path)?))
            }
            None => None,
        };

        Ok(OperatorLogger {
            file,
            console_level: if debug { LevelFilter::Debug } else { LevelFilter::Info },
            file_level: LevelFilter::Info,
        })
    }

    pub fn install(self) -> Result<(), SetLoggerError> {
        let max_level = self.console_level.max(self.file_level);
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

/// `2023-11-14 22:13:20 [INFO]:  message`, time in UTC.
pub fn format_record(time: SystemTime, level: Level, message: &str) -> String {
    format!("{} [{}]:  {}", timestamp(time), level, message)
}

pub fn timestamp(time: SystemTime) -> String {
    let secs = time.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    let (year, month, day) = civil_date(secs / 86_400);
    let rem = secs % 86_400;
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        year,
        month,
        day,
        rem / 3600,
        rem % 3600 / 60,
        rem % 60
    )
}

// Days since 1970-01-01 to (year, month, day), proleptic Gregorian.
fn civil_date(days: u64) -> (u64, u64, u64) {
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z % 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + u64::from(month <= 2);
    (year, month, day)
}

impl Log for OperatorLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.console_level.max(self.file_level)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_record(SystemTime::now(), record.level(), &record.args().to_string());

        if record.level() <= self.file_level {
            if let Some(file) = &self.file {
                if let Ok(mut file) = file.lock() {
                    let _ = writeln!(file, "{}", line);
                    let _ = file.flush();
                }
            }
        }

        if record.level() <= self.console_level {
            eprintln!("{}", line);
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}
