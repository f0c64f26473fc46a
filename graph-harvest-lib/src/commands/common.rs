//! Logging setup shared by every command.

use crate::Result;
use camino::Utf8PathBuf;
use chrono::Local;
use clap::{Args, ValueEnum};
use ohno::IntoAppError;
use std::fs::OpenOptions;
use std::io::{self, Write};

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    #[default]
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

impl LogLevel {
    const fn filter(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Error => Some("error"),
            Self::Warn => Some("warn"),
            Self::Info => Some("info"),
            Self::Debug => Some("debug"),
            Self::Trace => Some("trace"),
        }
    }
}

/// Logging arguments shared by the commands that talk to the network or the filesystem
#[derive(Args, Debug, Clone, Default)]
pub struct LoggingArgs {
    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Also append log records to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<Utf8PathBuf>,
}

/// Every destination a log record is written to.
///
/// Each formatted record is written to all sinks in order.
#[derive(Default)]
pub struct LogSinks {
    sinks: Vec<Box<dyn Write + Send>>,
}

impl core::fmt::Debug for LogSinks {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LogSinks").field("sinks", &self.sinks.len()).finish()
    }
}

impl LogSinks {
    /// Open the sinks described by `args`: stderr, plus the log file when one is given.
    pub fn open(args: &LoggingArgs) -> Result<Self> {
        let mut sinks = Self::default();
        sinks.push(io::stderr());

        if let Some(path) = &args.log_file {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .into_app_err_with(|| format!("opening log file '{path}'"))?;
            sinks.push(file);
        }

        Ok(sinks)
    }

    pub fn push(&mut self, sink: impl Write + Send + 'static) {
        self.sinks.push(Box::new(sink));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Write for LogSinks {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for sink in &mut self.sinks {
            sink.write_all(buf)?;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        for sink in &mut self.sinks {
            sink.flush()?;
        }

        Ok(())
    }
}

/// Install the global logger for this process.
///
/// Only the first call installs a logger; later calls are no-ops.
pub fn init_logging(args: &LoggingArgs) -> Result<()> {
    let Some(level) = args.log_level.filter() else {
        return Ok(());
    };

    let sinks = LogSinks::open(args)?;
    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    let _ = env_logger::Builder::from_env(env)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.target(),
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(sinks)))
        .try_init();

    Ok(())
}
