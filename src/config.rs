//! Command line configuration for the `avl-index` shell.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, TermLogger, TerminalMode};

/// Interactive student index backed by an AVL tree.
#[derive(Debug, Parser)]
#[command(name = "avl-index", version, about)]
pub struct Config {
    /// Verbosity of diagnostics written to the terminal.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// File to load and save line-editor history.
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Replay commands from this file, one per line, before the session.
    #[arg(long)]
    pub load: Option<PathBuf>,

    /// Write all students to this CSV file when the session ends.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> LevelFilter {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl Config {
    /// Install the terminal logger. Can be called only once per process.
    pub fn init_logging(&self) -> Result<(), SetLoggerError> {
        TermLogger::init(
            self.log_level.into(),
            simplelog::Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )
    }
}
