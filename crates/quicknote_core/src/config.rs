//! Runtime configuration shared by the FFI and CLI front ends.
//!
//! # Responsibility
//! - Parse log levels and resolve the notes database path.
//! - Carry the corrupt-state policy chosen by the host app.
//!
//! # Invariants
//! - An empty or whitespace-only `QUICKNOTE_DB_PATH` falls back to the default.

use crate::repo::note_store::CorruptStatePolicy;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable overriding the database location.
pub const DB_PATH_ENV: &str = "QUICKNOTE_DB_PATH";
/// Environment variable opting into `CorruptStatePolicy::ResetToEmpty`.
pub const RESET_CORRUPT_ENV: &str = "QUICKNOTE_RESET_CORRUPT";
const DEFAULT_DB_FILE_NAME: &str = "quicknote.sqlite3";

/// Supported log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// `debug` for debug builds, `info` for release builds.
    pub fn build_default() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Info
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unsupported log level `{other}`; expected trace|debug|info|warn|error"
            )),
        }
    }
}

/// Settings needed to open the note collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub corrupt_policy: CorruptStatePolicy,
}

impl CoreConfig {
    /// Reads `QUICKNOTE_DB_PATH` and `QUICKNOTE_RESET_CORRUPT`.
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var(DB_PATH_ENV).ok().as_deref(),
            std::env::var(RESET_CORRUPT_ENV).ok().as_deref(),
        )
    }

    fn from_values(db_path: Option<&str>, reset_corrupt: Option<&str>) -> Self {
        let db_path = db_path
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);
        let corrupt_policy = match reset_corrupt.map(|raw| raw.trim().to_ascii_lowercase()) {
            Some(flag) if matches!(flag.as_str(), "1" | "true" | "yes") => {
                CorruptStatePolicy::ResetToEmpty
            }
            _ => CorruptStatePolicy::Fail,
        };
        Self {
            db_path,
            corrupt_policy,
        }
    }
}

/// `<temp dir>/quicknote.sqlite3`.
pub fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}
