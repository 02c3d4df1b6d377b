//! Diagnostic log for the dashboard.
//!
//! The terminal is the dashboard's screen, so diagnostics go to an
//! append-only file instead (`~/.botdash/dashboard.log` by default). Each
//! line is `"<rfc3339> <LEVEL> <message>"`. Writing is best-effort: a
//! failure to log never reaches the user.

use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;

use crate::config::schema::LoggingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Handle to the diagnostic log. Cheap to clone; opens the file per write.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticLog {
    path: Option<PathBuf>,
}

impl DiagnosticLog {
    /// Build the log from config. A disabled log discards everything.
    pub fn from_config(config: &LoggingConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        let path = if config.path.trim().is_empty() {
            default_log_path()
        } else {
            Some(PathBuf::from(config.path.trim()))
        };
        Self { path }
    }

    /// Log that writes to an explicit file.
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    pub fn info(&self, message: &str) {
        self.write(Level::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.write(Level::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.write(Level::Error, message);
    }

    fn write(&self, level: Level, message: &str) {
        let Some(path) = &self.path else {
            return;
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && create_dir_all(parent).is_err()
        {
            return;
        }

        let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) else {
            return;
        };

        let line = message.replace(['\r', '\n'], " ");
        let _ = writeln!(file, "{} {} {}", Utc::now().to_rfc3339(), level, line);
    }
}

/// Default log location: `~/.botdash/dashboard.log`.
pub fn default_log_path() -> Option<PathBuf> {
    crate::config::home_dir().map(|dir| dir.join("dashboard.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("botdash-diag-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir.join("nested").join("dashboard.log")
    }

    #[test]
    fn writes_level_and_single_line_message() {
        let path = temp_log("write");
        let log = DiagnosticLog::to_file(&path);
        log.error("status poll failed:\nconnection refused");
        log.info("poll ok");

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(" ERROR status poll failed: connection refused"));
        assert!(lines[1].contains(" INFO poll ok"));
    }

    #[test]
    fn disabled_log_writes_nothing() {
        let cfg = LoggingConfig {
            enabled: false,
            path: "/should/not/be/created.log".to_string(),
        };
        let log = DiagnosticLog::from_config(&cfg);
        assert!(log.path().is_none());
        log.error("ignored");
    }

    #[test]
    fn explicit_path_overrides_default() {
        let cfg = LoggingConfig {
            enabled: true,
            path: " /tmp/custom.log ".to_string(),
        };
        let log = DiagnosticLog::from_config(&cfg);
        assert_eq!(log.path(), Some(&PathBuf::from("/tmp/custom.log")));
    }
}
