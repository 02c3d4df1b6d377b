/// Configuration schema and defaults for botdash.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[server]`, `[polling]`, `[alerts]`, `[layout]`, `[panels]` and
/// `[logging]`.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override.
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level botdash configuration.
///
/// Maps directly to the `~/.botdash/config.toml` and `.botdash.toml` file
/// schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub server: ServerConfig,
    pub polling: PollingConfig,
    pub alerts: AlertsConfig,
    pub layout: LayoutConfig,
    pub panels: PanelsConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Where the trading-bot service lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the service; `/api/...` paths are appended to it.
    pub base_url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ---------------------------------------------------------------------------
// [polling]
// ---------------------------------------------------------------------------

/// Status poller intervals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Delay before the next poll after a successful one (seconds).
    pub interval_secs: u64,
    /// Delay before the next poll after a failed one (seconds).
    pub retry_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            retry_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// [alerts]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// How long an alert stays on the board (seconds).
    pub ttl_secs: u64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self { ttl_secs: 5 }
    }
}

// ---------------------------------------------------------------------------
// [layout]
// ---------------------------------------------------------------------------

/// Responsive layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Terminal widths below this many columns get abbreviated headers.
    pub compact_below: u16,
    /// Fixed viewport width. `0` detects it from `COLUMNS`.
    pub width: u16,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            compact_below: 100,
            width: 0,
        }
    }
}

/// Width used when neither the config nor `COLUMNS` provide one.
pub const FALLBACK_WIDTH: u16 = 120;

impl LayoutConfig {
    /// Resolve the starting viewport width.
    pub fn initial_width(&self) -> u16 {
        if self.width > 0 {
            return self.width;
        }
        std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.trim().parse::<u16>().ok())
            .filter(|w| *w > 0)
            .unwrap_or(FALLBACK_WIDTH)
    }
}

// ---------------------------------------------------------------------------
// [panels]
// ---------------------------------------------------------------------------

/// Optional panels. A disabled panel behaves like a page without that
/// element: no tab, no initial load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelsConfig {
    pub wallet: bool,
    pub history: bool,
}

impl Default for PanelsConfig {
    fn default() -> Self {
        Self {
            wallet: true,
            history: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Diagnostic log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// Log file path. Empty means `~/.botdash/dashboard.log`.
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Annotated default file
// ---------------------------------------------------------------------------

impl DashConfig {
    /// The annotated default config written by `botdash config init`.
    pub fn default_toml() -> &'static str {
        r#"# botdash configuration
#
# Precedence (highest last): built-in defaults, ~/.botdash/config.toml,
# .botdash.toml in the working directory, BOTDASH_* environment variables.

[server]
# Base URL of the trading-bot service.
base_url = "http://127.0.0.1:5000"
# Per-request timeout in milliseconds.
timeout_ms = 10000

[polling]
# Seconds between status polls after a successful poll.
interval_secs = 10
# Seconds before retrying after a failed poll.
retry_secs = 30

[alerts]
# Seconds an alert stays visible.
ttl_secs = 5

[layout]
# Abbreviate table headers when the terminal is narrower than this.
compact_below = 100
# Fixed terminal width; 0 reads $COLUMNS.
width = 0

[panels]
wallet = true
history = true

[logging]
enabled = true
# Empty uses ~/.botdash/dashboard.log
path = ""
"#
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = DashConfig::default();
        assert_eq!(cfg.server.base_url, "http://127.0.0.1:5000");
        assert_eq!(cfg.polling.interval_secs, 10);
        assert_eq!(cfg.polling.retry_secs, 30);
        assert_eq!(cfg.alerts.ttl_secs, 5);
        assert_eq!(cfg.layout.compact_below, 100);
        assert!(cfg.panels.wallet);
        assert!(cfg.logging.enabled);
    }

    #[test]
    fn default_toml_parses_to_defaults() {
        let parsed: DashConfig = toml::from_str(DashConfig::default_toml()).unwrap();
        assert_eq!(parsed.server.timeout_ms, 10_000);
        assert_eq!(parsed.polling.retry_secs, 30);
        assert_eq!(parsed.layout.width, 0);
        assert!(parsed.panels.history);
    }

    #[test]
    fn partial_file_fills_missing_sections() {
        let parsed: DashConfig = toml::from_str(
            r#"
[server]
base_url = "http://bots.local:8080"
"#,
        )
        .unwrap();
        assert_eq!(parsed.server.base_url, "http://bots.local:8080");
        assert_eq!(parsed.server.timeout_ms, 10_000);
        assert_eq!(parsed.polling.interval_secs, 10);
    }

    #[test]
    fn fixed_width_wins_over_detection() {
        let layout = LayoutConfig {
            compact_below: 100,
            width: 80,
        };
        assert_eq!(layout.initial_width(), 80);
    }
}
