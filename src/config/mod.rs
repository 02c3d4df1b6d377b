/// Configuration system for botdash.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::DashConfig::default()`]
/// 2. **User global config**: `~/.botdash/config.toml`
/// 3. **Project local config**: `.botdash.toml` in the current working directory
/// 4. **Environment variables**: `BOTDASH_*` overrides (highest precedence)
///
/// The TOML layers are merged key by key before deserializing, and every
/// schema field has a `serde(default)`, so a layer only changes the keys it
/// actually sets.
///
/// # Usage
///
/// ```rust,ignore
/// use botdash::config;
///
/// let cfg = config::load();
/// let client = HttpBackend::from_config(&cfg.server);
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::DashConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved botdash configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars.
pub fn load() -> DashConfig {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    // Layer 2: user global config (~/.botdash/config.toml)
    if let Some(global) = load_toml_file(global_config_path()) {
        merge_layer(&mut merged, global);
    }

    // Layer 3: project local config (.botdash.toml)
    if let Some(project) = load_toml_file(project_config_path()) {
        merge_layer(&mut merged, project);
    }

    let mut config: DashConfig = merged.try_into().unwrap_or_default();

    // Layer 4: environment variable overrides
    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Malformed files, including ones with values of the wrong type, are
/// ignored; a broken config file must never keep the dashboard from
/// starting.
fn load_toml_file(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    let value: toml::Value = toml::from_str(&content).ok()?;
    value.clone().try_into::<DashConfig>().ok()?;
    Some(value)
}

/// Merge a config layer into the layers below it, key by key. Tables merge
/// recursively; any other value replaces what was there.
fn merge_layer(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_layer(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Directory holding botdash's user files: `~/.botdash`.
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".botdash"))
}

fn global_config_path() -> Option<PathBuf> {
    home_dir().map(|dir| dir.join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".botdash.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `BOTDASH_URL`: service base URL
/// - `BOTDASH_TIMEOUT_MS`: request timeout
/// - `BOTDASH_POLL_SECS`: poll interval after success
/// - `BOTDASH_RETRY_SECS`: poll interval after failure
/// - `BOTDASH_LOG`: diagnostic log on/off (`1`/`true`/`yes`/`on`)
fn apply_env_overrides(config: &mut DashConfig) {
    if let Ok(val) = std::env::var("BOTDASH_URL")
        && !val.is_empty()
    {
        config.server.base_url = val;
    }
    if let Ok(val) = std::env::var("BOTDASH_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.server.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("BOTDASH_POLL_SECS")
        && let Ok(secs) = val.parse::<u64>()
    {
        config.polling.interval_secs = secs;
    }
    if let Ok(val) = std::env::var("BOTDASH_RETRY_SECS")
        && let Ok(secs) = val.parse::<u64>()
    {
        config.polling.retry_secs = secs;
    }
    if let Ok(val) = std::env::var("BOTDASH_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
pub(crate) fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.botdash/config.toml`.
///
/// Returns an error if the file already exists and `force` is not set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.botdash/ directory")?;
    }

    fs::write(&path, DashConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Supports dotted keys like `server.base_url`. The written file holds the
/// defaults plus whatever the existing file already set.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let defaults = toml::to_string_pretty(&DashConfig::default())
        .context("failed to serialize default config")?;
    let mut root: toml::Value =
        toml::from_str(&defaults).context("failed to parse default config")?;
    if path.exists() {
        let source = fs::read_to_string(&path).context("failed to read config file")?;
        let existing: toml::Value =
            toml::from_str(&source).context("failed to parse config as TOML value")?;
        merge_layer(&mut root, existing);
    }
    set_toml_value(&mut root, key, value)?;

    // Refuse to write something the loader would silently discard.
    let rendered = toml::to_string_pretty(&root).context("failed to serialize config")?;
    toml::from_str::<DashConfig>(&rendered)
        .with_context(|| format!("'{value}' is not a valid value for '{key}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, rendered).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("invalid config key: '{key}'");
    }

    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];
    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::String(_)) => toml::Value::String(raw_value.to_string()),
        Some(_) => anyhow::bail!("unsupported value type at '{key}'"),
        None => anyhow::bail!("config key not found: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("YES"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn set_toml_value_updates_string() {
        let mut root: toml::Value = toml::from_str(
            r#"
[server]
base_url = "http://127.0.0.1:5000"
"#,
        )
        .unwrap();
        set_toml_value(&mut root, "server.base_url", "http://bots:9000").unwrap();
        assert_eq!(
            root["server"]["base_url"].as_str(),
            Some("http://bots:9000")
        );
    }

    #[test]
    fn set_toml_value_updates_integer_and_bool() {
        let mut root: toml::Value = toml::from_str(
            r#"
[polling]
interval_secs = 10

[panels]
wallet = true
"#,
        )
        .unwrap();
        set_toml_value(&mut root, "polling.interval_secs", "3").unwrap();
        set_toml_value(&mut root, "panels.wallet", "off").unwrap();
        assert_eq!(root["polling"]["interval_secs"].as_integer(), Some(3));
        assert_eq!(root["panels"]["wallet"].as_bool(), Some(false));
    }

    #[test]
    fn set_toml_value_rejects_bad_integer() {
        let mut root: toml::Value = toml::from_str("[polling]\nretry_secs = 30\n").unwrap();
        assert!(set_toml_value(&mut root, "polling.retry_secs", "soon").is_err());
    }

    #[test]
    fn set_toml_value_rejects_unknown_keys() {
        let mut root: toml::Value = toml::from_str("[server]\ntimeout_ms = 1\n").unwrap();
        assert!(set_toml_value(&mut root, "nonexistent.key", "x").is_err());
        assert!(set_toml_value(&mut root, "server.nope", "x").is_err());
        assert!(set_toml_value(&mut root, "server.", "x").is_err());
    }

    #[test]
    fn layers_merge_key_by_key() {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        merge_layer(
            &mut merged,
            toml::from_str("[server]\nbase_url = \"http://global:1\"\ntimeout_ms = 500\n").unwrap(),
        );
        merge_layer(
            &mut merged,
            toml::from_str("[server]\nbase_url = \"http://project:2\"\n").unwrap(),
        );
        let config: DashConfig = merged.try_into().unwrap();
        assert_eq!(config.server.base_url, "http://project:2");
        assert_eq!(config.server.timeout_ms, 500);
        assert_eq!(config.polling.interval_secs, 10);
    }

    #[test]
    fn show_effective_config_round_trips() {
        let toml_str = show_effective_config().unwrap();
        let _: DashConfig = toml::from_str(&toml_str).unwrap();
    }
}
