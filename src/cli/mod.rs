//! CLI command implementations for botdash.
//!
//! Provides subcommand handlers for:
//! - `botdash watch`: the interactive dashboard (default command)
//! - `botdash status` / `botdash wallet`: one-shot views
//! - `botdash bot start|stop`: bot lifecycle
//! - `botdash sim start|exec|results|stop|history`: simulations
//! - `botdash config show|init|set|reset`: configuration management
//!
//! One-shot commands drive the same [`Dashboard`] as `watch`, run their
//! request and its follow-ups to completion, then print the resulting
//! view. A failed primary request makes the command exit with an error.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::{Value, json};

use crate::api::{Backend, HttpBackend, Reply, Request};
use crate::config::{self, DashConfig};
use crate::dashboard::{Dashboard, DashboardOptions};
use crate::diagnostics::DiagnosticLog;
use crate::poller::RetryPolicy;
use crate::render::{self, RenderOptions};
use crate::runtime;

/// Output format for one-shot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

/// How a one-shot command prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Output {
    pub format: OutputFormat,
    pub color: bool,
}

impl Output {
    fn render(&self) -> RenderOptions {
        RenderOptions { color: self.color }
    }
}

// ---------------------------------------------------------------------------
// botdash watch
// ---------------------------------------------------------------------------

/// Run the interactive dashboard.
pub fn run_watch(config: &DashConfig, color: bool) -> Result<()> {
    let log = DiagnosticLog::from_config(&config.logging);
    log.info(&format!("watch started against {}", config.server.base_url));

    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::from_config(&config.server));
    let dash = Dashboard::new(DashboardOptions::from_config(config), log);
    let title = format!("{} · {}", "botdash".bold(), config.server.base_url);

    runtime::watch(
        dash,
        backend,
        RetryPolicy::from_config(&config.polling),
        RenderOptions { color },
        &title,
    )
}

// ---------------------------------------------------------------------------
// One-shot commands
// ---------------------------------------------------------------------------

/// Which part of the dashboard a command prints afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Bots,
    Simulations,
    Results,
    History,
    Wallet,
}

struct Session {
    dash: Dashboard,
    backend: HttpBackend,
}

impl Session {
    fn open(config: &DashConfig) -> Self {
        let options = DashboardOptions {
            wallet_panel: true,
            history_panel: true,
            ..DashboardOptions::from_config(config)
        };
        Self {
            dash: Dashboard::new(options, DiagnosticLog::from_config(&config.logging)),
            backend: HttpBackend::from_config(&config.server),
        }
    }

    fn execute(mut self, request: Request, view: View, out: Output) -> Result<()> {
        let label = request.describe();
        let replies = runtime::run_once(&mut self.dash, &self.backend, vec![request]);
        let failure = replies.first().and_then(Reply::error).cloned();

        match out.format {
            OutputFormat::Json => {
                if failure.is_none() {
                    let values = replies
                        .iter()
                        .map(reply_json)
                        .collect::<serde_json::Result<Vec<Value>>>()?;
                    let value = match <[Value; 1]>::try_from(values) {
                        Ok([single]) => single,
                        Err(values) => Value::Array(values),
                    };
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
            }
            OutputFormat::Table => {
                let opts = out.render();
                print!("{}", render::alerts(self.dash.alerts(), &opts));
                if let Some(notice) = self.dash.overlay() {
                    print!("{}", render::overlay(notice, &opts));
                }
                if failure.is_none() {
                    print!("{}", self.view(view, &opts));
                }
            }
        }

        match failure {
            Some(e) => Err(anyhow::Error::new(e).context(format!("{label} failed"))),
            None => Ok(()),
        }
    }

    fn view(&self, view: View, opts: &RenderOptions) -> String {
        match view {
            View::Bots => render::table(self.dash.bots(), opts),
            View::Simulations => render::table(self.dash.simulations(), opts),
            View::Results => self
                .dash
                .modal()
                .content()
                .map(|v| render::results(v, opts))
                .unwrap_or_default(),
            View::History => self
                .dash
                .history()
                .map(|h| render::history(h, opts))
                .unwrap_or_default(),
            View::Wallet => self
                .dash
                .wallet()
                .map(|w| render::wallet(w, opts))
                .unwrap_or_default(),
        }
    }
}

/// JSON for the payload of a successful reply.
fn reply_json(reply: &Reply) -> serde_json::Result<Value> {
    match reply {
        Reply::Status(Ok(payload)) => serde_json::to_value(payload),
        Reply::BotStarted(Ok(started)) => serde_json::to_value(started),
        Reply::BotStopped {
            result: Ok(stopped),
            ..
        } => serde_json::to_value(stopped),
        Reply::SimulationStarted {
            result: Ok(started),
            ..
        } => serde_json::to_value(started),
        Reply::SimulationExecuted {
            simulation_id,
            result: Ok(()),
        }
        | Reply::SimulationStopped {
            simulation_id,
            result: Ok(()),
        } => Ok(json!({ "success": true, "simulation_id": simulation_id })),
        Reply::SimulationResults {
            result: Ok(results),
            ..
        } => serde_json::to_value(results),
        Reply::SimulationHistory(Ok(simulations)) => serde_json::to_value(simulations),
        Reply::Wallet(Ok(payload)) => serde_json::to_value(payload),
        failed => Ok(json!({
            "error": failed.error().map(|e| e.to_string()),
        })),
    }
}

/// Show the running bots.
pub fn run_status(config: &DashConfig, out: Output) -> Result<()> {
    Session::open(config).execute(Request::Status, View::Bots, out)
}

/// Show wallet balances.
pub fn run_wallet(config: &DashConfig, out: Output) -> Result<()> {
    Session::open(config).execute(Request::Wallet, View::Wallet, out)
}

/// Start a bot from `field=value` form input.
pub fn run_bot_start(config: &DashConfig, fields: &[(&str, String)], out: Output) -> Result<()> {
    let mut session = Session::open(config);
    for (field, value) in fields {
        session.dash.bot_form_mut().set(field, value)?;
    }
    let request = session
        .dash
        .submit_bot_form(Instant::now())
        .context("stock_code and operation_code are required")?;
    session.execute(request, View::Bots, out)
}

pub fn run_bot_stop(config: &DashConfig, bot_id: &str, out: Output) -> Result<()> {
    Session::open(config).execute(Request::StopBot(bot_id.to_string()), View::Bots, out)
}

/// Start a simulation from `field=value` form input.
pub fn run_sim_start(config: &DashConfig, fields: &[(&str, String)], out: Output) -> Result<()> {
    let mut session = Session::open(config);
    for (field, value) in fields {
        session.dash.simulation_form_mut().set(field, value)?;
    }
    let request = session
        .dash
        .submit_simulation_form(Instant::now())
        .context("stock_code and operation_code are required")?;
    session.execute(request, View::Simulations, out)
}

/// Execute one simulation step and show the results.
pub fn run_sim_exec(config: &DashConfig, simulation_id: &str, out: Output) -> Result<()> {
    Session::open(config).execute(
        Request::ExecuteSimulation(simulation_id.to_string()),
        View::Results,
        out,
    )
}

pub fn run_sim_results(config: &DashConfig, simulation_id: &str, out: Output) -> Result<()> {
    Session::open(config).execute(
        Request::SimulationResults(simulation_id.to_string()),
        View::Results,
        out,
    )
}

/// Stop a simulation and show its final results.
pub fn run_sim_stop(config: &DashConfig, simulation_id: &str, out: Output) -> Result<()> {
    Session::open(config).execute(
        Request::StopSimulation(simulation_id.to_string()),
        View::Results,
        out,
    )
}

pub fn run_sim_history(config: &DashConfig, out: Output) -> Result<()> {
    Session::open(config).execute(Request::SimulationHistory, View::History, out)
}

// ---------------------------------------------------------------------------
// botdash config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective botdash Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.botdash/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.botdash/config.toml (not found)".dimmed()
        );
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".botdash.toml".dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), ".botdash.toml (not found)".dimmed());
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "BOTDASH_* environment variables".dimmed()
    );

    Ok(())
}

/// Initialize a default config file at `~/.botdash/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!(
        "  {}",
        "Edit the file to point botdash at your trading-bot service.".dimmed()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}
