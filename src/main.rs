use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use botdash::cli::{self, Output, OutputFormat};
use botdash::config;

#[derive(Debug, Parser)]
#[command(name = "botdash")]
#[command(about = "Terminal dashboard for a trading-bot HTTP API")]
struct App {
    /// Service base URL (overrides config and BOTDASH_URL)
    #[arg(long, global = true)]
    url: Option<String>,
    /// Disable ANSI colours
    #[arg(long, global = true)]
    no_color: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interactive dashboard: polls bot status, type `help` for commands
    Watch,
    /// Show running bots
    Status {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show wallet balances
    Wallet {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Start or stop a trading bot
    Bot {
        #[command(subcommand)]
        command: BotCommands,
    },
    /// Run and inspect simulations
    Sim {
        #[command(subcommand)]
        command: SimCommands,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Risk parameters shared by bots and simulations.
#[derive(Debug, Args)]
struct RiskArgs {
    /// Volatility factor
    #[arg(long)]
    volatility: Option<String>,
    /// Stop loss
    #[arg(long)]
    stop_loss: Option<String>,
    /// Acceptable loss
    #[arg(long)]
    acceptable_loss: Option<String>,
    /// Enable the fallback strategy
    #[arg(long)]
    fallback: bool,
}

#[derive(Debug, Subcommand)]
enum BotCommands {
    /// Start a bot
    Start {
        /// Asset to trade (e.g. BTC)
        #[arg(long)]
        stock: String,
        /// Quote currency (e.g. USDT)
        #[arg(long)]
        op: String,
        /// Quantity per trade
        #[arg(long)]
        qty: Option<String>,
        #[command(flatten)]
        risk: RiskArgs,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Stop a running bot
    Stop {
        id: String,
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[derive(Debug, Subcommand)]
enum SimCommands {
    /// Start a simulation
    Start {
        #[arg(long)]
        stock: String,
        #[arg(long)]
        op: String,
        #[arg(long)]
        qty: Option<String>,
        #[command(flatten)]
        risk: RiskArgs,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Execute one simulation step and show results
    Exec {
        id: String,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show a simulation's results
    Results {
        id: String,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Stop a simulation and show its final results
    Stop {
        id: String,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// List past simulations
    History {
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write the default config to ~/.botdash/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set one value, e.g. `server.base_url http://10.0.0.5:5000`
    Set { key: String, value: String },
    /// Reset the config file to defaults
    Reset,
}

/// Form fields for a start command, in `BotForm`/`SimulationForm` names.
fn form_fields(
    stock: String,
    op: String,
    qty: Option<String>,
    risk: RiskArgs,
) -> Vec<(&'static str, String)> {
    let mut fields = vec![("stock_code", stock), ("operation_code", op)];
    let optional = [
        ("quantity", qty),
        ("volatility_factor", risk.volatility),
        ("stop_loss", risk.stop_loss),
        ("acceptable_loss", risk.acceptable_loss),
    ];
    fields.extend(optional.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))));
    if risk.fallback {
        fields.push(("fallback_activated", "true".to_string()));
    }
    fields
}

fn main() -> Result<()> {
    let app = App::parse();

    if app.no_color {
        colored::control::set_override(false);
    }
    let color = !app.no_color;

    let mut cfg = config::load();
    if let Some(url) = app.url {
        cfg.server.base_url = url;
    }

    let out = |format: &str| Output {
        format: OutputFormat::from_str_opt(Some(format)),
        color,
    };

    match app.command.unwrap_or(Commands::Watch) {
        Commands::Watch => cli::run_watch(&cfg, color),
        Commands::Status { format } => cli::run_status(&cfg, out(&format)),
        Commands::Wallet { format } => cli::run_wallet(&cfg, out(&format)),
        Commands::Bot { command } => match command {
            BotCommands::Start {
                stock,
                op,
                qty,
                risk,
                format,
            } => cli::run_bot_start(&cfg, &form_fields(stock, op, qty, risk), out(&format)),
            BotCommands::Stop { id, format } => cli::run_bot_stop(&cfg, &id, out(&format)),
        },
        Commands::Sim { command } => match command {
            SimCommands::Start {
                stock,
                op,
                qty,
                risk,
                format,
            } => cli::run_sim_start(&cfg, &form_fields(stock, op, qty, risk), out(&format)),
            SimCommands::Exec { id, format } => cli::run_sim_exec(&cfg, &id, out(&format)),
            SimCommands::Results { id, format } => cli::run_sim_results(&cfg, &id, out(&format)),
            SimCommands::Stop { id, format } => cli::run_sim_stop(&cfg, &id, out(&format)),
            SimCommands::History { format } => cli::run_sim_history(&cfg, out(&format)),
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show => cli::run_config_show(),
            ConfigCommands::Init { force } => cli::run_config_init(force),
            ConfigCommands::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigCommands::Reset => cli::run_config_reset(),
        },
    }
}
