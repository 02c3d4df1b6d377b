/// Dashboard controller tests.
///
/// Drive the controller the way the runtime does (commands in, requests
/// out, replies folded back) against an in-memory backend, so every
/// scenario runs without a network.
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::json;

use botdash::api::types::{
    BotStartRequest, BotStarted, BotStopped, InsufficientBalance, SimulationResults,
    SimulationStartRequest, SimulationStarted, SimulationSummary, StatusPayload, WalletPayload,
};
use botdash::api::{ApiError, Backend, Reply, Request};
use botdash::dashboard::alerts::Severity;
use botdash::dashboard::table::Row;
use botdash::dashboard::tabs::Tab;
use botdash::dashboard::{Dashboard, DashboardOptions};
use botdash::diagnostics::DiagnosticLog;
use botdash::poller::{Poller, RetryPolicy};
use botdash::runtime::commands::{self, Command, Target};
use botdash::runtime::{handle_command, run_once};

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

struct FakeBackend {
    status: Result<StatusPayload, ApiError>,
    start_bot: Result<BotStarted, ApiError>,
    stop_bot: Result<BotStopped, ApiError>,
    start_simulation: Result<SimulationStarted, ApiError>,
    execute: Result<(), ApiError>,
    results: Result<SimulationResults, ApiError>,
    stop_simulation: Result<(), ApiError>,
    history: Result<Vec<SimulationSummary>, ApiError>,
    wallet: Result<WalletPayload, ApiError>,
    calls: Mutex<Vec<String>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            status: Ok(StatusPayload::default()),
            start_bot: Ok(BotStarted {
                bot_id: Some("BTCUSDT_1".to_string()),
                message: None,
            }),
            stop_bot: Ok(BotStopped {
                message: Some("Bot parado".to_string()),
            }),
            start_simulation: Ok(SimulationStarted {
                simulation_id: "sim-1".to_string(),
            }),
            execute: Ok(()),
            results: Ok(SimulationResults::default()),
            stop_simulation: Ok(()),
            history: Ok(Vec::new()),
            wallet: Ok(WalletPayload::default()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeBackend {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Backend for FakeBackend {
    fn status(&self) -> Result<StatusPayload, ApiError> {
        self.record("status".to_string());
        self.status.clone()
    }

    fn start_bot(&self, request: &BotStartRequest) -> Result<BotStarted, ApiError> {
        self.record(format!("start_bot {}", request.symbol));
        self.start_bot.clone()
    }

    fn stop_bot(&self, bot_id: &str) -> Result<BotStopped, ApiError> {
        self.record(format!("stop_bot {bot_id}"));
        self.stop_bot.clone()
    }

    fn start_simulation(
        &self,
        request: &SimulationStartRequest,
    ) -> Result<SimulationStarted, ApiError> {
        self.record(format!("start_simulation {}", request.stock_code));
        self.start_simulation.clone()
    }

    fn execute_simulation(&self, simulation_id: &str) -> Result<(), ApiError> {
        self.record(format!("execute {simulation_id}"));
        self.execute.clone()
    }

    fn simulation_results(&self, simulation_id: &str) -> Result<SimulationResults, ApiError> {
        self.record(format!("results {simulation_id}"));
        self.results.clone()
    }

    fn stop_simulation(&self, simulation_id: &str) -> Result<(), ApiError> {
        self.record(format!("stop_simulation {simulation_id}"));
        self.stop_simulation.clone()
    }

    fn simulation_history(&self) -> Result<Vec<SimulationSummary>, ApiError> {
        self.record("history".to_string());
        self.history.clone()
    }

    fn wallet(&self) -> Result<WalletPayload, ApiError> {
        self.record("wallet".to_string());
        self.wallet.clone()
    }
}

fn dashboard() -> Dashboard {
    Dashboard::new(DashboardOptions::default(), DiagnosticLog::disabled())
}

/// Parse a command line and run whatever it requests.
fn type_line(dash: &mut Dashboard, backend: &FakeBackend, line: &str) -> Vec<Reply> {
    let command = commands::parse(line).unwrap();
    let handled = handle_command(dash, command, Instant::now());
    run_once(dash, backend, handled.requests)
}

fn last_alert(dash: &Dashboard) -> (Severity, String) {
    let alert = dash.alerts().last().expect("an alert");
    (alert.severity, alert.message.clone())
}

// ---------------------------------------------------------------------------
// Bots
// ---------------------------------------------------------------------------

#[test]
fn empty_bot_list_renders_one_placeholder_over_six_columns() {
    let backend = FakeBackend {
        status: Ok(serde_json::from_value(json!({"active_bots": []})).unwrap()),
        ..FakeBackend::default()
    };
    let mut dash = dashboard();
    run_once(&mut dash, &backend, vec![Request::Status]);

    assert_eq!(dash.bots().rows().len(), 1);
    let Row::Placeholder { text, colspan, .. } = &dash.bots().rows()[0] else {
        panic!("expected placeholder");
    };
    assert_eq!(text, "Nenhum bot em execução");
    assert_eq!(*colspan, 6);
}

#[test]
fn status_rows_follow_the_latest_payload() {
    let backend = FakeBackend {
        status: Ok(serde_json::from_value(json!({"active_bots": [
            {"id": "a", "stock_code": "BTC", "operation_code": "USDT", "position": "Comprado"},
            {"id": "b", "stock_code": "ETH", "operation_code": "USDT", "position": "Vendido"}
        ]}))
        .unwrap()),
        ..FakeBackend::default()
    };
    let mut dash = dashboard();
    run_once(&mut dash, &backend, vec![Request::Status]);
    assert_eq!(dash.bots().keys(), vec!["a", "b"]);

    let empty = FakeBackend::default();
    run_once(&mut dash, &empty, vec![Request::Status]);
    assert!(dash.bots().rows()[0].is_placeholder());
}

#[test]
fn start_bot_success_clears_form_and_refreshes_status() {
    let backend = FakeBackend::default();
    let mut dash = dashboard();

    type_line(&mut dash, &backend, "bot start stock=BTC op=USDT qty=0.001");

    assert_eq!(
        last_alert(&dash),
        (Severity::Success, "Bot BTCUSDT_1 iniciado com sucesso!".to_string())
    );
    assert!(dash.bot_form().is_empty());
    assert_eq!(backend.calls(), vec!["start_bot BTCUSDT", "status"]);
}

#[test]
fn start_bot_rejection_keeps_form_and_shows_server_text() {
    let backend = FakeBackend {
        start_bot: Err(ApiError::rejected("Chaves de API ausentes")),
        ..FakeBackend::default()
    };
    let mut dash = dashboard();

    type_line(&mut dash, &backend, "bot start stock=BTC op=USDT");

    assert_eq!(
        last_alert(&dash),
        (Severity::Danger, "Erro: Chaves de API ausentes".to_string())
    );
    assert_eq!(dash.bot_form().stock_code, "BTC");
    assert_eq!(backend.calls(), vec!["start_bot BTCUSDT"]);
}

#[test]
fn start_bot_transport_failure_gets_generic_alert() {
    let backend = FakeBackend {
        start_bot: Err(ApiError::transport("/api/bot/start", "connection refused")),
        ..FakeBackend::default()
    };
    let mut dash = dashboard();

    type_line(&mut dash, &backend, "bot start stock=BTC op=USDT");

    let (severity, message) = last_alert(&dash);
    assert_eq!(severity, Severity::Danger);
    assert!(message.starts_with("Erro ao iniciar bot."));
    assert!(!dash.bot_form().is_empty());
}

#[test]
fn insufficient_balance_overlay_leads_to_wallet() {
    let backend = FakeBackend {
        start_bot: Err(ApiError::InsufficientBalance(InsufficientBalance {
            currency: Some("USDT".to_string()),
            available_balance: Some(3.0),
            required_balance: Some(10.0),
        })),
        ..FakeBackend::default()
    };
    let mut dash = dashboard();

    type_line(&mut dash, &backend, "bot start stock=BTC op=USDT qty=1");
    let notice = dash.overlay().expect("overlay shown");
    assert_eq!(notice.missing, "7.00000000");

    type_line(&mut dash, &backend, "ok");
    assert!(dash.overlay().is_none());
    assert_eq!(dash.tabs().active(), Tab::Wallet);
}

#[test]
fn stop_bot_by_row_uses_row_id() {
    let backend = FakeBackend {
        status: Ok(serde_json::from_value(json!({"active_bots": [
            {"id": "BTCUSDT_7", "stock_code": "BTC", "operation_code": "USDT"}
        ]}))
        .unwrap()),
        ..FakeBackend::default()
    };
    let mut dash = dashboard();
    run_once(&mut dash, &backend, vec![Request::Status]);

    type_line(&mut dash, &backend, "bot stop #1");
    assert_eq!(
        backend.calls(),
        vec!["status", "stop_bot BTCUSDT_7", "status"]
    );
    assert_eq!(last_alert(&dash), (Severity::Success, "Bot parado".to_string()));
}

#[test]
fn missing_row_is_a_warning_not_a_request() {
    let backend = FakeBackend::default();
    let mut dash = dashboard();
    let replies = type_line(&mut dash, &backend, "sim stop #3");
    assert!(replies.is_empty());
    assert_eq!(last_alert(&dash).0, Severity::Warning);
}

// ---------------------------------------------------------------------------
// Simulations
// ---------------------------------------------------------------------------

fn started(dash: &mut Dashboard, id: &str) {
    dash.apply(
        Reply::SimulationStarted {
            request: SimulationStartRequest {
                stock_code: "BTC".to_string(),
                operation_code: "USDT".to_string(),
                quantity: Some(1.0),
                volatility_factor: None,
                stop_loss: None,
                acceptable_loss: None,
                fallback_activated: false,
            },
            result: Ok(SimulationStarted {
                simulation_id: id.to_string(),
            }),
        },
        Instant::now(),
    );
}

#[test]
fn simulation_start_adds_row_and_clears_form() {
    let backend = FakeBackend::default();
    let mut dash = dashboard();
    type_line(&mut dash, &backend, "sim start stock=BTC op=USDT quantity=2");

    assert_eq!(dash.simulations().keys(), vec!["sim-1"]);
    assert!(dash.simulation_form().is_empty());
    assert_eq!(
        last_alert(&dash).1,
        "Simulação sim-1 iniciada com sucesso!"
    );
}

#[test]
fn simulation_start_rejection_uses_fallback_text() {
    let backend = FakeBackend {
        start_simulation: Err(ApiError::Rejected { message: None }),
        ..FakeBackend::default()
    };
    let mut dash = dashboard();
    type_line(&mut dash, &backend, "sim start stock=BTC op=USDT");
    assert_eq!(
        last_alert(&dash).1,
        "Erro: Falha ao iniciar simulação"
    );
    assert!(dash.simulations().rows().is_empty());
}

#[test]
fn stopping_a_simulation_removes_exactly_that_row() {
    let backend = FakeBackend::default();
    let mut dash = dashboard();
    for id in ["s1", "s2", "s3"] {
        started(&mut dash, id);
    }

    type_line(&mut dash, &backend, "sim stop s2");

    assert_eq!(dash.simulations().keys(), vec!["s1", "s3"]);
    assert_eq!(backend.calls(), vec!["stop_simulation s2", "results s2"]);
    assert!(dash.modal().is_visible());
    assert_eq!(
        last_alert(&dash).1,
        "Simulação finalizada com sucesso!"
    );
}

#[test]
fn execute_step_alerts_then_shows_results() {
    let backend = FakeBackend::default();
    let mut dash = dashboard();
    started(&mut dash, "s1");

    type_line(&mut dash, &backend, "sim exec #1");

    assert_eq!(backend.calls(), vec!["execute s1", "results s1"]);
    assert_eq!(last_alert(&dash).1, "Passo executado com sucesso!");
    let view = dash.modal().content().expect("results shown");
    assert_eq!(view.title(), "Resultados da Simulação: s1");
}

#[test]
fn empty_results_show_zero_trades_and_placeholder_profit() {
    let backend = FakeBackend {
        results: Ok(serde_json::from_value(json!({
            "success": true,
            "trades": [],
            "statistics": {"profit_loss": null}
        }))
        .unwrap()),
        ..FakeBackend::default()
    };
    let mut dash = dashboard();
    type_line(&mut dash, &backend, "sim results s9");

    let view = dash.modal().content().expect("results shown");
    assert!(view.summary_lines().contains(&"Total de operações: 0".to_string()));
    assert!(view.profit_line.starts_with('-'));
}

#[test]
fn results_failure_keeps_modal_closed() {
    let backend = FakeBackend {
        results: Err(ApiError::rejected("Simulação não encontrada")),
        ..FakeBackend::default()
    };
    let mut dash = dashboard();
    type_line(&mut dash, &backend, "sim results nope");
    assert!(!dash.modal().is_visible());
    assert_eq!(last_alert(&dash).1, "Erro: Simulação não encontrada");
}

#[test]
fn modal_closes_on_outside_click_and_keeps_content() {
    let backend = FakeBackend::default();
    let mut dash = dashboard();
    type_line(&mut dash, &backend, "sim results s1");
    assert!(dash.modal().is_visible());

    type_line(&mut dash, &backend, "");
    assert!(!dash.modal().is_visible());
    assert!(dash.modal().content().is_some());
}

#[test]
fn history_rows_open_results() {
    let backend = FakeBackend {
        history: Ok(vec![SimulationSummary {
            id: Some("42".to_string()),
            operation_code: Some("USDT".to_string()),
            profit_loss: Some(1.5),
            ..SimulationSummary::default()
        }]),
        ..FakeBackend::default()
    };
    let mut dash = dashboard();
    type_line(&mut dash, &backend, "history");
    assert_eq!(dash.tabs().active(), Tab::History);

    let replies = type_line(&mut dash, &backend, "history view #1");
    assert!(matches!(
        &replies[0],
        Reply::SimulationResults { simulation_id, .. } if simulation_id == "42"
    ));
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

#[test]
fn wallet_totals_follow_server_values() {
    let backend = FakeBackend {
        wallet: Ok(serde_json::from_value(json!({
            "status": "success",
            "balances": [{"asset": "BTC", "free": "0.5", "locked": "0.1", "usdt_value": "30000"}]
        }))
        .unwrap()),
        ..FakeBackend::default()
    };
    let mut dash = dashboard();
    type_line(&mut dash, &backend, "wallet");

    let wallet = dash.wallet().expect("wallet panel");
    let Row::Data { cells, .. } = &wallet.table.rows()[0] else {
        panic!("expected data row");
    };
    assert_eq!(cells[3].plain(), "0.60000000");
    assert_eq!(wallet.total.label(), "30000.00 USDT");
    assert!(wallet.updated_label().is_some());
}

#[test]
fn empty_wallet_shows_zero_total() {
    let backend = FakeBackend {
        wallet: Ok(serde_json::from_value(json!({"balances": []})).unwrap()),
        ..FakeBackend::default()
    };
    let mut dash = dashboard();
    run_once(&mut dash, &backend, vec![Request::Wallet]);
    let wallet = dash.wallet().expect("wallet panel");
    assert_eq!(wallet.total.label(), "0.00 USDT");
    assert!(wallet.table.rows()[0].is_placeholder());
}

#[test]
fn wallet_failure_marks_total_as_error_without_alert() {
    let backend = FakeBackend {
        wallet: Err(ApiError::transport("/api/wallet", "timed out")),
        ..FakeBackend::default()
    };
    let mut dash = dashboard();
    run_once(&mut dash, &backend, vec![Request::Wallet]);
    assert_eq!(dash.wallet().map(|w| w.total.label()), Some("Erro".to_string()));
    assert!(dash.alerts().is_empty());
}

// ---------------------------------------------------------------------------
// Layout, alerts and polling
// ---------------------------------------------------------------------------

#[test]
fn resize_toggles_compact_headers() {
    let backend = FakeBackend::default();
    let mut dash = dashboard();
    type_line(&mut dash, &backend, "resize 80");
    assert_eq!(dash.bots().headers()[1], "2");
    assert_eq!(dash.bots().headers()[0], "Par");
    assert_eq!(dash.bots().headers()[5], "Ações");

    type_line(&mut dash, &backend, "resize 80");
    assert_eq!(dash.bots().headers()[1], "2");

    type_line(&mut dash, &backend, "resize 130");
    assert_eq!(dash.bots().headers()[1], "Posição");
}

#[test]
fn alerts_expire_and_can_be_dismissed() {
    let mut dash = dashboard();
    let now = Instant::now();
    handle_command(&mut dash, Command::Tab(Tab::Wallet), now);
    dash.notify(Severity::Info, "primeiro", now);
    dash.notify(Severity::Info, "segundo", now);

    handle_command(&mut dash, Command::Dismiss(1), now);
    assert_eq!(dash.alerts().alerts().len(), 1);
    assert_eq!(dash.alerts().alerts()[0].message, "segundo");

    assert!(dash.tick(now + Duration::from_secs(5)));
    assert!(dash.alerts().is_empty());
}

#[test]
fn refresh_after_start_pulls_next_poll_forward() {
    let start = Instant::now();
    let mut poller = Poller::new(RetryPolicy::default(), start);
    let mut dash = dashboard();

    assert!(poller.take_due(start));
    let effects = dash.apply(Reply::Status(Ok(StatusPayload::default())), start);
    poller.settle(effects.poll_settled.unwrap(), start);
    assert_eq!(poller.deadline(), Some(start + Duration::from_secs(10)));

    let later = start + Duration::from_secs(2);
    let effects = dash.apply(
        Reply::BotStarted(Ok(BotStarted {
            bot_id: Some("b".to_string()),
            message: None,
        })),
        later,
    );
    assert!(effects.refresh_status);
    poller.refresh(later);
    assert_eq!(poller.deadline(), Some(later));
}

#[test]
fn failed_poll_backs_off_to_retry_interval() {
    let start = Instant::now();
    let mut poller = Poller::new(RetryPolicy::default(), start);
    let mut dash = dashboard();

    assert!(poller.take_due(start));
    let effects = dash.apply(
        Reply::Status(Err(ApiError::transport("/api/status", "refused"))),
        start,
    );
    assert_eq!(
        poller.settle(effects.poll_settled.unwrap(), start),
        Some(Duration::from_secs(30))
    );
    assert!(dash.alerts().is_empty());
}

#[test]
fn unknown_tab_target_is_rejected() {
    let mut dash = Dashboard::new(
        DashboardOptions {
            wallet_panel: false,
            ..DashboardOptions::default()
        },
        DiagnosticLog::disabled(),
    );
    let handled = handle_command(&mut dash, Command::Wallet, Instant::now());
    assert!(handled.requests.is_empty());
    assert_eq!(dash.tabs().active(), Tab::Bots);
    assert_eq!(
        commands::parse("sim results #2"),
        Ok(Command::SimResults(Target::Row(2)))
    );
}
