//! The dashboard controller.
//!
//! [`Dashboard`] owns every piece of view state for one session: tabs,
//! tables, forms, the alert board, the results modal and the
//! insufficient-balance overlay. It never touches the network. User
//! actions turn into [`Request`]s for the runtime to run, and finished
//! requests come back through [`Dashboard::apply`] as [`Reply`]s.
//!
//! Row buttons carry an [`Action`]; every one of them goes through
//! [`Dashboard::dispatch`], the single delegation point for table actions.

pub mod alerts;
pub mod bots;
pub mod format;
pub mod simulations;
pub mod table;
pub mod tabs;
pub mod wallet;

use std::time::{Duration, Instant};

use chrono::Local;

use crate::api::types::SimulationStartRequest;
use crate::api::{ApiError, Reply, Request};
use crate::config::schema::DashConfig;
use crate::diagnostics::DiagnosticLog;

use alerts::{AlertBoard, BalanceNotice, OverlayDismiss, Severity};
use bots::{BotForm, bot_table, fill_bot_table};
use simulations::{
    HISTORY_ERROR, HistoryPanel, ModalDismiss, ResultsModal, ResultsView, SimulationForm,
    simulation_row, simulation_table,
};
use table::Table;
use tabs::{Tab, Tabs};
use wallet::WalletPanel;

/// What a row button does, addressed by the id of its row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    StopBot(String),
    ExecuteSimulation(String),
    ShowResults(String),
    StopSimulation(String),
}

impl Action {
    pub fn request(&self) -> Request {
        match self {
            Self::StopBot(id) => Request::StopBot(id.clone()),
            Self::ExecuteSimulation(id) => Request::ExecuteSimulation(id.clone()),
            Self::ShowResults(id) => Request::SimulationResults(id.clone()),
            Self::StopSimulation(id) => Request::StopSimulation(id.clone()),
        }
    }
}

/// Session options resolved from config.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOptions {
    pub wallet_panel: bool,
    pub history_panel: bool,
    pub alert_ttl: Duration,
    pub compact_below: u16,
    pub width: u16,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            wallet_panel: true,
            history_panel: true,
            alert_ttl: Duration::from_secs(5),
            compact_below: 100,
            width: crate::config::schema::FALLBACK_WIDTH,
        }
    }
}

impl DashboardOptions {
    pub fn from_config(config: &DashConfig) -> Self {
        Self {
            wallet_panel: config.panels.wallet,
            history_panel: config.panels.history,
            alert_ttl: Duration::from_secs(config.alerts.ttl_secs),
            compact_below: config.layout.compact_below,
            width: config.layout.initial_width(),
        }
    }
}

/// Follow-up work produced by applying a reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Effects {
    /// Requests to issue next.
    pub requests: Vec<Request>,
    /// The bot list changed; poll status as soon as possible.
    pub refresh_status: bool,
    /// A status poll settled, with its outcome.
    pub poll_settled: Option<bool>,
}

pub struct Dashboard {
    tabs: Tabs,
    alerts: AlertBoard,
    bots: Table,
    simulations: Table,
    bot_form: BotForm,
    simulation_form: SimulationForm,
    history: Option<HistoryPanel>,
    wallet: Option<WalletPanel>,
    modal: ResultsModal,
    overlay: Option<BalanceNotice>,
    width: u16,
    compact_below: u16,
    log: DiagnosticLog,
}

impl Dashboard {
    pub fn new(options: DashboardOptions, log: DiagnosticLog) -> Self {
        let mut available = vec![Tab::Bots, Tab::Simulations];
        if options.history_panel {
            available.push(Tab::History);
        }
        if options.wallet_panel {
            available.push(Tab::Wallet);
        }

        let mut bots = bot_table();
        fill_bot_table(&mut bots, None);

        let mut dashboard = Self {
            tabs: Tabs::new(available),
            alerts: AlertBoard::new(options.alert_ttl),
            bots,
            simulations: simulation_table(),
            bot_form: BotForm::default(),
            simulation_form: SimulationForm::default(),
            history: options.history_panel.then(HistoryPanel::default),
            wallet: options.wallet_panel.then(WalletPanel::default),
            modal: ResultsModal::default(),
            overlay: None,
            width: options.width,
            compact_below: options.compact_below,
            log,
        };
        dashboard.apply_layout();
        dashboard
    }

    /// Loads issued once at start-up, besides the status poll.
    pub fn startup_requests(&self) -> Vec<Request> {
        self.refresh_wallet()
            .into_iter()
            .chain(self.refresh_history())
            .collect()
    }

    // -- Accessors --

    pub fn tabs(&self) -> &Tabs {
        &self.tabs
    }

    pub fn alerts(&self) -> &AlertBoard {
        &self.alerts
    }

    pub fn bots(&self) -> &Table {
        &self.bots
    }

    pub fn simulations(&self) -> &Table {
        &self.simulations
    }

    pub fn bot_form(&self) -> &BotForm {
        &self.bot_form
    }

    pub fn bot_form_mut(&mut self) -> &mut BotForm {
        &mut self.bot_form
    }

    pub fn simulation_form(&self) -> &SimulationForm {
        &self.simulation_form
    }

    pub fn simulation_form_mut(&mut self) -> &mut SimulationForm {
        &mut self.simulation_form
    }

    pub fn history(&self) -> Option<&HistoryPanel> {
        self.history.as_ref()
    }

    pub fn wallet(&self) -> Option<&WalletPanel> {
        self.wallet.as_ref()
    }

    pub fn modal(&self) -> &ResultsModal {
        &self.modal
    }

    pub fn overlay(&self) -> Option<&BalanceNotice> {
        self.overlay.as_ref()
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn is_compact(&self) -> bool {
        self.width < self.compact_below
    }

    pub fn log(&self) -> &DiagnosticLog {
        &self.log
    }

    /// Post an alert from outside the reply path (bad commands, missing rows).
    pub fn notify(&mut self, severity: Severity, message: impl Into<String>, now: Instant) {
        self.alerts.push(severity, message, now);
    }

    // -- User input --

    /// Switch tabs. A tab whose panel is disabled gets a warning instead.
    pub fn activate_tab(&mut self, tab: Tab, now: Instant) -> bool {
        if self.tabs.activate(tab) {
            return true;
        }
        self.alerts.push(
            Severity::Warning,
            format!("Aba indisponível: {}", tab.title()),
            now,
        );
        false
    }

    /// Submit the bot form. Both currency codes are required.
    pub fn submit_bot_form(&mut self, now: Instant) -> Option<Request> {
        let request = self.bot_form.to_request();
        if !self.require_pair(&request.stock_code, &request.operation_code, now) {
            return None;
        }
        Some(Request::StartBot(request))
    }

    /// Submit the simulation form. Both currency codes are required.
    pub fn submit_simulation_form(&mut self, now: Instant) -> Option<Request> {
        let request = self.simulation_form.to_request();
        if !self.require_pair(&request.stock_code, &request.operation_code, now) {
            return None;
        }
        Some(Request::StartSimulation(request))
    }

    fn require_pair(&mut self, stock_code: &str, operation_code: &str, now: Instant) -> bool {
        if !stock_code.is_empty() && !operation_code.is_empty() {
            return true;
        }
        self.alerts.push(
            Severity::Warning,
            "Preencha os campos obrigatórios: stock_code, operation_code",
            now,
        );
        false
    }

    /// The delegation point for every row button.
    pub fn dispatch(&mut self, action: &Action) -> Request {
        self.log.info(&format!("action {action:?}"));
        action.request()
    }

    pub fn refresh_wallet(&self) -> Option<Request> {
        self.wallet.as_ref().map(|_| Request::Wallet)
    }

    pub fn refresh_history(&self) -> Option<Request> {
        self.history.as_ref().map(|_| Request::SimulationHistory)
    }

    pub fn dismiss_modal(&mut self, how: ModalDismiss) -> bool {
        self.modal.dismiss(how)
    }

    /// Close the insufficient-balance overlay. The wallet action also
    /// opens the wallet tab.
    pub fn dismiss_overlay(&mut self, how: OverlayDismiss) -> bool {
        if self.overlay.take().is_none() {
            return false;
        }
        if how == OverlayDismiss::GotoWallet {
            self.tabs.activate(Tab::Wallet);
        }
        true
    }

    /// An empty input line: closes the overlay if it is up, else the modal.
    pub fn click_outside(&mut self) -> bool {
        if self.overlay.is_some() {
            return self.dismiss_overlay(OverlayDismiss::Backdrop);
        }
        self.dismiss_modal(ModalDismiss::Outside)
    }

    pub fn dismiss_alert(&mut self, position: usize) -> bool {
        self.alerts.dismiss_at(position)
    }

    pub fn resize(&mut self, width: u16) {
        self.width = width;
        self.apply_layout();
    }

    /// Expire alerts. Returns `true` when something changed on screen.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.alerts.sweep(now) > 0
    }

    /// Earliest moment the screen changes on its own.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.alerts.next_expiry()
    }

    fn apply_layout(&mut self) {
        let compact = self.is_compact();
        self.bots.apply_layout(compact);
        self.simulations.apply_layout(compact);
        if let Some(history) = &mut self.history {
            history.table.apply_layout(compact);
        }
        if let Some(wallet) = &mut self.wallet {
            wallet.table.apply_layout(compact);
        }
        if let Some(view) = self.modal.content_mut() {
            view.trades.apply_layout(compact);
        }
    }

    // -- Replies --

    /// Fold a finished request into the view.
    pub fn apply(&mut self, reply: Reply, now: Instant) -> Effects {
        let mut effects = Effects::default();
        match reply {
            Reply::Status(result) => {
                effects.poll_settled = Some(result.is_ok());
                match result {
                    Ok(payload) => fill_bot_table(&mut self.bots, payload.active_bots.as_deref()),
                    Err(e) => self.log.error(&format!("status poll failed: {e}")),
                }
            }

            Reply::BotStarted(Ok(started)) => {
                let message = match (&started.bot_id, &started.message) {
                    (Some(id), _) => format!("Bot {id} iniciado com sucesso!"),
                    (None, Some(message)) => message.clone(),
                    (None, None) => "Bot iniciado com sucesso!".to_string(),
                };
                self.alerts.push(Severity::Success, message, now);
                self.bot_form.clear();
                effects.refresh_status = true;
            }
            Reply::BotStarted(Err(e)) => {
                self.report_failure("iniciar bot", "Falha ao iniciar bot", &e, now);
            }

            Reply::BotStopped { bot_id, result } => match result {
                Ok(stopped) => {
                    let message = stopped
                        .message
                        .unwrap_or_else(|| format!("Bot {bot_id} parado com sucesso!"));
                    self.alerts.push(Severity::Success, message, now);
                    effects.refresh_status = true;
                }
                Err(e) => self.report_failure("parar bot", "Falha ao parar bot", &e, now),
            },

            Reply::SimulationStarted { request, result } => match result {
                Ok(started) => self.simulation_started(&started.simulation_id, &request, now),
                Err(e) => self.report_failure(
                    "iniciar simulação",
                    "Falha ao iniciar simulação",
                    &e,
                    now,
                ),
            },

            Reply::SimulationExecuted {
                simulation_id,
                result,
            } => match result {
                Ok(()) => {
                    self.alerts
                        .push(Severity::Success, "Passo executado com sucesso!", now);
                    effects
                        .requests
                        .push(Request::SimulationResults(simulation_id));
                }
                Err(e) => self.report_failure(
                    "executar simulação",
                    "Falha ao executar simulação",
                    &e,
                    now,
                ),
            },

            Reply::SimulationResults {
                simulation_id,
                result,
            } => match result {
                Ok(results) => {
                    let mut view = ResultsView::build(&simulation_id, &results);
                    view.trades.apply_layout(self.is_compact());
                    self.modal.populate(view);
                }
                Err(e) => {
                    self.report_failure("obter resultados", "Falha ao obter resultados", &e, now)
                }
            },

            Reply::SimulationStopped {
                simulation_id,
                result,
            } => match result {
                Ok(()) => {
                    self.simulations.remove_keyed(&simulation_id);
                    self.alerts
                        .push(Severity::Success, "Simulação finalizada com sucesso!", now);
                    effects
                        .requests
                        .push(Request::SimulationResults(simulation_id));
                }
                Err(e) => {
                    self.report_failure("parar simulação", "Falha ao parar simulação", &e, now)
                }
            },

            Reply::SimulationHistory(result) => {
                let Some(panel) = &mut self.history else {
                    return effects;
                };
                match result {
                    Ok(simulations) => panel.show(&simulations),
                    Err(e) => {
                        let text = match e.server_message() {
                            Some(message) if !e.is_transport() => {
                                format!("{HISTORY_ERROR}: {message}")
                            }
                            _ => HISTORY_ERROR.to_string(),
                        };
                        if e.is_transport() {
                            self.log.error(&format!("simulation history failed: {e}"));
                        }
                        panel.fail(text);
                    }
                }
            }

            Reply::Wallet(result) => {
                let Some(panel) = &mut self.wallet else {
                    return effects;
                };
                match result {
                    Ok(payload) => panel.show(&payload, Local::now()),
                    Err(e) => {
                        if e.is_transport() {
                            self.log.error(&format!("wallet load failed: {e}"));
                        }
                        panel.fail(&e);
                    }
                }
            }
        }
        effects
    }

    fn simulation_started(&mut self, simulation_id: &str, request: &SimulationStartRequest, now: Instant) {
        self.alerts.push(
            Severity::Success,
            format!("Simulação {simulation_id} iniciada com sucesso!"),
            now,
        );
        self.simulation_form.clear();
        self.simulations.push_row(simulation_row(
            simulation_id,
            &request.stock_code,
            &request.operation_code,
        ));
    }

    /// Surface a failed action. Insufficient funds raise the overlay,
    /// transport failures are logged and get a generic alert, rejections
    /// show the server text or `fallback`.
    fn report_failure(&mut self, verb: &str, fallback: &str, error: &ApiError, now: Instant) {
        match error {
            ApiError::InsufficientBalance(notice) => {
                self.log.warn(&format!("{verb}: insufficient balance {notice:?}"));
                self.overlay = Some(BalanceNotice::from_error(notice));
            }
            e if e.is_transport() => {
                self.log.error(&format!("{verb}: {e}"));
                self.alerts.push(
                    Severity::Danger,
                    format!("Erro ao {verb}. Verifique o log de diagnóstico para mais detalhes."),
                    now,
                );
            }
            e => {
                let message = e.server_message().unwrap_or(fallback);
                self.alerts
                    .push(Severity::Danger, format!("Erro: {message}"), now);
            }
        }
    }
}
