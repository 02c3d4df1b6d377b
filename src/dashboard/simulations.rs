//! Simulation table, start-simulation form, results modal and the
//! simulation history panel.

use super::Action;
use super::bots::{FormError, parse_number};
use super::format::{PLACEHOLDER, fixed, safe_format, text_or};
use super::table::{Button, Cell, Row, Table, Tone};
use crate::api::types::{SimulationResults, SimulationStartRequest, SimulationSummary, Trade};

pub const SIMULATION_HEADERS: [&str; 3] = ["ID", "Par", "Ações"];
pub const TRADE_HEADERS: [&str; 5] = ["Tipo", "Preço", "Quantidade", "Valor Total", "Data/Hora"];
pub const HISTORY_HEADERS: [&str; 5] = ["ID", "Moeda", "Data", "Resultado", "Ações"];

pub fn simulation_table() -> Table {
    Table::new(&SIMULATION_HEADERS)
}

/// Row for a simulation that was just started.
pub fn simulation_row(simulation_id: &str, stock_code: &str, operation_code: &str) -> Row {
    let id = simulation_id.to_string();
    Row::keyed(
        Some(id.clone()),
        vec![
            Cell::text(id.clone()),
            Cell::text(format!("{stock_code}/{operation_code}")),
            Cell::Buttons(vec![
                Button::new("Executar", Tone::Primary, Action::ExecuteSimulation(id.clone())),
                Button::new("Resultados", Tone::Success, Action::ShowResults(id.clone())),
                Button::new("Parar", Tone::Danger, Action::StopSimulation(id)),
            ]),
        ],
    )
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// Draft of the start-simulation form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationForm {
    pub stock_code: String,
    pub operation_code: String,
    pub quantity: String,
    pub volatility_factor: String,
    pub stop_loss: String,
    pub acceptable_loss: String,
    pub fallback_activated: bool,
}

impl SimulationForm {
    pub const FIELDS: [&'static str; 7] = [
        "stock_code",
        "operation_code",
        "quantity",
        "volatility_factor",
        "stop_loss",
        "acceptable_loss",
        "fallback_activated",
    ];

    pub fn set(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        let value = value.trim().to_string();
        match field.to_ascii_lowercase().as_str() {
            "stock" | "stock_code" => self.stock_code = value,
            "op" | "operation" | "operation_code" => self.operation_code = value,
            "qty" | "quantity" => self.quantity = value,
            "volatility" | "volatility_factor" => self.volatility_factor = value,
            "stop_loss" | "stop" => self.stop_loss = value,
            "acceptable_loss" | "loss" => self.acceptable_loss = value,
            "fallback" | "fallback_activated" => {
                self.fallback_activated = crate::config::is_truthy(&value);
            }
            other => return Err(FormError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn to_request(&self) -> SimulationStartRequest {
        SimulationStartRequest {
            stock_code: self.stock_code.trim().to_string(),
            operation_code: self.operation_code.trim().to_string(),
            quantity: parse_number(&self.quantity),
            volatility_factor: parse_number(&self.volatility_factor),
            stop_loss: parse_number(&self.stop_loss),
            acceptable_loss: parse_number(&self.acceptable_loss),
            fallback_activated: self.fallback_activated,
        }
    }
}

// ---------------------------------------------------------------------------
// Results modal
// ---------------------------------------------------------------------------

/// Content of the results modal for one simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub simulation_id: String,
    pub currency: String,
    pub trade_count: usize,
    /// `"{profit} ({percentage}%)"`, with `-` for missing numbers.
    pub profit_line: String,
    pub trades: Table,
}

impl ResultsView {
    pub fn build(simulation_id: &str, results: &SimulationResults) -> Self {
        let trades = results.trades.as_deref().unwrap_or_default();
        let stats = results.statistics.clone().unwrap_or_default();
        let currency = text_or(
            results
                .details
                .as_ref()
                .and_then(|d| d.operation_code.as_deref()),
            "N/A",
        );

        let mut table = Table::new(&TRADE_HEADERS);
        table.set_rows(trades.iter().map(trade_row).collect());

        Self {
            simulation_id: simulation_id.to_string(),
            currency,
            trade_count: trades.len(),
            profit_line: format!(
                "{} ({}%)",
                safe_format(stats.profit_loss, 2),
                safe_format(stats.profit_loss_percentage, 2)
            ),
            trades: table,
        }
    }

    pub fn title(&self) -> String {
        format!("Resultados da Simulação: {}", self.simulation_id)
    }

    /// Summary lines shown above the trade table.
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Moeda: {}", self.currency),
            format!("Total de operações: {}", self.trade_count),
            format!("Lucro/Prejuízo: {}", self.profit_line),
        ]
    }
}

fn trade_row(trade: &Trade) -> Row {
    let kind = text_or(trade.trade_type.as_deref(), PLACEHOLDER);
    let tone = if kind == "BUY" {
        Tone::Success
    } else {
        Tone::Danger
    };
    Row::keyed(
        None,
        vec![
            Cell::Badge(kind, tone),
            Cell::text(safe_format(trade.price, 2)),
            Cell::text(safe_format(trade.quantity, 2)),
            Cell::text(safe_format(trade.total_value, 2)),
            Cell::text(text_or(trade.timestamp.as_deref(), PLACEHOLDER)),
        ],
    )
}

/// How the modal was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalDismiss {
    CloseButton,
    Outside,
}

/// The results modal. Hiding it keeps the content until the next
/// population.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsModal {
    visible: bool,
    content: Option<ResultsView>,
}

impl ResultsModal {
    pub fn populate(&mut self, view: ResultsView) {
        self.content = Some(view);
        self.visible = true;
    }

    /// Hide the modal. Returns `false` if it was not showing.
    pub fn dismiss(&mut self, _how: ModalDismiss) -> bool {
        std::mem::replace(&mut self.visible, false)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn content(&self) -> Option<&ResultsView> {
        self.content.as_ref()
    }

    pub(crate) fn content_mut(&mut self) -> Option<&mut ResultsView> {
        self.content.as_mut()
    }
}

// ---------------------------------------------------------------------------
// History panel
// ---------------------------------------------------------------------------

pub const NO_SIMULATIONS: &str = "Nenhuma simulação encontrada.";
pub const HISTORY_ERROR: &str = "Erro ao carregar lista de simulações";

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryState {
    NotLoaded,
    Empty,
    Loaded,
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPanel {
    pub state: HistoryState,
    pub table: Table,
}

impl Default for HistoryPanel {
    fn default() -> Self {
        Self {
            state: HistoryState::NotLoaded,
            table: Table::new(&HISTORY_HEADERS),
        }
    }
}

impl HistoryPanel {
    pub fn show(&mut self, simulations: &[SimulationSummary]) {
        if simulations.is_empty() {
            self.table.set_rows(Vec::new());
            self.state = HistoryState::Empty;
            return;
        }
        self.table
            .set_rows(simulations.iter().map(history_row).collect());
        self.state = HistoryState::Loaded;
    }

    pub fn fail(&mut self, message: String) {
        self.table.set_rows(Vec::new());
        self.state = HistoryState::Error(message);
    }
}

fn history_row(sim: &SimulationSummary) -> Row {
    let profit = sim.profit_loss.filter(|v| *v != 0.0);
    let tone = if profit.is_some_and(|v| v > 0.0) {
        Tone::Success
    } else {
        Tone::Danger
    };
    let percentage = sim.profit_loss_percentage.filter(|v| *v != 0.0);
    let result = format!(
        "{} ({}%)",
        fixed(profit.unwrap_or(0.0), 2),
        fixed(percentage.unwrap_or(0.0), 2)
    );

    let buttons = match &sim.id {
        Some(id) => vec![Button::new(
            "Ver Detalhes",
            Tone::Primary,
            Action::ShowResults(id.clone()),
        )],
        None => Vec::new(),
    };

    Row::keyed(
        sim.id.clone(),
        vec![
            Cell::text(text_or(sim.id.as_deref(), PLACEHOLDER)),
            Cell::text(text_or(sim.operation_code.as_deref(), "N/A")),
            Cell::text(text_or(sim.created_at.as_deref(), "N/A")),
            Cell::Toned(result, tone),
            Cell::Buttons(buttons),
        ],
    )
}
