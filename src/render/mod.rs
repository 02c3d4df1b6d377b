//! Text rendering of the dashboard view model.
//!
//! Everything here is a pure function from view state to a `String`, so
//! the same code draws the interactive screen and the one-shot command
//! output. Column widths are measured on the plain text and colour is
//! applied after padding.

use colored::Colorize;

use crate::dashboard::Dashboard;
use crate::dashboard::alerts::{AlertBoard, BalanceNotice, Severity};
use crate::dashboard::bots::BotForm;
use crate::dashboard::simulations::{HistoryPanel, HistoryState, NO_SIMULATIONS, ResultsView, SimulationForm};
use crate::dashboard::table::{Cell, Row, Table, Tone};
use crate::dashboard::tabs::{Tab, Tabs};
use crate::dashboard::wallet::WalletPanel;

const COLUMN_GAP: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub color: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { color: true }
    }
}

impl RenderOptions {
    pub fn plain() -> Self {
        Self { color: false }
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        if !self.color {
            return text.to_string();
        }
        match tone {
            Tone::Plain => text.to_string(),
            Tone::Success => text.green().to_string(),
            Tone::Danger => text.red().to_string(),
            Tone::Warning => text.yellow().to_string(),
            Tone::Primary => text.blue().to_string(),
            Tone::Muted => text.dimmed().to_string(),
        }
    }

    fn strong(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().cyan().to_string()
        } else {
            text.to_string()
        }
    }
}

/// The whole interactive screen: tab bar, alerts, active panel, then the
/// modal and the overlay when they are up.
pub fn screen(dash: &Dashboard, opts: &RenderOptions) -> String {
    let mut out = String::new();
    out.push_str(&tab_bar(dash.tabs(), opts));
    out.push_str("\n\n");

    let board = alerts(dash.alerts(), opts);
    if !board.is_empty() {
        out.push_str(&board);
        out.push('\n');
    }

    out.push_str(&panel(dash, dash.tabs().active(), opts));

    if dash.modal().is_visible()
        && let Some(view) = dash.modal().content()
    {
        out.push('\n');
        out.push_str(&results(view, opts));
    }

    if let Some(notice) = dash.overlay() {
        out.push('\n');
        out.push_str(&overlay(notice, opts));
    }
    out
}

pub fn tab_bar(tabs: &Tabs, opts: &RenderOptions) -> String {
    tabs.available()
        .iter()
        .map(|tab| {
            if tabs.is_active(*tab) {
                opts.heading(&format!("[{}]", tab.title()))
            } else {
                opts.paint(&format!(" {} ", tab.title()), Tone::Muted)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn alerts(board: &AlertBoard, opts: &RenderOptions) -> String {
    let mut out = String::new();
    for (index, alert) in board.alerts().iter().enumerate() {
        let (mark, tone) = match alert.severity {
            Severity::Success => ("✓", Tone::Success),
            Severity::Danger => ("✗", Tone::Danger),
            Severity::Warning => ("!", Tone::Warning),
            Severity::Info => ("i", Tone::Primary),
        };
        out.push_str(&format!(
            "{} {} {}\n",
            opts.paint(&format!("({})", index + 1), Tone::Muted),
            opts.paint(mark, tone),
            alert.message
        ));
    }
    out
}

/// Body of one tab.
pub fn panel(dash: &Dashboard, tab: Tab, opts: &RenderOptions) -> String {
    match tab {
        Tab::Bots => {
            let mut out = opts.heading("Bots ativos");
            out.push('\n');
            out.push_str(&table(dash.bots(), opts));
            out.push_str(&bot_form(dash.bot_form(), opts));
            out
        }
        Tab::Simulations => {
            let mut out = opts.heading("Simulações");
            out.push('\n');
            if dash.simulations().rows().is_empty() {
                out.push_str(&opts.paint("Nenhuma simulação ativa", Tone::Muted));
                out.push('\n');
            } else {
                out.push_str(&table(dash.simulations(), opts));
            }
            out.push_str(&simulation_form(dash.simulation_form(), opts));
            out
        }
        Tab::History => dash
            .history()
            .map(|h| history(h, opts))
            .unwrap_or_default(),
        Tab::Wallet => dash
            .wallet()
            .map(|w| wallet(w, opts))
            .unwrap_or_default(),
    }
}

pub fn history(panel: &HistoryPanel, opts: &RenderOptions) -> String {
    let mut out = opts.heading("Histórico de simulações");
    out.push('\n');
    match &panel.state {
        HistoryState::NotLoaded => out.push_str(&opts.paint("Carregando...", Tone::Muted)),
        HistoryState::Empty => out.push_str(NO_SIMULATIONS),
        HistoryState::Error(message) => out.push_str(&opts.paint(message, Tone::Danger)),
        HistoryState::Loaded => return out + &table(&panel.table, opts),
    }
    out.push('\n');
    out
}

pub fn wallet(panel: &WalletPanel, opts: &RenderOptions) -> String {
    let mut out = opts.heading("Carteira");
    out.push('\n');
    out.push_str(&format!(
        "{} {}\n",
        opts.strong("Saldo total:"),
        panel.total.label()
    ));
    if let Some(updated) = panel.updated_label() {
        out.push_str(&opts.paint(&updated, Tone::Muted));
        out.push('\n');
    }
    out.push_str(&table(&panel.table, opts));
    out
}

fn bot_form(form: &BotForm, opts: &RenderOptions) -> String {
    let fields = [
        ("stock_code", form.stock_code.clone()),
        ("operation_code", form.operation_code.clone()),
        ("traded_quantity", form.traded_quantity.clone()),
        ("volatility_factor", form.volatility_factor.clone()),
        ("stop_loss", form.stop_loss.clone()),
        ("acceptable_loss", form.acceptable_loss.clone()),
        (
            "fallback_activated",
            form.fallback_activated.map(|b| b.to_string()).unwrap_or_default(),
        ),
    ];
    form_line("Novo bot", &fields, opts)
}

fn simulation_form(form: &SimulationForm, opts: &RenderOptions) -> String {
    let fields = [
        ("stock_code", form.stock_code.clone()),
        ("operation_code", form.operation_code.clone()),
        ("quantity", form.quantity.clone()),
        ("volatility_factor", form.volatility_factor.clone()),
        ("stop_loss", form.stop_loss.clone()),
        ("acceptable_loss", form.acceptable_loss.clone()),
        ("fallback_activated", form.fallback_activated.to_string()),
    ];
    form_line("Nova simulação", &fields, opts)
}

fn form_line(title: &str, fields: &[(&str, String)], opts: &RenderOptions) -> String {
    let filled: Vec<String> = fields
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    let body = if filled.is_empty() {
        opts.paint("(vazio)", Tone::Muted)
    } else {
        filled.join(" ")
    };
    format!("\n{} {}\n", opts.strong(&format!("{title}:")), body)
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

fn text_width(s: &str) -> usize {
    s.chars().count()
}

fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(text_width(s));
    format!("{s}{}", " ".repeat(fill))
}

fn paint_cell(cell: &Cell, width: usize, opts: &RenderOptions) -> String {
    let plain = cell.plain();
    let fill = " ".repeat(width.saturating_sub(text_width(&plain)));
    let painted = match cell {
        Cell::Text(s) => s.clone(),
        Cell::Toned(s, tone) => opts.paint(s, *tone),
        Cell::Badge(s, tone) => opts.paint(&format!("[{s}]"), *tone),
        Cell::Buttons(buttons) => buttons
            .iter()
            .map(|b| opts.paint(&format!("<{}>", b.label), b.tone))
            .collect::<Vec<_>>()
            .join(" "),
    };
    format!("{painted}{fill}")
}

/// Render a table with a leading `#` column holding the 1-based row
/// position used by `#n` targets.
pub fn table(table: &Table, opts: &RenderOptions) -> String {
    let headers = table.headers();
    let row_count = table.rows().len();
    let index_width = format!("#{row_count}").len().max(1);

    let mut widths: Vec<usize> = headers.iter().map(|h| text_width(h)).collect();
    for row in table.rows() {
        if let Row::Data { cells, .. } = row {
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(text_width(&cell.plain()));
            }
        }
    }

    let mut out = String::new();
    let header_line = std::iter::once(pad("#", index_width))
        .chain(headers.iter().zip(&widths).map(|(h, w)| pad(h, *w)))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    out.push_str(&opts.strong(header_line.trim_end()));
    out.push('\n');

    for (position, row) in table.rows().iter().enumerate() {
        let line = match row {
            Row::Data { cells, .. } => std::iter::once(pad(&format!("#{}", position + 1), index_width))
                .chain(
                    cells
                        .iter()
                        .zip(&widths)
                        .map(|(cell, w)| paint_cell(cell, *w, opts)),
                )
                .collect::<Vec<_>>()
                .join(COLUMN_GAP),
            Row::Placeholder { text, tone, .. } => {
                format!("{}{COLUMN_GAP}{}", pad("", index_width), opts.paint(text, *tone))
            }
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// Modal and overlay
// ---------------------------------------------------------------------------

pub fn results(view: &ResultsView, opts: &RenderOptions) -> String {
    let mut out = opts.heading(&format!("══ {} ══", view.title()));
    out.push('\n');
    for line in view.summary_lines() {
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
    if view.trades.rows().is_empty() {
        out.push_str(&opts.paint("Nenhuma operação registrada", Tone::Muted));
        out.push('\n');
    } else {
        out.push_str(&table(&view.trades, opts));
    }
    out.push_str(&opts.paint("(close ou linha vazia para fechar)", Tone::Muted));
    out.push('\n');
    out
}

pub fn overlay(notice: &BalanceNotice, opts: &RenderOptions) -> String {
    let mut out = String::new();
    out.push_str(&opts.paint(&opts.strong("Saldo insuficiente"), Tone::Danger));
    out.push('\n');
    let cur = &notice.currency;
    out.push_str(&format!("Saldo disponível: {} {cur}\n", notice.available));
    out.push_str(&format!("Saldo necessário: {} {cur}\n", notice.required));
    out.push_str(&format!("Faltam: {} {cur}\n", notice.missing));
    out.push_str(&format!(
        "{} Ver Carteira   {} Fechar\n",
        opts.paint("[ok]", Tone::Primary),
        opts.paint("[close]", Tone::Muted)
    ));
    out
}
