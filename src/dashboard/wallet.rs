//! Wallet panel: one row per asset plus the USDT grand total.

use chrono::{DateTime, Local};

use super::format::{fixed, safe_format};
use super::table::{Cell, Row, Table, Tone};
use crate::api::ApiError;
use crate::api::types::{Balance, WalletPayload};

pub const WALLET_HEADERS: [&str; 5] = ["Moeda", "Disponível", "Em ordem", "Total", "Valor (USDT)"];

pub const NO_BALANCES: &str = "Nenhum saldo encontrado";
const LOAD_FALLBACK: &str = "Falha ao carregar saldos";
const LOAD_FAILED: &str = "Erro ao carregar saldos";

#[derive(Debug, Clone, PartialEq)]
pub enum WalletTotal {
    NotLoaded,
    Amount(f64),
    Error,
}

impl WalletTotal {
    pub fn label(&self) -> String {
        match self {
            Self::NotLoaded => "-".to_string(),
            Self::Amount(total) => format!("{} USDT", fixed(*total, 2)),
            Self::Error => "Erro".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalletPanel {
    pub table: Table,
    pub total: WalletTotal,
    pub updated_at: Option<DateTime<Local>>,
}

impl Default for WalletPanel {
    fn default() -> Self {
        Self {
            table: Table::new(&WALLET_HEADERS),
            total: WalletTotal::NotLoaded,
            updated_at: None,
        }
    }
}

impl WalletPanel {
    /// Rebuild from a successful wallet payload.
    pub fn show(&mut self, payload: &WalletPayload, now: DateTime<Local>) {
        let balances = payload.balances.as_deref().unwrap_or_default();
        if balances.is_empty() {
            let row = self.table.placeholder(NO_BALANCES, Tone::Muted);
            self.table.set_rows(vec![row]);
            self.total = WalletTotal::Amount(0.0);
            return;
        }

        self.table
            .set_rows(balances.iter().map(balance_row).collect());
        let total = balances.iter().filter_map(|b| b.usdt_value).sum();
        self.total = WalletTotal::Amount(total);
        self.updated_at = Some(now);
    }

    /// Render a failed fetch. Rejections show the server text; anything
    /// else shows a generic message.
    pub fn fail(&mut self, error: &ApiError) {
        let text = if error.is_transport() {
            LOAD_FAILED.to_string()
        } else {
            format!("Erro: {}", error.server_message().unwrap_or(LOAD_FALLBACK))
        };
        let row = self.table.placeholder(&text, Tone::Danger);
        self.table.set_rows(vec![row]);
        self.total = WalletTotal::Error;
    }

    pub fn updated_label(&self) -> Option<String> {
        self.updated_at
            .map(|at| format!("Atualizado em: {}", at.format("%H:%M:%S")))
    }
}

fn balance_row(balance: &Balance) -> Row {
    let free = balance.free.unwrap_or(0.0);
    let locked = balance.locked.unwrap_or(0.0);
    let asset = match balance.asset.as_deref().map(str::trim) {
        Some(a) if !a.is_empty() => {
            let initial = a.chars().next().map(|c| c.to_uppercase().to_string());
            format!("[{}] {a}", initial.unwrap_or_default())
        }
        _ => "Desconhecido".to_string(),
    };
    Row::keyed(
        balance.asset.clone(),
        vec![
            Cell::text(asset),
            Cell::text(fixed(free, 8)),
            Cell::text(fixed(locked, 8)),
            Cell::text(fixed(free + locked, 8)),
            Cell::text(safe_format(balance.usdt_value, 2)),
        ],
    )
}
