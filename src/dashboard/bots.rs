//! Bot table and the start-bot form.

use thiserror::Error;

use super::Action;
use super::format::{PLACEHOLDER, plain_or_zero, safe_format, text_or};
use super::table::{Button, Cell, Row, Table, Tone};
use crate::api::types::{BotStartRequest, BotStatus};

pub const BOT_HEADERS: [&str; 6] = [
    "Par",
    "Posição",
    "Última compra",
    "Última venda",
    "Saldo",
    "Ações",
];

pub const NO_BOTS: &str = "Nenhum bot em execução";

/// Position value that marks a bot as holding the asset.
const BOUGHT: &str = "Comprado";

pub fn bot_table() -> Table {
    Table::new(&BOT_HEADERS)
}

/// Rebuild the bot table body from a status payload.
pub fn fill_bot_table(table: &mut Table, bots: Option<&[BotStatus]>) {
    let rows = match bots {
        Some(bots) if !bots.is_empty() => bots.iter().map(bot_row).collect(),
        _ => vec![table.placeholder(NO_BOTS, Tone::Muted)],
    };
    table.set_rows(rows);
}

fn bot_row(bot: &BotStatus) -> Row {
    let pair = format!(
        "{}/{}",
        text_or(bot.stock_code.as_deref(), PLACEHOLDER),
        text_or(bot.operation_code.as_deref(), PLACEHOLDER)
    );
    let position = text_or(bot.position.as_deref(), PLACEHOLDER);
    let badge = if position == BOUGHT {
        Tone::Success
    } else {
        Tone::Danger
    };

    let actions = match &bot.id {
        Some(id) => vec![Button::new("Parar", Tone::Danger, Action::StopBot(id.clone()))],
        None => Vec::new(),
    };

    Row::keyed(
        bot.id.clone(),
        vec![
            Cell::text(pair),
            Cell::Badge(position, badge),
            Cell::text(safe_format(bot.last_buy_price, 2)),
            Cell::text(safe_format(bot.last_sell_price, 2)),
            Cell::text(plain_or_zero(bot.wallet_balance)),
            Cell::Buttons(actions),
        ],
    )
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("expected field=value, got '{0}'")]
    Malformed(String),
}

/// Draft of the start-bot form. Values are kept as typed, like form
/// inputs, and only parsed when the form is submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BotForm {
    pub stock_code: String,
    pub operation_code: String,
    pub traded_quantity: String,
    pub volatility_factor: String,
    pub stop_loss: String,
    pub acceptable_loss: String,
    pub fallback_activated: Option<bool>,
}

impl BotForm {
    pub const FIELDS: [&'static str; 7] = [
        "stock_code",
        "operation_code",
        "traded_quantity",
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
            "qty" | "quantity" | "traded_quantity" => self.traded_quantity = value,
            "volatility" | "volatility_factor" => self.volatility_factor = value,
            "stop_loss" | "stop" => self.stop_loss = value,
            "acceptable_loss" | "loss" => self.acceptable_loss = value,
            "fallback" | "fallback_activated" => {
                self.fallback_activated = Some(crate::config::is_truthy(&value));
            }
            other => return Err(FormError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    /// Reset every field to empty.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn to_request(&self) -> BotStartRequest {
        let stock_code = self.stock_code.trim().to_string();
        let operation_code = self.operation_code.trim().to_string();
        BotStartRequest {
            symbol: format!("{stock_code}{operation_code}"),
            stock_code,
            operation_code,
            traded_quantity: parse_number(&self.traded_quantity),
            volatility_factor: parse_number(&self.volatility_factor),
            stop_loss: parse_number(&self.stop_loss),
            acceptable_loss: parse_number(&self.acceptable_loss),
            fallback_activated: self.fallback_activated,
        }
    }
}

/// Parse a numeric form input; anything unparseable is absent.
pub(crate) fn parse_number(input: &str) -> Option<f64> {
    input.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Split `field=value` pairs as typed on the command line.
pub fn parse_assignments<'a>(
    args: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<(String, String)>, FormError> {
    args.into_iter()
        .map(|arg| {
            arg.split_once('=')
                .filter(|(k, _)| !k.trim().is_empty())
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .ok_or_else(|| FormError::Malformed(arg.to_string()))
        })
        .collect()
}
