//! Wire types for the trading-bot service.
//!
//! The service is loose with numbers: prices and balances arrive as JSON
//! numbers, numeric strings or `null` depending on the endpoint. Every
//! numeric field is therefore decoded through [`lenient_f64`], which maps
//! anything that is not a finite number to `None`. Rendering code turns
//! `None` into a placeholder instead of failing.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ApiError;

// ---------------------------------------------------------------------------
// Lenient field decoding
// ---------------------------------------------------------------------------

/// Read a JSON value as a number: numbers and numeric strings count.
pub fn number_from_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Read a JSON value as display text: strings as-is, numbers and booleans
/// printed, everything else absent.
pub fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(text_from_value))
}

fn required_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    text_from_value(&value).ok_or_else(|| serde::de::Error::custom("expected a string or number id"))
}

// ---------------------------------------------------------------------------
// Response conventions
// ---------------------------------------------------------------------------

/// How an endpoint signals success.
///
/// Bot and wallet endpoints answer `{"status": "success", ...}` and put the
/// failure text in `message`; simulation endpoints answer
/// `{"success": true, ...}` and put it in `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    Status,
    Success,
}

impl Convention {
    fn succeeded(self, body: &Value) -> bool {
        match self {
            Self::Status => body.get("status").and_then(Value::as_str) == Some("success"),
            Self::Success => body.get("success").and_then(Value::as_bool) == Some(true),
        }
    }

    fn message_fields(self) -> [&'static str; 2] {
        match self {
            Self::Status => ["message", "error"],
            Self::Success => ["error", "message"],
        }
    }

    /// Check the success marker and decode the body into `T`.
    pub fn accept<T: DeserializeOwned>(self, path: &str, body: Value) -> Result<T, ApiError> {
        if !self.succeeded(&body) {
            return Err(self.rejection(&body));
        }
        serde_json::from_value(body).map_err(|e| ApiError::decode(path, e.to_string()))
    }

    fn rejection(self, body: &Value) -> ApiError {
        if let Some(notice) = InsufficientBalance::detect(body) {
            return ApiError::InsufficientBalance(notice);
        }
        let message = self
            .message_fields()
            .iter()
            .find_map(|field| body.get(*field).and_then(text_from_value))
            .filter(|m| !m.trim().is_empty());
        ApiError::Rejected { message }
    }
}

// ---------------------------------------------------------------------------
// GET /api/status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusPayload {
    #[serde(default)]
    pub active_bots: Option<Vec<BotStatus>>,
}

/// One running bot as reported by the status endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotStatus {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub stock_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub operation_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub last_buy_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub last_sell_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub wallet_balance: Option<f64>,
}

// ---------------------------------------------------------------------------
// Bot lifecycle
// ---------------------------------------------------------------------------

/// Body of `POST /api/bot/start`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BotStartRequest {
    /// Exchange symbol, `stock_code` followed by `operation_code` (`BTCUSDT`).
    pub symbol: String,
    pub stock_code: String,
    pub operation_code: String,
    pub traded_quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptable_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_activated: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotStarted {
    #[serde(default, deserialize_with = "lenient_text")]
    pub bot_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotStopped {
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Simulations
// ---------------------------------------------------------------------------

/// Body of `POST /api/simulation/start`. Unparseable numeric inputs are
/// sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationStartRequest {
    pub stock_code: String,
    pub operation_code: String,
    pub quantity: Option<f64>,
    pub volatility_factor: Option<f64>,
    pub stop_loss: Option<f64>,
    pub acceptable_loss: Option<f64>,
    pub fallback_activated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationStarted {
    #[serde(deserialize_with = "required_text")]
    pub simulation_id: String,
}

/// Payload of `GET /api/simulation/history/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    #[serde(default)]
    pub statistics: Option<Statistics>,
    #[serde(default)]
    pub trades: Option<Vec<Trade>>,
    #[serde(default)]
    pub details: Option<SimulationDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub profit_loss: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub profit_loss_percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    #[serde(default, deserialize_with = "lenient_text")]
    pub trade_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationDetails {
    #[serde(default, deserialize_with = "lenient_text")]
    pub operation_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct SimulationHistoryPayload {
    #[serde(default)]
    pub simulations: Option<Vec<SimulationSummary>>,
}

/// One past simulation from `GET /api/simulation/history/list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub operation_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub profit_loss: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub profit_loss_percentage: Option<f64>,
}

// ---------------------------------------------------------------------------
// GET /api/wallet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletPayload {
    #[serde(default)]
    pub balances: Option<Vec<Balance>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    #[serde(default, deserialize_with = "lenient_text")]
    pub asset: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub free: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub locked: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub usdt_value: Option<f64>,
}

// ---------------------------------------------------------------------------
// Insufficient balance
// ---------------------------------------------------------------------------

/// Structured refusal of a start request for lack of funds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsufficientBalance {
    #[serde(default, deserialize_with = "lenient_text")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub available_balance: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub required_balance: Option<f64>,
}

impl InsufficientBalance {
    /// Recognize an insufficient-balance failure body: either tagged with
    /// `error_type: "insufficient_balance"` or carrying `required_balance`.
    pub fn detect(body: &Value) -> Option<Self> {
        let tagged = body.get("error_type").and_then(Value::as_str) == Some("insufficient_balance");
        let has_amounts = body
            .get("required_balance")
            .is_some_and(|v| !v.is_null());
        if !tagged && !has_amounts {
            return None;
        }
        serde_json::from_value(body.clone()).ok()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
