//! Alert board and the insufficient-balance overlay.
//!
//! Alerts expire a fixed time after they are posted. Dismissing one early
//! only removes that alert; its expiry later finds nothing and does nothing.

use std::time::{Duration, Instant};

use super::format::fixed;
use crate::api::types::InsufficientBalance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Danger,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub id: u64,
    pub severity: Severity,
    pub message: String,
    pub expires_at: Instant,
}

#[derive(Debug, Clone)]
pub struct AlertBoard {
    ttl: Duration,
    next_id: u64,
    alerts: Vec<Alert>,
}

impl AlertBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_id: 1,
            alerts: Vec::new(),
        }
    }

    /// Post an alert; returns its id.
    pub fn push(&mut self, severity: Severity, message: impl Into<String>, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.alerts.push(Alert {
            id,
            severity,
            message: message.into(),
            expires_at: now + self.ttl,
        });
        id
    }

    /// Remove one alert by id. Returns `false` if it was already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        self.alerts.len() != before
    }

    /// Remove the alert at a 1-based position on the board.
    pub fn dismiss_at(&mut self, position: usize) -> bool {
        match position.checked_sub(1).and_then(|i| self.alerts.get(i)) {
            Some(alert) => {
                let id = alert.id;
                self.dismiss(id)
            }
            None => false,
        }
    }

    /// Drop every alert whose time is up. Returns how many were removed.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.expires_at > now);
        before - self.alerts.len()
    }

    /// Earliest pending expiry.
    pub fn next_expiry(&self) -> Option<Instant> {
        self.alerts.iter().map(|a| a.expires_at).min()
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Latest alert, mostly useful to one-shot commands and tests.
    pub fn last(&self) -> Option<&Alert> {
        self.alerts.last()
    }
}

// ---------------------------------------------------------------------------
// Insufficient balance overlay
// ---------------------------------------------------------------------------

/// How the overlay was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayDismiss {
    Backdrop,
    Close,
    /// The "Ver Carteira" button: close and open the wallet tab.
    GotoWallet,
}

/// Amounts shown by the insufficient-balance overlay, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceNotice {
    pub currency: String,
    pub available: String,
    pub required: String,
    pub missing: String,
}

impl BalanceNotice {
    pub fn from_error(error: &InsufficientBalance) -> Self {
        let currency = error
            .currency
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "USDT".to_string());
        let available = error.available_balance.unwrap_or(0.0);
        let required = error.required_balance.unwrap_or(0.0);
        Self {
            currency,
            available: amount_or_zero(available),
            required: amount_or_zero(required),
            missing: fixed(required - available, 8),
        }
    }
}

fn amount_or_zero(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        fixed(value, 8)
    }
}
