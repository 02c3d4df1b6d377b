//! Error type for calls against the trading-bot service.

use thiserror::Error;

use super::types::InsufficientBalance;

/// Why a call against the service did not produce the expected payload.
///
/// `Transport` and `Decode` mean the call itself failed (nothing usable came
/// back). `Rejected` and `InsufficientBalance` mean the service answered and
/// refused the operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Connection refused, timeout, DNS failure and the like.
    #[error("request to {path} failed: {detail}")]
    Transport { path: String, detail: String },

    /// The body was not JSON or did not have the expected shape.
    #[error("invalid response from {path}: {detail}")]
    Decode { path: String, detail: String },

    /// The service reported a failure (`status` != "success" or `success: false`).
    #[error("{}", message.as_deref().unwrap_or("request rejected by server"))]
    Rejected { message: Option<String> },

    /// A start request was refused for lack of funds.
    #[error("insufficient balance")]
    InsufficientBalance(InsufficientBalance),
}

impl ApiError {
    pub fn transport(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Transport {
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub fn decode(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: Some(message.into()),
        }
    }

    /// True for failures where the service never gave a usable answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Decode { .. })
    }

    /// The server-supplied failure text, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message } => message.as_deref(),
            _ => None,
        }
    }
}
