//! Client side of the trading-bot service's `/api/*` endpoints.
//!
//! [`Backend`] is the seam between the dashboard and the network: the
//! dashboard only ever speaks in [`Request`]s and [`Reply`]s, the runtime
//! runs them against a backend ([`HttpBackend`] in production, an in-memory
//! fake in tests).

pub mod client;
pub mod error;
pub mod types;

pub use client::HttpBackend;
pub use error::ApiError;

use types::{
    BotStartRequest, BotStarted, BotStopped, SimulationResults, SimulationStartRequest,
    SimulationStarted, SimulationSummary, StatusPayload, WalletPayload,
};

/// The operations the dashboard needs from the service.
pub trait Backend: Send + Sync {
    /// `GET /api/status`
    fn status(&self) -> Result<StatusPayload, ApiError>;
    /// `POST /api/bot/start`
    fn start_bot(&self, request: &BotStartRequest) -> Result<BotStarted, ApiError>;
    /// `POST /api/bot/stop/{id}`
    fn stop_bot(&self, bot_id: &str) -> Result<BotStopped, ApiError>;
    /// `POST /api/simulation/start`
    fn start_simulation(
        &self,
        request: &SimulationStartRequest,
    ) -> Result<SimulationStarted, ApiError>;
    /// `POST /api/simulation/{id}/execute`
    fn execute_simulation(&self, simulation_id: &str) -> Result<(), ApiError>;
    /// `GET /api/simulation/history/{id}`
    fn simulation_results(&self, simulation_id: &str) -> Result<SimulationResults, ApiError>;
    /// `POST /api/simulation/{id}/stop`
    fn stop_simulation(&self, simulation_id: &str) -> Result<(), ApiError>;
    /// `GET /api/simulation/history/list`
    fn simulation_history(&self) -> Result<Vec<SimulationSummary>, ApiError>;
    /// `GET /api/wallet`
    fn wallet(&self) -> Result<WalletPayload, ApiError>;
}

/// A call the dashboard wants made.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Status,
    StartBot(BotStartRequest),
    StopBot(String),
    StartSimulation(SimulationStartRequest),
    ExecuteSimulation(String),
    SimulationResults(String),
    StopSimulation(String),
    SimulationHistory,
    Wallet,
}

impl Request {
    /// Short label for the diagnostic log.
    pub fn describe(&self) -> String {
        match self {
            Self::Status => "GET /api/status".to_string(),
            Self::StartBot(req) => format!("POST /api/bot/start ({})", req.symbol),
            Self::StopBot(id) => format!("POST /api/bot/stop/{id}"),
            Self::StartSimulation(req) => format!(
                "POST /api/simulation/start ({}/{})",
                req.stock_code, req.operation_code
            ),
            Self::ExecuteSimulation(id) => format!("POST /api/simulation/{id}/execute"),
            Self::SimulationResults(id) => format!("GET /api/simulation/history/{id}"),
            Self::StopSimulation(id) => format!("POST /api/simulation/{id}/stop"),
            Self::SimulationHistory => "GET /api/simulation/history/list".to_string(),
            Self::Wallet => "GET /api/wallet".to_string(),
        }
    }
}

/// The settled outcome of a [`Request`], carrying what the dashboard needs
/// to apply it (the request body or target id where relevant).
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Status(Result<StatusPayload, ApiError>),
    BotStarted(Result<BotStarted, ApiError>),
    BotStopped {
        bot_id: String,
        result: Result<BotStopped, ApiError>,
    },
    SimulationStarted {
        request: SimulationStartRequest,
        result: Result<SimulationStarted, ApiError>,
    },
    SimulationExecuted {
        simulation_id: String,
        result: Result<(), ApiError>,
    },
    SimulationResults {
        simulation_id: String,
        result: Result<SimulationResults, ApiError>,
    },
    SimulationStopped {
        simulation_id: String,
        result: Result<(), ApiError>,
    },
    SimulationHistory(Result<Vec<SimulationSummary>, ApiError>),
    Wallet(Result<WalletPayload, ApiError>),
}

impl Reply {
    /// The failure carried by this reply, if it failed.
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Status(r) => r.as_ref().err(),
            Self::BotStarted(r) => r.as_ref().err(),
            Self::BotStopped { result, .. } => result.as_ref().err(),
            Self::SimulationStarted { result, .. } => result.as_ref().err(),
            Self::SimulationExecuted { result, .. } => result.as_ref().err(),
            Self::SimulationResults { result, .. } => result.as_ref().err(),
            Self::SimulationStopped { result, .. } => result.as_ref().err(),
            Self::SimulationHistory(r) => r.as_ref().err(),
            Self::Wallet(r) => r.as_ref().err(),
        }
    }
}

/// Run one request to completion against a backend.
pub fn execute(backend: &dyn Backend, request: Request) -> Reply {
    match request {
        Request::Status => Reply::Status(backend.status()),
        Request::StartBot(req) => Reply::BotStarted(backend.start_bot(&req)),
        Request::StopBot(bot_id) => {
            let result = backend.stop_bot(&bot_id);
            Reply::BotStopped { bot_id, result }
        }
        Request::StartSimulation(request) => {
            let result = backend.start_simulation(&request);
            Reply::SimulationStarted { request, result }
        }
        Request::ExecuteSimulation(simulation_id) => {
            let result = backend.execute_simulation(&simulation_id);
            Reply::SimulationExecuted {
                simulation_id,
                result,
            }
        }
        Request::SimulationResults(simulation_id) => {
            let result = backend.simulation_results(&simulation_id);
            Reply::SimulationResults {
                simulation_id,
                result,
            }
        }
        Request::StopSimulation(simulation_id) => {
            let result = backend.stop_simulation(&simulation_id);
            Reply::SimulationStopped {
                simulation_id,
                result,
            }
        }
        Request::SimulationHistory => Reply::SimulationHistory(backend.simulation_history()),
        Request::Wallet => Reply::Wallet(backend.wallet()),
    }
}
