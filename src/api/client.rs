/// HTTP client for the trading-bot service.
///
/// Talks to the service with the synchronous `ureq` agent. Every call is a
/// single blocking request with the configured timeout; there are no
/// retries here (the status poller owns the only retry policy).
///
/// The service answers application errors with 4xx/5xx status codes and a
/// JSON body, so a non-2xx response is decoded like any other. Only a
/// failed connection or an unreadable body counts as a transport failure.
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use super::Backend;
use super::error::ApiError;
use super::types::{
    BotStartRequest, BotStarted, BotStopped, Convention, SimulationHistoryPayload,
    SimulationResults, SimulationStartRequest, SimulationStarted, SimulationSummary,
    StatusPayload, WalletPayload,
};
use crate::config::schema::ServerConfig;

/// Blocking `ureq` implementation of [`Backend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        // On Windows, "localhost" may try IPv6 (::1) first and stall when the
        // service only binds IPv4.
        let base_url = base_url
            .trim_end_matches('/')
            .replace("://localhost", "://127.0.0.1");
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { base_url, agent }
    }

    /// Build a client from the resolved `[server]` config.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> Result<Value, ApiError> {
        read_body(path, self.agent.get(&self.url(path)).call())
    }

    fn post(&self, path: &str) -> Result<Value, ApiError> {
        read_body(path, self.agent.post(&self.url(path)).call())
    }

    fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<Value, ApiError> {
        read_body(path, self.agent.post(&self.url(path)).send_json(body))
    }
}

/// Turn a `ureq` outcome into a JSON body, treating HTTP error statuses as
/// ordinary answers.
fn read_body(path: &str, result: Result<ureq::Response, ureq::Error>) -> Result<Value, ApiError> {
    let response = match result {
        Ok(response) => response,
        Err(ureq::Error::Status(_, response)) => response,
        Err(ureq::Error::Transport(transport)) => {
            return Err(ApiError::transport(path, transport.to_string()));
        }
    };

    response
        .into_json::<Value>()
        .map_err(|e| ApiError::decode(path, e.to_string()))
}

impl Backend for HttpBackend {
    fn status(&self) -> Result<StatusPayload, ApiError> {
        let path = "/api/status";
        let body = self.get(path)?;
        serde_json::from_value(body).map_err(|e| ApiError::decode(path, e.to_string()))
    }

    fn start_bot(&self, request: &BotStartRequest) -> Result<BotStarted, ApiError> {
        let path = "/api/bot/start";
        Convention::Status.accept(path, self.post_json(path, request)?)
    }

    fn stop_bot(&self, bot_id: &str) -> Result<BotStopped, ApiError> {
        let path = format!("/api/bot/stop/{bot_id}");
        Convention::Status.accept(&path, self.post(&path)?)
    }

    fn start_simulation(
        &self,
        request: &SimulationStartRequest,
    ) -> Result<SimulationStarted, ApiError> {
        let path = "/api/simulation/start";
        Convention::Success.accept(path, self.post_json(path, request)?)
    }

    fn execute_simulation(&self, simulation_id: &str) -> Result<(), ApiError> {
        let path = format!("/api/simulation/{simulation_id}/execute");
        Convention::Success
            .accept::<Value>(&path, self.post(&path)?)
            .map(|_| ())
    }

    fn simulation_results(&self, simulation_id: &str) -> Result<SimulationResults, ApiError> {
        let path = format!("/api/simulation/history/{simulation_id}");
        Convention::Success.accept(&path, self.get(&path)?)
    }

    fn stop_simulation(&self, simulation_id: &str) -> Result<(), ApiError> {
        let path = format!("/api/simulation/{simulation_id}/stop");
        Convention::Success
            .accept::<Value>(&path, self.post(&path)?)
            .map(|_| ())
    }

    fn simulation_history(&self) -> Result<Vec<SimulationSummary>, ApiError> {
        let path = "/api/simulation/history/list";
        let payload: SimulationHistoryPayload = Convention::Success.accept(path, self.get(path)?)?;
        Ok(payload.simulations.unwrap_or_default())
    }

    fn wallet(&self) -> Result<WalletPayload, ApiError> {
        let path = "/api/wallet";
        Convention::Status.accept(path, self.get(path)?)
    }
}
