/// HTTP client tests against an in-process server.
///
/// Each test starts a `tiny_http` server on an ephemeral port that answers
/// a fixed list of canned responses, then checks both what the client sent
/// and how it decoded the answers.
use std::io::Read;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tiny_http::{Header, Response, Server};

use botdash::api::types::{BotStartRequest, SimulationStartRequest};
use botdash::api::{ApiError, Backend, HttpBackend};

/// What the server saw: method, path and body.
type Seen = Vec<(String, String, String)>;

fn serve(responses: Vec<(u16, &'static str)>) -> (HttpBackend, JoinHandle<Seen>) {
    let server = Server::http("127.0.0.1:0").expect("bind test server");
    let addr = server.server_addr().to_ip().expect("ip listener");
    let backend = HttpBackend::new(&format!("http://{addr}/"), Duration::from_secs(5));

    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for (code, body) in responses {
            let mut request = server.recv().expect("request");
            let mut content = String::new();
            request
                .as_reader()
                .read_to_string(&mut content)
                .expect("read body");
            seen.push((
                request.method().to_string(),
                request.url().to_string(),
                content,
            ));
            let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                .expect("header");
            let response = Response::from_string(body)
                .with_status_code(code)
                .with_header(header);
            request.respond(response).expect("respond");
        }
        seen
    });
    (backend, handle)
}

fn bot_request() -> BotStartRequest {
    BotStartRequest {
        symbol: "BTCUSDT".to_string(),
        stock_code: "BTC".to_string(),
        operation_code: "USDT".to_string(),
        traded_quantity: Some(0.001),
        volatility_factor: None,
        stop_loss: None,
        acceptable_loss: None,
        fallback_activated: None,
    }
}

#[test]
fn status_decodes_loose_numbers() {
    let (backend, server) = serve(vec![(
        200,
        r#"{"active_bots": [{"id": 1, "stock_code": "BTC", "operation_code": "USDT",
            "position": "Comprado", "last_buy_price": "61000.5", "last_sell_price": null,
            "wallet_balance": 150}]}"#,
    )]);

    let status = backend.status().unwrap();
    let bots = status.active_bots.unwrap();
    assert_eq!(bots[0].id.as_deref(), Some("1"));
    assert_eq!(bots[0].last_buy_price, Some(61000.5));
    assert_eq!(bots[0].last_sell_price, None);

    let seen = server.join().unwrap();
    assert_eq!(seen[0].0, "GET");
    assert_eq!(seen[0].1, "/api/status");
}

#[test]
fn start_bot_posts_json_body() {
    let (backend, server) = serve(vec![(200, r#"{"status": "success", "bot_id": "BTCUSDT_1"}"#)]);

    let started = backend.start_bot(&bot_request()).unwrap();
    assert_eq!(started.bot_id.as_deref(), Some("BTCUSDT_1"));

    let seen = server.join().unwrap();
    assert_eq!(seen[0].0, "POST");
    assert_eq!(seen[0].1, "/api/bot/start");
    let body: serde_json::Value = serde_json::from_str(&seen[0].2).unwrap();
    assert_eq!(body["symbol"], "BTCUSDT");
    assert_eq!(body["traded_quantity"], 0.001);
    assert!(body.get("stop_loss").is_none());
}

#[test]
fn error_status_with_json_body_is_an_application_failure() {
    let (backend, server) = serve(vec![(
        400,
        r#"{"status": "error", "message": "Par inválido"}"#,
    )]);

    let err = backend.start_bot(&bot_request()).unwrap_err();
    assert_eq!(err, ApiError::rejected("Par inválido"));
    server.join().unwrap();
}

#[test]
fn insufficient_balance_is_recognized_on_error_status() {
    let (backend, server) = serve(vec![(
        400,
        r#"{"success": false, "error_type": "insufficient_balance",
            "currency": "USDT", "available_balance": 5, "required_balance": 12.5}"#,
    )]);

    let request = SimulationStartRequest {
        stock_code: "BTC".to_string(),
        operation_code: "USDT".to_string(),
        quantity: Some(1.0),
        volatility_factor: None,
        stop_loss: None,
        acceptable_loss: None,
        fallback_activated: true,
    };
    let err = backend.start_simulation(&request).unwrap_err();
    let ApiError::InsufficientBalance(notice) = err else {
        panic!("expected insufficient balance, got {err:?}");
    };
    assert_eq!(notice.required_balance, Some(12.5));

    let seen = server.join().unwrap();
    let body: serde_json::Value = serde_json::from_str(&seen[0].2).unwrap();
    assert_eq!(body["fallback_activated"], true);
    assert!(body["stop_loss"].is_null());
}

#[test]
fn simulation_step_stop_and_results_hit_their_paths() {
    let (backend, server) = serve(vec![
        (200, r#"{"success": true}"#),
        (200, r#"{"success": true}"#),
        (
            200,
            r#"{"success": true, "statistics": {"profit_loss": 3.5, "profit_loss_percentage": "1.2"},
                "trades": [{"trade_type": "BUY", "price": 100, "quantity": 1, "total_value": 100,
                            "timestamp": "2024-05-01 10:00:00"}],
                "details": {"operation_code": "USDT"}}"#,
        ),
    ]);

    backend.execute_simulation("s1").unwrap();
    backend.stop_simulation("s1").unwrap();
    let results = backend.simulation_results("s1").unwrap();
    assert_eq!(results.trades.map(|t| t.len()), Some(1));
    assert_eq!(
        results.statistics.and_then(|s| s.profit_loss_percentage),
        Some(1.2)
    );

    let paths: Vec<String> = server.join().unwrap().into_iter().map(|s| s.1).collect();
    assert_eq!(
        paths,
        vec![
            "/api/simulation/s1/execute",
            "/api/simulation/s1/stop",
            "/api/simulation/history/s1",
        ]
    );
}

#[test]
fn failed_step_reports_server_error_field() {
    let (backend, server) = serve(vec![(200, r#"{"success": false, "error": "Simulação encerrada"}"#)]);
    let err = backend.execute_simulation("s1").unwrap_err();
    assert_eq!(err.server_message(), Some("Simulação encerrada"));
    server.join().unwrap();
}

#[test]
fn history_list_defaults_to_empty() {
    let (backend, server) = serve(vec![
        (200, r#"{"success": true, "simulations": [{"id": 3, "profit_loss": "-2"}]}"#),
        (200, r#"{"success": true}"#),
    ]);

    let list = backend.simulation_history().unwrap();
    assert_eq!(list[0].id.as_deref(), Some("3"));
    assert_eq!(list[0].profit_loss, Some(-2.0));
    assert!(backend.simulation_history().unwrap().is_empty());
    server.join().unwrap();
}

#[test]
fn wallet_uses_status_convention() {
    let (backend, server) = serve(vec![
        (
            200,
            r#"{"status": "success", "balances": [{"asset": "BTC", "free": "0.5", "locked": "0.1", "usdt_value": "30000"}]}"#,
        ),
        (500, r#"{"status": "error", "message": "API key inválida"}"#),
    ]);

    let wallet = backend.wallet().unwrap();
    let balances = wallet.balances.unwrap();
    assert_eq!(balances[0].free, Some(0.5));
    assert_eq!(balances[0].usdt_value, Some(30000.0));

    let err = backend.wallet().unwrap_err();
    assert_eq!(err.server_message(), Some("API key inválida"));
    server.join().unwrap();
}

#[test]
fn non_json_body_is_a_decode_failure() {
    let (backend, server) = serve(vec![(502, "<html>Bad Gateway</html>")]);
    let err = backend.wallet().unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
    assert!(err.is_transport());
    server.join().unwrap();
}
