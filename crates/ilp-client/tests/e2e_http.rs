//! End-to-end sender tests against an in-process HTTP capture server.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use ilp_client::{Buffer, IlpError, Sender, SenderConfig};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct Capture {
    bodies: Arc<Mutex<Vec<String>>>,
    reject_with: Option<u16>,
}

async fn write_handler(State(capture): State<Capture>, body: String) -> StatusCode {
    capture.bodies.lock().unwrap().push(body);
    match capture.reject_with {
        Some(status) => StatusCode::from_u16(status).unwrap(),
        None => StatusCode::NO_CONTENT,
    }
}

async fn start_server(capture: Capture) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .route("/write", post(write_handler))
        .with_state(capture);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn sample_buffer() -> Buffer {
    let mut buffer = Buffer::new();
    buffer
        .table("telemetry")
        .unwrap()
        .symbol("host", "edge-1")
        .unwrap()
        .column_i64("bytes", 42)
        .unwrap()
        .at_server()
        .unwrap();
    buffer
}

#[tokio::test]
async fn test_flush_delivers_rows_and_clears_buffer() {
    let capture = Capture::default();
    let addr = start_server(capture.clone()).await;

    let config = SenderConfig::from_addr_list(&addr.to_string()).unwrap();
    let mut sender = Sender::connect(&config).unwrap();

    let mut buffer = sample_buffer();
    sender.flush(&mut buffer).await.unwrap();

    assert!(buffer.is_empty());
    assert_eq!(buffer.row_count(), 0);

    let bodies = capture.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0], "telemetry,host=edge-1 bytes=42i\n");
}

#[tokio::test]
async fn test_empty_buffer_sends_nothing() {
    let capture = Capture::default();
    let addr = start_server(capture.clone()).await;

    let config = SenderConfig::from_addr_list(&addr.to_string()).unwrap();
    let mut sender = Sender::connect(&config).unwrap();

    let mut buffer = Buffer::new();
    sender.flush(&mut buffer).await.unwrap();

    assert!(capture.bodies.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_client_rejection_is_terminal() {
    let capture = Capture {
        reject_with: Some(400),
        ..Capture::default()
    };
    let addr = start_server(capture.clone()).await;

    let config = SenderConfig::from_addr_list(&addr.to_string())
        .unwrap()
        .with_retry_timeout(Duration::from_secs(5));
    let mut sender = Sender::connect(&config).unwrap();

    let mut buffer = sample_buffer();
    let err = sender.flush(&mut buffer).await.unwrap_err();

    assert!(matches!(err, IlpError::Rejected { status: 400, .. }));
    // No retries on a client error, and the buffer is left intact.
    assert_eq!(capture.bodies.lock().unwrap().len(), 1);
    assert_eq!(buffer.row_count(), 1);
}

#[tokio::test]
async fn test_failover_to_second_address() {
    // Bind and immediately drop a listener to obtain an address that
    // refuses connections.
    let dead = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();

    let capture = Capture::default();
    let live = start_server(capture.clone()).await;

    let config = SenderConfig::from_addr_list(&format!("{dead},{live}"))
        .unwrap()
        .with_retry_timeout(Duration::from_secs(10));
    let mut sender = Sender::connect(&config).unwrap();

    let mut buffer = sample_buffer();
    sender.flush(&mut buffer).await.unwrap();

    assert!(buffer.is_empty());
    assert_eq!(capture.bodies.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_retry_timeout_reports_last_error() {
    let dead = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();

    let config = SenderConfig::from_addr_list(&dead.to_string())
        .unwrap()
        .with_retry_timeout(Duration::from_millis(250));
    let mut sender = Sender::connect(&config).unwrap();

    let mut buffer = sample_buffer();
    let err = sender.flush(&mut buffer).await.unwrap_err();

    assert!(matches!(err, IlpError::RetryTimeout { .. }));
    assert_eq!(buffer.row_count(), 1);
}
