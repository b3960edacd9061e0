//! Channel tests against an in-process TCP fixture standing in for a
//! provider. The fixture speaks the real wire format through
//! `zrpc_common::transport::frame` but lets each test choose how (or
//! whether) to respond.

use std::io::Write;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use zrpc_caller::{Channel, Controller};
use zrpc_common::transport::frame;
use zrpc_common::codec;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct EchoRequest {
    text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct EchoResponse {
    text: String,
    status: u32,
}

/// Spawns a fixture server; `handler` runs once per accepted connection.
/// Returns the endpoint string and a counter of accepted connections.
fn spawn_fixture<F>(handler: F) -> (String, Arc<AtomicUsize>)
where
    F: Fn(TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&accepted);
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            counter.fetch_add(1, Ordering::SeqCst);
            handler(stream);
        }
    });
    (endpoint(addr), accepted)
}

fn endpoint(addr: SocketAddr) -> String {
    format!("127.0.0.1:{}", addr.port())
}

fn echo_once(mut stream: TcpStream) {
    let (header, payload) = frame::read_frame(&mut stream).unwrap();
    assert_eq!(header.args_size as usize, payload.len());
    let request: EchoRequest = codec::decode(&payload).unwrap();
    let response = EchoResponse { text: request.text, status: 0 };
    stream.write_all(&codec::encode(&response).unwrap()).unwrap();
}

/// On return from call_method, either a response was produced and the
/// controller is clean, or it failed with a non-empty reason.
fn assert_outcome_invariant(response: &Option<EchoResponse>, controller: &Controller) {
    match response {
        Some(_) => assert!(!controller.failed()),
        None => {
            assert!(controller.failed());
            assert!(!controller.error_text().is_empty());
        }
    }
}

#[test]
fn test_happy_path() {
    let (endpoint, _) = spawn_fixture(echo_once);
    let channel = Channel::with_endpoint(endpoint);
    let mut controller = Controller::new();

    let request = EchoRequest { text: "hello".into() };
    let response: Option<EchoResponse> =
        channel.call_method("EchoService", "Echo", &mut controller, &request);

    assert_outcome_invariant(&response, &controller);
    let response = response.unwrap();
    assert_eq!(response.text, "hello");
    assert_eq!(response.status, 0);
    assert_eq!(channel.pooled_connections(), 1);
}

#[test]
fn test_connection_reused_when_provider_keeps_it_open() {
    let (endpoint, accepted) = spawn_fixture(|mut stream| {
        // Keep-alive fixture: answer every request on the same connection.
        while let Ok((_, payload)) = frame::read_frame(&mut stream) {
            let request: EchoRequest = codec::decode(&payload).unwrap();
            let response = EchoResponse { text: request.text, status: 0 };
            if stream.write_all(&codec::encode(&response).unwrap()).is_err() {
                break;
            }
        }
    });
    let channel = Channel::with_endpoint(endpoint);
    let mut controller = Controller::new();

    for i in 0..3 {
        controller.reset();
        let request = EchoRequest { text: format!("call {}", i) };
        let response: Option<EchoResponse> =
            channel.call_method("EchoService", "Echo", &mut controller, &request);
        assert!(response.is_some(), "call {} failed: {}", i, controller.error_text());
    }

    // One descriptor serviced all three calls.
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
    assert_eq!(channel.pooled_connections(), 1);
}

#[test]
fn test_pool_invalidated_when_provider_closes_after_response() {
    let (endpoint, accepted) = spawn_fixture(echo_once);
    let channel = Channel::with_endpoint(endpoint);
    let mut controller = Controller::new();
    controller.set_timeout(1000);

    let first: Option<EchoResponse> = channel.call_method(
        "EchoService",
        "Echo",
        &mut controller,
        &EchoRequest { text: "one".into() },
    );
    assert!(first.is_some());

    // The provider closed the pooled connection after responding. The next
    // call reuses it, observes the failure, and drops it from the pool.
    controller.reset();
    let second: Option<EchoResponse> = channel.call_method(
        "EchoService",
        "Echo",
        &mut controller,
        &EchoRequest { text: "two".into() },
    );
    assert!(second.is_none());
    assert!(controller.failed());
    assert_eq!(channel.pooled_connections(), 0);

    // A retry opens a fresh connection and succeeds.
    controller.reset();
    let third: Option<EchoResponse> = channel.call_method(
        "EchoService",
        "Echo",
        &mut controller,
        &EchoRequest { text: "three".into() },
    );
    assert!(third.is_some(), "retry failed: {}", controller.error_text());
    assert_eq!(accepted.load(Ordering::SeqCst), 2);
}

#[test]
fn test_recv_timeout() {
    let (endpoint, _) = spawn_fixture(|mut stream| {
        let _ = frame::read_frame(&mut stream);
        // Never respond; hold the connection until the caller gives up.
        thread::sleep(Duration::from_secs(5));
    });
    let channel = Channel::with_endpoint(endpoint);
    let mut controller = Controller::new();
    controller.set_timeout(100);

    let start = Instant::now();
    let response: Option<EchoResponse> = channel.call_method(
        "EchoService",
        "Echo",
        &mut controller,
        &EchoRequest { text: "never answered".into() },
    );
    let elapsed = start.elapsed();

    assert_outcome_invariant(&response, &controller);
    assert_eq!(controller.error_text(), "recv timeout!");
    assert!(elapsed >= Duration::from_millis(100));
    assert!(elapsed < Duration::from_secs(3), "timeout took {:?}", elapsed);
    assert_eq!(channel.pooled_connections(), 0);
}

#[test]
fn test_recv_error_when_provider_closes_without_response() {
    let (endpoint, _) = spawn_fixture(|mut stream| {
        let _ = frame::read_frame(&mut stream);
        // Close without responding.
    });
    let channel = Channel::with_endpoint(endpoint);
    let mut controller = Controller::new();
    controller.set_timeout(1000);

    let response: Option<EchoResponse> = channel.call_method(
        "EchoService",
        "Echo",
        &mut controller,
        &EchoRequest { text: "dropped".into() },
    );

    assert_outcome_invariant(&response, &controller);
    assert_eq!(controller.error_text(), "recv error!");
}

#[test]
fn test_parse_error_on_garbage_response() {
    let (endpoint, _) = spawn_fixture(|mut stream| {
        let _ = frame::read_frame(&mut stream);
        let _ = stream.write_all(&[0xff, 0xff, 0xff, 0xff, 0xff]);
    });
    let channel = Channel::with_endpoint(endpoint);
    let mut controller = Controller::new();
    controller.set_timeout(1000);

    let response: Option<EchoResponse> = channel.call_method(
        "EchoService",
        "Echo",
        &mut controller,
        &EchoRequest { text: "garbage back".into() },
    );

    assert_outcome_invariant(&response, &controller);
    assert_eq!(controller.error_text(), "parse error!");
    assert_eq!(channel.pooled_connections(), 0);
}

#[test]
fn test_response_larger_than_buffer_is_unsupported() {
    // The response side is not length-prefixed; the caller reads at most
    // 1024 bytes. A larger response gets truncated and fails to parse.
    let (endpoint, _) = spawn_fixture(|mut stream| {
        let _ = frame::read_frame(&mut stream);
        let huge = EchoResponse { text: "x".repeat(4 * 1024), status: 0 };
        let _ = stream.write_all(&codec::encode(&huge).unwrap());
    });
    let channel = Channel::with_endpoint(endpoint);
    let mut controller = Controller::new();
    controller.set_timeout(1000);

    let response: Option<EchoResponse> = channel.call_method(
        "EchoService",
        "Echo",
        &mut controller,
        &EchoRequest { text: "small ask, huge answer".into() },
    );

    assert_outcome_invariant(&response, &controller);
    assert_eq!(controller.error_text(), "parse error!");
}

#[test]
fn test_connect_error() {
    // Bind then drop to find a port with no listener behind it.
    let dead = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        endpoint(listener.local_addr().unwrap())
    };
    let channel = Channel::with_endpoint(dead);
    let mut controller = Controller::new();

    let response: Option<EchoResponse> = channel.call_method(
        "EchoService",
        "Echo",
        &mut controller,
        &EchoRequest { text: "nobody home".into() },
    );

    assert_outcome_invariant(&response, &controller);
    assert_eq!(controller.error_text(), "connect error!");
}

#[test]
fn test_serialize_request_error() {
    struct Unserializable;
    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(
            &self,
            _serializer: S,
        ) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("deliberately unserializable"))
        }
    }

    let channel = Channel::with_endpoint("127.0.0.1:1");
    let mut controller = Controller::new();

    let response: Option<EchoResponse> =
        channel.call_method("EchoService", "Echo", &mut controller, &Unserializable);

    assert!(response.is_none());
    assert_eq!(controller.error_text(), "serialize request error!");
}

#[test]
fn test_zero_timeout_returns_immediately() {
    let (endpoint, _) = spawn_fixture(|mut stream| {
        let _ = frame::read_frame(&mut stream);
        thread::sleep(Duration::from_secs(5));
    });
    let channel = Channel::with_endpoint(endpoint);
    let mut controller = Controller::new();
    controller.set_timeout(0);

    let start = Instant::now();
    let response: Option<EchoResponse> = channel.call_method(
        "EchoService",
        "Echo",
        &mut controller,
        &EchoRequest { text: "no patience".into() },
    );

    assert!(response.is_none());
    assert_eq!(controller.error_text(), "recv timeout!");
    assert!(start.elapsed() < Duration::from_secs(1));
}
