//! Integration tests against a live ZooKeeper.
//!
//! These tests are ignored by default because they need a coordination
//! store listening at 127.0.0.1:2181 (e.g. `docker run -p 2181:2181
//! zookeeper:3.8`). Run them with `cargo test -- --ignored`.

use zrpc_registry::{method_path, RegistryClient};

const ZK: &str = "127.0.0.1:2181";

fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    format!("{}{}{}", prefix, std::process::id(), nanos)
}

#[test]
#[ignore]
fn test_register_then_resolve() {
    let registry = RegistryClient::connect(ZK).unwrap();
    let service = unique("ItSvc");

    registry.register_method(&service, "Login", "127.0.0.1:8080").unwrap();
    let endpoint = registry.resolve(&service, "Login").unwrap();
    assert_eq!(endpoint, "127.0.0.1:8080");
}

#[test]
#[ignore]
fn test_register_is_idempotent() {
    let registry = RegistryClient::connect(ZK).unwrap();
    let service = unique("ItIdem");

    registry.register_method(&service, "Login", "127.0.0.1:8080").unwrap();
    // Second registration observes the existing nodes and succeeds.
    registry.register_method(&service, "Login", "127.0.0.1:8080").unwrap();
    assert_eq!(registry.resolve(&service, "Login").unwrap(), "127.0.0.1:8080");
}

#[test]
#[ignore]
fn test_resolve_missing_method() {
    let registry = RegistryClient::connect(ZK).unwrap();
    let service = unique("ItMissing");

    let error = registry.resolve(&service, "Nope").unwrap_err();
    assert_eq!(
        error.message(),
        format!("{} is not exist!", method_path(&service, "Nope"))
    );
}

#[test]
#[ignore]
fn test_ephemeral_node_dies_with_the_session() {
    let service = unique("ItEphemeral");
    {
        let registry = RegistryClient::connect(ZK).unwrap();
        registry.register_method(&service, "Login", "127.0.0.1:8080").unwrap();
    }
    // Session closed; once the server notices, the method node is gone.
    let reader = RegistryClient::connect(ZK).unwrap();
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
    loop {
        if reader.resolve(&service, "Login").is_err() {
            break;
        }
        assert!(
            std::time::Instant::now() < deadline,
            "ephemeral node survived session close"
        );
        std::thread::sleep(std::time::Duration::from_millis(200));
    }
}
