//! Full end-to-end test through a live ZooKeeper: provider registration,
//! registry resolution and one Login round trip.
//!
//! Ignored by default; needs a coordination store at 127.0.0.1:2181.
//! Run with `cargo test -- --ignored`.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use user_service::{user_service, LoginRequest, LoginResponse, LOGIN_METHOD, SERVICE_NAME};
use zrpc_caller::{Channel, Controller};
use zrpc_common::{ConfigMap, RpcConfig};
use zrpc_provider::Provider;
use zrpc_registry::{method_path, RegistryClient};

fn e2e_config(port: u16) -> RpcConfig {
    let text = format!(
        "rpcserverip=127.0.0.1\nrpcserverport={}\nzookeeperip=127.0.0.1\nzookeeperport=2181\nthreadnum=2\n",
        port
    );
    RpcConfig::from_map(&ConfigMap::parse(&text)).unwrap()
}

#[test]
#[ignore]
fn test_login_end_to_end() {
    let config = e2e_config(18080);
    let endpoint = config.server_endpoint();

    let mut provider = Provider::new(config.clone());
    provider.notify_service(user_service());
    thread::spawn(move || {
        let _ = provider.run();
    });
    thread::sleep(Duration::from_millis(500));

    // Registration invariant: the method node carries the configured
    // endpoint.
    let registry = Arc::new(RegistryClient::connect(&config.zookeeper_endpoint()).unwrap());
    let advertised = registry
        .get_data(&method_path(SERVICE_NAME, LOGIN_METHOD))
        .unwrap();
    assert_eq!(String::from_utf8(advertised).unwrap(), endpoint);

    // One Login round trip resolved through the registry.
    let channel = Channel::new(registry);
    let mut controller = Controller::new();
    controller.set_timeout(2000);
    let response: Option<LoginResponse> = channel.call_method(
        SERVICE_NAME,
        LOGIN_METHOD,
        &mut controller,
        &LoginRequest { name: "alice".into(), pwd: "secret".into() },
    );

    let response = response.unwrap_or_else(|| panic!("call failed: {}", controller.error_text()));
    assert!(response.success);
    assert_eq!(response.result.errcode, 0);
    assert_eq!(response.result.errmsg, "");
}
