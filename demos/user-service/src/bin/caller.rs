//! UserServiceRpc caller.
//!
//! ```bash
//! user-service-caller -i zrpc.conf --name alice --pwd secret
//! ```
//!
//! Resolves `UserServiceRpc/Login` through the registry, performs one call
//! and prints the outcome. Exits non-zero when the call fails.

use std::sync::Arc;

use argh::FromArgs;
use user_service::{LoginRequest, LoginResponse, LOGIN_METHOD, SERVICE_NAME};
use zrpc_caller::{Channel, Controller};
use zrpc_common::{LogConfig, RpcConfig};
use zrpc_registry::RegistryClient;

/// call UserServiceRpc.Login on a provider discovered via the registry
#[derive(FromArgs)]
struct Args {
    /// path to the key=value configuration file
    #[argh(option, short = 'i', long = "config")]
    config: String,

    /// user name to log in with
    #[argh(option, default = "String::from(\"alice\")")]
    name: String,

    /// password to log in with
    #[argh(option, default = "String::from(\"secret\")")]
    pwd: String,

    /// enable debug logging
    #[argh(switch, short = 'v')]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();
    zrpc_common::logging::init(LogConfig {
        verbose: args.verbose,
        ..Default::default()
    });

    let config = RpcConfig::load(&args.config)?;
    let registry = Arc::new(RegistryClient::connect(&config.zookeeper_endpoint())?);
    let channel = Channel::new(registry);

    let mut controller = Controller::new();
    let request = LoginRequest {
        name: args.name,
        pwd: args.pwd,
    };
    let response: Option<LoginResponse> =
        channel.call_method(SERVICE_NAME, LOGIN_METHOD, &mut controller, &request);

    match response {
        Some(response) if !controller.failed() => {
            println!(
                "login success: {} (errcode {}, errmsg {:?})",
                response.success, response.result.errcode, response.result.errmsg
            );
            Ok(())
        }
        _ => anyhow::bail!("rpc failed: {}", controller.error_text()),
    }
}
