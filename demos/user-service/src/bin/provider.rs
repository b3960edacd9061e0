//! UserServiceRpc provider.
//!
//! ```bash
//! user-service-provider -i zrpc.conf
//! ```
//!
//! Loads the configuration, registers `UserServiceRpc` in the coordination
//! store and serves until killed. Exits non-zero on any initialization
//! failure (config, bind/listen, registry session).

use argh::FromArgs;
use user_service::user_service;
use zrpc_common::{LogConfig, RpcConfig};
use zrpc_provider::Provider;

/// host the UserServiceRpc provider
#[derive(FromArgs)]
struct Args {
    /// path to the key=value configuration file
    #[argh(option, short = 'i', long = "config")]
    config: String,

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
    tracing::info!(
        endpoint = %config.server_endpoint(),
        registry = %config.zookeeper_endpoint(),
        workers = config.worker_threads,
        "starting provider"
    );

    let mut provider = Provider::new(config);
    provider.notify_service(user_service());
    provider.run()?;
    Ok(())
}
