//! zrpc Provider
//!
//! The provider side of the framework: a [`Provider`] binds a listening
//! socket, advertises every registered `(service, method)` pair in the
//! registry, and dispatches incoming connections onto a fixed
//! [`WorkerPool`]. Each worker decodes one framed request, looks the method
//! up in the [`ServiceTable`], invokes it and writes back the encoded
//! response.
//!
//! # Example
//!
//! ```no_run
//! use zrpc_common::{Result, RpcConfig};
//! use zrpc_provider::{Provider, ServiceBuilder};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct LoginRequest { name: String, pwd: String }
//! #[derive(Serialize)]
//! struct LoginResponse { success: bool }
//!
//! fn main() -> Result<()> {
//!     let config = RpcConfig::load("zrpc.conf")?;
//!     let mut provider = Provider::new(config);
//!     provider.notify_service(
//!         ServiceBuilder::new("UserServiceRpc")
//!             .method("Login", |request: LoginRequest| {
//!                 let _ = (request.name, request.pwd);
//!                 Ok(LoginResponse { success: true })
//!             })
//!             .build(),
//!     );
//!     provider.run()
//! }
//! ```

mod server;
mod service;
mod worker;

pub use server::{Provider, CONNECTION_READ_TIMEOUT};
pub use service::{MethodDescriptor, ServiceBuilder, ServiceDescriptor, ServiceTable};
pub use worker::{TaskHandle, WorkerPool};
