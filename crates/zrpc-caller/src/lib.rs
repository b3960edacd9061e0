//! zrpc Caller
//!
//! The caller side of the framework: a [`Channel`] performs one RPC
//! end-to-end (resolve, frame, send, receive, parse) while a
//! [`Controller`] carries the per-call timeout and outcome.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use serde::{Deserialize, Serialize};
//! use zrpc_caller::{Channel, Controller};
//! use zrpc_registry::RegistryClient;
//!
//! #[derive(Serialize)]
//! struct LoginRequest { name: String, pwd: String }
//! #[derive(Deserialize)]
//! struct LoginResponse { success: bool }
//!
//! let registry = Arc::new(RegistryClient::connect("127.0.0.1:2181").unwrap());
//! let channel = Channel::new(registry);
//! let mut controller = Controller::new();
//! controller.set_timeout(1000);
//!
//! let request = LoginRequest { name: "alice".into(), pwd: "secret".into() };
//! let response: Option<LoginResponse> =
//!     channel.call_method("UserServiceRpc", "Login", &mut controller, &request);
//! match response {
//!     Some(r) => println!("login success: {}", r.success),
//!     None => eprintln!("call failed: {}", controller.error_text()),
//! }
//! ```

mod channel;
mod controller;
mod pool;

pub use channel::Channel;
pub use controller::{Controller, DEFAULT_TIMEOUT_MS};
pub use pool::ConnectionPool;
