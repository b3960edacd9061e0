//! zrpc Common Types and Transport
//!
//! This crate provides the wire protocol, framing, error taxonomy and
//! configuration layer shared by every component of the zrpc RPC framework.
//!
//! # Overview
//!
//! zrpc is a lightweight RPC framework with a self-registering service
//! registry. A *provider* hosts services and advertises each
//! `service/method` pair in a ZooKeeper-compatible metadata store; a
//! *caller* resolves the advertised endpoint and exchanges one
//! length-prefixed binary request for one binary response over TCP.
//!
//! # Components
//!
//! - [`protocol`] - The wire header, the error taxonomy and the process-wide
//!   error sink
//! - [`codec`] - Binary serialization of schema-defined messages
//! - [`transport`] - Length-prefixed framing over byte streams
//! - [`config`] - `key=value` configuration files
//! - [`logging`] - Tracing-subscriber initialization for binaries
//! - [`object_pool`] - Reusable-object pool with hit/miss statistics
//!
//! # Wire Format
//!
//! ```text
//! [4-byte header length as u32 big-endian] [header] [request payload]
//! ```
//!
//! The header carries `{service_name, method_name, args_size}` and
//! `args_size` is the authoritative length of the payload that follows.

pub mod codec;
pub mod config;
pub mod logging;
pub mod object_pool;
pub mod protocol;
pub mod transport;

pub use config::{ConfigMap, RpcConfig};
pub use logging::LogConfig;
pub use object_pool::{ObjectPool, PoolStats, Pooled};
pub use protocol::error::{ErrorKind, Result, RpcError};
pub use protocol::header::RpcHeader;
pub use protocol::sink::{install_error_sink, report, safe_execute};
