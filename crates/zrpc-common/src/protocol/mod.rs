//! zrpc Protocol Definitions
//!
//! This module defines the core protocol types used throughout the system:
//!
//! - **[`RpcHeader`]**: the `{service_name, method_name, args_size}` triple
//!   that precedes every request payload on the wire
//! - **[`RpcError`]** / **[`ErrorKind`]**: the framework-wide error taxonomy
//! - **[`sink`]**: an optional process-wide error sink for logging and
//!   alerting on uncaught framework errors

pub mod error;
pub mod header;
pub mod sink;

pub use error::{ErrorKind, Result, RpcError};
pub use header::RpcHeader;
