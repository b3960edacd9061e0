//! zrpc Service Registry Client
//!
//! Providers advertise every `(service, method)` pair in a
//! ZooKeeper-compatible coordination store; callers resolve those entries
//! back into `ip:port` endpoints.
//!
//! # Registry Tree
//!
//! ```text
//! /<service>             persistent, payload empty
//! /<service>/<method>    ephemeral, payload "<ip>:<port>"
//! ```
//!
//! The method node is ephemeral: its lifetime is bounded by the provider's
//! session, so a crashed provider disappears from the registry without any
//! explicit cleanup. On session expiration the provider is notified through
//! [`RegistryClient::on_session_expired`] and re-registers everything
//! idempotently.

mod client;

pub use client::{method_path, service_path, RegistryClient, SessionExpiredCallback};
