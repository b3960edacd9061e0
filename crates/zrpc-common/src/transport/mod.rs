//! zrpc Transport Layer
//!
//! Length-prefixed framing over byte streams.
//!
//! # Wire Format
//!
//! ```text
//! offset  size        field
//! 0       4           header length H (u32, big-endian)
//! 4       H           encoded header {service_name, method_name, args_size}
//! 4+H     args_size   encoded request payload
//! ```
//!
//! The response direction is a single encoded message of at most
//! [`frame::RESPONSE_BUFFER_SIZE`] bytes, not length-prefixed: the caller
//! issues one read into a fixed buffer and parses whatever arrived.

pub mod frame;

pub use frame::{encode_frame, read_frame, read_frame_into};
