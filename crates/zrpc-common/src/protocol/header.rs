use serde::{Deserialize, Serialize};

/// The wire header preceding every request payload.
///
/// The header is encoded with the framework codec and sent behind a 4-byte
/// big-endian length prefix. `args_size` is the authoritative number of
/// payload bytes that immediately follow the encoded header; receivers
/// allocate exactly that many bytes before decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcHeader {
    pub service_name: String,
    pub method_name: String,
    pub args_size: u32,
}

impl RpcHeader {
    pub fn new(
        service_name: impl Into<String>,
        method_name: impl Into<String>,
        args_size: u32,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            method_name: method_name.into(),
            args_size,
        }
    }
}
