use std::io::Read;

use crate::codec;
use crate::protocol::error::{Result, RpcError};
use crate::protocol::header::RpcHeader;

/// Width of the header length prefix.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Upper bound on the encoded header, far above any real service/method name.
pub const MAX_HEADER_SIZE: usize = 64 * 1024;

/// Upper bound on a request payload (100 MB) to prevent memory exhaustion
/// from a hostile `args_size`.
pub const MAX_MESSAGE_SIZE: usize = 100 * 1024 * 1024;

/// Size of the caller-side response buffer. Responses are not
/// length-prefixed; anything beyond this is unsupported.
pub const RESPONSE_BUFFER_SIZE: usize = 1024;

/// Builds a request frame: big-endian length prefix, encoded header, payload.
///
/// `header.args_size` must equal `payload.len()`.
pub fn encode_frame(header: &RpcHeader, payload: &[u8]) -> Result<Vec<u8>> {
    if header.args_size as usize != payload.len() {
        return Err(RpcError::InvalidArgument(format!(
            "args_size {} does not match payload length {}",
            header.args_size,
            payload.len()
        )));
    }
    let header_bytes = codec::encode(header)?;
    if header_bytes.len() > MAX_HEADER_SIZE {
        return Err(RpcError::Serialization(format!(
            "encoded header is too large: {} bytes",
            header_bytes.len()
        )));
    }
    let mut frame =
        Vec::with_capacity(LENGTH_PREFIX_LEN + header_bytes.len() + payload.len());
    frame.extend_from_slice(&(header_bytes.len() as u32).to_be_bytes());
    frame.extend_from_slice(&header_bytes);
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Reads one request frame: the length prefix, then exactly `H` header
/// bytes, then exactly `args_size` payload bytes.
///
/// Any truncation, an out-of-range `H`, or a header that fails to parse is
/// an error; the receiver is expected to drop the connection.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<(RpcHeader, Vec<u8>)> {
    let mut payload = Vec::new();
    let header = read_frame_into(reader, &mut payload)?;
    Ok((header, payload))
}

/// [`read_frame`] writing the payload into a caller-supplied buffer, so hot
/// paths can recycle allocations.
pub fn read_frame_into<R: Read>(reader: &mut R, payload: &mut Vec<u8>) -> Result<RpcHeader> {
    let mut len_buf = [0u8; LENGTH_PREFIX_LEN];
    reader.read_exact(&mut len_buf)?;
    let header_len = u32::from_be_bytes(len_buf) as usize;
    if header_len == 0 || header_len > MAX_HEADER_SIZE {
        return Err(RpcError::Serialization(format!(
            "invalid header length {}",
            header_len
        )));
    }

    let mut header_buf = vec![0u8; header_len];
    reader.read_exact(&mut header_buf)?;
    let header: RpcHeader = codec::decode(&header_buf)?;

    if header.args_size as usize > MAX_MESSAGE_SIZE {
        return Err(RpcError::Serialization(format!(
            "request too large: {} bytes (max {} bytes)",
            header.args_size, MAX_MESSAGE_SIZE
        )));
    }
    payload.clear();
    payload.resize(header.args_size as usize, 0);
    reader.read_exact(payload)?;

    Ok(header)
}

/// Classifies an I/O error the way the rest of the framework expects:
/// timeout-shaped kinds become [`RpcError::Timeout`], connection-shaped
/// kinds become [`RpcError::Network`], everything else stays an I/O error.
pub fn map_io_error(err: std::io::Error, timeout_ms: u64) -> RpcError {
    match err.kind() {
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
            RpcError::Timeout(timeout_ms)
        }
        std::io::ErrorKind::ConnectionReset
        | std::io::ErrorKind::ConnectionAborted
        | std::io::ErrorKind::NotConnected => {
            RpcError::Network(format!("connection lost: {}", err))
        }
        _ => RpcError::Io(err),
    }
}
