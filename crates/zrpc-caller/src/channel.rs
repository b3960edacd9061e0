use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use zrpc_common::codec;
use zrpc_common::transport::frame::{self, RESPONSE_BUFFER_SIZE};
use zrpc_common::{RpcError, RpcHeader};
use zrpc_registry::RegistryClient;

use crate::controller::Controller;
use crate::pool::ConnectionPool;

enum Resolver {
    /// Look the endpoint up in the registry on every call.
    Registry(Arc<RegistryClient>),
    /// Fixed endpoint, no registry involved.
    Fixed(String),
}

/// Caller-side channel: performs one RPC end-to-end.
///
/// The channel resolves `(service, method)` to an endpoint, pools one TCP
/// connection per endpoint, writes the framed request and reads a single
/// response. Failures are surfaced through the [`Controller`]; on return
/// either the call produced a response and `controller.failed()` is false,
/// or it produced none and `controller.error_text()` says why.
pub struct Channel {
    resolver: Resolver,
    pool: ConnectionPool,
}

impl Channel {
    /// A channel that resolves endpoints through the registry.
    pub fn new(registry: Arc<RegistryClient>) -> Self {
        Self {
            resolver: Resolver::Registry(registry),
            pool: ConnectionPool::new(),
        }
    }

    /// A channel pinned to a fixed `"ip:port"` endpoint.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            resolver: Resolver::Fixed(endpoint.into()),
            pool: ConnectionPool::new(),
        }
    }

    /// Invokes `service.method` with `request`, returning the parsed
    /// response on success.
    ///
    /// On any failure the controller is marked failed with the reason and
    /// `None` is returned; the connection involved (if any) is closed and
    /// dropped from the pool.
    pub fn call_method<Req, Resp>(
        &self,
        service: &str,
        method: &str,
        controller: &mut Controller,
        request: &Req,
    ) -> Option<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let payload = match codec::encode(request) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(error = %e, "request serialization failed");
                controller.set_failed("serialize request error!");
                return None;
            }
        };

        let header = RpcHeader::new(service, method, payload.len() as u32);
        let send_frame = match frame::encode_frame(&header, &payload) {
            Ok(send_frame) => send_frame,
            Err(e) => {
                tracing::debug!(error = %e, "header serialization failed");
                controller.set_failed("serialize rpc header error!");
                return None;
            }
        };

        let endpoint = match &self.resolver {
            Resolver::Fixed(endpoint) => endpoint.clone(),
            Resolver::Registry(registry) => match registry.resolve(service, method) {
                Ok(endpoint) => endpoint,
                Err(e) => {
                    controller.set_failed(e.message());
                    return None;
                }
            },
        };

        // Taking the stream out of the map keeps the lock scope to map
        // operations and gives this call exclusive use of the connection.
        let mut stream = match self.pool.take(&endpoint) {
            Some(stream) => stream,
            None => match TcpStream::connect(endpoint.as_str()) {
                Ok(stream) => {
                    tracing::debug!(endpoint = %endpoint, "connection opened");
                    stream
                }
                Err(e) => {
                    tracing::debug!(endpoint = %endpoint, error = %e, "connect failed");
                    controller.set_failed("connect error!");
                    return None;
                }
            },
        };

        // The platform rejects a zero read timeout, so timeout_ms == 0 is
        // applied as the smallest representable deadline.
        let timeout = Duration::from_millis(controller.timeout_ms().max(1));
        if stream.set_read_timeout(Some(timeout)).is_err() {
            controller.set_failed("connect error!");
            return None;
        }

        if let Err(e) = stream.write_all(&send_frame) {
            tracing::debug!(endpoint = %endpoint, error = %e, "send failed");
            controller.set_failed("send error!");
            return None;
        }

        let mut recv_buf = [0u8; RESPONSE_BUFFER_SIZE];
        let received = match stream.read(&mut recv_buf) {
            Ok(0) => {
                controller.set_failed("recv error!");
                return None;
            }
            Ok(received) => received,
            Err(e) => {
                match frame::map_io_error(e, controller.timeout_ms()) {
                    RpcError::Timeout(_) => controller.set_failed("recv timeout!"),
                    _ => controller.set_failed("recv error!"),
                }
                return None;
            }
        };

        match codec::decode::<Resp>(&recv_buf[..received]) {
            Ok(response) => {
                self.pool.put(endpoint, stream);
                Some(response)
            }
            Err(e) => {
                tracing::debug!(endpoint = %endpoint, error = %e, "response parse failed");
                controller.set_failed("parse error!");
                None
            }
        }
    }

    /// Number of pooled connections, mostly useful in tests.
    pub fn pooled_connections(&self) -> usize {
        self.pool.len()
    }
}
