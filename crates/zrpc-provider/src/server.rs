use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use zrpc_common::object_pool::{ObjectPool, PoolConfig};
use zrpc_common::protocol::sink;
use zrpc_common::transport::frame;
use zrpc_common::{Result, RpcConfig, RpcError};
use zrpc_registry::RegistryClient;

use crate::service::{ServiceDescriptor, ServiceTable};
use crate::worker::WorkerPool;

/// Read deadline applied to every accepted connection so a slow client
/// cannot stall a worker indefinitely.
pub const CONNECTION_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// The process hosting services and listening for RPCs.
///
/// Services are registered with [`Provider::notify_service`] before
/// [`Provider::run`]; the table is read-only afterwards. `run` binds the
/// configured endpoint, advertises every `(service, method)` pair in the
/// registry and serves connections until the process exits. The provider
/// answers exactly one request per connection and closes it.
pub struct Provider {
    config: RpcConfig,
    services: ServiceTable,
    workers: WorkerPool,
    buffers: Arc<ObjectPool<Vec<u8>>>,
}

impl Provider {
    pub fn new(config: RpcConfig) -> Self {
        let workers = WorkerPool::new(config.worker_threads);
        // One payload scratch buffer per worker covers the steady state.
        let buffers = Arc::new(ObjectPool::with_reset(
            PoolConfig {
                initial_size: config.worker_threads.max(1),
                max_size: 4 * config.worker_threads.max(1),
            },
            || Vec::with_capacity(4 * 1024),
            |buf| buf.clear(),
        ));
        Self {
            config,
            services: ServiceTable::new(),
            workers,
            buffers,
        }
    }

    /// Registers a service. Idempotent over the same descriptor.
    pub fn notify_service(&mut self, service: ServiceDescriptor) {
        tracing::info!(service = service.name(), "service registered");
        for method in service.method_names() {
            tracing::info!(service = service.name(), method, "method registered");
        }
        self.services.insert(service);
    }

    /// Binds the configured endpoint, registers everything in the registry
    /// and serves until the process exits.
    ///
    /// Bind, listen and registry-session failures are fatal and returned to
    /// the caller; per-connection failures are logged and dropped.
    pub fn run(self) -> Result<()> {
        let endpoint = self.config.server_endpoint();
        let listener = TcpListener::bind(&endpoint)
            .map_err(|e| RpcError::Network(format!("failed to bind {}: {}", endpoint, e)))?;

        let registry = Arc::new(RegistryClient::connect(&self.config.zookeeper_endpoint())?);
        let Provider {
            services,
            workers,
            buffers,
            ..
        } = self;
        let services = Arc::new(services);

        register_services(&registry, &services, &endpoint)?;
        install_reregistration(&registry, &services, &endpoint);

        tracing::info!(endpoint = %endpoint, "provider listening");
        serve_loop(&listener, &services, &workers, &buffers)
    }

    /// Serves connections on an already-bound listener, without touching
    /// the registry. This is the embedding hook used by tests and by
    /// deployments that do their own discovery.
    pub fn serve(self, listener: TcpListener) -> Result<()> {
        let Provider {
            services,
            workers,
            buffers,
            ..
        } = self;
        let services = Arc::new(services);
        serve_loop(&listener, &services, &workers, &buffers)
    }
}

/// Advertises every `(service, method)` pair. Safe to repeat: node creation
/// is create-if-absent.
fn register_services(
    registry: &RegistryClient,
    services: &ServiceTable,
    endpoint: &str,
) -> Result<()> {
    for service in services.iter() {
        for method in service.method_names() {
            registry.register_method(service.name(), method, endpoint)?;
            tracing::info!(service = service.name(), method, endpoint, "advertised");
        }
    }
    Ok(())
}

/// Installs the session-expired callback: reconnect and re-register all
/// services so the ephemeral method nodes reappear.
fn install_reregistration(
    registry: &Arc<RegistryClient>,
    services: &Arc<ServiceTable>,
    endpoint: &str,
) {
    let registry_cb = Arc::clone(registry);
    let services_cb = Arc::clone(services);
    let endpoint_cb = endpoint.to_string();
    registry.on_session_expired(move || {
        let registry = Arc::clone(&registry_cb);
        let services = Arc::clone(&services_cb);
        let endpoint = endpoint_cb.clone();
        // Reconnecting replaces (and drops) the expired session, which
        // joins the watcher thread this callback runs on; hop off it first.
        std::thread::spawn(move || {
            tracing::warn!("registry session expired, re-registering services");
            let outcome = registry
                .reconnect()
                .and_then(|_| register_services(&registry, &services, &endpoint));
            if let Err(e) = outcome {
                tracing::error!(error = %e, "re-registration after session expiry failed");
                sink::report(&e);
            }
        });
    });
}

/// Accept loop: single thread, each accepted connection handed to exactly
/// one worker.
fn serve_loop(
    listener: &TcpListener,
    services: &Arc<ServiceTable>,
    workers: &WorkerPool,
    buffers: &Arc<ObjectPool<Vec<u8>>>,
) -> Result<()> {
    loop {
        match listener.accept() {
            Ok((stream, peer)) => {
                tracing::debug!(peer = %peer, "connection accepted");
                if let Err(e) = stream.set_read_timeout(Some(CONNECTION_READ_TIMEOUT)) {
                    tracing::debug!(error = %e, "failed to set read deadline");
                }
                let services = Arc::clone(services);
                let buffers = Arc::clone(buffers);
                let dispatched =
                    workers.submit(move || handle_client_request(stream, &services, &buffers));
                if let Err(e) = dispatched {
                    tracing::error!(error = %e, "failed to dispatch connection");
                    sink::report(&e);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "accept error");
            }
        }
    }
}

/// Handles one request end-to-end on a worker thread.
///
/// Any I/O or parse failure drops the connection silently after a log
/// entry; no error response is sent. The stream is closed when this
/// function returns.
fn handle_client_request(
    mut stream: TcpStream,
    services: &ServiceTable,
    buffers: &ObjectPool<Vec<u8>>,
) {
    let mut payload = buffers.acquire();
    let header = match frame::read_frame_into(&mut stream, &mut payload) {
        Ok(header) => header,
        Err(e) => {
            tracing::debug!(error = %e, "dropping connection: bad request frame");
            return;
        }
    };

    let Some(service) = services.get(&header.service_name) else {
        tracing::error!("{} is not exist!", header.service_name);
        return;
    };
    let Some(method) = service.method(&header.method_name) else {
        tracing::error!("{} is not exist!", header.method_name);
        return;
    };

    let response = match method.invoke(&payload) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(
                service = %header.service_name,
                method = %header.method_name,
                error = %e,
                "dispatch failed"
            );
            sink::report(&e);
            return;
        }
    };

    if let Err(e) = stream.write_all(&response) {
        tracing::error!(error = %e, "send response error!");
    }
}
