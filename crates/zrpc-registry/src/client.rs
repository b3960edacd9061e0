use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use zookeeper::{Acl, CreateMode, KeeperState, WatchedEvent, Watcher, ZkError, ZooKeeper};
use zrpc_common::{Result, RpcError};

/// Session timeout negotiated with the coordination store.
const SESSION_TIMEOUT: Duration = Duration::from_millis(3000);

/// Callback invoked when the coordination-store session expires.
pub type SessionExpiredCallback = Box<dyn Fn() + Send + Sync + 'static>;

type SharedCallback = Arc<Mutex<Option<SessionExpiredCallback>>>;

/// Forwards session-expired events to the installed callback.
///
/// The callback runs on the store client's event thread and must not block
/// or replace the session from there; the provider hops to a fresh thread
/// before reconnecting.
struct SessionWatcher {
    expired: SharedCallback,
}

impl Watcher for SessionWatcher {
    fn handle(&self, event: WatchedEvent) {
        tracing::debug!(?event, "registry session event");
        if matches!(event.keeper_state, KeeperState::Expired) {
            tracing::warn!("registry session expired");
            if let Ok(slot) = self.expired.lock() {
                if let Some(callback) = slot.as_ref() {
                    callback();
                }
            }
        }
    }
}

/// Blocking client for the service registry.
///
/// Wraps a ZooKeeper session. All operations return once the store has
/// acknowledged them; `connect` does not return until the session is
/// serving requests.
pub struct RegistryClient {
    hosts: String,
    session: RwLock<ZooKeeper>,
    expired: SharedCallback,
}

impl RegistryClient {
    /// Connects to the coordination store at `host:port`.
    pub fn connect(hosts: &str) -> Result<Self> {
        let expired: SharedCallback = Arc::new(Mutex::new(None));
        let session = open_session(hosts, &expired)?;
        Ok(Self {
            hosts: hosts.to_string(),
            session: RwLock::new(session),
            expired,
        })
    }

    /// Installs the session-expired callback, replacing any previous one.
    pub fn on_session_expired<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        if let Ok(mut slot) = self.expired.lock() {
            *slot = Some(Box::new(callback));
        }
    }

    /// Replaces the expired session with a fresh one.
    ///
    /// Must not be called from the session watcher thread: dropping the old
    /// session joins that thread.
    pub fn reconnect(&self) -> Result<()> {
        let fresh = open_session(&self.hosts, &self.expired)?;
        if let Ok(mut session) = self.session.write() {
            *session = fresh;
        }
        Ok(())
    }

    /// Creates a node if it does not exist yet.
    ///
    /// Calling this twice yields the same final state as calling it once: an
    /// existing node (observed either by the probe or by a concurrent
    /// create) is success.
    pub fn create_if_absent(&self, path: &str, data: &[u8], mode: CreateMode) -> Result<()> {
        let session = self.read_session()?;
        match session.exists(path, false) {
            Ok(Some(_)) => return Ok(()),
            Ok(None) => {}
            Err(e) => return Err(coordination(path, e)),
        }
        match session.create(path, data.to_vec(), Acl::open_unsafe().clone(), mode) {
            Ok(created) => {
                tracing::info!(path = %created, "registry node created");
                Ok(())
            }
            Err(ZkError::NodeExists) => Ok(()),
            Err(e) => Err(coordination(path, e)),
        }
    }

    /// Reads a node's payload.
    pub fn get_data(&self, path: &str) -> Result<Vec<u8>> {
        let session = self.read_session()?;
        match session.get_data(path, false) {
            Ok((data, _stat)) => Ok(data),
            Err(e) => Err(coordination(path, e)),
        }
    }

    /// Advertises one `(service, method)` pair as reachable at `endpoint`.
    ///
    /// The service node is persistent and shared; the method node is
    /// ephemeral and carries the `"<ip>:<port>"` payload.
    pub fn register_method(&self, service: &str, method: &str, endpoint: &str) -> Result<()> {
        self.create_if_absent(&service_path(service), &[], CreateMode::Persistent)?;
        self.create_if_absent(
            &method_path(service, method),
            endpoint.as_bytes(),
            CreateMode::Ephemeral,
        )
    }

    /// Resolves a `(service, method)` pair to its advertised `ip:port`
    /// endpoint.
    pub fn resolve(&self, service: &str, method: &str) -> Result<String> {
        let path = method_path(service, method);
        let data = self
            .get_data(&path)
            .map_err(|_| RpcError::Coordination(format!("{} is not exist!", path)))?;
        if data.is_empty() {
            return Err(RpcError::Coordination(format!("{} is not exist!", path)));
        }
        let endpoint = String::from_utf8(data)
            .map_err(|_| RpcError::Coordination(format!("{} address is invalid!", path)))?;
        validate_endpoint(&path, &endpoint)?;
        Ok(endpoint)
    }

    fn read_session(&self) -> Result<std::sync::RwLockReadGuard<'_, ZooKeeper>> {
        self.session
            .read()
            .map_err(|_| RpcError::Coordination("registry session lock poisoned".into()))
    }
}

/// Path of a service's parent node.
pub fn service_path(service: &str) -> String {
    format!("/{}", service)
}

/// Path of a method's ephemeral node.
pub fn method_path(service: &str, method: &str) -> String {
    format!("/{}/{}", service, method)
}

fn open_session(hosts: &str, expired: &SharedCallback) -> Result<ZooKeeper> {
    let watcher = SessionWatcher {
        expired: Arc::clone(expired),
    };
    let session = ZooKeeper::connect(hosts, SESSION_TIMEOUT, watcher)
        .map_err(|e| RpcError::Coordination(format!("failed to connect to {}: {:?}", hosts, e)))?;
    // Probe the root so connect() only returns with a session that is
    // actually serving requests.
    session
        .exists("/", false)
        .map_err(|e| RpcError::Coordination(format!("session to {} is not usable: {:?}", hosts, e)))?;
    tracing::info!(hosts, "connected to registry");
    Ok(session)
}

fn validate_endpoint(path: &str, endpoint: &str) -> Result<()> {
    let Some((ip, port)) = endpoint.split_once(':') else {
        return Err(RpcError::Coordination(format!("{} address is invalid!", path)));
    };
    if ip.is_empty() || port.parse::<u16>().is_err() {
        return Err(RpcError::Coordination(format!("{} address is invalid!", path)));
    }
    Ok(())
}

fn coordination(path: &str, err: ZkError) -> RpcError {
    RpcError::Coordination(format!("{}: {:?}", path, err))
}
