//! Configuration file loading.
//!
//! Providers and callers are configured from a UTF-8 text file with one
//! `key=value` pair per line; `#` lines and blank lines are ignored and
//! whitespace is trimmed around keys and values.
//!
//! Required keys:
//!
//! - `rpcserverip` - dotted IPv4 address of the provider
//! - `rpcserverport` - decimal port `0..65535`
//! - `zookeeperip`, `zookeeperport` - coordination-store endpoint
//!
//! Optional:
//!
//! - `threadnum` - worker-pool size, defaulting to the number of CPUs

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::path::Path;

use crate::protocol::error::{Result, RpcError};

/// Raw `key=value` view of a configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConfigMap {
    entries: HashMap<String, String>,
}

impl ConfigMap {
    /// Parses configuration text into a key/value map.
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            entries.insert(key.trim().to_string(), value.trim().to_string());
        }
        Self { entries }
    }

    /// Reads and parses a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(RpcError::Config("configuration file path is empty".into()));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            RpcError::Config(format!("failed to open config file {}: {}", path.display(), e))
        })?;
        Ok(Self::parse(&text))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Validated framework configuration.
///
/// Parsed once at startup and passed through constructors; there is no
/// global configuration singleton.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub server_ip: Ipv4Addr,
    pub server_port: u16,
    pub zookeeper_ip: String,
    pub zookeeper_port: u16,
    pub worker_threads: usize,
}

impl RpcConfig {
    /// Loads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_map(&ConfigMap::load(path)?)
    }

    /// Validates a raw key/value map into a typed configuration.
    pub fn from_map(map: &ConfigMap) -> Result<Self> {
        let server_ip = required(map, "rpcserverip")?.parse::<Ipv4Addr>().map_err(|e| {
            RpcError::Config(format!("invalid rpcserverip: {}", e))
        })?;
        let server_port = parse_port(map, "rpcserverport")?;
        let zookeeper_ip = required(map, "zookeeperip")?.to_string();
        let zookeeper_port = parse_port(map, "zookeeperport")?;
        let worker_threads = match map.get("threadnum") {
            Some(raw) => raw.parse::<usize>().map_err(|e| {
                RpcError::Config(format!("invalid threadnum '{}': {}", raw, e))
            })?,
            None => num_cpus::get(),
        };
        Ok(Self {
            server_ip,
            server_port,
            zookeeper_ip,
            zookeeper_port,
            worker_threads,
        })
    }

    /// The provider's `ip:port` endpoint, as advertised in the registry.
    pub fn server_endpoint(&self) -> String {
        format!("{}:{}", self.server_ip, self.server_port)
    }

    /// The coordination store's `host:port` endpoint.
    pub fn zookeeper_endpoint(&self) -> String {
        format!("{}:{}", self.zookeeper_ip, self.zookeeper_port)
    }
}

fn required<'a>(map: &'a ConfigMap, key: &str) -> Result<&'a str> {
    map.get(key)
        .ok_or_else(|| RpcError::Config(format!("missing required key '{}'", key)))
}

fn parse_port(map: &ConfigMap, key: &str) -> Result<u16> {
    let raw = required(map, key)?;
    raw.parse::<u16>()
        .map_err(|e| RpcError::Config(format!("invalid {} '{}': {}", key, raw, e)))
}
