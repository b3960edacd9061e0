use std::collections::{BTreeMap, HashMap};

use serde::de::DeserializeOwned;
use serde::Serialize;
use zrpc_common::codec;
use zrpc_common::Result;

/// Erased method implementation: decodes the request payload, invokes the
/// user function and encodes the response.
pub type MethodHandler = Box<dyn Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync>;

/// A named method of a service.
pub struct MethodDescriptor {
    name: String,
    handler: MethodHandler,
}

impl MethodDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the method against an encoded request, yielding the encoded
    /// response.
    pub fn invoke(&self, payload: &[u8]) -> Result<Vec<u8>> {
        (self.handler)(payload)
    }
}

/// A named collection of methods. Closed after [`ServiceBuilder::build`];
/// never mutated while the provider is running.
pub struct ServiceDescriptor {
    name: String,
    methods: BTreeMap<String, MethodDescriptor>,
}

impl ServiceDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }
}

/// Builds a [`ServiceDescriptor`] from typed method functions.
///
/// Each registered function takes a deserializable request and returns a
/// serializable response; the builder erases the types into a byte-level
/// handler so the dispatcher stays schema-agnostic. Method names are unique
/// within a service; registering a name twice replaces the earlier entry.
pub struct ServiceBuilder {
    name: String,
    methods: BTreeMap<String, MethodDescriptor>,
}

impl ServiceBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: BTreeMap::new(),
        }
    }

    pub fn method<Req, Resp, F>(mut self, name: &str, handler: F) -> Self
    where
        Req: DeserializeOwned,
        Resp: Serialize,
        F: Fn(Req) -> Result<Resp> + Send + Sync + 'static,
    {
        let erased: MethodHandler = Box::new(move |payload| {
            let request: Req = codec::decode(payload)?;
            let response = handler(request)?;
            codec::encode(&response)
        });
        self.methods.insert(
            name.to_string(),
            MethodDescriptor {
                name: name.to_string(),
                handler: erased,
            },
        );
        self
    }

    pub fn build(self) -> ServiceDescriptor {
        ServiceDescriptor {
            name: self.name,
            methods: self.methods,
        }
    }
}

/// The provider's registration table: `service name -> descriptor`.
///
/// Filled through `notify_service` before the provider runs, read-only
/// afterwards. Re-registering a service name replaces the earlier
/// descriptor, so notifying the same descriptor twice is a no-op.
#[derive(Default)]
pub struct ServiceTable {
    services: HashMap<String, ServiceDescriptor>,
}

impl ServiceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, service: ServiceDescriptor) {
        self.services.insert(service.name().to_string(), service);
    }

    pub fn get(&self, service: &str) -> Option<&ServiceDescriptor> {
        self.services.get(service)
    }

    pub fn lookup(&self, service: &str, method: &str) -> Option<&MethodDescriptor> {
        self.get(service)?.method(method)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.values()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
