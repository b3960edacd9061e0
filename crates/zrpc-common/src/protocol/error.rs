use thiserror::Error;

/// Stable error categories shared across the framework.
///
/// Every [`RpcError`] maps onto exactly one kind; the kind (together with
/// [`RpcError::code`]) is the stable contract, the message text is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    Network,
    Coordination,
    Serialization,
    Service,
    Timeout,
    InvalidArgument,
    Resource,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Config => "CONFIG_ERROR",
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::Coordination => "COORDINATION_ERROR",
            ErrorKind::Serialization => "SERIALIZATION_ERROR",
            ErrorKind::Service => "SERVICE_ERROR",
            ErrorKind::Timeout => "TIMEOUT_ERROR",
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::Resource => "RESOURCE_ERROR",
            ErrorKind::Unknown => "UNKNOWN_ERROR",
        }
    }
}

/// Framework-wide error type.
///
/// Functions that can fail return [`Result`]; the first failure on a call
/// path short-circuits subsequent steps via `?`.
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("config error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("coordination error: {0}")]
    Coordination(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("service error: {0}")]
    Service(String),

    #[error("request timed out after {0}ms")]
    Timeout(u64),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("resource error: {0}")]
    Resource(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl From<postcard::Error> for RpcError {
    fn from(err: postcard::Error) -> Self {
        RpcError::Serialization(err.to_string())
    }
}

impl RpcError {
    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RpcError::Config(_) => ErrorKind::Config,
            RpcError::Network(_) | RpcError::Io(_) => ErrorKind::Network,
            RpcError::Coordination(_) => ErrorKind::Coordination,
            RpcError::Serialization(_) => ErrorKind::Serialization,
            RpcError::Service(_) => ErrorKind::Service,
            RpcError::Timeout(_) => ErrorKind::Timeout,
            RpcError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            RpcError::Resource(_) => ErrorKind::Resource,
            RpcError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Numeric error code, stable per category.
    pub fn code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Config => 1000,
            ErrorKind::Network => 2000,
            ErrorKind::Coordination => 3000,
            ErrorKind::Serialization => 4000,
            ErrorKind::Service => 5000,
            ErrorKind::Timeout => 6000,
            ErrorKind::InvalidArgument => 7000,
            ErrorKind::Resource => 8000,
            ErrorKind::Unknown => 9999,
        }
    }

    /// The bare message, without the category prefix that `Display` adds.
    pub fn message(&self) -> String {
        match self {
            RpcError::Config(m)
            | RpcError::Network(m)
            | RpcError::Coordination(m)
            | RpcError::Serialization(m)
            | RpcError::Service(m)
            | RpcError::InvalidArgument(m)
            | RpcError::Resource(m)
            | RpcError::Unknown(m) => m.clone(),
            RpcError::Io(e) => e.to_string(),
            RpcError::Timeout(ms) => format!("request timed out after {}ms", ms),
        }
    }
}

pub type Result<T> = std::result::Result<T, RpcError>;
