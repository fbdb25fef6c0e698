use crate::backend::BackendError;
use crate::codec::CodecError;
use crate::config::ConfigError;
use crate::index::RegistryError;
use crate::query::PlanError;
use crate::types::UnsupportedFilter;

/// Errors returned by store operations.
#[derive(Debug)]
pub enum StoreError {
    /// An argument failed validation before any I/O.
    InvalidArgument(String),
    /// The query could not be planned.
    Plan(PlanError),
    /// Index registration failed.
    Registry(RegistryError),
    /// A term or stored value could not be encoded or decoded.
    Codec(CodecError),
    /// The backend reported an error.
    Backend(BackendError),
    /// The configuration is invalid.
    Config(ConfigError),
    /// No index with this name is registered.
    UnknownIndex(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::Plan(e) => write!(f, "query planning failed: {e}"),
            Self::Registry(e) => write!(f, "index registration failed: {e}"),
            Self::Codec(e) => write!(f, "codec error: {e}"),
            Self::Backend(e) => write!(f, "backend error: {e}"),
            Self::Config(e) => write!(f, "configuration error: {e}"),
            Self::UnknownIndex(name) => write!(f, "unknown index '{name}'"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Plan(e) => Some(e),
            Self::Registry(e) => Some(e),
            Self::Codec(e) => Some(e),
            Self::Backend(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::InvalidArgument(_) | Self::UnknownIndex(_) => None,
        }
    }
}

impl From<PlanError> for StoreError {
    fn from(e: PlanError) -> Self {
        Self::Plan(e)
    }
}

impl From<UnsupportedFilter> for StoreError {
    fn from(e: UnsupportedFilter) -> Self {
        Self::Plan(e.into())
    }
}

impl From<RegistryError> for StoreError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

impl From<CodecError> for StoreError {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

impl From<BackendError> for StoreError {
    fn from(e: BackendError) -> Self {
        Self::Backend(e)
    }
}

impl From<ConfigError> for StoreError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
