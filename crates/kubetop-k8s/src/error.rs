//! Errors returned by the metrics fetcher

use kubetop_types::{NamespaceScope, QuantityError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to get metrics for pod '{name}' in {scope}")]
    Get {
        name: String,
        scope: NamespaceScope,
        #[source]
        source: kube::Error,
    },

    #[error("failed to list pod metrics in {scope}")]
    List {
        scope: NamespaceScope,
        #[source]
        source: kube::Error,
    },

    #[error("invalid {resource} usage for container '{container}' in pod '{pod}'")]
    Convert {
        pod: String,
        container: String,
        resource: &'static str,
        #[source]
        source: QuantityError,
    },
}

/// Coarse classification of a [`FetchError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchErrorKind {
    Get,
    List,
    Convert,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Get { .. } => FetchErrorKind::Get,
            Self::List { .. } => FetchErrorKind::List,
            Self::Convert { .. } => FetchErrorKind::Convert,
        }
    }
}
