//! Shared types for kubetop
//!
//! This crate contains the internal representation of pod metrics, the label
//! selector model, and resource quantity parsing.

mod quantity;
mod selector;

pub use quantity::{QuantityError, parse_cpu_millis, parse_memory_bytes};
pub use selector::{Requirement, Selector, SelectorError};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Bytes per mebibyte
pub const BYTES_PER_MIB: i64 = 1024 * 1024;

// ============================================================================
// Scope
// ============================================================================

/// Namespace scope of a metrics query
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NamespaceScope {
    All,
    Namespace(String),
}

impl NamespaceScope {
    /// Resolve the effective scope. `all_namespaces` wins over `namespace`.
    pub fn resolve(namespace: &str, all_namespaces: bool) -> Self {
        if all_namespaces {
            Self::All
        } else {
            Self::Namespace(namespace.to_string())
        }
    }

    /// Namespace name, or `None` for the all-namespaces scope
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Namespace(ns) => Some(ns),
        }
    }
}

impl std::fmt::Display for NamespaceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("<all namespaces>"),
            Self::Namespace(ns) => f.write_str(ns),
        }
    }
}

// ============================================================================
// Metrics Types
// ============================================================================

/// Resource usage of one container
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerUsage {
    pub name: String,
    pub cpu_millis: i64,
    pub memory_bytes: i64,
}

impl ContainerUsage {
    pub fn new(name: String, cpu_millis: i64, memory_bytes: i64) -> Self {
        Self {
            name,
            cpu_millis,
            memory_bytes,
        }
    }
}

/// Metrics snapshot for one pod
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PodMetricsRecord {
    pub name: String,
    pub namespace: String,

    /// Containers in the order the server reported them
    pub containers: Vec<ContainerUsage>,

    /// When the sample was taken
    pub timestamp: Option<DateTime<Utc>>,

    /// Sampling window, as reported (e.g. "30s")
    pub window: Option<String>,
}

impl PodMetricsRecord {
    pub fn new(name: String, namespace: String) -> Self {
        Self {
            name,
            namespace,
            containers: Vec::new(),
            timestamp: None,
            window: None,
        }
    }

    /// Summed CPU across all containers, in milli-units. Saturates at `i64::MAX`.
    pub fn total_cpu_millis(&self) -> i64 {
        self.containers
            .iter()
            .fold(0_i64, |acc, c| acc.saturating_add(c.cpu_millis))
    }

    /// Summed memory across all containers, in bytes. Saturates at `i64::MAX`.
    pub fn total_memory_bytes(&self) -> i64 {
        self.containers
            .iter()
            .fold(0_i64, |acc, c| acc.saturating_add(c.memory_bytes))
    }

    /// Summed memory in mebibytes, truncated
    pub fn total_memory_mib(&self) -> i64 {
        self.total_memory_bytes() / BYTES_PER_MIB
    }

    /// Per-pod totals for presentation
    pub fn summary(&self) -> PodUsageSummary {
        PodUsageSummary {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            cpu_millis: self.total_cpu_millis(),
            memory_mib: self.total_memory_mib(),
        }
    }
}

/// Aggregated usage of one pod
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PodUsageSummary {
    pub name: String,
    pub namespace: String,
    pub cpu_millis: i64,
    pub memory_mib: i64,
}
