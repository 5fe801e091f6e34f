//! Kubernetes Metrics API client for kubetop
//!
//! This crate connects to a cluster, discovers whether it serves
//! `metrics.k8s.io`, and fetches pod usage as [`PodMetricsRecord`]s.

mod client;
mod discovery;
mod error;
mod fetch;
mod metrics;

pub use client::KubeClient;
pub use discovery::{advertises_metrics_api, supports_metrics_api};
pub use error::{FetchError, FetchErrorKind};
pub use fetch::{MetricsSource, fetch_pod_metrics};
pub use metrics::{
    ContainerMetrics, METRICS_API_GROUP, METRICS_API_VERSION, PodMetrics,
    SUPPORTED_METRICS_API_VERSIONS,
};

pub use kubetop_types::{
    ContainerUsage, NamespaceScope, PodMetricsRecord, PodUsageSummary, Selector,
};
