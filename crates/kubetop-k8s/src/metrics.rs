//! `metrics.k8s.io/v1beta1` wire types
//!
//! k8s-openapi does not ship the Metrics API, so the resource is declared here
//! and plugged into kube's typed `Api`.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use kubetop_types::{ContainerUsage, PodMetricsRecord, parse_cpu_millis, parse_memory_bytes};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

pub const METRICS_API_GROUP: &str = "metrics.k8s.io";
pub const METRICS_API_VERSION: &str = "v1beta1";

/// Metrics API versions this client can read
pub const SUPPORTED_METRICS_API_VERSIONS: &[&str] = &[METRICS_API_VERSION];

/// Usage snapshot of one pod
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PodMetrics {
    pub metadata: ObjectMeta,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Time>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,

    #[serde(default)]
    pub containers: Vec<ContainerMetrics>,
}

/// Usage snapshot of one container, keyed by resource name ("cpu", "memory")
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ContainerMetrics {
    pub name: String,

    #[serde(default)]
    pub usage: BTreeMap<String, Quantity>,
}

impl k8s_openapi::Resource for PodMetrics {
    const API_VERSION: &'static str = "metrics.k8s.io/v1beta1";
    const GROUP: &'static str = METRICS_API_GROUP;
    const KIND: &'static str = "PodMetrics";
    const VERSION: &'static str = METRICS_API_VERSION;
    const URL_PATH_SEGMENT: &'static str = "pods";
    type Scope = k8s_openapi::NamespaceResourceScope;
}

impl k8s_openapi::Metadata for PodMetrics {
    type Ty = ObjectMeta;

    fn metadata(&self) -> &Self::Ty {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Self::Ty {
        &mut self.metadata
    }
}

impl PodMetrics {
    /// Convert to the internal representation. Missing resources count as zero.
    pub fn into_record(self) -> Result<PodMetricsRecord, FetchError> {
        let name = self.metadata.name.unwrap_or_default();
        let namespace = self.metadata.namespace.unwrap_or_default();

        let containers = self
            .containers
            .into_iter()
            .map(|c| {
                let cpu_millis = usage_of(&c, "cpu", parse_cpu_millis, &name)?;
                let memory_bytes = usage_of(&c, "memory", parse_memory_bytes, &name)?;
                Ok(ContainerUsage::new(c.name, cpu_millis, memory_bytes))
            })
            .collect::<Result<Vec<_>, FetchError>>()?;

        let mut record = PodMetricsRecord::new(name, namespace);
        record.containers = containers;
        record.timestamp = self.timestamp.map(|t| t.0);
        record.window = self.window;
        Ok(record)
    }
}

fn usage_of(
    container: &ContainerMetrics,
    resource: &'static str,
    parse: fn(&str) -> Result<i64, kubetop_types::QuantityError>,
    pod: &str,
) -> Result<i64, FetchError> {
    let Some(quantity) = container.usage.get(resource) else {
        return Ok(0);
    };
    parse(&quantity.0).map_err(|source| FetchError::Convert {
        pod: pod.to_string(),
        container: container.name.clone(),
        resource,
        source,
    })
}
