//! Metrics API capability discovery

use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIGroupList;
use tracing::debug;

use crate::fetch::MetricsSource;
use crate::metrics::{METRICS_API_GROUP, SUPPORTED_METRICS_API_VERSIONS};

/// Check whether the server serves a Metrics API version this client can read.
///
/// Discovery failures are reported as `false`, so `false` means "unsupported
/// or undiscoverable".
pub async fn supports_metrics_api<S>(source: &S) -> bool
where
    S: MetricsSource + ?Sized,
{
    match source.list_api_groups().await {
        Ok(groups) => advertises_metrics_api(&groups),
        Err(e) => {
            debug!(error = %e, "API group discovery failed, assuming no metrics API");
            false
        }
    }
}

/// True iff the metrics group lists at least one supported version
pub fn advertises_metrics_api(groups: &APIGroupList) -> bool {
    groups
        .groups
        .iter()
        .filter(|g| g.name == METRICS_API_GROUP)
        .flat_map(|g| g.versions.iter())
        .any(|v| SUPPORTED_METRICS_API_VERSIONS.contains(&v.version.as_str()))
}

#[cfg(test)]
mod tests {
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{APIGroup, GroupVersionForDiscovery};

    use super::*;
    use crate::fetch::testing::{Call, FakeCluster};

    fn group(name: &str, versions: &[&str]) -> APIGroup {
        APIGroup {
            name: name.to_string(),
            versions: versions
                .iter()
                .map(|v| GroupVersionForDiscovery {
                    group_version: format!("{}/{}", name, v),
                    version: v.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn group_list(groups: Vec<APIGroup>) -> APIGroupList {
        APIGroupList { groups }
    }

    #[test]
    fn test_metrics_group_with_supported_version() {
        let groups = group_list(vec![
            group("apps", &["v1"]),
            group("metrics.k8s.io", &["v1beta1"]),
        ]);
        assert!(advertises_metrics_api(&groups));
    }

    #[test]
    fn test_metrics_group_missing() {
        let groups = group_list(vec![group("apps", &["v1"]), group("batch", &["v1"])]);
        assert!(!advertises_metrics_api(&groups));
    }

    #[test]
    fn test_metrics_group_with_unsupported_version() {
        let groups = group_list(vec![group("metrics.k8s.io", &["v1alpha1", "v2"])]);
        assert!(!advertises_metrics_api(&groups));
    }

    #[test]
    fn test_supported_version_on_other_group() {
        let groups = group_list(vec![group("custom.metrics.k8s.io", &["v1beta1"])]);
        assert!(!advertises_metrics_api(&groups));
    }

    #[tokio::test]
    async fn test_supports_metrics_api() {
        let cluster = FakeCluster {
            groups: group_list(vec![group("metrics.k8s.io", &["v1beta1"])]),
            ..Default::default()
        };
        assert!(supports_metrics_api(&cluster).await);
        assert_eq!(cluster.calls(), vec![Call::ApiGroups]);
    }

    #[tokio::test]
    async fn test_discovery_failure_is_unsupported() {
        let cluster = FakeCluster::unreachable();
        assert!(!supports_metrics_api(&cluster).await);
    }
}
