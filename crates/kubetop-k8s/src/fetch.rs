//! Pod metrics fetching

use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIGroupList;
use kubetop_types::{NamespaceScope, PodMetricsRecord, Selector};
use tracing::debug;

use crate::error::FetchError;
use crate::metrics::PodMetrics;

/// The cluster calls the fetcher depends on
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Fetch metrics for a single named pod
    async fn get_pod_metrics(
        &self,
        scope: &NamespaceScope,
        name: &str,
    ) -> Result<PodMetrics, kube::Error>;

    /// List pod metrics in scope, filtered server-side by `selector`
    async fn list_pod_metrics(
        &self,
        scope: &NamespaceScope,
        selector: &Selector,
    ) -> Result<Vec<PodMetrics>, kube::Error>;

    /// Discovery: the API groups the server advertises
    async fn list_api_groups(&self) -> Result<APIGroupList, kube::Error>;
}

/// Fetch pod metrics for a namespace, or for one named pod.
///
/// `all_namespaces` overrides `namespace`. A non-empty `resource_name` does a
/// single lookup and ignores `selector`. Records come back in server order.
pub async fn fetch_pod_metrics<S>(
    source: &S,
    namespace: &str,
    resource_name: &str,
    all_namespaces: bool,
    selector: &Selector,
) -> Result<Vec<PodMetricsRecord>, FetchError>
where
    S: MetricsSource + ?Sized,
{
    let scope = NamespaceScope::resolve(namespace, all_namespaces);

    let items = if !resource_name.is_empty() {
        if !selector.is_everything() {
            debug!(
                selector = %selector,
                "Label selector is not applied to single pod lookups"
            );
        }
        debug!(scope = %scope, pod = resource_name, "Getting pod metrics");
        let metrics = source
            .get_pod_metrics(&scope, resource_name)
            .await
            .map_err(|source| FetchError::Get {
                name: resource_name.to_string(),
                scope: scope.clone(),
                source,
            })?;
        vec![metrics]
    } else {
        debug!(scope = %scope, selector = %selector, "Listing pod metrics");
        source
            .list_pod_metrics(&scope, selector)
            .await
            .map_err(|source| FetchError::List {
                scope: scope.clone(),
                source,
            })?
    };

    debug!(count = items.len(), "Received pod metrics");
    items.into_iter().map(PodMetrics::into_record).collect()
}
