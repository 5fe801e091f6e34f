//! Kubernetes client for kubetop

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIGroupList;
use kube::Api;
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kubetop_types::{NamespaceScope, Selector};
use tracing::info;

use crate::fetch::MetricsSource;
use crate::metrics::PodMetrics;

/// Kubernetes client wrapper
#[derive(Clone)]
pub struct KubeClient {
    client: kube::Client,
    context: Option<String>,
}

impl KubeClient {
    /// Connect using a kubeconfig file, or infer the configuration
    /// (KUBECONFIG, ~/.kube/config, in-cluster) when no path is given.
    pub async fn connect(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<Self> {
        let options = KubeConfigOptions {
            context: context.map(str::to_string),
            ..Default::default()
        };

        let config = match (kubeconfig, context) {
            (Some(path), _) => {
                let kubeconfig = Kubeconfig::read_from(path).with_context(|| {
                    format!("Failed to read kubeconfig: {}", path.display())
                })?;
                kube::Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .with_context(|| {
                        format!("Failed to load kubeconfig: {}", path.display())
                    })?
            }
            (None, Some(context_name)) => kube::Config::from_kubeconfig(&options)
                .await
                .context(format!(
                    "Failed to create config for context: {}",
                    context_name
                ))?,
            (None, None) => kube::Config::infer()
                .await
                .context("Failed to infer cluster configuration. Is kubectl configured?")?,
        };

        info!(cluster_url = %config.cluster_url, "Connecting to cluster");

        let client = kube::Client::try_from(config).context("Failed to create cluster client")?;

        Ok(Self {
            client,
            context: context.map(str::to_string),
        })
    }

    /// The context requested at connect time, if any
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    fn pod_metrics_api(&self, scope: &NamespaceScope) -> Api<PodMetrics> {
        match scope {
            NamespaceScope::All => Api::all(self.client.clone()),
            NamespaceScope::Namespace(ns) => Api::namespaced(self.client.clone(), ns),
        }
    }
}

#[async_trait]
impl MetricsSource for KubeClient {
    async fn get_pod_metrics(
        &self,
        scope: &NamespaceScope,
        name: &str,
    ) -> Result<PodMetrics, kube::Error> {
        self.pod_metrics_api(scope).get(name).await
    }

    async fn list_pod_metrics(
        &self,
        scope: &NamespaceScope,
        selector: &Selector,
    ) -> Result<Vec<PodMetrics>, kube::Error> {
        let mut params = ListParams::default();
        if !selector.is_everything() {
            params = params.labels(&selector.to_string());
        }
        let list = self.pod_metrics_api(scope).list(&params).await?;
        Ok(list.items)
    }

    async fn list_api_groups(&self) -> Result<APIGroupList, kube::Error> {
        self.client.list_api_groups().await
    }
}
