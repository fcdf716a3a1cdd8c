// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster-metadata and custom-resource client creation

use crate::config::Config;
use crate::error::{ClientsError, Result};
use crate::types::cilium::{CiliumNetworkPolicy, CiliumNode};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config as KConfig};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Client for the Cilium custom resources, sharing the cluster transport config
#[derive(Clone)]
pub struct CustomResourceClient {
    client: Client,
}

impl CustomResourceClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Network policies in one namespace
    pub fn network_policies(&self, namespace: &str) -> Api<CiliumNetworkPolicy> {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Network policies across all namespaces
    pub fn all_network_policies(&self) -> Api<CiliumNetworkPolicy> {
        Api::all(self.client.clone())
    }

    pub fn nodes(&self) -> Api<CiliumNode> {
        Api::all(self.client.clone())
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Build the cluster-metadata client.
///
/// Returns the resolved transport config alongside the client so the
/// custom-resource client can be built from the same settings.
#[instrument(skip(config))]
pub async fn create_cluster_client(config: &Config) -> Result<(KConfig, Client)> {
    let cluster_config = match &config.kubeconfig_path {
        Some(path) => config_from_kubeconfig_file(path).await?,
        None => KConfig::infer()
            .await
            .map_err(|e| ClientsError::KubeconfigError(format!("Failed to infer config: {}", e)))?,
    };

    debug!("Cluster API at {}", cluster_config.cluster_url);

    let client = Client::try_from(cluster_config.clone())
        .map_err(|e| ClientsError::KubeconfigError(format!("Failed to create client: {}", e)))?;

    info!("Cluster-metadata client created");
    Ok((cluster_config, client))
}

/// Build the custom-resource client from the cluster-metadata transport config
pub fn create_custom_resource_client(cluster_config: &KConfig) -> Result<CustomResourceClient> {
    let client = Client::try_from(cluster_config.clone()).map_err(|e| {
        ClientsError::KubeconfigError(format!("Failed to create custom-resource client: {}", e))
    })?;

    Ok(CustomResourceClient::new(client))
}

async fn config_from_kubeconfig_file(path: &Path) -> Result<KConfig> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        ClientsError::KubeconfigError(format!("Failed to read {}: {}", path.display(), e))
    })?;

    config_from_kubeconfig(&raw).await
}

/// Create a transport config from a kubeconfig string
async fn config_from_kubeconfig(kubeconfig: &str) -> Result<KConfig> {
    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig)
        .map_err(|e| ClientsError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))?;

    KConfig::from_custom_kubeconfig(kubeconfig_parsed, &KubeConfigOptions::default())
        .await
        .map_err(|e| ClientsError::KubeconfigError(format!("Failed to create config: {}", e)))
}
