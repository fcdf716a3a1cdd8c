// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Builds every backend connection once and hands out capability handles.

use super::builders::{ConnectionBuilders, DefaultBuilders};
use super::ApiClientsInterface;
use crate::config::{Config, NamespaceWatcherBackend};
use crate::constants::components;
use crate::error::{ClientsError, InitStage, Result};
use crate::kubernetes::CustomResourceClient;
use crate::ns_watcher::{self, NsWatcherHandle, NsWatcherOptions};
use crate::relay::{GrpcClient, RelayClient};
use crate::snapshot::{Reader, ReaderOptions, StoreClient, TypeRegistry};
use kube::{Client, Config as KConfig};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, instrument};

/// Owner of the backend connections.
///
/// Only returned once every connection has been built, so every field is
/// always populated.
pub struct ApiClients {
    config: Arc<Config>,
    cluster_config: KConfig,
    cluster_client: Client,
    custom_resources: CustomResourceClient,
    relay_grpc: GrpcClient,
    store: StoreClient,
    registry: Arc<TypeRegistry>,
    snapshot_reader: Arc<dyn Reader>,
}

impl ApiClients {
    pub async fn new(config: Arc<Config>) -> Result<Self> {
        Self::with_builders(config, &DefaultBuilders).await
    }

    /// Run the builders in order, stopping at the first failure
    #[instrument(skip_all)]
    pub async fn with_builders(
        config: Arc<Config>,
        builders: &dyn ConnectionBuilders,
    ) -> Result<Self> {
        let (cluster_config, cluster_client) = builders
            .cluster_client(&config)
            .await
            .map_err(|e| init_failed(InitStage::ClusterClient, e))?;

        let custom_resources = builders
            .custom_resource_client(&cluster_config)
            .map_err(|e| init_failed(InitStage::CustomResourceClient, e))?;

        let relay_grpc = info_span!("grpc_client", name = components::RELAY_GRPC)
            .in_scope(|| builders.streaming_client(&config))
            .map_err(|e| init_failed(InitStage::StreamingClient, e))?;

        let store = builders.store_client(&config);
        debug!(address = store.address(), "Snapshot store client configured");

        let registry = Arc::new(builders.type_registry());
        debug!(types = registry.len(), "Type registry populated");

        let snapshot_reader = builders
            .snapshot_reader(&store, registry.clone(), ReaderOptions::default())
            .await
            .map_err(|e| init_failed(InitStage::SnapshotReader, e))?;

        info!("API clients initialized");

        Ok(Self {
            config,
            cluster_config,
            cluster_client,
            custom_resources,
            relay_grpc,
            store,
            registry,
            snapshot_reader,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cluster_config(&self) -> &KConfig {
        &self.cluster_config
    }

    pub fn cluster_client(&self) -> &Client {
        &self.cluster_client
    }

    pub fn custom_resources(&self) -> &CustomResourceClient {
        &self.custom_resources
    }

    pub fn relay_grpc(&self) -> &GrpcClient {
        &self.relay_grpc
    }

    pub fn store(&self) -> &StoreClient {
        &self.store
    }

    pub fn type_registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }
}

fn init_failed(stage: InitStage, source: ClientsError) -> ClientsError {
    error!(stage = %stage, "{} init failed: {}", stage, source);
    ClientsError::init(stage, source)
}

impl ApiClientsInterface for ApiClients {
    fn relay_client(&self) -> Result<RelayClient> {
        let span = info_span!("relay_client", component = components::RELAY_CLIENT);

        RelayClient::new(span, &self.config, &self.relay_grpc).inspect_err(|e| {
            error!(
                component = components::RELAY_CLIENT,
                "Failed to create relay client: {}", e
            )
        })
    }

    fn ns_watcher(
        &self,
        cancel: &CancellationToken,
        options: NsWatcherOptions,
    ) -> Result<NsWatcherHandle> {
        let handle = match self.config.ns_watcher_backend {
            NamespaceWatcherBackend::Cluster => ns_watcher::cluster::start(
                self.cluster_client.clone(),
                options.channel_capacity,
                cancel,
            ),
            NamespaceWatcherBackend::Snapshot => {
                let reader = options
                    .snapshot_reader
                    .unwrap_or_else(|| self.snapshot_reader.clone());
                let poll_interval = options.poll_interval.unwrap_or(self.config.ns_poll_interval);

                ns_watcher::snapshot::start(reader, poll_interval, options.channel_capacity, cancel)
            }
        };

        handle.inspect_err(|e| error!("Failed to start namespace watcher: {}", e))
    }

    fn snapshot_reader(&self) -> Arc<dyn Reader> {
        self.snapshot_reader.clone()
    }
}
