// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Constructors for each backend connection.

use crate::config::Config;
use crate::error::Result;
use crate::kubernetes::{create_cluster_client, create_custom_resource_client, CustomResourceClient};
use crate::relay::GrpcClient;
use crate::snapshot::{Reader, ReaderOptions, RedisReader, StoreClient, TypeRegistry};
use async_trait::async_trait;
use kube::{Client, Config as KConfig};
use std::sync::Arc;

/// One constructor per backend, called in order by [`super::ApiClients`].
///
/// Each step is isolated so a failure can be attributed to exactly one backend.
#[async_trait]
pub trait ConnectionBuilders: Send + Sync {
    /// Cluster-metadata client plus the transport config it was built from
    async fn cluster_client(&self, config: &Config) -> Result<(KConfig, Client)>;

    fn custom_resource_client(&self, cluster_config: &KConfig) -> Result<CustomResourceClient>;

    fn streaming_client(&self, config: &Config) -> Result<GrpcClient>;

    /// Never fails and never connects
    fn store_client(&self, config: &Config) -> StoreClient;

    fn type_registry(&self) -> TypeRegistry {
        TypeRegistry::with_default_types()
    }

    /// May contact the store before returning
    async fn snapshot_reader(
        &self,
        store: &StoreClient,
        registry: Arc<TypeRegistry>,
        options: ReaderOptions,
    ) -> Result<Arc<dyn Reader>>;
}

/// Builders for the production backends
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBuilders;

#[async_trait]
impl ConnectionBuilders for DefaultBuilders {
    async fn cluster_client(&self, config: &Config) -> Result<(KConfig, Client)> {
        create_cluster_client(config).await
    }

    fn custom_resource_client(&self, cluster_config: &KConfig) -> Result<CustomResourceClient> {
        create_custom_resource_client(cluster_config)
    }

    fn streaming_client(&self, config: &Config) -> Result<GrpcClient> {
        GrpcClient::new(config)
    }

    fn store_client(&self, config: &Config) -> StoreClient {
        StoreClient::new(config.redis_address.clone())
    }

    async fn snapshot_reader(
        &self,
        store: &StoreClient,
        registry: Arc<TypeRegistry>,
        options: ReaderOptions,
    ) -> Result<Arc<dyn Reader>> {
        let reader: Arc<dyn Reader> =
            Arc::new(RedisReader::connect(store, registry, options).await?);
        Ok(reader)
    }
}
