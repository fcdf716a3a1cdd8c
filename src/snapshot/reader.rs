// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Read-only access to persisted snapshots.
//!
//! Records live in one hash per type at `<prefix>:<apiVersion>/<kind>`.
//! Hash fields are `<namespace>/<name>`, with an empty namespace for
//! cluster-scoped objects, and values are the JSON encoded objects.

use crate::constants::defaults;
use crate::error::{ClientsError, Result};
use crate::snapshot::registry::{gvk_of, type_id, type_id_of, TypeRegistry};
use crate::snapshot::store::StoreClient;
use async_trait::async_trait;
use kube::core::{DynamicObject, GroupVersionKind};
use kube::Resource;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, instrument};

/// Typed retrieval of persisted snapshots
#[async_trait]
pub trait Reader: Send + Sync {
    /// Fetch a single object, `None` if it is not in the snapshot
    async fn get(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<DynamicObject>>;

    /// List objects of a type, optionally restricted to one namespace
    async fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>>;
}

pub async fn get_typed<K>(reader: &dyn Reader, namespace: Option<&str>, name: &str) -> Result<Option<K>>
where
    K: Resource<DynamicType = ()> + DeserializeOwned,
{
    reader
        .get(&gvk_of::<K>(), namespace, name)
        .await?
        .map(parse_object::<K>)
        .transpose()
}

pub async fn list_typed<K>(reader: &dyn Reader, namespace: Option<&str>) -> Result<Vec<K>>
where
    K: Resource<DynamicType = ()> + DeserializeOwned,
{
    reader
        .list(&gvk_of::<K>(), namespace)
        .await?
        .into_iter()
        .map(parse_object::<K>)
        .collect()
}

fn parse_object<K>(obj: DynamicObject) -> Result<K>
where
    K: Resource<DynamicType = ()> + DeserializeOwned,
{
    serde_json::to_value(obj)
        .and_then(serde_json::from_value)
        .map_err(|e| ClientsError::Decode {
            type_id: type_id_of::<K>(),
            reason: e.to_string(),
        })
}

/// Optional reader settings; unset fields fall back to defaults
#[derive(Debug, Clone, Default)]
pub struct ReaderOptions {
    pub key_prefix: Option<String>,
    pub handshake_timeout: Option<Duration>,
}

impl ReaderOptions {
    fn key_prefix(&self) -> String {
        self.key_prefix
            .clone()
            .unwrap_or_else(|| defaults::SNAPSHOT_KEY_PREFIX.to_string())
    }

    fn handshake_timeout(&self) -> Duration {
        self.handshake_timeout
            .unwrap_or(Duration::from_secs(defaults::SNAPSHOT_HANDSHAKE_TIMEOUT_SECS))
    }
}

/// [`Reader`] over snapshots persisted in Redis
pub struct RedisReader {
    store: StoreClient,
    conn: ConnectionManager,
    registry: Arc<TypeRegistry>,
    key_prefix: String,
}

impl RedisReader {
    /// Connect to the store and verify it answers before returning.
    #[instrument(skip_all, fields(address = %store.address()))]
    pub async fn connect(
        store: &StoreClient,
        registry: Arc<TypeRegistry>,
        options: ReaderOptions,
    ) -> Result<Self> {
        if registry.is_empty() {
            return Err(ClientsError::InvalidConfig(
                "type registry has no registered types".to_string(),
            ));
        }

        let limit = options.handshake_timeout();
        let conn = timeout(limit, handshake(store))
            .await
            .map_err(|_| {
                ClientsError::Timeout(format!(
                    "snapshot store {} did not answer within {:?}",
                    store.address(),
                    limit
                ))
            })??;

        info!(types = registry.len(), "Snapshot store reachable");

        Ok(Self {
            store: store.clone(),
            conn,
            registry,
            key_prefix: options.key_prefix(),
        })
    }

    pub fn store(&self) -> &StoreClient {
        &self.store
    }

    fn ensure_registered(&self, gvk: &GroupVersionKind) -> Result<()> {
        if self.registry.is_registered(gvk) {
            Ok(())
        } else {
            Err(ClientsError::UnknownType(type_id(gvk)))
        }
    }
}

async fn handshake(store: &StoreClient) -> Result<ConnectionManager> {
    let mut conn = store.connect().await?;
    let reply: String = redis::cmd("PING").query_async(&mut conn).await?;

    if reply != "PONG" {
        return Err(ClientsError::InvalidConfig(format!(
            "unexpected PING reply '{}' from {}",
            reply,
            store.address()
        )));
    }

    Ok(conn)
}

#[async_trait]
impl Reader for RedisReader {
    async fn get(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<DynamicObject>> {
        self.ensure_registered(gvk)?;

        let mut conn = self.conn.clone();
        let raw: Option<Vec<u8>> = conn
            .hget(type_key(&self.key_prefix, gvk), object_field(namespace, name))
            .await?;

        raw.map(|r| self.registry.decode(gvk, &r)).transpose()
    }

    async fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>> {
        self.ensure_registered(gvk)?;

        let mut conn = self.conn.clone();
        let entries: HashMap<String, Vec<u8>> =
            conn.hgetall(type_key(&self.key_prefix, gvk)).await?;

        let mut records: Vec<(String, Vec<u8>)> = entries
            .into_iter()
            .filter(|(field, _)| in_namespace(field, namespace))
            .collect();
        records.sort_by(|a, b| a.0.cmp(&b.0));

        debug!(
            type_id = %type_id(gvk),
            count = records.len(),
            "Listed snapshot records"
        );

        records
            .iter()
            .map(|(_, raw)| self.registry.decode(gvk, raw))
            .collect()
    }
}

/// Hash holding every record of one type
pub fn type_key(prefix: &str, gvk: &GroupVersionKind) -> String {
    format!("{}:{}", prefix, type_id(gvk))
}

pub fn object_field(namespace: Option<&str>, name: &str) -> String {
    format!("{}/{}", namespace.unwrap_or_default(), name)
}

pub(crate) fn in_namespace(field: &str, namespace: Option<&str>) -> bool {
    match namespace {
        Some(ns) => field
            .split_once('/')
            .is_some_and(|(field_ns, _)| field_ns == ns),
        None => true,
    }
}
