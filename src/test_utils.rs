// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mock Kubernetes API, an in-memory snapshot reader and
//! connection builders that never leave the process.

use crate::api_clients::ConnectionBuilders;
use crate::config::Config;
use crate::error::{ClientsError, InitStage, Result};
use crate::kubernetes::{create_custom_resource_client, CustomResourceClient};
use crate::relay::GrpcClient;
use crate::snapshot::reader::{in_namespace, object_field};
use crate::snapshot::{gvk_of, type_id, Reader, ReaderOptions, StoreClient, TypeRegistry};
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::api::core::v1::Namespace;
use kube::client::Body;
use kube::core::{DynamicObject, GroupVersionKind};
use kube::{Client, Config as KConfig};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(("GET".to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Prefix match for paths like /api/v1/namespaces/foo
        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let response = self.find_response(&method, &path);

        Box::pin(async move {
            let (status, body) = response.unwrap_or_else(|| {
                (
                    404,
                    r#"{"kind":"Status","apiVersion":"v1","status":"Failure","message":"not found","reason":"NotFound","code":404}"#
                        .to_string(),
                )
            });

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock namespace JSON document
pub fn namespace_json(name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "uid": "test-uid"
        }
    })
    .to_string()
}

/// [`Reader`] over records held in memory, laid out like the Redis store
pub struct MemoryReader {
    registry: TypeRegistry,
    records: Mutex<BTreeMap<String, BTreeMap<String, Vec<u8>>>>,
    unavailable: AtomicBool,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self {
            registry: TypeRegistry::with_default_types(),
            records: Mutex::new(BTreeMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn with_namespace(self, name: &str) -> Self {
        self.insert_namespace(name);
        self
    }

    pub fn insert_namespace(&self, name: &str) {
        self.put(&gvk_of::<Namespace>(), None, name, namespace_json(name).into_bytes());
    }

    pub fn remove_namespace(&self, name: &str) {
        if let Some(records) = self.records.lock().unwrap().get_mut(&type_id(&gvk_of::<Namespace>())) {
            records.remove(&object_field(None, name));
        }
    }

    /// Store a raw record
    pub fn put(&self, gvk: &GroupVersionKind, namespace: Option<&str>, name: &str, raw: Vec<u8>) {
        self.records
            .lock()
            .unwrap()
            .entry(type_id(gvk))
            .or_default()
            .insert(object_field(namespace, name), raw);
    }

    /// Make every read fail as if the store went away
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self, gvk: &GroupVersionKind) -> Result<()> {
        if !self.registry.is_registered(gvk) {
            return Err(ClientsError::UnknownType(type_id(gvk)));
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ClientsError::Store(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "connection refused",
            ))));
        }
        Ok(())
    }
}

impl Default for MemoryReader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Reader for MemoryReader {
    async fn get(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<DynamicObject>> {
        self.check(gvk)?;

        let raw = self
            .records
            .lock()
            .unwrap()
            .get(&type_id(gvk))
            .and_then(|records| records.get(&object_field(namespace, name)).cloned());

        raw.map(|r| self.registry.decode(gvk, &r)).transpose()
    }

    async fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>> {
        self.check(gvk)?;

        let raws: Vec<Vec<u8>> = self
            .records
            .lock()
            .unwrap()
            .get(&type_id(gvk))
            .map(|records| {
                records
                    .iter()
                    .filter(|(field, _)| in_namespace(field, namespace))
                    .map(|(_, raw)| raw.clone())
                    .collect()
            })
            .unwrap_or_default();

        raws.iter().map(|raw| self.registry.decode(gvk, raw)).collect()
    }
}

/// [`ConnectionBuilders`] that record every call and can fail at one stage
pub struct StubBuilders {
    fail_at: Option<(InitStage, &'static str)>,
    calls: Mutex<Vec<InitStage>>,
    reader: Arc<MemoryReader>,
    cluster: MockService,
}

impl StubBuilders {
    pub fn new() -> Self {
        Self {
            fail_at: None,
            calls: Mutex::new(Vec::new()),
            reader: Arc::new(MemoryReader::new().with_namespace("default")),
            cluster: MockService::new(),
        }
    }

    /// Serve the cluster-metadata client from `cluster`
    pub fn with_cluster(self, cluster: MockService) -> Self {
        Self { cluster, ..self }
    }

    pub fn failing_at(stage: InitStage, cause: &'static str) -> Self {
        Self {
            fail_at: Some((stage, cause)),
            ..Self::new()
        }
    }

    /// Stages invoked so far, in order
    pub fn calls(&self) -> Vec<InitStage> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reader(&self) -> Arc<MemoryReader> {
        self.reader.clone()
    }

    fn record(&self, stage: InitStage) -> Option<&'static str> {
        self.calls.lock().unwrap().push(stage);
        self.fail_at
            .filter(|(failing, _)| *failing == stage)
            .map(|(_, cause)| cause)
    }
}

impl Default for StubBuilders {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionBuilders for StubBuilders {
    async fn cluster_client(&self, _config: &Config) -> Result<(KConfig, Client)> {
        if let Some(cause) = self.record(InitStage::ClusterClient) {
            return Err(ClientsError::KubeconfigError(cause.to_string()));
        }

        let cluster_config = KConfig::new("http://127.0.0.1:6443".parse().unwrap());
        Ok((cluster_config, self.cluster.clone().into_client()))
    }

    fn custom_resource_client(&self, cluster_config: &KConfig) -> Result<CustomResourceClient> {
        if let Some(cause) = self.record(InitStage::CustomResourceClient) {
            return Err(ClientsError::KubeconfigError(cause.to_string()));
        }

        create_custom_resource_client(cluster_config)
    }

    fn streaming_client(&self, config: &Config) -> Result<GrpcClient> {
        if let Some(cause) = self.record(InitStage::StreamingClient) {
            return Err(ClientsError::Transport(cause.to_string()));
        }

        GrpcClient::new(config)
    }

    fn store_client(&self, config: &Config) -> StoreClient {
        self.record(InitStage::StoreClient);
        StoreClient::new(config.redis_address.clone())
    }

    fn type_registry(&self) -> TypeRegistry {
        self.record(InitStage::TypeRegistry);
        TypeRegistry::with_default_types()
    }

    async fn snapshot_reader(
        &self,
        _store: &StoreClient,
        _registry: Arc<TypeRegistry>,
        _options: ReaderOptions,
    ) -> Result<Arc<dyn Reader>> {
        if let Some(cause) = self.record(InitStage::SnapshotReader) {
            return Err(ClientsError::Store(redis::RedisError::from((
                redis::ErrorKind::IoError,
                cause,
            ))));
        }

        let reader: Arc<dyn Reader> = self.reader.clone();
        Ok(reader)
    }
}
