// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Decoders for persisted snapshot records, keyed by type.

use crate::error::{ClientsError, Result};
use crate::types::cilium::{CiliumNetworkPolicy, CiliumNode};
use k8s_openapi::api::core::v1::{Endpoints, Namespace, Node, Pod, Service};
use kube::core::{DynamicObject, GroupVersionKind};
use kube::Resource;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

type Decoder = fn(&[u8]) -> std::result::Result<DynamicObject, serde_json::Error>;

/// Identifier of a registered type, `<apiVersion>/<kind>`
pub fn type_id(gvk: &GroupVersionKind) -> String {
    format!("{}/{}", gvk.api_version(), gvk.kind)
}

/// Type identifier of a statically known resource
pub fn type_id_of<K>() -> String
where
    K: Resource<DynamicType = ()>,
{
    type_id(&gvk_of::<K>())
}

pub fn gvk_of<K>() -> GroupVersionKind
where
    K: Resource<DynamicType = ()>,
{
    GroupVersionKind::gvk(&K::group(&()), &K::version(&()), &K::kind(&()))
}

/// Immutable type-to-decoder mapping.
///
/// Built once through [`TypeRegistryBuilder`] and shared behind an `Arc`.
#[derive(Clone)]
pub struct TypeRegistry {
    decoders: HashMap<String, Decoder>,
}

impl TypeRegistry {
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::default()
    }

    /// Registry with the core types and the Cilium custom resources
    pub fn with_default_types() -> Self {
        Self::builder().register_defaults().build()
    }

    pub fn is_registered(&self, gvk: &GroupVersionKind) -> bool {
        self.decoders.contains_key(&type_id(gvk))
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Decode a persisted record of the given type
    pub fn decode(&self, gvk: &GroupVersionKind, raw: &[u8]) -> Result<DynamicObject> {
        let id = type_id(gvk);
        let decoder = self
            .decoders
            .get(&id)
            .ok_or_else(|| ClientsError::UnknownType(id.clone()))?;

        decoder(raw).map_err(|e| ClientsError::Decode {
            type_id: id,
            reason: e.to_string(),
        })
    }
}

#[derive(Default)]
pub struct TypeRegistryBuilder {
    decoders: HashMap<String, Decoder>,
}

impl TypeRegistryBuilder {
    /// Register a resource type. Registering the same type twice is a no-op.
    pub fn register<K>(mut self) -> Self
    where
        K: Resource<DynamicType = ()> + DeserializeOwned + Serialize,
    {
        self.decoders
            .entry(type_id_of::<K>())
            .or_insert(decode_as::<K> as Decoder);
        self
    }

    pub fn register_defaults(self) -> Self {
        self.register::<Namespace>()
            .register::<Pod>()
            .register::<Service>()
            .register::<Node>()
            .register::<Endpoints>()
            .register::<CiliumNetworkPolicy>()
            .register::<CiliumNode>()
    }

    pub fn build(self) -> TypeRegistry {
        TypeRegistry {
            decoders: self.decoders,
        }
    }
}

/// Parse into the concrete type first so schema mismatches are caught here
fn decode_as<K>(raw: &[u8]) -> std::result::Result<DynamicObject, serde_json::Error>
where
    K: Resource<DynamicType = ()> + DeserializeOwned + Serialize,
{
    let typed: K = serde_json::from_slice(raw)?;
    let mut value = serde_json::to_value(&typed)?;

    if let Some(obj) = value.as_object_mut() {
        obj.entry("apiVersion")
            .or_insert_with(|| K::api_version(&()).into_owned().into());
        obj.entry("kind")
            .or_insert_with(|| K::kind(&()).into_owned().into());
    }

    serde_json::from_value(value)
}
