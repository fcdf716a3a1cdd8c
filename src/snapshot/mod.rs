// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Persisted snapshot store: store client, type registry and reader.

pub mod reader;
pub mod registry;
pub mod store;

pub use reader::{get_typed, list_typed, Reader, ReaderOptions, RedisReader};
pub use registry::{gvk_of, type_id, TypeRegistry, TypeRegistryBuilder};
pub use store::StoreClient;
