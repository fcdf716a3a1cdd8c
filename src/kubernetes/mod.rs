// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes clients for the cluster-metadata and custom-resource APIs.

pub mod client;

pub use client::{create_cluster_client, create_custom_resource_client, CustomResourceClient};
