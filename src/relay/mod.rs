// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Streaming telemetry (relay) transport and client handles.

pub mod client;
pub mod grpc_client;

pub use client::RelayClient;
pub use grpc_client::GrpcClient;
