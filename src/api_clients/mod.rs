// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Composite provider of the backend clients used by request handlers.

pub mod builders;
pub mod provider;

pub use builders::{ConnectionBuilders, DefaultBuilders};
pub use provider::ApiClients;

use crate::error::Result;
use crate::ns_watcher::{NsWatcherHandle, NsWatcherOptions};
use crate::relay::RelayClient;
use crate::snapshot::Reader;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Capabilities request handlers depend on.
///
/// Handlers hold an `Arc<dyn ApiClientsInterface>` so tests can swap in
/// their own implementation.
pub trait ApiClientsInterface: Send + Sync {
    /// A fresh relay client over the shared transport
    fn relay_client(&self) -> Result<RelayClient>;

    /// Start a namespace watcher bound to `cancel`
    fn ns_watcher(
        &self,
        cancel: &CancellationToken,
        options: NsWatcherOptions,
    ) -> Result<NsWatcherHandle>;

    /// The shared snapshot reader
    fn snapshot_reader(&self) -> Arc<dyn Reader>;
}
