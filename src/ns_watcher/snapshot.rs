// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace watcher polling the snapshot store

use super::{emit, spawn, NamespaceDescriptor, NamespaceTracker, NsWatcherHandle};
use crate::error::{ClientsError, Result};
use crate::snapshot::{list_typed, Reader};
use k8s_openapi::api::core::v1::Namespace;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub fn start(
    reader: Arc<dyn Reader>,
    poll_interval: Duration,
    capacity: usize,
    cancel: &CancellationToken,
) -> Result<NsWatcherHandle> {
    if poll_interval.is_zero() {
        return Err(ClientsError::NamespaceWatcher(
            "poll interval must be greater than zero".to_string(),
        ));
    }

    spawn(capacity, cancel, move |tx, cancel| async move {
        let mut tracker = NamespaceTracker::default();
        let mut ticker = interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let listed = tokio::select! {
                _ = cancel.cancelled() => break,
                listed = list_typed::<Namespace>(reader.as_ref(), None) => listed,
            };

            let items: Vec<Result<_>> = match listed {
                Ok(namespaces) => tracker
                    .sync(namespaces.iter().map(NamespaceDescriptor::from_namespace).collect())
                    .into_iter()
                    .map(Ok)
                    .collect(),
                Err(e) => {
                    warn!("Failed to list namespaces from snapshot: {}", e);
                    vec![Err(e)]
                }
            };

            for item in items {
                if !emit(&tx, &cancel, item).await {
                    return;
                }
            }
        }

        debug!("Snapshot namespace watcher stopped");
    })
}
