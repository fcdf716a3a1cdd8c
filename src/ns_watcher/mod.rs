// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace watchers.
//!
//! Two backends produce the same [`NamespaceEvent`] stream: [`cluster`]
//! watches `Namespace` objects on the cluster API, [`snapshot`] polls the
//! namespaces persisted in the snapshot store.

pub mod cluster;
pub mod snapshot;

use crate::constants::defaults;
use crate::error::{ClientsError, Result};
use crate::snapshot::Reader;
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::ResourceExt;
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDescriptor {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub created_at: Option<Time>,
}

impl NamespaceDescriptor {
    pub fn from_namespace(ns: &Namespace) -> Self {
        Self {
            name: ns.name_any(),
            labels: ns.labels().clone(),
            created_at: ns.metadata.creation_timestamp.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NamespaceEvent {
    Added(NamespaceDescriptor),
    Modified(NamespaceDescriptor),
    Deleted(NamespaceDescriptor),
}

/// Per-call watcher settings
#[derive(Clone)]
pub struct NsWatcherOptions {
    /// Reader for the snapshot backend; the provider's reader is used when unset
    pub snapshot_reader: Option<Arc<dyn Reader>>,
    /// Poll interval for the snapshot backend; the configured interval is used when unset
    pub poll_interval: Option<Duration>,
    pub channel_capacity: usize,
}

impl Default for NsWatcherOptions {
    fn default() -> Self {
        Self {
            snapshot_reader: None,
            poll_interval: None,
            channel_capacity: defaults::NS_EVENT_CHANNEL_CAPACITY,
        }
    }
}

/// A running watcher. Dropping the handle stops it.
pub struct NsWatcherHandle {
    events: mpsc::Receiver<Result<NamespaceEvent>>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl NsWatcherHandle {
    /// Next event, `None` once the watcher has stopped
    pub async fn recv(&mut self) -> Option<Result<NamespaceEvent>> {
        self.events.recv().await
    }

    /// Stop this watcher only; other watchers sharing the caller's token keep running
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled() || self.task.is_finished()
    }
}

impl Drop for NsWatcherHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Spawn a watcher task on a child of `parent`
fn spawn<F, Fut>(capacity: usize, parent: &CancellationToken, run: F) -> Result<NsWatcherHandle>
where
    F: FnOnce(mpsc::Sender<Result<NamespaceEvent>>, CancellationToken) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    if capacity == 0 {
        return Err(ClientsError::NamespaceWatcher(
            "event channel capacity must be greater than zero".to_string(),
        ));
    }

    let (tx, events) = mpsc::channel(capacity);
    let cancel = parent.child_token();
    let task = tokio::spawn(run(tx, cancel.clone()));

    Ok(NsWatcherHandle {
        events,
        cancel,
        task,
    })
}

/// Deliver an item unless the watcher is cancelled or the handle is gone
async fn emit(
    tx: &mpsc::Sender<Result<NamespaceEvent>>,
    cancel: &CancellationToken,
    item: Result<NamespaceEvent>,
) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        sent = tx.send(item) => sent.is_ok(),
    }
}

/// Known namespaces, turning observations into change events
#[derive(Debug, Default)]
struct NamespaceTracker {
    known: BTreeMap<String, NamespaceDescriptor>,
}

impl NamespaceTracker {
    fn apply(&mut self, ns: NamespaceDescriptor) -> Option<NamespaceEvent> {
        match self.known.insert(ns.name.clone(), ns.clone()) {
            None => Some(NamespaceEvent::Added(ns)),
            Some(previous) if previous != ns => Some(NamespaceEvent::Modified(ns)),
            Some(_) => None,
        }
    }

    fn delete(&mut self, name: &str) -> Option<NamespaceEvent> {
        self.known.remove(name).map(NamespaceEvent::Deleted)
    }

    /// Replace the known set with a full listing
    fn sync(&mut self, current: Vec<NamespaceDescriptor>) -> Vec<NamespaceEvent> {
        let present: BTreeSet<String> = current.iter().map(|ns| ns.name.clone()).collect();
        let gone: Vec<String> = self
            .known
            .keys()
            .filter(|name| !present.contains(*name))
            .cloned()
            .collect();

        let mut events: Vec<NamespaceEvent> =
            current.into_iter().filter_map(|ns| self.apply(ns)).collect();
        events.extend(gone.iter().filter_map(|name| self.delete(name)));
        events
    }
}
