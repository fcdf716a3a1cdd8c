// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace watcher backed by the cluster API

use super::{emit, spawn, NamespaceDescriptor, NamespaceEvent, NamespaceTracker, NsWatcherHandle};
use crate::error::{ClientsError, Result};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Namespace;
use kube::{Api, Client, ResourceExt};
use kube_runtime::{watcher, watcher::Event, WatchStreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub fn start(client: Client, capacity: usize, cancel: &CancellationToken) -> Result<NsWatcherHandle> {
    spawn(capacity, cancel, move |tx, cancel| async move {
        let namespaces: Api<Namespace> = Api::all(client);
        let mut stream = watcher(namespaces, watcher::Config::default())
            .default_backoff()
            .boxed();
        let mut state = WatchState::default();

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => break,
                next = stream.next() => next,
            };

            let items = match next {
                Some(Ok(event)) => state.handle(event),
                Some(Err(e)) => {
                    warn!("Namespace watch error: {}", e);
                    vec![Err(ClientsError::NamespaceWatcher(e.to_string()))]
                }
                None => break,
            };

            for item in items {
                if !emit(&tx, &cancel, item).await {
                    return;
                }
            }
        }

        debug!("Cluster namespace watcher stopped");
    })
}

/// Tracks namespaces across watch restarts
#[derive(Debug, Default)]
struct WatchState {
    tracker: NamespaceTracker,
    /// Objects seen since the last `Init`, applied as one listing on `InitDone`
    relist: Option<Vec<NamespaceDescriptor>>,
}

impl WatchState {
    fn handle(&mut self, event: Event<Namespace>) -> Vec<Result<NamespaceEvent>> {
        match event {
            Event::Init => {
                self.relist = Some(Vec::new());
                Vec::new()
            }
            Event::InitApply(ns) => {
                self.relist
                    .get_or_insert_with(Vec::new)
                    .push(NamespaceDescriptor::from_namespace(&ns));
                Vec::new()
            }
            Event::InitDone => {
                let listing = self.relist.take().unwrap_or_default();
                self.tracker.sync(listing).into_iter().map(Ok).collect()
            }
            Event::Apply(ns) => self
                .tracker
                .apply(NamespaceDescriptor::from_namespace(&ns))
                .into_iter()
                .map(Ok)
                .collect(),
            Event::Delete(ns) => self
                .tracker
                .delete(&ns.name_any())
                .into_iter()
                .map(Ok)
                .collect(),
        }
    }
}
