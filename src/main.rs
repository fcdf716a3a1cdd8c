// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hubble_clients::api_clients::{ApiClients, ApiClientsInterface};
use hubble_clients::config::Config;
use hubble_clients::ns_watcher::{NamespaceEvent, NsWatcherOptions};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting Hubble clients");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: relay_address={}, redis_address={}, ns_watcher_backend={:?}",
        config.relay_address, config.redis_address, config.ns_watcher_backend
    );

    let clients = ApiClients::new(Arc::new(config)).await?;

    let relay = clients.relay_client()?;
    relay
        .span()
        .in_scope(|| info!("Relay client ready on {}", clients.relay_grpc().address()));

    let cancel = CancellationToken::new();
    let mut watcher = clients.ns_watcher(&cancel, NsWatcherOptions::default())?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                cancel.cancel();
                break;
            }
            event = watcher.recv() => match event {
                Some(Ok(NamespaceEvent::Added(ns))) => info!("Namespace added: {}", ns.name),
                Some(Ok(NamespaceEvent::Modified(ns))) => info!("Namespace modified: {}", ns.name),
                Some(Ok(NamespaceEvent::Deleted(ns))) => info!("Namespace deleted: {}", ns.name),
                Some(Err(e)) => warn!("Namespace watcher error: {}", e),
                None => {
                    warn!("Namespace watcher stopped unexpectedly");
                    break;
                }
            },
        }
    }

    Ok(())
}
