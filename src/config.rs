// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{defaults, env as vars};
use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which implementation backs [`crate::api_clients::ApiClientsInterface::ns_watcher`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamespaceWatcherBackend {
    /// Watch `Namespace` objects on the cluster API
    Cluster,
    /// Poll namespaces persisted in the snapshot store
    #[default]
    Snapshot,
}

impl FromStr for NamespaceWatcherBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cluster" | "k8s" => Ok(NamespaceWatcherBackend::Cluster),
            "snapshot" | "redis" => Ok(NamespaceWatcherBackend::Snapshot),
            other => bail!("unknown namespace watcher backend '{}'", other),
        }
    }
}

/// Backend addresses and credentials loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Explicit kubeconfig file; in-cluster or ambient config is inferred when unset
    pub kubeconfig_path: Option<PathBuf>,
    pub relay_address: String,
    /// Bearer token sent with every relay request
    pub relay_token: Option<String>,
    pub relay_connect_timeout: Duration,
    pub relay_request_timeout: Duration,
    pub redis_address: String,
    pub ns_watcher_backend: NamespaceWatcherBackend,
    pub ns_poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            kubeconfig_path: None,
            relay_address: defaults::RELAY_ADDRESS.to_string(),
            relay_token: None,
            relay_connect_timeout: Duration::from_secs(defaults::RELAY_CONNECT_TIMEOUT_SECS),
            relay_request_timeout: Duration::from_secs(defaults::RELAY_REQUEST_TIMEOUT_SECS),
            redis_address: defaults::REDIS_ADDRESS.to_string(),
            ns_watcher_backend: NamespaceWatcherBackend::default(),
            ns_poll_interval: Duration::from_secs(defaults::NS_POLL_INTERVAL_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let base = Config::default();

        let ns_watcher_backend = match env::var(vars::NS_WATCHER_BACKEND) {
            Ok(v) => v
                .parse()
                .with_context(|| format!("{} is invalid", vars::NS_WATCHER_BACKEND))?,
            Err(_) => base.ns_watcher_backend,
        };

        Ok(Config {
            kubeconfig_path: env::var(vars::KUBECONFIG_PATH).ok().map(PathBuf::from),
            relay_address: env::var(vars::RELAY_ADDRESS).unwrap_or(base.relay_address),
            relay_token: env::var(vars::RELAY_TOKEN).ok().filter(|t| !t.is_empty()),
            relay_connect_timeout: nonzero_secs_from_env(
                vars::RELAY_CONNECT_TIMEOUT_SECS,
                base.relay_connect_timeout,
            )?,
            relay_request_timeout: nonzero_secs_from_env(
                vars::RELAY_REQUEST_TIMEOUT_SECS,
                base.relay_request_timeout,
            )?,
            redis_address: env::var(vars::REDIS_ADDRESS).unwrap_or(base.redis_address),
            ns_watcher_backend,
            ns_poll_interval: nonzero_secs_from_env(
                vars::NS_POLL_INTERVAL_SECS,
                base.ns_poll_interval,
            )?,
        })
    }
}

fn secs_from_env(name: &str, default: Duration) -> Result<Duration> {
    match env::var(name) {
        Ok(v) => {
            let secs: u64 = v
                .parse()
                .with_context(|| format!("{} must be a number of seconds, got '{}'", name, v))?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(default),
    }
}

fn nonzero_secs_from_env(name: &str, default: Duration) -> Result<Duration> {
    let value = secs_from_env(name, default)?;
    if value.is_zero() {
        bail!("{} must be greater than zero", name);
    }
    Ok(value)
}
