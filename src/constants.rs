// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Environment variables read by [`crate::config::Config::from_env`]
pub mod env {
    pub const KUBECONFIG_PATH: &str = "KUBECONFIG_PATH";
    pub const RELAY_ADDRESS: &str = "RELAY_ADDRESS";
    pub const RELAY_TOKEN: &str = "RELAY_TOKEN";
    pub const RELAY_CONNECT_TIMEOUT_SECS: &str = "RELAY_CONNECT_TIMEOUT_SECS";
    pub const RELAY_REQUEST_TIMEOUT_SECS: &str = "RELAY_REQUEST_TIMEOUT_SECS";
    pub const REDIS_ADDRESS: &str = "REDIS_ADDRESS";
    pub const NS_WATCHER_BACKEND: &str = "NS_WATCHER_BACKEND";
    pub const NS_POLL_INTERVAL_SECS: &str = "NS_POLL_INTERVAL_SECS";
}

/// Defaults used when the matching environment variable is unset
pub mod defaults {
    pub const RELAY_ADDRESS: &str = "http://hubble-relay:80";
    pub const RELAY_CONNECT_TIMEOUT_SECS: u64 = 5;
    pub const RELAY_REQUEST_TIMEOUT_SECS: u64 = 30;
    pub const REDIS_ADDRESS: &str = "redis://127.0.0.1:6379";
    pub const SNAPSHOT_KEY_PREFIX: &str = "snapshot";
    pub const SNAPSHOT_HANDSHAKE_TIMEOUT_SECS: u64 = 5;
    pub const NS_POLL_INTERVAL_SECS: u64 = 5;
    /// Buffered events per namespace watcher
    pub const NS_EVENT_CHANNEL_CAPACITY: usize = 64;
}

/// Component labels attached to tracing spans
pub mod components {
    pub const RELAY_GRPC: &str = "relay";
    pub const RELAY_CLIENT: &str = "RelayClient";
}
