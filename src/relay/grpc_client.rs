// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Shared gRPC transport to the relay

use crate::config::Config;
use crate::error::{ClientsError, Result};
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};
use tracing::{info, instrument};
use url::Url;

const TCP_KEEPALIVE_SECS: u64 = 60;

/// A lazily connected channel to the relay, shared by every [`super::RelayClient`]
#[derive(Clone, Debug)]
pub struct GrpcClient {
    address: String,
    channel: Channel,
}

impl GrpcClient {
    /// Validate the relay address and set up the channel.
    ///
    /// No connection is attempted here; the channel connects on first use
    /// and reconnects on its own.
    #[instrument(skip(config), fields(address = %config.relay_address))]
    pub fn new(config: &Config) -> Result<Self> {
        let address = validate_address(&config.relay_address)?;

        let endpoint = Endpoint::from_shared(address.clone())
            .map_err(|e| {
                ClientsError::Transport(format!("Invalid relay address '{}': {}", address, e))
            })?
            .connect_timeout(config.relay_connect_timeout)
            .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)));

        let channel = endpoint.connect_lazy();
        info!("Relay gRPC channel configured");

        Ok(Self { address, channel })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn channel(&self) -> Channel {
        self.channel.clone()
    }
}

fn validate_address(address: &str) -> Result<String> {
    let url = Url::parse(address).map_err(|e| {
        ClientsError::Transport(format!("Invalid relay address '{}': {}", address, e))
    })?;

    if url.scheme() != "http" {
        return Err(ClientsError::Transport(format!(
            "Unsupported relay address scheme '{}', expected http",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ClientsError::Transport(format!(
            "Relay address '{}' has no host",
            address
        )));
    }

    Ok(address.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(address: &str) -> Config {
        Config {
            relay_address: address.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_new_with_valid_address() {
        let client = GrpcClient::new(&make_config("http://hubble-relay:4245/")).unwrap();
        assert_eq!(client.address(), "http://hubble-relay:4245");
    }

    #[tokio::test]
    async fn test_new_rejects_garbage() {
        let err = GrpcClient::new(&make_config("not an address")).unwrap_err();
        assert!(matches!(err, ClientsError::Transport(_)));
    }

    #[tokio::test]
    async fn test_new_rejects_unsupported_scheme() {
        let err = GrpcClient::new(&make_config("ftp://hubble-relay:4245")).unwrap_err();
        assert!(err.to_string().contains("ftp"));
    }
}
