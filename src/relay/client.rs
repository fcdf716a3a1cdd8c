// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-request relay client handle

use crate::config::Config;
use crate::error::{ClientsError, Result};
use crate::relay::GrpcClient;
use std::time::Duration;
use tonic::metadata::AsciiMetadataValue;
use tonic::transport::Channel;
use tonic::Request;
use tracing::{debug, Span};

const AUTHORIZATION: &str = "authorization";

/// Thin handle over the shared relay channel.
///
/// Carries no connection state of its own: generated service stubs are built
/// on [`RelayClient::channel`] and their requests prepared with
/// [`RelayClient::request`].
#[derive(Clone, Debug)]
pub struct RelayClient {
    channel: Channel,
    authorization: Option<AsciiMetadataValue>,
    request_timeout: Duration,
    span: Span,
}

impl RelayClient {
    pub fn new(span: Span, config: &Config, grpc: &GrpcClient) -> Result<Self> {
        if config.relay_request_timeout.is_zero() {
            return Err(ClientsError::RelayClient(
                "relay request timeout must be greater than zero".to_string(),
            ));
        }

        let authorization = config
            .relay_token
            .as_deref()
            .map(|token| {
                format!("Bearer {}", token)
                    .parse::<AsciiMetadataValue>()
                    .map_err(|e| {
                        ClientsError::RelayClient(format!(
                            "relay token is not a valid metadata value: {}",
                            e
                        ))
                    })
            })
            .transpose()?;

        span.in_scope(|| debug!(address = grpc.address(), "Relay client ready"));

        Ok(Self {
            channel: grpc.channel(),
            authorization,
            request_timeout: config.relay_request_timeout,
            span,
        })
    }

    pub fn channel(&self) -> Channel {
        self.channel.clone()
    }

    /// Wrap a message with the request timeout and credentials
    pub fn request<T>(&self, message: T) -> Request<T> {
        let mut request = Request::new(message);
        request.set_timeout(self.request_timeout);

        if let Some(authorization) = &self.authorization {
            request
                .metadata_mut()
                .insert(AUTHORIZATION, authorization.clone());
        }

        request
    }

    /// Span scoping this client's log output
    pub fn span(&self) -> &Span {
        &self.span
    }
}
