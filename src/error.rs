// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::fmt;
use thiserror::Error;

/// Construction step of [`crate::api_clients::ApiClients`], in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStage {
    ClusterClient,
    CustomResourceClient,
    StreamingClient,
    StoreClient,
    TypeRegistry,
    SnapshotReader,
}

impl InitStage {
    /// Human readable tag used in logs and error messages
    pub fn tag(&self) -> &'static str {
        match self {
            InitStage::ClusterClient => "cluster-metadata client",
            InitStage::CustomResourceClient => "custom-resource client",
            InitStage::StreamingClient => "streaming client",
            InitStage::StoreClient => "key-value store client",
            InitStage::TypeRegistry => "type registry",
            InitStage::SnapshotReader => "snapshot reader",
        }
    }
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Error, Debug)]
pub enum ClientsError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to load kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("{stage} init failed: {source}")]
    Init {
        stage: InitStage,
        #[source]
        source: Box<ClientsError>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("gRPC transport error: {0}")]
    Transport(String),

    #[error("Relay client creation failed: {0}")]
    RelayClient(String),

    #[error("Snapshot store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("Type {0} is not registered")]
    UnknownType(String),

    #[error("Failed to decode {type_id}: {reason}")]
    Decode { type_id: String, reason: String },

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Namespace watcher failed: {0}")]
    NamespaceWatcher(String),
}

impl ClientsError {
    /// Wrap an error with the construction stage it came from
    pub fn init(stage: InitStage, source: ClientsError) -> Self {
        ClientsError::Init {
            stage,
            source: Box::new(source),
        }
    }

    /// The construction stage, if this is an initialization error
    pub fn stage(&self) -> Option<InitStage> {
        match self {
            ClientsError::Init { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_init_error_message_contains_tag_and_cause() {
        let err = ClientsError::init(
            InitStage::StreamingClient,
            ClientsError::Transport("connection refused".to_string()),
        );

        let msg = err.to_string();
        assert!(msg.starts_with("streaming client init failed"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_init_error_preserves_source() {
        let err = ClientsError::init(
            InitStage::SnapshotReader,
            ClientsError::Timeout("PING".to_string()),
        );

        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "Timed out: PING");
        assert_eq!(err.stage(), Some(InitStage::SnapshotReader));
    }

    #[test]
    fn test_stage_is_none_for_other_errors() {
        let err = ClientsError::InvalidConfig("bad".to_string());
        assert_eq!(err.stage(), None);
    }
}
