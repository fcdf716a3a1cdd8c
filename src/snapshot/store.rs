// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Key-value store client

use crate::error::Result;
use redis::aio::ConnectionManager;
use tracing::{debug, instrument};

/// Address of the snapshot store.
///
/// Creating one never touches the network; connections are opened on demand.
#[derive(Clone, Debug)]
pub struct StoreClient {
    address: String,
}

impl StoreClient {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Open a managed connection to the store.
    ///
    /// The returned handle is cheap to clone and reconnects on its own after
    /// the store drops the connection.
    #[instrument(skip(self), fields(address = %self.address))]
    pub async fn connect(&self) -> Result<ConnectionManager> {
        let client = redis::Client::open(self.address.as_str())?;
        let conn = ConnectionManager::new(client).await?;
        debug!("Connected to snapshot store");
        Ok(conn)
    }
}
