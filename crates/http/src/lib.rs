//! bunstore-http: reqwest transport for bunstore
//!
//! This crate provides the implementation of the `Transport` trait using
//! reqwest. It is the only crate that directly depends on an HTTP client.

pub mod transport;

use std::sync::Arc;

use bunstore_core::{ClientConfig, Result, StorageClient};

pub use transport::HttpTransport;

/// Create a storage client talking to the service over HTTP
pub fn connect(config: ClientConfig) -> Result<StorageClient> {
    let transport = HttpTransport::new(&config)?;
    Ok(StorageClient::new(config, Arc::new(transport)))
}
