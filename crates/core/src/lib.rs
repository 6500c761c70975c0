//! bunstore-core: Core library for the bunstore storage zone client
//!
//! This crate provides:
//! - Object name encoding and request URI construction
//! - Streaming uploads and downloads with progress and cancellation
//! - Mapping of service statuses and listing payloads
//! - The `StorageClient` facade
//! - Configuration and profile management
//!
//! It does not depend on any HTTP client. Requests go through the
//! [`Transport`] trait, implemented by `bunstore-http` and by test fakes.

pub mod body;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod mapper;
pub mod profile;
pub mod request;
pub mod traits;
pub mod transfer;

pub use body::{ObjectBody, UploadSource};
pub use client::{PutOptions, StorageClient};
pub use codec::NameCodec;
pub use config::{ClientConfig, Config, ConfigManager, DEFAULT_ENDPOINT};
pub use error::{Error, Result};
pub use mapper::StatusKind;
pub use profile::{Profile, ProfileManager};
pub use request::RequestBuilder;
pub use traits::{
    BodyStream, GetOutcome, ListOutcome, RequestBody, StorageObject, Transport, TransportRequest,
    TransportResponse,
};
pub use transfer::{ProgressFn, TransferExecutor};

pub use http::StatusCode;
pub use tokio_util::sync::CancellationToken;
