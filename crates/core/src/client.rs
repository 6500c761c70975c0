//! Storage zone client
//!
//! Composes URI construction, name encoding, and the transfer executor into
//! the four public operations. The client holds only immutable configuration
//! and a shared transport, so clones may be used from concurrent tasks.

use std::sync::Arc;

use http::StatusCode;
use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;

use crate::body::UploadSource;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::request::RequestBuilder;
use crate::traits::{GetOutcome, ListOutcome, Transport};
use crate::transfer::{ProgressFn, TransferExecutor};

/// Options for [`StorageClient::put`]
#[derive(Clone, Copy, Default)]
pub struct PutOptions<'a> {
    /// Position to start reading from, honored only by seekable sources
    pub offset: u64,

    /// Release the source once the service accepted the upload
    pub auto_dispose: bool,

    /// Called after every chunk sent
    pub progress: Option<&'a ProgressFn<'a>>,
}

impl<'a> PutOptions<'a> {
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn auto_dispose(mut self, enabled: bool) -> Self {
        self.auto_dispose = enabled;
        self
    }

    pub fn progress(mut self, progress: &'a ProgressFn<'a>) -> Self {
        self.progress = Some(progress);
        self
    }
}

impl std::fmt::Debug for PutOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PutOptions")
            .field("offset", &self.offset)
            .field("auto_dispose", &self.auto_dispose)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Client for a single storage zone
#[derive(Debug, Clone)]
pub struct StorageClient {
    config: Arc<ClientConfig>,
    requests: RequestBuilder,
    executor: TransferExecutor,
}

impl StorageClient {
    /// Create a client sending every request through `transport`
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let requests = RequestBuilder::new(&config);
        let executor = TransferExecutor::new(transport, config.timeout(), config.chunk_size());
        Self {
            config: Arc::new(config),
            requests,
            executor,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// List the direct entries of the zone root
    ///
    /// Does not descend into virtual folders. With auto-encode enabled the
    /// returned object names are decoded.
    pub async fn list(&self, cancel: &CancellationToken) -> Result<ListOutcome> {
        let mut outcome = self.executor.list(&self.requests.zone_uri(), cancel).await?;

        let codec = self.requests.codec();
        if codec.auto_encode() {
            for object in &mut outcome.objects {
                let decoded = codec.decode(&object.object_name).into_owned();
                object.object_name = decoded;
            }
        }

        tracing::debug!(
            zone = self.config.zone(),
            status = outcome.status.as_u16(),
            count = outcome.objects.len(),
            "Listed zone"
        );
        Ok(outcome)
    }

    /// Start downloading an object and return its live body
    ///
    /// The body is returned on every status; on failure it holds the service's
    /// error document.
    pub async fn get(&self, name: &str, cancel: &CancellationToken) -> Result<GetOutcome> {
        let uri = self.object_uri(name)?;
        let outcome = self.executor.open(&uri, cancel).await?;
        tracing::debug!(name, status = outcome.status.as_u16(), "Opened object");
        Ok(outcome)
    }

    /// Download an object into `destination`
    pub async fn get_to<W>(
        &self,
        name: &str,
        destination: &mut W,
        progress: Option<&ProgressFn<'_>>,
        cancel: &CancellationToken,
    ) -> Result<StatusCode>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let uri = self.object_uri(name)?;
        let status = self
            .executor
            .download(&uri, destination, progress, cancel)
            .await?;
        tracing::debug!(name, status = status.as_u16(), "Downloaded object");
        Ok(status)
    }

    /// Create or overwrite an object from `source`
    ///
    /// Creation and overwrite are reported with the same success status.
    pub async fn put(
        &self,
        name: &str,
        source: &mut UploadSource,
        options: PutOptions<'_>,
        cancel: &CancellationToken,
    ) -> Result<StatusCode> {
        let uri = self.object_uri(name)?;
        let status = self
            .executor
            .upload(
                &uri,
                source,
                options.offset,
                options.auto_dispose,
                options.progress,
                cancel,
            )
            .await?;
        tracing::debug!(name, status = status.as_u16(), "Uploaded object");
        Ok(status)
    }

    /// Create or overwrite an object with the UTF-8 bytes of `content`
    pub async fn put_text(
        &self,
        name: &str,
        content: &str,
        progress: Option<&ProgressFn<'_>>,
        cancel: &CancellationToken,
    ) -> Result<StatusCode> {
        let mut source = UploadSource::from_text(content);
        let options = PutOptions {
            offset: 0,
            auto_dispose: true,
            progress,
        };
        self.put(name, &mut source, options, cancel).await
    }

    /// Delete an object; a missing object yields 404, not success
    pub async fn delete(&self, name: &str, cancel: &CancellationToken) -> Result<StatusCode> {
        let uri = self.object_uri(name)?;
        let status = self.executor.delete(&uri, cancel).await?;
        tracing::debug!(name, status = status.as_u16(), "Deleted object");
        Ok(status)
    }

    fn object_uri(&self, name: &str) -> Result<String> {
        // An empty name would address the zone root.
        if name.is_empty() {
            return Err(Error::InvalidName("object name cannot be empty".into()));
        }
        Ok(self.requests.object_uri(name))
    }
}
