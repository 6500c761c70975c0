//! Streaming transfer executor
//!
//! Drives one HTTP exchange per call against the injected [`Transport`]. Bodies
//! move in bounded chunks and are never materialized whole, except for listing
//! payloads which are small JSON documents. Cancellation is checked between
//! chunks and while waiting on the network; it always surfaces as
//! [`Error::Cancelled`]. Every exchange is bounded by the configured timeout.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bytes::Bytes;
use futures::channel::mpsc;
use futures::{SinkExt, StreamExt};
use http::StatusCode;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use crate::body::{ObjectBody, UploadSource};
use crate::error::{Error, Result};
use crate::mapper::{self, StatusKind};
use crate::traits::{
    BodyStream, GetOutcome, ListOutcome, Transport, TransportRequest, TransportResponse,
};

/// Progress callback: bytes transferred so far, total when known
pub type ProgressFn<'a> = dyn Fn(u64, Option<u64>) + Send + Sync + 'a;

/// Chunks buffered between the upload source and the request body
const PIPE_DEPTH: usize = 2;

/// Executes single exchanges for a storage client
#[derive(Clone)]
pub struct TransferExecutor {
    transport: Arc<dyn Transport>,
    timeout: Duration,
    chunk_size: usize,
}

impl TransferExecutor {
    pub fn new(transport: Arc<dyn Transport>, timeout: Duration, chunk_size: usize) -> Self {
        Self {
            transport,
            timeout,
            chunk_size: chunk_size.max(1),
        }
    }

    /// GET the zone root and decode the listing on success
    pub async fn list(&self, uri: &str, cancel: &CancellationToken) -> Result<ListOutcome> {
        self.deadline(async {
            let response = self.exchange(TransportRequest::get(uri), cancel).await?;
            let status = response.status;

            let text = if status == StatusCode::OK {
                let body = ObjectBody::new(response.body, response.content_length);
                Some(cancellable(cancel, body.text()).await?)
            } else {
                None
            };

            mapper::map_listing(status, text.as_deref())
        })
        .await
    }

    /// GET an object and hand back the live body without reading it
    pub async fn open(&self, uri: &str, cancel: &CancellationToken) -> Result<GetOutcome> {
        let response = self
            .deadline(self.exchange(TransportRequest::get(uri), cancel))
            .await?;

        Ok(GetOutcome {
            status: response.status,
            body: ObjectBody::new(response.body, response.content_length),
        })
    }

    /// GET an object and copy its body into `sink`
    ///
    /// The body is copied whatever the status, mirroring [`Self::open`].
    pub async fn download<W>(
        &self,
        uri: &str,
        sink: &mut W,
        progress: Option<&ProgressFn<'_>>,
        cancel: &CancellationToken,
    ) -> Result<StatusCode>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        self.deadline(async {
            let response = self.exchange(TransportRequest::get(uri), cancel).await?;
            let status = response.status;
            let total = response.content_length;
            let mut body = response.body;
            let mut transferred = 0u64;

            loop {
                let next = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(Error::Cancelled),
                    next = body.next() => next,
                };
                let Some(chunk) = next else { break };
                let mut chunk = chunk?;

                while !chunk.is_empty() {
                    if cancel.is_cancelled() {
                        return Err(Error::Cancelled);
                    }
                    let piece = chunk.split_to(chunk.len().min(self.chunk_size));
                    sink.write_all(&piece).await?;
                    transferred += piece.len() as u64;
                    tracing::trace!(transferred, ?total, "Downloaded chunk");
                    report(progress, transferred, total);
                }
            }

            sink.flush().await?;
            Ok(status)
        })
        .await
    }

    /// PUT the contents of `source`, starting at `offset` when it can seek
    ///
    /// With `auto_dispose` the source is released after a successful status.
    /// On any failure it is left untouched for the caller to reuse or drop.
    pub async fn upload(
        &self,
        uri: &str,
        source: &mut UploadSource,
        offset: u64,
        auto_dispose: bool,
        progress: Option<&ProgressFn<'_>>,
        cancel: &CancellationToken,
    ) -> Result<StatusCode> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let total = source.prepare(offset).await?;

        let status = self
            .deadline(async {
                let (tx, rx) = mpsc::channel(PIPE_DEPTH);
                let completed = Arc::new(AtomicBool::new(false));
                let request = TransportRequest::put(uri, sealed_body(rx, completed.clone()), total);

                let pump = pump(source, tx, &completed, self.chunk_size, total, progress, cancel);
                let send = self.transport.send(request);
                tokio::pin!(pump);
                tokio::pin!(send);

                // Dropping `send` aborts the request, so the service never
                // commits an object from a truncated body.
                let mut pumped = false;
                loop {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(Error::Cancelled),
                        sent = &mut pump, if !pumped => {
                            sent?;
                            pumped = true;
                        }
                        response = &mut send => break response.map(|r| r.status),
                    }
                }
            })
            .await?;

        if auto_dispose && StatusKind::from(status).is_success() {
            source.release();
        }

        Ok(status)
    }

    /// DELETE an object
    pub async fn delete(&self, uri: &str, cancel: &CancellationToken) -> Result<StatusCode> {
        let response = self
            .deadline(self.exchange(TransportRequest::delete(uri), cancel))
            .await?;
        Ok(response.status)
    }

    async fn exchange(
        &self,
        request: TransportRequest,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse> {
        cancellable(cancel, self.transport.send(request)).await
    }

    async fn deadline<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.timeout)),
        }
    }
}

impl std::fmt::Debug for TransferExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferExecutor")
            .field("timeout", &self.timeout)
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = fut => result,
    }
}

/// Request body fed by [`pump`]
///
/// A channel that closes without `completed` set ends in an error instead of
/// a clean EOF, so a transport streaming without Content-Length cannot mistake
/// an aborted upload for a finished one.
fn sealed_body(
    rx: mpsc::Receiver<std::io::Result<Bytes>>,
    completed: Arc<AtomicBool>,
) -> BodyStream {
    let tail = futures::stream::once(async move {
        if completed.load(Ordering::Acquire) {
            None
        } else {
            Some(Err(std::io::Error::new(
                std::io::ErrorKind::Interrupted,
                "upload aborted before the source was exhausted",
            )))
        }
    })
    .filter_map(futures::future::ready);

    Box::pin(rx.chain(tail))
}

/// Feed the source into the request body channel until it is exhausted
async fn pump(
    source: &mut UploadSource,
    mut tx: mpsc::Sender<std::io::Result<Bytes>>,
    completed: &AtomicBool,
    chunk_size: usize,
    total: Option<u64>,
    progress: Option<&ProgressFn<'_>>,
    cancel: &CancellationToken,
) -> Result<u64> {
    let mut buf = vec![0u8; chunk_size];
    let mut sent = 0u64;

    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let n = source.read_chunk(&mut buf).await?;
        if n == 0 {
            break;
        }

        if tx.send(Ok(Bytes::copy_from_slice(&buf[..n]))).await.is_err() {
            tracing::trace!(sent, "Request body closed before the source was exhausted");
            return Ok(sent);
        }

        sent += n as u64;
        tracing::trace!(sent, ?total, "Uploaded chunk");
        report(progress, sent, total);
    }

    completed.store(true, Ordering::Release);
    Ok(sent)
}

fn report(progress: Option<&ProgressFn<'_>>, transferred: u64, total: Option<u64>) {
    if let Some(callback) = progress {
        callback(transferred, total);
    }
}
