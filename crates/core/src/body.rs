//! Request and response bodies
//!
//! [`ObjectBody`] is the live body of a download: bytes are pulled from the
//! connection only as the caller reads. [`UploadSource`] is the readable side
//! of an upload, with an explicit seekability capability.

use std::io::{Cursor, SeekFrom};
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};
use tokio_util::io::StreamReader;

use crate::error::{Error, Result};
use crate::traits::BodyStream;

/// Upper bound on the buffer preallocated from a Content-Length header
const MAX_PREALLOC: u64 = 8 * 1024 * 1024;

/// Undrained response body of a download
///
/// Single owner, single reader. Dropping it closes the underlying connection.
pub struct ObjectBody {
    stream: BodyStream,
    content_length: Option<u64>,
}

impl ObjectBody {
    pub fn new(stream: BodyStream, content_length: Option<u64>) -> Self {
        Self {
            stream,
            content_length,
        }
    }

    /// Length announced by the service, if any
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Adapt the body into an [`AsyncRead`]
    pub fn into_reader(self) -> StreamReader<BodyStream, Bytes> {
        StreamReader::new(self.stream)
    }

    /// Drain the whole body into memory
    pub async fn bytes(mut self) -> Result<Bytes> {
        let capacity = self.content_length.unwrap_or(0).min(MAX_PREALLOC) as usize;
        let mut buf = BytesMut::with_capacity(capacity);
        while let Some(chunk) = self.stream.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }

    /// Drain the whole body as UTF-8 text
    pub async fn text(self) -> Result<String> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }
}

impl Stream for ObjectBody {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.stream.as_mut().poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.stream.size_hint()
    }
}

impl std::fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectBody")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Reader that also supports random-access positioning
pub trait SeekableRead: AsyncRead + AsyncSeek + Send + Unpin {}

impl<T: AsyncRead + AsyncSeek + Send + Unpin> SeekableRead for T {}

enum SourceInner {
    Seekable(Box<dyn SeekableRead>),
    Sequential(Box<dyn AsyncRead + Send + Unpin>),
    Released,
}

/// Readable side of an upload
///
/// Whether the source can seek decides how an upload offset is honored: a
/// seekable source is repositioned to the offset before sending, a sequential
/// one is consumed from wherever it currently is and the offset is ignored.
pub struct UploadSource {
    inner: SourceInner,
}

impl UploadSource {
    /// Source supporting random access, e.g. a `tokio::fs::File`
    pub fn seekable<R>(reader: R) -> Self
    where
        R: AsyncRead + AsyncSeek + Send + Unpin + 'static,
    {
        Self {
            inner: SourceInner::Seekable(Box::new(reader)),
        }
    }

    /// Forward-only source, e.g. stdin or a pipe
    pub fn sequential<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            inner: SourceInner::Sequential(Box::new(reader)),
        }
    }

    /// In-memory source over owned bytes
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::seekable(Cursor::new(data.into()))
    }

    /// In-memory source over the UTF-8 bytes of `text`
    pub fn from_text(text: &str) -> Self {
        Self::from_bytes(text.as_bytes().to_vec())
    }

    pub fn is_seekable(&self) -> bool {
        matches!(self.inner, SourceInner::Seekable(_))
    }

    pub fn is_released(&self) -> bool {
        matches!(self.inner, SourceInner::Released)
    }

    /// Drop the underlying reader, closing any handle it owns
    pub fn release(&mut self) {
        self.inner = SourceInner::Released;
    }

    /// Position the source for sending and return the number of bytes left when known
    pub(crate) async fn prepare(&mut self, offset: u64) -> Result<Option<u64>> {
        match &mut self.inner {
            SourceInner::Seekable(reader) => {
                let end = reader.seek(SeekFrom::End(0)).await?;
                let start = reader.seek(SeekFrom::Start(offset)).await?;
                Ok(Some(end.saturating_sub(start)))
            }
            SourceInner::Sequential(_) => {
                if offset != 0 {
                    tracing::debug!(offset, "Source cannot seek, ignoring upload offset");
                }
                Ok(None)
            }
            SourceInner::Released => Err(Error::SourceReleased),
        }
    }

    /// Read up to `buf.len()` bytes; 0 means end of source
    pub(crate) async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = match &mut self.inner {
            SourceInner::Seekable(reader) => reader.read(buf).await?,
            SourceInner::Sequential(reader) => reader.read(buf).await?,
            SourceInner::Released => return Err(Error::SourceReleased),
        };
        Ok(n)
    }
}

impl std::fmt::Debug for UploadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.inner {
            SourceInner::Seekable(_) => "Seekable",
            SourceInner::Sequential(_) => "Sequential",
            SourceInner::Released => "Released",
        };
        f.debug_tuple("UploadSource").field(&kind).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunked(parts: &[&'static str]) -> ObjectBody {
        let items: Vec<std::io::Result<Bytes>> =
            parts.iter().map(|p| Ok(Bytes::from_static(p.as_bytes()))).collect();
        ObjectBody::new(Box::pin(futures::stream::iter(items)), None)
    }

    #[tokio::test]
    async fn test_object_body_bytes() {
        let body = chunked(&["hel", "lo"]);
        assert_eq!(body.bytes().await.unwrap(), Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn test_object_body_reader() {
        let mut reader = chunked(&["a", "bc", "def"]).into_reader();
        let mut out = String::new();
        reader.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "abcdef");
    }

    #[tokio::test]
    async fn test_object_body_text_rejects_invalid_utf8() {
        let body = ObjectBody::new(
            Box::pin(futures::stream::iter(vec![Ok::<_, std::io::Error>(
                Bytes::from_static(&[0xff, 0xfe]),
            )])),
            Some(2),
        );
        assert!(matches!(body.text().await.unwrap_err(), Error::Io(_)));
    }

    #[tokio::test]
    async fn test_object_body_propagates_stream_error() {
        let items: Vec<std::io::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ];
        let body = ObjectBody::new(Box::pin(futures::stream::iter(items)), None);
        assert!(body.bytes().await.is_err());
    }

    #[tokio::test]
    async fn test_seekable_source_honors_offset() {
        let mut source = UploadSource::from_text("0123456789");
        assert!(source.is_seekable());

        let remaining = source.prepare(4).await.unwrap();
        assert_eq!(remaining, Some(6));

        let mut buf = [0u8; 16];
        let n = source.read_chunk(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"456789");
    }

    #[tokio::test]
    async fn test_seekable_source_rewinds_after_read() {
        let mut source = UploadSource::from_text("abc");
        let mut buf = [0u8; 8];
        source.read_chunk(&mut buf).await.unwrap();

        assert_eq!(source.prepare(0).await.unwrap(), Some(3));
        let n = source.read_chunk(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"abc");
    }

    #[tokio::test]
    async fn test_sequential_source_ignores_offset() {
        let mut source = UploadSource::sequential(&b"abcdef"[..]);
        assert!(!source.is_seekable());

        assert_eq!(source.prepare(3).await.unwrap(), None);
        let mut buf = [0u8; 8];
        let n = source.read_chunk(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"abcdef");
    }

    #[tokio::test]
    async fn test_released_source() {
        let mut source = UploadSource::from_bytes(vec![1, 2, 3]);
        source.release();
        assert!(source.is_released());
        assert!(matches!(
            source.prepare(0).await.unwrap_err(),
            Error::SourceReleased
        ));
        let mut buf = [0u8; 4];
        assert!(matches!(
            source.read_chunk(&mut buf).await.unwrap_err(),
            Error::SourceReleased
        ));
    }
}
