//! reqwest implementation of the Transport trait

use async_trait::async_trait;
use bunstore_core::{
    ClientConfig, Error, RequestBody, RequestBuilder, Result, Transport, TransportRequest,
    TransportResponse,
};
use futures::TryStreamExt;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Body, Client};
use std::time::Duration;

/// HTTP transport backed by a shared reqwest client
///
/// Connections are pooled by reqwest, so a single instance serves every
/// request a `StorageClient` makes.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport using the timeout from `config`
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("bunstore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            timeout: config.timeout(),
        })
    }

    fn map_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            return Error::Timeout(self.timeout);
        }
        // reqwest errors embed the URL, which carries the access key.
        Error::Network(format!("Request failed: {}", error.without_url()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        tracing::debug!(
            method = %request.method,
            uri = %RequestBuilder::redacted(&request.uri),
            length = ?request.body.length(),
            "Sending request"
        );

        let mut builder = self.http_client.request(request.method, &request.uri);
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Stream { stream, length } => {
                let builder = match length {
                    Some(len) => builder.header(CONTENT_LENGTH, len),
                    None => builder,
                };
                builder.body(Body::wrap_stream(stream))
            }
        };

        let response = builder.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status();
        let content_length = response.content_length();
        tracing::debug!(status = status.as_u16(), ?content_length, "Received response");

        let body = response.bytes_stream().map_err(std::io::Error::other);

        Ok(TransportResponse {
            status,
            content_length,
            body: Box::pin(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bunstore_core::{StatusCode, TransportRequest};
    use bytes::Bytes;
    use futures::StreamExt;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve a single connection with `response`, returning the raw request
    async fn serve_once(response: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];

            let header_end = loop {
                let n = socket.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
                assert!(n > 0, "connection closed before headers");
            };

            let head = String::from_utf8_lossy(&raw[..header_end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .map(|v| v.trim().parse::<usize>().unwrap())
                .unwrap_or(0);
            while raw.len() < header_end + body_len {
                let n = socket.read(&mut buf).await.unwrap();
                assert!(n > 0, "connection closed before body");
                raw.extend_from_slice(&buf[..n]);
            }

            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&raw).into_owned()
        });

        (endpoint, handle)
    }

    fn transport() -> HttpTransport {
        HttpTransport::new(&ClientConfig::new("key", "zone")).unwrap()
    }

    #[tokio::test]
    async fn test_get_streams_body() {
        let (endpoint, server) =
            serve_once("HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello")
                .await;

        let response = transport()
            .send(TransportRequest::get(format!("{endpoint}/zone/a.txt?AccessKey=key")))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content_length, Some(5));

        let chunks: Vec<Bytes> = response.body.map(|c| c.unwrap()).collect().await;
        assert_eq!(chunks.concat(), b"hello");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /zone/a.txt?AccessKey=key HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn test_put_sends_length_and_body() {
        let (endpoint, server) = serve_once(
            "HTTP/1.1 201 Created\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let stream = futures::stream::iter(vec![
            Ok::<_, std::io::Error>(Bytes::from_static(b"ab")),
            Ok(Bytes::from_static(b"cd")),
        ]);
        let request = TransportRequest::put(
            format!("{endpoint}/zone/o?AccessKey=key"),
            Box::pin(stream),
            Some(4),
        );

        let response = transport().send(request).await.unwrap();
        assert_eq!(response.status, StatusCode::CREATED);

        let request = server.await.unwrap();
        assert!(request.starts_with("PUT /zone/o?AccessKey=key HTTP/1.1\r\n"));
        assert!(request.to_lowercase().contains("content-length: 4\r\n"));
        assert!(request.ends_with("\r\n\r\nabcd"));
    }

    #[tokio::test]
    async fn test_error_status_is_not_an_error() {
        let (endpoint, _server) = serve_once(
            "HTTP/1.1 401 Unauthorized\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}",
        )
        .await;

        let response = transport()
            .send(TransportRequest::delete(format!("{endpoint}/zone/o?AccessKey=bad")))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = transport()
            .send(TransportRequest::get(format!("http://{addr}/zone/?AccessKey=secret")))
            .await
            .unwrap_err();
        match err {
            Error::Network(msg) => assert!(!msg.contains("secret")),
            other => panic!("expected network error, got {other:?}"),
        }
    }
}
