//! Data model and the Transport trait
//!
//! The transport is the only seam between this crate and an HTTP client. It is
//! injected into [`crate::StorageClient`] so tests can substitute a fake, and a
//! single instance is shared by every call a client makes.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use http::{Method, StatusCode};
use jiff::civil::DateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::body::ObjectBody;
use crate::error::Result;

/// Byte stream carrying a request or response body
pub type BodyStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Metadata record for an object in a storage zone, as returned by a listing
///
/// Missing or null fields decode to their defaults and unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct StorageObject {
    /// Identifier assigned on upload
    #[serde(deserialize_with = "null_as_default")]
    pub guid: String,

    /// Zone this object resides in
    #[serde(deserialize_with = "null_as_default")]
    pub storage_zone_name: String,

    /// Virtual folder path, e.g. `/zone/a/b/`
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,

    /// Name used for API operations
    #[serde(deserialize_with = "null_as_default")]
    pub object_name: String,

    /// Size in bytes
    #[serde(deserialize_with = "null_as_default")]
    pub length: u64,

    /// Last write, in the service's local time
    #[serde(deserialize_with = "lenient_datetime")]
    pub last_changed: Option<DateTime>,

    /// Whether this entry is a virtual folder
    #[serde(deserialize_with = "null_as_default")]
    pub is_directory: bool,

    /// Storage server holding the object
    #[serde(deserialize_with = "null_as_default")]
    pub server_id: i64,

    /// Owner of the object
    #[serde(deserialize_with = "null_as_default")]
    pub user_id: String,

    #[serde(deserialize_with = "lenient_datetime")]
    pub date_created: Option<DateTime>,

    #[serde(deserialize_with = "null_as_default")]
    pub storage_zone_id: i64,
}

impl StorageObject {
    /// Create a file record with the given name and length
    pub fn file(name: impl Into<String>, length: u64) -> Self {
        Self {
            object_name: name.into(),
            length,
            ..Default::default()
        }
    }

    /// Create a virtual folder record
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            object_name: name.into(),
            is_directory: true,
            ..Default::default()
        }
    }

    /// Virtual path joined with the object name
    pub fn full_path(&self) -> String {
        if self.path.is_empty() || self.path.ends_with('/') {
            format!("{}{}", self.path, self.object_name)
        } else {
            format!("{}/{}", self.path, self.object_name)
        }
    }

    /// Human-readable size
    pub fn size_human(&self) -> String {
        humansize::format_size(self.length, humansize::BINARY)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts offset-less timestamps, RFC 3339 timestamps, null, or garbage (→ `None`).
fn lenient_datetime<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::String(text)) = raw else {
        return Ok(None);
    };

    if let Ok(dt) = text.parse::<DateTime>() {
        return Ok(Some(dt));
    }

    Ok(text
        .parse::<jiff::Timestamp>()
        .ok()
        .map(|ts| ts.to_zoned(jiff::tz::TimeZone::UTC).datetime()))
}

/// Result of a listing
///
/// `objects` is empty whenever `status` is not a success.
#[derive(Debug, Clone, Serialize)]
pub struct ListOutcome {
    #[serde(with = "status_code")]
    pub status: StatusCode,
    pub objects: Vec<StorageObject>,
}

/// Result of a streaming download
///
/// The body is always present. On failure it carries the service's error
/// document. Dropping the body releases the connection.
#[derive(Debug)]
pub struct GetOutcome {
    pub status: StatusCode,
    pub body: ObjectBody,
}

/// Body attached to an outgoing request
pub enum RequestBody {
    Empty,
    Stream {
        stream: BodyStream,
        /// Exact length when known, sent as Content-Length
        length: Option<u64>,
    },
}

impl RequestBody {
    pub fn length(&self) -> Option<u64> {
        match self {
            RequestBody::Empty => Some(0),
            RequestBody::Stream { length, .. } => *length,
        }
    }
}

impl std::fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestBody::Empty => f.write_str("Empty"),
            RequestBody::Stream { length, .. } => {
                f.debug_struct("Stream").field("length", length).finish()
            }
        }
    }
}

/// A single HTTP exchange to perform
#[derive(Debug)]
pub struct TransportRequest {
    pub method: Method,
    pub uri: String,
    pub body: RequestBody,
}

impl TransportRequest {
    pub fn get(uri: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            uri: uri.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn put(uri: impl Into<String>, stream: BodyStream, length: Option<u64>) -> Self {
        Self {
            method: Method::PUT,
            uri: uri.into(),
            body: RequestBody::Stream { stream, length },
        }
    }

    pub fn delete(uri: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            uri: uri.into(),
            body: RequestBody::Empty,
        }
    }
}

/// Status, headers of interest, and the undrained body
pub struct TransportResponse {
    pub status: StatusCode,
    pub content_length: Option<u64>,
    pub body: BodyStream,
}

impl TransportResponse {
    /// Response with an in-memory body
    pub fn from_bytes(status: StatusCode, body: impl Into<Bytes>) -> Self {
        let body: Bytes = body.into();
        let len = body.len() as u64;
        Self {
            status,
            content_length: Some(len),
            body: Box::pin(futures::stream::once(async move {
                Ok::<_, std::io::Error>(body)
            })),
        }
    }
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// HTTP transport used by the storage client
///
/// Implementations must resolve as soon as the status line and headers have
/// arrived, leaving the body to be pulled through [`TransportResponse::body`].
/// They must be safe to share between concurrent calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one exchange
    ///
    /// Errors are reserved for failures before a status was received.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

mod status_code {
    use http::StatusCode;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_ENTRY: &str = r#"{
        "Guid": "7fa1a7a0-1c3e-4a4b-9b8a-5d0a3b3f9e11",
        "StorageZoneName": "assets",
        "Path": "/assets/",
        "ObjectName": "logo.png",
        "Length": 5120,
        "LastChanged": "2026-10-14T08:15:30.123",
        "IsDirectory": false,
        "ServerId": 42,
        "UserId": "b1d0c2e3",
        "DateCreated": "2026-10-01T00:00:00",
        "StorageZoneId": 1234,
        "ReplicatedZones": "DE,NY",
        "Checksum": null
    }"#;

    #[test]
    fn test_storage_object_decode() {
        let obj: StorageObject = serde_json::from_str(LISTING_ENTRY).unwrap();
        assert_eq!(obj.storage_zone_name, "assets");
        assert_eq!(obj.object_name, "logo.png");
        assert_eq!(obj.length, 5120);
        assert_eq!(obj.server_id, 42);
        assert_eq!(obj.storage_zone_id, 1234);
        assert!(!obj.is_directory);
        let changed = obj.last_changed.unwrap();
        assert_eq!((changed.year(), changed.month(), changed.day()), (2026, 10, 14));
        assert_eq!(obj.date_created.unwrap().hour(), 0);
    }

    #[test]
    fn test_storage_object_missing_fields_default() {
        let obj: StorageObject = serde_json::from_str(r#"{"ObjectName": "a.txt"}"#).unwrap();
        assert_eq!(obj.object_name, "a.txt");
        assert_eq!(obj.length, 0);
        assert!(obj.last_changed.is_none());
        assert!(obj.guid.is_empty());
    }

    #[test]
    fn test_storage_object_lenient_timestamps() {
        let obj: StorageObject = serde_json::from_str(
            r#"{"LastChanged": "yesterday", "DateCreated": "2026-10-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert!(obj.last_changed.is_none());
        assert_eq!(obj.date_created.unwrap().hour(), 12);

        let obj: StorageObject = serde_json::from_str(r#"{"LastChanged": null}"#).unwrap();
        assert!(obj.last_changed.is_none());
    }

    #[test]
    fn test_storage_object_full_path() {
        let mut obj = StorageObject::file("c.txt", 3);
        obj.path = "/zone/a/b/".into();
        assert_eq!(obj.full_path(), "/zone/a/b/c.txt");

        obj.path = "/zone/a".into();
        assert_eq!(obj.full_path(), "/zone/a/c.txt");
    }

    #[test]
    fn test_storage_object_constructors() {
        let file = StorageObject::file("test.txt", 1024);
        assert_eq!(file.object_name, "test.txt");
        assert_eq!(file.size_human(), "1 KiB");
        assert!(!file.is_directory);

        let dir = StorageObject::dir("photos");
        assert!(dir.is_directory);
        assert_eq!(dir.length, 0);
    }

    #[test]
    fn test_list_outcome_serializes_status_as_number() {
        let outcome = ListOutcome {
            status: StatusCode::UNAUTHORIZED,
            objects: Vec::new(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], 401);
        assert_eq!(json["objects"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_request_constructors() {
        let req = TransportRequest::delete("https://example.com/z/a");
        assert_eq!(req.method, Method::DELETE);
        assert_eq!(req.body.length(), Some(0));

        let req = TransportRequest::put("u", Box::pin(futures::stream::empty::<std::io::Result<Bytes>>()), Some(9));
        assert_eq!(req.method, Method::PUT);
        assert_eq!(req.body.length(), Some(9));
    }
}
