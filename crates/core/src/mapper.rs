//! Mapping transport outcomes to results
//!
//! Statuses are passed through untouched. The only decision made here is
//! whether a listing payload gets decoded at all.

use http::StatusCode;

use crate::error::Result;
use crate::traits::{ListOutcome, StorageObject};

/// Coarse classification of a service status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// Created, overwritten, deleted, listed, or read started
    Success,
    /// Wrong access key or zone; the service does not say which
    Unauthorized,
    /// Object or zone does not resolve
    NotFound,
    /// Rejected by service-side validation
    BadRequest,
    Other(StatusCode),
}

impl From<StatusCode> for StatusKind {
    fn from(status: StatusCode) -> Self {
        match status {
            s if s.is_success() => StatusKind::Success,
            StatusCode::UNAUTHORIZED => StatusKind::Unauthorized,
            StatusCode::NOT_FOUND => StatusKind::NotFound,
            StatusCode::BAD_REQUEST => StatusKind::BadRequest,
            other => StatusKind::Other(other),
        }
    }
}

impl StatusKind {
    pub fn is_success(self) -> bool {
        self == StatusKind::Success
    }
}

/// Build a listing outcome from a status and, for 200 only, the response text
///
/// Entries that fail to decode are skipped individually; a payload that is not
/// a JSON array fails the call.
pub fn map_listing(status: StatusCode, text: Option<&str>) -> Result<ListOutcome> {
    if status != StatusCode::OK {
        return Ok(ListOutcome {
            status,
            objects: Vec::new(),
        });
    }

    let Some(text) = text else {
        return Ok(ListOutcome {
            status,
            objects: Vec::new(),
        });
    };

    let entries: Vec<serde_json::Value> = serde_json::from_str(text)?;
    let mut objects = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<StorageObject>(entry) {
            Ok(obj) => objects.push(obj),
            Err(e) => tracing::warn!(index, error = %e, "Skipping undecodable listing entry"),
        }
    }

    Ok(ListOutcome { status, objects })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_status_kind() {
        assert_eq!(StatusKind::from(StatusCode::OK), StatusKind::Success);
        assert_eq!(StatusKind::from(StatusCode::CREATED), StatusKind::Success);
        assert_eq!(
            StatusKind::from(StatusCode::UNAUTHORIZED),
            StatusKind::Unauthorized
        );
        assert_eq!(StatusKind::from(StatusCode::NOT_FOUND), StatusKind::NotFound);
        assert_eq!(
            StatusKind::from(StatusCode::BAD_REQUEST),
            StatusKind::BadRequest
        );
        assert_eq!(
            StatusKind::from(StatusCode::BAD_GATEWAY),
            StatusKind::Other(StatusCode::BAD_GATEWAY)
        );
        assert!(StatusKind::Success.is_success());
        assert!(!StatusKind::NotFound.is_success());
    }

    #[test]
    fn test_map_listing_success() {
        let text = r#"[{"ObjectName": "a.txt", "Length": 1}, {"ObjectName": "b", "IsDirectory": true}]"#;
        let outcome = map_listing(StatusCode::OK, Some(text)).unwrap();
        assert_eq!(outcome.status, StatusCode::OK);
        assert_eq!(outcome.objects.len(), 2);
        assert!(outcome.objects[1].is_directory);
    }

    #[test]
    fn test_map_listing_failure_is_empty_and_not_decoded() {
        let outcome =
            map_listing(StatusCode::UNAUTHORIZED, Some(r#"{"HttpCode":401,"Message":"Unauthorized"}"#))
                .unwrap();
        assert_eq!(outcome.status, StatusCode::UNAUTHORIZED);
        assert!(outcome.objects.is_empty());

        let outcome = map_listing(StatusCode::NOT_FOUND, Some("<html>not json</html>")).unwrap();
        assert!(outcome.objects.is_empty());
    }

    #[test]
    fn test_map_listing_skips_bad_entries() {
        let text = r#"[{"ObjectName": "ok"}, {"ObjectName": 12}, {"Length": "huge"}, {"ObjectName": "also-ok"}]"#;
        let outcome = map_listing(StatusCode::OK, Some(text)).unwrap();
        let names: Vec<_> = outcome.objects.iter().map(|o| o.object_name.as_str()).collect();
        assert_eq!(names, vec!["ok", "also-ok"]);
    }

    #[test]
    fn test_map_listing_keeps_entries_with_null_fields() {
        let text = r#"[
            {"ObjectName": "kept.txt"},
            {"ObjectName": "report.txt", "UserId": null, "Guid": null, "Length": null,
             "IsDirectory": null, "ServerId": null, "Path": null, "LastChanged": null}
        ]"#;
        let outcome = map_listing(StatusCode::OK, Some(text)).unwrap();
        let names: Vec<_> = outcome.objects.iter().map(|o| o.object_name.as_str()).collect();
        assert_eq!(names, vec!["kept.txt", "report.txt"]);

        let report = &outcome.objects[1];
        assert_eq!(report.length, 0);
        assert!(report.user_id.is_empty());
        assert!(!report.is_directory);
        assert_eq!(report.last_changed, None);
    }

    #[test]
    fn test_map_listing_rejects_non_array() {
        let err = map_listing(StatusCode::OK, Some("not json")).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_map_listing_empty_zone() {
        let outcome = map_listing(StatusCode::OK, Some("[]")).unwrap();
        assert!(outcome.objects.is_empty());
    }
}
