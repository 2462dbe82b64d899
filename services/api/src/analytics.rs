//! Best-effort analytics recording
//!
//! Events are dispatched as detached tasks with no return channel: a
//! failure to persist an event is logged and can never fail the request
//! that produced it.

use axum::http::{HeaderMap, header};
use tracing::warn;
use uuid::Uuid;

use crate::models::{EventKind, EventMetadata};
use crate::repositories::AnalyticsRepository;

/// Fire-and-forget recorder over the analytics repository
#[derive(Clone)]
pub struct AnalyticsRecorder {
    repository: AnalyticsRepository,
}

impl AnalyticsRecorder {
    /// Create a new analytics recorder
    pub fn new(repository: AnalyticsRepository) -> Self {
        Self { repository }
    }

    /// Record an event without blocking the caller
    pub fn record(&self, profile_id: Uuid, kind: EventKind, metadata: EventMetadata) {
        let repository = self.repository.clone();
        tokio::spawn(async move {
            if let Err(e) = repository.insert(profile_id, kind, &metadata).await {
                warn!(
                    "Failed to record {} event for profile {}: {}",
                    kind.as_str(),
                    profile_id,
                    e
                );
            }
        });
    }
}

/// Capture request metadata for an analytics event
pub fn metadata_from_headers(headers: &HeaderMap) -> EventMetadata {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string())
    };

    let ip = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|value| value.to_str().ok())
                .map(|value| value.to_string())
        });

    EventMetadata {
        user_agent: header_value(header::USER_AGENT),
        referrer: header_value(header::REFERER),
        ip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_metadata_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("TestAgent/1.0"));
        headers.insert(header::REFERER, HeaderValue::from_static("https://x.com/"));
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );

        let metadata = metadata_from_headers(&headers);
        assert_eq!(metadata.user_agent.as_deref(), Some("TestAgent/1.0"));
        assert_eq!(metadata.referrer.as_deref(), Some("https://x.com/"));
        // First hop of x-forwarded-for wins
        assert_eq!(metadata.ip.as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_metadata_defaults_to_none() {
        let metadata = metadata_from_headers(&HeaderMap::new());
        assert!(metadata.user_agent.is_none());
        assert!(metadata.referrer.is_none());
        assert!(metadata.ip.is_none());
    }
}
