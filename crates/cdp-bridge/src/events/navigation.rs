// Navigation and network event decoders
//
// Typed views of `Page.frameNavigated` and `Network.responseReceived`, plus
// stream constructors that subscribe through a Channel.

use crate::error::{Error, Result};
use crate::events::stream::EventStream;
use crate::server::channel::Channel;
use crate::server::types::{Frame, FrameId};
use serde::{Deserialize, Serialize};
use regex::Regex;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;

pub const FRAME_NAVIGATED_EVENT: &str = "Page.frameNavigated";

pub const RESPONSE_RECEIVED_EVENT: &str = "Network.responseReceived";

/// A frame committed a navigation
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NavigationEvent {
    pub url: String,
    pub frame_id: FrameId,
    pub mime_type: String,
}

impl NavigationEvent {
    pub fn decode(params: JsonValue) -> Result<Self> {
        #[derive(Deserialize)]
        struct FrameNavigated {
            frame: Frame,
        }

        let payload: FrameNavigated = serde_json::from_value(params)
            .map_err(|e| Error::Protocol(format!("Malformed '{}' event: {}", FRAME_NAVIGATED_EVENT, e)))?;

        Ok(Self {
            url: payload.frame.url,
            frame_id: payload.frame.id,
            mime_type: payload.frame.mime_type,
        })
    }
}

impl fmt::Display for NavigationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// HTTP response data as reported by the Network domain
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub url: String,
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub headers: HashMap<String, JsonValue>,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub remote_ip_address: Option<String>,
}

/// A response arrived for a request issued by the page
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEvent {
    pub request_id: String,
    #[serde(default)]
    pub loader_id: String,
    #[serde(default)]
    pub timestamp: f64,
    #[serde(rename = "type", default)]
    pub resource_type: String,
    pub response: Response,
    #[serde(default)]
    pub frame_id: Option<FrameId>,
}

impl ResponseEvent {
    pub fn decode(params: JsonValue) -> Result<Self> {
        serde_json::from_value(params)
            .map_err(|e| Error::Protocol(format!("Malformed '{}' event: {}", RESPONSE_RECEIVED_EVENT, e)))
    }

    pub fn is_from_frame(&self, frame_id: &FrameId) -> bool {
        self.frame_id.as_ref() == Some(frame_id)
    }
}

/// Selects which navigation or response events a stream delivers
///
/// Both conditions must hold. An unset condition matches everything. The URL
/// pattern is unanchored, so `/api/` matches any URL containing it.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    frame_id: Option<FrameId>,
    url: Option<Regex>,
}

impl EventFilter {
    /// Only events of `frame_id`.
    pub fn for_frame(frame_id: FrameId) -> Self {
        Self {
            frame_id: Some(frame_id),
            url: None,
        }
    }

    /// Adds a URL pattern.
    ///
    /// Fails with [`Error::InvalidArgument`] when `pattern` is not a valid
    /// regular expression.
    pub fn with_url(mut self, pattern: &str) -> Result<Self> {
        let url = Regex::new(pattern)
            .map_err(|e| Error::InvalidArgument(format!("Invalid URL pattern '{}': {}", pattern, e)))?;
        self.url = Some(url);
        Ok(self)
    }

    pub fn frame_id(&self) -> Option<&FrameId> {
        self.frame_id.as_ref()
    }

    pub fn url_pattern(&self) -> Option<&str> {
        self.url.as_ref().map(Regex::as_str)
    }

    /// Events without a frame id only pass when no frame is wanted.
    pub fn matches(&self, frame_id: Option<&FrameId>, url: &str) -> bool {
        let frame_ok = match &self.frame_id {
            None => true,
            Some(wanted) => frame_id == Some(wanted),
        };

        frame_ok && self.url.as_ref().is_none_or(|re| re.is_match(url))
    }
}

/// Navigations that pass `filter`.
pub async fn navigation_stream(
    channel: &Channel,
    filter: EventFilter,
) -> Result<EventStream<NavigationEvent>> {
    let subscription = channel.subscribe(FRAME_NAVIGATED_EVENT).await?;

    Ok(EventStream::new(subscription, move |params| {
        let event = NavigationEvent::decode(params)?;
        Ok(filter.matches(Some(&event.frame_id), &event.url).then_some(event))
    }))
}

/// Responses that pass `filter`, matched on the response URL.
pub async fn response_stream(
    channel: &Channel,
    filter: EventFilter,
) -> Result<EventStream<ResponseEvent>> {
    let subscription = channel.subscribe(RESPONSE_RECEIVED_EVENT).await?;

    Ok(EventStream::new(subscription, move |params| {
        let event = ResponseEvent::decode(params)?;
        let keep = filter.matches(event.frame_id.as_ref(), &event.response.url);
        Ok(keep.then_some(event))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_navigation() {
        let event = NavigationEvent::decode(json!({
            "frame": {
                "id": "F1",
                "loaderId": "L1",
                "url": "https://example.test/",
                "mimeType": "text/html",
                "securityOrigin": "https://example.test"
            },
            "type": "Navigation"
        }))
        .unwrap();

        assert_eq!(event.frame_id, FrameId::new("F1"));
        assert_eq!(event.mime_type, "text/html");
        assert_eq!(event.to_string(), "https://example.test/");
    }

    #[test]
    fn test_decode_navigation_rejects_missing_frame() {
        let err = NavigationEvent::decode(json!({"type": "Navigation"})).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn test_decode_response() {
        let event = ResponseEvent::decode(json!({
            "requestId": "R1",
            "loaderId": "L1",
            "timestamp": 12.5,
            "type": "Document",
            "frameId": "F1",
            "response": {
                "url": "https://example.test/",
                "status": 200,
                "statusText": "OK",
                "headers": {"content-type": "text/html"},
                "mimeType": "text/html"
            }
        }))
        .unwrap();

        assert_eq!(event.response.status, 200);
        assert_eq!(event.resource_type, "Document");
        assert!(event.is_from_frame(&FrameId::new("F1")));
        assert!(!event.is_from_frame(&FrameId::new("F2")));
    }

    #[test]
    fn test_filter_by_frame() {
        let any = EventFilter::default();
        assert!(any.matches(Some(&FrameId::new("F1")), "https://example.test/"));
        assert!(any.matches(None, "https://example.test/"));

        let only = EventFilter::for_frame(FrameId::new("F1"));
        assert!(only.matches(Some(&FrameId::new("F1")), "https://example.test/"));
        assert!(!only.matches(Some(&FrameId::new("F2")), "https://example.test/"));
        assert!(!only.matches(None, "https://example.test/"));
    }

    #[test]
    fn test_filter_by_url_and_frame() {
        let filter = EventFilter::for_frame(FrameId::new("F1"))
            .with_url(r"/api/v\d+/")
            .unwrap();
        assert_eq!(filter.url_pattern(), Some(r"/api/v\d+/"));

        assert!(filter.matches(Some(&FrameId::new("F1")), "https://example.test/api/v2/items"));
        assert!(!filter.matches(Some(&FrameId::new("F1")), "https://example.test/static/app.js"));
        assert!(!filter.matches(Some(&FrameId::new("F2")), "https://example.test/api/v2/items"));
    }

    #[test]
    fn test_invalid_url_pattern() {
        let err = EventFilter::default().with_url("(unclosed").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
