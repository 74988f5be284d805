//! Layout requests and the request session
//!
//! A [`LayoutSource`] answers a [`LayoutRequest`] with a collaborator
//! response. [`LayoutSession`] tracks which request is current: each call to
//! [`LayoutSession::begin`] issues a new [`RequestToken`], and only the
//! response carrying the latest token is applied. Older responses that
//! arrive late are dropped, so a slow answer for a previous nesting can
//! never replace a newer layout.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::LoadError;
use crate::layout::{CanvasConfig, LayoutPayload, NestingLayout, PackerConfig};

/// Optimizer parameters that change the returned layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutParams {
    pub padding_mm: f64,
    pub border_mm: f64,
    pub rotation_enabled: bool,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            padding_mm: 10.0,
            border_mm: 20.0,
            rotation_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRequest {
    pub nesting_id: String,
    #[serde(default)]
    pub params: LayoutParams,
}

impl LayoutRequest {
    pub fn new(nesting_id: impl Into<String>) -> Self {
        Self {
            nesting_id: nesting_id.into(),
            params: LayoutParams::default(),
        }
    }

    pub fn with_params(mut self, params: LayoutParams) -> Self {
        self.params = params;
        self
    }

    /// Identity of the layout this request produces; the view resets when it changes
    pub fn key(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.nesting_id,
            self.params.padding_mm,
            self.params.border_mm,
            self.params.rotation_enabled
        )
    }
}

fn default_success() -> bool {
    true
}

/// Collaborator answer: `{ success, layoutData, message? }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub layout_data: Option<LayoutPayload>,
    #[serde(default)]
    pub message: Option<String>,
}

impl LayoutResponse {
    pub fn ok(payload: LayoutPayload) -> Self {
        Self {
            success: true,
            layout_data: Some(payload),
            message: None,
        }
    }

    /// Parse a full response, or a bare `layoutData` object
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        let value: Value = serde_json::from_str(text)?;
        let is_envelope = value
            .as_object()
            .is_some_and(|o| o.contains_key("success") || o.contains_key("layoutData"));
        if is_envelope {
            Ok(serde_json::from_value(value)?)
        } else {
            Ok(Self::ok(serde_json::from_value(value)?))
        }
    }

    /// The payload, or the reason there is none
    pub fn into_payload(self) -> Result<LayoutPayload, LoadError> {
        if !self.success {
            return Err(LoadError::Rejected {
                message: self
                    .message
                    .unwrap_or_else(|| "layout request failed".to_string()),
            });
        }
        self.layout_data.ok_or(LoadError::MissingLayout)
    }
}

/// Something that can answer layout requests
pub trait LayoutSource {
    fn fetch(&self, request: &LayoutRequest) -> Result<LayoutResponse, LoadError>;
}

impl<F> LayoutSource for F
where
    F: Fn(&LayoutRequest) -> Result<LayoutResponse, LoadError>,
{
    fn fetch(&self, request: &LayoutRequest) -> Result<LayoutResponse, LoadError> {
        self(request)
    }
}

/// Reads responses from disk: one JSON file, or a directory of `<nestingId>.json`
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_for(&self, request: &LayoutRequest) -> PathBuf {
        if self.path.is_dir() {
            self.path.join(format!("{}.json", request.nesting_id))
        } else {
            self.path.clone()
        }
    }
}

impl LayoutSource for JsonFileSource {
    fn fetch(&self, request: &LayoutRequest) -> Result<LayoutResponse, LoadError> {
        let file = self.file_for(request);
        debug!(nesting_id = %request.nesting_id, file = %file.display(), "reading layout");
        let text = std::fs::read_to_string(&file)?;
        LayoutResponse::from_json(&text)
    }
}

/// Issued per request; compared on resolve to drop stale responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The result belonged to the latest request and was applied
    Applied,
    /// A newer request was issued since; the result was dropped
    Stale,
}

/// Where the session stands
#[derive(Debug, Clone, PartialEq)]
pub enum ViewStatus {
    /// Nothing requested yet
    Idle,
    Loading,
    Ready,
    Failed { message: String, retryable: bool },
}

#[derive(Debug, Clone)]
pub struct LayoutSession {
    canvas: CanvasConfig,
    packer: PackerConfig,
    issued: u64,
    pending: Option<RequestToken>,
    last_request: Option<LayoutRequest>,
    layout: Option<NestingLayout>,
    layout_key: Option<String>,
    status: ViewStatus,
}

impl LayoutSession {
    pub fn new(canvas: CanvasConfig, packer: PackerConfig) -> Self {
        Self {
            canvas,
            packer,
            issued: 0,
            pending: None,
            last_request: None,
            layout: None,
            layout_key: None,
            status: ViewStatus::Idle,
        }
    }

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    /// The most recently applied layout
    pub fn layout(&self) -> Option<&NestingLayout> {
        self.layout.as_ref()
    }

    /// Request key of the applied layout
    pub fn layout_key(&self) -> Option<&str> {
        self.layout_key.as_deref()
    }

    pub fn last_request(&self) -> Option<&LayoutRequest> {
        self.last_request.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Start a request; any earlier pending request becomes stale
    pub fn begin(&mut self, request: LayoutRequest) -> RequestToken {
        self.issued += 1;
        let token = RequestToken(self.issued);
        debug!(token = token.0, nesting_id = %request.nesting_id, "layout request issued");
        self.pending = Some(token);
        self.last_request = Some(request);
        self.status = ViewStatus::Loading;
        token
    }

    /// Re-issue the last request, if there was one
    pub fn retry(&mut self) -> Option<(RequestToken, LayoutRequest)> {
        let request = self.last_request.clone()?;
        Some((self.begin(request.clone()), request))
    }

    /// Apply the result of request `token` unless a newer request exists
    pub fn resolve(
        &mut self,
        token: RequestToken,
        result: Result<LayoutResponse, LoadError>,
    ) -> Resolution {
        if self.pending != Some(token) {
            warn!(
                token = token.0,
                latest = self.issued,
                "discarding stale layout response"
            );
            return Resolution::Stale;
        }
        self.pending = None;

        match result.and_then(LayoutResponse::into_payload) {
            Ok(payload) => {
                let layout = NestingLayout::from_payload(&payload, &self.canvas, &self.packer);
                debug!(
                    positioned = layout.positioned.len(),
                    items = layout.items.len(),
                    "layout applied"
                );
                self.layout = Some(layout);
                self.layout_key = self.last_request.as_ref().map(LayoutRequest::key);
                self.status = ViewStatus::Ready;
            }
            Err(err) => {
                warn!(error = %err, "layout request failed");
                self.status = ViewStatus::Failed {
                    message: err.to_string(),
                    retryable: err.is_retryable(),
                };
            }
        }
        Resolution::Applied
    }

    /// Show a layout obtained elsewhere, dropping any pending request
    pub fn replace(&mut self, layout: NestingLayout, key: impl Into<String>) {
        self.pending = None;
        self.layout = Some(layout);
        self.layout_key = Some(key.into());
        self.status = ViewStatus::Ready;
    }

    /// Begin, fetch and resolve in one step
    pub fn load(&mut self, source: &dyn LayoutSource, request: LayoutRequest) -> Resolution {
        let token = self.begin(request.clone());
        let result = source.fetch(&request);
        self.resolve(token, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session() -> LayoutSession {
        LayoutSession::new(CanvasConfig::default(), PackerConfig::default())
    }

    fn response(length: f64) -> LayoutResponse {
        serde_json::from_value(json!({
            "success": true,
            "layoutData": {
                "surface": { "lengthMm": length, "widthMm": 800 },
                "items": [{ "itemId": 1, "widthMm": 100, "heightMm": 50 }],
                "placements": [{ "itemId": 1, "x": 0, "y": 0, "width": 100, "height": 50 }]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut session = session();
        let first = session.begin(LayoutRequest::new("A"));
        let second = session.begin(LayoutRequest::new("B"));

        assert_eq!(session.resolve(second, Ok(response(2000.0))), Resolution::Applied);
        assert_eq!(session.resolve(first, Ok(response(1000.0))), Resolution::Stale);

        let layout = session.layout().unwrap();
        assert_eq!(layout.surface.length_mm, 2000.0);
        assert_eq!(session.layout_key(), Some(LayoutRequest::new("B").key().as_str()));
    }

    #[test]
    fn test_stale_response_is_dropped_when_it_arrives_first() {
        let mut session = session();
        let first = session.begin(LayoutRequest::new("A"));
        let second = session.begin(LayoutRequest::new("B"));

        assert_eq!(session.resolve(first, Ok(response(1000.0))), Resolution::Stale);
        assert_eq!(*session.status(), ViewStatus::Loading);
        assert_eq!(session.resolve(second, Ok(response(2000.0))), Resolution::Applied);
        assert_eq!(session.layout().unwrap().surface.length_mm, 2000.0);
    }

    #[test]
    fn test_same_token_resolves_once() {
        let mut session = session();
        let token = session.begin(LayoutRequest::new("A"));
        assert_eq!(session.resolve(token, Ok(response(1000.0))), Resolution::Applied);
        assert_eq!(session.resolve(token, Ok(response(3000.0))), Resolution::Stale);
        assert_eq!(session.layout().unwrap().surface.length_mm, 1000.0);
    }

    #[test]
    fn test_rejected_response_fails_with_message() {
        let mut session = session();
        let token = session.begin(LayoutRequest::new("A"));
        let rejected = LayoutResponse {
            success: false,
            layout_data: None,
            message: Some("nesting not found".to_string()),
        };
        session.resolve(token, Ok(rejected));
        assert_eq!(
            *session.status(),
            ViewStatus::Failed {
                message: "layout request rejected: nesting not found".to_string(),
                retryable: true,
            }
        );
        assert!(session.layout().is_none());
    }

    #[test]
    fn test_retry_reissues_last_request() {
        let mut session = session();
        assert!(session.retry().is_none());

        let request = LayoutRequest::new("A").with_params(LayoutParams {
            rotation_enabled: false,
            ..LayoutParams::default()
        });
        let token = session.begin(request.clone());
        session.resolve(token, Err(LoadError::Transport("timeout".to_string())));

        let (retry_token, retried) = session.retry().unwrap();
        assert!(retry_token > token);
        assert_eq!(retried, request);
        assert_eq!(*session.status(), ViewStatus::Loading);
    }

    #[test]
    fn test_response_from_bare_payload() {
        let text = r#"{ "surface": { "lunghezza": 1200, "larghezza_piano": 900 }, "tools": [] }"#;
        let response = LayoutResponse::from_json(text).unwrap();
        assert!(response.success);
        let payload = response.into_payload().unwrap();
        assert!(payload.surface.is_some());
        assert_eq!(payload.items, Some(vec![]));
    }

    #[test]
    fn test_missing_layout_data() {
        let response = LayoutResponse::from_json(r#"{ "success": true }"#).unwrap();
        assert!(matches!(response.into_payload(), Err(LoadError::MissingLayout)));
    }

    #[test]
    fn test_closure_source() {
        let source = |request: &LayoutRequest| {
            if request.nesting_id == "42" {
                Ok(response(1500.0))
            } else {
                Err(LoadError::Transport("unreachable".to_string()))
            }
        };
        let mut session = session();
        session.load(&source, LayoutRequest::new("42"));
        assert_eq!(*session.status(), ViewStatus::Ready);
        session.load(&source, LayoutRequest::new("7"));
        assert!(matches!(session.status(), ViewStatus::Failed { retryable: true, .. }));
        // the previous layout stays available
        assert!(session.layout().is_some());
    }

    #[test]
    fn test_request_key_tracks_params() {
        let a = LayoutRequest::new("1");
        let b = LayoutRequest::new("1").with_params(LayoutParams {
            padding_mm: 15.0,
            ..LayoutParams::default()
        });
        assert_ne!(a.key(), b.key());
        assert_eq!(a.key(), LayoutRequest::new("1").key());
    }
}
