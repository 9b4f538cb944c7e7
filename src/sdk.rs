//! Analytics SDK service
//!
//! The bridge never reaches for a process-wide SDK instance. The entry point
//! constructs an [`SdkService`] and hands it to the bridge, and owns its
//! shutdown.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::window::WindowId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SdkError {
    #[error("SDK is not initialized")]
    NotInitialized,

    #[error("invalid identifier format, expected tenant$channel, got: {identifier}")]
    InvalidIdentifier { identifier: String },

    #[error("{0}")]
    Rejected(String),
}

/// Operations the bridge delegates to the SDK
pub trait SdkService: Send + Sync {
    fn initialize(&self, identifier: &str, sandbox: bool) -> Result<(), SdkError>;

    fn login(&self, user_id: &str) -> Result<(), SdkError>;

    fn device_headers(&self) -> BTreeMap<String, String>;

    fn send_event(&self, name: &str, data: &Map<String, Value>) -> Result<(), SdkError>;

    /// Record the page the user is on. A `Some` window also becomes the
    /// current window.
    fn set_page_name(&self, window: Option<WindowId>, name: &str);

    /// Track the foreground window without emitting a page event
    fn set_current_window(&self, window: Option<WindowId>);

    fn shutdown(&self) {}
}

// ─────────────────────────────────────────────────────────────────────────────
// Recording SDK
// ─────────────────────────────────────────────────────────────────────────────

/// Tenant and channel parsed from a `tenant$channel` identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkSession {
    pub tenant: String,
    pub channel_id: String,
    pub sandbox: bool,
}

impl SdkSession {
    pub fn parse(identifier: &str, sandbox: bool) -> Result<Self, SdkError> {
        match identifier.split('$').collect::<Vec<_>>().as_slice() {
            [tenant, channel] => Ok(Self {
                tenant: tenant.to_string(),
                channel_id: channel.to_string(),
                sandbox,
            }),
            _ => Err(SdkError::InvalidIdentifier {
                identifier: identifier.to_string(),
            }),
        }
    }

    pub fn server_url(&self) -> String {
        if self.sandbox {
            format!("https://{}.pushapp.com", self.tenant)
        } else {
            format!("https://{}.pushapp.co.in", self.tenant)
        }
    }
}

/// An event as the SDK received it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub name: String,
    pub data: Map<String, Value>,
    pub user_id: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Default)]
struct RecorderState {
    session: Option<SdkSession>,
    user_id: Option<String>,
    page: Option<String>,
    current_window: Option<WindowId>,
    events: Vec<RecordedEvent>,
}

/// In-process SDK that records everything it is asked to do.
///
/// Used by the shell and the tests; a real SDK would transmit instead.
#[derive(Debug)]
pub struct RecordingSdk {
    device_id: String,
    state: Mutex<RecorderState>,
}

impl RecordingSdk {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            state: Mutex::new(RecorderState::default()),
        }
    }

    pub fn session(&self) -> Option<SdkSession> {
        self.lock().session.clone()
    }

    pub fn user_id(&self) -> Option<String> {
        self.lock().user_id.clone()
    }

    pub fn page(&self) -> Option<String> {
        self.lock().page.clone()
    }

    pub fn current_window(&self) -> Option<WindowId> {
        self.lock().current_window
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.lock().events.clone()
    }

    /// Events with the given name
    pub fn events_named(&self, name: &str) -> Vec<RecordedEvent> {
        self.lock()
            .events
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, RecorderState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SdkService for RecordingSdk {
    fn initialize(&self, identifier: &str, sandbox: bool) -> Result<(), SdkError> {
        let mut state = self.lock();
        if state.session.is_some() {
            debug!("SDK already initialized");
            return Ok(());
        }
        let session = SdkSession::parse(identifier, sandbox)?;
        info!(
            tenant = %session.tenant,
            channel = %session.channel_id,
            server = %session.server_url(),
            sandbox,
            "SDK initialized"
        );
        state.session = Some(session);
        Ok(())
    }

    fn login(&self, user_id: &str) -> Result<(), SdkError> {
        let mut state = self.lock();
        if state.session.is_none() {
            return Err(SdkError::NotInitialized);
        }
        info!(user_id, "user logged in");
        state.user_id = Some(user_id.to_string());
        Ok(())
    }

    fn device_headers(&self) -> BTreeMap<String, String> {
        let state = self.lock();
        let mut headers = BTreeMap::new();
        headers.insert("X-Device-ID".to_string(), self.device_id.clone());
        headers.insert(
            "X-OS-Name".to_string(),
            std::env::consts::OS.to_uppercase(),
        );
        headers.insert("X-CPU-ABI".to_string(), std::env::consts::ARCH.to_string());
        headers.insert(
            "X-SDK-Version".to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );
        if let Some(session) = &state.session {
            headers.insert("X-Bundle-ID".to_string(), session.channel_id.clone());
        }
        headers
    }

    fn send_event(&self, name: &str, data: &Map<String, Value>) -> Result<(), SdkError> {
        let mut state = self.lock();
        if state.session.is_none() {
            return Err(SdkError::NotInitialized);
        }
        debug!(event = name, fields = data.len(), "event recorded");
        let event = RecordedEvent {
            name: name.to_string(),
            data: data.clone(),
            user_id: state.user_id.clone(),
            page: state.page.clone(),
        };
        state.events.push(event);
        Ok(())
    }

    fn set_page_name(&self, window: Option<WindowId>, name: &str) {
        let mut state = self.lock();
        debug!(page = name, ?window, "page name set");
        state.page = Some(name.to_string());
        if window.is_some() {
            state.current_window = window;
        }
    }

    fn set_current_window(&self, window: Option<WindowId>) {
        self.lock().current_window = window;
    }

    fn shutdown(&self) {
        let state = self.lock();
        info!(events = state.events.len(), "SDK shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_parses_tenant_and_channel() {
        let session = SdkSession::parse("acme$web_1", false).unwrap();
        assert_eq!(session.tenant, "acme");
        assert_eq!(session.channel_id, "web_1");
        assert_eq!(session.server_url(), "https://acme.pushapp.co.in");

        let sandbox = SdkSession::parse("acme$web_1", true).unwrap();
        assert_eq!(sandbox.server_url(), "https://acme.pushapp.com");
    }

    #[test]
    fn session_rejects_malformed_identifier() {
        assert!(matches!(
            SdkSession::parse("acme", false),
            Err(SdkError::InvalidIdentifier { .. })
        ));
        assert!(SdkSession::parse("a$b$c", false).is_err());
    }

    #[test]
    fn events_require_initialization() {
        let sdk = RecordingSdk::new("device-1");
        assert_eq!(
            sdk.send_event("app_open", &Map::new()),
            Err(SdkError::NotInitialized)
        );

        sdk.initialize("acme$web", false).unwrap();
        sdk.login("user-42").unwrap();
        sdk.set_page_name(Some(WindowId(1)), "home");
        sdk.send_event("app_open", &Map::new()).unwrap();

        let events = sdk.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].user_id.as_deref(), Some("user-42"));
        assert_eq!(events[0].page.as_deref(), Some("home"));
        assert_eq!(sdk.current_window(), Some(WindowId(1)));
    }

    #[test]
    fn second_initialize_is_ignored() {
        let sdk = RecordingSdk::new("device-1");
        sdk.initialize("acme$web", false).unwrap();
        sdk.initialize("other$app", true).unwrap();
        assert_eq!(sdk.session().unwrap().tenant, "acme");
    }

    #[test]
    fn headers_include_device_and_bundle() {
        let sdk = RecordingSdk::new("device-1");
        sdk.initialize("acme$web", false).unwrap();
        let headers = sdk.device_headers();
        assert_eq!(headers["X-Device-ID"], "device-1");
        assert_eq!(headers["X-Bundle-ID"], "web");
        assert!(headers.contains_key("X-OS-Name"));
    }
}
