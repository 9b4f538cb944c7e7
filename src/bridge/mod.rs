//! Bridge layer
//!
//! Exposes SDK and overlay operations to the application shell. Each
//! operation takes a flat JSON parameter object, validates it, delegates to
//! the [`SdkService`] or the [`OverlayManager`], and returns either a
//! `{"status": ...}` payload or a [`BridgeError`] whose text is shown to the
//! caller.

mod error;
mod params;


pub use error::{BridgeError, ErrorKind};
pub use params::{Params, required_rect};

use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::overlay::{OverlayKind, OverlayManager};
use crate::sdk::SdkService;
use crate::window::WindowId;

use params::{optional_bool, required_id, required_object, required_str};

/// Event sent after an overlay is registered
pub const WIDGET_OPEN_EVENT: &str = "widget_open";

/// Page name recorded on initialize
const DEFAULT_PAGE_NAME: &str = "app";

pub struct Bridge {
    sdk: Arc<dyn SdkService>,
    overlays: OverlayManager,
}

impl Bridge {
    pub fn new(sdk: Arc<dyn SdkService>, overlays: OverlayManager) -> Self {
        Self { sdk, overlays }
    }

    pub fn overlays(&self) -> &OverlayManager {
        &self.overlays
    }

    pub fn sdk(&self) -> &Arc<dyn SdkService> {
        &self.sdk
    }

    /// Dispatch a call by its method name
    pub async fn call(&self, method: &str, params: &Params) -> Result<Value, BridgeError> {
        debug!(method, "bridge call");
        match method {
            "initialize" => self.initialize(params).await,
            "login" => self.login(params),
            "getDeviceHeaders" => Ok(self.get_device_headers()),
            "sendEvent" => self.send_event(params).await,
            "setPageName" => self.set_page_name(params).await,
            "registerPlaceholder" => self.register_placeholder(params).await,
            "unregisterPlaceholder" => self.unregister_placeholder(params).await,
            "registerTooltipTarget" => self.register_tooltip_target(params).await,
            "unregisterTooltipTarget" => self.unregister_tooltip_target(params).await,
            other => Err(BridgeError::UnknownMethod(other.to_string())),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // SDK Operations
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn initialize(&self, params: &Params) -> Result<Value, BridgeError> {
        let identifier = required_str(params, "identifier")?;
        let sandbox = optional_bool(params, "sandbox", false);

        self.sdk
            .initialize(identifier, sandbox)
            .map_err(|e| BridgeError::sdk("initialize", e))?;
        if let Some(window) = self.foreground_window().await {
            self.sdk.set_page_name(Some(window), DEFAULT_PAGE_NAME);
        }

        info!(sandbox, "bridge initialized");
        Ok(status("initialized"))
    }

    pub fn login(&self, params: &Params) -> Result<Value, BridgeError> {
        let user_id = required_str(params, "userId")?;
        self.sdk
            .login(user_id)
            .map_err(|e| BridgeError::sdk("login", e))?;
        Ok(status("logged_in"))
    }

    pub fn get_device_headers(&self) -> Value {
        let headers: Map<String, Value> = self
            .sdk
            .device_headers()
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        Value::Object(headers)
    }

    pub async fn send_event(&self, params: &Params) -> Result<Value, BridgeError> {
        let event_name = required_str(params, "eventName")?;
        let event_data = required_object(params, "eventData")?;

        if let Some(window) = self.foreground_window().await {
            self.sdk.set_current_window(Some(window));
        }
        self.sdk
            .send_event(event_name, event_data)
            .map_err(|e| BridgeError::sdk("send event", e))?;
        Ok(status("event_sent"))
    }

    pub async fn set_page_name(&self, params: &Params) -> Result<Value, BridgeError> {
        let page_name = required_str(params, "pageName")?;
        let window = self.foreground_window().await;
        self.sdk.set_page_name(window, page_name);
        Ok(status("page_set"))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Overlay Operations
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn register_placeholder(&self, params: &Params) -> Result<Value, BridgeError> {
        self.register_overlay(OverlayKind::Placeholder, params).await?;
        Ok(status("placeholder_registration_initiated"))
    }

    pub async fn unregister_placeholder(&self, params: &Params) -> Result<Value, BridgeError> {
        self.unregister_overlay(OverlayKind::Placeholder, params).await?;
        Ok(status("placeholder_unregistered"))
    }

    pub async fn register_tooltip_target(&self, params: &Params) -> Result<Value, BridgeError> {
        self.register_overlay(OverlayKind::TooltipTarget, params).await?;
        Ok(status("tooltip_target_registration_initiated"))
    }

    pub async fn unregister_tooltip_target(&self, params: &Params) -> Result<Value, BridgeError> {
        self.unregister_overlay(OverlayKind::TooltipTarget, params).await?;
        Ok(status("tooltip_target_unregistered"))
    }

    async fn register_overlay(&self, kind: OverlayKind, params: &Params) -> Result<(), BridgeError> {
        let identifier = required_id(params, kind.id_param())?;
        let rect = required_rect(params)?;
        let action = match kind {
            OverlayKind::Placeholder => "register placeholder",
            OverlayKind::TooltipTarget => "register tooltip target",
        };

        self.overlays
            .register(kind, identifier, rect)
            .await
            .map_err(|e| BridgeError::overlay(action, e))?;

        let mut data = Map::new();
        data.insert("compare".to_string(), Value::String(identifier.to_string()));
        if let Err(e) = self.sdk.send_event(WIDGET_OPEN_EVENT, &data) {
            warn!(%kind, identifier, error = %e, "failed to send widget_open event");
        }
        Ok(())
    }

    async fn unregister_overlay(&self, kind: OverlayKind, params: &Params) -> Result<(), BridgeError> {
        let identifier = required_id(params, kind.id_param())?;
        let action = match kind {
            OverlayKind::Placeholder => "unregister placeholder",
            OverlayKind::TooltipTarget => "unregister tooltip target",
        };

        let removed = self
            .overlays
            .unregister(kind, identifier)
            .await
            .map_err(|e| BridgeError::overlay(action, e))?;
        if !removed {
            debug!(%kind, identifier, "nothing to unregister");
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Stop the overlay context (removing every overlay), then the SDK
    pub async fn shutdown(&self) {
        self.overlays.shutdown().await;
        self.sdk.shutdown();
    }

    async fn foreground_window(&self) -> Option<WindowId> {
        match self.overlays.foreground().await {
            Ok(window) => window,
            Err(e) => {
                debug!(error = %e, "foreground window unavailable");
                None
            }
        }
    }
}

fn status(status: &str) -> Value {
    json!({ "status": status })
}
