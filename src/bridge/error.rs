use thiserror::Error;

use crate::overlay::OverlayError;
use crate::sdk::SdkError;

/// Failure categories a caller can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NoForegroundWindow,
    ViewFailure,
    Sdk,
    Unavailable,
}

/// Errors returned to bridge callers. The `Display` text is the message the
/// caller sees.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("{0}")]
    Validation(String),

    #[error("unknown method: {0}")]
    UnknownMethod(String),

    #[error("Failed to {action}: {source}")]
    Overlay {
        action: &'static str,
        #[source]
        source: OverlayError,
    },

    #[error("Failed to {action}: {source}")]
    Sdk {
        action: &'static str,
        #[source]
        source: SdkError,
    },
}

impl BridgeError {
    pub fn overlay(action: &'static str, source: OverlayError) -> Self {
        match source {
            // Validation messages reach the caller verbatim
            OverlayError::Validation(msg) => Self::Validation(msg),
            source => Self::Overlay { action, source },
        }
    }

    pub fn sdk(action: &'static str, source: SdkError) -> Self {
        Self::Sdk { action, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::UnknownMethod(_) => ErrorKind::Validation,
            Self::Overlay { source, .. } => match source {
                OverlayError::Validation(_) => ErrorKind::Validation,
                OverlayError::NoForegroundWindow => ErrorKind::NoForegroundWindow,
                OverlayError::View(_) | OverlayError::UnknownTarget { .. } => {
                    ErrorKind::ViewFailure
                }
                OverlayError::ContextClosed | OverlayError::Spawn(_) => ErrorKind::Unavailable,
            },
            Self::Sdk { .. } => ErrorKind::Sdk,
        }
    }
}
