pub mod bridge;
pub mod config;
pub mod headless;
pub mod logging;
pub mod overlay;
pub mod rect;
pub mod repl;
pub mod sdk;
pub mod window;

pub use bridge::{Bridge, BridgeError};
pub use overlay::{OverlayError, OverlayManager};
pub use rect::Rect;
pub use sdk::{RecordingSdk, SdkService};
