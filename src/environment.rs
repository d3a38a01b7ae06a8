//! The host capabilities the monitor depends on.
//!
//! A browser shell implements [`ProctorEnvironment`] by forwarding DOM
//! notifications (`fullscreenchange` and its vendor-prefixed variants,
//! `visibilitychange`, window `blur`, blocked clipboard events) into the
//! channel returned by [`ProctorEnvironment::subscribe`]. Dropping the
//! receiver is the unsubscribe.

use async_trait::async_trait;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::EnvironmentError;

/// Which flavour of the fullscreen-change notification fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FullscreenVendor {
    Standard,
    Webkit,
    Moz,
    Ms,
}

/// Element holding focus when the window lost focus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActiveElement {
    Body,
    Element(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClipboardAction {
    ContextMenu,
    Copy,
    Paste,
    Cut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum EnvironmentEvent {
    FullscreenChanged {
        is_fullscreen: bool,
        vendor: FullscreenVendor,
    },
    VisibilityChanged {
        hidden: bool,
    },
    WindowBlur {
        active_element: ActiveElement,
    },
    /// A clipboard or context-menu action was suppressed.
    ClipboardBlocked {
        action: ClipboardAction,
    },
}

/// Live webcam stream owned by the monitor for the session's lifetime.
#[async_trait]
pub trait CameraStream: Send + Sync {
    async fn capture_frame(&self) -> Result<RgbaImage, EnvironmentError>;

    /// Release the camera tracks. Must be idempotent.
    fn stop(&self);
}

#[async_trait]
pub trait ProctorEnvironment: Send + Sync {
    /// Register for platform notifications.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<EnvironmentEvent>;

    async fn request_fullscreen(&self) -> Result<(), EnvironmentError>;

    fn is_fullscreen(&self) -> bool;

    /// Toggle suppression of context-menu, copy, paste and cut.
    fn set_clipboard_blocked(&self, blocked: bool);

    /// Open the webcam (video only).
    async fn open_camera(&self) -> Result<Box<dyn CameraStream>, EnvironmentError>;

    /// Leave the monitored view.
    fn navigate(&self, path: &str);
}
