//! Shared geometry types: viewport, bounding box, and computed style.

use serde::{Deserialize, Serialize};

/// Viewport information for visibility checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportInfo {
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
}

impl Default for ViewportInfo {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Bounding box for an element, in viewport coordinates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Zero width or zero height.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if this box is inside the viewport at all.
    ///
    /// Edge semantics follow `getBoundingClientRect`: a box whose bottom edge
    /// sits exactly on the top of the viewport does not intersect it.
    pub fn intersects_viewport(&self, viewport: &ViewportInfo) -> bool {
        self.y < viewport.height as f64
            && self.y + self.height > 0.0
            && self.x < viewport.width as f64
            && self.x + self.width > 0.0
    }
}

/// The slice of computed style the pipeline cares about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputedStyle {
    #[serde(default = "default_display")]
    pub display: String,
    #[serde(default = "default_visibility")]
    pub visibility: String,
}

fn default_display() -> String {
    "inline-block".to_string()
}

fn default_visibility() -> String {
    "visible".to_string()
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: default_display(),
            visibility: default_visibility(),
        }
    }
}

impl ComputedStyle {
    /// `display: none` or `visibility: hidden`.
    pub fn is_hidden(&self) -> bool {
        self.display == "none" || self.visibility == "hidden"
    }
}
