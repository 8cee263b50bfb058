//! The document trait.

use serde::{Deserialize, Serialize};

use super::dom_types::ViewportInfo;
use super::element::{ElementId, ElementInfo};
use crate::error::DomError;

/// Which browsing context an element lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameId {
    Main,
    /// Embedded frame by zero-based index in document order.
    Embedded(usize),
}

/// An embedded frame as seen from the main page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameInfo {
    pub index: usize,
    #[serde(default)]
    pub src: String,
    /// Whether the frame's document can be read (same-origin).
    pub accessible: bool,
}

/// Synthetic events the writer dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomEvent {
    Focus,
    Input,
    Change,
    KeyDown,
    KeyUp,
    Blur,
}

/// A page the pipeline can scan and mutate.
///
/// All operations are synchronous; the pipeline processes one field at a time.
pub trait Document: Send {
    fn url(&self) -> &str;

    fn title(&self) -> &str;

    /// Text content of the body, used for form-purpose detection.
    fn body_text(&self) -> String;

    fn viewport(&self) -> ViewportInfo;

    /// All embedded frames, accessible or not.
    fn frames(&self) -> Vec<FrameInfo>;

    /// All elements of a frame in document order.
    ///
    /// Cross-origin frames return [`DomError::CrossOrigin`].
    fn elements(&self, frame: FrameId) -> Result<Vec<ElementInfo>, DomError>;

    /// Text of the `label[for=id]` element in the given frame.
    fn label_for(&self, frame: FrameId, id: &str) -> Option<String>;

    /// Set the value property.
    fn set_value(&mut self, element: ElementId, value: &str) -> Result<(), DomError>;

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) -> Result<(), DomError>;

    /// Set the default-value property (what a form reset restores).
    fn set_default_value(&mut self, element: ElementId, value: &str) -> Result<(), DomError>;

    fn set_checked(&mut self, element: ElementId, checked: bool) -> Result<(), DomError>;

    /// Dispatch a bubbling, cancelable event. Focus also moves focus.
    fn dispatch_event(&mut self, element: ElementId, event: DomEvent) -> Result<(), DomError>;

    /// Apply or remove the "just filled" highlight styling.
    fn set_highlight(&mut self, element: ElementId, on: bool) -> Result<(), DomError>;
}
