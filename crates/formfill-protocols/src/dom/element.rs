//! Element snapshots handed from a document to the extractor.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::dom_types::{BoundingBox, ComputedStyle};

/// Page-wide element handle. Unique across the main page and its frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node attributes relevant to form filling.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NodeAttributes {
    /// Element ID attribute.
    pub id: Option<String>,
    /// Name attribute.
    pub name: Option<String>,
    /// Type attribute.
    pub r#type: Option<String>,
    /// Placeholder text.
    pub placeholder: Option<String>,
    /// Title attribute.
    pub title: Option<String>,
    /// Aria-label.
    pub aria_label: Option<String>,
    /// Role attribute (ARIA).
    pub role: Option<String>,
    /// Contenteditable attribute.
    pub contenteditable: Option<String>,
    /// Required attribute present.
    #[serde(default)]
    pub required: bool,
    /// Data attributes, keyed without the `data-` prefix.
    #[serde(default)]
    pub data: HashMap<String, String>,
}

/// One `<option>` of a select element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionInfo {
    pub value: String,
    #[serde(default)]
    pub text: String,
}

/// Read-only view of one element at scan time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementInfo {
    pub id: ElementId,

    /// Tag name (lowercase).
    pub tag_name: String,

    #[serde(default)]
    pub attributes: NodeAttributes,

    #[serde(default)]
    pub style: ComputedStyle,

    /// Bounding box in viewport coordinates.
    #[serde(default)]
    pub bounding_box: BoundingBox,

    /// Current value property.
    #[serde(default)]
    pub value: String,

    /// Text content (used for contenteditable widgets).
    #[serde(default)]
    pub text_content: String,

    /// Options, for select elements.
    #[serde(default)]
    pub options: Vec<OptionInfo>,

    #[serde(default)]
    pub checked: bool,

    /// Direct text-node children of the parent element, in order.
    #[serde(default)]
    pub parent_text: Vec<String>,
}

impl ElementInfo {
    /// The `type` attribute, lowercased, if present.
    pub fn input_type(&self) -> Option<String> {
        self.attributes.r#type.as_ref().map(|t| t.to_lowercase())
    }

    pub fn data_attr(&self, key: &str) -> Option<&str> {
        self.attributes.data.get(key).map(String::as_str)
    }
}
