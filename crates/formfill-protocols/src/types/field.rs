//! Field descriptors produced by the extractor.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dom::ElementId;

/// Kind of a free-text style control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextKind {
    Text,
    Email,
    Password,
    Tel,
    Number,
    Url,
    Search,
    Date,
    Time,
    DatetimeLocal,
    Month,
    Week,
    Color,
    File,
    Range,
    Textarea,
    Custom,
}

impl TextKind {
    /// Map an `<input type=...>` value. Types that are not fillable
    /// (hidden, submit, button, ...) map to `None`.
    pub fn from_input_type(input_type: &str) -> Option<Self> {
        let kind = match input_type {
            "text" => Self::Text,
            "email" => Self::Email,
            "password" => Self::Password,
            "tel" => Self::Tel,
            "number" => Self::Number,
            "url" => Self::Url,
            "search" => Self::Search,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime-local" => Self::DatetimeLocal,
            "month" => Self::Month,
            "week" => Self::Week,
            "color" => Self::Color,
            "file" => Self::File,
            "range" => Self::Range,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Tel => "tel",
            Self::Number => "number",
            Self::Url => "url",
            Self::Search => "search",
            Self::Date => "date",
            Self::Time => "time",
            Self::DatetimeLocal => "datetime-local",
            Self::Month => "month",
            Self::Week => "week",
            Self::Color => "color",
            Self::File => "file",
            Self::Range => "range",
            Self::Textarea => "textarea",
            Self::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleKind {
    Checkbox,
    Radio,
}

/// One choice of a closed option set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

/// How a field accepts a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum FieldControl {
    Text { kind: TextKind },
    Selection { options: Vec<SelectOption> },
    Toggle { kind: ToggleKind },
}

impl FieldControl {
    /// Short type name used in prompts and rule matching.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text { kind } => kind.as_str(),
            Self::Selection { .. } => "select",
            Self::Toggle {
                kind: ToggleKind::Checkbox,
            } => "checkbox",
            Self::Toggle {
                kind: ToggleKind::Radio,
            } => "radio",
        }
    }
}

/// Where a field was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    MainPage,
    /// One-based frame number.
    Frame(usize),
}

impl fmt::Display for FieldSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MainPage => write!(f, "main-page"),
            Self::Frame(n) => write!(f, "iframe-{}", n),
        }
    }
}

/// Normalized metadata for one candidate form input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub element: ElementId,
    #[serde(flatten)]
    pub control: FieldControl,
    /// `name`, else `id`, else empty.
    pub identifier: String,
    pub placeholder: String,
    pub label: String,
    pub required: bool,
    pub current_value: String,
    pub source: FieldSource,
}

impl FieldDescriptor {
    pub fn kind_name(&self) -> &'static str {
        self.control.kind_name()
    }

    /// Options of a selection field, empty for other controls.
    pub fn options(&self) -> &[SelectOption] {
        match &self.control {
            FieldControl::Selection { options } => options,
            _ => &[],
        }
    }
}

#[cfg(test)]
#[path = "field_tests.rs"]
mod tests;
