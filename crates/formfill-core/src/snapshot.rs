//! A serde-loadable page model implementing [`Document`].
//!
//! Used by the CLI to fill pages captured as JSON, and by tests. Every
//! mutation and dispatched event is recorded in order so the effect of a
//! fill can be inspected afterwards.

use std::collections::BTreeSet;

use serde::de::Error as _;
use serde::{Deserialize, Serialize};

use formfill_protocols::dom::{
    Document, DomEvent, ElementId, ElementInfo, FrameId, FrameInfo, ViewportInfo,
};
use formfill_protocols::error::DomError;

/// `<label for=...>` text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelInfo {
    #[serde(rename = "for")]
    pub for_id: String,
    pub text: String,
}

/// An embedded frame and, when same-origin, its content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    #[serde(default)]
    pub src: String,
    #[serde(default = "default_accessible")]
    pub accessible: bool,
    #[serde(default)]
    pub elements: Vec<ElementInfo>,
    #[serde(default)]
    pub labels: Vec<LabelInfo>,
}

fn default_accessible() -> bool {
    true
}

/// One recorded change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mutation {
    Value { element: ElementId, value: String },
    Attribute { element: ElementId, name: String, value: String },
    DefaultValue { element: ElementId, value: String },
    Checked { element: ElementId, checked: bool },
    Event { element: ElementId, event: DomEvent },
    Highlight { element: ElementId, on: bool },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body_text: String,
    #[serde(default)]
    pub viewport: ViewportInfo,
    #[serde(default)]
    pub elements: Vec<ElementInfo>,
    #[serde(default)]
    pub labels: Vec<LabelInfo>,
    #[serde(default)]
    pub frames: Vec<FrameSnapshot>,
    /// Change log, oldest first.
    #[serde(default, skip_deserializing)]
    pub mutations: Vec<Mutation>,
    #[serde(skip)]
    highlighted: BTreeSet<ElementId>,
    #[serde(skip)]
    focused: Option<ElementId>,
}

impl PageSnapshot {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Parse a page. Element ids must be unique across the main page and
    /// every frame.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let page: Self = serde_json::from_str(json)?;
        page.validate().map_err(serde_json::Error::custom)?;
        Ok(page)
    }

    /// Check that no element id is used twice.
    pub fn validate(&self) -> Result<(), DomError> {
        let mut seen = BTreeSet::new();
        for element in self
            .elements
            .iter()
            .chain(self.frames.iter().flat_map(|f| f.elements.iter()))
        {
            if !seen.insert(element.id) {
                return Err(DomError::DuplicateElement(element.id.0));
            }
        }
        Ok(())
    }

    pub fn with_element(mut self, element: ElementInfo) -> Self {
        self.elements.push(element);
        self
    }

    pub fn with_label(mut self, for_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.labels.push(LabelInfo {
            for_id: for_id.into(),
            text: text.into(),
        });
        self
    }

    pub fn with_frame(mut self, frame: FrameSnapshot) -> Self {
        self.frames.push(frame);
        self
    }

    pub fn element(&self, id: ElementId) -> Option<&ElementInfo> {
        self.elements
            .iter()
            .chain(self.frames.iter().flat_map(|f| f.elements.iter()))
            .find(|e| e.id == id)
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut ElementInfo, DomError> {
        self.elements
            .iter_mut()
            .chain(self.frames.iter_mut().flat_map(|f| f.elements.iter_mut()))
            .find(|e| e.id == id)
            .ok_or(DomError::ElementNotFound(id.0))
    }

    /// Events dispatched to one element, in order.
    pub fn events_for(&self, id: ElementId) -> Vec<DomEvent> {
        self.mutations
            .iter()
            .filter_map(|m| match m {
                Mutation::Event { element, event } if *element == id => Some(*event),
                _ => None,
            })
            .collect()
    }

    /// Last default value written to an element.
    pub fn default_value(&self, id: ElementId) -> Option<&str> {
        self.mutations.iter().rev().find_map(|m| match m {
            Mutation::DefaultValue { element, value } if *element == id => Some(value.as_str()),
            _ => None,
        })
    }

    /// Last `value` attribute written to an element.
    pub fn value_attribute(&self, id: ElementId) -> Option<&str> {
        self.mutations.iter().rev().find_map(|m| match m {
            Mutation::Attribute { element, name, value } if *element == id && name == "value" => {
                Some(value.as_str())
            }
            _ => None,
        })
    }

    pub fn is_highlighted(&self, id: ElementId) -> bool {
        self.highlighted.contains(&id)
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    fn frame(&self, index: usize) -> Result<&FrameSnapshot, DomError> {
        let frame = self
            .frames
            .get(index)
            .ok_or(DomError::FrameNotFound(index))?;
        if !frame.accessible {
            return Err(DomError::CrossOrigin { index });
        }
        Ok(frame)
    }
}

impl Document for PageSnapshot {
    fn url(&self) -> &str {
        &self.url
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn body_text(&self) -> String {
        self.body_text.clone()
    }

    fn viewport(&self) -> ViewportInfo {
        self.viewport.clone()
    }

    fn frames(&self) -> Vec<FrameInfo> {
        self.frames
            .iter()
            .enumerate()
            .map(|(index, f)| FrameInfo {
                index,
                src: f.src.clone(),
                accessible: f.accessible,
            })
            .collect()
    }

    fn elements(&self, frame: FrameId) -> Result<Vec<ElementInfo>, DomError> {
        match frame {
            FrameId::Main => Ok(self.elements.clone()),
            FrameId::Embedded(index) => Ok(self.frame(index)?.elements.clone()),
        }
    }

    fn label_for(&self, frame: FrameId, id: &str) -> Option<String> {
        let labels = match frame {
            FrameId::Main => &self.labels,
            FrameId::Embedded(index) => &self.frame(index).ok()?.labels,
        };
        labels
            .iter()
            .find(|l| l.for_id == id)
            .map(|l| l.text.trim().to_string())
    }

    fn set_value(&mut self, element: ElementId, value: &str) -> Result<(), DomError> {
        let el = self.element_mut(element)?;
        if el.input_type().as_deref() == Some("file") && !value.is_empty() {
            return Err(DomError::InvalidState(
                "file inputs only accept an empty value".to_string(),
            ));
        }
        if el.tag_name == "select" {
            // A select only takes values of its own options.
            el.value = if el.options.iter().any(|o| o.value == value) {
                value.to_string()
            } else {
                String::new()
            };
        } else {
            el.value = value.to_string();
        }
        self.mutations.push(Mutation::Value {
            element,
            value: value.to_string(),
        });
        Ok(())
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(element)?;
        self.mutations.push(Mutation::Attribute {
            element,
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn set_default_value(&mut self, element: ElementId, value: &str) -> Result<(), DomError> {
        self.element_mut(element)?;
        self.mutations.push(Mutation::DefaultValue {
            element,
            value: value.to_string(),
        });
        Ok(())
    }

    fn set_checked(&mut self, element: ElementId, checked: bool) -> Result<(), DomError> {
        self.element_mut(element)?.checked = checked;
        self.mutations.push(Mutation::Checked { element, checked });
        Ok(())
    }

    fn dispatch_event(&mut self, element: ElementId, event: DomEvent) -> Result<(), DomError> {
        self.element_mut(element)?;
        match event {
            DomEvent::Focus => self.focused = Some(element),
            DomEvent::Blur if self.focused == Some(element) => self.focused = None,
            _ => {}
        }
        self.mutations.push(Mutation::Event { element, event });
        Ok(())
    }

    fn set_highlight(&mut self, element: ElementId, on: bool) -> Result<(), DomError> {
        self.element_mut(element)?;
        if on {
            self.highlighted.insert(element);
        } else {
            self.highlighted.remove(&element);
        }
        self.mutations.push(Mutation::Highlight { element, on });
        Ok(())
    }
}
