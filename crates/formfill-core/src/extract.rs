//! Field extraction.
//!
//! Walks the main page and every same-origin frame and turns candidate
//! elements into [`FieldDescriptor`]s. Each call produces a fresh snapshot.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use formfill_protocols::dom::{Document, ElementId, ElementInfo, FrameId, ViewportInfo};
use formfill_protocols::error::DomError;
use formfill_protocols::types::{
    FieldControl, FieldDescriptor, FieldSource, SelectOption, TextKind, ToggleKind,
};

const FORM_TAGS: &[&str] = &["input", "textarea", "select"];
const WIDGET_ROLES: &[&str] = &["textbox", "combobox", "listbox"];

pub struct FieldExtractor {
    strict_visibility: bool,
}

impl FieldExtractor {
    pub fn new(strict_visibility: bool) -> Self {
        Self { strict_visibility }
    }

    /// All visible, fillable fields in document order: main page, then each
    /// accessible frame, then custom widgets of the main page.
    pub fn scan(&self, doc: &dyn Document) -> Vec<FieldDescriptor> {
        let viewport = doc.viewport();
        let mut fields = Vec::new();

        let main = match doc.elements(FrameId::Main) {
            Ok(elements) => elements,
            Err(e) => {
                warn!("Could not read main page elements: {}", e);
                Vec::new()
            }
        };
        self.collect_standard(doc, FrameId::Main, &main, &viewport, &mut fields);

        for frame in doc.frames() {
            if !frame.accessible {
                debug!("Skipping cross-origin frame {} ({})", frame.index, frame.src);
                continue;
            }
            match doc.elements(FrameId::Embedded(frame.index)) {
                Ok(elements) => {
                    let frame_id = FrameId::Embedded(frame.index);
                    self.collect_standard(doc, frame_id, &elements, &viewport, &mut fields);
                }
                Err(DomError::CrossOrigin { index }) => {
                    debug!("Frame {} turned out to be cross-origin", index);
                }
                Err(e) => warn!("Could not read frame {}: {}", frame.index, e),
            }
        }

        let seen: HashSet<ElementId> = fields.iter().map(|f| f.element).collect();
        for element in main.iter().filter(|e| is_custom_widget(e)) {
            if seen.contains(&element.id) || !self.is_visible(element, &viewport) {
                continue;
            }
            fields.push(custom_descriptor(doc, element));
        }

        debug!("Extracted {} fields", fields.len());
        fields
    }

    fn collect_standard(
        &self,
        doc: &dyn Document,
        frame: FrameId,
        elements: &[ElementInfo],
        viewport: &ViewportInfo,
        out: &mut Vec<FieldDescriptor>,
    ) {
        for element in elements {
            let Some(control) = classify(element) else {
                continue;
            };
            if !self.is_visible(element, viewport) {
                continue;
            }
            // Writes address elements by id, so a reused id would land on
            // the first element that carries it.
            if out.iter().any(|f| f.element == element.id) {
                warn!(
                    "Element id {} already used by another field, skipping",
                    element.id
                );
                continue;
            }

            let attrs = &element.attributes;
            out.push(FieldDescriptor {
                element: element.id,
                control,
                identifier: non_empty(&attrs.name)
                    .or_else(|| non_empty(&attrs.id))
                    .unwrap_or_default()
                    .to_string(),
                placeholder: attrs.placeholder.clone().unwrap_or_default(),
                label: resolve_label(doc, frame, element),
                required: attrs.required,
                current_value: element.value.clone(),
                source: source_of(frame),
            });
        }
    }

    /// Not hidden by style, or intersecting the viewport. Strict mode
    /// requires both.
    pub fn is_visible(&self, element: &ElementInfo, viewport: &ViewportInfo) -> bool {
        let hidden = element.style.is_hidden() || element.bounding_box.is_empty();
        let in_viewport = element.bounding_box.intersects_viewport(viewport);
        if self.strict_visibility {
            !hidden && in_viewport
        } else {
            !hidden || in_viewport
        }
    }

    /// Per-frame field counts for the `checkIframes` action.
    pub fn frame_report(&self, doc: &dyn Document) -> FrameReport {
        let mut frames = Vec::new();
        let mut total_fields = 0;

        for frame in doc.frames() {
            let scan = if !frame.accessible {
                FrameScan::unavailable(frame.index, frame.src, FieldsUnavailable::Unknown, None)
            } else {
                match doc.elements(FrameId::Embedded(frame.index)) {
                    Ok(elements) => {
                        let count = elements
                            .iter()
                            .filter(|e| FORM_TAGS.contains(&e.tag_name.as_str()))
                            .count();
                        total_fields += count;
                        FrameScan {
                            index: frame.index,
                            src: frame.src,
                            fields: FrameFields::Count(count),
                            accessible: true,
                            error: None,
                        }
                    }
                    Err(DomError::CrossOrigin { .. }) => FrameScan::unavailable(
                        frame.index,
                        frame.src,
                        FieldsUnavailable::Unknown,
                        None,
                    ),
                    Err(e) => FrameScan::unavailable(
                        frame.index,
                        frame.src,
                        FieldsUnavailable::Error,
                        Some(e.to_string()),
                    ),
                }
            };
            frames.push(scan);
        }

        FrameReport {
            total_frames: frames.len(),
            total_fields,
            frames,
        }
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(false)
    }
}

fn classify(element: &ElementInfo) -> Option<FieldControl> {
    match element.tag_name.as_str() {
        "input" => match element.input_type().as_deref() {
            None | Some("") => Some(FieldControl::Text {
                kind: TextKind::Text,
            }),
            Some("checkbox") => Some(FieldControl::Toggle {
                kind: ToggleKind::Checkbox,
            }),
            Some("radio") => Some(FieldControl::Toggle {
                kind: ToggleKind::Radio,
            }),
            Some(other) => TextKind::from_input_type(other).map(|kind| FieldControl::Text { kind }),
        },
        "textarea" => Some(FieldControl::Text {
            kind: TextKind::Textarea,
        }),
        "select" => Some(FieldControl::Selection {
            options: element
                .options
                .iter()
                .map(|o| SelectOption {
                    value: o.value.clone(),
                    text: o.text.clone(),
                })
                .collect(),
        }),
        _ => None,
    }
}

fn is_custom_widget(element: &ElementInfo) -> bool {
    let attrs = &element.attributes;
    element.data_attr("form-field").is_some()
        || element.data_attr("input").is_some()
        || attrs
            .role
            .as_deref()
            .is_some_and(|role| WIDGET_ROLES.contains(&role))
        || attrs.contenteditable.as_deref() == Some("true")
}

fn custom_descriptor(doc: &dyn Document, element: &ElementInfo) -> FieldDescriptor {
    let attrs = &element.attributes;
    let identifier = element
        .data_attr("form-field")
        .filter(|s| !s.is_empty())
        .or_else(|| element.data_attr("input").filter(|s| !s.is_empty()))
        .or_else(|| non_empty(&attrs.id))
        .unwrap_or_default()
        .to_string();
    let current_value = if element.value.is_empty() {
        element.text_content.clone()
    } else {
        element.value.clone()
    };

    FieldDescriptor {
        element: element.id,
        control: FieldControl::Text {
            kind: TextKind::Custom,
        },
        identifier,
        placeholder: attrs.placeholder.clone().unwrap_or_default(),
        label: resolve_label(doc, FrameId::Main, element),
        required: attrs.required,
        current_value,
        source: FieldSource::MainPage,
    }
}

/// `label[for]`, then `aria-label`, then `title`, then the first non-empty
/// text node of the parent.
fn resolve_label(doc: &dyn Document, frame: FrameId, element: &ElementInfo) -> String {
    let attrs = &element.attributes;

    if let Some(id) = non_empty(&attrs.id) {
        if let Some(text) = doc.label_for(frame, id).filter(|t| !t.is_empty()) {
            return text;
        }
    }
    if let Some(aria) = non_empty(&attrs.aria_label) {
        return aria.to_string();
    }
    if let Some(title) = non_empty(&attrs.title) {
        return title.to_string();
    }
    element
        .parent_text
        .iter()
        .map(|t| t.trim())
        .find(|t| !t.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn source_of(frame: FrameId) -> FieldSource {
    match frame {
        FrameId::Main => FieldSource::MainPage,
        FrameId::Embedded(index) => FieldSource::Frame(index + 1),
    }
}

/// Result of the `checkIframes` action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    pub total_frames: usize,
    pub total_fields: usize,
    pub frames: Vec<FrameScan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameScan {
    pub index: usize,
    pub src: String,
    pub fields: FrameFields,
    pub accessible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FrameScan {
    fn unavailable(
        index: usize,
        src: String,
        why: FieldsUnavailable,
        error: Option<String>,
    ) -> Self {
        Self {
            index,
            src,
            fields: FrameFields::Unavailable(why),
            accessible: false,
            error,
        }
    }
}

/// A field count, or why there is none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameFields {
    Count(usize),
    Unavailable(FieldsUnavailable),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldsUnavailable {
    Unknown,
    Error,
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
