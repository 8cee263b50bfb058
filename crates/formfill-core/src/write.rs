//! Field writing.
//!
//! Applies a resolved value to a live element and emits the events reactive
//! front-ends listen for, then highlights the element for a while.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use formfill_protocols::dom::{Document, DomEvent, ElementId};
use formfill_protocols::error::DomError;
use formfill_protocols::types::{FieldControl, FieldDescriptor, SelectOption};

const TEXT_EVENTS: &[DomEvent] = &[
    DomEvent::Focus,
    DomEvent::Input,
    DomEvent::Change,
    DomEvent::KeyDown,
    DomEvent::KeyUp,
    DomEvent::Blur,
];
const SELECT_EVENTS: &[DomEvent] = &[DomEvent::Focus, DomEvent::Change, DomEvent::Blur];

/// What a write did to the element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The element now holds this value.
    Written(String),
    /// Nothing applicable, element left as it was.
    Untouched,
}

impl WriteOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written(_))
    }
}

pub struct FieldWriter {
    highlight_for: Duration,
    /// Highlighted elements and when to restore them.
    pending: Vec<(ElementId, DateTime<Utc>)>,
}

impl FieldWriter {
    pub fn new(highlight_ms: u64) -> Self {
        Self {
            highlight_for: Duration::milliseconds(i64::try_from(highlight_ms).unwrap_or(i64::MAX)),
            pending: Vec::new(),
        }
    }

    pub fn write(
        &mut self,
        doc: &mut dyn Document,
        field: &FieldDescriptor,
        value: &str,
        now: DateTime<Utc>,
    ) -> Result<WriteOutcome, DomError> {
        let element = field.element;
        let outcome = match &field.control {
            FieldControl::Text { .. } => {
                doc.set_value(element, value)?;
                doc.set_attribute(element, "value", value)?;
                doc.set_default_value(element, value)?;
                dispatch_all(doc, element, TEXT_EVENTS)?;
                WriteOutcome::Written(value.to_string())
            }
            FieldControl::Selection { options } => match pick_option(options, value) {
                Some(option) => {
                    doc.set_value(element, &option.value)?;
                    dispatch_all(doc, element, SELECT_EVENTS)?;
                    WriteOutcome::Written(option.value.clone())
                }
                None => WriteOutcome::Untouched,
            },
            FieldControl::Toggle { .. } => {
                if is_affirmative(value) {
                    doc.set_checked(element, true)?;
                    doc.dispatch_event(element, DomEvent::Change)?;
                    WriteOutcome::Written(value.to_string())
                } else {
                    WriteOutcome::Untouched
                }
            }
        };

        if outcome.is_written() {
            self.highlight(doc, element, now);
        }
        Ok(outcome)
    }

    /// A failed highlight never fails the write.
    fn highlight(&mut self, doc: &mut dyn Document, element: ElementId, now: DateTime<Utc>) {
        match doc.set_highlight(element, true) {
            Ok(()) => {
                self.pending.retain(|(id, _)| *id != element);
                self.pending.push((element, now + self.highlight_for));
            }
            Err(e) => debug!("Could not highlight element {}: {}", element.0, e),
        }
    }

    /// Restore every highlight whose time is up. Returns how many were
    /// restored.
    pub fn expire_highlights(&mut self, doc: &mut dyn Document, now: DateTime<Utc>) -> usize {
        let (due, keep): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|(_, until)| *until <= now);
        self.pending = keep;

        for (element, _) in &due {
            if let Err(e) = doc.set_highlight(*element, false) {
                warn!("Could not restore element {}: {}", element.0, e);
            }
        }
        due.len()
    }

    pub fn pending_highlights(&self) -> usize {
        self.pending.len()
    }

    /// When the next highlight is due to be restored.
    pub fn next_expiry(&self) -> Option<DateTime<Utc>> {
        self.pending.iter().map(|(_, until)| *until).min()
    }
}

fn dispatch_all(
    doc: &mut dyn Document,
    element: ElementId,
    events: &[DomEvent],
) -> Result<(), DomError> {
    for event in events {
        doc.dispatch_event(element, *event)?;
    }
    Ok(())
}

/// Exact value, then case-insensitive partial match on text or value, then
/// the first option with a value.
fn pick_option<'a>(options: &'a [SelectOption], value: &str) -> Option<&'a SelectOption> {
    if let Some(exact) = options.iter().find(|o| o.value == value) {
        return Some(exact);
    }
    let wanted = value.to_lowercase();
    if !wanted.is_empty() {
        let partial = options.iter().find(|o| {
            o.text.to_lowercase().contains(&wanted) || o.value.to_lowercase().contains(&wanted)
        });
        if partial.is_some() {
            return partial;
        }
    }
    options.iter().find(|o| !o.value.trim().is_empty())
}

fn is_affirmative(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Mutation, PageSnapshot};
    use chrono::TimeZone;
    use formfill_protocols::dom::ElementInfo;
    use formfill_protocols::types::{FieldSource, TextKind, ToggleKind};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn element(id: usize, tag: &str, extra: serde_json::Value) -> ElementInfo {
        let mut base = json!({"id": id, "tag_name": tag});
        if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(base).unwrap()
    }

    fn descriptor(id: usize, control: FieldControl) -> FieldDescriptor {
        FieldDescriptor {
            element: ElementId(id),
            control,
            identifier: format!("f{}", id),
            placeholder: String::new(),
            label: String::new(),
            required: false,
            current_value: String::new(),
            source: FieldSource::MainPage,
        }
    }

    fn options(pairs: &[(&str, &str)]) -> Vec<SelectOption> {
        pairs
            .iter()
            .map(|(value, text)| SelectOption {
                value: value.to_string(),
                text: text.to_string(),
            })
            .collect()
    }

    fn select_page(pairs: &[(&str, &str)]) -> PageSnapshot {
        let opts: Vec<_> = pairs
            .iter()
            .map(|(v, t)| json!({"value": v, "text": t}))
            .collect();
        PageSnapshot::new("u", "t").with_element(element(1, "select", json!({"options": opts})))
    }

    #[test]
    fn test_text_write_sets_properties_and_events() {
        let mut page = PageSnapshot::new("u", "t").with_element(element(1, "input", json!({})));
        let field = descriptor(
            1,
            FieldControl::Text {
                kind: TextKind::Email,
            },
        );
        let mut writer = FieldWriter::new(3000);

        let outcome = writer.write(&mut page, &field, "jane@x.com", now()).unwrap();
        assert_eq!(outcome, WriteOutcome::Written("jane@x.com".to_string()));

        let id = ElementId(1);
        assert_eq!(page.element(id).unwrap().value, "jane@x.com");
        assert_eq!(page.value_attribute(id), Some("jane@x.com"));
        assert_eq!(page.default_value(id), Some("jane@x.com"));
        assert_eq!(page.events_for(id), TEXT_EVENTS.to_vec());
        assert!(page.is_highlighted(id));
    }

    #[test]
    fn test_select_exact_then_partial_then_first() {
        let pairs = [("", "Choose"), ("green", "Green"), ("red", "Dark Red")];
        let field = descriptor(
            1,
            FieldControl::Selection {
                options: options(&pairs),
            },
        );
        let mut writer = FieldWriter::new(3000);

        let mut page = select_page(&pairs);
        writer.write(&mut page, &field, "red", now()).unwrap();
        assert_eq!(page.element(ElementId(1)).unwrap().value, "red");

        let mut page = select_page(&pairs);
        writer.write(&mut page, &field, "dark", now()).unwrap();
        assert_eq!(page.element(ElementId(1)).unwrap().value, "red");

        let mut page = select_page(&pairs);
        let outcome = writer.write(&mut page, &field, "purple", now()).unwrap();
        assert_eq!(outcome, WriteOutcome::Written("green".to_string()));
        assert_eq!(
            page.events_for(ElementId(1)),
            vec![DomEvent::Focus, DomEvent::Change, DomEvent::Blur]
        );
    }

    #[test]
    fn test_select_without_options_is_untouched() {
        let field = descriptor(1, FieldControl::Selection { options: vec![] });
        let mut page = select_page(&[]);
        let outcome = FieldWriter::new(3000)
            .write(&mut page, &field, "x", now())
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Untouched);
        assert!(page.mutations.is_empty());
    }

    #[test]
    fn test_toggle_affirmative_values() {
        let field = descriptor(
            1,
            FieldControl::Toggle {
                kind: ToggleKind::Checkbox,
            },
        );
        let mut writer = FieldWriter::new(3000);

        for value in ["true", "YES", " Yes "] {
            let mut page = PageSnapshot::new("u", "t")
                .with_element(element(1, "input", json!({"attributes": {"type": "checkbox"}})));
            writer.write(&mut page, &field, value, now()).unwrap();
            assert!(page.element(ElementId(1)).unwrap().checked, "{}", value);
            assert_eq!(page.events_for(ElementId(1)), vec![DomEvent::Change]);
        }

        let mut page = PageSnapshot::new("u", "t")
            .with_element(element(1, "input", json!({"attributes": {"type": "checkbox"}})));
        let outcome = writer.write(&mut page, &field, "Sample value", now()).unwrap();
        assert_eq!(outcome, WriteOutcome::Untouched);
        assert!(!page.element(ElementId(1)).unwrap().checked);
        assert!(page.mutations.is_empty());
    }

    #[test]
    fn test_dom_error_propagates() {
        let mut page = PageSnapshot::new("u", "t")
            .with_element(element(1, "input", json!({"attributes": {"type": "file"}})));
        let field = descriptor(
            1,
            FieldControl::Text {
                kind: TextKind::File,
            },
        );
        let mut writer = FieldWriter::new(3000);
        assert!(matches!(
            writer.write(&mut page, &field, "x", now()),
            Err(DomError::InvalidState(_))
        ));
        assert_eq!(writer.pending_highlights(), 0);
    }

    #[test]
    fn test_highlights_expire() {
        let mut page = PageSnapshot::new("u", "t")
            .with_element(element(1, "input", json!({})))
            .with_element(element(2, "input", json!({})));
        let text = FieldControl::Text {
            kind: TextKind::Text,
        };
        let mut writer = FieldWriter::new(3000);

        writer
            .write(&mut page, &descriptor(1, text.clone()), "a", now())
            .unwrap();
        writer
            .write(
                &mut page,
                &descriptor(2, text),
                "b",
                now() + Duration::seconds(2),
            )
            .unwrap();
        assert_eq!(writer.next_expiry(), Some(now() + Duration::seconds(3)));

        assert_eq!(
            writer.expire_highlights(&mut page, now() + Duration::milliseconds(2999)),
            0
        );
        assert_eq!(
            writer.expire_highlights(&mut page, now() + Duration::seconds(3)),
            1
        );
        assert!(!page.is_highlighted(ElementId(1)));
        assert!(page.is_highlighted(ElementId(2)));

        assert_eq!(
            writer.expire_highlights(&mut page, now() + Duration::seconds(10)),
            1
        );
        assert_eq!(writer.pending_highlights(), 0);
        assert!(matches!(
            page.mutations.last(),
            Some(Mutation::Highlight { on: false, .. })
        ));
    }
}
