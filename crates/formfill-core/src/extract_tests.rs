use super::*;
use crate::snapshot::{FrameSnapshot, PageSnapshot};
use serde_json::json;

fn element(id: usize, tag: &str, extra: serde_json::Value) -> ElementInfo {
    let mut base = json!({
        "id": id,
        "tag_name": tag,
        "bounding_box": {"x": 10.0, "y": 10.0 + id as f64 * 30.0, "width": 200.0, "height": 24.0}
    });
    if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }
    serde_json::from_value(base).unwrap()
}

fn input(id: usize, ty: &str, name: &str) -> ElementInfo {
    element(id, "input", json!({"attributes": {"type": ty, "name": name}}))
}

#[test]
fn test_scan_basic_inputs_in_document_order() {
    let page = PageSnapshot::new("https://x.com/contact", "Contact")
        .with_element(input(1, "email", "user_email"))
        .with_element(input(2, "text", "first_name"))
        .with_element(element(3, "textarea", json!({"attributes": {"name": "message"}})))
        .with_element(input(4, "checkbox", "subscribe"));

    let fields = FieldExtractor::default().scan(&page);
    assert_eq!(fields.len(), 4);
    assert_eq!(fields[0].identifier, "user_email");
    assert_eq!(fields[0].kind_name(), "email");
    assert_eq!(fields[2].kind_name(), "textarea");
    assert_eq!(fields[3].kind_name(), "checkbox");
    assert!(fields.iter().all(|f| f.source == FieldSource::MainPage));
}

#[test]
fn test_scan_skips_unfillable_inputs() {
    let page = PageSnapshot::new("u", "t")
        .with_element(input(1, "hidden", "csrf"))
        .with_element(input(2, "submit", "go"))
        .with_element(input(3, "button", "b"))
        .with_element(element(4, "div", json!({})))
        .with_element(element(5, "input", json!({"attributes": {"name": "untyped"}})));

    let fields = FieldExtractor::default().scan(&page);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].identifier, "untyped");
    assert_eq!(fields[0].kind_name(), "text");
}

#[test]
fn test_identifier_falls_back_to_id() {
    let page = PageSnapshot::new("u", "t")
        .with_element(element(1, "input", json!({"attributes": {"id": "phone-1"}})))
        .with_element(element(2, "input", json!({})));

    let fields = FieldExtractor::default().scan(&page);
    assert_eq!(fields[0].identifier, "phone-1");
    assert_eq!(fields[1].identifier, "");
}

#[test]
fn test_label_resolution_order() {
    let page = PageSnapshot::new("u", "t")
        .with_label("e1", "  Your Email  ")
        .with_element(element(
            1,
            "input",
            json!({"attributes": {"id": "e1", "aria_label": "aria", "title": "title"}}),
        ))
        .with_element(element(
            2,
            "input",
            json!({"attributes": {"id": "e2", "aria_label": "Aria Name", "title": "title"}}),
        ))
        .with_element(element(3, "input", json!({"attributes": {"title": "Phone number"}})))
        .with_element(element(4, "input", json!({"parent_text": ["", "  City  ", "x"]})))
        .with_element(element(5, "input", json!({})));

    let labels: Vec<_> = FieldExtractor::default()
        .scan(&page)
        .into_iter()
        .map(|f| f.label)
        .collect();
    assert_eq!(labels, vec!["Your Email", "Aria Name", "Phone number", "City", ""]);
}

#[test]
fn test_visibility_is_permissive_by_default() {
    // hidden by style but inside the viewport
    let styled_hidden = element(
        1,
        "input",
        json!({"style": {"display": "none"}}),
    );
    // visible style but far below the fold
    let below_fold = element(
        2,
        "input",
        json!({"bounding_box": {"x": 0.0, "y": 5000.0, "width": 100.0, "height": 20.0}}),
    );
    // hidden and zero-sized
    let gone = element(
        3,
        "input",
        json!({"style": {"visibility": "hidden"}, "bounding_box": {"x": 0.0, "y": 0.0, "width": 0.0, "height": 0.0}}),
    );
    let page = PageSnapshot::new("u", "t")
        .with_element(styled_hidden)
        .with_element(below_fold)
        .with_element(gone);

    let permissive: Vec<_> = FieldExtractor::new(false)
        .scan(&page)
        .iter()
        .map(|f| f.element)
        .collect();
    assert_eq!(permissive, vec![ElementId(1), ElementId(2)]);

    let strict = FieldExtractor::new(true).scan(&page);
    assert!(strict.is_empty());
}

#[test]
fn test_select_options_are_carried() {
    let page = PageSnapshot::new("u", "t").with_element(element(
        1,
        "select",
        json!({
            "attributes": {"name": "color"},
            "options": [
                {"value": "", "text": "Select one"},
                {"value": "red", "text": "Red"}
            ]
        }),
    ));

    let fields = FieldExtractor::default().scan(&page);
    assert_eq!(fields[0].kind_name(), "select");
    assert_eq!(fields[0].options().len(), 2);
    assert_eq!(fields[0].options()[1].text, "Red");
}

#[test]
fn test_frames_are_scanned_and_cross_origin_skipped() {
    let page = PageSnapshot::new("u", "t")
        .with_element(input(1, "text", "main"))
        .with_frame(FrameSnapshot {
            src: "https://ads.example/frame".to_string(),
            accessible: false,
            elements: vec![input(10, "text", "blocked")],
            labels: vec![],
        })
        .with_frame(FrameSnapshot {
            src: "/embedded-form".to_string(),
            accessible: true,
            elements: vec![element(20, "input", json!({"attributes": {"id": "zip"}}))],
            labels: vec![crate::snapshot::LabelInfo {
                for_id: "zip".to_string(),
                text: "Postal code".to_string(),
            }],
        });

    let fields = FieldExtractor::default().scan(&page);
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[1].source, FieldSource::Frame(2));
    assert_eq!(fields[1].source.to_string(), "iframe-2");
    assert_eq!(fields[1].label, "Postal code");
}

#[test]
fn test_reused_element_id_is_scanned_once() {
    let page = PageSnapshot::new("u", "t")
        .with_element(input(1, "text", "city"))
        .with_frame(FrameSnapshot {
            src: "/embedded-form".to_string(),
            accessible: true,
            elements: vec![input(1, "email", "email")],
            labels: vec![],
        });

    let fields = FieldExtractor::default().scan(&page);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].identifier, "city");
    assert_eq!(fields[0].source, FieldSource::MainPage);
}

#[test]
fn test_custom_widgets_are_appended_once() {
    let page = PageSnapshot::new("u", "t")
        .with_element(element(
            1,
            "div",
            json!({
                "attributes": {"contenteditable": "true", "data": {"form-field": "bio"}},
                "text_content": "Existing bio"
            }),
        ))
        .with_element(element(2, "div", json!({"attributes": {"role": "combobox", "id": "tz"}})))
        .with_element(element(
            3,
            "input",
            json!({"attributes": {"type": "text", "name": "city", "role": "textbox"}}),
        ))
        .with_element(element(4, "div", json!({"attributes": {"role": "button"}})));

    let fields = FieldExtractor::default().scan(&page);
    let ids: Vec<_> = fields.iter().map(|f| f.identifier.as_str()).collect();
    // the standard input comes first, custom widgets after
    assert_eq!(ids, vec!["city", "bio", "tz"]);
    assert_eq!(fields[1].kind_name(), "custom");
    assert_eq!(fields[1].current_value, "Existing bio");
}

#[test]
fn test_frame_report() {
    let page = PageSnapshot::new("u", "t")
        .with_frame(FrameSnapshot {
            src: "https://other.example".to_string(),
            accessible: false,
            elements: vec![],
            labels: vec![],
        })
        .with_frame(FrameSnapshot {
            src: "/same".to_string(),
            accessible: true,
            elements: vec![
                input(1, "text", "a"),
                input(2, "hidden", "b"),
                element(3, "div", json!({})),
            ],
            labels: vec![],
        });

    let report = FieldExtractor::default().frame_report(&page);
    assert_eq!(report.total_frames, 2);
    assert_eq!(report.total_fields, 2);
    assert!(!report.frames[0].accessible);
    assert_eq!(
        report.frames[0].fields,
        FrameFields::Unavailable(FieldsUnavailable::Unknown)
    );
    assert_eq!(report.frames[1].fields, FrameFields::Count(2));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["totalFrames"], 2);
    assert_eq!(json["frames"][0]["fields"], "unknown");
    assert_eq!(json["frames"][1]["fields"], 2);
}

#[test]
fn test_scan_is_a_fresh_snapshot() {
    let mut page = PageSnapshot::new("u", "t").with_element(input(1, "text", "a"));
    let extractor = FieldExtractor::default();
    assert_eq!(extractor.scan(&page).len(), 1);

    page.elements.push(input(2, "text", "b"));
    assert_eq!(extractor.scan(&page).len(), 2);
}
