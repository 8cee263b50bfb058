//! Classification prompts and reply parsing.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use formfill_protocols::classifier::ClassificationRequest;
use formfill_protocols::error::ClassifierError;
use formfill_protocols::types::{FieldDescriptor, SelectOption};

use crate::context::PageContext;
use crate::profile::{ProfileAttribute, UserProfile};

pub const SYSTEM_MESSAGE: &str = "You are an expert at analyzing web forms and providing appropriate values. Always respond with valid JSON.";

const DEFAULT_CONFIDENCE: f32 = 0.5;
const DEFAULT_REASONING: &str = "AI analysis";

const PROFILE_LINES: &[(&str, ProfileAttribute)] = &[
    ("First Name", ProfileAttribute::FirstName),
    ("Last Name", ProfileAttribute::LastName),
    ("Email", ProfileAttribute::Email),
    ("Phone", ProfileAttribute::Phone),
    ("Address", ProfileAttribute::Address),
    ("City", ProfileAttribute::City),
    ("State", ProfileAttribute::State),
    ("Zip Code", ProfileAttribute::ZipCode),
    ("Country", ProfileAttribute::Country),
    ("Company", ProfileAttribute::Company),
    ("Job Title", ProfileAttribute::JobTitle),
    ("Website", ProfileAttribute::Website),
];

fn or_unknown(s: &str) -> &str {
    if s.trim().is_empty() { "Unknown" } else { s }
}

fn profile_section(out: &mut String, profile: &UserProfile) {
    out.push_str("USER PROFILE:\n");
    for (label, attr) in PROFILE_LINES {
        let _ = writeln!(out, "- {}: {}", label, profile.attribute(*attr));
    }
}

fn page_section(out: &mut String, page: &PageContext) {
    out.push_str("PAGE CONTEXT:\n");
    let _ = writeln!(out, "- URL: {}", or_unknown(&page.url));
    let _ = writeln!(out, "- Page Title: {}", or_unknown(&page.title));
    let _ = writeln!(out, "- Form Purpose: {}", page.purpose_text());
}

/// Prompt for a free-text field.
pub fn field_request(
    field: &FieldDescriptor,
    profile: &UserProfile,
    page: &PageContext,
) -> ClassificationRequest {
    let mut prompt = String::from(
        "You are an AI assistant that helps fill web forms intelligently. \
         Analyze the following form field and provide the most appropriate value.\n\n",
    );

    prompt.push_str("FIELD INFORMATION:\n");
    let _ = writeln!(prompt, "- Type: {}", field.kind_name());
    let _ = writeln!(prompt, "- Name: {}", field.identifier);
    let _ = writeln!(prompt, "- Placeholder: \"{}\"", field.placeholder);
    let _ = writeln!(prompt, "- Label: \"{}\"", field.label);
    let _ = writeln!(prompt, "- Required: {}", field.required);
    prompt.push('\n');

    profile_section(&mut prompt, profile);
    prompt.push('\n');
    page_section(&mut prompt, page);

    prompt.push_str(
        r#"
INSTRUCTIONS:
1. Analyze the field context and determine what information is being requested
2. Choose the most appropriate value from the user profile
3. If no profile value matches, suggest a reasonable default
4. For text areas, provide contextually appropriate content
5. Return only the value, no explanations

RESPONSE FORMAT:
{
  "value": "the actual value to fill",
  "confidence": 0.95,
  "reasoning": "brief explanation of why this value was chosen"
}

Example responses:
- For email field: {"value": "john.doe@example.com", "confidence": 0.99, "reasoning": "Direct email field match"}
- For name field: {"value": "John Doe", "confidence": 0.95, "reasoning": "Full name requested"}"#,
    );

    ClassificationRequest::new(SYSTEM_MESSAGE, prompt)
}

/// Prompt for a selection field, listing only the valid options.
pub fn select_request(
    field: &FieldDescriptor,
    options: &[&SelectOption],
    profile: &UserProfile,
    page: &PageContext,
) -> ClassificationRequest {
    let mut prompt = String::from(
        "You are an AI assistant that helps select the most appropriate option from dropdown menus. \
         Analyze the field and available options to choose the best match.\n\n",
    );

    prompt.push_str("FIELD INFORMATION:\n");
    let _ = writeln!(prompt, "- Type: {}", field.kind_name());
    let _ = writeln!(prompt, "- Name: \"{}\"", field.identifier);
    let _ = writeln!(prompt, "- Placeholder: \"{}\"", field.placeholder);
    let _ = writeln!(prompt, "- Label: \"{}\"", field.label);
    prompt.push('\n');

    prompt.push_str("AVAILABLE OPTIONS:\n");
    for option in options {
        let _ = writeln!(prompt, "- \"{}\"", option.value);
    }
    prompt.push('\n');

    profile_section(&mut prompt, profile);
    prompt.push('\n');
    page_section(&mut prompt, page);

    prompt.push_str(
        r#"
INSTRUCTIONS:
1. Analyze what type of information this dropdown is requesting
2. Choose the most appropriate option from the available choices
3. Consider the user's profile and form context
4. Return only the exact option value, no explanations

RESPONSE FORMAT:
{
  "selectedOption": "the exact option value to select",
  "confidence": 0.95,
  "reasoning": "brief explanation of why this option was chosen"
}"#,
    );

    ClassificationRequest::new(SYSTEM_MESSAGE, prompt)
}

/// Prompt asking what the form as a whole is for.
pub fn form_context_request(fields: &[FieldDescriptor], page: &PageContext) -> ClassificationRequest {
    let mut prompt = String::from("Analyze this form and provide context for better field filling:\n\n");

    prompt.push_str("FORM FIELDS:\n");
    for field in fields {
        let _ = writeln!(
            prompt,
            "- {}: \"{}\" ({})",
            field.kind_name(),
            field.identifier,
            field.placeholder
        );
    }
    prompt.push('\n');
    prompt.push_str("USER PROFILE: Available\n");
    let _ = writeln!(prompt, "PAGE CONTEXT: {}", or_unknown(&page.url));

    prompt.push_str(
        r#"
What type of form is this? What is its purpose? Provide context to help fill fields more intelligently.

Response format:
{
  "formType": "contact|registration|payment|survey|other",
  "purpose": "brief description of form purpose",
  "suggestions": ["field-specific suggestions"]
}"#,
    );

    ClassificationRequest::new(SYSTEM_MESSAGE, prompt)
}

/// A parsed free-text suggestion. `value` is empty when the reply had none.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSuggestion {
    pub value: String,
    pub confidence: f32,
    pub reasoning: String,
}

/// A parsed selection suggestion.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectSuggestion {
    pub selected_option: Option<String>,
    pub confidence: f32,
    pub reasoning: String,
}

/// A parsed form-context reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormAnalysis {
    pub form_type: String,
    pub purpose: String,
    pub suggestions: Vec<String>,
}

/// Replies sometimes arrive wrapped in a markdown code fence.
fn strip_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn parse_object(raw: &str) -> Result<serde_json::Map<String, Value>, ClassifierError> {
    match serde_json::from_str::<Value>(strip_fence(raw)) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ClassifierError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            other
        ))),
        Err(e) => Err(ClassifierError::MalformedResponse(e.to_string())),
    }
}

fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn confidence_of(map: &serde_json::Map<String, Value>) -> f32 {
    map.get("confidence")
        .and_then(Value::as_f64)
        .filter(|c| *c > 0.0)
        .map(|c| c as f32)
        .unwrap_or(DEFAULT_CONFIDENCE)
}

fn reasoning_of(map: &serde_json::Map<String, Value>) -> String {
    map.get("reasoning")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_REASONING)
        .to_string()
}

pub fn parse_field_reply(raw: &str) -> Result<FieldSuggestion, ClassifierError> {
    let map = parse_object(raw)?;
    Ok(FieldSuggestion {
        value: scalar_text(map.get("value")).unwrap_or_default(),
        confidence: confidence_of(&map),
        reasoning: reasoning_of(&map),
    })
}

/// Parse a selection reply. A suggestion that is not exactly one of
/// `options` is dropped.
pub fn parse_select_reply(
    raw: &str,
    options: &[&SelectOption],
) -> Result<SelectSuggestion, ClassifierError> {
    let map = parse_object(raw)?;
    let selected_option = scalar_text(map.get("selectedOption"))
        .filter(|selected| options.iter().any(|o| &o.value == selected));
    Ok(SelectSuggestion {
        selected_option,
        confidence: confidence_of(&map),
        reasoning: reasoning_of(&map),
    })
}

pub fn parse_form_reply(raw: &str) -> Result<FormAnalysis, ClassifierError> {
    let map = parse_object(raw)?;
    serde_json::from_value(Value::Object(map))
        .map_err(|e| ClassifierError::MalformedResponse(e.to_string()))
}
