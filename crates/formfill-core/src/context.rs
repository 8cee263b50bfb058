//! Page context handed to classification prompts.

use std::fmt;

use serde::{Deserialize, Serialize};

use formfill_protocols::dom::Document;

/// What a page's form is most likely for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormPurpose {
    Contact,
    Registration,
    Login,
    Payment,
    Survey,
    Feedback,
    General,
}

impl FormPurpose {
    /// Keyword detection over the page URL, title and body text.
    /// Earlier purposes win when several match.
    pub fn detect(url: &str, title: &str, body: &str) -> Self {
        let url = url.to_lowercase();
        let title = title.to_lowercase();
        let body = body.to_lowercase();
        let any = |haystack: &str, needles: &[&str]| needles.iter().any(|n| haystack.contains(n));

        if url.contains("contact") || title.contains("contact") || body.contains("contact us") {
            Self::Contact
        } else if any(&url, &["signup", "register"]) || any(&title, &["sign up", "register"]) {
            Self::Registration
        } else if url.contains("login") || any(&title, &["login", "sign in"]) {
            Self::Login
        } else if any(&url, &["checkout", "payment"]) || any(&title, &["checkout", "payment"]) {
            Self::Payment
        } else if [&url, &title, &body].iter().any(|s| s.contains("survey")) {
            Self::Survey
        } else if [&url, &title, &body].iter().any(|s| s.contains("feedback")) {
            Self::Feedback
        } else {
            Self::General
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Contact => "Contact form",
            Self::Registration => "Registration form",
            Self::Login => "Login form",
            Self::Payment => "Payment form",
            Self::Survey => "Survey form",
            Self::Feedback => "Feedback form",
            Self::General => "General form",
        }
    }
}

impl fmt::Display for FormPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    pub url: String,
    pub title: String,
    pub form_purpose: FormPurpose,
    /// Purpose text from a form-context classification, when one ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed_purpose: Option<String>,
}

impl PageContext {
    pub fn from_document(doc: &dyn Document) -> Self {
        let url = doc.url().to_string();
        let title = doc.title().to_string();
        let form_purpose = FormPurpose::detect(&url, &title, &doc.body_text());
        Self {
            url,
            title,
            form_purpose,
            analyzed_purpose: None,
        }
    }

    /// Purpose line for prompts: the analyzed one if present.
    pub fn purpose_text(&self) -> String {
        match &self.analyzed_purpose {
            Some(purpose) if !purpose.trim().is_empty() => {
                format!("{} ({})", self.form_purpose, purpose.trim())
            }
            _ => self.form_purpose.to_string(),
        }
    }
}
