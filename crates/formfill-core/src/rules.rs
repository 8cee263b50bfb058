//! Fallback rules.
//!
//! Used whenever the classifier is unavailable, over budget, unsure, or
//! wrong. Text rules are an ordered table of matchers; the first matching
//! rule wins. Selection fields use contextual option rules and then the first
//! valid option.

use formfill_protocols::types::{
    FieldControl, FieldDescriptor, ResolutionResult, ResolutionSource, SelectOption, TextKind,
};

use crate::profile::{ProfileAttribute, UserProfile};

/// Field text a matcher looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attr {
    Name,
    Placeholder,
    Label,
}

/// What a matching rule produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleValue {
    Profile(ProfileAttribute),
    Literal(&'static str),
}

/// One row of the text rule table.
///
/// Matches when the field kind is in `kinds` or any `any_of` needle is found,
/// and no `none_of` needle is found.
#[derive(Debug, Clone)]
pub struct FallbackRule {
    pub name: &'static str,
    pub kinds: &'static [TextKind],
    pub any_of: &'static [(Attr, &'static str)],
    pub none_of: &'static [(Attr, &'static str)],
    pub value: RuleValue,
}

/// A contextual rule for selection fields.
#[derive(Debug, Clone)]
pub struct OptionRule {
    pub name: &'static str,
    pub any_of: &'static [(Attr, &'static str)],
    /// Profile value tried first, by exact option text or value.
    pub profile: Option<ProfileAttribute>,
    /// Built-in option text needles, in priority order.
    pub option_text: &'static [&'static str],
}

pub const COMMENT_TEXT: &str =
    "Thank you for your service. This is a test comment generated by AI Form Filler.";
pub const TEXTAREA_DEFAULT: &str =
    "This is a sample comment or message generated by AI Form Filler.";

const RULE_CONFIDENCE: f32 = 0.6;
const DEFAULT_CONFIDENCE: f32 = 0.3;

use Attr::{Label as L, Name as N, Placeholder as P};

const TEXT_RULES: &[FallbackRule] = &[
    FallbackRule {
        name: "email",
        kinds: &[TextKind::Email],
        any_of: &[(N, "email"), (P, "email"), (L, "email")],
        none_of: &[],
        value: RuleValue::Profile(ProfileAttribute::Email),
    },
    FallbackRule {
        name: "first_name",
        kinds: &[],
        any_of: &[(N, "first"), (N, "fname"), (P, "first"), (L, "first")],
        none_of: &[],
        value: RuleValue::Profile(ProfileAttribute::FirstName),
    },
    FallbackRule {
        name: "last_name",
        kinds: &[],
        any_of: &[(N, "last"), (N, "lname"), (P, "last"), (L, "last")],
        none_of: &[],
        value: RuleValue::Profile(ProfileAttribute::LastName),
    },
    FallbackRule {
        name: "full_name",
        kinds: &[],
        any_of: &[(N, "name")],
        none_of: &[(N, "first"), (N, "last"), (P, "first"), (P, "last")],
        value: RuleValue::Profile(ProfileAttribute::FullName),
    },
    FallbackRule {
        name: "phone",
        kinds: &[TextKind::Tel],
        any_of: &[(N, "phone"), (N, "mobile"), (P, "phone"), (L, "phone")],
        none_of: &[],
        value: RuleValue::Profile(ProfileAttribute::Phone),
    },
    FallbackRule {
        name: "address",
        kinds: &[],
        any_of: &[(N, "address"), (N, "street"), (P, "address"), (L, "address")],
        none_of: &[],
        value: RuleValue::Profile(ProfileAttribute::Address),
    },
    FallbackRule {
        name: "city",
        kinds: &[],
        any_of: &[(N, "city"), (P, "city"), (L, "city")],
        none_of: &[],
        value: RuleValue::Profile(ProfileAttribute::City),
    },
    FallbackRule {
        name: "state",
        kinds: &[],
        any_of: &[(N, "state"), (N, "province"), (P, "state"), (L, "state")],
        none_of: &[],
        value: RuleValue::Profile(ProfileAttribute::State),
    },
    FallbackRule {
        name: "zip",
        kinds: &[],
        any_of: &[(N, "zip"), (N, "postal"), (P, "zip"), (L, "zip")],
        none_of: &[],
        value: RuleValue::Profile(ProfileAttribute::ZipCode),
    },
    FallbackRule {
        name: "country",
        kinds: &[],
        any_of: &[(N, "country"), (P, "country"), (L, "country")],
        none_of: &[],
        value: RuleValue::Profile(ProfileAttribute::Country),
    },
    FallbackRule {
        name: "company",
        kinds: &[],
        any_of: &[(N, "company"), (N, "organization"), (P, "company"), (L, "company")],
        none_of: &[],
        value: RuleValue::Profile(ProfileAttribute::Company),
    },
    FallbackRule {
        name: "job_title",
        kinds: &[],
        any_of: &[
            (N, "job"),
            (N, "title"),
            (N, "position"),
            (P, "job"),
            (P, "title"),
            (L, "job"),
        ],
        none_of: &[],
        value: RuleValue::Profile(ProfileAttribute::JobTitle),
    },
    FallbackRule {
        name: "website",
        kinds: &[TextKind::Url],
        any_of: &[(N, "website"), (N, "url"), (P, "website"), (P, "url")],
        none_of: &[],
        value: RuleValue::Profile(ProfileAttribute::Website),
    },
    FallbackRule {
        name: "comment",
        kinds: &[],
        any_of: &[
            (N, "comment"),
            (N, "message"),
            (N, "note"),
            (P, "comment"),
            (P, "message"),
            (L, "comment"),
            (L, "message"),
        ],
        none_of: &[],
        value: RuleValue::Literal(COMMENT_TEXT),
    },
    FallbackRule {
        name: "search",
        kinds: &[TextKind::Search],
        any_of: &[],
        none_of: &[],
        value: RuleValue::Literal(""),
    },
];

const OPTION_RULES: &[OptionRule] = &[
    OptionRule {
        name: "country",
        any_of: &[(N, "country"), (P, "country"), (L, "country")],
        profile: Some(ProfileAttribute::Country),
        option_text: &["usa", "united states", "america"],
    },
    OptionRule {
        name: "state",
        any_of: &[(N, "state"), (P, "state"), (L, "state")],
        profile: Some(ProfileAttribute::State),
        option_text: &["new york", "ny"],
    },
    OptionRule {
        name: "inquiry",
        any_of: &[
            (N, "inquiry"),
            (P, "inquiry"),
            (L, "inquiry"),
            (N, "type"),
            (P, "type"),
            (L, "type"),
        ],
        profile: None,
        option_text: &["general", "support", "question"],
    },
];

/// Lowercased field text the matchers run against.
#[derive(Debug, Clone)]
pub struct FieldText {
    pub name: String,
    pub placeholder: String,
    pub label: String,
}

impl FieldText {
    pub fn of(field: &FieldDescriptor) -> Self {
        Self {
            name: field.identifier.to_lowercase(),
            placeholder: field.placeholder.to_lowercase(),
            label: field.label.to_lowercase(),
        }
    }

    fn get(&self, attr: Attr) -> &str {
        match attr {
            Attr::Name => &self.name,
            Attr::Placeholder => &self.placeholder,
            Attr::Label => &self.label,
        }
    }

    fn contains_any(&self, needles: &[(Attr, &str)]) -> bool {
        needles
            .iter()
            .any(|(attr, needle)| self.get(*attr).contains(needle))
    }
}

impl FallbackRule {
    pub fn matches(&self, kind: TextKind, text: &FieldText) -> bool {
        (self.kinds.contains(&kind) || text.contains_any(self.any_of))
            && !text.contains_any(self.none_of)
    }
}

/// Options a selection field may resolve to: non-blank values that are not
/// a "select one" style prompt.
pub fn valid_options(options: &[SelectOption]) -> Vec<&SelectOption> {
    options
        .iter()
        .filter(|o| !o.value.trim().is_empty() && !o.value.to_lowercase().contains("select"))
        .collect()
}

/// The fallback rule set.
#[derive(Debug, Clone)]
pub struct RuleSet {
    text_rules: Vec<FallbackRule>,
    option_rules: Vec<OptionRule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleSet {
    pub fn standard() -> Self {
        Self {
            text_rules: TEXT_RULES.to_vec(),
            option_rules: OPTION_RULES.to_vec(),
        }
    }

    pub fn text_rules(&self) -> &[FallbackRule] {
        &self.text_rules
    }

    /// Deterministic value for any field, from rules and defaults only.
    pub fn resolve(&self, field: &FieldDescriptor, profile: &UserProfile) -> ResolutionResult {
        match &field.control {
            FieldControl::Text { kind } => self.resolve_text(*kind, field, profile),
            FieldControl::Selection { options } => {
                self.resolve_option(field, &valid_options(options), profile)
            }
            FieldControl::Toggle { .. } => ResolutionResult::new(
                "",
                0.0,
                "Toggles are left alone without a confident suggestion",
                ResolutionSource::Default,
            ),
        }
    }

    pub fn resolve_text(
        &self,
        kind: TextKind,
        field: &FieldDescriptor,
        profile: &UserProfile,
    ) -> ResolutionResult {
        let text = FieldText::of(field);

        if let Some(rule) = self.text_rules.iter().find(|r| r.matches(kind, &text)) {
            let value = match rule.value {
                RuleValue::Profile(attr) => profile.attribute(attr),
                RuleValue::Literal(literal) => literal.to_string(),
            };
            return ResolutionResult::new(
                value,
                RULE_CONFIDENCE,
                format!("Matched fallback rule '{}'", rule.name),
                ResolutionSource::Rule(rule.name.to_string()),
            );
        }

        ResolutionResult::new(
            generic_default(kind, &text),
            DEFAULT_CONFIDENCE,
            format!("No rule matched, default for {} field", kind.as_str()),
            ResolutionSource::Default,
        )
    }

    /// Contextual option rules, then the first valid option.
    pub fn resolve_option(
        &self,
        field: &FieldDescriptor,
        valid: &[&SelectOption],
        profile: &UserProfile,
    ) -> ResolutionResult {
        let Some(first) = valid.first() else {
            return ResolutionResult::new(
                "",
                0.0,
                "No valid options",
                ResolutionSource::NoOptions,
            );
        };

        let text = FieldText::of(field);
        for rule in self.option_rules.iter().filter(|r| text.contains_any(r.any_of)) {
            if let Some(option) = contextual_option(rule, valid, profile) {
                return ResolutionResult::new(
                    option.value.clone(),
                    RULE_CONFIDENCE,
                    format!("Matched option rule '{}'", rule.name),
                    ResolutionSource::ContextualOption(rule.name.to_string()),
                );
            }
        }

        ResolutionResult::new(
            first.value.clone(),
            DEFAULT_CONFIDENCE,
            "First valid option",
            ResolutionSource::FirstOption,
        )
    }
}

fn contextual_option<'a>(
    rule: &OptionRule,
    valid: &[&'a SelectOption],
    profile: &UserProfile,
) -> Option<&'a SelectOption> {
    if let Some(attr) = rule.profile {
        let wanted = profile.attribute(attr).trim().to_lowercase();
        if !wanted.is_empty() {
            let exact = valid.iter().find(|o| {
                o.text.trim().to_lowercase() == wanted || o.value.trim().to_lowercase() == wanted
            });
            if let Some(option) = exact {
                return Some(option);
            }
        }
    }

    rule.option_text.iter().find_map(|needle| {
        valid
            .iter()
            .find(|o| o.text.to_lowercase().contains(needle))
            .copied()
    })
}

/// Type-appropriate value when no rule matched.
pub fn generic_default(kind: TextKind, text: &FieldText) -> String {
    let value = match kind {
        TextKind::Text => {
            if ["name", "fname", "lname"].iter().any(|n| text.name.contains(n)) {
                "John Doe"
            } else {
                "Sample text"
            }
        }
        TextKind::Number => "123",
        TextKind::Url => "https://example.com",
        TextKind::Textarea => TEXTAREA_DEFAULT,
        _ => "Sample value",
    };
    value.to_string()
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
