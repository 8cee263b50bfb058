//! The persisted user profile.
//!
//! Every struct defaults each field, so a partially filled document (an
//! older export, a hand-written import) deserializes with the missing parts
//! filled in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserProfile {
    pub basic: BasicInfo,
    pub professional: ProfessionalInfo,
    pub work_experience: Vec<WorkExperience>,
    pub education: Vec<Education>,
    pub skills: Skills,
    pub job_preferences: JobPreferences,
    pub resume: Resume,
    pub settings: Settings,
    pub analytics: Analytics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BasicInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub website: String,
    pub linkedin: String,
    pub github: String,
    pub portfolio: String,
}

impl BasicInfo {
    pub(crate) fn fields(&self) -> [&str; 13] {
        [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone,
            &self.address,
            &self.city,
            &self.state,
            &self.zip_code,
            &self.country,
            &self.website,
            &self.linkedin,
            &self.github,
            &self.portfolio,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfessionalInfo {
    pub job_title: String,
    pub company: String,
    pub industry: String,
    pub years_of_experience: String,
    pub bio: String,
    pub summary: String,
}

impl ProfessionalInfo {
    pub(crate) fn fields(&self) -> [&str; 6] {
        [
            &self.job_title,
            &self.company,
            &self.industry,
            &self.years_of_experience,
            &self.bio,
            &self.summary,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkExperience {
    pub id: String,
    pub company: String,
    pub job_title: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub description: String,
    pub achievements: Vec<String>,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Education {
    pub id: String,
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub gpa: String,
    pub description: String,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub level: SkillLevel,
    pub years: String,
}

impl Skill {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for Skill {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            level: SkillLevel::Intermediate,
            years: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

/// Skill buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Technical,
    Languages,
    Tools,
    Certifications,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skills {
    pub technical: Vec<Skill>,
    pub languages: Vec<Skill>,
    pub tools: Vec<Skill>,
    pub certifications: Vec<Skill>,
}

impl Skills {
    pub fn category(&self, category: SkillCategory) -> &Vec<Skill> {
        match category {
            SkillCategory::Technical => &self.technical,
            SkillCategory::Languages => &self.languages,
            SkillCategory::Tools => &self.tools,
            SkillCategory::Certifications => &self.certifications,
        }
    }

    pub fn category_mut(&mut self, category: SkillCategory) -> &mut Vec<Skill> {
        match category {
            SkillCategory::Technical => &mut self.technical,
            SkillCategory::Languages => &mut self.languages,
            SkillCategory::Tools => &mut self.tools,
            SkillCategory::Certifications => &mut self.certifications,
        }
    }

    pub(crate) fn categories(&self) -> [&Vec<Skill>; 4] {
        [
            &self.technical,
            &self.languages,
            &self.tools,
            &self.certifications,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobPreferences {
    pub desired_salary: SalaryRange,
    pub location: LocationPreference,
    pub industries: Vec<String>,
    pub company_size: Vec<String>,
    pub work_type: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalaryRange {
    pub min: String,
    pub max: String,
    pub currency: String,
}

impl Default for SalaryRange {
    fn default() -> Self {
        Self {
            min: String::new(),
            max: String::new(),
            currency: "USD".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocationPreference {
    pub cities: Vec<String>,
    pub countries: Vec<String>,
    pub remote_work: RemoteWork,
    pub relocation: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteWork {
    Onsite,
    Remote,
    #[default]
    Hybrid,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Resume {
    pub text: String,
    pub file_name: String,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub theme: Theme,
    pub auto_fill: bool,
    pub smart_suggestions: bool,
    pub privacy_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            auto_fill: true,
            smart_suggestions: true,
            privacy_mode: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Analytics {
    pub total_forms_filled: u64,
    pub successful_fills: u64,
    pub last_used: Option<DateTime<Utc>>,
    pub favorite_sites: Vec<String>,
}

/// Number of favourite sites kept in analytics.
pub const MAX_FAVORITE_SITES: usize = 10;

impl Analytics {
    /// Append a site if new, keeping only the most recent entries.
    pub fn add_favorite_site(&mut self, site: &str) {
        if site.is_empty() || self.favorite_sites.iter().any(|s| s == site) {
            return;
        }
        self.favorite_sites.push(site.to_string());
        if self.favorite_sites.len() > MAX_FAVORITE_SITES {
            let excess = self.favorite_sites.len() - MAX_FAVORITE_SITES;
            self.favorite_sites.drain(..excess);
        }
    }
}

/// Keys of the older single-level profile shape.
const FLAT_BASIC_KEYS: &[&str] = &[
    "firstName",
    "lastName",
    "email",
    "phone",
    "address",
    "city",
    "state",
    "zipCode",
    "country",
    "website",
];

const FLAT_PROFESSIONAL_KEYS: &[&str] = &["company", "jobTitle"];

impl UserProfile {
    /// Parse a profile document, accepting the single-level shape
    /// (`{"firstName": .., "email": .., "company": ..}`) as well.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let value = match value {
            serde_json::Value::Object(map)
                if !map.contains_key("basic")
                    && FLAT_BASIC_KEYS.iter().any(|k| map.contains_key(*k)) =>
            {
                let mut basic = serde_json::Map::new();
                let mut professional = serde_json::Map::new();
                let mut rest = serde_json::Map::new();
                for (key, v) in map {
                    if FLAT_BASIC_KEYS.contains(&key.as_str()) {
                        basic.insert(key, v);
                    } else if FLAT_PROFESSIONAL_KEYS.contains(&key.as_str()) {
                        professional.insert(key, v);
                    } else {
                        rest.insert(key, v);
                    }
                }
                rest.insert("basic".to_string(), basic.into());
                rest.entry("professional".to_string())
                    .or_insert_with(|| professional.into());
                serde_json::Value::Object(rest)
            }
            other => other,
        };
        serde_json::from_value(value)
    }
}
