//! Read-side views over a profile: attribute lookup, the fill-time
//! profile, summaries and completion scoring.

use std::borrow::Cow;

use serde::Serialize;

use super::model::{BasicInfo, ProfessionalInfo, UserProfile};

/// A profile value a fallback rule can map a field to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileAttribute {
    Email,
    FirstName,
    LastName,
    FullName,
    Phone,
    Address,
    City,
    State,
    ZipCode,
    Country,
    Company,
    JobTitle,
    Website,
}

impl UserProfile {
    pub fn attribute(&self, attr: ProfileAttribute) -> String {
        let b = &self.basic;
        let p = &self.professional;
        match attr {
            ProfileAttribute::Email => b.email.clone(),
            ProfileAttribute::FirstName => b.first_name.clone(),
            ProfileAttribute::LastName => b.last_name.clone(),
            ProfileAttribute::FullName => self.full_name(),
            ProfileAttribute::Phone => b.phone.clone(),
            ProfileAttribute::Address => b.address.clone(),
            ProfileAttribute::City => b.city.clone(),
            ProfileAttribute::State => b.state.clone(),
            ProfileAttribute::ZipCode => b.zip_code.clone(),
            ProfileAttribute::Country => b.country.clone(),
            ProfileAttribute::Company => p.company.clone(),
            ProfileAttribute::JobTitle => p.job_title.clone(),
            ProfileAttribute::Website => b.website.clone(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.basic.first_name, self.basic.last_name)
            .trim()
            .to_string()
    }

    /// Whether the profile carries enough identity to fill with.
    pub fn has_identity(&self) -> bool {
        !self.basic.first_name.is_empty() || !self.basic.email.is_empty()
    }

    /// Profile used when the stored one has neither first name nor email.
    pub fn demo() -> Self {
        Self {
            basic: BasicInfo {
                first_name: "John".to_string(),
                last_name: "Doe".to_string(),
                email: "john.doe@example.com".to_string(),
                phone: "+1-555-123-4567".to_string(),
                address: "123 Main St".to_string(),
                city: "New York".to_string(),
                state: "NY".to_string(),
                zip_code: "10001".to_string(),
                country: "USA".to_string(),
                website: "https://example.com".to_string(),
                ..BasicInfo::default()
            },
            professional: ProfessionalInfo {
                company: "Tech Corp".to_string(),
                job_title: "Software Engineer".to_string(),
                ..ProfessionalInfo::default()
            },
            ..Self::default()
        }
    }

    /// The profile the pipeline fills from.
    pub fn for_filling(&self) -> Cow<'_, UserProfile> {
        if self.has_identity() {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(Self::demo())
        }
    }

    pub fn summary(&self) -> ProfileSummary {
        let b = &self.basic;
        let p = &self.professional;
        let latest_job = self.work_experience.first();
        let highest_education = self.education.first();

        ProfileSummary {
            full_name: self.full_name(),
            email: b.email.clone(),
            phone: b.phone.clone(),
            address: b.address.clone(),
            city: b.city.clone(),
            state: b.state.clone(),
            zip_code: b.zip_code.clone(),
            country: b.country.clone(),
            website: b.website.clone(),
            job_title: p.job_title.clone(),
            company: p.company.clone(),
            years_of_experience: p.years_of_experience.clone(),
            bio: p.bio.clone(),
            summary: p.summary.clone(),
            latest_company: latest_job.map(|w| w.company.clone()),
            latest_job_title: latest_job.map(|w| w.job_title.clone()),
            latest_job_description: latest_job.map(|w| w.description.clone()),
            highest_degree: highest_education.map(|e| e.degree.clone()),
            institution: highest_education.map(|e| e.institution.clone()),
            field_of_study: highest_education.map(|e| e.field.clone()),
        }
    }

    /// Weighted completion as an integer percentage.
    pub fn completion_score(&self) -> u8 {
        let sections = [
            (filled_ratio(&self.basic.fields()), 0.3),
            (filled_ratio(&self.professional.fields()), 0.2),
            (presence(!self.work_experience.is_empty()), 0.25),
            (presence(!self.education.is_empty()), 0.15),
            (
                self.skills
                    .categories()
                    .iter()
                    .filter(|c| !c.is_empty())
                    .count() as f64
                    / 4.0,
                0.1,
            ),
        ];

        let total: f64 = sections.iter().map(|(score, weight)| score * weight).sum();
        (total * 100.0).round() as u8
    }
}

fn filled_ratio(fields: &[&str]) -> f64 {
    if fields.is_empty() {
        return 0.0;
    }
    let filled = fields.iter().filter(|f| !f.trim().is_empty()).count();
    filled as f64 / fields.len() as f64
}

fn presence(present: bool) -> f64 {
    if present { 1.0 } else { 0.0 }
}

/// Flattened profile view for display and prompts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub website: String,
    pub job_title: String,
    pub company: String,
    pub years_of_experience: String,
    pub bio: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_job_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
}
