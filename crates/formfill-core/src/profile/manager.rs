//! Profile persistence and editing.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use formfill_protocols::error::{ProfileError, StoreError};
use formfill_protocols::store::KeyValueStore;

use super::model::{Education, Skill, SkillCategory, UserProfile, WorkExperience};
use crate::clock::{Clock, SystemClock};
use crate::store::PROFILE_KEY;

/// Loads, edits and saves the user profile in a [`KeyValueStore`].
///
/// Every mutating call is a load, modify, save cycle; the store is the only
/// copy of the profile.
pub struct ProfileManager {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl ProfileManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Load the stored profile, with defaults for anything missing.
    pub async fn load(&self) -> Result<UserProfile, ProfileError> {
        match self.store.get(PROFILE_KEY).await? {
            Some(value) => {
                let profile = UserProfile::from_value(value).map_err(StoreError::from)?;
                Ok(profile)
            }
            None => {
                debug!("No stored profile, using defaults");
                Ok(UserProfile::default())
            }
        }
    }

    pub async fn save(&self, profile: &UserProfile) -> Result<(), ProfileError> {
        let value = serde_json::to_value(profile).map_err(StoreError::from)?;
        self.store.set(PROFILE_KEY, value).await?;
        debug!("Profile saved");
        Ok(())
    }

    /// Pretty-printed JSON of the stored profile.
    pub async fn export(&self) -> Result<String, ProfileError> {
        let profile = self.load().await?;
        serde_json::to_string_pretty(&profile)
            .map_err(|e| ProfileError::Store(StoreError::from(e)))
    }

    /// Replace the stored profile with an imported document.
    ///
    /// Invalid JSON fails without touching the stored profile.
    pub async fn import(&self, data: &str) -> Result<UserProfile, ProfileError> {
        let value: serde_json::Value = serde_json::from_str(data).map_err(|e| {
            warn!("Rejected profile import: {}", e);
            ProfileError::InvalidImport(e.to_string())
        })?;
        let profile =
            UserProfile::from_value(value).map_err(|e| ProfileError::InvalidImport(e.to_string()))?;
        self.save(&profile).await?;
        info!("Profile imported");
        Ok(profile)
    }

    async fn modify<T>(
        &self,
        f: impl FnOnce(&mut UserProfile) -> Result<T, ProfileError>,
    ) -> Result<T, ProfileError> {
        let mut profile = self.load().await?;
        let out = f(&mut profile)?;
        self.save(&profile).await?;
        Ok(out)
    }

    pub async fn add_work_experience(
        &self,
        mut experience: WorkExperience,
    ) -> Result<WorkExperience, ProfileError> {
        if experience.id.is_empty() {
            experience.id = new_id();
        }
        self.modify(|p| {
            p.work_experience.push(experience.clone());
            Ok(experience)
        })
        .await
    }

    pub async fn update_work_experience(
        &self,
        id: &str,
        update: impl FnOnce(&mut WorkExperience),
    ) -> Result<WorkExperience, ProfileError> {
        self.modify(|p| {
            let entry = p
                .work_experience
                .iter_mut()
                .find(|w| w.id == id)
                .ok_or_else(|| ProfileError::EntryNotFound(id.to_string()))?;
            update(entry);
            entry.id = id.to_string();
            Ok(entry.clone())
        })
        .await
    }

    /// Returns whether an entry was removed.
    pub async fn remove_work_experience(&self, id: &str) -> Result<bool, ProfileError> {
        self.modify(|p| {
            let before = p.work_experience.len();
            p.work_experience.retain(|w| w.id != id);
            Ok(p.work_experience.len() != before)
        })
        .await
    }

    pub async fn add_education(&self, mut education: Education) -> Result<Education, ProfileError> {
        if education.id.is_empty() {
            education.id = new_id();
        }
        self.modify(|p| {
            p.education.push(education.clone());
            Ok(education)
        })
        .await
    }

    pub async fn update_education(
        &self,
        id: &str,
        update: impl FnOnce(&mut Education),
    ) -> Result<Education, ProfileError> {
        self.modify(|p| {
            let entry = p
                .education
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| ProfileError::EntryNotFound(id.to_string()))?;
            update(entry);
            entry.id = id.to_string();
            Ok(entry.clone())
        })
        .await
    }

    pub async fn remove_education(&self, id: &str) -> Result<bool, ProfileError> {
        self.modify(|p| {
            let before = p.education.len();
            p.education.retain(|e| e.id != id);
            Ok(p.education.len() != before)
        })
        .await
    }

    pub async fn add_skill(
        &self,
        category: SkillCategory,
        mut skill: Skill,
    ) -> Result<Skill, ProfileError> {
        if skill.id.is_empty() {
            skill.id = new_id();
        }
        self.modify(|p| {
            p.skills.category_mut(category).push(skill.clone());
            Ok(skill)
        })
        .await
    }

    pub async fn update_skill(
        &self,
        category: SkillCategory,
        id: &str,
        update: impl FnOnce(&mut Skill),
    ) -> Result<Skill, ProfileError> {
        self.modify(|p| {
            let entry = p
                .skills
                .category_mut(category)
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or_else(|| ProfileError::EntryNotFound(id.to_string()))?;
            update(entry);
            entry.id = id.to_string();
            Ok(entry.clone())
        })
        .await
    }

    pub async fn remove_skill(&self, category: SkillCategory, id: &str) -> Result<bool, ProfileError> {
        self.modify(|p| {
            let skills = p.skills.category_mut(category);
            let before = skills.len();
            skills.retain(|s| s.id != id);
            Ok(skills.len() != before)
        })
        .await
    }

    /// Replace resume text and file name, stamping the update time.
    pub async fn update_resume(
        &self,
        text: Option<String>,
        file_name: Option<String>,
    ) -> Result<(), ProfileError> {
        let now = self.clock.now();
        self.modify(|p| {
            if let Some(text) = text {
                p.resume.text = text;
            }
            if let Some(file_name) = file_name {
                p.resume.file_name = file_name;
            }
            p.resume.last_updated = Some(now);
            Ok(())
        })
        .await
    }

    /// Record a fill attempt in the profile analytics.
    pub async fn track_form_fill(&self, success: bool, site: &str) -> Result<(), ProfileError> {
        let now = self.clock.now();
        self.modify(|p| {
            p.analytics.total_forms_filled += 1;
            if success {
                p.analytics.successful_fills += 1;
            }
            p.analytics.last_used = Some(now);
            p.analytics.add_favorite_site(site);
            Ok(())
        })
        .await
    }

    /// The profile to fill with: the stored one, or the demo profile when
    /// the stored one has no identity.
    pub async fn profile_for_filling(&self) -> Result<UserProfile, ProfileError> {
        let profile = self.load().await?;
        if !profile.has_identity() {
            warn!("Stored profile has no name or email, filling with demo values");
        }
        Ok(profile.for_filling().into_owned())
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
