//! User profile: model, editing and read-side views.

mod manager;
mod model;
mod summary;

pub use manager::ProfileManager;
pub use model::*;
pub use summary::{ProfileAttribute, ProfileSummary};
