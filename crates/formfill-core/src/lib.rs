//! # formfill core
//!
//! The form-filling pipeline: extract candidate fields from a [`Document`],
//! resolve a value for each one, and write it back.
//!
//! [`Document`]: formfill_protocols::Document

pub mod clock;
pub mod context;
pub mod extract;
pub mod filler;
pub mod messaging;
pub mod profile;
pub mod prompt;
pub mod resolve;
pub mod rules;
pub mod snapshot;
pub mod store;
pub mod usage;
pub mod write;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{FormPurpose, PageContext};
pub use extract::{FieldExtractor, FrameFields, FrameReport, FrameScan};
pub use filler::{FieldReport, FieldStatus, FillReport, FormFiller};
pub use messaging::{MessageHandler, Request, Response, StatusLevel, StatusMessage};
pub use profile::{ProfileAttribute, ProfileManager, UserProfile};
pub use resolve::{Phase, ValueResolver};
pub use rules::RuleSet;
pub use snapshot::PageSnapshot;
pub use store::{JsonFileStore, MemoryStore};
pub use usage::{BudgetCheck, UsageReport, UsageTracker};
pub use write::{FieldWriter, WriteOutcome};
