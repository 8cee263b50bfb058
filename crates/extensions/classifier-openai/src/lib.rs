//! OpenAI chat-completion classifier for formfill.

mod api;
mod classifier;

pub use classifier::OpenAIClassifier;
