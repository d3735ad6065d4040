//! Memory-augmented customer support agent.
//!
//! This crate owns the query pipeline (recall, prompt, completion, persist),
//! synthetic profile seeding, and the per-user write serialization used by the
//! SDK and CLI.

pub mod agent;
pub mod error;
pub mod profile;
pub mod prompt;
pub mod types;

pub use agent::SupportAgent;
pub use agent::builder::SupportAgentBuilder;
pub use error::{ProfileError, SupportError};
pub use types::{QueryReport, RecallStatus, SyntheticProfile};
