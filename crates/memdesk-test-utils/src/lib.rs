//! Test helpers shared across memdesk crates.

pub mod llm;
pub mod memory;

pub use llm::{FailingLLM, FixedChatResponse, FixedLLM, RecordingChatLLM, SilentLLM, SlowLLM};
pub use memory::{FailingStore, RecordingStore, StoreFailure};
