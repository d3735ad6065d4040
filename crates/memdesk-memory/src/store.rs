//! Memory store contract.

use crate::error::MemoryError;
use crate::model::{MemoryHit, MemoryRecord, NewMemory, UserId};
use crate::policy::MemoryCapturePolicy;
use crate::search::SearchOptions;
use async_trait::async_trait;

#[async_trait]
/// Key-fact store scoped by user identity.
///
/// Implementations must never return records owned by one user from a call
/// made for another.
pub trait MemoryStore: Send + Sync {
    /// Persist one memory.
    async fn add(&self, memory: NewMemory) -> Result<(), MemoryError>;

    /// Persist one memory after applying the capture policy.
    ///
    /// Returns false when the policy filtered the memory out.
    async fn add_with_policy(
        &self,
        memory: NewMemory,
        policy: &MemoryCapturePolicy,
    ) -> Result<bool, MemoryError> {
        let Some(memory) = policy.apply(memory)? else {
            return Ok(false);
        };
        self.add(memory).await?;
        Ok(true)
    }

    /// Find memories relevant to `query`, best first.
    async fn search(
        &self,
        user_id: &UserId,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<MemoryHit>, MemoryError>;

    /// List every memory for a user in insertion order.
    async fn get_all(&self, user_id: &UserId) -> Result<Vec<MemoryRecord>, MemoryError>;
}
