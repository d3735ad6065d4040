//! Support agent: recall, answer, remember.

use crate::error::SupportError;
use crate::profile::{flatten_profile, parse_profile};
use crate::prompt::{
    PROFILE_SYSTEM_PROMPT, conversation, format_context, profile_user_prompt,
    support_system_prompt, support_user_prompt,
};
use crate::types::{QueryReport, RecallStatus, SyntheticProfile};
use autoagents_llm::LLMProvider;
use log::{debug, error, info, warn};
use memdesk_memory::{
    MemoryCapturePolicy, MemoryHit, MemoryMetadata, MemoryRecord, MemoryRole, MemoryStore,
    NewMemory, SearchOptions, UserId,
};
use std::sync::Arc;
use std::time::Duration;

pub mod builder;
mod llm;
mod locks;

use locks::UserLocks;

/// Default text returned when a query cannot be answered.
pub const DEFAULT_FALLBACK_MESSAGE: &str =
    "Sorry, I encountered an error. Please try again later.";

/// Answers customer queries with context recalled from a per-user memory store.
pub struct SupportAgent {
    store: Arc<dyn MemoryStore>,
    llm: Arc<dyn LLMProvider>,
    profile_llm: Arc<dyn LLMProvider>,
    app_id: String,
    store_name: String,
    fallback_message: String,
    search_options: SearchOptions,
    capture_policy: MemoryCapturePolicy,
    completion_timeout: Option<Duration>,
    locks: UserLocks,
}

impl std::fmt::Debug for SupportAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupportAgent")
            .field("app_id", &self.app_id)
            .field("store_name", &self.store_name)
            .field("search_options", &self.search_options)
            .field("completion_timeout", &self.completion_timeout)
            .finish()
    }
}

impl SupportAgent {
    /// Application tag written with every memory.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Answer a query, falling back to a fixed apology on any failure.
    ///
    /// The returned text is never empty.
    pub async fn handle_query(&self, query: &str, user_id: &UserId) -> String {
        self.handle_query_report(query, user_id).await.answer
    }

    /// Answer a query and report how recall and completion went.
    pub async fn handle_query_report(&self, query: &str, user_id: &UserId) -> QueryReport {
        let (hits, recall) = match self
            .store
            .search(user_id, query, self.search_options)
            .await
        {
            Ok(hits) if hits.is_empty() => (hits, RecallStatus::Empty),
            Ok(hits) => {
                let count = hits.len();
                (hits, RecallStatus::Hits(count))
            }
            Err(err) if err.is_malformed() => {
                warn!("recall unreadable, continuing without context (user_id={user_id}): {err}");
                (Vec::new(), RecallStatus::Malformed)
            }
            Err(err) => return self.fallback(RecallStatus::Failed, user_id, err.into()),
        };
        debug!("recall finished (user_id={user_id}, status={recall:?})");

        match self.answer(query, user_id, &hits).await {
            Ok(answer) => QueryReport {
                answer,
                recall,
                fallback: false,
                error: None,
            },
            Err(err) => self.fallback(recall, user_id, err),
        }
    }

    /// List every memory for a user, in insertion order.
    pub async fn get_memories(&self, user_id: &UserId) -> Result<Vec<MemoryRecord>, SupportError> {
        let records = self.store.get_all(user_id).await.inspect_err(|err| {
            error!("failed to list memories (user_id={user_id}): {err}");
        })?;
        debug!(
            "listed memories (user_id={user_id}, count={})",
            records.len()
        );
        Ok(records)
    }

    /// Generate a profile and seed memory from it; `None` on any failure.
    pub async fn generate_synthetic_profile(&self, user_id: &UserId) -> Option<SyntheticProfile> {
        match self.try_generate_synthetic_profile(user_id).await {
            Ok(profile) => Some(profile),
            Err(err) => {
                error!("synthetic profile failed (user_id={user_id}): {err}");
                None
            }
        }
    }

    /// Generate a profile and seed memory from it.
    ///
    /// Nothing is written unless the completion parses as a non-empty JSON
    /// object.
    pub async fn try_generate_synthetic_profile(
        &self,
        user_id: &UserId,
    ) -> Result<SyntheticProfile, SupportError> {
        let today = chrono::Local::now().date_naive();
        let messages = conversation(
            PROFILE_SYSTEM_PROMPT.to_string(),
            profile_user_prompt(&self.store_name, today),
        );
        let text =
            llm::complete_text(self.profile_llm.as_ref(), &messages, self.completion_timeout)
                .await?;
        let data = parse_profile(&text)?;
        let candidates = flatten_profile(&data);

        let _guard = self.locks.acquire(user_id).await;
        let mut facts = Vec::with_capacity(candidates.len());
        for fact in candidates {
            if self.remember(user_id, &fact, MemoryRole::System).await? {
                facts.push(fact);
            }
        }
        info!(
            "seeded synthetic profile (user_id={user_id}, facts={})",
            facts.len()
        );
        Ok(SyntheticProfile { data, facts })
    }

    async fn answer(
        &self,
        query: &str,
        user_id: &UserId,
        hits: &[MemoryHit],
    ) -> Result<String, SupportError> {
        let messages = conversation(
            support_system_prompt(&self.store_name),
            support_user_prompt(&format_context(hits), query),
        );
        let answer =
            llm::complete_text(self.llm.as_ref(), &messages, self.completion_timeout).await?;

        let _guard = self.locks.acquire(user_id).await;
        self.remember(user_id, query, MemoryRole::User).await?;
        self.remember(user_id, &answer, MemoryRole::Assistant).await?;
        info!("answered query (user_id={user_id}, recalled={})", hits.len());
        Ok(answer)
    }

    async fn remember(
        &self,
        user_id: &UserId,
        content: &str,
        role: MemoryRole,
    ) -> Result<bool, SupportError> {
        let memory = NewMemory::new(
            user_id.clone(),
            content,
            MemoryMetadata::new(self.app_id.clone(), role),
        );
        let stored = self
            .store
            .add_with_policy(memory, &self.capture_policy)
            .await?;
        if !stored {
            debug!(
                "capture policy skipped memory (user_id={user_id}, role={})",
                role.as_str()
            );
        }
        Ok(stored)
    }

    fn fallback(&self, recall: RecallStatus, user_id: &UserId, err: SupportError) -> QueryReport {
        error!("query failed, returning fallback (user_id={user_id}): {err}");
        QueryReport {
            answer: self.fallback_message.clone(),
            recall,
            fallback: true,
            error: Some(err.to_string()),
        }
    }
}
