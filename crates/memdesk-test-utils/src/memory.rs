use async_trait::async_trait;
use chrono::Utc;
use memdesk_memory::{
    MemoryError, MemoryHit, MemoryRecord, MemoryStore, NewMemory, SearchOptions, UserId,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// In-memory store that keeps every write, scoped by user.
///
/// Search scores a record by the fraction of query words it contains. The
/// write log keeps the global order of `add` calls across users.
#[derive(Clone, Default)]
pub struct RecordingStore {
    records: Arc<Mutex<HashMap<String, Vec<MemoryRecord>>>>,
    log: Arc<Mutex<Vec<(String, String)>>>,
    searches: Arc<Mutex<Vec<(String, String)>>>,
    add_delay: Option<Duration>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep inside every `add`, so unsynchronized writers would interleave.
    pub fn with_add_delay(mut self, delay: Duration) -> Self {
        self.add_delay = Some(delay);
        self
    }

    /// Insert a record directly, bypassing the write log.
    pub fn seed(&self, user_id: &str, content: &str) {
        let record = record(user_id, content, serde_json::Value::Null);
        self.records
            .lock()
            .entry(user_id.to_string())
            .or_default()
            .push(record);
    }

    pub fn records_for(&self, user_id: &str) -> Vec<MemoryRecord> {
        self.records
            .lock()
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn contents_for(&self, user_id: &str) -> Vec<String> {
        self.records_for(user_id)
            .into_iter()
            .map(|record| record.content)
            .collect()
    }

    /// Number of successful `add` calls across all users.
    pub fn write_count(&self) -> usize {
        self.log.lock().len()
    }

    /// `(user_id, content)` for every `add`, in call order.
    pub fn write_log(&self) -> Vec<(String, String)> {
        self.log.lock().clone()
    }

    /// `(user_id, query)` for every `search`, in call order.
    pub fn search_log(&self) -> Vec<(String, String)> {
        self.searches.lock().clone()
    }
}

fn record(user_id: &str, content: &str, metadata: serde_json::Value) -> MemoryRecord {
    MemoryRecord {
        id: format!("mem-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default()),
        user_id: user_id.to_string(),
        content: content.to_string(),
        metadata,
        created_at: Some(Utc::now()),
    }
}

fn words(text: &str) -> HashSet<String> {
    text.split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl MemoryStore for RecordingStore {
    async fn add(&self, memory: NewMemory) -> Result<(), MemoryError> {
        let metadata = serde_json::to_value(&memory.metadata)?;
        let user = memory.user_id.as_str().to_string();
        self.log.lock().push((user.clone(), memory.content.clone()));
        if let Some(delay) = self.add_delay {
            tokio::time::sleep(delay).await;
        }
        self.records
            .lock()
            .entry(user.clone())
            .or_default()
            .push(record(&user, &memory.content, metadata));
        Ok(())
    }

    async fn search(
        &self,
        user_id: &UserId,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<MemoryHit>, MemoryError> {
        self.searches
            .lock()
            .push((user_id.as_str().to_string(), query.to_string()));
        let query_words = words(query);
        if query_words.is_empty() {
            return Ok(Vec::new());
        }
        let hits = self
            .records_for(user_id.as_str())
            .into_iter()
            .rev()
            .filter_map(|record| {
                let record_words = words(&record.content);
                let matched = query_words
                    .iter()
                    .filter(|word| record_words.contains(*word))
                    .count();
                (matched > 0).then(|| MemoryHit {
                    score: Some(matched as f32 / query_words.len() as f32),
                    record,
                })
            })
            .collect();
        Ok(options.apply(hits))
    }

    async fn get_all(&self, user_id: &UserId) -> Result<Vec<MemoryRecord>, MemoryError> {
        Ok(self.records_for(user_id.as_str()))
    }
}

/// Which store calls a [`FailingStore`] breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreFailure {
    /// `search` fails with a transport-like status error.
    Search,
    /// `search` answers with a payload that cannot be interpreted.
    MalformedSearch,
    /// `add` fails.
    Add,
    /// `get_all` fails.
    GetAll,
}

/// Store wrapper that fails selected calls and delegates the rest.
#[derive(Clone)]
pub struct FailingStore {
    inner: RecordingStore,
    failures: HashSet<StoreFailure>,
}

impl FailingStore {
    pub fn new(failures: impl IntoIterator<Item = StoreFailure>) -> Self {
        Self::wrapping(RecordingStore::new(), failures)
    }

    pub fn wrapping(
        inner: RecordingStore,
        failures: impl IntoIterator<Item = StoreFailure>,
    ) -> Self {
        Self {
            inner,
            failures: failures.into_iter().collect(),
        }
    }

    /// Every call fails.
    pub fn unavailable() -> Self {
        Self::new([StoreFailure::Search, StoreFailure::Add, StoreFailure::GetAll])
    }

    pub fn inner(&self) -> &RecordingStore {
        &self.inner
    }

    fn fails(&self, failure: StoreFailure) -> bool {
        self.failures.contains(&failure)
    }
}

fn unavailable() -> MemoryError {
    MemoryError::Status {
        status: 503,
        body: "memory service unavailable".to_string(),
    }
}

#[async_trait]
impl MemoryStore for FailingStore {
    async fn add(&self, memory: NewMemory) -> Result<(), MemoryError> {
        if self.fails(StoreFailure::Add) {
            return Err(unavailable());
        }
        self.inner.add(memory).await
    }

    async fn search(
        &self,
        user_id: &UserId,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<MemoryHit>, MemoryError> {
        if self.fails(StoreFailure::MalformedSearch) {
            return Err(MemoryError::Malformed(
                "expected a list of results".to_string(),
            ));
        }
        if self.fails(StoreFailure::Search) {
            return Err(unavailable());
        }
        self.inner.search(user_id, query, options).await
    }

    async fn get_all(&self, user_id: &UserId) -> Result<Vec<MemoryRecord>, MemoryError> {
        if self.fails(StoreFailure::GetAll) {
            return Err(unavailable());
        }
        self.inner.get_all(user_id).await
    }
}
