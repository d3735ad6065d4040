//! File-backed memory store keeping one JSONL file per user.

use crate::error::MemoryError;
use crate::model::{MemoryHit, MemoryRecord, NewMemory, UserId};
use crate::search::{SearchOptions, lexical_score, tokenize};
use crate::store::MemoryStore;
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Memory store appending JSONL records under a root directory.
#[derive(Debug)]
pub struct FileMemoryStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileMemoryStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        info!("initialized file memory store (root={})", root.display());
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Hex-encoded file name keeps arbitrary ids inside the root.
    fn user_path(&self, user_id: &UserId) -> PathBuf {
        self.root
            .join(format!("{}.jsonl", hex::encode(user_id.as_str())))
    }

    fn load_records(&self, user_id: &UserId) -> Result<Vec<MemoryRecord>, MemoryError> {
        let path = self.user_path(user_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = OpenOptions::new().read(true).open(path)?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            // A torn or hand-edited line must not hide the rest of the history.
            match serde_json::from_str::<MemoryRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(
                        "invalid memory record ignored (user_id={}, line={}): {err}",
                        user_id,
                        idx + 1
                    );
                }
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl MemoryStore for FileMemoryStore {
    async fn add(&self, memory: NewMemory) -> Result<(), MemoryError> {
        let record = MemoryRecord {
            id: Uuid::new_v4().to_string(),
            user_id: memory.user_id.to_string(),
            content: memory.content,
            metadata: serde_json::to_value(&memory.metadata)?,
            created_at: Some(Utc::now()),
        };
        let line = serde_json::to_string(&record)?;

        let _guard = self.write_lock.lock().await;
        let path = self.user_path(&memory.user_id);
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")?;
        debug!(
            "stored memory (user_id={}, role={}, content_len={})",
            memory.user_id,
            memory.metadata.role.as_str(),
            record.content.len()
        );
        Ok(())
    }

    async fn search(
        &self,
        user_id: &UserId,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<MemoryHit>, MemoryError> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() {
            return Ok(Vec::new());
        }
        // Newest first so the stable sort in `apply` prefers recent records on ties.
        let hits = self
            .load_records(user_id)?
            .into_iter()
            .rev()
            .filter_map(|record| {
                let score = lexical_score(&query_tokens, &record);
                (score > 0.0).then_some(MemoryHit {
                    record,
                    score: Some(score),
                })
            })
            .collect::<Vec<_>>();
        let hits = options.apply(hits);
        debug!(
            "searched memory (user_id={}, returned={})",
            user_id,
            hits.len()
        );
        Ok(hits)
    }

    async fn get_all(&self, user_id: &UserId) -> Result<Vec<MemoryRecord>, MemoryError> {
        self.load_records(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::FileMemoryStore;
    use crate::model::{MemoryMetadata, MemoryRole, NewMemory, UserId};
    use crate::search::SearchOptions;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn user(id: &str) -> UserId {
        UserId::new(id).expect("user id")
    }

    fn memory(user_id: &UserId, content: &str, role: MemoryRole) -> NewMemory {
        NewMemory::new(
            user_id.clone(),
            content,
            MemoryMetadata::new("customer-support", role),
        )
    }

    #[tokio::test]
    async fn get_all_preserves_insertion_order_and_tags() {
        let temp = tempdir().expect("tempdir");
        let store = FileMemoryStore::new(temp.path()).expect("store");
        let alice = user("alice");

        store
            .add(memory(&alice, "where is my phone?", MemoryRole::User))
            .await
            .expect("add query");
        store
            .add(memory(&alice, "It ships tomorrow.", MemoryRole::Assistant))
            .await
            .expect("add answer");

        let records = store.get_all(&alice).await.expect("get_all");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].content, "where is my phone?");
        assert_eq!(records[0].role(), Some(MemoryRole::User));
        assert_eq!(records[1].role(), Some(MemoryRole::Assistant));
        assert_eq!(records[1].app_id(), Some("customer-support"));
        assert_eq!(records[1].user_id, "alice");
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let temp = tempdir().expect("tempdir");
        let store = FileMemoryStore::new(temp.path()).expect("store");
        let alice = user("alice");
        let bob = user("bob");

        store
            .add(memory(&alice, "alice ordered a phone", MemoryRole::User))
            .await
            .expect("add");

        assert!(store.get_all(&bob).await.expect("get_all").is_empty());
        let hits = store
            .search(&bob, "phone", SearchOptions::default())
            .await
            .expect("search");
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn hostile_user_ids_stay_inside_root() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("memory");
        let store = FileMemoryStore::new(&root).expect("store");
        let sneaky = user("../../etc/passwd");

        store
            .add(memory(&sneaky, "hello", MemoryRole::User))
            .await
            .expect("add");

        let entries = std::fs::read_dir(&root).expect("read_dir").count();
        assert_eq!(entries, 1);
        assert_eq!(store.get_all(&sneaky).await.expect("get_all").len(), 1);
    }

    #[tokio::test]
    async fn search_ranks_by_overlap_and_skips_misses() {
        let temp = tempdir().expect("tempdir");
        let store = FileMemoryStore::new(temp.path()).expect("store");
        let alice = user("alice");
        for text in [
            "ordered a phone case",
            "the laptop arrived broken",
            "phone order delayed by courier",
        ] {
            store
                .add(memory(&alice, text, MemoryRole::System))
                .await
                .expect("add");
        }

        let hits = store
            .search(&alice, "Phone order status", SearchOptions::default())
            .await
            .expect("search");
        let contents: Vec<_> = hits.iter().map(|hit| hit.record.content.as_str()).collect();
        assert_eq!(
            contents,
            vec!["phone order delayed by courier", "ordered a phone case"]
        );

        let none = store
            .search(&alice, "?!", SearchOptions::default())
            .await
            .expect("search");
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn concurrent_appends_keep_every_line_intact() {
        let temp = tempdir().expect("tempdir");
        let store = Arc::new(FileMemoryStore::new(temp.path()).expect("store"));
        let alice = user("alice");

        let mut handles = Vec::new();
        for idx in 0..16 {
            let store = store.clone();
            let alice = alice.clone();
            handles.push(tokio::spawn(async move {
                store
                    .add(memory(&alice, &format!("note {idx}"), MemoryRole::User))
                    .await
            }));
        }
        for handle in handles {
            handle.await.expect("join").expect("add");
        }

        assert_eq!(store.get_all(&alice).await.expect("get_all").len(), 16);
    }

    #[tokio::test]
    async fn corrupt_lines_are_skipped() {
        let temp = tempdir().expect("tempdir");
        let store = FileMemoryStore::new(temp.path()).expect("store");
        let alice = user("alice");

        store
            .add(memory(&alice, "phone ordered on monday", MemoryRole::User))
            .await
            .expect("add before");
        let path = store.user_path(&alice);
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .expect("open");
        std::io::Write::write_all(&mut file, b"{\"truncated\nnot json at all\n")
            .expect("corrupt");
        drop(file);
        store
            .add(memory(&alice, "phone arrived on friday", MemoryRole::Assistant))
            .await
            .expect("add after");

        let records = store.get_all(&alice).await.expect("get_all");
        let contents: Vec<_> = records.iter().map(|record| record.content.as_str()).collect();
        assert_eq!(
            contents,
            vec!["phone ordered on monday", "phone arrived on friday"]
        );

        let hits = store
            .search(&alice, "phone", SearchOptions::default())
            .await
            .expect("search");
        assert_eq!(hits.len(), 2);
    }
}
