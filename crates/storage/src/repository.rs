use async_trait::async_trait;
use count_core::model::{PracticeSummary, RewardLedger};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── KEY/VALUE ─────────────────────────────────────────────────────────────────
//

/// String key/value persistence, the shape of browser local storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key was never written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write (or replace) a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Key holding the coin counter.
pub const COINS_KEY: &str = "golden_coins";
/// Key holding the egg counter.
pub const EGGS_KEY: &str = "golden_eggs";

/// Loads and saves the reward ledger as two decimal-string keys.
#[derive(Clone)]
pub struct LedgerStore {
    kv: Arc<dyn KeyValueStore>,
}

impl LedgerStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Read both counters. Missing or unparseable values count as 0.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn load(&self) -> Result<RewardLedger, StorageError> {
        let coins = parse_counter(self.kv.get(COINS_KEY).await?);
        let eggs = parse_counter(self.kv.get(EGGS_KEY).await?);
        Ok(RewardLedger::from_totals(coins, eggs))
    }

    /// Write both counters.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if either key cannot be stored.
    pub async fn save(&self, ledger: &RewardLedger) -> Result<(), StorageError> {
        self.kv.set(COINS_KEY, &ledger.coins().to_string()).await?;
        self.kv.set(EGGS_KEY, &ledger.eggs().to_string()).await?;
        Ok(())
    }
}

fn parse_counter(raw: Option<String>) -> u32 {
    raw.and_then(|v| v.trim().parse::<u32>().ok()).unwrap_or(0)
}

//
// ─── SUMMARIES ─────────────────────────────────────────────────────────────────
//

/// A persisted summary together with its storage id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeSummaryRow {
    pub id: i64,
    pub summary: PracticeSummary,
}

impl PracticeSummaryRow {
    #[must_use]
    pub fn new(id: i64, summary: PracticeSummary) -> Self {
        Self { id, summary }
    }
}

#[async_trait]
pub trait PracticeSummaryRepository: Send + Sync {
    /// Append a completed drill and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the summary cannot be stored.
    async fn append_summary(&self, summary: &PracticeSummary) -> Result<i64, StorageError>;

    /// Fetch a summary by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_summary(&self, id: i64) -> Result<PracticeSummary, StorageError>;

    /// List summaries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query or mapping failures.
    async fn list_summaries(&self, limit: u32) -> Result<Vec<PracticeSummaryRow>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// In-memory repository for tests and throwaway runs.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<Mutex<HashMap<String, String>>>,
    summaries: Arc<Mutex<Vec<PracticeSummary>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[async_trait]
impl PracticeSummaryRepository for InMemoryRepository {
    async fn append_summary(&self, summary: &PracticeSummary) -> Result<i64, StorageError> {
        let mut guard = self
            .summaries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(summary.clone());
        i64::try_from(guard.len()).map_err(|_| StorageError::Serialization("id overflow".into()))
    }

    async fn get_summary(&self, id: i64) -> Result<PracticeSummary, StorageError> {
        let guard = self
            .summaries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        usize::try_from(id)
            .ok()
            .and_then(|id| id.checked_sub(1))
            .and_then(|idx| guard.get(idx))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_summaries(&self, limit: u32) -> Result<Vec<PracticeSummaryRow>, StorageError> {
        let guard = self
            .summaries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let mut rows = Vec::with_capacity(guard.len().min(limit));
        for (idx, summary) in guard.iter().enumerate() {
            let id = i64::try_from(idx + 1)
                .map_err(|_| StorageError::Serialization("id overflow".into()))?;
            rows.push(PracticeSummaryRow::new(id, summary.clone()));
        }
        rows.sort_by(|a, b| {
            b.summary
                .completed_at()
                .cmp(&a.summary.completed_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(limit);
        Ok(rows)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
    pub summaries: Arc<dyn PracticeSummaryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let kv: Arc<dyn KeyValueStore> = Arc::new(repo.clone());
        let summaries: Arc<dyn PracticeSummaryRepository> = Arc::new(repo);
        Self { kv, summaries }
    }

    #[must_use]
    pub fn ledger(&self) -> LedgerStore {
        LedgerStore::new(Arc::clone(&self.kv))
    }
}
