use std::sync::Arc;

use count_core::model::{CoinOutcome, Passcode, RewardLedger};
use storage::repository::LedgerStore;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::RewardError;

/// Coin and egg counters shared by every drill.
///
/// The ledger is read from storage once. Every change is saved first and only
/// then becomes visible in memory, so a failed save leaves both unchanged.
#[derive(Clone)]
pub struct RewardService {
    store: LedgerStore,
    passcode: Passcode,
    ledger: Arc<Mutex<RewardLedger>>,
}

impl RewardService {
    /// Load the persisted ledger.
    ///
    /// # Errors
    ///
    /// Returns `RewardError::Storage` if the counters cannot be read.
    pub async fn load(store: LedgerStore, passcode: Passcode) -> Result<Self, RewardError> {
        let ledger = store.load().await?;
        debug!(coins = ledger.coins(), eggs = ledger.eggs(), "loaded reward ledger");
        Ok(Self {
            store,
            passcode,
            ledger: Arc::new(Mutex::new(ledger)),
        })
    }

    /// Current counters.
    pub async fn ledger(&self) -> RewardLedger {
        *self.ledger.lock().await
    }

    /// Credit one coin for a correct answer and persist the result.
    ///
    /// # Errors
    ///
    /// Returns `RewardError::Storage` if the ledger cannot be saved. The
    /// counters are left as they were.
    pub async fn earn_coin(&self) -> Result<(CoinOutcome, RewardLedger), RewardError> {
        let mut guard = self.ledger.lock().await;
        let mut next = *guard;
        let outcome = next.earn_coin();
        self.store.save(&next).await?;
        *guard = next;
        drop(guard);

        match outcome {
            CoinOutcome::Coin => debug!(coins = next.coins(), "coin earned"),
            CoinOutcome::HatchedEgg => debug!(eggs = next.eggs(), "coins hatched an egg"),
        }
        Ok((outcome, next))
    }

    /// Check `attempt` against the passcode and open the editor on a match.
    ///
    /// # Errors
    ///
    /// Returns `RewardError::WrongPasscode` if the attempt does not match.
    pub fn unlock(&self, attempt: &str) -> Result<RewardEditor<'_>, RewardError> {
        if !self.passcode.matches(attempt) {
            warn!("reward editor unlock rejected");
            return Err(RewardError::WrongPasscode);
        }
        info!("reward editor unlocked");
        Ok(RewardEditor { service: self })
    }

    async fn replace(&self, ledger: RewardLedger) -> Result<RewardLedger, RewardError> {
        let mut guard = self.ledger.lock().await;
        self.store.save(&ledger).await?;
        *guard = ledger;
        Ok(ledger)
    }
}

/// Unlocked access to overwrite the counters.
pub struct RewardEditor<'a> {
    service: &'a RewardService,
}

impl RewardEditor<'_> {
    /// Counters the editor starts from.
    pub async fn current(&self) -> RewardLedger {
        self.service.ledger().await
    }

    /// Overwrite both counters. Ten or more coins are carried into eggs.
    ///
    /// # Errors
    ///
    /// Returns `RewardError::Storage` if the ledger cannot be saved.
    pub async fn overwrite(&self, coins: u32, eggs: u32) -> Result<RewardLedger, RewardError> {
        let ledger = RewardLedger::from_totals(coins, eggs);
        let saved = self.service.replace(ledger).await?;
        info!(coins = saved.coins(), eggs = saved.eggs(), "reward ledger overwritten");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use storage::repository::{
        COINS_KEY, EGGS_KEY, InMemoryRepository, KeyValueStore, StorageError,
    };

    /// Key/value store whose writes fail while `failing` is set.
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemoryRepository,
        failing: AtomicBool,
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StorageError::Connection("disk unavailable".into()));
            }
            self.inner.set(key, value).await
        }
    }

    async fn service_with(repo: &InMemoryRepository) -> RewardService {
        let store = LedgerStore::new(Arc::new(repo.clone()));
        RewardService::load(store, Passcode::default()).await.unwrap()
    }

    #[tokio::test]
    async fn tenth_coin_hatches_an_egg_and_persists() {
        let repo = InMemoryRepository::new();
        repo.set(COINS_KEY, "9").await.unwrap();
        repo.set(EGGS_KEY, "1").await.unwrap();
        let rewards = service_with(&repo).await;

        let (outcome, ledger) = rewards.earn_coin().await.unwrap();
        assert_eq!(outcome, CoinOutcome::HatchedEgg);
        assert_eq!(ledger, RewardLedger::from_totals(0, 2));
        assert_eq!(repo.get(COINS_KEY).await.unwrap().as_deref(), Some("0"));
        assert_eq!(repo.get(EGGS_KEY).await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn wrong_passcode_keeps_editor_locked() {
        let repo = InMemoryRepository::new();
        let rewards = service_with(&repo).await;
        assert!(matches!(rewards.unlock("1357"), Err(RewardError::WrongPasscode)));
        assert!(matches!(rewards.unlock(""), Err(RewardError::WrongPasscode)));
        assert!(rewards.unlock("2468").is_ok());
    }

    #[tokio::test]
    async fn overwrite_normalizes_and_persists() {
        let repo = InMemoryRepository::new();
        let rewards = service_with(&repo).await;
        let editor = rewards.unlock("2468").unwrap();

        let ledger = editor.overwrite(23, 1).await.unwrap();
        assert_eq!(ledger.coins(), 3);
        assert_eq!(ledger.eggs(), 3);
        assert_eq!(rewards.ledger().await, ledger);

        let reloaded = service_with(&repo).await;
        assert_eq!(reloaded.ledger().await, ledger);
    }

    #[tokio::test]
    async fn custom_passcode_replaces_default() {
        let repo = InMemoryRepository::new();
        let store = LedgerStore::new(Arc::new(repo));
        let rewards = RewardService::load(store, Passcode::new("0000").unwrap())
            .await
            .unwrap();
        assert!(rewards.unlock("2468").is_err());
        assert!(rewards.unlock("0000").is_ok());
    }

    #[tokio::test]
    async fn failed_save_leaves_counters_untouched() {
        let store = Arc::new(FlakyStore::default());
        store.failing.store(true, Ordering::SeqCst);
        let rewards = RewardService::load(LedgerStore::new(store.clone()), Passcode::default())
            .await
            .unwrap();

        assert!(matches!(
            rewards.earn_coin().await,
            Err(RewardError::Storage(StorageError::Connection(_)))
        ));
        assert_eq!(rewards.ledger().await, RewardLedger::new());
        assert_eq!(store.inner.get(COINS_KEY).await.unwrap(), None);

        let editor = rewards.unlock("2468").unwrap();
        assert!(editor.overwrite(4, 4).await.is_err());
        assert_eq!(editor.current().await, RewardLedger::new());

        store.failing.store(false, Ordering::SeqCst);
        let (_, ledger) = rewards.earn_coin().await.unwrap();
        assert_eq!(ledger.coins(), 1);
        assert_eq!(store.inner.get(COINS_KEY).await.unwrap().as_deref(), Some("1"));
    }
}
