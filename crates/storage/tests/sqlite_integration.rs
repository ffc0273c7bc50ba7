use chrono::Duration;
use count_core::model::{
    CrossingKind, Direction, PracticeConfigDraft, PracticeMode, PracticeSummary, RewardLedger,
};
use count_core::time::fixed_now;
use storage::repository::{
    COINS_KEY, KeyValueStore, LedgerStore, PracticeSummaryRepository, StorageError,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_kv_upserts_values() {
    let repo = connect("memdb_kv").await;

    assert_eq!(repo.get("missing").await.unwrap(), None);
    repo.set("greeting", "hi").await.unwrap();
    repo.set("greeting", "hello").await.unwrap();
    assert_eq!(repo.get("greeting").await.unwrap().as_deref(), Some("hello"));
}

#[tokio::test]
async fn sqlite_ledger_round_trips_through_string_keys() {
    let repo = connect("memdb_ledger").await;
    let store = LedgerStore::new(std::sync::Arc::new(repo.clone()));

    let mut ledger = RewardLedger::from_totals(9, 0);
    ledger.earn_coin();
    store.save(&ledger).await.unwrap();

    assert_eq!(repo.get(COINS_KEY).await.unwrap().as_deref(), Some("0"));
    assert_eq!(store.load().await.unwrap(), RewardLedger::from_totals(0, 1));
}

#[tokio::test]
async fn sqlite_summaries_persist_config_and_tally() {
    let repo = connect("memdb_summaries").await;
    let now = fixed_now();

    let crossing = PracticeConfigDraft {
        mode: PracticeMode::Crossing(CrossingKind::Hundred),
        step: 10,
        start: 120,
        direction: Direction::Backward,
        count: 5,
    }
    .validate()
    .unwrap();
    let older = PracticeSummary::from_sequence(
        crossing,
        &crossing.generate(),
        5,
        7,
        now,
        now + Duration::minutes(2),
    )
    .unwrap();

    let pattern = PracticeConfigDraft::default().validate().unwrap();
    let newer = PracticeSummary::from_sequence(
        pattern,
        &pattern.generate(),
        40,
        40,
        now + Duration::minutes(3),
        now + Duration::minutes(9),
    )
    .unwrap();

    let older_id = repo.append_summary(&older).await.unwrap();
    let newer_id = repo.append_summary(&newer).await.unwrap();

    let fetched = repo.get_summary(older_id).await.unwrap();
    assert_eq!(fetched, older);
    // 120 110 100 90 80
    assert_eq!(fetched.hundred_crossings(), 1);
    assert_eq!(fetched.config().mode(), PracticeMode::Crossing(CrossingKind::Hundred));

    let rows = repo.list_summaries(10).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, newer_id);
    assert_eq!(rows[1].id, older_id);

    assert!(matches!(
        repo.get_summary(older_id + 100).await,
        Err(StorageError::NotFound)
    ));
}
