//! Allowance manager integration tests over the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use coinrush_core::{
    Account, AllowanceDefaults, Clock, CoinrushError, LeaderboardRow, ManualClock, Result,
    ScoreEntry,
    WalletAddress, SPEND_EPSILON,
};
use coinrush_service::{AccountProvisioner, AllowanceManager, ProvisionRequest};
use coinrush_store::{AccountRepository, CommitResult, MemoryAccountStore, Versioned};

const DAY: i64 = 86_400;

fn test_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap()))
}

fn manager_over(
    store: Arc<dyn AccountRepository>,
    clock: Arc<ManualClock>,
) -> (AccountProvisioner, AllowanceManager) {
    let defaults = AllowanceDefaults::default();
    (
        AccountProvisioner::new(store.clone(), clock.clone(), defaults),
        AllowanceManager::new(store, clock, defaults),
    )
}

fn harness() -> (Arc<MemoryAccountStore>, Arc<ManualClock>, AccountProvisioner, AllowanceManager) {
    let store = Arc::new(MemoryAccountStore::new());
    let clock = test_clock();
    let (provisioner, manager) = manager_over(store.clone(), clock.clone());
    (store, clock, provisioner, manager)
}

fn wallet() -> WalletAddress {
    WalletAddress::parse("0xabc123").unwrap()
}

async fn provision(provisioner: &AccountProvisioner) {
    provisioner
        .provision(ProvisionRequest {
            wallet_address: "0xabc123".to_string(),
            parent_wallet_address: None,
            username: "Ada".to_string(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn spend_accumulates_and_over_limit_is_rejected() {
    let (_, _, provisioner, manager) = harness();
    provision(&provisioner).await;

    let outcome = manager.try_spend(&wallet(), 0.004).await.unwrap();
    assert!((outcome.new_spent_total - 0.004).abs() < SPEND_EPSILON);

    let err = manager.try_spend(&wallet(), 0.007).await.unwrap_err();
    assert_eq!(err.kind(), "limit_exceeded");

    // The rejected spend left no partial state behind.
    let account = manager.fetch_account(&wallet()).await.unwrap();
    assert!((account.allowance_spent_this_period_eth - 0.004).abs() < SPEND_EPSILON);
}

#[tokio::test]
async fn expired_window_rolls_before_the_spend_is_applied() {
    let (_, clock, provisioner, manager) = harness();
    provision(&provisioner).await;
    manager.try_spend(&wallet(), 0.004).await.unwrap();

    clock.advance_secs(DAY);
    let rolled_at = clock.now();

    let outcome = manager.try_spend(&wallet(), 0.004).await.unwrap();
    assert!((outcome.new_spent_total - 0.004).abs() < SPEND_EPSILON);
    assert_eq!(outcome.account.allowance_period_start, Some(rolled_at));
}

#[tokio::test]
async fn exact_remaining_amount_succeeds_and_epsilon_overshoot_fails() {
    let (_, _, provisioner, manager) = harness();
    provision(&provisioner).await;
    manager.try_spend(&wallet(), 0.004).await.unwrap();

    // limit − spent exactly
    let outcome = manager.try_spend(&wallet(), 0.006).await.unwrap();
    assert!((outcome.new_spent_total - 0.01).abs() < SPEND_EPSILON);

    // anything past 2ε over the boundary must be rejected
    let err = manager
        .try_spend(&wallet(), 2.0 * SPEND_EPSILON)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "limit_exceeded");
}

#[tokio::test]
async fn rollover_commits_even_when_the_triggering_spend_is_rejected() {
    let (_, clock, provisioner, manager) = harness();
    provision(&provisioner).await;
    manager.try_spend(&wallet(), 0.004).await.unwrap();

    clock.advance_secs(DAY + 5);
    let rolled_at = clock.now();

    let err = manager.try_spend(&wallet(), 0.02).await.unwrap_err();
    assert_eq!(err.kind(), "limit_exceeded");

    // The window boundary is durable regardless of the rejection.
    let account = manager.fetch_account(&wallet()).await.unwrap();
    assert_eq!(account.allowance_period_start, Some(rolled_at));
    assert_eq!(account.allowance_spent_this_period_eth, 0.0);
}

#[tokio::test]
async fn rollover_happens_exactly_once_per_expiry() {
    let (store, clock, provisioner, manager) = harness();
    provision(&provisioner).await;
    manager.try_spend(&wallet(), 0.004).await.unwrap();

    clock.advance_secs(DAY);
    let first = manager.fetch_account(&wallet()).await.unwrap();
    assert_eq!(first.allowance_spent_this_period_eth, 0.0);
    let version_after_roll = store.get_account(&wallet()).await.unwrap().unwrap().version;

    // A second observation at the same instant must not reset again.
    let second = manager.fetch_account(&wallet()).await.unwrap();
    assert_eq!(second.allowance_period_start, first.allowance_period_start);
    let version_after_second = store.get_account(&wallet()).await.unwrap().unwrap().version;
    assert_eq!(version_after_roll, version_after_second);
}

#[tokio::test]
async fn fetch_initializes_a_window_that_was_never_set() {
    let (store, clock, _, manager) = harness();
    let bare = Account {
        wallet_address: wallet(),
        parent_wallet_address: None,
        username: coinrush_core::Username::chosen("Ada").unwrap(),
        personal_best_score: 0,
        current_allowance_limit_eth: None,
        current_allowance_period_seconds: None,
        allowance_period_start: None,
        allowance_spent_this_period_eth: 0.0,
    };
    store.upsert_account(bare).await.unwrap();

    let account = manager.fetch_account(&wallet()).await.unwrap();
    assert_eq!(account.current_allowance_limit_eth, Some(0.01));
    assert_eq!(account.current_allowance_period_seconds, Some(86_400));
    assert_eq!(account.allowance_period_start, Some(clock.now()));
}

#[tokio::test]
async fn concurrent_spends_cannot_jointly_exceed_the_limit() {
    let (_, _, provisioner, manager) = harness();
    provision(&provisioner).await;

    let (a, b) = futures::future::join(
        manager.try_spend(&wallet(), 0.006),
        manager.try_spend(&wallet(), 0.006),
    )
    .await;

    // Each spend fits in isolation, but at most one may commit.
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let account = manager.fetch_account(&wallet()).await.unwrap();
    assert!(account.allowance_spent_this_period_eth <= 0.01 + SPEND_EPSILON);
    assert!((account.allowance_spent_this_period_eth - 0.006).abs() < SPEND_EPSILON);
}

#[tokio::test]
async fn unknown_wallet_and_bad_amounts_are_rejected_up_front() {
    let (_, _, _, manager) = harness();
    let err = manager.try_spend(&wallet(), 0.001).await.unwrap_err();
    assert_eq!(err.kind(), "not_found");

    for bad in [0.0, -0.5, f64::NAN, f64::INFINITY] {
        let err = manager.try_spend(&wallet(), bad).await.unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }
}

/// Store whose conditional writes always report a lost version race.
struct AlwaysContendedStore {
    inner: MemoryAccountStore,
}

#[async_trait]
impl AccountRepository for AlwaysContendedStore {
    async fn get_account(&self, wallet: &WalletAddress) -> Result<Option<Versioned<Account>>> {
        self.inner.get_account(wallet).await
    }

    async fn upsert_account(&self, account: Account) -> Result<Versioned<Account>> {
        self.inner.upsert_account(account).await
    }

    async fn update_account_if_version(
        &self,
        _wallet: &WalletAddress,
        _expected_version: u64,
        _account: Account,
    ) -> Result<CommitResult> {
        Ok(CommitResult::Stale)
    }

    async fn append_score_if_version(
        &self,
        wallet: &WalletAddress,
        expected_version: u64,
        new_best: Option<u64>,
        entry: ScoreEntry,
    ) -> Result<CommitResult> {
        self.inner
            .append_score_if_version(wallet, expected_version, new_best, entry)
            .await
    }

    async fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardRow>> {
        self.inner.top_scores(limit).await
    }
}

#[tokio::test]
async fn exhausted_retries_surface_as_conflict() {
    let store = Arc::new(AlwaysContendedStore {
        inner: MemoryAccountStore::new(),
    });
    let clock = test_clock();
    let (provisioner, manager) = manager_over(store, clock);
    provision(&provisioner).await;

    let err = manager.try_spend(&wallet(), 0.001).await.unwrap_err();
    assert_eq!(err.kind(), "conflict");
    assert!(err.is_retryable());
}

/// Store whose reads fail like a timed-out backend.
struct UnavailableStore;

#[async_trait]
impl AccountRepository for UnavailableStore {
    async fn get_account(&self, _wallet: &WalletAddress) -> Result<Option<Versioned<Account>>> {
        Err(CoinrushError::store("read timed out"))
    }

    async fn upsert_account(&self, _account: Account) -> Result<Versioned<Account>> {
        Err(CoinrushError::store("write timed out"))
    }

    async fn update_account_if_version(
        &self,
        _wallet: &WalletAddress,
        _expected_version: u64,
        _account: Account,
    ) -> Result<CommitResult> {
        Err(CoinrushError::store("write timed out"))
    }

    async fn append_score_if_version(
        &self,
        _wallet: &WalletAddress,
        _expected_version: u64,
        _new_best: Option<u64>,
        _entry: ScoreEntry,
    ) -> Result<CommitResult> {
        Err(CoinrushError::store("write timed out"))
    }

    async fn top_scores(&self, _limit: usize) -> Result<Vec<LeaderboardRow>> {
        Err(CoinrushError::store("read timed out"))
    }
}

#[tokio::test]
async fn store_failures_surface_as_retryable_errors() {
    let store: Arc<dyn AccountRepository> = Arc::new(UnavailableStore);
    let clock = test_clock();
    let manager = AllowanceManager::new(store, clock, AllowanceDefaults::default());

    let err = manager.try_spend(&wallet(), 0.001).await.unwrap_err();
    assert_eq!(err.kind(), "store_unavailable");
    assert!(err.is_retryable());
}
