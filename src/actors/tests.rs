use super::LedgerActor;
use crate::models::{LedgerConfig, LedgerError, LedgerStore};
use crate::storage::{SessionStorage, Storage};
use crate::types::{Category, SortOrder, Status, TransactionId};
use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

fn seeded_config(seed: u64) -> LedgerConfig {
    LedgerConfig::default().with_seed(seed)
}

#[tokio::test]
async fn test_actor_generates_a_fresh_ledger_for_a_new_session() -> Result<()> {
    let storage = Arc::new(SessionStorage::new());
    let actor = LedgerActor::spawn(1, storage.clone(), seeded_config(5));

    let page = actor.page().await?;
    let expected = LedgerStore::generated(&seeded_config(5));

    assert_eq!(page.records.as_slice(), &expected.records()[..20]);
    assert!(page.has_more);

    actor.despawn().await?;

    assert!(storage.load(1).is_some());

    Ok(())
}

#[tokio::test]
async fn test_actor_isolation_and_storage_persistence() -> Result<()> {
    let storage = Arc::new(SessionStorage::new());

    let actor_session_1 = LedgerActor::spawn(1, storage.clone(), seeded_config(1));
    let actor_session_2 = LedgerActor::spawn(2, storage.clone(), seeded_config(1));

    actor_session_1.append_live(Decimal::from_str("100.00")?).await?;
    let balance_2 = actor_session_2.balance().await?;

    actor_session_1.despawn().await?;
    actor_session_2.despawn().await?;

    let ledger_1 = storage.load(1).ok_or_else(|| anyhow!("Session 1 missing from storage"))?;
    let ledger_2 = storage.load(2).ok_or_else(|| anyhow!("Session 2 missing from storage"))?;

    assert_eq!(ledger_1.balance(), balance_2 + Decimal::from_str("100.00")?);
    assert_eq!(ledger_1.records().len(), ledger_2.records().len() + 1);

    Ok(())
}

#[tokio::test]
async fn test_actor_resumes_a_saved_session() -> Result<()> {
    let storage = Arc::new(SessionStorage::new());

    let actor = LedgerActor::spawn(7, storage.clone(), seeded_config(3));
    let record = actor.append_live(Decimal::from_str("-25.00")?).await?;
    actor.despawn().await?;

    let actor = LedgerActor::spawn(7, storage.clone(), seeded_config(99));
    let found = actor.find_by_id(&record.id).await?;

    assert_eq!(found, Some(record));

    actor.despawn().await?;

    Ok(())
}

#[tokio::test]
async fn test_actor_applies_commands_in_send_order() -> Result<()> {
    let storage = Arc::new(SessionStorage::new());
    let actor = LedgerActor::spawn(1, storage.clone(), seeded_config(2));

    let record = actor.append_live(Decimal::from_str("75.00")?).await?;
    actor.apply_filter("interest accrual")?;
    actor.sort_by(SortOrder::Oldest)?;

    let page = actor.page().await?;

    assert_eq!(page.records, vec![record.clone()]);
    assert_eq!(page.records[0].category, Category::Deposit);
    assert_eq!(page.records[0].status, Status::Pending);
    assert_eq!(actor.recent(3).await?.first(), Some(&record));

    actor.despawn().await?;

    Ok(())
}

#[tokio::test]
async fn test_actor_paging_stops_at_both_ends() -> Result<()> {
    let storage = Arc::new(SessionStorage::new());
    let actor = LedgerActor::spawn(1, storage.clone(), seeded_config(4));

    assert!(!actor.retreat_page().await?);

    let mut moves = 0;
    while actor.advance_page().await? {
        moves += 1;
    }

    let last = actor.page().await?;

    assert!(moves >= 1);
    assert!(!last.has_more);
    assert_eq!(last.page_index, moves);
    assert!(actor.retreat_page().await?);

    actor.despawn().await?;

    Ok(())
}

#[tokio::test]
async fn test_actor_reports_unknown_transactions() -> Result<()> {
    let storage = Arc::new(SessionStorage::new());
    let actor = LedgerActor::spawn(1, storage.clone(), seeded_config(6));
    let unknown = TransactionId::from("TRX_NOPE00000");

    assert_eq!(actor.find_by_id(&unknown).await?, None);
    assert!(matches!(actor.describe(&unknown).await, Err(LedgerError::TransactionNotFound { .. })));

    actor.despawn().await?;

    Ok(())
}

#[tokio::test]
async fn test_handle_fails_once_the_actor_has_stopped() -> Result<()> {
    let storage = Arc::new(SessionStorage::new());
    let actor = LedgerActor::spawn(3, storage.clone(), seeded_config(8));
    let handle = actor.handle();

    actor.despawn().await?;

    assert!(matches!(handle.apply_filter("fee"), Err(LedgerError::ActorUnavailable { session_id: 3 })));
    assert!(matches!(handle.page().await, Err(LedgerError::ActorUnavailable { .. })));

    Ok(())
}

#[tokio::test]
async fn test_actor_regenerates_on_request() -> Result<()> {
    let storage = Arc::new(SessionStorage::new());
    let actor = LedgerActor::spawn(1, storage.clone(), seeded_config(10));

    actor.advance_page().await?;
    actor.generate(10)?;

    let page = actor.page().await?;

    assert_eq!(page.page_index, 0);
    assert_eq!(actor.balance().await?, LedgerConfig::default().closing_balance);

    actor.despawn().await?;

    Ok(())
}

#[tokio::test]
async fn test_actor_survives_an_overflowing_append() -> Result<()> {
    let storage = Arc::new(SessionStorage::new());
    let actor = LedgerActor::spawn(4, storage.clone(), seeded_config(12));
    let balance = actor.balance().await?;

    let result = actor.append_live(Decimal::MAX).await;

    assert!(matches!(result, Err(LedgerError::BalanceOverflow { .. })));
    assert_eq!(actor.balance().await?, balance);

    let record = actor.append_live(Decimal::from_str("-5.00")?).await?;
    assert_eq!(record.running_balance, balance - Decimal::from(5));

    actor.despawn().await?;

    let ledger = storage.load(4).ok_or_else(|| anyhow!("Session 4 was not saved"))?;
    assert_eq!(ledger.balance(), record.running_balance);

    Ok(())
}
