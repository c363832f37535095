use compra_core::{CustomerId, NewTransaction, StoreError, TransactionStatus, TransactionStore};
use compra_store::{DatabaseConfig, PgTransactionStore};
use rust_decimal::Decimal;
use uuid::Uuid;

async fn store() -> PgTransactionStore {
    let dsn = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for this ignored test");
    PgTransactionStore::connect(&DatabaseConfig::default().with_url(dsn))
        .await
        .unwrap()
}

fn new_tx() -> NewTransaction {
    NewTransaction::new(CustomerId::parse("1001").unwrap(), Decimal::new(10050, 2))
}

#[tokio::test]
#[ignore]
async fn db_backed_lifecycle() {
    let store = store().await;

    let created = store.create(new_tx()).await.unwrap();
    assert_eq!(created.status, TransactionStatus::Pending);
    assert_eq!(created.amount, Decimal::new(10050, 2));

    store
        .update_status(created.transaction_id, TransactionStatus::Failed)
        .await
        .unwrap();

    let fetched = store
        .get_by_id(created.transaction_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.status, TransactionStatus::Failed);
    assert!(fetched.updated_at >= fetched.created_at);

    let probe = store.probe().await.unwrap();
    assert!(probe.transaction_count >= 1);

    store.close().await;
}

#[tokio::test]
#[ignore]
async fn db_backed_duplicates_and_missing_rows() {
    let store = store().await;

    let new = new_tx();
    store.create(new.clone()).await.unwrap();
    let err = store.create(new).await.unwrap_err();
    assert!(matches!(err, StoreError::Duplicate { .. }));

    let err = store
        .update_status(Uuid::new_v4(), TransactionStatus::Processing)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));

    assert!(store.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
}
