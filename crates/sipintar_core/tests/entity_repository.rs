mod support;

use chrono::NaiveDate;
use serde_json::json;
use sipintar_core::config::{LocalPersistence, StoreConfig};
use sipintar_core::model::seed;
use sipintar_core::repo::{CollectionRepository, EntityRepository, RepoError, Repositories};
use sipintar_core::store::{Backend, BackendMode};
use sipintar_core::{Account, Resident, Role, Transaction, TransactionType};
use support::{in_memory_store, local_backend, remote_backend, MemoryRemote, UnavailableRemote};

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

#[tokio::test]
async fn saving_same_record_twice_keeps_one_remote_row() {
    let remote = MemoryRemote::new();
    let repos = Repositories::new(&remote_backend(remote.clone()));
    let resident = Resident::new("r-1", "3171000000000001", "Budi");

    repos.residents.save(&resident).await.unwrap();
    repos.residents.save(&resident).await.unwrap();

    assert_eq!(remote.rows("residents").len(), 1);
    assert_eq!(repos.residents.try_get_all().await.unwrap(), vec![resident]);
}

#[tokio::test]
async fn deleting_missing_key_is_a_no_op() {
    let remote = MemoryRemote::new();
    let repos = Repositories::new(&remote_backend(remote.clone()));
    repos
        .residents
        .save(&Resident::new("r-1", "111", "Budi"))
        .await
        .unwrap();

    repos.residents.delete("does-not-exist").await.unwrap();

    assert_eq!(remote.rows("residents").len(), 1);
}

#[tokio::test]
async fn resident_lifecycle_against_remote_backend() {
    let remote = MemoryRemote::new();
    let repos = Repositories::new(&remote_backend(remote.clone()));
    assert_eq!(repos.mode(), BackendMode::Remote);

    let mut budi = Resident::new("r-budi", "3171012001900001", "Budi Santoso");
    budi.kk_number = "3171010000000001".to_string();
    budi.birth_date = Some(date("1990-01-20"));
    repos.residents.save(&budi).await.unwrap();

    let stored = &remote.rows("residents")[0];
    assert_eq!(stored["kk_number"], json!("3171010000000001"));
    assert_eq!(stored["birth_date"], json!("1990-01-20"));

    budi.job = "Guru".to_string();
    repos.residents.save(&budi).await.unwrap();
    let loaded = repos.residents.try_get_all().await.unwrap();
    assert_eq!(loaded, vec![budi.clone()]);

    repos.residents.delete(&budi.id).await.unwrap();
    assert!(repos.residents.try_get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn transactions_load_newest_first_in_both_modes() {
    let remote = MemoryRemote::new();
    for tx in seed::transactions() {
        remote.insert_row("transactions", serde_json::to_value(tx).unwrap());
    }
    let remote_repos = Repositories::new(&remote_backend(remote));
    let local_repos = Repositories::new(&local_backend(LocalPersistence::Session));

    for repos in [remote_repos, local_repos] {
        let dates: Vec<NaiveDate> = repos
            .transactions
            .try_get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|tx| tx.date)
            .collect();
        assert_eq!(
            dates,
            [date("2023-10-15"), date("2023-10-05"), date("2023-10-01")]
        );
    }
}

#[tokio::test]
async fn accounts_never_reach_the_remote_backend() {
    let remote = MemoryRemote::new();
    let repos = Repositories::new(&remote_backend(remote.clone()));

    let accounts = repos.accounts.try_get_all().await.unwrap();
    assert_eq!(accounts, seed::accounts());

    let account = Account {
        username: "bendahara".to_string(),
        name: "Bendahara RT".to_string(),
        role: Role::Staff,
        password: "rahasia".to_string(),
    };
    repos.accounts.save(&account).await.unwrap();
    repos.accounts.delete("staff").await.unwrap();

    assert_eq!(remote.calls(), 0);
    let usernames: Vec<String> = repos
        .accounts
        .try_get_all()
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.username)
        .collect();
    assert_eq!(usernames, ["admin", "bendahara"]);
}

#[tokio::test]
async fn session_local_mode_keeps_serving_seed() {
    let repos = Repositories::new(&local_backend(LocalPersistence::Session));
    assert_eq!(repos.mode(), BackendMode::Local);

    repos
        .residents
        .save(&Resident::new("r-new", "999", "Baru"))
        .await
        .unwrap();
    repos.residents.delete("1").await.unwrap();

    assert_eq!(repos.residents.try_get_all().await.unwrap(), seed::residents());
}

#[tokio::test]
async fn durable_local_mode_persists_writes() {
    let repos = Repositories::new(&local_backend(LocalPersistence::Durable));
    let resident = Resident::new("r-new", "999", "Baru");

    repos.residents.save(&resident).await.unwrap();
    repos.residents.save(&resident).await.unwrap();
    repos.residents.delete("1").await.unwrap();

    let loaded = repos.residents.try_get_all().await.unwrap();
    assert_eq!(loaded.len(), seed::residents().len());
    assert!(!loaded.iter().any(|r| r.id == "1"));
    assert_eq!(loaded.last(), Some(&resident));
}

#[tokio::test]
async fn unreachable_backend_degrades_reads_and_reports_writes() {
    let remote = UnavailableRemote::new();
    let repo = CollectionRepository::<Resident>::new(remote_backend(remote.clone()));

    assert!(repo.get_all().await.is_empty());
    assert!(matches!(
        repo.try_get_all().await,
        Err(RepoError::Remote(_))
    ));

    let err = repo
        .save(&Resident::new("r-1", "111", "Budi"))
        .await
        .unwrap_err();
    assert!(err.is_backend_failure());
    assert!(repo.delete("r-1").await.is_err());
    assert_eq!(remote.calls(), 4);
}

#[tokio::test]
async fn invalid_entity_is_rejected_before_any_store_call() {
    let remote = MemoryRemote::new();
    let repos = Repositories::new(&remote_backend(remote.clone()));
    let refund = Transaction {
        id: "t-neg".to_string(),
        date: date("2024-01-01"),
        description: "Koreksi".to_string(),
        category: "Umum".to_string(),
        amount: -1,
        kind: TransactionType::Expense,
    };

    let err = repos.transactions.save(&refund).await.unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(!err.is_backend_failure());
    assert_eq!(remote.calls(), 0);
}

#[tokio::test]
async fn malformed_remote_rows_are_skipped() {
    let remote = MemoryRemote::new();
    remote.insert_row(
        "transactions",
        json!({"id": "ok", "date": "2024-01-02", "description": "Iuran", "category": "Umum", "amount": 10, "type": "INCOME"}),
    );
    remote.insert_row(
        "transactions",
        json!({"id": "bad", "date": "not-a-date", "amount": 10, "type": "INCOME"}),
    );
    let repos = Repositories::new(&remote_backend(remote));

    let loaded = repos.transactions.try_get_all().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "ok");
}

#[tokio::test]
async fn upsert_by_id_replaces_instead_of_duplicating() {
    let remote = MemoryRemote::new();
    let repos = Repositories::new(&remote_backend(remote));

    repos
        .residents
        .save(&Resident::new("1", "123", "Budi"))
        .await
        .unwrap();
    let loaded = repos.residents.get_all().await;
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].nik, "123");

    repos
        .residents
        .save(&Resident::new("1", "123", "Budi Updated"))
        .await
        .unwrap();
    let loaded = repos.residents.get_all().await;
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "1");
    assert_eq!(loaded[0].name, "Budi Updated");
}

#[tokio::test]
async fn empty_configuration_routes_everything_locally() {
    let backend = Backend::select(&StoreConfig::default(), in_memory_store()).unwrap();
    assert_eq!(backend.mode(), BackendMode::Local);
    assert!(backend.remote_adapter().is_none());

    let repos = Repositories::new(&backend);
    assert_eq!(repos.announcements.try_get_all().await.unwrap().len(), 2);
    repos
        .announcements
        .save(&seed::announcements()[0])
        .await
        .unwrap();
    repos.announcements.delete("A1").await.unwrap();
}
