use chrono::{DateTime, Duration, Utc};
use pycoder_core::model::TokenPair;
use pycoder_core::time::{fixed_clock, fixed_now};
use sqlx::Row;
use storage::repository::{Storage, TokenStore};
use storage::sqlite::SqliteRepository;

async fn repo(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_persists_token_pair() {
    let repo = repo("memdb_tokens_pair").await;
    assert_eq!(repo.access_token().await.unwrap(), None);

    repo.save_tokens(&TokenPair::new("access-1", "refresh-1"))
        .await
        .unwrap();

    assert_eq!(repo.access_token().await.unwrap().as_deref(), Some("access-1"));
    assert_eq!(repo.refresh_token().await.unwrap().as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn sqlite_refresh_updates_only_access_token() {
    let repo = repo("memdb_tokens_refresh").await;
    repo.save_tokens(&TokenPair::new("a1", "r1")).await.unwrap();

    repo.save_access_token("a2").await.unwrap();
    assert_eq!(repo.access_token().await.unwrap().as_deref(), Some("a2"));
    assert_eq!(repo.refresh_token().await.unwrap().as_deref(), Some("r1"));

    repo.save_refresh_token("r2").await.unwrap();
    assert_eq!(repo.refresh_token().await.unwrap().as_deref(), Some("r2"));
}

#[tokio::test]
async fn sqlite_clear_removes_both_tokens() {
    let repo = repo("memdb_tokens_clear").await;
    repo.save_tokens(&TokenPair::new("a1", "r1")).await.unwrap();

    repo.clear().await.unwrap();
    repo.clear().await.unwrap();

    assert_eq!(repo.access_token().await.unwrap(), None);
    assert_eq!(repo.refresh_token().await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_stamps_writes_with_clock() {
    let repo = repo("memdb_tokens_clock").await.with_clock(fixed_clock());
    repo.save_access_token("a1").await.unwrap();

    let row = sqlx::query("SELECT updated_at FROM credentials WHERE key = 'access_token'")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    let updated_at: DateTime<Utc> = row.try_get("updated_at").unwrap();
    assert_eq!(updated_at, fixed_now());
    assert!(updated_at < Utc::now() + Duration::days(1));
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = repo("memdb_tokens_migrate").await;
    repo.migrate().await.expect("second migrate");
    repo.save_tokens(&TokenPair::new("a", "r")).await.unwrap();
    repo.migrate().await.expect("third migrate");
    assert_eq!(repo.access_token().await.unwrap().as_deref(), Some("a"));
}

#[tokio::test]
async fn storage_sqlite_exposes_token_store() {
    let storage = Storage::sqlite(
        "sqlite:file:memdb_tokens_storage?mode=memory&cache=shared",
        fixed_clock(),
    )
    .await
    .expect("storage");

    storage
        .tokens
        .save_tokens(&TokenPair::new("a", "r"))
        .await
        .unwrap();
    assert_eq!(storage.tokens.refresh_token().await.unwrap().as_deref(), Some("r"));
}
