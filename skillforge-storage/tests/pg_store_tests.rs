//! PostgreSQL document store tests.
//!
//! Requires a reachable database configured through `SKILLFORGE_DB_*`.
//! Run with `cargo test -p skillforge-storage --features db-tests`.

#![cfg(feature = "db-tests")]

use skillforge_core::{
    Roadmap, StorageError, TaskCategory, TaskDraft, UserProfile, UserUid,
};
use skillforge_storage::{
    DbConfig, PgDocumentStore, RoadmapStore, StoreHealth, StoreResult, UserStore,
};
use uuid::Uuid;

async fn store() -> StoreResult<PgDocumentStore> {
    let store = PgDocumentStore::from_config(&DbConfig::from_env())?;
    store.ensure_schema().await?;
    Ok(store)
}

fn unique_uid() -> UserUid {
    UserUid::new(format!("test-{}", Uuid::now_v7()))
}

fn roadmap_for(owner: &UserUid, skill: &str) -> Roadmap {
    Roadmap::new(
        owner.clone(),
        skill,
        "3 weeks",
        vec![
            TaskDraft {
                title: "Setup".to_string(),
                description: "Install tooling".to_string(),
                xp: 50,
                estimated_time: "1 day".to_string(),
                category: TaskCategory::Foundation,
            },
            TaskDraft {
                title: "Project".to_string(),
                description: "Build something".to_string(),
                xp: 200,
                estimated_time: "1 week".to_string(),
                category: TaskCategory::Mastery,
            },
        ],
    )
}

#[tokio::test]
async fn test_ping() -> StoreResult<()> {
    store().await?.ping().await
}

#[tokio::test]
async fn test_user_roundtrip_and_conflicts() -> StoreResult<()> {
    let store = store().await?;
    let uid = unique_uid();
    let email = format!("{}@example.com", uid);
    let mut profile = UserProfile::new(uid.clone(), "Tester", email.clone());

    store.user_insert(&profile).await?;
    assert_eq!(store.user_get(&uid).await?, Some(profile.clone()));

    let dup_email = UserProfile::new(unique_uid(), "Other", email.clone());
    assert!(matches!(
        store.user_insert(&dup_email).await,
        Err(StorageError::AlreadyExists { key, .. }) if key == email
    ));

    profile.xp = 1200;
    profile.level = 2;
    store.user_update(&profile).await?;
    let stored = store.user_get(&uid).await?.expect("profile stored");
    assert_eq!((stored.xp, stored.level), (1200, 2));
    Ok(())
}

#[tokio::test]
async fn test_roadmap_lifecycle() -> StoreResult<()> {
    let store = store().await?;
    let owner = unique_uid();

    let first = roadmap_for(&owner, "Go");
    let mut second = roadmap_for(&owner, "Rust");
    store.roadmap_insert(&first).await?;
    store.roadmap_insert(&second).await?;

    let listed = store.roadmap_list_by_owner(&owner).await?;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);

    second.tasks[1].completed = true;
    store.roadmap_update(&second).await?;
    let reloaded = store.roadmap_get(second.id).await?.expect("roadmap stored");
    assert!(reloaded.tasks[1].completed);

    assert!(store.roadmap_delete(first.id).await?);
    assert!(!store.roadmap_delete(first.id).await?);
    assert!(store.roadmap_delete(second.id).await?);
    Ok(())
}
