// Registration and key issuance under concurrent callers.

mod common;

use cfipd_core::{ApiKey, Credentials};
use cfipd_metadata::accounts::{authenticate, issue_key, register, validate_key};
use cfipd_metadata::{ApiKeyRepo, MetadataError, UserRepo};
use common::temp_store;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_has_one_winner() {
    let (store, _dir) = temp_store().await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let creds = Credentials::new(&format!("user{i}"), "pw").unwrap();
            register(&*store, &creds).await
        }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(user) => winners.push(user.username),
            Err(MetadataError::AlreadyExists(_)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(winners.len(), 1);
    assert!(store.get_user(&winners[0]).await.unwrap().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_key_issuance_keeps_every_key() {
    let (store, _dir) = temp_store().await;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(
            async move { issue_key(&*store).await },
        ));
    }

    let mut keys = Vec::new();
    for handle in handles {
        keys.push(handle.await.unwrap().unwrap());
    }

    for key in &keys {
        assert!(store.get_api_key(key).await.unwrap().is_some());
    }
}

#[tokio::test]
async fn test_validate_key_stamps_last_used() {
    let (store, _dir) = temp_store().await;
    let key = issue_key(&*store).await.unwrap();

    assert!(
        store
            .get_api_key(&key)
            .await
            .unwrap()
            .unwrap()
            .last_used
            .is_none()
    );
    assert!(validate_key(&*store, &key).await.unwrap());
    let row = store.get_api_key(&key).await.unwrap().unwrap();
    assert!(row.last_used.is_some());
    assert!(row.last_used.unwrap() >= row.created_at);
}

#[tokio::test]
async fn test_fabricated_key_is_not_recorded() {
    let (store, dir) = temp_store().await;
    let fake = ApiKey::parse("0123456789abcdef").unwrap();

    assert!(!validate_key(&*store, &fake).await.unwrap());
    assert!(store.get_api_key(&fake).await.unwrap().is_none());
    assert!(!dir.path().join("api_keys.json").exists());
}

#[tokio::test]
async fn test_login_with_trimmed_username() {
    let (store, _dir) = temp_store().await;
    register(&*store, &Credentials::new(" admin ", "pw").unwrap())
        .await
        .unwrap();

    assert!(authenticate(&*store, "admin", "pw").await.unwrap().is_some());
    assert!(
        authenticate(&*store, "  admin", "pw")
            .await
            .unwrap()
            .is_some()
    );
    // Passwords are compared exactly.
    assert!(authenticate(&*store, "admin", " pw").await.unwrap().is_none());
}
