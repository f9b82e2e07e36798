use chrono::{TimeZone, Utc};
use mindbeat::error::{CoreError, StoreError};
use mindbeat::management::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
use mindbeat::types::Credential;

fn credential() -> Credential {
    Credential::new("A1", "R1", Utc.with_ymd_and_hms(2025, 3, 27, 12, 0, 0).unwrap())
}

#[tokio::test]
async fn test_file_store_persists_credential() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache").join("credential.json");
    let store = FileCredentialStore::new(path.clone());

    assert_eq!(store.get().await.unwrap(), None);

    store.set(&credential()).await.unwrap();
    assert!(path.is_file());

    // A second store on the same file sees the same credential
    let reopened = FileCredentialStore::new(path);
    assert_eq!(reopened.get().await.unwrap(), Some(credential()));
}

#[tokio::test]
async fn test_file_store_clear_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::new(dir.path().join("credential.json"));

    store.clear().await.unwrap();

    store.set(&credential()).await.unwrap();
    store.clear().await.unwrap();
    assert_eq!(store.get().await.unwrap(), None);
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_file_store_corrupt_file_is_a_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credential.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = FileCredentialStore::new(path).get().await.unwrap_err();
    assert!(matches!(err, StoreError::Serde(_)));
    assert!(matches!(CoreError::from(err), CoreError::Storage(_)));
}

#[tokio::test]
async fn test_memory_store() {
    let store = MemoryCredentialStore::default();
    assert_eq!(store.get().await.unwrap(), None);

    store.set(&credential()).await.unwrap();
    assert_eq!(store.get().await.unwrap(), Some(credential()));

    store.clear().await.unwrap();
    assert_eq!(store.get().await.unwrap(), None);
}
