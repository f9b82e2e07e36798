use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{config, error::StoreError, types::Credential};

/// Session-scoped persistence of the credential triple.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self) -> Result<Option<Credential>, StoreError>;
    async fn set(&self, credential: &Credential) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Stores the credential as pretty JSON on disk.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store backed by the JSON file at `path`. Nothing is touched on disk
    /// until the first call; parent directories are created on `set`.
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the credential file
    pub fn new(path: PathBuf) -> Self {
        FileCredentialStore { path }
    }

    /// The store under the local data directory:
    /// `<data_local_dir>/mindbeat/cache/credential.json`.
    pub fn default_location() -> Self {
        Self::new(config::data_dir().join("cache").join("credential.json"))
    }

    /// Location of the credential file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self) -> Result<Option<Credential>, StoreError> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e)),
        };
        let credential: Credential = serde_json::from_str(&content)?;
        Ok(Some(credential))
    }

    async fn set(&self, credential: &Credential) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(credential)?;
        // Write-then-rename so a reader never sees half a credential.
        let tmp = self.path.with_extension("json.tmp");
        async_fs::write(&tmp, json).await?;
        async_fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

/// Keeps the credential in memory for the lifetime of the process.
#[derive(Default)]
pub struct MemoryCredentialStore {
    credential: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    /// Store pre-filled with `credential`.
    pub fn new(credential: Option<Credential>) -> Self {
        MemoryCredentialStore {
            credential: Mutex::new(credential),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self) -> Result<Option<Credential>, StoreError> {
        Ok(self.credential.lock().await.clone())
    }

    async fn set(&self, credential: &Credential) -> Result<(), StoreError> {
        *self.credential.lock().await = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.credential.lock().await = None;
        Ok(())
    }
}
