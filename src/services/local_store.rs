//! Durable client-side storage.
//!
//! The browser-profile equivalent for this client: a directory holding one
//! file per key, values read and written as opaque strings and never
//! parsed structurally. Two keys exist today — the cart session identity
//! and the terms-acceptance flag. Each is read once at startup; the engine
//! is the only writer.

use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::{info, warn};

pub const SESSION_ID_KEY: &str = "sessionId";
pub const TERMS_ACCEPTED_KEY: &str = "terms_accepted";

#[derive(Clone, Debug)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Read a stored value. Missing keys read as `None`.
    pub async fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.key_path(key)).await {
            Ok(value) => Some(value),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!("could not read stored key `{}`: {}", key, err);
                None
            }
        }
    }

    pub async fn set(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        fs::write(self.key_path(key), value).await
    }

    /// Cart session identity: generated once per profile, reused across
    /// visits.
    pub async fn get_or_create_session_id(&self) -> io::Result<String> {
        if let Some(existing) = self.get(SESSION_ID_KEY).await {
            if !existing.is_empty() {
                return Ok(existing);
            }
        }
        let session_id = format!("session_{}", uuid::Uuid::new_v4());
        self.set(SESSION_ID_KEY, &session_id).await?;
        info!("created cart session {}", session_id);
        Ok(session_id)
    }

    pub async fn terms_accepted(&self) -> bool {
        self.get(TERMS_ACCEPTED_KEY).await.as_deref() == Some("true")
    }

    pub async fn accept_terms(&self) -> io::Result<()> {
        self.set(TERMS_ACCEPTED_KEY, "true").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> LocalStore {
        let dir = std::env::temp_dir().join(format!("storefront-store-{}", uuid::Uuid::new_v4()));
        LocalStore::new(dir)
    }

    #[tokio::test]
    async fn session_id_is_created_once_and_reused() {
        let store = temp_store();
        let first = store.get_or_create_session_id().await.unwrap();
        let second = store.get_or_create_session_id().await.unwrap();
        assert!(first.starts_with("session_"));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn terms_default_to_not_accepted() {
        let store = temp_store();
        assert!(!store.terms_accepted().await);
        store.accept_terms().await.unwrap();
        assert!(store.terms_accepted().await);
    }

    #[tokio::test]
    async fn missing_keys_read_as_none() {
        let store = temp_store();
        assert_eq!(store.get("nonexistent").await, None);
        store.set("flag", "yes").await.unwrap();
        assert_eq!(store.get("flag").await.as_deref(), Some("yes"));
    }
}
