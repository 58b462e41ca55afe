//! Admin authentication state: set on login, read on every admin request,
//! cleared on logout or when the API rejects the token.

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

/// Key the token is stored under, shared with the web storefront.
pub const TOKEN_KEY: &str = "adminToken";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to access session file {path}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("session file {path} is not a json object")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Result<Option<String>, SessionError>;
    async fn save(&self, token: &str) -> Result<(), SessionError>;
    async fn clear(&self) -> Result<(), SessionError>;

    /// Drops everything the store holds, readable or not.
    async fn reset(&self) -> Result<(), SessionError> {
        self.clear().await
    }
}

#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self.token.lock().await.clone())
    }

    async fn save(&self, token: &str) -> Result<(), SessionError> {
        *self.token.lock().await = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        *self.token.lock().await = None;
        Ok(())
    }
}

/// Key/value JSON file; other keys written by someone else are preserved.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_entries(&self) -> Result<Map<String, Value>, SessionError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(SessionError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&raw).map_err(|source| SessionError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), SessionError> {
        let io_err = |source| SessionError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let encoded = Value::Object(entries.clone()).to_string();
        tokio::fs::write(&self.path, encoded).await.map_err(io_err)
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<String>, SessionError> {
        let entries = self.read_entries().await?;
        Ok(entries
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string))
    }

    async fn save(&self, token: &str) -> Result<(), SessionError> {
        let mut entries = self.read_entries().await?;
        entries.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.write_entries(&entries).await
    }

    async fn clear(&self) -> Result<(), SessionError> {
        let mut entries = self.read_entries().await?;
        if entries.remove(TOKEN_KEY).is_some() {
            self.write_entries(&entries).await?;
        }
        Ok(())
    }

    async fn reset(&self) -> Result<(), SessionError> {
        self.write_entries(&Map::new()).await
    }
}

pub struct AdminSession {
    store: Arc<dyn TokenStore>,
    token: RwLock<Option<String>>,
}

impl AdminSession {
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(MemoryTokenStore::default()),
            token: RwLock::new(None),
        }
    }

    /// Picks up a token persisted by an earlier login, if any.
    pub async fn restore(store: Arc<dyn TokenStore>) -> Result<Self, SessionError> {
        let token = store.load().await?;
        Ok(Self {
            store,
            token: RwLock::new(token),
        })
    }

    /// Like `restore`, but an unreadable store yields a signed-out session
    /// and is reset so the next login can write to it.
    pub async fn restore_or_signed_out(store: Arc<dyn TokenStore>) -> Self {
        let token = match store.load().await {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "discarding unreadable admin session");
                if let Err(err) = store.reset().await {
                    warn!(error = %err, "failed to reset admin session store");
                }
                None
            }
        };
        Self {
            store,
            token: RwLock::new(token),
        }
    }

    pub async fn login(&self, token: impl Into<String>) -> Result<(), SessionError> {
        let token = token.into();
        self.store.save(&token).await?;
        *self.token.write().await = Some(token);
        info!("admin session started");
        Ok(())
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    pub async fn logout(&self) -> Result<(), SessionError> {
        *self.token.write().await = None;
        self.store.clear().await?;
        info!("admin session cleared");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
