//! Session storage: trait-based, in-memory by default.
//!
//! `AppState` holds an `Arc<dyn SessionStore>`. Nothing is persisted; the
//! history lives as long as the process.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::sessions::models::SessionRecord;

/// Append-only session history.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn append(&self, session: SessionRecord) -> Result<(), AppError>;

    /// Every stored session in insertion order.
    async fn list_all(&self) -> Result<Vec<SessionRecord>, AppError>;
}

/// Appends are ordered by write-lock acquisition.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<Vec<SessionRecord>>,
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn append(&self, session: SessionRecord) -> Result<(), AppError> {
        self.sessions.write().await.push(session);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<SessionRecord>, AppError> {
        Ok(self.sessions.read().await.clone())
    }
}
