use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use rocket::tokio::sync::{Mutex, RwLock};
use shared::Username;
use tracing::instrument;

use crate::auth::SessionToken;

pub mod types;

use types::AccountRecord;

/// Shared handle to one account. Holding its lock is what makes a
/// read-check-write on that account atomic.
pub type AccountHandle = Arc<Mutex<AccountRecord>>;

pub enum InsertOutcome {
    Inserted(AccountHandle),
    AlreadyExists,
}

/// Storage seam for account records and the token → username index.
///
/// Implementations must make `insert` an atomic check-and-set on the
/// username and must never hold a store-wide lock while a caller works on an
/// individual account.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert(&self, record: AccountRecord) -> anyhow::Result<InsertOutcome>;

    async fn get(&self, username: &str) -> anyhow::Result<Option<AccountHandle>>;

    /// Snapshot of every account handle. The store lock is released before
    /// returning.
    async fn all(&self) -> anyhow::Result<Vec<AccountHandle>>;

    async fn bind_session(&self, token: SessionToken, username: Username) -> anyhow::Result<()>;

    async fn release_session(&self, token: &SessionToken) -> anyhow::Result<()>;

    async fn session_owner(&self, token: &SessionToken) -> anyhow::Result<Option<Username>>;
}

#[derive(Default)]
pub struct MemoryDB {
    accounts: RwLock<HashMap<Username, AccountHandle>>,
    sessions: RwLock<HashMap<SessionToken, Username>>,
}

impl MemoryDB {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryDB {
    #[instrument(skip_all, fields(username = %record.username))]
    async fn insert(&self, record: AccountRecord) -> anyhow::Result<InsertOutcome> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&record.username) {
            return Ok(InsertOutcome::AlreadyExists);
        }

        let username = record.username.clone();
        let handle = Arc::new(Mutex::new(record));
        accounts.insert(username, handle.clone());
        Ok(InsertOutcome::Inserted(handle))
    }

    async fn get(&self, username: &str) -> anyhow::Result<Option<AccountHandle>> {
        Ok(self.accounts.read().await.get(username).cloned())
    }

    async fn all(&self) -> anyhow::Result<Vec<AccountHandle>> {
        Ok(self.accounts.read().await.values().cloned().collect())
    }

    async fn bind_session(&self, token: SessionToken, username: Username) -> anyhow::Result<()> {
        self.sessions.write().await.insert(token, username);
        Ok(())
    }

    async fn release_session(&self, token: &SessionToken) -> anyhow::Result<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }

    async fn session_owner(&self, token: &SessionToken) -> anyhow::Result<Option<Username>> {
        Ok(self.sessions.read().await.get(token).cloned())
    }
}
