use std::sync::Arc;

use chrono::NaiveDate;
use shared::{Clock, LightSwitch, LocalClock};
use tracing::instrument;

use crate::{
    auth::{CredentialStore, RandomTokenIssuer, Session, TokenIssuer},
    config::Env,
    db::{types::AccountRecord, AccountStore, MemoryDB},
    error::ServiceError,
};

/// The service behind every endpoint: auth, account counters, friends,
/// leaderboards and daily challenges.
pub struct Tracker {
    pub(crate) db: Arc<dyn AccountStore>,
    pub(crate) credentials: CredentialStore,
    pub(crate) tokens: Arc<dyn TokenIssuer>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) env: Env,
}

impl Tracker {
    pub fn new(env: Env) -> anyhow::Result<Self> {
        Ok(Self {
            db: Arc::new(MemoryDB::new()),
            credentials: CredentialStore::new(env.password_hasher()?),
            tokens: Arc::new(RandomTokenIssuer),
            clock: Arc::new(LocalClock),
            env,
        })
    }

    pub fn with_store(mut self, db: Arc<dyn AccountStore>) -> Self {
        self.db = db;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_token_issuer(mut self, tokens: Arc<dyn TokenIssuer>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub async fn me(&self, session: &Session) -> Result<AccountRecord, ServiceError> {
        Ok(session.lock().await?.clone())
    }

    /// Returns `(on_count, off_count)` after the increment.
    #[instrument(skip(self))]
    pub async fn increment(
        &self,
        session: &Session,
        switch: LightSwitch,
    ) -> Result<(u64, u64), ServiceError> {
        let mut account = session.lock().await?;
        match switch {
            LightSwitch::On => account.on_count = account.on_count.saturating_add(1),
            LightSwitch::Off => account.off_count = account.off_count.saturating_add(1),
        }
        Ok((account.on_count, account.off_count))
    }

    #[instrument(skip(self))]
    pub async fn toggle_drive(&self, session: &Session) -> Result<bool, ServiceError> {
        let mut account = session.lock().await?;
        account.driving_minimized = !account.driving_minimized;
        Ok(account.driving_minimized)
    }

    /// Befriending yourself is rejected; adding an existing friend is a no-op.
    #[instrument(skip(self))]
    pub async fn add_friend(&self, session: &Session, friend: &str) -> Result<(), ServiceError> {
        if friend.is_empty() {
            return Err(ServiceError::BadRequest(
                "friend username is required".to_string(),
            ));
        }
        if friend == session.username() {
            return Err(ServiceError::InvalidArgument(
                "you cannot add yourself as a friend".to_string(),
            ));
        }
        if self.db.get(friend).await?.is_none() {
            return Err(ServiceError::NotFound(format!("account {friend}")));
        }

        let mut account = session.lock().await?;
        if account.friends.insert(friend.to_string()) {
            tracing::info!("{} added {friend} as a friend", session.username());
        }
        Ok(())
    }
}
