use std::{
    collections::{hash_map::Entry, HashMap},
    fmt,
};

use argon2::{
    password_hash::{self, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use rand::{rngs::OsRng, RngCore};
use rocket::tokio::sync::{MutexGuard, RwLock};
use shared::Username;
use tracing::instrument;

use crate::{
    db::{types::AccountRecord, AccountHandle, InsertOutcome},
    error::ServiceError,
    tracker::Tracker,
};

const TOKEN_BYTES: usize = 32;
const SALT_BYTES: usize = 16;
const MAX_USERNAME_LEN: usize = 64;

/// Opaque bearer credential.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SessionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// Tokens end up in spans and logs through `Debug`.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

pub trait TokenIssuer: Send + Sync {
    fn issue(&self) -> SessionToken;
}

/// 256 bits from the operating system RNG, hex encoded.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTokenIssuer;

impl TokenIssuer for RandomTokenIssuer {
    fn issue(&self) -> SessionToken {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        SessionToken(hex::encode(bytes))
    }
}

/// Username → Argon2 PHC string. Only the auth operations below see it.
pub struct CredentialStore {
    hasher: Argon2<'static>,
    secrets: RwLock<HashMap<Username, String>>,
}

impl CredentialStore {
    pub fn new(hasher: Argon2<'static>) -> Self {
        Self {
            hasher,
            secrets: RwLock::new(HashMap::new()),
        }
    }

    async fn hash(&self, secret: &str) -> Result<String, ServiceError> {
        let hasher = self.hasher.clone();
        let secret = secret.to_string();
        rocket::tokio::task::spawn_blocking(move || -> Result<String, ServiceError> {
            let mut salt = [0u8; SALT_BYTES];
            OsRng.fill_bytes(&mut salt);
            let salt = SaltString::encode_b64(&salt)
                .map_err(|e| anyhow::anyhow!("Failed to encode salt: {e}"))?;
            let hash = hasher
                .hash_password(secret.as_bytes(), &salt)
                .map_err(|e| anyhow::anyhow!("Failed to hash secret: {e}"))?;
            Ok(hash.to_string())
        })
        .await
        .map_err(|e| anyhow::anyhow!("Hashing task failed: {e}"))?
    }

    /// Stores the hash unless the username already has one.
    async fn store_new(&self, username: Username, hash: String) -> bool {
        match self.secrets.write().await.entry(username) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(hash);
                true
            }
        }
    }

    async fn remove(&self, username: &str) {
        self.secrets.write().await.remove(username);
    }

    async fn verify(&self, username: &str, secret: &str) -> Result<bool, ServiceError> {
        let Some(stored) = self.secrets.read().await.get(username).cloned() else {
            return Ok(false);
        };

        let hasher = self.hasher.clone();
        let secret = secret.to_string();
        rocket::tokio::task::spawn_blocking(move || -> Result<bool, ServiceError> {
            let parsed = PasswordHash::new(&stored)
                .map_err(|e| anyhow::anyhow!("Stored credential is corrupted: {e}"))?;
            match hasher.verify_password(secret.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(password_hash::Error::Password) => Ok(false),
                Err(e) => Err(anyhow::anyhow!("Failed to verify secret: {e}").into()),
            }
        })
        .await
        .map_err(|e| anyhow::anyhow!("Verification task failed: {e}"))?
    }
}

/// A resolved bearer token.
///
/// The token is checked again every time the account is locked, so a
/// request racing a logout or a newer login cannot act on a dead session.
pub struct Session {
    username: Username,
    token: SessionToken,
    account: AccountHandle,
}

impl Session {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    pub async fn lock(&self) -> Result<MutexGuard<'_, AccountRecord>, ServiceError> {
        let account = self.account.lock().await;
        if account.active_token.as_ref() != Some(&self.token) {
            return Err(ServiceError::Unauthorized);
        }
        Ok(account)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .finish()
    }
}

fn validate_credentials(username: &str, secret: &str) -> Result<(), ServiceError> {
    if username.is_empty() {
        return Err(ServiceError::BadRequest("username is required".to_string()));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ServiceError::BadRequest(format!(
            "username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    if username.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ServiceError::BadRequest(
            "username must not contain whitespace".to_string(),
        ));
    }
    if secret.is_empty() {
        return Err(ServiceError::BadRequest("secret is required".to_string()));
    }
    Ok(())
}

impl Tracker {
    /// Creates an account without logging it in.
    #[instrument(skip(self, secret))]
    pub async fn register(&self, username: &str, secret: &str) -> Result<AccountRecord, ServiceError> {
        validate_credentials(username, secret)?;
        let hash = self.credentials.hash(secret).await?;

        // The credential lands first so a visible account can always log in.
        if !self.credentials.store_new(username.to_string(), hash).await {
            return Err(ServiceError::AlreadyExists(username.to_string()));
        }

        let record = AccountRecord::new(username.to_string(), self.env.challenge_count());
        let handle = match self.db.insert(record).await {
            Ok(InsertOutcome::Inserted(handle)) => handle,
            Ok(InsertOutcome::AlreadyExists) => {
                self.credentials.remove(username).await;
                return Err(ServiceError::AlreadyExists(username.to_string()));
            }
            Err(e) => {
                self.credentials.remove(username).await;
                return Err(e.into());
            }
        };

        tracing::info!("Registered account {username}");
        let account = handle.lock().await.clone();
        Ok(account)
    }

    /// Strict login: unknown usernames are `NotFound`, never auto-created.
    /// A successful login replaces whatever session the account had.
    #[instrument(skip(self, secret))]
    pub async fn login(
        &self,
        username: &str,
        secret: &str,
    ) -> Result<(AccountRecord, SessionToken), ServiceError> {
        validate_credentials(username, secret)?;
        let handle = self
            .db
            .get(username)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("account {username}")))?;

        if !self.credentials.verify(username, secret).await? {
            tracing::info!("Rejected credentials for {username}");
            return Err(ServiceError::InvalidCredential);
        }

        let token = self.tokens.issue();
        let mut account = handle.lock().await;
        if let Some(previous) = account.active_token.replace(token.clone()) {
            self.db.release_session(&previous).await?;
            tracing::debug!("Replaced previous session of {username}");
        }
        self.db
            .bind_session(token.clone(), username.to_string())
            .await?;

        tracing::info!("Logged in {username}");
        Ok((account.clone(), token))
    }

    #[instrument(skip(self))]
    pub async fn logout(&self, session: &Session) -> Result<(), ServiceError> {
        let mut account = session.lock().await?;
        account.active_token = None;
        self.db.release_session(session.token()).await?;

        tracing::info!("Logged out {}", session.username());
        Ok(())
    }

    /// Maps a bearer token to its account. Anything but the account's
    /// current token is `Unauthorized`.
    pub async fn resolve(&self, token: &str) -> Result<Session, ServiceError> {
        if token.is_empty() {
            return Err(ServiceError::Unauthorized);
        }

        let token = SessionToken::from(token);
        let username = self
            .db
            .session_owner(&token)
            .await?
            .ok_or(ServiceError::Unauthorized)?;
        let account = self
            .db
            .get(&username)
            .await?
            .ok_or(ServiceError::Unauthorized)?;

        let session = Session {
            username,
            token,
            account,
        };
        session.lock().await?;
        Ok(session)
    }
}
