//! Authentication context.
//!
//! One `AuthContext` is built at startup from the persisted token and handed
//! to whatever needs the session. `login` and `logout` are the only mutators.
//! The stored token is the sole authenticated signal: this client never
//! checks its signature or expiry, the server does.

use crate::api::NewsClient;
use crate::error::{AdminError, Result};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Fixed storage key for the session token.
pub const TOKEN_STORAGE_KEY: &str = "token";

/// Persistence for the session token.
pub trait TokenStore {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Token kept in a file named after the storage key inside a state directory.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(TOKEN_STORAGE_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AdminError::Storage(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token).map_err(|e| {
            AdminError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AdminError::Storage(format!(
                "Failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

/// In-process token storage.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> Result<MutexGuard<'_, Option<String>>> {
        self.token
            .lock()
            .map_err(|_| AdminError::Storage("Token lock poisoned".to_string()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.slot()?.clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.slot()? = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot()? = None;
        Ok(())
    }
}

/// Display identity carried in the login token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub role: String,
}

/// Read the user claims of a JWT without verifying it.
///
/// Returns `None` for anything that is not a decodable JWT.
pub fn decode_user(token: &str) -> Option<User> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<User>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            debug!("Could not decode token claims: {}", e);
            None
        }
    }
}

/// Session state: `{token, user, is_authenticated}`.
pub struct AuthContext<S: TokenStore> {
    store: S,
    token: Option<String>,
    user: Option<User>,
}

impl<S: TokenStore> AuthContext<S> {
    /// Build the context from whatever token the store already holds.
    pub fn load(store: S) -> Result<Self> {
        let token = store.load()?;
        let user = token.as_deref().and_then(decode_user);
        Ok(Self { store, token, user })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Guard for protected commands.
    ///
    /// # Errors
    /// `AdminError::Unauthenticated` when no token is stored; callers send the
    /// user to the login command.
    pub fn require_auth(&self) -> Result<&str> {
        self.token.as_deref().ok_or(AdminError::Unauthenticated)
    }

    /// Exchange credentials for a token and persist it.
    ///
    /// The stored state only changes once the login call has succeeded.
    pub async fn login(&mut self, client: &NewsClient, username: &str, password: &str) -> Result<()> {
        let token = client.login(username, password).await?;
        self.store.save(&token)?;
        self.user = decode_user(&token);
        self.token = Some(token);

        match &self.user {
            Some(user) => info!("Logged in as {} ({})", user.username, user.role),
            None => warn!("Logged in, but the token carries no readable identity"),
        }
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        self.store.clear()?;
        self.token = None;
        self.user = None;
        info!("Logged out");
        Ok(())
    }
}
