use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::token_expired;

/// Key under which the bearer token is stored, mirroring the browser cookie name.
pub const AUTH_TOKEN_KEY: &str = "authToken";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session io: {0}")]
    Io(#[from] std::io::Error),
    #[error("session encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Bearer credential. `Debug` never prints the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    pub fn is_expired(&self) -> bool {
        token_expired(&self.0, Utc::now())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Holds the credential used by every authenticated request.
///
/// Implementations report an expired JWT as absent so callers short-circuit
/// with `Unauthorized` instead of sending a request the server will reject.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Option<Credential>;
    fn set(&self, credential: Credential) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

fn live(c: Option<Credential>) -> Option<Credential> {
    match c {
        Some(c) if c.is_expired() => {
            debug!("stored credential has expired");
            None
        }
        other => other,
    }
}

/// Session that lives for the process only.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: RwLock<Option<Credential>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self { inner: RwLock::new(Some(credential)) }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<Credential> {
        live(self.inner.read().unwrap_or_else(PoisonError::into_inner).clone())
    }
    fn set(&self, credential: Credential) -> Result<(), SessionError> {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(credential);
        Ok(())
    }
    fn clear(&self) -> Result<(), SessionError> {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Cookie-jar style store persisted as a small JSON object on disk.
pub struct FileSessionStore {
    path: PathBuf,
    jar: RwLock<HashMap<String, String>>,
}

impl FileSessionStore {
    /// Opens the jar at `path`. A missing or unreadable file starts an empty jar.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let jar = Self::load(&path);
        Self { path, jar: RwLock::new(jar) }
    }

    fn load(path: &Path) -> HashMap<String, String> {
        match std::fs::read(path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(jar) => jar,
                Err(e) => {
                    warn!("failed to parse session file '{}': {e}; starting signed out", path.display());
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        }
    }

    fn persist(&self, jar: &HashMap<String, String>) -> Result<(), SessionError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(jar)?)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<Credential> {
        let jar = self.jar.read().unwrap_or_else(PoisonError::into_inner);
        live(jar.get(AUTH_TOKEN_KEY).cloned().map(Credential))
    }
    fn set(&self, credential: Credential) -> Result<(), SessionError> {
        let mut jar = self.jar.write().unwrap_or_else(PoisonError::into_inner);
        jar.insert(AUTH_TOKEN_KEY.to_string(), credential.0);
        self.persist(&jar)
    }
    fn clear(&self) -> Result<(), SessionError> {
        let mut jar = self.jar.write().unwrap_or_else(PoisonError::into_inner);
        jar.remove(AUTH_TOKEN_KEY);
        self.persist(&jar)
    }
}
