//! Login token storage and JWT claims

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ledgerdesk_core::CoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid token: {reason}")]
    InvalidToken { reason: String },

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Token file error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AuthError> for CoreError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::NotLoggedIn => CoreError::InvalidState {
                message: "not logged in; run `ledgerdesk login` first".to_string(),
            },
            other => CoreError::Internal {
                message: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Claims read from the JWT payload; the signature is not checked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role")]
    pub role: String,
    #[serde(default)]
    pub exp: i64,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl TokenClaims {
    /// Expiry is in seconds since the epoch; a missing `exp` counts as expired
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }
}

/// Decode the payload segment of a JWT
pub fn decode_claims(token: &str) -> Result<TokenClaims, AuthError> {
    let payload = token
        .trim()
        .split('.')
        .nth(1)
        .ok_or_else(|| AuthError::InvalidToken {
            reason: "expected three dot-separated segments".to_string(),
        })?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::InvalidToken {
            reason: format!("payload is not base64url: {}", e),
        })?;
    serde_json::from_slice(&bytes).map_err(|e| AuthError::InvalidToken {
        reason: format!("payload is not JSON: {}", e),
    })
}

/// True when a token is present, decodes, and expires after `now`
pub fn is_logged_in(token: Option<&str>, now: i64) -> bool {
    token
        .and_then(|t| decode_claims(t).ok())
        .map(|claims| !claims.is_expired_at(now))
        .unwrap_or(false)
}

/// Token persisted in a local file between runs
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, token: &str) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, token.trim())?;
        log::info!("token saved to {}", self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<Option<String>, AuthError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim().to_string();
                Ok(if token.is_empty() { None } else { Some(token) })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Token and its claims, or `NotLoggedIn` when missing or expired
    pub fn session(&self, now: i64) -> Result<(String, TokenClaims), AuthError> {
        let token = self.load()?.ok_or(AuthError::NotLoggedIn)?;
        let claims = decode_claims(&token)?;
        if claims.is_expired_at(now) {
            return Err(AuthError::NotLoggedIn);
        }
        Ok((token, claims))
    }

    /// Remove the stored token; missing files are fine
    pub fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                log::info!("token removed from {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
