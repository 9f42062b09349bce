//! Access-level gate.
//!
//! A password is hashed and matched against a table of known hashes; the
//! resulting level is wrapped in a sealed token with a 24h expiry and stored
//! locally together with the login time. This is UI gating only: the secret
//! ships with the program.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::cipher::{self, CipherError};
use super::registry::{AccessLevel, AppDescriptor};
use crate::config::{load_json, save_json};

pub const TOKEN_LIFETIME_HOURS: i64 = 24;
pub const STORED_LOGIN_WINDOW_HOURS: i64 = 12;

// ── Config ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_salt")]
    pub salt: String,
    #[serde(default = "default_salt")]
    pub token_secret: String,
    /// Access level → hex SHA-256 of `password ‖ salt`.
    #[serde(default = "default_level_hashes")]
    pub level_hashes: BTreeMap<u8, String>,
}

fn default_salt() -> String {
    "server".to_string()
}

fn default_level_hashes() -> BTreeMap<u8, String> {
    BTreeMap::from([
        (
            2,
            "1b055790275fe1228786d33b8897a3fa6fb26191c1eafe3b2074b096899a821d".to_string(),
        ),
        (
            3,
            "98877553b2bed31cc19b5b3ae73c855831519154d83453cb897e120e062b21d3".to_string(),
        ),
    ])
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            salt: default_salt(),
            token_secret: default_salt(),
            level_hashes: default_level_hashes(),
        }
    }
}

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct TokenPayload {
    #[serde(rename = "accessLevel")]
    access_level: AccessLevel,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    exp: DateTime<Utc>,
}

/// Sealed `{accessLevel, exp}` blob. Opaque to everything but [`AuthGate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ── Storage ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    #[serde(default, rename = "accessToken")]
    pub access_token: Option<String>,
    #[serde(
        default,
        rename = "lastLogin",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub last_login: Option<DateTime<Utc>>,
}

pub trait CredentialStore {
    fn load(&self) -> StoredCredentials;
    fn save(&mut self, creds: &StoredCredentials) -> anyhow::Result<()>;
    fn clear(&mut self);
}

/// `session.json` under the base directory (`VIXEN_HOME`).
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CredentialStore for FileStore {
    fn load(&self) -> StoredCredentials {
        load_json(&self.path)
    }

    fn save(&mut self, creds: &StoredCredentials) -> anyhow::Result<()> {
        save_json(&self.path, creds)
    }

    fn clear(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[derive(Default)]
pub struct MemoryStore {
    creds: StoredCredentials,
}

impl MemoryStore {
    pub fn with(creds: StoredCredentials) -> Self {
        Self { creds }
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> StoredCredentials {
        self.creds.clone()
    }

    fn save(&mut self, creds: &StoredCredentials) -> anyhow::Result<()> {
        self.creds = creds.clone();
        Ok(())
    }

    fn clear(&mut self) {
        self.creds = StoredCredentials::default();
    }
}

// ── Gate ──────────────────────────────────────────────────────────────────────

pub struct AuthGate {
    config: AuthConfig,
    store: Box<dyn CredentialStore>,
    // Decoded once; unsealing runs a full key derivation.
    session: Option<TokenPayload>,
}

impl AuthGate {
    pub fn new(config: AuthConfig, store: Box<dyn CredentialStore>) -> Self {
        let mut gate = Self {
            config,
            store,
            session: None,
        };
        gate.session = gate
            .store
            .load()
            .access_token
            .and_then(|t| gate.decode(&t));
        gate
    }

    pub fn hash_password(&self, password: &str) -> String {
        let mut h = Sha256::new();
        h.update(password.as_bytes());
        h.update(self.config.salt.as_bytes());
        hex::encode(h.finalize())
    }

    pub fn level_for_password(&self, password: &str) -> AccessLevel {
        let hashed = self.hash_password(password);
        self.config
            .level_hashes
            .iter()
            .find(|(_, h)| **h == hashed)
            .map(|(level, _)| AccessLevel(*level))
            .unwrap_or(AccessLevel::DEFAULT)
    }

    pub fn issue_token(
        &self,
        level: AccessLevel,
        now: DateTime<Utc>,
    ) -> Result<AccessToken, CipherError> {
        let payload = TokenPayload {
            access_level: level,
            exp: now + Duration::hours(TOKEN_LIFETIME_HOURS),
        };
        let json = serde_json::to_vec(&payload).map_err(|_| CipherError::Encrypt)?;
        cipher::seal(&self.config.token_secret, &json).map(AccessToken)
    }

    /// Level carried by `token`, or the default level if it is invalid or expired.
    pub fn verify_token(&self, token: &str, now: DateTime<Utc>) -> AccessLevel {
        match self.decode(token) {
            Some(p) if p.exp > now => p.access_level,
            _ => AccessLevel::DEFAULT,
        }
    }

    fn decode(&self, token: &str) -> Option<TokenPayload> {
        let plain = match cipher::open(&self.config.token_secret, token) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("invalid access token: {e}");
                return None;
            }
        };
        serde_json::from_slice(&plain).ok()
    }

    /// Hash the password, issue and persist a token. Returns the granted level.
    pub fn login(&mut self, password: &str, now: DateTime<Utc>) -> AccessLevel {
        let level = self.level_for_password(password);
        let token = match self.issue_token(level, now) {
            Ok(t) => t,
            Err(e) => {
                log::error!("issuing access token: {e}");
                return AccessLevel::DEFAULT;
            }
        };
        let creds = StoredCredentials {
            access_token: Some(token.0),
            last_login: Some(now),
        };
        if let Err(e) = self.store.save(&creds) {
            log::warn!("persisting credentials: {e:#}");
        }
        self.session = Some(TokenPayload {
            access_level: level,
            exp: now + Duration::hours(TOKEN_LIFETIME_HOURS),
        });
        log::info!("login granted access level {level}");
        level
    }

    pub fn logout(&mut self) {
        self.store.clear();
        self.session = None;
    }

    /// Honour stored credentials only when they are recent and elevated;
    /// anything else is wiped.
    pub fn check_stored_credentials(&mut self, now: DateTime<Utc>) -> bool {
        let creds = self.store.load();
        if let (Some(_), Some(last)) = (&creds.access_token, creds.last_login) {
            let fresh = now - last < Duration::hours(STORED_LOGIN_WINDOW_HOURS);
            if fresh && self.current_access_level(now) > AccessLevel::DEFAULT {
                return true;
            }
        }
        self.logout();
        false
    }

    pub fn current_access_level(&self, now: DateTime<Utc>) -> AccessLevel {
        match self.session {
            Some(p) if p.exp > now => p.access_level,
            _ => AccessLevel::DEFAULT,
        }
    }

    pub fn can_open(&self, app: &AppDescriptor, now: DateTime<Utc>) -> bool {
        self.current_access_level(now) >= app.access_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::ContentKind;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap()
    }

    fn gate_with_password(password: &str, level: u8) -> AuthGate {
        let mut config = AuthConfig::default();
        let probe = AuthGate::new(config.clone(), Box::new(MemoryStore::default()));
        config.level_hashes = BTreeMap::from([(level, probe.hash_password(password))]);
        AuthGate::new(config, Box::new(MemoryStore::default()))
    }

    #[test]
    fn hash_matches_salted_sha256() {
        let gate = AuthGate::new(AuthConfig::default(), Box::new(MemoryStore::default()));
        let mut h = Sha256::new();
        h.update(b"lemonserver");
        assert_eq!(gate.hash_password("lemon"), hex::encode(h.finalize()));
    }

    #[test]
    fn unknown_password_yields_default_level() {
        let mut gate = gate_with_password("open sesame", 2);
        assert_eq!(gate.login("wrong", t0()), AccessLevel::DEFAULT);
        assert_eq!(gate.current_access_level(t0()), AccessLevel::DEFAULT);
    }

    #[test]
    fn login_grants_level_until_expiry() {
        let mut gate = gate_with_password("open sesame", 3);
        assert_eq!(gate.login("open sesame", t0()), AccessLevel(3));
        assert_eq!(gate.current_access_level(t0() + Duration::hours(23)), AccessLevel(3));
        assert_eq!(
            gate.current_access_level(t0() + Duration::hours(TOKEN_LIFETIME_HOURS)),
            AccessLevel::DEFAULT
        );
    }

    #[test]
    fn issued_token_verifies_and_expires() {
        let gate = gate_with_password("pw", 2);
        let token = gate.issue_token(AccessLevel(2), t0()).unwrap();
        assert_eq!(gate.verify_token(token.as_str(), t0()), AccessLevel(2));
        assert_eq!(
            gate.verify_token(token.as_str(), t0() + Duration::hours(25)),
            AccessLevel::DEFAULT
        );
        assert_eq!(gate.verify_token("garbage", t0()), AccessLevel::DEFAULT);
    }

    #[test]
    fn stored_credentials_survive_restart_within_window() {
        let mut gate = gate_with_password("pw", 2);
        gate.login("pw", t0());
        let creds = gate.store.load();
        let config = gate.config.clone();

        let mut restarted = AuthGate::new(config.clone(), Box::new(MemoryStore::with(creds.clone())));
        assert!(restarted.check_stored_credentials(t0() + Duration::hours(11)));
        assert_eq!(restarted.current_access_level(t0() + Duration::hours(11)), AccessLevel(2));

        let mut stale = AuthGate::new(config, Box::new(MemoryStore::with(creds)));
        assert!(!stale.check_stored_credentials(t0() + Duration::hours(13)));
        assert_eq!(stale.store.load(), StoredCredentials::default());
        assert_eq!(stale.current_access_level(t0() + Duration::hours(13)), AccessLevel::DEFAULT);
    }

    #[test]
    fn default_level_login_is_not_remembered() {
        let mut gate = gate_with_password("pw", 2);
        gate.login("nope", t0());
        assert!(!gate.check_stored_credentials(t0()));
    }

    #[test]
    fn can_open_compares_against_descriptor_level() {
        let mut gate = gate_with_password("pw", 2);
        let docs = AppDescriptor::new("documents", "Documents", "📁", ContentKind::Placeholder)
            .with_access(2);
        assert!(!gate.can_open(&docs, t0()));
        gate.login("pw", t0());
        assert!(gate.can_open(&docs, t0()));
        gate.logout();
        assert!(!gate.can_open(&docs, t0()));
    }
}
