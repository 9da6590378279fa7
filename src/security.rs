//! Credential storage: a JSON users file with Argon2 password hashes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use parking_lot::RwLock;
use password_hash::{PasswordHash, SaltString};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_ADMIN: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UsersFile {
    #[serde(default)]
    users: Vec<UserRecord>,
}

pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2.hash_password(password.as_bytes(), &salt).map_err(|e| anyhow!(e.to_string()))?.to_string();
    Ok(phc)
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
    } else { false }
}

fn read_users(path: &Path) -> Result<UsersFile> {
    if !path.exists() { return Ok(UsersFile::default()); }
    let text = std::fs::read_to_string(path).with_context(|| format!("reading users file {}", path.display()))?;
    let parsed = serde_json::from_str(&text).with_context(|| format!("parsing users file {}", path.display()))?;
    Ok(parsed)
}

fn write_users(path: &Path, file: &UsersFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
    }
    let text = serde_json::to_string_pretty(file)?;
    std::fs::write(path, text).with_context(|| format!("writing users file {}", path.display()))?;
    Ok(())
}

/// Write a users file holding a single `admin`/`admin` account when none exists.
pub fn ensure_default_admin(path: &Path) -> Result<()> {
    if path.exists() { return Ok(()); }
    let file = UsersFile {
        users: vec![UserRecord {
            username: DEFAULT_ADMIN.to_string(),
            password_hash: hash_password(DEFAULT_ADMIN)?,
            display_name: Some("Administrator".to_string()),
            roles: vec!["admin".to_string()],
            permissions: Vec::new(),
        }],
    };
    write_users(path, &file)?;
    tracing::warn!(target: "startup", path = %path.display(), "created default admin account; change its password");
    Ok(())
}

/// Users keyed by lowercase username, mirrored to disk on every change.
pub struct CredentialStore {
    path: PathBuf,
    users: RwLock<BTreeMap<String, UserRecord>>,
}

impl CredentialStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = read_users(&path)?;
        let users = file.users.into_iter().map(|u| (u.username.to_lowercase(), u)).collect::<BTreeMap<_, _>>();
        info!(target: "startup", path = %path.display(), users = users.len(), "loaded credential store");
        Ok(Self { path, users: RwLock::new(users) })
    }

    /// `Ok(None)` for an unknown user or wrong password.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<UserRecord>> {
        let key = username.trim().to_lowercase();
        if key.is_empty() { return Ok(None); }
        let Some(user) = self.users.read().get(&key).cloned() else { return Ok(None); };
        if verify_password(&user.password_hash, password) { Ok(Some(user)) } else { Ok(None) }
    }

    /// Insert or replace a user and persist the file.
    pub fn upsert_user(&self, username: &str, password: &str, roles: Vec<String>, permissions: Vec<String>) -> Result<()> {
        let key = username.trim().to_lowercase();
        if key.is_empty() { return Err(anyhow!("username must not be empty")); }
        let record = UserRecord {
            username: username.trim().to_string(),
            password_hash: hash_password(password)?,
            display_name: None,
            roles,
            permissions,
        };
        let mut users = self.users.write();
        users.insert(key, record);
        write_users(&self.path, &UsersFile { users: users.values().cloned().collect() })
    }

    pub fn delete_user(&self, username: &str) -> Result<bool> {
        let mut users = self.users.write();
        let removed = users.remove(&username.trim().to_lowercase()).is_some();
        if removed {
            write_users(&self.path, &UsersFile { users: users.values().cloned().collect() })?;
        }
        Ok(removed)
    }

    pub fn usernames(&self) -> Vec<String> {
        self.users.read().values().map(|u| u.username.clone()).collect()
    }
}
