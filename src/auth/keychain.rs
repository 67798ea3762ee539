use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StratusError};

const KEYCHAIN_FILE: &str = "keychain.age";
const MACHINE_KEY_FILE: &str = "machine.key";

/// A cached credential as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedCredential {
    pub token: String,
    pub tenant_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Encrypted credential cache under the stratus directory.
///
/// Entries are encrypted with age using a machine-local key generated on
/// first use and stored next to the cache with owner-only permissions.
pub struct Keychain {
    dir: PathBuf,
}

impl Keychain {
    pub fn open(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn keychain_path(&self) -> PathBuf {
        self.dir.join(KEYCHAIN_FILE)
    }

    fn machine_key_path(&self) -> PathBuf {
        self.dir.join(MACHINE_KEY_FILE)
    }

    /// Load the cached credential, if any.
    /// A missing, unreadable, or undecryptable cache is treated as absent.
    pub fn load(&self) -> Option<CachedCredential> {
        let path = self.keychain_path();
        if !path.exists() {
            return None;
        }
        let key = fs::read_to_string(self.machine_key_path()).ok()?;
        let ciphertext = fs::read(&path).ok()?;
        let plaintext = match decrypt(&ciphertext, key.trim()) {
            Ok(p) => p,
            Err(e) => {
                debug!(error = %e, "discarding undecryptable keychain entry");
                return None;
            }
        };
        rmp_serde::from_slice(&plaintext).ok()
    }

    /// Store a credential, creating the machine key on first use.
    pub fn store(&self, entry: &CachedCredential) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let key = self.load_or_create_machine_key()?;
        let plaintext =
            rmp_serde::to_vec(entry).map_err(|e| StratusError::Keychain(e.to_string()))?;
        let ciphertext = encrypt(&plaintext, &key)?;

        // Atomic write: write to temp file, then rename
        let path = self.keychain_path();
        let tmp_path = path.with_extension("age.tmp");
        fs::write(&tmp_path, &ciphertext)?;
        restrict_permissions(&tmp_path)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Remove any cached credential. Returns true if an entry existed.
    pub fn clear(&self) -> Result<bool> {
        let path = self.keychain_path();
        if path.exists() {
            fs::remove_file(&path)?;
            return Ok(true);
        }
        Ok(false)
    }

    fn load_or_create_machine_key(&self) -> Result<String> {
        let path = self.machine_key_path();
        if path.exists() {
            return Ok(fs::read_to_string(&path)?.trim().to_string());
        }
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let key = hex::encode(bytes);
        fs::write(&path, &key)?;
        restrict_permissions(&path)?;
        Ok(key)
    }
}

/// Encrypt data with the machine key via age.
fn encrypt(plaintext: &[u8], passphrase: &str) -> Result<Vec<u8>> {
    let encryptor =
        age::Encryptor::with_user_passphrase(age::secrecy::Secret::new(passphrase.to_string()));

    let mut encrypted = vec![];
    let mut writer = encryptor
        .wrap_output(&mut encrypted)
        .map_err(|e| StratusError::Keychain(e.to_string()))?;
    writer
        .write_all(plaintext)
        .map_err(|e| StratusError::Keychain(e.to_string()))?;
    writer
        .finish()
        .map_err(|e| StratusError::Keychain(e.to_string()))?;

    Ok(encrypted)
}

/// Decrypt data with the machine key via age.
fn decrypt(ciphertext: &[u8], passphrase: &str) -> Result<Vec<u8>> {
    let decryptor = match age::Decryptor::new(ciphertext)
        .map_err(|e| StratusError::Keychain(e.to_string()))?
    {
        age::Decryptor::Passphrase(d) => d,
        _ => {
            return Err(StratusError::Keychain(
                "Expected passphrase-encrypted data".into(),
            ))
        }
    };

    let mut decrypted = vec![];
    let mut reader = decryptor
        .decrypt(&age::secrecy::Secret::new(passphrase.to_string()), None)
        .map_err(|e| StratusError::Keychain(e.to_string()))?;
    reader
        .read_to_end(&mut decrypted)
        .map_err(|e| StratusError::Keychain(e.to_string()))?;

    Ok(decrypted)
}

fn restrict_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(tenant: Option<&str>) -> CachedCredential {
        CachedCredential {
            token: "cached-token".to_string(),
            tenant_id: tenant.map(|t| t.to_string()),
            expires_at: Some(Utc::now() + chrono::Duration::hours(1)),
        }
    }

    #[test]
    fn test_store_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let keychain = Keychain::open(dir.path().to_path_buf());

        keychain.store(&entry(Some("t1"))).unwrap();

        let loaded = keychain.load().unwrap();
        assert_eq!(loaded.token, "cached-token");
        assert_eq!(loaded.tenant_id.as_deref(), Some("t1"));
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let keychain = Keychain::open(dir.path().to_path_buf());
        assert!(keychain.load().is_none());
    }

    #[test]
    fn test_clear_removes_entry() {
        let dir = TempDir::new().unwrap();
        let keychain = Keychain::open(dir.path().to_path_buf());

        keychain.store(&entry(None)).unwrap();
        assert!(keychain.clear().unwrap());
        assert!(keychain.load().is_none());
        assert!(!keychain.clear().unwrap());
    }

    #[test]
    fn test_corrupt_cache_treated_as_absent() {
        let dir = TempDir::new().unwrap();
        let keychain = Keychain::open(dir.path().to_path_buf());

        keychain.store(&entry(None)).unwrap();
        fs::write(dir.path().join(KEYCHAIN_FILE), b"not an age file").unwrap();
        assert!(keychain.load().is_none());
    }

    #[test]
    fn test_store_overwrites_previous_entry() {
        let dir = TempDir::new().unwrap();
        let keychain = Keychain::open(dir.path().to_path_buf());

        keychain.store(&entry(Some("t1"))).unwrap();
        keychain.store(&entry(Some("t2"))).unwrap();

        let loaded = keychain.load().unwrap();
        assert_eq!(loaded.tenant_id.as_deref(), Some("t2"));
    }
}
