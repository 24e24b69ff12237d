use std::fs;
use std::path::PathBuf;

use super::error::AuthError;
use super::token::{token_state, TokenState};

/// Storage abstraction for installed Placement tokens.
///
/// Token contents are opaque bytes; `name` is a bare file name such as
/// `Placement.token`, never a path.
pub trait TokenStore: Send + Sync {
    fn save(&self, name: &str, contents: &[u8]) -> Result<(), AuthError>;
    fn load(&self, name: &str) -> Result<Option<Vec<u8>>, AuthError>;
    fn clear(&self, name: &str) -> Result<(), AuthError>;

    /// Whether the named token is missing, unreadable, expired, or OK.
    fn token_state(&self, name: &str) -> TokenState {
        match self.load(name) {
            Ok(Some(contents)) => token_state(&contents),
            Ok(None) => TokenState::Missing,
            Err(_) => TokenState::Unreadable,
        }
    }
}

/// Configuration for file-backed token storage.
#[derive(Debug, Clone)]
pub struct TokenStoreConfig {
    pub base_dir: PathBuf,
}

impl TokenStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_tokens_dir()
    }
}

/// File-backed token store.
///
/// Tokens are written into an auto-created directory restricted to the
/// owner (0o700 directory, 0o600 files on unix).
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    base_dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(config: TokenStoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
        }
    }

    pub fn new_default() -> Self {
        Self {
            base_dir: default_tokens_dir(),
        }
    }

    fn token_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn ensure_dir(&self) -> Result<(), AuthError> {
        fs::create_dir_all(&self.base_dir)?;
        // create_dir_all does not set the mode on a directory that already
        // exists.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.base_dir, fs::Permissions::from_mode(0o700))?;
        }
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, name: &str, contents: &[u8]) -> Result<(), AuthError> {
        self.ensure_dir()?;
        let path = self.token_path(name);
        fs::write(&path, contents)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Option<Vec<u8>>, AuthError> {
        let path = self.token_path(name);
        match fs::read(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }

    fn clear(&self, name: &str) -> Result<(), AuthError> {
        let path = self.token_path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }
}

fn default_tokens_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".placement/tokens.d"))
        .unwrap_or_else(|| PathBuf::from(".placement/tokens.d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, FileTokenStore) {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(TokenStoreConfig::new(dir.path().join("tokens.d")));
        (dir, store)
    }

    #[test]
    fn token_round_trip_works() {
        let (_dir, store) = temp_store();
        store.save("Placement.token", b"token-bytes").unwrap();
        let loaded = store.load("Placement.token").unwrap().unwrap();
        assert_eq!(loaded, b"token-bytes");
    }

    #[test]
    fn clear_removes_token() {
        let (_dir, store) = temp_store();
        store.save("Placement.token", b"token-bytes").unwrap();
        store.clear("Placement.token").unwrap();
        assert!(store.load("Placement.token").unwrap().is_none());
    }

    #[test]
    fn clear_succeeds_when_already_missing() {
        let (_dir, store) = temp_store();
        store.clear("Placement.token").unwrap();
    }

    #[test]
    fn missing_token_state_is_missing() {
        let (_dir, store) = temp_store();
        assert_eq!(store.token_state("Placement.token"), TokenState::Missing);
    }

    #[test]
    fn stored_token_state_reflects_contents() {
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        use base64::Engine;

        let (_dir, store) = temp_store();
        let payload = URL_SAFE_NO_PAD.encode(format!(
            r#"{{"exp":{}}}"#,
            Utc::now().timestamp() + 3600
        ));
        let contents = format!("header.{payload}.signature");
        store.save("Placement.token", contents.as_bytes()).unwrap();
        assert_eq!(store.token_state("Placement.token"), TokenState::Ok);
    }

    #[cfg(unix)]
    #[test]
    fn saved_token_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, store) = temp_store();
        store.save("Placement.token", b"token-bytes").unwrap();
        let file_mode = std::fs::metadata(dir.path().join("tokens.d/Placement.token"))
            .unwrap()
            .permissions()
            .mode();
        let dir_mode = std::fs::metadata(dir.path().join("tokens.d"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(file_mode & 0o777, 0o600);
        assert_eq!(dir_mode & 0o777, 0o700);
    }
}
