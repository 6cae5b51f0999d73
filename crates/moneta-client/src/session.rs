//! Access token storage, optionally persisted to a file

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{ClientError, ClientResult};

/// Holds the bearer token for authenticated calls
#[derive(Debug, Default)]
pub struct TokenStore {
    token: RwLock<Option<String>>,
    path: Option<PathBuf>,
}

impl TokenStore {
    /// Token kept for the lifetime of the process only
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Token mirrored to `path`, loading any token already stored there
    pub fn persistent(path: PathBuf) -> ClientResult<Self> {
        let token = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| file_error(&path, e))?;
            let trimmed = content.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        } else {
            None
        };
        log::debug!("Token store at {} (token present: {})", path.display(), token.is_some());
        Ok(Self {
            token: RwLock::new(token),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_set(&self) -> bool {
        self.token.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    pub fn set(&self, token: String) -> ClientResult<()> {
        if let Some(ref path) = self.path {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| file_error(path, e))?;
            }
            std::fs::write(path, &token).map_err(|e| file_error(path, e))?;
        }
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token);
        Ok(())
    }

    /// Forget the token in memory and on disk
    pub fn clear(&self) -> ClientResult<()> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        if let Some(ref path) = self.path {
            if path.exists() {
                std::fs::remove_file(path).map_err(|e| file_error(path, e))?;
            }
        }
        Ok(())
    }
}

fn file_error(path: &Path, error: std::io::Error) -> ClientError {
    ClientError::TokenFile {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory() {
        let store = TokenStore::in_memory();
        assert!(!store.is_set());
        store.set("abc".to_string()).unwrap();
        assert_eq!(store.get().as_deref(), Some("abc"));
        store.clear().unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn test_persistent_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("token");

        let store = TokenStore::persistent(path.clone()).unwrap();
        assert!(!store.is_set());
        store.set("abc".to_string()).unwrap();

        let reopened = TokenStore::persistent(path.clone()).unwrap();
        assert_eq!(reopened.get().as_deref(), Some("abc"));

        reopened.clear().unwrap();
        assert!(!path.exists());
        assert!(!TokenStore::persistent(path).unwrap().is_set());
    }

    #[test]
    fn test_blank_file_means_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "  \n").unwrap();

        assert!(!TokenStore::persistent(path).unwrap().is_set());
    }
}
