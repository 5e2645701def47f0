use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize users: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Flat JSON file holding every registered user.
///
/// Each call reads or rewrites the whole file. Nothing is locked, so two
/// processes writing the same file can lose each other's records.
#[derive(Debug, Clone)]
pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns every stored record in file order. A missing or unreadable file is an empty store.
    pub fn load(&self) -> Vec<UserRecord> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not read user store");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<UserRecord>>(&content) {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring malformed user store");
                Vec::new()
            }
        }
    }

    pub fn save(&self, users: &[UserRecord]) -> Result<(), StoreError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        users.serialize(&mut ser)?;

        fs::write(&self.path, buf).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), count = users.len(), "user store saved");
        Ok(())
    }
}
