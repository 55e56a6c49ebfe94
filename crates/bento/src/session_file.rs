//! Session token kept between invocations

use anyhow::{Context, Result};
use bento_util::SessionToken;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File holding the token of the signed-in session
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved token, if any
    pub fn load(&self) -> Result<Option<SessionToken>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| SessionToken::new(token)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read session file {:?}", self.path)),
        }
    }

    /// Save a token readable only by the current user
    pub fn save(&self, token: &SessionToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(&self.path)
            .with_context(|| format!("Failed to open session file {:?}", self.path))?;
        // An older file keeps the mode it was created with
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        file.write_all(token.as_str().as_bytes())
            .with_context(|| format!("Failed to write session file {:?}", self.path))?;

        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove session file {:?}", self.path)),
        }
    }
}
