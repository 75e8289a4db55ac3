//! The current user's session: who is submitting bills and the credential
//! presented to the store.
//!
//! The session is an explicit object passed into constructors; nothing in the
//! crate reads user identity from ambient global state. How the token gets
//! minted is out of scope here, the file is simply expected to exist (the
//! `init` command writes one).

use crate::{utils, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The current user's identity and API credential, loaded from
/// `$BILLED_HOME/.secrets/session.json`.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Session {
    email: String,
    token: String,
}

impl Session {
    pub fn new(email: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            token: token.into(),
        }
    }

    /// The submitting employee's email. Sent along with every receipt upload.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The bearer credential presented to the store. May be empty in test
    /// mode, where the store ignores it.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Loads the session file.
    pub async fn load(path: &Path) -> Result<Self> {
        utils::deserialize(path)
            .await
            .context("Failed to load the session file, run 'billed init' first")
    }

    /// Writes the session file with restrictive permissions.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize the session")?;
        utils::write(path, content).await?;

        // 0600 on Unix, the file holds a credential.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, permissions)
                .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let session = Session::new("employee@test.tld", "jwt");
        session.save(&path).await.unwrap();
        let loaded = Session::load(&path).await.unwrap();
        assert_eq!(loaded, session);
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(Session::load(&dir.path().join("session.json")).await.is_err());
    }
}
