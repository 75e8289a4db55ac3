//! Configuration file handling.
//!
//! The configuration file is stored at `$BILLED_HOME/config.json` and holds
//! the base URL of the bill store API. The `Config` object also provides the
//! paths of everything else expected inside the billed home directory, such
//! as the session file.

use crate::{utils, Result, Session};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "billed";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const CONFIG_JSON: &str = "config.json";
const SESSION_JSON: &str = "session.json";

/// The `Config` object represents the configuration of the app. You
/// instantiate it by providing the path to `$BILLED_HOME` and from there it
/// loads `$BILLED_HOME/config.json`. It provides paths to the other items
/// expected in certain locations within the billed home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory and its subdirectories, writes an initial
    /// `config.json` using `api_url`, and writes a session file for `email`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory,
    ///   e.g. `$HOME/billed`
    /// - `api_url` - The base URL of the bill store API,
    ///   e.g. http://localhost:5678/
    /// - `email` - The employee email the session will submit bills as.
    ///
    /// # Errors
    /// - Returns an error if the URL is invalid or any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>, api_url: &str, email: &str) -> Result<Self> {
        // Reject unusable URLs before writing anything to disk.
        let _ = url::Url::parse(api_url)
            .with_context(|| format!("'{api_url}' is not a valid API base URL"))?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the billed home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await?;

        // Create and save an initial ConfigFile in the data directory
        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_url: api_url.to_string(),
        };
        config_file.save(&config_path).await?;

        // The token is left empty; how it gets minted is out of scope.
        let session = Session::new(email, "");
        session.save(&secrets.join(SESSION_JSON)).await?;

        Ok(Self {
            root,
            secrets,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that `billed_home` and the config file exist
    /// - load the config file
    /// - return the loaded configuration object
    pub async fn load(billed_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = billed_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Billed Home is missing, run 'billed init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        Ok(Self {
            secrets: root.join(SECRETS),
            root,
            config_path,
            config_file,
        })
    }

    /// Loads the session from its expected location in the data directory.
    pub async fn session(&self) -> Result<Session> {
        Session::load(&self.session_path()).await
    }

    /// The base URL of the bill store API.
    pub fn api_url(&self) -> &str {
        &self.config_file.api_url
    }

    /// The root of the data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The path of the session file.
    pub fn session_path(&self) -> PathBuf {
        self.secrets.join(SESSION_JSON)
    }

    /// The path of the config file.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// The serialized form of `config.json`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct ConfigFile {
    app_name: String,
    config_version: u8,
    api_url: String,
}

impl ConfigFile {
    async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize the config file")?;
        utils::write(path, content).await
    }

    async fn load(path: &Path) -> Result<Self> {
        utils::deserialize(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_then_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("billed");
        let created = Config::create(&home, "http://localhost:5678/", "a@a")
            .await
            .unwrap();
        assert_eq!(created.api_url(), "http://localhost:5678/");

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.api_url(), "http://localhost:5678/");
        let session = loaded.session().await.unwrap();
        assert_eq!(session.email(), "a@a");
    }

    #[tokio::test]
    async fn test_create_rejects_bad_url() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("billed");
        assert!(Config::create(&home, "not a url", "a@a").await.is_err());
        // Nothing should have been written.
        assert!(!home.exists());
    }

    #[tokio::test]
    async fn test_load_missing_home_fails() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(dir.path().join("nope")).await.is_err());
    }
}
