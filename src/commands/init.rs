use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and its contents:
/// - an initial `config.json` pointing at `api_url`
/// - a session file submitting bills as `email`
///
/// # Arguments
/// - `billed_home` - The directory that will be the root of the data
///   directory, e.g. `$HOME/billed`
/// - `api_url` - The base URL of the bill store API,
///   e.g. http://localhost:5678/
/// - `email` - The employee email bills will be submitted as.
///
/// # Errors
/// - Returns an error if the URL is invalid or any file operation fails.
pub async fn init(billed_home: &Path, api_url: &str, email: &str) -> Result<Out<()>> {
    let _config = Config::create(billed_home, api_url, email)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok("Successfully created the billed directory and config".into())
}
