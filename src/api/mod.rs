//! The remote bill store abstraction and its implementations.
//!
//! The rest of the crate only ever talks to the store through the `BillStore`
//! trait so that the whole app can run, top-to-bottom, against the in-memory
//! `TestStore` without a network.

mod http_store;
mod test_store;

use crate::model::Bill;
use crate::{Config, Result, Session};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};

pub use test_store::{TestStore, TestStoreState};

/// The environment variable that switches the app into test mode.
const IN_TEST_MODE: &str = "BILLED_IN_TEST_MODE";

/// A receipt file upload: the file contents plus the submitting employee's
/// email. Transmitted as a multipart form; the transport layer negotiates the
/// content type and boundary itself rather than setting them explicitly.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct AttachmentUpload {
    /// The name of the file as the user selected it.
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub email: String,
}

/// The store's answer to a receipt upload. Uploading the receipt is also what
/// allocates the bill record on the backend: `key` identifies that record and
/// the final submit is an update against it.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponse {
    pub file_url: String,
    pub key: String,
}

/// Abstracts the remote bill store. Every operation either returns a value or
/// rejects with an error carrying an `ApiError` (status and message) that
/// callers can recover with `downcast_ref`.
#[async_trait::async_trait]
pub trait BillStore {
    /// Fetches all bills visible to the current user.
    async fn list(&mut self) -> Result<Vec<Bill>>;

    /// Uploads a receipt file, allocating the backend bill record.
    async fn create(&mut self, upload: AttachmentUpload) -> Result<CreateResponse>;

    /// Persists the full bill against the record identified by `selector`,
    /// or lets the store allocate a record when no receipt was ever uploaded.
    /// Returns the server's canonical record, which may differ from what was
    /// sent (e.g. admin-filled fields).
    async fn update(&mut self, selector: Option<&str>, data: &Bill) -> Result<Bill>;
}

/// A rejection from the bill store: an HTTP-like status code and a message.
/// The core treats 404s and 500s identically; only the presentation layer
/// differentiates the message shown.
#[derive(Clone, Eq, PartialEq)]
pub struct ApiError {
    status: u16,
    message: String,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Debug for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ApiError {{ status: {}, message: {} }}", self.status, self.message)
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Erreur {}: {}", self.status, self.message)
    }
}

impl Error for ApiError {}

/// Selects which `BillStore` implementation the app runs against.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// The real REST API over HTTP.
    #[default]
    Http,
    /// The in-memory store seeded with fixture data.
    Test,
}

serde_plain::derive_display_from_serialize!(Mode);
serde_plain::derive_fromstr_from_deserialize!(Mode);

impl Mode {
    /// Returns `Mode::Test` when `BILLED_IN_TEST_MODE` is set and non-empty,
    /// otherwise `Mode::Http`.
    pub fn from_env() -> Self {
        match std::env::var(IN_TEST_MODE) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

/// Creates the `BillStore` for `mode`, dynamically dispatched so callers do
/// not need to know which implementation they are holding.
pub fn store(mode: Mode, config: &Config, session: &Session) -> Result<Box<dyn BillStore + Send>> {
    match mode {
        Mode::Http => Ok(Box::new(http_store::HttpStore::new(config.api_url(), session)?)),
        Mode::Test => Ok(Box::new(TestStore::seeded())),
    }
}
