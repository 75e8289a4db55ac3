//! Implements the `BillStore` trait against the Billed REST API using `reqwest`.

use crate::api::{ApiError, AttachmentUpload, BillStore, CreateResponse};
use crate::model::Bill;
use crate::{Result, Session};
use anyhow::Context;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use tracing::trace;
use url::Url;

/// Implements the `BillStore` trait over HTTP. Holds the API base URL and the
/// session token used as a bearer credential on every call.
pub(super) struct HttpStore {
    base_url: Url,
    token: String,
    client: reqwest::Client,
}

impl HttpStore {
    pub(super) fn new(api_url: &str, session: &Session) -> Result<Self> {
        let base_url = Url::parse(api_url)
            .with_context(|| format!("'{api_url}' is not a valid API base URL"))?;
        Ok(Self {
            base_url,
            token: session.token().to_string(),
            client: reqwest::Client::new(),
        })
    }

    fn bills_url(&self, id: Option<&str>) -> Result<Url> {
        let path = match id {
            Some(id) => format!("bills/{id}"),
            None => "bills".to_string(),
        };
        self.base_url
            .join(&path)
            .with_context(|| format!("Failed to build URL for '{path}'"))
    }
}

#[async_trait::async_trait]
impl BillStore for HttpStore {
    async fn list(&mut self) -> Result<Vec<Bill>> {
        trace!("fetching bills from {}", self.base_url);
        let response = self
            .client
            .get(self.bills_url(None)?)
            .bearer_auth(&self.token)
            .send()
            .await
            .context("Failed to send the bill list request")?;
        let response = reject_on_error_status(response).await?;
        response
            .json::<Vec<Bill>>()
            .await
            .context("Failed to parse the bill list response")
    }

    async fn create(&mut self, upload: AttachmentUpload) -> Result<CreateResponse> {
        trace!("uploading receipt '{}'", upload.file_name);
        // reqwest negotiates the multipart content type and boundary itself;
        // setting it explicitly would clobber the boundary.
        let form = Form::new()
            .part("file", Part::bytes(upload.bytes).file_name(upload.file_name))
            .text("email", upload.email);
        let response = self
            .client
            .post(self.bills_url(None)?)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await
            .context("Failed to send the receipt upload request")?;
        let response = reject_on_error_status(response).await?;
        response
            .json::<CreateResponse>()
            .await
            .context("Failed to parse the receipt upload response")
    }

    async fn update(&mut self, selector: Option<&str>, data: &Bill) -> Result<Bill> {
        trace!("persisting bill, selector: {selector:?}");
        // A draft whose receipt was never uploaded has no record yet; the
        // store allocates one here instead of patching.
        let request = match selector {
            Some(id) => self.client.patch(self.bills_url(Some(id))?),
            None => self.client.post(self.bills_url(None)?),
        };
        let response = request
            .bearer_auth(&self.token)
            .json(data)
            .send()
            .await
            .context("Failed to send the bill update request")?;
        let response = reject_on_error_status(response).await?;
        response
            .json::<Bill>()
            .await
            .context("Failed to parse the bill update response")
    }
}

/// Converts a non-success HTTP response into an `ApiError` carrying the
/// status code and the response body as the message.
async fn reject_on_error_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    Err(ApiError::new(status.as_u16(), message).into())
}
