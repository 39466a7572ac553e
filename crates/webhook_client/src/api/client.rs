//! HTTP client for the identity-card generation webhook.

use core::time::Duration;

use records::PdfSource;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, info};

use super::models::{WebhookPayload, WebhookResponse};
use crate::error::SubmitError;

/// Request timeout for the generation call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the generation webhook.
#[derive(Debug)]
pub struct WebhookClient {
    client: Client,
    webhook_url: Url,
}

impl WebhookClient {
    /// Creates a client for the configured webhook address.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the address is missing or not a
    /// valid URL, without making any network call.
    pub fn new(webhook_url: Option<&str>) -> Result<Self, SubmitError> {
        let address = webhook_url
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or(SubmitError::NotConfigured)?;
        let webhook_url = Url::parse(address).map_err(|_| SubmitError::InvalidWebhookUrl)?;

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(SubmitError::Transport)?;

        Ok(Self {
            client,
            webhook_url,
        })
    }

    /// Submits the payload and interprets the webhook's response into a
    /// PDF source.
    ///
    /// # Errors
    ///
    /// Returns the submission error to surface to the user: transport
    /// failure, non-JSON response, rejected status (with the derived
    /// message), or a success body carrying no PDF.
    pub async fn generate_card(&self, payload: &WebhookPayload) -> Result<PdfSource, SubmitError> {
        info!(school = %payload.form.school, "Submitting ID generation request");

        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(payload)
            .send()
            .await
            .map_err(SubmitError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(SubmitError::Transport)?;

        debug!(status = %status, bytes = body.len(), "Webhook responded");
        interpret_response(status, &body)
    }
}

/// Interprets the webhook's status and body.
fn interpret_response(status: StatusCode, body: &str) -> Result<PdfSource, SubmitError> {
    let response: WebhookResponse =
        serde_json::from_str(body).map_err(|_| SubmitError::InvalidResponse)?;

    if !status.is_success() {
        return Err(SubmitError::Rejected(failure_message(status, &response)));
    }

    if let Some(url) = response.pdf_url.filter(|u| !u.is_empty()) {
        return Ok(PdfSource::Url(url));
    }

    if let Some(encoded) = response.pdf_base64 {
        return PdfSource::from_base64(&encoded).map_err(|_| SubmitError::InvalidResponse);
    }

    Err(SubmitError::NoPdf)
}

/// Picks the user-facing message for a rejected status, in priority
/// order: explicit `message`, explicit `error`, a status-class default,
/// then a generic fallback.
fn failure_message(status: StatusCode, response: &WebhookResponse) -> String {
    if let Some(message) = response.message.as_deref().filter(|m| !m.is_empty()) {
        return message.to_owned();
    }
    if let Some(error) = response.error.as_deref().filter(|e| !e.is_empty()) {
        return error.to_owned();
    }
    if status.is_server_error() {
        return "Server error. Please try again later.".to_owned();
    }
    if status.is_client_error() {
        return "Request failed. Please check your details and try again.".to_owned();
    }
    "Failed to generate Alumni ID. Please try again.".to_owned()
}
