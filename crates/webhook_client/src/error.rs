//! Submission error taxonomy.

use thiserror::Error;

/// Failure of one submission attempt.
///
/// Every variant renders as the message shown to the user. Nothing is
/// retried automatically; recovery is a manual resubmission.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Webhook address is not configured.")]
    NotConfigured,

    #[error("Webhook address is invalid.")]
    InvalidWebhookUrl,

    #[error("Could not reach the ID generator. Please try again.")]
    Transport(#[source] reqwest::Error),

    #[error("Received an invalid response from the ID generator.")]
    InvalidResponse,

    #[error("{0}")]
    Rejected(String),

    #[error("No PDF received from server.")]
    NoPdf,
}
