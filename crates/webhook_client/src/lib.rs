//! Client for the identity-card generation webhook.
//!
//! Resolves a school's logo and template through the remote script
//! endpoint, submits the assembled form payload to the webhook, and
//! persists the resulting card locally.

pub mod api;
mod error;
mod script_fetch;
mod submission;

pub use api::client::WebhookClient;
pub use error::SubmitError;
pub use script_fetch::{
    AssetKind, CallbackRegistry, HttpScriptLoader, SchoolAsset, ScriptLoader, fetch_school_asset,
};
pub use submission::{GeneratedCard, SubmissionOrchestrator, persist_generated};
