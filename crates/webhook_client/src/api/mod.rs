//! Webhook API client and wire types.

pub mod client;
pub mod models;
