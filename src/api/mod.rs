//! # API Module
//!
//! HTTP endpoints served by the local callback server during `mindbeat auth`.
//!
//! - [`callback`] - completes the OAuth 2.0 PKCE flow. It checks the `state`
//!   parameter against the login in progress, exchanges the authorization
//!   code and hands the resulting credential back to the waiting login flow.
//! - [`health`] - status and version, handy to check the server is bound.
//!
//! The endpoints are plain async functions wired up with
//! [Axum](https://docs.rs/axum) in [`crate::server`].

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
