use std::sync::Arc;

use axum::{Extension, response::Json};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::types::AuthSession;

/// Liveness of the login server, and whether a login is still waiting for
/// its callback.
pub async fn health(
    Extension(shared_state): Extension<Arc<Mutex<Option<AuthSession>>>>,
) -> Json<Value> {
    let login_pending = shared_state
        .lock()
        .await
        .as_ref()
        .is_some_and(|s| s.credential.is_none() && s.error.is_none());

    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "login_pending": login_pending,
    }))
}
