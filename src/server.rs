use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{api, spotify::SpotifyAuthClient, types::AuthSession};

/// Routes of the local login server.
///
/// Both handlers read the login session from an [`Extension`]; the callback
/// also needs the auth client to exchange the authorization code.
pub fn router(state: Arc<Mutex<Option<AuthSession>>>, client: Arc<SpotifyAuthClient>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .layer(Extension(state))
        .layer(Extension(client))
}

/// Serves the OAuth callback on an already bound listener until aborted.
///
/// # Arguments
///
/// * `listener` - Socket bound to `SERVER_ADDRESS` (or an ephemeral port in tests)
/// * `state` - Login session shared with [`crate::spotify::auth::auth`]
/// * `client` - Auth client used by the callback for the code exchange
pub async fn start_api_server(
    listener: TcpListener,
    state: Arc<Mutex<Option<AuthSession>>>,
    client: Arc<SpotifyAuthClient>,
) -> std::io::Result<()> {
    axum::serve(listener, router(state, client)).await
}
