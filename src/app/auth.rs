use crate::error::ApiError;
use crate::state;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Guards the send trigger with the shared bearer secret. Open when no secret
/// is configured.
pub(crate) async fn trigger_auth_middleware(
    State(state): State<state::AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let auth = match &state.trigger_auth {
        Some(auth) => auth,
        None => return next.run(req).await,
    };

    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if auth.verify_header(header) {
        return next.run(req).await;
    }

    ApiError::Unauthorized.into_response()
}
