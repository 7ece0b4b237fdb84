use crate::state;

use axum::Router;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;

mod auth;
mod push;

pub fn app(state: state::AppState) -> Router {
    let trigger_auth = middleware::from_fn_with_state(state.clone(), auth::trigger_auth_middleware);

    Router::new()
        .route(
            "/push/send",
            post(push::push_send)
                .route_layer(trigger_auth)
                .fallback(push::method_not_allowed),
        )
        .route(
            "/push/subscribe",
            post(push::push_subscribe).fallback(push::method_not_allowed),
        )
        .route(
            "/push/unsubscribe",
            post(push::push_unsubscribe).fallback(push::method_not_allowed),
        )
        .route(
            "/push/list-subscriptions",
            get(push::push_list_subscriptions).fallback(push::method_not_allowed),
        )
        .route(
            "/push/vapid-public-key",
            get(push::push_public_key).fallback(push::method_not_allowed),
        )
        .route("/health", get(health))
        .with_state(state)
}

pub(crate) async fn health() -> &'static str {
    "ok"
}
