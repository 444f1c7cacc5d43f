use axum::{
    extract::{Extension, Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::database::DocumentStore;
use crate::storage::FileStorage;

pub mod config;
pub mod crud;
pub mod database;
pub mod ingest;
pub mod mail;
pub mod storage;

/// Everything the handlers share: the document store, object storage, an
/// outbound HTTP client for subscription confirmations, and the bucket
/// attachment blobs are written to.
#[derive(Clone)]
pub struct AppState<D, F> {
    pub store: D,
    pub files: F,
    pub http: reqwest::Client,
    pub attachment_bucket: String,
}

/// Builds the application router.
///
/// The literal `/emails` route takes precedence over the dynamic `/{kind}`
/// routes, so its POST slot belongs to the inbound-mail webhook while every
/// other collection keeps the uniform CRUD contract.
pub fn routes<D, F>(store: D, files: F, config: Config) -> Router
where
    D: DocumentStore,
    F: FileStorage,
{
    let state = AppState {
        store,
        files,
        http: reqwest::Client::new(),
        attachment_bucket: config.attachment_bucket().to_owned(),
    };

    Router::new()
        .route("/is-health", get(health_check::<D, F>))
        .route(
            "/emails",
            get(crud::list_emails::<D, F>).post(ingest::receive_notification::<D, F>),
        )
        .route(
            "/{kind}",
            get(crud::list_entities::<D, F>).post(crud::create_entity::<D, F>),
        )
        .route(
            "/{kind}/{id}",
            get(crud::get_entity::<D, F>)
                .put(crud::update_entity::<D, F>)
                .delete(crud::delete_entity::<D, F>),
        )
        .fallback(any(catch_all))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    http_request.method = ?request.method(),
                    http_request.uri = ?request.uri(),
                    http_request.version = ?request.version(),
                )
            }),
        )
        .layer(Extension(config))
        .with_state(state)
}

async fn health_check<D, F>(
    State(state): State<AppState<D, F>>,
    Extension(config): Extension<Config>,
) -> impl IntoResponse
where
    D: DocumentStore,
    F: FileStorage,
{
    let mut response = if state.store.is_connected().await {
        (StatusCode::OK, "OK").into_response()
    } else {
        (StatusCode::BAD_GATEWAY, "502").into_response()
    };

    let env_value = config.environment().to_string();
    response.headers_mut().insert(
        HeaderName::from_static("x-service-env"),
        HeaderValue::from_str(&env_value).expect("environment header is valid ASCII"),
    );

    response
}

async fn catch_all() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing to see here")
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt as _;

    use super::*;
    use crate::database::MemoryDocumentStore;
    use crate::storage::MockFileStorage;

    fn test_app() -> Router {
        routes(
            MemoryDocumentStore::new(),
            MockFileStorage::new(),
            Config::new_for_test(),
        )
    }

    #[tokio::test]
    async fn health_check_reports_environment() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/is-health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("x-service-env").unwrap(),
            &HeaderValue::from_static("test")
        );
    }

    #[tokio::test]
    async fn unmatched_routes_hit_the_fallback() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/persons/extra/segments")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
