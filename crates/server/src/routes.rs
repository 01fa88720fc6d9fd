use std::any::Any;

use axum::{
    extract::Request,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{TraceLayer, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::errors::ApiError;
use crate::openapi::ApiDoc;
use crate::startup::AppState;

pub mod cars;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn not_found() -> ApiError {
    ApiError::not_found()
}

/// Handler panics become a 500 `INTERNAL_ERROR` envelope.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let cause = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("handler panicked");
    ApiError::internal(format!("panic: {cause}")).into_response()
}

fn request_span(req: &Request) -> tracing::Span {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    tracing::info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %request_id,
    )
}

/// Build the full application router: cars resource, health and API docs.
pub fn build_router(state: AppState) -> Router {
    let car_routes = Router::new()
        .route(
            "/cars",
            get(cars::list).post(cars::create).fallback(cars::method_not_allowed),
        )
        .route(
            "/cars/",
            get(cars::missing_id)
                .put(cars::missing_id)
                .delete(cars::missing_id)
                .fallback(cars::method_not_allowed),
        )
        .route(
            "/cars/:id",
            get(cars::get)
                .put(cars::update)
                .delete(cars::delete)
                .fallback(cars::method_not_allowed),
        );

    let public = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json));

    with_middleware(public.merge(car_routes).fallback(not_found).with_state(state))
}

/// Wrap `app` in the HTTP middleware stack: panic recovery, CORS, request ids
/// and tracing.
pub fn with_middleware(app: Router) -> Router {
    app.layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::very_permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                // One span per request carrying method, path and request id
                .make_span_with(request_span)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // Status code and latency on every response
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
        // Outermost so the id exists before the trace span is created
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
