//! Manifest-derived endpoints with conditional delivery.
//!
//! Every endpoint here serves a projection of the same sealed manifest
//! and shares one validator: the manifest etag. Cache-Control and ETag
//! are emitted identically on 200 and 304 responses so downstream
//! caches refresh their freshness window either way.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use modelfeed::conditional::{if_none_match_matches, CACHE_CONTROL_VALUE};
use modelfeed::Manifest;

use crate::routes::errors::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionInfo {
    version: String,
    etag: String,
    generated_at: DateTime<Utc>,
}

impl From<&Manifest> for VersionInfo {
    fn from(m: &Manifest) -> Self {
        Self {
            version: m.version.clone(),
            etag: m.etag.clone(),
            generated_at: m.generated_at,
        }
    }
}

/// Answer with the shared cache headers, downgrading to 304 with no
/// body when any inbound validator matches the manifest etag.
pub(crate) fn conditional_json<T: Serialize>(
    request_headers: &HeaderMap,
    etag: &str,
    body: impl FnOnce() -> T,
) -> Result<Response, ErrorResponse> {
    let etag_value = HeaderValue::from_str(etag)
        .map_err(|e| ErrorResponse::internal(format!("invalid etag header: {}", e)))?;
    let headers = [
        (
            header::CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_VALUE),
        ),
        (header::ETAG, etag_value),
    ];

    let if_none_match = request_headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());
    if if_none_match_matches(if_none_match, etag) {
        Ok((StatusCode::NOT_MODIFIED, headers).into_response())
    } else {
        Ok((StatusCode::OK, headers, Json(body())).into_response())
    }
}

async fn get_manifest(
    State(state): State<Arc<AppState>>,
    request_headers: HeaderMap,
) -> Result<Response, ErrorResponse> {
    let manifest = state.manifest().await?;
    conditional_json(&request_headers, &manifest.etag, || manifest.as_ref().clone())
}

async fn get_version(
    State(state): State<Arc<AppState>>,
    request_headers: HeaderMap,
) -> Result<Response, ErrorResponse> {
    let manifest = state.manifest().await?;
    conditional_json(&request_headers, &manifest.etag, || {
        VersionInfo::from(manifest.as_ref())
    })
}

async fn get_providers(
    State(state): State<Arc<AppState>>,
    request_headers: HeaderMap,
) -> Result<Response, ErrorResponse> {
    let manifest = state.manifest().await?;
    conditional_json(&request_headers, &manifest.etag, || {
        manifest.providers.clone()
    })
}

async fn get_provider_models(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    request_headers: HeaderMap,
) -> Result<Response, ErrorResponse> {
    let manifest = state.manifest().await?;
    if !manifest.providers.iter().any(|p| p.value == provider) {
        return Err(ErrorResponse::not_found(format!(
            "unknown provider: {}",
            provider
        )));
    }
    conditional_json(&request_headers, &manifest.etag, || {
        manifest
            .models_for_provider(&provider)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>()
    })
}

async fn trigger_refresh(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ErrorResponse> {
    let manifest = state.refresh().await?;
    Ok(Json(serde_json::to_value(VersionInfo::from(
        manifest.as_ref(),
    ))?))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/manifest", get(get_manifest))
        .route("/v1/manifest/version", get(get_version))
        .route("/v1/providers", get(get_providers))
        .route("/v1/providers/{provider}/models", get(get_provider_models))
        .route("/v1/refresh", post(trigger_refresh))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod integration_tests {
        use super::*;
        use crate::routes::test_support::{ready_state, uninitialized_state};
        use axum::body::{to_bytes, Body};
        use axum::http::Request;
        use tower::ServiceExt;

        async fn send(app: Router, uri: &str, if_none_match: Option<&str>) -> Response {
            let mut builder = Request::builder().uri(uri).method("GET");
            if let Some(v) = if_none_match {
                builder = builder.header("if-none-match", v);
            }
            app.oneshot(builder.body(Body::empty()).unwrap())
                .await
                .unwrap()
        }

        #[tokio::test]
        async fn manifest_endpoint_emits_validators() {
            let state = ready_state().await;
            let etag = state.manifest().await.unwrap().etag.clone();

            let response = send(routes(state), "/v1/manifest", None).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.headers().get("etag").unwrap().to_str().unwrap(),
                etag
            );
            assert_eq!(
                response
                    .headers()
                    .get("cache-control")
                    .unwrap()
                    .to_str()
                    .unwrap(),
                CACHE_CONTROL_VALUE
            );

            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let manifest: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert!(manifest["version"].as_str().unwrap().starts_with("v1."));
            assert!(manifest["models"].as_array().is_some());
        }

        #[tokio::test]
        async fn matching_validator_yields_empty_304() {
            let state = ready_state().await;
            let etag = state.manifest().await.unwrap().etag.clone();

            let response = send(routes(state), "/v1/manifest", Some(&etag)).await;
            assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
            // Validators are re-asserted on 304.
            assert!(response.headers().get("etag").is_some());
            assert!(response.headers().get("cache-control").is_some());

            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert!(bytes.is_empty());
        }

        #[tokio::test]
        async fn weak_and_star_validators_match() {
            let state = ready_state().await;
            let etag = state.manifest().await.unwrap().etag.clone();
            let weak = format!("W/{}", etag);

            let response = send(routes(state.clone()), "/v1/providers", Some(&weak)).await;
            assert_eq!(response.status(), StatusCode::NOT_MODIFIED);

            let response = send(routes(state), "/v1/manifest/version", Some("*")).await;
            assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        }

        #[tokio::test]
        async fn mismatched_validator_yields_full_body() {
            let state = ready_state().await;
            let response = send(routes(state), "/v1/manifest", Some("\"stale\"")).await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        #[tokio::test]
        async fn cache_policy_is_identical_across_endpoints() {
            let state = ready_state().await;
            for uri in [
                "/v1/manifest",
                "/v1/manifest/version",
                "/v1/providers",
                "/v1/providers/openai/models",
            ] {
                let response = send(routes(state.clone()), uri, None).await;
                assert_eq!(response.status(), StatusCode::OK, "{}", uri);
                assert_eq!(
                    response
                        .headers()
                        .get("cache-control")
                        .unwrap()
                        .to_str()
                        .unwrap(),
                    CACHE_CONTROL_VALUE,
                    "{}",
                    uri
                );
            }
        }

        #[tokio::test]
        async fn provider_models_unknown_slug_is_404() {
            let state = ready_state().await;
            let response = send(routes(state), "/v1/providers/nope/models", None).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }

        #[tokio::test]
        async fn uninitialized_service_is_503() {
            let state = uninitialized_state();
            let response = send(routes(state), "/v1/manifest", None).await;
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        }

        #[tokio::test]
        async fn refresh_endpoint_reports_new_version() {
            let state = uninitialized_state();
            let app = routes(state.clone());

            let response = app
                .oneshot(
                    Request::builder()
                        .uri("/v1/refresh")
                        .method("POST")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert!(state.manifest().await.is_ok());
        }
    }
}
