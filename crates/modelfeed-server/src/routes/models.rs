//! Model search endpoint.
//!
//! Query-string parameters map 1:1 to the search predicates; repeated
//! parameters of the same name form a list (OR within the field, AND
//! across fields). Unparseable parameter values are ignored rather than
//! rejected.

use axum::extract::{RawQuery, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

use modelfeed::query::{filter_models, SearchQuery};

use crate::routes::errors::ErrorResponse;
use crate::routes::manifest::conditional_json;
use crate::state::AppState;

fn parse_query(raw: Option<&str>) -> SearchQuery {
    let pairs: Vec<(String, String)> = raw
        .and_then(|q| serde_urlencoded::from_str(q).ok())
        .unwrap_or_default();
    SearchQuery::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

async fn search_models(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
    request_headers: HeaderMap,
) -> Result<Response, ErrorResponse> {
    let manifest = state.manifest().await?;
    let query = parse_query(raw.as_deref());
    conditional_json(&request_headers, &manifest.etag, || {
        filter_models(&manifest.models, &query)
    })
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/models", get(search_models))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_params_form_lists() {
        let query = parse_query(Some("provider=openai&provider=anthropic&minIq=4"));
        assert_eq!(query.provider.len(), 2);
        assert_eq!(query.min_iq, Some(4));
    }

    #[test]
    fn invalid_values_leave_predicates_unset() {
        let query = parse_query(Some("minIq=four&capability=flight&mode=chat"));
        assert_eq!(query.min_iq, None);
        assert!(query.capability.is_empty());
        assert_eq!(query.mode.as_deref(), Some("chat"));
    }

    mod integration_tests {
        use super::*;
        use crate::routes::test_support::ready_state;
        use axum::body::{to_bytes, Body};
        use axum::http::{Request, StatusCode};
        use tower::ServiceExt;

        async fn search(uri: &str) -> Vec<serde_json::Value> {
            let state = ready_state().await;
            let response = routes(state)
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            serde_json::from_slice(&bytes).unwrap()
        }

        #[tokio::test]
        async fn filters_by_provider_union() {
            let models = search("/v1/models?provider=openai&provider=anthropic").await;
            assert!(!models.is_empty());
            assert!(models
                .iter()
                .all(|m| { m["provider"] == "openai" || m["provider"] == "anthropic" }));
        }

        #[tokio::test]
        async fn capability_list_is_conjunctive() {
            let models = search("/v1/models?capability=reasoning&capability=vision").await;
            assert!(models.iter().all(|m| {
                let caps = &m["capabilities"];
                caps["reasoning"] == true && caps["vision"] == true
            }));
        }

        #[tokio::test]
        async fn invalid_numeric_param_is_ignored() {
            let all = search("/v1/models").await;
            let permissive = search("/v1/models?minIq=not-a-number").await;
            assert_eq!(all.len(), permissive.len());
        }

        #[tokio::test]
        async fn no_match_is_empty_list_not_an_error() {
            let models = search("/v1/models?provider=no-such-provider").await;
            assert!(models.is_empty());
        }

        #[tokio::test]
        async fn conditional_delivery_applies_to_search() {
            let state = ready_state().await;
            let etag = state.manifest().await.unwrap().etag.clone();
            let response = routes(state)
                .oneshot(
                    Request::builder()
                        .uri("/v1/models?provider=openai")
                        .header("if-none-match", &etag)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        }
    }
}
