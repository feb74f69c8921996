//! # REST API for Reports
//!
//! Category listing and the cost summary.

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::info;

use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::report_mapper::ReportMapper;
use crate::io::rest::mappers::subscription_mapper::SubscriptionMapper;
use crate::AppState;

/// Create a router for reporting APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/category/:category", get(list_by_category))
        .route("/summary", get(get_summary))
}

/// Subscriptions whose category matches exactly
pub async fn list_by_category(
    State(state): State<AppState>,
    category: Result<Path<String>, PathRejection>,
) -> impl IntoResponse {
    let Path(category) = match category {
        Ok(category) => category,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };
    info!("GET /category/{}", category);

    match state.reporting_service.by_category(&category).await {
        Ok(snapshots) => {
            (StatusCode::OK, Json(SubscriptionMapper::to_dto_list(snapshots))).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Monthly and annual cost of active subscriptions
pub async fn get_summary(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /summary");

    match state.reporting_service.summary().await {
        Ok(summary) => (StatusCode::OK, Json(ReportMapper::summary_to_dto(summary))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use crate::io::rest::test_support::{send, setup_test_router};
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};
    use shared::CostSummaryResponse;

    async fn register(app: &axum::Router, body: Value) -> i64 {
        let (status, body) = send(app, Method::POST, "/subscriptions", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().expect("id")
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let app = setup_test_router().await;
        register(&app, json!({"service_name": "Netflix", "cost": 15, "category": "Video", "renewal_date": "2025-07-01"})).await;
        register(&app, json!({"service_name": "Spotify", "cost": 10, "category": "Music", "renewal_date": "2025-07-01"})).await;
        register(&app, json!({"service_name": "Plex", "cost": 5, "category": "Home Video", "renewal_date": "2025-07-01"})).await;

        let (status, body) = send(&app, Method::GET, "/category/Video", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["service_name"], "Netflix");

        let (_, body) = send(&app, Method::GET, "/category/Home%20Video", None).await;
        assert_eq!(body[0]["service_name"], "Plex");

        let (_, body) = send(&app, Method::GET, "/category/Books", None).await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_undecodable_category_is_json_bad_request() {
        let app = setup_test_router().await;

        let (status, body) = send(&app, Method::GET, "/category/%FF", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string(), "unexpected body {}", body);
    }

    #[tokio::test]
    async fn test_summary() {
        let app = setup_test_router().await;
        register(&app, json!({"service_name": "A", "cost": 10, "category": "A", "renewal_date": "2025-07-01"})).await;
        register(&app, json!({"service_name": "B", "cost": 20, "category": "", "renewal_date": "2025-07-01"})).await;
        let gone = register(&app, json!({"service_name": "C", "cost": 50, "category": "A", "renewal_date": "2025-07-01"})).await;
        let (status, _) = send(&app, Method::PATCH, &format!("/subscriptions/{}/cancel", gone), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, Method::GET, "/summary", None).await;
        assert_eq!(status, StatusCode::OK);
        let summary: CostSummaryResponse = serde_json::from_value(body).expect("Failed to parse summary");
        assert_eq!(summary.total_monthly_cost, 30.0);
        assert_eq!(summary.total_annual_cost, 360.0);
        assert_eq!(summary.cost_by_category.get("A"), Some(&10.0));
        assert_eq!(summary.cost_by_category.get("Uncategorized"), Some(&20.0));
    }
}
