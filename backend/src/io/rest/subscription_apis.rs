//! # REST API for Subscriptions
//!
//! Registration, edits, cancellation, payment and listing of subscriptions.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, patch},
    Router,
};
use shared::{
    CreateSubscriptionRequest, ListSubscriptionsQuery, PaymentStatusQuery,
    UpdateSubscriptionRequest,
};
use tracing::info;

use crate::domain::models::PaymentStatus;
use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::subscription_mapper::SubscriptionMapper;
use crate::AppState;

/// Create a router for subscription related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/subscriptions",
            get(list_subscriptions).post(create_subscription),
        )
        .route("/subscriptions/status", get(list_by_payment_status))
        .route(
            "/subscriptions/:id",
            get(get_subscription).patch(update_subscription),
        )
        .route("/subscriptions/:id/cancel", patch(cancel_subscription))
        .route("/subscriptions/:id/pay", patch(pay_current))
        .route("/subscriptions/:id/instances", get(list_instances))
        .route(
            "/subscriptions/:id/instances/:instance_id/pay",
            patch(pay_instance),
        )
}

/// List subscriptions, optionally only those renewing within `days` days
pub async fn list_subscriptions(
    State(state): State<AppState>,
    query: Result<Query<ListSubscriptionsQuery>, QueryRejection>,
) -> impl IntoResponse {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };
    info!("GET /subscriptions - query: {:?}", query);

    match state.reporting_service.list_subscriptions(query.days).await {
        Ok(snapshots) => {
            (StatusCode::OK, Json(SubscriptionMapper::to_dto_list(snapshots))).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Register a subscription with its first billing period
pub async fn create_subscription(
    State(state): State<AppState>,
    payload: Result<Json<CreateSubscriptionRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };
    info!("POST /subscriptions - request: {:?}", request);

    let command = SubscriptionMapper::to_register_command(request);
    match state.ledger.register(command).await {
        Ok(result) => {
            (StatusCode::CREATED, Json(SubscriptionMapper::to_dto(result.snapshot))).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// List subscriptions whose current instance has the given payment status
pub async fn list_by_payment_status(
    State(state): State<AppState>,
    query: Result<Query<PaymentStatusQuery>, QueryRejection>,
) -> impl IntoResponse {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };
    info!("GET /subscriptions/status - query: {:?}", query);

    let status = match query.payment_status.as_deref().map(str::trim) {
        None | Some("") => {
            return ApiError::BadRequest("Missing payment_status parameter".to_string())
                .into_response()
        }
        Some(raw) => match raw.parse::<PaymentStatus>() {
            Ok(status) => status,
            Err(message) => return ApiError::BadRequest(message).into_response(),
        },
    };

    match state.reporting_service.by_payment_status(status).await {
        Ok(snapshots) => {
            (StatusCode::OK, Json(SubscriptionMapper::to_dto_list(snapshots))).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn get_subscription(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> impl IntoResponse {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };
    info!("GET /subscriptions/{}", id);

    match state.reporting_service.get_subscription(id).await {
        Ok(snapshot) => (StatusCode::OK, Json(SubscriptionMapper::to_dto(snapshot))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Edit service name, cost or category
pub async fn update_subscription(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateSubscriptionRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };
    info!("PATCH /subscriptions/{} - request: {:?}", id, request);

    let command = SubscriptionMapper::to_update_command(request);
    match state.ledger.update(id, command).await {
        Ok(snapshot) => (StatusCode::OK, Json(SubscriptionMapper::to_dto(snapshot))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn cancel_subscription(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> impl IntoResponse {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };
    info!("PATCH /subscriptions/{}/cancel", id);

    match state.ledger.cancel(id).await {
        Ok(result) => (
            StatusCode::OK,
            Json(SubscriptionMapper::to_cancel_response(result)),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Pay the current instance; only accepted on its renewal date
pub async fn pay_current(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> impl IntoResponse {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };
    info!("PATCH /subscriptions/{}/pay", id);

    match state.ledger.pay_current(id).await {
        Ok(result) => (
            StatusCode::OK,
            Json(SubscriptionMapper::to_payment_response(result)),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Billing history of one subscription
pub async fn list_instances(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> impl IntoResponse {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };
    info!("GET /subscriptions/{}/instances", id);

    match state.reporting_service.list_instances(id).await {
        Ok(instances) => {
            let dtos: Vec<_> = instances
                .into_iter()
                .map(SubscriptionMapper::instance_to_dto)
                .collect();
            (StatusCode::OK, Json(dtos)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Pay a specific unpaid instance whose renewal date is not in the future
pub async fn pay_instance(
    State(state): State<AppState>,
    ids: Result<Path<(i64, i64)>, PathRejection>,
) -> impl IntoResponse {
    let Path((id, instance_id)) = match ids {
        Ok(ids) => ids,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };
    info!("PATCH /subscriptions/{}/instances/{}/pay", id, instance_id);

    match state.ledger.pay_instance(id, instance_id).await {
        Ok(result) => (
            StatusCode::OK,
            Json(SubscriptionMapper::to_payment_response(result)),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
