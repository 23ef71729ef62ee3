use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::ApiState;
use crate::manager::{ApplyError, ErrorKind};
use crate::model::{EffectiveConfig, LabelSet, OverlayConfig, TenantId};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub running_instances: usize,
}

#[derive(Serialize)]
pub struct ConfigurationResponse {
    pub effective: EffectiveConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_configuration: Option<OverlayConfig>,
}

#[derive(Deserialize, Default)]
pub struct GetParams {
    #[serde(default)]
    pub redact: bool,
}

#[derive(Serialize)]
pub struct RouteTestResponse {
    pub receivers: Vec<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub async fn get_status(State(state): State<ApiState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        running_instances: state.pool.len(),
    })
}

pub async fn get_configuration(
    State(state): State<ApiState>,
    Path(tenant): Path<String>,
    Query(params): Query<GetParams>,
) -> Response {
    let tenant = TenantId::new(tenant);
    match state.manager.get_effective_config(&tenant, params.redact).await {
        Ok((effective, extra_configuration)) => Json(ConfigurationResponse {
            effective,
            extra_configuration,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn save_extra_configuration(
    State(state): State<ApiState>,
    Path(tenant): Path<String>,
    Json(overlay): Json<OverlayConfig>,
) -> Response {
    let tenant = TenantId::new(tenant);
    match state.manager.save_and_apply_extra_config(&tenant, overlay).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn delete_extra_configuration(
    State(state): State<ApiState>,
    Path((tenant, identifier)): Path<(String, String)>,
) -> Response {
    let tenant = TenantId::new(tenant);
    match state
        .manager
        .delete_and_apply_extra_config(&tenant, &identifier)
        .await
    {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(e) => error_response(e),
    }
}

/// Evaluate a label set against the tenant's running instance and report
/// which receivers it would be delivered to.
pub async fn route_test(
    State(state): State<ApiState>,
    Path(tenant): Path<String>,
    Json(labels): Json<LabelSet>,
) -> Response {
    let tenant = TenantId::new(tenant);
    match state.pool.get(&tenant) {
        Some(instance) => Json(RouteTestResponse {
            receivers: instance.route_alert(&labels),
        })
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: format!("no running instance for tenant {tenant}"),
            }),
        )
            .into_response(),
    }
}

fn error_response(err: ApplyError) -> Response {
    let status = match err.kind() {
        ErrorKind::InvalidRequest | ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
        .into_response()
}
