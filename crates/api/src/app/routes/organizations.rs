use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    response::IntoResponse,
    routing::get,
};

use hirecast_predictions::{NextPostingJob, PredictionJob};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/:name/prediction", get(get_organization_prediction))
}

/// Next-posting forecast for the organization `name` resolves to (partial,
/// case-insensitive). `orgName` echoes the resolved name; `prediction` is null
/// when nothing matches or the match has too little history.
pub async fn get_organization_prediction(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    let now = services.clock().current_month();

    let history = match services.organization(name.clone(), now).await {
        Ok(h) => h,
        Err(e) => return errors::service_error_to_response(e),
    };

    let (org_name, prediction) = match history {
        Some(history) => {
            let org_name = history.org_name.clone();
            match NextPostingJob::new(history, now).run() {
                Ok(p) => (org_name, p),
                Err(e) => return errors::service_error_to_response(e.into()),
            }
        }
        None => (name.clone(), None),
    };

    tracing::debug!(query = %name, org = %org_name, found = prediction.is_some(), "organization prediction");

    Json(dto::OrganizationPredictionResponse {
        success: true,
        org_name,
        prediction,
    })
    .into_response()
}

/// `GET /api/stats/organizations?limit=<n>`: posting summaries, largest posters first.
pub async fn get_organization_patterns(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::OrganizationPatternsQuery>,
) -> axum::response::Response {
    let limit = match query.limit() {
        Ok(n) => n,
        Err(resp) => return resp,
    };

    let generated_at = services.clock().now();
    let now = services.clock().current_month();

    let data = match services.organization_patterns(now, limit).await {
        Ok(p) => p,
        Err(e) => return errors::service_error_to_response(e),
    };

    tracing::info!(limit, count = data.len(), "organization patterns generated");

    Json(dto::OrganizationPatternsResponse {
        success: true,
        data,
        generated_at,
    })
    .into_response()
}
