use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    response::IntoResponse,
};

use hirecast_predictions::{
    BatchForecastJob, EvidenceForecastJob, ForecastWindow, PredictionJob, TOP_EVIDENCE_FORECASTS,
    TOP_FORECASTS, top_by_confidence,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// `GET /api/stats/predictions?extended=<bool>&months=<n>`
///
/// Batch mode forecasts `months` ahead and keeps the top 50 by confidence.
/// Extended mode uses the fixed evidence window, ignores `months` and keeps
/// the top 100.
pub async fn get_predictions(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::PredictionsQuery>,
) -> axum::response::Response {
    let extended = query.is_extended();
    let window = if extended {
        ForecastWindow::extended_default()
    } else {
        match query.window() {
            Ok(w) => w,
            Err(resp) => return resp,
        }
    };

    let generated_at = services.clock().now();
    let now = services.clock().current_month();

    if extended {
        if let Some(snapshot) = services.cached_forecasts(now) {
            tracing::debug!(month = %now, "serving cached evidence forecasts");
            return Json(dto::PredictionsResponse {
                success: true,
                predictions: top_by_confidence(snapshot.predictions, TOP_EVIDENCE_FORECASTS),
                generated_at: snapshot.generated_at,
            })
            .into_response();
        }
    }

    let histories = match services.histories(now).await {
        Ok(h) => h,
        Err(e) => return errors::service_error_to_response(e),
    };
    let org_count = histories.len();

    let result = if extended {
        EvidenceForecastJob::new(histories, now)
            .with_window(window)
            .run()
            .map(|p| top_by_confidence(p, TOP_EVIDENCE_FORECASTS))
    } else {
        BatchForecastJob::new(histories, now)
            .with_window(window)
            .run()
            .map(|p| top_by_confidence(p, TOP_FORECASTS))
    };

    let predictions = match result {
        Ok(p) => p,
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    tracing::info!(
        extended,
        window = window.months(),
        orgs = org_count,
        count = predictions.len(),
        "predictions generated"
    );

    Json(dto::PredictionsResponse {
        success: true,
        predictions,
        generated_at,
    })
    .into_response()
}
