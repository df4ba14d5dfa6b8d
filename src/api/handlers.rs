use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use crate::api::models::{ErrorResponse, PredictParams, TableResponse};
use crate::errors::PredictionError;
use crate::model::PredictionRequest;
use crate::services::prediction::PredictionService;

pub struct AppState {
    pub service: PredictionService,
}

pub async fn get_prediction(
    State(state): State<Arc<AppState>>,
    Path((player_a, player_b)): Path<(String, String)>,
    Query(params): Query<PredictParams>,
) -> Response {
    let request = PredictionRequest {
        player_a,
        player_b,
        lambda: params.lambda,
        gamma: params.gamma,
        as_of: params.as_of,
    };

    match state.service.predict(&request) {
        Ok(prediction) => Json(prediction).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_form(State(state): State<Arc<AppState>>, Path(player): Path<String>) -> Response {
    match state.service.form_history(&player) {
        Ok(history) => Json(history).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_table(State(state): State<Arc<AppState>>) -> Response {
    let table = state.service.table();
    let buckets = table.buckets();

    Json(TableResponse {
        tour: state.service.tour(),
        best_buckets: buckets.best_rank.labels().to_vec(),
        gap_buckets: buckets.gap.labels().to_vec(),
        cells: table.cells(),
        base_rate: table.base_rate(),
        total_matches: table.total_matches(),
        miss_policy: table.miss_policy(),
    })
    .into_response()
}

fn error_response(error: PredictionError) -> Response {
    let status = match &error {
        PredictionError::NoHistory { .. } => StatusCode::NOT_FOUND,
        e if e.is_request_error() => StatusCode::BAD_REQUEST,
        PredictionError::LookupMiss { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}
