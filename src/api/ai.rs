use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::validation::validate_question;
use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub struct AskQuery {
    pub tanya: Option<String>,
}

/// GET /ai?tanya=<question>
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AskQuery>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let question = validate_question(query.tanya.as_deref())?;

    info!(
        "Forwarding question ({} chars) to {}",
        question.chars().count(),
        state.shared.chat.model()
    );
    let answer = state.shared.chat.complete(question).await?;

    Ok(Json(ApiResponse::success("Success get answer", answer)))
}
