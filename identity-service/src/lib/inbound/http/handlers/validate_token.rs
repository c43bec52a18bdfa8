use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

/// Report whether a token verifies. Invalid tokens are a `200` with
/// `valid: false`, not an error.
pub async fn validate_token(
    State(state): State<AppState>,
    Json(body): Json<ValidateTokenRequestBody>,
) -> Result<ApiSuccess<ValidateTokenResponseData>, ApiError> {
    let valid = state.auth_service.validate_token(&body.token);

    Ok(ApiSuccess::new(
        StatusCode::OK,
        ValidateTokenResponseData { valid },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidateTokenRequestBody {
    token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidateTokenResponseData {
    pub valid: bool,
}
