use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::account::models::AuthResult;
use crate::account::models::RegisterCommand;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequestBody>,
) -> Result<ApiSuccess<AuthResult>, ApiError> {
    state
        .auth_service
        .register(body.into_command())
        .await
        .map_err(ApiError::from)
        .map(|result| ApiSuccess::new(StatusCode::CREATED, result))
}

/// HTTP request body for registration (raw JSON).
///
/// Missing fields deserialize as empty so the service reports which one
/// is required.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequestBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl RegisterRequestBody {
    fn into_command(self) -> RegisterCommand {
        RegisterCommand::new(self.email, self.username, self.password)
            .with_names(self.first_name, self.last_name)
    }
}
