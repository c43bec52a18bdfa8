use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use super::handlers::ApiError;
use crate::account::models::AccountView;
use crate::inbound::http::router::AppState;

/// Extension type carrying the caller resolved from the bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount(pub AccountView);

/// Middleware that resolves the bearer token to an account and adds it to
/// request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req)?.to_string();

    let account = state
        .auth_service
        .identify_caller(&token)
        .await
        .map_err(|e| ApiError::from(e).into_response())?
        .ok_or_else(|| {
            tracing::warn!("Bearer token did not resolve to an account");
            ApiError::Unauthorized("Invalid or expired token".to_string()).into_response()
        })?;

    req.extensions_mut().insert(AuthenticatedAccount(account));

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, Response> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| {
            ApiError::Unauthorized("Missing Authorization header".to_string()).into_response()
        })?;

    let auth_str = auth_header.to_str().map_err(|_| {
        ApiError::Unauthorized("Invalid Authorization header".to_string()).into_response()
    })?;

    auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized(
            "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
        )
        .into_response()
    })
}
