use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use crate::account::models::AccountView;
use crate::inbound::http::middleware::AuthenticatedAccount;

pub async fn current_account(
    Extension(AuthenticatedAccount(account)): Extension<AuthenticatedAccount>,
) -> Result<ApiSuccess<AccountView>, ApiError> {
    Ok(ApiSuccess::new(StatusCode::OK, account))
}
