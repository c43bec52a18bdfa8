use std::sync::Arc;

use async_trait::async_trait;
use auth::TokenIdentity;
use auth::TokenIssuer;

use crate::account::credentials::AccountDomain;
use crate::account::errors::AccountError;
use crate::account::errors::AccountField;
use crate::account::errors::EmailError;
use crate::account::errors::PasswordPolicyError;
use crate::account::errors::UsernameError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AccountView;
use crate::account::models::AuthResult;
use crate::account::models::EmailAddress;
use crate::account::models::PasswordPolicy;
use crate::account::models::RegisterCommand;
use crate::account::models::Username;
use crate::account::ports::AuthServicePort;
use crate::account::ports::CredentialStore;
use crate::account::ports::CredentialTransaction;

/// Domain service implementation for authentication.
///
/// Coordinates the credential store, the account domain and the token
/// issuer. Owns the transaction boundary of registration.
pub struct AuthService<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    accounts: AccountDomain,
    tokens: Arc<TokenIssuer>,
}

impl<S> AuthService<S>
where
    S: CredentialStore,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Account persistence implementation
    /// * `accounts` - Account rules and password checks
    /// * `tokens` - Signing configuration
    pub fn new(store: Arc<S>, accounts: AccountDomain, tokens: Arc<TokenIssuer>) -> Self {
        Self {
            store,
            accounts,
            tokens,
        }
    }

    /// Check registration input in a fixed order and build the value objects.
    fn validate_registration(
        command: &RegisterCommand,
    ) -> Result<(EmailAddress, Username), AccountError> {
        if command.email.trim().is_empty() {
            return Err(EmailError::Empty.into());
        }
        if command.username.trim().is_empty() {
            return Err(UsernameError::Empty.into());
        }
        PasswordPolicy::check(&command.password)?;

        let username = Username::new(command.username.clone())?;
        let email = EmailAddress::new(command.email.clone())?;

        Ok((email, username))
    }

    async fn create_in_transaction(
        &self,
        tx: &mut Box<dyn CredentialTransaction>,
        email: EmailAddress,
        username: Username,
        command: RegisterCommand,
    ) -> Result<AuthResult, AccountError> {
        let accounts = self.accounts.clone();
        let RegisterCommand {
            password,
            first_name,
            last_name,
            ..
        } = command;

        let account = run_blocking(move || {
            accounts.create_account(email, username, &password, first_name, last_name)
        })
        .await?;

        tx.insert(&account).await?;
        let result = self.issue_for(&account)?;
        tx.commit().await?;

        Ok(result)
    }

    fn issue_for(&self, account: &Account) -> Result<AuthResult, AccountError> {
        let identity = TokenIdentity {
            subject: account.id().to_string(),
            email: account.email().as_str().to_string(),
            username: account.username().as_str().to_string(),
            roles: account.roles().to_vec(),
        };
        let issued = self.tokens.issue(&identity)?;

        Ok(AuthResult {
            token: issued.token,
            expires_at: issued.expires_at,
            account: AccountView::from(account),
        })
    }
}

#[async_trait]
impl<S> AuthServicePort for AuthService<S>
where
    S: CredentialStore,
{
    async fn register(&self, command: RegisterCommand) -> Result<AuthResult, AccountError> {
        let (email, username) = Self::validate_registration(&command)?;

        if self.store.exists_by_email(&email).await? {
            return Err(AccountError::DuplicateAccount {
                field: AccountField::Email,
                value: email.to_string(),
            });
        }
        if self.store.exists_by_username(&username).await? {
            return Err(AccountError::DuplicateAccount {
                field: AccountField::Username,
                value: username.to_string(),
            });
        }

        let mut tx = self.store.begin_transaction().await?;

        match self
            .create_in_transaction(&mut tx, email, username, command)
            .await
        {
            Ok(result) => {
                tracing::info!(account_id = %result.account.id, "Account registered");
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_error) = tx.rollback().await {
                    tracing::error!(
                        error = %rollback_error,
                        "Failed to roll back registration transaction"
                    );
                }
                tracing::warn!(error = %e, "Registration aborted");
                Err(e)
            }
        }
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthResult, AccountError> {
        if email.trim().is_empty() {
            return Err(EmailError::Empty.into());
        }
        if password.trim().is_empty() {
            return Err(PasswordPolicyError::Empty.into());
        }

        // A malformed address cannot match any stored account.
        let found = match EmailAddress::new(email.to_string()) {
            Ok(normalized) => self.store.find_by_email(&normalized).await?,
            Err(_) => None,
        };

        let Some(mut account) = found else {
            let accounts = self.accounts.clone();
            let password = password.to_string();
            run_blocking(move || {
                accounts.burn_password_check(&password);
                Ok(())
            })
            .await?;

            tracing::debug!("Login rejected: unknown account");
            return Err(AccountError::NotFound(email.to_string()));
        };

        if !account.is_active() {
            tracing::debug!(account_id = %account.id(), "Login rejected: account inactive");
            return Err(AccountError::Inactive);
        }

        let accounts = self.accounts.clone();
        let candidate = account.clone();
        let password = password.to_string();
        let matches = run_blocking(move || Ok(accounts.check_password(&candidate, &password))).await?;

        if !matches {
            tracing::debug!(account_id = %account.id(), "Login rejected: wrong password");
            return Err(AccountError::InvalidCredentials);
        }

        account.record_login();
        self.store.update(&account).await?;

        let result = self.issue_for(&account)?;
        tracing::info!(account_id = %account.id(), "Account logged in");

        Ok(result)
    }

    fn validate_token(&self, token: &str) -> bool {
        self.tokens.validate(token)
    }

    async fn identify_caller(&self, token: &str) -> Result<Option<AccountView>, AccountError> {
        let Some(subject) = self.tokens.identity_from_token(token) else {
            return Ok(None);
        };

        let Ok(id) = AccountId::from_string(&subject) else {
            tracing::warn!(subject = %subject, "Verified token carries a malformed subject");
            return Ok(None);
        };

        let account = self.store.find_by_id(&id).await?;
        Ok(account.as_ref().map(AccountView::from))
    }
}

/// Run CPU-bound work on the blocking pool.
async fn run_blocking<T, F>(work: F) -> Result<T, AccountError>
where
    F: FnOnce() -> Result<T, AccountError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AccountError::Unknown(format!("Blocking task failed: {}", e)))?
}
