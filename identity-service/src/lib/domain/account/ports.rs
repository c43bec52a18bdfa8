use async_trait::async_trait;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AccountView;
use crate::account::models::AuthResult;
use crate::account::models::EmailAddress;
use crate::account::models::RegisterCommand;
use crate::account::models::Username;

/// Port for authentication use cases.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new account and sign its first token.
    ///
    /// # Arguments
    /// * `command` - Raw registration input
    ///
    /// # Returns
    /// Token plus a view of the created account
    ///
    /// # Errors
    /// * `InvalidEmail` / `InvalidUsername` / `InvalidPassword` - Malformed input
    /// * `DuplicateAccount` - Email or username already taken
    /// * `Hashing` / `Token` / `DatabaseError` - Infrastructure failure, nothing persisted
    async fn register(&self, command: RegisterCommand) -> Result<AuthResult, AccountError>;

    /// Authenticate with email and password.
    ///
    /// # Errors
    /// * `InvalidEmail` / `InvalidPassword` - Empty input
    /// * `NotFound` - No account with this email
    /// * `Inactive` - Account is deactivated
    /// * `InvalidCredentials` - Password does not match
    /// * `DatabaseError` - Storage failure, no token issued
    async fn login(&self, email: &str, password: &str) -> Result<AuthResult, AccountError>;

    /// Check a bearer token. Never fails; invalid input yields `false`.
    fn validate_token(&self, token: &str) -> bool;

    /// Resolve the account a verified token belongs to.
    ///
    /// # Returns
    /// `None` when the token is invalid or its account no longer exists
    ///
    /// # Errors
    /// * `DatabaseError` - Storage failure
    async fn identify_caller(&self, token: &str) -> Result<Option<AccountView>, AccountError>;
}

/// Persistence operations for the account aggregate.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError>;

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, AccountError>;

    async fn find_by_username(&self, username: &Username)
        -> Result<Option<Account>, AccountError>;

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, AccountError>;

    async fn exists_by_username(&self, username: &Username) -> Result<bool, AccountError>;

    /// Persist a new account outside any explicit transaction.
    ///
    /// # Errors
    /// * `DuplicateAccount` - Email or username already taken
    /// * `DatabaseError` - Database operation failed
    async fn insert(&self, account: &Account) -> Result<(), AccountError>;

    /// Overwrite the mutable state of an existing account.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, account: &Account) -> Result<(), AccountError>;

    /// Open a unit of work. Dropping it without `commit` discards its writes.
    async fn begin_transaction(&self) -> Result<Box<dyn CredentialTransaction>, AccountError>;
}

/// Writes staged under one transaction.
#[async_trait]
pub trait CredentialTransaction: Send {
    async fn insert(&mut self, account: &Account) -> Result<(), AccountError>;

    /// Make staged writes visible.
    ///
    /// # Errors
    /// * `DuplicateAccount` - A concurrent commit took the email or username
    /// * `DatabaseError` - Commit failed
    async fn commit(&mut self) -> Result<(), AccountError>;

    async fn rollback(&mut self) -> Result<(), AccountError>;
}
