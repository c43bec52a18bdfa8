use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::Row;
use sqlx::Transaction;

use crate::account::errors::AccountError;
use crate::account::errors::AccountField;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AccountRecord;
use crate::account::models::EmailAddress;
use crate::account::models::Username;
use crate::account::ports::CredentialStore;
use crate::account::ports::CredentialTransaction;

const SELECT_ACCOUNT: &str = r#"
    SELECT id, email, username, password_digest, first_name, last_name,
           roles, created_at, last_login_at, is_active
    FROM accounts
"#;

const INSERT_ACCOUNT: &str = r#"
    INSERT INTO accounts (id, email, username, password_digest, first_name, last_name,
                          roles, created_at, last_login_at, is_active)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
"#;

pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(
        &self,
        filter: &str,
        value: &str,
    ) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!("{} WHERE {} = $1", SELECT_ACCOUNT, filter))
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        row.map(|r| account_from_row(&r)).transpose()
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_ACCOUNT))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        row.map(|r| account_from_row(&r)).transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, AccountError> {
        self.find_one("email", email.as_str()).await
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Account>, AccountError> {
        self.find_one("username", username.as_str()).await
    }

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, AccountError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))
    }

    async fn exists_by_username(&self, username: &Username) -> Result<bool, AccountError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM accounts WHERE username = $1)")
            .bind(username.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))
    }

    async fn insert(&self, account: &Account) -> Result<(), AccountError> {
        bind_account(sqlx::query(INSERT_ACCOUNT), account)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, account))?;

        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), AccountError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET first_name = $2, last_name = $3, roles = $4, last_login_at = $5, is_active = $6
            WHERE id = $1
            "#,
        )
        .bind(account.id().0)
        .bind(account.first_name())
        .bind(account.last_name())
        .bind(account.roles())
        .bind(account.last_login_at())
        .bind(account.is_active())
        .execute(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound(account.id().to_string()));
        }

        Ok(())
    }

    async fn begin_transaction(&self) -> Result<Box<dyn CredentialTransaction>, AccountError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        Ok(Box::new(PostgresTransaction { tx: Some(tx) }))
    }
}

/// Open database transaction. Dropped without commit, sqlx rolls it back.
pub struct PostgresTransaction {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PostgresTransaction {
    fn open(&mut self) -> Result<&mut Transaction<'static, Postgres>, AccountError> {
        self.tx
            .as_mut()
            .ok_or_else(|| AccountError::DatabaseError("Transaction already finished".to_string()))
    }
}

#[async_trait]
impl CredentialTransaction for PostgresTransaction {
    async fn insert(&mut self, account: &Account) -> Result<(), AccountError> {
        let tx = self.open()?;

        bind_account(sqlx::query(INSERT_ACCOUNT), account)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_write_error(e, account))?;

        Ok(())
    }

    async fn commit(&mut self) -> Result<(), AccountError> {
        let Some(tx) = self.tx.take() else {
            return Err(AccountError::DatabaseError(
                "Transaction already finished".to_string(),
            ));
        };

        tx.commit()
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))
    }

    async fn rollback(&mut self) -> Result<(), AccountError> {
        match self.tx.take() {
            Some(tx) => tx
                .rollback()
                .await
                .map_err(|e| AccountError::DatabaseError(e.to_string())),
            None => Ok(()),
        }
    }
}

fn bind_account<'q>(
    query: sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments>,
    account: &'q Account,
) -> sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(account.id().0)
        .bind(account.email().as_str())
        .bind(account.username().as_str())
        .bind(account.password_digest())
        .bind(account.first_name())
        .bind(account.last_name())
        .bind(account.roles())
        .bind(account.created_at())
        .bind(account.last_login_at())
        .bind(account.is_active())
}

fn map_write_error(e: sqlx::Error, account: &Account) -> AccountError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if db_err.constraint() == Some("accounts_email_key") {
                return AccountError::DuplicateAccount {
                    field: AccountField::Email,
                    value: account.email().to_string(),
                };
            }
            if db_err.constraint() == Some("accounts_username_key") {
                return AccountError::DuplicateAccount {
                    field: AccountField::Username,
                    value: account.username().to_string(),
                };
            }
        }
    }
    AccountError::DatabaseError(e.to_string())
}

fn account_from_row(row: &PgRow) -> Result<Account, AccountError> {
    let column = |e: sqlx::Error| AccountError::DatabaseError(e.to_string());

    Ok(Account::restore(AccountRecord {
        id: AccountId(row.try_get("id").map_err(column)?),
        email: EmailAddress::new(row.try_get("email").map_err(column)?)?,
        username: Username::new(row.try_get("username").map_err(column)?)?,
        password_digest: row.try_get("password_digest").map_err(column)?,
        first_name: row.try_get("first_name").map_err(column)?,
        last_name: row.try_get("last_name").map_err(column)?,
        roles: row.try_get("roles").map_err(column)?,
        created_at: row.try_get("created_at").map_err(column)?,
        last_login_at: row.try_get("last_login_at").map_err(column)?,
        is_active: row.try_get("is_active").map_err(column)?,
    }))
}
