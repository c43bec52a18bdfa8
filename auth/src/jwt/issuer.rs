use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use super::claims::Claims;
use super::errors::JwtError;
use super::handler::JwtHandler;

/// Default token lifetime.
pub const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 24;

/// Identity encoded into an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    pub subject: String,
    pub email: String,
    pub username: String,
    pub roles: Vec<String>,
}

/// A freshly signed access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Compact JWT
    pub token: String,
    /// Instant the token stops validating
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies bearer tokens for one issuer/audience pair.
///
/// Built once from configuration and shared read-only; holds no per-request
/// state. Tokens are valid until they expire; there is no revocation.
pub struct TokenIssuer {
    handler: JwtHandler,
    issuer: String,
    audience: String,
    lifetime: Duration,
}

impl TokenIssuer {
    /// Create a token issuer.
    ///
    /// # Arguments
    /// * `secret` - HMAC signing secret
    /// * `issuer` - Value of the `iss` claim
    /// * `audience` - Value of the `aud` claim
    ///
    /// # Errors
    /// * `MissingSecret` - The secret is empty
    pub fn new(
        secret: &[u8],
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::MissingSecret);
        }

        let issuer = issuer.into();
        let audience = audience.into();

        Ok(Self {
            handler: JwtHandler::new(secret, &issuer, &audience),
            issuer,
            audience,
            lifetime: Duration::hours(DEFAULT_TOKEN_LIFETIME_HOURS),
        })
    }

    /// Override the token lifetime.
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Sign a token for `identity`, valid from now for the configured lifetime.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue(&self, identity: &TokenIdentity) -> Result<IssuedToken, JwtError> {
        self.issue_at(identity, Utc::now())
    }

    fn issue_at(
        &self,
        identity: &TokenIdentity,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, JwtError> {
        let claims = Claims::for_identity(
            identity,
            &self.issuer,
            &self.audience,
            issued_at,
            self.lifetime,
        );
        let token = self.handler.encode(&claims)?;

        Ok(IssuedToken {
            token,
            expires_at: issued_at + self.lifetime,
        })
    }

    /// Check signature, issuer, audience and expiry.
    ///
    /// Any failure, including malformed input, yields `false`.
    pub fn validate(&self, token: &str) -> bool {
        self.decode(token).is_ok()
    }

    /// Extract the subject of a token.
    ///
    /// The token is fully verified first; forged, expired or malformed
    /// tokens yield `None`.
    pub fn identity_from_token(&self, token: &str) -> Option<String> {
        self.decode(token)
            .ok()
            .map(|claims| claims.sub)
            .filter(|sub| !sub.is_empty())
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    /// See [`JwtHandler::decode`].
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        self.handler.decode(token)
    }
}
