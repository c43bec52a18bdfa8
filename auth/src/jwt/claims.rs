use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::issuer::TokenIdentity;

/// Identity claims carried by an access token.
///
/// Standard RFC 7519 claims (`sub`, `iat`, `exp`, `iss`, `aud`) plus the
/// account's email, username (`name`) and one `roles` entry per role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (account identifier)
    pub sub: String,

    /// Email address of the subject
    pub email: String,

    /// Username of the subject
    pub name: String,

    /// Role labels granted to the subject
    #[serde(default)]
    pub roles: Vec<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,
}

impl Claims {
    /// Build claims for an identity issued at `issued_at`.
    ///
    /// # Arguments
    /// * `identity` - Subject of the token
    /// * `issuer` - Issuer name
    /// * `audience` - Audience name
    /// * `issued_at` - Issue instant
    /// * `lifetime` - Time until expiry
    pub fn for_identity(
        identity: &TokenIdentity,
        issuer: &str,
        audience: &str,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            sub: identity.subject.clone(),
            email: identity.email.clone(),
            name: identity.username.clone(),
            roles: identity.roles.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + lifetime).timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> TokenIdentity {
        TokenIdentity {
            subject: "5f0c6f3e-8a4b-4c1e-9f7a-2b1d3c4e5f60".to_string(),
            email: "alice@example.com".to_string(),
            username: "alice".to_string(),
            roles: vec!["User".to_string(), "Admin".to_string()],
        }
    }

    #[test]
    fn test_for_identity() {
        let now = Utc::now();
        let claims = Claims::for_identity(&identity(), "issuer", "audience", now, Duration::hours(24));

        assert_eq!(claims.sub, "5f0c6f3e-8a4b-4c1e-9f7a-2b1d3c4e5f60");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.name, "alice");
        assert_eq!(claims.iss, "issuer");
        assert_eq!(claims.aud, "audience");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60); // 24 hours
        assert_eq!(claims.roles, vec!["User".to_string(), "Admin".to_string()]);
    }

    #[test]
    fn test_roles_serialize_as_array() {
        let claims = Claims::for_identity(&identity(), "iss", "aud", Utc::now(), Duration::hours(1));
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["roles"], serde_json::json!(["User", "Admin"]));
        assert_eq!(json["name"], "alice");
    }
}
