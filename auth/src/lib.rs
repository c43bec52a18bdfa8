//! Authentication utilities library
//!
//! Provides reusable credential primitives for services:
//! - Password hashing (Argon2id, `base64(salt || key)` digests)
//! - JWT issuance and validation (HS256, issuer/audience bound)
//!
//! Services define their own account model and storage and compose these
//! primitives into their use cases.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let digest = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &digest));
//! assert!(!hasher.verify("not_my_password", &digest));
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::{TokenIdentity, TokenIssuer};
//!
//! let issuer = TokenIssuer::new(
//!     b"secret_key_at_least_32_bytes_long!",
//!     "auth-system",
//!     "auth-system-clients",
//! )
//! .unwrap();
//!
//! let identity = TokenIdentity {
//!     subject: "user123".to_string(),
//!     email: "alice@example.com".to_string(),
//!     username: "alice".to_string(),
//!     roles: vec!["User".to_string()],
//! };
//!
//! let issued = issuer.issue(&identity).unwrap();
//! assert!(issuer.validate(&issued.token));
//! assert_eq!(issuer.identity_from_token(&issued.token), Some("user123".to_string()));
//! ```

pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use jwt::Claims;
pub use jwt::IssuedToken;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenIdentity;
pub use jwt::TokenIssuer;
pub use password::HashParams;
pub use password::PasswordError;
pub use password::PasswordHasher;
