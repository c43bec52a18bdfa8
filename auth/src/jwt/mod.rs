pub mod claims;
pub mod errors;
pub mod handler;
pub mod issuer;

pub use claims::Claims;
pub use errors::JwtError;
pub use handler::JwtHandler;
pub use issuer::IssuedToken;
pub use issuer::DEFAULT_TOKEN_LIFETIME_HOURS;
pub use issuer::TokenIdentity;
pub use issuer::TokenIssuer;
