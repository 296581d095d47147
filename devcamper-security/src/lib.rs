pub mod config;
pub mod error;
pub mod extractor;
pub mod guards;
pub mod jwt;
pub mod password;

pub use config::SecurityConfig;
pub use error::SecurityError;
pub use extractor::{bearer_token, extract_claims, BearerClaims};
pub use guards::{authorize, RoleBasedIdentity};
pub use jwt::{Claims, JwtService};
pub use password::{digest_reset_token, hash_password, verify_password, ResetToken};

