use jsonwebtoken::Algorithm;

/// Token signing and validation settings.
#[derive(Clone, Debug)]
pub struct SecurityConfig {
    /// Shared HMAC secret used to sign and verify tokens.
    pub secret: String,

    /// Value of the `iss` claim; tokens from another issuer are rejected.
    pub issuer: String,

    /// Token lifetime in days (default: 30).
    pub expire_days: i64,

    /// Signing algorithm. HMAC only, since tokens are signed with a shared secret.
    pub algorithm: Algorithm,
}

impl SecurityConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: "devcamper".into(),
            expire_days: 30,
            algorithm: Algorithm::HS256,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_expire_days(mut self, days: i64) -> Self {
        self.expire_days = days;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}
