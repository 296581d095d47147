use devcamper_security::{JwtService, SecurityConfig, SecurityError};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

const TEST_SECRET: &str = "devcamper-test-secret-do-not-use-in-production";

fn service() -> JwtService {
    JwtService::new(SecurityConfig::new(TEST_SECRET))
}

fn forged(secret: &str, issuer: &str, exp_offset: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = serde_json::json!({
        "id": "5d7a514b5d2c12c7449be042",
        "iss": issuer,
        "iat": now,
        "exp": now + exp_offset,
    });
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[test]
fn round_trip_keeps_the_id() {
    let jwt = service();
    let token = jwt.sign("5d7a514b5d2c12c7449be042").unwrap();
    assert_eq!(jwt.validate(&token).unwrap().id, "5d7a514b5d2c12c7449be042");
}

#[test]
fn expired_token_is_rejected() {
    let token = forged(TEST_SECRET, "devcamper", -3600);
    assert!(matches!(service().validate(&token), Err(SecurityError::TokenExpired)));
}

#[test]
fn wrong_secret_is_rejected() {
    let token = forged("another-secret", "devcamper", 3600);
    assert!(matches!(service().validate(&token), Err(SecurityError::Malformed(_))));
}

#[test]
fn wrong_issuer_is_rejected() {
    let token = forged(TEST_SECRET, "elsewhere", 3600);
    assert!(matches!(service().validate(&token), Err(SecurityError::ClaimRejected(_))));
}

#[test]
fn garbage_is_rejected() {
    assert!(matches!(service().validate("not.a.token"), Err(SecurityError::Malformed(_))));
}

#[test]
fn configured_lifetime_is_applied() {
    let jwt = JwtService::new(SecurityConfig::new(TEST_SECRET).with_expire_days(1));
    let claims = jwt.validate(&jwt.sign("abc").unwrap()).unwrap();
    assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
}
