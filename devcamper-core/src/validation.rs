use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Run `garde` validation on a request body and turn the report into an
/// [`AppError::Validation`] carrying one `field: message` entry per failure.
pub fn validate<T>(value: &T) -> Result<(), AppError>
where
    T: garde::Validate,
    T::Context: Default,
{
    value.validate().map_err(|report| {
        let messages = report
            .iter()
            .map(|(path, error)| {
                let field = path.to_string();
                if field.is_empty() {
                    error.message().to_string()
                } else {
                    format!("{field}: {}", error.message())
                }
            })
            .collect();
        AppError::Validation(messages)
    })
}

// Re-export garde::Validate for convenience.
pub use garde::Validate;

/// JSON request body that is deserialized and then validated.
///
/// Malformed JSON and failed rules both surface as a 400 failure envelope
/// instead of axum's plain-text rejection.
///
/// ```ignore
/// async fn create(ValidJson(body): ValidJson<CreateBootcamp>) -> Result<Json<Value>, AppError> { .. }
/// ```
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + garde::Validate,
    T::Context: Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        validate(&value)?;
        Ok(ValidJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;

    #[derive(garde::Validate, serde::Deserialize)]
    struct Signup {
        #[garde(length(min = 1, max = 50))]
        name: String,
        #[garde(email)]
        email: String,
    }

    #[test]
    fn valid_body_passes() {
        let body = Signup {
            name: "John".into(),
            email: "john@gmail.com".into(),
        };
        assert!(validate(&body).is_ok());
    }

    #[test]
    fn every_failing_field_is_reported() {
        let body = Signup {
            name: String::new(),
            email: "nope".into(),
        };
        match validate(&body) {
            Err(AppError::Validation(messages)) => {
                assert_eq!(messages.len(), 2);
                assert!(messages.iter().any(|m| m.starts_with("name:")));
                assert!(messages.iter().any(|m| m.starts_with("email:")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    async fn extract(body: &'static str) -> Result<Signup, AppError> {
        let req = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        ValidJson::<Signup>::from_request(req, &()).await.map(|ValidJson(v)| v)
    }

    #[tokio::test]
    async fn valid_json_accepts_good_bodies() {
        let signup = extract(r#"{"name":"John","email":"john@gmail.com"}"#).await.unwrap();
        assert_eq!(signup.name, "John");
    }

    #[tokio::test]
    async fn valid_json_rejects_bad_bodies_with_400() {
        let err = extract(r#"{"name":"John""#).await.err().unwrap();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let err = extract(r#"{"name":"","email":"john@gmail.com"}"#).await.err().unwrap();
        assert!(matches!(err, AppError::Validation(ref m) if m.len() == 1));
    }
}
