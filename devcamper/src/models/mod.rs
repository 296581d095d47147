//! Stored document types and the request bodies that create or change them.

pub mod bootcamp;
pub mod course;
pub mod review;
pub mod user;

pub use bootcamp::{Bootcamp, BootcampUpdate, Career, NewBootcamp};
pub use course::{Course, CourseUpdate, MinimumSkill, NewCourse};
pub use review::{NewReview, Review, ReviewUpdate};
pub use user::{NewUser, Register, Role, User, UserUpdate};

use devcamper_core::AppError;
use serde::Serialize;
use serde_json::{Map, Value};

/// Serialize a request body into the top-level fields the store writes.
/// Absent optional fields are skipped by the body's own serde attributes.
pub fn to_fields<T: Serialize>(body: &T) -> Result<Map<String, Value>, AppError> {
    match serde_json::to_value(body).map_err(|e| AppError::internal(e.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::internal(format!("expected an object body, got {other}"))),
    }
}

/// `owner` field of a document (`user` holds the owning user's id).
pub fn owner_of(doc: &Value) -> Option<&str> {
    doc.get("user").and_then(Value::as_str)
}
