use devcamper_data::{Document, Relation};
use garde::Validate;
use serde::{Deserialize, Serialize};

use super::User;
use serde_json::Value;

/// A user's review of a bootcamp. One per user and bootcamp.
pub struct Review;

impl Document for Review {
    fn collection() -> &'static str {
        "reviews"
    }

    fn relations() -> &'static [Relation] {
        const RELATIONS: &[Relation] = &[
            Relation::reference("bootcamp", "bootcamps"),
            Relation::reference("user", "users").hiding(User::HIDDEN_FIELDS),
        ];
        RELATIONS
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewReview {
    #[garde(length(min = 1, max = 100))]
    pub title: String,
    #[garde(length(min = 1))]
    pub text: String,
    #[garde(range(min = 1, max = 10))]
    pub rating: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ReviewUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(min = 1, max = 100))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(min = 1))]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(range(min = 1, max = 10))]
    pub rating: Option<u8>,
}

/// Mean rating of a bootcamp's reviews, `Null` when there are none.
pub fn average_rating(reviews: &[Value]) -> Value {
    let ratings: Vec<f64> = reviews
        .iter()
        .filter_map(|r| r.get("rating").and_then(Value::as_f64))
        .collect();
    if ratings.is_empty() {
        return Value::Null;
    }
    Value::from(ratings.iter().sum::<f64>() / ratings.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use devcamper_core::validate;
    use serde_json::json;

    #[test]
    fn average_rating_is_the_mean() {
        let reviews = [json!({"rating": 8}), json!({"rating": 7})];
        assert_eq!(average_rating(&reviews), json!(7.5));
        assert_eq!(average_rating(&[]), Value::Null);
    }

    #[test]
    fn rating_must_be_between_one_and_ten() {
        let review = NewReview {
            title: "Learned a ton".into(),
            text: "Great bootcamp".into(),
            rating: 11,
        };
        assert!(validate(&review).is_err());
        assert!(validate(&NewReview { rating: 10, ..review }).is_ok());
    }
}
