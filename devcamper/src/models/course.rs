use devcamper_data::{Document, Relation};
use garde::Validate;
use serde::{Deserialize, Serialize};

use super::User;
use serde_json::Value;

pub struct Course;

impl Document for Course {
    fn collection() -> &'static str {
        "courses"
    }

    fn relations() -> &'static [Relation] {
        const RELATIONS: &[Relation] = &[
            Relation::reference("bootcamp", "bootcamps"),
            Relation::reference("user", "users").hiding(User::HIDDEN_FIELDS),
        ];
        RELATIONS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinimumSkill {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    #[garde(length(min = 1))]
    pub title: String,
    #[garde(length(min = 1))]
    pub description: String,
    #[garde(length(min = 1))]
    pub weeks: String,
    #[garde(range(min = 0.0))]
    pub tuition: f64,
    #[garde(skip)]
    pub minimum_skill: MinimumSkill,
    #[serde(default)]
    #[garde(skip)]
    pub scholarship_available: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(min = 1))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(min = 1))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(min = 1))]
    pub weeks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(range(min = 0.0))]
    pub tuition: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub minimum_skill: Option<MinimumSkill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub scholarship_available: Option<bool>,
}

/// Mean tuition rounded up to the next multiple of ten. `Null` when the
/// bootcamp has no priced courses.
pub fn average_cost(courses: &[Value]) -> Value {
    let tuitions: Vec<f64> = courses
        .iter()
        .filter_map(|c| c.get("tuition").and_then(Value::as_f64))
        .collect();
    if tuitions.is_empty() {
        return Value::Null;
    }
    let mean = tuitions.iter().sum::<f64>() / tuitions.len() as f64;
    Value::from(((mean / 10.0).ceil() * 10.0) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn average_cost_rounds_up_to_tens() {
        let courses = [json!({"tuition": 8000}), json!({"tuition": 10001})];
        assert_eq!(average_cost(&courses), json!(9010));
        assert_eq!(average_cost(&[json!({"tuition": 12000})]), json!(12000));
    }

    #[test]
    fn no_courses_clears_the_average() {
        assert_eq!(average_cost(&[]), Value::Null);
    }

    #[test]
    fn skills_are_lowercase_words() {
        let skill: MinimumSkill = serde_json::from_value(json!("intermediate")).unwrap();
        assert_eq!(skill, MinimumSkill::Intermediate);
        assert!(serde_json::from_value::<MinimumSkill>(json!("expert")).is_err());
    }
}
