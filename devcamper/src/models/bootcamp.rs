use devcamper_data::{Document, Relation};
use garde::Validate;
use serde::{Deserialize, Serialize};

use super::User;

pub const DEFAULT_PHOTO: &str = "no-photo.jpg";

/// A bootcamp listing, owned by the publisher who created it.
pub struct Bootcamp;

impl Document for Bootcamp {
    fn collection() -> &'static str {
        "bootcamps"
    }

    fn relations() -> &'static [Relation] {
        const RELATIONS: &[Relation] = &[
            Relation::virtual_many("courses", "courses", "bootcamp"),
            Relation::virtual_many("reviews", "reviews", "bootcamp"),
            Relation::reference("user", "users").hiding(User::HIDDEN_FIELDS),
        ];
        RELATIONS
    }

    fn unique_fields() -> &'static [&'static str] {
        &["name"]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Career {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "UI/UX")]
    UiUx,
    #[serde(rename = "Data Science")]
    DataScience,
    Business,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBootcamp {
    #[garde(length(min = 1, max = 50))]
    pub name: String,
    #[garde(length(min = 1, max = 500))]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(url)]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(max = 20))]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(email)]
    pub email: Option<String>,
    #[garde(length(min = 1))]
    pub address: String,
    #[garde(length(min = 1))]
    pub careers: Vec<Career>,
    #[serde(default)]
    #[garde(skip)]
    pub housing: bool,
    #[serde(default)]
    #[garde(skip)]
    pub job_assistance: bool,
    #[serde(default)]
    #[garde(skip)]
    pub job_guarantee: bool,
    #[serde(default)]
    #[garde(skip)]
    pub accept_gi: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BootcampUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(min = 1, max = 500))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(url)]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(max = 20))]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(email)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(min = 1))]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(min = 1))]
    pub careers: Option<Vec<Career>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub housing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub job_assistance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub job_guarantee: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub accept_gi: Option<bool>,
}

/// URL-friendly form of a bootcamp name: `"Devworks Bootcamp"` becomes
/// `"devworks-bootcamp"`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
