use devcamper_data::Document;
use garde::Validate;
use serde::{Deserialize, Serialize};

pub struct User;

impl User {
    pub const HIDDEN_FIELDS: &'static [&'static str] = &["password", "resetPasswordToken", "resetPasswordExpire"];
}

impl Document for User {
    fn collection() -> &'static str {
        "users"
    }

    fn unique_fields() -> &'static [&'static str] {
        &["email"]
    }

    fn hidden_fields() -> &'static [&'static str] {
        Self::HIDDEN_FIELDS
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Publisher,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Publisher => "publisher",
            Role::Admin => "admin",
        }
    }
}

fn not_admin(role: &Role, _ctx: &()) -> garde::Result {
    if *role == Role::Admin {
        return Err(garde::Error::new("admin accounts cannot be self-registered"));
    }
    Ok(())
}

/// Public sign-up. Any role but `admin`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Register {
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(email)]
    pub email: String,
    #[serde(default)]
    #[garde(custom(not_admin))]
    pub role: Role,
    #[garde(length(min = 6))]
    pub password: String,
}

/// Account created by an administrator; every role is allowed.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewUser {
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(email)]
    pub email: String,
    #[serde(default)]
    #[garde(skip)]
    pub role: Role,
    #[garde(length(min = 6))]
    pub password: String,
}

impl From<Register> for NewUser {
    fn from(r: Register) -> Self {
        NewUser {
            name: r.name,
            email: r.email,
            role: r.role,
            password: r.password,
        }
    }
}

/// Admin edit of an account. Passwords change only through the auth routes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(min = 1))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(email)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub role: Option<Role>,
}
