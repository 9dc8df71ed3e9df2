// User records. Credential handling lives outside this server; only the
// shapes are validated here.

use crate::validation::{ObjectValidator, Schema, ValidationErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Schema for User {
    fn check(value: &Value) -> ValidationErrors {
        let mut v = ObjectValidator::new(value);
        v.non_empty("id");
        v.email("email", true);
        v.opt_string("name");
        v.datetime("created_at", true);
        v.datetime("updated_at", true);
        v.finish()
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateUserInput {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// Keep the password out of logs
impl std::fmt::Debug for CreateUserInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserInput")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

impl Schema for CreateUserInput {
    fn check(value: &Value) -> ValidationErrors {
        let mut v = ObjectValidator::new(value);
        v.email("email", true);
        v.length("password", MIN_PASSWORD_CHARS, usize::MAX, true);
        v.opt_string("name");
        v.finish()
    }
}
