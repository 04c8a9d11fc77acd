//! Domain types for the hrdesk client.
//!
//! Server-shaped records keep every field they know about as a typed,
//! optional member and collect anything else into `extra`, so a newer server
//! can add fields without breaking decoding or losing data on re-encode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unknown server fields, preserved as-is.
pub type ExtraFields = Map<String, Value>;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One employee row as the server returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Human-facing staff number, distinct from `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Employee {
    /// `"First Last"`, falling back to whichever half is present.
    pub fn full_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.to_string(),
            (None, None) => String::new(),
        }
    }
}

/// The authenticated account, as returned alongside a login token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

// ---------------------------------------------------------------------------
// Auth wire types
// ---------------------------------------------------------------------------

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Response of `POST /auth/login`. Both fields are optional on the wire;
/// the session manager decides what a missing token means.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

// ---------------------------------------------------------------------------
// Observable state values
// ---------------------------------------------------------------------------

/// Authenticated-user context.
///
/// `token` is `Some` iff a login succeeded and no logout happened since.
/// `user` may stay `None` while a token is present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Local mirror of the server's employee list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeState {
    pub items: Vec<Employee>,
    /// True only while a refresh is in flight.
    pub loading: bool,
    /// Message of the last failed refresh; cleared when the next one starts.
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn employee_tolerates_missing_fields() {
        let e: Employee = serde_json::from_value(json!({ "id": "A" })).unwrap();
        assert_eq!(e.id, "A");
        assert!(e.first_name.is_none());
        assert!(e.extra.is_empty());
    }

    #[test]
    fn employee_keeps_unknown_fields() {
        let raw = json!({
            "id": "7f3c",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "hire_date": "2021-03-01T00:00:00Z",
            "badge_colour": "green",
        });
        let e: Employee = serde_json::from_value(raw).unwrap();
        assert_eq!(e.full_name(), "Ada Lovelace");
        assert_eq!(e.extra.get("badge_colour"), Some(&json!("green")));

        let back = serde_json::to_value(&e).unwrap();
        assert_eq!(back["badge_colour"], "green");
        assert_eq!(back["hire_date"], "2021-03-01T00:00:00Z");
    }

    #[test]
    fn login_response_without_user() {
        let r: LoginResponse = serde_json::from_value(json!({ "token": "T1" })).unwrap();
        assert_eq!(r.token.as_deref(), Some("T1"));
        assert!(r.user.is_none());
    }

    #[test]
    fn default_states_are_empty() {
        assert!(!Session::default().is_authenticated());
        let s = EmployeeState::default();
        assert!(s.items.is_empty() && !s.loading && s.error.is_none());
    }
}
