//! Validated employee payloads for create and update calls.
//!
//! Every field the server requires for creation is an explicit member of
//! [`NewEmployee`]; nothing is filled in on the caller's behalf.

use crate::error::{HrdeskError, HrdeskResult};
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Closed vocabularies
// ---------------------------------------------------------------------------

macro_rules! vocabulary {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = HrdeskError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| {
                        let allowed: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        HrdeskError::InvalidInput(format!(
                            "{} must be one of {}, got {s:?}",
                            stringify!($name),
                            allowed.join("/")
                        ))
                    })
            }
        }
    };
}

vocabulary!(Gender {
    Male => "male",
    Female => "female",
    Other => "other",
});

vocabulary!(MaritalStatus {
    Single => "single",
    Married => "married",
    Divorced => "divorced",
    Widowed => "widowed",
});

vocabulary!(
    /// Lifecycle state of an employment record.
    EmploymentStatus {
        Active => "active",
        Inactive => "inactive",
        Terminated => "terminated",
    }
);

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Body of `POST /employees`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEmployee {
    pub user_id: String,
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(serialize_with = "midnight_utc")]
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub marital_status: MaritalStatus,
    pub phone_number: String,
    pub email: String,
    pub address: String,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    #[serde(serialize_with = "midnight_utc")]
    pub hire_date: NaiveDate,
    pub employment_status: EmploymentStatus,
}

impl NewEmployee {
    pub fn validate(&self) -> HrdeskResult<()> {
        require("user_id", &self.user_id)?;
        require("employee_id", &self.employee_id)?;
        require("first_name", &self.first_name)?;
        require("last_name", &self.last_name)?;
        require("phone_number", &self.phone_number)?;
        require("address", &self.address)?;
        require("emergency_contact_name", &self.emergency_contact_name)?;
        require("emergency_contact_phone", &self.emergency_contact_phone)?;
        check_email(&self.email)?;
        optional_reference("department_id", self.department_id.as_deref())?;
        optional_reference("position_id", self.position_id.as_deref())?;
        optional_reference("manager_id", self.manager_id.as_deref())?;

        if self.hire_date < self.date_of_birth {
            return Err(HrdeskError::InvalidInput(format!(
                "hire_date {} is before date_of_birth {}",
                self.hire_date, self.date_of_birth
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// Body of `PUT /employees/{id}`. Only present fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmployeeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "optional_midnight_utc"
    )]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<MaritalStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "optional_midnight_utc"
    )]
    pub hire_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_status: Option<EmploymentStatus>,
}

impl EmployeeUpdate {
    /// True when no field would be sent.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> HrdeskResult<()> {
        if self.is_empty() {
            return Err(HrdeskError::InvalidInput("update has no fields".into()));
        }

        let present = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("phone_number", &self.phone_number),
            ("address", &self.address),
            ("emergency_contact_name", &self.emergency_contact_name),
            ("emergency_contact_phone", &self.emergency_contact_phone),
        ];
        for (field, value) in present {
            if let Some(v) = value {
                require(field, v)?;
            }
        }

        if let Some(email) = &self.email {
            check_email(email)?;
        }
        optional_reference("department_id", self.department_id.as_deref())?;
        optional_reference("position_id", self.position_id.as_deref())?;
        optional_reference("manager_id", self.manager_id.as_deref())?;

        if let (Some(hired), Some(born)) = (self.hire_date, self.date_of_birth) {
            if hired < born {
                return Err(HrdeskError::InvalidInput(format!(
                    "hire_date {hired} is before date_of_birth {born}"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn require(field: &str, value: &str) -> HrdeskResult<()> {
    if value.trim().is_empty() {
        return Err(HrdeskError::InvalidInput(format!("{field} is required")));
    }
    Ok(())
}

fn optional_reference(field: &str, value: Option<&str>) -> HrdeskResult<()> {
    match value {
        Some(v) => require(field, v),
        None => Ok(()),
    }
}

fn check_email(email: &str) -> HrdeskResult<()> {
    let bad = || HrdeskError::InvalidInput(format!("email {email:?} is not a valid address"));

    let (local, domain) = email.trim().split_once('@').ok_or_else(bad)?;
    let domain_ok = domain
        .split('.')
        .filter(|part| !part.is_empty())
        .count()
        >= 2
        && !domain.starts_with('.')
        && !domain.ends_with('.');

    if local.is_empty() || domain.contains('@') || !domain_ok || email.contains(char::is_whitespace)
    {
        return Err(bad());
    }
    Ok(())
}

/// The server decodes dates as full RFC 3339 timestamps.
fn midnight_utc<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{}T00:00:00Z", date.format("%Y-%m-%d")))
}

fn optional_midnight_utc<S: Serializer>(
    date: &Option<NaiveDate>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(d) => midnight_utc(d, serializer),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> NewEmployee {
        NewEmployee {
            user_id: "0b6a2c4e-1f7d-4a53-9c1e-2d8f6b3a9e10".into(),
            employee_id: "EMP-0042".into(),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            date_of_birth: date(1906, 12, 9),
            gender: Gender::Female,
            marital_status: MaritalStatus::Divorced,
            phone_number: "+1 555 0100".into(),
            email: "grace@navy.example".into(),
            address: "1 Harbor Way".into(),
            emergency_contact_name: "Mary Murray".into(),
            emergency_contact_phone: "+1 555 0199".into(),
            department_id: None,
            position_id: Some("pos-7".into()),
            manager_id: None,
            hire_date: date(1943, 12, 1),
            employment_status: EmploymentStatus::Active,
        }
    }

    #[test]
    fn valid_form_passes() {
        sample().validate().unwrap();
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let mut form = sample();
        form.address = "   ".into();
        let err = form.validate().unwrap_err();
        assert!(err.to_string().contains("address is required"), "{err}");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for bad in ["", "grace", "@navy.example", "grace@", "grace@navy", "g race@navy.example"] {
            let mut form = sample();
            form.email = bad.into();
            assert!(form.validate().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn hire_before_birth_is_rejected() {
        let mut form = sample();
        form.hire_date = date(1900, 1, 1);
        assert!(form.validate().is_err());
    }

    #[test]
    fn serializes_dates_as_timestamps_and_skips_absent_refs() {
        let v = serde_json::to_value(sample()).unwrap();
        assert_eq!(v["date_of_birth"], "1906-12-09T00:00:00Z");
        assert_eq!(v["hire_date"], "1943-12-01T00:00:00Z");
        assert_eq!(v["gender"], "female");
        assert_eq!(v["employment_status"], "active");
        assert_eq!(v["position_id"], "pos-7");
        assert!(v.get("department_id").is_none());
    }

    #[test]
    fn update_sends_only_present_fields() {
        let update = EmployeeUpdate {
            last_name: Some("Murray".into()),
            hire_date: Some(date(2020, 2, 29)),
            ..Default::default()
        };
        update.validate().unwrap();
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "last_name": "Murray", "hire_date": "2020-02-29T00:00:00Z" })
        );
    }

    #[test]
    fn empty_update_is_rejected() {
        assert!(EmployeeUpdate::default().is_empty());
        assert!(EmployeeUpdate::default().validate().is_err());
    }

    #[test]
    fn vocabularies_parse_case_insensitively() {
        assert_eq!("Married".parse::<MaritalStatus>().unwrap(), MaritalStatus::Married);
        assert_eq!(" OTHER ".parse::<Gender>().unwrap(), Gender::Other);
        let err = "retired".parse::<EmploymentStatus>().unwrap_err();
        assert!(err.to_string().contains("active/inactive/terminated"), "{err}");
    }
}
