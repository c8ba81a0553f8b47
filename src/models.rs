use chrono::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};

/// A stored registration, as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub email: String,
    pub company: String,
    pub position: String,
    pub created_at: DateTime<Utc>,
}

/// Attendee details submitted for registration.
///
/// Absent and `null` fields deserialize as empty strings so they are
/// reported by validation rather than rejected by the JSON extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewRegistration {
    #[serde(deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub last_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub mobile_number: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub company: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub position: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response envelope shared by every registration endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Envelope {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Envelope {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_registration_reads_camel_case_and_defaults_missing_fields() {
        let json = r#"{"firstName":"Ana","lastName":"Cruz","mobileNumber":"09171234567","email":"ana@example.com"}"#;
        let registration: NewRegistration = serde_json::from_str(json).unwrap();

        assert_eq!(registration.first_name, "Ana");
        assert_eq!(registration.mobile_number, "09171234567");
        assert_eq!(registration.company, "");
        assert_eq!(registration.position, "");
    }

    #[test]
    fn new_registration_reads_null_as_empty() {
        let json = r#"{"firstName":"Ana","lastName":null,"company":null,"position":null}"#;
        let registration: NewRegistration = serde_json::from_str(json).unwrap();

        assert_eq!(registration.first_name, "Ana");
        assert_eq!(registration.last_name, "");
        assert_eq!(registration.company, "");
        assert_eq!(registration.position, "");
    }

    #[test]
    fn envelope_omits_absent_members() {
        let json = serde_json::to_value(Envelope::<()>::failed("Email not found")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "Email not found"})
        );

        let json = serde_json::to_value(Envelope::ok(vec![1, 2])).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": [1, 2]}));
    }
}
