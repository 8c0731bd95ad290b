use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// The persona a user writes posts as. Absent or `null` fields read as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub interests: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub profession: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hobbies: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub preferred_content_themes: Vec<String>,
}

/// A `user_profiles` row as written by an upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProfileRecord {
    pub user_id: String,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub profile: UserProfile,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Placeholder email for the parent `users` row; identities are anonymous.
pub fn placeholder_email(user_id: &str) -> String {
    format!("anonymous_user_{user_id}@personapost.ai")
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let profile: UserProfile = serde_json::from_value(json!({ "profession": "Engineer" })).unwrap();
        assert_eq!(
            profile,
            UserProfile {
                profession: "Engineer".to_string(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_null_fields_default_to_empty() {
        let profile: UserProfile = serde_json::from_value(json!({
            "interests": null,
            "profession": null,
            "hobbies": ["chess"],
            "preferred_content_themes": null
        }))
        .unwrap();
        assert!(profile.interests.is_empty());
        assert_eq!(profile.profession, "");
        assert_eq!(profile.hobbies, vec!["chess".to_string()]);
    }

    #[test]
    fn test_profile_record_flattens_profile_fields() {
        let record: ProfileRecord = serde_json::from_value(json!({
            "user_id": "u1",
            "interests": ["coffee"],
            "profession": "Barista",
            "hobbies": [],
            "preferred_content_themes": [],
            "updated_at": "2026-03-01T10:00:00+00:00"
        }))
        .unwrap();
        assert_eq!(record.user_id, "u1");
        assert_eq!(record.profile.profession, "Barista");
        assert!(record.updated_at.is_some());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["interests"], json!(["coffee"]));
        assert!(value.get("profile").is_none());
    }

    #[test]
    fn test_placeholder_email() {
        assert_eq!(placeholder_email("abc"), "anonymous_user_abc@personapost.ai");
    }
}
