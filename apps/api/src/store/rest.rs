//! PostgREST backend (`<base>/rest/v1/<table>`), authenticated with the service key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header::ACCEPT, Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Store, StoreError};
use crate::models::content::GeneratedContentRecord;
use crate::models::profile::{placeholder_email, ProfileRecord, UserProfile};

const PROFILE_COLUMNS: &str = "interests,profession,hobbies,preferred_content_themes";
const PROFILE_RECORD_COLUMNS: &str =
    "user_id,interests,profession,hobbies,preferred_content_themes,updated_at";
/// Asks PostgREST for exactly one object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
/// PostgREST code for "single object requested, zero rows matched".
const NO_ROWS_CODE: &str = "PGRST116";

#[derive(Debug, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct UserRow<'a> {
    id: &'a str,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct ProfileRow<'a> {
    user_id: &'a str,
    #[serde(flatten)]
    profile: &'a UserProfile,
    updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    service_key: String,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, service_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            service_key,
        }
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let url = format!("{}/rest/v1/{table}", self.base_url.trim_end_matches('/'));
        self.client
            .request(method, url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn upsert_user(&self, user_id: &str) -> Result<(), StoreError> {
        let now = Utc::now();
        let row = UserRow {
            id: user_id,
            email: placeholder_email(user_id),
            created_at: now,
            updated_at: now,
        };

        let response = self
            .request(Method::POST, "users")
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=ignore-duplicates,return=minimal")
            .json(&row)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }
}

/// Decodes a PostgREST error body, falling back to the raw text.
async fn api_error(response: Response) -> StoreError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<PostgrestError>(&body) {
        Ok(err) => StoreError::Api {
            status,
            code: err.code,
            message: err.message.unwrap_or(body),
        },
        Err(_) => StoreError::Api {
            status,
            code: None,
            message: body,
        },
    }
}

#[async_trait]
impl Store for RestStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        let user_filter = format!("eq.{user_id}");
        let response = self
            .request(Method::GET, "user_profiles")
            .query(&[("select", PROFILE_COLUMNS), ("user_id", user_filter.as_str())])
            .header(ACCEPT, SINGLE_OBJECT)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(Some(response.json().await?));
        }

        match api_error(response).await {
            StoreError::Api { code: Some(code), .. } if code == NO_ROWS_CODE => {
                debug!("No profile row for user {user_id}");
                Ok(None)
            }
            err => Err(err),
        }
    }

    async fn upsert_profile(
        &self,
        user_id: &str,
        profile: &UserProfile,
    ) -> Result<ProfileRecord, StoreError> {
        self.upsert_user(user_id)
            .await
            .map_err(|e| StoreError::DependencyWrite(e.to_string()))?;
        info!("User {user_id} ensured in users table");

        let row = ProfileRow {
            user_id,
            profile,
            updated_at: Utc::now(),
        };

        let response = self
            .request(Method::POST, "user_profiles")
            .query(&[("on_conflict", "user_id"), ("select", PROFILE_RECORD_COLUMNS)])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&row)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let rows: Vec<ProfileRecord> = response.json().await?;
        rows.into_iter()
            .next()
            .ok_or(StoreError::MissingRow("user_profiles"))
    }

    async fn insert_generated_content(
        &self,
        record: &GeneratedContentRecord,
    ) -> Result<(), StoreError> {
        let response = self
            .request(Method::POST, "generated_content")
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let response = self
            .request(Method::GET, "user_profiles")
            .query(&[("select", "user_id"), ("limit", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }
}
