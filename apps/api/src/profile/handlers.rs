use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::{json_or_default, AppError};
use crate::models::profile::{ProfileRecord, UserProfile};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UpsertProfileResponse {
    pub message: String,
    pub profile: ProfileRecord,
}

/// GET /api/profile/:user_id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>, AppError> {
    match state.store.get_profile(&user_id).await {
        Ok(Some(profile)) => Ok(Json(profile)),
        Ok(None) => {
            info!("No profile for user {user_id}");
            Err(AppError::NotFound("Profile not found.".to_string()))
        }
        Err(e) => Err(AppError::failed(
            "Internal server error while fetching profile.",
            e,
        )),
    }
}

/// POST /api/profile/:user_id
///
/// Full replace: fields missing from the body are stored empty, and a request
/// without a JSON body stores an empty profile.
pub async fn handle_upsert_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Result<Json<UserProfile>, JsonRejection>,
) -> Result<Json<UpsertProfileResponse>, AppError> {
    let profile = json_or_default(body)?;
    let record = state
        .store
        .upsert_profile(&user_id, &profile)
        .await
        .map_err(|e| AppError::failed("Internal server error while updating profile.", e))?;

    info!("Profile updated for user {user_id}");
    Ok(Json(UpsertProfileResponse {
        message: "Profile updated successfully.".to_string(),
        profile: record,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::testing::{test_router, MemoryStore};

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_upsert_then_get_normalizes_missing_fields() {
        let app = test_router(Arc::new(MemoryStore::default()), None);

        let (status, body) = send(
            &app,
            "POST",
            "/api/profile/u2",
            Some(json!({ "profession": "Engineer" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Profile updated successfully.");
        assert_eq!(body["profile"]["user_id"], "u2");
        assert_eq!(body["profile"]["profession"], "Engineer");

        let (status, body) = send(&app, "GET", "/api/profile/u2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "interests": [],
                "profession": "Engineer",
                "hobbies": [],
                "preferred_content_themes": []
            })
        );
    }

    #[tokio::test]
    async fn test_upsert_replaces_whole_profile() {
        let app = test_router(Arc::new(MemoryStore::default()), None);

        send(
            &app,
            "POST",
            "/api/profile/u5",
            Some(json!({
                "interests": ["coffee", "rust"],
                "profession": "Engineer",
                "hobbies": ["climbing"],
                "preferred_content_themes": ["tech"]
            })),
        )
        .await;
        send(&app, "POST", "/api/profile/u5", Some(json!({ "hobbies": ["chess"] }))).await;

        let (_, body) = send(&app, "GET", "/api/profile/u5", None).await;
        assert_eq!(
            body,
            json!({
                "interests": [],
                "profession": "",
                "hobbies": ["chess"],
                "preferred_content_themes": []
            })
        );
    }

    #[tokio::test]
    async fn test_upsert_without_body_stores_empty_profile() {
        let app = test_router(Arc::new(MemoryStore::default()), None);

        let (status, body) = send(&app, "POST", "/api/profile/u9", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profile"]["user_id"], "u9");
        assert_eq!(body["profile"]["interests"], json!([]));

        let (status, _) = send(&app, "GET", "/api/profile/u9", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upsert_mistyped_body_is_json_error() {
        let store = Arc::new(MemoryStore::default());
        let app = test_router(store.clone(), None);

        let (status, body) = send(
            &app,
            "POST",
            "/api/profile/u4",
            Some(json!({ "interests": "coffee" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body"));
        assert!(!store.has_profile("u4"));
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let app = test_router(Arc::new(MemoryStore::default()), None);

        let (status, body) = send(&app, "GET", "/api/profile/nobody", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Profile not found." }));
    }

    #[tokio::test]
    async fn test_failed_user_write_leaves_no_profile() {
        let store = Arc::new(MemoryStore::failing_user_writes());
        let app = test_router(store.clone(), None);

        let (status, body) = send(&app, "POST", "/api/profile/u3", Some(json!({}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error while updating profile.");
        assert!(body["details"]
            .as_str()
            .unwrap()
            .starts_with("Failed to create or update user entry"));
        assert!(!store.has_user("u3"));
        assert!(!store.has_profile("u3"));
    }
}
