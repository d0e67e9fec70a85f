use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::response::Redirect;
use axum::Router;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::{Record, Repository};
use crate::error::{AppError, Result};
use crate::forms::FormData;
use crate::models::EntityId;
use crate::services::storage::{ObjectStorage, UploadFolder};

mod bank;
mod board;
mod content;
mod exam;

pub struct AppState {
    pub repository: Repository,
    pub storage: Option<ObjectStorage>,
    pub config: Config,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(repository: Repository, storage: Option<ObjectStorage>, config: Config) -> SharedState {
        Arc::new(Self {
            repository,
            storage,
            config,
        })
    }

    /// Relays the file sent as `field`, if any, to object storage and
    /// returns its public URL.
    pub async fn upload(
        &self,
        form: &mut FormData,
        field: &str,
        folder: UploadFolder,
    ) -> Result<Option<String>> {
        let Some(file) = form.take_file(field) else {
            return Ok(None);
        };
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| AppError::Upload("object storage is not configured".to_string()))?;
        let url = storage
            .upload(
                folder,
                &file.file_name,
                file.content_type.as_deref(),
                file.bytes,
            )
            .await?;
        Ok(Some(url))
    }
}

pub fn router(state: SharedState) -> Router {
    let body_limit = state.config.max_upload_bytes();

    Router::new()
        .merge(content::routes())
        .merge(exam::routes())
        .merge(bank::routes())
        .merge(board::routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// One-shot message carried in the query string after a redirect.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Flash {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Listing<T> {
    #[serde(flatten)]
    pub flash: Flash,
    pub items: Vec<T>,
}

impl<T> Listing<T> {
    pub fn new(flash: Flash, items: Vec<T>) -> Self {
        Self { flash, items }
    }
}

pub fn redirect_notice(path: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{path}?notice={}", urlencoding::encode(message)))
}

pub fn redirect_error(path: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{path}?error={}", urlencoding::encode(message)))
}

/// Deletes a record by its raw path id and redirects to `back`. Unknown or
/// malformed ids come back as an error flash instead of a failure.
pub async fn delete_and_redirect<T: Record>(
    state: &AppState,
    raw_id: &str,
    back: &str,
    notice: &str,
) -> Result<Redirect> {
    let outcome = match EntityId::parse(raw_id, T::LABEL) {
        Ok(id) => state.repository.delete::<T>(id).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(()) => Ok(redirect_notice(back, notice)),
        Err(AppError::NotFound(label)) => Ok(redirect_error(back, &format!("{label} not found!"))),
        Err(e) => Err(e),
    }
}

/// Deletes a child record and redirects to the page of its parent, which
/// `back` derives from the loaded record. Unknown ids redirect to
/// `fallback` with an error flash.
pub async fn delete_child_and_redirect<T: Record>(
    state: &AppState,
    raw_id: &str,
    fallback: &str,
    back: impl FnOnce(&T) -> String,
    notice: &str,
) -> Result<Redirect> {
    let record = match load::<T>(state, raw_id).await {
        Ok(record) => record,
        Err(AppError::NotFound(label)) => {
            return Ok(redirect_error(fallback, &format!("{label} not found!")))
        }
        Err(e) => return Err(e),
    };
    delete_and_redirect::<T>(state, raw_id, &back(&record), notice).await
}

/// Looks up a record by its raw path id.
pub async fn load<T: Record>(state: &AppState, raw_id: &str) -> Result<T> {
    let id = EntityId::parse(raw_id, T::LABEL)?;
    state.repository.get::<T>(id).await
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    pub async fn app() -> (Router, SharedState) {
        let repository = Repository::in_memory().await.unwrap();
        let state = AppState::new(repository, None, Config::in_memory());
        (router(state.clone()), state)
    }

    pub fn form_body(pairs: &[(&str, &str)]) -> String {
        pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub async fn post_form(app: &Router, uri: &str, pairs: &[(&str, &str)]) -> (StatusCode, String) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form_body(pairs)))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = location.unwrap_or_else(|| String::from_utf8_lossy(&body).to_string());
        (status, text)
    }

    pub async fn post_multipart(
        app: &Router,
        uri: &str,
        fields: &[(&str, &str)],
        file: (&str, &str, &[u8]),
    ) -> StatusCode {
        let boundary = "X-PREP-PORTAL-BOUNDARY";
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        let (name, file_name, bytes) = file;
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let request = Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        app.clone().oneshot(request).await.unwrap().status()
    }

    pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::testing::*;
    use super::*;

    #[test]
    fn flash_messages_are_url_encoded() {
        let redirect = redirect_notice("/manage/notes", "Note added & saved!");
        let response = axum::response::IntoResponse::into_response(redirect);
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()["location"],
            "/manage/notes?notice=Note%20added%20%26%20saved%21"
        );
    }

    #[tokio::test]
    async fn listing_echoes_the_flash() {
        let (app, _) = app().await;
        let (status, body) = get_json(&app, "/manage/quizzes?notice=Saved").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notice"], "Saved");
        assert!(body.get("error").is_none());
        assert_eq!(body["items"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_app_runs_on_an_in_memory_database() {
        let (_, state) = app().await;
        assert_eq!(state.config.db_path, ":memory:");
    }

    #[tokio::test]
    async fn upload_without_storage_is_bad_gateway() {
        let (app, state) = app().await;
        let status = post_multipart(
            &app,
            "/manage/notes",
            &[("title", "Constitution")],
            ("file", "constitution.pdf", b"%PDF-1.4"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            state
                .repository
                .count::<crate::models::Note>()
                .await
                .unwrap(),
            0
        );
    }
}
