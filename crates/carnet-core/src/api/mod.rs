//! REST client for the notes/tasks backend.
//!
//! Every data call takes the bearer token explicitly; the session itself is
//! owned by [`SessionGate`](crate::session::SessionGate). An HTTP 401 maps to
//! [`Error::Unauthorized`] so callers can sign out.

use std::fmt;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::ApiEndpoints;
use crate::error::{Error, Result};
use crate::models::{
    Category, CategoryDraft, Note, NoteDraft, NoteId, Task, TaskDraft, TaskId, User,
};
use crate::util::compact_text;
use crate::validation::{validate_login, validate_qr_login_url};

/// Token and profile returned by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub user: User,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("access_token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// Body of a create/update/delete response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation<T> {
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> Default for Mutation<T> {
    fn default() -> Self {
        Self {
            data: None,
            message: None,
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    endpoints: ApiEndpoints,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            endpoints: ApiEndpoints::new(base_url)?,
            client: Client::builder().build()?,
        })
    }

    pub const fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    /// Exchange email/password for credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<Credentials> {
        validate_login(email, password)?;

        let payload = serde_json::json!({
            "email": email,
            "password": password,
        });
        let request = self
            .client
            .post(&self.endpoints.login)
            .header("Accept", "application/json")
            .json(&payload);
        send_login_request(request).await
    }

    /// Follow a scanned QR login URL.
    pub async fn qr_login(&self, url: &str) -> Result<Credentials> {
        validate_qr_login_url(url)?;

        let request = self
            .client
            .get(url.trim())
            .header("Accept", "application/json");
        send_login_request(request).await
    }

    pub async fn list_notes(&self, token: &str) -> Result<Vec<Note>> {
        let request = self.client.get(&self.endpoints.notes);
        fetch_data(request, token).await
    }

    pub async fn get_note(&self, token: &str, id: NoteId) -> Result<Note> {
        let request = self.client.get(self.endpoints.note(id));
        fetch_data(request, token).await
    }

    pub async fn create_note(&self, token: &str, draft: &NoteDraft) -> Result<Mutation<Note>> {
        draft.validate()?;
        let request = self.client.post(&self.endpoints.notes).json(draft);
        mutate(request, token).await
    }

    pub async fn update_note(
        &self,
        token: &str,
        id: NoteId,
        draft: &NoteDraft,
    ) -> Result<Mutation<Note>> {
        draft.validate()?;
        let request = self.client.put(self.endpoints.note(id)).json(draft);
        mutate(request, token).await
    }

    pub async fn delete_note(&self, token: &str, id: NoteId) -> Result<Mutation<Note>> {
        let request = self.client.delete(self.endpoints.note(id));
        mutate(request, token).await
    }

    pub async fn list_categories(&self, token: &str) -> Result<Vec<Category>> {
        let request = self.client.get(&self.endpoints.categories);
        fetch_data(request, token).await
    }

    pub async fn create_category(
        &self,
        token: &str,
        draft: &CategoryDraft,
    ) -> Result<Mutation<Category>> {
        draft.validate()?;
        let request = self.client.post(&self.endpoints.categories).json(draft);
        mutate(request, token).await
    }

    pub async fn list_tasks(&self, token: &str) -> Result<Vec<Task>> {
        let request = self.client.get(&self.endpoints.tasks);
        fetch_data(request, token).await
    }

    pub async fn get_task(&self, token: &str, id: TaskId) -> Result<Task> {
        let request = self.client.get(self.endpoints.task(id));
        fetch_data(request, token).await
    }

    /// Blank subtasks are dropped before the draft is sent.
    pub async fn create_task(&self, token: &str, draft: TaskDraft) -> Result<Mutation<Task>> {
        let draft = draft.normalized()?;
        let request = self.client.post(&self.endpoints.tasks).json(&draft);
        mutate(request, token).await
    }

    pub async fn update_task(
        &self,
        token: &str,
        id: TaskId,
        draft: TaskDraft,
    ) -> Result<Mutation<Task>> {
        let draft = draft.normalized()?;
        let request = self.client.put(self.endpoints.task(id)).json(&draft);
        mutate(request, token).await
    }

    pub async fn delete_task(&self, token: &str, id: TaskId) -> Result<Mutation<Task>> {
        let request = self.client.delete(self.endpoints.task(id));
        mutate(request, token).await
    }

    /// Flip the completion flag of a task server-side.
    pub async fn toggle_task(&self, token: &str, id: TaskId) -> Result<Mutation<Task>> {
        let request = self.client.patch(self.endpoints.task_toggle(id));
        mutate(request, token).await
    }
}

async fn send_login_request(request: RequestBuilder) -> Result<Credentials> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    parse_login_response(status, &body)
}

async fn fetch_data<T: DeserializeOwned>(request: RequestBuilder, token: &str) -> Result<T> {
    let response = send_authorized(request, token).await?;
    let envelope = response.json::<DataEnvelope<T>>().await?;
    Ok(envelope.data)
}

async fn mutate<T: DeserializeOwned>(request: RequestBuilder, token: &str) -> Result<Mutation<T>> {
    let response = send_authorized(request, token).await?;
    let body = response.text().await?;
    Ok(parse_mutation(&body))
}

async fn send_authorized(request: RequestBuilder, token: &str) -> Result<Response> {
    let response = request
        .bearer_auth(token)
        .header("Accept", "application/json")
        .send()
        .await?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::Unauthorized);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Api(parse_api_error(status, &body)));
    }
    Ok(response)
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct MutationEnvelope<T> {
    data: Option<T>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: Option<String>,
    user: Option<serde_json::Value>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
    error: Option<String>,
}

fn parse_login_response(status: StatusCode, body: &str) -> Result<Credentials> {
    let Ok(payload) = serde_json::from_str::<LoginResponse>(body) else {
        if status.is_success() {
            return Err(Error::Api("invalid JSON in login response".to_string()));
        }
        return Err(Error::Api(parse_api_error(status, body)));
    };

    let token = payload
        .access_token
        .filter(|token| !token.trim().is_empty());
    let Some(access_token) = token.filter(|_| status.is_success()) else {
        let message = payload
            .message
            .map(|message| compact_text(&message))
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| {
                if status.is_success() {
                    "login response did not include an access token".to_string()
                } else {
                    format!("authentication failed (HTTP {})", status.as_u16())
                }
            });
        return Err(Error::Api(message));
    };

    let raw_user = payload
        .user
        .ok_or_else(|| Error::Api("login response did not include a user profile".to_string()))?;
    let user = serde_json::from_value::<User>(raw_user)
        .map_err(Error::from)
        .and_then(|user| user.validate().map(|()| user))
        .map_err(|error| Error::Api(format!("login response user is unusable: {error}")))?;

    Ok(Credentials { access_token, user })
}

fn parse_mutation<T: DeserializeOwned>(body: &str) -> Mutation<T> {
    if body.trim().is_empty() {
        return Mutation::default();
    }
    match serde_json::from_str::<MutationEnvelope<T>>(body) {
        Ok(envelope) => Mutation {
            data: envelope.data,
            message: envelope.message,
        },
        Err(error) => {
            tracing::debug!("Ignoring unrecognized mutation response body: {error}");
            Mutation::default()
        }
    }
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ErrorResponse>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", compact_text(&message), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
