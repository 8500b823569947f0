use crate::errors::ClientError;
use crate::models::{
    AuthResponse, Checklist, DashboardResponse, IntentionUpdate, MessageResponse, Mood, MoodUpdate,
    NotificationKind, NotificationUpdate, ProfileUpdate, Settings, SettingsResponse, SignInRequest,
    SignUpRequest, SleepHistoryResponse, SleepRecord, SleepSaveResponse, WeeklyReport,
};
use crate::session::SessionStore;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

/// Thin JSON client for the MorningRise backend.
///
/// Attaches the bearer token from the [`SessionStore`] whenever one is set and
/// never retries. A 401 comes back as an ordinary [`ClientError::Http`]; the
/// view controllers decide what it means.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(base_url: impl AsRef<str>, session: SessionStore) -> Self {
        Self {
            http: Client::new(),
            base: base_url.as_ref().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        self.send(method, path, body, true).await
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authenticated: bool,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base, path);
        debug!("{method} {url}");

        let mut request = self.http.request(method, &url);
        if authenticated {
            if let Some(token) = self.session.token() {
                request = request.bearer_auth(token);
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(ClientError::http(status, error_message(status, &bytes)));
        }
        decode(&bytes)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send::<Value, T>(Method::GET, path, None, true).await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(Method::PUT, path, Some(body), true).await
    }

    pub async fn sign_in(&self, body: &SignInRequest) -> Result<AuthResponse, ClientError> {
        self.send(Method::POST, "/api/auth/signin", Some(body), false).await
    }

    pub async fn sign_up(&self, body: &SignUpRequest) -> Result<AuthResponse, ClientError> {
        self.send(Method::POST, "/api/auth/signup", Some(body), false).await
    }

    pub async fn dashboard(&self) -> Result<DashboardResponse, ClientError> {
        self.get("/api/dashboard").await
    }

    pub async fn update_checklist(&self, checklist: &Checklist) -> Result<Value, ClientError> {
        self.put("/api/dashboard/checklist", checklist).await
    }

    pub async fn update_mood(&self, mood: Mood) -> Result<Value, ClientError> {
        self.put("/api/dashboard/mood", &MoodUpdate { mood }).await
    }

    pub async fn update_intention(&self, intention: &str) -> Result<Value, ClientError> {
        self.put("/api/dashboard/intention", &IntentionUpdate { intention })
            .await
    }

    pub async fn update_sleep(&self, record: &SleepRecord) -> Result<SleepSaveResponse, ClientError> {
        self.put::<_, Option<SleepSaveResponse>>("/api/dashboard/sleep", record)
            .await
            .map(Option::unwrap_or_default)
    }

    pub async fn sleep_history(&self, days: u32) -> Result<SleepHistoryResponse, ClientError> {
        self.get(&format!("/api/dashboard/sleep/history?days={days}"))
            .await
    }

    pub async fn weekly(&self) -> Result<WeeklyReport, ClientError> {
        self.get("/api/weekly").await
    }

    pub async fn generate_report(&self) -> Result<MessageResponse, ClientError> {
        self.send::<Value, Option<MessageResponse>>(
            Method::POST,
            "/api/weekly/generate-report",
            None,
            true,
        )
        .await
        .map(Option::unwrap_or_default)
    }

    pub async fn settings(&self) -> Result<SettingsResponse, ClientError> {
        self.get("/api/settings").await
    }

    pub async fn update_profile(&self, profile: &ProfileUpdate) -> Result<Value, ClientError> {
        self.put("/api/settings/profile", profile).await
    }

    pub async fn update_notification(
        &self,
        kind: NotificationKind,
        enabled: bool,
    ) -> Result<Value, ClientError> {
        self.put(
            "/api/settings/notifications",
            &NotificationUpdate { kind, enabled },
        )
        .await
    }

    pub async fn update_settings(&self, settings: &Settings) -> Result<Value, ClientError> {
        self.put("/api/settings/settings", settings).await
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ClientError> {
    // Some update endpoints answer 204 or an empty 200.
    let bytes = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        bytes
    };
    serde_json::from_slice(bytes).map_err(|err| ClientError::MalformedBody(err.to_string()))
}

fn error_message(status: StatusCode, bytes: &[u8]) -> String {
    serde_json::from_slice::<MessageResponse>(bytes)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| match status.canonical_reason() {
            Some(reason) => reason.to_string(),
            None => format!("HTTP error! status: {}", status.as_u16()),
        })
}
