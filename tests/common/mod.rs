#![allow(dead_code)]

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use morningrise::models::{Session, User};
use morningrise::{App, ClientConfig, SessionStore};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TOKEN: &str = "tok-123";
pub const NEW_TOKEN: &str = "tok-new";
pub const PASSWORD: &str = "secret";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub uri: String,
    pub authorization: Option<String>,
    pub body: Value,
}

/// A canned reply that takes precedence over the mock's normal behaviour.
#[derive(Debug, Clone)]
pub struct Step {
    pub status: u16,
    pub delay: Duration,
    pub body: String,
}

impl Step {
    pub fn json(status: u16, body: Value) -> Self {
        Self::raw(status, &body.to_string())
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            delay: Duration::ZERO,
            body: body.to_string(),
        }
    }

    pub fn delayed(mut self, millis: u64) -> Self {
        self.delay = Duration::from_millis(millis);
        self
    }
}

struct Backend {
    requests: Vec<Recorded>,
    scripts: HashMap<String, VecDeque<Step>>,
    world: Value,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            requests: Vec::new(),
            scripts: HashMap::new(),
            world: default_world(),
        }
    }
}

fn default_world() -> Value {
    json!({
        "user": {"name": "Ada", "email": "ada@example.com", "phone": "555-0100"},
        "checklist": {"hydrate": false, "meditate": false, "stretch_move": false},
        "mood": null,
        "intention": "",
        "streak": {"current_streak": 3, "longest_streak": 8},
        "sleep": null,
        "history": [
            {"date": "2026-10-18", "total_hours": 7.5, "deep_sleep_hours": 1.5, "rem_hours": 2.0},
            {"date": "2026-10-17", "total_hours": 5.5}
        ],
        "settings": {
            "theme_color": "orange",
            "interface_mode": "light",
            "morning_reminders": true,
            "weekly_reports": true,
            "sound_alerts": false
        },
        "weekly": {
            "checklistData": [
                {"hydrate": true, "meditate": true, "stretch_move": true},
                {"hydrate": true, "meditate": false, "stretch_move": true},
                {"hydrate": false, "meditate": false, "stretch_move": true}
            ],
            "moodData": [{"date": "2026-10-12", "mood": 1}, {"date": "2026-10-13", "mood": 2}],
            "sleepData": [
                {"date": "2026-10-12", "total_hours": 8.0},
                {"date": "2026-10-13", "total_hours": 6.0}
            ],
            "weekRange": {"start": "2026-10-12", "end": "2026-10-18"},
            "streak": {"current_streak": 7, "longest_streak": 12},
            "consistencyPercentage": 78,
            "avgSleepHours": 7.2,
            "milestones": ["7 Day Streak", "Hydration Hero"]
        }
    })
}

/// In-process stand-in for the MorningRise backend.
#[derive(Clone)]
pub struct MockBackend {
    pub base_url: String,
    inner: Arc<Mutex<Backend>>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let inner = Arc::new(Mutex::new(Backend::default()));
        let app = Router::new().fallback(handle).with_state(Arc::clone(&inner));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend stopped");
        });
        Self {
            base_url: format!("http://{addr}"),
            inner,
        }
    }

    /// Runs the backend on its own thread and runtime, for callers that block.
    pub fn start_detached() -> Self {
        let (sender, receiver) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("mock runtime");
            runtime.block_on(async move {
                let backend = MockBackend::start().await;
                sender.send(backend).expect("hand back mock backend");
                std::future::pending::<()>().await;
            });
        });
        receiver.recv().expect("mock backend started")
    }

    pub fn script(&self, method: &str, path: &str, step: Step) {
        self.inner
            .lock()
            .unwrap()
            .scripts
            .entry(format!("{method} {path}"))
            .or_default()
            .push_back(step);
    }

    pub fn set_world(&self, key: &str, value: Value) {
        self.inner.lock().unwrap().world[key] = value;
    }

    pub fn world(&self, key: &str) -> Value {
        self.inner.lock().unwrap().world[key].clone()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn last(&self, method: &str, path: &str) -> Option<Recorded> {
        self.requests_to(method, path).pop()
    }
}

async fn handle(
    State(inner): State<Arc<Mutex<Backend>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let scripted = {
        let mut backend = inner.lock().unwrap();
        backend.requests.push(Recorded {
            method: method.to_string(),
            path: path.clone(),
            uri: uri.to_string(),
            authorization: authorization.clone(),
            body: body.clone(),
        });
        backend
            .scripts
            .get_mut(&format!("{method} {path}"))
            .and_then(VecDeque::pop_front)
    };

    if let Some(step) = scripted {
        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }
        return reply(step.status, step.body);
    }

    let (status, payload) = respond(
        &mut inner.lock().unwrap().world,
        method.as_str(),
        &path,
        authorization.as_deref(),
        body,
    );
    reply(status, payload.to_string())
}

fn reply(status: u16, body: String) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn authorized(authorization: Option<&str>) -> bool {
    matches!(
        authorization.and_then(|value| value.strip_prefix("Bearer ")),
        Some(TOKEN) | Some(NEW_TOKEN)
    )
}

fn respond(
    world: &mut Value,
    method: &str,
    path: &str,
    authorization: Option<&str>,
    body: Value,
) -> (u16, Value) {
    match (method, path) {
        ("POST", "/api/auth/signin") => {
            if body["password"] != PASSWORD {
                return (401, json!({"message": "Invalid credentials"}));
            }
            world["user"]["email"] = body["email"].clone();
            (200, json!({"user": world["user"], "token": TOKEN}))
        }
        ("POST", "/api/auth/signup") => {
            if body["email"] == "taken@example.com" {
                return (400, json!({"message": "User already exists"}));
            }
            world["user"] = json!({
                "name": body["name"],
                "email": body["email"],
                "phone": body["phone"],
            });
            (201, json!({"user": world["user"], "token": NEW_TOKEN}))
        }
        _ if !authorized(authorization) => (401, json!({"message": "Invalid token"})),
        ("GET", "/api/dashboard") => (
            200,
            json!({
                "checklist": world["checklist"],
                "mood": world["mood"],
                "dailyIntention": world["intention"],
                "streak": world["streak"],
                "sleep": world["sleep"],
            }),
        ),
        ("PUT", "/api/dashboard/checklist") => {
            let perfect = ["hydrate", "meditate", "stretch_move"]
                .iter()
                .all(|task| body[*task] == true);
            world["checklist"] = body;
            if perfect {
                let current = world["streak"]["current_streak"].as_u64().unwrap_or(0);
                world["streak"]["current_streak"] = json!(current + 1);
            }
            (200, json!({"message": "Checklist updated"}))
        }
        ("PUT", "/api/dashboard/mood") => {
            world["mood"] = body["mood"].clone();
            (200, json!({"message": "Mood updated"}))
        }
        ("PUT", "/api/dashboard/intention") => {
            world["intention"] = body["intention"].clone();
            (200, json!({"message": "Intention updated"}))
        }
        ("PUT", "/api/dashboard/sleep") => {
            let mut record = body;
            record["date"] = json!("2026-10-19");
            world["sleep"] = record.clone();
            if let Some(history) = world["history"].as_array_mut() {
                history.insert(0, record.clone());
            }
            (200, json!({"message": "Sleep data saved", "sleep": record}))
        }
        ("GET", "/api/dashboard/sleep/history") => {
            (200, json!({"sleepHistory": world["history"]}))
        }
        ("GET", "/api/weekly") => (200, world["weekly"].clone()),
        ("POST", "/api/weekly/generate-report") => (
            200,
            json!({"message": format!("Weekly report sent to {}", world["user"]["email"].as_str().unwrap_or("you"))}),
        ),
        ("GET", "/api/settings") => (
            200,
            json!({
                "user": world["user"],
                "settings": world["settings"],
                "profile": {"phone": world["user"]["phone"]},
            }),
        ),
        ("PUT", "/api/settings/profile") => {
            world["user"]["name"] = body["name"].clone();
            world["user"]["phone"] = body["phone"].clone();
            (200, json!({"message": "Profile updated"}))
        }
        ("PUT", "/api/settings/notifications") => match body["type"].as_str() {
            Some(kind) => {
                world["settings"][kind] = body["enabled"].clone();
                (200, json!({"message": "Notification updated"}))
            }
            None => (400, json!({"message": "Missing notification type"})),
        },
        ("PUT", "/api/settings/settings") => {
            world["settings"] = body;
            (200, json!({"message": "Settings updated"}))
        }
        _ => (404, json!({"message": "Not found"})),
    }
}

pub fn config(base_url: &str, session_path: &Path) -> ClientConfig {
    ClientConfig::from_lookup(|_| None)
        .with_api_url(base_url)
        .with_session_path(session_path)
}

pub fn session_file(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("session.json")
}

/// Persists a signed-in session for Ada before the app is opened.
pub async fn seed_session(path: &Path) -> Session {
    let session = Session {
        token: TOKEN.to_string(),
        user: User {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: Some("555-0100".to_string()),
        },
    };
    SessionStore::empty(path)
        .set(session.clone())
        .await
        .expect("seed session");
    session
}

pub async fn signed_in_app(mock: &MockBackend, dir: &tempfile::TempDir) -> App {
    let path = session_file(dir);
    seed_session(&path).await;
    App::open(&config(&mock.base_url, &path)).await
}
