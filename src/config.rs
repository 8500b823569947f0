use std::{env, path::PathBuf};

pub const DEFAULT_API_URL: &str = "https://good-morning-routine.onrender.com";
pub const DEFAULT_SESSION_PATH: &str = "data/session.json";

pub const API_URL_VAR: &str = "MORNINGRISE_API_URL";
pub const SESSION_PATH_VAR: &str = "MORNINGRISE_SESSION_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub session_path: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = lookup(API_URL_VAR)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let session_path = lookup(SESSION_PATH_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_PATH));

        Self {
            api_url: normalize_base(&api_url),
            session_path,
        }
    }

    pub fn with_api_url(mut self, api_url: impl AsRef<str>) -> Self {
        self.api_url = normalize_base(api_url.as_ref());
        self
    }

    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = path.into();
        self
    }
}

fn normalize_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
