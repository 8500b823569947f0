use crate::errors::ClientError;
use crate::models::{Session, User};
use crate::storage::{load_session, persist_session, remove_session};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::watch;
use tracing::{error, info};

/// Process-wide holder of the signed-in session.
///
/// Cloning is cheap and every clone observes the same session. Views that need
/// to react to sign-in or sign-out call [`SessionStore::subscribe`].
#[derive(Clone)]
pub struct SessionStore {
    path: PathBuf,
    current: Arc<watch::Sender<Option<Session>>>,
}

impl SessionStore {
    /// Opens the store and hydrates it from the session file.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let store = Self::empty(path);
        store.load().await;
        store
    }

    /// A store with nothing loaded yet.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            path: path.into(),
            current: Arc::new(sender),
        }
    }

    /// Re-reads the persisted session and publishes it.
    pub async fn load(&self) -> Option<Session> {
        let session = load_session(&self.path).await;
        self.current.send_replace(session.clone());
        session
    }

    pub fn current(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current
            .borrow()
            .as_ref()
            .map(|session| session.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Persists first; the in-memory session only changes once the file is written.
    pub async fn set(&self, session: Session) -> Result<(), ClientError> {
        persist_session(&self.path, &session).await?;
        info!(email = %session.user.email, "session started");
        self.current.send_replace(Some(session));
        Ok(())
    }

    /// Drops the in-memory session immediately, then removes the file.
    pub async fn clear(&self) -> Result<(), ClientError> {
        if self.current.send_replace(None).is_some() {
            info!("session cleared");
        }
        remove_session(&self.path).await.inspect_err(|err| {
            error!("failed to remove session file: {err}");
        })
    }

    /// Applies a profile edit to the stored user and persists it.
    pub async fn update_user(&self, edit: impl FnOnce(&mut User)) -> Result<(), ClientError> {
        let Some(mut session) = self.current() else {
            return Err(ClientError::SessionExpired);
        };
        edit(&mut session.user);
        self.set(session).await
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(token: &str) -> Session {
        Session {
            token: token.to_string(),
            user: User {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone: Some("555-0101".to_string()),
            },
        }
    }

    #[tokio::test]
    async fn set_then_clear_leaves_nothing_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path().join("session.json")).await;
        assert!(store.current().is_none());

        store.set(sample("tok-1")).await.unwrap();
        assert_eq!(store.token().as_deref(), Some("tok-1"));

        store.clear().await.unwrap();
        assert!(store.current().is_none());
        assert!(store.load().await.is_none());

        let reopened = SessionStore::open(store.path().to_path_buf()).await;
        assert!(!reopened.is_authenticated());
    }

    #[tokio::test]
    async fn reopening_hydrates_the_persisted_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        SessionStore::open(&path).await.set(sample("tok-2")).await.unwrap();

        let reopened = SessionStore::open(&path).await;
        assert_eq!(reopened.current(), Some(sample("tok-2")));
    }

    #[tokio::test]
    async fn subscribers_see_set_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path().join("session.json")).await;
        let mut updates = store.subscribe();

        store.set(sample("tok-3")).await.unwrap();
        updates.changed().await.unwrap();
        assert_eq!(updates.borrow_and_update().as_ref().map(|s| s.token.as_str()), Some("tok-3"));

        store.clear().await.unwrap();
        updates.changed().await.unwrap();
        assert!(updates.borrow_and_update().is_none());
    }

    #[tokio::test]
    async fn update_user_rewrites_the_stored_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = SessionStore::open(&path).await;
        store.set(sample("tok-4")).await.unwrap();

        store.update_user(|user| user.name = "Grace".to_string()).await.unwrap();

        let reopened = SessionStore::open(&path).await;
        let session = reopened.current().unwrap();
        assert_eq!(session.user.name, "Grace");
        assert_eq!(session.token, "tok-4");
    }

    #[tokio::test]
    async fn update_user_without_session_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path().join("session.json")).await;
        let result = store.update_user(|user| user.name.clear()).await;
        assert!(matches!(result, Err(ClientError::SessionExpired)));
    }
}
