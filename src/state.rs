use crate::api::ApiClient;
use crate::errors::ClientError;
use crate::models::Session;
use crate::nav::{Navigator, Route};
use crate::session::SessionStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Services shared by every view controller.
#[derive(Clone)]
pub struct AppContext {
    pub api: ApiClient,
    pub session: SessionStore,
    pub navigator: Navigator,
}

impl AppContext {
    pub fn new(api: ApiClient, session: SessionStore, navigator: Navigator) -> Self {
        Self {
            api,
            session,
            navigator,
        }
    }

    /// Fails with `SessionExpired` (and redirects) when nobody is signed in.
    pub fn require_session(&self) -> Result<Session, ClientError> {
        match self.session.current() {
            Some(session) => Ok(session),
            None => {
                warn!("no session; redirecting to {}", Route::Landing);
                self.navigator.navigate(Route::Landing);
                Err(ClientError::SessionExpired)
            }
        }
    }

    /// Clears the session and sends the user back to the landing page.
    pub async fn expire(&self) {
        if let Err(err) = self.session.clear().await {
            error!("failed to clear expired session: {err}");
        }
        self.navigator.navigate(Route::Landing);
    }

    /// Deliberate sign-out. Navigates away even if the session file could not be removed.
    pub async fn sign_out(&self) -> Result<(), ClientError> {
        let result = self.session.clear().await;
        self.navigator.navigate(Route::Landing);
        info!("signed out");
        result
    }

    /// Maps a 401 from any authenticated call to an expired session.
    pub async fn authorize<T>(&self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        match result {
            Err(err) if err.is_unauthorized() => {
                warn!("server rejected token; signing out");
                self.expire().await;
                Err(ClientError::SessionExpired)
            }
            other => other,
        }
    }
}

pub type Shared<S> = Arc<Mutex<S>>;

pub fn shared<S>(state: S) -> Shared<S> {
    Arc::new(Mutex::new(state))
}

/// Sets a busy flag, refusing if it is already set.
pub async fn claim<S>(
    state: &Mutex<S>,
    flag: impl Fn(&mut S) -> &mut bool,
    action: &'static str,
) -> Result<(), ClientError> {
    let mut guard = state.lock().await;
    let busy = flag(&mut *guard);
    if *busy {
        return Err(ClientError::Busy(action));
    }
    *busy = true;
    Ok(())
}

pub async fn release<S>(state: &Mutex<S>, flag: impl Fn(&mut S) -> &mut bool) {
    *flag(&mut *state.lock().await) = false;
}
