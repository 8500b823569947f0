use crate::api::ApiClient;
use crate::auth::Auth;
use crate::config::ClientConfig;
use crate::dashboard::Dashboard;
use crate::nav::{Navigator, Route};
use crate::session::SessionStore;
use crate::settings::SettingsPage;
use crate::state::AppContext;
use crate::weekly::WeeklyReview;
use tracing::info;

/// Wires the session store, API client and navigator into the four views.
#[derive(Clone)]
pub struct App {
    ctx: AppContext,
    auth: Auth,
    dashboard: Dashboard,
    weekly: WeeklyReview,
    settings: SettingsPage,
}

impl App {
    /// Loads any persisted session and starts on the matching entry route.
    pub async fn open(config: &ClientConfig) -> Self {
        let session = SessionStore::open(config.session_path.clone()).await;
        let api = ApiClient::new(&config.api_url, session.clone());
        let start = if session.is_authenticated() {
            Route::Dashboard
        } else {
            Route::Landing
        };
        info!(api = %api.base_url(), route = %start, "client ready");
        Self::from_context(AppContext::new(api, session, Navigator::new(start)))
    }

    pub fn from_context(ctx: AppContext) -> Self {
        Self {
            auth: Auth::new(ctx.clone()),
            dashboard: Dashboard::new(ctx.clone()),
            weekly: WeeklyReview::new(ctx.clone()),
            settings: SettingsPage::new(ctx.clone()),
            ctx,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn route(&self) -> Route {
        self.ctx.navigator.current()
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn weekly(&self) -> &WeeklyReview {
        &self.weekly
    }

    pub fn settings(&self) -> &SettingsPage {
        &self.settings
    }
}
