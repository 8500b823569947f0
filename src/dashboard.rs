use crate::errors::ClientError;
use crate::models::{
    Checklist, DashboardResponse, Mood, SleepHistoryResponse, SleepInput, SleepRecord, Streak,
    TaskKey,
};
use crate::mutation::{Optimistic, mutate};
use crate::projector::{SleepQuality, sleep_history_bands, sleep_ring_percent};
use crate::state::{AppContext, Shared, claim, release, shared};
use tracing::{error, info, warn};

pub const SLEEP_HISTORY_DAYS: u32 = 7;
pub const SLEEP_PREVIEW_DAYS: usize = 5;
pub const DEFAULT_INTENTION: &str =
    "Today, I will focus on being present and mindful in every conversation.";

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub checklist: Optimistic<Checklist>,
    pub mood: Optimistic<Option<Mood>>,
    pub intention: String,
    pub streak: Streak,
    pub sleep: Option<SleepRecord>,
    pub sleep_history: Vec<SleepRecord>,
    pub loading: bool,
    pub saving: bool,
}

impl DashboardState {
    /// Applies the dashboard and sleep-history responses as one snapshot.
    fn apply(&mut self, dashboard: DashboardResponse, history: Option<SleepHistoryResponse>) {
        if let Some(checklist) = dashboard.checklist {
            self.checklist.hydrate(checklist);
        }
        match dashboard.mood.map(Mood::from_value) {
            Some(Ok(mood)) => self.mood.hydrate(Some(mood)),
            Some(Err(_)) => warn!(mood = ?dashboard.mood, "ignoring out-of-range mood"),
            None => {}
        }
        if let Some(intention) = dashboard.daily_intention.filter(|text| !text.is_empty()) {
            self.intention = intention;
        }
        if let Some(streak) = dashboard.streak {
            self.streak = streak;
        }
        if dashboard.sleep.is_some() {
            self.sleep = dashboard.sleep;
        }
        if let Some(history) = history {
            self.sleep_history = history.sleep_history;
        }
    }
}

/// Plain read-out of the dashboard for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub checklist: Checklist,
    pub mood_index: Option<u8>,
    pub intention: String,
    pub streak: Streak,
    pub sleep: Option<SleepRecord>,
    pub sleep_quality: SleepQuality,
    pub sleep_ring_percent: f64,
    pub sleep_history: Vec<(Option<String>, f64, SleepQuality)>,
    pub loading: bool,
    pub saving: bool,
}

#[derive(Clone)]
pub struct Dashboard {
    ctx: AppContext,
    state: Shared<DashboardState>,
}

impl Dashboard {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            state: shared(DashboardState::default()),
        }
    }

    pub async fn state(&self) -> DashboardState {
        self.state.lock().await.clone()
    }

    pub async fn view(&self) -> DashboardView {
        let state = self.state.lock().await;
        let total = state.sleep.as_ref().map(|sleep| sleep.total_hours);
        let bands = sleep_history_bands(&state.sleep_history, SLEEP_PREVIEW_DAYS);
        DashboardView {
            checklist: *state.checklist.get(),
            mood_index: state.mood.get().map(Mood::index),
            intention: if state.intention.trim().is_empty() {
                DEFAULT_INTENTION.to_string()
            } else {
                state.intention.clone()
            },
            streak: state.streak,
            sleep: state.sleep.clone(),
            sleep_quality: SleepQuality::from_hours(total),
            sleep_ring_percent: total.map(sleep_ring_percent).unwrap_or(0.0),
            sleep_history: state
                .sleep_history
                .iter()
                .zip(bands)
                .map(|(day, band)| (day.date.clone(), day.total_hours, band))
                .collect(),
            loading: state.loading,
            saving: state.saving,
        }
    }

    /// Fetches the dashboard and sleep history together and applies them as one update.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        self.ctx.require_session()?;
        claim(&self.state, |s: &mut DashboardState| &mut s.loading, "loading").await?;

        let api = &self.ctx.api;
        let (dashboard, history) = tokio::join!(api.dashboard(), api.sleep_history(SLEEP_HISTORY_DAYS));
        let history = self.ctx.authorize(history).await;
        let dashboard = self.ctx.authorize(dashboard).await;
        // An expired session on either call abandons the whole update.
        let result = match (dashboard, history) {
            (Err(ClientError::SessionExpired), _) | (_, Err(ClientError::SessionExpired)) => {
                Err(ClientError::SessionExpired)
            }
            (Ok(dashboard), history) => {
                let history = history
                    .inspect_err(|err| warn!("failed to fetch sleep history: {err}"))
                    .ok();
                self.state.lock().await.apply(dashboard, history);
                Ok(())
            }
            (Err(err), _) => {
                error!("failed to fetch dashboard data: {err}");
                Err(err)
            }
        };

        release(&self.state, |s: &mut DashboardState| &mut s.loading).await;
        result
    }

    pub async fn refresh_sleep_history(&self) -> Result<(), ClientError> {
        self.ctx.require_session()?;
        let history = self
            .ctx
            .authorize(self.ctx.api.sleep_history(SLEEP_HISTORY_DAYS).await)
            .await?;
        self.state.lock().await.sleep_history = history.sleep_history;
        Ok(())
    }

    /// Flips one task immediately, sends the whole checklist, and reverts if
    /// the server refuses. On success the streak is re-read.
    pub async fn toggle_task(&self, key: TaskKey) -> Result<(), ClientError> {
        self.ctx.require_session()?;
        if self.state.lock().await.loading {
            return Err(ClientError::Busy("loading"));
        }

        let api = &self.ctx.api;
        let outcome = mutate(
            &self.state,
            |s: &mut DashboardState| &mut s.checklist,
            |checklist| checklist.toggled(key),
            |s| {
                let body = *s.checklist.get();
                async move { api.update_checklist(&body).await }
            },
        )
        .await;
        if let Err(err) = self.ctx.authorize(outcome).await {
            error!("failed to update checklist: {err}");
            return Err(err);
        }

        // A failed streak refresh leaves the old streak on screen; the checklist stands.
        match self.ctx.authorize(api.dashboard().await).await {
            Ok(DashboardResponse {
                streak: Some(streak),
                ..
            }) => self.state.lock().await.streak = streak,
            Ok(_) => {}
            Err(ClientError::SessionExpired) => return Err(ClientError::SessionExpired),
            Err(err) => warn!("checklist saved but streak refresh failed: {err}"),
        }
        Ok(())
    }

    /// `index` is the zero-based picker position; the backend receives `index + 1`.
    pub async fn select_mood(&self, index: u8) -> Result<(), ClientError> {
        let mood = Mood::from_index(index)?;
        self.ctx.require_session()?;

        let api = &self.ctx.api;
        let outcome = mutate(
            &self.state,
            |s: &mut DashboardState| &mut s.mood,
            |_| Some(mood),
            |_| async move { api.update_mood(mood).await },
        )
        .await;
        self.ctx.authorize(outcome).await.map(|_| ()).inspect_err(|err| {
            error!("failed to update mood: {err}");
        })
    }

    pub async fn set_intention(&self, text: impl Into<String>) {
        self.state.lock().await.intention = text.into();
    }

    pub async fn save_intention(&self) -> Result<(), ClientError> {
        let intention = self.state.lock().await.intention.trim().to_string();
        if intention.is_empty() {
            return Err(ClientError::validation("Please write an intention first"));
        }
        self.ctx.require_session()?;
        claim(&self.state, |s: &mut DashboardState| &mut s.saving, "saving").await?;

        let result = self
            .ctx
            .authorize(self.ctx.api.update_intention(&intention).await)
            .await;
        release(&self.state, |s: &mut DashboardState| &mut s.saving).await;

        match result {
            Ok(_) => {
                info!("intention saved");
                Ok(())
            }
            Err(err) => {
                error!("failed to save intention: {err}");
                Err(err)
            }
        }
    }

    /// Validates before anything is sent; invalid input never reaches the server.
    pub async fn save_sleep(&self, input: SleepInput) -> Result<SleepRecord, ClientError> {
        let record = input.validate()?;
        self.ctx.require_session()?;
        claim(&self.state, |s: &mut DashboardState| &mut s.saving, "saving").await?;

        let result = self
            .ctx
            .authorize(self.ctx.api.update_sleep(&record).await)
            .await;
        release(&self.state, |s: &mut DashboardState| &mut s.saving).await;

        let saved = match result {
            Ok(response) => response.sleep.unwrap_or(record),
            Err(err) => {
                error!("failed to save sleep data: {err}");
                return Err(err);
            }
        };
        info!(hours = saved.total_hours, "sleep data saved");
        self.state.lock().await.sleep = Some(saved.clone());

        if let Err(err) = self.refresh_sleep_history().await {
            warn!("failed to refresh sleep history: {err}");
        }
        Ok(saved)
    }
}
