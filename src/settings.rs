use crate::errors::ClientError;
use crate::models::{
    InterfaceMode, NotificationKind, Profile, ProfileUpdate, Settings, SettingsResponse,
    ThemeColor, User,
};
use crate::mutation::{Optimistic, mutate};
use crate::state::{AppContext, Shared, claim, release, shared};
use tracing::{error, info};

/// Editable copy of the profile form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct SettingsState {
    pub user: Option<User>,
    pub profile: Profile,
    pub draft: ProfileDraft,
    pub theme_color: Optimistic<ThemeColor>,
    pub interface_mode: Optimistic<InterfaceMode>,
    pub morning_reminders: Optimistic<bool>,
    pub weekly_reports: Optimistic<bool>,
    pub sound_alerts: Optimistic<bool>,
    pub loading: bool,
    pub saving: bool,
}

impl Default for SettingsState {
    fn default() -> Self {
        let defaults = Settings::default();
        Self {
            user: None,
            profile: Profile::default(),
            draft: ProfileDraft::default(),
            theme_color: Optimistic::new(defaults.theme_color),
            interface_mode: Optimistic::new(defaults.interface_mode),
            morning_reminders: Optimistic::new(defaults.morning_reminders),
            weekly_reports: Optimistic::new(defaults.weekly_reports),
            sound_alerts: Optimistic::new(defaults.sound_alerts),
            loading: false,
            saving: false,
        }
    }
}

impl SettingsState {
    /// Settings as currently displayed, optimistic changes included.
    pub fn settings(&self) -> Settings {
        Settings {
            theme_color: *self.theme_color.get(),
            interface_mode: *self.interface_mode.get(),
            morning_reminders: *self.morning_reminders.get(),
            weekly_reports: *self.weekly_reports.get(),
            sound_alerts: *self.sound_alerts.get(),
        }
    }

    pub fn notification(&self, kind: NotificationKind) -> &Optimistic<bool> {
        match kind {
            NotificationKind::MorningReminders => &self.morning_reminders,
            NotificationKind::WeeklyReports => &self.weekly_reports,
            NotificationKind::SoundAlerts => &self.sound_alerts,
        }
    }

    fn notification_mut(&mut self, kind: NotificationKind) -> &mut Optimistic<bool> {
        match kind {
            NotificationKind::MorningReminders => &mut self.morning_reminders,
            NotificationKind::WeeklyReports => &mut self.weekly_reports,
            NotificationKind::SoundAlerts => &mut self.sound_alerts,
        }
    }

    fn hydrate(&mut self, settings: &Settings) {
        self.theme_color.hydrate(settings.theme_color);
        self.interface_mode.hydrate(settings.interface_mode);
        self.morning_reminders.hydrate(settings.morning_reminders);
        self.weekly_reports.hydrate(settings.weekly_reports);
        self.sound_alerts.hydrate(settings.sound_alerts);
    }

    fn apply(&mut self, response: SettingsResponse) {
        if let Some(settings) = &response.settings {
            self.hydrate(settings);
        }
        self.profile = response.profile.unwrap_or_default();
        self.draft = ProfileDraft {
            name: response.user.as_ref().map(|u| u.name.clone()).unwrap_or_default(),
            email: response.user.as_ref().map(|u| u.email.clone()).unwrap_or_default(),
            phone: self.profile.phone.clone().unwrap_or_default(),
        };
        self.user = response.user;
    }
}

#[derive(Clone)]
pub struct SettingsPage {
    ctx: AppContext,
    state: Shared<SettingsState>,
}

impl SettingsPage {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            state: shared(SettingsState::default()),
        }
    }

    pub async fn state(&self) -> SettingsState {
        self.state.lock().await.clone()
    }

    pub async fn refresh(&self) -> Result<(), ClientError> {
        self.ctx.require_session()?;
        claim(&self.state, |s: &mut SettingsState| &mut s.loading, "loading").await?;

        let result = self.ctx.authorize(self.ctx.api.settings().await).await;
        let result = match result {
            Ok(response) => {
                self.state.lock().await.apply(response);
                Ok(())
            }
            Err(err) => {
                error!("failed to fetch settings: {err}");
                Err(err)
            }
        };

        release(&self.state, |s: &mut SettingsState| &mut s.loading).await;
        result
    }

    pub async fn edit_name(&self, name: impl Into<String>) {
        self.state.lock().await.draft.name = name.into();
    }

    pub async fn edit_phone(&self, phone: impl Into<String>) {
        self.state.lock().await.draft.phone = phone.into();
    }

    /// Sends name and phone; the email is read-only. The stored session picks
    /// up the new name on success.
    pub async fn save_profile(&self) -> Result<(), ClientError> {
        self.ctx.require_session()?;
        let update = {
            let state = self.state.lock().await;
            ProfileUpdate {
                name: state.draft.name.trim().to_string(),
                phone: state.draft.phone.trim().to_string(),
            }
        };
        if update.name.is_empty() {
            return Err(ClientError::validation("Name cannot be empty"));
        }
        claim(&self.state, |s: &mut SettingsState| &mut s.saving, "saving").await?;

        let result = self
            .ctx
            .authorize(self.ctx.api.update_profile(&update).await)
            .await;
        release(&self.state, |s: &mut SettingsState| &mut s.saving).await;
        if let Err(err) = result {
            error!("failed to update profile: {err}");
            return Err(err);
        }

        {
            let mut state = self.state.lock().await;
            if let Some(user) = state.user.as_mut() {
                user.name = update.name.clone();
            }
            state.profile.phone = Some(update.phone.clone()).filter(|phone| !phone.is_empty());
        }
        let name = update.name;
        self.ctx
            .session
            .update_user(|user| user.name = name)
            .await?;
        info!("profile updated");
        Ok(())
    }

    pub async fn toggle_notification(&self, kind: NotificationKind) -> Result<(), ClientError> {
        self.change_notification(kind, |enabled| !enabled).await
    }

    pub async fn set_notification(
        &self,
        kind: NotificationKind,
        enabled: bool,
    ) -> Result<(), ClientError> {
        self.change_notification(kind, move |_| enabled).await
    }

    async fn change_notification(
        &self,
        kind: NotificationKind,
        next: impl FnOnce(&bool) -> bool,
    ) -> Result<(), ClientError> {
        self.ctx.require_session()?;
        let api = &self.ctx.api;
        let outcome = mutate(
            &self.state,
            move |s: &mut SettingsState| s.notification_mut(kind),
            next,
            |s| {
                let enabled = *s.notification(kind).get();
                async move { api.update_notification(kind, enabled).await }
            },
        )
        .await;
        self.finish(outcome, kind.as_str()).await
    }

    /// The server expects the full settings object, so the body carries every field.
    pub async fn change_theme(&self, color: ThemeColor) -> Result<(), ClientError> {
        self.ctx.require_session()?;
        let api = &self.ctx.api;
        let outcome = mutate(
            &self.state,
            |s: &mut SettingsState| &mut s.theme_color,
            |_| color,
            |s| {
                let body = s.settings();
                async move { api.update_settings(&body).await }
            },
        )
        .await;
        self.finish(outcome, "theme_color").await
    }

    pub async fn change_interface_mode(&self, mode: InterfaceMode) -> Result<(), ClientError> {
        self.ctx.require_session()?;
        let api = &self.ctx.api;
        let outcome = mutate(
            &self.state,
            |s: &mut SettingsState| &mut s.interface_mode,
            |_| mode,
            |s| {
                let body = s.settings();
                async move { api.update_settings(&body).await }
            },
        )
        .await;
        self.finish(outcome, "interface_mode").await
    }

    pub async fn save_settings(&self) -> Result<(), ClientError> {
        self.ctx.require_session()?;
        claim(&self.state, |s: &mut SettingsState| &mut s.saving, "saving").await?;
        let body = self.state.lock().await.settings();

        let result = self
            .ctx
            .authorize(self.ctx.api.update_settings(&body).await)
            .await;
        release(&self.state, |s: &mut SettingsState| &mut s.saving).await;

        match result {
            Ok(_) => {
                self.state.lock().await.hydrate(&body);
                info!("settings saved");
                Ok(())
            }
            Err(err) => {
                error!("failed to save settings: {err}");
                Err(err)
            }
        }
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.ctx.sign_out().await
    }

    async fn finish<R>(
        &self,
        outcome: Result<R, ClientError>,
        setting: &str,
    ) -> Result<(), ClientError> {
        match self.ctx.authorize(outcome).await {
            Ok(_) => {
                info!(setting, "setting updated");
                Ok(())
            }
            Err(err) => {
                error!(setting, "failed to update setting: {err}");
                Err(err)
            }
        }
    }
}
