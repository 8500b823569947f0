use crate::errors::ClientError;
use crate::models::WeeklyReport;
use crate::projector::{WeeklyView, project_week, project_week_at};
use crate::state::{AppContext, Shared, claim, release, shared};
use chrono::NaiveDate;
use tracing::{error, info, warn};

pub const REPORT_FALLBACK_MESSAGE: &str = "Weekly report generated successfully!";

#[derive(Debug, Clone, Default)]
pub struct WeeklyState {
    pub report: Option<WeeklyReport>,
    pub loading: bool,
    pub generating: bool,
}

#[derive(Clone)]
pub struct WeeklyReview {
    ctx: AppContext,
    state: Shared<WeeklyState>,
}

impl WeeklyReview {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            state: shared(WeeklyState::default()),
        }
    }

    pub async fn state(&self) -> WeeklyState {
        self.state.lock().await.clone()
    }

    pub async fn refresh(&self) -> Result<(), ClientError> {
        self.ctx.require_session()?;
        claim(&self.state, |s: &mut WeeklyState| &mut s.loading, "loading").await?;

        let result = self.ctx.authorize(self.ctx.api.weekly().await).await;
        let result = match result {
            Ok(report) => {
                info!(
                    days = report.checklist_data.len(),
                    milestones = report.milestones.len(),
                    "weekly data fetched"
                );
                self.state.lock().await.report = Some(report);
                Ok(())
            }
            Err(err) => {
                error!("failed to fetch weekly data: {err}");
                Err(err)
            }
        };

        release(&self.state, |s: &mut WeeklyState| &mut s.loading).await;
        result
    }

    /// Asks the server to build the report, then re-reads the week.
    pub async fn generate_report(&self) -> Result<String, ClientError> {
        self.ctx.require_session()?;
        claim(&self.state, |s: &mut WeeklyState| &mut s.generating, "report generation").await?;

        let result = self.ctx.authorize(self.ctx.api.generate_report().await).await;
        release(&self.state, |s: &mut WeeklyState| &mut s.generating).await;

        let message = match result {
            Ok(response) => response
                .message
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| REPORT_FALLBACK_MESSAGE.to_string()),
            Err(err) => {
                error!("failed to generate report: {err}");
                return Err(err);
            }
        };

        if let Err(err) = self.refresh().await {
            warn!("report generated but weekly refresh failed: {err}");
            if matches!(err, ClientError::SessionExpired) {
                return Err(err);
            }
        }
        Ok(message)
    }

    /// Projects the last fetched week; an unfetched week projects as empty.
    pub async fn view(&self) -> WeeklyView {
        let state = self.state.lock().await;
        project_week(state.report.as_ref().unwrap_or(&WeeklyReport::default()))
    }

    pub async fn view_at(&self, today: NaiveDate) -> WeeklyView {
        let state = self.state.lock().await;
        project_week_at(today, state.report.as_ref().unwrap_or(&WeeklyReport::default()))
    }
}
