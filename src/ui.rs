use crate::dashboard::DashboardView;
use crate::models::{NotificationKind, TaskKey, User};
use crate::projector::{ChartPoint, SleepQuality, WeeklyView};
use crate::settings::SettingsState;
use std::fmt::Write;

const MOOD_PICKER: [&str; 5] = ["😀", "🙂", "😐", "😔", "😢"];

pub fn render_dashboard(user: Option<&User>, view: &DashboardView) -> String {
    let mut out = String::new();
    let name = user.map(|u| u.name.as_str()).unwrap_or("there");
    let _ = writeln!(out, "Good morning, {name}!");
    let _ = writeln!(
        out,
        "🔥 {} day streak (best {})",
        view.streak.current_streak, view.streak.longest_streak
    );

    let _ = writeln!(
        out,
        "\nMorning checklist ({}/{})",
        view.checklist.completed(),
        TaskKey::ALL.len()
    );
    for key in TaskKey::ALL {
        let mark = if view.checklist.get(key) { "x" } else { " " };
        let _ = writeln!(out, "  [{mark}] {}", key.label());
    }

    let _ = writeln!(out, "\nMood");
    let picker: Vec<String> = MOOD_PICKER
        .iter()
        .enumerate()
        .map(|(index, glyph)| {
            if view.mood_index == Some(index as u8) {
                format!("[{glyph}]")
            } else {
                format!(" {glyph} ")
            }
        })
        .collect();
    let _ = writeln!(out, "  {}", picker.join(""));

    let _ = writeln!(out, "\nIntention\n  {}", view.intention);

    let _ = writeln!(out, "\nSleep");
    match &view.sleep {
        Some(sleep) => {
            let _ = writeln!(
                out,
                "  {:.1}h  {}  ({:.0}% of 10h)",
                sleep.total_hours,
                view.sleep_quality.label(),
                view.sleep_ring_percent
            );
            if let Some(deep) = sleep.deep_sleep_hours {
                let _ = writeln!(out, "  deep {deep:.1}h");
            }
            if let Some(rem) = sleep.rem_hours {
                let _ = writeln!(out, "  REM {rem:.1}h");
            }
        }
        None => {
            let _ = writeln!(out, "  {}", SleepQuality::NoData.label());
        }
    }
    for (date, hours, quality) in &view.sleep_history {
        let _ = writeln!(
            out,
            "  {:<10} {hours:>4.1}h  {}",
            date.as_deref().map(|d| d.get(..10).unwrap_or(d)).unwrap_or("-"),
            quality.label()
        );
    }
    out
}

pub fn render_weekly(view: &WeeklyView) -> String {
    let mut out = String::new();
    let summary = &view.summary;
    let _ = writeln!(out, "Week of {} - {}", view.week.start, view.week.end);
    let _ = writeln!(
        out,
        "Consistency {:.0}%  ·  Avg sleep {:.1}h  ·  Perfect days {}  ·  Streak {}",
        summary.consistency_percent,
        summary.average_sleep_hours,
        summary.perfect_days,
        summary.current_streak
    );

    let _ = writeln!(out, "\nConsistency (y=0 is a perfect day)");
    let _ = writeln!(out, "  {}", points(&view.consistency));
    let _ = writeln!(out, "  {}", view.consistency_advice);

    let _ = writeln!(out, "\nSleep");
    let _ = writeln!(out, "  {}", points(&view.sleep));
    let _ = writeln!(out, "  {}", view.sleep_advice);

    let _ = writeln!(out, "\nMood\n  {}", view.moods.join(" "));
    let _ = writeln!(out, "  {}", view.mood_insight.message());

    if !summary.milestones.is_empty() {
        let _ = writeln!(out, "\nMilestones");
        for milestone in &summary.milestones {
            let _ = writeln!(
                out,
                "  {} {} - {}",
                milestone.kind.glyph(),
                milestone.label,
                milestone.kind.encouragement()
            );
        }
    }
    out
}

pub fn render_settings(state: &SettingsState) -> String {
    let mut out = String::new();
    let settings = state.settings();
    let _ = writeln!(out, "Profile");
    let _ = writeln!(out, "  name   {}", state.draft.name);
    let _ = writeln!(out, "  email  {}", state.draft.email);
    let phone = if state.draft.phone.is_empty() {
        "-"
    } else {
        state.draft.phone.as_str()
    };
    let _ = writeln!(out, "  phone  {phone}");

    let _ = writeln!(out, "\nNotifications");
    for kind in [
        NotificationKind::MorningReminders,
        NotificationKind::WeeklyReports,
        NotificationKind::SoundAlerts,
    ] {
        let enabled = *state.notification(kind).get();
        let _ = writeln!(
            out,
            "  {:<18} {}",
            kind.as_str(),
            if enabled { "on" } else { "off" }
        );
    }

    let _ = writeln!(out, "\nAppearance");
    let _ = writeln!(out, "  theme  {}", settings.theme_color);
    let _ = writeln!(out, "  mode   {}", settings.interface_mode);
    out
}

fn points(series: &[ChartPoint]) -> String {
    if series.is_empty() {
        return "no data".to_string();
    }
    series
        .iter()
        .map(|point| format!("({:.0},{:.0})", point.x, point.y))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Checklist, Streak};
    use crate::projector::project_week_at;
    use crate::models::WeeklyReport;
    use chrono::NaiveDate;

    fn dashboard_view() -> DashboardView {
        DashboardView {
            checklist: Checklist::default().toggled(TaskKey::Meditate),
            mood_index: Some(1),
            intention: "Listen first".to_string(),
            streak: Streak {
                current_streak: 4,
                longest_streak: 9,
            },
            sleep: None,
            sleep_quality: SleepQuality::NoData,
            sleep_ring_percent: 0.0,
            sleep_history: Vec::new(),
            loading: false,
            saving: false,
        }
    }

    #[test]
    fn dashboard_marks_done_tasks_and_selected_mood() {
        let text = render_dashboard(None, &dashboard_view());
        assert!(text.contains("[x] Meditate (10 mins)"));
        assert!(text.contains("[ ] Hydrate (500ml)"));
        assert!(text.contains("[🙂]"));
        assert!(text.contains("4 day streak (best 9)"));
        assert!(text.contains("No data"));
    }

    #[test]
    fn empty_week_renders_without_charts() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        let text = render_weekly(&project_week_at(today, &WeeklyReport::default()));
        assert!(text.contains("Week of May 13 - May 19"));
        assert!(text.contains("no data"));
        assert!(!text.contains("Milestones"));
    }

    #[test]
    fn settings_lists_notifications() {
        let text = render_settings(&SettingsState::default());
        assert!(text.contains("morning_reminders  on"));
        assert!(text.contains("sound_alerts       off"));
        assert!(text.contains("theme  orange"));
    }
}
