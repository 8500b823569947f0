use crate::errors::ClientError;
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

/// Reads an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct User {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Token and profile travel together; there is no way to hold one without the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKey {
    Hydrate,
    Meditate,
    StretchMove,
}

impl TaskKey {
    pub const ALL: [TaskKey; 3] = [TaskKey::Hydrate, TaskKey::Meditate, TaskKey::StretchMove];

    pub fn label(self) -> &'static str {
        match self {
            TaskKey::Hydrate => "Hydrate (500ml)",
            TaskKey::Meditate => "Meditate (10 mins)",
            TaskKey::StretchMove => "Stretch & Move",
        }
    }
}

impl FromStr for TaskKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hydrate" => Ok(TaskKey::Hydrate),
            "meditate" => Ok(TaskKey::Meditate),
            "stretch_move" | "stretch-move" | "stretch" => Ok(TaskKey::StretchMove),
            other => Err(format!("unknown task '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Checklist {
    #[serde(deserialize_with = "null_as_default")]
    pub hydrate: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub meditate: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub stretch_move: bool,
}

impl Checklist {
    pub fn get(&self, key: TaskKey) -> bool {
        match key {
            TaskKey::Hydrate => self.hydrate,
            TaskKey::Meditate => self.meditate,
            TaskKey::StretchMove => self.stretch_move,
        }
    }

    pub fn toggled(&self, key: TaskKey) -> Checklist {
        let mut next = *self;
        match key {
            TaskKey::Hydrate => next.hydrate = !next.hydrate,
            TaskKey::Meditate => next.meditate = !next.meditate,
            TaskKey::StretchMove => next.stretch_move = !next.stretch_move,
        }
        next
    }

    pub fn completed(&self) -> usize {
        TaskKey::ALL.iter().filter(|key| self.get(**key)).count()
    }

    pub fn completion_percent(&self) -> f64 {
        self.completed() as f64 / TaskKey::ALL.len() as f64 * 100.0
    }

    pub fn is_perfect(&self) -> bool {
        self.completed() == TaskKey::ALL.len()
    }
}

/// Backend mood value, 1 (very happy) through 5 (very sad).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Mood(u8);

impl Mood {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn from_value(value: u8) -> Result<Self, ClientError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ClientError::validation(format!(
                "mood must be between {} and {}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    /// Zero-based index as shown in the mood picker.
    pub fn from_index(index: u8) -> Result<Self, ClientError> {
        Self::from_value(index.saturating_add(1))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn index(self) -> u8 {
        self.0 - 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SleepRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_hours: f64,
    #[serde(default)]
    pub deep_sleep_hours: Option<f64>,
    #[serde(default)]
    pub rem_hours: Option<f64>,
}

/// Unvalidated sleep form input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SleepInput {
    pub total_hours: f64,
    pub deep_sleep_hours: Option<f64>,
    pub rem_hours: Option<f64>,
}

impl SleepInput {
    /// Parses the three form fields; blank stage fields mean "not recorded".
    pub fn from_fields(total: &str, deep: &str, rem: &str) -> Result<Self, ClientError> {
        let total_hours = parse_hours(total)?
            .ok_or_else(|| ClientError::validation("Please enter valid total sleep hours"))?;
        Ok(Self {
            total_hours,
            deep_sleep_hours: parse_hours(deep)?,
            rem_hours: parse_hours(rem)?,
        })
    }

    pub fn validate(&self) -> Result<SleepRecord, ClientError> {
        if !self.total_hours.is_finite() || self.total_hours < 0.0 {
            return Err(ClientError::validation("Please enter valid total sleep hours"));
        }
        check_stage(self.deep_sleep_hours, self.total_hours, "Deep sleep")?;
        check_stage(self.rem_hours, self.total_hours, "REM sleep")?;

        Ok(SleepRecord {
            date: None,
            total_hours: self.total_hours,
            deep_sleep_hours: self.deep_sleep_hours,
            rem_hours: self.rem_hours,
        })
    }
}

fn parse_hours(field: &str) -> Result<Option<f64>, ClientError> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(None);
    }
    if !field.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(ClientError::validation(format!("'{field}' is not a number of hours")));
    }
    field
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ClientError::validation(format!("'{field}' is not a number of hours")))
}

fn check_stage(stage: Option<f64>, total: f64, name: &str) -> Result<(), ClientError> {
    match stage {
        Some(hours) if !hours.is_finite() || hours < 0.0 => Err(ClientError::validation(format!(
            "{name} hours must be a positive number"
        ))),
        Some(hours) if hours > total => Err(ClientError::validation(format!(
            "{name} hours cannot exceed total sleep hours"
        ))),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Streak {
    #[serde(deserialize_with = "null_as_default")]
    pub current_streak: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub longest_streak: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    #[serde(default)]
    pub checklist: Option<Checklist>,
    #[serde(default)]
    pub mood: Option<u8>,
    #[serde(default)]
    pub daily_intention: Option<String>,
    #[serde(default)]
    pub streak: Option<Streak>,
    #[serde(default)]
    pub sleep: Option<SleepRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepHistoryResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub sleep_history: Vec<SleepRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SleepSaveResponse {
    #[serde(default)]
    pub sleep: Option<SleepRecord>,
}

#[derive(Debug, Serialize)]
pub struct MoodUpdate {
    pub mood: Mood,
}

#[derive(Debug, Serialize)]
pub struct IntentionUpdate<'a> {
    pub intention: &'a str,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoodDay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mood: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeekRange {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeeklyReport {
    #[serde(deserialize_with = "null_as_default")]
    pub checklist_data: Vec<Checklist>,
    #[serde(deserialize_with = "null_as_default")]
    pub mood_data: Vec<MoodDay>,
    #[serde(deserialize_with = "null_as_default")]
    pub sleep_data: Vec<SleepRecord>,
    pub week_range: Option<WeekRange>,
    pub streak: Option<Streak>,
    pub consistency_percentage: Option<f64>,
    pub avg_sleep_hours: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub milestones: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeColor {
    Blue,
    #[default]
    Orange,
    Purple,
    Green,
    Gradient,
}

impl ThemeColor {
    pub const ALL: [ThemeColor; 5] = [
        ThemeColor::Blue,
        ThemeColor::Orange,
        ThemeColor::Purple,
        ThemeColor::Green,
        ThemeColor::Gradient,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeColor::Blue => "blue",
            ThemeColor::Orange => "orange",
            ThemeColor::Purple => "purple",
            ThemeColor::Green => "green",
            ThemeColor::Gradient => "gradient",
        }
    }
}

impl FromStr for ThemeColor {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim().to_ascii_lowercase();
        ThemeColor::ALL
            .into_iter()
            .find(|color| color.as_str() == value)
            .ok_or_else(|| format!("unknown theme color '{value}'"))
    }
}

impl fmt::Display for ThemeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceMode {
    #[default]
    Light,
    Dark,
}

impl InterfaceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            InterfaceMode::Light => "light",
            InterfaceMode::Dark => "dark",
        }
    }
}

impl FromStr for InterfaceMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(InterfaceMode::Light),
            "dark" => Ok(InterfaceMode::Dark),
            other => Err(format!("unknown interface mode '{other}'")),
        }
    }
}

impl fmt::Display for InterfaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    MorningReminders,
    WeeklyReports,
    SoundAlerts,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::MorningReminders => "morning_reminders",
            NotificationKind::WeeklyReports => "weekly_reports",
            NotificationKind::SoundAlerts => "sound_alerts",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "morning_reminders" | "reminders" => Ok(NotificationKind::MorningReminders),
            "weekly_reports" | "reports" => Ok(NotificationKind::WeeklyReports),
            "sound_alerts" | "sound" => Ok(NotificationKind::SoundAlerts),
            other => Err(format!("unknown notification '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme_color: ThemeColor,
    pub interface_mode: InterfaceMode,
    pub morning_reminders: bool,
    pub weekly_reports: bool,
    pub sound_alerts: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme_color: ThemeColor::Orange,
            interface_mode: InterfaceMode::Light,
            morning_reminders: true,
            weekly_reports: true,
            sound_alerts: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Profile {
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsResponse {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub settings: Option<Settings>,
    #[serde(default)]
    pub profile: Option<Profile>,
}

#[derive(Debug, Serialize)]
pub struct NotificationUpdate {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub phone: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_index_maps_to_one_based_value() {
        assert_eq!(Mood::from_index(0).unwrap().value(), 1);
        assert_eq!(Mood::from_index(4).unwrap().value(), 5);
        assert_eq!(Mood::from_value(3).unwrap().index(), 2);
        assert!(matches!(Mood::from_index(5), Err(ClientError::Validation(_))));
        assert!(matches!(Mood::from_value(0), Err(ClientError::Validation(_))));
    }

    #[test]
    fn checklist_toggle_flips_only_one_task() {
        let list = Checklist::default().toggled(TaskKey::Meditate);
        assert!(list.meditate);
        assert!(!list.hydrate);
        assert!(!list.stretch_move);
        assert_eq!(list.completed(), 1);
        assert!(!list.toggled(TaskKey::Meditate).meditate);
    }

    #[test]
    fn sleep_stages_may_not_exceed_total() {
        let deep = SleepInput {
            total_hours: 6.0,
            deep_sleep_hours: Some(6.5),
            rem_hours: None,
        };
        let err = deep.validate().unwrap_err();
        assert_eq!(err.to_string(), "Deep sleep hours cannot exceed total sleep hours");

        let rem = SleepInput {
            total_hours: 6.0,
            deep_sleep_hours: Some(1.0),
            rem_hours: Some(7.0),
        };
        let err = rem.validate().unwrap_err();
        assert_eq!(err.to_string(), "REM sleep hours cannot exceed total sleep hours");

        let ok = SleepInput {
            total_hours: 7.5,
            deep_sleep_hours: Some(2.0),
            rem_hours: Some(7.5),
        };
        assert_eq!(ok.validate().unwrap().total_hours, 7.5);
    }

    #[test]
    fn sleep_form_fields_parse_blank_stages_as_missing() {
        let input = SleepInput::from_fields("7.5", "", " 1.5 ").unwrap();
        assert_eq!(input.total_hours, 7.5);
        assert_eq!(input.deep_sleep_hours, None);
        assert_eq!(input.rem_hours, Some(1.5));

        assert!(SleepInput::from_fields("", "1", "1").is_err());
        assert!(SleepInput::from_fields("-3", "", "").is_err());
        assert!(SleepInput::from_fields("7", "abc", "").is_err());
    }

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"theme_color":"purple"}"#).unwrap();
        assert_eq!(settings.theme_color, ThemeColor::Purple);
        assert_eq!(settings.interface_mode, InterfaceMode::Light);
        assert!(settings.morning_reminders);
        assert!(!settings.sound_alerts);
    }

    #[test]
    fn weekly_report_reads_camel_case_payload() {
        let report: WeeklyReport = serde_json::from_value(serde_json::json!({
            "checklistData": [{"hydrate": true, "meditate": false, "stretch_move": true, "date": "2026-10-12"}],
            "moodData": [{"mood": 2}],
            "sleepData": [{"total_hours": 7.5, "date": "2026-10-12"}],
            "consistencyPercentage": 67,
            "milestones": ["3 Day Streak"]
        }))
        .unwrap();
        assert_eq!(report.checklist_data.len(), 1);
        assert!(report.checklist_data[0].stretch_move);
        assert_eq!(report.mood_data[0].mood, 2);
        assert_eq!(report.consistency_percentage, Some(67.0));
        assert!(report.week_range.is_none());
    }

    #[test]
    fn weekly_report_treats_nulls_as_empty() {
        let report: WeeklyReport = serde_json::from_value(serde_json::json!({
            "checklistData": null,
            "moodData": [{"date": "2026-10-12", "mood": null}],
            "sleepData": [{"date": "2026-10-12", "total_hours": null}, {"total_hours": 6.0}],
            "milestones": null,
            "streak": {"current_streak": null, "longest_streak": 4}
        }))
        .unwrap();
        assert!(report.checklist_data.is_empty());
        assert!(report.milestones.is_empty());
        assert_eq!(report.mood_data[0].mood, 0);
        assert_eq!(report.sleep_data[0].total_hours, 0.0);
        assert_eq!(report.sleep_data[1].total_hours, 6.0);
        assert_eq!(report.streak, Some(Streak { current_streak: 0, longest_streak: 4 }));
    }

    #[test]
    fn sleep_payloads_accept_null_hours() {
        let history: SleepHistoryResponse = serde_json::from_value(serde_json::json!({
            "sleepHistory": [{"date": "2026-10-18", "total_hours": null, "deep_sleep_hours": null}]
        }))
        .unwrap();
        assert_eq!(history.sleep_history[0].total_hours, 0.0);
        assert_eq!(history.sleep_history[0].deep_sleep_hours, None);

        let empty: SleepHistoryResponse =
            serde_json::from_value(serde_json::json!({"sleepHistory": null})).unwrap();
        assert!(empty.sleep_history.is_empty());

        let dashboard: DashboardResponse = serde_json::from_value(serde_json::json!({
            "checklist": {"hydrate": null, "meditate": true, "stretch_move": false},
            "sleep": {"total_hours": null}
        }))
        .unwrap();
        assert_eq!(dashboard.sleep.map(|sleep| sleep.total_hours), Some(0.0));
        assert_eq!(
            dashboard.checklist,
            Some(Checklist { hydrate: false, meditate: true, stretch_move: false })
        );
    }

    #[test]
    fn notification_update_uses_type_key() {
        let body = serde_json::to_value(NotificationUpdate {
            kind: NotificationKind::SoundAlerts,
            enabled: true,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"type": "sound_alerts", "enabled": true}));
    }
}
