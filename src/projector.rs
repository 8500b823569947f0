use crate::models::{Checklist, MoodDay, SleepRecord, WeekRange, WeeklyReport};
use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::Serialize;

pub const DAYS_IN_WEEK: usize = 7;
pub const CHART_WIDTH: f64 = 300.0;
pub const SLEEP_FLOOR: f64 = 20.0;
pub const SLEEP_CEILING: f64 = 80.0;
pub const NEUTRAL_MOOD: i64 = 3;

const MOOD_GLYPHS: [&str; 5] = ["😀", "🙂", "😐", "😔", "😢"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SleepQuality {
    NoData,
    Poor,
    Fair,
    Good,
}

impl SleepQuality {
    pub fn from_hours(hours: Option<f64>) -> Self {
        match hours {
            None => SleepQuality::NoData,
            Some(h) if h <= 0.0 => SleepQuality::NoData,
            Some(h) if h >= 7.0 => SleepQuality::Good,
            Some(h) if h >= 6.0 => SleepQuality::Fair,
            Some(_) => SleepQuality::Poor,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SleepQuality::NoData => "No data",
            SleepQuality::Poor => "😔 Poor",
            SleepQuality::Fair => "😐 Fair",
            SleepQuality::Good => "😊 Good",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MilestoneKind {
    Streak,
    Hydration,
    Mindfulness,
}

impl MilestoneKind {
    pub fn classify(label: &str) -> Self {
        if label.contains("Streak") {
            MilestoneKind::Streak
        } else if label.contains("Hydration") {
            MilestoneKind::Hydration
        } else {
            MilestoneKind::Mindfulness
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            MilestoneKind::Streak => "🔥",
            MilestoneKind::Hydration => "💧",
            MilestoneKind::Mindfulness => "🧘",
        }
    }

    pub fn encouragement(self) -> &'static str {
        match self {
            MilestoneKind::Streak => "Keep up the great work!",
            MilestoneKind::Hydration => "Excellent hydration habits!",
            MilestoneKind::Mindfulness => "Consistent mindfulness practice!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Milestone {
    pub label: String,
    pub kind: MilestoneKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MoodInsight {
    NoData,
    Positive,
    Tough,
    Stable,
}

impl MoodInsight {
    pub fn message(self) -> &'static str {
        match self {
            MoodInsight::NoData => {
                "Track your daily mood to see patterns and insights about your wellbeing."
            }
            MoodInsight::Positive => {
                "You've been feeling great most days this week! Keep up the positive mindset. 🌟"
            }
            MoodInsight::Tough => {
                "You've had some tough days. Remember to practice self-care and reach out if you need support. 💝"
            }
            MoodInsight::Stable => {
                "Your mood has been relatively stable this week. Consistency is key to wellbeing. 🌈"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekLabel {
    pub start: String,
    pub end: String,
    pub from_backend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub consistency_percent: f64,
    pub average_sleep_hours: f64,
    pub perfect_days: usize,
    pub checklist_days: usize,
    pub sleep_days: usize,
    pub mood_entries: usize,
    pub current_streak: u32,
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyView {
    pub week: WeekLabel,
    pub consistency: Vec<ChartPoint>,
    pub sleep: Vec<ChartPoint>,
    pub moods: Vec<&'static str>,
    pub summary: WeeklySummary,
    pub mood_insight: MoodInsight,
    pub consistency_advice: &'static str,
    pub sleep_advice: &'static str,
}

pub fn project_week(report: &WeeklyReport) -> WeeklyView {
    project_week_at(Local::now().date_naive(), report)
}

pub fn project_week_at(today: NaiveDate, report: &WeeklyReport) -> WeeklyView {
    let summary = weekly_summary(report);
    WeeklyView {
        week: week_label(report.week_range.as_ref(), today),
        consistency: consistency_series(&report.checklist_data),
        sleep: sleep_series(&report.sleep_data),
        moods: mood_glyphs(&report.mood_data),
        mood_insight: mood_insight(&report.mood_data),
        consistency_advice: consistency_advice(summary.consistency_percent),
        sleep_advice: sleep_advice(summary.average_sleep_hours),
        summary,
    }
}

fn day_x(index: usize) -> f64 {
    CHART_WIDTH / DAYS_IN_WEEK as f64 * index as f64
}

/// Lays `ys` out left to right and repeats the last y for missing tail days.
fn plot(ys: impl Iterator<Item = f64>) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = ys
        .take(DAYS_IN_WEEK)
        .enumerate()
        .map(|(index, y)| ChartPoint { x: day_x(index), y })
        .collect();

    if let Some(last) = points.last().copied() {
        for index in points.len()..DAYS_IN_WEEK {
            points.push(ChartPoint {
                x: day_x(index),
                y: last.y,
            });
        }
    }
    points
}

pub fn completion_percentages(days: &[Checklist]) -> Vec<f64> {
    days.iter().map(Checklist::completion_percent).collect()
}

/// Chart y is inverted: a perfect day sits at 0, an empty one at 100.
pub fn consistency_series(days: &[Checklist]) -> Vec<ChartPoint> {
    plot(days.iter().map(|day| 100.0 - day.completion_percent()))
}

pub fn sleep_coordinate(hours: f64) -> f64 {
    (100.0 - (hours - 4.0) * 10.0).clamp(SLEEP_FLOOR, SLEEP_CEILING)
}

pub fn sleep_series(days: &[SleepRecord]) -> Vec<ChartPoint> {
    plot(days.iter().map(|day| sleep_coordinate(day.total_hours)))
}

pub fn mood_glyph(mood: i64) -> &'static str {
    usize::try_from(mood.saturating_sub(1))
        .ok()
        .and_then(|index| MOOD_GLYPHS.get(index).copied())
        .unwrap_or(MOOD_GLYPHS[(NEUTRAL_MOOD - 1) as usize])
}

pub fn mood_glyphs(days: &[MoodDay]) -> Vec<&'static str> {
    let mut glyphs: Vec<&'static str> = days
        .iter()
        .take(DAYS_IN_WEEK)
        .map(|day| mood_glyph(day.mood))
        .collect();
    glyphs.resize(DAYS_IN_WEEK, mood_glyph(NEUTRAL_MOOD));
    glyphs
}

pub fn mood_insight(days: &[MoodDay]) -> MoodInsight {
    if days.is_empty() {
        return MoodInsight::NoData;
    }
    let upbeat = days.iter().filter(|day| day.mood <= 2).count();
    let low = days.iter().filter(|day| day.mood >= 4).count();
    if upbeat >= 5 {
        MoodInsight::Positive
    } else if low >= 3 {
        MoodInsight::Tough
    } else {
        MoodInsight::Stable
    }
}

/// Mean over days that actually recorded sleep.
pub fn average_sleep(days: &[SleepRecord]) -> Option<f64> {
    let recorded: Vec<f64> = days
        .iter()
        .map(|day| day.total_hours)
        .filter(|hours| *hours > 0.0)
        .collect();
    if recorded.is_empty() {
        None
    } else {
        Some(recorded.iter().sum::<f64>() / recorded.len() as f64)
    }
}

pub fn recomputed_consistency(days: &[Checklist]) -> f64 {
    if days.is_empty() {
        return 0.0;
    }
    let total: f64 = completion_percentages(days).iter().sum();
    (total / days.len() as f64).round()
}

pub fn perfect_days(days: &[Checklist]) -> usize {
    days.iter().filter(|day| day.is_perfect()).count()
}

pub fn classify_milestones(labels: &[String]) -> Vec<Milestone> {
    labels
        .iter()
        .map(|label| Milestone {
            label: label.clone(),
            kind: MilestoneKind::classify(label),
        })
        .collect()
}

pub fn weekly_summary(report: &WeeklyReport) -> WeeklySummary {
    let consistency_percent = report
        .consistency_percentage
        .unwrap_or_else(|| recomputed_consistency(&report.checklist_data));
    let average_sleep_hours = average_sleep(&report.sleep_data)
        .or(report.avg_sleep_hours)
        .unwrap_or(0.0);

    WeeklySummary {
        consistency_percent,
        average_sleep_hours,
        perfect_days: perfect_days(&report.checklist_data),
        checklist_days: report.checklist_data.len(),
        sleep_days: report.sleep_data.len(),
        mood_entries: report.mood_data.len(),
        current_streak: report.streak.map(|s| s.current_streak).unwrap_or(0),
        milestones: classify_milestones(&report.milestones),
    }
}

pub fn consistency_advice(percent: f64) -> &'static str {
    if percent >= 80.0 {
        "Excellent consistency! Try adding one new small habit to your routine."
    } else if percent >= 60.0 {
        "Good progress! Focus on completing all 3 tasks for the next 3 days."
    } else {
        "Start by focusing on just one task consistently, then build from there."
    }
}

pub fn sleep_advice(average_hours: f64) -> &'static str {
    if average_hours >= 8.0 {
        "Great sleep duration! Maintain this for optimal health and energy."
    } else if average_hours >= 7.0 {
        "Good sleep habits. Aim for 7-9 hours consistently."
    } else {
        "Try going to bed 30 minutes earlier to improve your sleep duration."
    }
}

/// Share of a 10-hour night, for the dashboard sleep ring.
pub fn sleep_ring_percent(hours: f64) -> f64 {
    (hours / 10.0 * 100.0).clamp(0.0, 100.0)
}

/// Quality bands for the first few history entries shown on the dashboard.
pub fn sleep_history_bands(history: &[SleepRecord], limit: usize) -> Vec<SleepQuality> {
    history
        .iter()
        .take(limit)
        .map(|day| SleepQuality::from_hours(Some(day.total_hours)))
        .collect()
}

pub fn week_label(range: Option<&WeekRange>, today: NaiveDate) -> WeekLabel {
    let backend = range.and_then(|range| {
        let start = parse_day(range.start.as_deref()?)?;
        let end = parse_day(range.end.as_deref()?)?;
        Some((start, end))
    });

    match backend {
        Some((start, end)) => WeekLabel {
            start: short_date(start),
            end: short_date(end),
            from_backend: true,
        },
        None => {
            let start = week_start(today);
            WeekLabel {
                start: short_date(start),
                end: short_date(start + Duration::days(6)),
                from_backend: false,
            }
        }
    }
}

/// Accepts plain dates and ISO timestamps.
fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    raw.get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}

fn short_date(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}
