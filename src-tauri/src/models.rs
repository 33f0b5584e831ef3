use std::collections::BTreeMap;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::PredictionConfig;

/// Every weekday, indexed the way cyclical patterns are (Sunday = 0).
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Habit {
    pub id: Uuid,
    pub name: String,
    /// Family member the habit belongs to, if any.
    #[serde(default)]
    pub member: Option<String>,
    pub frequency: Frequency,
    #[serde(default)]
    pub target_days: Vec<Weekday>,
}

impl Habit {
    /// Weekdays the habit is scheduled on. An empty target list means every day.
    pub fn scheduled_days(&self) -> Vec<Weekday> {
        if self.target_days.is_empty() {
            WEEKDAYS.to_vec()
        } else {
            self.target_days.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HabitCompletion {
    pub habit_id: Uuid,
    pub date: NaiveDate,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoodEntry {
    pub date: NaiveDate,
    pub mood: u8,
    pub energy: u8,
    /// Higher is worse.
    pub stress: u8,
    pub sleep: u8,
}

impl MoodEntry {
    /// Single daily wellbeing score on the 1-5 scale, stress inverted.
    pub fn composite(&self) -> f64 {
        (self.mood as f64 + self.energy as f64 + (6.0 - self.stress as f64) + self.sleep as f64)
            / 4.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HabitStats {
    pub total_days: usize,
    pub completed_days: usize,
    pub completion_rate: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_completed: Option<NaiveDate>,
}

/// Statistical summary of a habit's history. Recomputed on every call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HabitPatternProfile {
    pub base_success_rate: f64,
    pub trend_factor: f64,
    /// Success rate by weekday, Sunday = 0.
    pub cyclical_pattern: [f64; 7],
    pub mood_correlation: f64,
    pub streak_factor: f64,
    pub recency_factor: f64,
}

impl Default for HabitPatternProfile {
    fn default() -> Self {
        Self {
            base_success_rate: 0.5,
            trend_factor: 1.0,
            cyclical_pattern: [0.5; 7],
            mood_correlation: 0.0,
            streak_factor: 1.0,
            recency_factor: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionDataPoint {
    pub date: NaiveDate,
    pub predicted: bool,
    pub confidence: f64,
    pub probability: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskKind {
    StreakLength,
    RecentPerformance,
    WeeklyPattern,
    MoodCorrelation,
    FrequencyMismatch,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskFactor {
    pub kind: RiskKind,
    pub impact: f64,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    Streak,
    Completion,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GoalPeriod {
    #[serde(rename = "30_days")]
    ThirtyDays,
    #[serde(rename = "60_days")]
    SixtyDays,
    #[serde(rename = "90_days")]
    NinetyDays,
    #[serde(rename = "monthly")]
    Monthly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalPrediction {
    pub goal_type: GoalType,
    pub target: u32,
    pub period: GoalPeriod,
    pub probability: f64,
    pub confidence: f64,
    pub estimated_date: Option<NaiveDate>,
    pub days_remaining: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HabitPrediction {
    pub habit_id: Uuid,
    pub habit_name: String,
    pub current_streak: u32,
    pub predictions: Vec<PredictionDataPoint>,
    pub trend: TrendDirection,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<RiskFactor>,
    pub goals: Vec<GoalPrediction>,
    pub recommendations: Vec<String>,
    pub confidence: f64,
    pub next_risk_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleOptimization {
    pub recommendations: Vec<String>,
    pub optimal_days: BTreeMap<Uuid, Vec<Weekday>>,
    /// Number of habits scheduled on each weekday, Sunday = 0.
    pub load_distribution: [u32; 7],
}

/// Portfolio-level view across all of a user's habits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionAnalytics {
    pub total_habits: usize,
    pub average_success_probability: f64,
    pub high_risk_habits: usize,
    pub average_goal_probability: f64,
    pub optimal_habit_load: usize,
    pub best_weekday: Option<Weekday>,
    pub worst_weekday: Option<Weekday>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    pub habits: Vec<Habit>,
    pub completions: Vec<HabitCompletion>,
    #[serde(default)]
    pub moods: Vec<MoodEntry>,
    pub settings: AppSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub auto_lock_minutes: u32,
    #[serde(default = "default_show_mood_insights")]
    pub show_mood_insights: bool,
    #[serde(default)]
    pub prediction: PredictionConfig,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            auto_lock_minutes: 5,
            show_mood_insights: true,
            prediction: PredictionConfig::default(),
        }
    }
}

fn default_show_mood_insights() -> bool {
    true
}

/// Everything the dashboard renders in one round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardData {
    pub today: NaiveDate,
    pub predictions: Vec<HabitPrediction>,
    pub analytics: PredictionAnalytics,
    pub schedule: ScheduleOptimization,
}
