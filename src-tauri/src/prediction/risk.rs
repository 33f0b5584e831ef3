use super::patterns::{current_streak, trailing_rate};
use super::{history_for, std_deviation, Forecaster};
use crate::models::{
    Habit, HabitCompletion, HabitPatternProfile, MoodEntry, RiskFactor, RiskKind,
};

const RECENT_WINDOW: usize = 7;
const RECENT_RATE_THRESHOLD: f64 = 0.4;
const RECENT_RATE_BASELINE: f64 = 0.6;
const LONG_STREAK_DAYS: u32 = 30;
const MAX_STREAK_IMPACT: f64 = 0.3;
const WEEKLY_STDDEV_THRESHOLD: f64 = 0.3;
const MAX_WEEKLY_IMPACT: f64 = 0.5;
const MOOD_THRESHOLD: f64 = -0.3;
const MOOD_IMPACT_WEIGHT: f64 = 0.5;

impl Forecaster {
    /// Signals that a habit is at risk of being abandoned, strongest first.
    pub fn identify_risks(
        &self,
        habit: &Habit,
        completions: &[HabitCompletion],
        moods: Option<&[MoodEntry]>,
    ) -> Vec<RiskFactor> {
        let history = history_for(habit, completions);
        let profile = self.profile_from(habit, &history, moods);
        self.risks_from(&history, &profile)
    }

    pub(super) fn risks_from(
        &self,
        history: &[&HabitCompletion],
        profile: &HabitPatternProfile,
    ) -> Vec<RiskFactor> {
        let mut risks = Vec::new();

        if let Some(rate) = trailing_rate(history, RECENT_WINDOW) {
            if rate < RECENT_RATE_THRESHOLD {
                risks.push(RiskFactor {
                    kind: RiskKind::RecentPerformance,
                    impact: ((RECENT_RATE_BASELINE - rate) / RECENT_RATE_BASELINE).clamp(0.0, 1.0),
                    description: format!(
                        "Only {:.0}% completed over the last {} records",
                        rate * 100.0,
                        history.len().min(RECENT_WINDOW)
                    ),
                });
            }
        }

        let streak = current_streak(history);
        if streak > LONG_STREAK_DAYS {
            risks.push(RiskFactor {
                kind: RiskKind::StreakLength,
                impact: ((streak - LONG_STREAK_DAYS) as f64 / 100.0).min(MAX_STREAK_IMPACT),
                description: format!("A {streak}-day streak raises the risk of burnout"),
            });
        }

        let spread = std_deviation(&profile.cyclical_pattern);
        if spread > WEEKLY_STDDEV_THRESHOLD {
            risks.push(RiskFactor {
                kind: RiskKind::WeeklyPattern,
                impact: spread.min(MAX_WEEKLY_IMPACT),
                description: "Completion varies strongly between weekdays".to_string(),
            });
        }

        if profile.mood_correlation < MOOD_THRESHOLD {
            risks.push(RiskFactor {
                kind: RiskKind::MoodCorrelation,
                impact: profile.mood_correlation.abs() * MOOD_IMPACT_WEIGHT,
                description: format!(
                    "Missed days line up with low mood (r = {:.2})",
                    profile.mood_correlation
                ),
            });
        }

        risks.sort_by(|a, b| b.impact.total_cmp(&a.impact));
        risks
    }
}
