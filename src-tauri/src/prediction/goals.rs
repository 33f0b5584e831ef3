use chrono::{Datelike, Days};

use super::patterns::current_streak;
use super::{history_for, mean, Forecaster, Trajectory, GOAL_HORIZON_DAYS};
use crate::models::{
    Frequency, GoalPeriod, GoalPrediction, GoalType, Habit, HabitCompletion, MoodEntry,
    PredictionDataPoint,
};

const STREAK_GOALS: [(u32, GoalPeriod); 2] =
    [(30, GoalPeriod::ThirtyDays), (60, GoalPeriod::SixtyDays)];
const COMPLETION_TARGET: f64 = 0.8;
const COMPLETION_BOOST: f64 = 1.1;
const COMPLETION_DISCOUNT: f64 = 0.8;
const MAX_GOAL_PROBABILITY: f64 = 0.95;
const WEEKS_PER_MONTH: f64 = 4.33;
const MONTH_DAYS: usize = 30;

impl Forecaster {
    /// Odds of reaching the standard streak and completion milestones.
    pub fn predict_goals(
        &self,
        habit: &Habit,
        completions: &[HabitCompletion],
        moods: Option<&[MoodEntry]>,
    ) -> Vec<GoalPrediction> {
        let history = history_for(habit, completions);
        let profile = self.profile_from(habit, &history, moods);
        let trajectory: Vec<PredictionDataPoint> =
            Trajectory::new(profile, self.today, GOAL_HORIZON_DAYS).collect();
        self.goals_from(habit, &trajectory, current_streak(&history))
    }

    pub(super) fn goals_from(
        &self,
        habit: &Habit,
        trajectory: &[PredictionDataPoint],
        current_streak: u32,
    ) -> Vec<GoalPrediction> {
        let trajectory = &trajectory[..trajectory.len().min(GOAL_HORIZON_DAYS as usize)];
        let mut goals = Vec::new();

        // Every day in the window has to succeed for the streak to hold.
        for (target, period) in STREAK_GOALS {
            let window = &trajectory[..trajectory.len().min(target as usize)];
            let days_remaining = target.saturating_sub(current_streak);
            goals.push(GoalPrediction {
                goal_type: GoalType::Streak,
                target,
                period,
                probability: window.iter().map(|p| p.probability).product(),
                confidence: mean_confidence(window),
                estimated_date: self
                    .today
                    .checked_add_days(Days::new(days_remaining.saturating_sub(1) as u64)),
                days_remaining: Some(days_remaining),
            });
        }

        let hits = trajectory.iter().filter(|p| p.predicted).count();
        let raw = if trajectory.is_empty() {
            0.0
        } else {
            hits as f64 / trajectory.len() as f64
        };
        let probability = if raw >= COMPLETION_TARGET {
            (raw * COMPLETION_BOOST).min(MAX_GOAL_PROBABILITY)
        } else {
            raw * COMPLETION_DISCOUNT
        };
        goals.push(GoalPrediction {
            goal_type: GoalType::Completion,
            target: (COMPLETION_TARGET * 100.0) as u32,
            period: GoalPeriod::NinetyDays,
            probability,
            confidence: mean_confidence(trajectory),
            estimated_date: trajectory.last().map(|p| p.date),
            days_remaining: Some(trajectory.len() as u32),
        });

        if habit.frequency == Frequency::Weekly && !habit.target_days.is_empty() {
            let target = (habit.target_days.len() as f64 * WEEKS_PER_MONTH).round() as u32;
            let month = &trajectory[..trajectory.len().min(MONTH_DAYS)];
            let expected: f64 = month
                .iter()
                .filter(|p| habit.target_days.contains(&p.date.weekday()))
                .map(|p| p.probability)
                .sum();
            goals.push(GoalPrediction {
                goal_type: GoalType::Completion,
                target,
                period: GoalPeriod::Monthly,
                probability: (expected / target as f64).min(MAX_GOAL_PROBABILITY),
                confidence: mean_confidence(month),
                estimated_date: month.last().map(|p| p.date),
                days_remaining: Some(month.len() as u32),
            });
        }

        goals
    }
}

fn mean_confidence(window: &[PredictionDataPoint]) -> f64 {
    mean(&window.iter().map(|p| p.confidence).collect::<Vec<_>>())
}
