use chrono::{Datelike, Days, NaiveDate};

use super::{weekday_index, Forecaster};
use crate::models::{Habit, HabitCompletion, HabitPatternProfile, MoodEntry, PredictionDataPoint};

const MOOD_WEIGHT: f64 = 0.1;
const CONFIDENCE_DECAY: f64 = 0.02;
const MIN_CONFIDENCE: f64 = 0.3;
const MAX_CONFIDENCE: f64 = 0.95;
const MIN_PROBABILITY: f64 = 0.05;
const MAX_PROBABILITY: f64 = 0.95;

impl Forecaster {
    /// Day-by-day forecast starting today, `days` points long.
    pub fn project_trajectory(
        &self,
        habit: &Habit,
        completions: &[HabitCompletion],
        days: u32,
        moods: Option<&[MoodEntry]>,
    ) -> Vec<PredictionDataPoint> {
        self.trajectory(habit, completions, days, moods).collect()
    }

    /// Lazy form of [`Forecaster::project_trajectory`]. Clone it to restart.
    pub fn trajectory(
        &self,
        habit: &Habit,
        completions: &[HabitCompletion],
        days: u32,
        moods: Option<&[MoodEntry]>,
    ) -> Trajectory {
        let profile = self.analyze_patterns(habit, completions, moods);
        Trajectory::new(profile, self.today, days)
    }
}

/// Finite iterator of forecast points over consecutive days.
#[derive(Debug, Clone)]
pub struct Trajectory {
    profile: HabitPatternProfile,
    start: NaiveDate,
    offset: u32,
    days: u32,
}

impl Trajectory {
    pub fn new(profile: HabitPatternProfile, start: NaiveDate, days: u32) -> Self {
        Self {
            profile,
            start,
            offset: 0,
            days,
        }
    }

    fn point(&self, date: NaiveDate, offset: u32) -> PredictionDataPoint {
        let p = &self.profile;
        let weekday_factor = p.cyclical_pattern[weekday_index(date.weekday())];

        let mut probability = p.base_success_rate
            * p.trend_factor
            * weekday_factor
            * p.streak_factor
            * p.recency_factor;
        if p.mood_correlation != 0.0 {
            probability *= 1.0 + p.mood_correlation * MOOD_WEIGHT;
        }
        let probability = if probability.is_finite() {
            probability.clamp(MIN_PROBABILITY, MAX_PROBABILITY)
        } else {
            0.5
        };

        let confidence = ((-(offset as f64) * CONFIDENCE_DECAY).exp() * p.recency_factor)
            .clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);

        PredictionDataPoint {
            date,
            predicted: probability > 0.5,
            confidence,
            probability,
        }
    }
}

impl Iterator for Trajectory {
    type Item = PredictionDataPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.days {
            return None;
        }
        let date = self.start.checked_add_days(Days::new(self.offset as u64))?;
        let point = self.point(date, self.offset);
        self.offset += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.days.saturating_sub(self.offset) as usize;
        (0, Some(remaining))
    }
}
