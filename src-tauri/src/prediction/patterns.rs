use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use super::{history_for, weekday_index, Forecaster};
use crate::models::{Habit, HabitCompletion, HabitPatternProfile, MoodEntry};

const MIN_BASE_RATE: f64 = 0.1;
const MAX_BASE_RATE: f64 = 0.9;
const SHORT_WINDOW: usize = 7;
const LONG_WINDOW: usize = 30;
const SHORT_WEIGHT: f64 = 0.7;
const LONG_WEIGHT: f64 = 0.3;
const MIN_TREND: f64 = 0.5;
const MAX_TREND: f64 = 1.5;
const STREAK_WEIGHT: f64 = 0.05;
const MAX_STREAK_FACTOR: f64 = 1.3;
const RECENCY_DECAY: f64 = 0.1;
const MIN_RECENCY: f64 = 0.3;

impl Forecaster {
    /// Summarize a habit's history into the factors the projection multiplies.
    ///
    /// With fewer than `min_history` records the neutral profile is returned.
    pub fn analyze_patterns(
        &self,
        habit: &Habit,
        completions: &[HabitCompletion],
        moods: Option<&[MoodEntry]>,
    ) -> HabitPatternProfile {
        let history = history_for(habit, completions);
        self.profile_from(habit, &history, moods)
    }

    pub(super) fn profile_from(
        &self,
        habit: &Habit,
        history: &[&HabitCompletion],
        moods: Option<&[MoodEntry]>,
    ) -> HabitPatternProfile {
        let Some(last) = history.last() else {
            log::debug!("{}: no history, using neutral profile", habit.name);
            return HabitPatternProfile::default();
        };
        if history.len() < self.config.min_history {
            log::debug!(
                "{}: only {} records, using neutral profile",
                habit.name,
                history.len()
            );
            return HabitPatternProfile::default();
        }

        let base_success_rate =
            completion_rate(history).clamp(MIN_BASE_RATE, MAX_BASE_RATE);

        let days_since = (self.today - last.date).num_days().max(0) as f64;
        let recency_factor = (-days_since * RECENCY_DECAY).exp().max(MIN_RECENCY);

        HabitPatternProfile {
            base_success_rate,
            trend_factor: trend_factor(history, base_success_rate),
            cyclical_pattern: cyclical_pattern(history),
            mood_correlation: moods
                .map(|m| mood_correlation(history, m, self.config.min_mood_pairs))
                .unwrap_or(0.0),
            streak_factor: streak_factor(current_streak(history)),
            recency_factor,
        }
    }
}

fn completion_rate(records: &[&HabitCompletion]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().filter(|c| c.completed).count() as f64 / records.len() as f64
}

/// Completion rate over the last `window` records, `None` without records.
pub(super) fn trailing_rate(history: &[&HabitCompletion], window: usize) -> Option<f64> {
    if history.is_empty() {
        return None;
    }
    let start = history.len().saturating_sub(window);
    Some(completion_rate(&history[start..]))
}

fn trend_factor(history: &[&HabitCompletion], base_rate: f64) -> f64 {
    let short = trailing_rate(history, SHORT_WINDOW).unwrap_or(base_rate);
    let long = trailing_rate(history, LONG_WINDOW).unwrap_or(base_rate);
    let recent = short * SHORT_WEIGHT + long * LONG_WEIGHT;
    (recent / base_rate).clamp(MIN_TREND, MAX_TREND)
}

/// Success rate per weekday (Sunday = 0). Days never attempted stay at 0.5.
fn cyclical_pattern(history: &[&HabitCompletion]) -> [f64; 7] {
    let mut attempts = [0u32; 7];
    let mut successes = [0u32; 7];
    for record in history {
        let idx = weekday_index(record.date.weekday());
        attempts[idx] += 1;
        if record.completed {
            successes[idx] += 1;
        }
    }

    let mut pattern = [0.5; 7];
    for (idx, rate) in pattern.iter_mut().enumerate() {
        if attempts[idx] > 0 {
            *rate = successes[idx] as f64 / attempts[idx] as f64;
        }
    }
    pattern
}

/// Pearson correlation between missed days and the composite mood score on
/// days that have both. Negative when misses line up with low mood. Zero when
/// there are too few pairs or no variance.
fn mood_correlation(history: &[&HabitCompletion], moods: &[MoodEntry], min_pairs: usize) -> f64 {
    let by_date: HashMap<NaiveDate, f64> = moods.iter().map(|m| (m.date, m.composite())).collect();

    let pairs: Vec<(f64, f64)> = history
        .iter()
        .filter_map(|c| {
            by_date
                .get(&c.date)
                .map(|&score| (if c.completed { 0.0 } else { 1.0 }, score))
        })
        .collect();

    if pairs.len() < min_pairs {
        return 0.0;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        covariance += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }

    let r = covariance / (var_x * var_y).sqrt();
    if r.is_finite() {
        r.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

fn streak_factor(streak: u32) -> f64 {
    (1.0 + (streak as f64 + 1.0).ln() * STREAK_WEIGHT).min(MAX_STREAK_FACTOR)
}

/// Completed records in a row, ending at the most recent record.
pub(super) fn current_streak(history: &[&HabitCompletion]) -> u32 {
    history.iter().rev().take_while(|c| c.completed).count() as u32
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use chrono::Weekday;

    #[test]
    fn sparse_history_gets_neutral_profile() {
        let today = date("2026-05-10");
        let h = habit("Meditate");
        let completions = history(&h, today, &[true, true, false, true, true, true]);
        let profile = Forecaster::new(today).analyze_patterns(&h, &completions, None);
        assert_eq!(profile, HabitPatternProfile::default());
    }

    #[test]
    fn other_habits_records_are_ignored() {
        let today = date("2026-05-10");
        let h = habit("Meditate");
        let other = habit("Walk");
        let completions = history(&other, today, &[true; 30]);
        let profile = Forecaster::new(today).analyze_patterns(&h, &completions, None);
        assert_eq!(profile, HabitPatternProfile::default());
    }

    #[test]
    fn perfect_run_is_clamped() {
        let today = date("2026-05-10");
        let h = habit("Water");
        let completions = history(&h, today, &[true; 90]);
        let profile = Forecaster::new(today).analyze_patterns(&h, &completions, None);

        assert_eq!(profile.base_success_rate, 0.9);
        // recent rate 1.0 normalized against the clamped base rate
        assert!((profile.trend_factor - 1.0 / 0.9).abs() < 1e-12);
        assert!(profile.streak_factor > 1.2 && profile.streak_factor <= 1.3);
        assert_eq!(profile.cyclical_pattern, [1.0; 7]);
        // last record was yesterday
        assert!((profile.recency_factor - (-0.1_f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn records_are_sorted_before_use() {
        let today = date("2026-05-10");
        let h = habit("Water");
        let mut completions = history(&h, today, &[false, false, true, true, true, true, true, true]);
        completions.reverse();
        let profile = Forecaster::new(today).analyze_patterns(&h, &completions, None);
        assert!((profile.streak_factor - streak_factor(6)).abs() < 1e-12);
    }

    #[test]
    fn trend_tracks_recent_momentum() {
        let today = date("2026-05-10");
        let h = habit("Piano");
        let mut outcomes = vec![false; 23];
        outcomes.extend([true; 7]);
        let completions = history(&h, today, &outcomes);
        let profile = Forecaster::new(today).analyze_patterns(&h, &completions, None);

        let base: f64 = 7.0 / 30.0;
        let expected = ((0.7 * 1.0 + 0.3 * base) / base).min(1.5);
        assert!((profile.base_success_rate - base).abs() < 1e-12);
        assert!((profile.trend_factor - expected).abs() < 1e-12);
    }

    #[test]
    fn mondays_only_habit() {
        // Sunday 2026-03-01 through Saturday 2026-05-09: ten full weeks.
        let today = date("2026-05-10");
        let h = habit("Mow lawn");
        let start = date("2026-03-01");
        let completions: Vec<HabitCompletion> = (0..70)
            .map(|i| {
                let day = start + chrono::Duration::days(i);
                HabitCompletion {
                    habit_id: h.id,
                    date: day,
                    completed: day.weekday() == Weekday::Mon,
                }
            })
            .collect();
        let profile = Forecaster::new(today).analyze_patterns(&h, &completions, None);
        assert_eq!(profile.cyclical_pattern, [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

        // only Mondays were ever attempted
        let mondays: Vec<HabitCompletion> = completions.into_iter().filter(|c| c.completed).collect();
        let profile = Forecaster::new(today).analyze_patterns(&h, &mondays, None);
        assert_eq!(profile.cyclical_pattern, [0.5, 1.0, 0.5, 0.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn mood_correlation_needs_enough_pairs() {
        let today = date("2026-05-10");
        let h = habit("Yoga");
        let outcomes: Vec<bool> = (0..20).map(|i| i % 2 == 0).collect();
        let completions = history(&h, today, &outcomes);
        let moods: Vec<MoodEntry> = completions
            .iter()
            .rev()
            .take(4)
            .map(|c| mood(c.date, if c.completed { 5 } else { 1 }))
            .collect();
        let profile = Forecaster::new(today).analyze_patterns(&h, &completions, Some(moods.as_slice()));
        assert_eq!(profile.mood_correlation, 0.0);
    }

    #[test]
    fn low_mood_on_missed_days_is_negative() {
        let today = date("2026-05-10");
        let h = habit("Yoga");
        let outcomes: Vec<bool> = (0..14).map(|i| i % 2 == 0).collect();
        let completions = history(&h, today, &outcomes);
        let moods: Vec<MoodEntry> = completions
            .iter()
            .map(|c| mood(c.date, if c.completed { 4 } else { 1 }))
            .collect();
        let profile = Forecaster::new(today).analyze_patterns(&h, &completions, Some(moods.as_slice()));
        assert!(profile.mood_correlation < -0.3);
        assert!((profile.mood_correlation + 1.0).abs() < 1e-9);
    }

    #[test]
    fn low_mood_on_completed_days_is_positive() {
        let today = date("2026-05-10");
        let h = habit("Yoga");
        let outcomes: Vec<bool> = (0..20).map(|i| i % 2 == 0).collect();
        let completions = history(&h, today, &outcomes);
        let moods: Vec<MoodEntry> = completions
            .iter()
            .map(|c| mood(c.date, if c.completed { 1 } else { 5 }))
            .collect();
        let profile = Forecaster::new(today).analyze_patterns(&h, &completions, Some(moods.as_slice()));
        assert!((profile.mood_correlation - 1.0).abs() < 1e-9);
    }

    #[test]
    fn flat_mood_has_no_correlation() {
        let today = date("2026-05-10");
        let h = habit("Yoga");
        let outcomes: Vec<bool> = (0..20).map(|i| i % 2 == 0).collect();
        let completions = history(&h, today, &outcomes);
        let moods: Vec<MoodEntry> = completions.iter().map(|c| mood(c.date, 3)).collect();
        let profile = Forecaster::new(today).analyze_patterns(&h, &completions, Some(moods.as_slice()));
        assert_eq!(profile.mood_correlation, 0.0);
    }

    #[test]
    fn stale_history_decays_to_floor() {
        let today = date("2026-05-10");
        let h = habit("Guitar");
        let completions = history(&h, today - chrono::Duration::days(60), &[true; 10]);
        let profile = Forecaster::new(today).analyze_patterns(&h, &completions, None);
        assert_eq!(profile.recency_factor, 0.3);
    }

    #[test]
    fn streak_counts_from_latest_record() {
        let today = date("2026-05-10");
        let h = habit("Guitar");
        let completions = history(&h, today, &[true, true, false, true, true, true]);
        let history: Vec<&HabitCompletion> = completions.iter().collect();
        assert_eq!(current_streak(&history), 3);
        assert_eq!(streak_factor(0), 1.0);
        assert_eq!(streak_factor(10_000), 1.3);
    }
}
