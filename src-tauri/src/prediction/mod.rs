//! Habit trend forecasting.
//!
//! Everything here is a pure function of the records passed in and the
//! reference date the [`Forecaster`] was built with. Nothing is cached between
//! calls, so the same inputs always produce the same output.

mod analytics;
mod goals;
mod patterns;
mod risk;
mod schedule;
mod stats;
mod trajectory;

use chrono::{NaiveDate, Weekday};

use crate::config::PredictionConfig;
use crate::models::{
    Habit, HabitCompletion, HabitPatternProfile, HabitPrediction, HabitStats, MoodEntry,
    PredictionDataPoint, RiskFactor, RiskKind, RiskLevel, TrendDirection, WEEKDAYS,
};

pub use analytics::aggregate_analytics;
pub use stats::habit_stats;
pub use trajectory::Trajectory;

/// Days projected when estimating goal achievement.
const GOAL_HORIZON_DAYS: u32 = 90;
/// Window length used when comparing the first two forecast fortnights.
const TREND_WINDOW_DAYS: usize = 14;
const TREND_THRESHOLD: f64 = 0.05;
/// Best/worst weekday gap above which a day-specific suggestion is made.
const WEEKDAY_GAP_THRESHOLD: f64 = 0.3;

/// Forecasting engine bound to a reference date.
#[derive(Debug, Clone)]
pub struct Forecaster {
    today: NaiveDate,
    config: PredictionConfig,
}

impl Forecaster {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            config: PredictionConfig::default(),
        }
    }

    pub fn with_config(today: NaiveDate, config: PredictionConfig) -> Self {
        Self {
            today,
            config: config.sanitized(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    /// Full prediction for one habit: trajectory, risks, goals and advice.
    pub fn generate_prediction(
        &self,
        habit: &Habit,
        completions: &[HabitCompletion],
        stats: &HabitStats,
        moods: Option<&[MoodEntry]>,
    ) -> HabitPrediction {
        let history = history_for(habit, completions);
        let profile = self.profile_from(habit, &history, moods);

        let horizon = self.config.horizon_days.max(GOAL_HORIZON_DAYS);
        let mut predictions: Vec<PredictionDataPoint> =
            Trajectory::new(profile.clone(), self.today, horizon).collect();

        let risk_factors = self.risks_from(&history, &profile);
        let goals = self.goals_from(habit, &predictions, patterns::current_streak(&history));
        predictions.truncate(self.config.horizon_days as usize);

        let trend = classify_trend(&predictions);
        let risk_level = classify_risk(&risk_factors);
        let next_risk_date = predictions
            .iter()
            .find(|p| p.probability < self.config.risk_threshold)
            .map(|p| p.date);
        let recommendations = self.recommend(habit, &profile, trend, &risk_factors);
        let confidence = mean(&predictions.iter().map(|p| p.confidence).collect::<Vec<_>>());

        log::debug!(
            "prediction for {}: trend {:?}, risk {:?}, {} goals",
            habit.name,
            trend,
            risk_level,
            goals.len()
        );

        HabitPrediction {
            habit_id: habit.id,
            habit_name: habit.name.clone(),
            current_streak: stats.current_streak,
            predictions,
            trend,
            risk_level,
            risk_factors,
            goals,
            recommendations,
            confidence,
            next_risk_date,
        }
    }

    fn recommend(
        &self,
        habit: &Habit,
        profile: &HabitPatternProfile,
        trend: TrendDirection,
        risks: &[RiskFactor],
    ) -> Vec<String> {
        let mut out = Vec::new();

        match trend {
            TrendDirection::Declining => out.push(format!(
                "{} is slipping. Consider temporarily reducing how often you do it to rebuild momentum.",
                habit.name
            )),
            TrendDirection::Improving => out.push(format!(
                "{} is on an upswing. This is a good time to pair it with a complementary habit.",
                habit.name
            )),
            TrendDirection::Stable => {}
        }

        out.extend(risks.iter().take(2).map(|r| risk_advice(habit, r.kind)));

        let (best, worst) = best_and_worst_days(&profile.cyclical_pattern);
        let gap = profile.cyclical_pattern[weekday_index(best)]
            - profile.cyclical_pattern[weekday_index(worst)];
        if gap > WEEKDAY_GAP_THRESHOLD {
            out.push(format!(
                "You complete {} most reliably on {}s. {}s are harder, so plan for them the day before.",
                habit.name,
                day_name(best),
                day_name(worst)
            ));
        }

        out.truncate(self.config.max_recommendations);
        out
    }
}

fn risk_advice(habit: &Habit, kind: RiskKind) -> String {
    match kind {
        RiskKind::RecentPerformance => format!(
            "{} dropped off this week. Try a smaller version of it for a few days.",
            habit.name
        ),
        RiskKind::StreakLength => format!(
            "{} has a long streak going. Plan an occasional easy day to avoid burnout.",
            habit.name
        ),
        RiskKind::WeeklyPattern => format!(
            "{} is much less reliable on some weekdays. Anchor it to a fixed time or routine.",
            habit.name
        ),
        RiskKind::MoodCorrelation => format!(
            "{} tends to suffer when your mood dips. Keep a minimal version ready for low days.",
            habit.name
        ),
        RiskKind::FrequencyMismatch => format!(
            "The schedule for {} may not match how often it really happens. Adjust its target days.",
            habit.name
        ),
    }
}

fn classify_trend(predictions: &[PredictionDataPoint]) -> TrendDirection {
    let window = |range: std::ops::Range<usize>| -> f64 {
        let probs: Vec<f64> = predictions
            .get(range)
            .unwrap_or_default()
            .iter()
            .map(|p| p.probability)
            .collect();
        mean(&probs)
    };
    let early = window(0..TREND_WINDOW_DAYS);
    let late = window(TREND_WINDOW_DAYS..TREND_WINDOW_DAYS * 2);
    let delta = late - early;

    if delta > TREND_THRESHOLD {
        TrendDirection::Improving
    } else if delta < -TREND_THRESHOLD {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    }
}

fn classify_risk(risks: &[RiskFactor]) -> RiskLevel {
    let total: f64 = risks.iter().map(|r| r.impact).sum();
    if total < 0.3 {
        RiskLevel::Low
    } else if total < 0.6 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// Records of one habit, oldest first.
fn history_for<'a>(habit: &Habit, completions: &'a [HabitCompletion]) -> Vec<&'a HabitCompletion> {
    let mut history: Vec<&HabitCompletion> = completions
        .iter()
        .filter(|c| c.habit_id == habit.id)
        .collect();
    history.sort_by_key(|c| c.date);
    history
}

pub(crate) fn weekday_index(day: Weekday) -> usize {
    day.num_days_from_sunday() as usize
}

/// Highest and lowest scoring weekday; ties go to the earlier day in the week.
pub(crate) fn best_and_worst_days(pattern: &[f64; 7]) -> (Weekday, Weekday) {
    let mut best = 0;
    let mut worst = 0;
    for (i, rate) in pattern.iter().enumerate() {
        if *rate > pattern[best] {
            best = i;
        }
        if *rate < pattern[worst] {
            worst = i;
        }
    }
    (WEEKDAYS[best], WEEKDAYS[worst])
}

pub(crate) fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
fn std_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn prediction_uses_configured_horizon() {
        let today = date("2026-06-01");
        let h = habit("Stretch");
        let completions = history(&h, today, &[true; 20]);
        let config = PredictionConfig {
            horizon_days: 30,
            ..PredictionConfig::default()
        };
        let forecaster = Forecaster::with_config(today, config);
        let stats = habit_stats(h.id, &completions);
        let prediction = forecaster.generate_prediction(&h, &completions, &stats, None);

        assert_eq!(prediction.predictions.len(), 30);
        assert_eq!(prediction.goals.len(), 3);
        assert_eq!(prediction.current_streak, 20);
    }

    #[test]
    fn identical_inputs_give_identical_predictions() {
        let today = date("2026-06-01");
        let h = habit("Journal");
        let outcomes: Vec<bool> = (0..40).map(|i| i % 3 != 0).collect();
        let completions = history(&h, today, &outcomes);
        let moods: Vec<MoodEntry> = completions
            .iter()
            .map(|c| mood(c.date, if c.completed { 4 } else { 2 }))
            .collect();
        let stats = habit_stats(h.id, &completions);
        let forecaster = Forecaster::new(today);

        let first = forecaster.generate_prediction(&h, &completions, &stats, Some(moods.as_slice()));
        let second = forecaster.generate_prediction(&h, &completions, &stats, Some(moods.as_slice()));
        assert_eq!(first, second);
    }

    #[test]
    fn cold_start_is_stable_and_low_risk() {
        let today = date("2026-06-01");
        let h = habit("Floss");
        let completions = history(&h, today, &[true, true, true]);
        let stats = habit_stats(h.id, &completions);
        let prediction = Forecaster::new(today).generate_prediction(&h, &completions, &stats, None);

        assert_eq!(prediction.trend, TrendDirection::Stable);
        assert_eq!(prediction.risk_level, RiskLevel::Low);
        assert!(prediction.risk_factors.is_empty());
        // neutral base rate times neutral weekday factor
        assert!(prediction
            .predictions
            .iter()
            .all(|p| (p.probability - 0.25).abs() < 1e-12 && !p.predicted));
        assert_eq!(prediction.next_risk_date, Some(today));
    }

    #[test]
    fn failing_habit_is_flagged() {
        let today = date("2026-06-01");
        let h = habit("Run");
        let mut outcomes = vec![true; 20];
        outcomes.extend([false; 10]);
        let completions = history(&h, today, &outcomes);
        let stats = habit_stats(h.id, &completions);
        let prediction = Forecaster::new(today).generate_prediction(&h, &completions, &stats, None);

        assert_eq!(prediction.next_risk_date, Some(today));
        assert!(prediction
            .risk_factors
            .iter()
            .any(|r| r.kind == RiskKind::RecentPerformance));
        assert_ne!(prediction.risk_level, RiskLevel::Low);
        assert!(prediction.recommendations.len() <= 5);
        assert!(prediction.recommendations.iter().any(|r| r.contains("dropped off")));
    }

    #[test]
    fn trend_classification_compares_fortnights() {
        let point = |probability: f64| PredictionDataPoint {
            date: date("2026-06-01"),
            predicted: probability > 0.5,
            confidence: 0.5,
            probability,
        };
        let mut rising = vec![point(0.4); 14];
        rising.extend(vec![point(0.6); 14]);
        assert_eq!(classify_trend(&rising), TrendDirection::Improving);

        let mut falling = vec![point(0.8); 14];
        falling.extend(vec![point(0.6); 14]);
        assert_eq!(classify_trend(&falling), TrendDirection::Declining);

        let mut flat = vec![point(0.5); 14];
        flat.extend(vec![point(0.53); 14]);
        assert_eq!(classify_trend(&flat), TrendDirection::Stable);

        assert_eq!(classify_trend(&[]), TrendDirection::Stable);
    }

    #[test]
    fn risk_level_thresholds() {
        let risk = |impact: f64| RiskFactor {
            kind: RiskKind::WeeklyPattern,
            impact,
            description: String::new(),
        };
        assert_eq!(classify_risk(&[]), RiskLevel::Low);
        assert_eq!(classify_risk(&[risk(0.2), risk(0.2)]), RiskLevel::Medium);
        assert_eq!(classify_risk(&[risk(0.3), risk(0.3)]), RiskLevel::High);
    }

    #[test]
    fn best_and_worst_prefer_earlier_day_on_ties() {
        let (best, worst) = best_and_worst_days(&[0.5; 7]);
        assert_eq!(best, Weekday::Sun);
        assert_eq!(worst, Weekday::Sun);
        let mut pattern = [0.5; 7];
        pattern[1] = 1.0;
        pattern[5] = 0.0;
        assert_eq!(best_and_worst_days(&pattern), (Weekday::Mon, Weekday::Fri));
    }
}
