use chrono::Datelike;

use super::{mean, weekday_index};
use crate::models::{Habit, HabitPrediction, PredictionAnalytics, RiskLevel, WEEKDAYS};

/// Forecast days considered "near term" for portfolio averages.
const NEAR_TERM_DAYS: usize = 30;
const LOAD_HEADROOM: f64 = 2.0;

/// Roll individual habit predictions up into portfolio metrics.
pub fn aggregate_analytics(habits: &[Habit], predictions: &[HabitPrediction]) -> PredictionAnalytics {
    let near_term: Vec<f64> = predictions
        .iter()
        .filter(|p| !p.predictions.is_empty())
        .map(|p| {
            let window = &p.predictions[..p.predictions.len().min(NEAR_TERM_DAYS)];
            mean(&window.iter().map(|d| d.probability).collect::<Vec<_>>())
        })
        .collect();
    let average_success_probability = mean(&near_term);

    let goal_probabilities: Vec<f64> = predictions
        .iter()
        .flat_map(|p| p.goals.iter().map(|g| g.probability))
        .collect();

    let mut sums = [0.0; 7];
    let mut counts = [0u32; 7];
    for prediction in predictions {
        for point in prediction.predictions.iter().take(NEAR_TERM_DAYS) {
            let idx = weekday_index(point.date.weekday());
            sums[idx] += point.probability;
            counts[idx] += 1;
        }
    }
    let mut best: Option<(usize, f64)> = None;
    let mut worst: Option<(usize, f64)> = None;
    for idx in 0..7 {
        if counts[idx] == 0 {
            continue;
        }
        let avg = sums[idx] / counts[idx] as f64;
        if best.map_or(true, |(_, b)| avg > b) {
            best = Some((idx, avg));
        }
        if worst.map_or(true, |(_, w)| avg < w) {
            worst = Some((idx, avg));
        }
    }

    let optimal = (habits.len() as f64 * average_success_probability + LOAD_HEADROOM).floor();

    PredictionAnalytics {
        total_habits: habits.len(),
        average_success_probability,
        high_risk_habits: predictions
            .iter()
            .filter(|p| p.risk_level == RiskLevel::High)
            .count(),
        average_goal_probability: mean(&goal_probabilities),
        optimal_habit_load: optimal.max(0.0) as usize,
        best_weekday: best.map(|(idx, _)| WEEKDAYS[idx]),
        worst_weekday: worst.map(|(idx, _)| WEEKDAYS[idx]),
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::super::{habit_stats, Forecaster};
    use super::*;
    use chrono::Weekday;

    #[test]
    fn empty_portfolio_uses_defaults() {
        let analytics = aggregate_analytics(&[], &[]);
        assert_eq!(analytics.total_habits, 0);
        assert_eq!(analytics.average_success_probability, 0.0);
        assert_eq!(analytics.high_risk_habits, 0);
        assert_eq!(analytics.optimal_habit_load, 2);
        assert_eq!(analytics.best_weekday, None);
        assert_eq!(analytics.worst_weekday, None);
    }

    #[test]
    fn portfolio_metrics_combine_habits() {
        let today = date("2026-04-05");
        let forecaster = Forecaster::new(today);

        let strong = habit("Brush teeth");
        let weak = habit("Practice violin");
        let mut completions = history(&strong, today, &[true; 60]);
        let weak_outcomes: Vec<bool> = (0..30).map(|i| i < 20).collect();
        completions.extend(history(&weak, today, &weak_outcomes));

        let habits = vec![strong, weak];
        let predictions: Vec<HabitPrediction> = habits
            .iter()
            .map(|h| {
                let stats = habit_stats(h.id, &completions);
                forecaster.generate_prediction(h, &completions, &stats, None)
            })
            .collect();
        let analytics = aggregate_analytics(&habits, &predictions);

        assert_eq!(analytics.total_habits, 2);
        assert_eq!(analytics.high_risk_habits, 1);
        assert!(analytics.average_success_probability > 0.05);
        assert!(analytics.average_success_probability < 0.95);
        let expected_load = (2.0 * analytics.average_success_probability + 2.0).floor() as usize;
        assert_eq!(analytics.optimal_habit_load, expected_load);
        assert!(analytics.best_weekday.is_some());
    }

    #[test]
    fn weekday_extremes_come_from_forecasts() {
        let today = date("2026-04-05");
        let h = habit("Swim practice");
        let start = today - chrono::Duration::days(28);
        let completions: Vec<_> = (0..28)
            .map(|i| {
                let day = start + chrono::Duration::days(i);
                crate::models::HabitCompletion {
                    habit_id: h.id,
                    date: day,
                    completed: day.weekday() != Weekday::Wed,
                }
            })
            .collect();
        let stats = habit_stats(h.id, &completions);
        let prediction = Forecaster::new(today).generate_prediction(&h, &completions, &stats, None);
        let analytics = aggregate_analytics(&[h], &[prediction]);

        assert_eq!(analytics.worst_weekday, Some(Weekday::Wed));
        assert!(analytics.best_weekday.is_some());
        assert_ne!(analytics.best_weekday, Some(Weekday::Wed));
    }
}
