use std::collections::BTreeMap;

use super::{day_name, weekday_index, Forecaster};
use crate::models::{Habit, HabitCompletion, MoodEntry, ScheduleOptimization, WEEKDAYS};

const MAX_OPTIMAL_DAYS: usize = 3;
const LOW_BASE_RATE: f64 = 0.4;
const WEAK_DAY_RATE: f64 = 0.3;
const MAX_LOAD_SPREAD: u32 = 2;

impl Forecaster {
    /// Suggest better weekdays per habit and check how evenly the week is loaded.
    pub fn optimize_schedule(
        &self,
        habits: &[Habit],
        completions: &[HabitCompletion],
        moods: Option<&[MoodEntry]>,
    ) -> ScheduleOptimization {
        let mut ranked: Vec<(f64, String)> = Vec::new();
        let mut optimal_days = BTreeMap::new();
        let mut load_distribution = [0u32; 7];

        for habit in habits {
            let profile = self.analyze_patterns(habit, completions, moods);
            let pattern = profile.cyclical_pattern;

            let mut scheduled = [false; 7];
            for day in habit.scheduled_days() {
                scheduled[weekday_index(day)] = true;
            }
            for (load, on) in load_distribution.iter_mut().zip(scheduled) {
                if on {
                    *load += 1;
                }
            }

            // stable sort keeps Sunday-first order among equal rates
            let mut by_rate = WEEKDAYS.to_vec();
            by_rate.sort_by(|a, b| pattern[weekday_index(*b)].total_cmp(&pattern[weekday_index(*a)]));
            let count = MAX_OPTIMAL_DAYS.min(scheduled.iter().filter(|on| **on).count());
            by_rate.truncate(count);
            optimal_days.insert(habit.id, by_rate);

            if profile.base_success_rate < LOW_BASE_RATE {
                ranked.push((
                    (LOW_BASE_RATE - profile.base_success_rate) / LOW_BASE_RATE,
                    format!(
                        "{} succeeds only {:.0}% of the time. Try scheduling it less often until it sticks.",
                        habit.name,
                        profile.base_success_rate * 100.0
                    ),
                ));
            }

            // only days the habit is actually scheduled on can be moved away from
            let worst = WEEKDAYS
                .iter()
                .copied()
                .filter(|day| scheduled[weekday_index(*day)])
                .min_by(|a, b| pattern[weekday_index(*a)].total_cmp(&pattern[weekday_index(*b)]));
            let Some(worst) = worst else { continue };
            let worst_rate = pattern[weekday_index(worst)];
            if worst_rate < WEAK_DAY_RATE {
                ranked.push((
                    (WEAK_DAY_RATE - worst_rate) / WEAK_DAY_RATE,
                    format!(
                        "{} is hardest on {}s ({:.0}% success). Consider moving it to another day.",
                        habit.name,
                        day_name(worst),
                        worst_rate * 100.0
                    ),
                ));
            }
        }

        let busiest = load_distribution.iter().copied().max().unwrap_or(0);
        let quietest = load_distribution.iter().copied().min().unwrap_or(0);
        if busiest - quietest > MAX_LOAD_SPREAD {
            let (busy_idx, _) = load_distribution
                .iter()
                .enumerate()
                .find(|(_, load)| **load == busiest)
                .unwrap_or((0, &0));
            let (quiet_idx, _) = load_distribution
                .iter()
                .enumerate()
                .find(|(_, load)| **load == quietest)
                .unwrap_or((0, &0));
            ranked.push((
                ((busiest - quietest) as f64 / habits.len().max(1) as f64).min(1.0),
                format!(
                    "{} carries {} habits while {} has {}. Spread them more evenly across the week.",
                    day_name(WEEKDAYS[busy_idx]),
                    busiest,
                    day_name(WEEKDAYS[quiet_idx]),
                    quietest
                ),
            ));
        }

        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
        let recommendations = ranked
            .into_iter()
            .take(self.config.max_recommendations)
            .map(|(_, text)| text)
            .collect();

        ScheduleOptimization {
            recommendations,
            optimal_days,
            load_distribution,
        }
    }
}
