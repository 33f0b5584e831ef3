use uuid::Uuid;

use crate::models::{HabitCompletion, HabitStats};

/// Streak and completion statistics for the stats view.
pub fn habit_stats(habit_id: Uuid, completions: &[HabitCompletion]) -> HabitStats {
    let mut records: Vec<&HabitCompletion> =
        completions.iter().filter(|c| c.habit_id == habit_id).collect();
    records.sort_by_key(|c| c.date);

    if records.is_empty() {
        return HabitStats::default();
    }

    let completed_days = records.iter().filter(|c| c.completed).count();

    let mut longest_streak = 0u32;
    let mut run = 0u32;
    for record in &records {
        if record.completed {
            run += 1;
            longest_streak = longest_streak.max(run);
        } else {
            run = 0;
        }
    }

    HabitStats {
        total_days: records.len(),
        completed_days,
        completion_rate: completed_days as f64 / records.len() as f64,
        current_streak: run,
        longest_streak,
        last_completed: records.iter().rev().find(|c| c.completed).map(|c| c.date),
    }
}
