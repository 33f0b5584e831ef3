use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{AppData, Habit, HabitCompletion, MoodEntry};

#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("unknown habit {0}")]
    UnknownHabit(Uuid),
    #[error("habit name must not be empty")]
    EmptyName,
}

impl AppData {
    /// Insert a habit, or replace the one with the same id.
    pub fn upsert_habit(&mut self, mut habit: Habit) -> Result<(), JournalError> {
        habit.name = habit.name.trim().to_string();
        if habit.name.is_empty() {
            return Err(JournalError::EmptyName);
        }
        habit.target_days.sort_by_key(|d| d.num_days_from_sunday());
        habit.target_days.dedup();

        match self.habits.iter_mut().find(|h| h.id == habit.id) {
            Some(existing) => *existing = habit,
            None => self.habits.push(habit),
        }
        Ok(())
    }

    /// Remove a habit together with its completion history.
    pub fn remove_habit(&mut self, habit_id: Uuid) -> Result<(), JournalError> {
        let before = self.habits.len();
        self.habits.retain(|h| h.id != habit_id);
        if self.habits.len() == before {
            return Err(JournalError::UnknownHabit(habit_id));
        }
        self.completions.retain(|c| c.habit_id != habit_id);
        Ok(())
    }

    /// Record the outcome for a habit on a day. One record per habit per day.
    pub fn log_completion(
        &mut self,
        habit_id: Uuid,
        date: NaiveDate,
        completed: bool,
    ) -> Result<(), JournalError> {
        if !self.habits.iter().any(|h| h.id == habit_id) {
            return Err(JournalError::UnknownHabit(habit_id));
        }

        if let Some(existing) = self
            .completions
            .iter_mut()
            .find(|c| c.habit_id == habit_id && c.date == date)
        {
            existing.completed = completed;
        } else {
            self.completions.push(HabitCompletion {
                habit_id,
                date,
                completed,
            });
        }
        Ok(())
    }

    /// Record the day's mood, replacing an earlier entry for the same date.
    pub fn log_mood(&mut self, mut entry: MoodEntry) {
        entry.mood = entry.mood.clamp(1, 5);
        entry.energy = entry.energy.clamp(1, 5);
        entry.stress = entry.stress.clamp(1, 5);
        entry.sleep = entry.sleep.clamp(1, 5);

        self.moods.retain(|m| m.date != entry.date);
        self.moods.push(entry);
        self.moods.sort_by_key(|m| m.date);
    }

    pub fn completions_for(&self, habit_id: Uuid) -> Vec<HabitCompletion> {
        let mut out: Vec<HabitCompletion> = self
            .completions
            .iter()
            .filter(|c| c.habit_id == habit_id)
            .cloned()
            .collect();
        out.sort_by_key(|c| c.date);
        out
    }
}
