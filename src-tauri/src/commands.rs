use chrono::{NaiveDate, Weekday};
use std::sync::Mutex;
use tauri::State;
use uuid::Uuid;
use zeroize::Zeroize;

use habitkin::models::*;
use habitkin::prediction::{aggregate_analytics, habit_stats, Forecaster};
use habitkin::storage::Vault;
use habitkin::PredictionConfig;

/// App state holding the decrypted data and passphrase while unlocked.
pub struct AppState {
    pub vault: Vault,
    pub passphrase: Mutex<Option<String>>,
    pub data: Mutex<Option<AppData>>,
}

impl AppState {
    pub fn new(vault: Vault) -> Self {
        Self {
            vault,
            passphrase: Mutex::new(None),
            data: Mutex::new(None),
        }
    }

    /// Lock the app: zeroize passphrase and drop data from memory.
    pub fn lock(&self) {
        if let Ok(mut pass) = self.passphrase.lock() {
            if let Some(ref mut p) = *pass {
                p.zeroize();
            }
            *pass = None;
        }
        if let Ok(mut data) = self.data.lock() {
            *data = None;
        }
    }

    fn save_data(&self) -> Result<(), String> {
        let pass = self.passphrase.lock().map_err(|e| e.to_string())?;
        let data = self.data.lock().map_err(|e| e.to_string())?;
        match (pass.as_ref(), data.as_ref()) {
            (Some(p), Some(d)) => self.vault.save(p, d).map_err(|e| e.to_string()),
            _ => Err("app is locked".into()),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&AppData) -> T) -> Result<T, String> {
        let data_lock = self.data.lock().map_err(|e| e.to_string())?;
        let data = data_lock.as_ref().ok_or("app is locked")?;
        Ok(f(data))
    }

    /// Apply a change to the unlocked data and persist it.
    fn update<T>(&self, f: impl FnOnce(&mut AppData) -> Result<T, String>) -> Result<T, String> {
        let mut data_lock = self.data.lock().map_err(|e| e.to_string())?;
        let data = data_lock.as_mut().ok_or("app is locked")?;
        let out = f(data)?;
        drop(data_lock);
        self.save_data()?;
        Ok(out)
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn parse_date(date: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| e.to_string())
}

fn forecaster(data: &AppData) -> Forecaster {
    Forecaster::with_config(today(), data.settings.prediction.clone())
}

fn moods(data: &AppData) -> Option<&[MoodEntry]> {
    data.settings
        .show_mood_insights
        .then_some(data.moods.as_slice())
}

fn find_habit(data: &AppData, habit_id: Uuid) -> Result<&Habit, String> {
    data.habits
        .iter()
        .find(|h| h.id == habit_id)
        .ok_or_else(|| format!("unknown habit {habit_id}"))
}

fn predict_all(forecaster: &Forecaster, data: &AppData) -> Vec<HabitPrediction> {
    data.habits
        .iter()
        .map(|habit| {
            let stats = habit_stats(habit.id, &data.completions);
            forecaster.generate_prediction(habit, &data.completions, &stats, moods(data))
        })
        .collect()
}

#[tauri::command]
pub fn is_setup(state: State<'_, AppState>) -> Result<bool, String> {
    Ok(state.vault.exists())
}

#[tauri::command]
pub fn setup(passphrase: String, state: State<'_, AppState>) -> Result<(), String> {
    let data = AppData::default();
    state.vault.save(&passphrase, &data).map_err(|e| e.to_string())?;

    *state.passphrase.lock().map_err(|e| e.to_string())? = Some(passphrase);
    *state.data.lock().map_err(|e| e.to_string())? = Some(data);

    Ok(())
}

#[tauri::command]
pub fn unlock(passphrase: String, state: State<'_, AppState>) -> Result<bool, String> {
    match state.vault.load(&passphrase) {
        Ok(data) => {
            *state.passphrase.lock().map_err(|e| e.to_string())? = Some(passphrase);
            *state.data.lock().map_err(|e| e.to_string())? = Some(data);
            Ok(true)
        }
        Err(e) => {
            log::warn!("unlock failed: {e}");
            Ok(false)
        }
    }
}

#[tauri::command]
pub fn lock(state: State<'_, AppState>) -> Result<(), String> {
    state.lock();
    Ok(())
}

#[tauri::command]
pub fn save_habit(
    id: Option<Uuid>,
    name: String,
    member: Option<String>,
    frequency: Frequency,
    target_days: Vec<Weekday>,
    state: State<'_, AppState>,
) -> Result<Habit, String> {
    let habit = Habit {
        id: id.unwrap_or_else(Uuid::new_v4),
        name,
        member,
        frequency,
        target_days,
    };
    state.update(|data| {
        data.upsert_habit(habit.clone()).map_err(|e| e.to_string())?;
        find_habit(data, habit.id).cloned()
    })
}

#[tauri::command]
pub fn delete_habit(habit_id: Uuid, state: State<'_, AppState>) -> Result<(), String> {
    state.update(|data| data.remove_habit(habit_id).map_err(|e| e.to_string()))
}

#[tauri::command]
pub fn log_completion(
    habit_id: Uuid,
    date: String,
    completed: bool,
    state: State<'_, AppState>,
) -> Result<(), String> {
    let date = parse_date(&date)?;
    state.update(|data| {
        data.log_completion(habit_id, date, completed)
            .map_err(|e| e.to_string())
    })
}

#[tauri::command]
pub fn log_mood(
    date: String,
    mood: u8,
    energy: u8,
    stress: u8,
    sleep: u8,
    state: State<'_, AppState>,
) -> Result<(), String> {
    let date = parse_date(&date)?;
    state.update(|data| {
        data.log_mood(MoodEntry {
            date,
            mood,
            energy,
            stress,
            sleep,
        });
        Ok(())
    })
}

#[tauri::command]
pub fn get_habits(state: State<'_, AppState>) -> Result<Vec<Habit>, String> {
    state.read(|data| data.habits.clone())
}

#[tauri::command]
pub fn get_stats(habit_id: Uuid, state: State<'_, AppState>) -> Result<HabitStats, String> {
    state.read(|data| habit_stats(habit_id, &data.completions))
}

#[tauri::command]
pub fn get_prediction(
    habit_id: Uuid,
    state: State<'_, AppState>,
) -> Result<HabitPrediction, String> {
    state.read(|data| {
        let habit = find_habit(data, habit_id)?;
        let stats = habit_stats(habit.id, &data.completions);
        Ok(forecaster(data).generate_prediction(habit, &data.completions, &stats, moods(data)))
    })?
}

#[tauri::command]
pub fn get_dashboard(state: State<'_, AppState>) -> Result<DashboardData, String> {
    state.read(|data| {
        let forecaster = forecaster(data);
        let predictions = predict_all(&forecaster, data);
        let analytics = aggregate_analytics(&data.habits, &predictions);
        let schedule = forecaster.optimize_schedule(&data.habits, &data.completions, moods(data));
        DashboardData {
            today: forecaster.today(),
            predictions,
            analytics,
            schedule,
        }
    })
}

#[tauri::command]
pub fn get_schedule(state: State<'_, AppState>) -> Result<ScheduleOptimization, String> {
    state.read(|data| forecaster(data).optimize_schedule(&data.habits, &data.completions, moods(data)))
}

#[tauri::command]
pub fn get_settings(state: State<'_, AppState>) -> Result<AppSettings, String> {
    state.read(|data| data.settings.clone())
}

#[tauri::command]
pub fn update_settings(
    auto_lock_minutes: u32,
    show_mood_insights: bool,
    prediction: PredictionConfig,
    state: State<'_, AppState>,
) -> Result<AppSettings, String> {
    state.update(|data| {
        data.settings.auto_lock_minutes = auto_lock_minutes.clamp(1, 60);
        data.settings.show_mood_insights = show_mood_insights;
        data.settings.prediction = prediction.sanitized();
        Ok(data.settings.clone())
    })
}

#[tauri::command]
pub fn export_data(state: State<'_, AppState>) -> Result<String, String> {
    state.read(|data| serde_json::to_string_pretty(data).map_err(|e| e.to_string()))?
}

#[tauri::command]
pub fn wipe_all_data(state: State<'_, AppState>) -> Result<(), String> {
    state.lock();
    state.vault.wipe().map_err(|e| e.to_string())
}
