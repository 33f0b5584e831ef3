// Prevents additional console window on Windows in release
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod commands;

use commands::AppState;
use habitkin::storage::Vault;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let vault = Vault::default_location().expect("no local data directory for habitkin");
    log::info!("using vault at {}", vault.dir().display());

    tauri::Builder::default()
        .manage(AppState::new(vault))
        .invoke_handler(tauri::generate_handler![
            commands::is_setup,
            commands::setup,
            commands::unlock,
            commands::lock,
            commands::save_habit,
            commands::delete_habit,
            commands::log_completion,
            commands::log_mood,
            commands::get_habits,
            commands::get_stats,
            commands::get_prediction,
            commands::get_dashboard,
            commands::get_schedule,
            commands::get_settings,
            commands::update_settings,
            commands::export_data,
            commands::wipe_all_data,
        ])
        .run(tauri::generate_context!())
        .expect("error while running habitkin");
}
