// Learn more about Tauri commands at https://tauri.app/develop/calling-rust/
pub mod commands;
pub mod events;
pub mod logging;
pub mod models;
pub mod query;
pub mod state;
pub mod storage;

#[cfg(all(feature = "app", not(test)))]
use tauri::Manager;

#[cfg(all(feature = "app", not(test)))]
use crate::commands::*;
#[cfg(all(feature = "app", not(test)))]
use crate::state::AppState;
#[cfg(all(feature = "app", not(test)))]
use crate::storage::Storage;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
#[cfg(all(feature = "app", not(test)))]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_process::init())
        .setup(|app| {
            #[cfg(desktop)]
            app.handle()
                .plugin(tauri_plugin_updater::Builder::new().build())?;

            let data_dir = app.path().app_data_dir()?;
            if let Err(error) = crate::logging::init_logging(&data_dir) {
                // The app is still usable without file logging.
                eprintln!("failed to initialize logging: {error}");
            }

            let storage = Storage::new(data_dir);
            storage.ensure_dirs()?;

            let (tasks, projects, current_project_id) = match storage.load_data() {
                Ok(data) => (data.tasks, data.projects, data.current_project_id),
                Err(error) => {
                    log::info!("starting with empty data set: {error}");
                    (Vec::new(), Vec::new(), None)
                }
            };
            let settings = storage
                .load_settings()
                .map(|data| data.settings)
                .unwrap_or_default();

            let state = AppState::new(tasks, projects, current_project_id, settings);
            app.manage(state);

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            load_state,
            get_tasks,
            get_tasks_by_project,
            query_tasks,
            query_projects,
            get_all_tags,
            get_task_stats,
            get_project_stats,
            create_task,
            update_task,
            toggle_task_status,
            delete_task,
            delete_tasks,
            add_task_tag,
            remove_task_tag,
            set_task_due_date,
            add_task_subtask,
            toggle_task_subtask,
            add_task_comment,
            add_task_time,
            reset_task_time,
            set_task_estimated_time,
            create_project,
            get_projects,
            get_current_project,
            switch_project,
            update_project,
            delete_project,
            update_settings,
            export_data,
            export_data_to_file,
            validate_import_data,
            import_data,
            list_backups,
            create_backup,
            delete_backup,
            restore_backup,
            import_backup,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
