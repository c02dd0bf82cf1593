use crate::error::AppError;
use crate::model::Task;
use crate::storage::KeyValueStore;
use std::path::PathBuf;

/// Storage key holding the task snapshot.
pub const TASKS_KEY: &str = "todos";
const APP_DIR_NAME: &str = "taskmaster";

/// Keeps each key as `<dir>/<key>.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }

        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|err| AppError::io(format!("{}: {}", self.dir.display(), err)))?;

        let path = self.entry_path(key);
        std::fs::write(&path, value)
            .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, permissions)?;
        }

        Ok(())
    }
}

/// Per-user directory holding the task store.
pub fn user_data_dir() -> Result<PathBuf, AppError> {
    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(APP_DIR_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join(APP_DIR_NAME))
    }
}

/// Reads the persisted snapshot. Missing, unreadable or malformed data all
/// yield an empty list.
pub fn load_tasks(store: &dyn KeyValueStore) -> Vec<Task> {
    let content = match store.read(TASKS_KEY) {
        Ok(Some(content)) => content,
        Ok(None) => return Vec::new(),
        Err(err) => {
            tracing::debug!(code = err.code(), error = %err.message(), "task snapshot unreadable, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Option<Vec<Task>>>(&content) {
        Ok(tasks) => tasks.unwrap_or_default(),
        Err(err) => {
            tracing::debug!(error = %err, "task snapshot malformed, starting empty");
            Vec::new()
        }
    }
}

/// Writes the full list under [`TASKS_KEY`].
pub fn save_tasks(store: &mut dyn KeyValueStore, tasks: &[Task]) -> Result<(), AppError> {
    let content = serde_json::to_string(tasks)?;
    store.write(TASKS_KEY, &content)?;
    tracing::debug!(count = tasks.len(), "task snapshot persisted");
    Ok(())
}
