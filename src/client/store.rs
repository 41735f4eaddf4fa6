use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::error;

use crate::models::{ClassSchedule, PublicUser, Task};

pub const SESSION_KEY: &str = "session";

pub fn user_data_key(email: &str) -> String {
    format!("user_data_{email}")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Everything kept per account: the private task list, the cached copy of
/// the server-side schedules, and display preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserData {
    pub tasks: Vec<Task>,
    pub class_schedules: Vec<ClassSchedule>,
    pub theme: Theme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: PublicUser,
    pub token: String,
}

/// Single-file key-value store backing the client. The whole store is one
/// JSON document; every write rewrites it and broadcasts the touched key so
/// other handles to the same store can reload.
pub struct LocalStore {
    path: PathBuf,
    changes: broadcast::Sender<String>,
}

impl LocalStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(32);
        Self {
            path: path.into(),
            changes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Receives the key of every record written through this store.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.changes.subscribe()
    }

    fn read_all(&self) -> io::Result<BTreeMap<String, Value>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(err),
        };
        match serde_json::from_str(&raw) {
            Ok(map) => Ok(map),
            Err(err) => {
                error!("store file {} is malformed: {}", self.path.display(), err);
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_all(&self, map: &BTreeMap<String, Value>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(map).map_err(io::Error::other)?;
        std::fs::write(&self.path, raw)
    }

    fn notify(&self, key: &str) {
        // No receivers is fine; nobody is watching.
        let _ = self.changes.send(key.to_string());
    }

    /// Loads the record for `email`. A missing or unreadable record degrades
    /// to the defaults instead of failing, so a corrupted store never locks
    /// the user out of their account.
    pub fn load_user_data(&self, email: &str) -> io::Result<UserData> {
        let mut map = self.read_all()?;
        let Some(mut value) = map.remove(&user_data_key(email)) else {
            return Ok(UserData::default());
        };
        canonicalize(&mut value);
        match serde_json::from_value(value) {
            Ok(data) => Ok(data),
            Err(err) => {
                error!("user record for {} is malformed: {}", email, err);
                Ok(UserData::default())
            }
        }
    }

    pub fn save_user_data(&self, email: &str, data: &UserData) -> io::Result<()> {
        let mut value = serde_json::to_value(data).map_err(io::Error::other)?;
        canonicalize(&mut value);

        let key = user_data_key(email);
        let mut map = self.read_all()?;
        map.insert(key.clone(), value);
        self.write_all(&map)?;
        self.notify(&key);
        Ok(())
    }

    pub fn remove_user_data(&self, email: &str) -> io::Result<()> {
        let key = user_data_key(email);
        let mut map = self.read_all()?;
        if map.remove(&key).is_some() {
            self.write_all(&map)?;
            self.notify(&key);
        }
        Ok(())
    }

    pub fn session(&self) -> Option<Session> {
        let value = self.read_all().ok()?.remove(SESSION_KEY)?;
        match serde_json::from_value(value) {
            Ok(session) => Some(session),
            Err(err) => {
                error!("stored session is malformed: {}", err);
                None
            }
        }
    }

    pub fn set_session(&self, session: &Session) -> io::Result<()> {
        let value = serde_json::to_value(session).map_err(io::Error::other)?;
        let mut map = self.read_all()?;
        map.insert(SESSION_KEY.to_string(), value);
        self.write_all(&map)?;
        self.notify(SESSION_KEY);
        Ok(())
    }

    pub fn clear_session(&self) -> io::Result<()> {
        let mut map = self.read_all()?;
        if map.remove(SESSION_KEY).is_some() {
            self.write_all(&map)?;
            self.notify(SESSION_KEY);
        }
        Ok(())
    }
}

/// Strips the retired `subtasks` key from every task. Applied on both load
/// and save so old records converge to the current shape.
fn canonicalize(value: &mut Value) {
    let Some(tasks) = value.get_mut("tasks").and_then(Value::as_array_mut) else {
        return;
    };
    for task in tasks {
        if let Some(obj) = task.as_object_mut() {
            obj.remove("subtasks");
        }
    }
}
