use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::TimerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Preferences kept between runs. Only the theme is persisted; timer
/// state always starts fresh.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub theme: Theme,
}

pub trait SettingsStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> Result<(), TimerError>;
}

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "focus_it") {
            pd.config_dir().join("settings.json")
        } else {
            PathBuf::from("focus_it_settings.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Settings {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable settings");
                Settings::default()
            }),
            Err(_) => Settings::default(),
        }
    }

    fn save(&self, settings: &Settings) -> Result<(), TimerError> {
        let settings_err = |source: std::io::Error| TimerError::Settings {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(settings_err)?;
        }
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, data).map_err(settings_err)
    }
}

/// In-memory store for tests and for runs that should not touch disk.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    saved: std::cell::RefCell<Option<Settings>>,
}

impl MemorySettingsStore {
    pub fn saved(&self) -> Option<Settings> {
        self.saved.borrow().clone()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Settings {
        self.saved().unwrap_or_default()
    }

    fn save(&self, settings: &Settings) -> Result<(), TimerError> {
        *self.saved.borrow_mut() = Some(settings.clone());
        Ok(())
    }
}
