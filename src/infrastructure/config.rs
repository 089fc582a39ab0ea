use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{IdeConfig, MultiplexerKind, RepositoryRecord};

pub const MAX_RECENT_REPOS: usize = 20;
const DEFAULT_TERMINAL_EMULATOR: &str = "alacritty";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_root_folder")]
    pub root_folder: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplexer: Option<MultiplexerKind>,
    #[serde(default = "default_terminal_emulator")]
    pub terminal_emulator: String,
    #[serde(default)]
    pub ide: IdeConfig,
    #[serde(default)]
    pub recent_repos: Vec<RepositoryRecord>,
}

fn default_root_folder() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("git"))
        .unwrap_or_else(|| PathBuf::from("git"))
}

fn default_terminal_emulator() -> String {
    DEFAULT_TERMINAL_EMULATOR.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_folder: default_root_folder(),
            multiplexer: None,
            terminal_emulator: default_terminal_emulator(),
            ide: IdeConfig::default(),
            recent_repos: Vec::new(),
        }
    }
}

impl Settings {
    pub fn multiplexer(&self) -> MultiplexerKind {
        self.multiplexer.unwrap_or_else(MultiplexerKind::detect)
    }

    pub fn record_for_path(&self, path: &Path) -> Option<&RepositoryRecord> {
        self.recent_repos.iter().find(|record| record.path == path)
    }

    /// Stamps the record, moves it to the front and evicts beyond the cap.
    pub fn record_launch(&mut self, mut record: RepositoryRecord, now_unix_secs: i64) {
        record.last_accessed_unix_secs = now_unix_secs;
        self.recent_repos
            .retain(|existing| existing.path != record.path);
        self.recent_repos.insert(0, record);
        self.recent_repos.truncate(MAX_RECENT_REPOS);
    }

    pub fn remove_record(&mut self, path: &Path) -> bool {
        let before = self.recent_repos.len();
        self.recent_repos.retain(|record| record.path != path);
        self.recent_repos.len() != before
    }
}

pub trait SettingsStore {
    fn save(&mut self, settings: &Settings) -> Result<(), String>;
}

pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettingsStore {
    fn save(&mut self, settings: &Settings) -> Result<(), String> {
        save_to_path(&self.path, settings)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSettings {
    pub path: PathBuf,
    pub settings: Settings,
}

fn config_directory() -> Option<PathBuf> {
    if let Some(path) = dirs::config_dir() {
        return Some(path.join("repol"));
    }

    dirs::home_dir().map(|path| path.join(".config").join("repol"))
}

pub fn config_path() -> Option<PathBuf> {
    config_directory().map(|path| path.join("config.toml"))
}

pub fn load() -> Result<LoadedSettings, String> {
    let path = config_path().ok_or_else(|| "cannot resolve config path".to_string())?;
    let settings = load_from_path(&path)?;
    Ok(LoadedSettings { path, settings })
}

pub fn load_from_path(path: &Path) -> Result<Settings, String> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Settings::default());
        }
        Err(error) => return Err(format!("config read failed: {error}")),
    };

    toml::from_str::<Settings>(&raw).map_err(|error| format!("config parse failed: {error}"))
}

pub fn save_to_path(path: &Path, settings: &Settings) -> Result<(), String> {
    let Some(parent) = path.parent() else {
        return Err("config path missing parent directory".to_string());
    };

    fs::create_dir_all(parent)
        .map_err(|error| format!("config directory create failed: {error}"))?;
    let encoded = toml::to_string_pretty(settings)
        .map_err(|error| format!("config encode failed: {error}"))?;
    fs::write(path, encoded).map_err(|error| format!("config write failed: {error}"))
}
