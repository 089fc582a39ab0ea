use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::Value;

use crate::application::catalog::RepositoryCatalog;
use crate::application::layout::SessionLayoutBuilder;
use crate::application::repo_setup::{
    configure_ide, configure_repository, display_current_ide, edit_repository,
};
use crate::application::selection::select_repository;
use crate::domain::RepositoryRecord;
use crate::infrastructure::config::{Settings, SettingsStore};
use crate::infrastructure::event_log::{Event, EventLogger};
use crate::infrastructure::process::{ProcessInvocation, ProcessSpawner};
use crate::ui::console::Console;

/// Time the multiplexer gets to open its window before the IDE is raised.
pub const SETTLE_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    NotFound(String),
    InvalidPath(PathBuf),
    Spawn(String),
    Settings(String),
    Input(String),
}

impl LaunchError {
    pub fn message(&self) -> String {
        match self {
            Self::NotFound(name) => format!("Repository '{name}' not found."),
            Self::InvalidPath(path) => format!("Directory does not exist: {}", path.display()),
            Self::Spawn(message) => format!("terminal launch failed: {message}"),
            Self::Settings(message) => format!("settings save failed: {message}"),
            Self::Input(message) => format!("input failed: {message}"),
        }
    }

    /// Not-found and invalid-path end the run with a message instead of a failure status.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::NotFound(_) | Self::InvalidPath(_))
    }
}

fn input_error(error: std::io::Error) -> LaunchError {
    LaunchError::Input(error.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    pub repo_name: Option<String>,
    pub skip_ide: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    Launched { name: String, ide_launched: bool },
    NoSelection,
    Deleted(PathBuf),
}

enum RecordAction {
    Launch(RepositoryRecord),
    Delete,
}

pub struct Launcher<'a> {
    settings: &'a mut Settings,
    store: &'a mut dyn SettingsStore,
    console: &'a mut dyn Console,
    spawner: &'a mut dyn ProcessSpawner,
    builder: &'a dyn SessionLayoutBuilder,
    logger: &'a dyn EventLogger,
    settle_delay: Duration,
}

impl<'a> Launcher<'a> {
    pub fn new(
        settings: &'a mut Settings,
        store: &'a mut dyn SettingsStore,
        console: &'a mut dyn Console,
        spawner: &'a mut dyn ProcessSpawner,
        builder: &'a dyn SessionLayoutBuilder,
        logger: &'a dyn EventLogger,
    ) -> Self {
        Self {
            settings,
            store,
            console,
            spawner,
            builder,
            logger,
            settle_delay: SETTLE_DELAY,
        }
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Resolve, record, spawn the terminal session, then the IDE.
    ///
    /// Nothing is persisted or spawned before the repository resolves to an
    /// existing directory. Once the terminal is up, IDE failures only warn.
    pub fn run(
        &mut self,
        options: &LaunchOptions,
        now_unix_secs: i64,
    ) -> Result<LaunchOutcome, LaunchError> {
        let Some(path) = self.resolve(options)? else {
            self.console.write_line("No repository selected.");
            return Ok(LaunchOutcome::NoSelection);
        };
        if !path.is_dir() {
            return Err(LaunchError::InvalidPath(path));
        }
        self.logger
            .log(Event::new("launch", "repo_resolved").with_path("path", &path));

        let existing = self.settings.record_for_path(&path).cloned();
        let record = match existing {
            Some(record) => match self.existing_record_action(record)? {
                RecordAction::Launch(record) => record,
                RecordAction::Delete => {
                    self.settings.remove_record(&path);
                    self.save()?;
                    self.console.write_line("Repository configuration deleted.");
                    return Ok(LaunchOutcome::Deleted(path));
                }
            },
            None => {
                configure_repository(self.console, path, now_unix_secs).map_err(input_error)?
            }
        };

        self.settings.record_launch(record.clone(), now_unix_secs);
        self.save()?;

        self.console.blank_line();
        self.console.write_line(&format!("Launching: {}", record.name));

        let launch = self
            .builder
            .build(&record)
            .map_err(|error| LaunchError::Spawn(format!("layout synthesis failed: {error}")))?;
        self.spawner
            .spawn(&launch.invocation)
            .map_err(|error| LaunchError::Spawn(error.to_string()))?;
        let mut spawned = Event::new("launch", "terminal_spawned")
            .with_data("multiplexer", Value::from(self.builder.kind().label()))
            .with_data("command", Value::from(launch.invocation.display()));
        if let Some(layout_path) = launch.layout_path() {
            spawned = spawned.with_path("layout", layout_path);
        }
        self.logger.log(spawned);

        if !self.settle_delay.is_zero() {
            thread::sleep(self.settle_delay);
        }
        let ide_launched = self.launch_ide(&record, options.skip_ide);

        if let Err(error) = launch.cleanup() {
            self.logger.log(
                Event::new("launch", "layout_cleanup_failed")
                    .with_data("error", Value::from(error.to_string())),
            );
        }

        self.console.blank_line();
        self.console.write_line("Launch complete!");
        Ok(LaunchOutcome::Launched {
            name: record.name,
            ide_launched,
        })
    }

    fn resolve(&mut self, options: &LaunchOptions) -> Result<Option<PathBuf>, LaunchError> {
        let catalog = RepositoryCatalog::from_settings(self.settings);
        if let Some(name) = options.repo_name.as_deref() {
            return catalog
                .find_by_name(name)
                .map(Some)
                .ok_or_else(|| LaunchError::NotFound(name.to_string()));
        }

        select_repository(self.console, &catalog, self.logger).map_err(input_error)
    }

    fn existing_record_action(
        &mut self,
        record: RepositoryRecord,
    ) -> Result<RecordAction, LaunchError> {
        self.console.blank_line();
        self.console
            .write_line(&format!("Repository '{}' is already configured.", record.name));
        if record.servers.is_empty() {
            self.console.write_line("No servers configured.");
        } else {
            self.console.write_line("Servers:");
            for server in &record.servers {
                self.console.write_line(&format!(
                    "  - {} (in {})",
                    server.command,
                    server.location_label()
                ));
            }
        }
        self.console.blank_line();
        self.console.write_line("Options:");
        self.console.write_line("  e. Edit configuration");
        self.console.write_line("  d. Delete configuration");
        self.console.write_line("  l. Launch (default)");

        let choice = self.console.prompt_line("> ").map_err(input_error)?;
        match choice.to_lowercase().as_str() {
            "e" => edit_repository(self.console, record)
                .map(RecordAction::Launch)
                .map_err(input_error),
            "d" => Ok(RecordAction::Delete),
            _ => Ok(RecordAction::Launch(record)),
        }
    }

    fn launch_ide(&mut self, record: &RepositoryRecord, skip_ide: bool) -> bool {
        let command = self.settings.ide.command();
        if skip_ide || command.is_empty() {
            return false;
        }

        let invocation = ide_invocation(&command, &record.path);
        match self.spawner.spawn(&invocation) {
            Ok(()) => {
                self.logger.log(
                    Event::new("launch", "ide_spawned")
                        .with_data("command", Value::from(command))
                        .with_path("path", &record.path),
                );
                true
            }
            Err(error) => {
                self.logger.log(
                    Event::new("launch", "ide_spawn_failed")
                        .with_data("command", Value::from(command))
                        .with_data("error", Value::from(error.to_string())),
                );
                self.console
                    .write_line(&format!("Warning: Failed to launch IDE: {error}"));
                self.console.write_line("Continuing with terminal only...");
                false
            }
        }
    }

    fn save(&mut self) -> Result<(), LaunchError> {
        save_settings(self.store, self.settings, self.logger)
    }
}

/// Editor launchers on Windows are usually `.cmd` shims, so they go through the shell.
pub fn ide_invocation(command: &str, repo_path: &Path) -> ProcessInvocation {
    if cfg!(windows) {
        return ProcessInvocation::command_line(
            "cmd.exe",
            format!("/c {command} \"{}\"", repo_path.display()),
        )
        .in_directory(repo_path.to_path_buf())
        .windowless();
    }

    ProcessInvocation::new(command, vec![repo_path.to_string_lossy().into_owned()])
        .in_directory(repo_path.to_path_buf())
}

fn save_settings(
    store: &mut dyn SettingsStore,
    settings: &Settings,
    logger: &dyn EventLogger,
) -> Result<(), LaunchError> {
    store.save(settings).map_err(LaunchError::Settings)?;
    logger.log(
        Event::new("launch", "settings_saved")
            .with_data("recent_repos", Value::from(settings.recent_repos.len())),
    );
    Ok(())
}

/// Sets the scan root, offering to create it when missing. Returns whether it changed.
pub fn set_root_folder(
    settings: &mut Settings,
    store: &mut dyn SettingsStore,
    console: &mut dyn Console,
    logger: &dyn EventLogger,
    path: &Path,
) -> Result<bool, LaunchError> {
    if !path.is_dir() {
        console.write_line(&format!("Folder does not exist: {}", path.display()));
        console.write_line("Create it? (y/n)");
        if !console.confirm("> ").map_err(input_error)? {
            console.write_line("Root folder not changed.");
            return Ok(false);
        }
        fs::create_dir_all(path)
            .map_err(|error| LaunchError::Input(format!("folder create failed: {error}")))?;
        console.write_line(&format!("Created folder: {}", path.display()));
    }

    settings.root_folder = path.to_path_buf();
    save_settings(store, settings, logger)?;
    console.write_line(&format!("Root folder set to: {}", path.display()));
    Ok(true)
}

pub fn list_repositories(settings: &Settings, console: &mut dyn Console, now_unix_secs: i64) {
    console.write_line(&format!("Root folder: {}", settings.root_folder.display()));
    console.write_line(&format!("IDE: {}", settings.ide.display_name()));
    console.blank_line();

    if settings.recent_repos.is_empty() {
        console.write_line("No repositories configured yet.");
        return;
    }

    console.write_line("Configured repositories:");
    for record in &settings.recent_repos {
        console.blank_line();
        console.write_line(&format!("  {}", record.name));
        console.write_line(&format!("    Path: {}", record.path.display()));
        console.write_line(&format!("    Servers: {}", record.servers.len()));
        console.write_line(&format!(
            "    Last accessed: {}",
            relative_age_label(now_unix_secs, record.last_accessed_unix_secs)
        ));
    }
}

pub fn configure_ide_settings(
    settings: &mut Settings,
    store: &mut dyn SettingsStore,
    console: &mut dyn Console,
    logger: &dyn EventLogger,
) -> Result<(), LaunchError> {
    display_current_ide(console, &settings.ide);
    settings.ide = configure_ide(console, &settings.ide).map_err(input_error)?;
    save_settings(store, settings, logger)?;
    console.write_line("IDE configuration saved.");
    Ok(())
}

/// Hands the settings file to the desktop's default opener.
pub fn open_config(
    config_path: &Path,
    console: &mut dyn Console,
    spawner: &mut dyn ProcessSpawner,
) -> Result<(), LaunchError> {
    if !config_path.exists() {
        console.write_line(&format!(
            "Config file does not exist yet: {}",
            config_path.display()
        ));
        console.write_line("It will be created the first time a repository is launched.");
        return Ok(());
    }

    spawner
        .spawn(&opener_invocation(config_path))
        .map_err(|error| LaunchError::Spawn(error.to_string()))?;
    console.write_line(&format!("Opened: {}", config_path.display()));
    Ok(())
}

pub fn opener_invocation(path: &Path) -> ProcessInvocation {
    let target = path.to_string_lossy().into_owned();
    if cfg!(windows) {
        return ProcessInvocation::command_line("cmd.exe", format!("/c start \"\" \"{target}\""))
            .windowless();
    }
    if cfg!(target_os = "macos") {
        return ProcessInvocation::new("open", vec![target]);
    }

    ProcessInvocation::new("xdg-open", vec![target])
}

pub fn relative_age_label(now_unix_secs: i64, then_unix_secs: i64) -> String {
    let age_secs = now_unix_secs.saturating_sub(then_unix_secs).max(0);
    if age_secs < 60 {
        return "now".to_string();
    }
    if age_secs < 3_600 {
        return format!("{}m ago", age_secs / 60);
    }
    if age_secs < 86_400 {
        return format!("{}h ago", age_secs / 3_600);
    }
    format!("{}d ago", age_secs / 86_400)
}

pub fn now_unix_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|duration| i64::try_from(duration.as_secs()).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests;
