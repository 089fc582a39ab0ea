use super::{
    LaunchError, LaunchOptions, LaunchOutcome, Launcher, configure_ide_settings, ide_invocation,
    list_repositories, open_config, opener_invocation, relative_age_label, set_root_folder,
};
use crate::application::layout::ZellijLayout;
use crate::application::test_support::{
    RecordingEventLogger, ScriptedConsole, root_with, unique_test_dir,
};
use crate::domain::{IdeConfig, IdeKind, RepositoryRecord, ServerCommand};
use crate::infrastructure::config::{Settings, SettingsStore};
use crate::infrastructure::event_log::NullEventLogger;
use crate::infrastructure::process::{ProcessArgs, ProcessInvocation, ProcessSpawner};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const NOW: i64 = 1_700_000_000;

#[derive(Default)]
struct MemoryStore {
    saved: Vec<Settings>,
    fail: bool,
}

impl SettingsStore for MemoryStore {
    fn save(&mut self, settings: &Settings) -> Result<(), String> {
        if self.fail {
            return Err("config write failed: read-only".to_string());
        }
        self.saved.push(settings.clone());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSpawner {
    spawned: Vec<ProcessInvocation>,
    layout_present: Vec<bool>,
    fail_on_call: Option<usize>,
}

impl ProcessSpawner for RecordingSpawner {
    fn spawn(&mut self, invocation: &ProcessInvocation) -> std::io::Result<()> {
        let call = self.spawned.len();
        self.layout_present
            .push(layout_argument(invocation).is_some_and(|path| path.exists()));
        self.spawned.push(invocation.clone());
        if self.fail_on_call == Some(call) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "program not found",
            ));
        }
        Ok(())
    }
}

fn layout_argument(invocation: &ProcessInvocation) -> Option<PathBuf> {
    match &invocation.args {
        ProcessArgs::List(args) => args
            .last()
            .filter(|arg| arg.ends_with(".kdl"))
            .map(PathBuf::from),
        ProcessArgs::CommandLine(_) => None,
    }
}

struct Harness {
    root: PathBuf,
    layout_dir: PathBuf,
    settings: Settings,
    store: MemoryStore,
    console: ScriptedConsole,
    spawner: RecordingSpawner,
    logger: RecordingEventLogger,
}

impl Harness {
    fn new(children: &[&str], lines: &[&str]) -> Self {
        let root = root_with(children);
        let settings = Settings {
            root_folder: root.clone(),
            ..Settings::default()
        };
        Self {
            root,
            layout_dir: unique_test_dir("repol-launch-layouts"),
            settings,
            store: MemoryStore::default(),
            console: ScriptedConsole::with_lines(lines.iter().copied()),
            spawner: RecordingSpawner::default(),
            logger: RecordingEventLogger::default(),
        }
    }

    fn remember(&mut self, name: &str, servers: Vec<ServerCommand>) -> PathBuf {
        let path = self.root.join(name);
        self.settings.recent_repos.push(RepositoryRecord {
            name: name.to_string(),
            path: path.clone(),
            last_accessed_unix_secs: 1,
            servers,
        });
        path
    }

    fn run(&mut self, options: &LaunchOptions) -> Result<LaunchOutcome, LaunchError> {
        let builder = ZellijLayout::new(
            "/bin/sh".to_string(),
            "alacritty".to_string(),
            self.layout_dir.clone(),
        );
        Launcher::new(
            &mut self.settings,
            &mut self.store,
            &mut self.console,
            &mut self.spawner,
            &builder,
            &self.logger,
        )
        .with_settle_delay(Duration::ZERO)
        .run(options, NOW)
    }

    fn layout_files_left(&self) -> usize {
        fs::read_dir(&self.layout_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
        let _ = fs::remove_dir_all(&self.layout_dir);
    }
}

fn named(name: &str) -> LaunchOptions {
    LaunchOptions {
        repo_name: Some(name.to_string()),
        skip_ide: false,
    }
}

#[test]
fn launches_recorded_repository_then_ide() {
    let mut harness = Harness::new(&["shop"], &["l"]);
    let path = harness.remember("shop", vec![ServerCommand::new("", "npm start")]);

    let outcome = harness.run(&named("SHOP")).expect("launch should succeed");

    assert_eq!(
        outcome,
        LaunchOutcome::Launched {
            name: "shop".to_string(),
            ide_launched: true,
        }
    );
    assert_eq!(harness.spawner.spawned.len(), 2);
    assert_eq!(harness.spawner.spawned[0].program, "alacritty");
    assert_eq!(harness.spawner.layout_present, vec![true, false]);
    assert_eq!(harness.spawner.spawned[1], ide_invocation("code", &path));
    assert_eq!(harness.layout_files_left(), 0);

    let saved = harness.store.saved.last().expect("settings should be saved");
    assert_eq!(saved.recent_repos[0].path, path);
    assert_eq!(saved.recent_repos[0].last_accessed_unix_secs, NOW);
    let spawned = harness
        .logger
        .events()
        .into_iter()
        .find(|event| event.kind == "terminal_spawned")
        .expect("terminal spawn should be logged");
    assert_eq!(spawned.data["multiplexer"], "zellij");
    assert!(
        spawned.data["command"]
            .as_str()
            .is_some_and(|command| command.starts_with("alacritty -e zellij --layout "))
    );
    assert!(
        spawned.data["layout"]
            .as_str()
            .is_some_and(|layout| layout.ends_with(".kdl"))
    );
    assert!(harness.console.printed("Launching: shop"));
    assert!(harness.console.printed("Launch complete!"));
    assert_eq!(
        harness.logger.kinds(),
        vec![
            "repo_resolved",
            "settings_saved",
            "terminal_spawned",
            "ide_spawned",
        ]
    );
}

#[test]
fn unknown_name_stops_before_any_side_effect() {
    let mut harness = Harness::new(&["shop"], &[]);

    let error = harness.run(&named("missing")).expect_err("launch should fail");

    assert_eq!(error, LaunchError::NotFound("missing".to_string()));
    assert!(!error.is_fatal());
    assert!(harness.store.saved.is_empty());
    assert!(harness.spawner.spawned.is_empty());
}

#[test]
fn recorded_path_missing_on_disk_is_invalid() {
    let mut harness = Harness::new(&[], &[]);
    let path = harness.remember("gone", Vec::new());

    let error = harness.run(&named("gone")).expect_err("launch should fail");

    assert_eq!(error, LaunchError::InvalidPath(path));
    assert!(!error.is_fatal());
    assert!(harness.store.saved.is_empty());
    assert!(harness.spawner.spawned.is_empty());
}

#[test]
fn new_repository_is_configured_and_recorded_first() {
    let mut harness = Harness::new(&["fresh"], &["n"]);
    harness.remember("older", Vec::new());
    let options = LaunchOptions {
        repo_name: Some("fresh".to_string()),
        skip_ide: true,
    };

    let outcome = harness.run(&options).expect("launch should succeed");

    assert_eq!(
        outcome,
        LaunchOutcome::Launched {
            name: "fresh".to_string(),
            ide_launched: false,
        }
    );
    assert_eq!(harness.spawner.spawned.len(), 1);
    let names: Vec<&str> = harness.settings.recent_repos.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["fresh", "older"]);
}

#[test]
fn terminal_spawn_failure_is_fatal_after_recording() {
    let mut harness = Harness::new(&["shop"], &["l"]);
    harness.remember("shop", Vec::new());
    harness.spawner.fail_on_call = Some(0);

    let error = harness.run(&named("shop")).expect_err("launch should fail");

    assert!(matches!(error, LaunchError::Spawn(_)));
    assert!(error.is_fatal());
    assert_eq!(harness.store.saved.len(), 1);
    assert_eq!(harness.settings.recent_repos[0].last_accessed_unix_secs, NOW);
    assert_eq!(harness.layout_files_left(), 0);
    assert!(!harness.console.printed("Launch complete!"));
}

#[test]
fn ide_spawn_failure_only_warns() {
    let mut harness = Harness::new(&["shop"], &["l"]);
    harness.remember("shop", Vec::new());
    harness.spawner.fail_on_call = Some(1);

    let outcome = harness.run(&named("shop")).expect("launch should succeed");

    assert_eq!(
        outcome,
        LaunchOutcome::Launched {
            name: "shop".to_string(),
            ide_launched: false,
        }
    );
    assert!(harness.console.printed("Warning: Failed to launch IDE"));
    assert!(harness.console.printed("Continuing with terminal only..."));
    assert!(harness.console.printed("Launch complete!"));
    assert!(harness.logger.kinds().contains(&"ide_spawn_failed".to_string()));
}

#[test]
fn ide_none_skips_ide_spawn() {
    let mut harness = Harness::new(&["shop"], &["l"]);
    harness.remember("shop", Vec::new());
    harness.settings.ide = IdeConfig::new(IdeKind::None);

    harness.run(&named("shop")).expect("launch should succeed");

    assert_eq!(harness.spawner.spawned.len(), 1);
}

#[test]
fn delete_option_removes_record_without_launching() {
    let mut harness = Harness::new(&["shop"], &["d"]);
    let path = harness.remember("shop", Vec::new());

    let outcome = harness.run(&named("shop")).expect("delete should succeed");

    assert_eq!(outcome, LaunchOutcome::Deleted(path));
    assert!(harness.settings.recent_repos.is_empty());
    assert_eq!(harness.store.saved.len(), 1);
    assert!(harness.spawner.spawned.is_empty());
}

#[test]
fn edit_option_runs_editor_before_launching() {
    let mut harness = Harness::new(&["shop"], &["e", "c", "d"]);
    harness.remember("shop", vec![ServerCommand::new("", "npm start")]);

    harness.run(&named("shop")).expect("launch should succeed");

    assert!(harness.settings.recent_repos[0].servers.is_empty());
    assert!(harness.console.printed("All servers cleared."));
}

#[test]
fn settings_save_failure_stops_before_spawning() {
    let mut harness = Harness::new(&["shop"], &["l"]);
    harness.remember("shop", Vec::new());
    harness.store.fail = true;

    let error = harness.run(&named("shop")).expect_err("launch should fail");

    assert!(matches!(error, LaunchError::Settings(_)));
    assert!(harness.spawner.spawned.is_empty());
}

#[test]
fn interactive_run_without_selection_ends_quietly() {
    let mut harness = Harness::new(&["shop"], &[]);
    harness.console.push_autocomplete(None);

    let outcome = harness.run(&LaunchOptions::default()).expect("run should succeed");

    assert_eq!(outcome, LaunchOutcome::NoSelection);
    assert!(harness.console.printed("No repository selected."));
    assert!(harness.spawner.spawned.is_empty());
}

#[test]
fn launch_error_messages_name_the_problem() {
    assert_eq!(
        LaunchError::NotFound("shop".to_string()).message(),
        "Repository 'shop' not found."
    );
    assert_eq!(
        LaunchError::InvalidPath(PathBuf::from("/r/shop")).message(),
        "Directory does not exist: /r/shop"
    );
    assert!(LaunchError::Input("eof".to_string()).is_fatal());
}

#[test]
fn set_root_folder_declined_leaves_settings_alone() {
    let parent = unique_test_dir("repol-set-root");
    let target = parent.join("code");
    let mut settings = Settings::default();
    let before = settings.root_folder.clone();
    let mut store = MemoryStore::default();
    let mut console = ScriptedConsole::with_lines(["n"]);

    let changed = set_root_folder(&mut settings, &mut store, &mut console, &NullEventLogger, &target)
        .expect("set root should succeed");

    assert!(!changed);
    assert_eq!(settings.root_folder, before);
    assert!(store.saved.is_empty());
    assert!(console.printed("Root folder not changed."));
    assert!(!target.exists());

    let _ = fs::remove_dir_all(parent);
}

#[test]
fn set_root_folder_creates_missing_folder_on_yes() {
    let parent = unique_test_dir("repol-set-root");
    let target = parent.join("code");
    let mut settings = Settings::default();
    let mut store = MemoryStore::default();
    let mut console = ScriptedConsole::with_lines(["YES"]);

    let changed = set_root_folder(&mut settings, &mut store, &mut console, &NullEventLogger, &target)
        .expect("set root should succeed");

    assert!(changed);
    assert!(target.is_dir());
    assert_eq!(settings.root_folder, target);
    assert_eq!(store.saved.len(), 1);

    let _ = fs::remove_dir_all(parent);
}

#[test]
fn set_root_folder_existing_directory_saves_without_prompt() {
    let target = unique_test_dir("repol-set-root");
    let mut settings = Settings::default();
    let mut store = MemoryStore::default();
    let mut console = ScriptedConsole::default();

    let changed = set_root_folder(&mut settings, &mut store, &mut console, &NullEventLogger, &target)
        .expect("set root should succeed");

    assert!(changed);
    assert_eq!(store.saved[0].root_folder, target);

    let _ = fs::remove_dir_all(target);
}

#[test]
fn list_shows_records_with_relative_access() {
    let settings = Settings {
        root_folder: PathBuf::from("/r"),
        recent_repos: vec![RepositoryRecord {
            name: "shop".to_string(),
            path: PathBuf::from("/r/shop"),
            last_accessed_unix_secs: NOW - 7_200,
            servers: vec![ServerCommand::new("", "npm start")],
        }],
        ..Settings::default()
    };
    let mut console = ScriptedConsole::default();

    list_repositories(&settings, &mut console, NOW);

    assert!(console.printed("Root folder: /r"));
    assert!(console.printed("IDE: Visual Studio Code"));
    assert!(console.printed("  shop"));
    assert!(console.printed("Servers: 1"));
    assert!(console.printed("Last accessed: 2h ago"));
}

#[test]
fn list_without_records_says_so() {
    let mut console = ScriptedConsole::default();

    list_repositories(&Settings::default(), &mut console, NOW);

    assert!(console.printed("No repositories configured yet."));
}

#[test]
fn relative_age_label_buckets() {
    assert_eq!(relative_age_label(NOW, NOW), "now");
    assert_eq!(relative_age_label(NOW, NOW + 30), "now");
    assert_eq!(relative_age_label(NOW, NOW - 59), "now");
    assert_eq!(relative_age_label(NOW, NOW - 60), "1m ago");
    assert_eq!(relative_age_label(NOW, NOW - 3_599), "59m ago");
    assert_eq!(relative_age_label(NOW, NOW - 3_600), "1h ago");
    assert_eq!(relative_age_label(NOW, NOW - 3 * 86_400), "3d ago");
}

#[test]
fn configure_ide_settings_saves_choice() {
    let mut settings = Settings::default();
    let mut store = MemoryStore::default();
    let mut console = ScriptedConsole::with_lines(["5", "n"]);

    configure_ide_settings(&mut settings, &mut store, &mut console, &NullEventLogger)
        .expect("configure should succeed");

    assert_eq!(settings.ide, IdeConfig::new(IdeKind::WebStorm));
    assert_eq!(store.saved[0].ide.kind, IdeKind::WebStorm);
    assert!(console.printed("Current IDE: Visual Studio Code"));
    assert!(console.printed("IDE configuration saved."));
}

#[test]
fn open_config_reports_missing_file_without_spawning() {
    let dir = unique_test_dir("repol-open-config");
    let path = dir.join("config.toml");
    let mut console = ScriptedConsole::default();
    let mut spawner = RecordingSpawner::default();

    open_config(&path, &mut console, &mut spawner).expect("open should succeed");

    assert!(spawner.spawned.is_empty());
    assert!(console.printed("Config file does not exist yet"));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn open_config_spawns_platform_opener() {
    let dir = unique_test_dir("repol-open-config");
    let path = dir.join("config.toml");
    fs::write(&path, "root_folder = \"/r\"\n").expect("config should write");
    let mut console = ScriptedConsole::default();
    let mut spawner = RecordingSpawner::default();

    open_config(&path, &mut console, &mut spawner).expect("open should succeed");

    assert_eq!(spawner.spawned, vec![opener_invocation(&path)]);

    let _ = fs::remove_dir_all(dir);
}

#[cfg(not(windows))]
#[test]
fn ide_invocation_passes_repository_path_as_sole_argument() {
    let invocation = ide_invocation("code", Path::new("/r/shop"));

    assert_eq!(invocation.program, "code");
    assert_eq!(invocation.args, ProcessArgs::List(vec!["/r/shop".to_string()]));
    assert!(!invocation.windowless);
    assert_eq!(invocation.working_directory, Some(PathBuf::from("/r/shop")));
}
