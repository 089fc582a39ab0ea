use std::path::PathBuf;

use repol::application::launcher::{
    LaunchError, LaunchOptions, Launcher, configure_ide_settings, list_repositories,
    now_unix_secs, open_config, set_root_folder,
};
use repol::application::layout::builder_for;
use repol::infrastructure::config::{self, FileSettingsStore, LoadedSettings};
use repol::infrastructure::event_log::{
    EventLogger, FileEventLogger, NullEventLogger, resolve_log_path,
};
use repol::infrastructure::process::SystemProcessSpawner;
use repol::ui::terminal::TerminalConsole;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct CliArgs {
    help: bool,
    list: bool,
    repo_name: Option<String>,
    skip_ide: bool,
    config_path: bool,
    open_config: bool,
    set_root: Option<PathBuf>,
    configure_ide: bool,
    event_log_path: Option<PathBuf>,
}

fn missing_value(flag: &str, what: &str) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        format!("{flag} requires {what}"),
    )
}

fn parse_cli_args(args: impl IntoIterator<Item = String>) -> std::io::Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(argument) = args.next() {
        match argument.to_lowercase().as_str() {
            "--help" | "-h" => {
                cli.help = true;
            }
            "--list" | "-l" => {
                cli.list = true;
            }
            "--repo" | "-r" => {
                let Some(name) = args.next() else {
                    return Err(missing_value("--repo", "a repository name"));
                };
                cli.repo_name = Some(name);
            }
            "--no-ide" | "--no-vscode" => {
                cli.skip_ide = true;
            }
            "--config-path" => {
                cli.config_path = true;
            }
            "--open-config" => {
                cli.open_config = true;
            }
            "--set-root" => {
                let Some(path) = args.next() else {
                    return Err(missing_value("--set-root", "a folder path"));
                };
                cli.set_root = Some(PathBuf::from(path));
            }
            "--configure-ide" => {
                cli.configure_ide = true;
            }
            "--event-log" => {
                let Some(path) = args.next() else {
                    return Err(missing_value("--event-log", "a file path"));
                };
                cli.event_log_path = Some(PathBuf::from(path));
            }
            flag if flag.starts_with('-') => {}
            _ => {
                if cli.repo_name.is_none() {
                    cli.repo_name = Some(argument);
                }
            }
        }
    }

    Ok(cli)
}

fn usage_text() -> &'static str {
    "\
repol - open a repository's terminal workspace and IDE

Usage:
  repol [options] [repo-name]

Options:
  -h, --help              Show this help
  -l, --list              List configured repositories
  -r, --repo <name>       Launch the named repository
      --no-ide            Skip launching the IDE (alias: --no-vscode)
      --config-path       Print the settings file path
      --open-config       Open the settings file
      --set-root <path>   Set the folder scanned for repositories
      --configure-ide     Choose the IDE launched with each repository
      --event-log <path>  Append JSONL events (relative paths go under .repol/)
"
}

/// Not-found style errors are printed and exit cleanly; the rest fail the process.
fn report(result: Result<(), LaunchError>) -> std::io::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(error) if !error.is_fatal() => {
            println!("{}", error.message());
            Ok(())
        }
        Err(error) => Err(std::io::Error::other(error.message())),
    }
}

fn run(cli: CliArgs, logger: &dyn EventLogger) -> std::io::Result<()> {
    if cli.config_path {
        let path = config::config_path()
            .ok_or_else(|| std::io::Error::other("cannot resolve config path"))?;
        println!("{}", path.display());
        return Ok(());
    }

    let LoadedSettings { path, mut settings } = config::load().map_err(std::io::Error::other)?;
    let mut console = TerminalConsole;
    let mut spawner = SystemProcessSpawner;

    if cli.open_config {
        return report(open_config(&path, &mut console, &mut spawner));
    }

    let mut store = FileSettingsStore::new(path);
    if let Some(root) = cli.set_root {
        return report(
            set_root_folder(&mut settings, &mut store, &mut console, logger, &root).map(|_| ()),
        );
    }
    if cli.configure_ide {
        return report(configure_ide_settings(
            &mut settings,
            &mut store,
            &mut console,
            logger,
        ));
    }
    if cli.list {
        list_repositories(&settings, &mut console, now_unix_secs());
        return Ok(());
    }

    let builder = builder_for(&settings);
    let options = LaunchOptions {
        repo_name: cli.repo_name,
        skip_ide: cli.skip_ide,
    };
    let outcome = Launcher::new(
        &mut settings,
        &mut store,
        &mut console,
        &mut spawner,
        builder.as_ref(),
        logger,
    )
    .run(&options, now_unix_secs());
    report(outcome.map(|_| ()))
}

fn main() -> std::io::Result<()> {
    let cli = parse_cli_args(std::env::args().skip(1))?;
    if cli.help {
        print!("{}", usage_text());
        return Ok(());
    }

    let logger: Box<dyn EventLogger> = match cli.event_log_path.clone().map(resolve_log_path) {
        Some(path) => Box::new(FileEventLogger::open(&path)?),
        None => Box::new(NullEventLogger),
    };

    run(cli, logger.as_ref())
}
