use std::path::{Path, PathBuf};

use crate::application::catalog::search_directories;
use crate::application::selection::parse_choice;
use crate::domain::{IdeConfig, IdeKind, RepositoryRecord, ServerCommand, directory_base_name};
use crate::ui::console::Console;

/// Builds a record for a directory seen for the first time.
pub fn configure_repository(
    console: &mut dyn Console,
    path: PathBuf,
    now_unix_secs: i64,
) -> std::io::Result<RepositoryRecord> {
    let mut record = RepositoryRecord::for_directory(path, now_unix_secs);

    console.blank_line();
    console.write_line(&format!("Configuring: {}", record.name));
    console.blank_line();
    console.write_line("Do you want to add server commands? (y/n)");
    if !console.confirm("> ")? {
        return Ok(record);
    }

    loop {
        console.blank_line();
        console.write_line("Enter server configuration:");
        let sub_path = select_sub_path(console, &record.path)?;
        console.write_prompt("Command to execute: ");
        let Some(command) = console.read_line()? else {
            return Ok(record);
        };
        if command.is_empty() {
            console.write_line("Command cannot be empty.");
            continue;
        }

        let server = ServerCommand::new(sub_path, command);
        console.blank_line();
        console.write_line(&format!(
            "Added: {} in {}",
            server.command,
            server.location_label()
        ));
        record.servers.push(server);

        console.blank_line();
        console.write_line("Add another server? (y/n)");
        if !console.confirm("> ")? {
            return Ok(record);
        }
    }
}

/// Menu loop over the server list; returns the edited record on "done".
pub fn edit_repository(
    console: &mut dyn Console,
    mut record: RepositoryRecord,
) -> std::io::Result<RepositoryRecord> {
    loop {
        console.blank_line();
        console.write_line(&format!("=== Editing: {} ===", record.name));
        console.blank_line();
        console.write_line("Current servers:");
        if record.servers.is_empty() {
            console.write_line("  (none)");
        }
        for (index, server) in record.servers.iter().enumerate() {
            console.write_line(&format!(
                "  {}. {} (in {})",
                index.saturating_add(1),
                server.command,
                server.location_label()
            ));
        }
        console.blank_line();
        console.write_line("Options:");
        console.write_line("  a. Add server");
        console.write_line("  r. Remove server");
        console.write_line("  e. Edit server");
        console.write_line("  c. Clear all servers");
        console.write_line("  d. Done editing");
        console.write_prompt("> ");

        let Some(choice) = console.read_line()? else {
            return Ok(record);
        };
        match choice.to_lowercase().as_str() {
            "a" => add_server(console, &mut record)?,
            "r" => remove_server(console, &mut record)?,
            "e" => edit_server(console, &mut record)?,
            "c" => {
                record.servers.clear();
                console.write_line("All servers cleared.");
            }
            "d" => return Ok(record),
            _ => console.write_line("Invalid option."),
        }
    }
}

fn add_server(console: &mut dyn Console, record: &mut RepositoryRecord) -> std::io::Result<()> {
    console.blank_line();
    let sub_path = select_sub_path(console, &record.path)?;
    let command = console.prompt_line("Command to execute: ")?;
    if command.is_empty() {
        console.write_line("Command cannot be empty.");
        return Ok(());
    }

    let server = ServerCommand::new(sub_path, command);
    console.write_line(&format!(
        "Added: {} in {}",
        server.command,
        server.location_label()
    ));
    record.servers.push(server);
    Ok(())
}

fn remove_server(console: &mut dyn Console, record: &mut RepositoryRecord) -> std::io::Result<()> {
    if record.servers.is_empty() {
        console.write_line("No servers to remove.");
        return Ok(());
    }

    let input = console.prompt_line("Enter server number to remove: ")?;
    let Some(index) = parse_choice(&input, record.servers.len()) else {
        console.write_line("Invalid server number.");
        return Ok(());
    };
    let removed = record.servers.remove(index);
    console.write_line(&format!("Removed: {}", removed.command));
    Ok(())
}

fn edit_server(console: &mut dyn Console, record: &mut RepositoryRecord) -> std::io::Result<()> {
    if record.servers.is_empty() {
        console.write_line("No servers to edit.");
        return Ok(());
    }

    let input = console.prompt_line("Enter server number to edit: ")?;
    let Some(index) = parse_choice(&input, record.servers.len()) else {
        console.write_line("Invalid server number.");
        return Ok(());
    };

    console.blank_line();
    console.write_line(&format!("Editing: {}", record.servers[index].command));
    console.blank_line();
    console.write_line("1. Change subpath");
    console.write_line("2. Change command");
    console.write_line("3. Change both");
    let choice = console.prompt_line("> ")?;
    let (change_path, change_command) = match choice.as_str() {
        "1" => (true, false),
        "2" => (false, true),
        "3" => (true, true),
        _ => {
            console.write_line("Invalid option.");
            return Ok(());
        }
    };

    if change_path {
        let sub_path = select_sub_path(console, &record.path)?;
        record.servers[index].sub_path = sub_path;
    }
    if change_command {
        let command = console.prompt_line("New command: ")?;
        if !command.is_empty() {
            record.servers[index].command = command;
        }
    }
    console.write_line("Server updated.");
    Ok(())
}

/// Lists the repository's immediate subdirectories; a number picks one, text is taken as typed.
pub fn select_sub_path(console: &mut dyn Console, repo_path: &Path) -> std::io::Result<String> {
    let directories = search_directories(repo_path, "");
    if !directories.is_empty() {
        console.write_line("Subdirectories:");
        for (index, directory) in directories.iter().enumerate() {
            console.write_line(&format!(
                "  {}. {}",
                index.saturating_add(1),
                directory_base_name(directory)
            ));
        }
    }

    let input = console.prompt_line("SubPath (number or path, leave empty for root): ")?;
    if let Some(index) = parse_choice(&input, directories.len()) {
        return Ok(directory_base_name(&directories[index]));
    }
    Ok(input)
}

pub fn display_current_ide(console: &mut dyn Console, config: &IdeConfig) {
    console.blank_line();
    console.write_line(&format!("Current IDE: {}", config.display_name()));
    if config.kind != IdeKind::None {
        console.write_line(&format!("Command: {}", config.command()));
    }
}

pub fn configure_ide(
    console: &mut dyn Console,
    current: &IdeConfig,
) -> std::io::Result<IdeConfig> {
    let mut config = current.clone();

    console.blank_line();
    console.write_line("=== IDE Configuration ===");
    console.blank_line();
    console.write_line("Select your preferred IDE:");
    console.blank_line();
    for (index, kind) in IdeKind::ALL.iter().enumerate() {
        let detail = match kind {
            IdeKind::Custom => "(specify your own executable)".to_string(),
            IdeKind::None => "(terminal only)".to_string(),
            kind => format!("(command: {})", kind.default_command()),
        };
        console.write_line(&format!(
            "{}. {} {detail}",
            index.saturating_add(1),
            kind.label()
        ));
    }
    console.blank_line();

    let choice = console.prompt_line("> ")?;
    config.kind = match parse_choice(&choice, IdeKind::ALL.len()) {
        Some(index) => IdeKind::ALL[index],
        None => {
            console.write_line("Invalid selection, using Visual Studio Code as default.");
            IdeKind::VsCode
        }
    };

    if config.kind == IdeKind::Custom {
        if let Some(executable) = prompt_custom_executable(console)? {
            config.custom_executable = Some(executable);
        }
    } else if config.kind != IdeKind::None {
        console.blank_line();
        console.write_line(&format!("Selected: {}", config.kind.label()));
        console.write_line(&format!("Command: {}", config.kind.default_command()));
        console.blank_line();
        console.write_line("Would you like to customize the executable path? (y/n)");
        if console.confirm("> ")?
            && let Some(executable) = prompt_custom_executable(console)?
        {
            config.kind = IdeKind::Custom;
            config.custom_executable = Some(executable);
        }
    }

    console.blank_line();
    console.write_line(&format!("IDE configured: {}", config.display_name()));
    Ok(config)
}

fn prompt_custom_executable(console: &mut dyn Console) -> std::io::Result<Option<String>> {
    console.blank_line();
    console.write_line("Enter the full path to your IDE executable:");
    let path = console.prompt_line("> ")?;
    if path.is_empty() {
        console.write_line("No path provided.");
        return Ok(None);
    }

    console.write_line(&format!("Custom path set: {path}"));
    Ok(Some(path))
}
