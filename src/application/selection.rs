use std::path::PathBuf;

use serde_json::Value;

use crate::application::catalog::{RepositoryCatalog, RepositorySearch};
use crate::domain::directory_base_name;
use crate::infrastructure::event_log::{Event, EventLogger};
use crate::ui::console::Console;

pub const RECENT_DISPLAY_LIMIT: usize = 10;

/// Interactive pick: a recent-list number, or typed text resolved against the root.
pub fn select_repository(
    console: &mut dyn Console,
    catalog: &RepositoryCatalog<'_>,
    logger: &dyn EventLogger,
) -> std::io::Result<Option<PathBuf>> {
    let recent = catalog.most_recent(RECENT_DISPLAY_LIMIT);

    console.write_line("Recent repositories:");
    console.blank_line();
    for (index, record) in recent.iter().enumerate() {
        console.write_line(&format!("{}. {}", index.saturating_add(1), record.name));
    }
    console.blank_line();
    console.write_line("Enter number to select, or start typing repo name:");
    console.write_prompt("> ");

    let Some(input) = console.read_with_autocomplete(catalog)? else {
        logger.log(Event::new("selection", "empty_input"));
        return Ok(None);
    };

    if let Some(record) = parse_choice(&input, recent.len()).and_then(|index| recent.get(index)) {
        logger.log(Event::new("selection", "recent_chosen").with_path("path", &record.path));
        return Ok(Some(record.path.clone()));
    }

    let matches = catalog.search(&input);
    logger.log(
        Event::new("selection", "searched")
            .with_data("term", Value::from(input.clone()))
            .with_data("matches", Value::from(matches.len())),
    );

    match matches.as_slice() {
        [] => {
            console.write_line("No repositories found.");
            Ok(None)
        }
        [only] => {
            console.write_line(&format!("Found: {}", directory_base_name(only)));
            Ok(Some(only.clone()))
        }
        _ => choose_among(console, &matches),
    }
}

fn choose_among(
    console: &mut dyn Console,
    matches: &[PathBuf],
) -> std::io::Result<Option<PathBuf>> {
    console.blank_line();
    console.write_line("Multiple matches found:");
    for (index, path) in matches.iter().enumerate() {
        console.write_line(&format!(
            "{}. {}",
            index.saturating_add(1),
            directory_base_name(path)
        ));
    }

    let selection = console.prompt_line("Select number: ")?;
    Ok(parse_choice(&selection, matches.len()).and_then(|index| matches.get(index).cloned()))
}

/// One-based menu number to a zero-based index within `count`.
pub fn parse_choice(input: &str, count: usize) -> Option<usize> {
    let number = input.trim().parse::<usize>().ok()?;
    (1..=count).contains(&number).then(|| number - 1)
}
