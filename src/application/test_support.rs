use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::application::catalog::RepositorySearch;
use crate::infrastructure::event_log::{Event, EventLogger};
use crate::ui::console::Console;

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

pub(crate) fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    let sequence = NEXT_DIR.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!(
        "{prefix}-{}-{nanos}-{sequence}",
        process::id()
    ));
    fs::create_dir_all(&path).expect("test dir should be created");
    path
}

pub(crate) fn root_with(children: &[&str]) -> PathBuf {
    let root = unique_test_dir("repol-root");
    for child in children {
        fs::create_dir_all(root.join(child)).expect("child dir should be created");
    }
    root
}

/// Replays canned answers and records everything written.
#[derive(Debug, Default)]
pub(crate) struct ScriptedConsole {
    lines: VecDeque<String>,
    autocomplete: VecDeque<Option<String>>,
    output: Vec<String>,
}

impl ScriptedConsole {
    pub(crate) fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn push_autocomplete(&mut self, answer: Option<&str>) {
        self.autocomplete.push_back(answer.map(ToString::to_string));
    }

    pub(crate) fn output(&self) -> &[String] {
        &self.output
    }

    pub(crate) fn printed(&self, needle: &str) -> bool {
        self.output.iter().any(|line| line.contains(needle))
    }
}

impl Console for ScriptedConsole {
    fn write_line(&mut self, line: &str) {
        self.output.push(line.to_string());
    }

    fn write_prompt(&mut self, prompt: &str) {
        self.output.push(prompt.to_string());
    }

    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        Ok(self.lines.pop_front().map(|line| line.trim().to_string()))
    }

    fn read_with_autocomplete(
        &mut self,
        _search: &dyn RepositorySearch,
    ) -> std::io::Result<Option<String>> {
        Ok(self.autocomplete.pop_front().flatten())
    }
}

#[derive(Default)]
pub(crate) struct RecordingEventLogger {
    events: Mutex<Vec<Event>>,
}

impl RecordingEventLogger {
    pub(crate) fn kinds(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .map(|event| event.kind)
            .collect()
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventLogger for RecordingEventLogger {
    fn log(&self, event: Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
