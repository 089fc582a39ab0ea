use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::domain::{MultiplexerKind, RepositoryRecord};
use crate::infrastructure::config::Settings;
use crate::infrastructure::process::ProcessInvocation;

mod windows_terminal;
mod zellij;

pub use windows_terminal::{
    WINDOWS_TERMINAL_SEPARATOR, WindowsTerminalLayout, escape_double_quotes,
};
pub use zellij::{
    LayoutPane, PaneCommand, SplitDirection, ZellijLayout, escape_shell_sigils, kdl_string,
    render_layout,
};

const LAYOUT_FILE_PREFIX: &str = "repol";

/// Pane slots every synthesized session is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneRole {
    Interactive,
    Shell,
    PrimaryServer,
    GitUi,
    ExtraServer(usize),
}

pub trait SessionLayoutBuilder {
    fn kind(&self) -> MultiplexerKind;

    /// Pane roles in the order the encoding emits them.
    fn pane_order(&self, repo: &RepositoryRecord) -> Vec<PaneRole>;

    fn build(&self, repo: &RepositoryRecord) -> std::io::Result<TerminalLaunch>;
}

/// A ready-to-spawn invocation plus any temporary resources it depends on.
///
/// Dropping the launch removes its layout file.
#[derive(Debug)]
pub struct TerminalLaunch {
    pub invocation: ProcessInvocation,
    layout_file: Option<LayoutFile>,
}

impl TerminalLaunch {
    pub fn inline(invocation: ProcessInvocation) -> Self {
        Self {
            invocation,
            layout_file: None,
        }
    }

    pub fn with_layout_file(invocation: ProcessInvocation, layout_file: LayoutFile) -> Self {
        Self {
            invocation,
            layout_file: Some(layout_file),
        }
    }

    pub fn layout_path(&self) -> Option<&Path> {
        self.layout_file.as_ref().map(LayoutFile::path)
    }

    /// Removes the layout file now instead of on drop, surfacing the error.
    pub fn cleanup(self) -> std::io::Result<()> {
        match self.layout_file {
            Some(layout_file) => layout_file.remove(),
            None => Ok(()),
        }
    }
}

#[derive(Debug)]
pub struct LayoutFile {
    path: PathBuf,
    removed: bool,
}

impl LayoutFile {
    /// Writes `contents` to a fresh file in `directory`; never reuses an existing name.
    pub fn create(directory: &Path, extension: &str, contents: &str) -> std::io::Result<Self> {
        fs::create_dir_all(directory)?;
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_nanos();

        let mut sequence = 0u32;
        loop {
            let file_name = format!(
                "{LAYOUT_FILE_PREFIX}-{}-{stamp}-{sequence}.{extension}",
                std::process::id()
            );
            let path = directory.join(file_name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    let layout_file = Self {
                        path,
                        removed: false,
                    };
                    file.write_all(contents.as_bytes())?;
                    file.flush()?;
                    return Ok(layout_file);
                }
                Err(error) if error.kind() == std::io::ErrorKind::AlreadyExists => {
                    sequence = sequence.saturating_add(1);
                }
                Err(error) => return Err(error),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn remove(mut self) -> std::io::Result<()> {
        self.removed = true;
        fs::remove_file(&self.path)
    }
}

impl Drop for LayoutFile {
    fn drop(&mut self) {
        if !self.removed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

pub fn builder_for(settings: &Settings) -> Box<dyn SessionLayoutBuilder> {
    match settings.multiplexer() {
        MultiplexerKind::WindowsTerminal => Box::new(WindowsTerminalLayout),
        MultiplexerKind::Zellij => Box::new(ZellijLayout::from_env(
            settings.terminal_emulator.clone(),
        )),
    }
}
