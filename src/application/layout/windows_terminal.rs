use std::path::Path;

use super::{PaneRole, SessionLayoutBuilder, TerminalLaunch};
use crate::domain::{MultiplexerKind, RepositoryRecord, ServerCommand};
use crate::infrastructure::process::ProcessInvocation;

pub const WINDOWS_TERMINAL_SEPARATOR: &str = " ; ";
const WINDOW_DIRECTIVE: &str = "wt --window new --maximized";
const INTERACTIVE_PROGRAM: &str = "wsl";
const GIT_UI_PROGRAM: &str = "gitui";
const HOST_SHELL: &str = "cmd.exe";

/// Flat `wt` command line: left column holds the interactive and shell panes,
/// the right column the primary server and git UI, extra servers add rows.
pub struct WindowsTerminalLayout;

impl WindowsTerminalLayout {
    pub fn directives(repo: &RepositoryRecord) -> Vec<String> {
        let root = quoted_path(&repo.path);
        let mut directives = vec![
            WINDOW_DIRECTIVE.to_string(),
            format!("new-tab -d {root} {INTERACTIVE_PROGRAM}"),
        ];

        if let Some(server) = repo.primary_server() {
            directives.push(server_directive(&repo.path, server));
        }

        directives.push(format!(
            "split-pane -V -d {root} pwsh -NoExit -Command {GIT_UI_PROGRAM}"
        ));
        directives.push("focus-pane -t 0".to_string());
        directives.push(format!("split-pane -V -d {root}"));

        for server in repo.extra_servers() {
            directives.push(server_directive(&repo.path, server));
        }

        directives
    }

    pub fn command_line(repo: &RepositoryRecord) -> String {
        Self::directives(repo).join(WINDOWS_TERMINAL_SEPARATOR)
    }
}

impl SessionLayoutBuilder for WindowsTerminalLayout {
    fn kind(&self) -> MultiplexerKind {
        MultiplexerKind::WindowsTerminal
    }

    fn pane_order(&self, repo: &RepositoryRecord) -> Vec<PaneRole> {
        let mut roles = vec![PaneRole::Interactive];
        if repo.primary_server().is_some() {
            roles.push(PaneRole::PrimaryServer);
        }
        roles.push(PaneRole::GitUi);
        roles.push(PaneRole::Shell);
        roles.extend((1..repo.servers.len()).map(PaneRole::ExtraServer));
        roles
    }

    fn build(&self, repo: &RepositoryRecord) -> std::io::Result<TerminalLaunch> {
        let line = format!("/c {}", Self::command_line(repo));
        Ok(TerminalLaunch::inline(
            ProcessInvocation::command_line(HOST_SHELL, line).windowless(),
        ))
    }
}

fn server_directive(repo_path: &Path, server: &ServerCommand) -> String {
    let directory = quoted_path(&server.working_directory(repo_path));
    format!(
        "split-pane -H -d {directory} pwsh -NoExit -Command \"{}\"",
        escape_double_quotes(&server.command)
    )
}

fn quoted_path(path: &Path) -> String {
    format!("\"{}\"", escape_double_quotes(&path.to_string_lossy()))
}

pub fn escape_double_quotes(value: &str) -> String {
    value.replace('"', "\\\"")
}
