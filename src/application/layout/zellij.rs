use std::path::{Path, PathBuf};

use super::{LayoutFile, PaneRole, SessionLayoutBuilder, TerminalLaunch};
use crate::domain::{MultiplexerKind, RepositoryRecord, ServerCommand};
use crate::infrastructure::process::ProcessInvocation;

const DEFAULT_SHELL: &str = "/bin/bash";
const INTERACTIVE_PROGRAM: &str = "claude";
const INTERACTIVE_ARGS: [&str; 1] = ["--dangerously-skip-permissions"];
const GIT_UI_PROGRAM: &str = "lazygit";
const LAYOUT_EXTENSION: &str = "kdl";
const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    Vertical,
    Horizontal,
}

impl SplitDirection {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneCommand {
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutPane {
    Leaf {
        role: PaneRole,
        cwd: PathBuf,
        command: Option<PaneCommand>,
    },
    Split {
        direction: SplitDirection,
        children: Vec<LayoutPane>,
    },
}

impl LayoutPane {
    /// A split with a single child collapses to that child.
    pub fn split(direction: SplitDirection, mut children: Vec<LayoutPane>) -> Self {
        if children.len() == 1
            && let Some(child) = children.pop()
        {
            return child;
        }

        Self::Split {
            direction,
            children,
        }
    }

    /// Leaf roles in depth-first order.
    pub fn roles(&self) -> Vec<PaneRole> {
        match self {
            Self::Leaf { role, .. } => vec![*role],
            Self::Split { children, .. } => children.iter().flat_map(Self::roles).collect(),
        }
    }
}

pub struct ZellijLayout {
    shell: String,
    terminal_emulator: String,
    layout_dir: PathBuf,
}

impl ZellijLayout {
    pub fn new(shell: String, terminal_emulator: String, layout_dir: PathBuf) -> Self {
        Self {
            shell,
            terminal_emulator,
            layout_dir,
        }
    }

    pub fn from_env(terminal_emulator: String) -> Self {
        let shell = std::env::var("SHELL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SHELL.to_string());
        Self::new(shell, terminal_emulator, std::env::temp_dir())
    }

    pub fn pane_tree(&self, repo: &RepositoryRecord) -> LayoutPane {
        let root = repo.path.clone();
        let left = LayoutPane::split(
            SplitDirection::Horizontal,
            vec![
                LayoutPane::Leaf {
                    role: PaneRole::Interactive,
                    cwd: root.clone(),
                    command: Some(PaneCommand {
                        program: INTERACTIVE_PROGRAM.to_string(),
                        args: INTERACTIVE_ARGS.iter().map(ToString::to_string).collect(),
                    }),
                },
                LayoutPane::Leaf {
                    role: PaneRole::Shell,
                    cwd: root.clone(),
                    command: None,
                },
            ],
        );

        let mut right_children = Vec::new();
        if let Some(server) = repo.primary_server() {
            right_children.push(self.server_pane(PaneRole::PrimaryServer, &repo.path, server));
        }
        right_children.push(LayoutPane::Leaf {
            role: PaneRole::GitUi,
            cwd: root,
            command: Some(PaneCommand {
                program: GIT_UI_PROGRAM.to_string(),
                args: Vec::new(),
            }),
        });
        let right = LayoutPane::split(SplitDirection::Horizontal, right_children);

        let mut columns = vec![left, right];
        for (offset, server) in repo.extra_servers().iter().enumerate() {
            columns.push(self.server_pane(
                PaneRole::ExtraServer(offset.saturating_add(1)),
                &repo.path,
                server,
            ));
        }

        LayoutPane::split(SplitDirection::Vertical, columns)
    }

    pub fn render(&self, repo: &RepositoryRecord) -> String {
        render_layout(&self.pane_tree(repo))
    }

    /// Runs the command under the shell and keeps the pane open afterwards.
    fn server_pane(&self, role: PaneRole, repo_path: &Path, server: &ServerCommand) -> LayoutPane {
        LayoutPane::Leaf {
            role,
            cwd: server.working_directory(repo_path),
            command: Some(PaneCommand {
                program: self.shell.clone(),
                args: vec![
                    "-c".to_string(),
                    format!(
                        "{}; exec {}",
                        escape_shell_sigils(&server.command),
                        self.shell
                    ),
                ],
            }),
        }
    }
}

impl SessionLayoutBuilder for ZellijLayout {
    fn kind(&self) -> MultiplexerKind {
        MultiplexerKind::Zellij
    }

    fn pane_order(&self, repo: &RepositoryRecord) -> Vec<PaneRole> {
        self.pane_tree(repo).roles()
    }

    fn build(&self, repo: &RepositoryRecord) -> std::io::Result<TerminalLaunch> {
        let layout_file = LayoutFile::create(&self.layout_dir, LAYOUT_EXTENSION, &self.render(repo))?;
        let invocation = ProcessInvocation::new(
            self.terminal_emulator.clone(),
            vec![
                "-e".to_string(),
                "zellij".to_string(),
                "--layout".to_string(),
                layout_file.path().to_string_lossy().into_owned(),
            ],
        );
        Ok(TerminalLaunch::with_layout_file(invocation, layout_file))
    }
}

pub fn render_layout(root: &LayoutPane) -> String {
    let mut output = String::from("layout {\n");
    render_pane(root, 1, &mut output);
    output.push_str("}\n");
    output
}

fn render_pane(pane: &LayoutPane, depth: usize, output: &mut String) {
    let indent = INDENT.repeat(depth);
    match pane {
        LayoutPane::Split {
            direction,
            children,
        } => {
            output.push_str(&format!(
                "{indent}pane split_direction={} {{\n",
                kdl_string(direction.label())
            ));
            for child in children {
                render_pane(child, depth.saturating_add(1), output);
            }
            output.push_str(&format!("{indent}}}\n"));
        }
        LayoutPane::Leaf { cwd, command, .. } => {
            let cwd = kdl_string(&cwd.to_string_lossy());
            let Some(command) = command else {
                output.push_str(&format!("{indent}pane cwd={cwd}\n"));
                return;
            };

            let inner = INDENT.repeat(depth.saturating_add(1));
            output.push_str(&format!("{indent}pane cwd={cwd} {{\n"));
            output.push_str(&format!("{inner}command {}\n", kdl_string(&command.program)));
            if !command.args.is_empty() {
                let args: Vec<String> = command.args.iter().map(|arg| kdl_string(arg)).collect();
                output.push_str(&format!("{inner}args {}\n", args.join(" ")));
            }
            output.push_str(&format!("{indent}}}\n"));
        }
    }
}

/// Quoted layout string literal.
pub fn kdl_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len().saturating_add(2));
    quoted.push('"');
    for character in value.chars() {
        match character {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

/// Keeps `$` literal when the command is handed to `shell -c`.
pub fn escape_shell_sigils(command: &str) -> String {
    command.replace('$', "\\$")
}
