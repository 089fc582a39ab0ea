use std::path::PathBuf;
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessArgs {
    List(Vec<String>),
    /// Passed to the program unquoted, for hosts that parse their own command line.
    CommandLine(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInvocation {
    pub program: String,
    pub args: ProcessArgs,
    pub working_directory: Option<PathBuf>,
    pub windowless: bool,
}

impl ProcessInvocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args: ProcessArgs::List(args),
            working_directory: None,
            windowless: false,
        }
    }

    pub fn command_line(program: impl Into<String>, command_line: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: ProcessArgs::CommandLine(command_line.into()),
            working_directory: None,
            windowless: false,
        }
    }

    pub fn in_directory(mut self, directory: PathBuf) -> Self {
        self.working_directory = Some(directory);
        self
    }

    pub fn windowless(mut self) -> Self {
        self.windowless = true;
        self
    }

    pub fn display(&self) -> String {
        match &self.args {
            ProcessArgs::List(args) if args.is_empty() => self.program.clone(),
            ProcessArgs::List(args) => format!("{} {}", self.program, args.join(" ")),
            ProcessArgs::CommandLine(line) => format!("{} {line}", self.program),
        }
    }
}

pub trait ProcessSpawner {
    /// Starts the process without waiting for it.
    fn spawn(&mut self, invocation: &ProcessInvocation) -> std::io::Result<()>;
}

pub struct SystemProcessSpawner;

impl ProcessSpawner for SystemProcessSpawner {
    fn spawn(&mut self, invocation: &ProcessInvocation) -> std::io::Result<()> {
        spawn_detached(invocation)
    }
}

pub fn spawn_detached(invocation: &ProcessInvocation) -> std::io::Result<()> {
    if invocation.program.trim().is_empty() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "cannot spawn an empty program",
        ));
    }

    let mut command = Command::new(&invocation.program);
    match &invocation.args {
        ProcessArgs::List(args) => {
            command.args(args);
        }
        ProcessArgs::CommandLine(line) => append_command_line(&mut command, line),
    }
    if let Some(directory) = invocation.working_directory.as_ref() {
        command.current_dir(directory);
    }
    if invocation.windowless {
        hide_window(&mut command);
    }

    command.spawn().map(|_child| ()).map_err(|error| {
        std::io::Error::new(
            error.kind(),
            format!("failed to start '{}': {error}", invocation.program),
        )
    })
}

#[cfg(windows)]
fn append_command_line(command: &mut Command, line: &str) {
    use std::os::windows::process::CommandExt;

    command.raw_arg(line);
}

#[cfg(not(windows))]
fn append_command_line(command: &mut Command, line: &str) {
    command.arg(line);
}

#[cfg(windows)]
fn hide_window(command: &mut Command) {
    use std::os::windows::process::CommandExt;

    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    command.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_window(_command: &mut Command) {}
