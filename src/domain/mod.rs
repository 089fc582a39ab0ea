use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ServerCommand {
    #[serde(default)]
    pub sub_path: String,
    pub command: String,
}

impl ServerCommand {
    pub fn new(sub_path: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            sub_path: sub_path.into(),
            command: command.into(),
        }
    }

    /// Empty sub-paths run at the repository root.
    pub fn working_directory(&self, repo_path: &Path) -> PathBuf {
        if self.sub_path.is_empty() {
            return repo_path.to_path_buf();
        }

        repo_path.join(&self.sub_path)
    }

    pub fn location_label(&self) -> &str {
        if self.sub_path.is_empty() {
            "root"
        } else {
            &self.sub_path
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub last_accessed_unix_secs: i64,
    #[serde(default)]
    pub servers: Vec<ServerCommand>,
}

impl RepositoryRecord {
    /// New record named after the directory's base name.
    pub fn for_directory(path: PathBuf, now_unix_secs: i64) -> Self {
        let name = directory_base_name(&path);
        Self {
            name,
            path,
            last_accessed_unix_secs: now_unix_secs,
            servers: Vec::new(),
        }
    }

    pub fn primary_server(&self) -> Option<&ServerCommand> {
        self.servers.first()
    }

    pub fn extra_servers(&self) -> &[ServerCommand] {
        self.servers.get(1..).unwrap_or(&[])
    }
}

pub fn directory_base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MultiplexerKind {
    WindowsTerminal,
    Zellij,
}

impl MultiplexerKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::WindowsTerminal => "windows-terminal",
            Self::Zellij => "zellij",
        }
    }

    pub fn detect() -> Self {
        if cfg!(windows) {
            Self::WindowsTerminal
        } else {
            Self::Zellij
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum IdeKind {
    #[default]
    VsCode,
    VisualStudio,
    Rider,
    IntellijIdea,
    WebStorm,
    PyCharm,
    Custom,
    None,
}

impl IdeKind {
    pub const ALL: [Self; 8] = [
        Self::VsCode,
        Self::VisualStudio,
        Self::Rider,
        Self::IntellijIdea,
        Self::WebStorm,
        Self::PyCharm,
        Self::Custom,
        Self::None,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::VsCode => "Visual Studio Code",
            Self::VisualStudio => "Visual Studio",
            Self::Rider => "JetBrains Rider",
            Self::IntellijIdea => "IntelliJ IDEA",
            Self::WebStorm => "WebStorm",
            Self::PyCharm => "PyCharm",
            Self::Custom => "Custom",
            Self::None => "None",
        }
    }

    pub const fn default_command(self) -> &'static str {
        match self {
            Self::VsCode => "code",
            Self::VisualStudio => "devenv",
            Self::Rider => "rider",
            Self::IntellijIdea => "idea",
            Self::WebStorm => "webstorm",
            Self::PyCharm => "pycharm",
            Self::Custom | Self::None => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IdeConfig {
    #[serde(default)]
    pub kind: IdeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_executable: Option<String>,
}

impl IdeConfig {
    pub fn new(kind: IdeKind) -> Self {
        Self {
            kind,
            custom_executable: None,
        }
    }

    /// Executable to launch, empty when no IDE is configured.
    pub fn command(&self) -> String {
        match self.kind {
            IdeKind::None => String::new(),
            IdeKind::Custom => self
                .custom_executable
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            kind => kind.default_command().to_string(),
        }
    }

    pub fn display_name(&self) -> String {
        match (self.kind, self.custom_executable.as_deref()) {
            (IdeKind::Custom, Some(executable)) => {
                let file_name = Path::new(executable)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| executable.to_string());
                format!("Custom ({file_name})")
            }
            (kind, _) => kind.label().to_string(),
        }
    }
}
