//! Tool catalog
//!
//! The set of tools is closed: [`ToolKind`] names every tool the model may
//! request, [`ToolInvocation`] carries its typed arguments and [`Toolbox`]
//! executes it. Dispatch is an exhaustive `match`, so adding a tool means
//! touching every place that must know about it.

pub mod filesystem;
pub mod shell;

use localpilot_config::{Config, ShellConfig};
use localpilot_provider::{object_schema, Tool};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// Every tool the model can call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    CreateFile,
    ListFilesInDirectory,
    ReadFile,
    WriteInFile,
    UpdateInFile,
    DeleteFile,
    RunShellCommand,
    GitStatus,
    GitDiff,
    GitCommit,
}

impl ToolKind {
    pub const ALL: [ToolKind; 10] = [
        ToolKind::CreateFile,
        ToolKind::ListFilesInDirectory,
        ToolKind::ReadFile,
        ToolKind::WriteInFile,
        ToolKind::UpdateInFile,
        ToolKind::DeleteFile,
        ToolKind::RunShellCommand,
        ToolKind::GitStatus,
        ToolKind::GitDiff,
        ToolKind::GitCommit,
    ];

    /// Wire name used in tool descriptors and tool calls
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::CreateFile => "create_file",
            ToolKind::ListFilesInDirectory => "list_files_in_directory",
            ToolKind::ReadFile => "read_file",
            ToolKind::WriteInFile => "write_in_file",
            ToolKind::UpdateInFile => "update_in_file",
            ToolKind::DeleteFile => "delete_file",
            ToolKind::RunShellCommand => "run_shell_command",
            ToolKind::GitStatus => "git_status",
            ToolKind::GitDiff => "git_diff",
            ToolKind::GitCommit => "git_commit",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Tools that mutate the filesystem, version control or run commands
    /// need operator approval before they execute.
    pub fn is_sensitive(self) -> bool {
        match self {
            ToolKind::CreateFile
            | ToolKind::WriteInFile
            | ToolKind::UpdateInFile
            | ToolKind::DeleteFile
            | ToolKind::RunShellCommand
            | ToolKind::GitCommit => true,
            ToolKind::ListFilesInDirectory
            | ToolKind::ReadFile
            | ToolKind::GitStatus
            | ToolKind::GitDiff => false,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ToolKind::CreateFile => {
                "Create a new empty file named file_name inside the directory file_path. \
                 Returns true if the file exists afterwards."
            }
            ToolKind::ListFilesInDirectory => {
                "List the files and folders directly inside a directory (not recursive)."
            }
            ToolKind::ReadFile => "Read and return the full text content of a file.",
            ToolKind::WriteInFile => {
                "Overwrite a file with the given content, creating it if it does not exist."
            }
            ToolKind::UpdateInFile => {
                "Replace every occurrence of the exact text old with new inside a file."
            }
            ToolKind::DeleteFile => "Delete a file.",
            ToolKind::RunShellCommand => {
                "Run a command line in the working directory and return its output."
            }
            ToolKind::GitStatus => "Show the git working tree status.",
            ToolKind::GitDiff => "Show unstaged changes in the git working tree.",
            ToolKind::GitCommit => "Stage all changes (git add .) and commit them with a message.",
        }
    }

    pub fn parameters(self) -> Value {
        match self {
            ToolKind::CreateFile => object_schema(&[
                ("file_path", "Directory where the file is created", true),
                ("file_name", "Name of the file to create", true),
            ]),
            ToolKind::ListFilesInDirectory => {
                object_schema(&[("directory", "Directory to list, defaults to .", false)])
            }
            ToolKind::ReadFile | ToolKind::DeleteFile => {
                object_schema(&[("file_path", "Path of the file", true)])
            }
            ToolKind::WriteInFile => object_schema(&[
                ("file_path", "Path of the file", true),
                ("content", "Text that replaces the whole file", true),
            ]),
            ToolKind::UpdateInFile => object_schema(&[
                ("file_path", "Path of the file", true),
                ("old", "Exact text to replace", true),
                ("new", "Replacement text", true),
            ]),
            ToolKind::RunShellCommand => {
                object_schema(&[("command", "Command line to run", true)])
            }
            ToolKind::GitStatus | ToolKind::GitDiff => object_schema(&[]),
            ToolKind::GitCommit => object_schema(&[("message", "Commit message", true)]),
        }
    }

    pub fn definition(self) -> Tool {
        Tool::new(self.name(), self.description(), self.parameters())
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Descriptors for the whole catalog, sent with every model request
pub fn catalog() -> Vec<Tool> {
    ToolKind::ALL.into_iter().map(ToolKind::definition).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFileArgs {
    pub file_path: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDirectoryArgs {
    #[serde(default = "current_dir_arg")]
    pub directory: String,
}

fn current_dir_arg() -> String {
    ".".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilePathArgs {
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteFileArgs {
    pub file_path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateFileArgs {
    pub file_path: String,
    pub old: String,
    pub new: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandArgs {
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitArgs {
    pub message: String,
}

/// A tool call whose arguments have been checked against the tool's schema
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    CreateFile(CreateFileArgs),
    ListFilesInDirectory(ListDirectoryArgs),
    ReadFile(FilePathArgs),
    WriteInFile(WriteFileArgs),
    UpdateInFile(UpdateFileArgs),
    DeleteFile(FilePathArgs),
    RunShellCommand(CommandArgs),
    GitStatus,
    GitDiff,
    GitCommit(CommitArgs),
}

impl ToolInvocation {
    /// Decode the model's argument mapping for `kind`
    pub fn parse(kind: ToolKind, arguments: &Value) -> Result<Self, serde_json::Error> {
        let args = if arguments.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            arguments.clone()
        };

        Ok(match kind {
            ToolKind::CreateFile => Self::CreateFile(serde_json::from_value(args)?),
            ToolKind::ListFilesInDirectory => {
                Self::ListFilesInDirectory(serde_json::from_value(args)?)
            }
            ToolKind::ReadFile => Self::ReadFile(serde_json::from_value(args)?),
            ToolKind::WriteInFile => Self::WriteInFile(serde_json::from_value(args)?),
            ToolKind::UpdateInFile => Self::UpdateInFile(serde_json::from_value(args)?),
            ToolKind::DeleteFile => Self::DeleteFile(serde_json::from_value(args)?),
            ToolKind::RunShellCommand => Self::RunShellCommand(serde_json::from_value(args)?),
            ToolKind::GitStatus => Self::GitStatus,
            ToolKind::GitDiff => Self::GitDiff,
            ToolKind::GitCommit => Self::GitCommit(serde_json::from_value(args)?),
        })
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            Self::CreateFile(_) => ToolKind::CreateFile,
            Self::ListFilesInDirectory(_) => ToolKind::ListFilesInDirectory,
            Self::ReadFile(_) => ToolKind::ReadFile,
            Self::WriteInFile(_) => ToolKind::WriteInFile,
            Self::UpdateInFile(_) => ToolKind::UpdateInFile,
            Self::DeleteFile(_) => ToolKind::DeleteFile,
            Self::RunShellCommand(_) => ToolKind::RunShellCommand,
            Self::GitStatus => ToolKind::GitStatus,
            Self::GitDiff => ToolKind::GitDiff,
            Self::GitCommit(_) => ToolKind::GitCommit,
        }
    }
}

/// Result of a tool, typed per operation
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// create / write / update / delete
    Flag(bool),
    /// directory listing
    Entries(Vec<String>),
    /// read / shell / git
    Text(String),
}

impl fmt::Display for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolOutput::Flag(flag) => write!(f, "{}", flag),
            ToolOutput::Entries(entries) => write!(f, "{}", Value::from(entries.clone())),
            ToolOutput::Text(text) => f.write_str(text),
        }
    }
}

/// Executes tool invocations against the host
#[derive(Debug, Clone)]
pub struct Toolbox {
    working_dir: PathBuf,
    shell: ShellConfig,
}

impl Toolbox {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self::with_shell(working_dir, ShellConfig::default())
    }

    pub fn with_shell(working_dir: impl Into<PathBuf>, shell: ShellConfig) -> Self {
        Self {
            working_dir: working_dir.into(),
            shell,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_shell(config.working_dir(), config.shell.clone())
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn shell(&self) -> &ShellConfig {
        &self.shell
    }

    /// Relative paths resolve against the working directory
    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    /// Run one invocation. Never fails: errors become the tool's failure value.
    pub async fn execute(&self, invocation: &ToolInvocation) -> ToolOutput {
        match invocation {
            ToolInvocation::CreateFile(args) => {
                ToolOutput::Flag(self.create_file(&args.file_path, &args.file_name).await)
            }
            ToolInvocation::ListFilesInDirectory(args) => {
                ToolOutput::Entries(self.list_files_in_directory(&args.directory).await)
            }
            ToolInvocation::ReadFile(args) => {
                ToolOutput::Text(self.read_file(&args.file_path).await)
            }
            ToolInvocation::WriteInFile(args) => {
                ToolOutput::Flag(self.write_in_file(&args.file_path, &args.content).await)
            }
            ToolInvocation::UpdateInFile(args) => ToolOutput::Flag(
                self.update_in_file(&args.file_path, &args.old, &args.new)
                    .await,
            ),
            ToolInvocation::DeleteFile(args) => {
                ToolOutput::Flag(self.delete_file(&args.file_path).await)
            }
            ToolInvocation::RunShellCommand(args) => {
                ToolOutput::Text(self.run_shell_command(&args.command).await)
            }
            ToolInvocation::GitStatus => ToolOutput::Text(self.git_status().await),
            ToolInvocation::GitDiff => ToolOutput::Text(self.git_diff().await),
            ToolInvocation::GitCommit(args) => {
                ToolOutput::Text(self.git_commit(&args.message).await)
            }
        }
    }
}
