//! System prompt assembly

use chrono::Local;
use localpilot_config::ShellMode;
use std::path::{Path, PathBuf};

use crate::tools::ToolKind;

/// Builds the system message placed at the head of every conversation
pub struct ContextBuilder {
    working_dir: PathBuf,
    shell_mode: ShellMode,
    custom_prompt: Option<String>,
}

impl ContextBuilder {
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        Self {
            working_dir: working_dir.as_ref().to_path_buf(),
            shell_mode: ShellMode::default(),
            custom_prompt: None,
        }
    }

    /// How `run_shell_command` executes, so the model writes commands that work
    pub fn with_shell_mode(mut self, mode: ShellMode) -> Self {
        self.shell_mode = mode;
        self
    }

    /// Use `prompt` verbatim instead of the built-in identity
    pub fn with_custom_prompt(mut self, prompt: Option<String>) -> Self {
        self.custom_prompt = prompt.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn build_system_prompt(&self) -> String {
        match &self.custom_prompt {
            Some(prompt) => prompt.clone(),
            None => self.identity(),
        }
    }

    fn identity(&self) -> String {
        let now = Local::now().format("%Y-%m-%d %H:%M (%A)");
        let tools = ToolKind::ALL
            .into_iter()
            .map(|kind| {
                let marker = if kind.is_sensitive() {
                    " (needs operator approval)"
                } else {
                    ""
                };
                format!("- {}{}: {}", kind.name(), marker, kind.description())
            })
            .collect::<Vec<_>>()
            .join("\n");
        let commands = match self.shell_mode {
            ShellMode::Argv => {
                "run_shell_command starts one program with its arguments and no shell \
                 interpreter: pipes, redirects, globs, `&&` and `;` are passed literally. \
                 Run one simple command per call."
            }
            ShellMode::Shell => {
                "run_shell_command passes the whole line to the configured shell, so pipes and \
                 redirects work."
            }
        };

        format!(
            r#"# localpilot

You are localpilot, a coding assistant running on the operator's machine.
You can inspect and change files, run commands and use git through tools:
{}

{}

## Current Time
{}

## Working Directory
{}
Relative paths are resolved against this directory.

Call tools when you need facts about the files; do not guess their contents.
If a tool result says "Skipped by user.", the operator declined that action:
do not retry it unless asked. When the task is done, answer in plain text."#,
            tools,
            commands,
            now,
            self.working_dir.display()
        )
    }
}
