//! Process tools: shell commands and git

use localpilot_config::ShellMode;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use super::Toolbox;

fn git(args: &[&str]) -> Command {
    let mut cmd = Command::new("git");
    cmd.args(args);
    cmd
}

impl Toolbox {
    /// Run a command line. A nonzero exit is reported in the returned text,
    /// never as an error.
    pub async fn run_shell_command(&self, command: &str) -> String {
        debug!("running command: {}", command);

        let cmd = match self.shell.mode {
            ShellMode::Argv => {
                let argv = match shell_words::split(command) {
                    Ok(argv) => argv,
                    Err(e) => {
                        warn!("could not parse command {:?}: {}", command, e);
                        return format!("Error: could not parse command: {}", e);
                    }
                };
                let Some((program, args)) = argv.split_first() else {
                    return "Error: empty command".to_string();
                };
                let mut cmd = Command::new(program);
                cmd.args(args);
                cmd
            }
            ShellMode::Shell => {
                let mut cmd = Command::new(&self.shell.program);
                cmd.arg("-c").arg(command);
                cmd
            }
        };

        self.capture(cmd).await
    }

    pub async fn git_status(&self) -> String {
        self.capture(git(&["status"])).await
    }

    pub async fn git_diff(&self) -> String {
        self.capture(git(&["diff"])).await
    }

    /// `git add .` then `git commit -m <message>`. The add result is not
    /// checked before committing.
    pub async fn git_commit(&self, message: &str) -> String {
        let add = self.capture(git(&["add", "."])).await;
        let commit = self.capture(git(&["commit", "-m", message])).await;
        format!("{}\n{}", add, commit)
    }

    async fn capture(&self, mut cmd: Command) -> String {
        cmd.current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let result = match self.shell.timeout_secs {
            Some(secs) => {
                match tokio::time::timeout(Duration::from_secs(secs), cmd.output()).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!("command timed out after {} seconds", secs);
                        return format!("Error: command timed out after {} seconds", secs);
                    }
                }
            }
            None => cmd.output().await,
        };

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                warn!("could not start command: {}", e);
                return format!("Error: {}", e);
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if output.status.success() {
            format!("{}{}", stdout, stderr)
        } else {
            let reason = match output.status.code() {
                Some(code) => format!("exit code {}", code),
                None => "terminated by signal".to_string(),
            };
            warn!("command failed ({})", reason);
            format!("Error ({}): {}", reason, stderr.trim_end())
        }
    }
}
