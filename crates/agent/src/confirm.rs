//! Operator console and the confirmation gate for sensitive tools

use serde_json::Value;
use std::fmt::Display;
use std::io::{self, BufRead, Stdout, StdinLock, Write};

/// Decides whether a sensitive tool may run
pub trait ConfirmationGate {
    /// Blocks until the operator answers. Only an explicit yes approves.
    fn confirm(&mut self, tool_name: &str, arguments: &Value) -> bool;
}

/// `y` or `yes` after trimming, case-sensitive
pub fn is_approval(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "yes")
}

/// Line-based operator console
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `prompt` and read one line. `None` at end of input.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    pub fn say(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    pub fn show_thinking(&mut self, thinking: &str) -> io::Result<()> {
        writeln!(self.output, "Thinking: {}", thinking.trim())
    }

    pub fn show_content(&mut self, content: &str) -> io::Result<()> {
        writeln!(self.output, "\n◆ {}\n", content.trim())
    }

    pub fn show_call(&mut self, tool_name: &str, arguments: &Value) -> io::Result<()> {
        writeln!(
            self.output,
            "Calling {} with arguments {}",
            tool_name, arguments
        )
    }

    pub fn show_result(&mut self, result: &str) -> io::Result<()> {
        writeln!(self.output, "Result: {}", result)
    }

    pub fn notice(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "! {}", text)
    }

    pub fn output(&self) -> &W {
        &self.output
    }
}

impl<R: BufRead, W: Write> ConfirmationGate for Console<R, W> {
    fn confirm(&mut self, tool_name: &str, arguments: &Value) -> bool {
        let pretty =
            serde_json::to_string_pretty(arguments).unwrap_or_else(|_| arguments.to_string());
        if writeln!(
            self.output,
            "\n{} requests approval with arguments:\n{}",
            tool_name, pretty
        )
        .is_err()
        {
            return false;
        }

        matches!(self.read_line("Allow? [y/N] "), Ok(Some(answer)) if is_approval(&answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_is_approval() {
        assert!(is_approval("y"));
        assert!(is_approval("yes"));
        assert!(is_approval("  yes \n"));
        assert!(!is_approval("Y"));
        assert!(!is_approval("YES"));
        assert!(!is_approval("no"));
        assert!(!is_approval(""));
        assert!(!is_approval("yep"));
    }

    #[test]
    fn test_read_line_strips_newline_and_reports_eof() {
        let mut console = console("hello\r\n");
        assert_eq!(console.read_line("> ").unwrap(), Some("hello".to_string()));
        assert_eq!(console.read_line("> ").unwrap(), None);
        assert_eq!(String::from_utf8_lossy(console.output()), "> > ");
    }

    #[test]
    fn test_confirm_shows_arguments_and_approves() {
        let mut console = console("yes\n");
        assert!(console.confirm("delete_file", &json!({"file_path": "a.txt"})));

        let shown = String::from_utf8_lossy(console.output()).to_string();
        assert!(shown.contains("delete_file requests approval"));
        assert!(shown.contains("\"file_path\": \"a.txt\""));
        assert!(shown.contains("Allow? [y/N]"));
    }

    #[test]
    fn test_confirm_denies_on_other_input() {
        assert!(!console("no\n").confirm("delete_file", &json!({})));
        assert!(!console("\n").confirm("delete_file", &json!({})));
        assert!(!console("Yes\n").confirm("delete_file", &json!({})));
    }

    #[test]
    fn test_confirm_denies_on_eof() {
        assert!(!console("").confirm("run_shell_command", &json!({"command": "ls"})));
    }
}
