//! Agent loop - reads operator input, calls the model and dispatches tools

use std::io::{BufRead, Write};
use tracing::{debug, info, warn};

use localpilot_config::Config;
use localpilot_provider::{ChatParams, Message, Provider, ToolCall};

use crate::confirm::{ConfirmationGate, Console};
use crate::context::ContextBuilder;
use crate::conversation::Conversation;
use crate::tools::{self, ToolInvocation, ToolKind, Toolbox};

/// Tool result recorded when the operator declines a sensitive tool
pub const SKIPPED_BY_USER: &str = "Skipped by user.";

const EXIT_WORD: &str = "bye";
const DEFAULT_HISTORY_LIMIT: usize = 20;
const DEFAULT_MAX_TOOL_ROUNDS: u32 = 20;

fn resolve_model<P: Provider>(provider: &P, model: String) -> String {
    if model.trim().is_empty() {
        provider.default_model()
    } else {
        model
    }
}

/// What happened while answering one operator utterance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnReport {
    pub model_calls: usize,
    pub tool_results: usize,
    /// False when the round cap cut the turn short
    pub completed: bool,
}

/// Totals for an interactive session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub turns: usize,
    pub model_calls: usize,
}

/// Owns the conversation and drives model rounds and tool dispatch
pub struct AgentLoop<P: Provider> {
    provider: P,
    toolbox: Toolbox,
    conversation: Conversation,
    model: String,
    think: bool,
    temperature: Option<f32>,
    max_tool_rounds: u32,
}

impl<P: Provider> AgentLoop<P> {
    /// An empty `model` selects the provider's default
    pub fn new(provider: P, toolbox: Toolbox, model: impl Into<String>) -> Self {
        let system_prompt = ContextBuilder::new(toolbox.working_dir())
            .with_shell_mode(toolbox.shell().mode)
            .build_system_prompt();
        let model = resolve_model(&provider, model.into());

        Self {
            provider,
            toolbox,
            conversation: Conversation::new(system_prompt, DEFAULT_HISTORY_LIMIT),
            model,
            think: true,
            temperature: None,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_config(provider: P, config: &Config) -> Self {
        let toolbox = Toolbox::from_config(config);
        let system_prompt = ContextBuilder::new(toolbox.working_dir())
            .with_shell_mode(config.shell.mode)
            .with_custom_prompt(config.agent.system_prompt.clone())
            .build_system_prompt();
        let model = resolve_model(&provider, config.model());

        Self {
            provider,
            toolbox,
            conversation: Conversation::new(system_prompt, config.history_limit()),
            model,
            think: config.backend.think,
            temperature: config.backend.temperature,
            max_tool_rounds: config.agent.max_tool_rounds,
        }
    }

    pub fn set_think(&mut self, think: bool) {
        self.think = think;
    }

    /// Zero removes the cap
    pub fn set_max_tool_rounds(&mut self, rounds: u32) {
        self.max_tool_rounds = rounds;
    }

    pub fn set_history_limit(&mut self, limit: usize) {
        self.conversation.set_limit(limit);
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn toolbox(&self) -> &Toolbox {
        &self.toolbox
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Interactive session: one utterance per iteration until `bye` or end of input
    pub async fn run<R: BufRead, W: Write>(
        &mut self,
        console: &mut Console<R, W>,
    ) -> crate::Result<SessionReport> {
        let mut report = SessionReport::default();

        while let Some(line) = console.read_line("◆ ")? {
            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            if input.eq_ignore_ascii_case(EXIT_WORD) {
                break;
            }

            let turn = self.handle_utterance(input, console).await?;
            report.turns += 1;
            report.model_calls += turn.model_calls;
        }

        info!(
            "session ended after {} turns, {} model calls",
            report.turns, report.model_calls
        );
        console.say("Goodbye.")?;
        Ok(report)
    }

    /// Answer one utterance: call the model until it stops requesting tools
    pub async fn handle_utterance<R: BufRead, W: Write>(
        &mut self,
        input: &str,
        console: &mut Console<R, W>,
    ) -> crate::Result<TurnReport> {
        self.conversation.push(Message::user(input));
        self.conversation.trim();

        let mut report = TurnReport::default();
        let mut tool_rounds = 0u32;

        loop {
            debug!(
                "model round {} with {} messages",
                report.model_calls + 1,
                self.conversation.messages().len()
            );

            let params = ChatParams {
                model: self.model.clone(),
                messages: self.conversation.messages().to_vec(),
                tools: tools::catalog(),
                think: self.think,
                temperature: self.temperature,
            };
            let response = self.provider.chat(params).await?;
            report.model_calls += 1;

            debug!("model finished: {}", response.done_reason);
            if response.done_reason == "length" {
                warn!("model reply was cut off by the output token limit");
            }

            if let Some(thinking) = response.thinking() {
                console.show_thinking(thinking)?;
            }
            if let Some(content) = response.content() {
                console.show_content(content)?;
            }

            let calls = response.tool_calls().to_vec();
            self.conversation.push(response.message);

            if calls.is_empty() {
                report.completed = true;
                return Ok(report);
            }

            for call in &calls {
                if let Some(result) = self.dispatch(call, console).await? {
                    self.conversation.push(result);
                    report.tool_results += 1;
                }
            }

            tool_rounds += 1;
            if self.max_tool_rounds > 0 && tool_rounds >= self.max_tool_rounds {
                warn!(
                    "model still requesting tools after {} rounds, ending turn",
                    tool_rounds
                );
                console.notice(format!(
                    "Stopped after {} tool rounds; send another message to continue.",
                    tool_rounds
                ))?;
                return Ok(report);
            }
        }
    }

    /// Turn one tool call into its result message. Unknown tools yield `None`.
    async fn dispatch<R: BufRead, W: Write>(
        &self,
        call: &ToolCall,
        console: &mut Console<R, W>,
    ) -> crate::Result<Option<Message>> {
        let Some(kind) = ToolKind::from_name(call.name()) else {
            warn!("model requested unknown tool '{}'", call.name());
            console.notice(format!("Ignoring unknown tool '{}'", call.name()))?;
            return Ok(None);
        };

        let invocation = match ToolInvocation::parse(kind, call.arguments()) {
            Ok(invocation) => invocation,
            Err(e) => {
                warn!("bad arguments for {}: {}", kind, e);
                let content = format!("Error: invalid arguments for {}: {}", kind, e);
                console.show_result(&content)?;
                return Ok(Some(Message::tool(kind.name(), content)));
            }
        };

        if kind.is_sensitive() && !console.confirm(kind.name(), call.arguments()) {
            info!("operator declined {}", kind);
            console.show_result(SKIPPED_BY_USER)?;
            return Ok(Some(Message::tool(kind.name(), SKIPPED_BY_USER)));
        }

        console.show_call(kind.name(), call.arguments())?;
        let content = self.toolbox.execute(&invocation).await.to_string();
        console.show_result(&content)?;

        Ok(Some(Message::tool(kind.name(), content)))
    }
}
