//! localpilot command implementations

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, warn};

use localpilot_agent::{AgentLoop, Console};
use localpilot_config::{self, Config, ShellMode};
use localpilot_provider::ollama::OllamaProvider;
use localpilot_provider::Provider;

/// Per-run overrides for `chat`
#[derive(Debug, Default)]
pub struct ChatOptions {
    pub model: Option<String>,
    pub no_think: bool,
    pub dir: Option<PathBuf>,
}

impl ChatOptions {
    fn apply(self, config: &mut Config) -> Result<()> {
        if let Some(model) = self.model {
            config.backend.model = model;
        }
        if self.no_think {
            config.backend.think = false;
        }
        if let Some(dir) = self.dir {
            let dir = dir
                .canonicalize()
                .with_context(|| format!("Working directory {} not found", dir.display()))?;
            anyhow::ensure!(dir.is_dir(), "{} is not a directory", dir.display());
            config.agent.working_dir = Some(dir.to_string_lossy().into_owned());
        }
        Ok(())
    }
}

/// Write the default config
pub async fn init_command() -> Result<()> {
    println!("◆ Initializing localpilot...");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let path = localpilot_config::config_path();
    let existed = path.exists();
    let config = localpilot_config::init()
        .await
        .with_context(|| format!("Could not initialize {}", path.display()))?;

    if existed {
        println!("Config already present at {}", path.display());
    } else {
        println!("Created {}", path.display());
    }

    println!("\n◆ localpilot initialized");
    println!("\nNext steps:");
    println!("  1. Pull the model: ollama pull {}", config.model());
    println!("  2. Start chatting: localpilot chat");

    Ok(())
}

/// Show config and probe the backend
pub async fn status_command() -> Result<()> {
    let config_path = localpilot_config::config_path();
    let config = Config::load()
        .await
        .with_context(|| format!("Could not read {}", config_path.display()))?;

    println!("◆ localpilot Status");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "Config:    {} {}",
        config_path.display(),
        if config_path.exists() {
            "[OK]"
        } else {
            "[Missing, using defaults]"
        }
    );
    println!("Model:     {}", config.model());
    println!(
        "Thinking:  {}",
        if config.backend.think { "on" } else { "off" }
    );
    println!("Directory: {}", config.working_dir().display());
    println!("History:   {} messages", config.history_limit());
    println!(
        "Shell:     {}",
        match config.shell.mode {
            ShellMode::Argv => "argv (no shell interpreter)".to_string(),
            ShellMode::Shell => format!("{} -c", config.shell.program),
        }
    );

    let provider = OllamaProvider::new(
        Some(config.backend.base_url.clone()),
        Some(config.model()),
    );
    if !provider.is_configured() {
        println!("Backend:   [Not set] add backend.base_url to the config");
        println!("\n◆ Not ready");
        return Ok(());
    }
    println!("Backend:   {}", provider.base_url());

    match provider.list_models().await {
        Ok(models) => {
            let installed = models.iter().any(|m| m == &config.backend.model);
            println!(
                "Ollama:    [Reachable] {} models, configured model {}",
                models.len(),
                if installed { "[Installed]" } else { "[Missing]" }
            );
        }
        Err(e) => {
            debug!("backend probe failed: {}", e);
            println!("Ollama:    [Unreachable] {}", e);
        }
    }

    println!("\n◆ Ready");
    Ok(())
}

/// Interactive session on stdin/stdout
pub async fn chat_command(options: ChatOptions) -> Result<()> {
    let mut config = Config::load().await.context("Could not load config")?;
    options.apply(&mut config)?;

    let provider = OllamaProvider::new(
        Some(config.backend.base_url.clone()),
        Some(config.model()),
    );
    if config.shell.mode == ShellMode::Shell {
        warn!(
            "shell mode enabled: commands run through {} -c",
            config.shell.program
        );
    }

    let mut agent = AgentLoop::with_config(provider, &config);

    println!("◆ localpilot ({})", agent.model());
    println!("Working in {}", agent.toolbox().working_dir().display());
    println!("Type 'bye' to quit.");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mut console = Console::stdio();
    let report = agent
        .run(&mut console)
        .await
        .context("Agent session aborted")?;
    debug!(
        "{} turns, {} model calls",
        report.turns, report.model_calls
    );

    Ok(())
}
