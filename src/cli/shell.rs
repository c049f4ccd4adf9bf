//! Interactive Shell
//!
//! Reads a line, dispatches it to a local command or to the model, prints
//! the result and repeats. One line is handled to completion before the
//! next is dispatched; stdin is read on its own thread.

use std::io::{self, BufRead};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::tty::IsTty;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{
    commands::{CliCommand, CommandParser, CommandResult, ParsedLine},
    config::CliConfig,
    render::Renderer,
    utils::abbreviate_path,
};
use crate::context::ProjectContext;
use crate::error::{ApiError, ShellError};
use crate::llm::{Completion, CompletionProvider, Message, PerplexityClient};
use crate::tools::Workspace;

const THINKING_REFRESH: Duration = Duration::from_millis(100);

/// Result of handling one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Command(CommandResult),
    Reply {
        completion: Completion,
        elapsed: Duration,
    },
}

/// The project assistant shell
pub struct Shell<P> {
    config: CliConfig,
    workspace: Workspace,
    context: ProjectContext,
    provider: P,
}

impl<P: CompletionProvider> Shell<P> {
    pub fn new(config: CliConfig, workspace: Workspace, provider: P) -> Self {
        let context = ProjectContext::new(config.context_file_limit, config.context_max_chars);
        Self {
            config,
            workspace,
            context,
            provider,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Handle one line of input to completion
    pub async fn handle_line(&mut self, line: &str) -> Outcome {
        match CommandParser::parse_line(line) {
            ParsedLine::Empty => Outcome::Command(CommandResult::NoOp),
            ParsedLine::Command(command, args) => {
                Outcome::Command(self.execute_command(command, &args))
            }
            ParsedLine::Query(query) => {
                let started = Instant::now();
                match self.ask(&query).await {
                    Ok(completion) => Outcome::Reply {
                        completion,
                        elapsed: started.elapsed(),
                    },
                    Err(e) => Outcome::Command(CommandResult::Error(e.to_string())),
                }
            }
        }
    }

    /// Execute a local command
    pub fn execute_command(&mut self, command: CliCommand, args: &[String]) -> CommandResult {
        debug!(%command, ?args, "dispatching command");

        if let Err(usage) = CommandParser::validate_args(&command, args) {
            return CommandResult::Warning(usage);
        }

        match command {
            CliCommand::Help => CommandResult::Info(CliCommand::get_help_text().join("\n")),
            CliCommand::Exit => CommandResult::Exit,
            CliCommand::Pwd => CommandResult::Success(self.workspace.pwd()),
            CliCommand::Ls => match self.workspace.list() {
                Ok(listing) => CommandResult::Success(listing),
                Err(e) => CommandResult::Error(e.to_string()),
            },
            CliCommand::Tree => match self.workspace.tree(self.config.tree_depth) {
                Ok(tree) => CommandResult::Success(tree),
                Err(e) => CommandResult::Error(e.to_string()),
            },
            CliCommand::Cd => {
                // Paths with spaces arrive split on whitespace
                let target = args.join(" ");
                match self.workspace.change_dir(&target) {
                    Ok(()) => CommandResult::NoOp,
                    Err(e) => CommandResult::Error(e.to_string()),
                }
            }
            CliCommand::Touch => self.for_each_name(args, |ws, name| ws.touch(name)),
            CliCommand::Mkdir => self.for_each_name(args, |ws, name| ws.mkdir(name)),
            CliCommand::Rm => self.for_each_name(args, |ws, name| ws.remove(name)),
        }
    }

    /// Run a per-name handler over every argument, reporting each outcome
    fn for_each_name<F, E>(&self, names: &[String], handler: F) -> CommandResult
    where
        F: Fn(&Workspace, &str) -> Result<String, E>,
        E: std::fmt::Display,
    {
        let mut lines = Vec::with_capacity(names.len());
        let mut failed = false;
        for name in names {
            match handler(&self.workspace, name) {
                Ok(message) => lines.push(message),
                Err(e) => {
                    failed = true;
                    lines.push(e.to_string());
                }
            }
        }

        if failed {
            CommandResult::Error(lines.join("\n"))
        } else {
            CommandResult::Success(lines.join("\n"))
        }
    }

    /// Messages sent for a query: the project context, then the query verbatim
    pub fn build_messages(&self, query: &str) -> Vec<Message> {
        vec![
            PerplexityClient::create_system_message(&self.context.build(&self.workspace, query)),
            PerplexityClient::create_user_message(query),
        ]
    }

    /// Forward a query to the model
    pub async fn ask(&self, query: &str) -> Result<Completion, ApiError> {
        info!(chars = query.len(), "forwarding query to model");
        let result = self.provider.complete(self.build_messages(query)).await;
        if let Err(e) = &result {
            warn!(error = %e, "query failed");
        }
        result
    }

    /// Run the interactive loop on stdin/stdout until `exit`, EOF or Ctrl+C
    pub async fn run(&mut self) -> Result<(), ShellError> {
        let stdout = io::stdout();
        let interactive = stdout.is_tty();
        let mut renderer = Renderer::new(stdout, self.config.get_theme_color(), interactive);
        renderer.welcome(&self.config.get_summary())?;

        let home = dirs::home_dir();
        let mut lines = spawn_line_reader();

        loop {
            renderer.prompt(&abbreviate_path(self.workspace.current_dir(), home.as_deref()))?;

            let line = tokio::select! {
                line = lines.recv() => line.transpose()?,
                _ = signal::ctrl_c() => {
                    renderer.newline()?;
                    break;
                }
            };

            let Some(line) = line else {
                // End of input behaves like `exit`
                renderer.newline()?;
                renderer.command_result(&CommandResult::Exit)?;
                break;
            };

            match self.run_line(&line, &mut renderer).await? {
                Some(Outcome::Command(result)) => {
                    renderer.command_result(&result)?;
                    if result == CommandResult::Exit {
                        break;
                    }
                }
                Some(Outcome::Reply {
                    completion,
                    elapsed,
                }) => renderer.reply(&completion, elapsed)?,
                None => {
                    info!("query interrupted by user");
                    renderer.command_result(&CommandResult::Warning(
                        "API call interrupted.".to_string(),
                    ))?;
                }
            }
        }

        Ok(())
    }

    /// Handle a line while animating the thinking indicator.
    /// Ctrl+C abandons the line and yields `None`.
    async fn run_line<W: io::Write>(
        &mut self,
        line: &str,
        renderer: &mut Renderer<W>,
    ) -> Result<Option<Outcome>, ShellError> {
        let started = Instant::now();
        let handled = self.handle_line(line);
        tokio::pin!(handled);

        let mut ticker = tokio::time::interval(THINKING_REFRESH);
        let mut tick = 0usize;
        let animate = renderer.is_interactive();

        // Local commands finish on the first poll, before the indicator draws
        let outcome = loop {
            tokio::select! {
                biased;
                outcome = &mut handled => break Some(outcome),
                _ = signal::ctrl_c() => break None,
                _ = ticker.tick(), if animate => {
                    renderer.thinking(tick, started.elapsed())?;
                    tick += 1;
                }
            }
        };
        if tick > 0 {
            renderer.clear_thinking()?;
        }
        Ok(outcome)
    }
}

/// Read stdin lines on a dedicated thread.
///
/// The thread is never joined: a blocking read cannot be cancelled, and
/// the process must be able to exit while one is pending.
fn spawn_line_reader() -> mpsc::UnboundedReceiver<io::Result<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let failed = line.is_err();
            if tx.send(line).is_err() || failed {
                break;
            }
        }
    });
    rx
}
