//! Terminal rendering for the shell: banner, prompt, command results,
//! the thinking indicator and model replies.
//!
//! Colors are only emitted on an interactive terminal and never when
//! `NO_COLOR` is set.

use std::env;
use std::io::{self, Write};
use std::time::Duration;

use crossterm::{
    cursor, queue,
    style::{Color, Print, Stylize},
    terminal::{Clear, ClearType},
};

use super::commands::{CliCommand, CommandResult};
use super::utils::{create_text_box, format_elapsed, spinner_frame};
use crate::llm::Completion;

/// Writes shell output to a terminal (or any writer)
pub struct Renderer<W: Write> {
    out: W,
    theme: Color,
    interactive: bool,
    color: bool,
}

impl<W: Write> Renderer<W> {
    /// `interactive` enables the live thinking indicator and colors
    pub fn new(out: W, theme: Color, interactive: bool) -> Self {
        Self {
            out,
            theme,
            interactive,
            color: interactive && env::var_os("NO_COLOR").is_none(),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn themed(&self, text: &str) -> String {
        self.painted(text, self.theme)
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dim().to_string()
        } else {
            text.to_string()
        }
    }

    fn painted(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    /// Show welcome banner, configuration summary and usage hints
    pub fn welcome(&mut self, summary: &[String]) -> io::Result<()> {
        let banner = create_text_box(&[
            String::new(),
            "  Plex Code - Powered by Perplexity AI  ".to_string(),
            String::new(),
        ]);
        writeln!(self.out)?;
        for line in banner {
            let line = self.themed(line.as_str());
            writeln!(self.out, "{}", line)?;
        }
        for line in summary {
            let line = self.dim(line.as_str());
            writeln!(self.out, "{}", line)?;
        }

        let commands = [
            CliCommand::Ls,
            CliCommand::Tree,
            CliCommand::Cd,
            CliCommand::Pwd,
            CliCommand::Touch,
            CliCommand::Mkdir,
            CliCommand::Rm,
        ]
        .iter()
        .map(|cmd| cmd.usage())
        .collect::<Vec<_>>()
        .join(", ");

        let heading = if self.color {
            "How to use:".bold().to_string()
        } else {
            "How to use:".to_string()
        };
        let hints = [
            self.dim("• Type your question or command naturally"),
            format!("{} {}", self.dim("• Use CLI commands:"), self.themed(commands.as_str())),
            format!("{} {} {}", self.dim("• Type"), self.themed("help"), self.dim("to see available commands")),
            format!("{} {} {}", self.dim("• Type"), self.themed("exit"), self.dim("to quit")),
            format!(
                "{} {} {}",
                self.dim("• Press"),
                self.themed("Ctrl+C"),
                self.dim("during API calls to interrupt")
            ),
        ];

        writeln!(self.out)?;
        writeln!(self.out, "{}", heading)?;
        for hint in hints {
            writeln!(self.out, "{}", hint)?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }

    /// Print the input prompt without a trailing newline
    pub fn prompt(&mut self, cwd_display: &str) -> io::Result<()> {
        let cwd = self.themed(cwd_display);
        write!(self.out, "{}> ", cwd)?;
        self.out.flush()
    }

    /// Print the outcome of a local command
    pub fn command_result(&mut self, result: &CommandResult) -> io::Result<()> {
        match result {
            CommandResult::Success(msg) | CommandResult::Info(msg) => {
                if !msg.trim().is_empty() {
                    writeln!(self.out, "{}", msg)?;
                }
            }
            CommandResult::Warning(msg) => {
                let msg = self.painted(msg, Color::Yellow);
                writeln!(self.out, "{}", msg)?
            }
            CommandResult::Error(msg) => {
                let msg = self.painted(msg, Color::Red);
                writeln!(self.out, "{}", msg)?
            }
            CommandResult::Exit => {
                let msg = self.themed("Goodbye!");
                writeln!(self.out, "{}", msg)?
            }
            CommandResult::NoOp => {}
        }
        self.out.flush()
    }

    /// Redraw the thinking indicator in place
    pub fn thinking(&mut self, tick: usize, elapsed: Duration) -> io::Result<()> {
        if !self.interactive {
            return Ok(());
        }
        let line = format!(
            "{} {} {}",
            self.themed("Thinking"),
            self.themed(&spinner_frame(tick).to_string()),
            self.dim(&format!("({})", format_elapsed(elapsed)))
        );
        queue!(
            self.out,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(line)
        )?;
        self.out.flush()
    }

    /// Erase the thinking indicator line
    pub fn clear_thinking(&mut self) -> io::Result<()> {
        if !self.interactive {
            return Ok(());
        }
        queue!(self.out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
        self.out.flush()
    }

    /// Print a model reply: duration, reasoning (if any), then the answer
    pub fn reply(&mut self, completion: &Completion, elapsed: Duration) -> io::Result<()> {
        let took = self.dim(&format!("(took {})", format_elapsed(elapsed)));
        writeln!(self.out, "{}", took)?;

        if let Some(reasoning) = &completion.reasoning {
            let header = self.dim("── Reasoning ──");
            writeln!(self.out, "{}", header)?;
            for line in reasoning.lines() {
                let line = self.dim(line);
                writeln!(self.out, "{}", line)?;
            }
            writeln!(self.out)?;
        }

        if completion.answer.is_empty() {
            if completion.reasoning.is_none() {
                let empty = self.dim("(No response content)");
                writeln!(self.out, "{}", empty)?;
            }
        } else {
            let header = if self.color {
                "── Perplexity Response ──".with(self.theme).bold().to_string()
            } else {
                "── Perplexity Response ──".to_string()
            };
            writeln!(self.out, "{}", header)?;
            writeln!(self.out, "{}", completion.answer)?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }

    pub fn newline(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
