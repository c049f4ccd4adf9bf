//! CLI Commands Module
//!
//! Command definitions and line parsing for the shell. A line is either a
//! local command (by name, alias, or a natural-language phrase) or a query
//! for the model.

use std::fmt;
use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

/// Available local commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliCommand {
    Help,
    Exit,
    Ls,
    Tree,
    Cd,
    Pwd,
    Touch,
    Mkdir,
    Rm,
}

impl CliCommand {
    /// Parse a command word into a CliCommand
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().trim() {
            "help" | "?" => Some(Self::Help),
            "exit" | "quit" => Some(Self::Exit),
            "ls" => Some(Self::Ls),
            "tree" => Some(Self::Tree),
            "cd" => Some(Self::Cd),
            "pwd" => Some(Self::Pwd),
            "touch" | "create" => Some(Self::Touch),
            "mkdir" => Some(Self::Mkdir),
            "rm" | "delete" | "remove" => Some(Self::Rm),
            _ => None,
        }
    }

    /// Aliases that are also ordinary English words
    pub fn is_word_alias(word: &str) -> bool {
        matches!(
            word.to_lowercase().as_str(),
            "create" | "delete" | "remove" | "quit"
        )
    }

    /// Get command description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Help => "Show this help message",
            Self::Exit => "Exit the application",
            Self::Ls => "List files in current directory",
            Self::Tree => "Show directory structure in tree format",
            Self::Cd => "Change directory (supports '..', '~', absolute paths)",
            Self::Pwd => "Print working directory",
            Self::Touch => "Create an empty file",
            Self::Mkdir => "Create a directory",
            Self::Rm => "Remove a file or empty directory",
        }
    }

    /// Get command usage/syntax
    pub fn usage(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Exit => "exit/quit",
            Self::Ls => "ls",
            Self::Tree => "tree",
            Self::Cd => "cd <dir>",
            Self::Pwd => "pwd",
            Self::Touch => "touch <filename>",
            Self::Mkdir => "mkdir <dirname>",
            Self::Rm => "rm <name>",
        }
    }

    /// Whether the command operates on one or more arguments
    pub fn takes_arguments(&self) -> bool {
        matches!(self, Self::Cd | Self::Touch | Self::Mkdir | Self::Rm)
    }

    /// Get all available commands
    pub fn all_commands() -> Vec<Self> {
        vec![
            Self::Help,
            Self::Exit,
            Self::Ls,
            Self::Tree,
            Self::Cd,
            Self::Pwd,
            Self::Touch,
            Self::Mkdir,
            Self::Rm,
        ]
    }

    /// Full help text shown by `help`
    pub fn get_help_text() -> Vec<String> {
        let mut help = vec!["Available commands:".to_string()];
        let width = Self::all_commands()
            .iter()
            .map(|cmd| cmd.usage().len())
            .max()
            .unwrap_or(0);
        for cmd in Self::all_commands() {
            help.push(format!(
                "• {:width$} - {}",
                cmd.usage(),
                cmd.description(),
                width = width
            ));
        }
        help.extend(vec![
            String::new(),
            "Natural language:".to_string(),
            "  - 'list files'".to_string(),
            "  - 'show directory tree'".to_string(),
            "  - 'go to ~/Documents'".to_string(),
            "  - 'create file test.py'".to_string(),
            "  - 'make directory src'".to_string(),
            String::new(),
            "Anything else is sent to the model as a question,".to_string(),
            "e.g. 'explain cli.py' or 'how do I add a dependency?'".to_string(),
        ]);
        help
    }
}

impl fmt::Display for CliCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Help => "help",
            Self::Exit => "exit",
            Self::Ls => "ls",
            Self::Tree => "tree",
            Self::Cd => "cd",
            Self::Pwd => "pwd",
            Self::Touch => "touch",
            Self::Mkdir => "mkdir",
            Self::Rm => "rm",
        };
        write!(f, "{}", name)
    }
}

/// What a line of input turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Empty,
    Command(CliCommand, Vec<String>),
    Query(String),
}

/// Command execution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Success(String),
    Info(String),
    Warning(String),
    Error(String),
    Exit,
    NoOp,
}

impl CommandResult {
    /// Check if the result indicates success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Info(_) | Self::NoOp)
    }

    /// Check if the result indicates an error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_) | Self::Warning(_))
    }

    /// Get the message content if any
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(msg) | Self::Info(msg) | Self::Warning(msg) | Self::Error(msg) => Some(msg),
            Self::Exit | Self::NoOp => None,
        }
    }
}

/// Natural-language phrases and the command they stand for. A capture group,
/// when present, is the command's argument.
const NATURAL_COMMANDS: &[(&str, CliCommand)] = &[
    (r"list(?: files?)?(?: in(?: current)? directory)?", CliCommand::Ls),
    (r"show(?: directory)? tree", CliCommand::Tree),
    (r"change(?: directory)? to\s+(.+)", CliCommand::Cd),
    (r"go to\s+(.+)", CliCommand::Cd),
    (r"what is the current directory\??", CliCommand::Pwd),
    (r"show(?: the)? current directory", CliCommand::Pwd),
    (r"create(?: a)?(?: new)? file(?: named)?\s+([\w./-]+)", CliCommand::Touch),
    (r"create(?: a)?(?: new)? directory(?: named)?\s+([\w./-]+)", CliCommand::Mkdir),
    (r"make directory\s+([\w./-]+)", CliCommand::Mkdir),
];

fn natural_patterns() -> &'static [(Regex, CliCommand)] {
    static PATTERNS: OnceLock<Vec<(Regex, CliCommand)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        NATURAL_COMMANDS
            .iter()
            .map(|(pattern, command)| {
                let regex = RegexBuilder::new(&format!("^(?:{})$", pattern))
                    .case_insensitive(true)
                    .build()
                    .expect("valid natural command pattern");
                (regex, *command)
            })
            .collect()
    })
}

/// Command parser and utilities
pub struct CommandParser;

impl CommandParser {
    /// Classify a raw input line
    pub fn parse_line(input: &str) -> ParsedLine {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return ParsedLine::Empty;
        }

        // Phrases first, so "create file x" is not read as `create` with two names
        if let Some((command, args)) = Self::parse_natural_language(trimmed) {
            return ParsedLine::Command(command, args);
        }

        if let Some((command, args)) = Self::parse_command_line(trimmed) {
            return ParsedLine::Command(command, args);
        }

        ParsedLine::Query(trimmed.to_string())
    }

    /// Parse a line whose first word is a command name.
    ///
    /// Word aliases (`create`, `delete`, `remove`, `quit`) only count as a
    /// command when followed by at most the single name they accept, so a
    /// sentence such as "remove the duplicate lines from main.rs" stays a
    /// question.
    pub fn parse_command_line(input: &str) -> Option<(CliCommand, Vec<String>)> {
        let mut parts = input.split_whitespace();
        let word = parts.next()?;
        let command = CliCommand::from_str(word)?;
        let args: Vec<String> = parts.map(|s| s.to_string()).collect();

        let max_alias_args = usize::from(command.takes_arguments());
        if CliCommand::is_word_alias(word) && args.len() > max_alias_args {
            return None;
        }
        Some((command, args))
    }

    /// Match a line against the natural-language phrase table
    pub fn parse_natural_language(input: &str) -> Option<(CliCommand, Vec<String>)> {
        natural_patterns().iter().find_map(|(regex, command)| {
            let caps = regex.captures(input)?;
            let args = caps
                .get(1)
                .map(|m| vec![m.as_str().trim().to_string()])
                .unwrap_or_default();
            Some((*command, args))
        })
    }

    /// Validate command arguments
    pub fn validate_args(command: &CliCommand, args: &[String]) -> Result<(), String> {
        if command.takes_arguments() {
            if args.is_empty() {
                return Err(format!("Usage: {}", command.usage()));
            }
        } else if !args.is_empty() {
            return Err(format!("'{}' takes no arguments", command));
        }
        Ok(())
    }
}
