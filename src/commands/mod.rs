//! Command registry for REPL commands
//!
//! Provides a clean, extensible pattern for handling REPL commands.

pub mod general;
pub mod harmony;
pub mod history;
pub mod voicing;

use comping_core::parser::parse_chord_symbol;
use comping_core::types::note::parse_midi_note;
use comping_core::{Chord, HarmonySession, MidiNote};

/// Result of executing a command
#[derive(Debug)]
pub enum CommandResult {
    /// Command executed successfully, continue REPL
    Success,
    /// Command executed, show this message
    Message(String),
    /// Exit the REPL
    Exit,
    /// Not a command, try reading the line as chord symbols
    NotACommand,
    /// Error occurred
    Error(String),
}

/// Context passed to command handlers
pub struct CommandContext {
    pub session: HarmonySession,
}

impl CommandContext {
    pub fn new(session: HarmonySession) -> Self {
        Self { session }
    }

    /// Parse a chord argument, naming the offending text on failure
    pub fn chord(&self, text: &str) -> Result<Chord, String> {
        parse_chord_symbol(text).ok_or_else(|| format!("Unknown chord symbol '{}'", text))
    }

    /// Parse a note given as a number (`60`) or a name with octave (`C4`)
    pub fn note(&self, text: &str) -> Result<MidiNote, String> {
        parse_midi_note(text).ok_or_else(|| format!("Not a note: '{}'", text))
    }
}

/// A command handler function
pub type CommandHandler = fn(&str, &mut CommandContext) -> CommandResult;

/// Registry of available commands
pub struct CommandRegistry {
    /// Commands indexed by their prefix (e.g., "ngrams load")
    /// Sorted by prefix length descending for longest-match-first lookup
    commands: Vec<(String, CommandHandler)>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register a command with its prefix
    pub fn register(&mut self, prefix: &str, handler: CommandHandler) {
        self.commands.push((prefix.to_string(), handler));
        // Sort by prefix length descending for longest-match-first
        self.commands.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Execute a command, returning NotACommand if no match found
    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandResult {
        for (prefix, handler) in &self.commands {
            if input == prefix || input.starts_with(&format!("{} ", prefix)) {
                let args = if input.len() > prefix.len() {
                    input[prefix.len()..].trim()
                } else {
                    ""
                };
                return handler(args, ctx);
            }
        }
        CommandResult::NotACommand
    }

    /// Get all registered command prefixes
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a fully populated command registry with all built-in commands
pub fn create_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    // Harmony
    registry.register("play", harmony::cmd_play);
    registry.register("next", harmony::cmd_next);
    registry.register("predict", harmony::cmd_predict);
    registry.register("analyze", harmony::cmd_analyze);
    registry.register("detect", harmony::cmd_detect);
    registry.register("random", harmony::cmd_random);
    registry.register("common", harmony::cmd_common);

    // Voicing
    registry.register("octave", voicing::cmd_octave);
    registry.register("invert", voicing::cmd_invert);
    registry.register("reset", voicing::cmd_reset);
    registry.register("move", voicing::cmd_move);
    registry.register("voicing", voicing::cmd_voicing);

    // History
    registry.register("history", history::cmd_history);
    registry.register("subs", history::cmd_subs);
    registry.register("sub", history::cmd_sub);
    registry.register("jump", history::cmd_jump);
    registry.register("clear", history::cmd_clear);
    registry.register("load", history::cmd_load);
    registry.register("export", history::cmd_export);
    registry.register("import", history::cmd_import);
    registry.register("ngrams load", history::cmd_ngrams_load);

    // General commands
    registry.register("key", general::cmd_key);
    registry.register("voices", general::cmd_voices);
    registry.register("bass", general::cmd_bass);
    registry.register("help", general::cmd_help);
    registry.register("quit", general::cmd_quit);
    registry.register("exit", general::cmd_quit);

    registry
}
