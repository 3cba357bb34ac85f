//! REPL (Read-Eval-Print Loop) for the comping assistant

use crate::commands::harmony::format_played;
use crate::commands::{create_registry, CommandContext, CommandRegistry, CommandResult};
use anyhow::Result;
use colored::*;
use comping_core::parser::parse_chord_symbol;
use comping_core::{Chord, HarmonySession};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RustylineResult};

/// Interactive REPL driving one harmony session
pub struct Repl {
    editor: DefaultEditor,
    registry: CommandRegistry,
    ctx: CommandContext,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new(session: HarmonySession) -> RustylineResult<Self> {
        Ok(Repl {
            editor: DefaultEditor::new()?,
            registry: create_registry(),
            ctx: CommandContext::new(session),
        })
    }

    /// Run one line: a registered command, or else a run of chord symbols
    pub fn handle_line(&mut self, line: &str) -> CommandResult {
        match self.registry.execute(line, &mut self.ctx) {
            CommandResult::NotACommand => play_symbols(line, &mut self.ctx),
            other => other,
        }
    }

    fn prompt(&self) -> String {
        match self.ctx.session.current_chord() {
            Some(chord) => format!("comping [{}]> ", chord.symbol()),
            None => "comping> ".to_string(),
        }
    }

    /// Start the REPL loop
    pub fn run(&mut self) -> Result<()> {
        println!("{}", "🎹 Comping - jazz harmony assistant".bright_cyan().bold());
        println!(
            "Type chord symbols to play them, {} for commands, {} to leave.",
            "help".green(),
            "quit".red()
        );
        println!();

        loop {
            let prompt = self.prompt();
            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(line);

                    match self.handle_line(line) {
                        CommandResult::Success => {}
                        CommandResult::Message(msg) => println!("{}", msg),
                        CommandResult::Exit => {
                            println!("{} 🎵", "Goodbye!".bright_cyan());
                            break;
                        }
                        CommandResult::Error(e) => {
                            println!("{} {}", "Error:".bright_red().bold(), e.red());
                        }
                        CommandResult::NotACommand => {}
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    println!("{} 🎵", "Goodbye!".bright_cyan());
                    break;
                }
                Err(err) => {
                    println!(
                        "{} {}",
                        "Error reading input:".bright_red().bold(),
                        err.to_string().red()
                    );
                }
            }
        }

        Ok(())
    }
}

/// Play every symbol on the line, or report the first one that is not a chord
fn play_symbols(line: &str, ctx: &mut CommandContext) -> CommandResult {
    let chords: Option<Vec<Chord>> = line.split_whitespace().map(parse_chord_symbol).collect();
    let Some(chords) = chords else {
        return CommandResult::Error(format!(
            "Unknown command or chord '{}'. Type 'help' for commands",
            line
        ));
    };

    let mut lines = Vec::with_capacity(chords.len());
    for chord in chords {
        match ctx.session.play(chord) {
            Ok(played) => lines.push(format_played(&played)),
            Err(e) => return CommandResult::Error(e.to_string()),
        }
    }
    CommandResult::Message(lines.join("\n"))
}

/// Convenience function to start the REPL
pub fn start(session: HarmonySession) -> Result<()> {
    let mut repl =
        Repl::new(session).map_err(|e| anyhow::anyhow!("Failed to initialize REPL: {}", e))?;
    repl.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::context;

    #[test]
    fn test_bare_symbols_are_played() {
        let mut ctx = context();
        assert!(matches!(
            play_symbols("Dm7 G7", &mut ctx),
            CommandResult::Message(_)
        ));
        assert_eq!(ctx.session.history().len(), 2);
    }

    #[test]
    fn test_unknown_words_are_errors() {
        let mut ctx = context();
        assert!(matches!(
            play_symbols("Dm7 hello", &mut ctx),
            CommandResult::Error(_)
        ));
        // nothing is played when any word fails
        assert!(ctx.session.history().is_empty());
    }
}
