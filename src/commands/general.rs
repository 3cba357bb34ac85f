//! General REPL commands (help, quit, key, voices, bass)

use crate::commands::{CommandContext, CommandResult};
use colored::*;
use comping_core::types::note::{note_name, parse_pitch_class};

/// Handle `help` command
pub fn cmd_help(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    print_help();
    CommandResult::Success
}

/// Handle `quit` or `exit` command
pub fn cmd_quit(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Exit
}

/// Handle `key [name]` command
pub fn cmd_key(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Message(format!("Key: {}", note_name(ctx.session.key())));
    }

    match parse_pitch_class(args) {
        Some(pc) => {
            ctx.session.set_key(pc);
            CommandResult::Message(
                format!("🎼 Key set to {}", note_name(pc))
                    .bright_green()
                    .to_string(),
            )
        }
        None => CommandResult::Error(format!("Invalid key '{}'. Use a note name like Eb", args)),
    }
}

/// Handle `voices [n]` command
pub fn cmd_voices(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Message(format!("Voices: {}", ctx.session.config().voice_count));
    }

    match args.parse::<usize>() {
        Ok(n) if (1..=8).contains(&n) => {
            ctx.session.set_voice_count(n);
            CommandResult::Message(format!("Voice count set to {}", n).bright_green().to_string())
        }
        _ => CommandResult::Error("Invalid voice count. Use a value between 1-8".to_string()),
    }
}

/// Handle `bass` command (toggle)
pub fn cmd_bass(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let enabled = !ctx.session.bass_enabled();
    ctx.session.set_bass_enabled(enabled);
    let state = if enabled { "on".green() } else { "off".yellow() };
    CommandResult::Message(format!("Bass note {}", state))
}

/// Print help information
fn print_help() {
    println!("{}", "🎹 Comping Help".bold());
    println!("{}", "==============".bold());
    println!();
    println!("{}", "Basic Usage:".green());
    println!("  {}                    - Play a chord symbol", "Dm7".cyan());
    println!("  {}         - Play several in a row", "Dm7 G7 Cmaj7".cyan());
    println!();
    println!("{}", "Harmony:".green());
    println!("  {}        - Play a chord", "play <symbol>".cyan());
    println!("  {}                 - Rule-based next chords", "next".cyan());
    println!("  {}              - N-gram predictions", "predict".cyan());
    println!("  {} - Hint for a transition", "analyze <from> <to>".cyan());
    println!("  {}   - Name the chord of some notes", "detect <notes…>".cyan());
    println!("  {}           - Random chords", "random [n]".cyan());
    println!("  {}               - Starting progressions", "common".cyan());
    println!();
    println!("{}", "Voicing:".green());
    println!("  {}    - Shift by an octave", "octave up|down".cyan());
    println!("  {}    - Rotate the voicing", "invert up|down".cyan());
    println!("  {}                - Re-spread the chord", "reset".cyan());
    println!("  {}    - Drag a note (60 or C4)", "move <from> <to>".cyan());
    println!("  {}              - Show the held voicing", "voicing".cyan());
    println!();
    println!("{}", "History:".green());
    println!("  {}              - Show history", "history".cyan());
    println!("  {}         - Substitutions for an entry", "subs <index>".cyan());
    println!("  {} - Replace an entry", "sub <index> <symbol>".cyan());
    println!("  {}         - Return to an entry", "jump <index>".cyan());
    println!("  {}                - Clear history", "clear".cyan());
    println!("  {}  - Load chords ('|' between bars)", "load <chart>".cyan());
    println!("  {}        - Save history as JSON", "export <file>".cyan());
    println!("  {}        - Load history JSON", "import <file>".cyan());
    println!("  {}   - Load an n-gram table", "ngrams load <file>".cyan());
    println!();
    println!("{}", "Settings:".green());
    println!("  {}           - Show or set the key", "key [name]".cyan());
    println!("  {}          - Show or set voice count", "voices [n]".cyan());
    println!("  {}                 - Toggle the bass note", "bass".cyan());
    println!();
    println!("{}", "Other Commands:".green());
    println!("  {}              - Show this help", "help".bright_green());
    println!("  {}              - Exit the REPL", "quit".bright_red());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::context;

    #[test]
    fn test_key_command() {
        let mut ctx = context();
        assert!(matches!(cmd_key("Eb", &mut ctx), CommandResult::Message(_)));
        assert_eq!(ctx.session.key(), 3);
        assert!(matches!(cmd_key("H", &mut ctx), CommandResult::Error(_)));
        assert_eq!(ctx.session.key(), 3);
    }

    #[test]
    fn test_voices_and_bass() {
        let mut ctx = context();
        cmd_voices("4", &mut ctx);
        assert_eq!(ctx.session.config().voice_count, 4);
        assert!(matches!(cmd_voices("0", &mut ctx), CommandResult::Error(_)));

        cmd_bass("", &mut ctx);
        assert!(ctx.session.bass_enabled());
        cmd_bass("", &mut ctx);
        assert!(!ctx.session.bass_enabled());
    }
}
