//! Voicing edits: octave shift, inversion, reset and note drag

use crate::commands::{CommandContext, CommandResult};
use colored::*;
use comping_core::types::voicing::describe;

fn direction(args: &str) -> Option<i8> {
    match args {
        "up" | "+" => Some(1),
        "down" | "-" => Some(-1),
        _ => None,
    }
}

fn edited(ctx: &CommandContext, result: Option<Vec<u8>>, what: &str) -> CommandResult {
    if ctx.session.current_voicing().is_none() {
        return CommandResult::Error("Nothing is sounding. Play a chord first".to_string());
    }
    match result {
        Some(voicing) => CommandResult::Message(describe(&voicing)),
        None => CommandResult::Error(format!("{} would leave the playable range", what)),
    }
}

/// Handle `octave up|down` command
pub fn cmd_octave(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let Some(dir) = direction(args) else {
        return CommandResult::Error("Usage: octave up|down".to_string());
    };
    let result = ctx.session.shift_octave(dir);
    edited(ctx, result, "Octave shift")
}

/// Handle `invert up|down` command
pub fn cmd_invert(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let Some(dir) = direction(args) else {
        return CommandResult::Error("Usage: invert up|down".to_string());
    };
    let result = ctx.session.shift_inversion(dir);
    edited(ctx, result, "Inversion")
}

/// Handle `reset` command
pub fn cmd_reset(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    match ctx.session.reset_voicing() {
        Ok(Some(voicing)) => CommandResult::Message(describe(&voicing)),
        Ok(None) => CommandResult::Error("Play a chord first".to_string()),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `move <from> <to>` command
pub fn cmd_move(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let parts: Vec<&str> = args.split_whitespace().collect();
    let [from, to] = parts.as_slice() else {
        return CommandResult::Error("Usage: move <from> <to>".to_string());
    };
    let (from, to) = match (ctx.note(from), ctx.note(to)) {
        (Ok(from), Ok(to)) => (from, to),
        (Err(e), _) | (_, Err(e)) => return CommandResult::Error(e),
    };

    match ctx.session.move_note(from, to) {
        Some((voicing, Some(found))) => CommandResult::Message(format!(
            "{}  {}",
            found.chord.symbol().bright_green().bold(),
            describe(&voicing)
        )),
        Some((voicing, None)) => CommandResult::Message(format!(
            "{}  {}",
            "?".yellow(),
            describe(&voicing)
        )),
        None => CommandResult::Error(
            "Move refused: the note must be held and the target free and in range".to_string(),
        ),
    }
}

/// Handle `voicing` command
pub fn cmd_voicing(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    match (ctx.session.current_chord(), ctx.session.current_voicing()) {
        (Some(chord), Some(voicing)) => CommandResult::Message(format!(
            "{}  {}  {:?}",
            chord.symbol().bold(),
            describe(voicing),
            voicing
        )),
        _ => CommandResult::Message("Nothing is sounding".dimmed().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::context;
    use comping_core::Chord;

    #[test]
    fn test_octave_and_invert() {
        let mut ctx = context();
        assert!(matches!(cmd_octave("up", &mut ctx), CommandResult::Error(_)));
        ctx.session.play(Chord::new(0, "maj7")).unwrap();

        assert!(matches!(cmd_octave("sideways", &mut ctx), CommandResult::Error(_)));
        assert!(matches!(cmd_octave("up", &mut ctx), CommandResult::Message(_)));
        assert_eq!(ctx.session.current_voicing(), Some(&[60u8, 76, 79, 83, 88][..]));
        assert!(matches!(cmd_invert("down", &mut ctx), CommandResult::Message(_)));
        // the top E drops an octave
        assert_eq!(ctx.session.current_voicing(), Some(&[60u8, 76, 76, 79, 83][..]));
    }

    #[test]
    fn test_move_by_name() {
        let mut ctx = context();
        ctx.session.set_voice_count(3);
        ctx.session.play(Chord::new(0, "")).unwrap();
        let CommandResult::Message(msg) = cmd_move("E4 Eb4", &mut ctx) else {
            panic!("expected message");
        };
        assert!(msg.contains("Cm"));
        assert!(matches!(cmd_move("C3 G4", &mut ctx), CommandResult::Error(_)));
    }
}
