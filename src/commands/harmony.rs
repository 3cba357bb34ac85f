//! Chord commands: play, suggestions, analysis and detection

use crate::commands::{CommandContext, CommandResult};
use colored::*;
use comping_core::harmony::{
    analyze, common_progressions, random_chords, Played, Suggestion, SuggestionSource,
    TransitionHint,
};
use comping_core::types::voicing::describe;

pub(crate) fn hint_label(hint: Option<TransitionHint>) -> String {
    match hint {
        Some(hint) => format!("[{}]", hint.colored()),
        None => String::new(),
    }
}

pub(crate) fn format_suggestion(index: usize, s: &Suggestion) -> String {
    let source = match s.source {
        SuggestionSource::Ngram { order, count } => format!("{} ×{}", order, count),
        SuggestionSource::Rule { category, label } => format!("{}: {}", category, label),
        SuggestionSource::Variation => "variation".to_string(),
    };
    format!(
        "  {:>2}. {:<8} {} {}",
        index + 1,
        s.chord.symbol().cyan(),
        source.dimmed(),
        hint_label(s.hint)
    )
}

pub(crate) fn format_played(played: &Played) -> String {
    let mut line = format!("{}  {}", played.chord.symbol().bold(), describe(&played.voicing));
    if let Some(hint) = played.hint {
        line.push_str(&format!("  [{}]", hint.colored()));
    }
    line
}

/// Handle `play <symbol…>` command; several symbols are played in order
pub fn cmd_play(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: play <symbol>".to_string());
    }

    let mut lines = Vec::new();
    for symbol in args.split_whitespace() {
        let chord = match ctx.chord(symbol) {
            Ok(chord) => chord,
            Err(e) => return CommandResult::Error(e),
        };
        match ctx.session.play(chord) {
            Ok(played) => lines.push(format_played(&played)),
            Err(e) => return CommandResult::Error(e.to_string()),
        }
    }
    CommandResult::Message(lines.join("\n"))
}

/// Handle `next` command
pub fn cmd_next(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let suggestions = ctx.session.suggest();
    if let Some(common) = suggestions.common {
        return CommandResult::Message(format_common(&common));
    }
    if suggestions.next.is_empty() {
        return CommandResult::Message("No rule-based suggestions".yellow().to_string());
    }

    let mut output = format!("{}\n", "Next chords:".bold());
    for (i, s) in suggestions.next.iter().enumerate() {
        output.push_str(&format_suggestion(i, s));
        output.push('\n');
    }
    CommandResult::Message(output.trim_end().to_string())
}

/// Handle `predict` command
pub fn cmd_predict(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    if ctx.session.current_chord().is_none() {
        return CommandResult::Error("Play a chord first".to_string());
    }
    let predictions = ctx.session.suggest().predictions;
    if predictions.is_empty() {
        return CommandResult::Message("No predictions for this context".yellow().to_string());
    }

    let mut output = format!("{}\n", "Predictions:".bold());
    for (i, s) in predictions.iter().enumerate() {
        output.push_str(&format_suggestion(i, s));
        output.push('\n');
    }
    CommandResult::Message(output.trim_end().to_string())
}

/// Handle `analyze <from> <to>` command
pub fn cmd_analyze(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let parts: Vec<&str> = args.split_whitespace().collect();
    let [from, to] = parts.as_slice() else {
        return CommandResult::Error("Usage: analyze <from> <to>".to_string());
    };
    let (from, to) = match (ctx.chord(from), ctx.chord(to)) {
        (Ok(from), Ok(to)) => (from, to),
        (Err(e), _) | (_, Err(e)) => return CommandResult::Error(e),
    };

    let verdict = match analyze(&from, &to, ctx.session.key()) {
        Some(hint) => hint.colored().to_string(),
        None => "no particular relationship".dimmed().to_string(),
    };
    CommandResult::Message(format!(
        "{} → {}: {} ({} common tones)",
        from.symbol().cyan(),
        to.symbol().cyan(),
        verdict,
        from.common_tones(&to)
    ))
}

/// Handle `detect <notes…>` command
pub fn cmd_detect(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: detect <notes…> (e.g. 60 64 67 or C4 E4 G4)".to_string());
    }
    let mut notes = Vec::new();
    for text in args.split_whitespace() {
        match ctx.note(text) {
            Ok(note) => notes.push(note),
            Err(e) => return CommandResult::Error(e),
        }
    }

    match ctx.session.classify(&notes) {
        Some(found) => CommandResult::Message(format!(
            "{} {}",
            found.chord.symbol().bright_green().bold(),
            format!("({})", found.source).dimmed()
        )),
        None => CommandResult::Message("No chord recognised".yellow().to_string()),
    }
}

/// Handle `random [n]` command
pub fn cmd_random(args: &str, _ctx: &mut CommandContext) -> CommandResult {
    let count = if args.is_empty() {
        4
    } else {
        match args.parse::<usize>() {
            Ok(n) if (1..=32).contains(&n) => n,
            _ => return CommandResult::Error("Invalid count. Use a value between 1-32".to_string()),
        }
    };
    let symbols: Vec<String> = random_chords(count)
        .iter()
        .map(|c| c.symbol().cyan().to_string())
        .collect();
    CommandResult::Message(symbols.join("  "))
}

/// Handle `common` command
pub fn cmd_common(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Message(format_common(&common_progressions(ctx.session.key())))
}

fn format_common(common: &comping_core::harmony::CommonProgressions) -> String {
    let mut output = String::new();
    for (name, chords) in common.groups() {
        let symbols: Vec<String> = chords.iter().map(|c| c.symbol()).collect();
        output.push_str(&format!("{:<14} {}\n", format!("{}:", name).green(), symbols.join("  ")));
    }
    output.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::context;
    use comping_core::Chord;

    #[test]
    fn test_play_sequence() {
        let mut ctx = context();
        let result = cmd_play("Dm7 G7 Cmaj7", &mut ctx);
        assert!(matches!(result, CommandResult::Message(_)));
        assert_eq!(ctx.session.history().len(), 3);
        assert_eq!(ctx.session.current_chord(), Some(Chord::new(0, "maj7")));
    }

    #[test]
    fn test_play_rejects_unknown_symbols() {
        let mut ctx = context();
        assert!(matches!(cmd_play("Dm7 H7", &mut ctx), CommandResult::Error(_)));
        // chords before the bad symbol are kept
        assert_eq!(ctx.session.history().len(), 1);
    }

    #[test]
    fn test_analyze_needs_two_chords() {
        let mut ctx = context();
        assert!(matches!(cmd_analyze("G7", &mut ctx), CommandResult::Error(_)));
        let CommandResult::Message(msg) = cmd_analyze("G7 Cmaj7", &mut ctx) else {
            panic!("expected message");
        };
        assert!(msg.contains("classic"));
    }

    #[test]
    fn test_detect_reads_numbers_and_names() {
        let mut ctx = context();
        let CommandResult::Message(msg) = cmd_detect("C4 E4 G4 B4", &mut ctx) else {
            panic!("expected message");
        };
        assert!(msg.contains("CΔ7"));
        assert!(matches!(cmd_detect("60 foo", &mut ctx), CommandResult::Error(_)));
    }

    #[test]
    fn test_predict_requires_a_chord() {
        let mut ctx = context();
        assert!(matches!(cmd_predict("", &mut ctx), CommandResult::Error(_)));
    }
}
