//! History commands: listing, substitution, charts and file exchange

use crate::commands::harmony::format_suggestion;
use crate::commands::{CommandContext, CommandResult};
use crate::setup;
use anyhow::Context;
use colored::*;
use comping_core::types::voicing::describe;
use comping_core::{Chord, HistoryDocument, Song};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Read a 1-based history index as shown by `history`
fn entry_index(text: &str, ctx: &CommandContext) -> Result<usize, String> {
    let len = ctx.session.history().len();
    match text.parse::<usize>() {
        Ok(n) if n >= 1 && n <= len => Ok(n - 1),
        _ if len == 0 => Err("History is empty".to_string()),
        _ => Err(format!("Invalid index '{}'. Use 1-{}", text, len)),
    }
}

/// Split a chart like `Dm7 G7 | Cmaj7 | Cmaj7` into bars
pub fn parse_chart(text: &str) -> Result<Song, String> {
    let mut bars = Vec::new();
    for bar in text.split('|') {
        let mut chords: Vec<Chord> = Vec::new();
        for symbol in bar.split_whitespace() {
            match comping_core::parser::parse_chord_symbol(symbol) {
                Some(chord) => chords.push(chord),
                None if matches!(symbol, "NC" | "N.C." | "%") => {}
                None => return Err(format!("Unknown chord symbol '{}'", symbol)),
            }
        }
        if !chords.is_empty() {
            bars.push(chords);
        }
    }
    if bars.is_empty() {
        return Err("Chart has no chords".to_string());
    }
    Ok(Song::new("chart").with_section("A", bars))
}

fn now_millis() -> Option<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_millis() as u64)
}

/// Handle `history` command
pub fn cmd_history(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let history = ctx.session.history();
    if history.is_empty() {
        return CommandResult::Message("History is empty".dimmed().to_string());
    }

    let current = ctx.session.current_chord();
    let mut output = format!("{}\n", format!("📜 History ({}):", history.len()).bold());
    for (i, entry) in history.iter().enumerate() {
        let marker = if Some(entry.chord) == current { "▶" } else { " " };
        output.push_str(&format!(
            " {} {:>3}. {:<8} {}\n",
            marker,
            i + 1,
            entry.chord.symbol().cyan(),
            describe(&entry.voicing).dimmed()
        ));
    }
    let recent: Vec<String> = ctx.session.recent_chords().iter().map(|c| c.symbol()).collect();
    output.push_str(&format!("{} {}", "Recent:".dimmed(), recent.join(" → ")));
    CommandResult::Message(output)
}

/// Handle `subs <index>` command
pub fn cmd_subs(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let index = match entry_index(args, ctx) {
        Ok(index) => index,
        Err(e) => return CommandResult::Error(e),
    };
    let subs = ctx.session.substitutions(index);
    let chord = ctx.session.history()[index].chord;

    let mut output = format!("{}\n", format!("Substitutions for {}:", chord.symbol()).bold());
    for (i, s) in subs.iter().enumerate() {
        output.push_str(&format_suggestion(i, s));
        output.push('\n');
    }
    CommandResult::Message(output.trim_end().to_string())
}

/// Handle `sub <index> <symbol>` command
pub fn cmd_sub(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let Some((index, symbol)) = args.split_once(' ') else {
        return CommandResult::Error("Usage: sub <index> <symbol>".to_string());
    };
    let index = match entry_index(index.trim(), ctx) {
        Ok(index) => index,
        Err(e) => return CommandResult::Error(e),
    };
    let chord = match ctx.chord(symbol.trim()) {
        Ok(chord) => chord,
        Err(e) => return CommandResult::Error(e),
    };

    match ctx.session.substitute(index, chord) {
        Ok(Some(voicing)) => CommandResult::Message(format!(
            "{} {}  {}",
            format!("{}.", index + 1).dimmed(),
            chord.symbol().bright_green().bold(),
            describe(&voicing)
        )),
        Ok(None) => CommandResult::Error("No such history entry".to_string()),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `jump <index>` command
pub fn cmd_jump(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let index = match entry_index(args, ctx) {
        Ok(index) => index,
        Err(e) => return CommandResult::Error(e),
    };
    match ctx.session.jump_to(index) {
        Ok(Some(voicing)) => CommandResult::Message(format!(
            "{}  {}",
            ctx.session.history()[index].chord.symbol().bold(),
            describe(&voicing)
        )),
        Ok(None) => CommandResult::Error("No such history entry".to_string()),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `clear` command
pub fn cmd_clear(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    ctx.session.clear();
    CommandResult::Message("History cleared".to_string())
}

/// Handle `load <chart>` command
pub fn cmd_load(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: load <chart>, e.g. load Dm7 G7 | Cmaj7".to_string());
    }
    let song = match parse_chart(args) {
        Ok(song) => song,
        Err(e) => return CommandResult::Error(e),
    };
    match ctx.session.load_song(&song) {
        Ok(count) => CommandResult::Message(format!(
            "Loaded {} chords in {} bars",
            count,
            song.bar_count()
        )),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

pub fn export_to(path: &str, ctx: &CommandContext) -> anyhow::Result<usize> {
    let document = ctx.session.export_history(now_millis());
    let json = document.to_json()?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path))?;
    Ok(document.history.len())
}

pub fn import_from(path: &str, ctx: &mut CommandContext) -> anyhow::Result<usize> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    let document = HistoryDocument::from_json(&text)
        .with_context(|| format!("{} is not a history document", path))?;
    Ok(ctx.session.import_history(document))
}

/// Handle `export <file>` command
pub fn cmd_export(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: export <file>".to_string());
    }
    match export_to(args, ctx) {
        Ok(count) => CommandResult::Message(format!("💾 Saved {} entries to {}", count, args.green())),
        Err(e) => CommandResult::Error(format!("{:#}", e)),
    }
}

/// Handle `import <file>` command
pub fn cmd_import(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: import <file>".to_string());
    }
    match import_from(args, ctx) {
        Ok(count) => CommandResult::Message(format!("📂 Imported {} entries from {}", count, args.green())),
        Err(e) => CommandResult::Error(format!("{:#}", e)),
    }
}

/// Handle `ngrams load <file>` command
pub fn cmd_ngrams_load(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: ngrams load <file>".to_string());
    }
    match setup::load_ngrams(args) {
        Ok(table) => {
            let contexts = table.len();
            ctx.session.set_ngrams(Arc::new(table));
            CommandResult::Message(format!("Loaded {} n-gram contexts", contexts))
        }
        Err(e) => CommandResult::Error(format!("{:#}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::context;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_chart_bars() {
        let song = parse_chart("Dm7 G7 | Cmaj7 | NC | A7").unwrap();
        assert_eq!(song.bar_count(), 3);
        let keys: Vec<String> = song.chords().map(|c| c.encode()).collect();
        assert_eq!(keys, vec!["2:m7", "7:7", "0:maj7", "9:7"]);
        assert!(parse_chart("| |").is_err());
        assert!(parse_chart("Dm7 Q7").is_err());
    }

    #[test]
    fn test_indices_are_one_based() {
        let mut ctx = context();
        assert!(matches!(cmd_jump("1", &mut ctx), CommandResult::Error(_)));
        cmd_load("Dm7 G7 | Cmaj7", &mut ctx);
        assert!(matches!(cmd_jump("3", &mut ctx), CommandResult::Message(_)));
        assert_eq!(ctx.session.current_chord(), Some(Chord::new(0, "maj7")));
        assert!(matches!(cmd_jump("0", &mut ctx), CommandResult::Error(_)));
        assert!(matches!(cmd_jump("4", &mut ctx), CommandResult::Error(_)));
    }

    #[test]
    fn test_sub_replaces_entry() {
        let mut ctx = context();
        cmd_load("Dm7 G7 | Cmaj7", &mut ctx);
        assert!(matches!(cmd_subs("2", &mut ctx), CommandResult::Message(_)));
        assert!(matches!(cmd_sub("2 Db7", &mut ctx), CommandResult::Message(_)));
        assert_eq!(ctx.session.history()[1].chord, Chord::new(1, "7"));
        assert!(!ctx.session.history()[1].voicing.is_empty());
    }

    #[test]
    fn test_export_then_import_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let path = path.to_str().unwrap();

        let mut ctx = context();
        ctx.session.play(Chord::new(2, "m7")).unwrap();
        ctx.session.play(Chord::new(7, "7")).unwrap();
        assert_eq!(export_to(path, &ctx).unwrap(), 2);

        let text = std::fs::read_to_string(path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["history"][0]["chord"], "2:m7");
        assert!(json["timestamp"].is_u64());

        let mut other = context();
        assert_eq!(import_from(path, &mut other).unwrap(), 2);
        assert_eq!(other.session.current_chord(), Some(Chord::new(7, "7")));
        assert!(import_from("/nonexistent/history.json", &mut other).is_err());
    }
}
