//! WASM bindings for comping-core
//!
//! Chords cross the boundary as [`ChordJS`] objects and are accepted either as
//! lead-sheet symbols (`"Dm7"`) or encoded keys (`"2:m7"`).

use crate::harmony::analysis::analyze;
use crate::harmony::classify::{detect_scored, SymbolClassifier};
use crate::harmony::ngram::NgramTable;
use crate::harmony::progression::next_chords;
use crate::harmony::session::{HarmonySession, Suggestion, SuggestionSource};
use crate::parser::parse_chord_name;
use crate::types::{Chord, HistoryDocument, SessionConfig, Song};
use num_rational::Ratio;
use std::sync::Arc;
use wasm_bindgen::prelude::*;

/// Chord as seen from JavaScript
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChordJS {
    /// Encoded `"root:quality"` key
    pub key: String,
    pub symbol: String,
    pub root: u8,
    pub quality: &'static str,
    pub pitch_classes: Vec<u8>,
}

impl From<Chord> for ChordJS {
    fn from(chord: Chord) -> Self {
        ChordJS {
            key: chord.encode(),
            symbol: chord.symbol(),
            root: chord.root(),
            quality: chord.quality_key(),
            pitch_classes: chord.pitch_classes(),
        }
    }
}

/// Exact detection score, serialized as `{ "n": numerator, "d": denominator }`
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ScoreJS {
    pub n: u32,
    pub d: u32,
}

impl From<Ratio<u32>> for ScoreJS {
    fn from(r: Ratio<u32>) -> Self {
        ScoreJS {
            n: *r.numer(),
            d: *r.denom(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DetectionJS {
    pub chord: ChordJS,
    pub score: ScoreJS,
    pub confidence: f64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SuggestionJS {
    pub chord: ChordJS,
    pub source: SuggestionSource,
    pub hint: Option<&'static str>,
}

impl From<&Suggestion> for SuggestionJS {
    fn from(s: &Suggestion) -> Self {
        SuggestionJS {
            chord: s.chord.into(),
            source: s.source,
            hint: s.hint.map(|h| h.name()),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PlayedJS {
    pub chord: ChordJS,
    pub voicing: Vec<u8>,
    pub hint: Option<&'static str>,
    pub recorded: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct HistoryEntryJS {
    pub chord: ChordJS,
    pub voicing: Vec<u8>,
}

fn to_js<T: serde::Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

fn chord_arg(text: &str) -> Result<Chord, JsValue> {
    let text = text.trim();
    if text.contains(':') {
        return Ok(Chord::decode(text));
    }
    parse_chord_name(text).ok_or_else(|| JsValue::from_str(&format!("Unknown chord '{}'", text)))
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Name the chord formed by a set of pitch classes or MIDI notes
#[wasm_bindgen]
pub fn detect_chord(notes: &[u8]) -> JsValue {
    match detect_scored(notes) {
        Some(found) => to_js(&DetectionJS {
            chord: found.chord.into(),
            score: found.score.into(),
            confidence: found.confidence(),
        }),
        None => JsValue::NULL,
    }
}

#[wasm_bindgen]
pub fn parse_chord(text: &str) -> JsValue {
    match chord_arg(text) {
        Ok(chord) => to_js(&ChordJS::from(chord)),
        Err(_) => JsValue::NULL,
    }
}

/// Hint name for `from -> to` in `key`, or null
#[wasm_bindgen]
pub fn analyze_transition(from: &str, to: &str, key: u8) -> Result<JsValue, JsValue> {
    let hint = analyze(&chord_arg(from)?, &chord_arg(to)?, key);
    Ok(hint.map_or(JsValue::NULL, |h| JsValue::from_str(h.name())))
}

/// Rule-based continuations without any session state
#[wasm_bindgen]
pub fn suggest_next(chord: &str, key: u8) -> Result<JsValue, JsValue> {
    let chord = chord_arg(chord)?;
    let suggestions: Vec<SuggestionJS> = next_chords(&chord, key)
        .iter()
        .map(|n| SuggestionJS {
            chord: n.chord.into(),
            source: SuggestionSource::Rule {
                category: n.category,
                label: n.label,
            },
            hint: analyze(&chord, &n.chord, key).map(|h| h.name()),
        })
        .collect();
    Ok(to_js(&suggestions))
}

/// One harmony session owned by the page
#[wasm_bindgen]
pub struct WasmSession {
    session: HarmonySession,
}

#[wasm_bindgen]
impl WasmSession {
    /// Create a session; `config` is an optional, possibly partial, JSON config
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<WasmSession, JsValue> {
        let config = match config {
            Some(text) => SessionConfig::from_json(&text).map_err(|e| js_error(format!("{:#}", e)))?,
            None => SessionConfig::default(),
        };
        let session = HarmonySession::new(config).map_err(js_error)?;
        Ok(WasmSession { session })
    }

    /// Swap in an n-gram table exported as JSON
    pub fn load_ngrams(&mut self, json: &str) -> Result<usize, JsValue> {
        let table = NgramTable::from_json(json).map_err(|e| js_error(format!("{:#}", e)))?;
        let contexts = table.len();
        self.session.set_ngrams(Arc::new(table));
        Ok(contexts)
    }

    /// Register a JavaScript namer consulted before the built-in detector.
    /// It receives the notes as a `Uint8Array` and returns a chord name or null.
    pub fn set_classifier(&mut self, name: &str, callback: js_sys::Function) {
        self.session
            .prefer_classifier(SymbolClassifier::new(name, move |notes: &[u8]| {
                let notes = js_sys::Uint8Array::from(notes);
                callback.call1(&JsValue::NULL, &notes).ok()?.as_string()
            }));
    }

    pub fn play(&mut self, chord: &str) -> Result<JsValue, JsValue> {
        let played = self.session.play(chord_arg(chord)?).map_err(js_error)?;
        Ok(to_js(&PlayedJS {
            chord: played.chord.into(),
            voicing: played.voicing,
            hint: played.hint.map(|h| h.name()),
            recorded: played.recorded,
        }))
    }

    pub fn suggest(&self) -> JsValue {
        let suggestions = self.session.suggest();
        let list = |items: &[Suggestion]| items.iter().map(SuggestionJS::from).collect::<Vec<_>>();
        let common = suggestions.common.map(|common| {
            common
                .groups()
                .iter()
                .map(|(name, chords)| {
                    let chords: Vec<ChordJS> = chords.iter().map(|&c| c.into()).collect();
                    (name.to_string(), chords)
                })
                .collect::<std::collections::BTreeMap<_, _>>()
        });
        to_js(&serde_json::json!({
            "predictions": list(&suggestions.predictions),
            "next": list(&suggestions.next),
            "common": common,
        }))
    }

    pub fn substitutions(&self, index: usize) -> JsValue {
        let subs: Vec<SuggestionJS> = self
            .session
            .substitutions(index)
            .iter()
            .map(SuggestionJS::from)
            .collect();
        to_js(&subs)
    }

    pub fn substitute(&mut self, index: usize, chord: &str) -> Result<JsValue, JsValue> {
        let voicing = self
            .session
            .substitute(index, chord_arg(chord)?)
            .map_err(js_error)?;
        Ok(to_js(&voicing))
    }

    pub fn jump_to(&mut self, index: usize) -> Result<JsValue, JsValue> {
        Ok(to_js(&self.session.jump_to(index).map_err(js_error)?))
    }

    pub fn shift_octave(&mut self, direction: i8) -> JsValue {
        to_js(&self.session.shift_octave(direction))
    }

    pub fn shift_inversion(&mut self, direction: i8) -> JsValue {
        to_js(&self.session.shift_inversion(direction))
    }

    pub fn reset_voicing(&mut self) -> Result<JsValue, JsValue> {
        Ok(to_js(&self.session.reset_voicing().map_err(js_error)?))
    }

    /// Drag a held note; returns `{ voicing, chord, source }` or null when refused
    pub fn move_note(&mut self, from: u8, to: u8) -> JsValue {
        match self.session.move_note(from, to) {
            Some((voicing, detected)) => to_js(&serde_json::json!({
                "voicing": voicing,
                "chord": detected.as_ref().map(|d| d.chord.encode()),
                "source": detected.map(|d| d.source),
            })),
            None => JsValue::NULL,
        }
    }

    pub fn current_chord(&self) -> JsValue {
        match self.session.current_chord() {
            Some(chord) => to_js(&ChordJS::from(chord)),
            None => JsValue::NULL,
        }
    }

    pub fn current_voicing(&self) -> JsValue {
        to_js(&self.session.current_voicing())
    }

    pub fn history(&self) -> JsValue {
        let entries: Vec<HistoryEntryJS> = self
            .session
            .history()
            .iter()
            .map(|e| HistoryEntryJS {
                chord: e.chord.into(),
                voicing: e.voicing.clone(),
            })
            .collect();
        to_js(&entries)
    }

    pub fn recent_chords(&self) -> JsValue {
        let recent: Vec<ChordJS> = self.session.recent_chords().into_iter().map(Into::into).collect();
        to_js(&recent)
    }

    pub fn set_key(&mut self, key: u8) {
        self.session.set_key(key);
    }

    pub fn set_voice_count(&mut self, voice_count: usize) {
        self.session.set_voice_count(voice_count);
    }

    pub fn set_bass_enabled(&mut self, enabled: bool) {
        self.session.set_bass_enabled(enabled);
    }

    pub fn clear(&mut self) {
        self.session.clear();
    }

    /// Export as JSON; pass `Date.now()` to stamp the document
    pub fn export_history(&self, timestamp: Option<f64>) -> Result<String, JsValue> {
        self.session
            .export_history(timestamp.map(|t| t as u64))
            .to_json()
            .map_err(js_error)
    }

    pub fn import_history(&mut self, json: &str) -> Result<usize, JsValue> {
        let document = HistoryDocument::from_json(json).map_err(js_error)?;
        Ok(self.session.import_history(document))
    }

    /// Load a chart given as `{ title, sections: [{ label, bars: [["2:m7", "7:7"], ...] }] }`
    pub fn load_song(&mut self, json: &str) -> Result<usize, JsValue> {
        let song: Song = serde_json::from_str(json).map_err(js_error)?;
        self.session.load_song(&song).map_err(js_error)
    }
}
