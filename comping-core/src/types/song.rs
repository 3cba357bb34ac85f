//! Already-parsed song charts handed over by an import collaborator

use crate::types::chord::Chord;

/// A labelled section of a chart; each bar holds one or more chords
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Section {
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: String,
    pub bars: Vec<Vec<Chord>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Song {
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub composer: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sections: Vec<Section>,
}

impl Song {
    pub fn new(title: impl Into<String>) -> Self {
        Song {
            title: title.into(),
            composer: None,
            sections: Vec::new(),
        }
    }

    pub fn with_section(mut self, label: impl Into<String>, bars: Vec<Vec<Chord>>) -> Self {
        self.sections.push(Section {
            label: label.into(),
            bars,
        });
        self
    }

    /// Every chord in chart order: sections, then bars, then chords within a bar
    pub fn chords(&self) -> impl Iterator<Item = Chord> + '_ {
        self.sections
            .iter()
            .flat_map(|section| section.bars.iter())
            .flat_map(|bar| bar.iter().copied())
    }

    pub fn bar_count(&self) -> usize {
        self.sections.iter().map(|s| s.bars.len()).sum()
    }
}
