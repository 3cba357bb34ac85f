//! Session construction from files and environment variables

use anyhow::{Context, Result};
use comping_core::{HarmonySession, NgramTable, SessionConfig};
use std::path::Path;
use std::sync::Arc;

/// Path to a JSON `SessionConfig`
pub const CONFIG_ENV: &str = "COMPING_CONFIG";
/// Path to a JSON n-gram table
pub const NGRAMS_ENV: &str = "COMPING_NGRAMS";

pub fn load_config(path: impl AsRef<Path>) -> Result<SessionConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    SessionConfig::from_json(&text).with_context(|| format!("In {}", path.display()))
}

pub fn load_ngrams(path: impl AsRef<Path>) -> Result<NgramTable> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read n-gram table {}", path.display()))?;
    NgramTable::from_json(&text).with_context(|| format!("In {}", path.display()))
}

/// Build a session from optional config and table paths; missing paths fall
/// back to the defaults and the built-in table
pub fn build_session(config: Option<&Path>, ngrams: Option<&Path>) -> Result<HarmonySession> {
    let config = match config {
        Some(path) => load_config(path)?,
        None => SessionConfig::default(),
    };
    let table = match ngrams {
        Some(path) => load_ngrams(path)?,
        None => NgramTable::builtin(),
    };
    tracing::debug!(contexts = table.len(), voices = config.voice_count, "session ready");
    Ok(HarmonySession::with_ngrams(config, Arc::new(table))?)
}

/// Session configured through `COMPING_CONFIG` and `COMPING_NGRAMS`
pub fn session_from_env() -> Result<HarmonySession> {
    let config = std::env::var_os(CONFIG_ENV);
    let ngrams = std::env::var_os(NGRAMS_ENV);
    build_session(
        config.as_deref().map(Path::new),
        ngrams.as_deref().map(Path::new),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"voice_count": 3, "key": 7}}"#).unwrap();
        let session = build_session(Some(file.path()), None).unwrap();
        assert_eq!(session.config().voice_count, 3);
        assert_eq!(session.key(), 7);
        assert!(!session.ngrams().is_empty());
    }

    #[test]
    fn test_ngram_file_replaces_builtin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"bigrams": {{"0:m7": [["5:7", 3]]}}}}"#).unwrap();
        let session = build_session(None, Some(file.path())).unwrap();
        assert_eq!(session.ngrams().len(), 1);
    }

    #[test]
    fn test_bad_files_report_their_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = build_session(Some(file.path()), None).err().unwrap();
        assert!(format!("{:#}", err).contains(&file.path().display().to_string()));
        assert!(load_ngrams("/nonexistent/table.json").is_err());
    }
}
