use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::ScoreSink;

const APP_DIR_NAME: &str = "grid-snake";
const SCORE_FILE_NAME: &str = "scores.json";

/// Failures of the on-disk score store.
#[derive(Debug, Error)]
pub enum ScoreStoreError {
    #[error("score file could not be accessed: {0}")]
    Io(#[from] io::Error),
    #[error("score file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ScoreFile {
    high_score: u32,
}

/// Returns the platform-correct score file path.
#[must_use]
pub fn scores_path() -> PathBuf {
    let mut base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base.push(SCORE_FILE_NAME);
    base
}

/// Loads the stored high score.
///
/// Returns `Ok(0)` when the score file does not yet exist (first run);
/// a file that exists but cannot be read or parsed is an error the caller
/// can surface before entering raw terminal mode.
pub fn load_high_score() -> Result<u32, ScoreStoreError> {
    load_high_score_from_path(&scores_path())
}

/// Saves the high score, creating parent directories when needed.
pub fn save_high_score(score: u32) -> Result<(), ScoreStoreError> {
    save_high_score_to_path(&scores_path(), score)
}

fn load_high_score_from_path(path: &Path) -> Result<u32, ScoreStoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let file: ScoreFile = serde_json::from_str(&raw)?;
    Ok(file.high_score)
}

fn save_high_score_to_path(path: &Path, score: u32) -> Result<(), ScoreStoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let payload = ScoreFile { high_score: score };
    let json = serde_json::to_string_pretty(&payload)?;

    fs::write(path, json)?;
    Ok(())
}

/// Score sink retaining the best score seen across sessions.
#[derive(Debug, Clone, Copy)]
pub struct HighScoreTracker {
    high_score: u32,
    latest: u32,
}

impl HighScoreTracker {
    /// Creates a tracker seeded with a previously stored high score.
    #[must_use]
    pub fn new(high_score: u32) -> Self {
        Self {
            high_score,
            latest: 0,
        }
    }

    /// Best score seen so far, stored or live.
    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Most recent score reported by the session.
    #[must_use]
    pub fn latest(&self) -> u32 {
        self.latest
    }
}

impl ScoreSink for HighScoreTracker {
    fn score_changed(&mut self, score: u32) {
        self.latest = score;
        if score > self.high_score {
            self.high_score = score;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use crate::session::ScoreSink;

    use super::{HighScoreTracker, load_high_score_from_path, save_high_score_to_path};

    #[test]
    fn score_serialization_round_trip() {
        let path = unique_test_path("round_trip");

        save_high_score_to_path(&path, 42).expect("score save should succeed");
        let loaded = load_high_score_from_path(&path).expect("load should succeed");

        assert_eq!(loaded, 42);
        cleanup_test_path(&path);
    }

    #[test]
    fn missing_score_file_returns_zero() {
        let path = unique_test_path("missing");
        // Deliberately do not create the file.
        let loaded = load_high_score_from_path(&path).expect("missing file should return Ok(0)");
        assert_eq!(loaded, 0);
    }

    #[test]
    fn malformed_score_file_returns_error() {
        let path = unique_test_path("malformed");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("test parent directory should be creatable");
        }
        fs::write(&path, "not-json").expect("test file write should succeed");

        assert!(
            load_high_score_from_path(&path).is_err(),
            "malformed file should return Err"
        );

        cleanup_test_path(&path);
    }

    #[test]
    fn tracker_keeps_the_best_score() {
        let mut tracker = HighScoreTracker::new(5);

        tracker.score_changed(0);
        tracker.score_changed(3);
        assert_eq!(tracker.high_score(), 5);
        assert_eq!(tracker.latest(), 3);

        tracker.score_changed(8);
        assert_eq!(tracker.high_score(), 8);
    }

    fn unique_test_path(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after epoch")
            .as_nanos();

        std::env::temp_dir()
            .join("grid-snake-score-tests")
            .join(format!("{label}-{nanos}.json"))
    }

    fn cleanup_test_path(path: &PathBuf) {
        let _ = fs::remove_file(path);
        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir(parent);
        }
    }
}
