//! Top-3 high scores, kept in a plain-text file with one score per line,
//! highest first.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{GameError, GameResult};

const MAX_ENTRIES: usize = 3;
const FILE_NAME: &str = "rustthrust_highscores.txt";

/// Parse score lines, skipping anything that isn't a positive integer.
pub fn parse_scores(text: &str) -> Vec<u32> {
    let mut scores: Vec<u32> = text
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let line = line.trim();
            if line.is_empty() {
                tracing::warn!("high scores: skipping blank line {}", i + 1);
                return None;
            }
            match line.parse::<u32>() {
                Ok(0) => {
                    tracing::warn!("high scores: skipping zero score on line {}", i + 1);
                    None
                }
                Ok(score) => Some(score),
                Err(_) => {
                    tracing::warn!("high scores: skipping malformed line {}: {:?}", i + 1, line);
                    None
                }
            }
        })
        .collect();
    scores.sort_unstable_by(|a, b| b.cmp(a));
    scores.truncate(MAX_ENTRIES);
    scores
}

#[derive(Clone, Debug)]
pub struct HighScores {
    scores: Vec<u32>,
    path: PathBuf,
}

impl HighScores {
    /// Read the list at `path`. A missing or unreadable file is an empty list.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let scores = match read_file(&path) {
            Ok(Some(text)) => parse_scores(&text),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("{}; starting with no high scores", e);
                Vec::new()
            }
        };
        tracing::info!("loaded {} high scores from {}", scores.len(), path.display());
        Self { scores, path }
    }

    /// Store next to the executable.
    pub fn default_path() -> PathBuf {
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                return dir.join(FILE_NAME);
            }
        }
        PathBuf::from(FILE_NAME)
    }

    pub fn top(&self) -> &[u32] {
        &self.scores
    }

    pub fn qualifies(&self, score: u32) -> bool {
        score > 0
            && (self.scores.len() < MAX_ENTRIES
                || self.scores.last().is_some_and(|&lowest| score > lowest))
    }

    /// Record a finished game's score. Returns whether it made the list.
    /// Zero is never recorded.
    pub fn add(&mut self, score: u32) -> bool {
        if !self.qualifies(score) {
            return false;
        }
        self.scores.push(score);
        self.scores.sort_unstable_by(|a, b| b.cmp(a));
        self.scores.truncate(MAX_ENTRIES);
        match self.save() {
            Ok(()) => tracing::info!("high score {} saved to {}", score, self.path.display()),
            Err(e) => tracing::warn!("{}; high score not saved", e),
        }
        true
    }

    fn save(&self) -> GameResult<()> {
        let mut text = String::new();
        for score in &self.scores {
            text.push_str(&score.to_string());
            text.push('\n');
        }
        fs::write(&self.path, text).map_err(|source| GameError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

fn read_file(path: &Path) -> GameResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(GameError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[test]
    fn parse_skips_garbage_and_sorts() {
        let text = "120\nabc\n\n  900 \n-5\n0\n450\n30\n";
        assert_eq!(parse_scores(text), vec![900, 450, 120]);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn blank_and_zero_lines_are_logged() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let scores =
            tracing::subscriber::with_default(subscriber, || parse_scores("\n0\n75\n"));
        assert_eq!(scores, vec![75]);

        let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("skipping blank line 1"), "{text}");
        assert!(text.contains("skipping zero score on line 2"), "{text}");
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let scores = HighScores::load(dir.path().join("nope.txt"));
        assert!(scores.top().is_empty());
    }

    #[test]
    fn unreadable_path_is_empty() {
        // a directory can't be read as a file
        let dir = tempdir().unwrap();
        let scores = HighScores::load(dir.path());
        assert!(scores.top().is_empty());
    }

    #[test]
    fn add_keeps_top_three_and_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.txt");
        let mut scores = HighScores::load(&path);
        assert!(scores.add(300));
        assert!(scores.add(100));
        assert!(scores.add(200));
        assert!(scores.add(250));
        assert!(!scores.add(50));
        assert_eq!(scores.top(), &[300, 250, 200]);

        assert_eq!(fs::read_to_string(&path).unwrap(), "300\n250\n200\n");
        let reloaded = HighScores::load(&path);
        assert_eq!(reloaded.top(), &[300, 250, 200]);
    }

    #[test]
    fn zero_is_never_recorded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.txt");
        let mut scores = HighScores::load(&path);
        assert!(!scores.add(0));
        assert!(scores.top().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn loads_hand_edited_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.txt");
        fs::write(&path, "10\n5000\nnot a score\n700\n20\n").unwrap();
        let scores = HighScores::load(&path);
        assert_eq!(scores.top(), &[5000, 700, 20]);
        assert!(scores.qualifies(21));
        assert!(!scores.qualifies(20));
    }

    #[test]
    fn failed_save_still_updates_in_memory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("scores.txt");
        let mut scores = HighScores::load(&path);
        assert!(scores.add(400));
        assert_eq!(scores.top(), &[400]);
        assert!(!path.exists());
    }
}
