use std::path::PathBuf;

use thiserror::Error;

/// Failures at the edges of the game: files on disk and tuning values.
///
/// Nothing inside a simulation frame returns one of these; the frame loop
/// works on in-memory state only.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A tuning value is outside the range the physics can work with.
    #[error("tuning value '{name}' = {value} is invalid (expected {expected})")]
    InvalidTuning {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },
}

pub type GameResult<T> = Result<T, GameError>;
