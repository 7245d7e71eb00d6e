use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::NaiveDate;
use crosschat_crossword::Puzzle;
use crosschat_puz::PuzReader;
use thiserror::Error;

use crate::error::ApiError;

/// A dated puzzle upstream (New York Times, Wall Street Journal, …)
///
/// The engine only knows the contract; concrete adapters are registered by
/// the deployment. Requests naming an upstream with no registered source
/// are rejected as malformed.
#[async_trait]
pub trait PuzzleSource: Send + Sync {
    async fn fetch(&self, date: NaiveDate) -> Result<Puzzle, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("upstream failed: {0}")]
    Upstream(String),

    #[error("{0}")]
    Decode(#[from] crosschat_puz::read::Error),
}

/// The registered upstream adapters
#[derive(Default)]
pub struct Sources {
    pub new_york_times: Option<Box<dyn PuzzleSource>>,
    pub wall_street_journal: Option<Box<dyn PuzzleSource>>,
}

/// Decode an uploaded `.puz` file that arrived as base64
pub fn puzzle_from_bytes(encoded: &str) -> Result<Puzzle, ApiError> {
    let bytes = BASE64
        .decode(encoded)
        .map_err(|err| ApiError::BadRequest(format!("puz_file_bytes is not base64: {err}")))?;

    let puzzle = PuzReader::new().read(&bytes)?;
    Ok(puzzle)
}
