use thiserror::Error;

use crate::board::board_state::Board;

/// The external row encoding could not be decoded into a board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardFormatError {
    /// The encoding did not have exactly eight rows.
    #[error("expected 8 board rows, found {found}")]
    RowCount { found: usize },

    /// A row decoded to something other than eight cells.
    #[error("row {row} decodes to {len} bytes, expected 8")]
    RowLength { row: usize, len: usize },

    /// A row contained a character that is not a hex digit.
    #[error("row {row} contains invalid hex character {ch:?}")]
    InvalidHex { row: usize, ch: char },

    /// A row had an odd number of hex characters.
    #[error("row {row} has an odd number of hex characters")]
    OddLength { row: usize },
}

/// A proposed interactive move did not match any legal successor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("proposed board is not a legal successor of the current board")]
    IllegalTransition { parent: Board },

    #[error("the game is already decided; no further moves are accepted")]
    GameOver,
}

/// Failures reported by a frontier store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrontierError {
    /// The store could not be reached at all.
    #[error("frontier store unavailable: {0}")]
    Unavailable(String),

    /// A write was rejected or only partially applied.
    #[error("frontier write failed: {0}")]
    WriteFailed(String),
}

pub type FrontierResult<T> = Result<T, FrontierError>;

/// Reasons a pipeline run aborted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Frontier(#[from] FrontierError),

    #[error("expansion worker {worker_id} panicked")]
    WorkerPanicked { worker_id: usize },

    #[error("frontier producer panicked")]
    ProducerPanicked,
}

/// Rejected pipeline option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("invalid value {value:?} for option {name}")]
    InvalidValue { name: String, value: String },
}
