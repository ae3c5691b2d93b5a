//! Recoverable extraction outcomes. Neither type ever stops a run: a `Skip`
//! drops one clue, an `Abort` ends extraction of the current document.

use thiserror::Error;

use crate::db::Round;

/// Why a single clue was not emitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    #[error("no value")]
    NoValue,

    #[error("no text")]
    NoText,

    #[error("no answer")]
    NoAnswer,

    #[error("empty answer fragment")]
    EmptyFragment,

    #[error("no emphasis in answer fragment")]
    NoEmphasis,

    #[error("no category at position {0}")]
    NoCategory(usize),
}

/// Why extraction of a document stopped early.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Abort {
    #[error("no title")]
    NoTitle,

    #[error("no airdate")]
    NoAirdate,

    #[error("no {0} round")]
    MissingRound(Round),

    #[error("couldn't find final jeopardy category")]
    NoFinalCategory,

    #[error("couldn't find final jeopardy text")]
    NoFinalText,

    #[error("couldn't find final jeopardy answer: {0}")]
    NoFinalAnswer(Skip),
}
