#![warn(clippy::pedantic)]
#![allow(clippy::similar_names, clippy::too_many_lines)]

//! Pattern databases for the Rubik's Cube: exhaustive breadth-first
//! enumeration of an abstraction of the cube, recording the minimal move
//! count of every abstract state in a flat table.

pub mod builder;
pub mod database;
pub mod pattern;

pub use builder::{BuildConfig, FrontierEntry, PdbBuilder, build};
pub use database::{PatternDatabase, UNVISITED};
pub use pattern::{
    CornerOrientationPattern, CornerPattern, CornerPermutationPattern, EdgeOrientationPattern,
    PATTERN_NAMES, Pattern, pattern_by_name,
};

use cube_core::math::ranking::RankingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatternDatabaseError {
    #[error("Ranking failed: {0}")]
    Ranking(#[from] RankingError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Expected a table of {expected} bytes but found {found}")]
    SizeMismatch { expected: u64, found: u64 },
    #[error(
        "Unknown pattern {name:?}, expected one of {names}",
        name = .0,
        names = PATTERN_NAMES.join(", ")
    )]
    UnknownPattern(String),
    #[error("A rank space of {0} entries does not fit in memory")]
    RankSpaceTooLarge(u64),
    #[error("Breadth-first search went deeper than a table entry can record")]
    DepthOverflow,
}
