//! Abstractions of the cube whose states are ranked densely into `[0, n)`.
//!
//! A pattern only looks at part of a [`CubeState`]. For the breadth-first
//! enumeration to be exact, the projection must be closed under moves: the
//! projected state after a move may only depend on the projected state
//! before it. Every pattern here satisfies that because corner permutation,
//! corner orientation and edge orientation each evolve independently of the
//! rest of the cube.

use crate::PatternDatabaseError;
use cube_core::{
    cube::{CORNERS, CubeState, EDGES},
    math::ranking::{
        RankingError, decode_orientation_into, encode_orientation, orbit_rank_space,
        orientation_rank_space, permutation_rank_space, rank_orbit, rank_permutation,
        unrank_orbit_into, unrank_permutation_into,
    },
};

/// A dense ranking of some abstraction of the cube.
pub trait Pattern {
    /// A free form tag naming the abstraction, used for file names.
    fn name(&self) -> &str;

    /// The number of abstract states. Ranks lie in `[0, rank_space)`.
    fn rank_space(&self) -> u64;

    /// The rank of the abstract state `state` projects to.
    ///
    /// # Errors
    ///
    /// If the relevant part of `state` is malformed.
    fn rank(&self, state: &CubeState) -> Result<u64, RankingError>;

    /// Some cube state projecting to the abstract state of rank `rank`. Parts
    /// of the cube the pattern does not look at are solved.
    ///
    /// # Errors
    ///
    /// If `rank` is not less than [`Pattern::rank_space`].
    fn unrank(&self, rank: u64) -> Result<CubeState, RankingError>;
}

impl<P: Pattern + ?Sized> Pattern for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn rank_space(&self) -> u64 {
        (**self).rank_space()
    }

    fn rank(&self, state: &CubeState) -> Result<u64, RankingError> {
        (**self).rank(state)
    }

    fn unrank(&self, rank: u64) -> Result<CubeState, RankingError> {
        (**self).unrank(rank)
    }
}

/// Corner permutation and orientation together, `8! * 3^7 = 88,179,840`
/// states.
#[derive(Clone, Copy, Debug, Default)]
pub struct CornerPattern;

impl Pattern for CornerPattern {
    fn name(&self) -> &str {
        "corner"
    }

    fn rank_space(&self) -> u64 {
        orbit_rank_space(CORNERS, 3)
    }

    fn rank(&self, state: &CubeState) -> Result<u64, RankingError> {
        let (cp, co) = state.corners();
        rank_orbit(cp, co, 3)
    }

    fn unrank(&self, rank: u64) -> Result<CubeState, RankingError> {
        let mut cp = [0; CORNERS];
        let mut co = [0; CORNERS];
        unrank_orbit_into(rank, 3, &mut cp, &mut co)?;
        Ok(CubeState::from_corners(cp, co))
    }
}

/// Corner permutation only, `8! = 40,320` states.
#[derive(Clone, Copy, Debug, Default)]
pub struct CornerPermutationPattern;

impl Pattern for CornerPermutationPattern {
    fn name(&self) -> &str {
        "corner_permutation"
    }

    fn rank_space(&self) -> u64 {
        permutation_rank_space(CORNERS)
    }

    fn rank(&self, state: &CubeState) -> Result<u64, RankingError> {
        rank_permutation(state.corners().0)
    }

    fn unrank(&self, rank: u64) -> Result<CubeState, RankingError> {
        let mut cp = [0; CORNERS];
        unrank_permutation_into(rank, &mut cp)?;
        Ok(CubeState::from_corners(cp, [0; CORNERS]))
    }
}

/// Corner orientation only, `3^7 = 2,187` states.
#[derive(Clone, Copy, Debug, Default)]
pub struct CornerOrientationPattern;

impl Pattern for CornerOrientationPattern {
    fn name(&self) -> &str {
        "corner_orientation"
    }

    fn rank_space(&self) -> u64 {
        orientation_rank_space(CORNERS, 3)
    }

    fn rank(&self, state: &CubeState) -> Result<u64, RankingError> {
        encode_orientation(state.corners().1, 3)
    }

    fn unrank(&self, rank: u64) -> Result<CubeState, RankingError> {
        let mut co = [0; CORNERS];
        decode_orientation_into(rank, 3, &mut co)?;
        let solved = CubeState::solved();
        Ok(CubeState::from_corners(*solved.corners().0, co))
    }
}

/// Edge orientation only, `2^11 = 2,048` states.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeOrientationPattern;

impl Pattern for EdgeOrientationPattern {
    fn name(&self) -> &str {
        "edge_orientation"
    }

    fn rank_space(&self) -> u64 {
        orientation_rank_space(EDGES, 2)
    }

    fn rank(&self, state: &CubeState) -> Result<u64, RankingError> {
        encode_orientation(state.edges().1, 2)
    }

    fn unrank(&self, rank: u64) -> Result<CubeState, RankingError> {
        let mut eo = [0; EDGES];
        decode_orientation_into(rank, 2, &mut eo)?;
        let solved = CubeState::solved();
        Ok(CubeState::from_edges(*solved.edges().0, eo))
    }
}

/// The names accepted by [`pattern_by_name`].
pub const PATTERN_NAMES: [&str; 4] = [
    "corner",
    "corner_permutation",
    "corner_orientation",
    "edge_orientation",
];

/// Looks up one of the built in patterns by its name.
///
/// # Errors
///
/// If `name` is not one of [`PATTERN_NAMES`].
pub fn pattern_by_name(name: &str) -> Result<Box<dyn Pattern>, PatternDatabaseError> {
    Ok(match name {
        "corner" => Box::new(CornerPattern),
        "corner_permutation" => Box::new(CornerPermutationPattern),
        "corner_orientation" => Box::new(CornerOrientationPattern),
        "edge_orientation" => Box::new(EdgeOrientationPattern),
        _ => return Err(PatternDatabaseError::UnknownPattern(name.to_owned())),
    })
}
