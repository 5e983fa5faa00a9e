#![warn(clippy::pedantic)]
#![allow(clippy::similar_names, clippy::too_many_lines)]

//! Heuristic search over anything that implements [`SearchSpace`], with
//! grid, sliding tile and Rubik's Cube domains.

pub mod cube_space;
pub mod grid;
pub mod sliding_tiles;
pub mod solver;
pub mod space;

pub use solver::{Algorithm, SearchConfig, SearchError, Solution, Solver};
pub use space::SearchSpace;
