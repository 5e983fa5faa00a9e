use crate::space::SearchSpace;
use cube_core::{
    cube::{CubeState, Move},
    move_pruning::legal_moves,
};
use pdb::{Pattern, PatternDatabase};

/// Solving the Rubik's Cube in face turns, guided by the largest lower bound
/// among a set of pattern databases.
pub struct CubeSpace<'a, P: Pattern> {
    start: CubeState,
    databases: &'a [PatternDatabase<P>],
}

impl<'a, P: Pattern> CubeSpace<'a, P> {
    pub fn new(start: CubeState, databases: &'a [PatternDatabase<P>]) -> Self {
        Self { start, databases }
    }

    /// The space whose start state is `scramble` applied to a solved cube.
    pub fn from_scramble(scramble: &[Move], databases: &'a [PatternDatabase<P>]) -> Self {
        Self::new(CubeState::solved().apply_sequence(scramble), databases)
    }

    pub fn databases(&self) -> &'a [PatternDatabase<P>] {
        self.databases
    }
}

impl<P: Pattern> SearchSpace for CubeSpace<'_, P> {
    type State = CubeState;
    type Action = Move;

    fn start(&self) -> CubeState {
        self.start.clone()
    }

    fn successors(&self, state: &CubeState, history: &[Move]) -> Vec<(Move, CubeState)> {
        let last = history.last().copied();
        let second_last = history.iter().rev().nth(1).copied();
        legal_moves(last, second_last)
            .iter()
            .map(|m| (m, state.apply_move(m)))
            .collect()
    }

    fn is_goal(&self, state: &CubeState) -> bool {
        state.is_solved() == (true, true)
    }

    fn heuristic(&self, state: &CubeState) -> u32 {
        self.databases
            .iter()
            .map(|database| u32::from(database.heuristic(state)))
            .max()
            .unwrap_or(0)
    }
}
