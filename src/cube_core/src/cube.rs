//! Face turns of the 3x3x3 Rubik's Cube and the cubie-level state they act
//! on.
//!
//! A cube is stored as two orbits, the 8 corners and the 12 edges, each as
//! a permutation array plus an orientation array. Moves only ever cycle four
//! slots of each orbit, so applying one is constant time. Orientations of a
//! reachable state always sum to zero, modulo 3 for corners and 2 for edges.

use std::{
    fmt::Display,
    ops::{Deref, DerefMut},
    str::FromStr,
};

use itertools::Itertools;
use log::trace;
use thiserror::Error;

pub const EDGES: usize = 12;
pub const CORNERS: usize = 8;

/// Up, down, left, right, front and back. The discriminants index
/// the per-face turn table and are laid out so that a face's three turns occupy
/// consecutive bits of a [`MoveSet`](crate::move_pruning::MoveSet).
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Clone, Copy)]
pub enum Face {
    U,
    D,
    L,
    R,
    F,
    B,
}

impl Face {
    pub const ALL: [Self; 6] = {
        use Face::*;
        let v = [U, D, L, R, F, B];

        let mut i = 0;
        while i < v.len() {
            assert!(i == v[i] as usize);
            i += 1;
        }

        v
    };

    /// The face on the other side of the cube. Turns of opposite faces
    /// commute.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Face::U => Face::D,
            Face::D => Face::U,
            Face::L => Face::R,
            Face::R => Face::L,
            Face::F => Face::B,
            Face::B => Face::F,
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            'U' => Some(Face::U),
            'D' => Some(Face::D),
            'L' => Some(Face::L),
            'R' => Some(Face::R),
            'F' => Some(Face::F),
            'B' => Some(Face::B),
            _ => None,
        }
    }
}

impl Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Clockwise, counter-clockwise or half turn, written `F`, `F'` and `F2`.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Clone, Copy)]
pub enum Direction {
    Normal,
    Prime,
    Double,
}

impl Direction {
    pub const ALL: [Self; 3] = [Direction::Normal, Direction::Prime, Direction::Double];

    /// How many clockwise quarter turns this direction amounts to.
    #[must_use]
    pub const fn quarter_turns(self) -> usize {
        match self {
            Direction::Normal => 1,
            Direction::Prime => 3,
            Direction::Double => 2,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Normal => write!(f, ""),
            Direction::Prime => write!(f, "'"),
            Direction::Double => write!(f, "2"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0:?} is not one of the 18 face turns")]
pub struct InvalidMoveError(pub String);

/// One of the 18 face turns.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Clone, Copy)]
pub struct Move {
    pub face: Face,
    pub dir: Direction,
}

/// A shorthand macro that can be used to construct moves.
///
/// ```
/// use cube_core::cube::*;
/// use cube_core::cube_move;
///
/// let r_prime: Move = cube_move!(R, Prime);
/// let u2: Move = cube_move!(U, Double);
/// assert_eq!(r_prime.to_string(), "R'");
/// assert_eq!(u2.to_string(), "U2");
/// ```
#[macro_export]
macro_rules! cube_move {
    ($face: ident, $dir:ident) => {{
        $crate::cube::Move {
            face: $crate::cube::Face::$face,
            dir: $crate::cube::Direction::$dir,
        }
    }};
}

impl Move {
    #[must_use]
    pub const fn new(face: Face, dir: Direction) -> Self {
        Self { face, dir }
    }

    #[must_use]
    pub const fn invert(self) -> Self {
        Self {
            face: self.face,
            dir: match self.dir {
                Direction::Normal => Direction::Prime,
                Direction::Prime => Direction::Normal,
                Direction::Double => Direction::Double,
            },
        }
    }

    /// The position of this move in [`ALL_MOVES`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.face as usize * 3 + self.dir as usize
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.face, self.dir)
    }
}

impl FromStr for Move {
    type Err = InvalidMoveError;

    /// Parses `F`, `F'`, `F2`, and the lowercase shorthand `f` for `F'`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || InvalidMoveError(s.to_owned());
        let mut chars = s.chars();
        let first = chars.next().ok_or_else(err)?;
        let suffix = chars.as_str();
        if first.is_ascii_lowercase() {
            let face = Face::from_char(first.to_ascii_uppercase()).ok_or_else(err)?;
            return if suffix.is_empty() {
                Ok(Move::new(face, Direction::Prime))
            } else {
                Err(err())
            };
        }
        let face = Face::from_char(first).ok_or_else(err)?;
        let dir = match suffix {
            "" => Direction::Normal,
            "'" => Direction::Prime,
            "2" => Direction::Double,
            _ => return Err(err()),
        };
        Ok(Move::new(face, dir))
    }
}

/// A vector of all allowed moves on a Rubik's Cube, ordered so that
/// `ALL_MOVES[m.index()] == m`.
pub const ALL_MOVES: [Move; 18] = [
    cube_move!(U, Normal),
    cube_move!(U, Prime),
    cube_move!(U, Double),
    cube_move!(D, Normal),
    cube_move!(D, Prime),
    cube_move!(D, Double),
    cube_move!(L, Normal),
    cube_move!(L, Prime),
    cube_move!(L, Double),
    cube_move!(R, Normal),
    cube_move!(R, Prime),
    cube_move!(R, Double),
    cube_move!(F, Normal),
    cube_move!(F, Prime),
    cube_move!(F, Double),
    cube_move!(B, Normal),
    cube_move!(B, Prime),
    cube_move!(B, Double),
];

/// Scrambles and solutions, written as whitespace separated moves.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct MoveSequence(pub Vec<Move>);

impl MoveSequence {
    /// The sequence that undoes this one.
    #[must_use]
    pub fn invert(&self) -> Self {
        MoveSequence(self.iter().rev().map(|m| m.invert()).collect())
    }
}

impl From<Vec<Move>> for MoveSequence {
    fn from(moves: Vec<Move>) -> Self {
        Self(moves)
    }
}

impl Display for MoveSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.iter().join(" "))
    }
}

impl FromStr for MoveSequence {
    type Err = InvalidMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(MoveSequence)
    }
}

impl Deref for MoveSequence {
    type Target = Vec<Move>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveSequence {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// What a clockwise quarter turn of one face does to a configuration.
///
/// The piece in slot `cycle[i]` moves to slot `cycle[(i + 1) % 4]` and its
/// orientation is increased by `twist[i]` on the way.
///
/// Corner slots are numbered UBL UBR UFR UFL DFL DFR DBR DBL and edge slots
/// UB UR UF UL BL BR FR FL DF DR DB DL.
struct FaceTurn {
    corner_cycle: [usize; 4],
    corner_twist: [u8; 4],
    edge_cycle: [usize; 4],
    edge_flip: u8,
}

const NO_TWIST: [u8; 4] = [0, 0, 0, 0];
const TWIST: [u8; 4] = [1, 2, 1, 2];

/// Indexed by `Face as usize`.
const FACE_TURNS: [FaceTurn; 6] = [
    // U
    FaceTurn {
        corner_cycle: [0, 1, 2, 3],
        corner_twist: NO_TWIST,
        edge_cycle: [0, 1, 2, 3],
        edge_flip: 0,
    },
    // D
    FaceTurn {
        corner_cycle: [4, 5, 6, 7],
        corner_twist: NO_TWIST,
        edge_cycle: [8, 9, 10, 11],
        edge_flip: 0,
    },
    // L
    FaceTurn {
        corner_cycle: [0, 3, 4, 7],
        corner_twist: TWIST,
        edge_cycle: [3, 7, 11, 4],
        edge_flip: 0,
    },
    // R
    FaceTurn {
        corner_cycle: [2, 1, 6, 5],
        corner_twist: TWIST,
        edge_cycle: [1, 5, 9, 6],
        edge_flip: 0,
    },
    // F
    FaceTurn {
        corner_cycle: [3, 2, 5, 4],
        corner_twist: TWIST,
        edge_cycle: [2, 6, 8, 7],
        edge_flip: 1,
    },
    // B
    FaceTurn {
        corner_cycle: [1, 0, 7, 6],
        corner_twist: TWIST,
        edge_cycle: [0, 4, 10, 5],
        edge_flip: 1,
    },
];

fn cycle_orbit(perm: &mut [u8], ori: &mut [u8], cycle: [usize; 4], twist: [u8; 4], modulus: u8) {
    let last_piece = perm[cycle[3]];
    let last_ori = ori[cycle[3]];
    for i in (1..4).rev() {
        perm[cycle[i]] = perm[cycle[i - 1]];
        ori[cycle[i]] = (ori[cycle[i - 1]] + twist[i - 1]) % modulus;
    }
    perm[cycle[0]] = last_piece;
    ori[cycle[0]] = (last_ori + twist[3]) % modulus;
}

const fn identity<const N: usize>() -> [u8; N] {
    let mut arr = [0; N];
    let mut i = 0;
    while i < N {
        arr[i] = i as u8;
        i += 1;
    }
    arr
}

/// A configuration of the cube. Index `i` of a permutation array is a slot and the value is the
/// cubie occupying it. Orientations are stored per slot, in `0..3` for
/// corners and `0..2` for edges.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct CubeState {
    cp: [u8; CORNERS],
    co: [u8; CORNERS],
    ep: [u8; EDGES],
    eo: [u8; EDGES],
}

impl Default for CubeState {
    fn default() -> CubeState {
        CubeState {
            cp: identity(),
            co: [0; CORNERS],
            ep: identity(),
            eo: [0; EDGES],
        }
    }
}

impl CubeState {
    #[must_use]
    pub fn solved() -> Self {
        Self::default()
    }

    /// A cube whose corners are as given and whose edges are solved.
    #[must_use]
    pub fn from_corners(cp: [u8; CORNERS], co: [u8; CORNERS]) -> Self {
        CubeState {
            cp,
            co,
            ..Default::default()
        }
    }

    /// A cube whose edges are as given and whose corners are solved.
    #[must_use]
    pub fn from_edges(ep: [u8; EDGES], eo: [u8; EDGES]) -> Self {
        CubeState {
            ep,
            eo,
            ..Default::default()
        }
    }

    /// The corner permutation and orientation.
    #[must_use]
    pub fn corners(&self) -> (&[u8; CORNERS], &[u8; CORNERS]) {
        (&self.cp, &self.co)
    }

    /// The edge permutation and orientation.
    #[must_use]
    pub fn edges(&self) -> (&[u8; EDGES], &[u8; EDGES]) {
        (&self.ep, &self.eo)
    }

    fn apply_quarter_turn(&mut self, face: Face) {
        let turn = &FACE_TURNS[face as usize];
        cycle_orbit(&mut self.cp, &mut self.co, turn.corner_cycle, turn.corner_twist, 3);
        cycle_orbit(
            &mut self.ep,
            &mut self.eo,
            turn.edge_cycle,
            [turn.edge_flip; 4],
            2,
        );
    }

    /// Applies a move to this configuration in place. Half turns are two
    /// clockwise quarter turns and counter-clockwise turns are three.
    pub fn apply_move_mut(&mut self, m: Move) {
        for _ in 0..m.dir.quarter_turns() {
            self.apply_quarter_turn(m.face);
        }
    }

    /// This configuration after `m`.
    #[must_use]
    pub fn apply_move(&self, m: Move) -> Self {
        let mut next = self.clone();
        next.apply_move_mut(m);
        next
    }

    /// Applies a move given in notation, like `R'` or `r`.
    ///
    /// # Errors
    ///
    /// If `symbol` is not one of the 18 face turns.
    pub fn apply_symbol(&self, symbol: &str) -> Result<Self, InvalidMoveError> {
        Ok(self.apply_move(symbol.parse()?))
    }

    /// This configuration after each of `moves` in turn.
    #[must_use]
    pub fn apply_sequence(&self, moves: &[Move]) -> Self {
        let mut next = self.clone();
        for &m in moves {
            next.apply_move_mut(m);
        }
        next
    }

    /// Whether every cubie is in its home slot, and whether every cubie has
    /// zero orientation, reported independently.
    #[must_use]
    pub fn is_solved(&self) -> (bool, bool) {
        let solved = Self::default();
        (
            self.cp == solved.cp && self.ep == solved.ep,
            self.co == solved.co && self.eo == solved.eo,
        )
    }
}

/// A random scramble of `length` moves that never turns the same face twice
/// in a row and never turns a face again after turning its opposite face.
#[must_use]
pub fn random_scramble(length: usize, rng: &mut fastrand::Rng) -> MoveSequence {
    let mut moves = MoveSequence::default();
    for _ in 0..length {
        let last = moves.last().copied();
        let second_last = moves.len().checked_sub(2).map(|i| moves[i]);
        let legal = crate::move_pruning::legal_moves(last, second_last);
        let pick = rng.usize(0..legal.len());
        // `pick` is below the number of legal moves
        if let Some(m) = legal.iter().nth(pick) {
            moves.push(m);
        }
    }
    trace!("Generated the scramble {moves}");
    moves
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scrambled(scramble: &str) -> CubeState {
        let seq: MoveSequence = scramble.parse().unwrap();
        CubeState::default().apply_sequence(&seq)
    }

    fn order(alg: &str) -> usize {
        let seq: MoveSequence = alg.parse().unwrap();
        let mut state = CubeState::default().apply_sequence(&seq);
        let mut order = 1;
        while state != CubeState::default() {
            state = state.apply_sequence(&seq);
            order += 1;
        }
        order
    }

    #[test]
    fn test_solved_invariant() {
        let solved = CubeState::solved();
        assert_eq!(solved.is_solved(), (true, true));
        assert_eq!(solved.corners().0, &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(solved.edges().1, &[0; EDGES]);
    }

    #[test]
    fn test_move_indices() {
        for (i, m) in ALL_MOVES.iter().enumerate() {
            assert_eq!(m.index(), i);
        }
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("F".parse::<Move>().unwrap(), cube_move!(F, Normal));
        assert_eq!("f".parse::<Move>().unwrap(), cube_move!(F, Prime));
        assert_eq!("F'".parse::<Move>().unwrap(), cube_move!(F, Prime));
        assert_eq!("D2".parse::<Move>().unwrap(), cube_move!(D, Double));
        for m in ALL_MOVES {
            assert_eq!(m.to_string().parse::<Move>().unwrap(), m);
        }
        let seq: MoveSequence = "R U R' U'".parse().unwrap();
        assert_eq!(seq.to_string(), "R U R' U'");
    }

    #[test]
    fn test_invalid_moves() {
        for bad in ["", "X", "F3", "f2", "FF", "u'", "M"] {
            assert_eq!(
                bad.parse::<Move>(),
                Err(InvalidMoveError(bad.to_owned()))
            );
        }
        assert!("R U X".parse::<MoveSequence>().is_err());
        assert!(CubeState::default().apply_symbol("Q").is_err());
    }

    #[test]
    fn test_scramble_and_undo() {
        let state = CubeState::default().apply_symbol("F").unwrap();
        assert_eq!(state.is_solved(), (false, false));
        let state = state.apply_symbol("f").unwrap();
        assert_eq!(state.is_solved(), (true, true));
    }

    #[test]
    fn test_quarter_turn_order() {
        let start = scrambled("R U2 F' L D B2");
        for face in Face::ALL {
            let m = Move::new(face, Direction::Normal);
            let mut state = start.clone();
            for _ in 0..3 {
                state.apply_move_mut(m);
                assert_ne!(state, start);
            }
            state.apply_move_mut(m);
            assert_eq!(state, start);
        }
    }

    #[test]
    fn test_move_then_inverse() {
        let start = scrambled("L2 B' U R F2 D'");
        for m in ALL_MOVES {
            assert_eq!(start.apply_move(m).apply_move(m.invert()), start);
        }
    }

    #[test]
    fn test_prime_is_three_quarter_turns() {
        let start = scrambled("F R U");
        for face in Face::ALL {
            let normal = Move::new(face, Direction::Normal);
            let thrice = start.apply_sequence(&[normal, normal, normal]);
            assert_eq!(thrice, start.apply_move(Move::new(face, Direction::Prime)));
            let twice = start.apply_sequence(&[normal, normal]);
            assert_eq!(twice, start.apply_move(Move::new(face, Direction::Double)));
        }
    }

    #[test]
    fn test_orientation_conservation() {
        let mut rng = fastrand::Rng::with_seed(3);
        let mut state = CubeState::default();
        for _ in 0..2000 {
            state.apply_move_mut(ALL_MOVES[rng.usize(0..ALL_MOVES.len())]);
            let (_, co) = state.corners();
            let (_, eo) = state.edges();
            assert_eq!(co.iter().map(|&o| u32::from(o)).sum::<u32>() % 3, 0);
            assert_eq!(eo.iter().map(|&o| u32::from(o)).sum::<u32>() % 2, 0);
        }
    }

    #[test]
    fn test_sequence_inverse_solves() {
        let seq: MoveSequence = "D' R2 F U' B L2 U F2 R' D".parse().unwrap();
        let state = CubeState::default().apply_sequence(&seq);
        assert_eq!(state.apply_sequence(&seq.invert()).is_solved(), (true, true));
    }

    #[test]
    fn test_copy_is_independent() {
        let original = scrambled("R U");
        let mut copy = original.clone();
        copy.apply_move_mut(cube_move!(F, Normal));
        assert_eq!(original, scrambled("R U"));
        assert_ne!(original, copy);
    }

    #[test]
    fn test_known_orders() {
        assert_eq!(order("R U R' U'"), 6);
        assert_eq!(order("R U R' U R U2 R'"), 6);
        assert_eq!(order("R U"), 105);
        assert_eq!(order("R U2"), 30);
        // T-Perm
        assert_eq!(order("R U R' U' R' F R2 U' R' U' R U R' F'"), 2);
    }

    #[test]
    fn test_half_turns_preserve_orientation() {
        let state = scrambled("U2 D2 L2 R2 F2 B2 R2 F2");
        assert!(state.is_solved().1);
        assert!(!state.is_solved().0);
    }

    #[test]
    fn test_random_scramble_is_pruned() {
        let mut rng = fastrand::Rng::with_seed(11);
        let scramble = random_scramble(30, &mut rng);
        assert_eq!(scramble.len(), 30);
        for pair in scramble.windows(2) {
            assert_ne!(pair[0].face, pair[1].face);
        }
        for triple in scramble.windows(3) {
            assert!(
                !(triple[0].face.opposite() == triple[1].face && triple[2].face == triple[0].face)
            );
        }
    }
}
