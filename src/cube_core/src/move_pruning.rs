//! Pruned move generation for face-turn search.
//!
//! Turning the same face twice in a row is always reducible to a single turn
//! or to nothing, so after any move the three turns of its face are removed
//! (18 moves become 15). Turns of opposite faces commute, so after `A B`
//! where `B` is opposite to `A`, turning `A` again is redundant with `A2 B`
//! or `B` and both faces are removed (15 moves become 12).
//!
//! This only looks at the last two moves. Longer redundant cycles are still
//! generated.

use crate::cube::{ALL_MOVES, Face, Move};

const ALL_MOVES_MASK: u32 = (1 << ALL_MOVES.len()) - 1;

/// A set of face turns, bit `i` standing for `ALL_MOVES[i]`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MoveSet(u32);

impl MoveSet {
    pub const ALL: Self = Self(ALL_MOVES_MASK);
    pub const EMPTY: Self = Self(0);

    const fn face_mask(face: Face) -> u32 {
        0b111 << (face as usize * 3)
    }

    /// This set without the three turns of `face`.
    #[must_use]
    pub const fn without_face(self, face: Face) -> Self {
        Self(self.0 & !Self::face_mask(face))
    }

    #[must_use]
    pub const fn contains(self, m: Move) -> bool {
        self.0 & (1 << m.index()) != 0
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The moves of this set in `ALL_MOVES` order.
    pub fn iter(self) -> impl Iterator<Item = Move> {
        ALL_MOVES.into_iter().filter(move |&m| self.contains(m))
    }
}

/// The moves worth trying after `last_move` and `second_last_move`. `None`
/// means there is no such move yet, at the start of a search.
#[must_use]
pub fn legal_moves(last_move: Option<Move>, second_last_move: Option<Move>) -> MoveSet {
    let Some(last) = last_move else {
        return MoveSet::ALL;
    };
    let allowed = MoveSet::ALL.without_face(last.face);
    match second_last_move {
        Some(second_last) if second_last.face == last.face.opposite() => {
            allowed.without_face(second_last.face)
        }
        _ => allowed,
    }
}

/// The part of a move history that [`legal_moves`] depends on, packed into
/// two bytes of [`ALL_MOVES`] indices.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MoveHistory {
    last: u8,
    second_last: u8,
}

impl MoveHistory {
    const NO_MOVE: u8 = u8::MAX;

    #[allow(clippy::cast_possible_truncation)]
    const fn pack(m: Move) -> u8 {
        m.index() as u8
    }

    fn unpack(index: u8) -> Option<Move> {
        ALL_MOVES.get(usize::from(index)).copied()
    }

    /// The history after additionally applying `m`.
    #[must_use]
    pub const fn push(self, m: Move) -> Self {
        Self {
            last: Self::pack(m),
            second_last: self.last,
        }
    }

    #[must_use]
    pub fn last(self) -> Option<Move> {
        Self::unpack(self.last)
    }

    #[must_use]
    pub fn second_last(self) -> Option<Move> {
        Self::unpack(self.second_last)
    }

    #[must_use]
    pub fn legal_moves(self) -> MoveSet {
        legal_moves(self.last(), self.second_last())
    }
}

impl Default for MoveHistory {
    fn default() -> Self {
        Self {
            last: Self::NO_MOVE,
            second_last: Self::NO_MOVE,
        }
    }
}
