use std::hash::Hash;

/// A graph searched from a single start state towards any goal state. Every
/// action costs one.
pub trait SearchSpace {
    type State: Clone + Eq + Hash;
    type Action: Copy;

    fn start(&self) -> Self::State;

    /// The actions available from `state` together with the states they lead
    /// to. `history` holds the actions that led to `state`, most recent last,
    /// and is never longer than two. Spaces may use it to skip successors
    /// that are provably redundant, like immediately undoing the last action.
    fn successors(
        &self,
        state: &Self::State,
        history: &[Self::Action],
    ) -> Vec<(Self::Action, Self::State)>;

    fn is_goal(&self, state: &Self::State) -> bool;

    /// A lower bound on the number of actions from `state` to a goal. Zero is
    /// always a valid answer.
    fn heuristic(&self, state: &Self::State) -> u32;
}
