use crate::space::SearchSpace;
use cube_core::{start, success, working};
use fxhash::FxHashMap;
use log::{debug, info};
use serde::Deserialize;
use std::{cmp::Ordering, collections::BinaryHeap, time::Instant};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Algorithm {
    /// Best-first on `g + h`. Optimal with an admissible heuristic.
    AStar,
    /// Best-first on `g + w * h`. Solutions cost at most `w` times the
    /// optimum.
    WeightedAStar(f64),
    /// Best-first on `h` alone.
    GreedyBestFirst,
    /// Iterative deepening on `g + h`. Optimal with an admissible heuristic
    /// and only keeps the current path in memory.
    IdaStar,
}

impl Algorithm {
    fn priority(self, g: u32, h: u32) -> f64 {
        match self {
            Algorithm::AStar | Algorithm::IdaStar => f64::from(g) + f64::from(h),
            Algorithm::WeightedAStar(weight) => f64::from(g) + weight * f64::from(h),
            Algorithm::GreedyBestFirst => f64::from(h),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Give up after expanding this many states.
    pub max_expansions: Option<u64>,
    /// Never look for solutions longer than this.
    pub max_depth: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution<A> {
    pub actions: Vec<A>,
    pub cost: u32,
    pub expanded: u64,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("No goal is reachable, the search space was exhausted after {expanded} expansions")]
    NoSolution { expanded: u64 },
    #[error("Gave up after {0} expansions")]
    ExpansionLimitExceeded(u64),
    #[error("There is no solution of at most {0} actions")]
    DepthLimitExceeded(u32),
    #[error("Invalid weight {0}, expected a finite weight of at least zero")]
    InvalidWeight(f64),
}

struct Node<S, A> {
    state: S,
    parent: Option<usize>,
    action: Option<A>,
    g: u32,
}

/// An entry of the open list. `BinaryHeap` is a max-heap so the ordering is
/// reversed: the lowest priority pops first, then the lowest heuristic, then
/// the oldest node.
struct OpenEntry {
    priority: f64,
    h: u32,
    index: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

/// The last `limit` actions leading to `nodes[index]`, most recent last.
fn trailing_actions<S, A: Copy>(nodes: &[Node<S, A>], mut index: usize, limit: usize) -> Vec<A> {
    let mut actions = vec![];
    while actions.len() < limit {
        let node = &nodes[index];
        let (Some(action), Some(parent)) = (node.action, node.parent) else {
            break;
        };
        actions.push(action);
        index = parent;
    }
    actions.reverse();
    actions
}

enum Bound {
    Found(u32),
    Next(u32),
}

const EXHAUSTED: u32 = u32::MAX;

struct IdaStarSearch<'a, S: SearchSpace> {
    space: &'a S,
    max_expansions: Option<u64>,
    path: Vec<S::State>,
    actions: Vec<S::Action>,
    expanded: u64,
}

impl<S: SearchSpace> IdaStarSearch<'_, S> {
    /// Depth first search below `state`, which is the last entry of
    /// `self.path`, pruning every node whose `g + h` exceeds `bound`. On
    /// success `self.actions` holds the solution.
    fn search(&mut self, state: &S::State, g: u32, bound: u32) -> Result<Bound, SearchError> {
        let f = g.saturating_add(self.space.heuristic(state));
        if f > bound {
            return Ok(Bound::Next(f));
        }
        if self.space.is_goal(state) {
            return Ok(Bound::Found(g));
        }
        if self
            .max_expansions
            .is_some_and(|max_expansions| self.expanded >= max_expansions)
        {
            return Err(SearchError::ExpansionLimitExceeded(self.expanded));
        }
        self.expanded += 1;

        let history = &self.actions[self.actions.len().saturating_sub(2)..];
        let mut next_bound = EXHAUSTED;
        for (action, successor) in self.space.successors(state, history) {
            // Revisiting a state on the current path can never be shorter
            if self.path.contains(&successor) {
                continue;
            }
            self.path.push(successor.clone());
            self.actions.push(action);
            match self.search(&successor, g + 1, bound)? {
                found @ Bound::Found(_) => return Ok(found),
                Bound::Next(f) => next_bound = next_bound.min(f),
            }
            self.path.pop();
            self.actions.pop();
        }
        Ok(Bound::Next(next_bound))
    }
}

pub struct Solver<S: SearchSpace> {
    space: S,
    algorithm: Algorithm,
    config: SearchConfig,
}

impl<S: SearchSpace> Solver<S> {
    pub fn new(space: S, algorithm: Algorithm) -> Self {
        Self {
            space,
            algorithm,
            config: SearchConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn space(&self) -> &S {
        &self.space
    }

    /// Searches from the space's start state to the first goal state the
    /// algorithm settles on.
    ///
    /// # Errors
    ///
    /// If no goal is reachable, if a configured limit is hit first, or if the
    /// weight of weighted A* is negative or not finite.
    pub fn solve(&self) -> Result<Solution<S::Action>, SearchError> {
        if let Algorithm::WeightedAStar(weight) = self.algorithm
            && (!weight.is_finite() || weight < 0.0)
        {
            return Err(SearchError::InvalidWeight(weight));
        }
        info!(start!("Searching with {:?}"), self.algorithm);
        let start = Instant::now();
        let solution = match self.algorithm {
            Algorithm::IdaStar => self.ida_star(),
            Algorithm::AStar | Algorithm::WeightedAStar(_) | Algorithm::GreedyBestFirst => {
                self.best_first()
            }
        }?;
        info!(
            success!("Found a solution of cost {} in {:.3}s after {} expansions"),
            solution.cost,
            start.elapsed().as_secs_f64(),
            solution.expanded
        );
        Ok(solution)
    }

    fn best_first(&self) -> Result<Solution<S::Action>, SearchError> {
        let start = self.space.start();
        let h = self.space.heuristic(&start);
        let mut best_g = FxHashMap::default();
        best_g.insert(start.clone(), 0);
        let mut nodes = vec![Node {
            state: start,
            parent: None,
            action: None,
            g: 0,
        }];
        let mut open = BinaryHeap::from([OpenEntry {
            priority: self.algorithm.priority(0, h),
            h,
            index: 0,
        }]);
        let mut expanded = 0_u64;
        let mut depth_limited = false;

        while let Some(OpenEntry { index, .. }) = open.pop() {
            let node = &nodes[index];
            // Superseded by a cheaper path found after this entry was queued
            if best_g.get(&node.state).is_some_and(|&g| g < node.g) {
                continue;
            }
            if self.space.is_goal(&node.state) {
                return Ok(Solution {
                    actions: trailing_actions(&nodes, index, usize::MAX),
                    cost: node.g,
                    expanded,
                });
            }
            if self
                .config
                .max_expansions
                .is_some_and(|max_expansions| expanded >= max_expansions)
            {
                return Err(SearchError::ExpansionLimitExceeded(expanded));
            }
            expanded += 1;
            if self.config.max_depth.is_some_and(|max_depth| node.g >= max_depth) {
                depth_limited = true;
                continue;
            }

            let g = node.g + 1;
            let history = trailing_actions(&nodes, index, 2);
            let successors = self.space.successors(&node.state, &history);
            for (action, state) in successors {
                if best_g.get(&state).is_some_and(|&known| known <= g) {
                    continue;
                }
                best_g.insert(state.clone(), g);
                let h = self.space.heuristic(&state);
                open.push(OpenEntry {
                    priority: self.algorithm.priority(g, h),
                    h,
                    index: nodes.len(),
                });
                nodes.push(Node {
                    state,
                    parent: Some(index),
                    action: Some(action),
                    g,
                });
            }
            if expanded.is_multiple_of(100_000) {
                debug!(
                    working!("Expanded {} states, {} open"),
                    expanded,
                    open.len()
                );
            }
        }

        match self.config.max_depth {
            Some(max_depth) if depth_limited => Err(SearchError::DepthLimitExceeded(max_depth)),
            _ => Err(SearchError::NoSolution { expanded }),
        }
    }

    fn ida_star(&self) -> Result<Solution<S::Action>, SearchError> {
        let start = self.space.start();
        let mut search = IdaStarSearch {
            space: &self.space,
            max_expansions: self.config.max_expansions,
            path: vec![start.clone()],
            actions: vec![],
            expanded: 0,
        };
        let mut bound = self.space.heuristic(&start);
        loop {
            if let Some(max_depth) = self.config.max_depth
                && bound > max_depth
            {
                return Err(SearchError::DepthLimitExceeded(max_depth));
            }
            debug!(working!("Searching depth {}..."), bound);
            let depth_start = Instant::now();
            let expanded_before = search.expanded;
            let result = search.search(&start, 0, bound)?;
            debug!(
                working!("Traversed {} nodes in {:.3}s"),
                search.expanded - expanded_before,
                depth_start.elapsed().as_secs_f64()
            );
            match result {
                Bound::Found(cost) => {
                    return Ok(Solution {
                        actions: search.actions,
                        cost,
                        expanded: search.expanded,
                    });
                }
                Bound::Next(EXHAUSTED) => {
                    return Err(SearchError::NoSolution {
                        expanded: search.expanded,
                    });
                }
                Bound::Next(next_bound) => bound = next_bound,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The integers `0..=len` walked one step at a time from `start`.
    struct Line {
        len: i32,
        start: i32,
        goal: i32,
    }

    impl SearchSpace for Line {
        type State = i32;
        type Action = i32;

        fn start(&self) -> i32 {
            self.start
        }

        fn successors(&self, &state: &i32, _: &[i32]) -> Vec<(i32, i32)> {
            [-1, 1]
                .into_iter()
                .map(|step| (step, state + step))
                .filter(|&(_, next)| (0..=self.len).contains(&next))
                .collect()
        }

        fn is_goal(&self, &state: &i32) -> bool {
            state == self.goal
        }

        fn heuristic(&self, &state: &i32) -> u32 {
            if (0..=self.len).contains(&self.goal) {
                self.goal.abs_diff(state)
            } else {
                0
            }
        }
    }

    const ALL: [Algorithm; 4] = [
        Algorithm::AStar,
        Algorithm::WeightedAStar(2.0),
        Algorithm::GreedyBestFirst,
        Algorithm::IdaStar,
    ];

    #[test_log::test]
    fn test_line() {
        for algorithm in ALL {
            let space = Line {
                len: 20,
                start: 3,
                goal: 11,
            };
            let solution = Solver::new(space, algorithm).solve().unwrap();
            assert_eq!(solution.actions, vec![1; 8]);
            assert_eq!(solution.cost, 8);
        }
    }

    #[test_log::test]
    fn test_start_is_goal() {
        for algorithm in ALL {
            let space = Line {
                len: 5,
                start: 2,
                goal: 2,
            };
            let solution = Solver::new(space, algorithm).solve().unwrap();
            assert!(solution.actions.is_empty());
            assert_eq!(solution.cost, 0);
            assert_eq!(solution.expanded, 0);
        }
    }

    #[test_log::test]
    fn test_unreachable_goal() {
        for algorithm in ALL {
            let space = Line {
                len: 5,
                start: 2,
                goal: 9,
            };
            let err = Solver::new(space, algorithm).solve().unwrap_err();
            assert!(matches!(err, SearchError::NoSolution { .. }), "{err}");
        }
    }

    #[test_log::test]
    fn test_limits() {
        let line = || Line {
            len: 100,
            start: 0,
            goal: 50,
        };
        for algorithm in ALL {
            let config = SearchConfig {
                max_expansions: Some(10),
                max_depth: None,
            };
            let err = Solver::new(line(), algorithm)
                .with_config(config)
                .solve()
                .unwrap_err();
            assert_eq!(err, SearchError::ExpansionLimitExceeded(10));

            let config = SearchConfig {
                max_expansions: None,
                max_depth: Some(49),
            };
            let err = Solver::new(line(), algorithm)
                .with_config(config)
                .solve()
                .unwrap_err();
            assert_eq!(err, SearchError::DepthLimitExceeded(49));
        }
    }

    #[test]
    fn test_invalid_weight() {
        for weight in [-1.0, f64::NAN, f64::INFINITY] {
            let space = Line {
                len: 1,
                start: 0,
                goal: 1,
            };
            let err = Solver::new(space, Algorithm::WeightedAStar(weight))
                .solve()
                .unwrap_err();
            assert!(matches!(err, SearchError::InvalidWeight(_)));
        }
    }

    #[test]
    fn test_open_list_order() {
        let mut open = BinaryHeap::from([
            OpenEntry {
                priority: 5.0,
                h: 1,
                index: 0,
            },
            OpenEntry {
                priority: 3.0,
                h: 2,
                index: 1,
            },
            OpenEntry {
                priority: 3.0,
                h: 1,
                index: 2,
            },
            OpenEntry {
                priority: 3.0,
                h: 1,
                index: 3,
            },
        ]);
        let order = std::iter::from_fn(|| open.pop().map(|entry| entry.index))
            .collect::<Vec<_>>();
        assert_eq!(order, vec![2, 3, 1, 0]);
    }
}
