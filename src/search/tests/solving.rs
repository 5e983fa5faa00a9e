use cube_core::cube::{CubeState, random_scramble};
use fxhash::FxHashMap;
use log::info;
use pdb::{
    BuildConfig, CornerOrientationPattern, CornerPermutationPattern, EdgeOrientationPattern,
    Pattern, build,
};
use search::{
    Algorithm, SearchConfig, SearchError, SearchSpace, Solver,
    cube_space::CubeSpace,
    grid::{Cell, GridHeuristic, GridSpace},
    sliding_tiles::{Board, Slide, SlidingTiles},
};
use std::collections::VecDeque;

/// The exact distance from the start to the nearest goal, by plain
/// breadth-first search.
fn bfs_distance<S: SearchSpace>(space: &S) -> Option<u32> {
    let start = space.start();
    let mut distances = FxHashMap::default();
    distances.insert(start.clone(), 0);
    let mut queue = VecDeque::from([start]);
    while let Some(state) = queue.pop_front() {
        let distance = distances[&state];
        if space.is_goal(&state) {
            return Some(distance);
        }
        for (_, next) in space.successors(&state, &[]) {
            if !distances.contains_key(&next) {
                distances.insert(next.clone(), distance + 1);
                queue.push_back(next);
            }
        }
    }
    None
}

fn scrambled_board(width: usize, length: usize, rng: &mut fastrand::Rng) -> Board {
    let mut board = Board::goal(width).unwrap();
    for _ in 0..length {
        let slide = Slide::ALL[rng.usize(0..4)];
        if let Some(next) = board.slide(slide) {
            board = next;
        }
    }
    board
}

#[test_log::test]
fn test_sliding_tiles_optimal() {
    let mut rng = fastrand::Rng::with_seed(2);
    for _ in 0..5 {
        let board = scrambled_board(3, 40, &mut rng);
        info!("Solving\n{board}");
        let space = SlidingTiles::new(board).unwrap();
        let optimal = bfs_distance(&space).unwrap();

        for algorithm in [Algorithm::AStar, Algorithm::IdaStar] {
            let solution = Solver::new(space.clone(), algorithm).solve().unwrap();
            assert_eq!(solution.cost, optimal);
            assert_eq!(solution.actions.len(), optimal as usize);
            assert!(space.play(&solution.actions).unwrap().is_goal());
        }
        for algorithm in [Algorithm::WeightedAStar(3.0), Algorithm::GreedyBestFirst] {
            let solution = Solver::new(space.clone(), algorithm).solve().unwrap();
            assert!(solution.cost >= optimal);
            assert!(space.play(&solution.actions).unwrap().is_goal());
        }
    }
}

#[test_log::test]
fn test_sliding_tiles_known_instance() {
    let board = Board::new(vec![1, 2, 3, 4, 5, 6, 0, 7, 8]).unwrap();
    let space = SlidingTiles::new(board).unwrap();
    let solution = Solver::new(space, Algorithm::AStar).solve().unwrap();
    assert_eq!(solution.actions, vec![Slide::Right, Slide::Right]);
}

#[test_log::test]
fn test_fifteen_puzzle() {
    let mut rng = fastrand::Rng::with_seed(15);
    let board = scrambled_board(4, 30, &mut rng);
    let space = SlidingTiles::new(board).unwrap();
    let a_star = Solver::new(space.clone(), Algorithm::AStar).solve().unwrap();
    let ida_star = Solver::new(space.clone(), Algorithm::IdaStar).solve().unwrap();
    assert_eq!(a_star.cost, ida_star.cost);
    assert!(space.play(&ida_star.actions).unwrap().is_goal());
}

#[test_log::test]
fn test_grid_optimal() {
    let start = Cell::new(0, 0);
    let goal = Cell::new(6, 5);
    let mut solved = 0;
    for seed in 0..30 {
        let mut rng = fastrand::Rng::with_seed(seed);
        let grid = GridSpace::random(7, 6, 10, start, goal, &mut rng).unwrap();
        let Some(optimal) = bfs_distance(&grid) else {
            let err = Solver::new(grid, Algorithm::AStar).solve().unwrap_err();
            assert!(matches!(err, SearchError::NoSolution { .. }));
            continue;
        };
        solved += 1;
        for heuristic in [GridHeuristic::Manhattan, GridHeuristic::Euclidean] {
            let grid = grid.clone().with_heuristic(heuristic);
            for algorithm in [Algorithm::AStar, Algorithm::IdaStar] {
                let solution = Solver::new(grid.clone(), algorithm).solve().unwrap();
                assert_eq!(solution.cost, optimal, "{algorithm:?} on seed {seed}");
                assert_eq!(grid.walk(&solution.actions), Some(goal));
            }
            for algorithm in [Algorithm::WeightedAStar(2.5), Algorithm::GreedyBestFirst] {
                let solution = Solver::new(grid.clone(), algorithm).solve().unwrap();
                assert!(solution.cost >= optimal);
                assert_eq!(grid.walk(&solution.actions), Some(goal));
            }
        }
    }
    assert!(solved > 0);
}

#[test_log::test]
fn test_walled_off_grid() {
    let wall = (0..5).map(|y| Cell::new(2, y));
    let grid = GridSpace::new(5, 5, wall, Cell::new(0, 0), Cell::new(4, 4)).unwrap();
    for algorithm in [
        Algorithm::AStar,
        Algorithm::WeightedAStar(2.0),
        Algorithm::GreedyBestFirst,
    ] {
        let err = Solver::new(grid.clone(), algorithm).solve().unwrap_err();
        assert!(matches!(err, SearchError::NoSolution { expanded } if expanded >= 10));
    }
}

#[test_log::test]
fn test_grid_detour() {
    // A wall with a single gap at the bottom
    let wall = (0..4).map(|y| Cell::new(2, y));
    let grid = GridSpace::new(5, 5, wall, Cell::new(0, 0), Cell::new(4, 0)).unwrap();
    let solution = Solver::new(grid.clone(), Algorithm::AStar).solve().unwrap();
    assert_eq!(solution.cost, 12);
    assert_eq!(grid.walk(&solution.actions), Some(Cell::new(4, 0)));

    let config = SearchConfig {
        max_expansions: None,
        max_depth: Some(11),
    };
    let err = Solver::new(grid, Algorithm::IdaStar)
        .with_config(config)
        .solve()
        .unwrap_err();
    assert_eq!(err, SearchError::DepthLimitExceeded(11));
}

fn small_databases() -> Vec<pdb::PatternDatabase<Box<dyn Pattern>>> {
    let patterns: [Box<dyn Pattern>; 3] = [
        Box::new(CornerOrientationPattern),
        Box::new(EdgeOrientationPattern),
        Box::new(CornerPermutationPattern),
    ];
    patterns
        .into_iter()
        .map(|pattern| build(pattern, BuildConfig::default()).unwrap())
        .collect()
}

#[test_log::test]
fn test_cube_short_scrambles() {
    let databases = small_databases();
    let mut rng = fastrand::Rng::with_seed(11);
    for length in 0..=5 {
        let scramble = random_scramble(length, &mut rng);
        let space = CubeSpace::from_scramble(&scramble, &databases);
        let solution = Solver::new(space, Algorithm::IdaStar).solve().unwrap();
        info!("{scramble} solved by {} moves", solution.cost);
        assert!(solution.cost as usize <= length);

        let start = CubeState::solved().apply_sequence(&scramble);
        assert_eq!(
            start.apply_sequence(&solution.actions).is_solved(),
            (true, true)
        );
        // Pruned scrambles of up to two moves cannot be shortened
        if length <= 2 {
            assert_eq!(solution.cost as usize, length);
        }
    }
}

#[test_log::test]
fn test_cube_a_star_matches_ida_star() {
    let databases = small_databases();
    let mut rng = fastrand::Rng::with_seed(4);
    for _ in 0..3 {
        let scramble = random_scramble(4, &mut rng);
        let solve = |algorithm| {
            let space = CubeSpace::from_scramble(&scramble, &databases);
            Solver::new(space, algorithm).solve().unwrap()
        };
        let a_star = solve(Algorithm::AStar);
        let ida_star = solve(Algorithm::IdaStar);
        assert_eq!(a_star.cost, ida_star.cost);
    }
}

#[test_log::test]
fn test_cube_depth_limit() {
    let databases = small_databases();
    let scramble = "R U F".parse::<cube_core::cube::MoveSequence>().unwrap();
    let config = SearchConfig {
        max_expansions: None,
        max_depth: Some(2),
    };
    let space = CubeSpace::from_scramble(&scramble, &databases);
    let err = Solver::new(space, Algorithm::IdaStar)
        .with_config(config)
        .solve()
        .unwrap_err();
    assert_eq!(err, SearchError::DepthLimitExceeded(2));
}
