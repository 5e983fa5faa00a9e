#![warn(clippy::pedantic)]

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{OptionExt, eyre};
use cube_core::cube::MoveSequence;
use env_logger::TimestampPrecision;
use itertools::Itertools;
use log::{LevelFilter, info};
use pdb::{BuildConfig, Pattern, PatternDatabase, PdbBuilder, pattern_by_name};
use search::{
    Algorithm, SearchConfig, Solver,
    cube_space::CubeSpace,
    grid::{Cell, GridHeuristic, GridSpace},
    sliding_tiles::{Board, SlidingTiles},
};
use serde::Deserialize;
use std::{
    fs,
    io::BufWriter,
    path::{Path, PathBuf},
};

/// Settings that can be kept in a TOML file. Command line flags take
/// precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Config {
    build: BuildConfig,
    search: SearchConfig,
}

/// Builds Rubik's Cube pattern databases and solves puzzles with them
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// A configuration file with `[build]` and `[search]` tables, in TOML
    /// format.
    #[arg(long, short = 'c', value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (can be repeated)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate a pattern breadth-first and write its table
    Build {
        /// One of corner, corner_permutation, corner_orientation or
        /// edge_orientation
        pattern: String,
        /// Stop after this many moves from solved
        #[arg(long)]
        max_depth: Option<u8>,
        /// Where tables are kept. Defaults to the user cache directory.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Also dump whatever is left in the frontier to this file
        #[arg(long)]
        queue: Option<PathBuf>,
    },
    /// Summarize a table written by `build`
    Stats {
        pattern: String,
        /// Where tables are kept. Defaults to the user cache directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Solve a scrambled cube, e.g. "R U' F2"
    SolveCube {
        scramble: String,
        /// Tables to take the heuristic from. Missing tables are built.
        #[arg(
            long = "pattern",
            default_values = ["corner_orientation", "edge_orientation", "corner_permutation"]
        )]
        patterns: Vec<String>,
        /// Where tables are kept. Defaults to the user cache directory.
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = AlgorithmArg::Ida)]
        algorithm: AlgorithmArg,
        /// The heuristic weight of weighted A*
        #[arg(long, default_value_t = 1.5)]
        weight: f64,
    },
    /// Solve a sliding tile puzzle given row-major with 0 for the blank
    SolveTiles {
        tiles: Vec<u8>,
        /// Solve a random board of this width instead
        #[arg(long, conflicts_with = "tiles")]
        random: Option<usize>,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, value_enum, default_value_t = AlgorithmArg::AStar)]
        algorithm: AlgorithmArg,
        /// The heuristic weight of weighted A*
        #[arg(long, default_value_t = 1.5)]
        weight: f64,
    },
    /// Walk from the top left to the bottom right of a randomly obstructed
    /// grid
    SolveGrid {
        #[arg(long)]
        width: usize,
        #[arg(long)]
        height: usize,
        #[arg(long, default_value_t = 0)]
        obstacles: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, value_enum, default_value_t = HeuristicArg::Manhattan)]
        heuristic: HeuristicArg,
        #[arg(long, value_enum, default_value_t = AlgorithmArg::AStar)]
        algorithm: AlgorithmArg,
        /// The heuristic weight of weighted A*
        #[arg(long, default_value_t = 1.5)]
        weight: f64,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum AlgorithmArg {
    AStar,
    Weighted,
    Greedy,
    Ida,
}

impl AlgorithmArg {
    fn with_weight(self, weight: f64) -> Algorithm {
        match self {
            AlgorithmArg::AStar => Algorithm::AStar,
            AlgorithmArg::Weighted => Algorithm::WeightedAStar(weight),
            AlgorithmArg::Greedy => Algorithm::GreedyBestFirst,
            AlgorithmArg::Ida => Algorithm::IdaStar,
        }
    }
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum HeuristicArg {
    Manhattan,
    Euclidean,
}

impl From<HeuristicArg> for GridHeuristic {
    fn from(heuristic: HeuristicArg) -> Self {
        match heuristic {
            HeuristicArg::Manhattan => GridHeuristic::Manhattan,
            HeuristicArg::Euclidean => GridHeuristic::Euclidean,
        }
    }
}

fn load_config(path: Option<&Path>) -> color_eyre::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let config = toml::from_str::<Config>(&fs::read_to_string(path)?)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

fn table_dir(out: Option<PathBuf>) -> color_eyre::Result<PathBuf> {
    match out {
        Some(out) => Ok(out),
        None => {
            let mut cache = dirs::cache_dir().ok_or_eyre("No cache directory, pass --out")?;
            cache.push("pdbsearch");
            Ok(cache)
        }
    }
}

fn print_histogram<P: Pattern>(database: &PatternDatabase<P>) {
    println!(
        "{}: {} of {} ranks reached",
        database.pattern().name(),
        database.visited_count(),
        database.len()
    );
    for (depth, count) in database.depth_histogram().into_iter().enumerate() {
        println!("{depth:>3} {count:>12}");
    }
}

/// Loads the table for `name` from `dir`, building and writing it first if
/// it is not there yet.
fn load_or_build(
    name: &str,
    dir: &Path,
    build_config: &BuildConfig,
) -> color_eyre::Result<PatternDatabase<Box<dyn Pattern>>> {
    let pattern = pattern_by_name(name)?;
    let path = dir.join(PatternDatabase::file_name(&pattern));
    if path.exists() {
        return Ok(PatternDatabase::load(pattern, &path)?);
    }
    info!("No table at {}, building it", path.display());
    let database = pdb::build(pattern, build_config.clone())?;
    database.export(dir)?;
    Ok(database)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Build {
            pattern,
            max_depth,
            out,
            queue,
        } => {
            let build_config = BuildConfig {
                max_depth: max_depth.or(config.build.max_depth),
                ..config.build
            };
            let mut builder = PdbBuilder::new(pattern_by_name(&pattern)?, build_config)?;
            builder.run()?;
            if let Some(queue) = queue {
                builder.export_queue(BufWriter::new(fs::File::create(&queue)?))?;
                info!("Wrote the frontier to {}", queue.display());
            }
            let database = builder.into_database();
            let path = database.export(&table_dir(out)?)?;
            print_histogram(&database);
            println!("Written to {}", path.display());
        }
        Commands::Stats { pattern, out } => {
            let pattern = pattern_by_name(&pattern)?;
            let path = table_dir(out)?.join(PatternDatabase::file_name(&pattern));
            let database = PatternDatabase::load(pattern, &path)?;
            print_histogram(&database);
        }
        Commands::SolveCube {
            scramble,
            patterns,
            out,
            algorithm,
            weight,
        } => {
            let scramble = scramble.parse::<MoveSequence>()?;
            let dir = table_dir(out)?;
            let databases = patterns
                .iter()
                .map(|name| load_or_build(name, &dir, &config.build))
                .collect::<color_eyre::Result<Vec<_>>>()?;
            let space = CubeSpace::from_scramble(&scramble, &databases);
            let solution = Solver::new(space, algorithm.with_weight(weight))
                .with_config(config.search)
                .solve()?;
            println!(
                "{} ({} moves, {} expansions)",
                MoveSequence(solution.actions),
                solution.cost,
                solution.expanded
            );
        }
        Commands::SolveTiles {
            tiles,
            random,
            seed,
            algorithm,
            weight,
        } => {
            let board = match random {
                Some(width) => {
                    Board::random_solvable(width, &mut fastrand::Rng::with_seed(seed))?
                }
                None if tiles.is_empty() => return Err(eyre!("Pass the tiles or --random")),
                None => Board::new(tiles)?,
            };
            println!("{board}");
            let space = SlidingTiles::new(board)?;
            let solution = Solver::new(space, algorithm.with_weight(weight))
                .with_config(config.search)
                .solve()?;
            println!(
                "{} ({} slides, {} expansions)",
                solution.actions.iter().join(" "),
                solution.cost,
                solution.expanded
            );
        }
        Commands::SolveGrid {
            width,
            height,
            obstacles,
            seed,
            heuristic,
            algorithm,
            weight,
        } => {
            let start = Cell::new(0, 0);
            let goal = Cell::new(width.saturating_sub(1), height.saturating_sub(1));
            let mut rng = fastrand::Rng::with_seed(seed);
            let grid = GridSpace::random(width, height, obstacles, start, goal, &mut rng)?
                .with_heuristic(heuristic.into());
            let solution = Solver::new(grid, algorithm.with_weight(weight))
                .with_config(config.search)
                .solve()?;
            println!(
                "{} ({} steps, {} expansions)",
                solution.actions.iter().join(""),
                solution.cost,
                solution.expanded
            );
        }
    }

    Ok(())
}
