use crate::{PatternDatabaseError, pattern::Pattern};
use cube_core::{cube::CubeState, math::ranking::RankingError, success};
use log::{info, warn};
use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Marks a rank the enumeration never reached.
pub const UNVISITED: u8 = u8::MAX;

/// A flat table of minimal move counts, one byte per rank of a [`Pattern`].
#[derive(Debug)]
pub struct PatternDatabase<P: Pattern> {
    pattern: P,
    table: Box<[u8]>,
}

impl<P: Pattern> PatternDatabase<P> {
    /// A table where every rank is [`UNVISITED`].
    ///
    /// # Errors
    ///
    /// If the pattern's rank space does not fit in memory.
    pub fn new_unvisited(pattern: P) -> Result<Self, PatternDatabaseError> {
        let space = pattern.rank_space();
        let len = usize::try_from(space)
            .map_err(|_| PatternDatabaseError::RankSpaceTooLarge(space))?;
        Ok(Self {
            pattern,
            table: vec![UNVISITED; len].into_boxed_slice(),
        })
    }

    pub fn pattern(&self) -> &P {
        &self.pattern
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The raw table, indexed by rank.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.table
    }

    fn index(&self, rank: u64) -> Result<usize, RankingError> {
        let space = self.table.len() as u64;
        match usize::try_from(rank) {
            Ok(index) if rank < space => Ok(index),
            _ => Err(RankingError::RankOutOfRange { rank, space }),
        }
    }

    /// The recorded depth of `rank`, or `None` if it was never reached.
    ///
    /// # Errors
    ///
    /// If `rank` is outside of the table.
    pub fn get(&self, rank: u64) -> Result<Option<u8>, RankingError> {
        let depth = self.table[self.index(rank)?];
        Ok((depth != UNVISITED).then_some(depth))
    }

    pub(crate) fn set(&mut self, rank: u64, depth: u8) -> Result<(), RankingError> {
        debug_assert_ne!(depth, UNVISITED);
        let index = self.index(rank)?;
        self.table[index] = depth;
        Ok(())
    }

    /// The recorded depth of the abstract state `state` projects to.
    ///
    /// # Errors
    ///
    /// If `state` cannot be ranked by the pattern.
    pub fn lookup(&self, state: &CubeState) -> Result<Option<u8>, PatternDatabaseError> {
        let rank = self.pattern.rank(state)?;
        Ok(self.get(rank)?)
    }

    /// A lower bound on the number of moves needed to solve `state`. Ranks
    /// that were never reached give zero.
    #[must_use]
    pub fn heuristic(&self, state: &CubeState) -> u8 {
        self.lookup(state).ok().flatten().unwrap_or(0)
    }

    /// The number of reached ranks.
    #[must_use]
    pub fn visited_count(&self) -> u64 {
        self.table.iter().filter(|&&depth| depth != UNVISITED).count() as u64
    }

    /// Whether every rank was reached. Tables built with a depth cap are
    /// not, and give weaker bounds.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.table.iter().all(|&depth| depth != UNVISITED)
    }

    /// The largest recorded depth.
    #[must_use]
    pub fn max_depth(&self) -> Option<u8> {
        self.table
            .iter()
            .copied()
            .filter(|&depth| depth != UNVISITED)
            .max()
    }

    /// How many ranks were recorded at each depth, indexed by depth.
    #[must_use]
    pub fn depth_histogram(&self) -> Vec<u64> {
        let mut histogram = vec![0; usize::from(self.max_depth().map_or(0, |depth| depth + 1))];
        for &depth in self.table.iter().filter(|&&depth| depth != UNVISITED) {
            histogram[usize::from(depth)] += 1;
        }
        histogram
    }

    /// The file name a table for `pattern` is stored under.
    #[must_use]
    pub fn file_name(pattern: &P) -> String {
        format!("{}_pdb.bin", pattern.name())
    }

    /// Writes the raw table to `<dir>/<name>_pdb.bin`, creating `dir` if
    /// needed, and returns the written path.
    ///
    /// # Errors
    ///
    /// On any I/O failure.
    pub fn export(&self, dir: &Path) -> Result<PathBuf, PatternDatabaseError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(Self::file_name(&self.pattern));
        let mut writer = BufWriter::new(fs::File::create(&path)?);
        writer.write_all(&self.table)?;
        writer.flush()?;
        info!(
            success!("Wrote {} entries to {}"),
            self.table.len(),
            path.display()
        );
        Ok(path)
    }

    /// Reads a table previously written by [`PatternDatabase::export`].
    ///
    /// # Errors
    ///
    /// On any I/O failure, or if the file's length is not the pattern's rank
    /// space.
    pub fn load(pattern: P, path: &Path) -> Result<Self, PatternDatabaseError> {
        let table = fs::read(path)?;
        let expected = pattern.rank_space();
        let found = table.len() as u64;
        if found != expected {
            return Err(PatternDatabaseError::SizeMismatch { expected, found });
        }
        info!(
            success!("Loaded {} {} entries from {}"),
            found,
            pattern.name(),
            path.display()
        );
        let database = Self {
            pattern,
            table: table.into_boxed_slice(),
        };
        if !database.is_complete() {
            warn!(
                "{} only reaches {} of {} ranks, it was probably built with a depth cap",
                path.display(),
                database.visited_count(),
                database.len()
            );
        }
        Ok(database)
    }
}
