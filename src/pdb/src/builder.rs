//! Breadth-first construction of a [`PatternDatabase`].
//!
//! The frontier is a FIFO of ranks rather than cube states. Each dequeued
//! rank is unranked back into a representative cube state, every move the
//! pruned move generator allows is applied to it, and each successor's rank
//! that is still unvisited is recorded one deeper and enqueued. Since the
//! queue is FIFO the first depth recorded for a rank is its minimal move
//! count from solved.

use crate::{PatternDatabaseError, UNVISITED, database::PatternDatabase, pattern::Pattern};
use cube_core::{
    cube::{CubeState, Move},
    move_pruning::MoveHistory,
    start, success, working,
};
use log::{debug, info};
use serde::Deserialize;
use std::{collections::VecDeque, io::Write, time::Instant};

/// Knobs for [`PdbBuilder`]. Neither affects the recorded depths, only how
/// far the enumeration goes and how chatty it is.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Stop expanding once the frontier reaches this depth. Ranks deeper
    /// than this stay [`UNVISITED`].
    pub max_depth: Option<u8>,
    /// Log a progress line after every this many expansions. Zero turns
    /// progress lines off.
    pub progress_interval: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            progress_interval: 1_000_000,
        }
    }
}

/// A rank waiting in the frontier, with the moves that led to it. Eight
/// bytes, so rank spaces must fit in a `u32`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrontierEntry {
    pub rank: u32,
    pub depth: u8,
    pub history: MoveHistory,
}

impl FrontierEntry {
    fn new(rank: u64, depth: u8, history: MoveHistory) -> Result<Self, PatternDatabaseError> {
        let rank = u32::try_from(rank).map_err(|_| PatternDatabaseError::RankSpaceTooLarge(rank))?;
        Ok(Self {
            rank,
            depth,
            history,
        })
    }
}

pub struct PdbBuilder<P: Pattern> {
    database: PatternDatabase<P>,
    queue: VecDeque<FrontierEntry>,
    config: BuildConfig,
    expanded: u64,
    layer: u8,
    layer_expanded: u64,
    layer_start: Instant,
}

impl<P: Pattern> PdbBuilder<P> {
    /// A builder whose frontier holds only the solved state at depth zero.
    ///
    /// # Errors
    ///
    /// If the pattern's rank space does not fit in memory or in a
    /// [`FrontierEntry`], or if the solved state cannot be ranked.
    pub fn new(pattern: P, config: BuildConfig) -> Result<Self, PatternDatabaseError> {
        let space = pattern.rank_space();
        if space > u64::from(u32::MAX) + 1 {
            return Err(PatternDatabaseError::RankSpaceTooLarge(space));
        }
        let mut database = PatternDatabase::new_unvisited(pattern)?;
        let rank = database.pattern().rank(&CubeState::solved())?;
        database.set(rank, 0)?;
        let queue = VecDeque::from([FrontierEntry::new(rank, 0, MoveHistory::default())?]);
        Ok(Self {
            database,
            queue,
            config,
            expanded: 0,
            layer: 0,
            layer_expanded: 0,
            layer_start: Instant::now(),
        })
    }

    pub fn database(&self) -> &PatternDatabase<P> {
        &self.database
    }

    /// The entries not yet expanded, front first.
    pub fn frontier(&self) -> impl Iterator<Item = &FrontierEntry> {
        self.queue.iter()
    }

    #[must_use]
    pub fn expanded(&self) -> u64 {
        self.expanded
    }

    fn is_capped(&self, entry: &FrontierEntry) -> bool {
        self.config
            .max_depth
            .is_some_and(|max_depth| entry.depth >= max_depth)
    }

    fn finish_layer(&mut self) {
        debug!(
            working!("Depth {} done: expanded {} ranks in {:.3}s"),
            self.layer,
            self.layer_expanded,
            self.layer_start.elapsed().as_secs_f64()
        );
        self.layer_expanded = 0;
        self.layer_start = Instant::now();
    }

    /// Dequeues and expands a single entry. Returns `false` once there is
    /// nothing left to expand, either because the frontier is empty or
    /// because its front reached the depth cap.
    ///
    /// # Errors
    ///
    /// If a state cannot be ranked or unranked, or if depths outgrow a table
    /// entry.
    pub fn expand_next(&mut self) -> Result<bool, PatternDatabaseError> {
        let Some(&entry) = self.queue.front() else {
            return Ok(false);
        };
        if self.is_capped(&entry) {
            return Ok(false);
        }
        self.queue.pop_front();
        if entry.depth != self.layer {
            self.finish_layer();
            self.layer = entry.depth;
        }

        let next_depth = entry.depth + 1;
        if next_depth == UNVISITED {
            return Err(PatternDatabaseError::DepthOverflow);
        }
        let state = self.database.pattern().unrank(u64::from(entry.rank))?;
        for m in entry.history.legal_moves().iter() {
            let rank = self.database.pattern().rank(&state.apply_move(m))?;
            let improves = self
                .database
                .get(rank)?
                .is_none_or(|recorded| next_depth < recorded);
            if improves {
                self.database.set(rank, next_depth)?;
                self.queue
                    .push_back(FrontierEntry::new(rank, next_depth, entry.history.push(m))?);
            }
        }

        self.expanded += 1;
        self.layer_expanded += 1;
        if self.expanded.is_multiple_of(self.config.progress_interval) {
            info!(
                working!("Expanded {} ranks at depth {}, {} queued"),
                self.expanded,
                entry.depth,
                self.queue.len()
            );
        }
        Ok(true)
    }

    /// Expands until [`PdbBuilder::expand_next`] has nothing left to do.
    ///
    /// # Errors
    ///
    /// See [`PdbBuilder::expand_next`].
    pub fn run(&mut self) -> Result<(), PatternDatabaseError> {
        info!(
            start!("Building the {} pattern database ({} entries)"),
            self.database.pattern().name(),
            self.database.len()
        );
        let start = Instant::now();
        while self.expand_next()? {}
        if self.layer_expanded != 0 {
            self.finish_layer();
        }
        info!(
            success!("Built the {} pattern database in {:.3}s: {} of {} ranks reached"),
            self.database.pattern().name(),
            start.elapsed().as_secs_f64(),
            self.database.visited_count(),
            self.database.len()
        );
        Ok(())
    }

    pub fn into_database(self) -> PatternDatabase<P> {
        self.database
    }

    /// Writes the frontier as text, one `rank depth last second_last` line
    /// per entry with `-` standing for a missing move.
    ///
    /// # Errors
    ///
    /// If writing fails.
    pub fn export_queue<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for entry in &self.queue {
            let show = |m: Option<Move>| m.map_or_else(|| "-".to_owned(), |m| format!("{m}"));
            writeln!(
                writer,
                "{} {} {} {}",
                entry.rank,
                entry.depth,
                show(entry.history.last()),
                show(entry.history.second_last())
            )?;
        }
        writer.flush()
    }
}

/// Builds the whole pattern database for `pattern`.
///
/// # Errors
///
/// See [`PdbBuilder::expand_next`].
pub fn build<P: Pattern>(
    pattern: P,
    config: BuildConfig,
) -> Result<PatternDatabase<P>, PatternDatabaseError> {
    let mut builder = PdbBuilder::new(pattern, config)?;
    builder.run()?;
    Ok(builder.into_database())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{CornerOrientationPattern, EdgeOrientationPattern};
    use cube_core::cube_move;

    #[test_log::test]
    fn test_new_builder_holds_solved() {
        let builder = PdbBuilder::new(CornerOrientationPattern, BuildConfig::default()).unwrap();
        assert_eq!(builder.database().get(0), Ok(Some(0)));
        assert_eq!(builder.database().visited_count(), 1);
        assert_eq!(
            builder.frontier().copied().collect::<Vec<_>>(),
            vec![FrontierEntry {
                rank: 0,
                depth: 0,
                history: MoveHistory::default(),
            }]
        );
    }

    #[test_log::test]
    fn test_first_expansion() {
        let mut builder =
            PdbBuilder::new(EdgeOrientationPattern, BuildConfig::default()).unwrap();
        assert!(builder.expand_next().unwrap());
        assert_eq!(builder.expanded(), 1);
        // F and F' flip the same four edges, as do B and B'. Half turns flip
        // nothing.
        assert_eq!(builder.frontier().count(), 2);
        let first = builder.frontier().next().unwrap();
        assert_eq!(first.depth, 1);
        assert_eq!(first.history.last(), Some(cube_move!(F, Normal)));
        assert_eq!(first.history.second_last(), None);
    }

    #[test_log::test]
    fn test_max_depth_leaves_frontier() {
        let config = BuildConfig {
            max_depth: Some(2),
            progress_interval: 10,
        };
        let mut builder = PdbBuilder::new(CornerOrientationPattern, config).unwrap();
        builder.run().unwrap();
        assert_eq!(builder.database().depth_histogram(), vec![1, 4, 34]);
        assert!(builder.frontier().all(|entry| entry.depth == 2));
        assert_eq!(builder.frontier().count(), 34);
        // Running again does nothing more
        assert!(!builder.expand_next().unwrap());
    }

    #[test_log::test]
    fn test_export_queue() {
        let mut builder =
            PdbBuilder::new(EdgeOrientationPattern, BuildConfig::default()).unwrap();
        let mut out = Vec::new();
        builder.export_queue(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0 0 - -\n");

        builder.expand_next().unwrap();
        let mut out = Vec::new();
        builder.export_queue(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" 1 F -"));
        assert!(lines[1].ends_with(" 1 B -"));
    }

    #[test]
    fn test_frontier_entries_are_compact() {
        assert_eq!(std::mem::size_of::<FrontierEntry>(), 8);
        assert!(matches!(
            FrontierEntry::new(1 << 32, 3, MoveHistory::default()),
            Err(PatternDatabaseError::RankSpaceTooLarge(_))
        ));
    }

    #[test]
    fn test_config_defaults() {
        let config = BuildConfig::default();
        assert_eq!(config.max_depth, None);
        assert_eq!(config.progress_interval, 1_000_000);
    }
}
