//! The top-level entry point for filling a grid: seeds the random source, runs the search under a
//! deadline, and reports what happened.

use std::ops::ControlFlow;

use instant::{Duration, Instant};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::grid::Grid;
use crate::propagate::{Contradiction, SearchQueue};
use crate::search::{solve, SearchObserver, SearchOutcome};
use crate::{SlotId, WordId, INTERRUPT_FREQUENCY};

/// Settings for a single fill attempt.
#[derive(Debug, Clone, Default)]
pub struct FillConfig {
    /// Seed for the random source that picks words. Fills are reproducible for a given seed, word
    /// list, and shape; with no seed, each run draws a fresh one.
    pub seed: Option<u64>,

    /// Give up once this much time has passed.
    pub timeout: Option<Duration>,
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    pub states: u64,
    pub branches: u64,
    pub backtracks: u64,
    pub contradictions: u64,
    pub max_depth: usize,
    pub duration: Duration,
}

impl SearchObserver for Statistics {
    fn on_state(&mut self, _grid: &Grid, depth: usize) -> ControlFlow<()> {
        self.states += 1;
        self.max_depth = self.max_depth.max(depth);
        ControlFlow::Continue(())
    }

    fn on_branch(&mut self, _slot_id: SlotId, _word_id: WordId, _depth: usize) {
        self.branches += 1;
    }

    fn on_backtrack(&mut self, slot_id: SlotId, word_id: WordId, depth: usize) {
        self.backtracks += 1;
        log::debug!(
            "Backtrack #{}: striking word {} from slot {} at depth {}",
            self.backtracks,
            word_id,
            slot_id,
            depth,
        );
    }

    fn on_contradiction(&mut self, _contradiction: Contradiction) {
        self.contradictions += 1;
    }
}

/// Counts everything, and stops the search once the deadline passes. The clock is only read every
/// `INTERRUPT_FREQUENCY` states.
struct DeadlineObserver {
    statistics: Statistics,
    deadline: Option<Instant>,
    timed_out: bool,
}

impl SearchObserver for DeadlineObserver {
    fn on_state(&mut self, grid: &Grid, depth: usize) -> ControlFlow<()> {
        if self.statistics.on_state(grid, depth).is_break() {
            return ControlFlow::Break(());
        }

        if self.statistics.states % INTERRUPT_FREQUENCY == 0 {
            log::debug!(
                "{} states visited, {} options left to eliminate at depth {}",
                self.statistics.states,
                grid.total_remaining_options(),
                depth,
            );

            if let Some(deadline) = self.deadline {
                if Instant::now() > deadline {
                    self.timed_out = true;
                    return ControlFlow::Break(());
                }
            }
        }

        ControlFlow::Continue(())
    }

    fn on_branch(&mut self, slot_id: SlotId, word_id: WordId, depth: usize) {
        self.statistics.on_branch(slot_id, word_id, depth);
    }

    fn on_backtrack(&mut self, slot_id: SlotId, word_id: WordId, depth: usize) {
        self.statistics.on_backtrack(slot_id, word_id, depth);
    }

    fn on_contradiction(&mut self, contradiction: Contradiction) {
        self.statistics.on_contradiction(contradiction);
    }
}

/// A struct representing the results of a fill operation.
#[derive(Debug)]
pub struct FillSuccess<'a> {
    pub grid: Grid<'a>,
    pub statistics: Statistics,
}

#[derive(Debug, thiserror::Error)]
pub enum FillFailure {
    #[error("the grid has no slots to fill")]
    NoSlots,

    #[error("no fill exists for this grid and word list")]
    Exhausted(Statistics),

    #[error("timed out after {:?}", .0.duration)]
    Timeout(Statistics),
}

/// Search for a valid fill for the given grid.
pub fn find_fill<'a>(grid: Grid<'a>, config: &FillConfig) -> Result<FillSuccess<'a>, FillFailure> {
    if grid.slots().is_empty() {
        return Err(FillFailure::NoSlots);
    }

    let start = Instant::now();
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut observer = DeadlineObserver {
        statistics: Statistics::default(),
        deadline: config.timeout.map(|timeout| start + timeout),
        timed_out: false,
    };

    log::info!(
        "Filling a {}x{} grid with {} slots (seed: {:?})",
        grid.width(),
        grid.height(),
        grid.slots().len(),
        config.seed,
    );

    let queue: SearchQueue = (0..grid.slots().len()).collect();
    let outcome = solve(grid, queue, &mut rng, &mut observer);

    let DeadlineObserver { mut statistics, timed_out, .. } = observer;
    statistics.duration = start.elapsed();

    match outcome {
        SearchOutcome::Complete(grid) => {
            log::info!(
                "Found a fill after {} states and {} backtracks in {:?}",
                statistics.states,
                statistics.backtracks,
                statistics.duration,
            );
            Ok(FillSuccess { grid, statistics })
        }
        SearchOutcome::Failed if timed_out => {
            log::info!("Gave up after {} states in {:?}", statistics.states, statistics.duration);
            Err(FillFailure::Timeout(statistics))
        }
        SearchOutcome::Failed => {
            log::info!("No fill exists ({} states searched)", statistics.states);
            Err(FillFailure::Exhausted(statistics))
        }
    }
}
