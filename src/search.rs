//! Backtracking search over a grid's slots.
//!
//! At each node we propagate, pick the unresolved slot with the fewest candidates, and try a
//! random candidate in a copy of the grid. If nothing under that choice works, the word is struck
//! from the slot in the original grid and the search continues from there. Copies are never
//! shared, so a failed branch can't leave anything behind in its parent.

use std::collections::HashSet;
use std::mem;
use std::ops::ControlFlow;

use rand::Rng;

use crate::grid::Grid;
use crate::propagate::{propagate, Contradiction, SearchQueue};
use crate::slot::Slot;
use crate::{SlotId, WordId};

/// Hooks for watching (and optionally cutting short) a search. Every method has a no-op default,
/// and `()` is the observer that does nothing at all.
pub trait SearchObserver {
    /// Called once for every search state, before propagating. `depth` is the number of choices
    /// currently in effect. Returning `Break` abandons the search, which then reports `Failed`.
    fn on_state(&mut self, _grid: &Grid, _depth: usize) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// A word is about to be tried in a slot.
    fn on_branch(&mut self, _slot_id: SlotId, _word_id: WordId, _depth: usize) {}

    /// Everything under a choice failed, so the word is being removed from the slot.
    fn on_backtrack(&mut self, _slot_id: SlotId, _word_id: WordId, _depth: usize) {}

    /// Some slot ran out of candidates.
    fn on_contradiction(&mut self, _contradiction: Contradiction) {}
}

impl SearchObserver for () {}

/// How a search ended.
#[derive(Debug)]
pub enum SearchOutcome<'a> {
    /// Every slot holds exactly one word.
    Complete(Grid<'a>),
    /// No fill exists under the starting state (or the observer stopped the search).
    Failed,
}

impl<'a> SearchOutcome<'a> {
    pub fn into_grid(self) -> Option<Grid<'a>> {
        match self {
            SearchOutcome::Complete(grid) => Some(grid),
            SearchOutcome::Failed => None,
        }
    }
}

/// A point where we tried `word_id` in `slot_id`, along with the grid as it was beforehand.
struct Branch<'a> {
    parent: Grid<'a>,
    slot_id: SlotId,
    word_id: WordId,
}

/// Search for a fill of `grid`, starting by propagating from the slots in `queue`. To solve a
/// fresh grid, queue every slot.
///
/// Each branch point keeps its parent grid on an explicit stack rather than on the call stack, so
/// long chains of retractions can't overflow it.
pub fn solve<'a, R, O>(
    grid: Grid<'a>,
    queue: SearchQueue,
    rng: &mut R,
    observer: &mut O,
) -> SearchOutcome<'a>
    where
        R: Rng + ?Sized,
        O: SearchObserver + ?Sized,
{
    // There's nothing to fill, which we don't count as a puzzle.
    if grid.slots().is_empty() {
        return SearchOutcome::Failed;
    }

    let mut grid = grid;
    let mut queue = queue;
    let mut branches: Vec<Branch<'a>> = vec![];

    loop {
        if observer.on_state(&grid, branches.len()).is_break() {
            return SearchOutcome::Failed;
        }

        let next_slot = propagate(&mut grid, &mut queue).and_then(|()| select_slot(&grid));
        let contradiction = match next_slot {
            Ok(None) => return SearchOutcome::Complete(grid),
            Ok(Some(slot_id)) => {
                let word_id = choose_word(grid.slot(slot_id), rng);
                observer.on_branch(slot_id, word_id, branches.len());
                log::trace!(
                    "Trying {:?} in slot {} at depth {}",
                    grid.words_for(slot_id)[word_id].string,
                    slot_id,
                    branches.len(),
                );

                let mut child = grid.clone();
                queue = enter_branch(&mut child, slot_id, word_id);
                let parent = mem::replace(&mut grid, child);
                branches.push(Branch { parent, slot_id, word_id });
                continue;
            }
            Err(contradiction) => contradiction,
        };
        observer.on_contradiction(contradiction);

        // This node is a dead end. Go back to the most recent branch point and strike the word we
        // tried there; the resulting grid is then searched like any other node.
        let Some(Branch { mut parent, slot_id, word_id }) = branches.pop() else {
            return SearchOutcome::Failed;
        };
        observer.on_backtrack(slot_id, word_id, branches.len());
        log::trace!("Backtracking slot {} at depth {}", slot_id, branches.len());

        queue = parent.retract(slot_id, word_id).into_iter().collect();
        if parent.slot(slot_id).candidate_count() == 0 {
            queue.push_front(slot_id);
        }
        grid = parent;
    }
}

/// Choose the slot to branch on: the unresolved one with the fewest candidates, breaking ties by
/// lowest slot id (across before down, then by position). Returns `None` once every slot is
/// resolved.
///
/// Branching strikes each chosen word from every other slot, but slots can also be resolved by
/// propagation or by pre-filled letters. Two resolved slots holding the same word, or a slot with
/// no candidates at all, mean this node can't be filled.
fn select_slot(grid: &Grid) -> Result<Option<SlotId>, Contradiction> {
    let mut used_words: HashSet<(usize, WordId)> = HashSet::new();

    for slot in grid.slots() {
        if slot.candidate_count() == 0 {
            return Err(Contradiction { slot_id: slot.id() });
        }
        if let Some(word_id) = slot.resolved_word_id() {
            if !used_words.insert((slot.length(), word_id)) {
                return Err(Contradiction { slot_id: slot.id() });
            }
        }
    }

    Ok(grid
        .slots()
        .iter()
        .filter(|slot| !slot.is_resolved())
        .min_by_key(|slot| (slot.candidate_count(), slot.id()))
        .map(Slot::id))
}

/// Pick one of the slot's candidates uniformly at random.
fn choose_word<R: Rng + ?Sized>(slot: &Slot, rng: &mut R) -> WordId {
    let idx = rng.gen_range(0..slot.candidate_count());
    slot.candidates()
        .iter()
        .nth(idx)
        .expect("Candidate count out of sync with candidates")
}

/// Commit `word_id` to the slot in a freshly cloned grid, strike the word from every other slot it
/// could otherwise appear in, and return the queue of slots that need re-propagating.
fn enter_branch(child: &mut Grid, slot_id: SlotId, word_id: WordId) -> SearchQueue {
    let mut queue: SearchQueue = child.commit(slot_id, word_id).into_iter().collect();
    let length = child.slot(slot_id).length();

    // Word ids are per length, so only slots of the same length can hold the same word.
    for other_slot_id in 0..child.slots().len() {
        let other = child.slot(other_slot_id);
        if other_slot_id == slot_id || other.length() != length || !other.has_candidate(word_id) {
            continue;
        }

        child.retract(other_slot_id, word_id);
        if child.slot(other_slot_id).candidate_count() == 0 {
            queue.push_front(other_slot_id);
        }
        queue.extend(child.crossing_slot_ids(other_slot_id));
    }

    queue
}
