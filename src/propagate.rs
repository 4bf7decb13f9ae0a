use std::collections::VecDeque;

use bit_set::BitSet;

use crate::grid::Grid;
use crate::SlotId;

/// Slots waiting to be checked against their crossings. Consumed front to back; a slot may appear
/// more than once.
pub type SearchQueue = VecDeque<SlotId>;

/// Returned when propagation empties a slot's candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contradiction {
    pub slot_id: SlotId,
}

/// Narrow every queued slot against the slots crossing it until nothing changes.
///
/// Each step only narrows the popped slot, never its crossings, but whenever a slot loses a letter
/// in some cell the slot crossing that cell goes back on the queue. Once the queue drains, every
/// queued slot and everything reachable from it agrees letter-for-letter with its crossings.
pub fn propagate(grid: &mut Grid, queue: &mut SearchQueue) -> Result<(), Contradiction> {
    while let Some(slot_id) = queue.pop_front() {
        let length = grid.slot(slot_id).length();
        let domain_sizes_before = grid.slot(slot_id).letter_domain_sizes();

        for cell_idx in 0..length {
            let Some(crossing) = grid.crossing(slot_id, cell_idx) else { continue };

            // Letters this slot allows here that the crossing slot doesn't.
            let mut to_remove: BitSet = grid.slot(slot_id).letter_domain(cell_idx).clone();
            to_remove.difference_with(
                grid.slot(crossing.other_slot_id).letter_domain(crossing.other_slot_cell),
            );

            grid.narrow_all(slot_id, cell_idx, &to_remove);
        }

        if grid.slot(slot_id).candidate_count() == 0 {
            queue.clear();
            return Err(Contradiction { slot_id });
        }

        let slot = grid.slot(slot_id);
        for cell_idx in 0..length {
            if slot.letter_domain(cell_idx).len() != domain_sizes_before[cell_idx] {
                if let Some(crossing) = grid.crossing(slot_id, cell_idx) {
                    queue.push_back(crossing.other_slot_id);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;
    use crate::word_list::WordList;
    use crate::MIN_SLOT_LENGTH;

    fn queue_all(grid: &Grid) -> SearchQueue {
        (0..grid.slots().len()).collect()
    }

    /// At a fixed point, the two slots sharing any cell allow exactly the same letters there.
    fn assert_arc_consistent(grid: &Grid) {
        for slot in grid.slots() {
            for cell_idx in 0..slot.length() {
                if let Some(crossing) = grid.crossing(slot.id(), cell_idx) {
                    let ours: Vec<usize> = slot.letter_domain(cell_idx).iter().collect();
                    let theirs: Vec<usize> = grid
                        .slot(crossing.other_slot_id)
                        .letter_domain(crossing.other_slot_cell)
                        .iter()
                        .collect();
                    assert_eq!(ours, theirs, "slot {} cell {}", slot.id(), cell_idx);
                }
            }
        }
    }

    #[test]
    fn test_propagation_reaches_consistency() {
        let word_list = WordList::from_words(["cat", "car", "cop", "top", "ton", "pot", "oat", "arc"]);
        let shape = Shape::from_template(
            "
            ...
            .##
            .##
            ",
        ).unwrap();
        let mut grid = Grid::new(&word_list, &shape, MIN_SLOT_LENGTH);
        let mut queue = queue_all(&grid);

        propagate(&mut grid, &mut queue).unwrap();

        assert!(queue.is_empty());
        assert_arc_consistent(&grid);
        // Every word here has a partner sharing its first letter, so nothing was ruled out.
        assert_eq!(grid.slot(0).candidate_count(), 8);
    }

    #[test]
    fn test_propagation_keeps_solutions_and_drops_dead_ends() {
        // A ring of four slots whose only fill is cat/ton across and cot/tin down. "dog" can't sit
        // in any slot: nothing ends in "d", and nothing starts with "g".
        let word_list = WordList::from_words(["cat", "ton", "cot", "tin", "dog"]);
        let shape = Shape::from_template(
            "
            ...
            .#.
            ...
            ",
        ).unwrap();
        let mut grid = Grid::new(&word_list, &shape, MIN_SLOT_LENGTH);
        let mut queue = queue_all(&grid);

        propagate(&mut grid, &mut queue).unwrap();

        assert_arc_consistent(&grid);
        let (_, dog) = word_list.find("dog").unwrap();
        assert!(grid.slots().iter().all(|slot| !slot.has_candidate(dog)));

        for (slot_id, word) in [(0, "cat"), (1, "ton"), (2, "cot"), (3, "tin")] {
            let (_, word_id) = word_list.find(word).unwrap();
            assert!(grid.slot(slot_id).has_candidate(word_id), "{} was dropped", word);
        }
    }

    #[test]
    fn test_propagation_detects_contradiction() {
        // Across words only start with "b"; down words only start with "a".
        let word_list = WordList::from_words(["bark", "beam", "arm", "ant"]);
        let shape = Shape::from_template(
            "
            ....
            .###
            .###
            ",
        ).unwrap();
        let mut grid = Grid::new(&word_list, &shape, MIN_SLOT_LENGTH);
        let mut queue = queue_all(&grid);

        let result = propagate(&mut grid, &mut queue);

        assert_eq!(result, Err(Contradiction { slot_id: 0 }));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_empty_slot_is_a_contradiction_even_without_crossings() {
        let word_list = WordList::from_words(["ab"]);
        let mut grid = Grid::new(&word_list, &Shape::open(3, 1), MIN_SLOT_LENGTH);
        let mut queue = queue_all(&grid);

        assert_eq!(propagate(&mut grid, &mut queue), Err(Contradiction { slot_id: 0 }));
    }

    #[test]
    fn test_only_changed_cells_requeue_crossings() {
        let word_list = WordList::from_words(["ab", "ba", "aa"]);
        let mut grid = Grid::new(&word_list, &Shape::open(2, 2), MIN_SLOT_LENGTH);
        let (_, ab) = word_list.find("ab").unwrap();

        // Fixing the top row to "ab" narrows only the slots crossing it.
        let mut queue: SearchQueue = grid.commit(0, ab).into_iter().collect();
        assert_eq!(queue, [2, 3]);
        propagate(&mut grid, &mut queue).unwrap();

        assert_arc_consistent(&grid);
        assert_eq!(grid.resolved_word(3).unwrap().string, "ba");
        // The bottom-left corner could still be "b" (ba/ab) or "a" (aa/aa).
        assert_eq!(grid.slot(1).candidate_count(), 2);
        assert_eq!(grid.slot(2).candidate_count(), 2);
    }
}
