//! Numbering a filled grid and pairing each answer with one of its clues from the word list.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::grid::Grid;
use crate::{Direction, GridCoord};

/// One numbered entry of a finished puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Clue {
    pub number: usize,
    pub direction: Direction,
    pub start: GridCoord,
    pub answer: String,

    /// `None` when the word list had no clue for this answer.
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Clues {
    pub across: Vec<Clue>,
    pub down: Vec<Clue>,
}

/// Number every cell that starts a slot, scanning row by row. A cell starting both an across and a
/// down slot gets a single number.
fn number_cells(grid: &Grid) -> HashMap<GridCoord, usize> {
    let mut numbers = HashMap::new();

    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let starts_slot = Direction::ALL
                .iter()
                .any(|&direction| grid.slot_starting_at((x, y), direction).is_some());
            if starts_slot {
                let next = numbers.len() + 1;
                numbers.insert((x, y), next);
            }
        }
    }

    numbers
}

/// Build the numbered clue lists for a complete grid, choosing one of each answer's clues at
/// random. Returns `None` if any slot is still undecided.
pub fn match_clues<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Option<Clues> {
    if !grid.is_complete() {
        return None;
    }

    let numbers = number_cells(grid);
    let mut clues = Clues::default();

    for slot in grid.slots() {
        let word = grid.resolved_word(slot.id())?;
        let clue = Clue {
            number: numbers[&slot.start_cell()],
            direction: slot.direction(),
            start: slot.start_cell(),
            answer: word.string.clone(),
            text: word.clues.choose(rng).cloned(),
        };

        match slot.direction() {
            Direction::Across => clues.across.push(clue),
            Direction::Down => clues.down.push(clue),
        }
    }

    // Down slots are laid out column by column, but clues read row by row.
    clues.down.sort_by_key(|clue| (clue.start.1, clue.start.0));

    Some(clues)
}
