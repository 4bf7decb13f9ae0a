use serde::Serialize;

pub mod clues;
pub mod errors;
pub mod export;
pub mod fill;
pub mod grid;
pub mod logging;
pub mod propagate;
pub mod render;
pub mod search;
pub mod shape;
pub mod slot;
pub mod word_list;

pub use errors::Error;
pub use fill::{find_fill, FillConfig, FillFailure, FillSuccess, Statistics};
pub use grid::Grid;
pub use render::render_grid;
pub use search::{solve, SearchObserver, SearchOutcome};
pub use shape::Shape;
pub use word_list::WordList;

/// The expected maximum number of distinct characters/rebuses/whatever appearing in a word list.
pub const MAX_GLYPH_COUNT: usize = 256;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

/// Runs of open cells shorter than this don't become slots. A lone open cell between two blocks
/// is just a cell, not a one-letter word.
pub const MIN_SLOT_LENGTH: usize = 2;

/// How many search states do we visit between checks of the deadline?
pub const INTERRUPT_FREQUENCY: u64 = 64;

/// An identifier for a given letter or whatever, based on its index in the WordList's `glyphs`
/// field.
pub type GlyphId = usize;

/// An identifier for a given slot, based on its index in the Grid's `slots` field.
pub type SlotId = usize;

/// An identifier for a given word, based on its index in the WordList's `words` field (within the
/// relevant length bucket).
pub type WordId = usize;

/// Zero-indexed x and y coords for a cell in the grid, where y = 0 in the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Across,
    Down,
}

impl Direction {
    /// Both directions, in the order slots are laid out in a grid.
    pub const ALL: [Direction; 2] = [Direction::Across, Direction::Down];

    /// The direction of any slot crossing a slot facing this way.
    pub fn other(self) -> Direction {
        match self {
            Direction::Across => Direction::Down,
            Direction::Down => Direction::Across,
        }
    }

    /// Index of this direction in per-cell `[_; 2]` tables.
    pub fn index(self) -> usize {
        match self {
            Direction::Across => 0,
            Direction::Down => 1,
        }
    }

    /// The coordinate `offset` cells along this direction from `start`.
    pub fn step(self, start: GridCoord, offset: usize) -> GridCoord {
        match self {
            Direction::Across => (start.0 + offset, start.1),
            Direction::Down => (start.0, start.1 + offset),
        }
    }
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and the location of the intersection within the other slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}
