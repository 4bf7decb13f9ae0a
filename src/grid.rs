use std::fmt::{Debug, Formatter};

use bit_set::BitSet;
use smallvec::SmallVec;

use crate::shape::{Cell, Shape};
use crate::slot::{ChangedCells, Slot};
use crate::word_list::{Word, WordList};
use crate::{Crossing, Direction, GlyphId, GridCoord, SlotId, WordId, MAX_SLOT_LENGTH};

/// Slot ids affected by an operation on another slot.
pub type AffectedSlots = SmallVec<[SlotId; MAX_SLOT_LENGTH]>;

/// The puzzle state for one node of the search tree: every slot with its live candidates, plus an
/// index from each cell to the slots running through it.
///
/// Cloning a grid copies every slot, so a clone can be narrowed freely without touching the
/// original. The word list is the only thing shared, and nothing mutates it.
#[derive(Clone)]
pub struct Grid<'a> {
    word_list: &'a WordList,
    width: usize,
    height: usize,

    /// Across slots first (by row, then column), then down slots (by column, then row). A slot's
    /// id is its index here.
    slots: Vec<Slot>,

    /// Row-major, one entry per cell: for each direction, the slot occupying the cell in that
    /// direction and the cell's position within it.
    crossing_index: Vec<[Option<Crossing>; 2]>,
}

impl Debug for Grid<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("slots", &self.slots)
            .finish()
    }
}

impl<'a> Grid<'a> {
    /// Derive a grid's slots from an occupancy shape. Every maximal run of open cells at least
    /// `min_slot_length` long becomes a slot, whose candidates are the words of its length that
    /// agree with any letters pre-filled in the shape.
    pub fn new(word_list: &'a WordList, shape: &Shape, min_slot_length: usize) -> Grid<'a> {
        let (width, height) = (shape.width(), shape.height());
        let glyph_count = word_list.glyphs.len();

        let mut slots: Vec<Slot> = vec![];
        let mut crossing_index: Vec<[Option<Crossing>; 2]> = vec![[None; 2]; width * height];

        for direction in Direction::ALL {
            for cells in shape.runs(direction, min_slot_length) {
                let slot_id = slots.len();
                let words = word_list.words(cells.len());

                // A pre-filled letter that appears nowhere in the word list can't match any word,
                // which leaves the slot without candidates.
                let required: SmallVec<[Option<Option<GlyphId>>; MAX_SLOT_LENGTH]> = cells
                    .iter()
                    .map(|&coord| match shape.cell(coord) {
                        Cell::Open(Some(letter)) => Some(word_list.glyph_id(letter)),
                        _ => None,
                    })
                    .collect();

                let candidates: BitSet = (0..words.len())
                    .filter(|&word_id| {
                        required.iter().zip(&words[word_id].glyphs).all(|(required, &glyph)| {
                            match required {
                                Some(required_glyph) => *required_glyph == Some(glyph),
                                None => true,
                            }
                        })
                    })
                    .collect();

                for (cell_idx, &(x, y)) in cells.iter().enumerate() {
                    crossing_index[y * width + x][direction.index()] = Some(Crossing {
                        other_slot_id: slot_id,
                        other_slot_cell: cell_idx,
                    });
                }

                slots.push(Slot::new(slot_id, direction, cells, candidates, words, glyph_count));
            }
        }

        log::debug!("Built {}x{} grid with {} slots", width, height, slots.len());

        Grid { word_list, width, height, slots, crossing_index }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, slot_id: SlotId) -> &Slot {
        &self.slots[slot_id]
    }

    /// The word list bucket that the given slot's candidate ids index into.
    pub fn words_for(&self, slot_id: SlotId) -> &'a [Word] {
        self.word_list.words(self.slots[slot_id].length())
    }

    /// The slot occupying `coord` in `direction`, and the cell's position within it. Panics if the
    /// coordinate is outside the grid.
    pub fn occupant(&self, (x, y): GridCoord, direction: Direction) -> Option<Crossing> {
        assert!(x < self.width && y < self.height, "({}, {}) is outside the grid", x, y);
        self.crossing_index[y * self.width + x][direction.index()]
    }

    /// The id of the slot occupying `coord` in `direction`, if any.
    pub fn slot_at(&self, coord: GridCoord, direction: Direction) -> Option<SlotId> {
        self.occupant(coord, direction).map(|occupant| occupant.other_slot_id)
    }

    /// The slot starting exactly at `coord` in `direction`, if any.
    pub fn slot_starting_at(&self, coord: GridCoord, direction: Direction) -> Option<SlotId> {
        self.occupant(coord, direction)
            .filter(|occupant| occupant.other_slot_cell == 0)
            .map(|occupant| occupant.other_slot_id)
    }

    /// The slot crossing the given slot at `cell_idx`, and where that cell falls in it.
    pub fn crossing(&self, slot_id: SlotId, cell_idx: usize) -> Option<Crossing> {
        let slot = &self.slots[slot_id];
        self.occupant(slot.cells()[cell_idx], slot.direction().other())
    }

    /// Every slot crossing the given one, in cell order.
    pub fn crossing_slot_ids(&self, slot_id: SlotId) -> AffectedSlots {
        (0..self.slots[slot_id].length())
            .filter_map(|cell_idx| self.crossing(slot_id, cell_idx))
            .map(|crossing| crossing.other_slot_id)
            .collect()
    }

    fn crossings_at(&self, slot_id: SlotId, changed: &ChangedCells) -> AffectedSlots {
        changed
            .iter()
            .filter_map(|&cell_idx| self.crossing(slot_id, cell_idx))
            .map(|crossing| crossing.other_slot_id)
            .collect()
    }

    /// Remove every candidate of the slot with `glyph` at `cell_idx`.
    pub fn narrow(&mut self, slot_id: SlotId, cell_idx: usize, glyph: GlyphId) -> ChangedCells {
        let words = self.words_for(slot_id);
        self.slots[slot_id].narrow(words, cell_idx, glyph)
    }

    /// Remove every candidate of the slot with any of `glyphs` at `cell_idx`.
    pub fn narrow_all(&mut self, slot_id: SlotId, cell_idx: usize, glyphs: &BitSet) -> ChangedCells {
        let words = self.words_for(slot_id);
        self.slots[slot_id].narrow_all(words, cell_idx, glyphs)
    }

    /// Fix the slot to `word_id`, returning the crossing slots whose shared cell had more than one
    /// possible letter before.
    pub fn commit(&mut self, slot_id: SlotId, word_id: WordId) -> AffectedSlots {
        let words = self.words_for(slot_id);
        let changed = self.slots[slot_id].commit(words, word_id);
        self.crossings_at(slot_id, &changed)
    }

    /// Remove `word_id` from the slot's candidates, returning the crossing slots whose shared cell
    /// lost a possible letter.
    pub fn retract(&mut self, slot_id: SlotId, word_id: WordId) -> AffectedSlots {
        let words = self.words_for(slot_id);
        let changed = self.slots[slot_id].retract(words, word_id);
        self.crossings_at(slot_id, &changed)
    }

    /// Is every slot down to exactly one word?
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Slot::is_resolved)
    }

    /// The word a slot resolved to, if it has.
    pub fn resolved_word(&self, slot_id: SlotId) -> Option<&'a Word> {
        self.slots[slot_id]
            .resolved_word_id()
            .map(|word_id| &self.words_for(slot_id)[word_id])
    }

    /// Is this cell part of any slot?
    pub fn is_covered(&self, coord: GridCoord) -> bool {
        Direction::ALL.iter().any(|&direction| self.occupant(coord, direction).is_some())
    }

    /// The glyph known to be in `coord`: the only letter some covering slot still allows there.
    pub fn glyph_at(&self, coord: GridCoord) -> Option<GlyphId> {
        Direction::ALL.iter().find_map(|&direction| {
            let occupant = self.occupant(coord, direction)?;
            let domain = self.slots[occupant.other_slot_id].letter_domain(occupant.other_slot_cell);
            if domain.len() == 1 {
                domain.iter().next()
            } else {
                None
            }
        })
    }

    pub fn letter_at(&self, coord: GridCoord) -> Option<char> {
        self.glyph_at(coord).map(|glyph| self.word_list.glyph(glyph))
    }

    /// The total number of candidates that still need to be eliminated before every slot is
    /// resolved. Useful as a progress measure.
    pub fn total_remaining_options(&self) -> usize {
        self.slots.iter().map(|slot| slot.candidate_count().saturating_sub(1)).sum()
    }
}
