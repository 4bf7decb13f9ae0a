use std::fmt::{Debug, Formatter};

use bit_set::BitSet;
use smallvec::SmallVec;

use crate::word_list::Word;
use crate::{Direction, GlyphId, GridCoord, SlotId, WordId, MAX_SLOT_LENGTH};

/// Cell indices (within a slot) whose letter domain changed as the result of an operation.
pub type ChangedCells = SmallVec<[usize; MAX_SLOT_LENGTH]>;

/// For each cell, how many remaining candidates put each glyph there.
type GlyphCountsByCell = SmallVec<[Vec<u32>; MAX_SLOT_LENGTH]>;

/// A struct tracking the live state of a single slot during filling: where it sits in the grid,
/// which words it could still hold, and which letters that leaves possible in each of its cells.
///
/// `words` arguments are always the word list's bucket for this slot's length; candidate ids index
/// into it.
#[derive(Clone)]
pub struct Slot {
    id: SlotId,
    direction: Direction,
    cells: SmallVec<[GridCoord; MAX_SLOT_LENGTH]>,

    /// The words still available for this slot.
    candidates: BitSet,

    /// Cached `candidates.len()`, which would otherwise cost a scan over the whole bit set.
    candidate_count: usize,

    /// To keep `letter_domains` exact without rescanning every candidate, we maintain a count of
    /// the number of instances of each glyph in each cell in our remaining candidates. A glyph is
    /// in a cell's domain exactly when its count there is nonzero.
    glyph_counts_by_cell: GlyphCountsByCell,
    letter_domains: SmallVec<[BitSet; MAX_SLOT_LENGTH]>,
}

impl Debug for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot")
            .field("id", &self.id)
            .field("direction", &self.direction)
            .field("start_cell", &self.cells[0])
            .field("length", &self.cells.len())
            .field("candidate_count", &self.candidate_count)
            .finish()
    }
}

impl Slot {
    /// Create a slot over `cells` whose candidates are `candidates`, using `glyph_count` (the size
    /// of the word list's glyph table) to size the per-cell counts.
    pub fn new(
        id: SlotId,
        direction: Direction,
        cells: SmallVec<[GridCoord; MAX_SLOT_LENGTH]>,
        candidates: BitSet,
        words: &[Word],
        glyph_count: usize,
    ) -> Slot {
        let length = cells.len();
        let mut slot = Slot {
            id,
            direction,
            cells,
            candidate_count: 0,
            candidates: BitSet::with_capacity(words.len()),
            glyph_counts_by_cell: (0..length).map(|_| vec![0; glyph_count]).collect(),
            letter_domains: (0..length).map(|_| BitSet::with_capacity(glyph_count)).collect(),
        };

        for word_id in &candidates {
            slot.add_candidate(words, word_id);
        }

        slot
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn cells(&self) -> &[GridCoord] {
        &self.cells
    }

    pub fn start_cell(&self) -> GridCoord {
        self.cells[0]
    }

    pub fn length(&self) -> usize {
        self.cells.len()
    }

    pub fn candidates(&self) -> &BitSet {
        &self.candidates
    }

    pub fn candidate_count(&self) -> usize {
        self.candidate_count
    }

    pub fn has_candidate(&self, word_id: WordId) -> bool {
        self.candidates.contains(word_id)
    }

    /// The letters still possible in the given cell.
    pub fn letter_domain(&self, cell_idx: usize) -> &BitSet {
        &self.letter_domains[cell_idx]
    }

    pub fn letter_domains(&self) -> &[BitSet] {
        &self.letter_domains
    }

    /// The size of each cell's letter domain, for cheaply detecting which cells an operation
    /// narrowed. Domains only ever shrink, so a changed domain is a smaller one.
    pub fn letter_domain_sizes(&self) -> SmallVec<[usize; MAX_SLOT_LENGTH]> {
        self.letter_domains.iter().map(BitSet::len).collect()
    }

    pub fn is_resolved(&self) -> bool {
        self.candidate_count == 1
    }

    /// The chosen word, once this slot is down to a single candidate.
    pub fn resolved_word_id(&self) -> Option<WordId> {
        if self.is_resolved() {
            self.candidates.iter().next()
        } else {
            None
        }
    }

    fn add_candidate(&mut self, words: &[Word], word_id: WordId) {
        if !self.candidates.insert(word_id) {
            return;
        }
        self.candidate_count += 1;

        for (cell_idx, &glyph) in words[word_id].glyphs.iter().enumerate() {
            self.glyph_counts_by_cell[cell_idx][glyph] += 1;
            self.letter_domains[cell_idx].insert(glyph);
        }
    }

    /// Drop a candidate, updating the glyph counts and removing any letter that no remaining
    /// candidate places in its cell. Returns whether the word was a candidate.
    fn remove_candidate(&mut self, words: &[Word], word_id: WordId, changed: &mut ChangedCells) -> bool {
        if !self.candidates.remove(word_id) {
            return false;
        }
        self.candidate_count -= 1;

        for (cell_idx, &glyph) in words[word_id].glyphs.iter().enumerate() {
            let count = &mut self.glyph_counts_by_cell[cell_idx][glyph];
            *count -= 1;
            if *count == 0 {
                self.letter_domains[cell_idx].remove(glyph);
                if !changed.contains(&cell_idx) {
                    changed.push(cell_idx);
                }
            }
        }

        true
    }

    /// Remove every candidate whose letter at `cell_idx` matches `excluded`.
    fn remove_where(&mut self, words: &[Word], cell_idx: usize, excluded: impl Fn(GlyphId) -> bool) -> ChangedCells {
        let doomed: Vec<WordId> = self
            .candidates
            .iter()
            .filter(|&word_id| excluded(words[word_id].glyphs[cell_idx]))
            .collect();

        let mut changed = ChangedCells::new();
        for word_id in doomed {
            self.remove_candidate(words, word_id, &mut changed);
        }
        changed.sort_unstable();
        changed
    }

    /// Remove every candidate with `glyph` at `cell_idx`.
    pub fn narrow(&mut self, words: &[Word], cell_idx: usize, glyph: GlyphId) -> ChangedCells {
        self.remove_where(words, cell_idx, |g| g == glyph)
    }

    /// Remove every candidate whose glyph at `cell_idx` is in `glyphs`. Equivalent to calling
    /// `narrow` once per glyph, but makes a single pass over the candidates.
    pub fn narrow_all(&mut self, words: &[Word], cell_idx: usize, glyphs: &BitSet) -> ChangedCells {
        if glyphs.is_empty() {
            return ChangedCells::new();
        }
        self.remove_where(words, cell_idx, |g| glyphs.contains(g))
    }

    /// Collapse this slot's candidates to exactly `word_id`, returning the cells that previously
    /// allowed more than one letter.
    pub fn commit(&mut self, words: &[Word], word_id: WordId) -> ChangedCells {
        if !self.candidates.contains(word_id) {
            panic!("Committing slot {} to word {} which isn't a candidate", self.id, word_id);
        }

        let changed: ChangedCells = (0..self.length())
            .filter(|&cell_idx| self.letter_domains[cell_idx].len() > 1)
            .collect();

        self.candidates.clear();
        self.candidate_count = 0;
        for (counts, domain) in self.glyph_counts_by_cell.iter_mut().zip(&mut self.letter_domains) {
            counts.iter_mut().for_each(|count| *count = 0);
            domain.clear();
        }
        self.add_candidate(words, word_id);

        changed
    }

    /// Remove exactly `word_id` from the candidates, returning the cells whose letter domain lost
    /// a letter as a result.
    pub fn retract(&mut self, words: &[Word], word_id: WordId) -> ChangedCells {
        let mut changed = ChangedCells::new();
        if !self.remove_candidate(words, word_id, &mut changed) {
            panic!("Retracting word {} from slot {} but it isn't a candidate", word_id, self.id);
        }
        changed.sort_unstable();
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word_list::WordList;
    use smallvec::smallvec;

    fn three_letter_words() -> WordList {
        WordList::from_words(["cat", "car", "cop", "top", "ton", "pot"])
    }

    fn full_slot(word_list: &WordList) -> Slot {
        let words = word_list.words(3);
        Slot::new(
            0,
            Direction::Across,
            smallvec![(0, 0), (1, 0), (2, 0)],
            (0..words.len()).collect(),
            words,
            word_list.glyphs.len(),
        )
    }

    fn letters(word_list: &WordList, domain: &BitSet) -> String {
        let mut chars: Vec<char> = domain.iter().map(|g| word_list.glyph(g)).collect();
        chars.sort();
        chars.into_iter().collect()
    }

    /// The letter domains recomputed from scratch from the candidates.
    fn projected_domains(slot: &Slot, words: &[Word]) -> Vec<BitSet> {
        (0..slot.length())
            .map(|cell_idx| slot.candidates().iter().map(|w| words[w].glyphs[cell_idx]).collect())
            .collect()
    }

    fn assert_domains_consistent(slot: &Slot, words: &[Word]) {
        let projected = projected_domains(slot, words);
        for (cell_idx, domain) in slot.letter_domains().iter().enumerate() {
            let actual: Vec<usize> = domain.iter().collect();
            let expected: Vec<usize> = projected[cell_idx].iter().collect();
            assert_eq!(actual, expected, "letter domain mismatch in cell {}", cell_idx);
        }
        assert_eq!(slot.candidate_count(), slot.candidates().len());
    }

    #[test]
    fn test_initial_domains() {
        let word_list = three_letter_words();
        let slot = full_slot(&word_list);

        assert_eq!(slot.candidate_count(), 6);
        assert_eq!(letters(&word_list, slot.letter_domain(0)), "cpt");
        assert_eq!(letters(&word_list, slot.letter_domain(1)), "ao");
        assert_eq!(letters(&word_list, slot.letter_domain(2)), "nprt");
        assert_domains_consistent(&slot, word_list.words(3));
    }

    #[test]
    fn test_narrow_removes_matching_words() {
        let word_list = three_letter_words();
        let words = word_list.words(3);
        let mut slot = full_slot(&word_list);

        let changed = slot.narrow(words, 0, word_list.glyph_id('c').unwrap());

        assert_eq!(slot.candidate_count(), 3);
        assert_eq!(letters(&word_list, slot.letter_domain(0)), "pt");
        assert_eq!(letters(&word_list, slot.letter_domain(1)), "o");
        // Cell 2 still allows "p" (top), "n" (ton) and "t" (pot); only "r" disappeared.
        assert_eq!(letters(&word_list, slot.letter_domain(2)), "npt");
        assert_eq!(changed.as_slice(), &[0, 1, 2]);
        assert_domains_consistent(&slot, words);

        // Narrowing by a letter nobody uses is a no-op.
        let changed = slot.narrow(words, 1, word_list.glyph_id('a').unwrap());
        assert!(changed.is_empty());
        assert_eq!(slot.candidate_count(), 3);
    }

    #[test]
    fn test_narrow_all_matches_repeated_narrow() {
        let word_list = three_letter_words();
        let words = word_list.words(3);
        let excluded: BitSet = ['p', 't'].iter().map(|&c| word_list.glyph_id(c).unwrap()).collect();

        let mut batched = full_slot(&word_list);
        batched.narrow_all(words, 2, &excluded);

        let mut one_by_one = full_slot(&word_list);
        for glyph in &excluded {
            one_by_one.narrow(words, 2, glyph);
        }

        let batched_words: Vec<usize> = batched.candidates().iter().collect();
        let one_by_one_words: Vec<usize> = one_by_one.candidates().iter().collect();
        assert_eq!(batched_words, one_by_one_words);
        assert_domains_consistent(&batched, words);
    }

    #[test]
    fn test_commit_reports_cells_that_had_choices() {
        let word_list = three_letter_words();
        let words = word_list.words(3);
        let mut slot = full_slot(&word_list);
        slot.narrow(words, 0, word_list.glyph_id('p').unwrap());
        slot.narrow(words, 0, word_list.glyph_id('t').unwrap());
        // Left with cat, car, cop: cell 0 is already fixed to "c".

        let (_, cop) = word_list.find("cop").unwrap();
        let changed = slot.commit(words, cop);

        assert_eq!(changed.as_slice(), &[1, 2]);
        assert!(slot.is_resolved());
        assert_eq!(slot.resolved_word_id(), Some(cop));
        assert_domains_consistent(&slot, words);
    }

    #[test]
    #[should_panic]
    fn test_commit_to_non_candidate_panics() {
        let word_list = three_letter_words();
        let words = word_list.words(3);
        let mut slot = full_slot(&word_list);
        slot.narrow(words, 0, word_list.glyph_id('c').unwrap());

        let (_, cat) = word_list.find("cat").unwrap();
        slot.commit(words, cat);
    }

    #[test]
    fn test_retract_reports_lost_letters() {
        let word_list = three_letter_words();
        let words = word_list.words(3);
        let mut slot = full_slot(&word_list);

        let (_, car) = word_list.find("car").unwrap();
        let changed = slot.retract(words, car);
        // "r" only appeared in car.
        assert_eq!(changed.as_slice(), &[2]);

        let (_, cat) = word_list.find("cat").unwrap();
        let changed = slot.retract(words, cat);
        // "a" is gone from cell 1, but pot still ends in "t".
        assert_eq!(changed.as_slice(), &[1]);
        assert_domains_consistent(&slot, words);
        assert!(!slot.has_candidate(cat));
    }

    #[test]
    #[should_panic]
    fn test_retracting_twice_panics() {
        let word_list = three_letter_words();
        let words = word_list.words(3);
        let mut slot = full_slot(&word_list);

        let (_, ton) = word_list.find("ton").unwrap();
        slot.retract(words, ton);
        slot.retract(words, ton);
    }

    #[test]
    fn test_candidates_only_shrink() {
        let word_list = three_letter_words();
        let words = word_list.words(3);
        let mut slot = full_slot(&word_list);
        let mut last_count = slot.candidate_count();

        for (cell_idx, c) in [(2, 'p'), (1, 'z'), (0, 't'), (2, 'r')] {
            if let Some(glyph) = word_list.glyph_id(c) {
                slot.narrow(words, cell_idx, glyph);
            }
            assert!(slot.candidate_count() <= last_count);
            assert_domains_consistent(&slot, words);
            last_count = slot.candidate_count();
        }

        while let Some(word_id) = slot.candidates().iter().next() {
            slot.retract(words, word_id);
            assert!(slot.candidate_count() < last_count);
            assert_domains_consistent(&slot, words);
            last_count = slot.candidate_count();
        }
        assert!(slot.letter_domains().iter().all(BitSet::is_empty));
    }
}
