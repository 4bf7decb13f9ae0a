use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;

use smallvec::SmallVec;

use crate::errors::Error;
use crate::{GlyphId, WordId, MAX_GLYPH_COUNT, MAX_SLOT_LENGTH};

/// A struct representing a word that can be chosen for a slot, along with whatever clues came
/// with it in the word list.
#[derive(Debug, Clone)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]>,
    pub clues: Vec<String>,
}

/// The vocabulary a grid is filled from: every word, bucketed by length, with each letter interned
/// as a glyph id so that slots can track letter domains as bit sets.
#[derive(Default)]
pub struct WordList {
    /// Every distinct char seen in any word, indexed by `GlyphId`.
    pub glyphs: SmallVec<[char; MAX_GLYPH_COUNT]>,
    glyph_ids_by_char: HashMap<char, GlyphId>,

    /// Words indexed by length, then by `WordId` within that length.
    words: Vec<Vec<Word>>,

    /// Where each normalized word string lives in `words`, so duplicates can be merged.
    word_locations: HashMap<String, (usize, WordId)>,
}

impl Debug for WordList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordList")
            .field("glyphs", &self.glyphs)
            .field("words", &format!("({} entries)", self.len()))
            .finish()
    }
}

/// Lower-case and trim a raw entry. Entries with interior whitespace can't go in a grid, since
/// every cell holds exactly one letter.
fn normalize(raw: &str) -> Option<String> {
    let word = raw.trim().to_lowercase();
    if word.is_empty() || word.chars().any(char::is_whitespace) {
        None
    } else {
        Some(word)
    }
}

impl WordList {
    pub fn new() -> WordList {
        WordList::default()
    }

    /// Build a word list from bare words, with no clues.
    pub fn from_words<I, S>(words: I) -> WordList
        where
            I: IntoIterator<Item=S>,
            S: AsRef<str>,
    {
        let mut word_list = WordList::new();
        for word in words {
            word_list.add_word(word.as_ref(), Vec::new());
        }
        word_list
    }

    /// Build a word list from `(word, clues)` pairs.
    pub fn from_entries<I, S>(entries: I) -> WordList
        where
            I: IntoIterator<Item=(S, Vec<String>)>,
            S: AsRef<str>,
    {
        let mut word_list = WordList::new();
        for (word, clues) in entries {
            word_list.add_word(word.as_ref(), clues);
        }
        word_list
    }

    /// Load a word list from a file, or from every file in a directory (in name order). Each
    /// non-empty line is a word optionally followed by tab-separated clues.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<WordList, Error> {
        let path = path.as_ref();
        let mut word_list = WordList::new();

        let metadata = fs::metadata(path).map_err(|e| Error::io(path, e))?;
        if metadata.is_dir() {
            let mut file_paths = vec![];
            for dir_entry in fs::read_dir(path).map_err(|e| Error::io(path, e))? {
                let file_path = dir_entry.map_err(|e| Error::io(path, e))?.path();
                if file_path.is_file() {
                    file_paths.push(file_path);
                }
            }
            file_paths.sort();

            for file_path in file_paths {
                word_list.load_file(&file_path)?;
            }
        } else {
            word_list.load_file(path)?;
        }

        log::debug!(
            "Loaded {} words ({} glyphs) from {}",
            word_list.len(),
            word_list.glyphs.len(),
            path.display(),
        );

        Ok(word_list)
    }

    fn load_file(&mut self, path: &Path) -> Result<(), Error> {
        let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        self.add_lines(&contents);
        Ok(())
    }

    /// Add every `word<TAB>clue<TAB>...` line in `contents`.
    pub fn add_lines(&mut self, contents: &str) {
        for line in contents.lines() {
            let mut fields = line.split('\t');
            let Some(word) = fields.next() else { continue };
            let clues = fields
                .map(str::trim)
                .filter(|clue| !clue.is_empty())
                .map(str::to_string)
                .collect();

            if self.add_word(word, clues).is_none() && !word.trim().is_empty() {
                log::debug!("Skipping unusable word list entry {:?}", word);
            }
        }
    }

    /// Add a word (normalized to lower case) and its clues, returning its length and id. A word
    /// that's already present keeps its id and gains any new clues. Returns `None` for entries
    /// that can't be placed in a grid.
    pub fn add_word(&mut self, raw: &str, clues: Vec<String>) -> Option<(usize, WordId)> {
        let string = normalize(raw)?;

        if let Some(&(length, word_id)) = self.word_locations.get(&string) {
            let existing = &mut self.words[length][word_id].clues;
            for clue in clues {
                if !existing.contains(&clue) {
                    existing.push(clue);
                }
            }
            return Some((length, word_id));
        }

        let glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]> =
            string.chars().map(|c| self.intern_glyph(c)).collect();
        let length = glyphs.len();

        if self.words.len() <= length {
            self.words.resize_with(length + 1, Vec::new);
        }
        let word_id = self.words[length].len();
        self.words[length].push(Word { string: string.clone(), glyphs, clues });
        self.word_locations.insert(string, (length, word_id));

        Some((length, word_id))
    }

    fn intern_glyph(&mut self, c: char) -> GlyphId {
        if let Some(&glyph_id) = self.glyph_ids_by_char.get(&c) {
            return glyph_id;
        }
        let glyph_id = self.glyphs.len();
        self.glyphs.push(c);
        self.glyph_ids_by_char.insert(c, glyph_id);
        glyph_id
    }

    /// All words of the given length. Lengths with no words give an empty slice.
    pub fn words(&self, length: usize) -> &[Word] {
        self.words.get(length).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn word(&self, length: usize, word_id: WordId) -> &Word {
        &self.words[length][word_id]
    }

    /// Look up a word by its (unnormalized) string.
    pub fn find(&self, raw: &str) -> Option<(usize, WordId)> {
        normalize(raw).and_then(|string| self.word_locations.get(&string).copied())
    }

    pub fn glyph_id(&self, c: char) -> Option<GlyphId> {
        self.glyph_ids_by_char.get(&c).copied()
    }

    pub fn glyph(&self, glyph_id: GlyphId) -> char {
        self.glyphs[glyph_id]
    }

    /// Total number of distinct words across all lengths.
    pub fn len(&self) -> usize {
        self.words.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
