use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::clues::Clues;
use crate::errors::Error;
use crate::grid::Grid;

/// A finished puzzle in the shape it's written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Puzzle {
    pub author: String,
    pub width: usize,
    pub height: usize,

    /// `"<width>x<height>"`.
    pub size: String,

    /// One string per row, with `_` for any cell that isn't filled.
    pub grid: Vec<String>,

    pub clues: Clues,
}

impl Puzzle {
    pub fn new(grid: &Grid, clues: Clues, author: &str) -> Puzzle {
        let rows = (0..grid.height())
            .map(|y| {
                (0..grid.width())
                    .map(|x| grid.letter_at((x, y)).unwrap_or('_'))
                    .collect::<String>()
            })
            .collect();

        Puzzle {
            author: author.to_string(),
            width: grid.width(),
            height: grid.height(),
            size: format!("{}x{}", grid.width(), grid.height()),
            grid: rows,
            clues,
        }
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|e| Error::io(path, e))?;
        log::info!("Wrote puzzle to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clues::match_clues;
    use crate::shape::Shape;
    use crate::word_list::WordList;
    use crate::MIN_SLOT_LENGTH;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn filled_corner(word_list: &WordList) -> Grid {
        let shape = Shape::from_template(
            "
            ...
            .##
            .#.
            ",
        ).unwrap();
        let mut grid = Grid::new(word_list, &shape, MIN_SLOT_LENGTH);
        for (slot_id, word) in [(0, "cat"), (1, "cop")] {
            let (_, word_id) = word_list.find(word).unwrap();
            grid.commit(slot_id, word_id);
        }
        grid
    }

    #[test]
    fn test_puzzle_layout() {
        let word_list = WordList::from_entries([
            ("cat", vec!["Feline".to_string()]),
            ("cop", vec![]),
        ]);
        let grid = filled_corner(&word_list);
        let clues = match_clues(&grid, &mut StdRng::seed_from_u64(0)).unwrap();

        let puzzle = Puzzle::new(&grid, clues, "A. Setter");

        assert_eq!(puzzle.size, "3x3");
        // The open cell in the corner belongs to no slot, so it's left blank like the blocks.
        assert_eq!(puzzle.grid, vec!["cat", "o__", "p__"]);
        assert_eq!(puzzle.clues.across[0].text.as_deref(), Some("Feline"));
        assert_eq!(puzzle.clues.down[0].answer, "cop");
    }

    #[test]
    fn test_json_round_trip_through_disk() {
        let word_list = WordList::from_words(["cat", "cop"]);
        let grid = filled_corner(&word_list);
        let clues = match_clues(&grid, &mut StdRng::seed_from_u64(0)).unwrap();
        let puzzle = Puzzle::new(&grid, clues, "A. Setter");

        let path = std::env::temp_dir().join(format!("crossfill-export-{}.json", std::process::id()));
        puzzle.write_to_path(&path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();

        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["author"], "A. Setter");
        assert_eq!(value["width"], 3);
        assert_eq!(value["grid"][1], "o__");
        assert_eq!(value["clues"]["across"][0]["number"], 1);
        assert_eq!(value["clues"]["across"][0]["direction"], "across");
        assert_eq!(value["clues"]["down"][0]["start"], serde_json::json!([0, 0]));
        assert!(value["clues"]["down"][0]["text"].is_null());
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let word_list = WordList::from_words(["cat", "cop"]);
        let grid = filled_corner(&word_list);
        let clues = match_clues(&grid, &mut StdRng::seed_from_u64(0)).unwrap();
        let puzzle = Puzzle::new(&grid, clues, "A. Setter");

        let path = std::env::temp_dir().join("crossfill-no-such-dir").join("puzzle.json");
        assert!(matches!(puzzle.write_to_path(&path), Err(Error::Io { .. })));
    }
}
