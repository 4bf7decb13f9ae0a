use smallvec::SmallVec;

use crate::errors::Error;
use crate::{Direction, GridCoord, MAX_SLOT_LENGTH};

/// A single cell of an occupancy shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Blocked,
    /// A fillable cell, optionally pre-filled with a letter the fill has to respect.
    Open(Option<char>),
}

impl Cell {
    pub fn is_open(self) -> bool {
        matches!(self, Cell::Open(_))
    }
}

/// Lower-case a pre-filled letter the same way word lists are normalized. A letter whose lower
/// case spans several chars (like `'İ'`) can't occupy a single cell.
fn lowercase_letter(letter: char) -> Option<char> {
    let mut lowered = letter.to_lowercase();
    match (lowered.next(), lowered.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// The occupancy pattern of a grid: which cells are fillable and which are blocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Shape {
    /// A fully open grid with no blocks.
    pub fn open(width: usize, height: usize) -> Shape {
        Shape::from_occupancy(width, height, |_, _| true)
    }

    /// Build a shape from a boolean occupancy function, where `true` means fillable.
    pub fn from_occupancy(width: usize, height: usize, is_open: impl Fn(usize, usize) -> bool) -> Shape {
        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| if is_open(x, y) { Cell::Open(None) } else { Cell::Blocked })
            .collect();

        Shape { width, height, cells }
    }

    /// Parse a shape from a string template, with `.` representing empty cells, `#` or `_`
    /// representing blocks, and letters representing themselves. Blank lines and surrounding
    /// whitespace are ignored.
    pub fn from_template(template: &str) -> Result<Shape, Error> {
        let rows: Vec<Vec<char>> = template
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().collect())
            .collect();

        let width = rows.first().map(Vec::len).ok_or(Error::EmptyTemplate)?;
        let mut cells = Vec::with_capacity(width * rows.len());

        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(Error::RaggedTemplate { row: y, expected: width, found: row.len() });
            }

            for (x, &c) in row.iter().enumerate() {
                cells.push(match c {
                    '#' | '_' => Cell::Blocked,
                    '.' => Cell::Open(None),
                    letter => {
                        let lowered = lowercase_letter(letter)
                            .ok_or(Error::UnsupportedLetter { row: y, column: x, letter })?;
                        Cell::Open(Some(lowered))
                    }
                });
            }
        }

        Ok(Shape { width, height: rows.len(), cells })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The cell at `(x, y)`. Panics if the coordinate is outside the shape.
    pub fn cell(&self, (x, y): GridCoord) -> Cell {
        assert!(x < self.width && y < self.height, "({}, {}) is outside the grid", x, y);
        self.cells[y * self.width + x]
    }

    pub fn is_open(&self, coord: GridCoord) -> bool {
        self.cell(coord).is_open()
    }

    /// Every maximal run of open cells facing `direction` that's at least `min_length` long, in
    /// row-major order for across runs and column-major order for down runs.
    pub fn runs(&self, direction: Direction, min_length: usize) -> Vec<SmallVec<[GridCoord; MAX_SLOT_LENGTH]>> {
        // Walk each line of the grid in the run direction; for down runs that means columns.
        let (line_count, line_length) = match direction {
            Direction::Across => (self.height, self.width),
            Direction::Down => (self.width, self.height),
        };
        let coord_at = |line: usize, offset: usize| match direction {
            Direction::Across => (offset, line),
            Direction::Down => (line, offset),
        };

        let mut result = vec![];
        for line in 0..line_count {
            let mut current: SmallVec<[GridCoord; MAX_SLOT_LENGTH]> = SmallVec::new();

            for offset in 0..line_length {
                let coord = coord_at(line, offset);
                if self.is_open(coord) {
                    current.push(coord);
                } else {
                    if current.len() >= min_length.max(1) {
                        result.push(current.clone());
                    }
                    current.clear();
                }
            }

            if current.len() >= min_length.max(1) {
                result.push(current);
            }
        }

        result
    }
}
