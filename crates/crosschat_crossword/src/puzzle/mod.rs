mod puz;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use crosschat_core::{Grid, Position};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Direction, Error};

/// The immutable logical crossword of a channel
///
/// Construction through [`Puzzle::new`] assigns clue numbers and attaches
/// the clue texts; afterwards the grids and maps describe a consistent
/// puzzle and are only ever read. Cell contents are strings: empty marks a
/// block, one character a normal letter, several characters a rebus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    pub rows: usize,
    pub cols: usize,

    /// Solution contents per cell; elided (`null` on the wire) when the
    /// puzzle travels to solvers
    #[serde(with = "solution_cells")]
    pub cells: Grid<String>,

    pub cell_blocks: Grid<bool>,

    /// Clue number starting at each cell, `0` where no entry starts
    pub cell_clue_numbers: Grid<u32>,

    // Decorations
    pub cell_circles: Grid<bool>,
    pub cell_shades: Grid<bool>,

    pub clues_across: BTreeMap<u32, String>,
    pub clues_down: BTreeMap<u32, String>,

    // Metadata
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub published_date: Option<NaiveDate>,
    pub notes: String,
    pub description: String,
}

/// A cell grid and clue list that do not describe a puzzle
#[derive(Debug, Error)]
pub enum InvalidPuzzle {
    #[error("the grid starts {expected} entries, {found} clue(s) were supplied")]
    ClueCount { expected: usize, found: usize },

    #[error("decoration grids must have the same dimensions as the cell grid")]
    DecorationSize,
}

impl Puzzle {
    /// Assemble a puzzle from its solution grid, decorations and the flat
    /// clue list in puzzle order; metadata starts out empty.
    ///
    /// Numbering is assigned row-major: a cell starts an across entry when
    /// its left neighbor is a block or the edge and its right neighbor is a
    /// letter, a down entry when its top neighbor is a block or the edge
    /// and its bottom neighbor is a letter. Both entries of one cell share
    /// a single number, and clue texts are consumed in the same traversal
    /// order, across before down.
    pub fn new(
        cells: Grid<String>,
        cell_circles: Grid<bool>,
        cell_shades: Grid<bool>,
        clues: Vec<String>,
    ) -> Result<Self, InvalidPuzzle> {
        let (rows, cols) = (cells.rows(), cells.cols());

        for decoration in [&cell_circles, &cell_shades] {
            if decoration.rows() != rows || decoration.cols() != cols {
                return Err(InvalidPuzzle::DecorationSize);
            }
        }

        let cell_blocks: Grid<bool> = Grid::from_vec(
            cells.iter().map(String::is_empty).collect(),
            cols.max(1),
        )
        .unwrap_or_default();

        let (cell_clue_numbers, slots) = assign_clue_numbers(&cells);

        if slots.len() != clues.len() {
            return Err(InvalidPuzzle::ClueCount {
                expected: slots.len(),
                found: clues.len(),
            });
        }

        let mut clues_across = BTreeMap::new();
        let mut clues_down = BTreeMap::new();

        for ((number, direction), text) in slots.into_iter().zip(clues) {
            match direction {
                Direction::Across => clues_across.insert(number, text),
                Direction::Down => clues_down.insert(number, text),
            };
        }

        Ok(Self {
            rows,
            cols,
            cells,
            cell_blocks,
            cell_clue_numbers,
            cell_circles,
            cell_shades,
            clues_across,
            clues_down,
            title: String::new(),
            author: String::new(),
            publisher: String::new(),
            published_date: None,
            notes: String::new(),
            description: String::new(),
        })
    }

    /// Whether the cell at `pos` is a block; out-of-bounds counts as one
    pub fn is_block(&self, pos: Position) -> bool {
        self.cell_blocks.get(pos).copied().unwrap_or(true)
    }

    /// The inclusive start and end cells of the entry with the given
    /// number, walking the grid in `direction` until a block or the edge
    pub fn answer_coordinates(
        &self,
        number: u32,
        direction: Direction,
    ) -> Result<(Position, Position), Error> {
        let start = self
            .cell_clue_numbers
            .iter_indexed()
            .find(|&(_, &cell_number)| cell_number != 0 && cell_number == number)
            .map(|(pos, _)| pos)
            .ok_or_else(|| Error::BadClue {
                clue: format!("{number}{}", direction.suffix()),
            })?;

        let mut end = start;
        loop {
            let next = direction.next(end);
            if self.is_block(next) {
                break;
            }

            end = next;
        }

        Ok((start, end))
    }

    /// Every cell of the entry between the inclusive coordinate pair, in
    /// reading order
    pub fn entry_positions((start, end): (Position, Position)) -> Vec<Position> {
        if start.row == end.row {
            (start.col..=end.col)
                .map(|col| Position::new(start.row, col))
                .collect()
        } else {
            (start.row..=end.row)
                .map(|row| Position::new(row, start.col))
                .collect()
        }
    }

    /// A copy with the solution grid elided, for anything that leaves the
    /// server
    pub fn without_solution(&self) -> Self {
        Self {
            cells: Grid::default(),
            ..self.clone()
        }
    }
}

/// Row-major clue numbering: the numbers grid plus the ordered list of
/// `(number, direction)` slots the flat clue list fills
fn assign_clue_numbers(cells: &Grid<String>) -> (Grid<u32>, Vec<(u32, Direction)>) {
    let mut numbers = Grid::filled(cells.rows(), cells.cols(), 0u32);
    let mut slots = Vec::new();
    let mut next_number = 0u32;

    let is_letter = |row: Option<usize>, col: Option<usize>| match (row, col) {
        (Some(row), Some(col)) => cells
            .get(Position::new(row, col))
            .is_some_and(|cell| !cell.is_empty()),
        _ => false,
    };

    for (pos, cell) in cells.iter_indexed() {
        if cell.is_empty() {
            continue;
        }

        let (row, col) = (pos.row, pos.col);

        let starts_across =
            !is_letter(Some(row), col.checked_sub(1)) && is_letter(Some(row), Some(col + 1));
        let starts_down =
            !is_letter(row.checked_sub(1), Some(col)) && is_letter(Some(row + 1), Some(col));

        if !starts_across && !starts_down {
            continue;
        }

        next_number += 1;
        numbers[pos] = next_number;

        if starts_across {
            slots.push((next_number, Direction::Across));
        }
        if starts_down {
            slots.push((next_number, Direction::Down));
        }
    }

    (numbers, slots)
}

mod solution_cells {
    use crosschat_core::Grid;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(cells: &Grid<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if cells.is_empty() {
            serializer.serialize_none()
        } else {
            cells.serialize(serializer)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Grid<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let cells = Option::<Grid<String>>::deserialize(deserializer)?;
        Ok(cells.unwrap_or_default())
    }
}
