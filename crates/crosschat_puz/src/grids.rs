use crosschat_core::Grid;

use crate::read::{self, Error};
use crate::{Context, PuzRead};

/// Byte that marks a non-playable cell in both grids
pub const BLOCK_CELL: u8 = b'.';

/// Byte that marks a playable-but-empty cell in the fill grid
pub const EMPTY_CELL: u8 = b'-';

/// Byte for a diagramless block: behaves like [`BLOCK_CELL`] but is stored
/// distinctly so the grid can render without revealing the block layout
pub const DIAGRAMLESS_CELL: u8 = b':';

/// The two byte grids of the body: the solution and the saved fill
#[derive(Debug, Default, Clone)]
pub struct Grids {
    pub solution: Grid<u8>,
    pub fill: Grid<u8>,
}

impl Grids {
    pub(crate) fn read_from<R: PuzRead>(
        reader: &mut R,
        width: u8,
        height: u8,
    ) -> read::Result<Self> {
        let size = usize::from(width) * usize::from(height);

        let read_grid = |bytes: Vec<u8>, context: &str| {
            Grid::from_vec(bytes, usize::from(width))
                .ok_or_else(|| Error::bad_format("grid does not fill its rows", context))
        };

        let solution = reader.read_vec(size).context("Solution grid")?;
        let solution = read_grid(solution, "Solution grid")?;

        let fill = reader.read_vec(size).context("Fill grid")?;
        let fill = read_grid(fill, "Fill grid")?;

        Ok(Self { solution, fill })
    }

    /// Turn every diagramless block of the solution into a plain block.
    ///
    /// Runs only after checksum validation, which covers the bytes as stored.
    pub(crate) fn normalize_diagramless(&mut self) {
        for cell in self.solution.iter_mut() {
            if *cell == DIAGRAMLESS_CELL {
                *cell = BLOCK_CELL;
            }
        }
    }
}
