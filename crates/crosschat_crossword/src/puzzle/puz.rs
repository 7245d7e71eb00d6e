use crosschat_core::Grid;
use crosschat_puz::read::{self, Error};
use crosschat_puz::{BLOCK_CELL, CellStyle, Extras, Grids, Header, Puz, StringDecoder, Strings};

use crate::Puzzle;

impl Puz for Puzzle {
    /// Build the logical puzzle out of the parsed file components.
    ///
    /// Every string decodes as Windows-1252; decoding problems are
    /// collected and surfaced as one aggregated error once all strings have
    /// been converted. Rebus cells take their content from the rebus table,
    /// circles come from the GEXT high bit, and the author loses a leading
    /// "by " prefix.
    fn from_puz(
        _header: Header,
        grids: Grids,
        strings: Strings,
        extras: Extras,
    ) -> read::Result<Self> {
        if extras.has_dangling_rebus() {
            return Err(Error::bad_format(
                "a rebus cell points at a missing table entry",
                "GRBS",
            ));
        }

        let mut decoder = StringDecoder::new();

        // Cell contents: blocks stay empty, rebus cells take the table
        // entry, everything else is a one-letter string
        let cells: Vec<String> = grids
            .solution
            .iter_indexed()
            .map(|(pos, &byte)| match byte {
                BLOCK_CELL => String::new(),
                byte => match extras.rebus(pos) {
                    Some(rebus) => rebus.to_string(),
                    None => decoder.decode(&[byte], "Solution grid"),
                },
            })
            .collect();

        let cells = Grid::from_vec(cells, grids.solution.cols())
            .ok_or_else(|| Error::bad_format("grid does not fill its rows", "Solution grid"))?;

        let cell_circles: Vec<bool> = grids
            .solution
            .iter_indexed()
            .map(|(pos, _)| extras.style(pos).contains(CellStyle::CIRCLED))
            .collect();
        let cell_circles = Grid::from_vec(cell_circles, grids.solution.cols())
            .ok_or_else(|| Error::bad_format("grid does not fill its rows", "GEXT"))?;

        let cell_shades = Grid::filled(cells.rows(), cells.cols(), false);

        let clues: Vec<String> = strings
            .clues
            .iter()
            .enumerate()
            .map(|(idx, clue)| decoder.decode(clue, &format!("Clue #{}", idx + 1)))
            .collect();

        let title = decoder.decode(&strings.title, "Title");
        let author = decoder.decode(&strings.author, "Author");
        let publisher = decoder.decode(&strings.copyright, "Copyright");
        let notes = decoder.decode(&strings.notes, "Notes");

        // Everything is decoded; problems surface in one aggregate
        decoder.finish("Strings")?;

        let mut puzzle = Puzzle::new(cells, cell_circles, cell_shades, clues)
            .map_err(|err| Error::bad_format(err.to_string(), "Clues"))?;

        puzzle.title = title;
        puzzle.author = trim_author(&author);
        puzzle.publisher = publisher;
        puzzle.notes = notes;

        Ok(puzzle)
    }
}

/// Strip the "by " / "By " prefix some constructors put in the author field
fn trim_author(author: &str) -> String {
    author
        .strip_prefix("by ")
        .or_else(|| author.strip_prefix("By "))
        .unwrap_or(author)
        .to_string()
}
