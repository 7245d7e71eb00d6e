use std::collections::BTreeMap;

use bitflags::bitflags;
use crosschat_core::{Grid, Position};

use crate::read::{self, Error, read_section_code};
use crate::{Context, PuzRead, find_region_checksum};

bitflags! {
    /// Per-cell flags of the GEXT section
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct CellStyle: u8 {
        /// Cell previously held an incorrect guess
        const PREVIOUSLY_INCORRECT = 0x10;

        /// Cell currently holds an incorrect guess
        const INCORRECT = 0x20;

        /// Cell content was revealed to the solver
        const REVEALED = 0x40;

        /// Cell is circled
        const CIRCLED = 0x80;
    }
}

/// Extension sections at the tail of the file
///
/// Each section is framed as `code[4] · length u16 · checksum u16 ·
/// data[length] · NUL`; reading stops cleanly at the end of the stream.
/// Three codes are interpreted, everything else is checksum-verified and
/// skipped:
/// - `GRBS`: one byte per cell; `0` means no rebus, `n > 0` points at
///   entry `n - 1` of the rebus table
/// - `RTBL`: the rebus table, `;`-separated `NN:STRING` entries keyed by a
///   left-padded 2-digit decimal number
/// - `GEXT`: one [`CellStyle`] byte per cell
#[derive(Debug, Default, Clone)]
pub struct Extras {
    pub grbs: Option<Grid<u8>>,
    pub rtbl: Option<BTreeMap<u8, String>>,
    pub gext: Option<Grid<CellStyle>>,
}

impl Extras {
    /// Rebus content for a cell, when both rebus sections are present and
    /// the cell's index points at an existing table entry
    pub fn rebus(&self, pos: Position) -> Option<&str> {
        let (Some(grbs), Some(rtbl)) = (&self.grbs, &self.rtbl) else {
            return None;
        };

        let index = *grbs.get(pos)?;
        if index == 0 {
            return None;
        }

        rtbl.get(&(index - 1)).map(String::as_str)
    }

    /// Whether the rebus index of any cell is missing from the table
    pub fn has_dangling_rebus(&self) -> bool {
        let Some(grbs) = &self.grbs else {
            return false;
        };

        grbs.iter_indexed()
            .any(|(pos, &index)| index > 0 && self.rebus(pos).is_none())
    }

    /// Style flags for a cell; absent sections style nothing
    pub fn style(&self, pos: Position) -> CellStyle {
        match &self.gext {
            Some(gext) => gext.get(pos).copied().unwrap_or_default(),
            None => CellStyle::default(),
        }
    }

    pub(crate) fn read_from<R: PuzRead>(
        reader: &mut R,
        width: u8,
        height: u8,
    ) -> read::Result<Self> {
        let size = usize::from(width) * usize::from(height);
        let mut extras = Extras::default();

        while let Some(code) = read_section_code(reader)? {
            let context = format!("Extension '{}'", code.escape_ascii());

            let length = reader.read_u16().context(context.clone())?;
            let stored = reader.read_u16().context(context.clone())?;
            let data = reader.read_vec(usize::from(length)).context(context.clone())?;

            if reader.read_u8().context(context.clone())? != 0 {
                return Err(Error::bad_format("section is not NUL-terminated", context));
            }

            let computed = find_region_checksum(&data, 0);
            if computed != stored {
                return Err(Error {
                    kind: read::ErrorKind::ChecksumMismatch { computed, stored },
                    context,
                });
            }

            match &code {
                b"GRBS" => extras.grbs = Some(Self::read_grbs(&data, size, width)?),
                b"RTBL" => extras.rtbl = Some(Self::read_rtbl(&data)?),
                b"GEXT" => extras.gext = Some(Self::read_gext(&data, size, width)?),
                _ => tracing::debug!(code = %code.escape_ascii(), "skipping extension section"),
            }
        }

        Ok(extras)
    }

    fn read_grbs(data: &[u8], size: usize, width: u8) -> read::Result<Grid<u8>> {
        let context = "GRBS";

        if data.len() != size {
            return Err(Error::bad_format(
                format!("expected {size} cell bytes, found {}", data.len()),
                context,
            ));
        }

        Grid::from_vec(data.to_vec(), usize::from(width))
            .ok_or_else(|| Error::bad_format("grid does not fill its rows", context))
    }

    fn read_rtbl(data: &[u8]) -> read::Result<BTreeMap<u8, String>> {
        let context = "RTBL";
        let mut rtbl = BTreeMap::new();

        // The table is ASCII; rebus contents themselves are plain letters
        let table = String::from_utf8_lossy(data);

        for entry in table.split(';') {
            if entry.trim().is_empty() {
                continue;
            }

            let (num_str, value) = entry.split_once(':').ok_or_else(|| {
                Error::bad_format(
                    format!("'{entry}' is not formatted as '<num>:<rebus>'"),
                    context,
                )
            })?;

            if num_str.len() != 2 {
                return Err(Error::bad_format(
                    format!("key '{num_str}' is not a left-padded 2-digit number"),
                    context,
                ));
            }

            let num: u8 = num_str.trim_start().parse().map_err(|_| {
                Error::bad_format(format!("key '{num_str}' is not a number"), context)
            })?;

            rtbl.insert(num, value.trim().to_string());
        }

        Ok(rtbl)
    }

    fn read_gext(data: &[u8], size: usize, width: u8) -> read::Result<Grid<CellStyle>> {
        let context = "GEXT";

        if data.len() != size {
            return Err(Error::bad_format(
                format!("expected {size} cell bytes, found {}", data.len()),
                context,
            ));
        }

        // Writers put undocumented bits in here; only the known four count
        let styles = data
            .iter()
            .map(|&mask| CellStyle::from_bits_truncate(mask))
            .collect();

        Grid::from_vec(styles, usize::from(width))
            .ok_or_else(|| Error::bad_format("grid does not fill its rows", context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn section(code: &[u8; 4], data: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();

        bytes.extend_from_slice(code);
        bytes.extend_from_slice(&(data.len() as u16).to_le_bytes());
        bytes.extend_from_slice(&find_region_checksum(data, 0).to_le_bytes());
        bytes.extend_from_slice(data);
        bytes.push(0);

        bytes
    }

    #[test]
    fn rebus_sections_resolve_cells() {
        let mut bytes = section(b"GRBS", &[0, 2, 0, 1]);
        bytes.extend_from_slice(&section(b"RTBL", b" 0:RED; 1:BLUE;"));

        let extras = Extras::read_from(&mut Cursor::new(bytes), 2, 2).unwrap();

        assert_eq!(extras.rebus(Position::new(0, 1)), Some("BLUE"));
        assert_eq!(extras.rebus(Position::new(1, 1)), Some("RED"));
        assert_eq!(extras.rebus(Position::new(0, 0)), None);
        assert!(!extras.has_dangling_rebus());
    }

    #[test]
    fn circled_cells_come_from_the_high_bit() {
        let bytes = section(b"GEXT", &[0x80, 0x00, 0x41, 0x80]);
        let extras = Extras::read_from(&mut Cursor::new(bytes), 2, 2).unwrap();

        assert!(extras.style(Position::new(0, 0)).contains(CellStyle::CIRCLED));
        assert!(!extras.style(Position::new(1, 0)).contains(CellStyle::CIRCLED));
        assert!(extras.style(Position::new(1, 1)).contains(CellStyle::CIRCLED));
    }

    #[test]
    fn unknown_sections_are_skipped() {
        let mut bytes = section(b"LTIM", b"42,1");
        bytes.extend_from_slice(&section(b"GEXT", &[0; 4]));

        let extras = Extras::read_from(&mut Cursor::new(bytes), 2, 2).unwrap();
        assert!(extras.gext.is_some());
    }

    #[test]
    fn corrupt_section_checksum_aborts() {
        let mut bytes = section(b"GEXT", &[0x80, 0, 0, 0]);
        let data_start = bytes.len() - 5;
        bytes[data_start] = 0x40;

        let err = Extras::read_from(&mut Cursor::new(bytes), 2, 2).unwrap_err();
        assert!(matches!(
            err.kind,
            read::ErrorKind::ChecksumMismatch { .. }
        ));
    }

    #[test]
    fn end_of_stream_terminates_cleanly() {
        let extras = Extras::read_from(&mut Cursor::new(Vec::new()), 2, 2).unwrap();

        assert!(extras.grbs.is_none());
        assert!(extras.rtbl.is_none());
        assert!(extras.gext.is_none());
    }
}
