//! End-to-end decoding of synthesized `*.puz` images: byte layout,
//! checksum validation, extensions, diagramless normalization and the
//! scramble cipher, all the way into a [`Puzzle`].

use crosschat_core::Grid;
use crosschat_crossword::{Direction, Puzzle};
use crosschat_puz::read::ErrorKind;
use crosschat_puz::{
    Header, PuzReader, Strings, Version, find_header_checksum, find_masked_checksums,
    find_region_checksum, find_strings_checksum,
};

/// Assembles a syntactically valid file image around a solution grid
struct PuzBuilder {
    width: u8,
    height: u8,
    solution: Vec<u8>,
    title: String,
    author: String,
    copyright: String,
    notes: String,
    clues: Vec<String>,
    version: [u8; 4],
    scrambled_tag: u16,
    unscrambled_checksum: u16,
    sections: Vec<([u8; 4], Vec<u8>)>,
    prefix: Vec<u8>,
}

impl PuzBuilder {
    fn new(rows: &[&str]) -> Self {
        let width = rows[0].len() as u8;
        let height = rows.len() as u8;
        let solution = rows.concat().into_bytes();

        let clue_count = count_entries(rows);
        let clues = (1..=clue_count).map(|num| format!("Clue {num}")).collect();

        Self {
            width,
            height,
            solution,
            title: "Test Puzzle".into(),
            author: "by Ada".into(),
            copyright: "(c) Example".into(),
            notes: String::new(),
            clues,
            version: *b"1.3\0",
            scrambled_tag: 0,
            unscrambled_checksum: 0,
            sections: Vec::new(),
            prefix: Vec::new(),
        }
    }

    fn section(mut self, code: [u8; 4], data: Vec<u8>) -> Self {
        self.sections.push((code, data));
        self
    }

    fn prefix(mut self, junk: &[u8]) -> Self {
        self.prefix = junk.to_vec();
        self
    }

    fn build(&self) -> Vec<u8> {
        let fill: Vec<u8> = self
            .solution
            .iter()
            .map(|&byte| if byte == b'.' { b'.' } else { b'-' })
            .collect();

        let strings = Strings {
            title: self.title.clone().into_bytes(),
            author: self.author.clone().into_bytes(),
            copyright: self.copyright.clone().into_bytes(),
            notes: self.notes.clone().into_bytes(),
            clues: self
                .clues
                .iter()
                .map(|clue| clue.clone().into_bytes())
                .collect(),
        };

        let version = Version {
            major: self.version[0] - b'0',
            minor: self.version[2] - b'0',
        };

        let header = Header {
            version,
            width: self.width,
            height: self.height,
            clue_count: self.clues.len() as u16,
            unknown_bitmask: 0,
            scrambled_tag: self.scrambled_tag,
            ..Header::default()
        };

        let header_checksum = find_header_checksum(&header);
        let solution_checksum = find_region_checksum(&self.solution, 0);
        let fill_checksum = find_region_checksum(&fill, 0);
        let strings_checksum = find_strings_checksum(&strings, version, 0);

        let mut global = find_region_checksum(&self.solution, header_checksum);
        global = find_region_checksum(&fill, global);
        let global_checksum = find_strings_checksum(&strings, version, global);

        let masked = find_masked_checksums(
            header_checksum,
            solution_checksum,
            fill_checksum,
            strings_checksum,
        );

        let mut bytes = self.prefix.clone();
        bytes.extend_from_slice(&global_checksum.to_le_bytes());
        bytes.extend_from_slice(b"ACROSS&DOWN\0");
        bytes.extend_from_slice(&header_checksum.to_le_bytes());
        bytes.extend_from_slice(&masked);
        bytes.extend_from_slice(&self.version);
        bytes.extend_from_slice(&[0; 2]);
        bytes.extend_from_slice(&self.unscrambled_checksum.to_le_bytes());
        bytes.extend_from_slice(&[0; 12]);
        bytes.push(self.width);
        bytes.push(self.height);
        bytes.extend_from_slice(&(self.clues.len() as u16).to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(&self.scrambled_tag.to_le_bytes());

        bytes.extend_from_slice(&self.solution);
        bytes.extend_from_slice(&fill);

        for string in [&strings.title, &strings.author, &strings.copyright] {
            bytes.extend_from_slice(string);
            bytes.push(0);
        }
        for clue in &strings.clues {
            bytes.extend_from_slice(clue);
            bytes.push(0);
        }
        bytes.extend_from_slice(&strings.notes);
        bytes.push(0);

        for (code, data) in &self.sections {
            bytes.extend_from_slice(code);
            bytes.extend_from_slice(&(data.len() as u16).to_le_bytes());
            bytes.extend_from_slice(&find_region_checksum(data, 0).to_le_bytes());
            bytes.extend_from_slice(data);
            bytes.push(0);
        }

        bytes
    }

    fn decode(&self) -> Result<Puzzle, crosschat_puz::read::Error> {
        PuzReader::new().read(&self.build())
    }
}

/// Number of entries the numbering pass will want clues for
fn count_entries(rows: &[&str]) -> usize {
    let letter = |row: usize, col: usize| {
        rows.get(row)
            .and_then(|row| row.as_bytes().get(col))
            .is_some_and(|&byte| byte != b'.' && byte != b':')
    };

    let mut count = 0;
    for (row, content) in rows.iter().enumerate() {
        for col in 0..content.len() {
            if !letter(row, col) {
                continue;
            }

            if (col == 0 || !letter(row, col - 1)) && letter(row, col + 1) {
                count += 1;
            }
            if (row == 0 || !letter(row - 1, col)) && letter(row + 1, col) {
                count += 1;
            }
        }
    }

    count
}

#[test]
fn decodes_a_plain_puzzle() {
    let puzzle = PuzBuilder::new(&["QANDA", "U.O.N", "IDEAS"]).decode().unwrap();

    assert_eq!((puzzle.rows, puzzle.cols), (3, 5));
    assert_eq!(puzzle.cells[(0, 0)], "Q");
    assert_eq!(puzzle.cells[(1, 1)], "");
    assert!(puzzle.cell_blocks[(1, 1)]);
    assert!(!puzzle.cell_blocks[(2, 4)]);

    assert_eq!(puzzle.cell_clue_numbers[(0, 0)], 1);
    assert_eq!(puzzle.clues_across[&1], "Clue 1");
    assert_eq!(puzzle.clues_down[&2], "Clue 3");

    assert_eq!(puzzle.title, "Test Puzzle");
    assert_eq!(puzzle.author, "Ada");
    assert_eq!(puzzle.publisher, "(c) Example");
}

#[test]
fn skips_unrelated_prefix_bytes() {
    let puzzle = PuzBuilder::new(&["AB", "CD"])
        .prefix(b"HTTP/1.1 200 OK\r\n\r\n")
        .decode()
        .unwrap();

    assert_eq!(puzzle.cells[(1, 1)], "D");
}

#[test]
fn decodes_non_square_grids() {
    let puzzle = PuzBuilder::new(&["ABC", "DEF"]).decode().unwrap();

    assert_eq!((puzzle.rows, puzzle.cols), (2, 3));
    assert_eq!(puzzle.cells[(1, 2)], "F");
}

#[test]
fn normalizes_diagramless_blocks() {
    let puzzle = PuzBuilder::new(&["AB:", "CDE"]).decode().unwrap();

    assert!(puzzle.cell_blocks[(0, 2)]);
    assert_eq!(puzzle.cells[(0, 2)], "");
}

#[test]
fn resolves_rebus_cells() {
    let grbs = vec![1, 0, 0, 0];
    let rtbl = b" 0:HEART;".to_vec();

    let puzzle = PuzBuilder::new(&["HA", "AT"])
        .section(*b"GRBS", grbs)
        .section(*b"RTBL", rtbl)
        .decode()
        .unwrap();

    assert_eq!(puzzle.cells[(0, 0)], "HEART");
    assert_eq!(puzzle.cells[(0, 1)], "A");
}

#[test]
fn reads_circles_from_gext() {
    let puzzle = PuzBuilder::new(&["AB", "CD"])
        .section(*b"GEXT", vec![0x80, 0, 0, 0x80])
        .decode()
        .unwrap();

    assert!(puzzle.cell_circles[(0, 0)]);
    assert!(!puzzle.cell_circles[(0, 1)]);
    assert!(puzzle.cell_circles[(1, 1)]);
}

#[test]
fn keeps_notes_in_the_checksums() {
    let mut builder = PuzBuilder::new(&["AB", "CD"]);
    builder.notes = "Stay sharp".into();

    let puzzle = builder.decode().unwrap();
    assert_eq!(puzzle.notes, "Stay sharp");
}

#[test]
fn corrupted_bytes_fail_the_checksums() {
    let mut bytes = PuzBuilder::new(&["AB", "CD"]).build();

    // Flip a letter of the solution without re-computing anything; the
    // fixed header is 52 bytes, so the solution grid starts right after
    bytes[52] ^= 0x01;

    let err = PuzReader::new().read::<Puzzle>(&bytes).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ChecksumMismatch { .. }));
}

#[test]
fn truncated_images_fail() {
    let bytes = PuzBuilder::new(&["AB", "CD"]).build();

    let err = PuzReader::new().read::<Puzzle>(&bytes[..40]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Io(_)));
}

#[test]
fn missing_magic_fails() {
    let err = PuzReader::new().read::<Puzzle>(b"not a puzzle").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::BadFormat { .. }));
}

#[test]
fn clue_shortage_fails() {
    let mut builder = PuzBuilder::new(&["AB", "CD"]);
    builder.clues.pop();

    let err = builder.decode().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::BadFormat { .. }));
}

// Forward model of the scramble cipher, used to lock a sibling image
mod scrambling {
    pub fn scramble(letters: &[u8], key: u16) -> Vec<u8> {
        let digits = [
            (key / 1000 % 10) as u8,
            (key / 100 % 10) as u8,
            (key / 10 % 10) as u8,
            (key % 10) as u8,
        ];

        let mut letters = letters.to_vec();
        for &digit in &digits {
            for (idx, letter) in letters.iter_mut().enumerate() {
                *letter = (*letter - b'A' + digits[idx % 4]) % 26 + b'A';
            }

            let odds = letters.iter().skip(1).step_by(2);
            let evens = letters.iter().step_by(2);
            letters = odds.chain(evens).copied().collect();

            let len = letters.len();
            letters.rotate_left(usize::from(digit) % len);
        }

        letters
    }
}

#[test]
fn unscrambles_a_locked_solution() {
    let rows = ["QANDA", "U.O.N", "IDEAS"];
    let plain = PuzBuilder::new(&rows).decode().unwrap();

    // Lock the solution: transpose, drop blocks, scramble, re-insert
    let solution = Grid::from_vec(rows.concat().into_bytes(), 5).unwrap();
    let transposed = solution.transposed();
    let letters: Vec<u8> = transposed
        .data()
        .iter()
        .copied()
        .filter(|&byte| byte != b'.')
        .collect();

    let scrambled = scrambling::scramble(&letters, 1001);

    let mut locked = transposed.clone();
    let mut scrambled_iter = scrambled.iter().copied();
    for cell in locked.iter_mut() {
        if *cell != b'.' {
            *cell = scrambled_iter.next().unwrap();
        }
    }
    let locked = locked.transposed();

    let mut builder = PuzBuilder::new(&rows);
    builder.solution = locked.data().to_vec();
    builder.scrambled_tag = 0x0004;
    // The key search target: the solution as it was before locking
    builder.unscrambled_checksum = find_region_checksum(&letters, 0);

    let unscrambled = builder.decode().unwrap();

    // The locked sibling decodes to the same puzzle
    assert_eq!(unscrambled.cells, plain.cells);
    assert_eq!(unscrambled.cell_clue_numbers, plain.cell_clue_numbers);

    for (&number, _) in &unscrambled.clues_across {
        assert_eq!(
            unscrambled.answer_coordinates(number, Direction::Across).unwrap(),
            plain.answer_coordinates(number, Direction::Across).unwrap()
        );
    }
}
