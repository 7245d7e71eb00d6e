use crate::read::{self, Error, ErrorKind};
use crate::{BLOCK_CELL, Grids, Header, find_region_checksum};

/// Tag value that marks a scrambled solution
const SCRAMBLED_TAG: u16 = 0x0004;

/// Unlock a scrambled solution in place.
///
/// The cipher operates on the transposed solution with its blocks removed.
/// Scrambling applies, per key digit d0..d3, a letter shift, an
/// odd/even-gathering shuffle and a left rotation; unlocking applies the
/// inverses in reverse, for every candidate key in 1000..=9999, until the
/// candidate's checksum matches the stored unscrambled checksum. On success
/// the solution is rewritten and both the tag and the stored checksum are
/// cleared.
pub(crate) fn unscramble(grids: &mut Grids, header: &mut Header) -> read::Result<()> {
    if header.scrambled_tag != SCRAMBLED_TAG {
        return Ok(());
    }

    let transposed = grids.solution.transposed();
    let letters: Vec<u8> = transposed
        .data()
        .iter()
        .copied()
        .filter(|&byte| byte != BLOCK_CELL)
        .collect();

    for key in 1000..=9999u16 {
        let digits = key_digits(key);
        let candidate = unscramble_letters(&letters, digits);

        if find_region_checksum(&candidate, 0) != header.unscrambled_checksum {
            continue;
        }

        tracing::debug!(key, "found scramble key");

        // Re-insert the unlocked letters at the original non-block cells,
        // then undo the transposition
        let mut restored = transposed.clone();
        let mut unlocked = candidate.into_iter();

        for cell in restored.iter_mut() {
            if *cell != BLOCK_CELL {
                if let Some(letter) = unlocked.next() {
                    *cell = letter;
                }
            }
        }

        grids.solution = restored.transposed();
        header.unscrambled_checksum = 0;
        header.scrambled_tag = 0;

        return Ok(());
    }

    Err(Error {
        kind: ErrorKind::CannotUnscramble,
        context: "Scrambled solution".into(),
    })
}

/// Decimal digits of the key, most significant first
fn key_digits(key: u16) -> [u8; 4] {
    [
        (key / 1000 % 10) as u8,
        (key / 100 % 10) as u8,
        (key / 10 % 10) as u8,
        (key % 10) as u8,
    ]
}

/// Invert one full scramble pass: for each key digit, last to first, undo
/// the rotation, the shuffle, then the shift
fn unscramble_letters(letters: &[u8], digits: [u8; 4]) -> Vec<u8> {
    let mut letters = letters.to_vec();
    if letters.is_empty() {
        return letters;
    }

    for &digit in digits.iter().rev() {
        let len = letters.len();
        letters.rotate_right(usize::from(digit) % len);
        letters = interleave(&letters);
        shift_back(&mut letters, digits);
    }

    letters
}

/// Inverse of the shuffle that gathered odd indices into the first half and
/// even indices into the second: re-interleave, second half leading
fn interleave(letters: &[u8]) -> Vec<u8> {
    let mid = letters.len() / 2;
    let (odds, evens) = letters.split_at(mid);

    let mut out = Vec::with_capacity(letters.len());
    let mut odds = odds.iter();

    for &even in evens {
        out.push(even);
        if let Some(&odd) = odds.next() {
            out.push(odd);
        }
    }

    out
}

/// Undo the cyclic alphabet shift: letter `i` moves back by digit `i mod 4`
fn shift_back(letters: &mut [u8], digits: [u8; 4]) {
    for (idx, letter) in letters.iter_mut().enumerate() {
        if letter.is_ascii_uppercase() {
            let shift = digits[idx % digits.len()];
            *letter = (*letter - b'A' + 26 - shift) % 26 + b'A';
        }
    }
}
