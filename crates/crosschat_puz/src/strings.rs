use crate::read::{self, EncodingErrors, EncodingProblem};
use crate::{Context, PuzRead};

/// The NUL-terminated string block of the body, kept as raw bytes
/// (terminators stripped) until the conversion step decodes them
#[derive(Debug, Default, Clone)]
pub struct Strings {
    pub title: Vec<u8>,
    pub author: Vec<u8>,
    pub copyright: Vec<u8>,
    pub notes: Vec<u8>,
    pub clues: Vec<Vec<u8>>,
}

impl Strings {
    pub(crate) fn read_from<R: PuzRead>(reader: &mut R, clue_count: u16) -> read::Result<Self> {
        let title = reader.read_str0().context("Title")?;
        let author = reader.read_str0().context("Author")?;
        let copyright = reader.read_str0().context("Copyright")?;

        // The clues follow in puzzle order; their directions fall out of the
        // grid during conversion
        let mut clues = Vec::with_capacity(clue_count as usize);

        for num in 1..=clue_count {
            let context = format!("Clue #{num}");
            clues.push(reader.read_str0().context(context)?);
        }

        let notes = reader.read_str0().context("Notes")?;

        Ok(Strings {
            title,
            author,
            copyright,
            notes,
            clues,
        })
    }
}

/// Windows-1252 decoder that collects its failures instead of aborting
///
/// Legacy files store their strings in Windows-1252, a superset of
/// ISO-8859-1. Five bytes of the 0x80..0xA0 range are undefined; each
/// occurrence is recorded as a problem and the aggregate is surfaced once,
/// after everything has been decoded.
#[derive(Debug, Default)]
pub struct StringDecoder {
    errors: EncodingErrors,
}

impl StringDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one string, substituting U+FFFD for undecodable bytes
    pub fn decode(&mut self, bytes: &[u8], field: &str) -> String {
        bytes
            .iter()
            .map(|&byte| {
                windows_1252_to_char(byte).unwrap_or_else(|| {
                    self.errors.problems.push(EncodingProblem {
                        byte,
                        field: field.to_string(),
                    });

                    char::REPLACEMENT_CHARACTER
                })
            })
            .collect()
    }

    /// Surface every recorded problem as a single aggregated error
    pub fn finish(self, context: &str) -> read::Result<()> {
        if self.errors.is_empty() {
            return Ok(());
        }

        Err(read::Error {
            kind: self.errors.into(),
            context: context.to_string(),
        })
    }
}

/// Map a Windows-1252 byte onto its character, or [`None`] for the five
/// bytes the encoding leaves undefined
pub fn windows_1252_to_char(byte: u8) -> Option<char> {
    let char = match byte {
        // ASCII and the ISO-8859-1 range map directly
        0..=127 | 160..=255 => byte as char,

        // The 0x80..0xA0 range is where Windows-1252 differs from ISO-8859-1
        128 => '€',
        130 => '‚',
        131 => 'ƒ',
        132 => '„',
        133 => '…',
        134 => '†',
        135 => '‡',
        136 => 'ˆ',
        137 => '‰',
        138 => 'Š',
        139 => '‹',
        140 => 'Œ',
        142 => 'Ž',
        145 => '\u{2018}',
        146 => '\u{2019}',
        147 => '\u{201C}',
        148 => '\u{201D}',
        149 => '•',
        150 => '–',
        151 => '—',
        152 => '˜',
        153 => '™',
        154 => 'š',
        155 => '›',
        156 => 'œ',
        158 => 'ž',
        159 => 'Ÿ',

        // 0x81, 0x8D, 0x8F, 0x90 and 0x9D are undefined
        _ => return None,
    };

    Some(char)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_through() {
        let mut decoder = StringDecoder::new();

        assert_eq!(decoder.decode(b"Wall Street", "Title"), "Wall Street");
        assert!(decoder.finish("Strings").is_ok());
    }

    #[test]
    fn smart_quotes_decode() {
        let mut decoder = StringDecoder::new();

        assert_eq!(decoder.decode(&[0x93, b'h', b'i', 0x94], "Clue #1"), "“hi”");
        assert!(decoder.finish("Strings").is_ok());
    }

    #[test]
    fn undefined_bytes_aggregate_into_one_error() {
        let mut decoder = StringDecoder::new();

        assert_eq!(decoder.decode(&[0x81, b'x', 0x9D], "Notes"), "\u{FFFD}x\u{FFFD}");

        let err = decoder.finish("Strings").unwrap_err();
        match err.kind {
            read::ErrorKind::Encoding(errors) => assert_eq!(errors.problems.len(), 2),
            kind => panic!("expected an encoding error, found {kind}"),
        }
    }
}
