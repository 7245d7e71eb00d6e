use crate::read::{Error, Result};

/// Format version from the header, stored as the ASCII bytes `M.m\0`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    /// First version whose notes take part in the string checksums
    pub const NOTES_IN_CHECKSUM: Self = Self { major: 1, minor: 3 };

    pub(crate) fn read(bytes: [u8; 4]) -> Result<Self> {
        let context = "Version";

        let digit = |byte: u8| {
            byte.is_ascii_digit().then(|| byte - b'0').ok_or_else(|| {
                Error::bad_format(
                    format!("expected an ASCII digit, found {byte:#04x}"),
                    context,
                )
            })
        };

        if bytes[1] != b'.' {
            return Err(Error::bad_format(
                "version must be formatted as '<major>.<minor>'",
                context,
            ));
        }

        Ok(Self {
            major: digit(bytes[0])?,
            minor: digit(bytes[2])?,
        })
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
