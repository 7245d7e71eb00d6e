use crate::read::{self, MAGIC};
use crate::{Context, PuzRead, Version};

/// Fixed-size file header, all words little-endian
///
/// Layout: global checksum `u16` · magic `[u8; 12]` · header checksum `u16` ·
/// masked checksums `[u8; 8]` · version `[u8; 4]` · reserved `u16` ·
/// unscrambled checksum `u16` · reserved `[u8; 12]` · width `u8` ·
/// height `u8` · clue count `u16` · bitmask `u16` · scramble tag `u16`.
#[derive(Debug, Default, Clone)]
pub struct Header {
    // Checksums
    pub global_checksum: u16,
    pub header_checksum: u16,
    pub masked_checksums: [u8; 8],

    /// Checksum of the solution before it was scrambled; the key search
    /// target for locked files, zero otherwise
    pub unscrambled_checksum: u16,

    // Components
    pub version: Version,
    pub width: u8,
    pub height: u8,
    pub clue_count: u16,

    /// Unused by every known writer but part of the checksummed region
    pub unknown_bitmask: u16,

    /// `0x0004` marks a scrambled solution
    pub scrambled_tag: u16,
}

impl Header {
    pub(crate) fn read_from<R: PuzRead>(reader: &mut R) -> read::Result<Self> {
        let global_checksum = reader.read_u16().context("Global checksum")?;

        let magic = reader.read_slice::<12>().context("File magic")?;
        if &magic != MAGIC {
            return Err(read::Error::bad_format(
                "file magic does not match",
                "File magic",
            ));
        }

        let header_checksum = reader.read_u16().context("Header checksum")?;
        let masked_checksums = reader.read_slice::<8>().context("Masked checksums")?;
        let version = Version::read(reader.read_slice::<4>().context("Version")?)?;

        reader.read_u16().context("Reserved word")?;
        let unscrambled_checksum = reader.read_u16().context("Unscrambled checksum")?;
        reader.read_slice::<12>().context("Reserved region")?;

        let width = reader.read_u8().context("Width")?;
        let height = reader.read_u8().context("Height")?;
        let clue_count = reader.read_u16().context("Clue count")?;
        let unknown_bitmask = reader.read_u16().context("Bitmask")?;
        let scrambled_tag = reader.read_u16().context("Scramble tag")?;

        if width == 0 || height == 0 {
            return Err(read::Error::bad_format(
                format!("grid dimensions must be positive, found {width}x{height}"),
                "Dimensions",
            ));
        }

        Ok(Header {
            global_checksum,
            header_checksum,
            masked_checksums,
            unscrambled_checksum,
            version,
            width,
            height,
            clue_count,
            unknown_bitmask,
            scrambled_tag,
        })
    }
}
