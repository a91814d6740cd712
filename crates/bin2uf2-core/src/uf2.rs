use static_assertions::const_assert;
use std::mem;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, byteorder::little_endian::U32};

pub const UF2_MAGIC_START0: u32 = 0x0A324655;
pub const UF2_MAGIC_START1: u32 = 0x9E5D5157;
pub const UF2_MAGIC_END: u32 = 0x0AB16F30;

/// Written verbatim into every record, bits are not interpreted.
pub const UF2_FLAG_FAMILY_ID_PRESENT: u32 = 0x00002000;

/// Declared payload size, independent of how many image bytes a block carries.
pub const UF2_PAYLOAD_SIZE: u32 = 256;

/// Value of the `file_size` / family id slot.
pub const UF2_FILE_SIZE: u32 = 256;

pub const UF2_DATA_SIZE: usize = 256;
pub const UF2_HEADER_SIZE: usize = 32;
pub const UF2_FOOTER_SIZE: usize = 4;
pub const UF2_RECORD_SIZE: usize = UF2_HEADER_SIZE + UF2_DATA_SIZE + UF2_FOOTER_SIZE;

#[derive(Debug, Clone, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Uf2BlockHeader {
    pub magic_start0: U32,
    pub magic_start1: U32,
    pub flags: U32,
    pub target_addr: U32,
    pub payload_size: U32,
    pub block_no: U32,
    pub num_blocks: U32,
    pub file_size: U32, // or familyID
}

impl Uf2BlockHeader {
    /// Header shared by every record of a stream with `num_blocks` records.
    ///
    /// `target_addr` and `block_no` are left at zero and must be filled in per record.
    pub fn prototype(num_blocks: u32) -> Self {
        Self {
            magic_start0: U32::new(UF2_MAGIC_START0),
            magic_start1: U32::new(UF2_MAGIC_START1),
            flags: U32::new(UF2_FLAG_FAMILY_ID_PRESENT),
            target_addr: U32::new(0),
            payload_size: U32::new(UF2_PAYLOAD_SIZE),
            block_no: U32::new(0),
            num_blocks: U32::new(num_blocks),
            file_size: U32::new(UF2_FILE_SIZE),
        }
    }
}

pub type Uf2BlockData = [u8; UF2_DATA_SIZE];

#[derive(Debug, Clone, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Uf2BlockFooter {
    pub magic_end: U32,
}

impl Default for Uf2BlockFooter {
    fn default() -> Self {
        Self {
            magic_end: U32::new(UF2_MAGIC_END),
        }
    }
}

const_assert!(mem::size_of::<Uf2BlockHeader>() == UF2_HEADER_SIZE);
const_assert!(mem::size_of::<Uf2BlockFooter>() == UF2_FOOTER_SIZE);
const_assert!(UF2_RECORD_SIZE == 292);
const_assert!(UF2_PAYLOAD_SIZE as usize <= UF2_DATA_SIZE);
