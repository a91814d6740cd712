//! Encodes flat binary images into UF2 files.
//!
//! The image is cut into 256 byte blocks, every block is framed into a 292 byte
//! record and the records are written back to back. See [`bin2uf2`] for the
//! buffered form and [`write_output`] for the streaming one.

use crate::{
    boards::BoardInfo,
    uf2::{UF2_DATA_SIZE, UF2_RECORD_SIZE, Uf2BlockData, Uf2BlockFooter, Uf2BlockHeader},
};
use std::io::Write;

use assert_into::AssertInto;
use log::*;
use thiserror::Error;
use zerocopy::{IntoBytes, byteorder::little_endian::U32};

pub mod boards;
pub mod uf2;

/// Start of XIP flash on the RP2 family
pub const DEFAULT_FLASH_BASE_ADDRESS: u32 = 0x10000000;

pub const DEFAULT_BLOCK_PAYLOAD_SIZE: u32 = 256;

/// How the `target_addr` field is filled in for each record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TargetAddressMode {
    /// Every record targets the flash base address.
    #[default]
    Constant,
    /// Record `n` targets `flash_base_address + n * block_payload_size`,
    /// which is what a bootloader needs to place each block where it belongs.
    Sequential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub flash_base_address: u32,
    /// Number of image bytes carried by each record, at most 256
    pub block_payload_size: u32,
    pub target_address_mode: TargetAddressMode,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            flash_base_address: DEFAULT_FLASH_BASE_ADDRESS,
            block_payload_size: DEFAULT_BLOCK_PAYLOAD_SIZE,
            target_address_mode: TargetAddressMode::default(),
        }
    }
}

impl EncodeOptions {
    pub fn for_board(board: &dyn BoardInfo) -> Self {
        Self {
            flash_base_address: board.flash_start(),
            block_payload_size: board.page_size(),
            ..Self::default()
        }
    }

    /// Checks that an image of `image_len` bytes can be encoded with these options
    /// and returns the number of records it produces.
    pub fn validate(&self, image_len: usize) -> Result<u32, Bin2Uf2Error> {
        if self.block_payload_size == 0 || self.block_payload_size as usize > UF2_DATA_SIZE {
            return Err(Bin2Uf2Error::InvalidBlockPayloadSize(
                self.block_payload_size,
            ));
        }

        let blocks = image_len.div_ceil(self.block_payload_size as usize);
        let num_blocks = u32::try_from(blocks).map_err(|_| Bin2Uf2Error::TooManyBlocks(blocks))?;

        // Addresses only grow with the block number, checking the last one is enough
        if let Some(last_block) = num_blocks.checked_sub(1) {
            self.target_address(last_block)?;
        }

        Ok(num_blocks)
    }

    pub fn target_address(&self, block_no: u32) -> Result<u32, Bin2Uf2Error> {
        match self.target_address_mode {
            TargetAddressMode::Constant => Ok(self.flash_base_address),
            TargetAddressMode::Sequential => block_no
                .checked_mul(self.block_payload_size)
                .and_then(|offset| self.flash_base_address.checked_add(offset))
                .ok_or(Bin2Uf2Error::TargetAddressOverflow(block_no)),
        }
    }
}

#[derive(Error, Debug)]
pub enum Bin2Uf2Error {
    #[error("Block payload size must be between 1 and 256 bytes, got {0}")]
    InvalidBlockPayloadSize(u32),
    #[error("The input image needs {0} blocks, more than a UF2 file can number")]
    TooManyBlocks(usize),
    #[error("Target address of block {0} does not fit in 32 bits")]
    TargetAddressOverflow(u32),
    #[error("Failed to allocate the output buffer for {0} UF2 records")]
    AllocationFailure(u32),
    #[error("Failed to write to output")]
    FailedToWrite(#[source] std::io::Error),
}

/// Number of records needed for `len` bytes of image, `None` for a zero payload size.
pub fn total_blocks(len: usize, block_payload_size: u32) -> Option<usize> {
    match block_payload_size {
        0 => None,
        size => Some(len.div_ceil(size as usize)),
    }
}

/// Size in bytes of the UF2 stream for `len` bytes of image.
pub fn encoded_len(len: usize, block_payload_size: u32) -> Option<usize> {
    total_blocks(len, block_payload_size)?.checked_mul(UF2_RECORD_SIZE)
}

/// Writes the UF2 records for `raw_image` to `output`.
///
/// The options are validated before anything is written, so the only way to
/// end up with a truncated stream is a failing writer.
pub fn write_output(
    raw_image: &[u8],
    mut output: impl Write,
    options: &EncodeOptions,
) -> Result<(), Bin2Uf2Error> {
    let num_blocks = options.validate(raw_image.len())?;

    let mut block_header = Uf2BlockHeader::prototype(num_blocks);

    let mut block_data: Uf2BlockData = [0; UF2_DATA_SIZE];

    let block_footer = Uf2BlockFooter::default();

    for (block_no, chunk) in raw_image
        .chunks(options.block_payload_size.assert_into())
        .enumerate()
    {
        let block_no: u32 = block_no.assert_into();
        block_header.target_addr = U32::new(options.target_address(block_no)?);
        block_header.block_no = U32::new(block_no);

        debug!(
            "Block {} / {} {:#010x}",
            block_no,
            num_blocks,
            block_header.target_addr.get()
        );

        block_data.fill(0);
        block_data[..chunk.len()].copy_from_slice(chunk);

        output
            .write_all(block_header.as_bytes())
            .map_err(Bin2Uf2Error::FailedToWrite)?;
        output
            .write_all(block_data.as_bytes())
            .map_err(Bin2Uf2Error::FailedToWrite)?;
        output
            .write_all(block_footer.as_bytes())
            .map_err(Bin2Uf2Error::FailedToWrite)?;
    }

    Ok(())
}

/// Converts a raw binary image into a complete UF2 stream.
pub fn bin2uf2(raw_image: &[u8], options: &EncodeOptions) -> Result<Vec<u8>, Bin2Uf2Error> {
    let num_blocks = options.validate(raw_image.len())?;

    let len = usize::try_from(num_blocks)
        .ok()
        .and_then(|blocks| blocks.checked_mul(UF2_RECORD_SIZE))
        .ok_or(Bin2Uf2Error::AllocationFailure(num_blocks))?;

    let mut output = Vec::new();
    output
        .try_reserve_exact(len)
        .map_err(|_| Bin2Uf2Error::AllocationFailure(num_blocks))?;

    write_output(raw_image, &mut output, options)?;
    debug_assert_eq!(output.len(), len);

    Ok(output)
}

/// Encodes `raw_image` with the constant target address policy.
pub fn encode(
    raw_image: &[u8],
    flash_base_address: u32,
    block_payload_size: u32,
) -> Result<Vec<u8>, Bin2Uf2Error> {
    bin2uf2(
        raw_image,
        &EncodeOptions {
            flash_base_address,
            block_payload_size,
            target_address_mode: TargetAddressMode::Constant,
        },
    )
}
