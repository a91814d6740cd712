use crate::boards::BoardInfo;

#[derive(Debug, Default, Clone)]
pub struct RP2350;

impl BoardInfo for RP2350 {
    fn board_name(&self) -> &'static str {
        "rp2350"
    }

    fn flash_start(&self) -> u32 {
        FLASH_START_RP2350
    }

    fn flash_size(&self) -> u32 {
        FLASH_SIZE_RP2350
    }
}

// RP2350 can boot images from partitions anywhere in flash, a flat binary still
// starts at the beginning of the window
pub const FLASH_START_RP2350: u32 = 0x10000000;
pub const FLASH_SIZE_RP2350: u32 = 0x00400000;
