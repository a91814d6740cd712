use crate::boards::BoardInfo;

#[derive(Debug, Default, Clone)]
pub struct RP2040;

impl BoardInfo for RP2040 {
    fn board_name(&self) -> &'static str {
        "rp2040"
    }

    fn flash_start(&self) -> u32 {
        FLASH_START_RP2040
    }

    fn flash_size(&self) -> u32 {
        FLASH_SIZE_RP2040
    }
}

pub const FLASH_START_RP2040: u32 = 0x10000000;

// The Pico ships with 2MiB of QSPI flash, other boards may carry up to 16MiB
pub const FLASH_SIZE_RP2040: u32 = 0x00200000;
