pub use rp2040::RP2040;
pub use rp2350::RP2350;

pub mod rp2040;
pub mod rp2350;

/// Iterates over every board known to the encoder.
pub struct BoardIter {
    inner: std::vec::IntoIter<Box<dyn BoardInfo>>,
}

impl BoardIter {
    pub fn new() -> Self {
        Self {
            inner: vec![
                Box::new(RP2040) as Box<dyn BoardInfo>,
                Box::new(RP2350),
            ]
            .into_iter(),
        }
    }

    pub fn find_by_name(name: &str) -> Option<Box<dyn BoardInfo>> {
        Self::new().find(|board| board.board_name().eq_ignore_ascii_case(name))
    }

    pub fn names() -> Vec<&'static str> {
        Self::new().map(|board| board.board_name()).collect()
    }
}

impl Default for BoardIter {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for BoardIter {
    type Item = Box<dyn BoardInfo>;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Describes where a board expects a flat binary image to be flashed.
pub trait BoardInfo {
    /// Get the board's name
    fn board_name(&self) -> &'static str;

    /// Address of the first byte of the XIP flash window
    fn flash_start(&self) -> u32;

    /// Size of the flash fitted to the reference board
    fn flash_size(&self) -> u32;

    /// Optional, the bootloaders of the supported boards all program 256 byte pages
    fn page_size(&self) -> u32 {
        256
    }

    /// Whether an image of `len` bytes placed at `base_address` stays inside flash
    fn fits_in_flash(&self, base_address: u32, len: usize) -> bool {
        let flash_start = u64::from(self.flash_start());
        let flash_end = flash_start + u64::from(self.flash_size());
        let base = u64::from(base_address);

        base >= flash_start && base.saturating_add(len as u64) <= flash_end
    }
}
