//! RX DMA descriptor for frame reception.

use super::VolatileCell;
use super::bits::{rx_addr, rx_status};

/// RX DMA descriptor (8 bytes, 8-byte aligned).
///
/// The ownership flag lives in bit 0 of the address word: clear means the
/// hardware may fill the buffer, set means it holds received data for
/// software.
#[repr(C, align(8))]
pub struct RxDescriptor {
    /// Word 0: buffer address | WRAP | OWNERSHIP
    addr: VolatileCell<u32>,
    /// Word 1: SOF / EOF / frame length
    status: VolatileCell<u32>,
}

impl RxDescriptor {
    /// Size of the descriptor in bytes
    pub const SIZE: usize = 8;

    /// Create a new zeroed RX descriptor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            addr: VolatileCell::new(0),
            status: VolatileCell::new(0),
        }
    }

    /// Bind the descriptor to a buffer and hand it to the hardware.
    pub fn setup(&self, buffer_addr: u32, wrap: bool) {
        let mut word = buffer_addr & rx_addr::ADDRESS_MASK;
        if wrap {
            word |= rx_addr::WRAP;
        }
        self.status.set(0);
        self.addr.set(word);
    }

    /// Check if the buffer holds received data for software.
    #[inline(always)]
    #[must_use]
    pub fn is_software_owned(&self) -> bool {
        (self.addr.get() & rx_addr::OWNERSHIP) != 0
    }

    /// Return the buffer to the hardware. The wrap flag is preserved.
    #[inline(always)]
    pub fn release(&self) {
        self.addr.update(|v| v & !rx_addr::OWNERSHIP);
    }

    /// Check if this buffer starts a frame.
    #[inline(always)]
    #[must_use]
    pub fn is_start_of_frame(&self) -> bool {
        (self.status.get() & rx_status::START_OF_FRAME) != 0
    }

    /// Frame length; nonzero only in the buffer that ends the frame.
    #[inline(always)]
    #[must_use]
    pub fn frame_length(&self) -> usize {
        (self.status.get() & rx_status::LENGTH_MASK) as usize
    }

    /// Check if this is the last descriptor of the ring.
    #[inline(always)]
    #[must_use]
    pub fn has_wrap(&self) -> bool {
        (self.addr.get() & rx_addr::WRAP) != 0
    }

    /// Buffer address without flag bits.
    #[inline(always)]
    #[must_use]
    pub fn buffer_addr(&self) -> u32 {
        self.addr.get() & rx_addr::ADDRESS_MASK
    }

    /// Get raw status word for debugging.
    #[inline(always)]
    #[must_use]
    pub fn raw_status(&self) -> u32 {
        self.status.get()
    }

    /// Play the hardware: write status and pass the buffer to software.
    #[cfg(test)]
    pub fn complete(&self, status: u32) {
        self.status.set(status);
        self.addr.update(|v| v | rx_addr::OWNERSHIP);
    }
}

impl Default for RxDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

// Safety: RxDescriptor uses volatile cells for all hardware-shared fields.
unsafe impl Sync for RxDescriptor {}
unsafe impl Send for RxDescriptor {}
