//! TX DMA descriptor for frame transmission.

use super::VolatileCell;
use super::bits::tx_status;

/// TX DMA descriptor (8 bytes, 8-byte aligned).
///
/// The USED bit in the status word is set while the buffer belongs to
/// software. Clearing it hands the buffer to the transmitter; the hardware
/// sets it again on the first buffer of a frame once the frame is sent.
#[repr(C, align(8))]
pub struct TxDescriptor {
    /// Word 0: buffer address
    addr: VolatileCell<u32>,
    /// Word 1: length / LAST_BUFFER / WRAP / USED / error bits
    status: VolatileCell<u32>,
}

impl TxDescriptor {
    /// Size of the descriptor in bytes
    pub const SIZE: usize = 8;

    /// Create a new zeroed TX descriptor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            addr: VolatileCell::new(0),
            status: VolatileCell::new(0),
        }
    }

    /// Bind the descriptor to a buffer and mark it free for software.
    pub fn setup(&self, buffer_addr: u32, wrap: bool) {
        let mut status = tx_status::USED;
        if wrap {
            status |= tx_status::WRAP;
        }
        self.addr.set(buffer_addr);
        self.status.set(status);
    }

    /// Check if the buffer is free for software.
    #[inline(always)]
    #[must_use]
    pub fn is_used(&self) -> bool {
        (self.status.get() & tx_status::USED) != 0
    }

    /// Mark the buffer as free again after its frame was sent.
    #[inline(always)]
    pub fn mark_used(&self) {
        self.status.update(|v| v | tx_status::USED);
    }

    /// Write length and flags. Clearing USED passes the buffer to the DMA.
    pub fn prepare(&self, len: usize, last_buffer: bool, wrap: bool) {
        let mut status = (len as u32) & tx_status::LENGTH_MASK;
        if last_buffer {
            status |= tx_status::LAST_BUFFER;
        }
        if wrap {
            status |= tx_status::WRAP;
        }
        self.status.set(status);
    }

    /// Check if this buffer ends its frame.
    #[inline(always)]
    #[must_use]
    pub fn is_last_buffer(&self) -> bool {
        (self.status.get() & tx_status::LAST_BUFFER) != 0
    }

    /// Check if this is the last descriptor of the ring.
    #[inline(always)]
    #[must_use]
    pub fn has_wrap(&self) -> bool {
        (self.status.get() & tx_status::WRAP) != 0
    }

    /// Number of bytes queued in this buffer.
    #[inline(always)]
    #[must_use]
    pub fn length(&self) -> usize {
        (self.status.get() & tx_status::LENGTH_MASK) as usize
    }

    /// Get all error flags reported by the hardware.
    #[inline(always)]
    #[must_use]
    pub fn error_flags(&self) -> u32 {
        self.status.get() & tx_status::ALL_ERRORS
    }

    /// Get buffer address.
    #[inline(always)]
    #[must_use]
    pub fn buffer_addr(&self) -> u32 {
        self.addr.get()
    }

    /// Get raw status word for debugging.
    #[inline(always)]
    #[must_use]
    pub fn raw_status(&self) -> u32 {
        self.status.get()
    }

    /// Play the hardware: report the frame starting here as sent.
    #[cfg(test)]
    pub fn complete(&self, error_flags: u32) {
        self.status
            .update(|v| v | tx_status::USED | (error_flags & tx_status::ALL_ERRORS));
    }
}

impl Default for TxDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

// Safety: TxDescriptor uses volatile cells for all hardware-shared fields.
unsafe impl Sync for TxDescriptor {}
unsafe impl Send for TxDescriptor {}
