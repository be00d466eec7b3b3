//! DMA descriptor bit field constants.
//!
//! MACB descriptors are two 32-bit words: a buffer address word and a
//! status word. The receive side keeps its ownership and wrap flags in the
//! two low bits of the address word, which is why buffers must be 4-byte
//! aligned.

// =============================================================================
// RX Word 0 - Buffer Address
// =============================================================================

/// RX descriptor word 0 (address + ownership/wrap flags)
pub mod rx_addr {
    /// Ownership - set by hardware when the buffer holds data for software
    pub const OWNERSHIP: u32 = 1 << 0;
    /// Wrap - marks the last descriptor of the ring
    pub const WRAP: u32 = 1 << 1;
    /// Buffer address bits (4-byte aligned)
    pub const ADDRESS_MASK: u32 = 0xFFFF_FFFC;
}

// =============================================================================
// RX Word 1 - Status
// =============================================================================

/// RX descriptor word 1 (status written by hardware)
pub mod rx_status {
    /// Frame length, valid in the buffer that ends the frame
    pub const LENGTH_MASK: u32 = 0x0FFF;
    /// Start of frame - first buffer of a frame
    pub const START_OF_FRAME: u32 = 1 << 14;
    /// End of frame - last buffer of a frame
    pub const END_OF_FRAME: u32 = 1 << 15;
}

// =============================================================================
// TX Word 1 - Status/Control
// =============================================================================

/// TX descriptor word 1 (length, control and completion status)
pub mod tx_status {
    /// Number of bytes to transmit from this buffer
    pub const LENGTH_MASK: u32 = 0x07FF;
    /// Last buffer of the frame
    pub const LAST_BUFFER: u32 = 1 << 15;
    /// Do not append CRC
    pub const NO_CRC: u32 = 1 << 16;
    /// Buffers exhausted mid frame
    pub const BUFFERS_EXHAUSTED: u32 = 1 << 27;
    /// Transmit underrun
    pub const UNDERRUN: u32 = 1 << 28;
    /// Retry limit exceeded
    pub const RETRY_LIMIT: u32 = 1 << 29;
    /// Wrap - marks the last descriptor of the ring
    pub const WRAP: u32 = 1 << 30;
    /// Used - set when the buffer belongs to software (transmitted or free)
    pub const USED: u32 = 1 << 31;

    /// All TX error bits
    pub const ALL_ERRORS: u32 = BUFFERS_EXHAUSTED | UNDERRUN | RETRY_LIMIT;
}
