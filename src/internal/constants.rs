//! Centralized Constants
//!
//! This module provides a single source of truth for the sizes, timeouts and
//! defaults used throughout the MACB driver.
//!
//! # Organization
//!
//! Constants are grouped by category:
//! - **Frame/Buffer sizes**: Ethernet frame dimensions and DMA buffer sizes
//! - **Default configurations**: Default buffer counts and station address
//! - **Timing**: Waits and polling bounds
//! - **Clock frequencies**: MDC limits
//!
//! # Note
//!
//! Hardware register bit definitions remain in `register/macb.rs` and the
//! descriptor bit modules.

// =============================================================================
// Frame and Buffer Sizes
// =============================================================================

/// Maximum Ethernet frame size without FCS (1500 + 14 header)
pub const MAX_FRAME_SIZE: usize = 1514;

/// Standard Ethernet MTU (Maximum Transmission Unit)
pub const MTU: usize = 1500;

/// Ethernet header size (dst MAC + src MAC + EtherType)
pub const ETH_HEADER_SIZE: usize = 14;

/// MAC address length in bytes
pub const MAC_ADDR_LEN: usize = 6;

/// Size of each receive buffer. Fixed by the MACB receive engine.
pub const RX_BUFFER_SIZE: usize = 128;

/// Largest TX buffer the descriptor length field can describe
pub const MAX_TX_BUFFER_SIZE: usize = 0x07FF;

// =============================================================================
// Default Configuration
// =============================================================================

/// Default number of receive descriptors/buffers
pub const DEFAULT_RX_BUFFERS: usize = 20;

/// Default number of transmit descriptors/buffers
pub const DEFAULT_TX_BUFFERS: usize = 4;

/// Default transmit buffer size
pub const DEFAULT_TX_BUFFER_SIZE: usize = 512;

// A frame only starts once its last buffer is queued, so the default ring
// must hold a full-size frame.
const _: () = assert!(DEFAULT_TX_BUFFERS * DEFAULT_TX_BUFFER_SIZE >= MAX_FRAME_SIZE);

/// Default station address (locally administered)
pub const DEFAULT_MAC_ADDR: [u8; MAC_ADDR_LEN] = [0x00, 0x04, 0x25, 0x1C, 0xA0, 0x02];

// =============================================================================
// Timing Constants
// =============================================================================

/// Wait between retries while no TX buffer is free, in milliseconds
pub const BUFFER_WAIT_DELAY_MS: u32 = 2;

/// Poll interval while waiting for link up, in milliseconds
pub const LINK_POLL_INTERVAL_MS: u32 = 1;

/// Poll interval of `wait_for_input`, in milliseconds
pub const INPUT_POLL_INTERVAL_MS: u32 = 1;

/// Maximum NSR reads waiting for an MDIO transaction to finish
pub const MDIO_IDLE_POLL_LIMIT: u32 = 100_000;

/// Maximum BMCR reads waiting for a PHY soft reset to self-clear
pub const SOFT_RESET_MAX_ATTEMPTS: u32 = 1000;

/// Poll interval while waiting for a PHY soft reset, in microseconds
pub const RESET_POLL_INTERVAL_US: u32 = 100;

// =============================================================================
// Clock Frequencies
// =============================================================================

/// Maximum MDC frequency in Hz (IEEE 802.3 limit)
pub const MDC_MAX_FREQ_HZ: u32 = 2_500_000;

/// Fastest peripheral clock the MDC divider can bring within limits
pub const MDC_MAX_PERIPHERAL_CLK_HZ: u32 = 160_000_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tx_buffer_fits_length_field() {
        assert!(DEFAULT_TX_BUFFER_SIZE <= MAX_TX_BUFFER_SIZE);
    }

    #[test]
    fn default_tx_ring_holds_full_frame() {
        assert!(MAX_FRAME_SIZE.div_ceil(DEFAULT_TX_BUFFER_SIZE) <= DEFAULT_TX_BUFFERS);
    }

    #[test]
    fn max_frame_is_mtu_plus_header() {
        assert_eq!(MAX_FRAME_SIZE, MTU + ETH_HEADER_SIZE);
    }

    #[test]
    fn mdc_divider_range_covers_limit() {
        // Largest divider (64) keeps MDC at the limit for the fastest clock
        assert!(MDC_MAX_PERIPHERAL_CLK_HZ / 64 <= MDC_MAX_FREQ_HZ);
    }

    #[test]
    fn rx_buffer_is_word_multiple() {
        assert_eq!(RX_BUFFER_SIZE % 4, 0);
    }
}
