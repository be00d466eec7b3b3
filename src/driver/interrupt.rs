//! Interrupt and status register decoding for the MACB.
//!
//! [`InterruptStatus`] parses ISR (which clears on read), [`ReceiveStatus`]
//! and [`TransmitStatus`] parse the write-1-to-clear RSR and TSR.

use crate::internal::register::macb::{
    INT_HRESP, INT_MFD, INT_RCOMP, INT_RLE, INT_ROVR, INT_RXUBR, INT_TCOMP, INT_TUND, INT_TXERR,
    INT_TXUBR, RSR_BNA, RSR_OVR, RSR_REC, TSR_BEX, TSR_COL, TSR_COMP, TSR_RLE, TSR_TGO, TSR_UBR,
    TSR_UND,
};

// =============================================================================
// Interrupt Status
// =============================================================================

/// Interrupt causes parsed from the Interrupt Status register.
///
/// ```ignore
/// let status = InterruptStatus::from_raw(regs.isr());
/// if status.rx_complete {
///     // Frame received
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptStatus {
    /// PHY management frame done
    pub management_done: bool,
    /// Frame received
    pub rx_complete: bool,
    /// RX used bit read: no free receive buffer
    pub rx_used_bit_read: bool,
    /// TX used bit read: transmitter ran out of queued buffers
    pub tx_used_bit_read: bool,
    /// Transmit underrun
    pub tx_underrun: bool,
    /// Retry limit exceeded
    pub retry_limit_exceeded: bool,
    /// Transmit buffers exhausted in mid frame
    pub tx_error: bool,
    /// Frame transmitted
    pub tx_complete: bool,
    /// Receive overrun
    pub rx_overrun: bool,
    /// Bus error (HRESP not OK)
    pub bus_error: bool,
}

impl InterruptStatus {
    /// Decode a raw ISR value
    #[inline]
    pub const fn from_raw(status: u32) -> Self {
        Self {
            management_done: (status & INT_MFD) != 0,
            rx_complete: (status & INT_RCOMP) != 0,
            rx_used_bit_read: (status & INT_RXUBR) != 0,
            tx_used_bit_read: (status & INT_TXUBR) != 0,
            tx_underrun: (status & INT_TUND) != 0,
            retry_limit_exceeded: (status & INT_RLE) != 0,
            tx_error: (status & INT_TXERR) != 0,
            tx_complete: (status & INT_TCOMP) != 0,
            rx_overrun: (status & INT_ROVR) != 0,
            bus_error: (status & INT_HRESP) != 0,
        }
    }

    /// Encode as an IER/IDR mask
    #[inline]
    pub const fn to_raw(&self) -> u32 {
        let mut val = 0u32;
        if self.management_done {
            val |= INT_MFD;
        }
        if self.rx_complete {
            val |= INT_RCOMP;
        }
        if self.rx_used_bit_read {
            val |= INT_RXUBR;
        }
        if self.tx_used_bit_read {
            val |= INT_TXUBR;
        }
        if self.tx_underrun {
            val |= INT_TUND;
        }
        if self.retry_limit_exceeded {
            val |= INT_RLE;
        }
        if self.tx_error {
            val |= INT_TXERR;
        }
        if self.tx_complete {
            val |= INT_TCOMP;
        }
        if self.rx_overrun {
            val |= INT_ROVR;
        }
        if self.bus_error {
            val |= INT_HRESP;
        }
        val
    }

    /// Check if any cause is set
    #[inline]
    pub const fn any(&self) -> bool {
        self.to_raw() != 0
    }

    /// Check if any error cause is set
    #[inline]
    pub const fn has_error(&self) -> bool {
        self.tx_underrun
            || self.retry_limit_exceeded
            || self.tx_error
            || self.rx_overrun
            || self.bus_error
    }
}

// =============================================================================
// Receive / Transmit Status
// =============================================================================

/// Receive Status register flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceiveStatus {
    /// Buffer not available: the DMA found a software-owned descriptor
    pub buffer_not_available: bool,
    /// At least one frame received since the last clear
    pub frame_received: bool,
    /// Receive overrun
    pub overrun: bool,
}

impl ReceiveStatus {
    /// Decode a raw RSR value
    #[inline]
    pub const fn from_raw(status: u32) -> Self {
        Self {
            buffer_not_available: (status & RSR_BNA) != 0,
            frame_received: (status & RSR_REC) != 0,
            overrun: (status & RSR_OVR) != 0,
        }
    }
}

/// Transmit Status register flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransmitStatus {
    /// Used bit read: the queue ran dry
    pub used_bit_read: bool,
    /// Collision occurred
    pub collision: bool,
    /// Retry limit exceeded
    pub retry_limit_exceeded: bool,
    /// Transmit in progress
    pub transmit_go: bool,
    /// Buffers exhausted in mid frame
    pub buffers_exhausted: bool,
    /// Frame transmitted
    pub complete: bool,
    /// Transmit underrun
    pub underrun: bool,
}

impl TransmitStatus {
    /// Decode a raw TSR value
    #[inline]
    pub const fn from_raw(status: u32) -> Self {
        Self {
            used_bit_read: (status & TSR_UBR) != 0,
            collision: (status & TSR_COL) != 0,
            retry_limit_exceeded: (status & TSR_RLE) != 0,
            transmit_go: (status & TSR_TGO) != 0,
            buffers_exhausted: (status & TSR_BEX) != 0,
            complete: (status & TSR_COMP) != 0,
            underrun: (status & TSR_UND) != 0,
        }
    }

    /// Check if the last transmission failed
    #[inline]
    pub const fn has_error(&self) -> bool {
        self.retry_limit_exceeded || self.buffers_exhausted || self.underrun
    }

    /// TSR bits to write back to clear the reported failures
    #[inline]
    pub const fn error_bits(&self) -> u32 {
        let mut bits = 0;
        if self.retry_limit_exceeded {
            bits |= TSR_RLE;
        }
        if self.buffers_exhausted {
            bits |= TSR_BEX;
        }
        if self.underrun {
            bits |= TSR_UND;
        }
        bits
    }
}

// =============================================================================
// Dispatcher Outcome
// =============================================================================

/// What one pass of the interrupt handler did.
///
/// `switch_required` is advisory: it is set when a consumer is parked in
/// `wait_for_input` and a frame arrived. The trap shim decides what to do
/// with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptOutcome {
    /// Causes read at entry
    pub status: InterruptStatus,
    /// The receive-ready counter was signalled
    pub rx_signalled: bool,
    /// TX descriptors handed back to software
    pub tx_reclaimed: usize,
    /// Transmit status read on a transmit-complete interrupt
    pub transmit: TransmitStatus,
    /// A waiting consumer should be scheduled
    pub switch_required: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================
