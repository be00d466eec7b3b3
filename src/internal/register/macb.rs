//! MACB Register Definitions
//!
//! Offsets and bit fields of the Cadence MACB register block as found on the
//! AVR32 UC3A, plus [`MacbRegs`], a typed view over any [`RegisterAccess`].

use super::{RegisterAccess, reg_bit_check, reg_bit_ops, reg_ro, reg_rw, reg_wo};

// =============================================================================
// Register Offsets
// =============================================================================

/// Network Control Register offset
pub const NCR_OFFSET: usize = 0x00;
/// Network Configuration Register offset
pub const NCFGR_OFFSET: usize = 0x04;
/// Network Status Register offset (read-only)
pub const NSR_OFFSET: usize = 0x08;
/// Transmit Status Register offset (write-1-to-clear)
pub const TSR_OFFSET: usize = 0x14;
/// Receive Buffer Queue Pointer offset
pub const RBQP_OFFSET: usize = 0x18;
/// Transmit Buffer Queue Pointer offset
pub const TBQP_OFFSET: usize = 0x1C;
/// Receive Status Register offset (write-1-to-clear)
pub const RSR_OFFSET: usize = 0x20;
/// Interrupt Status Register offset (clear-on-read)
pub const ISR_OFFSET: usize = 0x24;
/// Interrupt Enable Register offset (write-only)
pub const IER_OFFSET: usize = 0x28;
/// Interrupt Disable Register offset (write-only)
pub const IDR_OFFSET: usize = 0x2C;
/// Interrupt Mask Register offset (read-only)
pub const IMR_OFFSET: usize = 0x30;
/// PHY Maintenance Register offset
pub const MAN_OFFSET: usize = 0x34;
/// Specific Address 1 Bottom offset (station address bytes 0..=3)
pub const SA1B_OFFSET: usize = 0x98;
/// Specific Address 1 Top offset (station address bytes 4..=5)
pub const SA1T_OFFSET: usize = 0x9C;
/// User Input/Output Register offset (MII/RMII select)
pub const USRIO_OFFSET: usize = 0xC0;

// =============================================================================
// NCR Bits
// =============================================================================

/// Receive enable
pub const NCR_RE: u32 = 1 << 2;
/// Transmit enable
pub const NCR_TE: u32 = 1 << 3;
/// Management port enable
pub const NCR_MPE: u32 = 1 << 4;
/// Start transmission (self-clearing)
pub const NCR_TSTART: u32 = 1 << 9;

// =============================================================================
// NCFGR Bits
// =============================================================================

/// Speed: set for 100 Mbps
pub const NCFGR_SPD: u32 = 1 << 0;
/// Full duplex
pub const NCFGR_FD: u32 = 1 << 1;
/// MDC clock divider field shift
pub const NCFGR_CLK_SHIFT: u32 = 10;
/// MDC clock divider field mask
pub const NCFGR_CLK_MASK: u32 = 0x3 << NCFGR_CLK_SHIFT;
/// Discard receive FCS (do not copy FCS to RX buffers)
pub const NCFGR_DRFCS: u32 = 1 << 17;

// =============================================================================
// NSR Bits
// =============================================================================

/// PHY management logic idle
pub const NSR_IDLE: u32 = 1 << 2;

// =============================================================================
// TSR Bits
// =============================================================================

/// Used bit read
pub const TSR_UBR: u32 = 1 << 0;
/// Collision occurred
pub const TSR_COL: u32 = 1 << 1;
/// Retry limit exceeded
pub const TSR_RLE: u32 = 1 << 2;
/// Transmit go
pub const TSR_TGO: u32 = 1 << 3;
/// Buffers exhausted mid frame
pub const TSR_BEX: u32 = 1 << 4;
/// Transmit complete
pub const TSR_COMP: u32 = 1 << 5;
/// Transmit underrun
pub const TSR_UND: u32 = 1 << 6;

// =============================================================================
// RSR Bits
// =============================================================================

/// Buffer not available
pub const RSR_BNA: u32 = 1 << 0;
/// Frame received
pub const RSR_REC: u32 = 1 << 1;
/// Receive overrun
pub const RSR_OVR: u32 = 1 << 2;

// =============================================================================
// ISR / IER / IDR / IMR Bits
// =============================================================================

/// Management frame done
pub const INT_MFD: u32 = 1 << 0;
/// Receive complete
pub const INT_RCOMP: u32 = 1 << 1;
/// Receive used bit read
pub const INT_RXUBR: u32 = 1 << 2;
/// Transmit used bit read
pub const INT_TXUBR: u32 = 1 << 3;
/// Transmit underrun
pub const INT_TUND: u32 = 1 << 4;
/// Retry limit exceeded
pub const INT_RLE: u32 = 1 << 5;
/// Transmit error (buffers exhausted mid frame)
pub const INT_TXERR: u32 = 1 << 6;
/// Transmit complete
pub const INT_TCOMP: u32 = 1 << 7;
/// Receive overrun
pub const INT_ROVR: u32 = 1 << 10;
/// HRESP not OK (bus error)
pub const INT_HRESP: u32 = 1 << 11;

// =============================================================================
// MAN Fields
// =============================================================================

/// Start of frame (must be 01)
pub const MAN_SOF: u32 = 0b01 << 30;
/// Read operation
pub const MAN_RW_READ: u32 = 0b10 << 28;
/// Write operation
pub const MAN_RW_WRITE: u32 = 0b01 << 28;
/// Operation field mask
pub const MAN_RW_MASK: u32 = 0b11 << 28;
/// PHY address shift
pub const MAN_PHYA_SHIFT: u32 = 23;
/// PHY address mask
pub const MAN_PHYA_MASK: u32 = 0x1F << MAN_PHYA_SHIFT;
/// Register address shift
pub const MAN_REGA_SHIFT: u32 = 18;
/// Register address mask
pub const MAN_REGA_MASK: u32 = 0x1F << MAN_REGA_SHIFT;
/// Turnaround code (must be 10)
pub const MAN_CODE: u32 = 0b10 << 16;
/// Data field mask
pub const MAN_DATA_MASK: u32 = 0xFFFF;

// =============================================================================
// USRIO Bits
// =============================================================================

/// MII mode when set, RMII when clear
pub const USRIO_MII: u32 = 1 << 0;

// =============================================================================
// Register Block
// =============================================================================

/// Typed accessors over a MACB register block.
#[derive(Debug, Clone, Copy)]
pub struct MacbRegs<B: RegisterAccess> {
    bus: B,
}

impl<B: RegisterAccess> MacbRegs<B> {
    /// Wrap a register bus
    pub const fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Underlying register bus
    #[inline(always)]
    pub fn bus(&self) -> &B {
        &self.bus
    }

    // -------------------------------------------------------------------------
    // Register accessors (generated by macros)
    // -------------------------------------------------------------------------

    reg_rw!(ncr, set_ncr, NCR_OFFSET, "Network Control register");
    reg_rw!(ncfgr, set_ncfgr, NCFGR_OFFSET, "Network Configuration register");
    reg_rw!(tsr, set_tsr, TSR_OFFSET, "Transmit Status register");
    reg_rw!(rbqp, set_rbqp, RBQP_OFFSET, "Receive Buffer Queue Pointer");
    reg_rw!(tbqp, set_tbqp, TBQP_OFFSET, "Transmit Buffer Queue Pointer");
    reg_rw!(rsr, set_rsr, RSR_OFFSET, "Receive Status register");
    reg_rw!(man, set_man, MAN_OFFSET, "PHY Maintenance register");
    reg_rw!(sa1b, set_sa1b, SA1B_OFFSET, "Specific Address 1 Bottom register");
    reg_rw!(sa1t, set_sa1t, SA1T_OFFSET, "Specific Address 1 Top register");
    reg_rw!(usrio, set_usrio, USRIO_OFFSET, "User Input/Output register");

    reg_ro!(nsr, NSR_OFFSET, "Network Status register");
    reg_ro!(isr, ISR_OFFSET, "Interrupt Status register (clears on read)");
    reg_ro!(imr, IMR_OFFSET, "Interrupt Mask register");

    reg_wo!(set_ier, IER_OFFSET, "Interrupt Enable register");
    reg_wo!(set_idr, IDR_OFFSET, "Interrupt Disable register");

    // -------------------------------------------------------------------------
    // Bit operations (generated by macros)
    // -------------------------------------------------------------------------

    reg_bit_ops!(enable_rx, disable_rx, NCR_OFFSET, NCR_RE, "receiver", "Enable", "Disable");
    reg_bit_ops!(enable_tx, disable_tx, NCR_OFFSET, NCR_TE, "transmitter", "Enable", "Disable");
    reg_bit_ops!(
        enable_management_port,
        disable_management_port,
        NCR_OFFSET,
        NCR_MPE,
        "management port",
        "Enable",
        "Disable"
    );
    reg_bit_ops!(
        enable_fcs_discard,
        disable_fcs_discard,
        NCFGR_OFFSET,
        NCFGR_DRFCS,
        "receive FCS discard",
        "Enable",
        "Disable"
    );

    reg_bit_check!(is_mdio_idle, NSR_OFFSET, NSR_IDLE, "Check if the PHY management logic is idle");

    // -------------------------------------------------------------------------
    // Composite operations
    // -------------------------------------------------------------------------

    /// Kick the transmitter to start on the queued descriptors
    #[inline(always)]
    pub fn start_transmission(&self) {
        self.bus.set_bits(NCR_OFFSET, NCR_TSTART);
    }

    /// Clear RSR status bits and read back to flush the write
    #[inline(always)]
    pub fn clear_rx_status(&self, bits: u32) {
        self.set_rsr(bits);
        let _ = self.rsr();
    }

    /// Clear TSR status bits and read back to flush the write
    #[inline(always)]
    pub fn clear_tx_status(&self, bits: u32) {
        self.set_tsr(bits);
        let _ = self.tsr();
    }

    /// Program the MDC divider field, keeping the other NCFGR bits
    pub fn set_mdc_divider(&self, divider_bits: u32) {
        self.bus.modify(NCFGR_OFFSET, |v| {
            (v & !NCFGR_CLK_MASK) | ((divider_bits << NCFGR_CLK_SHIFT) & NCFGR_CLK_MASK)
        });
    }

    /// Program speed and duplex, keeping the other NCFGR bits
    pub fn set_link(&self, mbps100: bool, full_duplex: bool) {
        self.bus.modify(NCFGR_OFFSET, |v| {
            let mut value = v & !(NCFGR_SPD | NCFGR_FD);
            if mbps100 {
                value |= NCFGR_SPD;
            }
            if full_duplex {
                value |= NCFGR_FD;
            }
            value
        });
    }

    /// Write the station address: bytes 0..=3 to SA1B, 4..=5 to SA1T.
    ///
    /// SA1B is written first; the hardware activates the filter on the SA1T write.
    pub fn set_station_address(&self, addr: &[u8; 6]) {
        self.set_sa1b(u32::from_le_bytes([addr[0], addr[1], addr[2], addr[3]]));
        self.set_sa1t(u32::from(addr[4]) | (u32::from(addr[5]) << 8));
    }

    /// Select MII (`true`) or RMII (`false`) signalling
    pub fn select_mii(&self, mii: bool) {
        if mii {
            self.bus.set_bits(USRIO_OFFSET, USRIO_MII);
        } else {
            self.bus.clear_bits(USRIO_OFFSET, USRIO_MII);
        }
    }
}
