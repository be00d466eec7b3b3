//! MDIO (Management Data Input/Output) HAL
//!
//! This module provides the MDIO bus abstraction used to talk to Ethernet
//! PHYs, and its implementation on the MACB PHY Maintenance (MAN) register.

use crate::driver::error::{ConfigError, IoError, Result};
use crate::internal::constants::{MDC_MAX_PERIPHERAL_CLK_HZ, MDIO_IDLE_POLL_LIMIT};
use crate::internal::register::RegisterAccess;
use crate::internal::register::macb::{
    MAN_CODE, MAN_DATA_MASK, MAN_PHYA_MASK, MAN_PHYA_SHIFT, MAN_REGA_MASK, MAN_REGA_SHIFT,
    MAN_RW_READ, MAN_RW_WRITE, MAN_SOF, MacbRegs,
};

// =============================================================================
// MDIO Constants
// =============================================================================

/// Maximum valid PHY address (5-bit field)
pub const MAX_PHY_ADDR: u8 = 31;

/// Maximum valid register address (5-bit field)
pub const MAX_REG_ADDR: u8 = 31;

/// MDC clock divider, programmed into NCFGR.CLK
///
/// MDC must not exceed 2.5 MHz, so each divider covers peripheral clocks up
/// to 2.5 MHz times its ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MdcClockDivider {
    /// Clock/8 (up to 20 MHz)
    Div8 = 0,
    /// Clock/16 (up to 40 MHz)
    Div16 = 1,
    /// Clock/32 (up to 80 MHz)
    Div32 = 2,
    /// Clock/64 (up to 160 MHz)
    #[default]
    Div64 = 3,
}

impl MdcClockDivider {
    /// Smallest divider that keeps MDC within limits, or `None` above 160 MHz.
    #[must_use]
    pub const fn from_clock_hz(hz: u32) -> Option<Self> {
        if hz <= 20_000_000 {
            Some(Self::Div8)
        } else if hz <= 40_000_000 {
            Some(Self::Div16)
        } else if hz <= 80_000_000 {
            Some(Self::Div32)
        } else if hz <= MDC_MAX_PERIPHERAL_CLK_HZ {
            Some(Self::Div64)
        } else {
            None
        }
    }

    /// Divider for a peripheral clock known at build time.
    ///
    /// A clock above 160 MHz fails the build:
    ///
    /// ```ignore
    /// const DIV: MdcClockDivider = MdcClockDivider::for_peripheral_clock::<66_000_000>();
    /// ```
    #[must_use]
    pub const fn for_peripheral_clock<const HZ: u32>() -> Self {
        const {
            assert!(
                HZ <= MDC_MAX_PERIPHERAL_CLK_HZ,
                "peripheral clock too fast for any MDC divider"
            )
        };
        match Self::from_clock_hz(HZ) {
            Some(divider) => divider,
            None => Self::Div64,
        }
    }

    /// Get the divider value for register programming
    #[must_use]
    pub const fn to_reg_value(self) -> u32 {
        self as u32
    }

    /// Division ratio
    #[must_use]
    pub const fn ratio(self) -> u32 {
        8 << (self as u32)
    }
}

// =============================================================================
// MDIO Bus Trait
// =============================================================================

/// Trait for MDIO bus operations
///
/// This trait can be implemented by different backends, allowing
/// the PHY driver to work with various MDIO implementations.
pub trait MdioBus {
    /// Read a PHY register
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16>;

    /// Write a PHY register
    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()>;
}

// =============================================================================
// MACB MDIO
// =============================================================================

/// MDIO bus driven by the MACB management port
///
/// Each transaction enables the management port, writes one MAN frame, polls
/// NSR.IDLE, and disables the port again, even when the poll gives up.
#[derive(Debug)]
pub struct MacbMdio<'a, B: RegisterAccess> {
    regs: &'a MacbRegs<B>,
    /// NSR reads before a transaction counts as stuck
    poll_limit: u32,
}

impl<'a, B: RegisterAccess> MacbMdio<'a, B> {
    /// Create an MDIO bus on the given register block
    pub const fn new(regs: &'a MacbRegs<B>) -> Self {
        Self {
            regs,
            poll_limit: MDIO_IDLE_POLL_LIMIT,
        }
    }

    /// Override the idle poll bound
    #[must_use]
    pub const fn with_poll_limit(mut self, poll_limit: u32) -> Self {
        self.poll_limit = poll_limit;
        self
    }

    /// Build the MAN register value for one transaction
    #[must_use]
    pub const fn frame(phy_addr: u8, reg_addr: u8, op: u32, data: u16) -> u32 {
        MAN_SOF
            | op
            | (((phy_addr as u32) << MAN_PHYA_SHIFT) & MAN_PHYA_MASK)
            | (((reg_addr as u32) << MAN_REGA_SHIFT) & MAN_REGA_MASK)
            | MAN_CODE
            | data as u32
    }

    fn wait_idle(&self) -> Result<()> {
        for _ in 0..self.poll_limit {
            if self.regs.is_mdio_idle() {
                return Ok(());
            }
        }
        Err(IoError::Timeout.into())
    }

    fn transaction(&mut self, phy_addr: u8, reg_addr: u8, op: u32, data: u16) -> Result<u16> {
        if phy_addr > MAX_PHY_ADDR {
            return Err(ConfigError::InvalidPhyAddress.into());
        }
        if reg_addr > MAX_REG_ADDR {
            return Err(ConfigError::InvalidConfig.into());
        }

        self.regs.enable_management_port();
        self.regs.set_man(Self::frame(phy_addr, reg_addr, op, data));
        let result = self
            .wait_idle()
            .map(|()| (self.regs.man() & MAN_DATA_MASK) as u16);
        self.regs.disable_management_port();
        result
    }
}

impl<B: RegisterAccess> MdioBus for MacbMdio<'_, B> {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        self.transaction(phy_addr, reg_addr, MAN_RW_READ, 0)
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        self.transaction(phy_addr, reg_addr, MAN_RW_WRITE, value)
            .map(|_| ())
    }
}

// =============================================================================
// PHY Register Definitions (IEEE 802.3 standard registers)
// =============================================================================

/// Standard PHY register addresses (IEEE 802.3 Clause 22)
pub mod phy_reg {
    /// Basic Mode Control Register
    pub const BMCR: u8 = 0;
    /// Basic Mode Status Register
    pub const BMSR: u8 = 1;
    /// PHY Identifier 1
    pub const PHYIDR1: u8 = 2;
    /// PHY Identifier 2
    pub const PHYIDR2: u8 = 3;
    /// Auto-Negotiation Advertisement Register
    pub const ANAR: u8 = 4;
    /// Auto-Negotiation Link Partner Ability Register
    pub const ANLPAR: u8 = 5;
    /// Auto-Negotiation Expansion Register
    pub const ANER: u8 = 6;
}

/// BMCR (Basic Mode Control Register) bits
pub mod bmcr {
    /// Soft reset
    pub const RESET: u16 = 1 << 15;
    /// Loopback mode
    pub const LOOPBACK: u16 = 1 << 14;
    /// Speed select (100 Mbps if set)
    pub const SPEED_100: u16 = 1 << 13;
    /// Auto-negotiation enable
    pub const AN_ENABLE: u16 = 1 << 12;
    /// Power down
    pub const POWER_DOWN: u16 = 1 << 11;
    /// Isolate
    pub const ISOLATE: u16 = 1 << 10;
    /// Restart auto-negotiation
    pub const AN_RESTART: u16 = 1 << 9;
    /// Duplex mode (full duplex if set)
    pub const DUPLEX_FULL: u16 = 1 << 8;
}

/// BMSR (Basic Mode Status Register) bits
pub mod bmsr {
    /// 100BASE-TX full duplex capable
    pub const TX_FD_CAPABLE: u16 = 1 << 14;
    /// 100BASE-TX half duplex capable
    pub const TX_HD_CAPABLE: u16 = 1 << 13;
    /// 10BASE-T full duplex capable
    pub const T10_FD_CAPABLE: u16 = 1 << 12;
    /// 10BASE-T half duplex capable
    pub const T10_HD_CAPABLE: u16 = 1 << 11;
    /// Auto-negotiation complete
    pub const AN_COMPLETE: u16 = 1 << 5;
    /// Auto-negotiation ability
    pub const AN_ABILITY: u16 = 1 << 3;
    /// Link status (latched low)
    pub const LINK_STATUS: u16 = 1 << 2;
    /// Extended capabilities
    pub const EXT_CAPABLE: u16 = 1 << 0;
}

/// ANAR (Auto-Negotiation Advertisement Register) bits
pub mod anar {
    /// Pause capable
    pub const PAUSE: u16 = 1 << 10;
    /// 100BASE-T4
    pub const T4: u16 = 1 << 9;
    /// 100BASE-TX full duplex
    pub const TX_FD: u16 = 1 << 8;
    /// 100BASE-TX half duplex
    pub const TX_HD: u16 = 1 << 7;
    /// 10BASE-T full duplex
    pub const T10_FD: u16 = 1 << 6;
    /// 10BASE-T half duplex
    pub const T10_HD: u16 = 1 << 5;
    /// Every 10/100 mode
    pub const ALL_MODES: u16 = TX_FD | TX_HD | T10_FD | T10_HD;
    /// Selector field (IEEE 802.3)
    pub const SELECTOR: u16 = 0x001F;
    /// IEEE 802.3 (CSMA/CD) selector value
    pub const SELECTOR_IEEE802_3: u16 = 0x0001;
}

/// ANLPAR (Auto-Negotiation Link Partner Ability Register) bits
///
/// Same bit layout as ANAR, but represents what the link partner advertises.
pub mod anlpar {
    /// 100BASE-TX full duplex
    pub const CAN_100_FD: u16 = 1 << 8;
    /// 100BASE-TX half duplex
    pub const CAN_100_HD: u16 = 1 << 7;
    /// 10BASE-T full duplex
    pub const CAN_10_FD: u16 = 1 << 6;
    /// 10BASE-T half duplex
    pub const CAN_10_HD: u16 = 1 << 5;
    /// IEEE 802.3 selector value
    pub const SELECTOR_802_3: u16 = 0x0001;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;
    use crate::driver::error::Error;
    use crate::internal::register::macb::{MAN_OFFSET, MAN_RW_MASK, NCR_MPE, NCR_OFFSET};
    use crate::testing::MockRegisters;

    // =========================================================================
    // Clock Divider Tests
    // =========================================================================

    #[test]
    fn divider_picks_smallest_ratio_within_limit() {
        assert_eq!(MdcClockDivider::from_clock_hz(12_000_000), Some(MdcClockDivider::Div8));
        assert_eq!(MdcClockDivider::from_clock_hz(20_000_000), Some(MdcClockDivider::Div8));
        assert_eq!(MdcClockDivider::from_clock_hz(33_000_000), Some(MdcClockDivider::Div16));
        assert_eq!(MdcClockDivider::from_clock_hz(66_000_000), Some(MdcClockDivider::Div32));
        assert_eq!(MdcClockDivider::from_clock_hz(160_000_000), Some(MdcClockDivider::Div64));
        assert_eq!(MdcClockDivider::from_clock_hz(160_000_001), None);
    }

    #[test]
    fn divider_keeps_mdc_under_limit() {
        for hz in [1_000_000, 20_000_000, 40_000_000, 80_000_000, 120_000_000, 160_000_000] {
            let div = MdcClockDivider::from_clock_hz(hz).unwrap();
            assert!(hz / div.ratio() <= crate::internal::constants::MDC_MAX_FREQ_HZ, "{hz}");
        }
    }

    #[test]
    fn build_time_divider() {
        const DIV: MdcClockDivider = MdcClockDivider::for_peripheral_clock::<66_000_000>();
        assert_eq!(DIV, MdcClockDivider::Div32);
        assert_eq!(DIV.to_reg_value(), 2);
    }

    // =========================================================================
    // Transaction Tests
    // =========================================================================

    fn man_writes(mock: &MockRegisters) -> Vec<u32> {
        mock.writes()
            .into_iter()
            .filter(|(offset, _)| *offset == MAN_OFFSET)
            .map(|(_, value)| value)
            .collect()
    }

    #[test]
    fn read_frame_layout() {
        let mock = MockRegisters::new();
        mock.set_phy_register(1, phy_reg::PHYIDR1, 0x2000);
        let regs = MacbRegs::new(&mock);
        let mut mdio = MacbMdio::new(&regs);

        assert_eq!(mdio.read(1, phy_reg::PHYIDR1).unwrap(), 0x2000);

        let frames = man_writes(&mock);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0] >> 30, 0b01);
        assert_eq!(frames[0] & MAN_RW_MASK, MAN_RW_READ);
        assert_eq!((frames[0] & MAN_PHYA_MASK) >> MAN_PHYA_SHIFT, 1);
        assert_eq!((frames[0] & MAN_REGA_MASK) >> MAN_REGA_SHIFT, 2);
        assert_eq!((frames[0] >> 16) & 0b11, 0b10);
    }

    #[test]
    fn write_frame_carries_data() {
        let mock = MockRegisters::new();
        let regs = MacbRegs::new(&mock);
        let mut mdio = MacbMdio::new(&regs);

        mdio.write(3, phy_reg::ANAR, 0x01E1).unwrap();

        assert_eq!(
            man_writes(&mock),
            [MAN_SOF | MAN_RW_WRITE | (3 << 23) | (4 << 18) | MAN_CODE | 0x01E1]
        );
        assert_eq!(mock.phy_register(3, phy_reg::ANAR), 0x01E1);
    }

    #[test]
    fn management_port_enabled_only_during_transaction() {
        let mock = MockRegisters::new();
        let regs = MacbRegs::new(&mock);
        let mut mdio = MacbMdio::new(&regs);

        mdio.read(0, phy_reg::BMSR).unwrap();

        let ncr: Vec<u32> = mock
            .writes()
            .into_iter()
            .filter(|(offset, _)| *offset == NCR_OFFSET)
            .map(|(_, value)| value)
            .collect();
        assert_eq!(ncr.len(), 2);
        assert_eq!(ncr[0] & NCR_MPE, NCR_MPE);
        assert_eq!(ncr[1] & NCR_MPE, 0);
    }

    #[test]
    fn stuck_bus_times_out_and_releases_port() {
        let mock = MockRegisters::new();
        mock.hold_mdio_busy(true);
        let regs = MacbRegs::new(&mock);
        let mut mdio = MacbMdio::new(&regs).with_poll_limit(10);

        assert!(!regs.is_mdio_idle());
        assert_eq!(mdio.read(0, phy_reg::BMSR), Err(Error::Io(IoError::Timeout)));
        assert_eq!(regs.ncr() & NCR_MPE, 0);
    }

    #[test]
    fn out_of_range_addresses_rejected() {
        let mock = MockRegisters::new();
        let regs = MacbRegs::new(&mock);
        let mut mdio = MacbMdio::new(&regs);

        assert_eq!(
            mdio.read(32, phy_reg::BMCR),
            Err(Error::Config(ConfigError::InvalidPhyAddress))
        );
        assert_eq!(
            mdio.write(0, 32, 0),
            Err(Error::Config(ConfigError::InvalidConfig))
        );
        assert!(man_writes(&mock).is_empty());
    }
}
