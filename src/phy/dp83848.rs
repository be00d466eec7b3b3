//! DP83848 PHY Driver
//!
//! Driver for the Texas Instruments DP83848 10/100 Ethernet PHY, the part
//! fitted on the AVR32 UC3 evaluation boards.
//!
//! # RMII
//!
//! The DP83848 comes out of reset in MII mode unless strapped otherwise.
//! [`PhyDriver::setup_rmii`] sets RBR.RMII_MODE.
//!
//! # Link Interrupt
//!
//! The PWR_DOWN/INT pin is turned into an interrupt output through MICR, and
//! MISR selects link-status changes as the source. Reading MISR acknowledges.
//!
//! ```ignore
//! use macb_emac::phy::{Dp83848, PhyDriver};
//!
//! let mut phy = Dp83848::new(1);
//! macb.init(&mut phy, &mut irq, &mut delay)?;
//! macb.enable_link_interrupt(&mut phy, &mut pin, &mut irq, binding)?;
//! ```

use embedded_hal::digital::OutputPin;

use crate::driver::error::Result;
use crate::hal::mdio::MdioBus;

use super::generic::{PhyDriver, WithReset};

// =============================================================================
// DP83848 Constants
// =============================================================================

/// DP83848 PHY Identifier
///
/// - PHYIDR1 (reg 2): 0x2000
/// - PHYIDR2 (reg 3): 0x5C9x (x = revision)
pub const DP83848_PHY_ID: u32 = 0x2000_5C90;

/// DP83848 vendor-specific register addresses
pub mod reg {
    /// PHY Status Register
    pub const PHYSTS: u8 = 0x10;
    /// MII Interrupt Control Register
    pub const MICR: u8 = 0x11;
    /// MII Interrupt Status and Misc. Control Register
    pub const MISR: u8 = 0x12;
    /// RMII and Bypass Register
    pub const RBR: u8 = 0x17;
}

/// MII Interrupt Control Register (0x11) bits
pub mod micr {
    /// Drive the PWR_DOWN/INT pin as an interrupt output
    pub const INTOE: u16 = 1 << 0;
    /// Enable interrupts
    pub const INTEN: u16 = 1 << 1;
}

/// MII Interrupt Status and Misc. Control Register (0x12) bits
pub mod misr {
    /// Interrupt on link status change
    pub const LINK_INT_EN: u16 = 1 << 5;
    /// Link status changed (cleared by reading MISR)
    pub const LINK_INT: u16 = 1 << 13;
}

/// RMII and Bypass Register (0x17) bits
pub mod rbr {
    /// RMII mode
    pub const RMII_MODE: u16 = 1 << 5;
}

// =============================================================================
// DP83848 Driver
// =============================================================================

/// DP83848 PHY Driver
///
/// Use [`Dp83848WithReset`] if the reset line is wired to a GPIO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dp83848 {
    /// PHY address (0-31)
    addr: u8,
}

impl Dp83848 {
    /// Create a new DP83848 driver
    ///
    /// # Arguments
    /// * `addr` - PHY address (set by the PHYAD strap pins)
    pub const fn new(addr: u8) -> Self {
        Self { addr }
    }

    /// Read interrupt status (clears on read)
    pub fn read_interrupt_status<M: MdioBus>(&self, mdio: &mut M) -> Result<u16> {
        mdio.read(self.addr, reg::MISR)
    }
}

impl PhyDriver for Dp83848 {
    fn address(&self) -> u8 {
        self.addr
    }

    fn expected_id(&self) -> u32 {
        DP83848_PHY_ID
    }

    fn setup_rmii<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        let rbr = mdio.read(self.addr, reg::RBR)?;
        mdio.write(self.addr, reg::RBR, rbr | rbr::RMII_MODE)
    }

    fn enable_link_interrupt<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        mdio.write(self.addr, reg::MICR, micr::INTEN | micr::INTOE)?;
        mdio.write(self.addr, reg::MISR, misr::LINK_INT_EN)
    }

    fn acknowledge_link_interrupt<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        self.read_interrupt_status(mdio).map(|_| ())
    }

    fn disable_link_interrupt<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        mdio.write(self.addr, reg::MISR, 0)?;
        mdio.write(self.addr, reg::MICR, 0)
    }
}

/// [`Dp83848`] with a hardware reset pin
pub type Dp83848WithReset<RST> = WithReset<Dp83848, RST>;

impl<RST: OutputPin> WithReset<Dp83848, RST> {
    /// Create a DP83848 driver with reset line `reset_pin`
    pub fn with_pin(addr: u8, reset_pin: RST) -> Self {
        WithReset::new(Dp83848::new(addr), reset_pin)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
