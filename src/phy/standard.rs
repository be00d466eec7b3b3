//! Plain IEEE 802.3 PHY
//!
//! A PHY that needs nothing beyond the Clause 22 registers. The address and
//! identifier come from the board (PHYAD strapping and the datasheet).

use embedded_hal::digital::OutputPin;

use super::generic::{PhyDriver, WithReset};

/// PHY driven through the standard registers only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StandardPhy {
    /// PHY address (0-31)
    addr: u8,
    /// Expected identifier, revision nibble ignored
    id: u32,
}

impl StandardPhy {
    /// Create a driver for the PHY at `addr` identifying as `id`
    pub const fn new(addr: u8, id: u32) -> Self {
        Self { addr, id }
    }
}

impl PhyDriver for StandardPhy {
    fn address(&self) -> u8 {
        self.addr
    }

    fn expected_id(&self) -> u32 {
        self.id
    }
}

/// [`StandardPhy`] with a hardware reset pin
pub type StandardPhyWithReset<RST> = WithReset<StandardPhy, RST>;

impl<RST: OutputPin> WithReset<StandardPhy, RST> {
    /// Create a driver for the PHY at `addr` with reset line `reset_pin`
    pub fn with_pin(addr: u8, id: u32, reset_pin: RST) -> Self {
        WithReset::new(StandardPhy::new(addr, id), reset_pin)
    }
}
