//! Configuration types for the MACB driver

use crate::hal::interrupt::InterruptBinding;
use crate::hal::mdio::MdcClockDivider;
use crate::internal::constants::DEFAULT_MAC_ADDR;

/// Ethernet link speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Speed {
    /// 10 Mbps
    Mbps10,
    /// 100 Mbps
    #[default]
    Mbps100,
}

/// Ethernet duplex mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Duplex {
    /// Half duplex
    Half,
    /// Full duplex
    #[default]
    Full,
}

/// PHY interface type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhyInterface {
    /// Media Independent Interface
    Mii,
    /// Reduced Media Independent Interface
    #[default]
    Rmii,
}

/// What the PHY advertises during auto-negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkMode {
    /// Advertise every 10/100 mode
    #[default]
    AutoNegotiate,
    /// Advertise this single mode
    Fixed {
        /// Link speed
        speed: Speed,
        /// Duplex mode
        duplex: Duplex,
    },
}

/// Driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// `init` has not run yet
    #[default]
    Uninitialized,
    /// Link negotiated, TX/RX enabled
    Running,
    /// TX/RX disabled, by `disable` or a failed `init`
    Disabled,
}

/// MACB configuration
///
/// Ring sizes are const generics on [`Macb`](crate::Macb); everything else
/// lives here.
///
/// ```ignore
/// const CONFIG: MacbConfig = MacbConfig::new()
///     .with_station_address([0x00, 0x04, 0x25, 0x1C, 0xA0, 0x02])
///     .with_mdc_divider(MdcClockDivider::for_peripheral_clock::<66_000_000>())
///     .with_link_timeout_ms(5_000);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MacbConfig {
    /// Station (MAC) address
    pub station_address: [u8; 6],
    /// PHY interface type (MII or RMII)
    pub phy_interface: PhyInterface,
    /// Modes advertised to the link partner
    pub link_mode: LinkMode,
    /// MDC clock divider for the peripheral clock
    pub mdc_divider: MdcClockDivider,
    /// Link-up wait bound during `init`; `None` waits forever
    pub link_timeout_ms: Option<u32>,
    /// MAC interrupt handler; `None` for polled operation
    pub mac_interrupt: Option<InterruptBinding>,
}

impl Default for MacbConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MacbConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            station_address: DEFAULT_MAC_ADDR,
            phy_interface: PhyInterface::Rmii,
            link_mode: LinkMode::AutoNegotiate,
            mdc_divider: MdcClockDivider::Div64,
            link_timeout_ms: None,
            mac_interrupt: None,
        }
    }

    /// Set the station address
    #[must_use]
    pub const fn with_station_address(mut self, addr: [u8; 6]) -> Self {
        self.station_address = addr;
        self
    }

    /// Set the PHY interface type
    #[must_use]
    pub const fn with_phy_interface(mut self, interface: PhyInterface) -> Self {
        self.phy_interface = interface;
        self
    }

    /// Set the advertised link mode
    #[must_use]
    pub const fn with_link_mode(mut self, mode: LinkMode) -> Self {
        self.link_mode = mode;
        self
    }

    /// Set the MDC clock divider
    #[must_use]
    pub const fn with_mdc_divider(mut self, divider: MdcClockDivider) -> Self {
        self.mdc_divider = divider;
        self
    }

    /// Give up on the link after `timeout_ms` during `init`
    #[must_use]
    pub const fn with_link_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.link_timeout_ms = Some(timeout_ms);
        self
    }

    /// Register the MAC interrupt during `init`
    #[must_use]
    pub const fn with_mac_interrupt(mut self, binding: InterruptBinding) -> Self {
        self.mac_interrupt = Some(binding);
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
