//! Generic PHY Driver Trait
//!
//! This module defines the interface the MAC needs from an Ethernet PHY,
//! based on IEEE 802.3 Clause 22 standard registers. Vendor specifics
//! (reset pulse, RMII strapping, interrupt registers) live behind it.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::driver::config::{Duplex, Speed};
use crate::driver::error::{ConfigError, Result};
use crate::hal::mdio::{MdioBus, bmcr};

// =============================================================================
// Link Status
// =============================================================================

/// Ethernet link status information
///
/// Contains the negotiated link parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStatus {
    /// Link speed
    pub speed: Speed,
    /// Duplex mode
    pub duplex: Duplex,
}

impl LinkStatus {
    /// Create a new link status
    pub const fn new(speed: Speed, duplex: Duplex) -> Self {
        Self { speed, duplex }
    }

    /// 100 Mbps Full Duplex
    pub const fn fast_full() -> Self {
        Self::new(Speed::Mbps100, Duplex::Full)
    }

    /// 100 Mbps Half Duplex
    pub const fn fast_half() -> Self {
        Self::new(Speed::Mbps100, Duplex::Half)
    }

    /// 10 Mbps Full Duplex
    pub const fn slow_full() -> Self {
        Self::new(Speed::Mbps10, Duplex::Full)
    }

    /// 10 Mbps Half Duplex
    pub const fn slow_half() -> Self {
        Self::new(Speed::Mbps10, Duplex::Half)
    }

    /// Check for 100 Mbps
    pub const fn is_fast(&self) -> bool {
        matches!(self.speed, Speed::Mbps100)
    }

    /// Check for full duplex
    pub const fn is_full_duplex(&self) -> bool {
        matches!(self.duplex, Duplex::Full)
    }
}

// =============================================================================
// PHY Driver Trait
// =============================================================================

/// Trait for Ethernet PHY drivers
///
/// The MAC drives the generic part of bring-up (identity check, advertise,
/// negotiation, link wait) itself and calls into the PHY only for the steps
/// that differ between chips. Every hook except [`address`](Self::address)
/// and [`expected_id`](Self::expected_id) has a default that fits a plain
/// IEEE 802.3 PHY.
pub trait PhyDriver {
    /// Get the PHY address (0-31)
    fn address(&self) -> u8;

    /// Expected `(PHYIDR1 << 16) | PHYIDR2`; the revision nibble is ignored
    fn expected_id(&self) -> u32;

    /// Pulse the PHY reset line, if there is one
    fn hardware_reset<D: DelayNs>(&mut self, _delay: &mut D) -> Result<()> {
        Ok(())
    }

    /// Reset the PHY through BMCR and wait for it to come back
    fn software_reset<M: MdioBus, D: DelayNs>(&mut self, mdio: &mut M, delay: &mut D) -> Result<()> {
        ieee802_3::soft_reset(mdio, self.address(), delay)
    }

    /// Put the PHY in RMII mode
    fn setup_rmii<M: MdioBus>(&mut self, _mdio: &mut M) -> Result<()> {
        Ok(())
    }

    /// Turn the current BMCR value into the one that starts negotiation
    fn setup_auto_negotiation(&mut self, bmcr: u16) -> u16 {
        (bmcr | bmcr::AN_ENABLE | bmcr::AN_RESTART) & !bmcr::ISOLATE
    }

    /// Make the PHY assert its interrupt output on link changes
    fn enable_link_interrupt<M: MdioBus>(&mut self, _mdio: &mut M) -> Result<()> {
        Ok(())
    }

    /// Acknowledge a link-change interrupt inside the PHY
    fn acknowledge_link_interrupt<M: MdioBus>(&mut self, _mdio: &mut M) -> Result<()> {
        Ok(())
    }

    /// Stop the PHY from asserting its interrupt output
    fn disable_link_interrupt<M: MdioBus>(&mut self, _mdio: &mut M) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// Hardware Reset Wrapper
// =============================================================================

/// Hardware reset pulse duration in microseconds
const RESET_PULSE_US: u32 = 200;

/// Hardware reset recovery time in microseconds
const RESET_RECOVERY_US: u32 = 1000;

/// PHY driver with an active-low reset pin
///
/// Adds [`PhyDriver::hardware_reset`] to any PHY driver and delegates
/// everything else.
#[derive(Debug)]
pub struct WithReset<P: PhyDriver, RST: OutputPin> {
    /// Inner PHY driver
    inner: P,
    /// Reset pin (active low)
    reset_pin: RST,
}

impl<P: PhyDriver, RST: OutputPin> WithReset<P, RST> {
    /// Wrap `inner` with a reset pin. The pin is driven high (inactive).
    pub fn new(inner: P, mut reset_pin: RST) -> Self {
        let _ = reset_pin.set_high();
        Self { inner, reset_pin }
    }

    /// Inner PHY driver
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Release the reset pin
    pub fn release(self) -> (P, RST) {
        (self.inner, self.reset_pin)
    }
}

impl<P: PhyDriver, RST: OutputPin> PhyDriver for WithReset<P, RST> {
    fn address(&self) -> u8 {
        self.inner.address()
    }

    fn expected_id(&self) -> u32 {
        self.inner.expected_id()
    }

    /// Pulse reset low for 200 µs, then wait 1 ms for the PHY to recover.
    fn hardware_reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<()> {
        self.reset_pin
            .set_low()
            .map_err(|_| ConfigError::GpioError)?;
        delay.delay_us(RESET_PULSE_US);

        self.reset_pin
            .set_high()
            .map_err(|_| ConfigError::GpioError)?;
        delay.delay_us(RESET_RECOVERY_US);

        Ok(())
    }

    fn software_reset<M: MdioBus, D: DelayNs>(&mut self, mdio: &mut M, delay: &mut D) -> Result<()> {
        self.inner.software_reset(mdio, delay)
    }

    fn setup_rmii<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        self.inner.setup_rmii(mdio)
    }

    fn setup_auto_negotiation(&mut self, bmcr: u16) -> u16 {
        self.inner.setup_auto_negotiation(bmcr)
    }

    fn enable_link_interrupt<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        self.inner.enable_link_interrupt(mdio)
    }

    fn acknowledge_link_interrupt<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        self.inner.acknowledge_link_interrupt(mdio)
    }

    fn disable_link_interrupt<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        self.inner.disable_link_interrupt(mdio)
    }
}

// =============================================================================
// Default Implementations
// =============================================================================

/// Helper functions using standard IEEE 802.3 registers
pub mod ieee802_3 {
    use super::*;
    use crate::hal::mdio::{bmsr, phy_reg};
    use crate::internal::constants::{RESET_POLL_INTERVAL_US, SOFT_RESET_MAX_ATTEMPTS};

    /// Bits of the PHY identifier that name the part (revision masked out)
    pub const PHY_ID_MASK: u32 = 0xFFFF_FFF0;

    /// Read BMSR and check link status bit
    pub fn is_link_up<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<bool> {
        let bmsr_val = mdio.read(phy_addr, phy_reg::BMSR)?;
        Ok((bmsr_val & bmsr::LINK_STATUS) != 0)
    }

    /// Current link state.
    ///
    /// BMSR.LINK_STATUS latches low, so the first read reports any drop
    /// since the last read and the second one the present state.
    pub fn current_link_up<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<bool> {
        mdio.read(phy_addr, phy_reg::BMSR)?;
        is_link_up(mdio, phy_addr)
    }

    /// Perform soft reset via BMCR and wait for the bit to self-clear
    pub fn soft_reset<M: MdioBus, D: DelayNs>(mdio: &mut M, phy_addr: u8, delay: &mut D) -> Result<()> {
        mdio.write(phy_addr, phy_reg::BMCR, bmcr::RESET)?;

        for _ in 0..SOFT_RESET_MAX_ATTEMPTS {
            let bmcr_val = mdio.read(phy_addr, phy_reg::BMCR)?;
            if (bmcr_val & bmcr::RESET) == 0 {
                return Ok(());
            }
            delay.delay_us(RESET_POLL_INTERVAL_US);
        }

        Err(ConfigError::ResetFailed.into())
    }

    /// Read PHY ID from PHYIDR1 and PHYIDR2
    pub fn read_phy_id<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<u32> {
        let id1 = mdio.read(phy_addr, phy_reg::PHYIDR1)? as u32;
        let id2 = mdio.read(phy_addr, phy_reg::PHYIDR2)? as u32;
        Ok((id1 << 16) | id2)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
