//! PHY probe and auto-negotiation
//!
//! Speed and duplex follow from the modes both ends advertise: 100 Mb/s wins
//! over 10, full duplex over half.

use embedded_hal::delay::DelayNs;

use crate::driver::config::{Duplex, LinkMode, PhyInterface, Speed};
use crate::driver::error::{IoError, Result};
use crate::hal::mdio::{MdioBus, anar, phy_reg};
use crate::internal::constants::LINK_POLL_INTERVAL_MS;

use super::generic::{LinkStatus, PhyDriver, ieee802_3};

/// ANAR value for `mode`: the 802.3 selector plus the advertised modes.
#[must_use]
pub const fn advertise_mask(mode: LinkMode) -> u16 {
    let modes = match mode {
        LinkMode::AutoNegotiate => anar::ALL_MODES,
        LinkMode::Fixed {
            speed: Speed::Mbps100,
            duplex: Duplex::Full,
        } => anar::TX_FD,
        LinkMode::Fixed {
            speed: Speed::Mbps100,
            duplex: Duplex::Half,
        } => anar::TX_HD,
        LinkMode::Fixed {
            speed: Speed::Mbps10,
            duplex: Duplex::Full,
        } => anar::T10_FD,
        LinkMode::Fixed {
            speed: Speed::Mbps10,
            duplex: Duplex::Half,
        } => anar::T10_HD,
    };
    anar::SELECTOR_IEEE802_3 | modes
}

/// Link parameters for the modes common to `advertised` and `partner`.
#[must_use]
pub const fn resolve_link(advertised: u16, partner: u16) -> LinkStatus {
    let common = advertised & partner;
    let speed = if common & (anar::TX_FD | anar::TX_HD) != 0 {
        Speed::Mbps100
    } else {
        Speed::Mbps10
    };
    let duplex = if common & (anar::TX_FD | anar::T10_FD) != 0 {
        Duplex::Full
    } else {
        Duplex::Half
    };
    LinkStatus::new(speed, duplex)
}

/// Identify the PHY, negotiate, and wait for the link.
///
/// Waits forever for link-up when `link_timeout_ms` is `None`. The caller
/// applies the returned link to the MAC.
///
/// # Errors
///
/// - [`IoError::PhyIdMismatch`] if the PHY is not the expected part
/// - [`IoError::LinkTimeout`] if the link stays down past the timeout
/// - Any MDIO error
pub fn probe_and_negotiate<M, P, D>(
    mdio: &mut M,
    phy: &mut P,
    interface: PhyInterface,
    link_mode: LinkMode,
    link_timeout_ms: Option<u32>,
    delay: &mut D,
) -> Result<LinkStatus>
where
    M: MdioBus,
    P: PhyDriver,
    D: DelayNs,
{
    let addr = phy.address();

    let id = ieee802_3::read_phy_id(mdio, addr)? & ieee802_3::PHY_ID_MASK;
    if id != phy.expected_id() & ieee802_3::PHY_ID_MASK {
        return Err(IoError::PhyIdMismatch.into());
    }

    if interface == PhyInterface::Rmii {
        phy.setup_rmii(mdio)?;
    }

    let advertised = advertise_mask(link_mode);
    mdio.write(addr, phy_reg::ANAR, advertised)?;

    let bmcr = mdio.read(addr, phy_reg::BMCR)?;
    let bmcr = phy.setup_auto_negotiation(bmcr);
    mdio.write(addr, phy_reg::BMCR, bmcr)?;

    wait_for_link(mdio, addr, link_timeout_ms, delay)?;

    let partner = mdio.read(addr, phy_reg::ANLPAR)?;
    Ok(resolve_link(advertised, partner))
}

fn wait_for_link<M: MdioBus, D: DelayNs>(
    mdio: &mut M,
    addr: u8,
    timeout_ms: Option<u32>,
    delay: &mut D,
) -> Result<()> {
    let mut waited_ms = 0u32;
    loop {
        if ieee802_3::is_link_up(mdio, addr)? {
            return Ok(());
        }
        if let Some(limit) = timeout_ms
            && waited_ms >= limit
        {
            return Err(IoError::LinkTimeout.into());
        }
        delay.delay_ms(LINK_POLL_INTERVAL_MS);
        waited_ms = waited_ms.saturating_add(LINK_POLL_INTERVAL_MS);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
