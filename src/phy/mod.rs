//! Ethernet PHY Drivers
//!
//! The PHY layer talks to the chip only through [`MdioBus`](crate::hal::MdioBus),
//! so drivers run unchanged against the MACB management port and against a
//! mock bus in tests.
//!
//! # Supported PHY Chips
//!
//! - [`Dp83848`]: Texas Instruments DP83848 (UC3 evaluation boards)
//! - [`StandardPhy`]: any PHY that needs only the IEEE 802.3 registers
//!
//! Either can be wrapped in [`WithReset`] when its reset line is on a GPIO.
//!
//! # Bring-up
//!
//! [`probe_and_negotiate`] checks the identifier, advertises the configured
//! modes, restarts negotiation and waits for the link. The MAC driver calls it
//! from `init`; it can also be used on its own:
//!
//! ```ignore
//! use macb_emac::phy::{probe_and_negotiate, Dp83848};
//!
//! let mut phy = Dp83848::new(1);
//! let link = probe_and_negotiate(
//!     &mut mdio,
//!     &mut phy,
//!     PhyInterface::Rmii,
//!     LinkMode::AutoNegotiate,
//!     Some(5_000),
//!     &mut delay,
//! )?;
//! ```

pub mod dp83848;
pub mod generic;
pub mod negotiation;
pub mod standard;

pub use dp83848::{Dp83848, Dp83848WithReset};
pub use generic::{LinkStatus, PhyDriver, WithReset, ieee802_3};
pub use negotiation::{advertise_mask, probe_and_negotiate, resolve_link};
pub use standard::{StandardPhy, StandardPhyWithReset};

// Re-export IEEE 802.3 standard register definitions from mdio
pub use crate::hal::mdio::{anar, anlpar, bmcr, bmsr, phy_reg};
