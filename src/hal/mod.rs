//! Hardware Abstraction Layer
//!
//! Seams between the driver and the rest of the platform.
//!
//! # Modules
//!
//! - [`mdio`]: MDIO bus for PHY communication over the MACB management port
//! - [`interrupt`]: Handler registration with the interrupt controller
//! - [`gpio`]: PHY interrupt line
//!
//! # Delay Integration
//!
//! All types that require delays use `embedded_hal::delay::DelayNs` directly.
//! Pass any delay implementation from your HAL.

pub mod gpio;
pub mod interrupt;
pub mod mdio;

// Re-export commonly used types
pub use gpio::PhyInterruptPin;
pub use interrupt::{InterruptBinding, InterruptController, InterruptPriority, Polled};
pub use mdio::{MacbMdio, MdcClockDivider, MdioBus};
