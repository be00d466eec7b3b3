//! Synchronization and Concurrency Support
//!
//! The MACB is touched from two contexts: the consumer (network stack task)
//! and the MACB interrupt handler. This module provides the ISR-safe pieces:
//!
//! - **Primitives** (`primitives`): [`CriticalSectionCell`], ISR-safe
//!   interior mutability
//! - **Shared Wrapper** (`shared`): [`SharedMacb`], a critical-section
//!   protected [`Macb`](crate::Macb) whose blocking calls release the
//!   critical section while they sleep
//!
//! # Feature Flags
//!
//! - `critical-section`: Enables this module
//!
//! # Example
//!
//! ```ignore
//! use macb_emac::sync::SharedMacb;
//! use macb_emac::unsafe_registers::Mmio;
//!
//! static MACB: SharedMacb<Mmio, 20, 4, 512> =
//!     SharedMacb::new(unsafe { Mmio::macb() }, CONFIG);
//!
//! macb_emac::macb_isr!(macb_irq, MACB);
//!
//! fn run() -> macb_emac::Result<()> {
//!     MACB.with(|macb| macb.init(&mut phy, &mut intc, &mut delay))?;
//!
//!     loop {
//!         if MACB.wait_for_input(100, &mut delay) {
//!             let len = MACB.receive(&mut frame)?;
//!         }
//!     }
//! }
//! ```

mod primitives;

pub use primitives::CriticalSectionCell;

mod shared;

pub use shared::{SharedMacb, SharedMacbDefault};
