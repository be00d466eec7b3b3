//! MACB Ethernet MAC Driver
//!
//! A `no_std`, `no_alloc` Rust driver for the Cadence/Atmel MACB Ethernet MAC
//! found on the AVR32 UC3A family.
//!
//! The driver moves frames between a network stack and the MAC through two
//! DMA descriptor rings, brings the PHY up over MDIO, and provides the body
//! of the MACB interrupt handler.
//!
//! # Architecture
//!
//! The driver is organized into three layers:
//!
//! 1. **MAC Layer** ([`driver::macb`]): Bring-up, transmit, receive and the
//!    interrupt dispatcher
//! 2. **PHY Layer** ([`phy`]): PHY probe and auto-negotiation, with a
//!    DP83848 driver
//! 3. **HAL Layer** ([`hal`]): MDIO, the interrupt controller seam and the
//!    PHY interrupt pin
//!
//! ## Buffers
//!
//! - Receive: `RX_BUFS` buffers of 128 bytes; a frame spans as many buffers
//!   as it needs and is reassembled on read
//! - Transmit: `TX_BUFS` buffers of `TX_BUF_SIZE` bytes; a frame is split
//!   over as many buffers as it needs and must fit the ring as a whole
//!
//! All descriptors and buffers live inside the driver value, so placing it
//! in a `static` is enough to keep them in DMA-reachable SRAM.
//!
//! # Supported PHY Chips
//!
//! - [`Dp83848`]: Texas Instruments DP83848 (RMII or MII)
//! - [`StandardPhy`]: any IEEE 802.3 Clause 22 PHY with a known ID
//!
//! Additional PHY drivers can be added by implementing [`PhyDriver`].
//!
//! # Features
//!
//! - `critical-section` (default): Enable the ISR-safe [`SharedMacb`] wrapper
//! - `defmt`: Enable defmt formatting and bring-up logging
//! - `log`: Report interrupt error causes through the `log` facade
//!
//! # Example
//!
//! ```ignore
//! use macb_emac::{Dp83848, MacbConfig, PhyInterface, SharedMacb};
//! use macb_emac::hal::{InterruptBinding, InterruptPriority};
//! use macb_emac::unsafe_registers::Mmio;
//!
//! static MACB: SharedMacb<Mmio, 20, 4, 512> = SharedMacb::new(
//!     unsafe { Mmio::macb() },
//!     MacbConfig::new()
//!         .with_station_address([0x00, 0x04, 0x25, 0x1C, 0xA0, 0x02])
//!         .with_phy_interface(PhyInterface::Rmii)
//!         .with_mac_interrupt(InterruptBinding::new(macb_irq, 32, InterruptPriority::Level2)),
//! );
//!
//! macb_emac::macb_isr!(macb_irq, MACB);
//!
//! let link = MACB.with(|macb| macb.init(&mut Dp83848::new(0), &mut intc, &mut delay))?;
//!
//! MACB.send(&frame, true, &mut delay)?;
//!
//! if MACB.wait_for_input(100, &mut delay) {
//!     let len = MACB.receive(&mut buf)?;
//! }
//! ```
//!
//! # Memory Requirements
//!
//! With the default configuration (20 RX buffers, 4 TX buffers of 512 bytes):
//! about 4.7 KB, see [`Macb::memory_usage`].

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod hal;
pub mod phy;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{Duplex, LinkMode, MacbConfig, PhyInterface, Speed, State};
pub use driver::error::{
    ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result,
};
pub use driver::interrupt::{InterruptOutcome, InterruptStatus, ReceiveStatus, TransmitStatus};
pub use driver::macb::{Macb, MacbDefault};

/// Low-level register accessors for advanced use.
///
/// These are intentionally separated from the primary facade. Most users should
/// prefer the safe driver APIs instead of touching registers directly.
///
/// # Safety
///
/// Direct register access bypasses driver invariants. Use only if you fully
/// understand the MACB hardware and accept responsibility for correct
/// sequencing and synchronization.
pub mod unsafe_registers {
    pub use crate::internal::register::macb::MacbRegs;
    pub use crate::internal::register::{MACB_BASE, Mmio, RegisterAccess};
}

// Re-export PHY types
pub use phy::{Dp83848, Dp83848WithReset, LinkStatus, PhyDriver, StandardPhy, WithReset};

// Re-export sync types when critical-section is enabled
#[cfg(feature = "critical-section")]
pub use sync::{SharedMacb, SharedMacbDefault};

/// Shared driver constants.
///
/// These are grouped into a dedicated module to keep the top-level facade
/// focused on driver types.
pub mod constants {
    pub use crate::internal::constants::{
        // Timing
        BUFFER_WAIT_DELAY_MS,
        // MAC address
        DEFAULT_MAC_ADDR,
        // Buffer counts
        DEFAULT_RX_BUFFERS,
        DEFAULT_TX_BUFFER_SIZE,
        DEFAULT_TX_BUFFERS,
        ETH_HEADER_SIZE,
        INPUT_POLL_INTERVAL_MS,
        LINK_POLL_INTERVAL_MS,
        MAC_ADDR_LEN,
        // Frame/buffer sizes
        MAX_FRAME_SIZE,
        MAX_TX_BUFFER_SIZE,
        // Clocks
        MDC_MAX_FREQ_HZ,
        MDIO_IDLE_POLL_LIMIT,
        MTU,
        RESET_POLL_INTERVAL_US,
        RX_BUFFER_SIZE,
    };
}

// =============================================================================
// Macro Helpers
// =============================================================================

/// Define the MACB trap shim for a static [`SharedMacb`].
///
/// Expands to a plain `fn()` suitable for
/// [`InterruptBinding::new`](crate::hal::InterruptBinding::new). The optional
/// block receives the [`InterruptOutcome`], e.g. to request a context switch
/// when `switch_required` is set.
///
/// # Examples
///
/// ```ignore
/// macb_emac::macb_isr!(macb_irq, MACB);
///
/// macb_emac::macb_isr!(macb_irq, MACB, |outcome| {
///     if outcome.switch_required {
///         scheduler::yield_from_isr();
///     }
/// });
/// ```
#[cfg(feature = "critical-section")]
#[macro_export]
macro_rules! macb_isr {
    ($name:ident, $shared:expr) => {
        fn $name() {
            let _ = $shared.handle_interrupt();
        }
    };
    ($name:ident, $shared:expr, |$outcome:ident| $body:block) => {
        fn $name() {
            let $outcome: $crate::InterruptOutcome = $shared.handle_interrupt();
            $body
        }
    };
}

/// Declare a static, ISR-safe MACB instance on the on-chip register block.
///
/// # Examples
///
/// ```ignore
/// macb_emac::macb_static!(MACB, CONFIG);
/// macb_emac::macb_static!(MACB, CONFIG, 32, 4, 1536);
/// ```
#[cfg(feature = "critical-section")]
#[macro_export]
macro_rules! macb_static {
    ($name:ident, $config:expr) => {
        $crate::macb_static!($name, $config, 20, 4, 512);
    };
    ($name:ident, $config:expr, $rx:expr, $tx:expr, $buf:expr) => {
        static $name: $crate::sync::SharedMacb<$crate::unsafe_registers::Mmio, $rx, $tx, $buf> =
            $crate::sync::SharedMacb::new(
                // SAFETY: the static is the only owner of the on-chip MACB
                unsafe { $crate::unsafe_registers::Mmio::macb() },
                $config,
            );
    };
}
