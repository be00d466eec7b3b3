//! Core driver components for the MACB peripheral.
//!
//! - [`config`] - Configuration types and builder patterns
//! - [`error`] - Error types and result aliases
//! - [`interrupt`] - Interrupt and status register decoding
//! - [`macb`] - The MACB controller itself
//!
//! # Example
//!
//! ```ignore
//! use macb_emac::driver::{Macb, MacbConfig};
//!
//! let config = MacbConfig::new()
//!     .with_station_address([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
//! let mut macb: Macb<_, 20, 4, 512> = Macb::new(unsafe { Mmio::macb() }, config);
//! ```

// Submodules
pub mod config;
pub mod error;
pub mod interrupt;
pub mod macb;

// Re-exports for convenience
pub use config::{Duplex, LinkMode, MacbConfig, PhyInterface, Speed, State};
pub use error::{ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result};
pub use interrupt::{InterruptOutcome, InterruptStatus, ReceiveStatus, TransmitStatus};
pub use macb::{Macb, MacbDefault};
