//! DMA Engine
//!
//! Descriptor rings and buffer pools shared with the MACB DMA. All memory is
//! statically allocated using const generics.
//!
//! # Architecture
//!
//! - [`DmaEngine`]: owns both rings, their buffers, and the RX read cursor
//! - [`DescriptorRing`]: circular ring of descriptors with a wrapping cursor
//! - [`AlignedBuffer`]: word-aligned buffer storage
//!
//! # Example
//!
//! ```ignore
//! use macb_emac::internal::dma::DmaEngine;
//!
//! // 20 RX buffers of 128 bytes, 4 TX buffers of 512 bytes
//! static mut DMA: DmaEngine<20, 4, 512> = DmaEngine::new();
//! ```

// Inspection helpers are only reached from tests and debug builds
#![allow(dead_code)]

mod buffer;
pub(crate) mod descriptor;
mod engine;
mod ring;

pub use buffer::AlignedBuffer;
pub use descriptor::{RxDescriptor, TxDescriptor};
pub use engine::{DmaEngine, RxCursor};
pub use ring::DescriptorRing;
