//! DMA engine managing TX/RX descriptor rings and buffers.

use super::buffer::AlignedBuffer;
use super::descriptor::{RxDescriptor, TxDescriptor};
use super::ring::DescriptorRing;
use crate::internal::constants::{MAX_TX_BUFFER_SIZE, RX_BUFFER_SIZE};
use crate::internal::register::RegisterAccess;
use crate::internal::register::macb::{MacbRegs, RSR_BNA, RSR_OVR};

#[cfg(feature = "log")]
use log::warn;

/// Consumer position inside the frame being read.
///
/// Persists across `read` calls; only [`DmaEngine::begin_frame`] and ring
/// resets clear it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxCursor {
    /// Byte offset inside the current RX buffer
    pub position: usize,
    /// Bytes of the current frame consumed so far
    pub frame_bytes_read: usize,
}

/// DMA Engine with statically allocated buffers.
///
/// # Type Parameters
/// * `RX_BUFS` - Number of receive buffers/descriptors (each [`RX_BUFFER_SIZE`] bytes)
/// * `TX_BUFS` - Number of transmit buffers/descriptors
/// * `TX_BUF_SIZE` - Size of each transmit buffer in bytes
pub struct DmaEngine<const RX_BUFS: usize, const TX_BUFS: usize, const TX_BUF_SIZE: usize> {
    /// RX descriptor ring; its cursor is the next buffer to consume
    rx_ring: DescriptorRing<RxDescriptor, RX_BUFS>,
    /// TX descriptor ring; its cursor is the next buffer to fill
    tx_ring: DescriptorRing<TxDescriptor, TX_BUFS>,
    /// RX data buffers
    rx_buffers: [AlignedBuffer<RX_BUFFER_SIZE>; RX_BUFS],
    /// TX data buffers
    tx_buffers: [AlignedBuffer<TX_BUF_SIZE>; TX_BUFS],
    /// Read position inside the current RX frame
    cursor: RxCursor,
    /// Oldest TX descriptor not yet reclaimed
    tx_reclaim: usize,
    /// TX descriptors handed to the hardware and not yet reclaimed
    tx_in_flight: usize,
    /// Descriptors of the frame still waiting for its last buffer
    tx_open: usize,
    /// Whether `setup` has run
    initialized: bool,
}

impl<const RX_BUFS: usize, const TX_BUFS: usize, const TX_BUF_SIZE: usize>
    DmaEngine<RX_BUFS, TX_BUFS, TX_BUF_SIZE>
{
    /// Create a new DMA engine with zeroed buffers. Const-compatible.
    #[must_use]
    pub const fn new() -> Self {
        const { assert!(RX_BUFS > 0 && TX_BUFS > 0, "descriptor rings need at least one slot") };
        const {
            assert!(
                TX_BUF_SIZE > 0 && TX_BUF_SIZE <= MAX_TX_BUFFER_SIZE,
                "TX buffer size must fit the 11-bit descriptor length field"
            )
        };

        Self {
            rx_ring: DescriptorRing::from_array([const { RxDescriptor::new() }; RX_BUFS]),
            tx_ring: DescriptorRing::from_array([const { TxDescriptor::new() }; TX_BUFS]),
            rx_buffers: [const { AlignedBuffer::new() }; RX_BUFS],
            tx_buffers: [const { AlignedBuffer::new() }; TX_BUFS],
            cursor: RxCursor {
                position: 0,
                frame_bytes_read: 0,
            },
            tx_reclaim: 0,
            tx_in_flight: 0,
            tx_open: 0,
            initialized: false,
        }
    }

    /// Total memory usage in bytes.
    #[must_use]
    pub const fn memory_usage() -> usize {
        RX_BUFS * (RxDescriptor::SIZE + RX_BUFFER_SIZE) + TX_BUFS * (TxDescriptor::SIZE + TX_BUF_SIZE)
    }

    /// Bind descriptors to buffers and publish the ring bases.
    ///
    /// Every TX descriptor starts free for software, every RX descriptor
    /// starts with the hardware, and only the last slot of each ring wraps.
    /// Also turns on FCS discard so RX buffers hold the frame only.
    pub fn setup<B: RegisterAccess>(&mut self, regs: &MacbRegs<B>) {
        for (i, desc) in self.rx_ring.iter().enumerate() {
            desc.setup(
                self.rx_buffers[i].addr_u32(),
                DescriptorRing::<RxDescriptor, RX_BUFS>::is_last_slot(i),
            );
        }

        for (i, desc) in self.tx_ring.iter().enumerate() {
            desc.setup(
                self.tx_buffers[i].addr_u32(),
                DescriptorRing::<TxDescriptor, TX_BUFS>::is_last_slot(i),
            );
        }

        self.rx_ring.reset();
        self.tx_ring.reset();
        self.cursor = RxCursor::default();
        self.tx_reclaim = 0;
        self.tx_in_flight = 0;
        self.tx_open = 0;

        regs.set_rbqp(self.rx_ring.base_addr_u32());
        regs.set_tbqp(self.tx_ring.base_addr_u32());
        regs.enable_fcs_discard();
        self.initialized = true;
    }

    /// Check if the DMA engine has been initialized
    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // =========================================================================
    // Transmit
    // =========================================================================

    /// Check if the next TX descriptor can take a chunk.
    pub fn tx_ready(&self) -> bool {
        self.tx_in_flight < TX_BUFS && self.tx_ring.current().is_used()
    }

    /// Copy up to `TX_BUF_SIZE` bytes of `data` into the next TX buffer.
    ///
    /// The chunk is flagged as the last buffer when `end_of_frame` is set and
    /// it holds the rest of `data`; that also starts the transmitter.
    /// Returns the number of bytes queued, or `None` if no buffer is free.
    pub fn queue_chunk<B: RegisterAccess>(
        &mut self,
        regs: &MacbRegs<B>,
        data: &[u8],
        end_of_frame: bool,
    ) -> Option<usize> {
        if data.is_empty() {
            return Some(0);
        }
        if !self.tx_ready() {
            return None;
        }

        let idx = self.tx_ring.current_index();
        let len = data.len().min(TX_BUF_SIZE);
        self.tx_buffers[idx].as_mut_slice()[..len].copy_from_slice(&data[..len]);

        let last = end_of_frame && len == data.len();
        let wrap = DescriptorRing::<TxDescriptor, TX_BUFS>::is_last_slot(idx);
        self.tx_ring.get(idx).prepare(len, last, wrap);
        self.tx_ring.advance();
        self.tx_in_flight += 1;

        if last {
            self.tx_open = 0;
            regs.start_transmission();
        } else {
            self.tx_open += 1;
        }
        Some(len)
    }

    /// Check whether `len` more bytes of the open frame fit the ring.
    ///
    /// The transmitter only starts once a frame is closed, so a frame that
    /// needs more descriptors than the ring holds can never be sent.
    pub fn frame_fits(&self, len: usize) -> bool {
        self.tx_open + len.div_ceil(TX_BUF_SIZE) <= TX_BUFS
    }

    /// Give back the descriptors of a frame that was never closed.
    ///
    /// Returns the number of descriptors released.
    pub fn abandon_open_frame(&mut self) -> usize {
        let count = self.tx_open;
        let mut idx = self.tx_ring.current_index();
        for _ in 0..count {
            idx = (idx + TX_BUFS - 1) % TX_BUFS;
            self.tx_ring.get(idx).mark_used();
        }
        self.tx_ring.set_current(idx);
        self.tx_in_flight -= count;
        self.tx_open = 0;
        count
    }

    /// Reclaim the oldest transmitted frame.
    ///
    /// The hardware marks only the first buffer of a sent frame; the rest of
    /// the frame, up to and including its last buffer, is marked here.
    /// Returns the number of descriptors freed.
    pub fn reclaim_tx(&mut self) -> usize {
        if self.tx_in_flight == 0 || !self.tx_ring.get(self.tx_reclaim).is_used() {
            return 0;
        }

        #[cfg(feature = "log")]
        {
            let errors = self.tx_ring.get(self.tx_reclaim).error_flags();
            if errors != 0 {
                warn!(
                    "TX frame at descriptor {} completed with errors: 0x{:08x}",
                    self.tx_reclaim, errors
                );
            }
        }

        let mut idx = self.tx_reclaim;
        let mut freed = 1;
        while !self.tx_ring.get(idx).is_last_buffer() && freed < self.tx_in_flight {
            idx = DescriptorRing::<TxDescriptor, TX_BUFS>::next_index(idx);
            self.tx_ring.get(idx).mark_used();
            freed += 1;
        }

        self.tx_reclaim = DescriptorRing::<TxDescriptor, TX_BUFS>::next_index(idx);
        self.tx_in_flight -= freed;
        freed
    }

    /// Reclaim every transmitted frame. Returns the number of descriptors freed.
    pub fn reclaim_completed(&mut self) -> usize {
        let mut total = 0;
        loop {
            let freed = self.reclaim_tx();
            if freed == 0 {
                return total;
            }
            total += freed;
        }
    }

    /// TX descriptors handed to the hardware and not yet reclaimed
    #[inline(always)]
    pub fn tx_in_flight(&self) -> usize {
        self.tx_in_flight
    }

    /// Descriptors queued for a frame that is not closed yet
    #[inline(always)]
    pub fn tx_open_descriptors(&self) -> usize {
        self.tx_open
    }

    // =========================================================================
    // Receive
    // =========================================================================

    /// Check if the next RX descriptor holds data for software.
    pub fn rx_pending(&self) -> bool {
        self.rx_ring.current().is_software_owned()
    }

    /// Length of the next complete frame, or 0 if none is ready.
    ///
    /// Buffers that do not start a frame are handed back first. A frame that
    /// is followed by a new start-of-frame before its end is dropped. A
    /// buffer-not-available condition resets the receive ring.
    pub fn input_length<B: RegisterAccess>(&mut self, regs: &MacbRegs<B>) -> usize {
        if regs.rsr() & RSR_BNA != 0 {
            #[cfg(feature = "log")]
            warn!("RX buffer not available, resetting receive ring");
            self.reset_rx(regs);
            return 0;
        }

        self.skip_fragments();

        let mut idx = self.rx_ring.current_index();
        for _ in 0..RX_BUFS {
            let (owned, start, length) = {
                let desc = self.rx_ring.get(idx);
                (desc.is_software_owned(), desc.is_start_of_frame(), desc.frame_length())
            };
            if !owned {
                return 0;
            }
            if start && idx != self.rx_ring.current_index() {
                #[cfg(feature = "log")]
                warn!("RX frame without end, dropping buffers before {}", idx);
                self.release_until(idx);
            }
            if length != 0 {
                return length;
            }
            idx = DescriptorRing::<RxDescriptor, RX_BUFS>::next_index(idx);
        }
        0
    }

    /// Start reading a new frame from the first byte of the current buffer.
    #[inline(always)]
    pub fn begin_frame(&mut self) {
        self.cursor = RxCursor::default();
    }

    /// Copy the next `dest.len()` bytes of a frame of `total` bytes.
    ///
    /// Buffers are handed back to the hardware as soon as they are drained.
    /// Copying stops at the end of the frame; returns the bytes copied.
    pub fn read(&mut self, dest: &mut [u8], total: usize) -> usize {
        let len = dest.len().min(total.saturating_sub(self.cursor.frame_bytes_read));
        let mut offset = 0;
        self.drain(len, total, |chunk| {
            dest[offset..offset + chunk.len()].copy_from_slice(chunk);
            offset += chunk.len();
        });
        len
    }

    /// Drop the unread rest of a frame of `total` bytes.
    pub fn discard(&mut self, total: usize) {
        let remaining = total.saturating_sub(self.cursor.frame_bytes_read);
        self.drain(remaining, total, |_| {});
    }

    fn drain<F>(&mut self, mut len: usize, total: usize, mut sink: F)
    where
        F: FnMut(&[u8]),
    {
        while len > 0 {
            let idx = self.rx_ring.current_index();
            let position = self.cursor.position;
            let n = len.min(RX_BUFFER_SIZE - position);
            sink(&self.rx_buffers[idx].as_slice()[position..position + n]);

            len -= n;
            self.cursor.position += n;
            self.cursor.frame_bytes_read += n;

            if self.cursor.position >= RX_BUFFER_SIZE || self.cursor.frame_bytes_read >= total {
                self.rx_ring.current().release();
                self.rx_ring.advance();
                self.cursor.position = 0;
            }
        }
    }

    fn skip_fragments(&mut self) {
        for _ in 0..RX_BUFS {
            let desc = self.rx_ring.current();
            if !desc.is_software_owned() || desc.is_start_of_frame() {
                break;
            }
            desc.release();
            self.rx_ring.advance();
        }
    }

    /// Hand back every buffer from the cursor up to `idx` (exclusive).
    fn release_until(&mut self, idx: usize) {
        while self.rx_ring.current_index() != idx {
            self.rx_ring.current().release();
            self.rx_ring.advance();
        }
        self.cursor = RxCursor::default();
    }

    /// Recover from buffer-not-available: give the whole ring back to the
    /// hardware and restart reception at slot 0.
    pub fn reset_rx<B: RegisterAccess>(&mut self, regs: &MacbRegs<B>) {
        regs.disable_rx();
        for desc in self.rx_ring.iter() {
            desc.release();
        }
        regs.clear_rx_status(RSR_BNA | RSR_OVR);
        regs.set_rbqp(self.rx_ring.base_addr_u32());
        self.rx_ring.reset();
        self.cursor = RxCursor::default();
        regs.enable_rx();
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Current read cursor
    pub fn cursor(&self) -> RxCursor {
        self.cursor
    }

    /// RX ring base address.
    pub fn rx_ring_base(&self) -> u32 {
        self.rx_ring.base_addr_u32()
    }

    /// TX ring base address.
    pub fn tx_ring_base(&self) -> u32 {
        self.tx_ring.base_addr_u32()
    }

    /// Current RX index.
    pub fn rx_current_index(&self) -> usize {
        self.rx_ring.current_index()
    }

    /// Current TX index.
    pub fn tx_current_index(&self) -> usize {
        self.tx_ring.current_index()
    }

    /// Oldest unreclaimed TX index.
    pub fn tx_reclaim_index(&self) -> usize {
        self.tx_reclaim
    }

    // =========================================================================
    // Test hooks
    // =========================================================================

    /// Play the hardware: store `frame` starting at RX slot `start`.
    /// Returns the slot after the frame.
    #[cfg(test)]
    pub(crate) fn inject_rx_frame(&mut self, start: usize, frame: &[u8]) -> usize {
        use super::descriptor::bits::rx_status;

        let chunks = frame.len().div_ceil(RX_BUFFER_SIZE);
        let mut idx = start % RX_BUFS;
        for (i, chunk) in frame.chunks(RX_BUFFER_SIZE).enumerate() {
            self.rx_buffers[idx].as_mut_slice()[..chunk.len()].copy_from_slice(chunk);
            let mut status = 0;
            if i == 0 {
                status |= rx_status::START_OF_FRAME;
            }
            if i + 1 == chunks {
                status |= rx_status::END_OF_FRAME | (frame.len() as u32 & rx_status::LENGTH_MASK);
            }
            self.rx_ring.get(idx).complete(status);
            idx = DescriptorRing::<RxDescriptor, RX_BUFS>::next_index(idx);
        }
        idx
    }

    #[cfg(test)]
    pub(crate) fn rx_descriptor(&self, index: usize) -> &RxDescriptor {
        self.rx_ring.get(index)
    }

    #[cfg(test)]
    pub(crate) fn tx_descriptor(&self, index: usize) -> &TxDescriptor {
        self.tx_ring.get(index)
    }

    #[cfg(test)]
    pub(crate) fn tx_buffer(&self, index: usize) -> &[u8] {
        self.tx_buffers[index % TX_BUFS].as_slice()
    }
}

impl<const RX_BUFS: usize, const TX_BUFS: usize, const TX_BUF_SIZE: usize> Default
    for DmaEngine<RX_BUFS, TX_BUFS, TX_BUF_SIZE>
{
    fn default() -> Self {
        Self::new()
    }
}

// Safety: DmaEngine can be shared between contexts when properly synchronized.
// The caller must ensure exclusive access during setup/transmit/receive.
unsafe impl<const RX_BUFS: usize, const TX_BUFS: usize, const TX_BUF_SIZE: usize> Sync
    for DmaEngine<RX_BUFS, TX_BUFS, TX_BUF_SIZE>
{
}

unsafe impl<const RX_BUFS: usize, const TX_BUFS: usize, const TX_BUF_SIZE: usize> Send
    for DmaEngine<RX_BUFS, TX_BUFS, TX_BUF_SIZE>
{
}

// =============================================================================
// Tests
// =============================================================================
