//! ISR-safe MACB wrapper using critical sections.

use embedded_hal::delay::DelayNs;

use super::primitives::CriticalSectionCell;
use crate::driver::config::MacbConfig;
use crate::driver::error::{DmaError, Error, Result};
use crate::driver::interrupt::InterruptOutcome;
use crate::driver::macb::Macb;
use crate::internal::constants::{
    BUFFER_WAIT_DELAY_MS, DEFAULT_RX_BUFFERS, DEFAULT_TX_BUFFER_SIZE, DEFAULT_TX_BUFFERS,
    INPUT_POLL_INTERVAL_MS,
};
use crate::internal::register::RegisterAccess;

/// ISR-safe MACB shared between the consumer and the interrupt handler.
///
/// Every access runs inside `critical_section::with()`. The blocking calls
/// ([`send`](Self::send), [`wait_for_input`](Self::wait_for_input)) take the
/// critical section once per step and sleep outside it, so the interrupt
/// handler can reclaim buffers and signal frames while they wait.
///
/// ```ignore
/// static MACB: SharedMacb<Mmio, 20, 4, 512> =
///     SharedMacb::new(unsafe { Mmio::macb() }, CONFIG);
///
/// macb_emac::macb_isr!(macb_irq, MACB);
///
/// MACB.send(&frame, true, &mut delay)?;
/// ```
pub struct SharedMacb<B: RegisterAccess, const RX_BUFS: usize, const TX_BUFS: usize, const TX_BUF_SIZE: usize> {
    inner: CriticalSectionCell<Macb<B, RX_BUFS, TX_BUFS, TX_BUF_SIZE>>,
}

impl<B: RegisterAccess, const RX_BUFS: usize, const TX_BUFS: usize, const TX_BUF_SIZE: usize>
    SharedMacb<B, RX_BUFS, TX_BUFS, TX_BUF_SIZE>
{
    /// Create a new shared MACB (const, suitable for static initialization).
    pub const fn new(bus: B, config: MacbConfig) -> Self {
        Self {
            inner: CriticalSectionCell::new(Macb::new(bus, config)),
        }
    }

    /// Execute a closure with exclusive access to the MACB.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Macb<B, RX_BUFS, TX_BUFS, TX_BUF_SIZE>) -> R,
    {
        self.inner.with(f)
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Macb<B, RX_BUFS, TX_BUFS, TX_BUF_SIZE>) -> R,
    {
        self.inner.try_with(f)
    }

    /// Queue `frame` for transmission, one critical section per chunk.
    ///
    /// While the ring is full the call sleeps 2 ms at a time and leaves
    /// reclaiming to the interrupt handler.
    ///
    /// # Errors
    ///
    /// - [`IoError::InvalidState`](crate::IoError::InvalidState) if the
    ///   driver is not running
    /// - [`DmaError::FrameTooLarge`] if the frame needs more buffers than
    ///   the ring has
    pub fn send<D: DelayNs>(&self, frame: &[u8], end_of_frame: bool, delay: &mut D) -> Result<usize> {
        self.with(|macb| macb.check_frame_fits(frame.len()))?;

        let mut sent = 0;
        while sent < frame.len() {
            match self.with(|macb| macb.queue_chunk(&frame[sent..], end_of_frame)) {
                Ok(n) => sent += n,
                Err(Error::Dma(DmaError::NoDescriptorsAvailable)) => {
                    delay.delay_ms(BUFFER_WAIT_DELAY_MS);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(sent)
    }

    /// Copy the next frame into `buffer`; see [`Macb::receive`].
    ///
    /// # Errors
    ///
    /// [`IoError::BufferTooSmall`](crate::IoError::BufferTooSmall) if the
    /// frame does not fit.
    pub fn receive(&self, buffer: &mut [u8]) -> Result<usize> {
        self.with(|macb| macb.receive(buffer))
    }

    /// Interrupt handler body, for the trap shim.
    #[inline(never)]
    pub fn handle_interrupt(&self) -> InterruptOutcome {
        self.with(Macb::handle_interrupt)
    }

    /// Wait up to `timeout_ms` for the interrupt handler to signal a frame.
    ///
    /// On timeout a receiver stalled on buffer-not-available is nudged and
    /// the ring is checked once more.
    pub fn wait_for_input<D: DelayNs>(&self, timeout_ms: u32, delay: &mut D) -> bool {
        self.with(|macb| macb.set_rx_waiting(true));

        let mut waited = 0u32;
        loop {
            let signalled = self.with(|macb| {
                let taken = macb.take_rx_signal();
                if taken {
                    macb.set_rx_waiting(false);
                }
                taken
            });
            if signalled {
                return true;
            }
            if waited >= timeout_ms {
                break;
            }
            delay.delay_ms(INPUT_POLL_INTERVAL_MS);
            waited = waited.saturating_add(INPUT_POLL_INTERVAL_MS);
        }

        self.with(|macb| {
            macb.set_rx_waiting(false);
            macb.recover_stalled_rx()
        })
    }
}

/// Shared MACB with the default ring sizes.
pub type SharedMacbDefault<B> =
    SharedMacb<B, DEFAULT_RX_BUFFERS, DEFAULT_TX_BUFFERS, DEFAULT_TX_BUFFER_SIZE>;
