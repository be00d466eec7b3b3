//! MACB Driver
//!
//! [`Macb`] ties the register block, the DMA engine and the PHY together:
//! bring-up and shutdown, frame transmit and receive, and the interrupt
//! handler body.

use embedded_hal::delay::DelayNs;

use super::config::{MacbConfig, PhyInterface, State};
use super::error::{ConfigError, DmaError, IoError, Result};
use super::interrupt::{InterruptOutcome, InterruptStatus, ReceiveStatus, TransmitStatus};
use crate::hal::gpio::PhyInterruptPin;
use crate::hal::interrupt::{InterruptBinding, InterruptController};
use crate::hal::mdio::{MAX_PHY_ADDR, MacbMdio};
use crate::internal::constants::{
    BUFFER_WAIT_DELAY_MS, DEFAULT_RX_BUFFERS, DEFAULT_TX_BUFFER_SIZE, DEFAULT_TX_BUFFERS,
    INPUT_POLL_INTERVAL_MS,
};
use crate::internal::dma::DmaEngine;
use crate::internal::register::RegisterAccess;
use crate::internal::register::macb::{INT_RCOMP, INT_TCOMP, MacbRegs, RSR_BNA, RSR_REC, TSR_COMP};
use crate::phy::generic::{LinkStatus, PhyDriver, ieee802_3};
use crate::phy::negotiation::probe_and_negotiate;

#[cfg(feature = "log")]
use log::warn;

// =============================================================================
// MACB Driver
// =============================================================================

/// Cadence/Atmel MACB Ethernet MAC driver
///
/// # Type Parameters
/// * `B` - Register bus ([`Mmio`](crate::unsafe_registers::Mmio) on hardware)
/// * `RX_BUFS` - Number of 128-byte receive buffers
/// * `TX_BUFS` - Number of transmit buffers
/// * `TX_BUF_SIZE` - Size of each transmit buffer in bytes
///
/// The descriptor rings and buffers live inside the driver, so it is usually
/// placed in a `static`:
///
/// ```ignore
/// static MACB: SharedMacb<Mmio, 20, 4, 512> =
///     SharedMacb::new(unsafe { Mmio::macb() }, CONFIG);
///
/// let link = MACB.with(|macb| macb.init(&mut phy, &mut intc, &mut delay))?;
/// ```
pub struct Macb<B: RegisterAccess, const RX_BUFS: usize, const TX_BUFS: usize, const TX_BUF_SIZE: usize> {
    /// MACB register block
    regs: MacbRegs<B>,
    /// Descriptor rings and buffers
    dma: DmaEngine<RX_BUFS, TX_BUFS, TX_BUF_SIZE>,
    /// Current configuration
    config: MacbConfig,
    /// Current state
    state: State,
    /// Link negotiated by the last successful `init`
    link: Option<LinkStatus>,
    /// Receive-complete signals not yet taken by the consumer
    rx_signals: u32,
    /// A consumer is parked in `wait_for_input`
    rx_waiting: bool,
}

impl<B: RegisterAccess, const RX_BUFS: usize, const TX_BUFS: usize, const TX_BUF_SIZE: usize>
    Macb<B, RX_BUFS, TX_BUFS, TX_BUF_SIZE>
{
    /// Create a driver for the register block behind `bus`.
    ///
    /// Nothing touches the hardware until [`init`](Self::init).
    pub const fn new(bus: B, config: MacbConfig) -> Self {
        Self {
            regs: MacbRegs::new(bus),
            dma: DmaEngine::new(),
            config,
            state: State::Uninitialized,
            link: None,
            rx_signals: 0,
            rx_waiting: false,
        }
    }

    /// Bytes of descriptor and buffer memory held by the driver
    pub const fn memory_usage() -> usize {
        DmaEngine::<RX_BUFS, TX_BUFS, TX_BUF_SIZE>::memory_usage()
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Bring up the PHY and the MAC.
    ///
    /// 1. Hardware-reset the PHY, program the MDC divider, soft-reset the PHY
    /// 2. Clear MAC control, status and interrupt registers
    /// 3. Select MII/RMII and write the station address
    /// 4. Set up the descriptor rings
    /// 5. Probe and negotiate (see [`probe_and_negotiate`])
    /// 6. Apply speed/duplex, register the MAC interrupt, enable RX and TX
    ///
    /// With `link_timeout_ms` unset the link wait never gives up.
    ///
    /// # Errors
    ///
    /// On any failure the MAC is left with RX and TX off and the state is
    /// [`State::Disabled`].
    pub fn init<P, I, D>(&mut self, phy: &mut P, irq: &mut I, delay: &mut D) -> Result<LinkStatus>
    where
        P: PhyDriver,
        I: InterruptController,
        D: DelayNs,
    {
        match self.bring_up(phy, irq, delay) {
            Ok(link) => {
                self.link = Some(link);
                self.state = State::Running;

                #[cfg(feature = "defmt")]
                defmt::info!("MACB running: {}", link);

                Ok(link)
            }
            Err(e) => {
                self.regs.disable_rx();
                self.regs.disable_tx();
                self.link = None;
                self.state = State::Disabled;

                #[cfg(feature = "defmt")]
                defmt::warn!("MACB init failed: {}", e);

                Err(e)
            }
        }
    }

    fn bring_up<P, I, D>(&mut self, phy: &mut P, irq: &mut I, delay: &mut D) -> Result<LinkStatus>
    where
        P: PhyDriver,
        I: InterruptController,
        D: DelayNs,
    {
        if phy.address() > MAX_PHY_ADDR {
            return Err(ConfigError::InvalidPhyAddress.into());
        }

        phy.hardware_reset(delay)?;
        self.regs.set_mdc_divider(self.config.mdc_divider.to_reg_value());
        phy.software_reset(&mut MacbMdio::new(&self.regs), delay)?;

        #[cfg(feature = "defmt")]
        defmt::info!("PHY {} reset", phy.address());

        self.regs.set_ncr(0);
        self.regs.set_tsr(!0);
        self.regs.set_rsr(!0);
        self.regs.set_idr(!0);
        let _ = self.regs.isr();

        self.regs
            .select_mii(self.config.phy_interface == PhyInterface::Mii);
        self.regs.set_station_address(&self.config.station_address);

        self.dma.setup(&self.regs);
        self.rx_signals = 0;
        self.rx_waiting = false;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "DMA rings ready: {} RX x 128, {} TX x {}",
            RX_BUFS,
            TX_BUFS,
            TX_BUF_SIZE
        );

        let link = probe_and_negotiate(
            &mut MacbMdio::new(&self.regs),
            phy,
            self.config.phy_interface,
            self.config.link_mode,
            self.config.link_timeout_ms,
            delay,
        )?;
        self.regs.set_link(link.is_fast(), link.is_full_duplex());

        if let Some(binding) = self.config.mac_interrupt {
            irq.register(binding)
                .map_err(|_| ConfigError::InterruptRegistration)?;
        }

        self.regs.set_ier(INT_RCOMP | INT_TCOMP);
        self.regs.enable_tx();
        self.regs.enable_rx();
        Ok(link)
    }

    /// Turn off RX and TX and mask the MAC interrupts. Safe to call twice.
    pub fn disable(&mut self) {
        self.regs.disable_rx();
        self.regs.disable_tx();
        self.regs.set_idr(INT_RCOMP | INT_TCOMP);
        let _ = self.regs.isr();
        self.rx_waiting = false;
        self.state = State::Disabled;
    }

    /// Change the station address.
    ///
    /// Before `init` this only updates the configuration; afterwards the
    /// address filter is reprogrammed too.
    pub fn set_station_address(&mut self, addr: [u8; 6]) {
        self.config.station_address = addr;
        if self.state != State::Uninitialized {
            self.regs.set_station_address(&addr);
        }
    }

    // =========================================================================
    // Transmit
    // =========================================================================

    /// Queue one chunk of at most `TX_BUF_SIZE` bytes without waiting.
    ///
    /// Returns the number of bytes taken from `data`.
    ///
    /// # Errors
    ///
    /// - [`IoError::InvalidState`] if the driver is not running
    /// - [`DmaError::NoDescriptorsAvailable`] if the next TX buffer is busy
    pub fn queue_chunk(&mut self, data: &[u8], end_of_frame: bool) -> Result<usize> {
        self.ensure_running()?;
        self.dma
            .queue_chunk(&self.regs, data, end_of_frame)
            .ok_or_else(|| DmaError::NoDescriptorsAvailable.into())
    }

    /// Make sure `len` more bytes of the current frame can ever be sent.
    ///
    /// A frame larger than the whole TX ring would never start the
    /// transmitter; its queued part is dropped and the call fails.
    ///
    /// # Errors
    ///
    /// - [`IoError::InvalidState`] if the driver is not running
    /// - [`DmaError::FrameTooLarge`] if the frame cannot fit the ring
    pub fn check_frame_fits(&mut self, len: usize) -> Result<()> {
        self.ensure_running()?;
        if self.dma.frame_fits(len) {
            return Ok(());
        }

        let _dropped = self.dma.abandon_open_frame();
        #[cfg(feature = "log")]
        warn!(
            "TX frame needs more than {} x {} bytes, dropped {} queued buffers",
            TX_BUFS, TX_BUF_SIZE, _dropped
        );
        Err(DmaError::FrameTooLarge.into())
    }

    /// Queue `frame` for transmission, waiting for buffers as needed.
    ///
    /// A frame may be passed in several calls; only the call with
    /// `end_of_frame` set closes it and starts the transmitter. When the ring
    /// is full, completed frames are reclaimed in place, then the call sleeps
    /// 2 ms between retries.
    ///
    /// # Errors
    ///
    /// - [`IoError::InvalidState`] if the driver is not running
    /// - [`DmaError::FrameTooLarge`] if the frame needs more buffers than
    ///   the ring has
    pub fn send<D: DelayNs>(&mut self, frame: &[u8], end_of_frame: bool, delay: &mut D) -> Result<usize> {
        self.check_frame_fits(frame.len())?;

        let mut sent = 0;
        while sent < frame.len() {
            match self.dma.queue_chunk(&self.regs, &frame[sent..], end_of_frame) {
                Some(n) => sent += n,
                None => {
                    if self.dma.reclaim_completed() == 0 {
                        delay.delay_ms(BUFFER_WAIT_DELAY_MS);
                    }
                }
            }
        }
        Ok(sent)
    }

    // =========================================================================
    // Receive
    // =========================================================================

    /// Length of the next complete frame, or 0 if none is ready.
    ///
    /// Also repairs a buffer-not-available condition and drops fragments
    /// and frames that never ended.
    pub fn input_length(&mut self) -> usize {
        if !self.dma.is_initialized() {
            return 0;
        }
        self.dma.input_length(&self.regs)
    }

    /// Reset the read cursor to the start of the next frame.
    #[inline]
    pub fn begin_frame(&mut self) {
        self.dma.begin_frame();
    }

    /// Read the next section of a frame of `total` bytes.
    ///
    /// `None` resynchronizes the cursor at the start of a frame and reads
    /// nothing. Otherwise the slice is filled, stopping early only at the end
    /// of the frame. Returns the number of bytes copied.
    ///
    /// Call only after [`input_length`](Self::input_length) reported `total`.
    pub fn read(&mut self, dest: Option<&mut [u8]>, total: usize) -> usize {
        match dest {
            None => {
                self.dma.begin_frame();
                0
            }
            Some(dest) => self.dma.read(dest, total),
        }
    }

    /// Copy the next frame into `buffer`.
    ///
    /// Returns `Ok(0)` if no frame is ready.
    ///
    /// # Errors
    ///
    /// [`IoError::BufferTooSmall`] if the frame does not fit; the frame is
    /// dropped.
    pub fn receive(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let len = self.input_length();
        if len == 0 {
            return Ok(0);
        }

        self.dma.begin_frame();
        if buffer.len() < len {
            self.dma.discard(len);
            return Err(IoError::BufferTooSmall.into());
        }
        Ok(self.dma.read(&mut buffer[..len], len))
    }

    // =========================================================================
    // Interrupts
    // =========================================================================

    /// Interrupt handler body.
    ///
    /// A received frame bumps the receive-ready counter and clears RSR.REC;
    /// a transmitted frame reclaims its descriptors and clears TSR.COMP.
    /// Kept out of line so the trap shim stays small.
    #[inline(never)]
    pub fn handle_interrupt(&mut self) -> InterruptOutcome {
        let status = InterruptStatus::from_raw(self.regs.isr());
        let rx = ReceiveStatus::from_raw(self.regs.rsr());
        let mut outcome = InterruptOutcome {
            status,
            ..InterruptOutcome::default()
        };

        if status.rx_complete || rx.frame_received {
            self.rx_signals = self.rx_signals.saturating_add(1);
            self.regs.clear_rx_status(RSR_REC);
            outcome.rx_signalled = true;
            outcome.switch_required = self.rx_waiting;
        }

        if status.tx_complete {
            let tx = TransmitStatus::from_raw(self.regs.tsr());
            outcome.tx_reclaimed = self.dma.reclaim_completed();
            self.regs.clear_tx_status(TSR_COMP | tx.error_bits());
            outcome.transmit = tx;

            #[cfg(feature = "log")]
            if tx.has_error() {
                warn!("MACB transmit failed: {:?}", tx);
            }
        }

        #[cfg(feature = "log")]
        if status.has_error() {
            warn!("MACB interrupt error status: {:?}", status);
        }

        outcome
    }

    /// Consume one receive-ready signal, if any
    pub fn take_rx_signal(&mut self) -> bool {
        if self.rx_signals == 0 {
            return false;
        }
        self.rx_signals -= 1;
        true
    }

    /// Last resort after a receive wait timed out.
    ///
    /// If the receiver stalled on buffer-not-available, clear the flag and
    /// report whether a frame is nevertheless waiting in the ring.
    pub fn recover_stalled_rx(&mut self) -> bool {
        if self.regs.rsr() & RSR_BNA == 0 {
            return false;
        }
        self.regs.clear_rx_status(RSR_BNA);
        self.input_length() != 0
    }

    /// Wait up to `timeout_ms` for a received frame without an interrupt
    /// handler installed.
    ///
    /// Runs [`handle_interrupt`](Self::handle_interrupt) every millisecond.
    /// With an ISR installed use
    /// [`SharedMacb::wait_for_input`](crate::sync::SharedMacb::wait_for_input).
    pub fn wait_for_input<D: DelayNs>(&mut self, timeout_ms: u32, delay: &mut D) -> bool {
        let mut waited = 0u32;
        loop {
            self.handle_interrupt();
            if self.take_rx_signal() {
                return true;
            }
            if waited >= timeout_ms {
                break;
            }
            delay.delay_ms(INPUT_POLL_INTERVAL_MS);
            waited = waited.saturating_add(INPUT_POLL_INTERVAL_MS);
        }
        self.recover_stalled_rx()
    }

    #[cfg(feature = "critical-section")]
    pub(crate) fn set_rx_waiting(&mut self, waiting: bool) {
        self.rx_waiting = waiting;
    }

    // =========================================================================
    // PHY Link Interrupt
    // =========================================================================

    /// Route link changes from the PHY to `binding`.
    ///
    /// Registers the handler, arms the falling edge on `pin` and enables the
    /// PHY interrupt output.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InterruptRegistration`] if the controller refuses
    /// - [`ConfigError::GpioError`] if the pin cannot be armed
    /// - Any MDIO error
    pub fn enable_link_interrupt<P, G, I>(
        &mut self,
        phy: &mut P,
        pin: &mut G,
        irq: &mut I,
        binding: InterruptBinding,
    ) -> Result<()>
    where
        P: PhyDriver,
        G: PhyInterruptPin,
        I: InterruptController,
    {
        irq.register(binding)
            .map_err(|_| ConfigError::InterruptRegistration)?;
        pin.enable_falling_edge()
            .map_err(|_| ConfigError::GpioError)?;
        phy.enable_link_interrupt(&mut MacbMdio::new(&self.regs))
    }

    /// PHY interrupt handler body. Returns whether the link is up now.
    ///
    /// The pin's pending flag is cleared even when the MDIO traffic fails.
    #[inline(never)]
    pub fn handle_link_interrupt<P, G>(&mut self, phy: &mut P, pin: &mut G) -> Result<bool>
    where
        P: PhyDriver,
        G: PhyInterruptPin,
    {
        let mut mdio = MacbMdio::new(&self.regs);
        let link_up = phy
            .acknowledge_link_interrupt(&mut mdio)
            .and_then(|()| ieee802_3::current_link_up(&mut mdio, phy.address()));

        pin.clear_pending().map_err(|_| ConfigError::GpioError)?;
        link_up
    }

    /// Disarm the pin and the PHY interrupt output.
    ///
    /// # Errors
    ///
    /// [`ConfigError::GpioError`] or any MDIO error.
    pub fn disable_link_interrupt<P, G>(&mut self, phy: &mut P, pin: &mut G) -> Result<()>
    where
        P: PhyDriver,
        G: PhyInterruptPin,
    {
        pin.disable_interrupt()
            .map_err(|_| ConfigError::GpioError)?;
        phy.disable_link_interrupt(&mut MacbMdio::new(&self.regs))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    fn ensure_running(&self) -> Result<()> {
        if self.state == State::Running {
            Ok(())
        } else {
            Err(IoError::InvalidState.into())
        }
    }

    /// Get the current state
    #[inline(always)]
    pub fn state(&self) -> State {
        self.state
    }

    /// Get the configured station address
    #[inline(always)]
    pub fn station_address(&self) -> [u8; 6] {
        self.config.station_address
    }

    /// Link negotiated by the last successful `init`
    #[inline(always)]
    pub fn link(&self) -> Option<LinkStatus> {
        self.link
    }

    /// Get the current configuration
    #[inline(always)]
    pub fn config(&self) -> &MacbConfig {
        &self.config
    }

    /// TX descriptors queued and not yet reclaimed
    #[inline(always)]
    pub fn tx_in_flight(&self) -> usize {
        self.dma.tx_in_flight()
    }

    /// Check if the next RX buffer holds data
    #[inline(always)]
    pub fn rx_pending(&self) -> bool {
        self.dma.rx_pending()
    }

    #[cfg(test)]
    pub(crate) fn dma_mut(&mut self) -> &mut DmaEngine<RX_BUFS, TX_BUFS, TX_BUF_SIZE> {
        &mut self.dma
    }
}

/// MACB with the default ring sizes (20 RX buffers, 4 TX buffers of 512 bytes)
pub type MacbDefault<B> = Macb<B, DEFAULT_RX_BUFFERS, DEFAULT_TX_BUFFERS, DEFAULT_TX_BUFFER_SIZE>;

// =============================================================================
// Unit Tests
// =============================================================================
