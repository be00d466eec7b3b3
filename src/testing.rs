//! Testing utilities and mock implementations
//!
//! Host-side stand-ins for the MACB register block, the MDIO bus, the PHY,
//! the interrupt controller, GPIO pins and delays.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

use crate::driver::error::Result;
use crate::hal::gpio::PhyInterruptPin;
use crate::hal::interrupt::{InterruptBinding, InterruptController, InterruptPriority};
use crate::hal::mdio::{MdioBus, anlpar, bmcr, bmsr, phy_reg};
use crate::internal::register::RegisterAccess;
use crate::internal::register::macb::{
    IDR_OFFSET, IER_OFFSET, IMR_OFFSET, ISR_OFFSET, MAN_DATA_MASK, MAN_OFFSET, MAN_PHYA_MASK,
    MAN_PHYA_SHIFT, MAN_REGA_MASK, MAN_REGA_SHIFT, MAN_RW_MASK, MAN_RW_READ, MAN_RW_WRITE,
    NCR_OFFSET, NCR_TSTART, NSR_IDLE, NSR_OFFSET, RSR_OFFSET, TSR_OFFSET,
};
use crate::phy::generic::{PhyDriver, ieee802_3};

/// PHYIDR1/PHYIDR2 of a DP83848
const DP83848_ID1: u16 = 0x2000;
const DP83848_ID2: u16 = 0x5C90;

/// BMSR capability bits of a 10/100 PHY, link down
const BMSR_CAPABILITIES: u16 = bmsr::TX_FD_CAPABLE
    | bmsr::TX_HD_CAPABLE
    | bmsr::T10_FD_CAPABLE
    | bmsr::T10_HD_CAPABLE
    | bmsr::AN_ABILITY
    | bmsr::EXT_CAPABLE;

/// Partner advertising every 10/100 mode
const ANLPAR_ALL: u16 = anlpar::SELECTOR_802_3
    | anlpar::CAN_100_FD
    | anlpar::CAN_100_HD
    | anlpar::CAN_10_FD
    | anlpar::CAN_10_HD;

// =============================================================================
// Mock MDIO Bus
// =============================================================================

/// Mock MDIO bus for testing PHY drivers without hardware
///
/// Writes of BMCR.RESET self-clear like a real PHY unless
/// [`hold_reset`](Self::hold_reset) is set.
///
/// ```ignore
/// let mut mdio = MockMdioBus::new();
/// mdio.set_register(0, phy_reg::BMSR, 0x786D);
/// assert!(ieee802_3::is_link_up(&mut mdio, 0).unwrap());
/// ```
#[derive(Debug, Default)]
pub struct MockMdioBus {
    /// Register values: (phy_addr, reg_addr) -> value
    registers: RefCell<HashMap<(u8, u8), u16>>,
    /// Record of writes: (phy_addr, reg_addr, value)
    write_log: RefCell<Vec<(u8, u8, u16)>>,
    /// Reads per register
    read_counts: RefCell<HashMap<(u8, u8), usize>>,
    /// BMSR reads that still report the link down, per PHY
    link_down_reads: RefCell<HashMap<u8, u32>>,
    /// Keep BMCR.RESET set after it is written
    hold_reset: Cell<bool>,
}

impl MockMdioBus {
    /// Create a new mock MDIO bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a register value without logging a write
    pub fn set_register(&self, phy_addr: u8, reg_addr: u8, value: u16) {
        self.registers
            .borrow_mut()
            .insert((phy_addr, reg_addr), value);
    }

    /// Get the current value of a register (for test verification)
    pub fn get_register(&self, phy_addr: u8, reg_addr: u8) -> Option<u16> {
        self.registers.borrow().get(&(phy_addr, reg_addr)).copied()
    }

    /// Get all writes that have been made
    pub fn get_writes(&self) -> Vec<(u8, u8, u16)> {
        self.write_log.borrow().clone()
    }

    /// Clear the write log
    pub fn clear_writes(&self) {
        self.write_log.borrow_mut().clear();
    }

    /// Number of reads of a register so far
    pub fn read_count(&self, phy_addr: u8, reg_addr: u8) -> usize {
        self.read_counts
            .borrow()
            .get(&(phy_addr, reg_addr))
            .copied()
            .unwrap_or(0)
    }

    /// Model a PHY stuck in reset
    pub fn hold_reset(&self, hold: bool) {
        self.hold_reset.set(hold);
    }

    /// Report the link down for the next `reads` BMSR reads
    pub fn link_up_after(&self, phy_addr: u8, reads: u32) {
        self.link_down_reads.borrow_mut().insert(phy_addr, reads);
    }

    /// Setup for a DP83848 PHY with power-on register values
    pub fn setup_dp83848(&self, phy_addr: u8) {
        self.set_register(phy_addr, phy_reg::PHYIDR1, DP83848_ID1);
        self.set_register(phy_addr, phy_reg::PHYIDR2, DP83848_ID2);

        // Capabilities, link down initially
        self.set_register(phy_addr, phy_reg::BMSR, BMSR_CAPABILITIES);

        // BMCR: auto-neg enabled
        self.set_register(phy_addr, phy_reg::BMCR, bmcr::AN_ENABLE);
        self.set_register(phy_addr, phy_reg::ANAR, 0x01E1);

        // Partner not advertising yet
        self.set_register(phy_addr, phy_reg::ANLPAR, 0x0000);
    }

    /// Simulate link coming up with 100 Mbps Full Duplex
    pub fn simulate_link_up_100_fd(&self, phy_addr: u8) {
        self.link_up(phy_addr, ANLPAR_ALL);
    }

    /// Simulate link coming up against a 10 Mbps Half Duplex partner
    pub fn simulate_link_up_10_hd(&self, phy_addr: u8) {
        self.link_up(phy_addr, anlpar::SELECTOR_802_3 | anlpar::CAN_10_HD);
    }

    /// Simulate link going down
    pub fn simulate_link_down(&self, phy_addr: u8) {
        let bmsr_val = self.get_register(phy_addr, phy_reg::BMSR).unwrap_or(0);
        self.set_register(
            phy_addr,
            phy_reg::BMSR,
            bmsr_val & !(bmsr::LINK_STATUS | bmsr::AN_COMPLETE),
        );
        self.set_register(phy_addr, phy_reg::ANLPAR, 0x0000);
    }

    fn link_up(&self, phy_addr: u8, partner: u16) {
        let bmsr_val = self.get_register(phy_addr, phy_reg::BMSR).unwrap_or(0);
        self.set_register(
            phy_addr,
            phy_reg::BMSR,
            bmsr_val | bmsr::LINK_STATUS | bmsr::AN_COMPLETE,
        );
        self.set_register(phy_addr, phy_reg::ANLPAR, partner);
    }
}

impl MdioBus for MockMdioBus {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        *self
            .read_counts
            .borrow_mut()
            .entry((phy_addr, reg_addr))
            .or_insert(0) += 1;

        let value = self.get_register(phy_addr, reg_addr).unwrap_or(0);

        if reg_addr == phy_reg::BMSR
            && let Some(remaining) = self.link_down_reads.borrow_mut().get_mut(&phy_addr)
            && *remaining > 0
        {
            *remaining -= 1;
            return Ok(value & !bmsr::LINK_STATUS);
        }

        Ok(value)
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        self.write_log
            .borrow_mut()
            .push((phy_addr, reg_addr, value));

        let stored = if reg_addr == phy_reg::BMCR && !self.hold_reset.get() {
            value & !bmcr::RESET
        } else {
            value
        };
        self.set_register(phy_addr, reg_addr, stored);
        Ok(())
    }
}

// =============================================================================
// Mock Register Block
// =============================================================================

#[derive(Debug, Default)]
struct RegisterState {
    values: HashMap<usize, u32>,
    writes: Vec<(usize, u32)>,
    reads: HashMap<usize, usize>,
    tx_starts: usize,
    mdio_busy: bool,
    phy: HashMap<(u8, u8), u16>,
}

/// Behavioural model of the MACB register block
///
/// - ISR clears on read
/// - TSR and RSR are write-1-to-clear
/// - IER/IDR set and clear IMR
/// - NCR.TSTART is counted and never stored
/// - NSR.IDLE is set unless [`hold_mdio_busy`](Self::hold_mdio_busy)
/// - MAN frames are executed against an internal PHY register map
///
/// Helpers that preset state are not recorded in [`writes`](Self::writes).
#[derive(Debug, Default)]
pub struct MockRegisters {
    state: RefCell<RegisterState>,
}

impl MockRegisters {
    /// Create a register block with every register reading 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Every register write so far: (offset, value)
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.state.borrow().writes.clone()
    }

    /// Number of reads of the register at `offset`
    pub fn reads_of(&self, offset: usize) -> usize {
        self.state.borrow().reads.get(&offset).copied().unwrap_or(0)
    }

    /// Raw stored value, bypassing read side effects
    pub fn value(&self, offset: usize) -> u32 {
        self.state.borrow().values.get(&offset).copied().unwrap_or(0)
    }

    /// Set Receive Status bits, as the hardware would
    pub fn set_rsr(&self, bits: u32) {
        self.raise(RSR_OFFSET, bits);
    }

    /// Set Transmit Status bits, as the hardware would
    pub fn set_tsr(&self, bits: u32) {
        self.raise(TSR_OFFSET, bits);
    }

    /// Latch interrupt causes in ISR
    pub fn raise_isr(&self, bits: u32) {
        self.raise(ISR_OFFSET, bits);
    }

    /// Number of NCR.TSTART writes
    pub fn tx_starts(&self) -> usize {
        self.state.borrow().tx_starts
    }

    /// Keep NSR.IDLE clear so MDIO transactions never finish
    pub fn hold_mdio_busy(&self, busy: bool) {
        self.state.borrow_mut().mdio_busy = busy;
    }

    /// Preset a register of the PHY behind the management port
    pub fn set_phy_register(&self, phy_addr: u8, reg_addr: u8, value: u16) {
        self.state
            .borrow_mut()
            .phy
            .insert((phy_addr, reg_addr), value);
    }

    /// Current value of a PHY register (0 if never set)
    pub fn phy_register(&self, phy_addr: u8, reg_addr: u8) -> u16 {
        self.state
            .borrow()
            .phy
            .get(&(phy_addr, reg_addr))
            .copied()
            .unwrap_or(0)
    }

    /// DP83848 with a 100 Mbps full duplex partner and the link up
    pub fn setup_dp83848_link_up(&self, phy_addr: u8) {
        self.set_phy_register(phy_addr, phy_reg::PHYIDR1, DP83848_ID1);
        self.set_phy_register(phy_addr, phy_reg::PHYIDR2, DP83848_ID2);
        self.set_phy_register(
            phy_addr,
            phy_reg::BMSR,
            BMSR_CAPABILITIES | bmsr::LINK_STATUS | bmsr::AN_COMPLETE,
        );
        self.set_phy_register(phy_addr, phy_reg::BMCR, bmcr::AN_ENABLE);
        self.set_phy_register(phy_addr, phy_reg::ANAR, 0x01E1);
        self.set_phy_register(phy_addr, phy_reg::ANLPAR, ANLPAR_ALL);
    }

    fn raise(&self, offset: usize, bits: u32) {
        *self.state.borrow_mut().values.entry(offset).or_insert(0) |= bits;
    }

    fn management_frame(state: &mut RegisterState, frame: u32) -> u32 {
        let phy_addr = ((frame & MAN_PHYA_MASK) >> MAN_PHYA_SHIFT) as u8;
        let reg_addr = ((frame & MAN_REGA_MASK) >> MAN_REGA_SHIFT) as u8;

        match frame & MAN_RW_MASK {
            MAN_RW_READ => {
                let data = state.phy.get(&(phy_addr, reg_addr)).copied().unwrap_or(0);
                (frame & !MAN_DATA_MASK) | data as u32
            }
            MAN_RW_WRITE => {
                let mut data = (frame & MAN_DATA_MASK) as u16;
                if reg_addr == phy_reg::BMCR {
                    data &= !bmcr::RESET;
                }
                state.phy.insert((phy_addr, reg_addr), data);
                frame
            }
            _ => frame,
        }
    }
}

impl RegisterAccess for MockRegisters {
    fn read(&self, offset: usize) -> u32 {
        let mut state = self.state.borrow_mut();
        *state.reads.entry(offset).or_insert(0) += 1;

        match offset {
            ISR_OFFSET => state.values.insert(ISR_OFFSET, 0).unwrap_or(0),
            NSR_OFFSET if state.mdio_busy => 0,
            NSR_OFFSET => NSR_IDLE,
            _ => state.values.get(&offset).copied().unwrap_or(0),
        }
    }

    fn write(&self, offset: usize, value: u32) {
        let mut state = self.state.borrow_mut();
        state.writes.push((offset, value));

        match offset {
            TSR_OFFSET | RSR_OFFSET => {
                *state.values.entry(offset).or_insert(0) &= !value;
            }
            IER_OFFSET => {
                *state.values.entry(IMR_OFFSET).or_insert(0) |= value;
            }
            IDR_OFFSET => {
                *state.values.entry(IMR_OFFSET).or_insert(0) &= !value;
            }
            ISR_OFFSET | IMR_OFFSET | NSR_OFFSET => {}
            NCR_OFFSET => {
                if value & NCR_TSTART != 0 {
                    state.tx_starts += 1;
                }
                state.values.insert(NCR_OFFSET, value & !NCR_TSTART);
            }
            MAN_OFFSET => {
                let latched = Self::management_frame(&mut state, value);
                state.values.insert(MAN_OFFSET, latched);
            }
            _ => {
                state.values.insert(offset, value);
            }
        }
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay for testing without actual timing
///
/// Records delays for verification without actually waiting.
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: RefCell<u64>,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total nanoseconds that were "delayed"
    pub fn total_ns(&self) -> u64 {
        *self.total_ns.borrow()
    }

    /// Get total milliseconds that were "delayed"
    pub fn total_ms(&self) -> u64 {
        self.total_ns() / 1_000_000
    }

    /// Reset the delay counter
    pub fn reset(&self) {
        *self.total_ns.borrow_mut() = 0;
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += ns as u64;
    }
}

// =============================================================================
// Mock PHY
// =============================================================================

/// PHY driver that records which hooks were called
#[derive(Debug)]
pub struct MockPhy {
    addr: u8,
    id: u32,
    calls: Vec<&'static str>,
    bmcr_seen: Option<u16>,
}

impl MockPhy {
    pub fn new(addr: u8, id: u32) -> Self {
        Self {
            addr,
            id,
            calls: Vec::new(),
            bmcr_seen: None,
        }
    }

    /// How often the named hook ran
    pub fn count(&self, hook: &str) -> usize {
        self.calls.iter().filter(|c| **c == hook).count()
    }

    /// BMCR value handed to `setup_auto_negotiation`
    pub fn bmcr_seen(&self) -> Option<u16> {
        self.bmcr_seen
    }
}

impl PhyDriver for MockPhy {
    fn address(&self) -> u8 {
        self.addr
    }

    fn expected_id(&self) -> u32 {
        self.id
    }

    fn hardware_reset<D: DelayNs>(&mut self, _delay: &mut D) -> Result<()> {
        self.calls.push("hardware_reset");
        Ok(())
    }

    fn software_reset<M: MdioBus, D: DelayNs>(&mut self, mdio: &mut M, delay: &mut D) -> Result<()> {
        self.calls.push("software_reset");
        ieee802_3::soft_reset(mdio, self.addr, delay)
    }

    fn setup_rmii<M: MdioBus>(&mut self, _mdio: &mut M) -> Result<()> {
        self.calls.push("setup_rmii");
        Ok(())
    }

    fn setup_auto_negotiation(&mut self, bmcr_val: u16) -> u16 {
        self.calls.push("setup_auto_negotiation");
        self.bmcr_seen = Some(bmcr_val);
        (bmcr_val | bmcr::AN_ENABLE | bmcr::AN_RESTART) & !bmcr::ISOLATE
    }
}

// =============================================================================
// Mock Interrupt Controller
// =============================================================================

/// Interrupt controller that records registrations
#[derive(Debug, Default)]
pub struct MockInterruptController {
    registered: Vec<(u32, InterruptPriority)>,
    reject: bool,
}

impl MockInterruptController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered (source, priority) pairs in order
    pub fn registrations(&self) -> Vec<(u32, InterruptPriority)> {
        self.registered.clone()
    }

    /// Refuse every registration from now on
    pub fn reject_all(&mut self, reject: bool) {
        self.reject = reject;
    }
}

impl InterruptController for MockInterruptController {
    type Error = &'static str;

    fn register(&mut self, binding: InterruptBinding) -> core::result::Result<(), Self::Error> {
        if self.reject {
            return Err("rejected");
        }
        self.registered.push((binding.source, binding.priority));
        Ok(())
    }
}

// =============================================================================
// Mock GPIO
// =============================================================================

/// GPIO pin double
///
/// As an output (through `&MockPin`) it records every driven level; as the
/// PHY interrupt input it records each call by name.
#[derive(Debug, Default)]
pub struct MockPin {
    levels: RefCell<Vec<bool>>,
    fail_next: Cell<bool>,
    events: RefCell<Vec<&'static str>>,
}

impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Levels driven so far (true = high)
    pub fn levels(&self) -> Vec<bool> {
        self.levels.borrow().clone()
    }

    /// Make the next pin operation fail
    pub fn fail_next(&self) {
        self.fail_next.set(true);
    }

    /// Interrupt-line calls so far
    pub fn events(&self) -> Vec<&'static str> {
        self.events.borrow().clone()
    }

    fn drive(&self, high: bool) -> core::result::Result<(), ErrorKind> {
        if self.fail_next.replace(false) {
            return Err(ErrorKind::Other);
        }
        self.levels.borrow_mut().push(high);
        Ok(())
    }

    fn event(&self, name: &'static str) -> core::result::Result<(), ErrorKind> {
        if self.fail_next.replace(false) {
            return Err(ErrorKind::Other);
        }
        self.events.borrow_mut().push(name);
        Ok(())
    }
}

impl ErrorType for &MockPin {
    type Error = ErrorKind;
}

impl OutputPin for &MockPin {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.drive(false)
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.drive(true)
    }
}

impl PhyInterruptPin for MockPin {
    type Error = ErrorKind;

    fn enable_falling_edge(&mut self) -> core::result::Result<(), Self::Error> {
        self.event("enable_falling_edge")
    }

    fn clear_pending(&mut self) -> core::result::Result<(), Self::Error> {
        self.event("clear_pending")
    }

    fn disable_interrupt(&mut self) -> core::result::Result<(), Self::Error> {
        self.event("disable_interrupt")
    }
}

// =============================================================================
// Tests for the mocks themselves
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::register::macb::{INT_RCOMP, RSR_BNA, RSR_REC};

    #[test]
    fn mock_mdio_read_write() {
        let mut mdio = MockMdioBus::new();
        mdio.write(0, phy_reg::ANAR, 0x01E1).unwrap();
        assert_eq!(mdio.read(0, phy_reg::ANAR).unwrap(), 0x01E1);
        assert_eq!(mdio.read(1, phy_reg::ANAR).unwrap(), 0);
        assert_eq!(mdio.get_writes(), [(0, phy_reg::ANAR, 0x01E1)]);
    }

    #[test]
    fn mock_mdio_link_countdown() {
        let mut mdio = MockMdioBus::new();
        mdio.setup_dp83848(0);
        mdio.simulate_link_up_100_fd(0);
        mdio.link_up_after(0, 2);

        let up = |m: &mut MockMdioBus| m.read(0, phy_reg::BMSR).unwrap() & bmsr::LINK_STATUS != 0;
        assert!(!up(&mut mdio));
        assert!(!up(&mut mdio));
        assert!(up(&mut mdio));
        assert_eq!(mdio.read_count(0, phy_reg::BMSR), 3);
    }

    #[test]
    fn mock_delay_tracking() {
        let mut delay = MockDelay::new();
        delay.delay_us(100);
        delay.delay_ms(2);
        assert_eq!(delay.total_ns(), 2_100_000);
        assert_eq!(delay.total_ms(), 2);
        delay.reset();
        assert_eq!(delay.total_ns(), 0);
    }

    #[test]
    fn mock_registers_status_semantics() {
        let regs = MockRegisters::new();
        regs.raise_isr(INT_RCOMP);
        assert_eq!(regs.read(ISR_OFFSET), INT_RCOMP);
        assert_eq!(regs.read(ISR_OFFSET), 0);

        regs.set_rsr(RSR_BNA | RSR_REC);
        regs.write(RSR_OFFSET, RSR_REC);
        assert_eq!(regs.read(RSR_OFFSET), RSR_BNA);

        regs.write(IER_OFFSET, 0b110);
        regs.write(IDR_OFFSET, 0b010);
        assert_eq!(regs.read(IMR_OFFSET), 0b100);
    }

    #[test]
    fn mock_registers_run_management_frames() {
        let regs = MockRegisters::new();
        regs.set_phy_register(1, phy_reg::BMSR, 0x786D);

        let read = (0b01 << 30) | MAN_RW_READ | (1 << MAN_PHYA_SHIFT) | (1 << MAN_REGA_SHIFT);
        regs.write(MAN_OFFSET, read);
        assert_eq!(regs.read(MAN_OFFSET) & MAN_DATA_MASK, 0x786D);

        let write = (0b01 << 30) | MAN_RW_WRITE | (1 << MAN_PHYA_SHIFT) | bmcr::RESET as u32;
        regs.write(MAN_OFFSET, write);
        assert_eq!(regs.phy_register(1, phy_reg::BMCR), 0);
    }

    #[test]
    fn mock_pin_failure_is_one_shot() {
        let pin = MockPin::new();
        let mut out = &pin;
        pin.fail_next();
        assert!(out.set_low().is_err());
        out.set_low().unwrap();
        assert_eq!(pin.levels(), [false]);
    }
}
