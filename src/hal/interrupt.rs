//! Interrupt controller registration
//!
//! The MACB and the optional PHY interrupt line are wired to an external
//! interrupt controller. The driver only needs to hand it a handler, a
//! source number and a priority; [`InterruptController`] is that seam.

/// Priority level on the interrupt controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum InterruptPriority {
    /// Lowest priority
    #[default]
    Level0 = 0,
    /// Level 1
    Level1 = 1,
    /// Level 2
    Level2 = 2,
    /// Highest priority
    Level3 = 3,
}

impl InterruptPriority {
    /// Numeric level (0 is lowest)
    #[must_use]
    pub const fn level(self) -> u8 {
        self as u8
    }
}

/// A handler bound to an interrupt source
#[derive(Debug, Clone, Copy)]
pub struct InterruptBinding {
    /// Trap shim to run, typically generated by [`macb_isr!`](crate::macb_isr)
    pub handler: fn(),
    /// Controller-specific source (IRQ line) number
    pub source: u32,
    /// Priority level
    pub priority: InterruptPriority,
}

impl InterruptBinding {
    /// Bind `handler` to `source` at `priority`
    #[must_use]
    pub const fn new(handler: fn(), source: u32, priority: InterruptPriority) -> Self {
        Self {
            handler,
            source,
            priority,
        }
    }
}

/// Registers handlers with the platform interrupt controller
pub trait InterruptController {
    /// Error reported by the controller
    type Error: core::fmt::Debug;

    /// Install `binding.handler` for `binding.source` at `binding.priority`
    fn register(&mut self, binding: InterruptBinding) -> Result<(), Self::Error>;
}

/// Controller for fully polled operation; registration does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct Polled;

impl InterruptController for Polled {
    type Error = core::convert::Infallible;

    fn register(&mut self, _binding: InterruptBinding) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<T: InterruptController> InterruptController for &mut T {
    type Error = T::Error;

    fn register(&mut self, binding: InterruptBinding) -> Result<(), Self::Error> {
        T::register(self, binding)
    }
}
