//! GPIO interrupt line for the PHY
//!
//! Many PHYs signal link changes on an open-drain interrupt output wired to
//! a GPIO. The driver arms, acknowledges and disarms that line through
//! [`PhyInterruptPin`]; board code implements it on top of its HAL's pin type.

/// GPIO input carrying the PHY interrupt (active low)
pub trait PhyInterruptPin {
    /// Error reported by the GPIO HAL
    type Error: core::fmt::Debug;

    /// Interrupt on the falling edge
    fn enable_falling_edge(&mut self) -> Result<(), Self::Error>;

    /// Clear the pending interrupt flag of the pin
    fn clear_pending(&mut self) -> Result<(), Self::Error>;

    /// Stop interrupting on this pin
    fn disable_interrupt(&mut self) -> Result<(), Self::Error>;
}

impl<T: PhyInterruptPin> PhyInterruptPin for &mut T {
    type Error = T::Error;

    fn enable_falling_edge(&mut self) -> Result<(), Self::Error> {
        T::enable_falling_edge(self)
    }

    fn clear_pending(&mut self) -> Result<(), Self::Error> {
        T::clear_pending(self)
    }

    fn disable_interrupt(&mut self) -> Result<(), Self::Error> {
        T::disable_interrupt(self)
    }
}
