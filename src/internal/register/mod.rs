//! Memory-mapped register access for the MACB peripheral
//!
//! All driver register traffic goes through [`RegisterAccess`], so the same
//! driver code runs against the real register block ([`Mmio`]) and against a
//! host-side register model in tests.

pub mod macb;

/// MACB register block base address (AVR32 UC3A HSB/PBB mapping)
pub const MACB_BASE: usize = 0xFFFE_1800;

/// Read a 32-bit register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn read_reg(addr: usize) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

/// Write a 32-bit value to a register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn write_reg(addr: usize, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

// =============================================================================
// Register Access Trait
// =============================================================================

/// Word access to a register block, addressed by byte offset.
pub trait RegisterAccess {
    /// Read the 32-bit register at `offset`
    fn read(&self, offset: usize) -> u32;

    /// Write the 32-bit register at `offset`
    fn write(&self, offset: usize, value: u32);

    /// Read-modify-write
    #[inline(always)]
    fn modify<F>(&self, offset: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(offset);
        self.write(offset, f(value));
    }

    /// Set bits (read-modify-write)
    #[inline(always)]
    fn set_bits(&self, offset: usize, bits: u32) {
        self.modify(offset, |v| v | bits);
    }

    /// Clear bits (read-modify-write)
    #[inline(always)]
    fn clear_bits(&self, offset: usize, bits: u32) {
        self.modify(offset, |v| v & !bits);
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &T {
    #[inline(always)]
    fn read(&self, offset: usize) -> u32 {
        (**self).read(offset)
    }

    #[inline(always)]
    fn write(&self, offset: usize, value: u32) {
        (**self).write(offset, value);
    }
}

/// Volatile access to a memory-mapped register block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Create an accessor for the register block at `base`.
    ///
    /// # Safety
    /// `base` must be the address of a MACB register block, and no other
    /// code may drive that block while this accessor is in use.
    #[must_use]
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Accessor for the on-chip MACB at [`MACB_BASE`].
    ///
    /// # Safety
    /// Same contract as [`Mmio::new`].
    #[must_use]
    pub const unsafe fn macb() -> Self {
        Self { base: MACB_BASE }
    }

    /// Base address of the block
    #[inline(always)]
    pub const fn base(&self) -> usize {
        self.base
    }
}

impl RegisterAccess for Mmio {
    #[inline(always)]
    fn read(&self, offset: usize) -> u32 {
        // SAFETY: constructor contract guarantees a valid register block
        unsafe { read_reg(self.base + offset) }
    }

    #[inline(always)]
    fn write(&self, offset: usize, value: u32) {
        // SAFETY: constructor contract guarantees a valid register block
        unsafe { write_reg(self.base + offset, value) }
    }
}

// =============================================================================
// Register Access Macros
// =============================================================================

/// Generate read/write accessor methods for a register.
///
/// # Example
/// ```ignore
/// impl<B: RegisterAccess> MacbRegs<B> {
///     reg_rw!(ncr, set_ncr, NCR, "Network Control register");
/// }
/// ```
macro_rules! reg_rw {
    ($read_fn:ident, $write_fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!("Read ", $doc)]
        #[inline(always)]
        pub fn $read_fn(&self) -> u32 {
            self.bus.read($offset)
        }

        #[doc = concat!("Write ", $doc)]
        #[inline(always)]
        pub fn $write_fn(&self, value: u32) {
            self.bus.write($offset, value);
        }
    };
}

/// Generate a read-only accessor method for a register.
macro_rules! reg_ro {
    ($read_fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!("Read ", $doc)]
        #[inline(always)]
        pub fn $read_fn(&self) -> u32 {
            self.bus.read($offset)
        }
    };
}

/// Generate a write-only accessor method for a register.
macro_rules! reg_wo {
    ($write_fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!("Write ", $doc)]
        #[inline(always)]
        pub fn $write_fn(&self, value: u32) {
            self.bus.write($offset, value);
        }
    };
}

/// Generate set/clear bit operation methods for a register.
///
/// # Example
/// ```ignore
/// impl<B: RegisterAccess> MacbRegs<B> {
///     reg_bit_ops!(enable_rx, disable_rx, NCR, NCR_RE, "receiver", "Enable", "Disable");
/// }
/// ```
macro_rules! reg_bit_ops {
    ($set_fn:ident, $clear_fn:ident, $offset:expr, $bit:expr, $what:expr, $set_verb:expr, $clear_verb:expr) => {
        #[doc = concat!($set_verb, " ", $what)]
        #[inline(always)]
        pub fn $set_fn(&self) {
            self.bus.set_bits($offset, $bit);
        }

        #[doc = concat!($clear_verb, " ", $what)]
        #[inline(always)]
        pub fn $clear_fn(&self) {
            self.bus.clear_bits($offset, $bit);
        }
    };
}

/// Generate a bit check method (true when bit is set).
macro_rules! reg_bit_check {
    ($fn:ident, $offset:expr, $bit:expr, $doc:expr) => {
        #[doc = $doc]
        #[inline(always)]
        pub fn $fn(&self) -> bool {
            (self.bus.read($offset) & $bit) != 0
        }
    };
}

// Export macros for use in submodules
pub(crate) use reg_bit_check;
pub(crate) use reg_bit_ops;
pub(crate) use reg_ro;
pub(crate) use reg_rw;
pub(crate) use reg_wo;
