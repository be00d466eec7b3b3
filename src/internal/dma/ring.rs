//! Fixed-capacity circular ring of DMA descriptors.

/// Circular descriptor ring with a wrapping cursor.
///
/// The cursor is the next slot software will look at: the next free TX
/// descriptor, or the next RX descriptor to consume.
pub struct DescriptorRing<D, const N: usize> {
    /// Array of descriptors
    pub(super) descriptors: [D; N],
    /// Current index for processing
    pub(super) current: usize,
}

impl<D, const N: usize> DescriptorRing<D, N> {
    /// Create a new descriptor ring from an existing array
    #[must_use]
    pub const fn from_array(descriptors: [D; N]) -> Self {
        Self {
            descriptors,
            current: 0,
        }
    }

    /// Get the number of descriptors in the ring
    #[inline(always)]
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    /// Check if the ring has no slots
    #[inline(always)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Get the current index
    #[inline(always)]
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// Index following `index`, wrapping at the end of the ring
    #[inline(always)]
    #[must_use]
    pub const fn next_index(index: usize) -> usize {
        if index + 1 >= N { 0 } else { index + 1 }
    }

    /// Check if `index` is the slot that carries the wrap flag
    #[inline(always)]
    #[must_use]
    pub const fn is_last_slot(index: usize) -> bool {
        index + 1 == N
    }

    /// Advance the current index by one, wrapping around
    #[inline(always)]
    pub fn advance(&mut self) {
        self.current = Self::next_index(self.current);
    }

    /// Move the cursor to a specific slot
    #[inline(always)]
    pub fn set_current(&mut self, index: usize) {
        self.current = index % N;
    }

    /// Reset the current index to 0
    #[inline(always)]
    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// Get a reference to the current descriptor
    #[inline(always)]
    pub fn current(&self) -> &D {
        &self.descriptors[self.current]
    }

    /// Get a reference to a descriptor at a specific index
    #[inline(always)]
    pub fn get(&self, index: usize) -> &D {
        &self.descriptors[index % N]
    }

    /// Get the base address as u32 (for the queue pointer registers)
    #[inline(always)]
    pub fn base_addr_u32(&self) -> u32 {
        self.descriptors.as_ptr() as usize as u32
    }

    /// Iterate over all descriptors
    pub fn iter(&self) -> impl Iterator<Item = &D> {
        self.descriptors.iter()
    }
}

// =============================================================================
// Tests
// =============================================================================
