//! Word-aligned DMA buffer storage.

/// Byte buffer with 4-byte alignment.
///
/// Descriptor address words reserve their two low bits for flags, so every
/// buffer handed to the DMA must start on a word boundary.
#[repr(C, align(4))]
pub struct AlignedBuffer<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> AlignedBuffer<N> {
    /// Zeroed buffer. Const-compatible.
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: [0; N] }
    }

    /// Buffer contents
    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable buffer contents
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Bus address of the first byte
    #[inline(always)]
    pub fn addr_u32(&self) -> u32 {
        self.bytes.as_ptr() as usize as u32
    }
}

impl<const N: usize> Default for AlignedBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
