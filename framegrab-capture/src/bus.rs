/// Raw 32-bit access to a memory-mapped hardware register window.
///
/// Offsets are byte offsets from the window base and must be 4-byte aligned.
/// No range validation is performed; callers must stay within the register
/// map. Each call is a single bus transaction with no further side effects.
///
/// If the window does not front live hardware (unprivileged process, region
/// not mapped), reads return stale data and writes are silently lost. That
/// is a property of the platform and cannot be detected at this layer.
pub trait RegisterBus {
    fn read32(&self, offset: usize) -> u32;
    fn write32(&self, offset: usize, value: u32);
}

impl<B: RegisterBus + ?Sized> RegisterBus for &B {
    fn read32(&self, offset: usize) -> u32 {
        (**self).read32(offset)
    }

    fn write32(&self, offset: usize, value: u32) {
        (**self).write32(offset, value)
    }
}
