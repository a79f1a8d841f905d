//! Resolution of the executing processor's logical index.
//!
//! The index is the sole input used to pick a registry slot. Resolution
//! must hold up from normal code and from exception context alike, with
//! interrupts masked or unmasked, so every resolver here is a plain
//! register or constant read with no state behind it.

/// Logical processor index in `[0, ncpus)`.
pub type CpuIndex = usize;

pub trait CpuIdResolver {
    fn current_index(&self) -> CpuIndex;
}

/// Single-processor configurations: the index is always 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniProcessor;

impl CpuIdResolver for UniProcessor {
    fn current_index(&self) -> CpuIndex {
        0
    }
}

/// SMP configurations on real hardware: affinity level 0 of MPIDR.
#[cfg(all(target_arch = "arm", feature = "smp"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct MpidrResolver;

#[cfg(all(target_arch = "arm", feature = "smp"))]
impl CpuIdResolver for MpidrResolver {
    fn current_index(&self) -> CpuIndex {
        let mpidr: u32;
        unsafe {
            core::arch::asm!(
                "mrc p15, 0, {r}, c0, c0, 5",
                r = out(reg) mpidr,
                options(nomem, nostack, preserves_flags)
            );
        }
        (mpidr & 0xff) as CpuIndex
    }
}

#[cfg(all(target_arch = "arm", feature = "smp"))]
pub type ActiveCpuId = MpidrResolver;
#[cfg(not(all(target_arch = "arm", feature = "smp")))]
pub type ActiveCpuId = UniProcessor;

#[cfg(test)]
mod tests {
    use super::*;

    struct Pinned(CpuIndex);

    impl CpuIdResolver for Pinned {
        fn current_index(&self) -> CpuIndex {
            self.0
        }
    }

    #[test]
    fn uniprocessor_is_always_zero() {
        assert_eq!(UniProcessor.current_index(), 0);
        assert_eq!(UniProcessor.current_index(), 0);
    }

    #[test]
    fn resolved_index_stays_in_range() {
        let ncpus = 4;
        for cpu in 0..ncpus {
            let resolver = Pinned(cpu);
            assert!(resolver.current_index() < ncpus);
        }
    }
}
