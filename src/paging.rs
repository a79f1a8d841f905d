use memory_addr::{PhysAddr, VirtAddr};

/// Seam to the external paging subsystem.
///
/// The arch layer never walks page tables itself; it only asks whether a
/// faulting access can be satisfied so the abort dispatch can resume the
/// interrupted context. Any cross-processor coordination on a shared page
/// table lives behind this trait, not here.
pub trait FaultResolver {
    /// One-time setup, called from `page_init`.
    fn init(&mut self) {}

    /// Try to satisfy a faulting access. `true` means the mapping now
    /// exists and the aborted instruction may be restarted.
    fn resolve_fault(&mut self, addr: VirtAddr, status: u32) -> bool;

    /// Current translation for `addr`, if mapped.
    fn translate(&self, addr: VirtAddr) -> Option<PhysAddr>;
}

/// Configuration without demand paging: every abort is fatal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPaging;

impl FaultResolver for NoPaging {
    fn resolve_fault(&mut self, _addr: VirtAddr, _status: u32) -> bool {
        false
    }

    fn translate(&self, _addr: VirtAddr) -> Option<PhysAddr> {
        None
    }
}
