//! Relocation of designated functions into fast memory.
//!
//! The link step packs the affected functions together in flash and
//! publishes three addresses: where the bytes sit, and where execution
//! expects them. Boot copies them across exactly once, strictly before
//! the first relocated function can run. Repeating the copy with the same
//! ranges reproduces the same bytes, so the once-gate is about ordering
//! and wasted work, not correctness.

use core::ptr::{slice_from_raw_parts, slice_from_raw_parts_mut};

use spin::Once;

use super::{MemoryLayoutDescriptor, RamFuncRegion};

pub struct RamFuncRelocator {
    region: RamFuncRegion,
    done: Once<()>,
}

impl RamFuncRelocator {
    pub fn new(region: RamFuncRegion) -> Self {
        Self {
            region,
            done: Once::new(),
        }
    }

    /// `None` when the layout carries no relocation ranges; such a build
    /// copies nothing and treats the affected functions like any other.
    pub fn from_layout(layout: &MemoryLayoutDescriptor) -> Option<Self> {
        layout.ramfunc.map(Self::new)
    }

    /// Bytes to move: sized by the destination range.
    pub fn size(&self) -> usize {
        self.region.dest.size()
    }

    pub fn is_done(&self) -> bool {
        self.done.is_completed()
    }

    /// Perform the copy, at most once per relocator.
    ///
    /// # Safety
    /// The published source must hold `size()` readable bytes, the
    /// destination must be writable and disjoint from the source, and no
    /// relocated function may run before this returns.
    pub unsafe fn relocate(&self) {
        self.done.call_once(|| unsafe { self.copy() });
    }

    unsafe fn copy(&self) {
        let len = self.size();
        let src = unsafe {
            &*slice_from_raw_parts(self.region.source.as_usize() as *const u8, len)
        };
        let dst = unsafe {
            &mut *slice_from_raw_parts_mut(self.region.dest.start.as_usize() as *mut u8, len)
        };
        dst.copy_from_slice(src);
    }
}
