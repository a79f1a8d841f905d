//! Linker-published memory layout and boot-time section setup.

use core::ptr::{slice_from_raw_parts, slice_from_raw_parts_mut};

use memory_addr::{VirtAddr, VirtAddrRange};

pub mod ramfunc;

/// Source and destination of the code relocated into fast memory: the
/// copy lands in `dest`, having been stored at `source` by the link step.
#[derive(Debug, Clone, Copy)]
pub struct RamFuncRegion {
    pub source: VirtAddr,
    pub dest: VirtAddrRange,
}

/// The address ranges the link step publishes. Created once at boot and
/// never mutated; these are values, not storage this crate owns.
#[derive(Debug, Clone, Copy)]
pub struct MemoryLayoutDescriptor {
    /// `.text`.
    pub text: VirtAddrRange,
    /// End of everything read-only (`.text` + `.rodata`); the initialized
    /// data image sits here in flash.
    pub rodata_end: VirtAddr,
    /// `.data` at its run location.
    pub data: VirtAddrRange,
    /// `.bss`.
    pub bss: VirtAddrRange,
    /// Relocated-code ranges, when the build carries them.
    pub ramfunc: Option<RamFuncRegion>,
}

impl MemoryLayoutDescriptor {
    /// Where the `.data` image lives in flash.
    pub fn data_image(&self) -> VirtAddrRange {
        VirtAddrRange::new(
            self.rodata_end,
            (self.rodata_end.as_usize() + self.data.size()).into(),
        )
    }

    /// Zero-fill `.bss`.
    ///
    /// # Safety
    /// The published range must be writable and unaliased; call once,
    /// before anything reads a zero-initialized static.
    pub unsafe fn clean_bss(&self) {
        let bss = unsafe {
            &mut *slice_from_raw_parts_mut(self.bss.start.as_usize() as *mut u8, self.bss.size())
        };
        bss.fill(0);
    }

    /// Copy the `.data` image from flash to its run location.
    ///
    /// # Safety
    /// Same conditions as `clean_bss`, plus a valid image at
    /// `data_image()`.
    pub unsafe fn init_data(&self) {
        let src = unsafe {
            &*slice_from_raw_parts(self.rodata_end.as_usize() as *const u8, self.data.size())
        };
        let dst = unsafe {
            &mut *slice_from_raw_parts_mut(self.data.start.as_usize() as *mut u8, self.data.size())
        };
        dst.copy_from_slice(src);
    }
}

/// Read the layout from the linker-defined symbols. Their "addresses" are
/// the published values; they are not real storage locations.
#[cfg(target_os = "none")]
pub fn from_linker_symbols() -> MemoryLayoutDescriptor {
    use core::ptr::addr_of;

    extern "C" {
        static _stext: u8;
        static _etext: u8;
        static _eronly: u8;
        static _sdata: u8;
        static _edata: u8;
        static _sbss: u8;
        static _ebss: u8;
        #[cfg(feature = "ramfuncs")]
        static _framfuncs: u8;
        #[cfg(feature = "ramfuncs")]
        static _sramfuncs: u8;
        #[cfg(feature = "ramfuncs")]
        static _eramfuncs: u8;
    }

    unsafe {
        MemoryLayoutDescriptor {
            text: VirtAddrRange::new(
                (addr_of!(_stext) as usize).into(),
                (addr_of!(_etext) as usize).into(),
            ),
            rodata_end: (addr_of!(_eronly) as usize).into(),
            data: VirtAddrRange::new(
                (addr_of!(_sdata) as usize).into(),
                (addr_of!(_edata) as usize).into(),
            ),
            bss: VirtAddrRange::new(
                (addr_of!(_sbss) as usize).into(),
                (addr_of!(_ebss) as usize).into(),
            ),
            #[cfg(feature = "ramfuncs")]
            ramfunc: Some(RamFuncRegion {
                source: (addr_of!(_framfuncs) as usize).into(),
                dest: VirtAddrRange::new(
                    (addr_of!(_sramfuncs) as usize).into(),
                    (addr_of!(_eramfuncs) as usize).into(),
                ),
            }),
            #[cfg(not(feature = "ramfuncs"))]
            ramfunc: None,
        }
    }
}
