//! Variant-selected register-frame save/restore.
//!
//! The Cortex families leave a structured frame at a hardware-known spot
//! on exception entry, so installing a new context is a slot rebind and
//! capturing is a one-way copy out of that frame. The legacy ARM7/ARM9
//! cores give no such guarantee: both directions pay a full copy between
//! memory blocks. Which registers a capture transcribes is fixed by the
//! FPU policy at build time and monomorphized here, never branched on at
//! runtime.

use core::marker::PhantomData;

use crate::context::{FrameArena, FrameHandle};
use crate::cpu::CpuIndex;
use crate::registry::CurrentFrameRegistry;

/// Build-time floating-point save policy.
pub trait FpuPolicy {
    /// Whether a capture transcribes the FP block along with the integers.
    const SAVE_FPU: bool;
}

/// No floating-point unit configured.
pub struct NoFpu;
/// FP registers copied unconditionally on every capture.
pub struct EagerFpu;
/// FP registers left in hardware until an exception forces a flush; a
/// capture moves only the integer block.
pub struct LazyFpu;

impl FpuPolicy for NoFpu {
    const SAVE_FPU: bool = false;
}
impl FpuPolicy for EagerFpu {
    const SAVE_FPU: bool = true;
}
impl FpuPolicy for LazyFpu {
    const SAVE_FPU: bool = false;
}

/// The uniform save/restore contract every family implements.
pub trait SaveRestore {
    /// Copy the state currently marked "current" for `cpu` into `dest`.
    ///
    /// A processor with an empty slot has no state to capture; calling
    /// this outside exception context is a contract violation.
    fn capture_state(
        arena: &mut FrameArena,
        registry: &CurrentFrameRegistry,
        cpu: CpuIndex,
        dest: FrameHandle,
    );

    /// Make `frame` the state hardware resumes into for `cpu`.
    fn install_state(
        arena: &mut FrameArena,
        registry: &mut CurrentFrameRegistry,
        cpu: CpuIndex,
        frame: FrameHandle,
    );
}

fn current_or_panic(registry: &CurrentFrameRegistry, cpu: CpuIndex) -> FrameHandle {
    match registry.current(cpu) {
        Some(h) => h,
        None => panic!("cpu {} has no current frame", cpu),
    }
}

/// Cortex-M0/M3/M4/M7. Install is an O(1) slot rebind.
pub struct CortexM<F: FpuPolicy = NoFpu>(PhantomData<F>);

impl<F: FpuPolicy> SaveRestore for CortexM<F> {
    fn capture_state(
        arena: &mut FrameArena,
        registry: &CurrentFrameRegistry,
        cpu: CpuIndex,
        dest: FrameHandle,
    ) {
        let cur = current_or_panic(registry, cpu);
        if F::SAVE_FPU {
            arena.copy_full(dest, cur);
        } else {
            arena.copy_integer(dest, cur);
        }
    }

    fn install_state(
        _arena: &mut FrameArena,
        registry: &mut CurrentFrameRegistry,
        cpu: CpuIndex,
        frame: FrameHandle,
    ) {
        registry.set_current(cpu, Some(frame));
    }
}

/// Cortex-A/Cortex-R. Same mechanism as Cortex-M; the FPU, when present,
/// is only ever saved lazily on these cores (`BuildConfig` enforces it).
pub struct CortexAr<F: FpuPolicy = NoFpu>(PhantomData<F>);

impl<F: FpuPolicy> SaveRestore for CortexAr<F> {
    fn capture_state(
        arena: &mut FrameArena,
        registry: &CurrentFrameRegistry,
        cpu: CpuIndex,
        dest: FrameHandle,
    ) {
        let cur = current_or_panic(registry, cpu);
        if F::SAVE_FPU {
            arena.copy_full(dest, cur);
        } else {
            arena.copy_integer(dest, cur);
        }
    }

    fn install_state(
        _arena: &mut FrameArena,
        registry: &mut CurrentFrameRegistry,
        cpu: CpuIndex,
        frame: FrameHandle,
    ) {
        registry.set_current(cpu, Some(frame));
    }
}

/// ARM7/ARM9. No stable hardware frame: capture and install both copy the
/// whole context between blocks, and the slot keeps pointing at the block
/// built on the interrupt stack.
pub struct LegacyArm;

impl SaveRestore for LegacyArm {
    fn capture_state(
        arena: &mut FrameArena,
        registry: &CurrentFrameRegistry,
        cpu: CpuIndex,
        dest: FrameHandle,
    ) {
        let cur = current_or_panic(registry, cpu);
        arena.copy_full(dest, cur);
    }

    fn install_state(
        arena: &mut FrameArena,
        registry: &mut CurrentFrameRegistry,
        cpu: CpuIndex,
        frame: FrameHandle,
    ) {
        let cur = current_or_panic(registry, cpu);
        arena.copy_full(cur, frame);
    }
}

/// Capture the outgoing context into `save`, then install `restore`.
pub fn switch_context<S: SaveRestore>(
    arena: &mut FrameArena,
    registry: &mut CurrentFrameRegistry,
    cpu: CpuIndex,
    save: FrameHandle,
    restore: FrameHandle,
) {
    S::capture_state(arena, registry, cpu, save);
    S::install_state(arena, registry, cpu, restore);
}
