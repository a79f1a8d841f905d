//! Architecture-abstraction layer for ARM: one contract over the
//! Cortex-M, Cortex-A/R and legacy ARM7/ARM9 exception models.
//!
//! The kernel core sees a single surface for capturing interrupted
//! state, installing a new state and dispatching exceptions, while the
//! build configuration picks, once, which of three incompatible hardware
//! save/restore schemes and vector contracts actually runs. All three
//! strategies compile everywhere (they are plain logic over frame
//! storage), which is what lets the hosted test suite cover the whole
//! family/FPU matrix; the Cargo features only choose the `Active*`
//! bindings the vector stubs link against.

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod boot;
pub mod config;
pub mod context;
pub mod cpu;
pub mod mem;
pub mod paging;
pub mod registry;
pub mod stack;
pub mod strategy;

pub use arch::{FatalFault, FaultKind, IrqNumber, Scheduler, SyscallOp};
pub use boot::{arch_boot, BoardHooks};
pub use config::{BuildConfig, ConfigError};
pub use context::{FrameArena, FrameHandle, RegisterFrame};
pub use cpu::{CpuIdResolver, CpuIndex};
pub use mem::MemoryLayoutDescriptor;
pub use paging::{FaultResolver, NoPaging};
pub use registry::CurrentFrameRegistry;
pub use strategy::{switch_context, SaveRestore};

#[cfg(all(feature = "cortex-m", feature = "cortex-ar"))]
compile_error!("select exactly one architecture family");
#[cfg(all(feature = "cortex-m", feature = "legacy-arm"))]
compile_error!("select exactly one architecture family");
#[cfg(all(feature = "cortex-ar", feature = "legacy-arm"))]
compile_error!("select exactly one architecture family");
#[cfg(not(any(feature = "cortex-m", feature = "cortex-ar", feature = "legacy-arm")))]
compile_error!("select an architecture family: cortex-m, cortex-ar or legacy-arm");
#[cfg(all(feature = "lazy-fpu", feature = "legacy-arm"))]
compile_error!("lazy floating-point save is not supported on arm7/arm9");
#[cfg(all(feature = "lazy-fpu", feature = "cortex-ar"))]
compile_error!("cortex-a/r saves lazily whenever the fpu is enabled; lazy-fpu is a cortex-m switch");

/// FPU policy the features resolve to.
#[cfg(not(feature = "fpu"))]
pub type ActiveFpu = strategy::NoFpu;
#[cfg(all(feature = "fpu", feature = "lazy-fpu"))]
pub type ActiveFpu = strategy::LazyFpu;
#[cfg(all(feature = "fpu", not(feature = "lazy-fpu"), feature = "cortex-ar"))]
pub type ActiveFpu = strategy::LazyFpu;
#[cfg(all(feature = "fpu", not(feature = "lazy-fpu"), not(feature = "cortex-ar")))]
pub type ActiveFpu = strategy::EagerFpu;

/// Save/restore strategy the features resolve to.
#[cfg(feature = "cortex-m")]
pub type ActiveStrategy = strategy::CortexM<ActiveFpu>;
#[cfg(feature = "cortex-ar")]
pub type ActiveStrategy = strategy::CortexAr<ActiveFpu>;
#[cfg(feature = "legacy-arm")]
pub type ActiveStrategy = strategy::LegacyArm;

/// Dispatch module the vector stubs bind against.
#[cfg(feature = "cortex-m")]
pub use arch::cortex_m as exception;
#[cfg(feature = "cortex-ar")]
pub use arch::cortex_ar as exception;
#[cfg(feature = "legacy-arm")]
pub use arch::legacy_arm as exception;

/// Everything the dispatch contracts thread through: the frame storage
/// and the per-processor current-frame registry. One per system, owned
/// by kernel initialization, alive until halt.
#[derive(Debug)]
pub struct ArchState {
    pub frames: FrameArena,
    pub registry: CurrentFrameRegistry,
}

impl ArchState {
    /// `config` must already have passed `validate`.
    pub fn new(config: &BuildConfig) -> Self {
        Self::with_ncpus(config.ncpus)
    }

    pub fn with_ncpus(ncpus: usize) -> Self {
        Self {
            frames: FrameArena::new(),
            registry: CurrentFrameRegistry::new(ncpus),
        }
    }
}
