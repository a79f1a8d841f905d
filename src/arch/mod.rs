//! The dispatch contract shared by the three ARM families.
//!
//! Every entry point here is called synchronously by an assembly vector
//! stub after that stub has built a register frame on the interrupt stack
//! and entered it into the registry. The stub's obligations are small and
//! fixed: `registry.enter` before dispatch, resume whatever frame dispatch
//! hands back, `registry.leave` with the saved prior value on the way out.
//! Returning the frame that came in means "resume unchanged"; returning
//! any other handle means the scheduler asked for a switch. Handles are
//! compared by identity, which is the whole signalling channel.

use log::{debug, error, warn};
use memory_addr::VirtAddr;

use crate::context::{FrameHandle, REG_R0};
use crate::cpu::CpuIndex;
use crate::strategy::SaveRestore;
use crate::ArchState;

pub mod cortex_ar;
pub mod cortex_m;
pub mod legacy_arm;

pub type IrqNumber = u32;

/// Out-of-scope collaborator that owns all scheduling decisions. This
/// layer only plumbs the returned frame back to the entry/exit code.
pub trait Scheduler {
    fn handle_irq(&mut self, irq: IrqNumber, frame: FrameHandle) -> FrameHandle;
    fn handle_syscall(&mut self, op: u32, frame: FrameHandle) -> FrameHandle;
}

numeric_enum_macro::numeric_enum! {
    #[repr(u32)]
    #[derive(Debug, Eq, PartialEq, Copy, Clone)]
    /// Service numbers carried in r0 of a syscall frame.
    pub enum SyscallOp {
        RestoreContext = 0,
        SwitchContext = 1,
        SyscallReturn = 2,
        SignalHandler = 3,
        SignalReturn = 4,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    DataAbort,
    PrefetchAbort,
    UndefinedInsn,
    HardFault,
    MemFault,
}

/// Report carried on the unrecoverable path. The vector stub escalates
/// this to the system-stop logic; nothing in this layer resumes from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatalFault {
    pub kind: FaultKind,
    pub cpu: CpuIndex,
    pub addr: Option<VirtAddr>,
    pub status: u32,
}

impl core::fmt::Display for FatalFault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.addr {
            Some(addr) => write!(
                f,
                "{:?} on cpu {} at {:#x}, status {:#x}",
                self.kind,
                self.cpu,
                addr.as_usize(),
                self.status
            ),
            None => write!(
                f,
                "{:?} on cpu {}, status {:#x}",
                self.kind, self.cpu, self.status
            ),
        }
    }
}

/// ARMv7 short-descriptor FSR: translation faults (section or page) are
/// the only kind paging can satisfy.
pub fn is_translation_fault(fsr: u32) -> bool {
    matches!(fsr & 0xf, 0x5 | 0x7)
}

/// DFSR WnR: write-not-read.
pub fn is_write_access(dfsr: u32) -> bool {
    dfsr & (1 << 11) != 0
}

pub(crate) fn plumb_irq<S: SaveRestore>(
    state: &mut ArchState,
    sched: &mut dyn Scheduler,
    cpu: CpuIndex,
    irq: IrqNumber,
    frame: FrameHandle,
) -> FrameHandle {
    debug_assert_eq!(state.registry.current(cpu), Some(frame));
    let next = sched.handle_irq(irq, frame);
    if next != frame {
        debug!("irq {}: switch requested on cpu {}", irq, cpu);
        S::install_state(&mut state.frames, &mut state.registry, cpu, next);
    }
    next
}

pub(crate) fn plumb_syscall<S: SaveRestore>(
    state: &mut ArchState,
    sched: &mut dyn Scheduler,
    cpu: CpuIndex,
    frame: FrameHandle,
) -> FrameHandle {
    let op = state.frames.get(frame).gp[REG_R0];
    match SyscallOp::try_from(op) {
        Ok(known) => debug!("syscall {:?} on cpu {}", known, cpu),
        Err(_) => warn!("syscall number {} unsupported", op),
    }
    let next = sched.handle_syscall(op, frame);
    if next != frame {
        S::install_state(&mut state.frames, &mut state.registry, cpu, next);
    }
    next
}

pub(crate) fn fatal(
    kind: FaultKind,
    cpu: CpuIndex,
    addr: Option<VirtAddr>,
    status: u32,
) -> FatalFault {
    let fault = FatalFault {
        kind,
        cpu,
        addr,
        status,
    };
    error!("unrecoverable fault: {}", fault);
    fault
}
