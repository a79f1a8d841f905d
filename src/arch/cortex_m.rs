//! Exception dispatch for the Cortex-M family (M0/M3/M4/M7).
//!
//! The NVIC acknowledges an interrupt as part of exception entry, so
//! `ack_irq` has nothing to undo in software; it exists because the
//! vector contract names it for every family. Hard and memory faults are
//! always fatal here: the M profile has no demand paging.

use log::trace;
use memory_addr::VirtAddr;

use super::{fatal, plumb_irq, plumb_syscall, FatalFault, FaultKind, IrqNumber, Scheduler};
use crate::context::FrameHandle;
use crate::cpu::CpuIndex;
use crate::strategy::{CortexM, FpuPolicy};
use crate::ArchState;

pub fn ack_irq(irq: IrqNumber) {
    trace!("irq {} acknowledged", irq);
}

/// Dispatch an interrupt. The returned handle is the frame to resume:
/// the one passed in for "no switch", any other for "switch requested".
pub fn dispatch_irq<F: FpuPolicy>(
    state: &mut ArchState,
    sched: &mut dyn Scheduler,
    cpu: CpuIndex,
    irq: IrqNumber,
    frame: FrameHandle,
) -> FrameHandle {
    plumb_irq::<CortexM<F>>(state, sched, cpu, irq, frame)
}

/// Dispatch an SVC. The service number travels in r0 of the frame.
pub fn dispatch_svc<F: FpuPolicy>(
    state: &mut ArchState,
    sched: &mut dyn Scheduler,
    cpu: CpuIndex,
    frame: FrameHandle,
) -> FrameHandle {
    plumb_syscall::<CortexM<F>>(state, sched, cpu, frame)
}

/// Hard faults never resume. The faulting pc is reported in place of a
/// fault address; the M profile publishes none for this vector.
pub fn dispatch_hard_fault(
    state: &ArchState,
    cpu: CpuIndex,
    frame: FrameHandle,
    status: u32,
) -> Result<FrameHandle, FatalFault> {
    let pc = state.frames.get(frame).pc();
    Err(fatal(FaultKind::HardFault, cpu, Some((pc as usize).into()), status))
}

/// Memory-management faults (v7-M/v8-M only; v6-M escalates everything to
/// the hard fault vector). Fatal: no paging on this profile.
pub fn dispatch_mem_fault(
    state: &ArchState,
    cpu: CpuIndex,
    frame: FrameHandle,
    addr: VirtAddr,
    status: u32,
) -> Result<FrameHandle, FatalFault> {
    debug_assert_eq!(state.registry.current(cpu), Some(frame));
    Err(fatal(FaultKind::MemFault, cpu, Some(addr), status))
}
