//! Exception dispatch for the legacy ARM7/ARM9 family.
//!
//! These cores leave no structured frame at a hardware-known location, so
//! a requested switch is honoured by copying the switched-to context into
//! the block the vector stub built on the interrupt stack; the registry
//! slot itself never moves during dispatch. The abort entry points take
//! the fault address unconditionally; a configuration without paging
//! still reports it on the fatal path.

use log::trace;
use memory_addr::{PhysAddr, VirtAddr};

use super::{
    fatal, is_translation_fault, plumb_irq, plumb_syscall, FatalFault, FaultKind, IrqNumber,
    Scheduler,
};
use crate::context::FrameHandle;
use crate::cpu::CpuIndex;
use crate::paging::FaultResolver;
use crate::strategy::LegacyArm;
use crate::ArchState;

pub fn ack_irq(irq: IrqNumber) {
    trace!("irq {} acknowledged", irq);
}

pub fn dispatch_irq(
    state: &mut ArchState,
    sched: &mut dyn Scheduler,
    cpu: CpuIndex,
    irq: IrqNumber,
    frame: FrameHandle,
) -> FrameHandle {
    plumb_irq::<LegacyArm>(state, sched, cpu, irq, frame)
}

pub fn dispatch_syscall(
    state: &mut ArchState,
    sched: &mut dyn Scheduler,
    cpu: CpuIndex,
    frame: FrameHandle,
) -> FrameHandle {
    plumb_syscall::<LegacyArm>(state, sched, cpu, frame)
}

pub fn dispatch_data_abort(
    state: &ArchState,
    paging: &mut dyn FaultResolver,
    cpu: CpuIndex,
    frame: FrameHandle,
    fault_addr: VirtAddr,
    fault_status: u32,
) -> Result<FrameHandle, FatalFault> {
    debug_assert_eq!(state.registry.current(cpu), Some(frame));
    if is_translation_fault(fault_status) && paging.resolve_fault(fault_addr, fault_status) {
        return Ok(frame);
    }
    Err(fatal(FaultKind::DataAbort, cpu, Some(fault_addr), fault_status))
}

pub fn dispatch_prefetch_abort(
    state: &ArchState,
    paging: &mut dyn FaultResolver,
    cpu: CpuIndex,
    frame: FrameHandle,
    fault_addr: VirtAddr,
    fault_status: u32,
) -> Result<FrameHandle, FatalFault> {
    debug_assert_eq!(state.registry.current(cpu), Some(frame));
    if is_translation_fault(fault_status) && paging.resolve_fault(fault_addr, fault_status) {
        return Ok(frame);
    }
    Err(fatal(
        FaultKind::PrefetchAbort,
        cpu,
        Some(fault_addr),
        fault_status,
    ))
}

pub fn dispatch_undefined_insn(
    state: &ArchState,
    cpu: CpuIndex,
    frame: FrameHandle,
) -> Result<FrameHandle, FatalFault> {
    let pc = state.frames.get(frame).pc();
    Err(fatal(FaultKind::UndefinedInsn, cpu, Some((pc as usize).into()), 0))
}

pub fn page_init(paging: &mut dyn FaultResolver) {
    paging.init();
}

pub fn translate_virtual_address(
    paging: &dyn FaultResolver,
    addr: VirtAddr,
) -> Option<PhysAddr> {
    paging.translate(addr)
}
