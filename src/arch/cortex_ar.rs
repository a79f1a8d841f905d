//! Exception dispatch for the Cortex-A/Cortex-R family.
//!
//! Unlike the M profile there is no separate acknowledge step: the
//! interrupt-controller read that identifies the IRQ acknowledges it, so
//! dispatch is a single combined entry point. This family carries the
//! abort vectors, and with paging configured a translation fault may be
//! resolved and the aborted instruction restarted.

use log::debug;
use memory_addr::{PhysAddr, VirtAddr};

use super::{
    fatal, is_translation_fault, is_write_access, plumb_irq, plumb_syscall, FatalFault, FaultKind,
    IrqNumber, Scheduler,
};
use crate::context::FrameHandle;
use crate::cpu::CpuIndex;
use crate::paging::FaultResolver;
use crate::strategy::{CortexAr, FpuPolicy};
use crate::ArchState;

/// Combined acknowledge + dispatch. Same return contract as every family:
/// the handle to resume, compared by identity against `frame`.
pub fn dispatch_irq<F: FpuPolicy>(
    state: &mut ArchState,
    sched: &mut dyn Scheduler,
    cpu: CpuIndex,
    irq: IrqNumber,
    frame: FrameHandle,
) -> FrameHandle {
    plumb_irq::<CortexAr<F>>(state, sched, cpu, irq, frame)
}

pub fn dispatch_syscall<F: FpuPolicy>(
    state: &mut ArchState,
    sched: &mut dyn Scheduler,
    cpu: CpuIndex,
    frame: FrameHandle,
) -> FrameHandle {
    plumb_syscall::<CortexAr<F>>(state, sched, cpu, frame)
}

/// Data abort: resumes only if paging satisfies a translation fault at
/// `fault_addr` (DFAR); anything else escalates.
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
        debug!(
            "data abort at {:#x} resolved (write={})",
            fault_addr.as_usize(),
            is_write_access(fault_status)
        );
        return Ok(frame);
    }
    Err(fatal(FaultKind::DataAbort, cpu, Some(fault_addr), fault_status))
}

/// Prefetch abort: same shape as the data abort, against IFAR/IFSR.
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
        debug!("prefetch abort at {:#x} resolved", fault_addr.as_usize());
        return Ok(frame);
    }
    Err(fatal(
        FaultKind::PrefetchAbort,
        cpu,
        Some(fault_addr),
        fault_status,
    ))
}

/// Undefined instructions never resume.
pub fn dispatch_undefined_insn(
    state: &ArchState,
    cpu: CpuIndex,
    frame: FrameHandle,
) -> Result<FrameHandle, FatalFault> {
    let pc = state.frames.get(frame).pc();
    Err(fatal(FaultKind::UndefinedInsn, cpu, Some((pc as usize).into()), 0))
}

/// One-time paging setup, before the first resolvable abort.
pub fn page_init(paging: &mut dyn FaultResolver) {
    paging.init();
    debug!("paging initialized");
}

pub fn translate_virtual_address(
    paging: &dyn FaultResolver,
    addr: VirtAddr,
) -> Option<PhysAddr> {
    paging.translate(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RegisterFrame;
    use crate::paging::NoPaging;
    use crate::strategy::NoFpu;

    struct SwitchTo(Option<FrameHandle>);

    impl Scheduler for SwitchTo {
        fn handle_irq(&mut self, _irq: IrqNumber, frame: FrameHandle) -> FrameHandle {
            self.0.unwrap_or(frame)
        }

        fn handle_syscall(&mut self, _op: u32, frame: FrameHandle) -> FrameHandle {
            self.0.unwrap_or(frame)
        }
    }

    /// Satisfies translation faults below a high-water address.
    struct OnePage {
        mapped_below: usize,
        initialized: bool,
        faults: Vec<usize>,
    }

    impl FaultResolver for OnePage {
        fn init(&mut self) {
            self.initialized = true;
        }

        fn resolve_fault(&mut self, addr: VirtAddr, _status: u32) -> bool {
            self.faults.push(addr.as_usize());
            addr.as_usize() < self.mapped_below
        }

        fn translate(&self, addr: VirtAddr) -> Option<PhysAddr> {
            if addr.as_usize() < self.mapped_below {
                Some(addr.as_usize().into())
            } else {
                None
            }
        }
    }

    fn entered(ncpus: usize, cpu: usize) -> (ArchState, FrameHandle, Option<FrameHandle>) {
        let mut state = ArchState::with_ncpus(ncpus);
        let frame = state.frames.alloc(RegisterFrame::zeroed());
        let prior = state.registry.enter(cpu, frame);
        (state, frame, prior)
    }

    #[test]
    fn resolvable_data_abort_resumes_unchanged() {
        let (mut state, frame, prior) = entered(1, 0);
        let bystander = state.frames.alloc(RegisterFrame::zeroed());
        let frame_before = *state.frames.get(frame);
        let bystander_before = *state.frames.get(bystander);
        let mut paging = OnePage {
            mapped_below: 0x8000,
            initialized: false,
            faults: Vec::new(),
        };

        let out = dispatch_data_abort(&state, &mut paging, 0, frame, 0x4004.into(), 0x7);
        assert_eq!(out, Ok(frame));
        assert_eq!(paging.faults, [0x4004]);

        // Registry and frames outside the faulting access are untouched.
        assert_eq!(state.registry.current(0), Some(frame));
        assert_eq!(*state.frames.get(frame), frame_before);
        assert_eq!(*state.frames.get(bystander), bystander_before);
        state.registry.leave(0, prior);
    }

    #[test]
    fn unresolvable_data_abort_is_fatal() {
        let (state, frame, _prior) = entered(1, 0);
        let mut paging = OnePage {
            mapped_below: 0x8000,
            initialized: false,
            faults: Vec::new(),
        };

        let err = dispatch_data_abort(&state, &mut paging, 0, frame, 0x9000.into(), 0x7)
            .unwrap_err();
        assert_eq!(err.kind, FaultKind::DataAbort);
        assert_eq!(err.addr, Some(0x9000.into()));
    }

    #[test]
    fn without_paging_every_abort_is_fatal() {
        let (state, frame, _prior) = entered(1, 0);
        let err = dispatch_data_abort(&state, &mut NoPaging, 0, frame, 0x4004.into(), 0x7)
            .unwrap_err();
        assert_eq!(err.kind, FaultKind::DataAbort);
    }

    #[test]
    fn permission_fault_is_never_resolved() {
        let (state, frame, _prior) = entered(1, 0);
        let mut paging = OnePage {
            mapped_below: 0x8000,
            initialized: false,
            faults: Vec::new(),
        };

        // 0xd = section permission fault; the resolver must not even be
        // consulted.
        let err = dispatch_data_abort(&state, &mut paging, 0, frame, 0x4004.into(), 0xd)
            .unwrap_err();
        assert_eq!(err.kind, FaultKind::DataAbort);
        assert!(paging.faults.is_empty());
    }

    #[test]
    fn prefetch_abort_resolves_like_data_abort() {
        let (state, frame, _prior) = entered(1, 0);
        let mut paging = OnePage {
            mapped_below: 0x8000,
            initialized: false,
            faults: Vec::new(),
        };
        let out = dispatch_prefetch_abort(&state, &mut paging, 0, frame, 0x100.into(), 0x5);
        assert_eq!(out, Ok(frame));
    }

    #[test]
    fn undefined_insn_is_fatal_and_reports_pc() {
        let mut state = ArchState::with_ncpus(1);
        let mut f = RegisterFrame::zeroed();
        f.gp[crate::context::REG_PC] = 0x1234;
        let frame = state.frames.alloc(f);

        let err = dispatch_undefined_insn(&state, 0, frame).unwrap_err();
        assert_eq!(err.kind, FaultKind::UndefinedInsn);
        assert_eq!(err.addr, Some(0x1234.into()));
    }

    #[test]
    fn page_init_reaches_the_resolver() {
        let mut paging = OnePage {
            mapped_below: 0,
            initialized: false,
            faults: Vec::new(),
        };
        page_init(&mut paging);
        assert!(paging.initialized);
    }

    #[test]
    fn translation_goes_through_the_resolver() {
        let paging = OnePage {
            mapped_below: 0x1000,
            initialized: true,
            faults: Vec::new(),
        };
        assert_eq!(
            translate_virtual_address(&paging, 0x500.into()),
            Some(0x500.into())
        );
        assert_eq!(translate_virtual_address(&paging, 0x2000.into()), None);
    }

    #[test]
    fn irq_on_one_cpu_leaves_other_slots_alone() {
        let mut state = ArchState::with_ncpus(4);
        let frame = state.frames.alloc(RegisterFrame::zeroed());
        let mut sched = SwitchTo(None);

        let prior = state.registry.enter(2, frame);
        assert!(state.registry.in_interrupt(2));
        let resume = dispatch_irq::<NoFpu>(&mut state, &mut sched, 2, 9, frame);
        assert_eq!(resume, frame);
        for cpu in [0, 1, 3] {
            assert!(!state.registry.in_interrupt(cpu));
        }
        state.registry.leave(2, prior);
        assert!(!state.registry.in_interrupt(2));
    }

    #[test]
    fn syscall_switch_rebinds_the_slot() {
        let mut state = ArchState::with_ncpus(1);
        let mut f = RegisterFrame::zeroed();
        f.gp[crate::context::REG_R0] = 1;
        let frame = state.frames.alloc(f);
        let next = state.frames.alloc(RegisterFrame::zeroed());
        let mut sched = SwitchTo(Some(next));

        let prior = state.registry.enter(0, frame);
        let resume = dispatch_syscall::<NoFpu>(&mut state, &mut sched, 0, frame);
        assert_eq!(resume, next);
        assert_eq!(state.registry.current(0), Some(next));
        state.registry.leave(0, prior);
    }
}
