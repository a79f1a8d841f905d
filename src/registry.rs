use arrayvec::ArrayVec;

use crate::context::FrameHandle;
use crate::cpu::CpuIndex;

/// Largest processor count any configuration may request.
pub const MAX_CPUS: usize = 8;

/// Per-processor record of the register frame currently being serviced.
///
/// A slot is `None` while its processor runs ordinary task code and holds
/// the innermost active frame while it services an exception. Each
/// processor's entry/exit discipline is the only writer of its own slot,
/// so no cross-processor synchronization is involved; nesting is handled
/// by saving and restoring the prior slot value around each exception,
/// never by stacking frames here.
#[derive(Debug)]
pub struct CurrentFrameRegistry {
    slots: ArrayVec<Option<FrameHandle>, MAX_CPUS>,
}

impl CurrentFrameRegistry {
    /// `ncpus` must already have passed `BuildConfig::validate`.
    pub fn new(ncpus: usize) -> Self {
        assert!(ncpus >= 1 && ncpus <= MAX_CPUS, "bad cpu count {}", ncpus);
        let mut slots = ArrayVec::new();
        for _ in 0..ncpus {
            slots.push(None);
        }
        Self { slots }
    }

    pub fn ncpus(&self) -> usize {
        self.slots.len()
    }

    /// The frame being serviced on `cpu`, if any.
    pub fn current(&self, cpu: CpuIndex) -> Option<FrameHandle> {
        self.slots[cpu]
    }

    /// Is `cpu` currently in interrupt context?
    pub fn in_interrupt(&self, cpu: CpuIndex) -> bool {
        self.slots[cpu].is_some()
    }

    /// Rebind the slot outright. Used by the Cortex-family install path.
    pub fn set_current(&mut self, cpu: CpuIndex, frame: Option<FrameHandle>) {
        self.slots[cpu] = frame;
    }

    /// Entry-stub half of the nesting discipline: install `frame` and hand
    /// the prior slot value back to the stub for safekeeping.
    pub fn enter(&mut self, cpu: CpuIndex, frame: FrameHandle) -> Option<FrameHandle> {
        self.slots[cpu].replace(frame)
    }

    /// Exit-stub half: restore the value saved by the matching `enter`.
    pub fn leave(&mut self, cpu: CpuIndex, prior: Option<FrameHandle>) {
        self.slots[cpu] = prior;
    }
}
