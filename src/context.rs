use arrayvec::ArrayVec;

/// Number of integer words in a saved context: r0-r12, sp, lr, pc, cpsr.
pub const INT_REGS: usize = 17;
/// Number of floating-point words in a saved context: s0-s31 plus fpscr.
pub const FPU_REGS: usize = 33;

pub const REG_R0: usize = 0;
pub const REG_R1: usize = 1;
pub const REG_SP: usize = 13;
pub const REG_LR: usize = 14;
pub const REG_PC: usize = 15;
pub const REG_CPSR: usize = 16;
pub const REG_FPSCR: usize = FPU_REGS - 1;

/// Saved registers for one interrupted execution context.
///
/// The integer block is always meaningful; the floating-point block is
/// meaningful only when the build saves it eagerly (see `strategy`).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterFrame {
    /// General-purpose registers plus program status.
    pub gp: [u32; INT_REGS],
    /// FP registers (S0..S31) and FPSCR.
    pub fpu: [u32; FPU_REGS],
}

impl RegisterFrame {
    pub const fn zeroed() -> Self {
        Self {
            gp: [0; INT_REGS],
            fpu: [0; FPU_REGS],
        }
    }

    pub fn pc(&self) -> u32 {
        self.gp[REG_PC]
    }

    pub fn sp(&self) -> u32 {
        self.gp[REG_SP]
    }
}

impl Default for RegisterFrame {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Upper bound on live frames: one per task plus one per nesting level.
pub const MAX_FRAMES: usize = 64;

/// Index of one frame's storage in the arena.
///
/// Handles are the only way frames are referred to across this crate;
/// two handles are the same context exactly when they compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle(u16);

impl FrameHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Fixed-capacity storage for every live register frame.
#[derive(Debug)]
pub struct FrameArena {
    frames: ArrayVec<RegisterFrame, MAX_FRAMES>,
}

impl FrameArena {
    pub const fn new() -> Self {
        Self {
            frames: ArrayVec::new_const(),
        }
    }

    pub fn alloc(&mut self, frame: RegisterFrame) -> FrameHandle {
        let idx = self.frames.len();
        if self.frames.try_push(frame).is_err() {
            panic!("frame arena exhausted ({} frames)", MAX_FRAMES);
        }
        FrameHandle(idx as u16)
    }

    pub fn get(&self, handle: FrameHandle) -> &RegisterFrame {
        &self.frames[handle.index()]
    }

    pub fn get_mut(&mut self, handle: FrameHandle) -> &mut RegisterFrame {
        &mut self.frames[handle.index()]
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Copy the whole context, floating-point block included.
    pub fn copy_full(&mut self, dst: FrameHandle, src: FrameHandle) {
        if dst == src {
            return;
        }
        let from = self.frames[src.index()];
        self.frames[dst.index()] = from;
    }

    /// Copy only the integer block, leaving `dst`'s FP words untouched.
    pub fn copy_integer(&mut self, dst: FrameHandle, src: FrameHandle) {
        if dst == src {
            return;
        }
        let from = self.frames[src.index()].gp;
        self.frames[dst.index()].gp = from;
    }
}

impl Default for FrameArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(seed: u32) -> RegisterFrame {
        let mut f = RegisterFrame::zeroed();
        for (i, r) in f.gp.iter_mut().enumerate() {
            *r = seed.wrapping_add(i as u32);
        }
        for (i, r) in f.fpu.iter_mut().enumerate() {
            *r = seed.wrapping_mul(31).wrapping_add(i as u32);
        }
        f
    }

    #[test]
    fn handles_are_identity() {
        let mut arena = FrameArena::new();
        let a = arena.alloc(frame(1));
        let b = arena.alloc(frame(1));
        assert_ne!(a, b);
        assert_eq!(arena.get(a), arena.get(b));
    }

    #[test]
    fn full_copy_moves_both_blocks() {
        let mut arena = FrameArena::new();
        let src = arena.alloc(frame(7));
        let dst = arena.alloc(RegisterFrame::zeroed());
        arena.copy_full(dst, src);
        assert_eq!(arena.get(dst), arena.get(src));
    }

    #[test]
    fn integer_copy_leaves_fp_words() {
        let mut arena = FrameArena::new();
        let src = arena.alloc(frame(9));
        let dst = arena.alloc(frame(200));
        let dst_fpu_before = arena.get(dst).fpu;
        arena.copy_integer(dst, src);
        assert_eq!(arena.get(dst).gp, arena.get(src).gp);
        assert_eq!(arena.get(dst).fpu, dst_fpu_before);
    }

    #[test]
    fn self_copy_is_a_no_op() {
        let mut arena = FrameArena::new();
        let h = arena.alloc(frame(3));
        let before = *arena.get(h);
        arena.copy_full(h, h);
        assert_eq!(*arena.get(h), before);
    }
}
