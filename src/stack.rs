//! Stack coloration for high-water monitoring.

/// Pattern written into unused stack words.
pub const STACK_COLOR: u32 = 0xdead_beef;

/// Color an entire stack region before first use.
pub fn color_stack(stack: &mut [u32]) {
    stack.fill(STACK_COLOR);
}

/// Bytes ever used by a descending stack whose region was colored.
///
/// Word 0 is the deepest address; everything still carrying the color
/// from there up was never touched.
pub fn stack_used(stack: &[u32]) -> usize {
    let untouched = stack.iter().take_while(|&&w| w == STACK_COLOR).count();
    (stack.len() - untouched) * core::mem::size_of::<u32>()
}
