/// Index of a simulated frame. Frame 0 is the state before the first step.
pub type FrameIndex = u64;

/// Caller-assigned identifier used to order actions submitted for the same frame.
pub type ActionId = u64;
