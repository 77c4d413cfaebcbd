//! Developer tooling: frame timing.
//!
//! # Invariants
//! - Timing is driven by caller-supplied timestamps, so it is testable
//!   without a real clock.

mod frame_timer;

pub use frame_timer::{FrameReport, FrameTick, FrameTimer};

pub fn crate_info() -> &'static str {
    "stereoview-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
