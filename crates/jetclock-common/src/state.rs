//! Process-wide bring-up flags shared between the main flow, the update
//! task and the signal dispatcher.
//!
//! Both flags only ever move from `false` to `true`. There is no reset.

use std::sync::atomic::{AtomicBool, Ordering};

/// Monotonic flags describing how far bring-up has progressed.
///
/// Construct one per run and share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct ProcessState {
    update_finished: AtomicBool,
    in_hotspot: AtomicBool,
}

impl ProcessState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the update task has concluded.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn mark_update_finished(&self) -> bool {
        !self.update_finished.swap(true, Ordering::AcqRel)
    }

    /// Record that the hotspot came up.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn mark_in_hotspot(&self) -> bool {
        !self.in_hotspot.swap(true, Ordering::AcqRel)
    }

    pub fn update_finished(&self) -> bool {
        self.update_finished.load(Ordering::Acquire)
    }

    pub fn in_hotspot(&self) -> bool {
        self.in_hotspot.load(Ordering::Acquire)
    }

    /// The readiness condition: update decided and no hotspot running.
    pub fn splash_may_clear(&self) -> bool {
        self.update_finished() && !self.in_hotspot()
    }
}
