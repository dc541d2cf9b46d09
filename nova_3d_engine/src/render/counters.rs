/// Per-frame profiling counters.
///
/// Observable side effects only — nothing in the pipeline reads these for
/// control flow. Shared by `Arc` between the culling engine and the render
/// passes; reset at the top of each frame.

use std::sync::atomic::{AtomicU32, Ordering};

/// Profiling counters for one frame.
#[derive(Debug, Default)]
pub struct FrameCounters {
    /// Cull test invocations this frame
    culls: AtomicU32,
    /// Draw calls submitted this frame
    draw_calls: AtomicU32,
    /// Primitives submitted this frame
    primitives: AtomicU32,
}

impl FrameCounters {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all counters (called at the top of each frame)
    pub fn begin_frame(&self) {
        self.culls.store(0, Ordering::Relaxed);
        self.draw_calls.store(0, Ordering::Relaxed);
        self.primitives.store(0, Ordering::Relaxed);
    }

    /// Record one cull test invocation
    pub fn add_cull(&self) {
        self.culls.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one draw call submitting `primitives` primitives
    pub fn add_draw_call(&self, primitives: u32) {
        self.draw_calls.fetch_add(1, Ordering::Relaxed);
        self.primitives.fetch_add(primitives, Ordering::Relaxed);
    }

    /// Cull tests so far this frame
    pub fn culls(&self) -> u32 {
        self.culls.load(Ordering::Relaxed)
    }

    /// Draw calls so far this frame
    pub fn draw_calls(&self) -> u32 {
        self.draw_calls.load(Ordering::Relaxed)
    }

    /// Primitives so far this frame
    pub fn primitives(&self) -> u32 {
        self.primitives.load(Ordering::Relaxed)
    }
}
