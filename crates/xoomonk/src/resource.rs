//! Recursion-depth budget.
//!
//! Nested `Block` evaluation (including a store firing its own body) can recurse arbitrarily
//! deep through aliasing, so the evaluator tracks depth and fails cleanly instead of
//! overflowing the native stack. No allocation/time/memory tracking: Xoomonk has no loops or
//! unbounded allocation, so those limits would never trigger.

/// Default recursion budget, generous enough for any reasonable program.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 2_000;

/// Tracks nested-block recursion depth and enforces a configurable limit.
#[derive(Debug, Clone, Copy)]
pub struct RecursionTracker {
    limit: usize,
    depth: usize,
}

impl RecursionTracker {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self { limit, depth: 0 }
    }

    /// A tracker with the crate's default limit.
    #[must_use]
    pub fn with_default_limit() -> Self {
        Self::new(DEFAULT_MAX_RECURSION_DEPTH)
    }

    /// Enters one level of nested-block evaluation.
    ///
    /// # Errors
    /// Returns `Err` (with the limit and the depth that would have resulted) if entering
    /// would exceed the configured limit. The caller must not call `leave` in that case.
    pub fn enter(&mut self) -> Result<(), (usize, usize)> {
        let next = self.depth + 1;
        if next > self.limit {
            return Err((self.limit, next));
        }
        self.depth = next;
        Ok(())
    }

    /// Leaves one level of nested-block evaluation.
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Default for RecursionTracker {
    fn default() -> Self {
        Self::with_default_limit()
    }
}
