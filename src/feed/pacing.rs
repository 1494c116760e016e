//! Frame-rate ceiling shared by both feed modes.
//!
//! [`FramePacer`] is a pure function of timestamps: callers ask whether a
//! frame arriving "now" may be presented and record the presentations they
//! perform. Decode and presentation live elsewhere, so the pacing rule is
//! testable without any I/O.

use std::time::{Duration, Instant};

/// Whether a frame may be presented now or must wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaceDecision {
    /// At least one budget interval has elapsed; present immediately.
    Present,
    /// The budget window is still open; present no earlier than after the
    /// contained delay.
    Defer(Duration),
}

/// Enforces a minimum interval between presented frames.
///
/// Invariant: if callers only present on [`PaceDecision::Present`] (or after
/// sleeping out a [`PaceDecision::Defer`]) and call
/// [`mark_presented`](Self::mark_presented) each time, no two presentations
/// are closer together than the budget.
#[derive(Debug, Clone)]
pub struct FramePacer {
    budget: Duration,
    last_presented: Option<Instant>,
}

impl FramePacer {
    /// Create a pacer with the given minimum inter-frame interval.
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            last_presented: None,
        }
    }

    /// The configured minimum inter-frame interval.
    #[must_use]
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Decide whether a frame arriving at `now` may be presented.
    #[must_use]
    pub fn check(&self, now: Instant) -> PaceDecision {
        match self.last_presented {
            None => PaceDecision::Present,
            Some(last) => {
                let elapsed = now.saturating_duration_since(last);
                if elapsed >= self.budget {
                    PaceDecision::Present
                } else {
                    PaceDecision::Defer(self.budget - elapsed)
                }
            }
        }
    }

    /// Record a presentation at `now`. The next budget window starts here.
    pub fn mark_presented(&mut self, now: Instant) {
        self.last_presented = Some(now);
    }

    /// Forget the last presentation (used on feed teardown so a restarted
    /// feed presents its first frame immediately).
    pub fn reset(&mut self) {
        self.last_presented = None;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    const BUDGET: Duration = Duration::from_millis(100);

    #[test]
    fn first_frame_presents_immediately() {
        let pacer = FramePacer::new(BUDGET);
        assert_eq!(pacer.check(Instant::now()), PaceDecision::Present);
    }

    #[test]
    fn frame_within_budget_is_deferred_by_remainder() {
        let mut pacer = FramePacer::new(BUDGET);
        let t0 = Instant::now();
        pacer.mark_presented(t0);

        let t1 = t0 + Duration::from_millis(30);
        match pacer.check(t1) {
            PaceDecision::Defer(remaining) => {
                assert_eq!(remaining, Duration::from_millis(70));
            }
            PaceDecision::Present => panic!("expected deferral inside budget window"),
        }
    }

    #[test]
    fn frame_at_budget_boundary_presents() {
        let mut pacer = FramePacer::new(BUDGET);
        let t0 = Instant::now();
        pacer.mark_presented(t0);

        assert_eq!(pacer.check(t0 + BUDGET), PaceDecision::Present);
        assert_eq!(
            pacer.check(t0 + BUDGET + Duration::from_millis(1)),
            PaceDecision::Present
        );
    }

    #[test]
    fn marking_restarts_the_window() {
        let mut pacer = FramePacer::new(BUDGET);
        let t0 = Instant::now();
        pacer.mark_presented(t0);
        pacer.mark_presented(t0 + BUDGET);

        // 30 ms into the second window.
        match pacer.check(t0 + BUDGET + Duration::from_millis(30)) {
            PaceDecision::Defer(remaining) => {
                assert_eq!(remaining, Duration::from_millis(70));
            }
            PaceDecision::Present => panic!("expected deferral in second window"),
        }
    }

    #[test]
    fn reset_allows_immediate_presentation() {
        let mut pacer = FramePacer::new(BUDGET);
        let t0 = Instant::now();
        pacer.mark_presented(t0);
        pacer.reset();
        assert_eq!(
            pacer.check(t0 + Duration::from_millis(1)),
            PaceDecision::Present
        );
    }

    #[test]
    fn zero_elapsed_defers_full_budget() {
        let mut pacer = FramePacer::new(BUDGET);
        let t0 = Instant::now();
        pacer.mark_presented(t0);
        assert_eq!(pacer.check(t0), PaceDecision::Defer(BUDGET));
    }
}
