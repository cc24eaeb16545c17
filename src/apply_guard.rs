// ABOUTME: Theme apply guard for the big-deck engine
// ABOUTME: Defers reload requests that arrive while a theme is being applied

use log::debug;

/// Idle → Applying → (Idle | PendingReapply → Applying)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyState {
    #[default]
    Idle,
    Applying,
    /// A reload arrived mid-apply; any further requests collapse into it
    PendingReapply,
}

#[derive(Debug, Default)]
pub struct ApplyGuard {
    state: ApplyState,
}

impl ApplyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ApplyState {
        self.state
    }

    pub fn is_applying(&self) -> bool {
        self.state != ApplyState::Idle
    }

    /// Ask to apply. Returns true if the caller may apply now; otherwise the
    /// request is latched for after the running apply.
    pub fn request(&mut self) -> bool {
        match self.state {
            ApplyState::Idle => {
                self.state = ApplyState::Applying;
                true
            }
            ApplyState::Applying => {
                debug!("Theme apply in progress, deferring reload");
                self.state = ApplyState::PendingReapply;
                false
            }
            ApplyState::PendingReapply => {
                debug!("Theme reload already pending");
                false
            }
        }
    }

    /// Finish the running apply. Returns true if one deferred reload must run
    /// now, in which case the guard stays in `Applying`.
    pub fn finish(&mut self) -> bool {
        match self.state {
            ApplyState::PendingReapply => {
                self.state = ApplyState::Applying;
                true
            }
            ApplyState::Applying | ApplyState::Idle => {
                self.state = ApplyState::Idle;
                false
            }
        }
    }

    /// Return to idle after a failed apply. Returns true if a pending reload
    /// was dropped.
    pub fn reset(&mut self) -> bool {
        let dropped = self.state == ApplyState::PendingReapply;
        self.state = ApplyState::Idle;
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_requests_collapse_to_one() {
        let mut guard = ApplyGuard::new();
        assert!(guard.request());
        assert!(!guard.request());
        assert!(!guard.request());
        assert!(!guard.request());
        assert_eq!(guard.state(), ApplyState::PendingReapply);

        assert!(guard.finish());
        assert_eq!(guard.state(), ApplyState::Applying);
        assert!(!guard.finish());
        assert_eq!(guard.state(), ApplyState::Idle);
    }

    #[test]
    fn reset_drops_pending_request() {
        let mut guard = ApplyGuard::new();
        guard.request();
        guard.request();
        assert!(guard.reset());
        assert!(!guard.is_applying());
    }
}
