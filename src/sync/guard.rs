use tracing::debug;

/// Whether the working copy differs from the last saved/loaded record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardState {
    #[default]
    Clean,
    Dirty,
}

/// An action that would replace the displayed record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavIntent {
    Next,
    Previous,
    Select(usize),
    /// Re-run both loaders
    Reload,
    /// Close the view (quit, route change)
    Leave,
}

/// How the user settles a suspended navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Abort the navigation and keep editing
    Stay,
    /// Drop the edits, then navigate
    Discard,
    /// Save, and navigate only if the save succeeds
    SaveThenProceed,
}

/// Result of passing an intent through the guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Proceed(NavIntent),
    Suspended,
}

/// CLEAN/DIRTY state machine that holds back navigation while edits are
/// pending.
#[derive(Debug, Default)]
pub struct UnsavedGuard {
    state: GuardState,
    pending: Option<NavIntent>,
}

impl UnsavedGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.state == GuardState::Dirty
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        let next = if dirty {
            GuardState::Dirty
        } else {
            GuardState::Clean
        };
        if next != self.state {
            debug!(from = ?self.state, to = ?next, "guard transition");
            self.state = next;
        }
        if next == GuardState::Clean {
            // Nothing left to protect
            self.pending = None;
        }
    }

    /// Let the intent through when clean; otherwise park it until resolved.
    /// A newer intent replaces one already parked.
    pub fn intercept(&mut self, intent: NavIntent) -> Gate {
        match self.state {
            GuardState::Clean => Gate::Proceed(intent),
            GuardState::Dirty => {
                debug!(?intent, "navigation suspended: unsaved changes");
                self.pending = Some(intent);
                Gate::Suspended
            }
        }
    }

    pub fn pending(&self) -> Option<&NavIntent> {
        self.pending.as_ref()
    }

    pub fn take_pending(&mut self) -> Option<NavIntent> {
        self.pending.take()
    }

    /// Drop the parked intent; the edits stay and the state stays DIRTY
    pub fn stay(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_lets_navigation_through() {
        let mut guard = UnsavedGuard::new();
        assert_eq!(guard.intercept(NavIntent::Next), Gate::Proceed(NavIntent::Next));
        assert!(guard.pending().is_none());
    }

    #[test]
    fn dirty_parks_latest_intent() {
        let mut guard = UnsavedGuard::new();
        guard.set_dirty(true);
        assert_eq!(guard.intercept(NavIntent::Next), Gate::Suspended);
        assert_eq!(guard.intercept(NavIntent::Select(3)), Gate::Suspended);
        assert_eq!(guard.pending(), Some(&NavIntent::Select(3)));
    }

    #[test]
    fn stay_keeps_dirty() {
        let mut guard = UnsavedGuard::new();
        guard.set_dirty(true);
        guard.intercept(NavIntent::Leave);
        guard.stay();
        assert!(guard.is_dirty());
        assert!(guard.pending().is_none());
    }

    #[test]
    fn cleaning_clears_pending() {
        let mut guard = UnsavedGuard::new();
        guard.set_dirty(true);
        guard.intercept(NavIntent::Reload);
        guard.set_dirty(false);
        assert_eq!(guard.state(), GuardState::Clean);
        assert!(guard.pending().is_none());
    }
}
