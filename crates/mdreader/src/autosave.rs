use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_millis(30_000);

/// Debounce state of the autosave timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveState {
    Idle,
    Pending { deadline: Instant },
}

/// Debounced autosave of the active document. Every qualifying edit pushes
/// the deadline back by a full interval; the owner polls `deadline()` from
/// its event loop and calls `take_expired` once it has passed.
///
/// The scheduler only decides *when*. Whether the active document is still
/// worth writing is re-checked by the caller at expiry, since it may have
/// been saved, replaced or reverted in the meantime.
#[derive(Debug)]
pub struct AutosaveScheduler {
    enabled: bool,
    interval: Duration,
    state: AutosaveState,
}

impl AutosaveScheduler {
    pub fn new(enabled: bool, interval: Duration) -> Self {
        Self {
            enabled,
            interval,
            state: AutosaveState::Idle,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn state(&self) -> AutosaveState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, AutosaveState::Pending { .. })
    }

    /// Turning autosave off drops any pending save.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.cancel();
        }
    }

    /// Record a qualifying edit at `now`, (re)arming the timer. Returns
    /// false when autosave is disabled.
    pub fn note_edit(&mut self, now: Instant) -> bool {
        if !self.enabled {
            return false;
        }
        self.state = AutosaveState::Pending {
            deadline: now + self.interval,
        };
        log::debug!("Autosave armed ({:?})", self.interval);
        true
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            AutosaveState::Idle => None,
            AutosaveState::Pending { deadline } => Some(deadline),
        }
    }

    /// If the deadline has passed, return to Idle and report true.
    pub fn take_expired(&mut self, now: Instant) -> bool {
        match self.state {
            AutosaveState::Pending { deadline } if deadline <= now => {
                self.state = AutosaveState::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        if self.is_pending() {
            log::debug!("Autosave cancelled");
        }
        self.state = AutosaveState::Idle;
    }
}

impl Default for AutosaveScheduler {
    fn default() -> Self {
        Self::new(true, DEFAULT_AUTOSAVE_INTERVAL)
    }
}
