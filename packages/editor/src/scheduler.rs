//! # Save Scheduling
//!
//! Decides *when* the session should attempt to persist. Two channels share
//! one gate (`dirty && !saving`):
//!
//! - **Debounced**: every dirty mutation pushes a single-shot deadline
//!   `debounce` into the future. Normal edit bursts save shortly after the
//!   user pauses.
//! - **Periodic**: a repeating tick. A tick saves only if the last successful
//!   save is at least `threshold` old, which bounds the data-loss window when
//!   edits arrive faster than the debounce delay and keep pushing it back.
//!
//! The scheduler owns no timers of its own. It is a state machine over
//! injected instants: callers ask for [`SaveScheduler::next_deadline`], sleep
//! until then, and [`SaveScheduler::poll`]. Both channels stay disarmed until
//! the document has a persisted identity.

use crate::SessionConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Why a save was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SaveTrigger {
    Debounced,
    Periodic,
    /// User initiated, bypasses scheduling
    Explicit,
}

impl fmt::Display for SaveTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SaveTrigger::Debounced => "debounced",
            SaveTrigger::Periodic => "periodic",
            SaveTrigger::Explicit => "explicit",
        })
    }
}

/// Session state the scheduler is gated on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveGate {
    pub dirty: bool,
    pub saving: bool,
}

impl SaveGate {
    fn is_open(&self) -> bool {
        self.dirty && !self.saving
    }
}

#[derive(Debug, Clone)]
pub struct SaveScheduler {
    debounce: Duration,
    interval: Duration,
    threshold: Duration,

    armed: bool,
    debounce_deadline: Option<Instant>,
    next_tick: Option<Instant>,
    last_saved_at: Option<Instant>,
}

impl SaveScheduler {
    pub fn new(debounce: Duration, interval: Duration, threshold: Duration) -> Self {
        Self {
            debounce,
            interval,
            threshold,
            armed: false,
            debounce_deadline: None,
            next_tick: None,
            last_saved_at: None,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            config.debounce(),
            config.periodic_interval(),
            config.periodic_threshold(),
        )
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Start the periodic channel and accept debounce requests
    ///
    /// The arm time counts as the last save: a freshly loaded document was
    /// just read from storage.
    pub fn arm(&mut self, now: Instant) {
        self.armed = true;
        self.debounce_deadline = None;
        self.next_tick = Some(now + self.interval);
        self.last_saved_at = Some(now);
    }

    /// Clear both timers
    pub fn disarm(&mut self) {
        self.armed = false;
        self.debounce_deadline = None;
        self.next_tick = None;
    }

    /// (Re)start the debounce timer after a dirty mutation
    pub fn note_dirty(&mut self, now: Instant) {
        if self.armed {
            self.debounce_deadline = Some(now + self.debounce);
        }
    }

    pub fn note_saved(&mut self, now: Instant) {
        self.last_saved_at = Some(now);
    }

    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debounce_deadline
    }

    /// Earliest instant at which [`SaveScheduler::poll`] has work
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.debounce_deadline, self.next_tick) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fire every timer due at `now`
    ///
    /// A timer that fires while the gate is closed is consumed without
    /// requesting a save. At most one save is requested per poll; the
    /// debounce channel wins when both fire together.
    pub fn poll(&mut self, now: Instant, gate: SaveGate) -> Option<SaveTrigger> {
        if !self.armed {
            return None;
        }

        let mut trigger = None;

        if self.debounce_deadline.is_some_and(|deadline| deadline <= now) {
            self.debounce_deadline = None;
            if gate.is_open() {
                trigger = Some(SaveTrigger::Debounced);
            }
        }

        if let Some(mut tick) = self.next_tick.filter(|tick| *tick <= now) {
            while tick <= now {
                tick += self.interval;
            }
            self.next_tick = Some(tick);

            let stale = self
                .last_saved_at
                .map_or(true, |saved| now.duration_since(saved) >= self.threshold);

            if trigger.is_none() && stale && gate.is_open() {
                trigger = Some(SaveTrigger::Periodic);
            }
        }

        trigger
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPEN: SaveGate = SaveGate {
        dirty: true,
        saving: false,
    };

    fn scheduler() -> SaveScheduler {
        SaveScheduler::new(
            Duration::from_secs(1),
            Duration::from_secs(15),
            Duration::from_secs(14),
        )
    }

    fn secs(n: f64) -> Duration {
        Duration::from_secs_f64(n)
    }

    #[test]
    fn test_disarmed_scheduler_never_fires() {
        let mut s = scheduler();
        let t0 = Instant::now();
        s.note_dirty(t0);
        assert_eq!(s.next_deadline(), None);
        assert_eq!(s.poll(t0 + secs(60.0), OPEN), None);
    }

    #[test]
    fn test_debounce_resets_on_each_mutation() {
        let mut s = scheduler();
        let t0 = Instant::now();
        s.arm(t0);

        s.note_dirty(t0);
        s.note_dirty(t0 + secs(0.5));
        assert_eq!(s.poll(t0 + secs(1.0), OPEN), None);
        assert_eq!(s.poll(t0 + secs(1.5), OPEN), Some(SaveTrigger::Debounced));
        assert_eq!(s.poll(t0 + secs(2.0), OPEN), None);
    }

    #[test]
    fn test_debounce_consumed_when_gate_closed() {
        let mut s = scheduler();
        let t0 = Instant::now();
        s.arm(t0);
        s.note_dirty(t0);

        let saving = SaveGate {
            dirty: true,
            saving: true,
        };
        assert_eq!(s.poll(t0 + secs(1.0), saving), None);
        assert_eq!(s.debounce_deadline(), None);
    }

    #[test]
    fn test_periodic_backstop_under_constant_edits() {
        let mut s = scheduler();
        let t0 = Instant::now();
        s.arm(t0);

        // An edit every 0.5s keeps pushing the debounce deadline back.
        let mut fired = None;
        let mut t = 0.0;
        while t < 16.0 {
            s.note_dirty(t0 + secs(t));
            t += 0.5;
            if let Some(trigger) = s.poll(t0 + secs(t), OPEN) {
                fired = Some((trigger, t));
                break;
            }
        }

        assert_eq!(fired, Some((SaveTrigger::Periodic, 15.0)));
    }

    #[test]
    fn test_periodic_tick_skips_recent_save() {
        let mut s = scheduler();
        let t0 = Instant::now();
        s.arm(t0);
        s.note_saved(t0 + secs(10.0));

        assert_eq!(s.poll(t0 + secs(15.0), OPEN), None);
        assert_eq!(s.next_deadline(), Some(t0 + secs(30.0)));
        assert_eq!(s.poll(t0 + secs(30.0), OPEN), Some(SaveTrigger::Periodic));
    }

    #[test]
    fn test_periodic_tick_requires_dirty() {
        let mut s = scheduler();
        let t0 = Instant::now();
        s.arm(t0);
        let clean = SaveGate {
            dirty: false,
            saving: false,
        };
        assert_eq!(s.poll(t0 + secs(15.0), clean), None);
    }

    #[test]
    fn test_disarm_clears_deadlines() {
        let mut s = scheduler();
        let t0 = Instant::now();
        s.arm(t0);
        s.note_dirty(t0);
        assert!(s.next_deadline().is_some());

        s.disarm();
        assert!(!s.is_armed());
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn test_next_deadline_is_earliest() {
        let mut s = scheduler();
        let t0 = Instant::now();
        s.arm(t0);
        assert_eq!(s.next_deadline(), Some(t0 + secs(15.0)));
        s.note_dirty(t0 + secs(2.0));
        assert_eq!(s.next_deadline(), Some(t0 + secs(3.0)));
    }
}
