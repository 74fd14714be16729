//! Batch-status polling state machine.
//!
//! Ingestion job status lags job submission: a freshly enqueued batch may not
//! show up in the status endpoint for a few ticks. Polling therefore keeps
//! going for a bounded grace window after the last active job disappears
//! instead of stopping on the first empty snapshot.
//!
//! The machine is a pure function of `(state, event)` and knows nothing about
//! timers. Whatever drives the ticks (UI timer, long-poll, webhook) feeds the
//! fetch result in as a [`PollEvent`] and renders the returned
//! [`RenderDecision`].

use serde::Serialize;

use crate::job_status::{has_active_jobs, JobStatus};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Grace budget of a freshly active session, in polling ticks.
pub const GRACE_TICKS: u8 = 12;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Polling phase of a single session.
///
/// `poll_active` and the remaining grace budget are both derived from the
/// phase, so "grace > 0 implies active" holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "phase", content = "grace", rename_all = "snake_case")]
pub enum PollPhase {
    /// Not polling.
    #[default]
    Idle,
    /// At least one job was active on the last fetch (or a batch was just
    /// enqueued). Grace budget is [`GRACE_TICKS`].
    Active,
    /// No active job seen; `n` ticks of grace remain (`1..GRACE_TICKS`).
    Grace(u8),
}

impl PollPhase {
    /// Whether the scheduler should keep fetching status.
    pub fn is_polling(self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Remaining grace budget in ticks.
    pub fn grace_remaining(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Active => GRACE_TICKS,
            Self::Grace(n) => n,
        }
    }

    /// Phase after a tick whose snapshot had no active job.
    fn decay(self) -> Self {
        match self {
            Self::Active => Self::Grace(GRACE_TICKS - 1),
            Self::Grace(n) if n > 1 => Self::Grace(n - 1),
            Self::Grace(_) | Self::Idle => Self::Idle,
        }
    }
}

/// Polling state of a session: the phase plus the last known snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    pub phase: PollPhase,
    pub snapshot: Vec<JobStatus>,
}

impl PollState {
    /// What to display for this state without fetching anything.
    ///
    /// The status table stays visible as long as the last snapshot is
    /// non-empty, so a finished batch remains on screen after polling stops.
    pub fn render(&self) -> RenderDecision {
        RenderDecision {
            visible: !self.snapshot.is_empty(),
            keep_polling: self.phase.is_polling(),
            grace_remaining: self.phase.grace_remaining(),
            jobs: self.snapshot.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Events and output
// ---------------------------------------------------------------------------

/// Input to a single transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// New jobs were submitted for ingestion.
    Enqueued,
    /// A scheduled status fetch succeeded with this snapshot. Counts down the
    /// grace budget when no job is active.
    Snapshot(Vec<JobStatus>),
    /// A status fetch made right after a submission succeeded. Records the
    /// snapshot without spending grace: the new jobs may not be listed yet.
    Refreshed(Vec<JobStatus>),
    /// The status fetch failed (backend unreachable or returned an error).
    FetchFailed,
    /// The user switched to another conversation; its batch is unknown until
    /// the next fetch.
    ConversationSwitched,
}

/// What the caller should display after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderDecision {
    /// Show the batch-status table.
    pub visible: bool,
    /// Schedule another status fetch.
    pub keep_polling: bool,
    pub grace_remaining: u8,
    pub jobs: Vec<JobStatus>,
}

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// Apply `event` to `state`.
///
/// Non-admin sessions never poll: every event leaves them `Idle` with an
/// empty snapshot.
pub fn transition(state: &PollState, is_admin: bool, event: PollEvent) -> (PollState, RenderDecision) {
    if !is_admin {
        let next = PollState::default();
        let decision = next.render();
        return (next, decision);
    }

    let next = match event {
        PollEvent::Enqueued => PollState {
            phase: PollPhase::Active,
            snapshot: state.snapshot.clone(),
        },
        PollEvent::ConversationSwitched => PollState {
            phase: PollPhase::Active,
            snapshot: Vec::new(),
        },
        PollEvent::FetchFailed => PollState::default(),
        PollEvent::Snapshot(snapshot) => {
            let phase = if has_active_jobs(&snapshot) {
                PollPhase::Active
            } else {
                state.phase.decay()
            };
            PollState { phase, snapshot }
        }
        PollEvent::Refreshed(snapshot) => {
            let phase = if has_active_jobs(&snapshot) {
                PollPhase::Active
            } else {
                state.phase
            };
            PollState { phase, snapshot }
        }
    };

    let decision = next.render();
    (next, decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_status::JobState;

    fn queued() -> Vec<JobStatus> {
        vec![JobStatus::new("report.pdf", JobState::Queued)]
    }

    fn done() -> Vec<JobStatus> {
        vec![JobStatus::new("report.pdf", JobState::Done)]
    }

    fn step(state: &PollState, event: PollEvent) -> PollState {
        transition(state, true, event).0
    }

    // -----------------------------------------------------------------------
    // Enqueue
    // -----------------------------------------------------------------------

    #[test]
    fn enqueue_from_idle_becomes_active() {
        let state = step(&PollState::default(), PollEvent::Enqueued);
        assert_eq!(state.phase, PollPhase::Active);
        assert_eq!(state.phase.grace_remaining(), 12);
    }

    #[test]
    fn enqueue_resets_grace() {
        let state = PollState {
            phase: PollPhase::Grace(3),
            snapshot: done(),
        };
        let state = step(&state, PollEvent::Enqueued);
        assert_eq!(state.phase, PollPhase::Active);
        assert_eq!(state.snapshot, done(), "enqueue keeps the last snapshot");
    }

    // -----------------------------------------------------------------------
    // Full grace countdown
    // -----------------------------------------------------------------------

    #[test]
    fn full_countdown_scenario() {
        let mut state = step(&PollState::default(), PollEvent::Enqueued);

        state = step(&state, PollEvent::Snapshot(queued()));
        assert_eq!(state.phase, PollPhase::Active);
        assert_eq!(state.phase.grace_remaining(), 12);

        state = step(&state, PollEvent::Snapshot(Vec::new()));
        assert_eq!(state.phase, PollPhase::Grace(11));

        for expected in (1..11).rev() {
            state = step(&state, PollEvent::Snapshot(Vec::new()));
            assert_eq!(state.phase, PollPhase::Grace(expected));
        }

        // The 11th empty tick after Grace(11) ends polling.
        state = step(&state, PollEvent::Snapshot(Vec::new()));
        assert_eq!(state.phase, PollPhase::Idle);
        assert_eq!(state.phase.grace_remaining(), 0);
        assert!(!state.phase.is_polling());
    }

    #[test]
    fn active_job_during_grace_resets_to_active() {
        let state = PollState {
            phase: PollPhase::Grace(2),
            snapshot: Vec::new(),
        };
        let state = step(&state, PollEvent::Snapshot(queued()));
        assert_eq!(state.phase, PollPhase::Active);
    }

    // -----------------------------------------------------------------------
    // Failures
    // -----------------------------------------------------------------------

    #[test]
    fn fetch_failure_forces_idle_from_any_phase() {
        for phase in [PollPhase::Idle, PollPhase::Active, PollPhase::Grace(7)] {
            let state = PollState {
                phase,
                snapshot: queued(),
            };
            let (next, decision) = transition(&state, true, PollEvent::FetchFailed);
            assert_eq!(next.phase, PollPhase::Idle);
            assert_eq!(next.phase.grace_remaining(), 0);
            assert!(next.snapshot.is_empty());
            assert!(!decision.visible);
            assert!(!decision.keep_polling);
        }
    }

    // -----------------------------------------------------------------------
    // Privilege
    // -----------------------------------------------------------------------

    #[test]
    fn non_admin_never_leaves_idle() {
        let mut state = PollState::default();
        for event in [
            PollEvent::Enqueued,
            PollEvent::Snapshot(queued()),
            PollEvent::ConversationSwitched,
            PollEvent::Enqueued,
        ] {
            let (next, decision) = transition(&state, false, event);
            assert_eq!(next.phase, PollPhase::Idle);
            assert!(!decision.keep_polling);
            assert!(!decision.visible);
            state = next;
        }
    }

    // -----------------------------------------------------------------------
    // Visibility
    // -----------------------------------------------------------------------

    #[test]
    fn finished_batch_stays_visible_after_polling_stops() {
        let state = PollState {
            phase: PollPhase::Grace(1),
            snapshot: done(),
        };
        let (next, decision) = transition(&state, true, PollEvent::Snapshot(done()));
        assert_eq!(next.phase, PollPhase::Idle);
        assert!(decision.visible);
        assert!(!decision.keep_polling);
        assert_eq!(decision.jobs, done());
    }

    #[test]
    fn idle_snapshot_without_active_jobs_stays_idle() {
        let (next, decision) = transition(&PollState::default(), true, PollEvent::Snapshot(done()));
        assert_eq!(next.phase, PollPhase::Idle);
        assert!(decision.visible);
    }

    #[test]
    fn idle_snapshot_with_active_jobs_starts_polling() {
        let (next, _) = transition(&PollState::default(), true, PollEvent::Snapshot(queued()));
        assert_eq!(next.phase, PollPhase::Active);
    }

    #[test]
    fn conversation_switch_clears_snapshot_and_polls() {
        let state = PollState {
            phase: PollPhase::Idle,
            snapshot: done(),
        };
        let (next, decision) = transition(&state, true, PollEvent::ConversationSwitched);
        assert_eq!(next.phase, PollPhase::Active);
        assert!(next.snapshot.is_empty());
        assert!(!decision.visible);
        assert!(decision.keep_polling);
    }

    #[test]
    fn refresh_after_enqueue_keeps_full_grace() {
        let state = step(&PollState::default(), PollEvent::Enqueued);
        let (next, decision) = transition(&state, true, PollEvent::Refreshed(Vec::new()));
        assert_eq!(next.phase, PollPhase::Active);
        assert_eq!(decision.grace_remaining, 12);
        assert!(decision.keep_polling);
    }

    #[test]
    fn refresh_keeps_grace_phase_and_records_snapshot() {
        let state = PollState {
            phase: PollPhase::Grace(5),
            snapshot: Vec::new(),
        };
        let next = step(&state, PollEvent::Refreshed(done()));
        assert_eq!(next.phase, PollPhase::Grace(5));
        assert_eq!(next.snapshot, done());

        let next = step(&next, PollEvent::Refreshed(queued()));
        assert_eq!(next.phase, PollPhase::Active);
    }

    #[test]
    fn refresh_while_idle_does_not_start_polling_without_active_jobs() {
        let next = step(&PollState::default(), PollEvent::Refreshed(done()));
        assert_eq!(next.phase, PollPhase::Idle);
    }

    #[test]
    fn phase_serializes_with_grace_content() {
        let value = serde_json::to_value(PollPhase::Grace(4)).unwrap();
        assert_eq!(value["phase"], "grace");
        assert_eq!(value["grace"], 4);
    }
}
