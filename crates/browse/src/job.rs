//! Enumeration job state and the messages a worker delivers.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::cancel::CancellationToken;
use crate::error::BrowseError;
use crate::types::Listing;

/// Lifecycle of one job.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[repr(u8)]
pub enum JobState {
    Created = 0,
    Running = 1,
    Completed = 2,
    Cancelled = 3,
    Failed = 4,
}

impl JobState {
    /// Loads the state from an atomic.
    pub fn load(atomic: &AtomicU8) -> Self {
        Self::from_u8(atomic.load(Ordering::Acquire))
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Running,
            2 => Self::Completed,
            3 => Self::Cancelled,
            4 => Self::Failed,
            _ => Self::Created,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// Terminal result of a job.
#[derive(Debug)]
pub enum JobOutcome {
    Completed(Listing),
    /// The job failed; `partial` holds whatever was deemed usable.
    Failed { error: BrowseError, partial: Listing },
    Cancelled,
}

impl JobOutcome {
    pub fn state(&self) -> JobState {
        match self {
            Self::Completed(_) => JobState::Completed,
            Self::Failed { .. } => JobState::Failed,
            Self::Cancelled => JobState::Cancelled,
        }
    }
}

/// The single message a worker sends when its job ends.
#[derive(Debug)]
pub struct JobMessage {
    pub version: u64,
    pub path: String,
    pub outcome: JobOutcome,
}

/// Receiving side of a job's delivery channel.
pub type JobReceiver = oneshot::Receiver<JobMessage>;

/// Caller-side handle to a submitted job.
#[derive(Debug, Clone)]
pub struct JobHandle {
    version: u64,
    path: Arc<str>,
    token: CancellationToken,
    state: Arc<AtomicU8>,
}

impl JobHandle {
    pub(crate) fn new(version: u64, path: &str) -> Self {
        Self {
            version,
            path: Arc::from(path),
            token: CancellationToken::new(),
            state: Arc::new(AtomicU8::new(JobState::Created as u8)),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn state(&self) -> JobState {
        JobState::load(&self.state)
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Requests cancellation.
    ///
    /// Once this returns `true` the worker reports [`JobOutcome::Cancelled`]
    /// whatever it computed. Returns `false` if the job already finished or
    /// was already cancelled.
    pub fn cancel(&self) -> bool {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if JobState::from_u8(current).is_terminal() {
                return false;
            }
            match self.state.compare_exchange(
                current,
                JobState::Cancelled as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
        self.token.cancel();
        log::debug!(
            "enumeration cancel requested version={} path={:?}",
            self.version,
            self.path
        );
        true
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Moves a created job to running. Returns `false` if it was cancelled
    /// before the worker got to it.
    pub(crate) fn start(&self) -> bool {
        self.transition(JobState::Created, JobState::Running)
    }

    /// Settles the job's terminal state.
    ///
    /// A cancel that won the race turns `outcome` into
    /// [`JobOutcome::Cancelled`].
    pub(crate) fn finish(&self, outcome: JobOutcome) -> JobOutcome {
        if self.transition(JobState::Running, outcome.state()) {
            outcome
        } else {
            JobOutcome::Cancelled
        }
    }

    fn transition(&self, from: JobState, to: JobState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
