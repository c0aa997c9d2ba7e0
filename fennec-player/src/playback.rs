use log::{debug, warn};
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(1);

/// What the user wants the player to be doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackRequestStatus {
    Playing,
    #[default]
    Paused,
}

impl PlaybackRequestStatus {
    pub fn toggled(self) -> Self {
        match self {
            PlaybackRequestStatus::Playing => PlaybackRequestStatus::Paused,
            PlaybackRequestStatus::Paused => PlaybackRequestStatus::Playing,
        }
    }
}

/// What the player says it is actually doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStatus {
    Playing,
    Paused,
    Buffering,
    Stopped,
}

impl TransportStatus {
    /// The request this transport state satisfies. Buffering satisfies
    /// neither.
    fn as_request(self) -> Option<PlaybackRequestStatus> {
        match self {
            TransportStatus::Playing => Some(PlaybackRequestStatus::Playing),
            TransportStatus::Paused | TransportStatus::Stopped => Some(PlaybackRequestStatus::Paused),
            TransportStatus::Buffering => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingCommand {
    target: PlaybackRequestStatus,
    previous: PlaybackRequestStatus,
    issued_at: Instant,
}

/// Keeps the requested status stable while a play/pause command is in
/// flight.
///
/// The requested status flips the moment the user asks. Player reports are
/// always recorded, but only replace the request once the command has
/// round-tripped, the command timed out, or no command was pending at all
/// (e.g. playback reached the end on its own).
#[derive(Debug, Clone)]
pub struct PlaybackReconciler {
    requested: PlaybackRequestStatus,
    observed: Option<TransportStatus>,
    pending: Option<PendingCommand>,
    command_timeout: Duration,
}

impl Default for PlaybackReconciler {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TIMEOUT)
    }
}

impl PlaybackReconciler {
    pub fn new(command_timeout: Duration) -> Self {
        Self {
            requested: PlaybackRequestStatus::default(),
            observed: None,
            pending: None,
            command_timeout,
        }
    }

    pub fn requested(&self) -> PlaybackRequestStatus {
        self.requested
    }

    pub fn observed(&self) -> Option<TransportStatus> {
        self.observed
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record a user request. Returns whether a player command needs to be
    /// issued, i.e. whether the request changed.
    pub fn request(&mut self, status: PlaybackRequestStatus, now: Instant) -> bool {
        if status == self.requested {
            return false;
        }
        self.pending = Some(PendingCommand {
            target: status,
            previous: self.requested,
            issued_at: now,
        });
        self.requested = status;
        true
    }

    /// The player refused the last command; fall back to what was
    /// requested before it.
    pub fn command_failed(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.requested = self
                .observed
                .and_then(TransportStatus::as_request)
                .unwrap_or(pending.previous);
        }
    }

    /// Record a transport report from the player.
    pub fn observe(&mut self, status: TransportStatus, now: Instant) {
        self.observed = Some(status);
        let Some(observed) = status.as_request() else {
            return;
        };

        match self.pending {
            Some(pending) if pending.target == observed => {
                debug!("playback command round-tripped: {observed:?}");
                self.pending = None;
            }
            Some(pending) => {
                if now.saturating_duration_since(pending.issued_at) >= self.command_timeout {
                    warn!(
                        "playback command {:?} not confirmed after {:?}; adopting {observed:?}",
                        pending.target, self.command_timeout
                    );
                    self.pending = None;
                    self.requested = observed;
                }
            }
            None => self.requested = observed,
        }
    }

    /// Expire a pending command whose confirmation never came.
    pub fn poll(&mut self, now: Instant) {
        let Some(pending) = self.pending else {
            return;
        };
        if now.saturating_duration_since(pending.issued_at) < self.command_timeout {
            return;
        }
        self.pending = None;
        if let Some(observed) = self.observed.and_then(TransportStatus::as_request) {
            if observed != self.requested {
                warn!("playback command {:?} timed out; adopting {observed:?}", pending.target);
            }
            self.requested = observed;
        }
    }
}
