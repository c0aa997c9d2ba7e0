//! Telling the server how far playback got.
//!
//! [`ProgressTracker`] decides what to report and when; the coordinator feeds
//! it play/pause transitions and committed seeks and forwards the reports to
//! a channel. [`spawn_progress_reporter`] drains that channel into
//! `/Sessions/Playing*` calls.

use crate::playback::PlaybackRequestStatus;
use fennec_contracts::session::{ApiRequest, AuthenticatedSession};
use fennec_model::{ElementId, Ticks};
use log::{debug, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Period of progress reports while nothing else happens.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressKind {
    Start,
    Progress,
    Stopped,
}

impl ProgressKind {
    pub fn path(self) -> &'static str {
        match self {
            ProgressKind::Start => "/Sessions/Playing",
            ProgressKind::Progress => "/Sessions/Playing/Progress",
            ProgressKind::Stopped => "/Sessions/Playing/Stopped",
        }
    }
}

/// Playback state the tracker reports from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressState {
    pub status: PlaybackRequestStatus,
    pub position: Duration,
    pub audio_stream_index: Option<i32>,
    pub subtitle_stream_index: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub kind: ProgressKind,
    pub item_id: ElementId,
    pub play_session_id: Option<String>,
    pub position: Duration,
    pub is_paused: bool,
    pub audio_stream_index: Option<i32>,
    pub subtitle_stream_index: Option<i32>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PlaybackInfoBody<'a> {
    item_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    play_session_id: Option<&'a str>,
    position_ticks: Ticks,
    is_paused: bool,
    can_seek: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_stream_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subtitle_stream_index: Option<i32>,
}

impl ProgressReport {
    pub fn to_request(&self) -> ApiRequest {
        let body = PlaybackInfoBody {
            item_id: self.item_id.as_str(),
            play_session_id: self.play_session_id.as_deref(),
            position_ticks: Ticks::from_duration(self.position),
            is_paused: self.is_paused,
            can_seek: true,
            audio_stream_index: self.audio_stream_index,
            subtitle_stream_index: self.subtitle_stream_index,
        };
        let request = ApiRequest::post(self.kind.path());
        match serde_json::to_value(&body) {
            Ok(body) => request.json(body),
            Err(err) => {
                warn!("failed to encode playback report: {err}");
                request
            }
        }
    }
}

/// Start/progress/stop bookkeeping for the item being played.
///
/// Nothing is reported for an item until it has been asked to play. After
/// that every play/pause transition and committed seek reports at once, and
/// the periodic report restarts its interval.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    interval: Duration,
    item_id: Option<ElementId>,
    play_session_id: Option<String>,
    has_sent_start: bool,
    next_due: Option<Instant>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_INTERVAL)
    }
}

impl ProgressTracker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            item_id: None,
            play_session_id: None,
            has_sent_start: false,
            next_due: None,
        }
    }

    pub fn item_id(&self) -> Option<&ElementId> {
        self.item_id.as_ref()
    }

    pub fn has_started(&self) -> bool {
        self.has_sent_start
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Switch to another item. Stops the previous one if it had started.
    pub fn load(
        &mut self,
        item_id: Option<ElementId>,
        play_session_id: Option<String>,
        previous: &ProgressState,
    ) -> Option<ProgressReport> {
        let stopped = if self.item_id != item_id {
            self.stop(previous)
        } else {
            None
        };
        self.item_id = item_id;
        self.play_session_id = play_session_id;
        stopped
    }

    /// The requested status changed or the position jumped.
    pub fn changed(&mut self, state: &ProgressState, now: Instant) -> Option<ProgressReport> {
        self.report(state, now)
    }

    /// Periodic report, once the interval since the last one has passed.
    pub fn poll(&mut self, state: &ProgressState, now: Instant) -> Option<ProgressReport> {
        match self.next_due {
            Some(due) if now >= due => self.report(state, now),
            _ => None,
        }
    }

    pub fn stop(&mut self, state: &ProgressState) -> Option<ProgressReport> {
        self.next_due = None;
        if !std::mem::take(&mut self.has_sent_start) {
            return None;
        }
        let item_id = self.item_id.clone()?;
        Some(self.build(ProgressKind::Stopped, item_id, state))
    }

    fn report(&mut self, state: &ProgressState, now: Instant) -> Option<ProgressReport> {
        let item_id = self.item_id.clone()?;
        let kind = match (state.status, self.has_sent_start) {
            (PlaybackRequestStatus::Playing, false) => ProgressKind::Start,
            (_, true) => ProgressKind::Progress,
            (PlaybackRequestStatus::Paused, false) => return None,
        };
        self.has_sent_start = true;
        self.next_due = Some(now + self.interval);
        Some(self.build(kind, item_id, state))
    }

    fn build(&self, kind: ProgressKind, item_id: ElementId, state: &ProgressState) -> ProgressReport {
        ProgressReport {
            kind,
            item_id,
            play_session_id: self.play_session_id.clone(),
            position: state.position,
            is_paused: state.status == PlaybackRequestStatus::Paused,
            audio_stream_index: state.audio_stream_index,
            subtitle_stream_index: state.subtitle_stream_index,
        }
    }
}

/// Send every report from `reports` to the server, in order. Failures are
/// logged and dropped. Ends when every sender is gone.
pub fn spawn_progress_reporter(
    session: Arc<dyn AuthenticatedSession>,
    mut reports: mpsc::UnboundedReceiver<ProgressReport>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(report) = reports.recv().await {
            match session.send(report.to_request()).await {
                Ok(response) if (200..300).contains(&response.status) => {
                    debug!("reported {:?} for {} at {:?}", report.kind, report.item_id, report.position);
                }
                Ok(response) => {
                    warn!("{:?} report for {} answered {}", report.kind, report.item_id, response.status);
                }
                Err(err) => warn!("{:?} report for {} failed: {err}", report.kind, report.item_id),
            }
        }
        debug!("progress reporter stopping: coordinator gone");
    })
}
