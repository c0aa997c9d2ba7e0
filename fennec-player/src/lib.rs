//! Playback coordination: what the user asked for versus what the player
//! reports, and the scrub/seek gestures layered on top.
//!
//! Everything here is a synchronous state machine driven from one context.
//! The only tasks are the optional repeating scrub timer
//! ([`coordinator::spawn_scrub_timer`]) and the progress reporter
//! ([`progress::spawn_progress_reporter`]).
#![allow(missing_docs)]

pub mod coordinator;
pub mod long_press;
pub mod playback;
pub mod progress;
pub mod scrub;
pub mod supplement;

pub use coordinator::{CoordinatorOptions, PlaybackCoordinator, PlaybackSnapshot, spawn_scrub_timer};
pub use long_press::{LongPressAction, LongPressSeek, LongPressState, SeekDirection};
pub use playback::{PlaybackReconciler, PlaybackRequestStatus, TransportStatus};
pub use progress::{ProgressKind, ProgressReport, ProgressState, ProgressTracker, spawn_progress_reporter};
pub use scrub::ScrubState;
pub use supplement::{DrawerLayout, DrawerMetrics, DrawerSettle, SupplementDrawer};
