//! The playback coordinator ties the reconciler, scrub state, long-press
//! seeking and the supplement drawer to a single [`PlayerProxy`].

use crate::long_press::{
    DEFAULT_LONG_PRESS_THRESHOLD, DEFAULT_SPEED_LADDER, LongPressAction, LongPressSeek, SeekDirection,
};
use crate::playback::{DEFAULT_COMMAND_TIMEOUT, PlaybackReconciler, PlaybackRequestStatus, TransportStatus};
use crate::progress::{DEFAULT_PROGRESS_INTERVAL, ProgressReport, ProgressState, ProgressTracker};
use crate::scrub::{SLOW_SCRUB_DAMPING, ScrubState};
use crate::supplement::SupplementDrawer;
use fennec_contracts::error::ProxyError;
use fennec_contracts::player::PlayerProxy;
use fennec_model::{BaseItem, ChapterInfo, ElementId};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Weak;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub const DEFAULT_JUMP_FORWARD: Duration = Duration::from_secs(30);
pub const DEFAULT_JUMP_BACKWARD: Duration = Duration::from_secs(15);
pub const DEFAULT_SCRUB_TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorOptions {
    pub jump_forward: Duration,
    pub jump_backward: Duration,
    pub long_press_threshold: Duration,
    pub speed_ladder: Vec<f64>,
    /// Period of the repeating timer that advances long-press scrubbing.
    pub scrub_tick: Duration,
    pub command_timeout: Duration,
    pub slow_scrub_damping: f64,
    /// Period of progress reports to the server while playing.
    pub progress_interval: Duration,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            jump_forward: DEFAULT_JUMP_FORWARD,
            jump_backward: DEFAULT_JUMP_BACKWARD,
            long_press_threshold: DEFAULT_LONG_PRESS_THRESHOLD,
            speed_ladder: DEFAULT_SPEED_LADDER.to_vec(),
            scrub_tick: DEFAULT_SCRUB_TICK,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            slow_scrub_damping: SLOW_SCRUB_DAMPING,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Point-in-time view for rendering the transport bar.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub item_id: Option<ElementId>,
    pub requested: PlaybackRequestStatus,
    pub observed: Option<TransportStatus>,
    pub true_position: Duration,
    pub scrubbed_position: Duration,
    pub runtime: Option<Duration>,
    pub is_scrubbing: bool,
    /// Signed long-press multiplier while scrubbing from the remote.
    pub scrub_velocity: Option<f64>,
    pub drawer_presented: bool,
    pub drawer_offset: f64,
    /// Chapter containing the scrubbed position.
    pub current_chapter: Option<usize>,
}

pub struct PlaybackCoordinator<P: PlayerProxy> {
    proxy: P,
    options: CoordinatorOptions,
    reconciler: PlaybackReconciler,
    scrub: ScrubState,
    long_press: LongPressSeek,
    drawer: SupplementDrawer,
    item_id: Option<ElementId>,
    slow_scrub: bool,
    /// Sorted by start.
    chapters: Vec<ChapterInfo>,
    audio_track: Option<i32>,
    subtitle_track: Option<i32>,
    progress: ProgressTracker,
    progress_sink: Option<mpsc::UnboundedSender<ProgressReport>>,
}

impl<P: PlayerProxy> fmt::Debug for PlaybackCoordinator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackCoordinator")
            .field("item_id", &self.item_id)
            .field("reconciler", &self.reconciler)
            .field("scrub", &self.scrub)
            .field("long_press", &self.long_press.state())
            .field("drawer_presented", &self.drawer.is_presented())
            .field("slow_scrub", &self.slow_scrub)
            .field("chapters", &self.chapters.len())
            .field("progress", &self.progress)
            .finish_non_exhaustive()
    }
}

impl<P: PlayerProxy> PlaybackCoordinator<P> {
    pub fn new(proxy: P, options: CoordinatorOptions) -> Self {
        Self {
            proxy,
            reconciler: PlaybackReconciler::new(options.command_timeout),
            scrub: ScrubState::default(),
            long_press: LongPressSeek::new(options.long_press_threshold, options.speed_ladder.clone()),
            drawer: SupplementDrawer::new(Default::default()),
            item_id: None,
            slow_scrub: false,
            chapters: Vec::new(),
            audio_track: None,
            subtitle_track: None,
            progress: ProgressTracker::new(options.progress_interval),
            progress_sink: None,
            options,
        }
    }

    /// Forward start/progress/stop reports to `sink`, usually the channel
    /// drained by [`crate::progress::spawn_progress_reporter`].
    pub fn with_progress_sink(mut self, sink: mpsc::UnboundedSender<ProgressReport>) -> Self {
        self.progress_sink = Some(sink);
        self
    }

    pub fn set_progress_sink(&mut self, sink: Option<mpsc::UnboundedSender<ProgressReport>>) {
        self.progress_sink = sink;
    }

    pub fn options(&self) -> &CoordinatorOptions {
        &self.options
    }

    pub fn proxy(&self) -> &P {
        &self.proxy
    }

    /// Reset for a newly loaded item, resuming from its saved position.
    pub fn load_item(&mut self, item: &BaseItem) {
        self.load_item_in_session(item, None);
    }

    /// Like [`Self::load_item`], tagging progress reports with the server's
    /// play session.
    pub fn load_item_in_session(&mut self, item: &BaseItem, play_session_id: Option<String>) {
        let previous = self.progress_state();
        let stopped = self.progress.load(item.id.clone(), play_session_id, &previous);
        self.emit(stopped);

        self.long_press.cancel();
        self.scrub = ScrubState::new(item.run_time_ticks.map(|ticks| ticks.to_duration()));
        if let Some(user_data) = &item.user_data {
            self.scrub.report_position(user_data.playback_position_ticks.to_duration());
        }
        self.reconciler = PlaybackReconciler::new(self.options.command_timeout);
        self.item_id = item.id.clone();
        self.chapters = item.chapters.clone();
        self.chapters.sort_by_key(|chapter| chapter.start_position_ticks);
        self.audio_track = None;
        self.subtitle_track = None;
        info!(
            "loaded {:?} at {:?} of {:?}",
            item.display_title(),
            self.scrub.true_position(),
            self.scrub.runtime()
        );
    }

    pub fn set_runtime(&mut self, runtime: Option<Duration>) {
        self.scrub.set_runtime(runtime);
    }

    pub fn request_playback(&mut self, status: PlaybackRequestStatus, now: Instant) -> Result<(), ProxyError> {
        self.request(status, now).map(|_| ())
    }

    /// Returns whether a command went out and a progress report with it.
    fn request(&mut self, status: PlaybackRequestStatus, now: Instant) -> Result<bool, ProxyError> {
        if !self.reconciler.request(status, now) {
            return Ok(false);
        }
        let result = match status {
            PlaybackRequestStatus::Playing => self.proxy.play(),
            PlaybackRequestStatus::Paused => self.proxy.pause(),
        };
        if let Err(err) = result {
            warn!("player refused {status:?}: {err}");
            self.reconciler.command_failed();
            return Err(err);
        }
        self.report_progress(now);
        Ok(true)
    }

    pub fn toggle_playback(&mut self, now: Instant) -> Result<(), ProxyError> {
        self.request_playback(self.reconciler.requested().toggled(), now)
    }

    /// A player-initiated change (end of stream, external pause) moves the
    /// requested status and is reported like a user request.
    pub fn on_transport_status(&mut self, status: TransportStatus, now: Instant) {
        let before = self.reconciler.requested();
        self.reconciler.observe(status, now);
        if self.reconciler.requested() != before {
            self.report_progress(now);
        }
    }

    pub fn on_position(&mut self, position: Duration) {
        self.scrub.report_position(position);
    }

    pub fn begin_scrub(&mut self) {
        self.scrub.begin();
    }

    pub fn scrub_to(&mut self, position: Duration) -> bool {
        self.scrub.set_scrubbed(position)
    }

    /// Fine scrubbing scales pan translations down.
    pub fn set_slow_scrub(&mut self, slow: bool) {
        self.slow_scrub = slow;
    }

    pub fn begin_pan_scrub(&mut self) {
        self.scrub.begin_translation();
    }

    pub fn pan_scrub(&mut self, translation: f64, total_size: f64) -> bool {
        let damping = if self.slow_scrub {
            self.options.slow_scrub_damping
        } else {
            1.0
        };
        self.scrub.scrub_by_translation(translation, total_size, damping)
    }

    /// Seek to the scrubbed position and leave scrub mode. A refused seek
    /// keeps the position the player last reported.
    pub fn commit_scrub(&mut self) -> Result<(), ProxyError> {
        self.long_press.cancel();
        let previous = self.scrub.true_position();
        let Some(target) = self.scrub.commit() else {
            return Ok(());
        };
        debug!("committing scrub to {target:?}");
        if let Err(err) = self.proxy.seek(target) {
            warn!("seek to {target:?} failed: {err}");
            self.scrub.report_position(previous);
            return Err(err);
        }
        self.report_progress(Instant::now());
        Ok(())
    }

    /// Leave scrub mode without seeking.
    pub fn cancel_scrub(&mut self) {
        self.long_press.cancel();
        self.scrub.cancel();
    }

    pub fn press(&mut self, direction: SeekDirection, now: Instant) -> Result<(), ProxyError> {
        let action = self.long_press.press(direction, now);
        self.apply(action)
    }

    pub fn release(&mut self, now: Instant) -> Result<(), ProxyError> {
        let action = self.long_press.release(now);
        self.apply(action)
    }

    /// Timer-driven housekeeping: promotes held presses into scrub mode and
    /// expires unconfirmed play/pause commands.
    pub fn poll(&mut self, now: Instant) -> Result<(), ProxyError> {
        let before = self.reconciler.requested();
        self.reconciler.poll(now);
        if self.reconciler.requested() != before {
            self.report_progress(now);
        } else {
            let state = self.progress_state();
            let report = self.progress.poll(&state, now);
            self.emit(report);
        }
        let action = self.long_press.poll(now);
        self.apply(action)
    }

    /// Advance long-press scrubbing by `elapsed` at the current speed.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        match self.long_press.tick(elapsed) {
            Some(seconds) => self.scrub.scrub_by(seconds),
            None => false,
        }
    }

    /// Remote select. Commits an active scrub.
    pub fn select(&mut self) -> Result<(), ProxyError> {
        if self.long_press.is_scrubbing() {
            let action = self.long_press.confirm();
            return self.apply(action);
        }
        if self.scrub.is_scrubbing() {
            return self.commit_scrub();
        }
        Ok(())
    }

    /// Commits an active scrub, otherwise toggles playback.
    pub fn play_pause_pressed(&mut self, now: Instant) -> Result<(), ProxyError> {
        if self.scrub.is_scrubbing() || self.long_press.is_scrubbing() {
            return self.commit_scrub();
        }
        self.toggle_playback(now)
    }

    /// Back out of the innermost transient mode. Returns false when there
    /// was nothing to dismiss.
    pub fn menu_pressed(&mut self) -> bool {
        if self.scrub.is_scrubbing() || self.long_press.is_scrubbing() {
            self.cancel_scrub();
            return true;
        }
        if self.drawer.is_presented() {
            self.drawer.set_presented(false);
            return true;
        }
        false
    }

    /// Fixed increment jump. Moves the scrub target instead while scrubbing.
    pub fn jump(&mut self, direction: SeekDirection) -> Result<(), ProxyError> {
        let seconds = match direction {
            SeekDirection::Forward => self.options.jump_forward.as_secs_f64(),
            SeekDirection::Backward => -self.options.jump_backward.as_secs_f64(),
        };
        if self.scrub.is_scrubbing() {
            self.scrub.scrub_by(seconds);
            return Ok(());
        }
        let target = self.scrub.jump_target(seconds);
        self.proxy.seek(target)?;
        self.scrub.report_position(target);
        self.report_progress(Instant::now());
        Ok(())
    }

    pub fn chapters(&self) -> &[ChapterInfo] {
        &self.chapters
    }

    /// Index of the chapter playing at `position`: the last one starting at
    /// or before it.
    pub fn chapter_at(&self, position: Duration) -> Option<usize> {
        self.chapters
            .partition_point(|chapter| chapter.start_position_ticks.to_duration() <= position)
            .checked_sub(1)
    }

    /// Follows the scrub target while scrubbing.
    pub fn current_chapter(&self) -> Option<usize> {
        self.chapter_at(self.scrub.scrubbed_position())
    }

    /// Seek to the start of chapter `index` and resume playback. Returns
    /// false for an unknown chapter.
    pub fn seek_to_chapter(&mut self, index: usize, now: Instant) -> Result<bool, ProxyError> {
        let Some(chapter) = self.chapters.get(index) else {
            return Ok(false);
        };
        let target = self.scrub.clamped(chapter.start_position_ticks.to_duration());
        debug!("seeking to chapter {index} ({:?}) at {target:?}", chapter.name);

        self.cancel_scrub();
        self.proxy
            .seek(target)
            .inspect_err(|err| warn!("seek to chapter {index} failed: {err}"))?;
        self.scrub.report_position(target);
        if !self.request(PlaybackRequestStatus::Playing, now)? {
            self.report_progress(now);
        }
        Ok(true)
    }

    /// Returns false on the last chapter.
    pub fn next_chapter(&mut self, now: Instant) -> Result<bool, ProxyError> {
        let next = self.chapter_at(self.scrub.true_position()).map_or(0, |index| index + 1);
        self.seek_to_chapter(next, now)
    }

    /// Returns false before the second chapter.
    pub fn previous_chapter(&mut self, now: Instant) -> Result<bool, ProxyError> {
        match self.chapter_at(self.scrub.true_position()).and_then(|index| index.checked_sub(1)) {
            Some(previous) => self.seek_to_chapter(previous, now),
            None => Ok(false),
        }
    }

    /// Playback ended or the player is going away.
    pub fn stop(&mut self) {
        self.long_press.cancel();
        self.scrub.cancel();
        let state = self.progress_state();
        let stopped = self.progress.stop(&state);
        self.emit(stopped);
    }

    pub fn set_rate(&self, rate: f32) -> Result<(), ProxyError> {
        self.proxy
            .set_rate(rate)
            .inspect_err(|err| warn!("failed to set rate {rate}: {err}"))
    }

    pub fn set_audio_track(&mut self, index: i32) -> Result<(), ProxyError> {
        self.proxy
            .set_audio_track(index)
            .inspect_err(|err| warn!("failed to select audio track {index}: {err}"))?;
        self.audio_track = Some(index);
        Ok(())
    }

    pub fn set_subtitle_track(&mut self, index: Option<i32>) -> Result<(), ProxyError> {
        self.proxy
            .set_subtitle_track(index)
            .inspect_err(|err| warn!("failed to select subtitle track {index:?}: {err}"))?;
        self.subtitle_track = index;
        Ok(())
    }

    pub fn drawer(&self) -> &SupplementDrawer {
        &self.drawer
    }

    pub fn drawer_mut(&mut self) -> &mut SupplementDrawer {
        &mut self.drawer
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            item_id: self.item_id.clone(),
            requested: self.reconciler.requested(),
            observed: self.reconciler.observed(),
            true_position: self.scrub.true_position(),
            scrubbed_position: self.scrub.scrubbed_position(),
            runtime: self.scrub.runtime(),
            is_scrubbing: self.scrub.is_scrubbing(),
            scrub_velocity: self.long_press.velocity(),
            drawer_presented: self.drawer.is_presented(),
            drawer_offset: self.drawer.offset(),
            current_chapter: self.current_chapter(),
        }
    }

    fn progress_state(&self) -> ProgressState {
        ProgressState {
            status: self.reconciler.requested(),
            position: self.scrub.true_position(),
            audio_stream_index: self.audio_track,
            subtitle_stream_index: self.subtitle_track,
        }
    }

    fn report_progress(&mut self, now: Instant) {
        let state = self.progress_state();
        let report = self.progress.changed(&state, now);
        self.emit(report);
    }

    fn emit(&self, report: Option<ProgressReport>) {
        let (Some(report), Some(sink)) = (report, &self.progress_sink) else {
            return;
        };
        if sink.send(report).is_err() {
            debug!("progress report dropped: reporter gone");
        }
    }

    fn apply(&mut self, action: LongPressAction) -> Result<(), ProxyError> {
        match action {
            LongPressAction::None => Ok(()),
            LongPressAction::Jump(direction) => self.jump(direction),
            LongPressAction::BeginScrub { direction, speed } => {
                debug!("long press scrubbing {direction:?} at {speed}x");
                self.scrub.begin();
                Ok(())
            }
            LongPressAction::SpeedChanged { speed } => {
                debug!("scrub speed {speed}x");
                Ok(())
            }
            LongPressAction::Commit => self.commit_scrub(),
        }
    }
}

/// Drive [`PlaybackCoordinator::poll`] and [`PlaybackCoordinator::tick`]
/// every `period`. Stops once the coordinator is dropped.
pub fn spawn_scrub_timer<P>(coordinator: Weak<Mutex<PlaybackCoordinator<P>>>, period: Duration) -> JoinHandle<()>
where
    P: PlayerProxy + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();

        loop {
            interval.tick().await;
            let Some(coordinator) = coordinator.upgrade() else {
                debug!("scrub timer stopping: coordinator dropped");
                break;
            };

            let now = Instant::now();
            let elapsed = now.saturating_duration_since(last);
            last = now;

            let mut guard = coordinator.lock();
            guard.tick(elapsed);
            if let Err(err) = guard.poll(now) {
                warn!("scrub timer command failed: {err}");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingProxy {
        seeks: AtomicUsize,
    }

    impl PlayerProxy for CountingProxy {
        fn play(&self) -> Result<(), ProxyError> {
            Ok(())
        }

        fn pause(&self) -> Result<(), ProxyError> {
            Ok(())
        }

        fn seek(&self, _to: Duration) -> Result<(), ProxyError> {
            self.seeks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn set_rate(&self, _rate: f32) -> Result<(), ProxyError> {
            Ok(())
        }

        fn set_audio_track(&self, _index: i32) -> Result<(), ProxyError> {
            Ok(())
        }

        fn set_subtitle_track(&self, _index: Option<i32>) -> Result<(), ProxyError> {
            Ok(())
        }
    }

    fn coordinator() -> PlaybackCoordinator<CountingProxy> {
        let mut coordinator = PlaybackCoordinator::new(CountingProxy::default(), CoordinatorOptions::default());
        coordinator.set_runtime(Some(Duration::from_secs(600)));
        coordinator
    }

    #[test]
    fn menu_cancels_scrub_before_dismissing_drawer() {
        let mut coordinator = coordinator();
        coordinator.drawer_mut().set_presented(true);
        coordinator.begin_scrub();
        coordinator.scrub_to(Duration::from_secs(90));

        assert!(coordinator.menu_pressed());
        assert!(!coordinator.snapshot().is_scrubbing);
        assert!(coordinator.drawer().is_presented());

        assert!(coordinator.menu_pressed());
        assert!(!coordinator.drawer().is_presented());
        assert!(!coordinator.menu_pressed());
        assert_eq!(coordinator.proxy().seeks.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn slow_pan_scrub_is_damped() {
        let mut coordinator = coordinator();
        coordinator.set_slow_scrub(true);
        coordinator.begin_pan_scrub();
        assert!(coordinator.pan_scrub(500.0, 1_000.0));
        // Half the track at 0.1 damping over 600s.
        assert_eq!(coordinator.snapshot().scrubbed_position, Duration::from_secs(30));
    }

    #[test]
    fn jump_while_scrubbing_moves_only_the_target() {
        let mut coordinator = coordinator();
        coordinator.on_position(Duration::from_secs(100));
        coordinator.begin_scrub();
        coordinator.jump(SeekDirection::Backward).unwrap();

        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.scrubbed_position, Duration::from_secs(85));
        assert_eq!(snapshot.true_position, Duration::from_secs(100));
        assert_eq!(coordinator.proxy().seeks.load(Ordering::SeqCst), 0);
    }
}
