use async_trait::async_trait;
use fennec_contracts::error::{FetchError, ProxyError};
use fennec_contracts::player::PlayerProxy;
use fennec_contracts::session::{ApiRequest, ApiResponse, AuthenticatedSession, Method};
use fennec_model::{BaseItem, ChapterInfo, ElementId, ItemKind, Ticks, UserItemData};
use fennec_player::{
    CoordinatorOptions, PlaybackCoordinator, PlaybackRequestStatus, ProgressKind, ProgressReport, SeekDirection,
    TransportStatus, spawn_progress_reporter, spawn_scrub_timer,
};
use mockall::mock;
use mockall::predicate::eq;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use url::Url;

mock! {
    pub Player {}

    impl PlayerProxy for Player {
        fn play(&self) -> Result<(), ProxyError>;
        fn pause(&self) -> Result<(), ProxyError>;
        fn seek(&self, to: Duration) -> Result<(), ProxyError>;
        fn set_rate(&self, rate: f32) -> Result<(), ProxyError>;
        fn set_audio_track(&self, index: i32) -> Result<(), ProxyError>;
        fn set_subtitle_track(&self, index: Option<i32>) -> Result<(), ProxyError>;
    }
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn movie(position: u64, runtime: u64) -> BaseItem {
    let mut item = BaseItem::new(Some(ElementId::new("movie-1").unwrap()), "Movie", ItemKind::Movie);
    item.run_time_ticks = Some(Ticks::from_duration(secs(runtime)));
    item.user_data = Some(UserItemData {
        playback_position_ticks: Ticks::from_duration(secs(position)),
        ..UserItemData::default()
    });
    item
}

fn chapter(name: &str, start: u64) -> ChapterInfo {
    ChapterInfo {
        name: Some(name.to_string()),
        start_position_ticks: Ticks::from_duration(secs(start)),
    }
}

fn coordinator(player: MockPlayer, position: u64) -> PlaybackCoordinator<MockPlayer> {
    let mut coordinator = PlaybackCoordinator::new(player, CoordinatorOptions::default());
    coordinator.load_item(&movie(position, 600));
    coordinator
}

#[tokio::test(start_paused = true)]
async fn requested_status_holds_until_command_round_trips() {
    let mut player = MockPlayer::new();
    player.expect_play().times(1).returning(|| Ok(()));
    let mut coordinator = coordinator(player, 0);
    let start = Instant::now();

    coordinator.toggle_playback(start).unwrap();
    assert_eq!(coordinator.snapshot().requested, PlaybackRequestStatus::Playing);

    // Stale report from before the command landed.
    coordinator.on_transport_status(TransportStatus::Paused, start + Duration::from_millis(100));
    let snapshot = coordinator.snapshot();
    assert_eq!(snapshot.requested, PlaybackRequestStatus::Playing);
    assert_eq!(snapshot.observed, Some(TransportStatus::Paused));

    coordinator.on_transport_status(TransportStatus::Playing, start + Duration::from_millis(200));
    // Playback ended on its own; nothing pending, so adopt it.
    coordinator.on_transport_status(TransportStatus::Stopped, start + secs(5));
    assert_eq!(coordinator.snapshot().requested, PlaybackRequestStatus::Paused);

    // Already paused: no command.
    coordinator
        .request_playback(PlaybackRequestStatus::Paused, start + secs(6))
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn unconfirmed_command_yields_to_player_after_timeout() {
    let mut player = MockPlayer::new();
    player.expect_play().times(1).returning(|| Ok(()));
    let mut coordinator = coordinator(player, 0);
    let start = Instant::now();

    coordinator.toggle_playback(start).unwrap();
    coordinator.on_transport_status(TransportStatus::Paused, start + Duration::from_millis(500));
    coordinator.poll(start + Duration::from_millis(900)).unwrap();
    assert_eq!(coordinator.snapshot().requested, PlaybackRequestStatus::Playing);

    coordinator.poll(start + Duration::from_millis(1_100)).unwrap();
    assert_eq!(coordinator.snapshot().requested, PlaybackRequestStatus::Paused);
}

#[tokio::test(start_paused = true)]
async fn refused_command_restores_previous_request() {
    let mut player = MockPlayer::new();
    player.expect_play().times(1).returning(|| Err(ProxyError::NotReady));
    let mut coordinator = coordinator(player, 0);

    let result = coordinator.toggle_playback(Instant::now());
    assert_eq!(result, Err(ProxyError::NotReady));
    assert_eq!(coordinator.snapshot().requested, PlaybackRequestStatus::Paused);
}

#[tokio::test(start_paused = true)]
async fn short_press_jumps_by_fixed_increment() {
    let mut player = MockPlayer::new();
    player.expect_seek().with(eq(secs(130))).times(1).returning(|_| Ok(()));
    player.expect_seek().with(eq(secs(115))).times(1).returning(|_| Ok(()));
    let mut coordinator = coordinator(player, 100);
    let start = Instant::now();

    coordinator.press(SeekDirection::Forward, start).unwrap();
    coordinator.release(start + Duration::from_millis(120)).unwrap();
    assert_eq!(coordinator.snapshot().true_position, secs(130));

    coordinator.press(SeekDirection::Backward, start + secs(1)).unwrap();
    coordinator.release(start + secs(1) + Duration::from_millis(50)).unwrap();
    assert_eq!(coordinator.snapshot().true_position, secs(115));
    assert!(!coordinator.snapshot().is_scrubbing);
}

#[tokio::test(start_paused = true)]
async fn jumps_clamp_to_runtime() {
    let mut player = MockPlayer::new();
    player.expect_seek().with(eq(secs(600))).times(1).returning(|_| Ok(()));
    player.expect_seek().with(eq(Duration::ZERO)).times(1).returning(|_| Ok(()));
    let mut coordinator = coordinator(player, 590);

    coordinator.jump(SeekDirection::Forward).unwrap();
    coordinator.on_position(secs(5));
    coordinator.jump(SeekDirection::Backward).unwrap();
}

#[tokio::test(start_paused = true)]
async fn speed_ladder_steps_and_commits_below_floor() {
    let mut player = MockPlayer::new();
    player.expect_seek().with(eq(secs(110))).times(1).returning(|_| Ok(()));
    let mut coordinator = coordinator(player, 100);
    let start = Instant::now();

    coordinator.press(SeekDirection::Forward, start).unwrap();
    coordinator.poll(start + Duration::from_millis(300)).unwrap();
    assert_eq!(coordinator.snapshot().scrub_velocity, Some(2.0));

    coordinator.press(SeekDirection::Forward, start + secs(1)).unwrap();
    assert_eq!(coordinator.snapshot().scrub_velocity, Some(4.0));
    assert!(coordinator.tick(Duration::from_millis(2_500)));
    assert_eq!(coordinator.snapshot().scrubbed_position, secs(110));
    assert_eq!(coordinator.snapshot().true_position, secs(100));

    coordinator.press(SeekDirection::Backward, start + secs(2)).unwrap();
    assert_eq!(coordinator.snapshot().scrub_velocity, Some(2.0));
    coordinator.press(SeekDirection::Backward, start + secs(3)).unwrap();

    let snapshot = coordinator.snapshot();
    assert!(!snapshot.is_scrubbing);
    assert_eq!(snapshot.scrub_velocity, None);
    assert_eq!(snapshot.true_position, secs(110));
}

#[tokio::test(start_paused = true)]
async fn play_pause_while_scrubbing_commits_instead_of_toggling() {
    let mut player = MockPlayer::new();
    player.expect_seek().with(eq(secs(240))).times(1).returning(|_| Ok(()));
    player.expect_play().never();
    let mut coordinator = coordinator(player, 100);

    coordinator.begin_scrub();
    assert!(coordinator.scrub_to(secs(240)));
    coordinator.play_pause_pressed(Instant::now()).unwrap();

    let snapshot = coordinator.snapshot();
    assert!(!snapshot.is_scrubbing);
    assert_eq!(snapshot.true_position, secs(240));
    assert_eq!(snapshot.requested, PlaybackRequestStatus::Paused);
}

#[tokio::test(start_paused = true)]
async fn cancelled_scrub_never_seeks() {
    let mut player = MockPlayer::new();
    player.expect_seek().never();
    let mut coordinator = coordinator(player, 100);

    coordinator.begin_scrub();
    coordinator.scrub_to(secs(400));
    assert!(coordinator.menu_pressed());

    let snapshot = coordinator.snapshot();
    assert_eq!(snapshot.scrubbed_position, secs(100));
    assert_eq!(snapshot.true_position, secs(100));
}

#[tokio::test(start_paused = true)]
async fn track_and_rate_selection_pass_through() {
    let mut player = MockPlayer::new();
    player.expect_set_rate().with(eq(1.5f32)).times(1).returning(|_| Ok(()));
    player.expect_set_audio_track().with(eq(2)).times(1).returning(|_| Ok(()));
    player
        .expect_set_subtitle_track()
        .with(eq(None))
        .times(1)
        .returning(|_| Err(ProxyError::Rejected("no subtitle stream".into())));
    let mut coordinator = coordinator(player, 0);

    coordinator.set_rate(1.5).unwrap();
    coordinator.set_audio_track(2).unwrap();
    assert!(coordinator.set_subtitle_track(None).is_err());
}

#[tokio::test(start_paused = true)]
async fn scrub_timer_promotes_hold_and_advances_position() {
    let mut player = MockPlayer::new();
    player
        .expect_seek()
        .withf(|to| *to >= Duration::from_millis(1_800) && *to <= Duration::from_millis(2_200))
        .times(1)
        .returning(|_| Ok(()));
    let coordinator = Arc::new(Mutex::new(coordinator(player, 0)));
    let timer = spawn_scrub_timer(Arc::downgrade(&coordinator), Duration::from_millis(100));

    coordinator.lock().press(SeekDirection::Forward, Instant::now()).unwrap();
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(coordinator.lock().snapshot().scrub_velocity, Some(2.0));

    tokio::time::sleep(secs(1)).await;
    coordinator.lock().select().unwrap();
    assert!(!coordinator.lock().snapshot().is_scrubbing);

    drop(coordinator);
    tokio::time::timeout(secs(5), timer).await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn refused_seek_keeps_the_reported_position() {
    let mut player = MockPlayer::new();
    player.expect_seek().with(eq(secs(400))).times(1).returning(|_| Err(ProxyError::NotReady));
    let mut coordinator = coordinator(player, 100);

    coordinator.begin_scrub();
    coordinator.scrub_to(secs(400));
    assert_eq!(coordinator.commit_scrub(), Err(ProxyError::NotReady));

    let snapshot = coordinator.snapshot();
    assert!(!snapshot.is_scrubbing);
    assert_eq!(snapshot.true_position, secs(100));
}

#[tokio::test(start_paused = true)]
async fn chapters_follow_the_position_and_seek_to_their_start() {
    let mut player = MockPlayer::new();
    player.expect_seek().with(eq(secs(300))).times(1).returning(|_| Ok(()));
    player.expect_seek().with(eq(secs(120))).times(1).returning(|_| Ok(()));
    player.expect_play().times(1).returning(|| Ok(()));
    let mut item = movie(100, 600);
    item.chapters = vec![chapter("Middle", 120), chapter("Opening", 0), chapter("End", 300)];
    let mut coordinator = PlaybackCoordinator::new(player, CoordinatorOptions::default());
    coordinator.load_item(&item);
    let now = Instant::now();

    assert_eq!(coordinator.chapters()[0].name.as_deref(), Some("Opening"));
    assert_eq!(coordinator.current_chapter(), Some(0));
    assert_eq!(coordinator.chapter_at(secs(120)), Some(1));
    assert_eq!(coordinator.chapter_at(secs(299)), Some(1));

    assert!(coordinator.seek_to_chapter(2, now).unwrap());
    let snapshot = coordinator.snapshot();
    assert_eq!(snapshot.true_position, secs(300));
    assert_eq!(snapshot.current_chapter, Some(2));
    assert_eq!(snapshot.requested, PlaybackRequestStatus::Playing);

    // Last chapter: nothing further.
    assert!(!coordinator.next_chapter(now).unwrap());
    // Already playing, so only the seek goes out.
    assert!(coordinator.previous_chapter(now).unwrap());
    assert_eq!(coordinator.snapshot().current_chapter, Some(1));

    coordinator.begin_scrub();
    coordinator.scrub_to(secs(10));
    assert_eq!(coordinator.snapshot().current_chapter, Some(0));
    coordinator.cancel_scrub();
    assert_eq!(coordinator.current_chapter(), Some(1));

    assert!(!coordinator.seek_to_chapter(9, now).unwrap());
}

#[tokio::test(start_paused = true)]
async fn items_without_chapters_have_no_current_chapter() {
    let mut player = MockPlayer::new();
    player.expect_seek().never();
    let mut coordinator = coordinator(player, 100);

    assert!(coordinator.chapters().is_empty());
    assert_eq!(coordinator.current_chapter(), None);
    assert!(!coordinator.next_chapter(Instant::now()).unwrap());
    assert!(!coordinator.previous_chapter(Instant::now()).unwrap());
}

fn drain(reports: &mut mpsc::UnboundedReceiver<ProgressReport>) -> Vec<ProgressReport> {
    let mut drained = Vec::new();
    while let Ok(report) = reports.try_recv() {
        drained.push(report);
    }
    drained
}

#[tokio::test(start_paused = true)]
async fn progress_follows_requests_and_commits() {
    let mut player = MockPlayer::new();
    player.expect_play().times(1).returning(|| Ok(()));
    player.expect_pause().times(1).returning(|| Ok(()));
    player.expect_seek().with(eq(secs(240))).times(1).returning(|_| Ok(()));
    player.expect_set_audio_track().with(eq(1)).times(1).returning(|_| Ok(()));
    let (sink, mut reports) = mpsc::unbounded_channel();
    let mut coordinator = coordinator(player, 100).with_progress_sink(sink);
    let start = Instant::now();

    // Nothing until playback is asked for.
    coordinator.poll(start).unwrap();
    assert!(drain(&mut reports).is_empty());

    coordinator.toggle_playback(start).unwrap();
    coordinator.on_transport_status(TransportStatus::Playing, start + Duration::from_millis(100));
    coordinator.toggle_playback(start + secs(1)).unwrap();
    coordinator.on_transport_status(TransportStatus::Paused, start + Duration::from_millis(1_200));
    coordinator.begin_scrub();
    coordinator.scrub_to(secs(240));
    coordinator.commit_scrub().unwrap();

    let sent = drain(&mut reports);
    let kinds: Vec<_> = sent.iter().map(|report| (report.kind, report.is_paused, report.position)).collect();
    assert_eq!(
        kinds,
        [
            (ProgressKind::Start, false, secs(100)),
            (ProgressKind::Progress, true, secs(100)),
            (ProgressKind::Progress, true, secs(240)),
        ]
    );
    assert!(sent.iter().all(|report| report.item_id.as_str() == "movie-1"));

    coordinator.set_audio_track(1).unwrap();
    coordinator.poll(start + secs(20)).unwrap();
    let periodic = drain(&mut reports);
    assert_eq!(periodic.len(), 1);
    assert_eq!(periodic[0].kind, ProgressKind::Progress);
    assert_eq!(periodic[0].audio_stream_index, Some(1));

    coordinator.stop();
    let stopped = drain(&mut reports);
    assert_eq!(stopped.len(), 1);
    assert_eq!(stopped[0].kind, ProgressKind::Stopped);
    assert_eq!(stopped[0].position, secs(240));

    // Reloading after a stop sends nothing further.
    coordinator.load_item(&movie(0, 600));
    assert!(drain(&mut reports).is_empty());
}

#[tokio::test(start_paused = true)]
async fn player_initiated_changes_are_reported_and_item_switch_stops() {
    let mut player = MockPlayer::new();
    player.expect_play().times(1).returning(|| Ok(()));
    let (sink, mut reports) = mpsc::unbounded_channel();
    let mut coordinator = coordinator(player, 0).with_progress_sink(sink);
    let start = Instant::now();

    coordinator.toggle_playback(start).unwrap();
    coordinator.on_transport_status(TransportStatus::Playing, start + Duration::from_millis(100));
    coordinator.on_position(secs(42));
    coordinator.on_transport_status(TransportStatus::Stopped, start + secs(3));

    let sent = drain(&mut reports);
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].kind, ProgressKind::Progress);
    assert!(sent[1].is_paused);
    assert_eq!(sent[1].position, secs(42));

    let mut next = BaseItem::new(Some(ElementId::new("movie-2").unwrap()), "Next", ItemKind::Movie);
    next.run_time_ticks = Some(Ticks::from_duration(secs(900)));
    coordinator.load_item_in_session(&next, Some("session-2".into()));

    let stopped = drain(&mut reports);
    assert_eq!(stopped.len(), 1);
    assert_eq!(stopped[0].kind, ProgressKind::Stopped);
    assert_eq!(stopped[0].item_id.as_str(), "movie-1");
    assert_eq!(stopped[0].position, secs(42));
}

#[derive(Debug)]
struct RecordingSession {
    server: Url,
    sent: Mutex<Vec<ApiRequest>>,
}

#[async_trait]
impl AuthenticatedSession for RecordingSession {
    fn user_id(&self) -> &str {
        "user-1"
    }

    fn server_url(&self) -> &Url {
        &self.server
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, FetchError> {
        let stopping = request.path.ends_with("/Stopped");
        self.sent.lock().push(request);
        if stopping {
            return Err(FetchError::Transport("connection reset".into()));
        }
        Ok(ApiResponse {
            status: 204,
            body: Vec::new(),
        })
    }
}

#[tokio::test]
async fn reporter_posts_every_report_in_order() {
    let session = Arc::new(RecordingSession {
        server: Url::parse("https://media.example.com").unwrap(),
        sent: Mutex::new(Vec::new()),
    });
    let (sink, reports) = mpsc::unbounded_channel();
    let reporter = spawn_progress_reporter(session.clone(), reports);

    let report = |kind, position| ProgressReport {
        kind,
        item_id: ElementId::new("movie-1").unwrap(),
        play_session_id: None,
        position: secs(position),
        is_paused: false,
        audio_stream_index: None,
        subtitle_stream_index: Some(3),
    };
    // A failing stop does not end the reporter.
    for (kind, position) in [
        (ProgressKind::Start, 0),
        (ProgressKind::Stopped, 10),
        (ProgressKind::Progress, 20),
    ] {
        sink.send(report(kind, position)).unwrap();
    }
    drop(sink);
    reporter.await.unwrap();

    let sent = session.sent.lock();
    let paths: Vec<_> = sent.iter().map(|request| request.path.as_str()).collect();
    assert_eq!(
        paths,
        ["/Sessions/Playing", "/Sessions/Playing/Stopped", "/Sessions/Playing/Progress"]
    );
    assert!(sent.iter().all(|request| request.method == Method::Post));

    let body = sent[2].body.as_ref().unwrap();
    assert_eq!(body["ItemId"], "movie-1");
    assert_eq!(body["PositionTicks"], 200_000_000);
    assert_eq!(body["SubtitleStreamIndex"], 3);
    assert!(body.get("AudioStreamIndex").is_none());
}
