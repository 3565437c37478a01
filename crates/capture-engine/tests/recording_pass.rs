use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use mockreel_capture_engine::{
    drive, DriveOptions, Pace, RecordingSession, SequencePhase, SessionConfig, SessionState,
    SimulatedBackend, SimulatedConfig, TimedStage, TimelineEvent,
};
use mockreel_common::error::MockreelError;
use mockreel_platform_core::{ContainerFormat, StageRect};
use mockreel_scene_model::Dimensions;
use mockreel_scene_store::{SceneStore, SessionStore, SharedSceneStore};
use proptest::prelude::*;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn store_with_scenes(count: usize) -> SceneStore {
    let mut store = SceneStore::new();
    for _ in 1..count {
        store.add_scene();
    }
    store
}

fn session_with(
    store: SceneStore,
    config: SimulatedConfig,
) -> (
    RecordingSession<SceneStore>,
    std::sync::Arc<std::sync::Mutex<mockreel_capture_engine::SimulatedProbe>>,
) {
    let backend = SimulatedBackend::new(config);
    let probe = backend.probe();
    let session = RecordingSession::new(store, Box::new(backend), SessionConfig::default());
    (session, probe)
}

fn instant() -> DriveOptions {
    DriveOptions {
        pace: Pace::Instant,
        ..DriveOptions::default()
    }
}

fn assert_flags_restored(store: &SceneStore) {
    let state = store.state();
    assert!(!state.is_exporting);
    assert!(!state.is_playing);
    assert!(!state.animation_finished);
    assert_eq!(state.locked_dimensions, None);
}

/// Raise the finished pulse the way the stage does, then let the session react.
fn pulse(session: &mut RecordingSession<SceneStore>) {
    SessionStore::set_animation_finished(session.store_mut(), true);
    session.observe();
}

#[tokio::test]
async fn full_pass_visits_every_scene_once() {
    let (mut session, probe) = session_with(store_with_scenes(3), SimulatedConfig::default());
    let mut stage = TimedStage::new(vec![ms(2000); 3]);

    let report = drive(&mut session, &mut stage, instant()).await.unwrap();

    assert_eq!(
        report.scene_switches(),
        vec![(ms(0), 0), (ms(3300), 1), (ms(6200), 2)]
    );
    assert!(!report.timed_out);
    assert_eq!(
        report.timeline.last().map(|e| (e.at, e.event)),
        Some((ms(8800), TimelineEvent::RecordingStopped))
    );

    let artifact = report.artifact.expect("artifact");
    assert_eq!(artifact.mime_type(), "video/mp4");
    assert_eq!(artifact.suggested_filename, "app-promo.mp4");
    assert_eq!(artifact.duration, ms(8800));
    assert!(artifact.bytes.starts_with(b"MOCKREEL video/mp4 1080x1080@60"));

    assert!(!session.is_recording());
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.phase(), SequencePhase::Done);
    assert_flags_restored(session.store());

    let probe = probe.lock().unwrap();
    let request = &probe.requests[0];
    assert_eq!(
        (request.ideal_width, request.ideal_height, request.ideal_frame_rate),
        (3840, 2160, 60)
    );
    assert!(!request.audio);
    assert!(request.prefer_current_tab);
    assert_eq!(
        probe.cropped_to,
        Some(StageRect::new(0.0, 0.0, 1080.0, 1080.0))
    );
    assert_eq!(
        probe.recorder_options.map(|o| o.video_bits_per_second),
        Some(25_000_000)
    );
    assert_eq!(probe.recorder_stops, 1);
    assert_eq!(probe.tracks_stopped, 1);
}

#[tokio::test]
async fn pulses_advance_exactly_scene_count_minus_one_times() {
    let (mut session, _probe) = session_with(store_with_scenes(3), SimulatedConfig::default());
    session.start_region_recording().await.unwrap();

    assert!(session.is_recording());
    assert!(session.store().state().is_exporting);
    assert_eq!(
        session.store().state().locked_dimensions,
        Some(Dimensions::new(1080.0, 1080.0))
    );
    assert_eq!(SessionStore::active_index(session.store()), 0);
    assert!(!session.store().state().is_playing);

    session.advance(ms(1000));
    assert!(session.store().state().is_playing);

    for expected in 1..3 {
        pulse(&mut session);
        assert!(!session.store().state().animation_finished);
        assert!(!session.store().state().is_playing);

        session.advance(ms(300));
        assert_eq!(SessionStore::active_index(session.store()), expected);
        let reset_before = session.store().state().reset_scroll_signal;
        session.advance(ms(500));
        assert_eq!(session.store().state().reset_scroll_signal, reset_before + 1);
        session.advance(ms(100));
        assert!(session.store().state().is_playing);
    }

    pulse(&mut session);
    assert!(!session.is_recording());
    assert_eq!(SessionStore::active_index(session.store()), 2);
    assert_flags_restored(session.store());
    assert!(session.artifact().is_some());
}

#[tokio::test]
async fn duplicate_pulse_during_transition_is_ignored() {
    let (mut session, _probe) = session_with(store_with_scenes(3), SimulatedConfig::default());
    session.start_region_recording().await.unwrap();
    session.advance(ms(1000));

    pulse(&mut session);
    assert_eq!(session.pending_steps(), 1);
    pulse(&mut session);
    assert_eq!(session.pending_steps(), 1);
    assert!(!session.store().state().animation_finished);

    session.advance(ms(900));
    assert_eq!(SessionStore::active_index(session.store()), 1);
    assert_eq!(session.phase(), SequencePhase::WaitingForFinish { scene: 1 });
}

#[tokio::test]
async fn single_scene_stops_on_first_pulse() {
    let (mut session, _probe) = session_with(store_with_scenes(1), SimulatedConfig::default());
    session.start_region_recording().await.unwrap();
    session.advance(ms(1000));

    pulse(&mut session);

    assert!(!session.is_recording());
    assert_eq!(session.pending_steps(), 0);
    assert_flags_restored(session.store());
}

#[tokio::test]
async fn stop_when_idle_is_a_no_op() {
    let (mut session, probe) = session_with(store_with_scenes(2), SimulatedConfig::default());
    let before = session.store().snapshot();

    session.stop_region_recording();

    assert!(!session.is_recording());
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.store().snapshot(), before);
    assert_eq!(probe.lock().unwrap().recorder_stops, 0);
}

#[tokio::test]
async fn stop_mid_transition_cancels_pending_resume() {
    let (mut session, probe) = session_with(store_with_scenes(2), SimulatedConfig::default());
    session.start_region_recording().await.unwrap();
    session.advance(ms(1000));
    pulse(&mut session);
    session.advance(ms(850));
    assert_eq!(session.phase(), SequencePhase::Resetting { scene: 1 });

    session.stop_region_recording();
    assert_eq!(session.pending_steps(), 0);
    session.advance(ms(5000));

    assert!(!session.store().state().is_playing);
    assert_flags_restored(session.store());
    assert!(session.artifact().is_some());

    session.stop_region_recording();
    assert_eq!(probe.lock().unwrap().recorder_stops, 1);
}

#[tokio::test]
async fn denied_permission_leaves_session_idle_and_unlocked() {
    let (mut session, probe) = session_with(
        store_with_scenes(2),
        SimulatedConfig {
            deny_permission: true,
            ..SimulatedConfig::default()
        },
    );

    let err = session.start_region_recording().await.unwrap_err();

    assert!(matches!(err, MockreelError::PermissionDenied { .. }));
    assert!(!session.is_recording());
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.artifact().is_none());
    assert_flags_restored(session.store());
    assert_eq!(probe.lock().unwrap().tracks_stopped, 0);
}

#[tokio::test]
async fn recorder_failure_releases_stream() {
    let (mut session, probe) = session_with(
        store_with_scenes(2),
        SimulatedConfig {
            fail_recorder_start: true,
            ..SimulatedConfig::default()
        },
    );

    let err = session.start_region_recording().await.unwrap_err();

    assert!(matches!(err, MockreelError::Recorder { .. }));
    assert!(!session.is_recording());
    assert_flags_restored(session.store());
    assert_eq!(probe.lock().unwrap().tracks_stopped, 1);

    // A failed start does not block the next attempt.
    assert_eq!(session.state(), SessionState::Idle);
}

#[tokio::test]
async fn crop_failure_unlocks_and_releases_stream() {
    let (mut session, probe) = session_with(
        store_with_scenes(2),
        SimulatedConfig {
            fail_crop: true,
            ..SimulatedConfig::default()
        },
    );

    let err = session.start_region_recording().await.unwrap_err();

    assert!(matches!(err, MockreelError::Capture { .. }));
    assert!(!err.is_capability_failure());
    assert_eq!(session.state(), SessionState::Idle);
    assert!(!session.is_recording());
    assert!(session.artifact().is_none());
    assert_flags_restored(session.store());

    let probe = probe.lock().unwrap();
    assert_eq!(probe.tracks_stopped, 1);
    assert_eq!(probe.cropped_to, None);
    assert_eq!(probe.recorder_starts, 0);
}

#[tokio::test]
async fn starting_twice_is_rejected() {
    let (mut session, _probe) = session_with(store_with_scenes(1), SimulatedConfig::default());
    session.start_region_recording().await.unwrap();

    assert!(session.start_region_recording().await.is_err());
    assert!(session.is_recording());
}

#[tokio::test]
async fn falls_back_to_webm_when_mp4_is_unsupported() {
    let (mut session, probe) = session_with(
        store_with_scenes(1),
        SimulatedConfig {
            supported_containers: vec![ContainerFormat::WebM],
            ..SimulatedConfig::default()
        },
    );
    let mut stage = TimedStage::new(vec![ms(500)]);

    let report = drive(&mut session, &mut stage, instant()).await.unwrap();

    let artifact = report.artifact.unwrap();
    assert_eq!(artifact.mime_type(), "video/webm");
    assert_eq!(artifact.suggested_filename, "app-promo.mp4");
    assert_eq!(
        probe.lock().unwrap().recorder_options.map(|o| o.container),
        Some(ContainerFormat::WebM)
    );
}

#[tokio::test]
async fn uses_last_preference_when_nothing_is_supported() {
    let (mut session, probe) = session_with(
        store_with_scenes(1),
        SimulatedConfig {
            supported_containers: Vec::new(),
            ..SimulatedConfig::default()
        },
    );
    session.start_region_recording().await.unwrap();

    assert_eq!(
        probe.lock().unwrap().recorder_options.map(|o| o.container),
        Some(ContainerFormat::WebM)
    );
}

#[tokio::test]
async fn records_uncropped_without_crop_support() {
    let (mut session, probe) = session_with(
        store_with_scenes(1),
        SimulatedConfig {
            crop_target_supported: false,
            ..SimulatedConfig::default()
        },
    );
    let mut stage = TimedStage::new(vec![ms(500)]);

    let report = drive(&mut session, &mut stage, instant()).await.unwrap();

    assert!(probe.lock().unwrap().cropped_to.is_none());
    assert!(report
        .artifact
        .unwrap()
        .bytes
        .starts_with(b"MOCKREEL video/mp4 3840x2160@60"));
}

#[tokio::test]
async fn missing_stage_leaves_dimensions_unlocked() {
    let (mut session, probe) = session_with(
        store_with_scenes(1),
        SimulatedConfig {
            stage: None,
            ..SimulatedConfig::default()
        },
    );
    session.start_region_recording().await.unwrap();

    assert_eq!(session.store().state().locked_dimensions, None);
    assert!(probe.lock().unwrap().cropped_to.is_none());
}

#[tokio::test]
async fn crop_can_be_disabled_by_config() {
    let backend = SimulatedBackend::default();
    let probe = backend.probe();
    let config = SessionConfig {
        crop_to_stage: false,
        ..SessionConfig::default()
    };
    let mut session = RecordingSession::new(store_with_scenes(1), Box::new(backend), config);
    session.start_region_recording().await.unwrap();

    assert!(probe.lock().unwrap().cropped_to.is_none());
    assert!(session.store().state().locked_dimensions.is_some());
}

#[tokio::test]
async fn time_limit_stops_a_stalled_pass() {
    let (mut session, _probe) = session_with(store_with_scenes(2), SimulatedConfig::default());
    let mut stage = TimedStage::new(vec![Duration::from_secs(3600)]);
    let options = DriveOptions {
        pace: Pace::Instant,
        max_duration: Duration::from_secs(5),
    };

    let report = drive(&mut session, &mut stage, options).await.unwrap();

    assert!(report.timed_out);
    assert_eq!(report.artifact.unwrap().duration, Duration::from_secs(5));
    assert_flags_restored(session.store());
}

#[tokio::test]
async fn shared_store_observers_see_export_mode() {
    let shared = SharedSceneStore::new(store_with_scenes(2));
    let exporting = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&exporting);
    shared.borrow_mut().subscribe(move |prev, next| {
        if prev.is_exporting != next.is_exporting {
            seen.borrow_mut().push(next.is_exporting);
        }
    });

    let mut session = RecordingSession::new(
        shared.clone(),
        Box::new(SimulatedBackend::default()),
        SessionConfig::default(),
    );
    let mut stage = TimedStage::new(vec![ms(1000)]);
    drive(&mut session, &mut stage, instant()).await.unwrap();

    assert_eq!(*exporting.borrow(), vec![true, false]);
    assert!(!shared.borrow().state().is_exporting);
}

#[tokio::test(start_paused = true)]
async fn real_time_pace_sleeps_through_the_pass() {
    let (mut session, _probe) = session_with(store_with_scenes(2), SimulatedConfig::default());
    let mut stage = TimedStage::new(vec![ms(1000); 2]);
    let started = tokio::time::Instant::now();

    let report = drive(&mut session, &mut stage, DriveOptions::default())
        .await
        .unwrap();

    // 1000 start + 1000 play + 900 gap + 1000 play
    let elapsed = started.elapsed();
    assert!(elapsed >= ms(3900) && elapsed < ms(4000), "elapsed {elapsed:?}");
    assert_eq!(report.artifact.unwrap().duration, ms(3900));
}

proptest! {
    #[test]
    fn every_scene_is_activated_once_in_order(count in 1usize..7, play_ms in 1u64..5000) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let (mut session, _probe) = session_with(store_with_scenes(count), SimulatedConfig::default());
        let mut stage = TimedStage::new(vec![ms(play_ms); count]);

        let report = runtime
            .block_on(drive(&mut session, &mut stage, instant()))
            .unwrap();

        let scenes: Vec<usize> = report.scene_switches().into_iter().map(|(_, s)| s).collect();
        prop_assert_eq!(scenes, (0..count).collect::<Vec<_>>());

        let gap = 300 + 500 + 100;
        let expected = 1000 + play_ms * count as u64 + gap * (count as u64 - 1);
        prop_assert_eq!(report.artifact.map(|a| a.duration), Some(ms(expected)));
        prop_assert!(!session.is_recording());
    }
}
