//! End-to-end editing flows driven through the session and scheduler.

use std::time::Duration;

use assert_approx_eq::assert_approx_eq;
use pretty_assertions::assert_eq;
use wavesculpt::drag::{Pointer, SurfaceRect};
use wavesculpt::params::{EffectType, Parameter};
use wavesculpt::renderer::{RenderPolicy, RenderRequest, Renderer, RendererError, RequestId};
use wavesculpt::session::{
    EditorSession, NotificationLevel, Scheduler, SessionCommand, SessionEvent, SessionSettings,
};
use wavesculpt::wave::{Emotion, PathPoint};

fn seeded(policy: RenderPolicy) -> EditorSession {
    EditorSession::new(SessionSettings {
        seed: Some(2024),
        policy,
        ..SessionSettings::default()
    })
}

fn submitted_id(commands: &[SessionCommand]) -> RequestId {
    commands
        .iter()
        .find_map(|c| match c {
            SessionCommand::SubmitRender { request_id, .. } => Some(*request_id),
            _ => None,
        })
        .expect("apply should submit a render")
}

#[test]
fn angry_preset_then_drag_updates_curve() {
    let mut session = seeded(RenderPolicy::Reject);
    session.handle(SessionEvent::ApplyEmotion(Emotion::Angry));

    assert_eq!(session.parameters().effect_type, EffectType::Distortion);
    assert_eq!(session.stroke_color().to_string(), "#dc3545");
    let wave = session.wave();
    assert_eq!(wave.len(), 40);
    assert_eq!(wave.point(0).unwrap().y(), 100.0);
    assert_eq!(wave.point(39).unwrap().y(), 100.0);
    assert!(wave.points().iter().all(|p| (10.0..=190.0).contains(&p.y())));

    // Surface drawn at its logical size so screen y maps 1:1
    let surface = SurfaceRect::new(0.0, 0.0, 1000.0, 200.0);
    session.handle(SessionEvent::HandlePressed(10));
    assert_eq!(session.active_point(), Some(10));
    session.handle(SessionEvent::PointerMove {
        pointer: Pointer::new(123.0, 5.0),
        surface,
    });
    session.handle(SessionEvent::PointerUp);
    assert_eq!(session.active_point(), None);

    let point = *session.wave().point(10).unwrap();
    assert_eq!(point.y(), 10.0);

    let path = session.path();
    let expected = PathPoint::new(point.x(), 10.0);
    assert_eq!(path.segments[9].to, expected);
    assert_eq!(path.segments[10].from, expected);
}

#[test]
fn bars_follow_the_wave_while_playing() {
    let mut session = seeded(RenderPolicy::Reject);
    session.handle(SessionEvent::LoadAsset("/static/audio/take.mp3".to_string()));
    session.handle(SessionEvent::PlaybackStarted);
    session.handle(SessionEvent::Tick);

    assert_eq!(session.bars().len(), 32);
    let y20 = session.wave().point(20).unwrap().y();
    assert_approx_eq!(session.bars()[16], (200.0 - y20) / 2.0);

    session.handle(SessionEvent::PlaybackEnded);
    let frozen = session.bars().to_vec();
    session.handle(SessionEvent::GenerateRandom);
    assert_eq!(session.handle(SessionEvent::Tick), Vec::new());
    assert_eq!(session.bars(), frozen.as_slice());
}

#[test]
fn failed_render_leaves_state_untouched() {
    let mut session = seeded(RenderPolicy::Reject);
    session.handle(SessionEvent::LoadAsset("/static/audio/take.mp3".to_string()));
    let commands = session.handle(SessionEvent::Apply);
    let request_id = submitted_id(&commands);

    let commands = session.handle(SessionEvent::RenderCompleted {
        request_id,
        result: Err(RendererError::RequestFailed("bad input".to_string())),
    });

    assert!(commands.contains(&SessionCommand::Notify(
        wavesculpt::session::Notification::new(NotificationLevel::Danger, "Error: bad input")
    )));
    assert!(session.history().is_empty());
    assert_eq!(session.current_asset(), Some("/static/audio/take.mp3"));
    assert_eq!(session.pending_renders(), 0);
}

#[test]
fn reject_policy_refuses_overlapping_apply() {
    let mut session = seeded(RenderPolicy::Reject);
    session.handle(SessionEvent::LoadAsset("a.mp3".to_string()));
    session.handle(SessionEvent::Apply);

    let second = session.handle(SessionEvent::Apply);
    assert!(second
        .iter()
        .all(|c| !matches!(c, SessionCommand::SubmitRender { .. })));
    assert_eq!(session.pending_renders(), 1);

    let mut concurrent = seeded(RenderPolicy::Concurrent);
    concurrent.handle(SessionEvent::LoadAsset("a.mp3".to_string()));
    concurrent.handle(SessionEvent::Apply);
    concurrent.handle(SessionEvent::Apply);
    assert_eq!(concurrent.pending_renders(), 2);
}

#[test]
fn history_is_capped_and_replay_restores_parameters() {
    let mut session = seeded(RenderPolicy::Reject);
    session.handle(SessionEvent::LoadAsset("take.mp3".to_string()));

    for n in 0..6 {
        session.handle(SessionEvent::SetParameter {
            parameter: Parameter::Speed,
            value: 1.0 + n as f64 * 0.1,
        });
        let request_id = submitted_id(&session.handle(SessionEvent::Apply));
        session.handle(SessionEvent::RenderCompleted {
            request_id,
            result: Ok(format!("/static/audio/out{n}.mp3")),
        });
    }

    let history = session.history();
    assert_eq!(history.len(), 5);
    assert_eq!(history.entries()[0].asset_reference(), "/static/audio/out5.mp3");
    assert_eq!(history.entries()[4].asset_reference(), "/static/audio/out1.mp3");

    session.handle(SessionEvent::Reset);
    assert_eq!(session.parameters().speed, 1.0);

    let commands = session.handle(SessionEvent::ReplayHistory(2));
    assert!(commands.contains(&SessionCommand::StartPlayback {
        asset: "/static/audio/out3.mp3".to_string()
    }));
    assert!(commands
        .iter()
        .all(|c| !matches!(c, SessionCommand::SubmitRender { .. })));
    assert_approx_eq!(session.parameters().speed, 1.3);
    assert_eq!(session.current_asset(), Some("/static/audio/out3.mp3"));
}

struct SuffixRenderer;

impl Renderer for SuffixRenderer {
    async fn render(&self, request: RenderRequest) -> Result<String, RendererError> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok(format!("{}.processed", request.audio_path))
    }
}

#[tokio::test]
async fn scheduler_completes_render_and_resumes_playback() {
    let mut scheduler = Scheduler::new(
        seeded(RenderPolicy::Reject),
        SuffixRenderer,
        Duration::from_millis(10),
    );
    let sender = scheduler.sender();
    assert!(sender.send(SessionEvent::LoadAsset("take.mp3".to_string())));
    assert!(sender.send(SessionEvent::PlaybackStarted));
    assert!(sender.send(SessionEvent::Apply));

    let mut resumed = None;
    for _ in 0..50 {
        let Some(commands) = scheduler.step().await else {
            break;
        };
        if let Some(asset) = commands.iter().find_map(|c| match c {
            SessionCommand::ResumePlayback { asset } => Some(asset.clone()),
            _ => None,
        }) {
            resumed = Some(asset);
            break;
        }
    }

    assert_eq!(resumed.as_deref(), Some("take.mp3.processed"));
    assert_eq!(scheduler.session().history().len(), 1);

    sender.send(SessionEvent::Shutdown);
    let mut steps = 0;
    while scheduler.step().await.is_some() {
        steps += 1;
        assert!(steps < 100, "scheduler did not shut down");
    }
}
