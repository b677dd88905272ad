//! Event dispatch for an [`EditorSession`].
//!
//! Events are read from one queue and applied strictly one at a time. While
//! playback runs, an interval adds `Tick` events. Render requests run as spawned
//! tasks that only post a completion event back into the queue.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};

use super::{EditorSession, SessionCommand, SessionEvent};
use crate::renderer::Renderer;

/// Cloneable handle for posting events into a scheduler's queue.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSender {
    /// Queues an event. Returns `false` once the scheduler is gone.
    pub fn send(&self, event: SessionEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Owns the session and serializes everything that touches it.
pub struct Scheduler<R: Renderer> {
    session: EditorSession,
    renderer: Arc<R>,
    tx: mpsc::UnboundedSender<SessionEvent>,
    rx: mpsc::UnboundedReceiver<SessionEvent>,
    ticker: Interval,
}

impl<R: Renderer> Scheduler<R> {
    /// Creates a scheduler ticking every `tick_period` while playing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(session: EditorSession, renderer: R, tick_period: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut ticker = tokio::time::interval(tick_period.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self {
            session,
            renderer: Arc::new(renderer),
            tx,
            rx,
            ticker,
        }
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    /// Waits for the next queued event, or a tick while playing.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        let playing = self.session.is_playing();
        tokio::select! {
            event = self.rx.recv() => event,
            _ = self.ticker.tick(), if playing => Some(SessionEvent::Tick),
        }
    }

    /// Applies one event and starts any render it requested.
    ///
    /// Returns the commands left for the host.
    pub fn dispatch(&mut self, event: SessionEvent) -> Vec<SessionCommand> {
        let commands = self.session.handle(event);
        let mut remaining = Vec::with_capacity(commands.len());

        for command in commands {
            match command {
                SessionCommand::SubmitRender {
                    request_id,
                    request,
                } => {
                    let renderer = Arc::clone(&self.renderer);
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let result = renderer.render(request).await;
                        let completed = SessionEvent::RenderCompleted { request_id, result };
                        if tx.send(completed).is_err() {
                            tracing::debug!("Session closed before render {} finished", request_id);
                        }
                    });
                }
                other => remaining.push(other),
            }
        }

        remaining
    }

    /// Waits for and applies the next event.
    ///
    /// Returns `None` after `Shutdown`.
    pub async fn step(&mut self) -> Option<Vec<SessionCommand>> {
        let event = self.next_event().await?;
        let shutdown = matches!(event, SessionEvent::Shutdown);
        let commands = self.dispatch(event);
        if shutdown {
            tracing::debug!("Scheduler shut down");
            return None;
        }
        Some(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterSet;
    use crate::renderer::{RenderRequest, RendererError};
    use crate::session::{NotificationLevel, SessionSettings};
    use pretty_assertions::assert_eq;
    use tokio::time::timeout;

    struct EchoRenderer;

    impl Renderer for EchoRenderer {
        async fn render(&self, request: RenderRequest) -> Result<String, RendererError> {
            Ok(format!("{}@{}", request.audio_path, request.parameters.speed))
        }
    }

    struct FailingRenderer;

    impl Renderer for FailingRenderer {
        async fn render(&self, _request: RenderRequest) -> Result<String, RendererError> {
            Err(RendererError::RequestFailed("ffmpeg missing".to_string()))
        }
    }

    fn scheduler<R: Renderer>(renderer: R) -> Scheduler<R> {
        let session = EditorSession::new(SessionSettings {
            seed: Some(11),
            ..SessionSettings::default()
        });
        Scheduler::new(session, renderer, Duration::from_millis(5))
    }

    /// Steps until a notification of `level` shows up.
    async fn step_until_notified<R: Renderer>(
        scheduler: &mut Scheduler<R>,
        level: NotificationLevel,
    ) {
        loop {
            let commands = scheduler.step().await.expect("scheduler is running");
            let seen = commands.iter().any(|c| {
                matches!(c, SessionCommand::Notify(n) if n.level == level)
            });
            if seen {
                return;
            }
        }
    }

    #[tokio::test]
    async fn test_render_completion_flows_back_through_queue() {
        let mut scheduler = scheduler(EchoRenderer);
        let sender = scheduler.sender();
        sender.send(SessionEvent::LoadAsset("in.mp3".to_string()));
        sender.send(SessionEvent::Apply);

        timeout(
            Duration::from_secs(5),
            step_until_notified(&mut scheduler, NotificationLevel::Success),
        )
        .await
        .unwrap();

        let session = scheduler.session();
        assert_eq!(session.current_asset(), Some("in.mp3@1"));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.pending_renders(), 0);
    }

    #[tokio::test]
    async fn test_failed_render_leaves_state_untouched() {
        let mut scheduler = scheduler(FailingRenderer);
        let sender = scheduler.sender();
        sender.send(SessionEvent::LoadAsset("in.mp3".to_string()));

        // Consume the load so the snapshot reflects it
        scheduler.step().await.unwrap();
        let wave_before = scheduler.session().wave().ys();
        sender.send(SessionEvent::Apply);

        timeout(
            Duration::from_secs(5),
            step_until_notified(&mut scheduler, NotificationLevel::Danger),
        )
        .await
        .unwrap();

        let session = scheduler.session();
        assert_eq!(session.current_asset(), Some("in.mp3"));
        assert!(session.history().is_empty());
        assert_eq!(session.wave().ys(), wave_before);
        assert_eq!(*session.parameters(), ParameterSet::default());
    }

    #[tokio::test]
    async fn test_ticks_only_while_playing() {
        let mut scheduler = scheduler(EchoRenderer);
        let sender = scheduler.sender();

        // Not playing: no tick arrives on its own
        let idle = timeout(Duration::from_millis(50), scheduler.next_event()).await;
        assert!(idle.is_err());

        sender.send(SessionEvent::PlaybackStarted);
        scheduler.step().await.unwrap();

        let event = timeout(Duration::from_secs(1), scheduler.next_event())
            .await
            .unwrap();
        assert_eq!(event, Some(SessionEvent::Tick));
    }

    #[tokio::test]
    async fn test_shutdown_ends_stepping() {
        let mut scheduler = scheduler(EchoRenderer);
        scheduler.sender().send(SessionEvent::Shutdown);
        assert!(scheduler.step().await.is_none());
    }
}
