//! Editing session: the single owner of all editor state.
//!
//! Hosts feed [`SessionEvent`]s in one at a time and carry out the
//! [`SessionCommand`]s that come back. The session never performs I/O itself;
//! rendering, playback and notification display are the host's job.

pub mod scheduler;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap};

use crate::drag::{hit_test, DragController, DragOutcome, Pointer, SurfaceRect};
use crate::history::ParameterHistory;
use crate::params::{EffectType, EmotionPreset, HexColor, Parameter, ParameterSet, VoicePreset};
use crate::renderer::{RenderPolicy, RenderRequest, RendererError, RequestId};
use crate::visualizer::{TickOutcome, Visualizer, DEFAULT_BAR_COUNT};
use crate::wave::{
    generate, handle_positions, DrawablePath, Emotion, PathPoint, Wave, WaveGeometry, WaveShape,
    HANDLE_RADIUS,
};

pub use scheduler::{EventSender, Scheduler};

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Danger,
}

/// A message for the host to show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Inputs to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Pointer pressed on the surface; starts a drag when it hits a handle
    PointerDown { pointer: Pointer, surface: SurfaceRect },
    /// Pointer moved; only meaningful while dragging
    PointerMove { pointer: Pointer, surface: SurfaceRect },
    /// Pointer released anywhere
    PointerUp,
    /// Press on a specific handle, for hosts that attach one per point
    HandlePressed(usize),
    /// Visualizer tick
    Tick,
    /// The transport started playing
    PlaybackStarted,
    /// The transport paused
    PlaybackPaused,
    /// The transport reached the end of the asset
    PlaybackEnded,
    /// Play or pause the current asset
    TogglePlayback,
    /// Stop playback
    StopPlayback,
    /// Load an asset as the current one
    LoadAsset(String),
    /// Draw a new random wave
    GenerateRandom,
    /// Apply an emotion preset and draw its wave
    ApplyEmotion(Emotion),
    /// Apply a voice preset
    ApplyVoicePreset(VoicePreset),
    /// Restore default parameters and draw a new random wave
    Reset,
    /// Set a parameter value (clamped)
    SetParameter { parameter: Parameter, value: f64 },
    /// Move a parameter by whole steps
    NudgeParameter { parameter: Parameter, steps: i32 },
    SetEffect(EffectType),
    CycleEffect,
    /// Send the current parameters to the renderer
    Apply,
    /// A render request finished
    RenderCompleted {
        request_id: RequestId,
        result: Result<String, RendererError>,
    },
    /// Restore and play a history entry
    ReplayHistory(usize),
    /// Stop dispatching; the scheduler hands back no more events after this
    Shutdown,
}

/// Side effects requested by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Play `asset` from the start, replacing anything playing
    StartPlayback { asset: String },
    /// Swap the playing asset for `asset`, keeping the playback position
    ResumePlayback { asset: String },
    StopPlayback,
    SubmitRender {
        request_id: RequestId,
        request: RenderRequest,
    },
    Notify(Notification),
    /// Display state changed
    Redraw,
}

/// Construction settings for a session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub geometry: WaveGeometry,
    pub bar_count: usize,
    pub history_capacity: usize,
    pub policy: RenderPolicy,
    /// Fixed random seed; entropy-seeded when absent
    pub seed: Option<u64>,
    /// Per-emotion overrides of the built-in presets
    pub emotions: HashMap<Emotion, EmotionPreset>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            geometry: WaveGeometry::default(),
            bar_count: DEFAULT_BAR_COUNT,
            history_capacity: crate::history::DEFAULT_CAPACITY,
            policy: RenderPolicy::default(),
            seed: None,
            emotions: HashMap::new(),
        }
    }
}

/// All editor state for one user session.
pub struct EditorSession {
    wave: Wave,
    drag: DragController,
    visualizer: Visualizer,
    history: ParameterHistory,
    parameters: ParameterSet,
    current_asset: Option<String>,
    stroke_color: HexColor,
    rng: SmallRng,
    policy: RenderPolicy,
    /// In-flight requests and the parameters they were submitted with
    pending: BTreeMap<RequestId, ParameterSet>,
    next_request: u64,
    emotions: HashMap<Emotion, EmotionPreset>,
}

impl EditorSession {
    /// Creates a session with a random initial wave.
    pub fn new(settings: SessionSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let mut session = Self {
            wave: Wave::new(settings.geometry),
            drag: DragController::new(),
            visualizer: Visualizer::new(settings.bar_count),
            history: ParameterHistory::new(settings.history_capacity),
            parameters: ParameterSet::default(),
            current_asset: None,
            stroke_color: HexColor::default(),
            rng,
            policy: settings.policy,
            pending: BTreeMap::new(),
            next_request: 1,
            emotions: settings.emotions,
        };
        session.generate_shape(WaveShape::Random);

        tracing::info!(
            "Session created: {} points, {} bars, policy {}",
            session.wave.len(),
            session.visualizer.bar_count(),
            session.policy
        );
        session
    }

    pub fn wave(&self) -> &Wave {
        &self.wave
    }

    /// Smooth curve through the current control points.
    pub fn path(&self) -> DrawablePath {
        DrawablePath::from_wave(&self.wave)
    }

    /// Drag handle centres, one per control point.
    pub fn handles(&self) -> Vec<PathPoint> {
        handle_positions(&self.wave)
    }

    pub fn bars(&self) -> &[f64] {
        self.visualizer.bars()
    }

    pub fn history(&self) -> &ParameterHistory {
        &self.history
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn current_asset(&self) -> Option<&str> {
        self.current_asset.as_deref()
    }

    pub fn stroke_color(&self) -> HexColor {
        self.stroke_color
    }

    pub fn is_playing(&self) -> bool {
        self.visualizer.is_playing()
    }

    pub fn active_point(&self) -> Option<usize> {
        self.drag.active_point()
    }

    /// Number of render requests still in flight.
    pub fn pending_renders(&self) -> usize {
        self.pending.len()
    }

    /// Host setter for the playing flag.
    pub fn set_playing(&mut self, playing: bool) {
        self.visualizer.set_playing(playing, &self.wave);
    }

    /// Base values for an emotion, honouring configured overrides.
    pub fn emotion_preset(&self, emotion: Emotion) -> EmotionPreset {
        self.emotions
            .get(&emotion)
            .cloned()
            .unwrap_or_else(|| EmotionPreset::builtin(emotion))
    }

    /// Applies one event to completion.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<SessionCommand> {
        match event {
            SessionEvent::PointerDown { pointer, surface } => {
                match hit_test(pointer, &surface, &self.wave, HANDLE_RADIUS) {
                    Some(index) => self.begin_drag(index),
                    None => Vec::new(),
                }
            }
            SessionEvent::HandlePressed(index) => self.begin_drag(index),
            SessionEvent::PointerMove { pointer, surface } => self.drag_move(pointer, &surface),
            SessionEvent::PointerUp => match self.drag.end() {
                Some(_) => vec![SessionCommand::Redraw],
                None => Vec::new(),
            },
            SessionEvent::Tick => match self.visualizer.tick(&self.wave) {
                TickOutcome::Reschedule => vec![SessionCommand::Redraw],
                TickOutcome::Stopped => Vec::new(),
            },
            SessionEvent::PlaybackStarted => {
                self.set_playing(true);
                vec![SessionCommand::Redraw]
            }
            SessionEvent::PlaybackPaused | SessionEvent::PlaybackEnded => {
                self.set_playing(false);
                vec![SessionCommand::Redraw]
            }
            SessionEvent::TogglePlayback => self.toggle_playback(),
            SessionEvent::StopPlayback => {
                self.visualizer.stop();
                vec![SessionCommand::StopPlayback, SessionCommand::Redraw]
            }
            SessionEvent::LoadAsset(asset) => {
                tracing::info!("Loaded asset {}", asset);
                self.current_asset = Some(asset);
                vec![
                    notify(
                        NotificationLevel::Info,
                        "Audio loaded. Use the controls to modify and play.",
                    ),
                    SessionCommand::Redraw,
                ]
            }
            SessionEvent::GenerateRandom => {
                self.stroke_color = HexColor::default();
                self.generate_shape(WaveShape::Random);
                vec![SessionCommand::Redraw]
            }
            SessionEvent::ApplyEmotion(emotion) => {
                let preset = self.emotion_preset(emotion);
                let shape = preset.apply(emotion, &mut self.parameters);
                self.stroke_color = preset.stroke_color();
                self.generate_shape(shape);
                vec![
                    notify(
                        NotificationLevel::Info,
                        format!("Applied \"{emotion}\" emotion preset"),
                    ),
                    SessionCommand::Redraw,
                ]
            }
            SessionEvent::ApplyVoicePreset(preset) => {
                preset.apply(&mut self.parameters);
                vec![
                    notify(NotificationLevel::Info, format!("Applied \"{preset}\" preset")),
                    SessionCommand::Redraw,
                ]
            }
            SessionEvent::Reset => {
                self.parameters = ParameterSet::default();
                self.stroke_color = HexColor::default();
                self.generate_shape(WaveShape::Random);
                vec![
                    notify(NotificationLevel::Info, "Settings reset to default."),
                    SessionCommand::Redraw,
                ]
            }
            SessionEvent::SetParameter { parameter, value } => {
                self.parameters.set(parameter, value);
                vec![SessionCommand::Redraw]
            }
            SessionEvent::NudgeParameter { parameter, steps } => {
                self.parameters.nudge(parameter, steps);
                vec![SessionCommand::Redraw]
            }
            SessionEvent::SetEffect(effect) => self.select_effect(effect),
            SessionEvent::CycleEffect => self.select_effect(self.parameters.effect_type.next()),
            SessionEvent::Apply => self.apply(),
            SessionEvent::RenderCompleted { request_id, result } => {
                self.complete_render(request_id, result)
            }
            SessionEvent::ReplayHistory(index) => self.replay(index),
            SessionEvent::Shutdown => {
                self.drag.end();
                self.visualizer.stop();
                Vec::new()
            }
        }
    }

    fn generate_shape(&mut self, shape: WaveShape) {
        if let Err(e) = generate(&shape, &mut self.wave, &mut self.rng) {
            tracing::error!("Wave generation failed: {}", e);
            return;
        }
        self.visualizer.resample(&self.wave);
    }

    fn begin_drag(&mut self, index: usize) -> Vec<SessionCommand> {
        match self.drag.begin(index, &self.wave) {
            Ok(DragOutcome::Started) => vec![SessionCommand::Redraw],
            Ok(DragOutcome::Ignored) => Vec::new(),
            Err(e) => {
                tracing::warn!("{}", e);
                Vec::new()
            }
        }
    }

    fn drag_move(&mut self, pointer: Pointer, surface: &SurfaceRect) -> Vec<SessionCommand> {
        match self.drag.move_to(pointer, surface, &mut self.wave) {
            Ok(Some(moved)) => {
                tracing::trace!("Point {} moved to {}", moved.point_index, moved.stored_y);
                self.visualizer.resample(&self.wave);
                vec![SessionCommand::Redraw]
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::error!("Drag move rejected: {}", e);
                self.drag.end();
                Vec::new()
            }
        }
    }

    fn toggle_playback(&mut self) -> Vec<SessionCommand> {
        if self.visualizer.is_playing() {
            return vec![SessionCommand::StopPlayback];
        }
        match &self.current_asset {
            Some(asset) => vec![SessionCommand::StartPlayback {
                asset: asset.clone(),
            }],
            None => vec![notify(
                NotificationLevel::Warning,
                "No audio loaded. Load an asset before playing.",
            )],
        }
    }

    fn select_effect(&mut self, effect: EffectType) -> Vec<SessionCommand> {
        self.parameters.effect_type = effect;
        vec![
            notify(NotificationLevel::Info, format!("Selected \"{effect}\" effect")),
            SessionCommand::Redraw,
        ]
    }

    fn apply(&mut self) -> Vec<SessionCommand> {
        let Some(asset) = self.current_asset.clone() else {
            return vec![notify(
                NotificationLevel::Warning,
                "No audio file selected. Generate speech with `wavesculpt speak` or pass --audio.",
            )];
        };

        if self.policy == RenderPolicy::Reject && !self.pending.is_empty() {
            tracing::debug!("Apply refused: {} render(s) pending", self.pending.len());
            return vec![notify(
                NotificationLevel::Warning,
                "Still processing the previous request. Please wait.",
            )];
        }

        let request_id = RequestId(self.next_request);
        self.next_request += 1;
        self.pending.insert(request_id, self.parameters);
        tracing::info!("Submitting render {} for {}", request_id, asset);

        vec![
            notify(NotificationLevel::Info, "Processing audio..."),
            SessionCommand::SubmitRender {
                request_id,
                request: RenderRequest {
                    audio_path: asset,
                    parameters: self.parameters,
                },
            },
        ]
    }

    fn complete_render(
        &mut self,
        request_id: RequestId,
        result: Result<String, RendererError>,
    ) -> Vec<SessionCommand> {
        let Some(submitted) = self.pending.remove(&request_id) else {
            tracing::warn!("Ignoring completion for unknown render {}", request_id);
            return Vec::new();
        };

        match result {
            Ok(asset) => {
                tracing::info!("Render {} completed: {}", request_id, asset);
                self.history.record(asset.clone(), submitted);
                self.current_asset = Some(asset.clone());

                let mut commands = Vec::new();
                if self.visualizer.is_playing() {
                    commands.push(SessionCommand::ResumePlayback { asset });
                }
                commands.push(notify(
                    NotificationLevel::Success,
                    "Audio processed successfully!",
                ));
                commands.push(SessionCommand::Redraw);
                commands
            }
            Err(e) => {
                tracing::error!("Render {} failed: {}", request_id, e);
                let message = match e {
                    RendererError::RequestFailed(msg) => format!("Error: {msg}"),
                    other => format!("Failed to process audio. {other}"),
                };
                vec![notify(NotificationLevel::Danger, message), SessionCommand::Redraw]
            }
        }
    }

    fn replay(&mut self, index: usize) -> Vec<SessionCommand> {
        let entry = match self.history.replay(index) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("{}", e);
                return Vec::new();
            }
        };

        let asset = entry.asset_reference().to_string();
        self.parameters = *entry.parameters();
        self.current_asset = Some(asset.clone());
        tracing::info!("Replaying history entry {} ({})", index, asset);

        vec![SessionCommand::StartPlayback { asset }, SessionCommand::Redraw]
    }
}

fn notify(level: NotificationLevel, message: impl Into<String>) -> SessionCommand {
    SessionCommand::Notify(Notification::new(level, message))
}
