//! Interactive envelope editor.
//!
//! Loads the configuration, wires the session to the HTTP renderer and the
//! system audio player, and runs the terminal editor until the user quits.

use std::time::Duration;

use crate::config::WavesculptConfig;
use crate::playback::Player;
use crate::renderer::HttpRenderer;
use crate::session::{EditorSession, Scheduler, SessionEvent};
use crate::ui::{EditorUi, ErrorScreen};

/// Runs the editor.
///
/// `audio` is loaded as the current asset; `seed` fixes the random source.
///
/// # Errors
/// - If the configuration is invalid
/// - If the terminal cannot be set up
/// - If the editor loop fails
pub async fn handle_edit(audio: Option<String>, seed: Option<u64>) -> Result<(), anyhow::Error> {
    tracing::info!("=== wavesculpt editor started ===");

    let loaded = WavesculptConfig::load()
        .and_then(|config| config.session_settings(seed).map(|settings| (config, settings)));
    let (config, settings) = match loaded {
        Ok(loaded) => loaded,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            let error_message = format!(
                "Configuration Error:\n\n{err}\n\nPlease check ~/.config/wavesculpt/wavesculpt.toml and try again."
            );
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&error_message)?;
            error_screen.cleanup()?;
            return Err(anyhow::anyhow!("Configuration error: {err}"));
        }
    };

    let renderer = HttpRenderer::new(config.renderer.endpoint.clone(), config.renderer.timeout())?;
    tracing::info!(
        "Configuration loaded: renderer={}, policy={}, points={}, bars={}",
        renderer.endpoint(),
        config.renderer.policy,
        settings.geometry.sample_count(),
        settings.bar_count
    );
    let session = EditorSession::new(settings);
    let tick = Duration::from_millis(config.visualizer.tick_ms);
    let mut scheduler = Scheduler::new(session, renderer, tick);
    let mut player = Player::new(
        config.playback.player.clone(),
        Some(config.renderer.asset_base_url.clone()),
    );

    if let Some(asset) = audio {
        scheduler.sender().send(SessionEvent::LoadAsset(asset));
    }

    let mut ui = EditorUi::new().map_err(|e| anyhow::anyhow!("Failed to initialize UI: {e}"))?;
    let result = ui.run(&mut scheduler, &mut player).await;
    ui.cleanup()?;

    if let Err(e) = result {
        tracing::error!("Editor failed: {e}");
        let mut error_screen = ErrorScreen::new()?;
        error_screen.show_error(&format!("Editor Error:\n\n{e}"))?;
        error_screen.cleanup()?;
        return Err(e);
    }

    let history = scheduler.session().history();
    tracing::info!("Editor closed with {} rendered version(s)", history.len());
    Ok(())
}
