//! Playback of rendered assets through the system audio player.
//!
//! The player runs as a child process so the editor stays responsive; the host
//! polls it to find out when playback ended on its own.

use anyhow::anyhow;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// How a player is told to start part way into an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeekFlag {
    Unsupported,
    /// Flag and seconds in one argument, `--start=12.500`
    Joined(&'static str),
    /// Flag followed by seconds, `-ss 12.500`
    Separate(&'static str),
}

/// Players tried in order when none is configured or the configured one fails.
const FALLBACK_PLAYERS: &[(&str, &[&str], SeekFlag)] = &[
    ("mpv", &["--no-video", "--really-quiet"], SeekFlag::Joined("--start=")),
    (
        "ffplay",
        &["-nodisp", "-autoexit", "-loglevel", "quiet"],
        SeekFlag::Separate("-ss"),
    ),
    ("paplay", &[], SeekFlag::Unsupported),
    ("afplay", &[], SeekFlag::Unsupported),
];

/// Result of polling the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Idle,
    Playing,
    /// The player exited on its own since the last poll
    Finished,
}

/// Plays one asset at a time.
pub struct Player {
    command: Option<String>,
    asset_base_url: Option<String>,
    child: Option<Child>,
    started_at: Option<Instant>,
    offset: Duration,
}

impl Player {
    /// `command` is a player command line; the asset location is appended to it.
    pub fn new(command: Option<String>, asset_base_url: Option<String>) -> Self {
        Self {
            command: command.filter(|c| !c.trim().is_empty()),
            asset_base_url: asset_base_url.filter(|u| !u.trim().is_empty()),
            child: None,
            started_at: None,
            offset: Duration::ZERO,
        }
    }

    /// Turns an asset reference into something a player can open.
    ///
    /// Server-relative references (`/static/...`) are joined to the base URL;
    /// anything else is passed through.
    pub fn resolve(&self, asset: &str) -> String {
        match &self.asset_base_url {
            Some(base) if asset.starts_with('/') && !asset.contains("://") => {
                format!("{}{}", base.trim_end_matches('/'), asset)
            }
            _ => asset.to_string(),
        }
    }

    /// Starts playing `asset` from the beginning, stopping whatever was playing.
    ///
    /// # Errors
    /// - If no player could be started
    pub fn play(&mut self, asset: &str) -> anyhow::Result<()> {
        self.play_from(asset, Duration::ZERO)
    }

    /// Starts playing `asset` at `from`, stopping whatever was playing.
    ///
    /// Players without a seek option start from the beginning.
    ///
    /// # Errors
    /// - If no player could be started
    pub fn play_from(&mut self, asset: &str, from: Duration) -> anyhow::Result<()> {
        self.stop();
        let location = self.resolve(asset);

        if let Some(command) = self.command.clone() {
            let mut parts = command.split_whitespace();
            if let Some(program) = parts.next() {
                let args: Vec<&str> = parts.collect();
                match spawn(program, &args, seek_flag_for(program), from, &location) {
                    Ok((child, offset)) => {
                        tracing::info!("Playing {} with {} from {:?}", location, program, offset);
                        self.started(child, offset);
                        return Ok(());
                    }
                    Err(e) => tracing::warn!("Configured player '{}' failed: {}", program, e),
                }
            }
        }

        for (program, args, seek) in FALLBACK_PLAYERS {
            if let Ok((child, offset)) = spawn(program, args, *seek, from, &location) {
                tracing::info!("Playing {} with {} from {:?}", location, program, offset);
                self.started(child, offset);
                return Ok(());
            }
        }

        Err(anyhow!(
            "No audio player found. Install mpv, ffplay or paplay, or set playback.player"
        ))
    }

    fn started(&mut self, child: Child, offset: Duration) {
        self.child = Some(child);
        self.started_at = Some(Instant::now());
        self.offset = offset;
    }

    /// Approximate position in the playing asset; `None` when idle.
    pub fn position(&self) -> Option<Duration> {
        self.child.as_ref()?;
        Some(self.offset + self.started_at?.elapsed())
    }

    /// Checks whether playback is still running.
    pub fn poll(&mut self) -> PlaybackStatus {
        let Some(child) = self.child.as_mut() else {
            return PlaybackStatus::Idle;
        };

        match child.try_wait() {
            Ok(None) => PlaybackStatus::Playing,
            Ok(Some(status)) => {
                tracing::debug!("Player exited with {}", status);
                self.clear();
                PlaybackStatus::Finished
            }
            Err(e) => {
                tracing::warn!("Failed to poll player: {}", e);
                self.clear();
                PlaybackStatus::Finished
            }
        }
    }

    /// Stops playback. No-op when idle.
    pub fn stop(&mut self) {
        let child = self.child.take();
        self.clear();
        if let Some(mut child) = child {
            if let Err(e) = child.kill() {
                tracing::debug!("Player already gone: {}", e);
            }
            let _ = child.wait();
            tracing::debug!("Playback stopped");
        }
    }

    pub fn is_playing(&self) -> bool {
        self.child.is_some()
    }

    fn clear(&mut self) {
        self.child = None;
        self.started_at = None;
        self.offset = Duration::ZERO;
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Seek flag of a known player, matched on the program's file name.
fn seek_flag_for(program: &str) -> SeekFlag {
    let name = Path::new(program)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(program);
    FALLBACK_PLAYERS
        .iter()
        .find(|(known, _, _)| *known == name)
        .map_or(SeekFlag::Unsupported, |(_, _, seek)| *seek)
}

fn seek_args(seek: SeekFlag, from: Duration) -> Vec<String> {
    if from.is_zero() {
        return Vec::new();
    }
    let seconds = format!("{:.3}", from.as_secs_f64());
    match seek {
        SeekFlag::Unsupported => Vec::new(),
        SeekFlag::Joined(flag) => vec![format!("{flag}{seconds}")],
        SeekFlag::Separate(flag) => vec![flag.to_string(), seconds],
    }
}

/// Spawns the player and returns it with the offset it actually starts at.
fn spawn(
    program: &str,
    args: &[&str],
    seek: SeekFlag,
    from: Duration,
    location: &str,
) -> std::io::Result<(Child, Duration)> {
    let seek_args = seek_args(seek, from);
    let offset = if seek_args.is_empty() {
        if !from.is_zero() {
            tracing::debug!("{} cannot seek, starting from the beginning", program);
        }
        Duration::ZERO
    } else {
        from
    };

    let child = Command::new(program)
        .args(args)
        .args(&seek_args)
        .arg(location)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok((child, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_joins_server_relative_paths() {
        let player = Player::new(None, Some("http://127.0.0.1:5000/".to_string()));
        assert_eq!(
            player.resolve("/static/audio/a.mp3"),
            "http://127.0.0.1:5000/static/audio/a.mp3"
        );
        assert_eq!(player.resolve("https://cdn/a.mp3"), "https://cdn/a.mp3");
        assert_eq!(player.resolve("local.mp3"), "local.mp3");
    }

    #[test]
    fn test_resolve_without_base_is_identity() {
        let player = Player::new(None, Some("  ".to_string()));
        assert_eq!(player.resolve("/static/audio/a.mp3"), "/static/audio/a.mp3");
    }

    #[test]
    fn test_idle_player() {
        let mut player = Player::new(None, None);
        assert_eq!(player.poll(), PlaybackStatus::Idle);
        player.stop();
        assert!(!player.is_playing());
        assert_eq!(player.position(), None);
    }

    #[test]
    fn test_seek_arguments() {
        let from = Duration::from_millis(12_500);
        assert_eq!(seek_flag_for("/usr/bin/mpv"), SeekFlag::Joined("--start="));
        assert_eq!(seek_args(seek_flag_for("mpv"), from), vec!["--start=12.500"]);
        assert_eq!(seek_args(seek_flag_for("ffplay"), from), vec!["-ss", "12.500"]);
        assert!(seek_args(seek_flag_for("paplay"), from).is_empty());
        assert!(seek_args(seek_flag_for("vlc"), from).is_empty());
        assert!(seek_args(SeekFlag::Joined("--start="), Duration::ZERO).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_configured_player_runs_to_completion() {
        let mut player = Player::new(Some("true".to_string()), None);
        player.play("a.mp3").unwrap();

        let mut status = player.poll();
        for _ in 0..200 {
            if status == PlaybackStatus::Finished {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
            status = player.poll();
        }
        assert_eq!(status, PlaybackStatus::Finished);
        assert_eq!(player.poll(), PlaybackStatus::Idle);
    }

    #[cfg(unix)]
    #[test]
    fn test_stop_kills_running_player() {
        let mut player = Player::new(Some("sleep".to_string()), None);
        // `sleep 30`: the asset argument doubles as the duration
        player.play("30").unwrap();
        assert_eq!(player.poll(), PlaybackStatus::Playing);
        assert!(player.position().is_some());

        player.stop();
        assert_eq!(player.poll(), PlaybackStatus::Idle);
        assert_eq!(player.position(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_resume_with_player_that_cannot_seek_starts_over() {
        let mut player = Player::new(Some("sleep".to_string()), None);
        player.play_from("30", Duration::from_secs(5)).unwrap();

        let position = player.position().unwrap();
        assert!(position < Duration::from_secs(5));
        player.stop();
    }
}
