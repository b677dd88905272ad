//! Application orchestration and command routing.
//!
//! Parses the command line and delegates to the command handlers.

use crate::commands::{self, GenerateOptions, OutputFormat, SpeakOptions};
use crate::logging;
use crate::renderer::SpeechFormat;
use crate::wave::Emotion;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process;

/// A terminal sound-envelope sculptor with live bar preview
#[derive(Parser, Debug)]
#[command(name = "wavesculpt")]
#[command(version)]
#[command(about = "Sculpt a sound envelope in the terminal and send it to an audio renderer")]
#[command(long_about = "Sculpt a sound envelope in the terminal and send it to an audio renderer.\n\nDEFAULT COMMAND:\n    If no command is specified, 'edit' is used by default.\n\nEXAMPLES:\n    # Open the editor on a rendered asset\n    $ wavesculpt --audio /static/audio/speech.mp3\n\n    # Speak a sentence and sculpt it\n    $ wavesculpt speak \"Good morning\" --emotion happy\n\n    # Print an angry wave as SVG\n    $ wavesculpt generate --emotion angry > angry.svg\n\n    # Reproducible JSON output\n    $ wavesculpt generate --seed 7 --format json\n\n    # Edit configuration file\n    $ wavesculpt config")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/wavesculpt/wavesculpt.toml\n    Logs:               ~/.local/state/wavesculpt/wavesculpt.log.*"
)]
struct Cli {
    /// Asset to load into the editor (edit default command)
    #[arg(short, long, value_name = "ASSET", global = true)]
    audio: Option<String>,

    /// Random seed for reproducible waves
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the envelope editor (default)
    ///
    /// Drag the handles with the mouse, pick emotion (1-9) and voice (F1-F6)
    /// presets, press Enter to render and Space to play.
    #[command(visible_alias = "e")]
    Edit {
        /// Asset to load
        #[arg(short, long, value_name = "ASSET")]
        audio: Option<String>,

        /// Random seed for reproducible waves
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Print a generated wave
    ///
    /// Without --emotion a random wave is generated.
    ///
    /// Examples:
    ///   wavesculpt generate --emotion happy
    ///   wavesculpt generate --emotion angry --emphasis 3 --format json
    #[command(visible_alias = "g")]
    Generate {
        /// Emotion preset (neutral, happy, sad, angry, excited, calm, fearful, whisper, shouting)
        #[arg(short, long)]
        emotion: Option<Emotion>,

        /// Override the preset's variability
        #[arg(long)]
        variability: Option<f64>,

        /// Override the preset's emphasis
        #[arg(long)]
        emphasis: Option<f64>,

        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Svg)]
        format: OutputFormat,
    },

    /// Generate speech and open it in the editor
    ///
    /// Unset options come from the [speech] config section.
    ///
    /// Examples:
    ///   wavesculpt speak "Good morning" --emotion happy
    ///   wavesculpt speak "Vanakkam" --language ta --print
    ///   wavesculpt speak --list
    #[command(visible_alias = "s")]
    Speak {
        /// Text to speak (up to 400 words and 800 characters)
        #[arg(required_unless_present = "list")]
        text: Option<String>,

        /// Language code (en, hi, bn, ta, te, ml)
        #[arg(short, long)]
        language: Option<String>,

        /// Emotion of the delivery
        #[arg(short, long)]
        emotion: Option<Emotion>,

        /// Audio format (mp3 or wav)
        #[arg(short, long)]
        format: Option<SpeechFormat>,

        /// List the server's languages and emotions
        #[arg(long)]
        list: bool,

        /// Print the asset path instead of opening the editor
        #[arg(short, long)]
        print: bool,
    },

    /// Open configuration file in your preferred editor
    ///
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// Show recent log entries from the application
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   wavesculpt completions bash > wavesculpt.bash
    ///   wavesculpt completions zsh > _wavesculpt
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Commands that don't need logging
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "wavesculpt", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    logging::init_logging()?;

    match cli.command {
        None => commands::handle_edit(cli.audio, cli.seed).await?,
        Some(Commands::Edit { audio, seed }) => {
            // Explicit subcommand options take precedence over the global ones
            commands::handle_edit(audio.or(cli.audio), seed.or(cli.seed)).await?;
        }
        Some(Commands::Generate {
            emotion,
            variability,
            emphasis,
            seed,
            format,
        }) => {
            commands::handle_generate(GenerateOptions {
                emotion,
                variability,
                emphasis,
                seed: seed.or(cli.seed),
                format,
            })?;
        }
        Some(Commands::Speak {
            text,
            language,
            emotion,
            format,
            list,
            print,
        }) => {
            commands::handle_speak(SpeakOptions {
                text,
                language,
                emotion,
                format,
                list,
                print,
                seed: cli.seed,
            })
            .await?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
