//! Headless wave generation.
//!
//! Generates one wave the same way the editor's preset buttons do and prints it
//! as an SVG document or as JSON, for scripting and quick inspection.

use clap::ValueEnum;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::config::WavesculptConfig;
use crate::params::{EmotionPreset, HexColor, ParameterSet};
use crate::wave::{generate, DrawablePath, Emotion, PathStyle, Wave, WaveShape};

/// Output format of `generate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Standalone SVG document
    #[default]
    Svg,
    /// Control points, path data and parameters as JSON
    Json,
}

/// What to generate.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub emotion: Option<Emotion>,
    pub variability: Option<f64>,
    pub emphasis: Option<f64>,
    pub seed: Option<u64>,
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct GeneratedWave<'a> {
    shape: String,
    color: String,
    points: Vec<[f64; 2]>,
    path: String,
    parameters: &'a ParameterSet,
}

/// Generates a wave and prints it to stdout.
///
/// # Errors
/// - If the configuration cannot be loaded or is invalid
/// - If JSON serialization fails
pub fn handle_generate(options: GenerateOptions) -> Result<(), anyhow::Error> {
    let config = WavesculptConfig::load()?;
    let output = generate_output(&config, &options)?;
    println!("{output}");
    Ok(())
}

/// Builds the printed output for `options`.
///
/// # Errors
/// - If the configured geometry is invalid
/// - If JSON serialization fails
pub fn generate_output(
    config: &WavesculptConfig,
    options: &GenerateOptions,
) -> Result<String, anyhow::Error> {
    let mut wave = Wave::new(config.geometry()?);
    let mut rng = match options.seed.or(config.wave.seed) {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    let mut parameters = ParameterSet::default();
    let (shape, color) = match options.emotion {
        Some(emotion) => {
            let preset = config
                .emotion_overrides()
                .remove(&emotion)
                .unwrap_or_else(|| EmotionPreset::builtin(emotion));
            let preset = EmotionPreset {
                variability: options.variability.unwrap_or(preset.variability),
                emphasis: options.emphasis.unwrap_or(preset.emphasis),
                ..preset
            };
            let shape = preset.apply(emotion, &mut parameters);
            (shape, preset.stroke_color())
        }
        None => (WaveShape::Random, HexColor::default()),
    };

    generate(&shape, &mut wave, &mut rng)?;
    let path = DrawablePath::from_wave(&wave);
    let shape_name = options
        .emotion
        .map_or_else(|| "random".to_string(), |e| e.to_string());
    tracing::info!("Generated {} wave with {} points", shape_name, wave.len());

    match options.format {
        OutputFormat::Svg => Ok(to_svg(&wave, &path, color)),
        OutputFormat::Json => {
            let generated = GeneratedWave {
                shape: shape_name,
                color: color.to_string(),
                points: wave.points().iter().map(|p| [p.x(), p.y()]).collect(),
                path: path.to_svg_path(),
                parameters: &parameters,
            };
            Ok(serde_json::to_string_pretty(&generated)?)
        }
    }
}

fn to_svg(wave: &Wave, path: &DrawablePath, color: HexColor) -> String {
    let geometry = wave.geometry();
    let data = path.to_svg_path();
    format!(
        concat!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {w} {h}\" width=\"{w}\" height=\"{h}\">\n",
            "  <path d=\"{d}\" fill=\"none\" stroke=\"{bg}\" stroke-width=\"8\"/>\n",
            "  <path d=\"{d}\" fill=\"none\" stroke=\"{fg}\" stroke-width=\"3\"/>\n",
            "</svg>"
        ),
        w = geometry.width(),
        h = geometry.height(),
        d = data,
        bg = color.to_rgba(PathStyle::Background.opacity()),
        fg = color,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn options(emotion: Option<Emotion>, format: OutputFormat) -> GenerateOptions {
        GenerateOptions {
            emotion,
            seed: Some(42),
            format,
            ..GenerateOptions::default()
        }
    }

    #[test]
    fn test_svg_output() {
        let config = WavesculptConfig::default();
        let svg = generate_output(&config, &options(Some(Emotion::Happy), OutputFormat::Svg)).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("viewBox=\"0 0 1000 200\""));
        assert!(svg.contains("stroke=\"#ffc107\""));
        assert!(svg.contains("rgba(255, 193, 7, 0.2)"));
        assert!(svg.contains("d=\"M 0 100 C "));
    }

    #[test]
    fn test_json_output_is_seeded() {
        let config = WavesculptConfig::default();
        let opts = options(None, OutputFormat::Json);
        let first = generate_output(&config, &opts).unwrap();
        let second = generate_output(&config, &opts).unwrap();
        assert_eq!(first, second);

        let json: serde_json::Value = serde_json::from_str(&first).unwrap();
        assert_eq!(json["shape"], "random");
        assert_eq!(json["points"].as_array().unwrap().len(), 40);
        assert_eq!(json["points"][0][1], 100.0);
        assert_eq!(json["parameters"]["speed"], 1.0);
    }

    #[test]
    fn test_modifiers_override_preset() {
        let config = WavesculptConfig::default();
        let calm = GenerateOptions {
            variability: Some(0.0),
            ..options(Some(Emotion::Calm), OutputFormat::Json)
        };
        let json: serde_json::Value =
            serde_json::from_str(&generate_output(&config, &calm).unwrap()).unwrap();

        // calm with v = 0: 100 + sin(0.2)·20
        let y1 = json["points"][1][1].as_f64().unwrap();
        assert!((y1 - (100.0 + (0.2f64).sin() * 20.0)).abs() < 1e-9);
        assert_eq!(json["parameters"]["effect_type"], "reverb");
    }
}
