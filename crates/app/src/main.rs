use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use harmonic_exchange_core::{
    ConverterConfig, Dimensionality, ExchangeError, HarmonicConverter, HarmonicLayout,
    Normalization, Numbering, Preset,
};
use tracing_subscriber::EnvFilter;

fn main() -> harmonic_exchange_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Layout {
            dimensionality,
            order,
        } => run_layout(dimensionality, order),
        Commands::Convert {
            input,
            output,
            options,
        } => run_convert(&input, &output, &options),
    }
}

fn run_layout(dimensionality: Dimensionality, order: usize) -> harmonic_exchange_core::Result<()> {
    tracing::info!(%dimensionality, order, "describing layout");

    let layout = HarmonicLayout::new(order, dimensionality)?;
    println!(
        "{dimensionality} order {order}: {} channels",
        layout.channel_count()
    );
    for (degree, span) in layout.degrees() {
        println!("  degree {degree}: channels {}..{}", span.start, span.end);
    }
    Ok(())
}

fn run_convert(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> harmonic_exchange_core::Result<()> {
    let config = options.resolve()?;
    tracing::info!(
        ?input,
        ?output,
        dimensionality = %config.dimensionality,
        order = config.order,
        numbering = %config.numbering,
        normalization = %config.normalization,
        preset = ?config.preset,
        "converting frames"
    );

    let text = std::fs::read_to_string(input)?;
    let converted = convert_frames_json(&config, &text)?;
    std::fs::write(output, converted)?;
    Ok(())
}

/// Converts a JSON array of frames and returns the converted array as JSON.
fn convert_frames_json(
    config: &ConverterConfig,
    json: &str,
) -> harmonic_exchange_core::Result<String> {
    let converter = config.build()?;
    let channels = converter.channel_count();
    let frames: Vec<Vec<f32>> = serde_json::from_str(json)?;

    if let Some((index, frame)) = frames
        .iter()
        .enumerate()
        .find(|(_, frame)| frame.len() != channels)
    {
        return Err(ExchangeError::msg(format!(
            "frame {index} has {} samples, expected {channels}",
            frame.len()
        )));
    }

    let mut samples: Vec<f32> = frames.into_iter().flatten().collect();
    converter.process_frames_in_place(&mut samples)?;
    tracing::debug!(frames = samples.len() / channels, "converted frames");

    let converted: Vec<&[f32]> = samples.chunks(channels).collect();
    Ok(serde_json::to_string(&converted)?)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Ambisonic channel convention converter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the channel count and per-degree channel spans of a layout.
    Layout {
        /// `planar` (2d) or `spherical` (3d).
        #[arg(short, long, default_value = "spherical")]
        dimensionality: Dimensionality,
        /// Decomposition order.
        #[arg(short, long)]
        order: usize,
    },
    /// Convert a JSON array of harmonic frames between conventions.
    Convert {
        /// JSON file holding an array of frames.
        input: PathBuf,
        /// Output path for the converted frames.
        output: PathBuf,
        #[command(flatten)]
        options: ConvertOptions,
    },
}

#[derive(Args, Debug, Default)]
struct ConvertOptions {
    /// JSON converter configuration. Flags below override its fields.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    dimensionality: Option<Dimensionality>,
    #[arg(short, long)]
    order: Option<usize>,
    /// acn, from-furse-malham, from-sid, to-furse-malham or to-sid.
    #[arg(long)]
    numbering: Option<Numbering>,
    /// semi, from-full, from-maxn, to-full or to-maxn.
    #[arg(long)]
    normalization: Option<Normalization>,
    /// from-b-format or to-b-format.
    #[arg(long)]
    preset: Option<Preset>,
}

impl ConvertOptions {
    fn resolve(&self) -> harmonic_exchange_core::Result<ConverterConfig> {
        let mut config = match &self.config {
            Some(path) => ConverterConfig::load(path)?,
            None => ConverterConfig::default(),
        };

        if let Some(dimensionality) = self.dimensionality {
            config.dimensionality = dimensionality;
        }
        if let Some(order) = self.order {
            config.order = order;
        }
        if let Some(numbering) = self.numbering {
            config.numbering = numbering;
        }
        if let Some(normalization) = self.normalization {
            config.normalization = normalization;
        }
        if self.preset.is_some() {
            config.preset = self.preset;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_convert_flags() {
        let cli = Cli::try_parse_from([
            "harmonic-exchange",
            "convert",
            "in.json",
            "out.json",
            "--dimensionality",
            "2d",
            "--order",
            "3",
            "--numbering",
            "from-fuma",
        ])
        .unwrap();

        let Commands::Convert { options, .. } = cli.command else {
            panic!("expected convert command");
        };
        let config = options.resolve().unwrap();
        assert_eq!(config.dimensionality, Dimensionality::Planar);
        assert_eq!(config.order, 3);
        assert_eq!(config.numbering, Numbering::FromFurseMalham);
        assert_eq!(config.normalization, Normalization::Semi);
    }

    #[test]
    fn rejects_unknown_modes() {
        let result = Cli::try_parse_from([
            "harmonic-exchange",
            "convert",
            "in.json",
            "out.json",
            "--numbering",
            "bogus",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn converts_json_frames() {
        let config = ConverterConfig {
            dimensionality: Dimensionality::Planar,
            order: 1,
            numbering: Numbering::FromFurseMalham,
            ..ConverterConfig::default()
        };

        let json = convert_frames_json(&config, "[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]").unwrap();
        let frames: Vec<Vec<f32>> = serde_json::from_str(&json).unwrap();
        assert_eq!(frames, vec![vec![1.0, 3.0, 2.0], vec![4.0, 6.0, 5.0]]);
    }

    #[test]
    fn rejects_frames_of_the_wrong_width() {
        let config = ConverterConfig::default();
        let err = convert_frames_json(&config, "[[1.0, 0.0, 0.0, 0.0], [1.0]]").unwrap_err();
        assert!(format!("{err}").contains("frame 1"));
    }

    #[test]
    fn huge_orders_are_reported_not_panicked() {
        assert!(matches!(
            run_layout(Dimensionality::Spherical, usize::MAX),
            Err(ExchangeError::InvalidOrder { .. })
        ));

        let config = ConverterConfig {
            order: usize::MAX,
            ..ConverterConfig::default()
        };
        assert!(matches!(
            convert_frames_json(&config, "[]"),
            Err(ExchangeError::InvalidOrder { .. })
        ));
    }

    #[test]
    fn empty_frame_list_converts_to_empty_list() {
        let json = convert_frames_json(&ConverterConfig::default(), "[]").unwrap();
        assert_eq!(json, "[]");
    }
}
