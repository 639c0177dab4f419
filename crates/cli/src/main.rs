use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use audioprep_core::dataset::domain::dataset_index::DatasetIndex;
use audioprep_core::dataset::infrastructure::csv_metadata_reader::CsvMetadataReader;
use audioprep_core::media::infrastructure::npy_writer::NpyWriter;
use audioprep_core::media::infrastructure::symphonia_decoder::SymphoniaDecoder;
use audioprep_core::pipeline::pipeline_factory::build_pipelines;
use audioprep_core::pipeline::pipeline_logger::CliPipelineLogger;
use audioprep_core::pipeline::preprocess_dataset_use_case::PreprocessDatasetUseCase;
use audioprep_core::shared::config::PreprocessConfig;
use audioprep_core::shared::constants::DEFAULT_SAMPLE_RATE;

/// Preprocess and augment an audio dataset into per-partition .npy files.
///
/// Reads `sample_data/metadata.csv` and `sample_data/audio/`, splits the
/// records 67/17/16 into train/val/test and writes `processed/<partition>/`.
#[derive(Parser)]
#[command(name = "audioprep")]
struct Cli {
    /// Directory the sample_data/ and processed/ paths are relative to.
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Seed for the augmentation noise (random when omitted).
    #[arg(long)]
    seed: Option<u64>,

    /// Target sample rate in Hz.
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,
}

/// Log level used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

fn main() {
    logging(env_logger::Env::default()).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let mut index = DatasetIndex::new(
        &config.data_dir,
        &config.metadata_path,
        Box::new(CsvMetadataReader),
    );
    index.load_metadata()?;
    let split = index.split(&config.split_ratios, Some(config.split_seed));
    log::info!(
        "Samples → train={}, val={}, test={}",
        split.train.len(),
        split.validation.len(),
        split.test.len()
    );

    let pipelines = build_pipelines(&config)?;
    let use_case = PreprocessDatasetUseCase::new(
        Arc::new(SymphoniaDecoder),
        Box::new(NpyWriter),
        Box::new(pipelines.preprocess),
        Box::new(pipelines.augment),
        pipelines.finalize,
        config.sample_rate,
    );

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut logger = CliPipelineLogger::default();
    use_case.execute(&split, &config.output_dir, &mut rng, &mut logger)?;

    log::info!("Output written to {}", config.output_dir.display());
    Ok(())
}

fn logging(env: env_logger::Env<'_>) -> env_logger::Builder {
    env_logger::Builder::from_env(env.default_filter_or(DEFAULT_LOG_FILTER))
}

fn build_config(cli: &Cli) -> Result<PreprocessConfig, Box<dyn std::error::Error>> {
    if cli.sample_rate == 0 {
        return Err("Sample rate must be positive".into());
    }
    let mut config = PreprocessConfig {
        sample_rate: cli.sample_rate,
        ..PreprocessConfig::default()
    };
    if let Some(base) = &cli.base_dir {
        if !base.is_dir() {
            return Err(format!("Base directory not found: {}", base.display()).into());
        }
        config = config.with_base_dir(base);
    }
    Ok(config)
}
