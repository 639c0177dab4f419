use crate::audio::domain::transform::{Transform, TransformError};
use crate::audio::infrastructure::add_noise::AddNoise;
use crate::audio::infrastructure::normalize::Normalize;
use crate::audio::infrastructure::pitch_shift::PitchShift;
use crate::audio::infrastructure::silence_trim::SilenceTrim;
use crate::audio::infrastructure::time_stretch::TimeStretch;
use crate::pipeline::transform_pipeline::TransformPipeline;
use crate::shared::config::PreprocessConfig;

/// The three stages every file goes through.
pub struct Pipelines {
    pub preprocess: TransformPipeline,
    pub augment: TransformPipeline,
    pub finalize: Box<dyn Transform>,
}

/// Builds `[SilenceTrim, Normalize]`, `[AddNoise, TimeStretch, PitchShift]`
/// and a final `Normalize` from the configured parameters.
pub fn build_pipelines(config: &PreprocessConfig) -> Result<Pipelines, TransformError> {
    let preprocess = TransformPipeline::new(
        "preprocess",
        vec![
            Box::new(SilenceTrim::new(config.top_db)?),
            Box::new(Normalize::new()),
        ],
    );
    let augment = TransformPipeline::new(
        "augment",
        vec![
            Box::new(AddNoise::new(config.noise_level)?),
            Box::new(TimeStretch::new(config.stretch_rate)?),
            Box::new(PitchShift::new(config.pitch_steps)?),
        ],
    );
    Ok(Pipelines {
        preprocess,
        augment,
        finalize: Box::new(Normalize::new()),
    })
}
