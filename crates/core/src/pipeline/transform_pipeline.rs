use rand::RngCore;

use crate::audio::domain::signal::Signal;
use crate::audio::domain::transform::{Transform, TransformError};

/// Ordered composition of transforms.
///
/// `run` threads the output of each step into the next. Steps are fixed at
/// construction and the pipeline keeps no state between runs. A pipeline is
/// itself a [`Transform`], so pipelines nest.
pub struct TransformPipeline {
    name: String,
    steps: Vec<Box<dyn Transform>>,
}

impl TransformPipeline {
    pub fn new(name: impl Into<String>, steps: Vec<Box<dyn Transform>>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Applies every step in order. An empty pipeline returns a copy of the
    /// input. Fails if any step changes the sample rate.
    pub fn run(&self, signal: &Signal, rng: &mut dyn RngCore) -> Result<Signal, TransformError> {
        let expected = signal.sample_rate();
        let mut current = signal.clone();
        for step in &self.steps {
            let next = step.apply(&current, rng)?;
            if next.sample_rate() != expected {
                return Err(TransformError::SampleRateChanged {
                    transform: step.name().to_string(),
                    expected,
                    actual: next.sample_rate(),
                });
            }
            log::debug!(
                "{}: {} -> {} frames after {}",
                self.name,
                current.len(),
                next.len(),
                step.name()
            );
            current = next;
        }
        Ok(current)
    }
}

impl Transform for TransformPipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, signal: &Signal, rng: &mut dyn RngCore) -> Result<Signal, TransformError> {
        self.run(signal, rng)
    }
}
