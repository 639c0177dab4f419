use super::dataset_index::DatasetError;

/// Train/validation/test fractions.
///
/// Ratios need not sum to one; the test partition absorbs the remainder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitRatios {
    train: f64,
    validation: f64,
    test: f64,
}

impl SplitRatios {
    pub fn new(train: f64, validation: f64, test: f64) -> Result<Self, DatasetError> {
        if [train, validation, test]
            .iter()
            .any(|r| !r.is_finite() || *r < 0.0)
        {
            return Err(DatasetError::InvalidRatios {
                train,
                validation,
                test,
            });
        }
        Ok(Self {
            train,
            validation,
            test,
        })
    }

    pub(crate) const fn unchecked(train: f64, validation: f64, test: f64) -> Self {
        Self {
            train,
            validation,
            test,
        }
    }

    pub fn train(&self) -> f64 {
        self.train
    }

    pub fn validation(&self) -> f64 {
        self.validation
    }

    pub fn test(&self) -> f64 {
        self.test
    }

    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (self.train, self.validation, self.test)
    }

    /// Cut points `(floor(train * n), floor((train + validation) * n))`,
    /// clamped to `n` and ordered.
    pub fn cut_points(&self, n: usize) -> (usize, usize) {
        let cut = |fraction: f64| ((fraction * n as f64).floor() as usize).min(n);
        let first = cut(self.train);
        let second = cut(self.train + self.validation).max(first);
        (first, second)
    }
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self::unchecked(0.8, 0.1, 0.1)
    }
}
