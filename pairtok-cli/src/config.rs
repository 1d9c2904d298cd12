use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use pairtok::pipeline::PipelineParams;
use pairtok::progress::ProgressNotifier;
use serde::{Deserialize, Serialize};

/// Pipeline settings that may come from the command line, the environment or
/// a JSON configuration file. Unset values fall back to the next source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub kmer_size: Option<usize>,
    pub train_fraction: Option<f64>,
    pub negative_train_fraction: Option<f64>,
    pub negative_test_fraction: Option<f64>,
    pub seed: Option<u64>,
    pub shuffle_retention: Option<f64>,
}

impl RunConfig {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        let config = serde_json::from_str(&data)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        Ok(config)
    }

    /// Fills the values unset in `self` with the ones from `fallback`.
    #[must_use]
    pub fn or(self, fallback: RunConfig) -> Self {
        Self {
            kmer_size: self.kmer_size.or(fallback.kmer_size),
            train_fraction: self.train_fraction.or(fallback.train_fraction),
            negative_train_fraction: self
                .negative_train_fraction
                .or(fallback.negative_train_fraction),
            negative_test_fraction: self
                .negative_test_fraction
                .or(fallback.negative_test_fraction),
            seed: self.seed.or(fallback.seed),
            shuffle_retention: self.shuffle_retention.or(fallback.shuffle_retention),
        }
    }

    #[must_use]
    pub fn to_params(&self, progress_notifier: Arc<dyn ProgressNotifier>) -> PipelineParams {
        let mut params = PipelineParams::builder();
        params.progress_notifier(progress_notifier);
        if let Some(kmer_size) = self.kmer_size {
            params.kmer_size(kmer_size);
        }
        if let Some(train_fraction) = self.train_fraction {
            params.train_fraction(train_fraction);
        }
        if let Some(fraction) = self.negative_train_fraction {
            params.negative_train_fraction(fraction);
        }
        if let Some(fraction) = self.negative_test_fraction {
            params.negative_test_fraction(fraction);
        }
        if let Some(seed) = self.seed {
            params.seed(seed);
        }
        if let Some(retention) = self.shuffle_retention {
            params.shuffle_retention(retention);
        }

        params.build()
    }
}
