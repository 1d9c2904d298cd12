use std::path::Path;

use anyhow::Context;
use log::info;
use pairtok::negative::create_negative_samples;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

pub(crate) fn negatives(path: &Path, fraction: f64, seed: u64) -> anyhow::Result<()> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let summary = create_negative_samples(path, fraction, &mut rng)
        .with_context(|| format!("Failed to create negative samples in {}", path.display()))?;
    info!(
        "Added {} negative samples to {} records of {}",
        summary.negatives,
        summary.records,
        path.display()
    );

    Ok(())
}
