use std::path::Path;

use anyhow::Context;
use log::info;
use pairtok::shuffle::{shuffle_file, ShuffleParams};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

pub(crate) fn shuffle(
    path: &Path,
    lines_per_block: usize,
    retention: f64,
    header_lines: usize,
    comment_prefix: Option<&str>,
    seed: u64,
) -> anyhow::Result<()> {
    let mut params = ShuffleParams::builder();
    params
        .lines_per_block(lines_per_block)
        .retention_fraction(retention)
        .header_lines(header_lines);
    if let Some(prefix) = comment_prefix {
        params.comment_prefix(prefix);
    }
    let params = params.build();

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let summary = shuffle_file(path, &params, &mut rng)
        .with_context(|| format!("Failed to shuffle {}", path.display()))?;
    info!(
        "Shuffled {} records of {} ({} kept in place, {} header lines)",
        summary.blocks,
        path.display(),
        summary.retained,
        summary.header_lines
    );

    Ok(())
}
