use std::path::Path;

use anyhow::Context;
use log::info;
use pairtok::split::{split_records, SplitParams};

pub(crate) fn split(
    source: &Path,
    dest: &Path,
    train_fraction: f64,
    records: usize,
    header_lines: usize,
    lines_per_record: usize,
) -> anyhow::Result<()> {
    let params = SplitParams::builder()
        .train_fraction(train_fraction)
        .header_lines(header_lines)
        .lines_per_record(lines_per_record)
        .build();

    let summary = split_records(source, dest, &params, records)
        .with_context(|| format!("Failed to split {}", source.display()))?;
    info!(
        "Kept {} records in {}, moved {} to {}",
        summary.train_records,
        source.display(),
        summary.test_records,
        dest.display()
    );

    Ok(())
}
