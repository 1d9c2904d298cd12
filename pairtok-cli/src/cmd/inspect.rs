use anyhow::bail;
use pairtok::codec::KMER_PAD;
use pairtok::dataset::stats::DatasetStats;

use crate::opts::InputFile;

pub(crate) fn inspect(dataset: &InputFile) -> anyhow::Result<DatasetStats> {
    let stats = DatasetStats::from_reader(dataset.as_reader()?, KMER_PAD)?;

    eprintln!("Dataset: {}", dataset);
    eprintln!("  Header: {}", if stats.header_present { "yes" } else { "missing" });
    eprintln!("  Positive records: {}", stats.positives);
    eprintln!("  Negative records: {}", stats.negatives);
    eprintln!("  Invalid rows: {}", stats.invalid);

    if !stats.header_present {
        bail!("{} does not start with a dataset header", dataset);
    }
    if let Err(e) = stats.check() {
        bail!("{} contains {} invalid row(s): {}", dataset, stats.invalid, e);
    }

    Ok(stats)
}
