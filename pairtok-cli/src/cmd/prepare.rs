use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use log::info;
use pairtok::pipeline::{Pipeline, RunSummary};
use pairtok::progress::ProgressNotifier;

use crate::config::RunConfig;
use crate::csv_stat::CsvStatOutput;

pub(crate) fn prepare(
    r1: &Path,
    r2: &Path,
    output: &Path,
    config: &RunConfig,
    csv: bool,
    progress_notifier: Arc<dyn ProgressNotifier>,
) -> anyhow::Result<RunSummary> {
    let params = config.to_params(progress_notifier);
    info!(
        "Preparing dataset in {} (k = {}, seed = {})",
        output.display(),
        params.kmer_size(),
        params.seed()
    );

    let mut pipeline = Pipeline::with_params(params);
    let result = pipeline.run(r1, r2, output);
    let summary =
        result.with_context(|| format!("Pipeline failed at stage: {}", pipeline.stage()))?;

    info!(
        "Training set: {} records ({} negative) in {}",
        summary.train_records(),
        summary.train_negatives.negatives,
        summary.train_path.display()
    );
    info!(
        "Test set: {} records ({} negative) in {}",
        summary.test_records(),
        summary.test_negatives.negatives,
        summary.test_path.display()
    );

    let mut csv_output = CsvStatOutput::new(csv);
    csv_output.use_header(&[
        "pairs",
        "train_positives",
        "train_negatives",
        "test_positives",
        "test_negatives",
    ])?;
    csv_output.add_record([
        summary.pairs.to_string(),
        summary.split.train_records.to_string(),
        summary.train_negatives.negatives.to_string(),
        summary.split.test_records.to_string(),
        summary.test_negatives.negatives.to_string(),
    ])?;
    csv_output.flush()?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use pairtok::_internal_test_data::{R1_FASTQ, R2_FASTQ};
    use pairtok::progress::DummyProgressNotifier;
    use tempfile::TempDir;

    use crate::cmd::prepare::prepare;
    use crate::config::RunConfig;

    #[test]
    fn prepare_uses_config() {
        let dir = TempDir::new().unwrap();
        let r1 = dir.path().join("reads_R1.fastq");
        let r2 = dir.path().join("reads_R2.fastq");
        fs::write(&r1, R1_FASTQ).unwrap();
        fs::write(&r2, R2_FASTQ).unwrap();
        let config = RunConfig {
            kmer_size: Some(2),
            train_fraction: Some(1.0),
            negative_train_fraction: Some(0.0),
            ..RunConfig::default()
        };

        let summary = prepare(
            &r1,
            &r2,
            &dir.path().join("out"),
            &config,
            false,
            Arc::new(DummyProgressNotifier),
        )
        .unwrap();

        assert_eq!(summary.parameters.kmer_size, 2);
        assert_eq!(summary.train_records(), 3);
        assert_eq!(summary.test_records(), 0);
        assert!(fs::read_to_string(&summary.train_path)
            .unwrap()
            .contains("AA AC CC [SEP] TT TG GG\t1"));
    }
}
