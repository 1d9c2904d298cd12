use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use pairtok::_internal_test_data::{R1_FASTQ, R2_FASTQ};
use pairtok::codec::{detokenize, KMER_PAD};
use pairtok::dataset::stats::DatasetStats;
use pairtok::dataset::{DatasetRecord, Label, DATASET_HEADER};
use pairtok::error::PipelineError;
use pairtok::fastq::reader::FastqReader;
use pairtok::pipeline::{
    Pipeline, PipelineParams, MANIFEST_FILE, TEST_DIR, TEST_FILE, TRAIN_DIR, TRAIN_FILE,
};
use tempfile::TempDir;

fn write_inputs(dir: &Path, r1: &str, r2: &str) -> (PathBuf, PathBuf) {
    let r1_path = dir.join("reads_R1.fastq");
    let r2_path = dir.join("reads_R2.fastq");
    fs::write(&r1_path, r1).unwrap();
    fs::write(&r2_path, r2).unwrap();
    (r1_path, r2_path)
}

fn records(path: &Path) -> Vec<DatasetRecord> {
    let data = fs::read_to_string(path).unwrap();
    let mut lines = data.lines();
    assert_eq!(lines.next(), Some(DATASET_HEADER));
    lines.map(|line| line.parse().unwrap()).collect()
}

fn count_label(records: &[DatasetRecord], label: Label) -> usize {
    records
        .iter()
        .filter(|record| record.label() == label)
        .count()
}

/// Builds a FASTQ file whose reads are unique: each one starts with its index
/// written in base 4.
fn synthetic_fastq(num: usize, mate: usize) -> String {
    const BASES: [char; 4] = ['A', 'C', 'G', 'T'];

    let mut data = String::new();
    for index in 0..num {
        let mut sequence: String = (0..8)
            .map(|digit| BASES[(index >> (2 * digit)) & 3])
            .collect();
        let tail = 12 + (index * mate) % 13;
        sequence.extend((0..tail).map(|pos| BASES[(pos * mate + index) % 4]));

        data.push_str(&format!(
            "@read_{} {}:N:0:1\n{}\n+\n{}\n",
            index,
            mate,
            sequence,
            "I".repeat(sequence.len())
        ));
    }

    data
}

#[test_log::test]
fn small_paired_run() {
    let dir = TempDir::new().unwrap();
    let (r1, r2) = write_inputs(dir.path(), R1_FASTQ, R2_FASTQ);
    let output = dir.path().join("dataset");

    let params = PipelineParams::builder()
        .kmer_size(3)
        .train_fraction(0.67)
        .negative_train_fraction(0.5)
        .negative_test_fraction(0.5)
        .seed(42)
        .build();
    let summary = Pipeline::with_params(params).run(&r1, &r2, &output).unwrap();

    assert_eq!(summary.pairs, 3);
    assert_eq!(summary.train_records(), 3);
    assert_eq!(summary.test_records(), 1);

    let train = records(&output.join(TRAIN_DIR).join(TRAIN_FILE));
    assert_eq!(count_label(&train, Label::Positive), 2);
    assert_eq!(count_label(&train, Label::Negative), 1);

    let test = records(&output.join(TEST_DIR).join(TEST_FILE));
    assert_eq!(
        test,
        vec![DatasetRecord::new("ACG TAC", "GTA CGT", Label::Positive)]
    );

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output.join(MANIFEST_FILE)).unwrap()).unwrap();
    assert_eq!(manifest["pairs"], 3);
    assert_eq!(manifest["parameters"]["seed"], 42);
    assert_eq!(manifest["split"]["test_records"], 1);
}

#[test_log::test]
fn positives_keep_mate_pairs_together() {
    let dir = TempDir::new().unwrap();
    let r1_data = synthetic_fastq(200, 1);
    let r2_data = synthetic_fastq(200, 2);
    let (r1, r2) = write_inputs(dir.path(), &r1_data, &r2_data);
    let output = dir.path().join("dataset");

    let params = PipelineParams::builder()
        .kmer_size(4)
        .seed(3)
        .shuffle_retention(0.5)
        .build();
    let summary = Pipeline::with_params(params).run(&r1, &r2, &output).unwrap();

    let r1_reads: Vec<_> = FastqReader::new(r1_data.as_bytes())
        .into_iter()
        .map(|read| read.unwrap().into_sequence())
        .collect();
    let r2_reads: Vec<_> = FastqReader::new(r2_data.as_bytes())
        .into_iter()
        .map(|read| read.unwrap().into_sequence())
        .collect();

    let train = records(&output.join(TRAIN_DIR).join(TRAIN_FILE));
    let test = records(&output.join(TEST_DIR).join(TEST_FILE));
    assert_eq!(train.len(), summary.train_records());
    assert_eq!(test.len(), summary.test_records());
    assert_eq!(
        count_label(&train, Label::Positive) + count_label(&test, Label::Positive),
        200
    );

    for record in train.iter().chain(test.iter()) {
        let left = detokenize(record.left(), KMER_PAD);
        let right = detokenize(record.right(), KMER_PAD);
        let index = r1_reads.iter().position(|read| *read == left).unwrap();
        if record.label() == Label::Positive {
            assert_eq!(r2_reads[index], right);
        } else {
            // a negative may pick both reads from the same pair
            assert!(r2_reads.contains(&right));
        }
    }
}

#[test_log::test]
fn runs_are_deterministic() {
    let dir = TempDir::new().unwrap();
    let (r1, r2) = write_inputs(
        dir.path(),
        &synthetic_fastq(100, 1),
        &synthetic_fastq(100, 2),
    );
    let params = PipelineParams::builder()
        .seed(1234)
        .shuffle_retention(0.0)
        .build();

    let first = dir.path().join("first");
    let second = dir.path().join("second");
    Pipeline::with_params(params.clone()).run(&r1, &r2, &first).unwrap();
    Pipeline::with_params(params).run(&r1, &r2, &second).unwrap();

    for file in [
        Path::new(TRAIN_DIR).join(TRAIN_FILE),
        Path::new(TEST_DIR).join(TEST_FILE),
    ] {
        assert_eq!(
            fs::read(first.join(&file)).unwrap(),
            fs::read(second.join(&file)).unwrap()
        );
    }
}

#[test_log::test]
fn outputs_are_valid_datasets() {
    let dir = TempDir::new().unwrap();
    let (r1, r2) = write_inputs(dir.path(), &synthetic_fastq(50, 1), &synthetic_fastq(50, 2));
    let output = dir.path().join("dataset");

    let summary = Pipeline::new().run(&r1, &r2, &output).unwrap();

    let train = File::open(output.join(TRAIN_DIR).join(TRAIN_FILE)).unwrap();
    let stats = DatasetStats::from_reader(BufReader::new(train), KMER_PAD).unwrap();
    assert!(stats.is_valid());
    assert_eq!(stats.positives, 40);
    assert_eq!(stats.negatives, 20);
    assert_eq!(stats.records(), summary.train_records());
}

#[test_log::test]
fn unequal_inputs_stop_at_shorter_file() {
    let dir = TempDir::new().unwrap();
    let (r1, r2) = write_inputs(dir.path(), &synthetic_fastq(10, 1), &synthetic_fastq(7, 2));
    let output = dir.path().join("dataset");

    let summary = Pipeline::new().run(&r1, &r2, &output).unwrap();

    assert_eq!(summary.pairs, 7);
    assert_eq!(summary.split.total_records(), 7);
}

#[test_log::test]
fn malformed_input_aborts() {
    let dir = TempDir::new().unwrap();
    let broken = "@read_0\nACGT\n+\nIII\n";
    let (r1, r2) = write_inputs(dir.path(), broken, &synthetic_fastq(1, 2));
    let output = dir.path().join("dataset");

    let result = Pipeline::new().run(&r1, &r2, &output);

    assert!(matches!(result, Err(PipelineError::Fastq(_))));
    assert!(!output.join(MANIFEST_FILE).exists());
}

#[test_log::test]
fn missing_input_touches_nothing() {
    let dir = TempDir::new().unwrap();
    let r1 = dir.path().join("missing_R1.fastq");
    let r2 = dir.path().join("missing_R2.fastq");
    let output = dir.path().join("dataset");

    let result = Pipeline::new().run(&r1, &r2, &output);

    assert!(matches!(result, Err(PipelineError::MissingInput(path)) if path == r1));
    assert!(!output.exists());
}
