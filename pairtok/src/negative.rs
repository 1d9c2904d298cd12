use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::dataset::{DatasetRecord, DATASET_HEADER_LINES};
use crate::error::{check_fraction, PipelineError, PipelineResult};
use crate::lines::{trim_line_end, LineBlockReader};
use crate::replace::AtomicFile;

/// Result of [`create_negative_samples`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize)]
pub struct NegativeSummary {
    /// Number of records in the file before synthesis.
    pub records: usize,
    /// Number of negative records added.
    pub negatives: usize,
}

/// Creates a negative record from the left read of one uniformly chosen
/// record and the right read of another, chosen independently.
///
/// Both picks may land on the same record.
///
/// # Panics
/// This function panics if `records` is empty.
pub fn sample_negative<R>(records: &[DatasetRecord], rng: &mut R) -> DatasetRecord
where
    R: Rng + ?Sized,
{
    assert!(!records.is_empty(), "at least one record is required");

    let first = rng.gen_range(0..records.len());
    let second = rng.gen_range(0..records.len());

    records[first].mismatched_with(&records[second])
}

/// Merges `negatives` into `records` at uniformly random positions, keeping
/// the relative order of both sequences.
pub fn interleave<T, R: Rng + ?Sized>(records: Vec<T>, negatives: Vec<T>, rng: &mut R) -> Vec<T> {
    let mut mask = vec![false; records.len()];
    mask.resize(records.len() + negatives.len(), true);
    mask.shuffle(rng);

    let mut records = records.into_iter();
    let mut negatives = negatives.into_iter();
    mask.into_iter()
        .filter_map(|is_negative| {
            if is_negative {
                negatives.next()
            } else {
                records.next()
            }
        })
        .collect()
}

/// Adds `floor(records * fraction)` negative records to the dataset file at
/// `path`.
///
/// Every negative combines the left read of one record with the right read of
/// another; the file is then rewritten with the negatives scattered among the
/// original records. The whole file is held in memory.
pub fn create_negative_samples<R: Rng + ?Sized>(
    path: &Path,
    fraction: f64,
    rng: &mut R,
) -> PipelineResult<NegativeSummary> {
    let fraction = check_fraction("negative fraction", fraction)?;

    let mut header = Vec::new();
    let mut records = Vec::new();
    {
        let mut lines = LineBlockReader::new(BufReader::new(File::open(path)?), 1);
        let mut buf = Vec::new();

        for _ in 0..DATASET_HEADER_LINES {
            if lines.read_line(&mut header)? == 0 {
                break;
            }
        }
        while lines.read_block(&mut buf)?.is_some() {
            records.push(parse_record(lines.lines_read(), &buf)?);
        }
    }

    let num_negative = (records.len() as f64 * fraction).floor() as usize;
    let summary = NegativeSummary {
        records: records.len(),
        negatives: num_negative,
    };
    if num_negative == 0 {
        return Ok(summary);
    }

    let negatives: Vec<_> = (0..num_negative)
        .map(|_| sample_negative(&records, rng))
        .collect();
    let records = interleave(records, negatives, rng);
    debug!(
        "Writing {} records with {} negatives to `{}`",
        records.len(),
        num_negative,
        path.display()
    );

    let mut out = AtomicFile::new(path)?;
    out.write_all(&header)?;
    if !header.ends_with(b"\n") {
        out.write_all(b"\n")?;
    }
    for record in &records {
        writeln!(out, "{}", record)?;
    }
    out.commit()?;

    Ok(summary)
}

fn parse_record(line: u64, data: &[u8]) -> PipelineResult<DatasetRecord> {
    let text = String::from_utf8_lossy(trim_line_end(data));
    text.parse().map_err(|error| PipelineError::Record { line, error })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::fs;

    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use tempfile::TempDir;

    use crate::_internal_test_data::{numbered_dataset, KMER_3_DATASET};
    use crate::dataset::{DatasetRecord, Label, DATASET_HEADER};
    use crate::error::PipelineError;
    use crate::negative::{create_negative_samples, interleave, sample_negative};

    fn read_records(data: &str) -> Vec<DatasetRecord> {
        data.lines().skip(1).map(|line| line.parse().unwrap()).collect()
    }

    #[test]
    fn negatives_have_label_zero() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("train.tsv");
        fs::write(&path, numbered_dataset(10)).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);

        let summary = create_negative_samples(&path, 0.5, &mut rng).unwrap();

        assert_eq!(summary.records, 10);
        assert_eq!(summary.negatives, 5);
        let data = fs::read_to_string(&path).unwrap();
        assert!(data.starts_with(DATASET_HEADER));
        let records = read_records(&data);
        assert_eq!(records.len(), 15);

        let negatives: Vec<_> = records
            .iter()
            .filter(|record| record.label() == Label::Negative)
            .collect();
        assert_eq!(negatives.len(), 5);
        let originals = read_records(&numbered_dataset(10));
        for negative in negatives {
            assert!(originals.iter().any(|record| record.left() == negative.left()));
            assert!(originals.iter().any(|record| record.right() == negative.right()));
        }
    }

    #[test]
    fn original_records_keep_their_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("train.tsv");
        fs::write(&path, numbered_dataset(20)).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);

        create_negative_samples(&path, 1.0, &mut rng).unwrap();

        let positives: Vec<_> = read_records(&fs::read_to_string(&path).unwrap())
            .into_iter()
            .filter(|record| record.label() == Label::Positive)
            .collect();
        assert_eq!(positives, read_records(&numbered_dataset(20)));
    }

    #[test]
    fn small_dataset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.tsv");
        let data = "sequence\tlabel\nACG TAC [SEP] GTA CGT\t1\n";
        fs::write(&path, data).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);

        let summary = create_negative_samples(&path, 0.5, &mut rng).unwrap();
        assert_eq!(summary.negatives, 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), data);

        let summary = create_negative_samples(&path, 1.0, &mut rng).unwrap();
        assert_eq!(summary.records, 1);
        assert_eq!(summary.negatives, 1);
        let records = read_records(&fs::read_to_string(&path).unwrap());
        assert_eq!(records.len(), 2);
        let negative = records
            .iter()
            .find(|record| record.label() == Label::Negative)
            .unwrap();
        assert_eq!(negative.to_string(), "ACG TAC [SEP] GTA CGT\t0");
    }

    #[test]
    fn empty_dataset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.tsv");
        fs::write(&path, DATASET_HEADER).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);

        let summary = create_negative_samples(&path, 1.0, &mut rng).unwrap();

        assert_eq!(summary.records, 0);
        assert_eq!(summary.negatives, 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), DATASET_HEADER);
    }

    #[test]
    fn negatives_from_three_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("train.tsv");
        fs::write(&path, KMER_3_DATASET).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);

        let summary = create_negative_samples(&path, 0.5, &mut rng).unwrap();

        assert_eq!(summary.negatives, 1);
        let records = read_records(&fs::read_to_string(&path).unwrap());
        assert_eq!(records.len(), 4);
        let originals = read_records(KMER_3_DATASET);
        let negative = records
            .iter()
            .find(|record| record.label() == Label::Negative)
            .unwrap();
        assert!(originals.iter().any(|record| record.left() == negative.left()));
        assert!(originals.iter().any(|record| record.right() == negative.right()));
    }

    #[test]
    fn invalid_record_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("train.tsv");
        fs::write(&path, "sequence\tlabel\nAAA [SEP] CCC\t1\nAAA CCC\t1\n").unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);

        let result = create_negative_samples(&path, 0.5, &mut rng);

        assert!(matches!(result, Err(PipelineError::Record { line: 3, .. })));
    }

    #[test]
    fn sampled_pairs_are_roughly_uniform() {
        let records = read_records(&numbered_dataset(4));
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(123);
        let mut counts = [[0usize; 4]; 4];

        for _ in 0..16_000 {
            let negative = sample_negative(&records, &mut rng);
            let left: usize = negative.left()[1..].parse().unwrap();
            let right: usize = negative.right()[1..].parse().unwrap();
            counts[left][right] += 1;
        }

        for (left, row) in counts.iter().enumerate() {
            for (right, &count) in row.iter().enumerate() {
                assert!((800..1200).contains(&count), "{} -> {}: {}", left, right, count);
            }
        }
    }

    #[test]
    fn interleave_keeps_both_orders() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
        let merged = interleave((0..10).collect(), (100..105).collect(), &mut rng);

        assert_eq!(merged.len(), 15);
        let records: Vec<_> = merged.iter().copied().filter(|&x| x < 100).collect();
        let negatives: Vec<_> = merged.iter().copied().filter(|&x| x >= 100).collect();
        assert_eq!(records, (0..10).collect::<Vec<_>>());
        assert_eq!(negatives, (100..105).collect::<Vec<_>>());
        assert_eq!(merged.iter().collect::<HashSet<_>>().len(), 15);
    }

    #[test]
    fn single_negative_position_is_roughly_uniform() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let mut counts = [0usize; 5];

        for _ in 0..10_000 {
            let merged = interleave(vec![0; 4], vec![1], &mut rng);
            let position = merged.iter().position(|&x| x == 1).unwrap();
            counts[position] += 1;
        }

        for (position, &count) in counts.iter().enumerate() {
            assert!((1800..2200).contains(&count), "{}: {}", position, count);
        }
    }

    #[test]
    fn two_negative_positions_are_roughly_uniform() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(6);
        // 5 slots, 2 of them negatives: 10 equally likely layouts
        let mut counts = [[0usize; 5]; 5];

        for _ in 0..20_000 {
            let merged = interleave(vec![0; 3], vec![1, 2], &mut rng);
            let first = merged.iter().position(|&x| x == 1).unwrap();
            let second = merged.iter().position(|&x| x == 2).unwrap();
            assert!(first < second);
            counts[first][second] += 1;
        }

        for first in 0..5 {
            for second in first + 1..5 {
                let count = counts[first][second];
                assert!((1800..2200).contains(&count), "{} {}: {}", first, second, count);
            }
        }
    }
}
