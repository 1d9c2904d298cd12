//! End-to-end conversion of a pair of FASTQ files into a train/test dataset.
//!
//! [`Pipeline::run`] goes through the [`PipelineStage`]s in order:
//!
//! 1. [`PipelineStage::Init`]: parameters and inputs are checked and the
//!    output directories are recreated,
//! 2. [`PipelineStage::ParseWrite`]: every read pair is tokenized into
//!    `train/train.tsv`,
//! 3. [`PipelineStage::Split`]: the tail of the training file is moved to
//!    `test/test.tsv`,
//! 4. [`PipelineStage::NegativesTrain`] and [`PipelineStage::NegativesTest`]:
//!    negative samples are added to both files,
//! 5. [`PipelineStage::Shuffle`] (optional): the training file is shuffled.
//!
//! The first error aborts the run. A `manifest.json` describing the run is
//! written to the output directory at the end.

use std::fmt::{Display, Formatter};
use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::Serialize;

use crate::codec::KmerTokenizer;
use crate::dataset::writer::save_fastq;
use crate::dataset::DATASET_HEADER_LINES;
use crate::error::{check_fraction, PipelineError, PipelineResult};
use crate::fastq::input::{open_paired, total_file_size};
use crate::negative::{create_negative_samples, NegativeSummary};
use crate::progress::{format_stats, ByteNum, DummyProgressNotifier, ProgressNotifier};
use crate::shuffle::{shuffle_file, ShuffleParams, ShuffleSummary};
use crate::split::{split_records, SplitParams, SplitSummary};

pub const TRAIN_DIR: &str = "train";
pub const TEST_DIR: &str = "test";
pub const TRAIN_FILE: &str = "train.tsv";
pub const TEST_FILE: &str = "test.tsv";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
pub enum PipelineStage {
    Init,
    ParseWrite,
    Split,
    NegativesTrain,
    NegativesTest,
    Shuffle,
    Done,
}

impl Display for PipelineStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStage::Init => "init",
            PipelineStage::ParseWrite => "parse and write",
            PipelineStage::Split => "split",
            PipelineStage::NegativesTrain => "negatives (train)",
            PipelineStage::NegativesTest => "negatives (test)",
            PipelineStage::Shuffle => "shuffle",
            PipelineStage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineParams {
    kmer_size: usize,
    train_fraction: f64,
    negative_train_fraction: f64,
    negative_test_fraction: f64,
    seed: u64,
    shuffle_retention: Option<f64>,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl PipelineParams {
    pub fn builder() -> PipelineParamsBuilder {
        PipelineParamsBuilder::new()
    }

    #[must_use]
    pub fn kmer_size(&self) -> usize {
        self.kmer_size
    }

    #[must_use]
    pub fn train_fraction(&self) -> f64 {
        self.train_fraction
    }

    #[must_use]
    pub fn negative_train_fraction(&self) -> f64 {
        self.negative_train_fraction
    }

    #[must_use]
    pub fn negative_test_fraction(&self) -> f64 {
        self.negative_test_fraction
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn shuffle_retention(&self) -> Option<f64> {
        self.shuffle_retention
    }

    /// Checks every numeric parameter and returns the configured tokenizer.
    pub fn validate(&self) -> PipelineResult<KmerTokenizer> {
        check_fraction("train fraction", self.train_fraction)?;
        check_fraction("negative train fraction", self.negative_train_fraction)?;
        check_fraction("negative test fraction", self.negative_test_fraction)?;
        if let Some(retention) = self.shuffle_retention {
            check_fraction("shuffle retention", retention)?;
        }

        Ok(KmerTokenizer::new(self.kmer_size)?)
    }

    fn manifest(&self) -> RunParameters {
        RunParameters {
            kmer_size: self.kmer_size,
            train_fraction: self.train_fraction,
            negative_train_fraction: self.negative_train_fraction,
            negative_test_fraction: self.negative_test_fraction,
            seed: self.seed,
            shuffle_retention: self.shuffle_retention,
        }
    }
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone)]
pub struct PipelineParamsBuilder {
    kmer_size: usize,
    train_fraction: f64,
    negative_train_fraction: f64,
    negative_test_fraction: f64,
    seed: u64,
    shuffle_retention: Option<f64>,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl PipelineParamsBuilder {
    pub fn new() -> Self {
        Self {
            kmer_size: 3,
            train_fraction: 0.8,
            negative_train_fraction: 0.5,
            negative_test_fraction: 0.5,
            seed: 0,
            shuffle_retention: None,
            progress_notifier: Arc::new(DummyProgressNotifier),
        }
    }

    pub fn kmer_size(&mut self, kmer_size: usize) -> &mut Self {
        let mut new = self;
        new.kmer_size = kmer_size;
        new
    }

    pub fn train_fraction(&mut self, train_fraction: f64) -> &mut Self {
        let mut new = self;
        new.train_fraction = train_fraction;
        new
    }

    pub fn negative_train_fraction(&mut self, negative_train_fraction: f64) -> &mut Self {
        let mut new = self;
        new.negative_train_fraction = negative_train_fraction;
        new
    }

    pub fn negative_test_fraction(&mut self, negative_test_fraction: f64) -> &mut Self {
        let mut new = self;
        new.negative_test_fraction = negative_test_fraction;
        new
    }

    pub fn seed(&mut self, seed: u64) -> &mut Self {
        let mut new = self;
        new.seed = seed;
        new
    }

    /// Enables shuffling of the training file, keeping the first
    /// `retention` fraction of its records in place.
    pub fn shuffle_retention(&mut self, retention: f64) -> &mut Self {
        let mut new = self;
        new.shuffle_retention = Some(retention);
        new
    }

    pub fn progress_notifier(&mut self, progress_notifier: Arc<dyn ProgressNotifier>) -> &mut Self {
        let mut new = self;
        new.progress_notifier = progress_notifier;
        new
    }

    pub fn build(&mut self) -> PipelineParams {
        PipelineParams {
            kmer_size: self.kmer_size,
            train_fraction: self.train_fraction,
            negative_train_fraction: self.negative_train_fraction,
            negative_test_fraction: self.negative_test_fraction,
            seed: self.seed,
            shuffle_retention: self.shuffle_retention,
            progress_notifier: self.progress_notifier.clone(),
        }
    }
}

impl Default for PipelineParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parameters of a run, as recorded in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunParameters {
    pub kmer_size: usize,
    pub train_fraction: f64,
    pub negative_train_fraction: f64,
    pub negative_test_fraction: f64,
    pub seed: u64,
    pub shuffle_retention: Option<f64>,
}

/// Outcome of a successful [`Pipeline::run`]; also the contents of the
/// manifest file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub version: String,
    pub parameters: RunParameters,
    pub pairs: usize,
    pub split: SplitSummary,
    pub train_negatives: NegativeSummary,
    pub test_negatives: NegativeSummary,
    pub shuffle: Option<ShuffleSummary>,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
}

impl RunSummary {
    /// Number of records in the training file.
    #[must_use]
    pub fn train_records(&self) -> usize {
        self.split.train_records + self.train_negatives.negatives
    }

    /// Number of records in the test file.
    #[must_use]
    pub fn test_records(&self) -> usize {
        self.split.test_records + self.test_negatives.negatives
    }
}

#[derive(Debug)]
pub struct Pipeline {
    params: PipelineParams,
    stage: PipelineStage,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(PipelineParams::default())
    }

    #[must_use]
    pub fn with_params(params: PipelineParams) -> Self {
        Self {
            params,
            stage: PipelineStage::Init,
        }
    }

    /// Returns the stage the pipeline is in; after a failed run, the stage
    /// that failed.
    #[must_use]
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn run(&mut self, r1: &Path, r2: &Path, output_dir: &Path) -> PipelineResult<RunSummary> {
        self.enter(PipelineStage::Init);
        let tokenizer = self.params.validate()?;
        for input in [r1, r2] {
            if !input.exists() {
                return Err(PipelineError::MissingInput(input.to_path_buf()));
            }
        }
        let train_dir = output_dir.join(TRAIN_DIR);
        let test_dir = output_dir.join(TEST_DIR);
        recreate_dir(&train_dir)?;
        recreate_dir(&test_dir)?;
        let train_path = train_dir.join(TRAIN_FILE);
        let test_path = test_dir.join(TEST_FILE);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.params.seed);

        self.enter(PipelineStage::ParseWrite);
        let start = Instant::now();
        // counted after decompression, like the progress notifier updates
        let mut read_bytes = ByteNum::ZERO;
        let pairs = save_fastq(
            open_paired(r1, r2)?.inspect(|pair| {
                if let Ok(pair) = pair {
                    read_bytes += pair.size();
                }
            }),
            &train_path,
            tokenizer,
            &*self.params.progress_notifier,
        )?;
        info!(
            "Tokenized {} read pairs: {}",
            pairs,
            format_stats(start, read_bytes)
        );
        if pairs == 0 {
            warn!("No read pairs found in the input files");
        }

        self.enter(PipelineStage::Split);
        let start = Instant::now();
        let split_params = SplitParams::builder()
            .train_fraction(self.params.train_fraction)
            .header_lines(DATASET_HEADER_LINES)
            .build();
        let split = split_records(&train_path, &test_path, &split_params, pairs)?;
        info!(
            "Split into {} training and {} test records: {}",
            split.train_records,
            split.test_records,
            format_stats(start, file_size(&[&train_path, &test_path])?)
        );

        self.enter(PipelineStage::NegativesTrain);
        let start = Instant::now();
        let train_negatives = create_negative_samples(
            &train_path,
            self.params.negative_train_fraction,
            &mut rng,
        )?;
        info!(
            "Added {} negative samples to the training set: {}",
            train_negatives.negatives,
            format_stats(start, file_size(&[&train_path])?)
        );

        self.enter(PipelineStage::NegativesTest);
        let start = Instant::now();
        let test_negatives = create_negative_samples(
            &test_path,
            self.params.negative_test_fraction,
            &mut rng,
        )?;
        info!(
            "Added {} negative samples to the test set: {}",
            test_negatives.negatives,
            format_stats(start, file_size(&[&test_path])?)
        );

        let shuffle = match self.params.shuffle_retention {
            Some(retention) => {
                self.enter(PipelineStage::Shuffle);
                let start = Instant::now();
                let shuffle_params = ShuffleParams::builder()
                    .header_lines(DATASET_HEADER_LINES)
                    .retention_fraction(retention)
                    .build();
                let summary = shuffle_file(&train_path, &shuffle_params, &mut rng)?;
                info!(
                    "Shuffled {} training records ({} kept in place): {}",
                    summary.blocks,
                    summary.retained,
                    format_stats(start, file_size(&[&train_path])?)
                );
                Some(summary)
            }
            None => None,
        };

        let summary = RunSummary {
            version: env!("CARGO_PKG_VERSION").to_owned(),
            parameters: self.params.manifest(),
            pairs,
            split,
            train_negatives,
            test_negatives,
            shuffle,
            train_path,
            test_path,
        };
        write_manifest(&output_dir.join(MANIFEST_FILE), &summary)?;
        self.enter(PipelineStage::Done);

        Ok(summary)
    }

    fn enter(&mut self, stage: PipelineStage) {
        debug!("Pipeline stage: {}", stage);
        self.stage = stage;
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn recreate_dir(path: &Path) -> PipelineResult<()> {
    if path.exists() {
        debug!("Removing existing directory `{}`", path.display());
        fs::remove_dir_all(path)?;
    }
    fs::create_dir_all(path)?;

    Ok(())
}

fn write_manifest(path: &Path, summary: &RunSummary) -> PipelineResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, summary).map_err(std::io::Error::from)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}

fn byte_num(bytes: u64) -> ByteNum {
    ByteNum::new(usize::try_from(bytes).unwrap_or(usize::MAX))
}

fn file_size(paths: &[&Path]) -> PipelineResult<ByteNum> {
    Ok(byte_num(total_file_size(paths)?))
}
