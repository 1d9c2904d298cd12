use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};

use crate::config::RunConfig;
use crate::opts::{fraction, input_file, InputFile};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,

    /// Don't display a progress bar/spinner
    #[clap(long, global = true, value_parser)]
    pub no_progress: bool,

    /// Append log messages to given file as well
    #[clap(long, global = true, value_parser, env = "PAIRTOK_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

/// Pipeline settings of the `prepare` command.
#[derive(clap::Args, Debug)]
pub struct PrepareOptions {
    /// Length of a single k-mer token
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..), env = "PAIRTOK_KMER")]
    pub kmer: Option<u32>,

    /// Fraction of read pairs that go to the training set [default: 0.8]
    #[clap(long, value_parser = fraction, env = "PAIRTOK_TRAIN_FRACTION")]
    pub train_fraction: Option<f64>,

    /// Number of negative samples to add to the training set, as a fraction
    /// of its positive records [default: 0.5]
    #[clap(long, value_parser = fraction, env = "PAIRTOK_NEGATIVE_TRAIN")]
    pub negative_train: Option<f64>,

    /// Number of negative samples to add to the test set, as a fraction of
    /// its positive records [default: 0.5]
    #[clap(long, value_parser = fraction, env = "PAIRTOK_NEGATIVE_TEST")]
    pub negative_test: Option<f64>,

    /// Seed of the random number generator [default: 0]
    #[clap(long, value_parser, env = "PAIRTOK_SEED")]
    pub seed: Option<u64>,

    /// Shuffle the training set, keeping given fraction of its records in
    /// their original order
    #[clap(long, value_parser = fraction, env = "PAIRTOK_SHUFFLE_RETENTION")]
    pub shuffle_retention: Option<f64>,

    /// JSON file with default values of the options above
    #[clap(long, value_parser = input_file, env = "PAIRTOK_CONFIG")]
    pub config: Option<InputFile>,
}

impl PrepareOptions {
    /// Returns the settings given on the command line or in the environment.
    #[must_use]
    pub fn to_run_config(&self) -> RunConfig {
        RunConfig {
            kmer_size: self.kmer.map(|kmer| kmer as usize),
            train_fraction: self.train_fraction,
            negative_train_fraction: self.negative_train,
            negative_test_fraction: self.negative_test,
            seed: self.seed,
            shuffle_retention: self.shuffle_retention,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a pair of FASTQ files into a tokenized train/test dataset
    Prepare {
        /// FASTQ file with the first reads of each pair
        #[clap(value_parser = input_file, env = "PAIRTOK_R1")]
        r1: InputFile,

        /// FASTQ file with the second reads of each pair
        #[clap(value_parser = input_file, env = "PAIRTOK_R2")]
        r2: InputFile,

        /// Output directory; its `train` and `test` subdirectories are
        /// replaced
        #[clap(short, long, value_parser, env = "PAIRTOK_OUTPUT_DIR")]
        output: PathBuf,

        #[clap(flatten)]
        options: PrepareOptions,

        /// Output a summary of the run as a CSV file to the standard output
        #[clap(long, value_parser)]
        csv: bool,
    },

    /// Move the tail of a file to another file
    Split {
        /// File to split; keeps the leading records
        #[clap(value_parser = input_file)]
        source: InputFile,

        /// File to move the remaining records to
        #[clap(value_parser)]
        dest: PathBuf,

        /// Fraction of the records that stay in the source file
        #[clap(long, value_parser = fraction)]
        train_fraction: f64,

        /// Number of records in the source file
        #[clap(long, value_parser)]
        records: usize,

        /// Number of leading lines copied to both files
        #[clap(default_value_t = 0, long, value_parser)]
        header_lines: usize,

        /// Number of lines making up a single record
        #[clap(default_value_t = 1, long, value_parser = clap::value_parser!(u32).range(1..))]
        lines_per_record: u32,
    },

    /// Shuffle multi-line records of a file in place
    Shuffle {
        /// File to shuffle
        #[clap(value_parser = input_file)]
        file: InputFile,

        /// Number of lines making up a single record
        #[clap(default_value_t = 1, long, value_parser = clap::value_parser!(u32).range(1..))]
        lines_per_block: u32,

        /// Fraction of the leading records kept in their original order
        #[clap(default_value_t = 0.0, long, value_parser = fraction)]
        retention: f64,

        /// Number of leading lines kept at the top of the file
        #[clap(default_value_t = 0, long, value_parser)]
        header_lines: usize,

        /// Lines starting with this prefix are moved to the top of the file
        #[clap(long, value_parser)]
        comment_prefix: Option<String>,

        /// Seed of the random number generator
        #[clap(default_value_t = 0, long, value_parser)]
        seed: u64,
    },

    /// Add mismatched read pairs to a dataset file
    Negatives {
        /// Dataset file to extend
        #[clap(value_parser = input_file)]
        file: InputFile,

        /// Number of negative samples to add, as a fraction of the records in
        /// the file
        #[clap(long, value_parser = fraction)]
        fraction: f64,

        /// Seed of the random number generator
        #[clap(default_value_t = 0, long, value_parser)]
        seed: u64,
    },

    /// Print statistics about a pair of FASTQ files
    Stats {
        /// FASTQ file with the first reads of each pair
        #[clap(value_parser = input_file)]
        r1: InputFile,

        /// FASTQ file with the second reads of each pair
        #[clap(value_parser = input_file)]
        r2: InputFile,
    },

    /// Validate a dataset file and count its records
    Inspect {
        /// Dataset file to check
        #[clap(value_parser = input_file)]
        dataset: InputFile,
    },
}
