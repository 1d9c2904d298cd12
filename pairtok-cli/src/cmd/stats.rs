use anyhow::Context;
use pairtok::codec::{encode_sequence, mean_phred_score, Nucleotide};
use pairtok::fastq::FastqRead;
use pairtok::progress::ProgressNotifier;

use crate::opts::{open_pair, InputFile};
use crate::PROGRESS_BAR;

pub(crate) fn stats(r1: &InputFile, r2: &InputFile) -> anyhow::Result<()> {
    let (reader, length) = open_pair(r1, r2)?;
    PROGRESS_BAR.set_total_bytes(length);

    let mut r1_stats = ReadStats::default();
    let mut r2_stats = ReadStats::default();
    for pair in reader {
        let pair = pair.context("Could not parse a read pair from the FASTQ files")?;

        r1_stats.process_read(&pair.r1);
        r2_stats.process_read(&pair.r2);
        PROGRESS_BAR.processed_bytes(pair.size());
    }

    PROGRESS_BAR.finish();

    eprintln!("Read pairs: {}", r1_stats.reads);
    r1_stats.print(&format!("R1 ({})", r1));
    eprintln!();
    r2_stats.print(&format!("R2 ({})", r2));

    Ok(())
}

#[derive(Debug, Default)]
struct ReadStats {
    reads: usize,
    bases: usize,
    nucleotide_counts: [usize; Nucleotide::SIZE],
    phred_total: f64,
}

impl ReadStats {
    fn process_read(&mut self, read: &FastqRead) {
        self.reads += 1;
        self.bases += read.len();

        for nucleotide in encode_sequence(read.sequence()) {
            self.nucleotide_counts[nucleotide.index()] += 1;
        }

        if let Some(mean) = mean_phred_score(read.quality()) {
            self.phred_total += mean * read.quality().len() as f64;
        }
    }

    fn mean_length(&self) -> f64 {
        if self.reads == 0 {
            0.0
        } else {
            self.bases as f64 / self.reads as f64
        }
    }

    fn percentage(&self, nucleotide: Nucleotide) -> f64 {
        if self.bases == 0 {
            0.0
        } else {
            self.nucleotide_counts[nucleotide.index()] as f64 / self.bases as f64 * 100.0
        }
    }

    fn mean_phred(&self) -> f64 {
        if self.bases == 0 {
            0.0
        } else {
            self.phred_total / self.bases as f64
        }
    }

    fn print(&self, name: &str) {
        eprintln!("{}:", name);
        eprintln!("  Mean length: {:.2}", self.mean_length());
        eprintln!("  Mean Phred score: {:.2}", self.mean_phred());
        for nucleotide in Nucleotide::VALUES {
            eprintln!("  {}: {:.4}%", nucleotide, self.percentage(nucleotide));
        }
    }
}
