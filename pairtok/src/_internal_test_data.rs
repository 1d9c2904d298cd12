use lazy_static::lazy_static;

use crate::fastq::paired::ReadPair;
use crate::fastq::FastqRead;

pub const SIMPLE_TEST_READ_STR: &str = "@SEQ_ID
GATTTGGGGTTCAAAGCAGTATCGATCAAATAGTAAATCCATTTGTTCAACTCACAGTTT
+
!''*((((***+))%%%++)(%%%%).1***-+*''))**55CCF>>>>>>CCCCCCC65
";

pub const R1_FASTQ: &str = "@pair_1 1:N:0:1
AAACCC
+
IIIIII
@pair_2 1:N:0:1
GGGTTT
+
IIIII#
@pair_3 1:N:0:1
ACGTAC
+
#IIIII
";

pub const R2_FASTQ: &str = "@pair_1 2:N:0:1
TTTGGG
+
IIIIII
@pair_2 2:N:0:1
CCCAAA
+
IIIIII
@pair_3 2:N:0:1
GTACGT
+
IIII##
";

/// Expected dataset for [`R1_FASTQ`] and [`R2_FASTQ`] tokenized with k = 3.
pub const KMER_3_DATASET: &str = "sequence\tlabel
AAA CCC [SEP] TTT GGG\t1
GGG TTT [SEP] CCC AAA\t1
ACG TAC [SEP] GTA CGT\t1
";

lazy_static! {
    pub static ref TEST_READ_PAIRS: Vec<ReadPair> = vec![
        ReadPair::new(
            FastqRead::new("pair_1", "AAACCC", "IIIIII"),
            FastqRead::new("pair_1", "TTTGGG", "IIIIII"),
        ),
        ReadPair::new(
            FastqRead::new("pair_2", "GGGTTT", "IIIII#"),
            FastqRead::new("pair_2", "CCCAAA", "IIIIII"),
        ),
        ReadPair::new(
            FastqRead::new("pair_3", "ACGTAC", "#IIIII"),
            FastqRead::new("pair_3", "GTACGT", "IIII##"),
        ),
    ];
}

/// Builds a single-line-record dataset with `num` positive records, each
/// with a distinct left and right half.
#[must_use]
pub fn numbered_dataset(num: usize) -> String {
    let mut data = String::from("sequence\tlabel\n");
    for index in 0..num {
        data.push_str(&format!("L{} [SEP] R{}\t1\n", index, index));
    }

    data
}
