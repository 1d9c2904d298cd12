pub mod codec;
pub mod dataset;
pub mod error;
pub mod fastq;
pub mod lines;
pub mod negative;
pub mod pipeline;
pub mod progress;
pub mod replace;
pub mod shuffle;
pub mod split;

#[doc(hidden)]
pub mod _internal_test_data;
