pub mod inspect;
pub mod negatives;
pub mod prepare;
pub mod shuffle;
pub mod split;
pub mod stats;
