//! Audio container demuxing
//!
//! Audio clips carry their payload as an FMOD sample bank. [`fsb5`] parses
//! the bank, [`extract`] rebuilds each sample into a standalone file.

pub mod extract;
pub mod fsb5;

pub use extract::{
    AudioBankExtractor, ExtractReport, ExtractState, SampleFailure, extract_container,
    sample_output_path,
};
pub use fsb5::{Fsb5, Fsb5Header, Fsb5Sample, SampleLoop, SoundFormat};
