use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::audio::fsb5::{Fsb5, Fsb5Header};
use crate::errors::{ErrorKind, Result, RigError};

/// Progress of one container extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExtractState {
    Unopened,
    HeaderParsed,
    /// Index of the last sample processed.
    SampleRebuilt(usize),
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleFailure {
    pub sample: String,
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractReport {
    pub state: ExtractState,
    pub written: Vec<PathBuf>,
    pub failures: Vec<SampleFailure>,
}

/// Output file of one sample.
///
/// `base` gets `_<sample>` when the container holds more than one sample,
/// then `.<ext>` unless it already ends with it.
#[must_use]
pub fn sample_output_path(base: &Path, sample_name: &str, sample_count: usize, ext: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    if sample_count > 1 {
        name.push("_");
        name.push(sample_name);
    }
    let suffix = format!(".{ext}");
    if !name.to_string_lossy().ends_with(&suffix) {
        name.push(&suffix);
    }
    PathBuf::from(name)
}

/// Demuxes one sample bank.
///
/// ```text
/// Unopened -> HeaderParsed -> SampleRebuilt(0..n) -> Done
/// ```
///
/// A header failure leaves the extractor `Unopened` and is returned; a sample
/// failure is logged, recorded and skipped.
#[derive(Debug)]
pub struct AudioBankExtractor<'a> {
    bytes: &'a [u8],
    bank: Option<Fsb5<'a>>,
    state: ExtractState,
}

impl<'a> AudioBankExtractor<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            bank: None,
            state: ExtractState::Unopened,
        }
    }

    #[must_use]
    pub fn state(&self) -> ExtractState {
        self.state
    }

    /// Parses the header and sample table. Idempotent.
    pub fn open(&mut self) -> Result<&Fsb5Header> {
        if self.bank.is_none() {
            let bank = Fsb5::parse(self.bytes)?;
            log::debug!(
                "Opened {:?} sample bank with {} samples",
                bank.header.mode,
                bank.samples.len()
            );
            self.bank = Some(bank);
            self.state = ExtractState::HeaderParsed;
        }
        self.bank
            .as_ref()
            .map(|bank| &bank.header)
            .ok_or_else(|| RigError::ContainerParse("sample bank not opened".into()))
    }

    /// Rebuilds every sample next to `base`, in descriptor order.
    pub fn extract_to(&mut self, base: &Path) -> Result<ExtractReport> {
        self.open()?;
        let Some(bank) = self.bank.as_ref() else {
            return Err(RigError::ContainerParse("sample bank not opened".into()));
        };

        let count = bank.samples.len();
        let ext = bank.extension();
        let mut written = Vec::with_capacity(count);
        let mut failures = Vec::new();

        for (index, sample) in bank.samples.iter().enumerate() {
            let path = sample_output_path(base, &sample.name, count, ext);
            let outcome = bank.rebuild(sample).and_then(|body| {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, body)?;
                Ok(())
            });

            match outcome {
                Ok(()) => {
                    log::info!("Wrote audio sample {}", path.display());
                    written.push(path);
                }
                Err(err) => {
                    log::warn!("Skipping sample '{}' of {}: {err}", sample.name, base.display());
                    failures.push(SampleFailure {
                        sample: sample.name.clone(),
                        kind: err.kind(),
                        message: err.to_string(),
                    });
                }
            }
            self.state = ExtractState::SampleRebuilt(index);
        }

        self.state = ExtractState::Done;
        Ok(ExtractReport {
            state: self.state,
            written,
            failures,
        })
    }
}

/// One-shot extraction of `bytes` to `base`.
pub fn extract_container(bytes: &[u8], base: &Path) -> Result<ExtractReport> {
    AudioBankExtractor::new(bytes).extract_to(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_sample_keeps_base_name() {
        let path = sample_output_path(Path::new("/out/clip"), "hit", 1, "wav");
        assert_eq!(path, PathBuf::from("/out/clip.wav"));
    }

    #[test]
    fn extension_is_not_doubled() {
        let path = sample_output_path(Path::new("/out/clip.wav"), "hit", 1, "wav");
        assert_eq!(path, PathBuf::from("/out/clip.wav"));
    }

    #[test]
    fn multi_sample_appends_name() {
        let path = sample_output_path(Path::new("/out/clip"), "loop", 2, "mp3");
        assert_eq!(path, PathBuf::from("/out/clip_loop.mp3"));
    }
}
