use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::audio::{ExtractReport, extract_container};
use crate::errors::Result;
use crate::import::ImportContext;
use crate::source::records::{NamedRecord, fetch};
use crate::source::{AssetGraphProvider, ObjectRef};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioClipReport {
    pub name: String,
    pub base: PathBuf,
    pub extract: ExtractReport,
}

/// Clip name, empty when the record has none.
pub fn clip_name(provider: &dyn AssetGraphProvider, clip: ObjectRef) -> Result<String> {
    Ok(fetch::<NamedRecord>(provider, clip)?.name)
}

/// Output base of a clip: its container path, else its name, else `audio`.
///
/// Only the normal components of the relative path are kept, so the result
/// never leaves `out_dir`.
#[must_use]
pub fn audio_output_base(out_dir: &Path, container: Option<&str>, name: &str) -> PathBuf {
    let relative = container
        .filter(|c| !c.is_empty())
        .or(Some(name).filter(|n| !n.is_empty()))
        .unwrap_or("audio");

    let mut base = out_dir.to_path_buf();
    let mut pushed = false;
    for component in Path::new(relative).components() {
        if let Component::Normal(part) = component {
            base.push(part);
            pushed = true;
        }
    }
    if !pushed {
        base.push("audio");
    }
    base
}

/// Demuxes one audio clip's sample bank next to its output base.
pub fn import_audio_clip(ctx: &ImportContext<'_>, clip: ObjectRef) -> Result<AudioClipReport> {
    let name = clip_name(ctx.provider, clip)?;
    let container = ctx.provider.container_name(clip);
    let base = audio_output_base(&ctx.config.output_dir, container.as_deref(), &name);

    let bytes = ctx.provider.audio_data(clip)?;
    let extract = extract_container(&bytes, &base)?;
    log::info!(
        "Imported audio clip '{name}' ({} samples written, {} skipped)",
        extract.written.len(),
        extract.failures.len()
    );

    Ok(AudioClipReport {
        name,
        base,
        extract,
    })
}
