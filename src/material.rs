//! Material texture extraction
//!
//! Every texture slot of a material is resolved and written to
//! `<out>/<material>/<texture><slot>.png`. Slots fail independently.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::errors::{ErrorKind, Result, RigError};
use crate::source::records::{MaterialRecord, NamedRecord, fetch_ptr};
use crate::source::{AssetGraphProvider, DecodedImage, PPtr};

/// A named texture slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSlotRef {
    pub slot: String,
    pub texture: Option<PPtr>,
}

/// A material's texture-slot table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialTextureRef {
    pub material_name: String,
    pub slots: Vec<TextureSlotRef>,
}

impl From<MaterialRecord> for MaterialTextureRef {
    fn from(record: MaterialRecord) -> Self {
        Self {
            material_name: record.name,
            slots: record
                .saved_properties
                .tex_envs
                .into_iter()
                .map(|env| TextureSlotRef {
                    slot: env.first,
                    texture: Some(env.second.texture).filter(|p| !p.is_null()),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SlotOutcome {
    Written { path: PathBuf },
    Empty,
    Failed { kind: ErrorKind, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotReport {
    pub slot: String,
    #[serde(flatten)]
    pub outcome: SlotOutcome,
}

/// `<out>/<material>/<texture><slot>.png`
///
/// Only normal components of the material name become directories and
/// separators in the file stem are replaced, so the path stays under `out_dir`.
#[must_use]
pub fn texture_output_path(out_dir: &Path, material: &str, texture: &str, slot: &str) -> PathBuf {
    let mut path = out_dir.to_path_buf();
    for component in Path::new(material).components() {
        if let Component::Normal(part) = component {
            path.push(part);
        }
    }
    let stem: String = format!("{texture}{slot}")
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    path.push(format!("{stem}.png"));
    path
}

/// Writes an RGBA8 image as PNG, creating parent directories.
pub fn write_png(path: &Path, image: &DecodedImage) -> Result<()> {
    let buffer = image::RgbaImage::from_raw(image.width, image.height, image.rgba.clone())
        .ok_or_else(|| {
            RigError::ContainerParse(format!(
                "texture payload of {} bytes does not fit {}x{} RGBA8",
                image.rgba.len(),
                image.width,
                image.height
            ))
        })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    buffer.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Resolves a material pointer into its texture-slot table.
pub fn resolve_material(
    provider: &dyn AssetGraphProvider,
    material: PPtr,
    context: &str,
) -> Result<MaterialTextureRef> {
    let (_, record) = fetch_ptr::<MaterialRecord>(provider, material, context)?;
    Ok(record.into())
}

/// Extracts every slot of `material`; failures are logged and reported per slot.
pub fn extract_material_textures(
    provider: &dyn AssetGraphProvider,
    out_dir: &Path,
    material: &MaterialTextureRef,
) -> Vec<SlotReport> {
    material
        .slots
        .iter()
        .map(|slot| {
            let outcome = match extract_slot(provider, out_dir, material, slot) {
                Ok(Some(path)) => {
                    log::info!("Wrote texture {}", path.display());
                    SlotOutcome::Written { path }
                }
                Ok(None) => SlotOutcome::Empty,
                Err(err) => {
                    log::warn!(
                        "Material '{}' slot '{}': {err}",
                        material.material_name,
                        slot.slot
                    );
                    SlotOutcome::Failed {
                        kind: err.kind(),
                        message: err.to_string(),
                    }
                }
            };
            SlotReport {
                slot: slot.slot.clone(),
                outcome,
            }
        })
        .collect()
}

fn extract_slot(
    provider: &dyn AssetGraphProvider,
    out_dir: &Path,
    material: &MaterialTextureRef,
    slot: &TextureSlotRef,
) -> Result<Option<PathBuf>> {
    let Some(ptr) = slot.texture else {
        return Ok(None);
    };
    let (texture, record) = fetch_ptr::<NamedRecord>(
        provider,
        ptr,
        &format!("material '{}' slot '{}'", material.material_name, slot.slot),
    )?;
    let name = record.name;
    let image = provider.texture_image(texture)?;
    let path = texture_output_path(out_dir, &material.material_name, &name, &slot.slot);
    write_png(&path, &image)?;
    Ok(Some(path))
}
